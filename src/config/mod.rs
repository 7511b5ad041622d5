// Configuration module for panel, gesture, and market settings
// Loaded from TOML with a load-or-default fallback path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gui::geom::PanelSize;
use crate::gui::screen::ViewId;
use crate::input::gesture::GestureSettings;
use crate::market::cache::CacheSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub system: SystemConfig,
    pub panel: PanelConfig,
    pub gestures: GestureConfig,
    pub market: MarketConfig,
}

/// System configuration (logging)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    pub log_file: String,
}

/// Fixed-resolution panel and loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: f32,
    pub height: f32,
    /// Main loop tick period in milliseconds
    pub tick_ms: u64,
    /// View shown at startup
    pub default_view: String,
}

/// Gesture thresholds — the one canonical set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub double_tap_window_secs: f64,
    pub swipe_threshold: f32,
    pub tap_region_px: f32,
    pub long_press_secs: f64,
    pub chart_hit_margin_px: f32,
}

/// Price cache and sampling cadence
///
/// The cadence is fixed per deployment; it directly determines the
/// correctness of the 24h change percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub cache_duration_secs: u64,
    pub sample_interval_hours: u64,
    pub window_size: usize,
    pub history_days: u32,
    pub assets_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            panel: PanelConfig::default(),
            gestures: GestureConfig::default(),
            market: MarketConfig::default(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "tick_sight.log".to_string(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
            tick_ms: 100,
            default_view: "ticker".to_string(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        let defaults = GestureSettings::default();
        Self {
            double_tap_window_secs: defaults.double_tap_window,
            swipe_threshold: defaults.swipe_threshold,
            tap_region_px: defaults.tap_region_px,
            long_press_secs: defaults.long_press_secs,
            chart_hit_margin_px: 24.0,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            cache_duration_secs: 30,
            sample_interval_hours: 3,
            window_size: 56,
            history_days: 7,
            assets_file: "assets.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, validating afterwards
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load with fallback to defaults if the file is missing or broken
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    /// Reject configurations that would break downstream invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel.width <= 0.0 || self.panel.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "panel dimensions must be positive".to_string(),
            ));
        }
        if self.panel.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be nonzero".to_string()));
        }
        if ViewId::from_name(&self.panel.default_view).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown default_view {:?}",
                self.panel.default_view
            )));
        }
        if self.market.sample_interval_hours == 0 || self.market.sample_interval_hours > 24 {
            return Err(ConfigError::Invalid(
                "sample_interval_hours must be in 1..=24".to_string(),
            ));
        }
        // The 24h change needs a full day of samples inside the window
        let samples_per_day = (24 / self.market.sample_interval_hours) as usize;
        if self.market.window_size <= samples_per_day {
            return Err(ConfigError::Invalid(format!(
                "window_size {} cannot span 24h at {}h cadence",
                self.market.window_size, self.market.sample_interval_hours
            )));
        }
        if !(0.0..=1.0).contains(&self.gestures.swipe_threshold) {
            return Err(ConfigError::Invalid(
                "swipe_threshold must be a fraction in 0..=1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn panel_size(&self) -> PanelSize {
        PanelSize::new(self.panel.width, self.panel.height)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.panel.tick_ms)
    }

    pub fn default_view(&self) -> ViewId {
        // validate() already rejected unknown names
        ViewId::from_name(&self.panel.default_view).unwrap_or(ViewId::Ticker)
    }

    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            double_tap_window: self.gestures.double_tap_window_secs,
            swipe_threshold: self.gestures.swipe_threshold,
            tap_region_px: self.gestures.tap_region_px,
            long_press_secs: self.gestures.long_press_secs,
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            cache_duration: Duration::from_secs(self.market.cache_duration_secs),
            sample_interval: Duration::from_secs(self.market.sample_interval_hours * 3600),
            window: self.market.window_size,
            history_days: self.market.history_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_view(), ViewId::Ticker);
        assert_eq!(config.cache_settings().samples_per_day(), 8);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [panel]
            width = 320.0
            height = 240.0

            [market]
            cache_duration_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.panel.width, 320.0);
        assert_eq!(config.market.cache_duration_secs, 10);
        // untouched sections keep defaults
        assert_eq!(config.gestures.double_tap_window_secs, 0.3);
    }

    #[test]
    fn test_unknown_default_view_rejected() {
        let mut config = AppConfig::default();
        config.panel.default_view = "galaxy".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_window_must_span_a_day() {
        let mut config = AppConfig::default();
        config.market.window_size = 8; // 3h cadence → 8 samples/day, not enough
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = AppConfig::load_or_default("/nonexistent/tick_sight.toml");
        assert_eq!(config.panel.tick_ms, 100);
    }
}

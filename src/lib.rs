// 核心模块
pub mod assets;
pub mod config;
pub mod gui;
pub mod input;
pub mod market;

// 重新导出主要类型
pub use assets::{AssetStore, TrackedAsset};
pub use config::AppConfig;
pub use gui::{ChartRenderer, RenderFrame, ScreenManager, Services, ViewId};
pub use input::{Gesture, GestureRecognizer, TouchEvent, TouchPhase};
pub use market::{PriceSeriesCache, SimulatedProvider};

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 初始化日志系统 - 输出到文件以免干扰面板 UI
pub fn init_logging(log_file: &str, level: &str) {
    use std::fs::OpenOptions;

    let filter = level.parse().unwrap_or(log::LevelFilter::Info);

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            env_logger::Builder::from_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .filter_level(filter)
                .init();
        }
        Err(_) => {
            // 日志文件打不开就退回 stderr，但只记录警告以上
            env_logger::Builder::from_default_env()
                .filter_level(log::LevelFilter::Warn)
                .init();
        }
    }
}

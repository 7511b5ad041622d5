/// 价格序列缓存
///
/// 每个被跟踪符号的当前价 + 历史窗口的唯一所有者，负责：
/// - 新鲜度判定：距上次成功抓取不足 cache_duration 时直接返回缓存值
/// - 失败降级：抓取失败保留上一个已知值，不推进 last_success，下一次
///   调用立即重试而不是无限退避
/// - 每符号隔离：refresh_all 中单个符号失败不影响其余符号
/// - 合并抓取：同一符号已有抓取在途时不重复抓取
///
/// 单线程：刷新产生的修改（当前价、采样、时刻戳）作为一个整体落账，
/// 读者不会观察到半更新状态。

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::market::provider::{PriceProvider, ProviderError};
use crate::market::series::{PricePoint, PriceSeries};

/// 缓存策略配置
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// 缓存有效期；窗口内的 get_current 不触发抓取
    pub cache_duration: Duration,
    /// 采样节奏（部署固定，直接决定 24h 涨跌幅的正确性）
    pub sample_interval: Duration,
    /// 滑动窗口长度（默认 56 = 7 天 / 3 小时）
    pub window: usize,
    /// 历史回填天数
    pub history_days: u32,
}

impl CacheSettings {
    /// 一天内的采样数，24h 涨跌幅的基准偏移
    pub fn samples_per_day(&self) -> usize {
        let secs = self.sample_interval.as_secs();
        if secs == 0 {
            return 0;
        }
        (24 * 3600 / secs) as usize
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_duration: Duration::from_secs(30),
            sample_interval: Duration::from_secs(3 * 3600),
            window: 56,
            history_days: 7,
        }
    }
}

/// 价格序列缓存
pub struct PriceSeriesCache {
    provider: Box<dyn PriceProvider>,
    entries: HashMap<String, PriceSeries>,
    settings: CacheSettings,
    /// 在途抓取的符号集合（合并重复请求）
    in_flight: HashSet<String>,
}

impl PriceSeriesCache {
    pub fn new(provider: Box<dyn PriceProvider>, settings: CacheSettings) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
            settings,
            in_flight: HashSet::new(),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// 当前价；必要时触发抓取，失败时退回上一个已知值
    pub fn get_current(&mut self, symbol: &str) -> Option<f64> {
        self.get_current_at(symbol, Instant::now())
    }

    /// 当前窗口的价格值；从未抓取过则为空
    pub fn get_series(&self, symbol: &str) -> Vec<f64> {
        self.entries
            .get(symbol)
            .map(|s| s.prices())
            .unwrap_or_default()
    }

    pub fn series(&self, symbol: &str) -> Option<&PriceSeries> {
        self.entries.get(symbol)
    }

    /// 24 小时涨跌幅（百分比）
    pub fn change_24h(&self, symbol: &str) -> Option<f64> {
        self.entries
            .get(symbol)?
            .change_24h(self.settings.samples_per_day())
    }

    /// 上一次抓取失败的描述；成功后清空
    pub fn last_error(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol).and_then(|s| s.last_error())
    }

    /// 距下一次刷新尝试的秒数，UI 倒计时用
    ///
    /// 以 last_attempt 为基准：抓取失败也推进倒计时，界面不会像挂住。
    pub fn seconds_until_refresh(&self, symbol: &str) -> f64 {
        self.seconds_until_refresh_at(symbol, Instant::now())
    }

    /// 刷新一组符号；每个符号的失败互相隔离
    pub fn refresh_all(&mut self, symbols: &[String]) {
        let now = Instant::now();
        for symbol in symbols {
            // 单个失败记录在该符号条目内，不中断其余符号
            let _ = self.get_current_at(symbol, now);
        }
    }

    /// 一次性历史回填；已有窗口数据时跳过
    pub fn ensure_history(&mut self, symbol: &str) {
        if self
            .entries
            .get(symbol)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
        {
            return;
        }
        if !self.in_flight.insert(symbol.to_string()) {
            return;
        }

        let result = self.provider.fetch_history(symbol, self.settings.history_days);
        self.in_flight.remove(symbol);

        let entry = self.entry_mut(symbol);
        match result {
            Ok(points) => {
                let latest = points.last().map(|p| p.price);
                entry.replace_samples(points);
                if let Some(price) = latest {
                    entry.set_current_price(price);
                }
                entry.last_error = None;
                log::info!("{}: 历史回填完成，窗口 {} 点", symbol, entry.len());
            }
            Err(e) => {
                entry.last_error = Some(e.to_string());
                log::warn!("{}: 历史回填失败: {}", symbol, e);
            }
        }
    }

    fn entry_mut(&mut self, symbol: &str) -> &mut PriceSeries {
        let window = self.settings.window;
        self.entries
            .entry(symbol.to_string())
            .or_insert_with(|| PriceSeries::new(symbol, window))
    }

    pub(crate) fn get_current_at(&mut self, symbol: &str, now: Instant) -> Option<f64> {
        let cache_duration = self.settings.cache_duration;

        {
            let entry = self.entry_mut(symbol);
            let fresh = entry
                .last_success
                .map(|t| now.duration_since(t) < cache_duration)
                .unwrap_or(false);
            if fresh {
                return entry.current_price();
            }
        }

        // 同一符号已有抓取在途：合并，直接退回缓存值
        if !self.in_flight.insert(symbol.to_string()) {
            return self.entries.get(symbol).and_then(|s| s.current_price());
        }
        let result = self.provider.fetch_current(symbol);
        self.in_flight.remove(symbol);

        let entry = self.entry_mut(symbol);
        entry.last_attempt = Some(now);

        match result {
            Ok(price) => {
                // 成功路径一次性落账：当前价、采样、成功时刻
                entry.set_current_price(price);
                entry.push_sample(PricePoint::new(Utc::now(), price));
                entry.last_success = Some(now);
                entry.last_error = None;
            }
            Err(e) => {
                // 保留上一个已知值；last_success 不动，下次调用立即重试
                entry.last_error = Some(e.to_string());
                if matches!(e, ProviderError::RateLimited { .. }) {
                    log::warn!("{}: 抓取被限流: {}", symbol, e);
                } else {
                    log::warn!("{}: 抓取失败: {}", symbol, e);
                }
            }
        }

        entry.current_price()
    }

    pub(crate) fn seconds_until_refresh_at(&self, symbol: &str, now: Instant) -> f64 {
        let Some(entry) = self.entries.get(symbol) else {
            return 0.0;
        };
        let Some(attempt) = entry.last_attempt else {
            return 0.0;
        };
        let elapsed = now.duration_since(attempt).as_secs_f64();
        (self.settings.cache_duration.as_secs_f64() - elapsed).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// 可编程的测试数据源：按脚本逐次返回成功或失败
    struct ScriptedProvider {
        script: Vec<Result<f64, ()>>,
        calls: Rc<RefCell<usize>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<f64, ()>>) -> (Self, Rc<RefCell<usize>>) {
            let calls = Rc::new(RefCell::new(0));
            (
                Self {
                    script,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl PriceProvider for ScriptedProvider {
        fn fetch_current(&mut self, symbol: &str) -> Result<f64, ProviderError> {
            let index = *self.calls.borrow();
            *self.calls.borrow_mut() += 1;
            match self.script.get(index) {
                Some(Ok(price)) => Ok(*price),
                Some(Err(())) => Err(ProviderError::Network {
                    message: "scripted failure".to_string(),
                    is_recoverable: true,
                }),
                None => Err(ProviderError::NotFound {
                    symbol: symbol.to_string(),
                }),
            }
        }

        fn fetch_history(
            &mut self,
            _symbol: &str,
            _days: u32,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            Ok(Vec::new())
        }
    }

    fn cache_with(script: Vec<Result<f64, ()>>) -> (PriceSeriesCache, Rc<RefCell<usize>>) {
        let (provider, calls) = ScriptedProvider::new(script);
        let cache = PriceSeriesCache::new(Box::new(provider), CacheSettings::default());
        (cache, calls)
    }

    #[test]
    fn test_fresh_cache_skips_fetch() {
        let (mut cache, calls) = cache_with(vec![Ok(50000.0), Ok(51000.0)]);
        let now = Instant::now();

        assert_eq!(cache.get_current_at("BTC", now), Some(50000.0));
        // 窗口内的第二次调用不抓取
        let soon = now + Duration::from_secs(5);
        assert_eq!(cache.get_current_at("BTC", soon), Some(50000.0));
        assert_eq!(*calls.borrow(), 1);

        // 过期后重新抓取
        let later = now + Duration::from_secs(31);
        assert_eq!(cache.get_current_at("BTC", later), Some(51000.0));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_failure_keeps_last_known_value() {
        // 一次成功 50000，随后连续两次失败
        let (mut cache, calls) = cache_with(vec![Ok(50000.0), Err(()), Err(())]);
        let now = Instant::now();

        assert_eq!(cache.get_current_at("BTC", now), Some(50000.0));

        let t1 = now + Duration::from_secs(40);
        assert_eq!(cache.get_current_at("BTC", t1), Some(50000.0));
        assert!(cache.last_error("BTC").is_some());

        // last_success 未推进：下一次调用立即重试而不是退避
        let t2 = t1 + Duration::from_secs(1);
        assert_eq!(cache.get_current_at("BTC", t2), Some(50000.0));
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn test_success_clears_error() {
        let (mut cache, _) = cache_with(vec![Err(()), Ok(42.0)]);
        let now = Instant::now();

        assert_eq!(cache.get_current_at("BTC", now), None);
        assert!(cache.last_error("BTC").is_some());

        assert_eq!(cache.get_current_at("BTC", now + Duration::from_secs(1)), Some(42.0));
        assert_eq!(cache.last_error("BTC"), None);
    }

    #[test]
    fn test_refresh_all_isolates_failures() {
        struct PerSymbolProvider;
        impl PriceProvider for PerSymbolProvider {
            fn fetch_current(&mut self, symbol: &str) -> Result<f64, ProviderError> {
                if symbol == "BAD" {
                    Err(ProviderError::NotFound {
                        symbol: symbol.to_string(),
                    })
                } else {
                    Ok(7.0)
                }
            }
            fn fetch_history(
                &mut self,
                _symbol: &str,
                _days: u32,
            ) -> Result<Vec<PricePoint>, ProviderError> {
                Ok(Vec::new())
            }
        }

        let mut cache =
            PriceSeriesCache::new(Box::new(PerSymbolProvider), CacheSettings::default());
        let symbols = vec!["GOOD".to_string(), "BAD".to_string(), "ALSO".to_string()];
        cache.refresh_all(&symbols);

        assert_eq!(cache.series("GOOD").unwrap().current_price(), Some(7.0));
        assert_eq!(cache.series("ALSO").unwrap().current_price(), Some(7.0));
        assert_eq!(cache.series("BAD").unwrap().current_price(), None);
        assert!(cache.last_error("BAD").is_some());
    }

    #[test]
    fn test_samples_trimmed_to_window() {
        let script: Vec<Result<f64, ()>> = (0..60).map(|i| Ok(100.0 + i as f64)).collect();
        let (provider, _) = ScriptedProvider::new(script);
        let settings = CacheSettings {
            cache_duration: Duration::from_secs(0),
            window: 56,
            ..Default::default()
        };
        let mut cache = PriceSeriesCache::new(Box::new(provider), settings);

        let mut now = Instant::now();
        for _ in 0..60 {
            cache.get_current_at("BTC", now);
            now += Duration::from_secs(1);
        }
        assert_eq!(cache.get_series("BTC").len(), 56);
        // 队首被裁剪，队尾是最新值
        assert_eq!(*cache.get_series("BTC").last().unwrap(), 159.0);
    }

    #[test]
    fn test_countdown_advances_across_failures() {
        let (mut cache, _) = cache_with(vec![Ok(10.0), Err(())]);
        let now = Instant::now();
        cache.get_current_at("BTC", now);

        let t1 = now + Duration::from_secs(40);
        cache.get_current_at("BTC", t1); // 失败，但 last_attempt 推进
        let remaining = cache.seconds_until_refresh_at("BTC", t1 + Duration::from_secs(10));
        assert!((remaining - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_series_empty_before_any_fetch() {
        let (cache, _) = cache_with(vec![]);
        assert!(cache.get_series("BTC").is_empty());
    }
}

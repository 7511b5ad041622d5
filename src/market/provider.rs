/// 价格数据提供者接口
///
/// 本文件定义价格数据源的统一接口，包括：
/// - PriceProvider：当前价 / 历史序列两个抓取操作的 trait 接口
/// - ProviderError：携带上下文的统一错误类型
/// - SimulatedProvider：±1% 随机游走的模拟数据源，供二进制与测试使用
///
/// 真实的 HTTP 客户端是外部协作者；核心把两个抓取操作都视为
/// 可失败且可能很慢，从不假设成功。"未找到"/"限流" 等条件通过
/// 显式错误值返回给调用方做 UI 级决策，不使用异常式控制流。

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::market::series::PricePoint;

/// Provider 统一错误类型
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 符号不存在
    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    /// 被数据源限流
    #[error("rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// 响应格式不符合预期
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// 网络层错误
    #[error("network error: {message}")]
    Network {
        message: String,
        is_recoverable: bool,
    },
}

/// 价格数据提供者
///
/// `fetch_current` 返回最新成交价；`fetch_history` 返回按时间升序的
/// (时间戳, 价格) 序列。两者都是同步调用，受主循环 tick 预算约束。
pub trait PriceProvider {
    fn fetch_current(&mut self, symbol: &str) -> Result<f64, ProviderError>;

    fn fetch_history(&mut self, symbol: &str, days: u32)
        -> Result<Vec<PricePoint>, ProviderError>;
}

/// 模拟数据源配置
#[derive(Debug, Clone)]
pub struct SimulatedProviderConfig {
    /// 未知符号的初始基准价
    pub base_price: f64,
    /// 单步随机游走幅度（占比，默认 ±1%）
    pub walk_range: f64,
    /// 注入失败的概率 [0,1]，用于演练降级路径
    pub failure_rate: f64,
    /// 历史序列的采样间隔（小时）
    pub sample_interval_hours: i64,
}

impl Default for SimulatedProviderConfig {
    fn default() -> Self {
        Self {
            base_price: 100.0,
            walk_range: 0.01,
            failure_rate: 0.0,
            sample_interval_hours: 3,
        }
    }
}

/// 随机游走模拟数据源
///
/// 每个符号维持自己的最新价，下一口价在上一口价基础上做小幅
/// 随机游走并夹在正值范围内，所有调用方观察到同一条价格路径。
pub struct SimulatedProvider {
    config: SimulatedProviderConfig,
    prices: HashMap<String, f64>,
}

impl SimulatedProvider {
    pub fn new(config: SimulatedProviderConfig) -> Self {
        Self {
            config,
            prices: HashMap::new(),
        }
    }

    fn next_price(&self, current: f64) -> f64 {
        let mut rng = rand::thread_rng();
        let change: f64 = rng.gen_range(-self.config.walk_range..self.config.walk_range);
        (current * (1.0 + change)).max(0.01)
    }

    fn maybe_fail(&self) -> Result<(), ProviderError> {
        if self.config.failure_rate > 0.0 {
            let roll: f64 = rand::thread_rng().gen_range(0.0..1.0);
            if roll < self.config.failure_rate {
                return Err(ProviderError::Network {
                    message: "simulated transport failure".to_string(),
                    is_recoverable: true,
                });
            }
        }
        Ok(())
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(SimulatedProviderConfig::default())
    }
}

impl PriceProvider for SimulatedProvider {
    fn fetch_current(&mut self, symbol: &str) -> Result<f64, ProviderError> {
        if symbol.is_empty() {
            return Err(ProviderError::NotFound {
                symbol: symbol.to_string(),
            });
        }
        self.maybe_fail()?;

        let current = *self
            .prices
            .get(symbol)
            .unwrap_or(&self.config.base_price);
        let next = self.next_price(current);
        self.prices.insert(symbol.to_string(), next);
        Ok(next)
    }

    fn fetch_history(
        &mut self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        if symbol.is_empty() {
            return Err(ProviderError::NotFound {
                symbol: symbol.to_string(),
            });
        }
        self.maybe_fail()?;

        let interval = ChronoDuration::hours(self.config.sample_interval_hours);
        let count = (days as i64 * 24 / self.config.sample_interval_hours).max(2);
        let now = Utc::now();

        let mut price = *self
            .prices
            .get(symbol)
            .unwrap_or(&self.config.base_price);
        let mut points = Vec::with_capacity(count as usize);
        // 从最早的点向现在游走
        for i in (0..count).rev() {
            price = self.next_price(price);
            points.push(PricePoint::new(now - interval * i as i32, price));
        }
        self.prices.insert(symbol.to_string(), price);
        Ok(points)
    }
}

/// 价格序列 - 单个符号的当前价与历史滑动窗口
///
/// 不变量：
/// 1. samples 按时间戳非递减排列
/// 2. 窗口长度有界，超出后从队首裁剪
/// 3. 只由缓存的刷新操作修改，其余位置只读

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 历史采样点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// 单个符号的价格序列
#[derive(Debug)]
pub struct PriceSeries {
    symbol: String,
    current_price: Option<f64>,
    samples: VecDeque<PricePoint>,
    window: usize,
    /// 上一次成功抓取的时刻，驱动新鲜度判定
    pub(crate) last_success: Option<Instant>,
    /// 上一次抓取尝试的时刻（无论成败），驱动刷新倒计时
    pub(crate) last_attempt: Option<Instant>,
    /// 上一次失败的描述；成功后清空
    pub(crate) last_error: Option<String>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, window: usize) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: None,
            samples: VecDeque::with_capacity(window),
            window,
            last_success: None,
            last_attempt: None,
            last_error: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    pub(crate) fn set_current_price(&mut self, price: f64) {
        self.current_price = Some(price);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &PricePoint> {
        self.samples.iter()
    }

    /// 当前窗口的价格值，按时间顺序
    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|p| p.price).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.samples.back()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// 追加一个采样点并维持窗口大小
    ///
    /// 乱序时间戳会被丢弃而不是破坏排序不变量。
    pub(crate) fn push_sample(&mut self, point: PricePoint) {
        if let Some(last) = self.samples.back() {
            if point.timestamp < last.timestamp {
                log::warn!(
                    "{}: 丢弃乱序采样点 {} < {}",
                    self.symbol,
                    point.timestamp,
                    last.timestamp
                );
                return;
            }
        }

        self.samples.push_back(point);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
    }

    /// 用一段历史数据重建窗口（按时间排序后裁剪到窗口大小）
    pub(crate) fn replace_samples(&mut self, mut points: Vec<PricePoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.samples.clear();
        let skip = points.len().saturating_sub(self.window);
        for point in points.into_iter().skip(skip) {
            self.samples.push_back(point);
        }
    }

    /// 24 小时涨跌幅（百分比）
    ///
    /// `samples_per_day` 由部署固定的采样节奏决定（例如 3 小时一采则为 8），
    /// 节奏错了百分比就错了，所以它从配置注入而不是在这里猜测。
    pub fn change_24h(&self, samples_per_day: usize) -> Option<f64> {
        if samples_per_day == 0 || self.samples.len() <= samples_per_day {
            return None;
        }

        let latest = self.samples.back()?.price;
        let base_index = self.samples.len() - 1 - samples_per_day;
        let base = self.samples[base_index].price;
        if base == 0.0 {
            return None;
        }

        Some((latest - base) / base * 100.0)
    }
}

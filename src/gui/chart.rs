/// 价格图表渲染与触摸反查
///
/// 两个职责：
/// 1. layout：把价格序列映射为屏幕空间几何（折线点集 + 价格范围）
/// 2. touch_to_sample：x 映射的精确代数逆，把触摸位置反解为
///    (价格, 时间戳) 采样
///
/// 纯计算，没有自有可变状态；触摸指示器状态由宿主视图持有。

use std::time::Duration;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use crate::gui::geom::{Pos2, Rect};
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};

/// 每次 draw 重新计算的临时几何，从不持久化
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub rect: Rect,
    pub min_price: f64,
    pub max_price: f64,
    pub points: Vec<Pos2>,
}

impl ChartGeometry {
    /// 退化几何：没有可画的内容
    pub fn empty(rect: Rect) -> Self {
        Self {
            rect,
            min_price: 0.0,
            max_price: 0.0,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 图表配置
#[derive(Debug, Clone, Copy)]
pub struct ChartSettings {
    /// 触摸命中容差（像素）
    pub hit_margin_px: f32,
    /// 平坦序列的合成范围系数
    pub flat_range_factor: f64,
    /// 采样间隔，反查时间戳用（与缓存的采样节奏一致）
    pub sample_interval: Duration,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            hit_margin_px: 24.0,
            flat_range_factor: 0.1,
            sample_interval: Duration::from_secs(3 * 3600),
        }
    }
}

/// 图表渲染器
pub struct ChartRenderer {
    settings: ChartSettings,
}

impl ChartRenderer {
    pub fn new(settings: ChartSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// 把价格序列映射为屏幕几何
    ///
    /// 点映射：x = left + i * width / (N-1)
    ///         y = bottom - (price - min) * height / range
    /// 少于 2 个点时返回空几何而不是除零。
    pub fn layout(&self, prices: &[f64], viewport: Rect) -> ChartGeometry {
        let n = prices.len();
        if n < 2 {
            return ChartGeometry::empty(viewport);
        }

        let (min_price, max_price) = self.price_bounds(prices);
        let range = max_price - min_price;

        let width = viewport.width();
        let height = viewport.height();
        let left = viewport.left();
        let bottom = viewport.bottom();

        let points = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let x = left + i as f32 * width / (n - 1) as f32;
                let y = bottom - ((price - min_price) * height as f64 / range) as f32;
                Pos2::new(x, y)
            })
            .collect();

        ChartGeometry {
            rect: viewport,
            min_price,
            max_price,
            points,
        }
    }

    /// 触摸位置反解为采样
    ///
    /// x 映射的精确代数逆：i = round((x - left) * (N-1) / width)，夹在
    /// [0, N-1]；超出图表水平范围返回 None。命中判定不对称：触点到映射
    /// 线点的垂直距离在容差内，或者触点在线的下方（点在曲线"下面"也能
    /// 取值，有意的可用性取舍）。时间戳按均匀间隔、锚定"现在减窗口跨度"
    /// 从序号推出。
    pub fn touch_to_sample(
        &self,
        pos: Pos2,
        prices: &[f64],
        viewport: Rect,
        now: DateTime<Utc>,
    ) -> Option<(f64, DateTime<Utc>)> {
        let n = prices.len();
        if n < 2 {
            return None;
        }
        if pos.x < viewport.left() || pos.x > viewport.right() {
            return None;
        }

        let width = viewport.width();
        let raw = (pos.x - viewport.left()) * (n - 1) as f32 / width;
        let index = (raw.round() as i64).clamp(0, (n - 1) as i64) as usize;

        // 用同一套映射取线上点的 y，保证命中判定与画面一致
        let (min_price, max_price) = self.price_bounds(prices);
        let range = max_price - min_price;
        let line_y =
            viewport.bottom() - ((prices[index] - min_price) * viewport.height() as f64 / range) as f32;

        let hit = (pos.y - line_y).abs() <= self.settings.hit_margin_px || pos.y > line_y;
        if !hit {
            return None;
        }

        let interval = chrono::Duration::from_std(self.settings.sample_interval)
            .unwrap_or_else(|_| chrono::Duration::hours(3));
        let timestamp = now - interval * (n - 1 - index) as i32;
        Some((prices[index], timestamp))
    }

    /// 画折线 + 价格范围标签
    pub fn draw(&self, geometry: &ChartGeometry, frame: &mut RenderFrame) {
        if geometry.is_empty() {
            frame.push(RenderCommand::Text {
                text: "no data".to_string(),
                pos: geometry.rect.center(),
                color: Color::GRAY,
                size: 16.0,
                align: TextAlign::Center,
            });
            return;
        }

        frame.push(RenderCommand::Line {
            points: geometry.points.clone(),
            color: Color::CYAN,
            width: 2.0,
        });
        frame.push(RenderCommand::Text {
            text: format!("{:.2}", geometry.max_price),
            pos: Pos2::new(geometry.rect.left() + 4.0, geometry.rect.top() + 4.0),
            color: Color::GRAY,
            size: 12.0,
            align: TextAlign::Left,
        });
        frame.push(RenderCommand::Text {
            text: format!("{:.2}", geometry.min_price),
            pos: Pos2::new(geometry.rect.left() + 4.0, geometry.rect.bottom() - 16.0),
            color: Color::GRAY,
            size: 12.0,
            align: TextAlign::Left,
        });
    }

    /// 序列的价格范围；平坦序列合成一个非零区间让线落在图中部
    fn price_bounds(&self, prices: &[f64]) -> (f64, f64) {
        let min = prices
            .iter()
            .copied()
            .map(OrderedFloat)
            .min()
            .map(|v| v.0)
            .unwrap_or(0.0);
        let max = prices
            .iter()
            .copied()
            .map(OrderedFloat)
            .max()
            .map(|v| v.0)
            .unwrap_or(0.0);

        if max > min {
            return (min, max);
        }

        // 平坦序列：以数值为中心合成 max * flat_range_factor 的区间，
        // 数值本身为零时退回 1.0
        let mut band = max.abs() * self.settings.flat_range_factor;
        if band == 0.0 {
            band = 1.0;
        }
        (max - band / 2.0, max + band / 2.0)
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartSettings::default())
    }
}

/// 触摸指示器状态，由持有图表的视图拥有
///
/// DOWN 落在图表上时设置，UP 清除；切换视图时由 on_exit 清除。
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchIndicator {
    pub active: bool,
    pub x: f32,
    pub price: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TouchIndicator {
    pub fn set(&mut self, x: f32, price: f64, timestamp: DateTime<Utc>) {
        self.active = true;
        self.x = x;
        self.price = price;
        self.timestamp = Some(timestamp);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

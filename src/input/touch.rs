/// 原始触摸事件模型
///
/// 输入层以归一化坐标（[0,1] 的屏幕占比）上报事件，核心乘以面板
/// 分辨率得到像素坐标。驱动偶尔会上报缺少坐标的异常帧，这类事件
/// 在手势识别中被静默忽略。

use serde::{Deserialize, Serialize};

use crate::gui::geom::{PanelSize, Pos2};

/// 触摸事件阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    /// 手指按下
    Down,
    /// 手指抬起
    Up,
    /// 按下状态中移动
    Motion,
}

/// 归一化触摸坐标，x/y 均为屏幕占比 [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormPos {
    pub x: f32,
    pub y: f32,
}

impl NormPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 转换为面板像素坐标
    pub fn to_pixels(&self, panel: PanelSize) -> Pos2 {
        Pos2::new(self.x * panel.width, self.y * panel.height)
    }
}

/// 单个触摸事件
///
/// 每次处理循环消费一次，不可变。时间戳为输入层时钟的秒数，
/// 手势分类只使用事件时间戳，不读墙上时钟。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// 异常帧可能缺少坐标
    pub pos: Option<NormPos>,
    /// 事件时间戳（秒）
    pub timestamp: f64,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, x: f32, y: f32, timestamp: f64) -> Self {
        Self {
            phase,
            pos: Some(NormPos::new(x, y)),
            timestamp,
        }
    }

    /// 构造缺少坐标的异常帧
    pub fn without_pos(phase: TouchPhase, timestamp: f64) -> Self {
        Self {
            phase,
            pos: None,
            timestamp,
        }
    }

    /// 像素坐标；缺少坐标时为 None
    pub fn pixel_pos(&self, panel: PanelSize) -> Option<Pos2> {
        self.pos.map(|p| p.to_pixels(panel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_conversion() {
        let panel = PanelSize::new(800.0, 480.0);
        let ev = TouchEvent::new(TouchPhase::Down, 0.5, 0.25, 1.0);
        assert_eq!(ev.pixel_pos(panel), Some(Pos2::new(400.0, 120.0)));
    }

    #[test]
    fn test_missing_pos() {
        let panel = PanelSize::default();
        let ev = TouchEvent::without_pos(TouchPhase::Motion, 2.0);
        assert_eq!(ev.pixel_pos(panel), None);
    }

    #[test]
    fn test_event_roundtrip_json() {
        let ev = TouchEvent::new(TouchPhase::Up, 0.1, 0.9, 3.5);
        let json = serde_json::to_string(&ev).unwrap();
        let back: TouchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}

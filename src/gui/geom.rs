/// 屏幕空间几何基础类型
///
/// 显示后端是外部协作者，核心只产出几何数据，因此这里维护一套
/// 最小的像素坐标类型而不依赖任何图形库。

use serde::{Deserialize, Serialize};

/// 二维向量（像素）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 屏幕坐标点（像素，y 轴向下）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pos2 {
    pub x: f32,
    pub y: f32,
}

impl Pos2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 到另一点的欧氏距离
    pub fn distance(&self, other: Pos2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 轴对齐矩形
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Pos2,
    pub max: Pos2,
}

impl Rect {
    pub const fn new(min: Pos2, max: Pos2) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: Pos2, size: Vec2) -> Self {
        Self {
            min,
            max: Pos2::new(min.x + size.x, min.y + size.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// 点是否落在矩形内（含边界）
    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

/// 面板尺寸（固定分辨率，默认 800x480）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: f32,
    pub height: f32,
}

impl PanelSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 整个面板对应的矩形
    pub fn rect(&self) -> Rect {
        Rect::new(Pos2::new(0.0, 0.0), Pos2::new(self.width, self.height))
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self::new(800.0, 480.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(Pos2::new(10.0, 10.0), Pos2::new(20.0, 30.0));
        assert!(rect.contains(Pos2::new(10.0, 10.0)));
        assert!(rect.contains(Pos2::new(15.0, 25.0)));
        assert!(!rect.contains(Pos2::new(9.9, 15.0)));
        assert!(!rect.contains(Pos2::new(15.0, 30.1)));
    }

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::from_min_size(Pos2::new(5.0, 5.0), Vec2::new(100.0, 50.0));
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
        assert_eq!(rect.center(), Pos2::new(55.0, 30.0));
    }

    #[test]
    fn test_pos_distance() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }
}

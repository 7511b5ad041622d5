/// 渲染命令定义
///
/// 核心不直接画像素：视图的 draw 把要画的内容编码为渲染命令推入
/// 帧队列，由外部显示后端消费。命令只携带几何与文本，不携带状态。

use crate::gui::geom::{Pos2, Rect};

/// RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(40, 40, 40);
    pub const GREEN: Color = Color::rgb(0, 200, 80);
    pub const RED: Color = Color::rgb(220, 50, 50);
    pub const CYAN: Color = Color::rgb(0, 180, 200);
    pub const YELLOW: Color = Color::rgb(230, 200, 0);
}

/// 文本对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// 渲染命令
#[derive(Debug, Clone)]
pub enum RenderCommand {
    /// 清屏
    Clear { color: Color },
    /// 填充矩形
    Rect { rect: Rect, fill: Color },
    /// 折线
    Line {
        points: Vec<Pos2>,
        color: Color,
        width: f32,
    },
    /// 文本
    Text {
        text: String,
        pos: Pos2,
        color: Color,
        size: f32,
        align: TextAlign,
    },
    /// 圆点（触摸指示器）
    Circle {
        center: Pos2,
        radius: f32,
        color: Color,
    },
}

/// 一帧的渲染命令队列
///
/// 带容量上限；溢出时丢弃命令并告警，而不是让一帧无限膨胀。
pub struct RenderFrame {
    commands: Vec<RenderCommand>,
    max_capacity: usize,
    dropped: usize,
}

impl RenderFrame {
    pub fn new(max_capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(max_capacity.min(256)),
            max_capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, command: RenderCommand) {
        if self.commands.len() >= self.max_capacity {
            self.dropped += 1;
            return;
        }
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 取走本帧全部命令并复位
    pub fn take(&mut self) -> Vec<RenderCommand> {
        if self.dropped > 0 {
            log::warn!("渲染帧溢出，丢弃 {} 条命令", self.dropped);
            self.dropped = 0;
        }
        std::mem::take(&mut self.commands)
    }
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self::new(4096)
    }
}

/// 显示后端接口（外部协作者）
pub trait DisplayBackend {
    fn present(&mut self, frame: &mut RenderFrame);
}

/// 日志后端：吞掉命令并在 debug 级别记录数量，供无硬件环境使用
pub struct LogBackend;

impl DisplayBackend for LogBackend {
    fn present(&mut self, frame: &mut RenderFrame) {
        let commands = frame.take();
        log::debug!("present: {} 条渲染命令", commands.len());
    }
}

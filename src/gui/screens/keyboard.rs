/// Keyboard 视图 - 符号输入
///
/// 点按键位向有界缓冲追加字符（上限 5，保留大小写），backspace 删除
/// 末位。Done 通过资产列表提交：成功才回 Settings，失败留在本视图
/// 显示错误；Cancel 丢弃缓冲直接返回。

use crate::gui::geom::{PanelSize, Pos2, Rect, Vec2};
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;

/// 输入缓冲上限
pub const MAX_INPUT_LEN: usize = 5;

/// 键位行（字符键）
const KEY_ROWS: [&str; 4] = ["1234567890", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// 键位命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyHit {
    Char(char),
    Backspace,
    Done,
    Cancel,
}

pub struct KeyboardScreen {
    buffer: String,
    error: Option<String>,
}

impl KeyboardScreen {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            error: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// 键盘区：下方 2/3 屏
    fn keyboard_rect(panel: PanelSize) -> Rect {
        Rect::new(
            Pos2::new(0.0, panel.height / 3.0),
            Pos2::new(panel.width, panel.height),
        )
    }

    fn row_rect(panel: PanelSize, row: usize) -> Rect {
        let area = Self::keyboard_rect(panel);
        // 4 行字符键 + 1 行功能键
        let row_h = area.height() / (KEY_ROWS.len() + 1) as f32;
        Rect::from_min_size(
            Pos2::new(area.left(), area.top() + row as f32 * row_h),
            Vec2::new(area.width(), row_h),
        )
    }

    fn key_at(panel: PanelSize, pos: Pos2) -> Option<KeyHit> {
        for (row_index, row) in KEY_ROWS.iter().enumerate() {
            let rect = Self::row_rect(panel, row_index);
            if !rect.contains(pos) {
                continue;
            }
            let key_w = rect.width() / row.len() as f32;
            let col = ((pos.x - rect.left()) / key_w) as usize;
            let col = col.min(row.len() - 1);
            return row.chars().nth(col).map(KeyHit::Char);
        }

        // 功能行：cancel | backspace | done 三等分
        let rect = Self::row_rect(panel, KEY_ROWS.len());
        if rect.contains(pos) {
            let third = rect.width() / 3.0;
            let hit = if pos.x < rect.left() + third {
                KeyHit::Cancel
            } else if pos.x < rect.left() + 2.0 * third {
                KeyHit::Backspace
            } else {
                KeyHit::Done
            };
            return Some(hit);
        }
        None
    }

    fn press(&mut self, hit: KeyHit, ctx: &mut ScreenContext) -> Option<NavAction> {
        match hit {
            KeyHit::Char(c) => {
                if self.buffer.len() < MAX_INPUT_LEN {
                    self.buffer.push(c);
                }
                None
            }
            KeyHit::Backspace => {
                self.buffer.pop();
                None
            }
            KeyHit::Cancel => {
                self.buffer.clear();
                self.error = None;
                Some(NavAction::To(ViewId::Settings))
            }
            KeyHit::Done => match ctx.assets.add(&self.buffer) {
                Ok(_) => {
                    // 新资产立即成为选中项
                    *ctx.selected = ctx.assets.len() - 1;
                    self.buffer.clear();
                    self.error = None;
                    Some(NavAction::To(ViewId::Settings))
                }
                Err(e) => {
                    // 提交失败不离开视图
                    self.error = Some(e.to_string());
                    None
                }
            },
        }
    }
}

impl Default for KeyboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for KeyboardScreen {
    fn view_id(&self) -> ViewId {
        ViewId::Keyboard
    }

    fn on_enter(&mut self, _ctx: &mut ScreenContext) {
        self.buffer.clear();
        self.error = None;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, ctx: &mut ScreenContext) -> Option<NavAction> {
        let panel = ctx.config.panel_size();
        match gesture {
            Gesture::Tap { pos, .. } => {
                let hit = Self::key_at(panel, *pos)?;
                self.press(hit, ctx)
            }
            _ => None,
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        // 输入回显，带下划线占位
        let shown = format!("{:_<width$}", self.buffer, width = MAX_INPUT_LEN);
        frame.push(RenderCommand::Text {
            text: shown,
            pos: Pos2::new(panel.width / 2.0, panel.height / 6.0),
            color: Color::WHITE,
            size: 40.0,
            align: TextAlign::Center,
        });

        if let Some(error) = &self.error {
            frame.push(RenderCommand::Text {
                text: error.clone(),
                pos: Pos2::new(panel.width / 2.0, panel.height / 4.0),
                color: Color::RED,
                size: 16.0,
                align: TextAlign::Center,
            });
        }

        for (row_index, row) in KEY_ROWS.iter().enumerate() {
            let rect = Self::row_rect(panel, row_index);
            let key_w = rect.width() / row.len() as f32;
            for (col, c) in row.chars().enumerate() {
                frame.push(RenderCommand::Text {
                    text: c.to_string(),
                    pos: Pos2::new(
                        rect.left() + (col as f32 + 0.5) * key_w,
                        rect.center().y,
                    ),
                    color: Color::WHITE,
                    size: 20.0,
                    align: TextAlign::Center,
                });
            }
        }

        let action_rect = Self::row_rect(panel, KEY_ROWS.len());
        let third = action_rect.width() / 3.0;
        for (i, label) in ["cancel", "<--", "done"].iter().enumerate() {
            frame.push(RenderCommand::Text {
                text: label.to_string(),
                pos: Pos2::new(
                    action_rect.left() + (i as f32 + 0.5) * third,
                    action_rect.center().y,
                ),
                color: if *label == "done" {
                    Color::GREEN
                } else {
                    Color::WHITE
                },
                size: 20.0,
                align: TextAlign::Center,
            });
        }
    }
}

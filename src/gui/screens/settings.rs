/// Settings 视图 - 资产栅格管理
///
/// 顶部是返回区，下面是 2x4 的资产格子：
/// - 长按（≥ long_press_secs，按下与抬起落在同一格）占用格 → 删除确认浮层
/// - 短按空格子 → 键盘视图新增资产
/// - 短按占用格 → 选中该资产
/// - 双击占用格 → 翻转收藏标记
/// 浮层激活时：点确认删除，点其它任意位置取消。

use crate::gui::geom::{PanelSize, Pos2, Rect, Vec2};
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;

const GRID_COLS: usize = 4;
const GRID_ROWS: usize = 2;
/// 栅格能容纳的资产数
pub const GRID_SLOTS: usize = GRID_COLS * GRID_ROWS;

/// 点击落点归类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellHit {
    Back,
    Slot(usize),
}

pub struct SettingsScreen {
    /// 待确认删除的资产序号
    pending_delete: Option<usize>,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self {
            pending_delete: None,
        }
    }

    fn back_rect(panel: PanelSize) -> Rect {
        Rect::new(Pos2::new(0.0, 0.0), Pos2::new(panel.width, 56.0))
    }

    fn grid_rect(panel: PanelSize) -> Rect {
        Rect::new(Pos2::new(0.0, 56.0), Pos2::new(panel.width, panel.height))
    }

    fn slot_rect(panel: PanelSize, index: usize) -> Rect {
        let grid = Self::grid_rect(panel);
        let cell_w = grid.width() / GRID_COLS as f32;
        let cell_h = grid.height() / GRID_ROWS as f32;
        let col = index % GRID_COLS;
        let row = index / GRID_COLS;
        Rect::from_min_size(
            Pos2::new(
                grid.left() + col as f32 * cell_w,
                grid.top() + row as f32 * cell_h,
            ),
            Vec2::new(cell_w, cell_h),
        )
    }

    fn cell_at(panel: PanelSize, pos: Pos2) -> Option<CellHit> {
        if Self::back_rect(panel).contains(pos) {
            return Some(CellHit::Back);
        }
        for index in 0..GRID_SLOTS {
            if Self::slot_rect(panel, index).contains(pos) {
                return Some(CellHit::Slot(index));
            }
        }
        None
    }

    fn confirm_rect(panel: PanelSize) -> Rect {
        let center = panel.rect().center();
        Rect::new(
            Pos2::new(center.x - 120.0, center.y + 10.0),
            Pos2::new(center.x - 10.0, center.y + 60.0),
        )
    }

    fn handle_overlay_tap(&mut self, pos: Pos2, ctx: &mut ScreenContext) {
        let panel = ctx.config.panel_size();
        if let Some(index) = self.pending_delete.take() {
            if Self::confirm_rect(panel).contains(pos) {
                ctx.assets.remove(index);
                // 选中序号跟着收缩，别指到列表外
                let n = ctx.assets.len();
                if n == 0 {
                    *ctx.selected = 0;
                } else if *ctx.selected >= n {
                    *ctx.selected = n - 1;
                }
            }
            // 落在确认键之外即取消
        }
    }
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SettingsScreen {
    fn view_id(&self) -> ViewId {
        ViewId::Settings
    }

    fn on_exit(&mut self) {
        self.pending_delete = None;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, ctx: &mut ScreenContext) -> Option<NavAction> {
        let panel = ctx.config.panel_size();

        // 浮层优先拦截所有手势
        if self.pending_delete.is_some() {
            if let Gesture::Tap { pos, .. } = gesture {
                self.handle_overlay_tap(*pos, ctx);
            } else {
                self.pending_delete = None;
            }
            return None;
        }

        match gesture {
            Gesture::Tap {
                pos,
                down_pos,
                held_secs,
            } => {
                let hit = Self::cell_at(panel, *pos)?;
                match hit {
                    CellHit::Back => Some(NavAction::To(ViewId::Ticker)),
                    CellHit::Slot(index) => {
                        let occupied = index < ctx.assets.len();
                        let long_press = *held_secs >= ctx.config.gestures.long_press_secs
                            && Self::cell_at(panel, *down_pos) == Some(hit);

                        if occupied && long_press {
                            self.pending_delete = Some(index);
                            None
                        } else if occupied {
                            *ctx.selected = index;
                            None
                        } else {
                            Some(NavAction::To(ViewId::Keyboard))
                        }
                    }
                }
            }
            Gesture::DoubleTap { pos } => {
                if let Some(CellHit::Slot(index)) = Self::cell_at(panel, *pos) {
                    if index < ctx.assets.len() {
                        ctx.assets.toggle_favorite(index);
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        frame.push(RenderCommand::Rect {
            rect: Self::back_rect(panel),
            fill: Color::DARK_GRAY,
        });
        frame.push(RenderCommand::Text {
            text: "< back".to_string(),
            pos: Pos2::new(16.0, 16.0),
            color: Color::WHITE,
            size: 20.0,
            align: TextAlign::Left,
        });

        for index in 0..GRID_SLOTS {
            let rect = Self::slot_rect(panel, index);
            match ctx.assets.get(index) {
                Some(asset) => {
                    let label = if asset.favorite {
                        format!("* {}", asset.symbol)
                    } else {
                        asset.symbol.clone()
                    };
                    frame.push(RenderCommand::Text {
                        text: label,
                        pos: rect.center(),
                        color: if index == *ctx.selected {
                            Color::CYAN
                        } else {
                            Color::WHITE
                        },
                        size: 22.0,
                        align: TextAlign::Center,
                    });
                }
                None => {
                    frame.push(RenderCommand::Text {
                        text: "+".to_string(),
                        pos: rect.center(),
                        color: Color::GRAY,
                        size: 28.0,
                        align: TextAlign::Center,
                    });
                }
            }
        }

        if let Some(index) = self.pending_delete {
            let symbol = ctx
                .assets
                .get(index)
                .map(|a| a.symbol.clone())
                .unwrap_or_default();
            let center = panel.rect().center();
            frame.push(RenderCommand::Rect {
                rect: Rect::new(
                    Pos2::new(center.x - 160.0, center.y - 70.0),
                    Pos2::new(center.x + 160.0, center.y + 70.0),
                ),
                fill: Color::DARK_GRAY,
            });
            frame.push(RenderCommand::Text {
                text: format!("delete {}?", symbol),
                pos: Pos2::new(center.x, center.y - 40.0),
                color: Color::WHITE,
                size: 22.0,
                align: TextAlign::Center,
            });
            frame.push(RenderCommand::Rect {
                rect: Self::confirm_rect(panel),
                fill: Color::RED,
            });
            frame.push(RenderCommand::Text {
                text: "delete".to_string(),
                pos: Self::confirm_rect(panel).center(),
                color: Color::WHITE,
                size: 18.0,
                align: TextAlign::Center,
            });
        }
    }
}

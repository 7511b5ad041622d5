/// Dashboard view - all tracked assets at a glance

use crate::gui::geom::{PanelSize, Pos2, Rect, Vec2};
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;

const HEADER_H: f32 = 48.0;
const ROW_H: f32 = 52.0;

pub struct DashboardScreen;

impl DashboardScreen {
    pub fn new() -> Self {
        Self
    }

    fn row_rect(panel: PanelSize, index: usize) -> Rect {
        Rect::from_min_size(
            Pos2::new(0.0, HEADER_H + index as f32 * ROW_H),
            Vec2::new(panel.width, ROW_H),
        )
    }

    fn row_at(panel: PanelSize, pos: Pos2, count: usize) -> Option<usize> {
        (0..count).find(|i| Self::row_rect(panel, *i).contains(pos))
    }
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for DashboardScreen {
    fn view_id(&self) -> ViewId {
        ViewId::Dashboard
    }

    fn handle_gesture(&mut self, gesture: &Gesture, ctx: &mut ScreenContext) -> Option<NavAction> {
        match gesture {
            Gesture::SwipeUp => Some(NavAction::To(ViewId::News)),
            Gesture::SwipeDown => Some(NavAction::Back),
            Gesture::DoubleTap { .. } => Some(NavAction::To(ViewId::Ticker)),
            Gesture::Tap { pos, .. } => {
                // tapping a row jumps straight to that asset's ticker
                let index = Self::row_at(ctx.config.panel_size(), *pos, ctx.assets.len())?;
                *ctx.selected = index;
                Some(NavAction::To(ViewId::Ticker))
            }
            _ => None,
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        frame.push(RenderCommand::Text {
            text: "dashboard".to_string(),
            pos: Pos2::new(16.0, 14.0),
            color: Color::GRAY,
            size: 18.0,
            align: TextAlign::Left,
        });

        if ctx.assets.is_empty() {
            frame.push(RenderCommand::Text {
                text: "no assets tracked".to_string(),
                pos: panel.rect().center(),
                color: Color::GRAY,
                size: 22.0,
                align: TextAlign::Center,
            });
            return;
        }

        for (index, asset) in ctx.assets.iter().enumerate() {
            let rect = Self::row_rect(panel, index);
            let name = if asset.favorite {
                format!("* {}", asset.symbol)
            } else {
                asset.symbol.clone()
            };
            frame.push(RenderCommand::Text {
                text: name,
                pos: Pos2::new(24.0, rect.center().y),
                color: Color::WHITE,
                size: 22.0,
                align: TextAlign::Left,
            });

            // per-symbol error text instead of a blank cell
            match ctx
                .cache
                .series(&asset.symbol)
                .and_then(|s| s.current_price())
            {
                Some(price) => {
                    frame.push(RenderCommand::Text {
                        text: format!("{:.2}", price),
                        pos: Pos2::new(panel.width * 0.55, rect.center().y),
                        color: Color::WHITE,
                        size: 22.0,
                        align: TextAlign::Right,
                    });
                }
                None => {
                    let text = if ctx.cache.last_error(&asset.symbol).is_some() {
                        "error"
                    } else {
                        "no data"
                    };
                    frame.push(RenderCommand::Text {
                        text: text.to_string(),
                        pos: Pos2::new(panel.width * 0.55, rect.center().y),
                        color: Color::RED,
                        size: 18.0,
                        align: TextAlign::Right,
                    });
                }
            }

            if let Some(change) = ctx.cache.change_24h(&asset.symbol) {
                let color = if change >= 0.0 { Color::GREEN } else { Color::RED };
                frame.push(RenderCommand::Text {
                    text: format!("{:+.2}%", change),
                    pos: Pos2::new(panel.width - 24.0, rect.center().y),
                    color,
                    size: 20.0,
                    align: TextAlign::Right,
                });
            }
        }
    }
}

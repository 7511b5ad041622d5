/// Wallstreet view - scrolling ticker tape
///
/// The tape text is rebuilt from the cache each tick and scrolls left a
/// fixed number of pixels per update while the view is active. Inactive
/// views receive no update calls, so the tape freezes off-screen.

use crate::gui::geom::Pos2;
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;

/// Pixels the tape advances per tick
const SCROLL_STEP: f32 = 4.0;
/// Rough glyph advance used to estimate tape width
const CHAR_W: f32 = 14.0;

pub struct WallstreetScreen {
    offset: f32,
}

impl WallstreetScreen {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    fn tape_text(ctx: &ScreenContext) -> String {
        let mut parts = Vec::with_capacity(ctx.assets.len());
        for asset in ctx.assets.iter() {
            let entry = match ctx
                .cache
                .series(&asset.symbol)
                .and_then(|s| s.current_price())
            {
                Some(price) => match ctx.cache.change_24h(&asset.symbol) {
                    Some(change) => {
                        format!("{} {:.2} ({:+.2}%)", asset.symbol, price, change)
                    }
                    None => format!("{} {:.2}", asset.symbol, price),
                },
                None => format!("{} --", asset.symbol),
            };
            parts.push(entry);
        }
        parts.join("   ·   ")
    }
}

impl Default for WallstreetScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for WallstreetScreen {
    fn view_id(&self) -> ViewId {
        ViewId::Wallstreet
    }

    fn on_exit(&mut self) {
        self.offset = 0.0;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, _ctx: &mut ScreenContext) -> Option<NavAction> {
        match gesture {
            Gesture::SwipeDown => Some(NavAction::Back),
            Gesture::DoubleTap { .. } => Some(NavAction::To(ViewId::Ticker)),
            _ => None,
        }
    }

    fn update(&mut self, ctx: &mut ScreenContext) {
        let tape = Self::tape_text(&*ctx);
        let tape_w = tape.chars().count() as f32 * CHAR_W;
        let panel_w = ctx.config.panel_size().width;

        self.offset += SCROLL_STEP;
        // wrap once the tape has fully left the panel
        if self.offset > tape_w + panel_w {
            self.offset = 0.0;
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        frame.push(RenderCommand::Text {
            text: "wallstreet".to_string(),
            pos: Pos2::new(16.0, 14.0),
            color: Color::GRAY,
            size: 18.0,
            align: TextAlign::Left,
        });

        let tape = Self::tape_text(ctx);
        if tape.is_empty() {
            frame.push(RenderCommand::Text {
                text: "no assets tracked".to_string(),
                pos: panel.rect().center(),
                color: Color::GRAY,
                size: 22.0,
                align: TextAlign::Center,
            });
            return;
        }

        frame.push(RenderCommand::Text {
            text: tape,
            pos: Pos2::new(panel.width - self.offset, panel.height / 2.0),
            color: Color::YELLOW,
            size: 28.0,
            align: TextAlign::Left,
        });
    }
}

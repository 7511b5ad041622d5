/// News view - headline list with paging

use crate::gui::geom::Pos2;
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;

const LINES_PER_PAGE: usize = 8;

pub struct NewsScreen {
    headlines: Vec<String>,
    /// first visible headline index (transient per-view state)
    page_start: usize,
}

impl NewsScreen {
    pub fn new() -> Self {
        Self {
            headlines: Vec::new(),
            page_start: 0,
        }
    }

    /// Feed fetched headlines in; the fetcher itself is an external collaborator
    pub fn set_headlines(&mut self, headlines: Vec<String>) {
        self.headlines = headlines;
        self.page_start = 0;
    }

    fn page_forward(&mut self) {
        if self.page_start + LINES_PER_PAGE < self.headlines.len() {
            self.page_start += LINES_PER_PAGE;
        }
    }

    fn page_back(&mut self) {
        self.page_start = self.page_start.saturating_sub(LINES_PER_PAGE);
    }
}

impl Default for NewsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for NewsScreen {
    fn view_id(&self) -> ViewId {
        ViewId::News
    }

    fn on_exit(&mut self) {
        self.page_start = 0;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, _ctx: &mut ScreenContext) -> Option<NavAction> {
        match gesture {
            Gesture::SwipeUp => Some(NavAction::To(ViewId::Wallstreet)),
            Gesture::SwipeDown => Some(NavAction::Back),
            Gesture::DoubleTap { .. } => Some(NavAction::To(ViewId::Ticker)),
            Gesture::SwipeLeft => {
                self.page_forward();
                None
            }
            Gesture::SwipeRight => {
                self.page_back();
                None
            }
            Gesture::Tap { .. } => None,
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        frame.push(RenderCommand::Text {
            text: "news".to_string(),
            pos: Pos2::new(16.0, 14.0),
            color: Color::GRAY,
            size: 18.0,
            align: TextAlign::Left,
        });

        if self.headlines.is_empty() {
            frame.push(RenderCommand::Text {
                text: "no headlines".to_string(),
                pos: panel.rect().center(),
                color: Color::GRAY,
                size: 22.0,
                align: TextAlign::Center,
            });
            return;
        }

        let line_h = (panel.height - 60.0) / LINES_PER_PAGE as f32;
        for (i, headline) in self
            .headlines
            .iter()
            .skip(self.page_start)
            .take(LINES_PER_PAGE)
            .enumerate()
        {
            frame.push(RenderCommand::Text {
                text: headline.clone(),
                pos: Pos2::new(24.0, 50.0 + i as f32 * line_h),
                color: Color::WHITE,
                size: 18.0,
                align: TextAlign::Left,
            });
        }
    }
}

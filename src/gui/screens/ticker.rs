/// Ticker 视图 - 单资产大屏
///
/// 顶部是符号与当前价，下半屏是历史价格折线图。图表支持触摸取值：
/// DOWN/MOTION 落在图表上时把触点反解为 (价格, 时间戳) 显示在指示
/// 器上，UP 清除。左右滑切换资产（模运算环绕），上滑进 Dashboard，
/// 下滑进 Settings。

use chrono::Utc;

use crate::gui::chart::{ChartRenderer, ChartSettings, TouchIndicator};
use crate::gui::geom::{PanelSize, Pos2, Rect};
use crate::gui::render::{Color, RenderCommand, RenderFrame, TextAlign};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::Gesture;
use crate::input::touch::{TouchEvent, TouchPhase};

pub struct TickerScreen {
    chart: ChartRenderer,
    indicator: TouchIndicator,
}

impl TickerScreen {
    pub fn new(chart_settings: ChartSettings) -> Self {
        Self {
            chart: ChartRenderer::new(chart_settings),
            indicator: TouchIndicator::default(),
        }
    }

    /// 图表视口：下半屏，四周留边
    fn chart_rect(panel: PanelSize) -> Rect {
        Rect::new(
            Pos2::new(20.0, panel.height * 0.40),
            Pos2::new(panel.width - 20.0, panel.height * 0.92),
        )
    }

    fn draw_header(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        let panel = ctx.config.panel_size();

        let Some(symbol) = ctx.selected_symbol() else {
            frame.push(RenderCommand::Text {
                text: "no assets tracked".to_string(),
                pos: Pos2::new(panel.width / 2.0, panel.height / 2.0),
                color: Color::GRAY,
                size: 24.0,
                align: TextAlign::Center,
            });
            return;
        };

        let favorite = ctx
            .assets
            .get(*ctx.selected)
            .map(|a| a.favorite)
            .unwrap_or(false);
        let title = if favorite {
            format!("* {}", symbol)
        } else {
            symbol.clone()
        };
        frame.push(RenderCommand::Text {
            text: title,
            pos: Pos2::new(20.0, 20.0),
            color: Color::WHITE,
            size: 32.0,
            align: TextAlign::Left,
        });

        // 价格：有值画值，失败画错误文案而不是留白
        match ctx.cache.series(&symbol).and_then(|s| s.current_price()) {
            Some(price) => {
                frame.push(RenderCommand::Text {
                    text: format!("{:.2}", price),
                    pos: Pos2::new(panel.width / 2.0, 70.0),
                    color: Color::WHITE,
                    size: 48.0,
                    align: TextAlign::Center,
                });
            }
            None => {
                let text = if ctx.cache.last_error(&symbol).is_some() {
                    "error"
                } else {
                    "no data"
                };
                frame.push(RenderCommand::Text {
                    text: text.to_string(),
                    pos: Pos2::new(panel.width / 2.0, 70.0),
                    color: Color::RED,
                    size: 32.0,
                    align: TextAlign::Center,
                });
            }
        }

        if let Some(change) = ctx.cache.change_24h(&symbol) {
            let color = if change >= 0.0 { Color::GREEN } else { Color::RED };
            frame.push(RenderCommand::Text {
                text: format!("{:+.2}% 24h", change),
                pos: Pos2::new(panel.width / 2.0, 130.0),
                color,
                size: 20.0,
                align: TextAlign::Center,
            });
        }

        // 刷新倒计时：失败也在走，界面不会像挂住
        let remaining = ctx.cache.seconds_until_refresh(&symbol);
        frame.push(RenderCommand::Text {
            text: format!("refresh in {:.0}s", remaining),
            pos: Pos2::new(panel.width - 20.0, panel.height - 24.0),
            color: Color::GRAY,
            size: 14.0,
            align: TextAlign::Right,
        });
    }

    fn draw_indicator(&self, frame: &mut RenderFrame, chart_rect: Rect) {
        if !self.indicator.active {
            return;
        }

        frame.push(RenderCommand::Line {
            points: vec![
                Pos2::new(self.indicator.x, chart_rect.top()),
                Pos2::new(self.indicator.x, chart_rect.bottom()),
            ],
            color: Color::YELLOW,
            width: 1.0,
        });
        frame.push(RenderCommand::Circle {
            center: Pos2::new(self.indicator.x, chart_rect.top() - 8.0),
            radius: 4.0,
            color: Color::YELLOW,
        });

        let label = match self.indicator.timestamp {
            Some(ts) => format!("{:.2} @ {}", self.indicator.price, ts.format("%m-%d %H:%M")),
            None => format!("{:.2}", self.indicator.price),
        };
        frame.push(RenderCommand::Text {
            text: label,
            pos: Pos2::new(chart_rect.center().x, chart_rect.top() - 24.0),
            color: Color::YELLOW,
            size: 16.0,
            align: TextAlign::Center,
        });
    }
}

impl Screen for TickerScreen {
    fn view_id(&self) -> ViewId {
        ViewId::Ticker
    }

    fn on_exit(&mut self) {
        // 切换视图必须复位图表触摸状态
        self.indicator.clear();
    }

    fn handle_gesture(&mut self, gesture: &Gesture, ctx: &mut ScreenContext) -> Option<NavAction> {
        let n = ctx.assets.len();
        match gesture {
            Gesture::SwipeUp => Some(NavAction::To(ViewId::Dashboard)),
            Gesture::SwipeDown => Some(NavAction::To(ViewId::Settings)),
            Gesture::SwipeLeft => {
                // N=0 时短路为无操作，避免模零
                if n > 0 {
                    *ctx.selected = (*ctx.selected + 1) % n;
                }
                None
            }
            Gesture::SwipeRight => {
                if n > 0 {
                    *ctx.selected = (*ctx.selected + n - 1) % n;
                }
                None
            }
            Gesture::Tap { .. } | Gesture::DoubleTap { .. } => None,
        }
    }

    fn handle_touch(&mut self, event: &TouchEvent, pixel: Option<Pos2>, ctx: &mut ScreenContext) {
        match event.phase {
            TouchPhase::Up => self.indicator.clear(),
            TouchPhase::Down | TouchPhase::Motion => {
                let Some(pos) = pixel else { return };
                let chart_rect = Self::chart_rect(ctx.config.panel_size());
                if !chart_rect.contains(pos) {
                    return;
                }
                let Some(symbol) = ctx.selected_symbol() else {
                    return;
                };

                let prices = ctx.cache.get_series(&symbol);
                if let Some((price, timestamp)) =
                    self.chart
                        .touch_to_sample(pos, &prices, chart_rect, Utc::now())
                {
                    self.indicator.set(pos.x, price, timestamp);
                }
            }
        }
    }

    fn update(&mut self, ctx: &mut ScreenContext) {
        // 当前资产首次展示时回填历史窗口
        if let Some(symbol) = ctx.selected_symbol() {
            ctx.cache.ensure_history(&symbol);
        }
    }

    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext) {
        self.draw_header(frame, ctx);

        if let Some(symbol) = ctx.selected_symbol() {
            let chart_rect = Self::chart_rect(ctx.config.panel_size());
            let prices = ctx.cache.get_series(&symbol);
            let geometry = self.chart.layout(&prices, chart_rect);
            self.chart.draw(&geometry, frame);
            self.draw_indicator(frame, chart_rect);
        }
    }
}

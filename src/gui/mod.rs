/// GUI 模块 - 视图、图表与渲染命令
pub mod chart;
pub mod geom;
pub mod render;
pub mod screen;
pub mod screen_manager;
pub mod screens;

pub use chart::{ChartGeometry, ChartRenderer, ChartSettings, TouchIndicator};
pub use geom::{PanelSize, Pos2, Rect, Vec2};
pub use render::{Color, DisplayBackend, LogBackend, RenderCommand, RenderFrame};
pub use screen::{NavAction, Screen, ScreenContext, ViewId};
pub use screen_manager::{ScreenManager, Services};

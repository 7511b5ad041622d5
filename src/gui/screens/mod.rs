/// 六个全屏视图
pub mod dashboard;
pub mod keyboard;
pub mod news;
pub mod settings;
pub mod ticker;
pub mod wallstreet;

pub use dashboard::DashboardScreen;
pub use keyboard::KeyboardScreen;
pub use news::NewsScreen;
pub use settings::SettingsScreen;
pub use ticker::TickerScreen;
pub use wallstreet::WallstreetScreen;

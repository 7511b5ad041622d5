/// 视图抽象
///
/// 提供统一的视图接口，支持：
/// - 生命周期钩子（进入/退出，退出时清理图表触摸状态等瞬态）
/// - 手势处理（返回导航动作驱动视图切换）
/// - 原始触摸透传（图表触摸指示器需要 DOWN/MOTION/UP 本身）
/// - 更新与绘制（只有活跃视图会收到这两个调用）
///
/// 源系统里有两套并行的基类层次，这里合并为一套显式分发的接口。

use crate::assets::AssetStore;
use crate::config::AppConfig;
use crate::gui::geom::Pos2;
use crate::gui::render::RenderFrame;
use crate::input::gesture::Gesture;
use crate::input::touch::TouchEvent;
use crate::market::cache::PriceSeriesCache;

/// 视图标识，封闭集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Ticker,
    Dashboard,
    News,
    Wallstreet,
    Settings,
    Keyboard,
}

impl ViewId {
    /// 配置文件里的视图名解析；未知名字是配置错误，在加载期报出
    pub fn from_name(name: &str) -> Option<ViewId> {
        match name {
            "ticker" => Some(ViewId::Ticker),
            "dashboard" => Some(ViewId::Dashboard),
            "news" => Some(ViewId::News),
            "wallstreet" => Some(ViewId::Wallstreet),
            "settings" => Some(ViewId::Settings),
            "keyboard" => Some(ViewId::Keyboard),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewId::Ticker => "ticker",
            ViewId::Dashboard => "dashboard",
            ViewId::News => "news",
            ViewId::Wallstreet => "wallstreet",
            ViewId::Settings => "settings",
            ViewId::Keyboard => "keyboard",
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 手势处理产出的导航动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// 切换到指定视图
    To(ViewId),
    /// 回到上一个视图（上下文相关，由管理器解析）
    Back,
}

/// 注入给视图的依赖，每次调用由管理器从自身字段临时组装
///
/// 没有隐藏的进程级单例：缓存、资产列表、配置、当前选中序号都在这里。
pub struct ScreenContext<'a> {
    pub cache: &'a mut PriceSeriesCache,
    pub assets: &'a mut AssetStore,
    pub config: &'a AppConfig,
    /// 当前选中资产的序号（跨视图共享的导航状态）
    pub selected: &'a mut usize,
}

impl ScreenContext<'_> {
    /// 当前选中的资产符号；列表为空时为 None
    pub fn selected_symbol(&self) -> Option<String> {
        self.assets.get(*self.selected).map(|a| a.symbol.clone())
    }
}

/// 视图接口
///
/// 切换逻辑是 (当前视图, 手势, 视图瞬态) 的纯函数；除了手势本身携带
/// 的时间信息（双击、长按时长）外不得读墙上时钟。
pub trait Screen {
    fn view_id(&self) -> ViewId;

    /// 进入视图
    fn on_enter(&mut self, _ctx: &mut ScreenContext) {}

    /// 离开视图；必须清掉本视图的瞬态触摸状态
    fn on_exit(&mut self) {}

    /// 处理分类后的手势，可能产出导航动作
    fn handle_gesture(&mut self, gesture: &Gesture, ctx: &mut ScreenContext) -> Option<NavAction>;

    /// 原始触摸事件透传（MOTION 不产生手势但图表指示器需要它）
    fn handle_touch(&mut self, _event: &TouchEvent, _pixel: Option<Pos2>, _ctx: &mut ScreenContext) {
    }

    /// 每 tick 一次的逻辑更新；只有活跃视图会被调用
    fn update(&mut self, _ctx: &mut ScreenContext) {}

    /// 绘制到帧队列；只有活跃视图会被调用
    fn draw(&self, frame: &mut RenderFrame, ctx: &ScreenContext);
}

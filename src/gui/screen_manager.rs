/// 视图管理器 - 负责管理和协调所有视图
///
/// 职责：
/// - 持有活跃视图与上一个视图，驱动视图切换
/// - 把原始触摸事件送进手势识别器，再把手势交给活跃视图的切换表
/// - 每 tick 先按新鲜度刷新所有被跟踪符号，再把 update/draw 只派发
///   给活跃视图（非活跃视图没有后台心跳）
///
/// 依赖全部经构造函数注入；切换到未注册的视图是切换表被写坏的
/// 编程错误，直接 panic 而不是静默忽略。

use std::collections::HashMap;

use crate::assets::AssetStore;
use crate::config::AppConfig;
use crate::gui::render::{Color, RenderCommand, RenderFrame};
use crate::gui::screen::{NavAction, Screen, ScreenContext, ViewId};
use crate::input::gesture::GestureRecognizer;
use crate::input::touch::TouchEvent;
use crate::market::cache::PriceSeriesCache;

/// 注入给视图的共享服务集合
pub struct Services {
    pub cache: PriceSeriesCache,
    pub assets: AssetStore,
    pub config: AppConfig,
    /// 当前选中资产序号（Ticker/Settings/Dashboard 共用）
    pub selected: usize,
}

impl Services {
    fn context(&mut self) -> ScreenContext<'_> {
        ScreenContext {
            cache: &mut self.cache,
            assets: &mut self.assets,
            config: &self.config,
            selected: &mut self.selected,
        }
    }
}

/// 视图状态机
pub struct ScreenManager {
    active: ViewId,
    previous: ViewId,
    screens: HashMap<ViewId, Box<dyn Screen>>,
    recognizer: GestureRecognizer,
    services: Services,
}

impl ScreenManager {
    /// 组装状态机；初始视图取配置的 default_view
    pub fn new(
        services: Services,
        recognizer: GestureRecognizer,
        screens: Vec<Box<dyn Screen>>,
    ) -> Self {
        let mut map: HashMap<ViewId, Box<dyn Screen>> = HashMap::with_capacity(screens.len());
        for screen in screens {
            let id = screen.view_id();
            if map.insert(id, screen).is_some() {
                panic!("view {} registered twice", id);
            }
        }

        let initial = services.config.default_view();
        let mut manager = Self {
            active: initial,
            previous: initial,
            screens: map,
            recognizer,
            services,
        };

        // 注册校验提前到构造期：缺初始视图立即暴露
        let mut ctx = manager.services.context();
        manager
            .screens
            .get_mut(&initial)
            .unwrap_or_else(|| panic!("transition table broken: view {} not registered", initial))
            .on_enter(&mut ctx);
        manager
    }

    pub fn active_view(&self) -> ViewId {
        self.active
    }

    pub fn previous_view(&self) -> ViewId {
        self.previous
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    fn screen_mut(&mut self, id: ViewId) -> &mut Box<dyn Screen> {
        self.screens
            .get_mut(&id)
            .unwrap_or_else(|| panic!("transition table broken: view {} not registered", id))
    }

    /// 处理一个原始触摸事件
    ///
    /// 事件先透传给活跃视图（图表触摸指示器要看 DOWN/MOTION/UP 本身），
    /// 识别出手势后再查活跃视图的切换表。
    pub fn handle_event(&mut self, event: &TouchEvent) {
        let panel = self.services.config.panel_size();
        let gesture = self.recognizer.classify(event, panel);
        let pixel = event.pixel_pos(panel);

        let screen = self
            .screens
            .get_mut(&self.active)
            .unwrap_or_else(|| panic!("transition table broken: view not registered"));
        let mut ctx = self.services.context();
        screen.handle_touch(event, pixel, &mut ctx);

        if let Some(gesture) = gesture {
            log::debug!("{}: 手势 {:?}", self.active, gesture);
            let nav = screen.handle_gesture(&gesture, &mut ctx);
            drop(ctx);
            if let Some(nav) = nav {
                self.apply(nav);
            }
        }
    }

    /// 应用一个导航动作
    fn apply(&mut self, nav: NavAction) {
        let target = match nav {
            NavAction::To(view) => view,
            NavAction::Back => self.previous,
        };
        self.switch_to(target);
    }

    /// 切换视图；目标等于当前视图时是无操作（幂等）
    pub fn switch_to(&mut self, target: ViewId) {
        if target == self.active {
            return;
        }

        // 未注册的目标在这里炸出来，而不是把状态机切进不存在的视图
        if !self.screens.contains_key(&target) {
            panic!("transition table broken: view {} not registered", target);
        }

        self.screen_mut(self.active).on_exit();
        self.previous = self.active;
        self.active = target;

        let screen = self.screens.get_mut(&target).expect("registration checked");
        let mut ctx = self.services.context();
        screen.on_enter(&mut ctx);
        log::info!("视图切换 {} -> {}", self.previous, self.active);
    }

    /// 每 tick 一次：按新鲜度刷新数据，再更新活跃视图
    pub fn update(&mut self) {
        let symbols = self.services.assets.symbols();
        self.services.cache.refresh_all(&symbols);

        let screen = self
            .screens
            .get_mut(&self.active)
            .unwrap_or_else(|| panic!("transition table broken: view not registered"));
        let mut ctx = self.services.context();
        screen.update(&mut ctx);
    }

    /// 绘制活跃视图到帧队列
    pub fn draw(&mut self, frame: &mut RenderFrame) {
        frame.push(RenderCommand::Clear {
            color: Color::BLACK,
        });

        let screen = self
            .screens
            .get(&self.active)
            .unwrap_or_else(|| panic!("transition table broken: view not registered"));
        let ctx = self.services.context();
        screen.draw(frame, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::gui::screen::Screen;
    use crate::input::gesture::{Gesture, GestureSettings};
    use crate::market::cache::CacheSettings;
    use crate::market::provider::SimulatedProvider;

    /// 探针视图：记录 update/draw/进出次数
    struct ProbeScreen {
        id: ViewId,
        nav: Option<NavAction>,
        updates: Rc<Cell<usize>>,
        draws: Rc<Cell<usize>>,
        enters: Rc<Cell<usize>>,
        exits: Rc<Cell<usize>>,
    }

    #[derive(Clone, Default)]
    struct ProbeCounters {
        updates: Rc<Cell<usize>>,
        draws: Rc<Cell<usize>>,
        enters: Rc<Cell<usize>>,
        exits: Rc<Cell<usize>>,
    }

    impl ProbeScreen {
        fn new(id: ViewId, nav: Option<NavAction>) -> (Box<dyn Screen>, ProbeCounters) {
            let counters = ProbeCounters::default();
            (
                Box::new(Self {
                    id,
                    nav,
                    updates: counters.updates.clone(),
                    draws: counters.draws.clone(),
                    enters: counters.enters.clone(),
                    exits: counters.exits.clone(),
                }),
                counters,
            )
        }
    }

    impl Screen for ProbeScreen {
        fn view_id(&self) -> ViewId {
            self.id
        }

        fn on_enter(&mut self, _ctx: &mut ScreenContext) {
            self.enters.set(self.enters.get() + 1);
        }

        fn on_exit(&mut self) {
            self.exits.set(self.exits.get() + 1);
        }

        fn handle_gesture(
            &mut self,
            _gesture: &Gesture,
            _ctx: &mut ScreenContext,
        ) -> Option<NavAction> {
            self.nav
        }

        fn update(&mut self, _ctx: &mut ScreenContext) {
            self.updates.set(self.updates.get() + 1);
        }

        fn draw(&self, frame: &mut RenderFrame, _ctx: &ScreenContext) {
            self.draws.set(self.draws.get() + 1);
            frame.push(RenderCommand::Clear {
                color: Color::BLACK,
            });
        }
    }

    fn services() -> Services {
        Services {
            cache: PriceSeriesCache::new(
                Box::new(SimulatedProvider::default()),
                CacheSettings::default(),
            ),
            assets: AssetStore::in_memory(),
            config: AppConfig::default(),
            selected: 0,
        }
    }

    fn manager_with_probes() -> (ScreenManager, ProbeCounters, ProbeCounters) {
        let (ticker, ticker_counters) =
            ProbeScreen::new(ViewId::Ticker, Some(NavAction::To(ViewId::Dashboard)));
        let (dashboard, dashboard_counters) = ProbeScreen::new(ViewId::Dashboard, None);
        let manager = ScreenManager::new(
            services(),
            GestureRecognizer::new(GestureSettings::default()),
            vec![ticker, dashboard],
        );
        (manager, ticker_counters, dashboard_counters)
    }

    #[test]
    fn test_initial_view_from_config() {
        let (manager, ticker_counters, _) = manager_with_probes();
        assert_eq!(manager.active_view(), ViewId::Ticker);
        assert_eq!(ticker_counters.enters.get(), 1);
    }

    #[test]
    fn test_update_and_draw_reach_only_active_view() {
        let (mut manager, ticker_counters, dashboard_counters) = manager_with_probes();

        manager.update();
        let mut frame = RenderFrame::default();
        manager.draw(&mut frame);

        assert_eq!(ticker_counters.updates.get(), 1);
        assert_eq!(ticker_counters.draws.get(), 1);
        // 非活跃视图没有后台心跳
        assert_eq!(dashboard_counters.updates.get(), 0);
        assert_eq!(dashboard_counters.draws.get(), 0);

        manager.switch_to(ViewId::Dashboard);
        manager.update();
        manager.draw(&mut frame);
        assert_eq!(ticker_counters.updates.get(), 1);
        assert_eq!(dashboard_counters.updates.get(), 1);
        assert_eq!(dashboard_counters.draws.get(), 1);
    }

    #[test]
    fn test_switch_idempotent() {
        let (mut manager, ticker_counters, dashboard_counters) = manager_with_probes();

        manager.switch_to(ViewId::Dashboard);
        assert_eq!(manager.active_view(), ViewId::Dashboard);
        assert_eq!(manager.previous_view(), ViewId::Ticker);

        // 再切一次同一个视图：状态与只切一次完全相同
        manager.switch_to(ViewId::Dashboard);
        assert_eq!(manager.active_view(), ViewId::Dashboard);
        assert_eq!(manager.previous_view(), ViewId::Ticker);
        assert_eq!(dashboard_counters.enters.get(), 1);
        assert_eq!(ticker_counters.exits.get(), 1);
    }

    #[test]
    fn test_back_returns_to_previous() {
        let (mut manager, _, _) = manager_with_probes();
        manager.switch_to(ViewId::Dashboard);
        manager.apply(NavAction::Back);
        assert_eq!(manager.active_view(), ViewId::Ticker);
        assert_eq!(manager.previous_view(), ViewId::Dashboard);
    }

    #[test]
    #[should_panic(expected = "transition table broken")]
    fn test_unregistered_view_panics() {
        let (mut manager, _, _) = manager_with_probes();
        manager.switch_to(ViewId::Keyboard);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let (a, _) = ProbeScreen::new(ViewId::Ticker, None);
        let (b, _) = ProbeScreen::new(ViewId::Ticker, None);
        ScreenManager::new(
            services(),
            GestureRecognizer::new(GestureSettings::default()),
            vec![a, b],
        );
    }

    #[test]
    fn test_gesture_drives_transition() {
        use crate::input::touch::{TouchEvent, TouchPhase};

        let (mut manager, _, _) = manager_with_probes();
        // 一次点击：探针 Ticker 视图对任意手势都返回 To(Dashboard)
        manager.handle_event(&TouchEvent::new(TouchPhase::Down, 0.5, 0.5, 1.0));
        assert_eq!(manager.active_view(), ViewId::Ticker);
        manager.handle_event(&TouchEvent::new(TouchPhase::Up, 0.5, 0.5, 1.1));
        assert_eq!(manager.active_view(), ViewId::Dashboard);
    }
}

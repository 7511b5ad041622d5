/// 手势识别器
///
/// 将原始触摸事件流归类为离散手势，包括：
/// - Tap / DoubleTap：按下-抬起配对，双击按时间窗口 + 同一点击区域判定
/// - SwipeUp / SwipeDown / SwipeLeft / SwipeRight：按下-抬起位移超过阈值
///
/// 约定：
/// 1. 只跟踪一个触点；第二个并发 DOWN 直接覆盖跟踪状态（last-writer-wins）
/// 2. 时间基准是事件时间戳而不是墙上时钟，回放与测试完全可复现
/// 3. UP 无论是否识别出手势都会清空跟踪状态，不会卡在"按住"状态
/// 4. 缺少坐标的异常帧被忽略，不产生手势也不修改状态

use crate::gui::geom::{PanelSize, Pos2};
use crate::input::touch::{TouchEvent, TouchPhase};

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// 单击。携带按下/抬起位置与按住时长，长按判定由宿主视图完成
    Tap {
        pos: Pos2,
        down_pos: Pos2,
        held_secs: f64,
    },
    /// 双击
    DoubleTap { pos: Pos2 },
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
}

/// 手势阈值配置
///
/// 唯一的一套规范阈值，滑动判定只存在于识别器中。
#[derive(Debug, Clone, Copy)]
pub struct GestureSettings {
    /// 双击时间窗口（秒）
    pub double_tap_window: f64,
    /// 滑动阈值，面板对应维度的占比
    pub swipe_threshold: f32,
    /// 双击的同一点击区域半径（像素）
    pub tap_region_px: f32,
    /// 长按时长（秒），由 Settings 视图消费
    pub long_press_secs: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            double_tap_window: 0.3,
            swipe_threshold: 0.15,
            tap_region_px: 60.0,
            long_press_secs: 0.5,
        }
    }
}

/// 手势识别器状态机
///
/// 状态只由自身的事件处理修改；UP 或识别出手势后回到初始状态。
pub struct GestureRecognizer {
    settings: GestureSettings,
    /// 上一次 DOWN 的时间戳，用于双击窗口
    last_tap_time: f64,
    /// 上一次 DOWN 的像素位置，用于同一点击区域判定
    last_tap_pos: Option<Pos2>,
    /// 当前按压的起点（像素位置 + 按下时间戳）
    origin: Option<(Pos2, f64)>,
    /// 最近一次触点的像素位置（MOTION 更新，供图表触摸指示器消费）
    live_touch: Option<Pos2>,
}

impl GestureRecognizer {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            last_tap_time: f64::NEG_INFINITY,
            last_tap_pos: None,
            origin: None,
            live_touch: None,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// 当前活跃触点位置；没有按压时为 None
    pub fn live_touch(&self) -> Option<Pos2> {
        self.live_touch
    }

    /// 分类一个触摸事件
    ///
    /// DOWN 单独不产生终结手势（双击除外），UP 终结一次按压并产出
    /// Tap 或方向滑动。滑动判定严格大于阈值，恰好等于阈值按 Tap 处理。
    pub fn classify(&mut self, event: &TouchEvent, panel: PanelSize) -> Option<Gesture> {
        // 异常帧：不产生手势，不修改状态
        let pos = event.pixel_pos(panel)?;

        match event.phase {
            TouchPhase::Down => self.on_down(pos, event.timestamp),
            TouchPhase::Motion => {
                self.live_touch = Some(pos);
                None
            }
            TouchPhase::Up => self.on_up(pos, event.timestamp, panel),
        }
    }

    fn on_down(&mut self, pos: Pos2, timestamp: f64) -> Option<Gesture> {
        let within_window = timestamp - self.last_tap_time < self.settings.double_tap_window;
        let same_region = self
            .last_tap_pos
            .map(|prev| prev.distance(pos) <= self.settings.tap_region_px)
            .unwrap_or(false);

        self.live_touch = Some(pos);

        if within_window && same_region {
            // 双击立即产出并复位，第三次快速点击不会再次命中同一个首击
            self.last_tap_time = f64::NEG_INFINITY;
            self.last_tap_pos = None;
            self.origin = None;
            return Some(Gesture::DoubleTap { pos });
        }

        self.last_tap_time = timestamp;
        self.last_tap_pos = Some(pos);
        self.origin = Some((pos, timestamp));
        None
    }

    fn on_up(&mut self, pos: Pos2, timestamp: f64, panel: PanelSize) -> Option<Gesture> {
        let origin = self.origin.take();
        self.live_touch = None;

        let (origin_pos, down_time) = origin?;

        // d = 起点 - 终点：手指上移时垂直分量为正
        let dy = origin_pos.y - pos.y;
        let dx = origin_pos.x - pos.x;
        let v_threshold = panel.height * self.settings.swipe_threshold;
        let h_threshold = panel.width * self.settings.swipe_threshold;

        if dy.abs() > v_threshold {
            return Some(if dy > 0.0 {
                Gesture::SwipeUp
            } else {
                Gesture::SwipeDown
            });
        }

        if dx.abs() > h_threshold {
            return Some(if dx > 0.0 {
                Gesture::SwipeLeft
            } else {
                Gesture::SwipeRight
            });
        }

        Some(Gesture::Tap {
            pos,
            down_pos: origin_pos,
            held_secs: timestamp - down_time,
        })
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::touch::TouchEvent;

    const PANEL: PanelSize = PanelSize::new(800.0, 480.0);

    fn down(x: f32, y: f32, t: f64) -> TouchEvent {
        TouchEvent::new(TouchPhase::Down, x, y, t)
    }

    fn up(x: f32, y: f32, t: f64) -> TouchEvent {
        TouchEvent::new(TouchPhase::Up, x, y, t)
    }

    #[test]
    fn test_tap() {
        let mut rec = GestureRecognizer::default();
        assert_eq!(rec.classify(&down(0.5, 0.5, 1.0), PANEL), None);
        match rec.classify(&up(0.5, 0.5, 1.1), PANEL) {
            Some(Gesture::Tap { held_secs, .. }) => {
                assert!((held_secs - 0.1).abs() < 1e-9);
            }
            other => panic!("expected Tap, got {:?}", other),
        }
    }

    #[test]
    fn test_double_tap_fires_once_and_resets() {
        let mut rec = GestureRecognizer::default();

        // 第一对 DOWN/UP
        assert_eq!(rec.classify(&down(0.5, 0.5, 1.0), PANEL), None);
        assert!(matches!(
            rec.classify(&up(0.5, 0.5, 1.05), PANEL),
            Some(Gesture::Tap { .. })
        ));

        // 窗口内的第二次 DOWN 立即产出双击
        assert!(matches!(
            rec.classify(&down(0.5, 0.5, 1.2), PANEL),
            Some(Gesture::DoubleTap { .. })
        ));
        // 双击后的 UP 不再产出手势
        assert_eq!(rec.classify(&up(0.5, 0.5, 1.25), PANEL), None);

        // 第三次快速点击不会与第一次错误配对，只是普通 Tap
        assert_eq!(rec.classify(&down(0.5, 0.5, 1.3), PANEL), None);
        assert!(matches!(
            rec.classify(&up(0.5, 0.5, 1.35), PANEL),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_double_tap_requires_same_region() {
        let mut rec = GestureRecognizer::default();
        rec.classify(&down(0.1, 0.1, 1.0), PANEL);
        rec.classify(&up(0.1, 0.1, 1.05), PANEL);

        // 窗口内但落点远离上一次点击，不构成双击
        assert_eq!(rec.classify(&down(0.9, 0.9, 1.2), PANEL), None);
    }

    #[test]
    fn test_swipe_directions() {
        let mut rec = GestureRecognizer::default();

        rec.classify(&down(0.5, 0.8, 1.0), PANEL);
        assert_eq!(rec.classify(&up(0.5, 0.2, 1.2), PANEL), Some(Gesture::SwipeUp));

        rec.classify(&down(0.5, 0.2, 2.0), PANEL);
        assert_eq!(
            rec.classify(&up(0.5, 0.8, 2.2), PANEL),
            Some(Gesture::SwipeDown)
        );

        rec.classify(&down(0.8, 0.5, 3.0), PANEL);
        assert_eq!(
            rec.classify(&up(0.2, 0.5, 3.2), PANEL),
            Some(Gesture::SwipeLeft)
        );

        rec.classify(&down(0.2, 0.5, 4.0), PANEL);
        assert_eq!(
            rec.classify(&up(0.8, 0.5, 4.2), PANEL),
            Some(Gesture::SwipeRight)
        );
    }

    #[test]
    fn test_swipe_threshold_is_exclusive() {
        // 用二进制精确的阈值 0.25 测边界：480 * 0.25 = 120px，无舍入
        let mut rec = GestureRecognizer::new(GestureSettings {
            swipe_threshold: 0.25,
            ..GestureSettings::default()
        });

        // 位移恰好等于阈值：不是滑动（严格大于才算）
        rec.classify(&down(0.5, 0.5, 1.0), PANEL);
        assert!(matches!(
            rec.classify(&up(0.5, 0.75, 1.2), PANEL),
            Some(Gesture::Tap { .. })
        ));

        // 明确越过阈值就是滑动
        rec.classify(&down(0.5, 0.5, 2.0), PANEL);
        assert_eq!(
            rec.classify(&up(0.5, 0.78, 2.2), PANEL),
            Some(Gesture::SwipeDown)
        );
    }

    #[test]
    fn test_default_threshold_fraction() {
        // 规范阈值集中的滑动占比
        assert_eq!(GestureSettings::default().swipe_threshold, 0.15);
        assert_eq!(GestureSettings::default().double_tap_window, 0.3);
    }

    #[test]
    fn test_vertical_wins_over_horizontal() {
        let mut rec = GestureRecognizer::default();
        // 两个方向都超阈值时垂直优先
        rec.classify(&down(0.1, 0.1, 1.0), PANEL);
        assert_eq!(
            rec.classify(&up(0.9, 0.9, 1.3), PANEL),
            Some(Gesture::SwipeDown)
        );
    }

    #[test]
    fn test_missing_coordinates_are_inert() {
        let mut rec = GestureRecognizer::default();
        rec.classify(&down(0.5, 0.5, 1.0), PANEL);

        let broken = TouchEvent::without_pos(TouchPhase::Up, 1.1);
        assert_eq!(rec.classify(&broken, PANEL), None);

        // 状态未被破坏，正常 UP 仍然终结本次按压
        assert!(matches!(
            rec.classify(&up(0.5, 0.5, 1.2), PANEL),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_second_down_overwrites_tracking() {
        let mut rec = GestureRecognizer::default();
        rec.classify(&down(0.1, 0.8, 1.0), PANEL);
        // 第二个 DOWN 覆盖起点（相隔较远，不构成双击）
        rec.classify(&down(0.8, 0.8, 2.0), PANEL);

        // 位移按第二个起点计算：没有位移，是 Tap 而不是滑动
        assert!(matches!(
            rec.classify(&up(0.8, 0.8, 2.1), PANEL),
            Some(Gesture::Tap { .. })
        ));
    }

    #[test]
    fn test_up_without_down_is_ignored() {
        let mut rec = GestureRecognizer::default();
        assert_eq!(rec.classify(&up(0.5, 0.5, 1.0), PANEL), None);
    }

    #[test]
    fn test_motion_updates_live_touch_only() {
        let mut rec = GestureRecognizer::default();
        rec.classify(&down(0.5, 0.5, 1.0), PANEL);
        let motion = TouchEvent::new(TouchPhase::Motion, 0.25, 0.5, 1.05);
        assert_eq!(rec.classify(&motion, PANEL), None);
        assert_eq!(rec.live_touch(), Some(Pos2::new(200.0, 240.0)));

        // UP 后活跃触点清空
        rec.classify(&up(0.25, 0.5, 1.1), PANEL);
        assert_eq!(rec.live_touch(), None);
    }
}

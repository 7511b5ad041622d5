/// 输入模块 - 触摸事件、手势识别与回放
pub mod gesture;
pub mod replay;
pub mod touch;

pub use gesture::{Gesture, GestureRecognizer, GestureSettings};
pub use replay::{IdleSource, ReplaySource, TouchSource};
pub use touch::{NormPos, TouchEvent, TouchPhase};

/// 触摸事件回放源
///
/// 开发机上没有触摸面板时，用录制好的 JSONL 文件驱动整个界面：
/// 每行一个 TouchEvent，时间戳相对录制起点。回放按主循环时钟推进，
/// 到点的事件一次性吐出，保持录制时的到达顺序。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::input::touch::TouchEvent;

/// 触摸事件来源（外部输入层的接口）
pub trait TouchSource {
    /// 取出本 tick 到点的全部事件，按到达顺序
    fn poll(&mut self) -> Vec<TouchEvent>;

    /// 事件流是否已经结束（空闲源永不结束）
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// 空闲源：没有事件，循环只做刷新与绘制
pub struct IdleSource;

impl TouchSource for IdleSource {
    fn poll(&mut self) -> Vec<TouchEvent> {
        Vec::new()
    }
}

/// JSONL 录制回放源
pub struct ReplaySource {
    /// 未吐出的事件，时间戳升序
    pending: Vec<TouchEvent>,
    /// 回放起点
    started: Instant,
    /// 播放速度倍率（1.0 = 实时）
    speed: f64,
}

impl ReplaySource {
    /// 从 JSONL 文件加载；坏行跳过并告警，不拖垮整个回放
    pub fn from_file<P: AsRef<Path>>(path: P, speed: f64) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TouchEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    log::warn!("回放文件第 {} 行损坏，跳过: {}", line_no + 1, e);
                }
            }
        }
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Ok(Self {
            pending: events,
            started: Instant::now(),
            speed: if speed > 0.0 { speed } else { 1.0 },
        })
    }

    #[cfg(test)]
    fn from_events(events: Vec<TouchEvent>, started: Instant, speed: f64) -> Self {
        Self {
            pending: events,
            started,
            speed,
        }
    }

    fn due_count(&self, now: Instant) -> usize {
        let elapsed = now.duration_since(self.started).as_secs_f64() * self.speed;
        self.pending
            .iter()
            .take_while(|e| e.timestamp <= elapsed)
            .count()
    }
}

impl TouchSource for ReplaySource {
    fn poll(&mut self) -> Vec<TouchEvent> {
        let due = self.due_count(Instant::now());
        self.pending.drain(..due).collect()
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

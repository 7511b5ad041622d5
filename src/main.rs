/// tick_sight - 触摸屏行情面板
///
/// 主循环：每 tick 按到达顺序排空触摸事件 → 一次 update →
/// 一次 draw → 睡到下一个 tick。没有触摸硬件时可以用
/// `--replay <file>` 回放录制的 JSONL 事件流。

use std::env;
use std::time::{Duration, Instant};

use tick_sight::config::AppConfig;
use tick_sight::gui::render::{DisplayBackend, LogBackend, RenderFrame};
use tick_sight::gui::screen_manager::{ScreenManager, Services};
use tick_sight::gui::screens::{
    DashboardScreen, KeyboardScreen, NewsScreen, SettingsScreen, TickerScreen, WallstreetScreen,
};
use tick_sight::gui::ChartSettings;
use tick_sight::input::replay::{IdleSource, ReplaySource, TouchSource};
use tick_sight::input::GestureRecognizer;
use tick_sight::market::cache::PriceSeriesCache;
use tick_sight::market::provider::SimulatedProvider;
use tick_sight::AssetStore;

/// 命令行参数
struct CliArgs {
    config_path: String,
    replay_path: Option<String>,
    replay_speed: f64,
}

fn parse_args() -> CliArgs {
    let mut args = CliArgs {
        config_path: "tick_sight.toml".to_string(),
        replay_path: None,
        replay_speed: 1.0,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(path) = iter.next() {
                    args.config_path = path;
                }
            }
            "--replay" => {
                args.replay_path = iter.next();
            }
            "--replay-speed" => {
                if let Some(v) = iter.next() {
                    args.replay_speed = v.parse().unwrap_or(1.0);
                }
            }
            other => {
                eprintln!("unknown argument: {}", other);
            }
        }
    }
    args
}

fn main() {
    let args = parse_args();
    let config = AppConfig::load_or_default(&args.config_path);
    tick_sight::init_logging(&config.system.log_file, &config.system.log_level);
    log::info!("tick_sight {} 启动", tick_sight::VERSION);

    // 依赖组装：数据源 → 缓存 → 资产列表 → 视图 → 状态机
    let provider = SimulatedProvider::default();
    let cache = PriceSeriesCache::new(Box::new(provider), config.cache_settings());
    let assets = AssetStore::load(&config.market.assets_file);

    let chart_settings = ChartSettings {
        hit_margin_px: config.gestures.chart_hit_margin_px,
        sample_interval: config.cache_settings().sample_interval,
        ..Default::default()
    };
    let recognizer = GestureRecognizer::new(config.gesture_settings());

    let tick_period = config.tick_period();
    let services = Services {
        cache,
        assets,
        config,
        selected: 0,
    };
    let mut manager = ScreenManager::new(
        services,
        recognizer,
        vec![
            Box::new(TickerScreen::new(chart_settings)),
            Box::new(DashboardScreen::new()),
            Box::new(NewsScreen::new()),
            Box::new(WallstreetScreen::new()),
            Box::new(SettingsScreen::new()),
            Box::new(KeyboardScreen::new()),
        ],
    );

    let mut source: Box<dyn TouchSource> = match &args.replay_path {
        Some(path) => match ReplaySource::from_file(path, args.replay_speed) {
            Ok(replay) => {
                log::info!("回放模式: {}", path);
                Box::new(replay)
            }
            Err(e) => {
                log::warn!("回放文件打开失败，退回空闲源: {}", e);
                Box::new(IdleSource)
            }
        },
        None => Box::new(IdleSource),
    };
    let replaying = args.replay_path.is_some();

    let mut backend = LogBackend;
    let mut frame = RenderFrame::default();

    loop {
        let tick_start = Instant::now();

        // 排空本 tick 的触摸事件，严格按到达顺序处理
        for event in source.poll() {
            manager.handle_event(&event);
        }

        manager.update();
        manager.draw(&mut frame);
        backend.present(&mut frame);

        // 回放结束即退出；真实面板由外部退出信号终止进程
        if replaying && source.is_exhausted() {
            log::info!("回放结束，退出");
            break;
        }

        let elapsed = tick_start.elapsed();
        if elapsed < tick_period {
            std::thread::sleep(tick_period - elapsed);
        }
    }
}

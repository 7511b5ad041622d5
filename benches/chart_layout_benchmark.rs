use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tick_sight::gui::chart::ChartRenderer;
use tick_sight::gui::geom::{Pos2, Rect};

fn window_prices(n: usize) -> Vec<f64> {
    // 确定性的锯齿序列，足够代表真实窗口的形状
    (0..n)
        .map(|i| 50000.0 + ((i * 37) % 101) as f64 - 50.0)
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let chart = ChartRenderer::default();
    let viewport = Rect::new(Pos2::new(20.0, 192.0), Pos2::new(780.0, 441.0));
    let prices = window_prices(56);

    c.bench_function("chart_layout_56", |b| {
        b.iter(|| chart.layout(black_box(&prices), black_box(viewport)))
    });

    let big = window_prices(2000);
    c.bench_function("chart_layout_2000", |b| {
        b.iter(|| chart.layout(black_box(&big), black_box(viewport)))
    });
}

fn bench_touch_lookup(c: &mut Criterion) {
    let chart = ChartRenderer::default();
    let viewport = Rect::new(Pos2::new(20.0, 192.0), Pos2::new(780.0, 441.0));
    let prices = window_prices(56);
    let now = Utc::now();

    c.bench_function("touch_to_sample", |b| {
        b.iter(|| {
            chart.touch_to_sample(
                black_box(Pos2::new(400.0, 430.0)),
                black_box(&prices),
                black_box(viewport),
                now,
            )
        })
    });
}

criterion_group!(benches, bench_layout, bench_touch_lookup);
criterion_main!(benches);

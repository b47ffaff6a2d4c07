use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_canvas::core::{Compositor, Grid, Pixel, Sprite};
use tui_canvas::term::{BaselineEngine, DebugEngine, DiffEngine, MemoryConsole, RenderEngine};
use tui_canvas::types::{Anchor, Color, ColorSet, IntVector};

fn scene() -> (Sprite, Sprite, Sprite) {
    let palette = [Color::DarkBlue, Color::Blue, Color::DarkCyan];
    let backdrop = Sprite::new(Grid::from_fn(120, 40, |x, y| {
        Pixel::blank(palette[(x / 5 + y / 2) % palette.len()])
    }));

    let mut panel = Sprite::new(Grid::filled(40, 10, Pixel::blank(Color::DarkGray)))
        .with_anchor(Anchor::CENTER)
        .with_layer(1);
    for y in 0..10 {
        panel
            .grid
            .put_str(2, y, "the quick brown fox", ColorSet::new(Color::White, Color::Transparent))
            .unwrap();
    }

    let mut status = Sprite::empty(120, 1).with_anchor(Anchor::BOTTOM_LEFT).with_layer(2);
    status
        .grid
        .put_str(0, 0, " frame 1234 | 60.0 fps ", ColorSet::new(Color::Black, Color::Gray))
        .unwrap();

    (backdrop, panel, status)
}

fn frame() -> Grid<Pixel> {
    let (backdrop, panel, status) = scene();
    let mut compositor = Compositor::new(120, 40).unwrap();
    compositor.render([&backdrop, &panel, &status]).unwrap().clone()
}

fn bench_compose(c: &mut Criterion) {
    let (backdrop, panel, status) = scene();
    let mut compositor = Compositor::new(120, 40).unwrap();

    c.bench_function("compose_3_layers_120x40", |b| {
        b.iter(|| {
            black_box(compositor.render([&backdrop, &panel, &status]).unwrap());
        })
    });
}

fn bench_baseline(c: &mut Criterion) {
    let frame = frame();
    let mut engine = BaselineEngine::new(MemoryConsole::new(120, 40));

    c.bench_function("baseline_render_120x40", |b| {
        b.iter(|| {
            engine.render(black_box(&frame), IntVector::ZERO).unwrap();
        })
    });
}

fn bench_diff(c: &mut Criterion) {
    let frame = frame();
    let mut engine = DiffEngine::new(MemoryConsole::new(120, 40));

    c.bench_function("diff_render_120x40", |b| {
        b.iter(|| {
            engine.render(black_box(&frame), IntVector::ZERO).unwrap();
        })
    });
}

fn bench_diff_cold_cache(c: &mut Criterion) {
    let frame = frame();

    // Every iteration starts with an empty jump cache.
    c.bench_function("diff_render_cold_cache_120x40", |b| {
        b.iter(|| {
            let mut engine = DiffEngine::new(MemoryConsole::new(120, 40));
            engine.render(black_box(&frame), IntVector::ZERO).unwrap();
            black_box(engine.jump_cache().misses());
        })
    });
}

fn bench_debug(c: &mut Criterion) {
    let frame = frame();
    let mut engine = DebugEngine::new(MemoryConsole::new(120, 40));

    c.bench_function("debug_render_120x40", |b| {
        b.iter(|| {
            engine.render(black_box(&frame), IntVector::ZERO).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_compose,
    bench_baseline,
    bench_diff,
    bench_diff_cold_cache,
    bench_debug
);
criterion_main!(benches);

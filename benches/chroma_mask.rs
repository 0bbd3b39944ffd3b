use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use chroma_overlay::chroma::{ChromaKeyEngine, KeyColor, Tolerance};
use chroma_overlay::composition::{CompositorSurface, ResampleFilter};
use chroma_overlay::video::Frame;

fn noisy_frame(width: u32, height: u32) -> Frame {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut frame = Frame::new_filled(width, height, [255, 0, 255]);
    for y in 0..height {
        for x in 0..width {
            if rng.gen_bool(0.5) {
                frame.set_pixel(x, y, [rng.gen(), rng.gen(), rng.gen()]);
            }
        }
    }
    frame
}

fn bench_apply_mask(c: &mut Criterion) {
    let engine = ChromaKeyEngine::new();
    let mut group = c.benchmark_group("apply_mask");

    for &(w, h) in &[(640u32, 360u32), (1280, 720), (1920, 1080)] {
        let frame = noisy_frame(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}x{}", w, h)), &frame, |b, frame| {
            b.iter(|| engine.apply_mask(black_box(frame), KeyColor::MAGENTA, Tolerance(30)))
        });
    }
    group.finish();
}

fn bench_auto_detect(c: &mut Criterion) {
    let engine = ChromaKeyEngine::new();
    let frame = noisy_frame(1920, 1080);
    c.bench_function("auto_detect_1080p", |b| b.iter(|| engine.auto_detect(black_box(&frame))));
}

fn bench_composite_scaled(c: &mut Criterion) {
    let frame = noisy_frame(1280, 720);
    let mut surface = CompositorSurface::new(ChromaKeyEngine::new(), ResampleFilter::Bilinear);
    surface.reset(frame.dimensions());

    c.bench_function("composite_720p_at_0.5", |b| {
        b.iter(|| {
            surface
                .composite(black_box(&frame), (640, 360), KeyColor::MAGENTA, Tolerance(30))
                .pixels
                .len()
        })
    });
}

criterion_group!(benches, bench_apply_mask, bench_auto_detect, bench_composite_scaled);
criterion_main!(benches);

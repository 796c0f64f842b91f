//! Render benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fblog::{BuiltinFonts, Config, Geometry, LogState, PixelFormat, SafetyMode, Surface};

fn filled_state() -> LogState {
    let state = LogState::with_fonts(Config::default(), &BuiltinFonts);
    for i in 0..200 {
        let line = format!("[{:5}] drm: pipe {} flip done, vblank counter {}\n", i, i % 4, i * 3);
        state.write(line.as_bytes(), SafetyMode::Locked);
    }
    state
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    let line = b"kernel: usb 1-1: new high-speed USB device number 2 using xhci_hcd\n";
    group.throughput(Throughput::Bytes(line.len() as u64));

    let state = LogState::with_fonts(Config::default(), &BuiltinFonts);
    group.bench_function("locked", |b| {
        b.iter(|| state.write(black_box(line), SafetyMode::Locked))
    });
    group.bench_function("best_effort", |b| {
        b.iter(|| state.write(black_box(line), SafetyMode::BestEffort))
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let state = filled_state();

    for (name, format) in [
        ("xrgb8888", PixelFormat::XRGB8888),
        ("rgb565", PixelFormat::RGB565),
        ("rgb888", PixelFormat::RGB888),
    ] {
        let cpp = format.bytes_per_pixel().unwrap_or(4);
        let mut pixels = vec![0u8; 800 * 600 * cpp];
        group.throughput(Throughput::Bytes(pixels.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let geometry = Geometry::new(800, 600, 800 * cpp, cpp, format, 1);
                if let Ok(mut surface) = Surface::new(&mut pixels, geometry) {
                    state.draw(&mut surface);
                }
                black_box(&pixels);
            })
        });
    }

    state.ensure_size(1920, 1080).ok();
    let mut pixels = vec![0u8; 1920 * 1080 * 4];
    group.bench_function("xrgb8888_two_columns", |b| {
        b.iter(|| {
            let geometry = Geometry::new(1920, 1080, 1920 * 4, 4, PixelFormat::XRGB8888, 2);
            if let Ok(mut surface) = Surface::new(&mut pixels, geometry) {
                state.draw(&mut surface);
            }
            black_box(&pixels);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_render);
criterion_main!(benches);

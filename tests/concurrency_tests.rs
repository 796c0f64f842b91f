//! Concurrent writers, resizes, and renders against one shared state
//!
//! Best-effort writers may lose or tear lines; these tests only check that
//! nothing panics, every render overwrites the whole surface, and the log
//! stays readable afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use fblog::{
    BuiltinFonts, Color, Config, Geometry, LogState, PanicRegistry, PixelFormat, SafetyMode,
    Surface,
};

fn shared_state() -> Arc<LogState> {
    Arc::new(LogState::with_fonts(Config::default(), &BuiltinFonts))
}

#[test]
fn test_writers_resizer_and_renderers() {
    let state = shared_state();
    let stop = Arc::new(AtomicBool::new(false));
    let mut workers = Vec::new();

    for id in 0..4 {
        let state = Arc::clone(&state);
        let mode = if id % 2 == 0 {
            SafetyMode::Locked
        } else {
            SafetyMode::BestEffort
        };
        workers.push(thread::spawn(move || {
            for i in 0..2000 {
                let line = format!("writer {} line {}: {}\n", id, i, "x".repeat(i % 300));
                state.write(line.as_bytes(), mode);
            }
        }));
    }

    {
        let state = Arc::clone(&state);
        workers.push(thread::spawn(move || {
            for step in 1..=6 {
                state.ensure_size(800 + step * 400, 600 + step * 300).unwrap();
                thread::yield_now();
            }
        }));
    }

    let mut renderers = Vec::new();
    for _ in 0..2 {
        let state = Arc::clone(&state);
        let stop = Arc::clone(&stop);
        renderers.push(thread::spawn(move || {
            let format = PixelFormat::XRGB8888;
            let black = format.encode(Color::BLACK).unwrap();
            let white = format.encode(Color::WHITE).unwrap();
            let mut pixels = vec![0x55u8; 640 * 480 * 4];
            let mut frames = 0;
            while !stop.load(Ordering::Acquire) || frames == 0 {
                pixels.fill(0x55);
                let geometry = Geometry::new(640, 480, 640 * 4, 4, format, 1);
                let mut surface = Surface::new(&mut pixels, geometry).unwrap();
                state.draw(&mut surface);
                assert!(pixels
                    .chunks(4)
                    .all(|px| px == black.as_bytes() || px == white.as_bytes()));
                frames += 1;
            }
            frames
        }));
    }

    for worker in workers {
        worker.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    for renderer in renderers {
        assert!(renderer.join().unwrap() > 0);
    }

    let (width, height) = state.buffer_size().unwrap();
    // The last resize asked for 3200x2400 pixels, 400x150 cells of 8x16
    assert!(width >= 400);
    assert!(height >= 150);

    state.write(b"settled\n", SafetyMode::Locked);
    let newest = state
        .with_buffer(|buf| buf.recent(0).unwrap().to_string_lossy())
        .unwrap();
    assert_eq!(newest, "settled");
}

#[test]
fn test_best_effort_while_locked_writer_holds_token() {
    let state = shared_state();
    let barrier = Arc::new(std::sync::Barrier::new(2));

    let writer = {
        let state = Arc::clone(&state);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..5000 {
                state.write(format!("locked {}\n", i).as_bytes(), SafetyMode::Locked);
            }
        })
    };

    barrier.wait();
    for i in 0..5000 {
        state.write(format!("crash {}\n", i).as_bytes(), SafetyMode::BestEffort);
    }
    writer.join().unwrap();

    let lines = state
        .with_buffer(|buf| buf.entries().filter(|entry| entry.len > 0).count())
        .unwrap();
    assert!(lines > 0);
}

#[test]
fn test_panic_notify_races_with_writes() {
    let state = shared_state();
    let registry = Arc::new(PanicRegistry::new(1));
    let handle = registry.register();

    let mut pixels = vec![0u8; 320 * 240 * 2];
    let geometry = Geometry::new(320, 240, 320 * 2, 2, PixelFormat::RGB565, 1);
    // SAFETY: `pixels` stays alive until after `unmap` below
    unsafe { handle.update(pixels.as_mut_ptr(), geometry) };

    let writer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for i in 0..3000 {
                state.write(format!("event {}\n", i).as_bytes(), SafetyMode::BestEffort);
            }
        })
    };

    let mut drawn = 0;
    for _ in 0..50 {
        drawn += registry.notify_panic(&state);
    }
    writer.join().unwrap();
    handle.unmap();

    assert_eq!(drawn, 50);
    assert!(pixels.chunks(2).all(|px| px == [0, 0] || px == [0xff, 0xff]));
}

//! fblog: crash-survivable log rendering
//!
//! A log buffer that can be written from anywhere, including a panicking
//! thread that may already hold its locks, and rendered directly into
//! memory-mapped framebuffers as bitmap text. This crate provides:
//!
//! - `core`: line storage, the ring buffer with grow-by-copy resize, the
//!   writer, and the shared `LogState`
//! - `renderer`: pixel formats, bitmap fonts, and the multi-column renderer
//! - `panic`: the panic-framebuffer registry and the panic hook
//! - `sink`: a `log` facade backend feeding the buffer
//! - `app`: configuration
//!
//! ```no_run
//! use std::sync::Arc;
//! use fblog::{BuiltinFonts, Config, Geometry, LogState, PixelFormat, SafetyMode, Surface};
//!
//! let state = Arc::new(LogState::with_fonts(Config::default(), &BuiltinFonts));
//! state.write(b"hello from the log\n", SafetyMode::Locked);
//!
//! let geometry = Geometry::packed(800, 600, PixelFormat::XRGB8888);
//! let mut pixels = vec![0u8; 800 * 600 * 4];
//! let mut surface = Surface::new(&mut pixels, geometry).unwrap();
//! state.draw(&mut surface);
//! ```

pub mod app;
pub mod core;
pub mod error;
pub mod panic;
pub mod renderer;
pub mod sink;

pub use crate::app::Config;
pub use crate::core::{LogState, RingBuffer, SafetyMode};
pub use crate::error::{Error, Result};
pub use crate::panic::{PanicHandle, PanicRegistry};
pub use crate::renderer::{BuiltinFonts, Color, Font, FontProvider, Geometry, PixelFormat, Surface};
pub use crate::sink::LogSink;

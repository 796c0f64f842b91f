//! Software Renderer Module
//!
//! Draws the log into raw pixel memory. Everything here works on
//! caller-provided surfaces and never allocates while rendering:
//! - `format`/`pixel`: format tags and the table-driven pixel encoder
//! - `font`/`glyph`: bitmap fonts and the glyph rasterizer
//! - `surface`: bounds-checked view of a mapped framebuffer
//! - `draw`: the bottom-up multi-column log renderer
//! - `banner`: the static panic screen

mod banner;
mod draw;
mod font;
mod format;
mod glyph;
mod pixel;
mod surface;

pub use banner::{draw_banner, draw_logo, draw_panic_screen, PANIC_BANNER, PANIC_LOGO};
pub use draw::{render, ColumnLayout, DEFAULT_COLUMN_PADDING, MIN_COLUMN_CELLS};
pub use font::{BuiltinFonts, Font, FontHint, FontProvider, GLYPH_COUNT};
pub use format::{Channel, Layout, PixelFormat};
pub use glyph::draw_glyph;
pub use pixel::{put_pixel, Color, Encoded};
pub use surface::{Geometry, Surface};

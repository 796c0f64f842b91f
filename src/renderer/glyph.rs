//! Glyph rasterizer

use super::font::Font;
use super::pixel::Encoded;
use super::surface::Surface;

/// Paint the foreground pixels of `ch` with the top-left corner at
/// (`x`, `y`).
///
/// Background pixels are left untouched; the caller clears the cell first.
/// Pixels outside the surface are clipped.
pub fn draw_glyph(
    surface: &mut Surface<'_>,
    font: &Font,
    ch: u8,
    x: usize,
    y: usize,
    fg: &Encoded,
) {
    let stride = font.stride();
    for (row, bits) in font.glyph(ch).chunks(stride).enumerate() {
        for col in 0..font.width() {
            if bits[col / 8] & (0x80 >> (col % 8)) != 0 {
                surface.put(x + col, y + row, fg);
            }
        }
    }
}

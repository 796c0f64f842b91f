//! Static panic screen
//!
//! A fixed message centered on a cleared surface, independent of the log
//! contents. Useful when the log itself is not worth showing, or as a first
//! frame before the log is rendered.

use super::font::Font;
use super::glyph::draw_glyph;
use super::pixel::Color;
use super::surface::Surface;

/// Default panic message
pub const PANIC_BANNER: &[&str] = &["KERNEL PANIC !", "", "Please reboot your computer."];

/// Logo drawn in the top left corner when there is room above the message
pub const PANIC_LOGO: &[&str] = &[
    "     .--.",
    "    |o_o |",
    "    |:_/ |",
    "   //   \\ \\",
    "  (|     | )",
    " /'\\_   _/`\\",
    " \\___)=(___/",
];

/// Clear `surface` and draw `lines` centered both ways on the cell grid.
///
/// Lines wider than the surface are skipped. Returns the cell row of the
/// first line.
pub fn draw_banner(font: &Font, surface: &mut Surface<'_>, lines: &[&str]) -> usize {
    let format = surface.format();
    let (Some(bg), Some(fg)) = (format.encode(Color::BLACK), format.encode(Color::WHITE)) else {
        return 0;
    };
    surface.clear(&bg);

    let (fw, fh) = (font.width().max(1), font.height().max(1));
    let chars_per_line = surface.width() / fw;
    let rows = surface.height() / fh;
    let top = rows.saturating_sub(lines.len()) / 2;

    for (y, line) in lines.iter().enumerate() {
        let text = line.as_bytes();
        if text.len() > chars_per_line {
            continue;
        }
        let left = (chars_per_line - text.len()) / 2;
        for (x, &ch) in text.iter().enumerate() {
            draw_glyph(surface, font, ch, (left + x) * fw, (top + y) * fh, &fg);
        }
    }
    top
}

/// Draw `logo` into the top left corner, clipped to the cell grid
pub fn draw_logo(font: &Font, surface: &mut Surface<'_>, logo: &[&str]) {
    let Some(fg) = surface.format().encode(Color::WHITE) else {
        return;
    };
    let (fw, fh) = (font.width().max(1), font.height().max(1));
    let chars_per_line = surface.width() / fw;

    for (y, line) in logo.iter().enumerate() {
        for (x, &ch) in line.as_bytes().iter().take(chars_per_line).enumerate() {
            draw_glyph(surface, font, ch, x * fw, y * fh, &fg);
        }
    }
}

/// The full panic screen: [`PANIC_BANNER`], plus [`PANIC_LOGO`] if it fits
/// above the message
pub fn draw_panic_screen(font: &Font, surface: &mut Surface<'_>) {
    let top = draw_banner(font, surface, PANIC_BANNER);
    if top >= PANIC_LOGO.len() {
        draw_logo(font, surface, PANIC_LOGO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::format::PixelFormat;
    use crate::renderer::surface::Geometry;

    fn block_font() -> Font {
        let mut data = vec![0x80u8; 256];
        data[b' ' as usize] = 0;
        Font::new("block", 1, 1, data).unwrap()
    }

    fn lit(pixels: &[u8], width: usize, row: usize) -> Vec<usize> {
        (0..width).filter(|&x| pixels[row * width + x] == 0xff).collect()
    }

    #[test]
    fn test_banner_centered() {
        let font = block_font();
        let mut pixels = vec![0x55u8; 10 * 5];
        let top = {
            let mut surface =
                Surface::new(&mut pixels, Geometry::packed(10, 5, PixelFormat::C8)).unwrap();
            draw_banner(&font, &mut surface, &["abcd", "xy"])
        };
        assert_eq!(top, 1);
        assert_eq!(lit(&pixels, 10, 0), Vec::<usize>::new());
        assert_eq!(lit(&pixels, 10, 1), vec![3, 4, 5, 6]);
        assert_eq!(lit(&pixels, 10, 2), vec![4, 5]);
        assert!(pixels.iter().all(|&b| b == 0 || b == 0xff));
    }

    #[test]
    fn test_banner_skips_wide_lines() {
        let font = block_font();
        let mut pixels = vec![0u8; 4 * 3];
        {
            let mut surface =
                Surface::new(&mut pixels, Geometry::packed(4, 3, PixelFormat::C8)).unwrap();
            draw_banner(&font, &mut surface, &["too wide", "ok"]);
        }
        assert_eq!(lit(&pixels, 4, 0), Vec::<usize>::new());
        assert_eq!(lit(&pixels, 4, 1), vec![1, 2]);
    }

    #[test]
    fn test_panic_screen_logo_needs_room() {
        let font = block_font();

        let mut small = vec![0u8; 40 * 10];
        {
            let mut surface =
                Surface::new(&mut small, Geometry::packed(40, 10, PixelFormat::C8)).unwrap();
            draw_panic_screen(&font, &mut surface);
        }
        // 10 rows, 3 message lines: top = 3, no room for the 7-line logo
        assert!(lit(&small, 40, 0).is_empty());

        let mut tall = vec![0u8; 40 * 20];
        {
            let mut surface =
                Surface::new(&mut tall, Geometry::packed(40, 20, PixelFormat::C8)).unwrap();
            draw_panic_screen(&font, &mut surface);
        }
        assert_eq!(lit(&tall, 40, 0), vec![5, 6, 7, 8]);
    }
}

//! Bitmap fonts
//!
//! A [`Font`] is a fixed-size monochrome table of 256 glyphs. Each glyph is
//! `height` rows of `ceil(width / 8)` bytes, most significant bit leftmost.
//! Fonts are chosen once at init through a [`FontProvider`] and never change
//! afterwards.

use font8x8::UnicodeFonts;

use crate::error::{Error, Result};

/// Number of glyphs in every font
pub const GLYPH_COUNT: usize = 256;

/// Fixed-size monochrome bitmap font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    name: &'static str,
    width: usize,
    height: usize,
    /// Bytes per glyph row
    stride: usize,
    data: Box<[u8]>,
}

impl Font {
    /// Wrap a glyph table of `GLYPH_COUNT` glyphs
    pub fn new(name: &'static str, width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }
        let stride = width.div_ceil(8);
        if data.len() < GLYPH_COUNT * height * stride {
            return Err(Error::InvalidGeometry { width, height });
        }

        Ok(Self {
            name,
            width,
            height,
            stride,
            data: data.into_boxed_slice(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Glyph width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Glyph height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per glyph row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Rows of the glyph for `ch`
    pub fn glyph(&self, ch: u8) -> &[u8] {
        let size = self.height * self.stride;
        let start = ch as usize * size;
        &self.data[start..start + size]
    }

    /// Check whether pixel (`x`, `y`) of the glyph for `ch` is set
    pub fn is_set(&self, ch: u8, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let row = &self.glyph(ch)[y * self.stride..];
        row[x / 8] & (0x80 >> (x % 8)) != 0
    }
}

/// Hints handed to a font provider at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHint {
    /// Expected surface width in pixels
    pub screen_width: usize,
    /// Expected surface height in pixels
    pub screen_height: usize,
    /// Preferred glyph width
    pub preferred_width: usize,
    /// Preferred glyph height
    pub preferred_height: usize,
}

/// Source of bitmap fonts
pub trait FontProvider {
    /// Pick a font for the hinted screen, `None` if nothing fits
    fn find_font(&self, hint: &FontHint) -> Option<Font>;
}

/// Fonts built from the `font8x8` tables: 8x8 and a row-doubled 8x16.
///
/// Covers ASCII and Latin-1; every other code is blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFonts;

impl BuiltinFonts {
    /// The 8x8 font
    pub fn font_8x8() -> Font {
        Self::build("font8x8", 1)
    }

    /// The 8x16 font
    pub fn font_8x16() -> Font {
        Self::build("font8x16", 2)
    }

    fn build(name: &'static str, scale: usize) -> Font {
        let height = 8 * scale;
        let mut data = vec![0u8; GLYPH_COUNT * height];

        for code in 0..GLYPH_COUNT {
            let ch = char::from(code as u8);
            let rows = font8x8::BASIC_FONTS
                .get(ch)
                .or_else(|| font8x8::LATIN_FONTS.get(ch))
                .unwrap_or([0u8; 8]);

            let glyph = &mut data[code * height..(code + 1) * height];
            for (y, row) in glyph.iter_mut().enumerate() {
                // font8x8 keeps the leftmost pixel in bit 0
                *row = rows[y / scale].reverse_bits();
            }
        }

        Font {
            name,
            width: 8,
            height,
            stride: 1,
            data: data.into_boxed_slice(),
        }
    }
}

impl FontProvider for BuiltinFonts {
    fn find_font(&self, hint: &FontHint) -> Option<Font> {
        // Tall glyphs unless the screen cannot hold the minimum row count
        if hint.preferred_height <= 8 || hint.screen_height / 16 < 25 {
            Some(Self::font_8x8())
        } else {
            Some(Self::font_8x16())
        }
    }
}

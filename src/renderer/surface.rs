//! Destination surfaces
//!
//! A [`Surface`] is a mutable view of pixel memory plus its [`Geometry`].
//! It either borrows a slice (tests, the headless tool) or wraps a raw
//! mapping handed over by a display driver. All pixel writes go through
//! bounds-checked helpers, so a render can never write outside the mapped
//! range whatever the geometry says.

use super::format::PixelFormat;
use super::pixel::Encoded;
use crate::error::{Error, Result};

/// Geometry of a destination surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Distance between rows in bytes
    pub stride: usize,
    /// Bytes per pixel, 0 to derive it from the format
    pub cpp: usize,
    /// Pixel format tag
    pub format: PixelFormat,
    /// Requested number of log columns
    pub columns: usize,
}

impl Geometry {
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        cpp: usize,
        format: PixelFormat,
        columns: usize,
    ) -> Self {
        Self {
            width,
            height,
            stride,
            cpp,
            format,
            columns,
        }
    }

    /// Tightly packed geometry for `format`, single column
    pub fn packed(width: usize, height: usize, format: PixelFormat) -> Self {
        let cpp = format.bytes_per_pixel().unwrap_or(0);
        Self::new(width, height, width * cpp, cpp, format, 1)
    }

    /// Check the geometry and fill in an autodetected `cpp`
    pub fn validate(&self) -> Result<Geometry> {
        if self.width == 0 || self.height == 0 || self.stride == 0 || self.columns == 0 {
            return Err(Error::DegenerateSurface);
        }
        if self.format.is_zero() {
            return Err(Error::DegenerateSurface);
        }

        let cpp = match (self.cpp, self.format.bytes_per_pixel()) {
            (0, Some(cpp)) => cpp,
            (0, None) => return Err(Error::UnsupportedFormat(self.format)),
            (cpp, Some(needed)) if cpp < needed => return Err(Error::DegenerateSurface),
            (cpp, _) => cpp,
        };

        let row_bytes = self
            .width
            .checked_mul(cpp)
            .ok_or(Error::DegenerateSurface)?;
        if row_bytes > self.stride {
            return Err(Error::InvalidStride {
                stride: self.stride,
                row_bytes,
            });
        }

        Ok(Geometry { cpp, ..*self })
    }

    /// Bytes a mapping must span to hold this (validated) geometry
    pub fn required_len(&self) -> usize {
        (self.height - 1) * self.stride + self.width * self.cpp
    }
}

/// Writable pixel memory with a validated geometry
pub struct Surface<'a> {
    pixels: &'a mut [u8],
    geometry: Geometry,
}

impl<'a> Surface<'a> {
    /// Wrap `pixels`, which must cover the geometry
    pub fn new(pixels: &'a mut [u8], geometry: Geometry) -> Result<Self> {
        let geometry = geometry.validate()?;
        let needed = geometry.required_len();
        if pixels.len() < needed {
            return Err(Error::SurfaceTooSmall {
                needed,
                len: pixels.len(),
            });
        }
        Ok(Self { pixels, geometry })
    }

    /// Wrap a raw mapping.
    ///
    /// # Safety
    ///
    /// `map` must be valid for writes of `geometry.required_len()` bytes
    /// for `'a`, and nothing else may access that memory meanwhile.
    pub unsafe fn from_raw(map: *mut u8, geometry: Geometry) -> Result<Self> {
        if map.is_null() {
            return Err(Error::DegenerateSurface);
        }
        let geometry = geometry.validate()?;
        let pixels = std::slice::from_raw_parts_mut(map, geometry.required_len());
        Ok(Self { pixels, geometry })
    }

    /// Validated geometry (`cpp` resolved)
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn format(&self) -> PixelFormat {
        self.geometry.format
    }

    /// Raw pixel memory
    pub fn pixels(&self) -> &[u8] {
        self.pixels
    }

    /// Bytes of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let offset = y * self.geometry.stride + x * self.geometry.cpp;
        self.pixels.get(offset..offset + self.geometry.cpp)
    }

    /// Write one encoded pixel; out-of-range coordinates are ignored
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, value: &Encoded) {
        if x >= self.geometry.width || y >= self.geometry.height {
            return;
        }
        let offset = y * self.geometry.stride + x * self.geometry.cpp;
        if let Some(dst) = self.pixels.get_mut(offset..) {
            value.write_to(dst);
        }
    }

    /// Fill a rectangle, clipped to the surface
    pub fn fill(&mut self, x: usize, y: usize, width: usize, height: usize, value: &Encoded) {
        let x_end = x.saturating_add(width).min(self.geometry.width);
        let y_end = y.saturating_add(height).min(self.geometry.height);
        for row in y..y_end {
            for col in x..x_end {
                self.put(col, row, value);
            }
        }
    }

    /// Fill the whole surface
    pub fn clear(&mut self, value: &Encoded) {
        self.fill(0, 0, self.geometry.width, self.geometry.height, value);
    }
}

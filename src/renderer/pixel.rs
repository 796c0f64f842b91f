//! Pixel encoding
//!
//! Colors come in as 32-bit normalized channels (`0xffffffff` is full
//! intensity) and are reduced to the bit width of the target format by
//! keeping the most significant bits. One generic packer handles every
//! format in the layout table.

use super::format::{Channel, Layout, PixelFormat};

/// High-precision ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub a: u32,
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl Color {
    /// Background: solid black, fully opaque
    pub const BLACK: Color = Color::new(u32::MAX, 0, 0, 0);
    /// Foreground: solid white, fully opaque
    pub const WHITE: Color = Color::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
    /// All channels zero
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(a: u32, r: u32, g: u32, b: u32) -> Self {
        Self { a, r, g, b }
    }

    /// Scale an opaque 8-bit RGB triple up to 32-bit channels
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(u32::MAX, r as u32 * 0x0101_0101, g as u32 * 0x0101_0101, b as u32 * 0x0101_0101)
    }

    /// Reduce to 8-bit RGB
    pub const fn to_rgb8(self) -> [u8; 3] {
        [(self.r >> 24) as u8, (self.g >> 24) as u8, (self.b >> 24) as u8]
    }
}

/// Byte pattern of one encoded pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    bytes: [u8; 4],
    len: usize,
}

impl Encoded {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store the pattern at the start of `dst`; short destinations are left
    /// untouched
    #[inline]
    pub fn write_to(&self, dst: &mut [u8]) {
        if let Some(dst) = dst.get_mut(..self.len) {
            dst.copy_from_slice(self.as_bytes());
        }
    }
}

fn pack(value: u32, channel: Channel) -> u32 {
    if channel.bits == 0 {
        0
    } else {
        (value >> (32 - channel.bits)) << channel.shift
    }
}

fn unpack(value: u32, channel: Channel) -> u32 {
    let max = channel.max();
    if max == 0 {
        return 0;
    }
    let field = (value >> channel.shift) & max;
    (u64::from(field) * u64::from(u32::MAX) / u64::from(max)) as u32
}

impl Layout {
    /// Pack `color` into a pixel value
    pub fn pack(&self, color: Color) -> u32 {
        if self.indexed {
            // No palette to look up, so anything lit gets the top index
            return if (color.r | color.g | color.b) != 0 { 0xff } else { 0 };
        }
        pack(color.a, self.a)
            | pack(color.r, self.r)
            | pack(color.g, self.g)
            | pack(color.b, self.b)
    }

    /// Expand a pixel value back to 32-bit channels
    pub fn unpack(&self, value: u32) -> Color {
        if self.indexed {
            return if value & 0xff != 0 { Color::WHITE } else { Color::BLACK };
        }
        let a = if self.has_alpha { unpack(value, self.a) } else { u32::MAX };
        Color::new(a, unpack(value, self.r), unpack(value, self.g), unpack(value, self.b))
    }

    /// Lay out a packed value over `cpp` bytes in the format's byte order
    pub fn store(&self, value: u32) -> Encoded {
        let mut bytes = [0u8; 4];
        let le = value.to_le_bytes();
        let cpp = self.cpp.min(4);
        for (i, byte) in bytes.iter_mut().take(cpp).enumerate() {
            *byte = if self.big_endian { le[cpp - 1 - i] } else { le[i] };
        }
        Encoded { bytes, len: cpp }
    }

    /// Read a packed value back from `cpp` bytes
    pub fn load(&self, bytes: &[u8]) -> Option<u32> {
        let bytes = bytes.get(..self.cpp.min(4))?;
        let mut le = [0u8; 4];
        for (i, &byte) in bytes.iter().enumerate() {
            let index = if self.big_endian { bytes.len() - 1 - i } else { i };
            le[index] = byte;
        }
        Some(u32::from_le_bytes(le))
    }
}

impl PixelFormat {
    /// Encode `color`, `None` for unknown formats
    pub fn encode(self, color: Color) -> Option<Encoded> {
        let layout = self.layout()?;
        Some(layout.store(layout.pack(color)))
    }

    /// Decode one pixel from the start of `bytes`
    pub fn decode(self, bytes: &[u8]) -> Option<Color> {
        let layout = self.layout()?;
        layout.load(bytes).map(|value| layout.unpack(value))
    }
}

/// Write one pixel of `color` at the start of `dst`.
///
/// Unknown formats leave `dst` unmodified.
#[inline]
pub fn put_pixel(dst: &mut [u8], format: PixelFormat, color: Color) {
    if let Some(encoded) = format.encode(color) {
        encoded.write_to(dst);
    }
}

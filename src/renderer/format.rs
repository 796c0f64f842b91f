//! Pixel formats
//!
//! Formats are identified by four-character-code tags in the usual DRM
//! convention (`a | b << 8 | c << 16 | d << 24`). Setting [`PixelFormat::BIG_ENDIAN`]
//! on a tag selects the foreign byte order variant of the same layout.
//!
//! Every supported format is one row in a layout table: bit width and shift
//! per channel plus the number of bytes per pixel. The packer in
//! [`super::pixel`] consumes that table, so adding a format means adding a
//! row here.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Pixel format tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelFormat(u32);

/// Position of one color channel inside a packed pixel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channel {
    /// Width in bits, 0 if the format has no such channel
    pub bits: u32,
    /// Offset of the least significant bit
    pub shift: u32,
}

impl Channel {
    const fn new(bits: u32, shift: u32) -> Self {
        Self { bits, shift }
    }

    /// Channel absent from the format
    pub const NONE: Channel = Channel::new(0, 0);

    /// Mask of the channel value before shifting
    pub fn max(&self) -> u32 {
        if self.bits == 0 {
            0
        } else {
            u32::MAX >> (32 - self.bits)
        }
    }
}

/// Bit layout of a packed pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Bytes per pixel
    pub cpp: usize,
    /// Palette-indexed: any lit channel maps to the highest index
    pub indexed: bool,
    /// Alpha, or the padding bits of an X format
    pub a: Channel,
    pub r: Channel,
    pub g: Channel,
    pub b: Channel,
    /// Whether the alpha channel carries meaning (`A` vs `X` formats)
    pub has_alpha: bool,
    /// Store the value most significant byte first
    pub big_endian: bool,
}

impl Layout {
    const fn indexed() -> Self {
        Self {
            cpp: 1,
            indexed: true,
            a: Channel::NONE,
            r: Channel::NONE,
            g: Channel::NONE,
            b: Channel::NONE,
            has_alpha: false,
            big_endian: false,
        }
    }

    const fn packed(cpp: usize, a: Channel, r: Channel, g: Channel, b: Channel) -> Self {
        Self {
            cpp,
            indexed: false,
            a,
            r,
            g,
            b,
            has_alpha: false,
            big_endian: false,
        }
    }

    const fn alpha(mut self) -> Self {
        self.has_alpha = true;
        self
    }
}

const fn fourcc(code: &[u8; 4]) -> u32 {
    code[0] as u32 | (code[1] as u32) << 8 | (code[2] as u32) << 16 | (code[3] as u32) << 24
}

const fn ch(bits: u32, shift: u32) -> Channel {
    Channel::new(bits, shift)
}

// Channel orders shared by the 12, 15/16, 32 and 30 bit families
const fn xrgb(cpp: usize, a: Channel, r: Channel, g: Channel, b: Channel) -> Layout {
    Layout::packed(cpp, a, r, g, b)
}

const fn xbgr(cpp: usize, a: Channel, b: Channel, g: Channel, r: Channel) -> Layout {
    Layout::packed(cpp, a, r, g, b)
}

macro_rules! formats {
    ($($name:ident = $code:literal => $layout:expr;)*) => {
        impl PixelFormat {
            $(pub const $name: PixelFormat = PixelFormat(fourcc($code));)*
        }

        const TABLE: &[(PixelFormat, &str, Layout)] = &[
            $((PixelFormat::$name, stringify!($name), $layout),)*
        ];
    };
}

formats! {
    C8 = b"C8  " => Layout::indexed();

    RGB332 = b"RGB8" => Layout::packed(1, Channel::NONE, ch(3, 5), ch(3, 2), ch(2, 0));
    BGR233 = b"BGR8" => Layout::packed(1, Channel::NONE, ch(3, 0), ch(3, 3), ch(2, 6));

    XRGB4444 = b"XR12" => xrgb(2, ch(4, 12), ch(4, 8), ch(4, 4), ch(4, 0));
    XBGR4444 = b"XB12" => xbgr(2, ch(4, 12), ch(4, 8), ch(4, 4), ch(4, 0));
    RGBX4444 = b"RX12" => xrgb(2, ch(4, 0), ch(4, 12), ch(4, 8), ch(4, 4));
    BGRX4444 = b"BX12" => xbgr(2, ch(4, 0), ch(4, 12), ch(4, 8), ch(4, 4));
    ARGB4444 = b"AR12" => xrgb(2, ch(4, 12), ch(4, 8), ch(4, 4), ch(4, 0)).alpha();
    ABGR4444 = b"AB12" => xbgr(2, ch(4, 12), ch(4, 8), ch(4, 4), ch(4, 0)).alpha();
    RGBA4444 = b"RA12" => xrgb(2, ch(4, 0), ch(4, 12), ch(4, 8), ch(4, 4)).alpha();
    BGRA4444 = b"BA12" => xbgr(2, ch(4, 0), ch(4, 12), ch(4, 8), ch(4, 4)).alpha();

    XRGB1555 = b"XR15" => xrgb(2, ch(1, 15), ch(5, 10), ch(5, 5), ch(5, 0));
    XBGR1555 = b"XB15" => xbgr(2, ch(1, 15), ch(5, 10), ch(5, 5), ch(5, 0));
    RGBX5551 = b"RX15" => xrgb(2, ch(1, 0), ch(5, 11), ch(5, 6), ch(5, 1));
    BGRX5551 = b"BX15" => xbgr(2, ch(1, 0), ch(5, 11), ch(5, 6), ch(5, 1));
    ARGB1555 = b"AR15" => xrgb(2, ch(1, 15), ch(5, 10), ch(5, 5), ch(5, 0)).alpha();
    ABGR1555 = b"AB15" => xbgr(2, ch(1, 15), ch(5, 10), ch(5, 5), ch(5, 0)).alpha();
    RGBA5551 = b"RA15" => xrgb(2, ch(1, 0), ch(5, 11), ch(5, 6), ch(5, 1)).alpha();
    BGRA5551 = b"BA15" => xbgr(2, ch(1, 0), ch(5, 11), ch(5, 6), ch(5, 1)).alpha();

    RGB565 = b"RG16" => xrgb(2, Channel::NONE, ch(5, 11), ch(6, 5), ch(5, 0));
    BGR565 = b"BG16" => xbgr(2, Channel::NONE, ch(5, 11), ch(6, 5), ch(5, 0));

    RGB888 = b"RG24" => xrgb(3, Channel::NONE, ch(8, 16), ch(8, 8), ch(8, 0));
    BGR888 = b"BG24" => xbgr(3, Channel::NONE, ch(8, 16), ch(8, 8), ch(8, 0));

    XRGB8888 = b"XR24" => xrgb(4, ch(8, 24), ch(8, 16), ch(8, 8), ch(8, 0));
    XBGR8888 = b"XB24" => xbgr(4, ch(8, 24), ch(8, 16), ch(8, 8), ch(8, 0));
    RGBX8888 = b"RX24" => xrgb(4, ch(8, 0), ch(8, 24), ch(8, 16), ch(8, 8));
    BGRX8888 = b"BX24" => xbgr(4, ch(8, 0), ch(8, 24), ch(8, 16), ch(8, 8));
    ARGB8888 = b"AR24" => xrgb(4, ch(8, 24), ch(8, 16), ch(8, 8), ch(8, 0)).alpha();
    ABGR8888 = b"AB24" => xbgr(4, ch(8, 24), ch(8, 16), ch(8, 8), ch(8, 0)).alpha();
    RGBA8888 = b"RA24" => xrgb(4, ch(8, 0), ch(8, 24), ch(8, 16), ch(8, 8)).alpha();
    BGRA8888 = b"BA24" => xbgr(4, ch(8, 0), ch(8, 24), ch(8, 16), ch(8, 8)).alpha();

    XRGB2101010 = b"XR30" => xrgb(4, ch(2, 30), ch(10, 20), ch(10, 10), ch(10, 0));
    XBGR2101010 = b"XB30" => xbgr(4, ch(2, 30), ch(10, 20), ch(10, 10), ch(10, 0));
    RGBX1010102 = b"RX30" => xrgb(4, ch(2, 0), ch(10, 22), ch(10, 12), ch(10, 2));
    BGRX1010102 = b"BX30" => xbgr(4, ch(2, 0), ch(10, 22), ch(10, 12), ch(10, 2));
    ARGB2101010 = b"AR30" => xrgb(4, ch(2, 30), ch(10, 20), ch(10, 10), ch(10, 0)).alpha();
    ABGR2101010 = b"AB30" => xbgr(4, ch(2, 30), ch(10, 20), ch(10, 10), ch(10, 0)).alpha();
    RGBA1010102 = b"RA30" => xrgb(4, ch(2, 0), ch(10, 22), ch(10, 12), ch(10, 2)).alpha();
    BGRA1010102 = b"BA30" => xbgr(4, ch(2, 0), ch(10, 22), ch(10, 12), ch(10, 2)).alpha();
}

impl PixelFormat {
    /// Flag selecting the big-endian variant of a format
    pub const BIG_ENDIAN: u32 = 1 << 31;

    /// Build a tag from its four characters
    pub const fn fourcc(code: &[u8; 4]) -> Self {
        PixelFormat(fourcc(code))
    }

    /// Wrap a raw tag value
    pub const fn from_raw(raw: u32) -> Self {
        PixelFormat(raw)
    }

    /// Raw tag value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Big-endian variant of this format
    pub const fn big_endian(self) -> Self {
        PixelFormat(self.0 | Self::BIG_ENDIAN)
    }

    pub const fn is_big_endian(self) -> bool {
        self.0 & Self::BIG_ENDIAN != 0
    }

    /// The zero tag, which never names a format
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    fn entry(self) -> Option<&'static (PixelFormat, &'static str, Layout)> {
        let base = self.0 & !Self::BIG_ENDIAN;
        TABLE.iter().find(|(format, _, _)| format.0 == base)
    }

    /// Bit layout, `None` for unknown tags
    pub fn layout(self) -> Option<Layout> {
        self.entry().map(|&(_, _, layout)| Layout {
            big_endian: self.is_big_endian(),
            ..layout
        })
    }

    /// Check whether the tag is in the layout table
    pub fn is_supported(self) -> bool {
        self.entry().is_some()
    }

    /// Bytes per pixel, `None` for unknown tags
    pub fn bytes_per_pixel(self) -> Option<usize> {
        self.entry().map(|(_, _, layout)| layout.cpp)
    }

    /// Symbolic name without the endianness flag
    pub fn name(self) -> Option<&'static str> {
        self.entry().map(|&(_, name, _)| name)
    }

    /// Every supported format in little-endian form
    pub fn all() -> impl Iterator<Item = PixelFormat> {
        TABLE.iter().map(|&(format, _, _)| format)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) if self.is_big_endian() => write!(f, "{}_BE", name),
            Some(name) => f.write_str(name),
            None => write!(f, "{:#010x}", self.0),
        }
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelFormat({})", self)
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    /// Parse a symbolic name such as `XRGB8888`, optionally suffixed with
    /// `_BE`, or a raw four-character code
    fn from_str(s: &str) -> Result<Self, Error> {
        let upper = s.trim().to_ascii_uppercase();
        let (base, big_endian) = match upper.strip_suffix("_BE") {
            Some(base) => (base, true),
            None => (upper.as_str(), false),
        };

        let by_name = TABLE
            .iter()
            .find(|(_, name, _)| *name == base)
            .map(|&(format, _, _)| format);

        let format = match by_name {
            Some(format) => format,
            None => {
                let code: [u8; 4] = base
                    .as_bytes()
                    .try_into()
                    .map_err(|_| Error::UnsupportedFormat(PixelFormat(0)))?;
                let format = PixelFormat::fourcc(&code);
                if !format.is_supported() {
                    return Err(Error::UnsupportedFormat(format));
                }
                format
            }
        };

        Ok(if big_endian { format.big_endian() } else { format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_matches_drm_convention() {
        assert_eq!(PixelFormat::XRGB8888.raw(), 0x3432_5258);
        assert_eq!(PixelFormat::RGB565.raw(), 0x3631_4752);
        assert_eq!(PixelFormat::C8.raw(), 0x2020_3843);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::C8.bytes_per_pixel(), Some(1));
        assert_eq!(PixelFormat::BGR233.bytes_per_pixel(), Some(1));
        assert_eq!(PixelFormat::ARGB1555.bytes_per_pixel(), Some(2));
        assert_eq!(PixelFormat::BGR888.bytes_per_pixel(), Some(3));
        assert_eq!(PixelFormat::RGBA1010102.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::from_raw(0).bytes_per_pixel(), None);
        assert_eq!(PixelFormat::fourcc(b"NV12").bytes_per_pixel(), None);
    }

    #[test]
    fn test_big_endian_keeps_layout() {
        let be = PixelFormat::RGB565.big_endian();
        assert!(be.is_big_endian());
        let layout = be.layout().unwrap();
        assert!(layout.big_endian);
        assert_eq!(layout.r, PixelFormat::RGB565.layout().unwrap().r);
    }

    #[test]
    fn test_layout_channels_cover_cpp() {
        for format in PixelFormat::all() {
            let layout = format.layout().unwrap();
            if layout.indexed {
                continue;
            }
            let mut used = 0u64;
            for channel in [layout.a, layout.r, layout.g, layout.b] {
                let mask = (channel.max() as u64) << channel.shift;
                assert_eq!(used & mask, 0, "{} has overlapping channels", format);
                used |= mask;
            }
            assert!(used < 1u64 << (layout.cpp * 8), "{} overflows its cpp", format);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("XRGB8888".parse::<PixelFormat>().unwrap(), PixelFormat::XRGB8888);
        assert_eq!("rgb565".parse::<PixelFormat>().unwrap(), PixelFormat::RGB565);
        assert_eq!(
            "BGRA5551_BE".parse::<PixelFormat>().unwrap(),
            PixelFormat::BGRA5551.big_endian()
        );
        assert_eq!("XR24".parse::<PixelFormat>().unwrap(), PixelFormat::XRGB8888);
        assert!("YUYV".parse::<PixelFormat>().is_err());
        assert!("nonsense".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PixelFormat::ABGR2101010.to_string(), "ABGR2101010");
        assert_eq!(PixelFormat::RGB888.big_endian().to_string(), "RGB888_BE");
        assert_eq!(PixelFormat::from_raw(0x1234).to_string(), "0x00001234");
    }
}

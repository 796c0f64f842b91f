//! Error types for the log buffer and renderer
//!
//! Most of the public debug-path entry points swallow these and degrade to a
//! no-op. They exist so the building blocks underneath can use `?`.

use std::io;
use thiserror::Error;

use crate::renderer::PixelFormat;

/// fblog error type
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer or line storage could not be allocated
    #[error("Failed to allocate log buffer of {width}x{height} cells")]
    Alloc { width: usize, height: usize },

    /// A ring buffer needs at least one line of at least one cell
    #[error("Invalid buffer geometry: {width}x{height}")]
    InvalidGeometry { width: usize, height: usize },

    /// Pixel format tag not present in the layout table
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    /// Zero width, height, stride, columns or format
    #[error("Degenerate surface geometry")]
    DegenerateSurface,

    /// A pixel row does not fit into the stride
    #[error("Stride of {stride} bytes cannot hold a row of {row_bytes} bytes")]
    InvalidStride { stride: usize, row_bytes: usize },

    /// The mapped memory is shorter than the geometry requires
    #[error("Surface memory too small: need {needed} bytes, have {len}")]
    SurfaceTooSmall { needed: usize, len: usize },

    /// The font provider had nothing suitable
    #[error("No suitable font found")]
    NoFont,

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for fblog operations
pub type Result<T> = std::result::Result<T, Error>;

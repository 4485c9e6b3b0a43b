//! Error types for the render crate.
//!
//! Only constructors and pixel-buffer loads report errors. Drawing itself is
//! best-effort: empty geometry, exhausted stacks and calls outside a
//! begin/end bracket are silent no-ops.

use thiserror::Error;

use crate::types::PixelFormat;

/// Errors that can occur while creating or filling render resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Invalid dimensions (zero width or height).
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A pixel buffer is too small for the region it is supposed to describe.
    #[error("pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// The pixel format cannot be used for the requested operation.
    #[error("unsupported pixel format {format:?} for {operation}")]
    UnsupportedFormat {
        format: PixelFormat,
        operation: &'static str,
    },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

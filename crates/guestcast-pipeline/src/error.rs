//! Error types for the display pipeline.

use thiserror::Error;

/// Errors that can occur constructing the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Screen dimensions must be even and non-zero.
    #[error("screen size {width}x{height} is not an even non-zero geometry")]
    BadScreenSize { width: u32, height: u32 },

    /// Only 24 and 32 bits per pixel are supported.
    #[error("unsupported screen depth: {0} bpp")]
    UnsupportedDepth(u32),

    /// The row stride cannot hold a full row of pixels.
    #[error("stride {stride} smaller than minimum row size {min}")]
    StrideTooSmall { stride: usize, min: usize },

    /// The codec backend failed to open.
    #[error(transparent)]
    Codec(#[from] guestcast_codec::CodecError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

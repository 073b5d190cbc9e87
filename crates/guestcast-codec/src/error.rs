//! Error types for the codec adapter.

use thiserror::Error;

/// Errors that can occur opening or driving an H.264 encoder.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The preset name was rejected by the encoder.
    #[error("unknown encoder preset: {0}")]
    Preset(String),

    /// The profile could not be applied to the configured parameters.
    #[error("cannot apply encoder profile: {0}")]
    Profile(String),

    /// The encoder handle could not be opened.
    #[error("failed to open encoder: {0}")]
    Open(String),

    /// Encoding a picture failed outright (not a no-output tick).
    #[error("encode failed: {0}")]
    Encode(String),

    /// No encoder backend compiled into this build.
    #[error("no H.264 backend available (build with the `x264` feature)")]
    NotSupported,
}

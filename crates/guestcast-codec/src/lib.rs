//! H.264 codec adapter for the guestcast display pipeline.
//!
//! Defines the contract the display pipeline requires of an encoder:
//! per-frame picture-type hints, Annex-B output, and the session
//! parameters in [`StreamConfig`]. The libx264 software backend lives
//! behind the `x264` cargo feature.

mod error;
pub mod nal;
mod picture;
#[cfg(feature = "x264")]
mod sys;
#[cfg(feature = "x264")]
mod x264;

pub use error::CodecError;
pub use picture::YuvBuffer;
#[cfg(feature = "x264")]
pub use x264::X264Encoder;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Flag bit: add fast-decode tuning on top of zero-latency.
pub const FLAG_FAST_DECODE: u32 = 0x1;

/// Flag bit: CABAC (arithmetic) entropy coding.
pub const FLAG_CABAC: u32 = 0x2;

/// Flag bit: use 3 reference frames instead of the encoder default.
pub const FLAG_EXTENDED_REFS: u32 = 0x4;

/// Immutable per-session encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Encoder preset name (e.g. "veryfast").
    pub preset: String,

    /// H.264 profile name (e.g. "main").
    pub profile: String,

    /// Constant-rate-factor quality target.
    pub crf: u32,

    /// VBV bitrate ceiling in bits per second.
    pub bitrate: u32,

    /// Constant frame rate numerator (the denominator is 1).
    pub fps: u32,

    /// Encoder worker thread count.
    pub threads: u32,

    /// Tuning flag bitmask; unknown bits are ignored.
    pub flags: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            preset: "veryfast".to_string(),
            profile: "main".to_string(),
            crf: 23,
            bitrate: 4_000_000,
            fps: 30,
            threads: 2,
            flags: 0,
        }
    }
}

impl StreamConfig {
    /// Whether the fast-decode tuning bit is set.
    pub fn fast_decode(&self) -> bool {
        self.flags & FLAG_FAST_DECODE != 0
    }

    /// Whether the CABAC entropy coding bit is set.
    pub fn cabac(&self) -> bool {
        self.flags & FLAG_CABAC != 0
    }

    /// Whether the extended reference frames bit is set.
    pub fn extended_refs(&self) -> bool {
        self.flags & FLAG_EXTENDED_REFS != 0
    }
}

/// Picture type hint submitted with each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    /// Let the encoder choose.
    #[default]
    Auto,

    /// Force an IDR keyframe.
    Keyframe,
}

/// One encoded frame: all of its NAL units, Annex-B concatenated.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Start-code framed NAL data. SPS/PPS precede each keyframe.
    pub data: Bytes,

    /// Presentation timestamp echoed from the submitted picture.
    pub pts: i64,

    /// Whether this frame is a keyframe.
    pub keyframe: bool,

    /// Number of NAL units in `data`.
    pub nal_count: i32,
}

impl EncodedFrame {
    /// Split the payload into individual NAL units.
    pub fn nal_units(&self) -> Vec<nal::NalUnit> {
        nal::parse_annex_b(&self.data)
    }
}

/// The contract the display pipeline requires of an H.264 encoder.
///
/// One call submits one picture and yields at most one frame. `Ok(None)`
/// means the encoder produced no output this tick; the pipeline treats
/// that as transient and skips delivery.
pub trait H264Encoder: Send {
    /// Encode one picture with the given timestamp and type hint.
    fn encode(
        &mut self,
        picture: &YuvBuffer,
        pts: i64,
        frame_type: FrameType,
    ) -> CodecResult<Option<EncodedFrame>>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Open the software H.264 backend for the given picture size.
#[cfg(feature = "x264")]
pub fn create_encoder(
    width: u32,
    height: u32,
    config: &StreamConfig,
) -> CodecResult<Box<dyn H264Encoder>> {
    let encoder = X264Encoder::new(width, height, config)?;
    tracing::info!(width, height, preset = %config.preset, "using x264 software encoder");
    Ok(Box::new(encoder))
}

/// Stub when no backend is compiled in.
#[cfg(not(feature = "x264"))]
pub fn create_encoder(
    _width: u32,
    _height: u32,
    _config: &StreamConfig,
) -> CodecResult<Box<dyn H264Encoder>> {
    Err(CodecError::NotSupported)
}

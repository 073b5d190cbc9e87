//! Guest display encoder pipeline.
//!
//! Composites incremental framebuffer updates ("partials") from a guest
//! graphics device into a packed-pixel screen bitmap, converts the dirty
//! regions to planar I420, stitches them into a persistent working
//! picture, and drives an H.264 encoder, delivering Annex-B NAL payloads
//! to an output callback.
//!
//! The flow is producer → slice queue → worker → sink: the graphics
//! thread calls [`DisplayEncoder::render`] with dirty rectangles, and a
//! dedicated worker converts, stitches, and encodes on a bounded-latency
//! cadence. See [`DisplayEncoder`] for the lifecycle surface.

pub mod convert;
mod encoder;
mod error;
mod partial;
mod picture;
mod screen;
mod slice;
mod stats;

pub use encoder::{DisplayEncoder, OutputCallback};
pub use error::{PipelineError, PipelineResult};
pub use partial::PartialBitmap;
pub use picture::WorkingPicture;
pub use screen::{ScreenBuffer, ScreenDescriptor};
pub use slice::{aligned_rect, EncodeSlice};
pub use stats::{StreamStats, StreamStatsSnapshot};

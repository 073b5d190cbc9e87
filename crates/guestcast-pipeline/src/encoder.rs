//! The display encoder pipeline: lifecycle surface and worker thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, instrument, trace, warn};

use guestcast_codec::{create_encoder, H264Encoder, StreamConfig};

use crate::convert;
use crate::error::PipelineResult;
use crate::partial::PartialBitmap;
use crate::picture::WorkingPicture;
use crate::screen::{ScreenBuffer, ScreenDescriptor};
use crate::slice::EncodeSlice;
use crate::stats::{StreamStats, StreamStatsSnapshot};

/// Output sink for encoded frames. The payload is borrowed and valid only
/// for the duration of the call; consumers copy if they need retention.
/// Invoked holding the pipeline lock, so it must not block indefinitely.
pub type OutputCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Upper bound on the latency between a wake-worthy event and an encode
/// tick; also the cadence at which the codec is pumped while idle.
const IDLE_INTERVAL: Duration = Duration::from_millis(500);

/// Everything the pipeline lock protects.
struct PipelineState {
    screen: ScreenBuffer,
    slices: Vec<EncodeSlice>,
    started: bool,
    force_keyframe: bool,
    destroyed: bool,
    sink: Option<OutputCallback>,
}

struct Shared {
    state: Mutex<PipelineState>,
    wake: Condvar,
}

/// Live display-capture encoder pipeline.
///
/// Composites partial framebuffer updates into a packed-pixel screen
/// bitmap and streams H.264 frames of the dirty regions to an output
/// callback. Exactly two threads touch the state: the graphics producer
/// calling the methods below, and the dedicated worker spawned at
/// construction.
pub struct DisplayEncoder {
    shared: Arc<Shared>,
    stats: Arc<StreamStats>,
    desc: ScreenDescriptor,
    worker: Option<JoinHandle<()>>,
}

impl DisplayEncoder {
    /// Create a pipeline using the default (libx264) backend.
    pub fn new(desc: ScreenDescriptor, config: &StreamConfig) -> PipelineResult<Self> {
        desc.validate()?;
        let encoder = create_encoder(desc.width, desc.height, config)?;
        Self::with_encoder(desc, encoder)
    }

    /// Create a pipeline around an already-open encoder backend.
    #[instrument(name = "display_encoder_new", skip_all, fields(width = desc.width, height = desc.height, bpp = desc.bpp))]
    pub fn with_encoder(
        desc: ScreenDescriptor,
        encoder: Box<dyn H264Encoder>,
    ) -> PipelineResult<Self> {
        desc.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(PipelineState {
                screen: ScreenBuffer::new(desc),
                slices: Vec::new(),
                started: false,
                force_keyframe: false,
                destroyed: false,
                sink: None,
            }),
            wake: Condvar::new(),
        });
        let stats = Arc::new(StreamStats::default());

        let worker = {
            let shared = Arc::clone(&shared);
            let stats = Arc::clone(&stats);
            let picture = WorkingPicture::new(desc.width, desc.height);
            thread::Builder::new()
                .name("guestcast-encode".to_string())
                .spawn(move || encode_loop(shared, stats, picture, encoder))
                .expect("failed to spawn encoder worker")
        };

        debug!("display encoder pipeline up");
        Ok(Self {
            shared,
            stats,
            desc,
            worker: Some(worker),
        })
    }

    /// The screen geometry this pipeline was built for.
    pub fn descriptor(&self) -> ScreenDescriptor {
        self.desc
    }

    /// Install the output callback and begin encoding.
    ///
    /// Forces a keyframe and queues one full-screen slice, so the next
    /// worker tick produces a keyframe covering everything.
    #[instrument(name = "display_encoder_start", skip_all)]
    pub fn start(&self, sink: OutputCallback) {
        let mut st = self.shared.state.lock();
        st.started = true;
        st.force_keyframe = true;
        st.sink = Some(sink);
        st.slices.push(EncodeSlice::for_rect(
            0,
            0,
            self.desc.width,
            self.desc.height,
            self.desc.width,
            self.desc.height,
        ));
        info!("encoding started");
    }

    /// Stop delivering output and drop the callback.
    ///
    /// Queued slices remain valid for a future [`start`](Self::start).
    pub fn stop(&self) {
        let mut st = self.shared.state.lock();
        st.started = false;
        st.sink = None;
        info!("encoding stopped");
    }

    /// Ingest one batch of partial updates from the graphics producer.
    ///
    /// Blits each partial into the screen buffer in list order; when
    /// started, also queues an aligned encode slice per partial and wakes
    /// the worker. Malformed partials are producer bugs and abort.
    #[instrument(name = "display_encoder_render", skip_all, fields(partials = partials.len()))]
    pub fn render(&self, partials: &[PartialBitmap<'_>]) {
        let mut st = self.shared.state.lock();
        let st = &mut *st;
        for partial in partials {
            st.screen.blit_partial(partial);
            if st.started {
                st.slices.push(EncodeSlice::for_rect(
                    partial.x,
                    partial.y,
                    partial.width,
                    partial.height,
                    self.desc.width,
                    self.desc.height,
                ));
            }
        }
        if !st.slices.is_empty() {
            self.shared.wake.notify_all();
        }
    }

    /// Request that the next encoded frame be a keyframe and wake the
    /// worker. Multiple requests before the next tick coalesce into one.
    pub fn force_keyframe(&self) {
        let mut st = self.shared.state.lock();
        st.force_keyframe = true;
        self.shared.wake.notify_all();
    }

    /// Current stream counters.
    pub fn stats(&self) -> StreamStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for DisplayEncoder {
    fn drop(&mut self) {
        {
            let mut st = self.shared.state.lock();
            st.destroyed = true;
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        debug!("display encoder pipeline down");
    }
}

/// The worker: wait for slices (or the idle timeout), convert under the
/// lock, stitch and encode outside it, deliver under the lock.
fn encode_loop(
    shared: Arc<Shared>,
    stats: Arc<StreamStats>,
    mut picture: WorkingPicture,
    mut encoder: Box<dyn H264Encoder>,
) {
    debug!(encoder = encoder.name(), "encoder worker up");

    loop {
        let mut st = shared.state.lock();
        let _ = shared.wake.wait_for(&mut st, IDLE_INTERVAL);

        if st.destroyed {
            break;
        }
        if !st.started {
            continue;
        }

        let batch = {
            let st = &mut *st;
            if st.slices.is_empty() {
                stats.record_idle_tick();
                Vec::new()
            } else {
                // The lock keeps the producer from mutating screen rows
                // that feed a conversion.
                convert_slices(&st.screen, &mut st.slices);
                std::mem::take(&mut st.slices)
            }
        };
        if std::mem::replace(&mut st.force_keyframe, false) {
            picture.request_keyframe();
        }
        drop(st);

        for slice in &batch {
            picture.stitch(slice);
        }
        drop(batch);

        let (pts, frame_type) = picture.begin_frame();
        let frame = match encoder.encode(picture.yuv(), pts, frame_type) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, pts, "encode tick failed");
                None
            }
        };

        if let Some(frame) = frame {
            stats.record_frame(frame.data.len(), frame.keyframe);
            let mut st = shared.state.lock();
            if let Some(sink) = st.sink.as_mut() {
                sink(&frame.data);
            }
        }
    }

    debug!(encoder = encoder.name(), "encoder worker down");
}

/// Convert each pending slice's screen pixels into its planar tile.
fn convert_slices(screen: &ScreenBuffer, slices: &mut [EncodeSlice]) {
    let started = Instant::now();
    let desc = *screen.descriptor();

    for slice in slices.iter_mut() {
        let offset = slice.y as usize * desc.stride + slice.x as usize * desc.bytes_per_pixel();
        let src = &screen.data()[offset..];
        match desc.bpp {
            32 => convert::argb_to_i420(src, desc.stride, &mut slice.tile),
            24 => convert::rgb24_to_i420(src, desc.stride, &mut slice.tile),
            depth => unreachable!("unsupported screen depth: {depth} bpp"),
        }
    }

    trace!(
        slices = slices.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "converted pending slices"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestcast_codec::{CodecResult, EncodedFrame, FrameType, YuvBuffer};

    struct NullEncoder;

    impl H264Encoder for NullEncoder {
        fn encode(
            &mut self,
            _picture: &YuvBuffer,
            _pts: i64,
            _frame_type: FrameType,
        ) -> CodecResult<Option<EncodedFrame>> {
            Ok(None)
        }

        fn name(&self) -> &'static str {
            "null"
        }
    }

    fn descriptor() -> ScreenDescriptor {
        ScreenDescriptor {
            width: 64,
            height: 32,
            bpp: 32,
            stride: 256,
        }
    }

    #[test]
    fn test_rejects_odd_geometry() {
        let desc = ScreenDescriptor {
            width: 63,
            ..descriptor()
        };
        assert!(DisplayEncoder::with_encoder(desc, Box::new(NullEncoder)).is_err());
    }

    #[test]
    fn test_drop_joins_worker() {
        let encoder = DisplayEncoder::with_encoder(descriptor(), Box::new(NullEncoder)).unwrap();
        drop(encoder);
    }

    #[test]
    fn test_stats_start_at_zero() {
        let encoder = DisplayEncoder::with_encoder(descriptor(), Box::new(NullEncoder)).unwrap();
        let stats = encoder.stats();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.bytes, 0);
    }
}

//! Stream statistics counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters updated by the encoder worker.
#[derive(Debug, Default)]
pub struct StreamStats {
    frames: AtomicU64,
    keyframes: AtomicU64,
    bytes: AtomicU64,
    idle_ticks: AtomicU64,
}

impl StreamStats {
    pub(crate) fn record_frame(&self, bytes: usize, keyframe: bool) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        if keyframe {
            self.keyframes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_idle_tick(&self) {
        self.idle_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values.
    pub fn snapshot(&self) -> StreamStatsSnapshot {
        StreamStatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            keyframes: self.keyframes.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            idle_ticks: self.idle_ticks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the stream counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StreamStatsSnapshot {
    /// Frames delivered to the output callback.
    pub frames: u64,
    /// Keyframes among the delivered frames.
    pub keyframes: u64,
    /// Total NAL bytes delivered.
    pub bytes: u64,
    /// Worker wakeups that found no pending slices.
    pub idle_ticks: u64,
}

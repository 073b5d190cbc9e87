//! Screen geometry and the packed-pixel backing bitmap.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::partial::PartialBitmap;

/// Fixed per-session screen geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDescriptor {
    /// Width in pixels; must be even.
    pub width: u32,
    /// Height in pixels; must be even.
    pub height: u32,
    /// Bits per pixel; 24 or 32.
    pub bpp: u32,
    /// Row stride in bytes; at least `width * bpp / 8`.
    pub stride: usize,
}

impl ScreenDescriptor {
    /// Check the session invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(PipelineError::BadScreenSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.bpp != 24 && self.bpp != 32 {
            return Err(PipelineError::UnsupportedDepth(self.bpp));
        }
        let min = self.width as usize * self.bytes_per_pixel();
        if self.stride < min {
            return Err(PipelineError::StrideTooSmall {
                stride: self.stride,
                min,
            });
        }
        Ok(())
    }

    /// Bytes per packed pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        (self.bpp / 8) as usize
    }

    /// Total backing-store size in bytes.
    pub fn buffer_len(&self) -> usize {
        self.stride * self.height as usize
    }
}

/// The full-screen packed-pixel bitmap that partial updates composite into.
///
/// Owned by the pipeline and mutated only under the pipeline lock.
pub struct ScreenBuffer {
    desc: ScreenDescriptor,
    data: Vec<u8>,
}

impl ScreenBuffer {
    /// Allocate a zeroed bitmap for the given geometry.
    pub fn new(desc: ScreenDescriptor) -> Self {
        Self {
            data: vec![0u8; desc.buffer_len()],
            desc,
        }
    }

    /// The geometry this buffer was allocated for.
    pub fn descriptor(&self) -> &ScreenDescriptor {
        &self.desc
    }

    /// Raw packed-pixel contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Blit one partial's scatter/gather payload into the bitmap.
    ///
    /// Rows are written top-down, or bottom-up when the partial is
    /// flipped. Each segment supplies `segment.len() / partial.stride`
    /// whole source rows; the copy stops once the partial's height is
    /// satisfied or the segment list runs out. A rectangle outside the
    /// screen is a producer bug and aborts the process.
    pub fn blit_partial(&mut self, partial: &PartialBitmap<'_>) {
        let bpp = self.desc.bytes_per_pixel();
        let line = partial.width as usize * bpp;

        assert!(
            partial.x + partial.width <= self.desc.width
                && partial.y + partial.height <= self.desc.height,
            "partial {},{} {}x{} outside {}x{} screen",
            partial.x,
            partial.y,
            partial.width,
            partial.height,
            self.desc.width,
            self.desc.height,
        );
        assert!(
            line <= partial.stride,
            "partial row of {line} bytes exceeds source stride {}",
            partial.stride,
        );

        let x_off = partial.x as usize * bpp;
        let (mut dst_row, step): (i64, i64) = if partial.flip {
            ((partial.y + partial.height - 1) as i64, -1)
        } else {
            (partial.y as i64, 1)
        };

        let mut remaining = partial.height as usize;
        for segment in &partial.segments {
            if remaining == 0 {
                break;
            }
            let mut rows = segment.len() / partial.stride;
            let mut src_off = 0;
            while rows > 0 && remaining > 0 {
                let dst_off = dst_row as usize * self.desc.stride + x_off;
                self.data[dst_off..dst_off + line]
                    .copy_from_slice(&segment[src_off..src_off + line]);
                src_off += partial.stride;
                dst_row += step;
                rows -= 1;
                remaining -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ScreenDescriptor {
        ScreenDescriptor {
            width: 640,
            height: 480,
            bpp: 32,
            stride: 2560,
        }
    }

    fn partial<'a>(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        stride: usize,
        flip: bool,
        segments: Vec<&'a [u8]>,
    ) -> PartialBitmap<'a> {
        PartialBitmap {
            x,
            y,
            width,
            height,
            stride,
            flip,
            segments,
        }
    }

    #[test]
    fn test_validate_accepts_sane_geometry() {
        assert!(descriptor().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_odd_size() {
        let desc = ScreenDescriptor {
            width: 641,
            ..descriptor()
        };
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::BadScreenSize { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_depth() {
        let desc = ScreenDescriptor {
            bpp: 16,
            ..descriptor()
        };
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::UnsupportedDepth(16))
        ));
    }

    #[test]
    fn test_validate_rejects_short_stride() {
        let desc = ScreenDescriptor {
            stride: 640,
            ..descriptor()
        };
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::StrideTooSmall { .. })
        ));
    }

    #[test]
    fn test_aligned_blit() {
        // 32x32 block of 0xFF at (16,16): rows 16..47, byte offsets 64..191
        let mut screen = ScreenBuffer::new(descriptor());
        let data = vec![0xFFu8; 4096];
        screen.blit_partial(&partial(16, 16, 32, 32, 128, false, vec![&data]));

        for row in 16..48 {
            let base = row * 2560;
            assert!(screen.data()[base + 64..base + 192].iter().all(|&b| b == 0xFF));
            assert_eq!(screen.data()[base + 63], 0);
            assert_eq!(screen.data()[base + 192], 0);
        }
        assert!(screen.data()[15 * 2560..16 * 2560].iter().all(|&b| b == 0));
        assert!(screen.data()[48 * 2560..49 * 2560].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_flipped_blit_reverses_rows() {
        // Mark each source row with its own index; flipped delivery puts
        // source row 0 into screen row 31 and row 31 into screen row 0.
        let mut screen = ScreenBuffer::new(descriptor());
        let stride = 64;
        let mut data = vec![0u8; 32 * stride];
        for (row, chunk) in data.chunks_mut(stride).enumerate() {
            chunk.fill(row as u8 + 1);
        }
        screen.blit_partial(&partial(0, 0, 16, 32, stride, true, vec![&data]));

        for row in 0..32 {
            assert_eq!(screen.data()[row * 2560], (32 - row) as u8);
        }
    }

    #[test]
    fn test_scatter_segments_match_single_segment() {
        // A 100-row partial split across 7 uneven segments must land
        // identically to a single-segment delivery.
        let stride = 256;
        let width = 64u32;
        let data: Vec<u8> = (0..100 * stride).map(|i| (i % 251) as u8).collect();

        let mut single = ScreenBuffer::new(descriptor());
        single.blit_partial(&partial(0, 100, width, 100, stride, false, vec![&data]));

        let rows = [13usize, 1, 29, 7, 20, 18, 12];
        assert_eq!(rows.iter().sum::<usize>(), 100);
        let mut segments = Vec::new();
        let mut at = 0;
        for count in rows {
            segments.push(&data[at..at + count * stride]);
            at += count * stride;
        }
        let mut split = ScreenBuffer::new(descriptor());
        split.blit_partial(&partial(0, 100, width, 100, stride, false, segments));

        assert_eq!(single.data(), split.data());
    }

    #[test]
    fn test_short_segment_list_stops_early() {
        let mut screen = ScreenBuffer::new(descriptor());
        let data = vec![0xAAu8; 2 * 128];
        // Partial claims 4 rows but only delivers 2.
        screen.blit_partial(&partial(0, 0, 32, 4, 128, false, vec![&data]));
        assert_eq!(screen.data()[0], 0xAA);
        assert_eq!(screen.data()[2560], 0xAA);
        assert_eq!(screen.data()[2 * 2560], 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_partial_aborts() {
        let mut screen = ScreenBuffer::new(descriptor());
        let data = vec![0u8; 4096];
        screen.blit_partial(&partial(632, 0, 16, 2, 64, false, vec![&data]));
    }
}

//! Encode slices: aligned dirty regions awaiting conversion.

use guestcast_codec::YuvBuffer;

/// Horizontal alignment for encode regions; matches the macroblock width
/// the conversion routines and codec expect.
const WIDTH_ALIGN: u32 = 16;

/// Vertical alignment; 4:2:0 subsampling needs even rows.
const HEIGHT_ALIGN: u32 = 2;

/// Expand a dirty rectangle outward to alignment, clamped to the screen.
///
/// Alignment widens the encode region only; the blit into the screen
/// buffer stays unaligned, so expanded border pixels re-encode whatever
/// the bitmap already holds.
pub fn aligned_rect(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    screen_width: u32,
    screen_height: u32,
) -> (u32, u32, u32, u32) {
    let mut left = x;
    let mut right = x + width;
    let mut top = y;
    let mut bottom = y + height;

    left -= left % WIDTH_ALIGN;
    if right % WIDTH_ALIGN != 0 {
        right += WIDTH_ALIGN - right % WIDTH_ALIGN;
    }
    top -= top % HEIGHT_ALIGN;
    if bottom % HEIGHT_ALIGN != 0 {
        bottom += HEIGHT_ALIGN - bottom % HEIGHT_ALIGN;
    }

    right = right.min(screen_width);
    bottom = bottom.min(screen_height);

    (left, top, right - left, bottom - top)
}

/// An aligned encode region owning its converted I420 tile.
///
/// Created when a partial is accepted, consumed once by the worker while
/// stitching into the working picture, then dropped.
pub struct EncodeSlice {
    /// Left edge; multiple of 16.
    pub x: u32,
    /// Top edge; even.
    pub y: u32,
    /// Width; multiple of 16 unless clamped at the right screen edge.
    pub width: u32,
    /// Height; even.
    pub height: u32,
    /// Planar tile sized exactly to the rectangle.
    pub tile: YuvBuffer,
}

impl EncodeSlice {
    /// Build the slice covering a dirty rectangle, aligned and clamped.
    pub fn for_rect(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        screen_width: u32,
        screen_height: u32,
    ) -> Self {
        let (x, y, width, height) = aligned_rect(x, y, width, height, screen_width, screen_height);
        Self {
            x,
            y,
            width,
            height,
            tile: YuvBuffer::new(width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_rect_is_identity_on_aligned_input() {
        assert_eq!(aligned_rect(16, 16, 32, 32, 640, 480), (16, 16, 32, 32));
    }

    #[test]
    fn test_unaligned_rect_expands() {
        // left 5 -> 0, right 15 -> 16, top 3 -> 2, bottom 8 stays
        assert_eq!(aligned_rect(5, 3, 10, 5, 640, 480), (0, 2, 16, 6));
    }

    #[test]
    fn test_rect_clamps_to_screen() {
        assert_eq!(aligned_rect(630, 475, 10, 5, 640, 480), (624, 474, 16, 6));
        assert_eq!(aligned_rect(0, 0, 640, 480, 640, 480), (0, 0, 640, 480));
    }

    #[test]
    fn test_slice_tile_matches_rect() {
        let slice = EncodeSlice::for_rect(5, 3, 10, 5, 640, 480);
        assert_eq!((slice.x, slice.y, slice.width, slice.height), (0, 2, 16, 6));
        assert_eq!(slice.tile.width, 16);
        assert_eq!(slice.tile.height, 6);
        assert_eq!(slice.tile.y.len(), 16 * 6);
        assert_eq!(slice.tile.u.len(), 8 * 3);
    }
}

//! The persistent working picture the encoder consumes.

use guestcast_codec::{FrameType, YuvBuffer};

use crate::slice::EncodeSlice;

/// Full-screen planar composite carrying the running picture state across
/// frames: a monotonic presentation timestamp and the type hint for the
/// next submission.
pub struct WorkingPicture {
    yuv: YuvBuffer,
    pts: i64,
    next_type: FrameType,
}

impl WorkingPicture {
    /// Allocate a picture covering the whole screen.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            yuv: YuvBuffer::new(width, height),
            pts: 0,
            next_type: FrameType::Auto,
        }
    }

    /// The composite planes, for submission to the encoder.
    pub fn yuv(&self) -> &YuvBuffer {
        &self.yuv
    }

    /// Current presentation timestamp.
    pub fn pts(&self) -> i64 {
        self.pts
    }

    /// Make the next submitted frame a keyframe.
    pub fn request_keyframe(&mut self) {
        self.next_type = FrameType::Keyframe;
    }

    /// Advance to the next tick: bump the timestamp and consume the type
    /// hint, which reverts to [`FrameType::Auto`].
    pub fn begin_frame(&mut self) -> (i64, FrameType) {
        self.pts += 1;
        (self.pts, std::mem::take(&mut self.next_type))
    }

    /// Copy a converted slice tile into the composite at its offsets.
    ///
    /// The slice geometry is even-aligned, so the chroma halving is exact.
    pub fn stitch(&mut self, slice: &EncodeSlice) {
        let tile = &slice.tile;
        let (x, y) = (slice.x as usize, slice.y as usize);
        let (w, h) = (slice.width as usize, slice.height as usize);

        copy_plane(&tile.y, tile.stride_y, &mut self.yuv.y, self.yuv.stride_y, x, y, w, h);
        copy_plane(
            &tile.u,
            tile.stride_u,
            &mut self.yuv.u,
            self.yuv.stride_u,
            x / 2,
            y / 2,
            w / 2,
            h / 2,
        );
        copy_plane(
            &tile.v,
            tile.stride_v,
            &mut self.yuv.v,
            self.yuv.stride_v,
            x / 2,
            y / 2,
            w / 2,
            h / 2,
        );
    }
}

fn copy_plane(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) {
    for row in 0..h {
        let from = row * src_stride;
        let to = (y + row) * dst_stride + x;
        dst[to..to + w].copy_from_slice(&src[from..from + w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stitch_lands_at_plane_offsets() {
        let mut picture = WorkingPicture::new(64, 32);
        let mut slice = EncodeSlice::for_rect(16, 4, 16, 4, 64, 32);
        slice.tile.y.fill(0x11);
        slice.tile.u.fill(0x22);
        slice.tile.v.fill(0x33);

        picture.stitch(&slice);

        let yuv = picture.yuv();
        // Y rows 4..7, columns 16..31
        assert_eq!(yuv.y[4 * 64 + 16], 0x11);
        assert_eq!(yuv.y[7 * 64 + 31], 0x11);
        assert_eq!(yuv.y[4 * 64 + 15], 0);
        assert_eq!(yuv.y[3 * 64 + 16], 0);
        // U/V rows 2..3, columns 8..15
        assert_eq!(yuv.u[2 * 32 + 8], 0x22);
        assert_eq!(yuv.u[3 * 32 + 15], 0x22);
        assert_eq!(yuv.u[2 * 32 + 7], 128);
        assert_eq!(yuv.v[2 * 32 + 8], 0x33);
        assert_eq!(yuv.v[1 * 32 + 8], 128);
    }

    #[test]
    fn test_begin_frame_advances_and_resets_hint() {
        let mut picture = WorkingPicture::new(16, 16);
        picture.request_keyframe();
        assert_eq!(picture.begin_frame(), (1, FrameType::Keyframe));
        assert_eq!(picture.begin_frame(), (2, FrameType::Auto));
        assert_eq!(picture.pts(), 2);
    }
}

//! Planar I420 picture buffers.
//!
//! A [`YuvBuffer`] stores Y at full resolution and U/V at half resolution,
//! each plane with its own stride. The same type backs both the short-lived
//! tiles converted from dirty screen regions and the persistent full-screen
//! picture submitted to the encoder.

/// An owned planar 4:2:0 image.
#[derive(Debug, Clone)]
pub struct YuvBuffer {
    /// Width in pixels; even.
    pub width: u32,
    /// Height in pixels; even.
    pub height: u32,
    /// Y plane row stride in bytes.
    pub stride_y: usize,
    /// U plane row stride in bytes.
    pub stride_u: usize,
    /// V plane row stride in bytes.
    pub stride_v: usize,
    /// Full-resolution luma plane.
    pub y: Vec<u8>,
    /// Half-resolution Cb plane.
    pub u: Vec<u8>,
    /// Half-resolution Cr plane.
    pub v: Vec<u8>,
}

impl YuvBuffer {
    /// Allocate planes for the given dimensions. Both must be even.
    ///
    /// Luma starts black, chroma starts neutral (128).
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width % 2 == 0 && height % 2 == 0,
            "I420 dimensions must be even, got {width}x{height}"
        );

        let stride_y = width as usize;
        let stride_c = (width / 2) as usize;
        let chroma_rows = (height / 2) as usize;

        Self {
            width,
            height,
            stride_y,
            stride_u: stride_c,
            stride_v: stride_c,
            y: vec![0u8; stride_y * height as usize],
            u: vec![128u8; stride_c * chroma_rows],
            v: vec![128u8; stride_c * chroma_rows],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_sizes() {
        let buf = YuvBuffer::new(640, 480);
        assert_eq!(buf.y.len(), 640 * 480);
        assert_eq!(buf.u.len(), 320 * 240);
        assert_eq!(buf.v.len(), 320 * 240);
        assert_eq!(buf.stride_y, 640);
        assert_eq!(buf.stride_u, 320);
        assert_eq!(buf.stride_v, 320);
    }

    #[test]
    fn test_neutral_chroma() {
        let buf = YuvBuffer::new(16, 2);
        assert!(buf.y.iter().all(|&b| b == 0));
        assert!(buf.u.iter().all(|&b| b == 128));
        assert!(buf.v.iter().all(|&b| b == 128));
    }

    #[test]
    #[should_panic(expected = "must be even")]
    fn test_odd_dimensions_rejected() {
        let _ = YuvBuffer::new(641, 480);
    }
}

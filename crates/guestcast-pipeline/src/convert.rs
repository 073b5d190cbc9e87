//! Packed RGB to planar I420 conversion.
//!
//! BT.601 studio-swing coefficients with 2x2 chroma averaging. Byte order
//! follows the libyuv convention: "ARGB" means B,G,R,A in memory (a
//! little-endian ARGB word) and "RGB24" means B,G,R. Output planes are
//! written through their own strides, so a tile narrower than its buffer
//! converts correctly.

use guestcast_codec::YuvBuffer;

#[inline(always)]
fn luma(r: u32, g: u32, b: u32) -> u8 {
    (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16) as u8
}

#[inline(always)]
fn chroma_u(r: i32, g: i32, b: i32) -> u8 {
    (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8
}

#[inline(always)]
fn chroma_v(r: i32, g: i32, b: i32) -> u8 {
    (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8
}

fn packed_to_i420<const BPP: usize>(src: &[u8], src_stride: usize, dst: &mut YuvBuffer) {
    let width = dst.width as usize;
    let height = dst.height as usize;

    for pair in 0..height / 2 {
        let top = 2 * pair;

        for row in [top, top + 1] {
            for col in 0..width {
                let px = row * src_stride + col * BPP;
                let (b, g, r) = (src[px] as u32, src[px + 1] as u32, src[px + 2] as u32);
                dst.y[row * dst.stride_y + col] = luma(r, g, b);
            }
        }

        // Chroma from the rounded average of each 2x2 pixel block.
        for cx in 0..width / 2 {
            let mut sums = [0i32; 3];
            for (row, col) in [
                (top, 2 * cx),
                (top, 2 * cx + 1),
                (top + 1, 2 * cx),
                (top + 1, 2 * cx + 1),
            ] {
                let px = row * src_stride + col * BPP;
                sums[0] += src[px] as i32;
                sums[1] += src[px + 1] as i32;
                sums[2] += src[px + 2] as i32;
            }
            let (b, g, r) = ((sums[0] + 2) / 4, (sums[1] + 2) / 4, (sums[2] + 2) / 4);
            dst.u[pair * dst.stride_u + cx] = chroma_u(r, g, b);
            dst.v[pair * dst.stride_v + cx] = chroma_v(r, g, b);
        }
    }
}

/// Convert packed 32-bit ARGB (B,G,R,A memory order) to I420.
pub fn argb_to_i420(src: &[u8], src_stride: usize, dst: &mut YuvBuffer) {
    packed_to_i420::<4>(src, src_stride, dst);
}

/// Convert packed 24-bit RGB (B,G,R memory order) to I420.
pub fn rgb24_to_i420(src: &[u8], src_stride: usize, dst: &mut YuvBuffer) {
    packed_to_i420::<3>(src, src_stride, dst);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_argb(width: usize, height: usize, b: u8, g: u8, r: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[b, g, r, 0xFF]);
        }
        data
    }

    #[test]
    fn test_white_argb() {
        let src = solid_argb(16, 2, 255, 255, 255);
        let mut dst = YuvBuffer::new(16, 2);
        argb_to_i420(&src, 16 * 4, &mut dst);
        assert!(dst.y.iter().all(|&y| y == 235));
        assert!(dst.u.iter().all(|&u| u == 128));
        assert!(dst.v.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_black_argb() {
        let src = solid_argb(16, 2, 0, 0, 0);
        let mut dst = YuvBuffer::new(16, 2);
        argb_to_i420(&src, 16 * 4, &mut dst);
        assert!(dst.y.iter().all(|&y| y == 16));
        assert!(dst.u.iter().all(|&u| u == 128));
        assert!(dst.v.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_red_argb() {
        let src = solid_argb(16, 2, 0, 0, 255);
        let mut dst = YuvBuffer::new(16, 2);
        argb_to_i420(&src, 16 * 4, &mut dst);
        assert!(dst.y.iter().all(|&y| y == 82));
        assert!(dst.u.iter().all(|&u| u == 90));
        assert!(dst.v.iter().all(|&v| v == 240));
    }

    #[test]
    fn test_rgb24_matches_argb() {
        let argb = solid_argb(16, 4, 10, 160, 200);
        let mut rgb24 = Vec::new();
        for px in argb.chunks(4) {
            rgb24.extend_from_slice(&px[..3]);
        }

        let mut from_argb = YuvBuffer::new(16, 4);
        let mut from_rgb24 = YuvBuffer::new(16, 4);
        argb_to_i420(&argb, 16 * 4, &mut from_argb);
        rgb24_to_i420(&rgb24, 16 * 3, &mut from_rgb24);

        assert_eq!(from_argb.y, from_rgb24.y);
        assert_eq!(from_argb.u, from_rgb24.u);
        assert_eq!(from_argb.v, from_rgb24.v);
    }

    #[test]
    fn test_chroma_averages_2x2_block() {
        // Top row white, bottom row black: chroma stays neutral, luma
        // alternates per row.
        let mut src = solid_argb(16, 1, 255, 255, 255);
        src.extend_from_slice(&solid_argb(16, 1, 0, 0, 0));
        let mut dst = YuvBuffer::new(16, 2);
        argb_to_i420(&src, 16 * 4, &mut dst);

        assert!(dst.y[..16].iter().all(|&y| y == 235));
        assert!(dst.y[16..].iter().all(|&y| y == 16));
        // average of (255,255,255) and (0,0,0) is 128 (rounded)
        assert!(dst.u.iter().all(|&u| u == 128));
        assert!(dst.v.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_wide_source_stride() {
        // Convert a 16x2 region out of a 64-pixel-wide source row.
        let src = solid_argb(64, 2, 0, 0, 255);
        let mut dst = YuvBuffer::new(16, 2);
        argb_to_i420(&src, 64 * 4, &mut dst);
        assert!(dst.y.iter().all(|&y| y == 82));
    }
}

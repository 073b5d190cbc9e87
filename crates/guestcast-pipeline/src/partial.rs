//! Partial framebuffer updates from the graphics producer.

/// One dirty-rectangle update with its scatter/gather payload.
///
/// The I/O segments are owned by the producer and borrowed only for the
/// duration of [`DisplayEncoder::render`](crate::DisplayEncoder::render).
/// Their concatenation supplies the rectangle's pixels in `stride`-sized
/// rows; each segment's length is a whole multiple of `stride`, so a
/// segment always carries complete rows.
#[derive(Debug, Clone)]
pub struct PartialBitmap<'a> {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Source row stride in bytes.
    pub stride: usize,
    /// Bottom-up row order when set.
    pub flip: bool,
    /// Ordered scatter/gather payload.
    pub segments: Vec<&'a [u8]>,
}

//! The host image boundary.

use image::RgbaImage;

use crate::buffer::{BufferError, PixelBuffer, BYTES_PER_PIXEL};

/// A frame as exchanged with the host: BGRA8 pixels plus the offset of
/// the buffer's top-left corner in the host's coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct HostFrame {
    /// Pixel data.
    pub buffer: PixelBuffer,
    /// Placement of the buffer in host space.
    pub offset: (f32, f32),
}

impl HostFrame {
    /// Wraps a buffer at `offset`.
    pub fn new(buffer: PixelBuffer, offset: (f32, f32)) -> Self {
        Self { buffer, offset }
    }

    /// Wraps host memory, rejecting anything other than 4-channel 8-bit
    /// pixels.
    pub fn from_raw(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        channels: usize,
        offset: (f32, f32),
    ) -> Result<Self, BufferError> {
        if channels != BYTES_PER_PIXEL {
            return Err(BufferError::UnsupportedFormat { channels });
        }
        Ok(Self::new(PixelBuffer::from_raw(data, width, height, stride)?, offset))
    }

    /// A new frame with `buffer` anchored at this frame's offset.
    pub fn reanchor(&self, buffer: PixelBuffer) -> Self {
        Self::new(buffer, self.offset)
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// An image type that can cross the host boundary.
pub trait HostSurface: Sized {
    /// Converts the surface into a frame at offset zero.
    fn to_frame(&self) -> Result<HostFrame, BufferError>;

    /// Converts a frame into the surface type, dropping the offset.
    fn from_frame(frame: &HostFrame) -> Result<Self, BufferError>;
}

/// Swaps the first and third byte of every pixel.
fn swap_red_blue(bytes: &mut [u8]) {
    for px in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

impl HostSurface for RgbaImage {
    fn to_frame(&self) -> Result<HostFrame, BufferError> {
        let (width, height) = self.dimensions();
        let mut data = self.as_raw().clone();
        swap_red_blue(&mut data);
        let buffer = PixelBuffer::from_raw(data, width, height, width as usize * BYTES_PER_PIXEL)?;
        Ok(HostFrame::new(buffer, (0.0, 0.0)))
    }

    fn from_frame(frame: &HostFrame) -> Result<Self, BufferError> {
        let mut data = frame.buffer.to_packed();
        swap_red_blue(&mut data);
        let expected = frame.buffer.pixel_count() * BYTES_PER_PIXEL;
        let actual = data.len();
        RgbaImage::from_raw(frame.width(), frame.height(), data)
            .ok_or(BufferError::DataTooShort { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_non_bgra_rejected() {
        let err = HostFrame::from_raw(vec![0; 12], 2, 2, 6, 3, (0.0, 0.0)).unwrap_err();
        assert_eq!(err, BufferError::UnsupportedFormat { channels: 3 });
    }

    #[test]
    fn test_channel_order_swizzled() {
        let img = RgbaImage::from_raw(1, 1, vec![10, 20, 30, 40]).unwrap();
        let frame = img.to_frame().unwrap();
        assert_eq!(frame.buffer.pixel(0, 0), [30, 20, 10, 40]);
        assert_eq!(frame.offset, (0.0, 0.0));
    }

    #[test]
    fn test_strided_frame_exports_packed() {
        let mut data = vec![0u8; 12 * 2];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[12..20].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        let frame = HostFrame::from_raw(data, 2, 2, 12, 4, (3.5, -1.0)).unwrap();
        let img = RgbaImage::from_frame(&frame).unwrap();
        assert_eq!(img.get_pixel(1, 1).0, [15, 14, 13, 16]);
    }

    #[test]
    fn test_reanchor_keeps_offset() {
        let frame = HostFrame::new(PixelBuffer::new(2, 2).unwrap(), (4.0, 8.0));
        let out = frame.reanchor(PixelBuffer::filled(2, 2, [1, 1, 1, 1]).unwrap());
        assert_eq!(out.offset, (4.0, 8.0));
    }

    proptest! {
        #[test]
        fn prop_round_trip_is_lossless(
            (w, h, bytes) in (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), proptest::collection::vec(any::<u8>(), (w * h * 4) as usize))
            })
        ) {
            let buffer = PixelBuffer::from_raw(bytes, w, h, w as usize * 4).unwrap();
            let frame = HostFrame::new(buffer, (0.0, 0.0));
            let img = RgbaImage::from_frame(&frame).unwrap();
            let back = img.to_frame().unwrap();
            prop_assert_eq!(back, frame);
        }
    }
}

//! Interleaved BGRA8 pixel buffer.
//!
//! The layout matches what the host hands over at the image boundary:
//! top-left origin, four 8-bit channels in B, G, R, A order with
//! premultiplied alpha, and an explicit row stride in bytes.

use thiserror::Error;

/// Number of bytes per BGRA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Channel index of blue within a BGRA8 pixel.
pub const CHANNEL_B: usize = 0;
/// Channel index of green within a BGRA8 pixel.
pub const CHANNEL_G: usize = 1;
/// Channel index of red within a BGRA8 pixel.
pub const CHANNEL_R: usize = 2;
/// Channel index of alpha within a BGRA8 pixel.
pub const CHANNEL_A: usize = 3;

/// Errors raised when constructing or combining buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("invalid buffer dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("unsupported pixel format: expected 4 channels of 8 bits, got {channels} channel(s)")]
    UnsupportedFormat { channels: usize },
    #[error("row stride {stride} is smaller than {min} bytes")]
    StrideTooSmall { stride: usize, min: usize },
    #[error("pixel data too short: expected at least {expected} bytes, got {actual}")]
    DataTooShort { expected: usize, actual: usize },
    #[error("dimension mismatch: {expected:?} vs {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// A 2-D grid of BGRA8 premultiplied samples.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Raw bytes, `stride * height` long.
    data: Vec<u8>,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Bytes between the starts of consecutive rows.
    stride: usize,
}

impl PixelBuffer {
    /// Creates a zeroed (transparent black) buffer with a tight stride.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Creates a buffer with every pixel set to `bgra`.
    pub fn filled(width: u32, height: u32, bgra: [u8; 4]) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        let data = bgra.repeat(width as usize * height as usize);
        Ok(Self {
            data,
            width,
            height,
            stride: width as usize * BYTES_PER_PIXEL,
        })
    }

    /// Wraps raw bytes with an explicit row stride.
    ///
    /// The final row only needs `width * 4` bytes; the padding after it
    /// may be absent.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, stride: usize) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        let min = width as usize * BYTES_PER_PIXEL;
        if stride < min {
            return Err(BufferError::StrideTooSmall { stride, min });
        }
        let expected = stride * (height as usize - 1) + min;
        if data.len() < expected {
            return Err(BufferError::DataTooShort {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the buffer width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the buffer height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `(width, height)` as `usize` for indexing.
    #[inline]
    pub fn extent(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns true when both buffers have the same width and height.
    #[inline]
    pub fn same_extent(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Returns the `width * 4` bytes of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    /// Returns the `width * 4` bytes of row `y` mutably.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let len = self.width as usize * BYTES_PER_PIXEL;
        &mut self.data[start..start + len]
    }

    /// Reads the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = y * self.stride + x * BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Writes the pixel at `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, bgra: [u8; 4]) {
        let i = y * self.stride + x * BYTES_PER_PIXEL;
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&bgra);
    }

    /// Returns the raw bytes including any row padding.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies the pixels into a new vector with a tight `width * 4` stride.
    pub fn to_packed(&self) -> Vec<u8> {
        let (w, h) = self.extent();
        if self.stride == w * BYTES_PER_PIXEL && self.data.len() == w * h * BYTES_PER_PIXEL {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(w * h * BYTES_PER_PIXEL);
        for y in 0..h {
            out.extend_from_slice(self.row(y));
        }
        out
    }

    /// Overwrites this buffer's pixels with `other`'s.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> Result<(), BufferError> {
        if !self.same_extent(other) {
            return Err(BufferError::DimensionMismatch {
                expected: self.extent(),
                actual: other.extent(),
            });
        }
        for y in 0..self.height as usize {
            self.row_mut(y).copy_from_slice(other.row(y));
        }
        Ok(())
    }

    /// Returns true when every pixel equals `bgra`.
    pub fn is_uniform(&self, bgra: [u8; 4]) -> bool {
        (0..self.height as usize).all(|y| self.row(y).chunks_exact(BYTES_PER_PIXEL).all(|px| px == bgra))
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions { width, height });
    }
    Ok(())
}

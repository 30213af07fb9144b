//! Pixel and sample storage.
//!
//! `PixelBuffer` is the interleaved BGRA8 image exchanged with the host
//! and persisted as the accumulator. `Plane<T>` holds every
//! single-channel intermediate: grayscale frames, float coordinate maps,
//! masks and motion vectors.

mod pixel;
mod plane;

pub use pixel::{
    BufferError, PixelBuffer, BYTES_PER_PIXEL, CHANNEL_A, CHANNEL_B, CHANNEL_G, CHANNEL_R,
};
pub use plane::{FloatPlane, GrayPlane, Plane};

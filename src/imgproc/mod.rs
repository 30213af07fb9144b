//! Image-processing primitives used by the effect pipeline.
//!
//! Only what the pipeline needs: luma and YCrCb conversion, resampling,
//! Gaussian blur, Canny edges, coordinate-map sampling and weighted
//! blends. Numeric conventions (BT.601 weights, round-half-to-even
//! saturation, mirrored borders) are fixed because they change
//! observable output.

pub mod border;
mod blend;
mod canny;
mod color;
mod gaussian;
mod remap;
mod resize;

pub use blend::{add_weighted, blend_with_mask, overlay_gray};
pub use canny::CannyDetector;
pub use color::{bgr_to_ycrcb, bgra_to_gray, gray_to_bgra, luma, saturate_u8, ycrcb_to_bgr};
pub use gaussian::{gaussian_kernel, GaussianBlur};
pub use remap::{remap, remap_channels, Interpolation};
pub use resize::{resize_linear, resize_linear_gray, resize_nearest};

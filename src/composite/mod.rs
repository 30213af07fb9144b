//! Accumulator composition.
//!
//! One update pushes the accumulator through the remap fields and then
//! layers the optional refinements on top, in a fixed order:
//!
//! ```text
//! warp ─▶ mask blend ─▶ target restriction ─▶ edge overlay ─▶ decay ─▶ commit
//! ```
//!
//! Every stage after the warp is skipped when its parameter is neutral.

mod target;

pub use target::restrict_target;

use crate::buffer::{BufferError, GrayPlane, PixelBuffer, CHANNEL_A, CHANNEL_B, CHANNEL_G, CHANNEL_R};
use crate::imgproc::{add_weighted, bgra_to_gray, blend_with_mask, overlay_gray, remap, remap_channels, CannyDetector};
use crate::mask::complement;
use crate::params::{MaskMode, ParameterSnapshot};
use crate::remap::RemapFields;

/// Canny hysteresis thresholds for the edge overlay.
const EDGE_LOW: f32 = 100.0;
const EDGE_HIGH: f32 = 200.0;

/// Owns the scratch buffers for one composition per frame.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    warped: Option<PixelBuffer>,
    inverted: GrayPlane,
    gray: GrayPlane,
    edges: GrayPlane,
    canny: CannyDetector,
}

impl Compositor {
    /// Empty scratch; buffers size themselves on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one update and commits the result into `accumulator`.
    ///
    /// `weights` is the mask to blend with (softened or binary); it is
    /// ignored when the mask mode is none. Fails without touching the
    /// accumulator if any input disagrees on dimensions.
    pub fn composite(
        &mut self,
        accumulator: &mut PixelBuffer,
        current: &PixelBuffer,
        maps: RemapFields<'_>,
        weights: Option<&GrayPlane>,
        params: &ParameterSnapshot,
    ) -> Result<(), BufferError> {
        let extent = current.extent();
        if accumulator.extent() != extent {
            return Err(BufferError::DimensionMismatch {
                expected: extent,
                actual: accumulator.extent(),
            });
        }
        let map_extent = match maps {
            RemapFields::Uniform(map) => map.extent(),
            RemapFields::Split { base, .. } => base.extent(),
        };
        if map_extent != extent {
            return Err(BufferError::DimensionMismatch {
                expected: extent,
                actual: map_extent,
            });
        }

        let mut warped = match self.warped.take() {
            Some(buf) if buf.same_extent(current) => buf,
            _ => PixelBuffer::new(current.width(), current.height())?,
        };

        match maps {
            RemapFields::Uniform(map) => {
                remap(accumulator, &mut warped, &map.map_x, &map.map_y, params.interpolation);
            }
            RemapFields::Split { red, base, blue } => {
                let interp = params.interpolation;
                remap_channels(accumulator, &mut warped, &red.map_x, &red.map_y, &[CHANNEL_R], interp);
                remap_channels(accumulator, &mut warped, &base.map_x, &base.map_y, &[CHANNEL_G, CHANNEL_A], interp);
                remap_channels(accumulator, &mut warped, &blue.map_x, &blue.map_y, &[CHANNEL_B], interp);
            }
        }

        if let Some(weights) = weights.filter(|w| w.extent() == extent) {
            match params.mask_mode {
                MaskMode::None => {}
                MaskMode::OverwriteUnchanged => blend_with_mask(&mut warped, current, weights),
                MaskMode::OverwriteChanged => {
                    complement(weights, &mut self.inverted);
                    blend_with_mask(&mut warped, current, &self.inverted);
                }
            }
        }

        restrict_target(&mut warped, current, params.target);

        let edge = params.edge_fraction();
        if edge > 0.0 {
            bgra_to_gray(current, &mut self.gray);
            self.canny.detect(&self.gray, &mut self.edges, EDGE_LOW, EDGE_HIGH);
            overlay_gray(&mut warped, &self.edges, edge);
        }

        let decay = params.decay_fraction();
        if decay > 0.0 {
            add_weighted(&mut warped, 1.0 - decay, current, decay);
        }

        std::mem::swap(accumulator, &mut warped);
        self.warped = Some(warped);
        Ok(())
    }
}

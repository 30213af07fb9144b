//! Scratch state reused across frames.

use crate::composite::Compositor;
use crate::mask::MaskBuilder;
use crate::motion::{MotionEstimator, MotionField};
use crate::remap::RemapEngine;

/// Every intermediate the pipeline needs between the persistent
/// buffers. Planes inside are resized in place and only reallocate when
/// the frame size changes.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    /// Luma conversion, downsampling and flow.
    pub estimator: MotionEstimator,
    /// Full-resolution motion of the last update frame.
    pub field: MotionField,
    /// Binary and softened masks.
    pub masks: MaskBuilder,
    /// Coordinate maps.
    pub remap: RemapEngine,
    /// Warp and blend scratch.
    pub compositor: Compositor,
}

impl Workspace {
    /// Empty scratch; everything sizes itself on first use.
    pub fn new() -> Self {
        Self::default()
    }
}

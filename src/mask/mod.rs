//! Static/moving masks derived from the motion field.
//!
//! The builder classifies every pixel against the motion threshold,
//! zeroes the motion of static pixels in place and, when softness is
//! requested, keeps a Gaussian-blurred copy for feathered blending.

mod motion_mask;

pub use motion_mask::{complement, MotionMask};

use crate::buffer::GrayPlane;
use crate::imgproc::GaussianBlur;
use crate::motion::{FlowVector, MotionField};
use motion_mask::classify;

/// Builds and holds the current mask.
///
/// No mask exists until the first update frame has been processed.
#[derive(Debug, Clone, Default)]
pub struct MaskBuilder {
    mask: Option<MotionMask>,
    soft: Option<GrayPlane>,
    blur: GaussianBlur,
}

impl MaskBuilder {
    /// A builder with no mask yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `field` against `threshold` and zeroes static vectors.
    ///
    /// With `soft_kernel` set, a blurred copy of the mask is rebuilt with
    /// that aperture; otherwise any previous soft mask is dropped.
    pub fn build(&mut self, field: &mut MotionField, threshold: f32, soft_kernel: Option<usize>) -> &MotionMask {
        let (w, h) = field.extent();
        let mask = self.mask.get_or_insert_with(MotionMask::default);
        mask.resize(w, h);

        for (m, v) in mask.plane_mut().as_mut_slice().iter_mut().zip(field.as_mut_slice()) {
            *m = classify(v.magnitude(), threshold);
            if *m == MotionMask::STATIC {
                *v = FlowVector::ZERO;
            }
        }

        match soft_kernel {
            Some(ksize) => {
                self.blur.configure(ksize, 0.0);
                let soft = self.soft.get_or_insert_with(GrayPlane::default);
                self.blur.apply_gray(mask.plane(), soft);
            }
            None => self.soft = None,
        }

        tracing::trace!(
            static_ratio = mask.static_ratio(),
            softened = soft_kernel.is_some(),
            "built motion mask"
        );
        mask
    }

    /// The binary mask, if one has been built.
    pub fn mask(&self) -> Option<&MotionMask> {
        self.mask.as_ref()
    }

    /// The softened mask, if softness was requested on the last build.
    pub fn soft_mask(&self) -> Option<&GrayPlane> {
        self.soft.as_ref()
    }

    /// The weights blending should use: softened if available, else
    /// binary.
    pub fn weights(&self) -> Option<&GrayPlane> {
        self.soft.as_ref().or_else(|| self.mask.as_ref().map(MotionMask::plane))
    }

    /// Marks every pixel as moving, keeping the allocation.
    pub fn clear(&mut self) {
        if let Some(mask) = self.mask.as_mut() {
            mask.clear();
        }
        if let Some(soft) = self.soft.as_mut() {
            soft.fill(MotionMask::MOVING);
        }
    }

    /// Drops the mask entirely.
    pub fn discard(&mut self) {
        self.mask = None;
        self.soft = None;
    }
}

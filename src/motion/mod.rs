//! Motion estimation between consecutive frames.
//!
//! Both frames are reduced to luma, downsampled by the block size, run
//! through dense Farnebäck flow and the low-resolution field is blown
//! back up to full resolution with nearest-neighbour sampling. The
//! upsampled vectors keep their low-resolution magnitude; that
//! under-scaling is part of the look.

mod farneback;
mod field;

pub use farneback::{FarnebackFlow, FarnebackParams};
pub use field::{FlowVector, MotionField};

use crate::buffer::{BufferError, GrayPlane, PixelBuffer};
use crate::imgproc::{bgra_to_gray, resize_linear_gray};
use crate::params::{MotionMode, ParameterSnapshot};

/// Working-resolution extent for a `width x height` frame at `scale`.
pub fn working_extent(width: usize, height: usize, scale: f64) -> (usize, usize) {
    let side = |len: usize| ((len as f64 * scale).round() as usize).max(1);
    (side(width), side(height))
}

/// Produces a full-resolution [`MotionField`] from two BGRA frames.
#[derive(Debug, Clone, Default)]
pub struct MotionEstimator {
    flow: FarnebackFlow,
    previous_gray: GrayPlane,
    current_gray: GrayPlane,
    previous_small: GrayPlane,
    current_small: GrayPlane,
    coarse: MotionField,
}

impl MotionEstimator {
    /// An estimator with the reference Farnebäck settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimates motion from `previous` to `current` into `field`.
    ///
    /// `field` is resized to the frame extent. Stepped mode rounds the
    /// low-resolution vectors to whole pixels before upsampling.
    pub fn estimate(
        &mut self,
        previous: &PixelBuffer,
        current: &PixelBuffer,
        params: &ParameterSnapshot,
        field: &mut MotionField,
    ) -> Result<(), BufferError> {
        if !previous.same_extent(current) {
            return Err(BufferError::DimensionMismatch {
                expected: current.extent(),
                actual: previous.extent(),
            });
        }
        let (width, height) = current.extent();
        let (sw, sh) = working_extent(width, height, params.working_scale());

        bgra_to_gray(previous, &mut self.previous_gray);
        bgra_to_gray(current, &mut self.current_gray);
        self.previous_small.resize(sw, sh);
        self.current_small.resize(sw, sh);
        resize_linear_gray(&self.previous_gray, &mut self.previous_small);
        resize_linear_gray(&self.current_gray, &mut self.current_small);

        self.flow
            .estimate(&self.previous_small, &self.current_small, &mut self.coarse);
        if params.motion_mode == MotionMode::Stepped {
            self.coarse.quantize();
        }

        field.resize(width, height);
        self.coarse.upsample_nearest_into(field);

        tracing::trace!(
            working_width = sw,
            working_height = sh,
            mean_motion = self.coarse.mean_magnitude(),
            "estimated motion"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(w: u32, h: u32, shift: usize) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h).unwrap();
        for y in 0..h as usize {
            for x in 0..w as usize {
                let sx = x as f32 - shift as f32;
                let v = 128.0
                    + 60.0 * (std::f32::consts::TAU * sx / 37.0).sin() * (std::f32::consts::TAU * y as f32 / 29.0).cos()
                    + 40.0 * (std::f32::consts::TAU * (sx + y as f32) / 23.0).sin();
                let v = v.round().clamp(0.0, 255.0) as u8;
                buf.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    #[test]
    fn test_working_extent_rounds_and_clamps() {
        assert_eq!(working_extent(640, 360, 0.1), (64, 36));
        assert_eq!(working_extent(25, 15, 0.1), (3, 2));
        assert_eq!(working_extent(4, 4, 0.01), (1, 1));
    }

    #[test]
    fn test_identical_frames_produce_zero_field() {
        let frame = textured(96, 64, 0);
        let mut estimator = MotionEstimator::new();
        let mut field = MotionField::default();
        let params = ParameterSnapshot {
            block_size: 2.0,
            ..Default::default()
        };
        estimator.estimate(&frame, &frame, &params, &mut field).unwrap();

        assert_eq!(field.extent(), (96, 64));
        assert!(field.as_slice().iter().all(|v| *v == FlowVector::ZERO));
    }

    #[test]
    fn test_translation_at_full_resolution() {
        let prev = textured(128, 128, 0);
        let next = textured(128, 128, 5);
        let params = ParameterSnapshot {
            block_size: 1.0,
            motion_mode: MotionMode::Smooth,
            ..Default::default()
        };
        let mut field = MotionField::default();
        MotionEstimator::new()
            .estimate(&prev, &next, &params, &mut field)
            .unwrap();

        let mean = field.mean_in(32, 32, 96, 96);
        assert!(mean.dx > 3.5 && mean.dx < 6.5, "mean dx {}", mean.dx);
        assert!(mean.dy.abs() < 1.0);
    }

    #[test]
    fn test_stepped_mode_yields_whole_pixels() {
        let prev = textured(128, 128, 0);
        let next = textured(128, 128, 3);
        let params = ParameterSnapshot {
            block_size: 2.0,
            motion_mode: MotionMode::Stepped,
            ..Default::default()
        };
        let mut field = MotionField::default();
        MotionEstimator::new()
            .estimate(&prev, &next, &params, &mut field)
            .unwrap();
        assert!(field
            .as_slice()
            .iter()
            .all(|v| v.dx.fract() == 0.0 && v.dy.fract() == 0.0));
    }

    #[test]
    fn test_mismatched_frames_rejected() {
        let a = PixelBuffer::new(8, 8).unwrap();
        let b = PixelBuffer::new(8, 4).unwrap();
        let mut field = MotionField::default();
        let err = MotionEstimator::new()
            .estimate(&a, &b, &ParameterSnapshot::default(), &mut field)
            .unwrap_err();
        assert!(matches!(err, BufferError::DimensionMismatch { .. }));
    }
}

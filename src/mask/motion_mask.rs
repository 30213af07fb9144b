//! Binary static/moving classification.

use crate::buffer::GrayPlane;

/// Per-pixel classification where [`MotionMask::STATIC`] marks pixels
/// whose motion is at or below the threshold and
/// [`MotionMask::MOVING`] marks the rest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionMask {
    plane: GrayPlane,
}

impl MotionMask {
    /// Value of a static pixel.
    pub const STATIC: u8 = 255;
    /// Value of a moving pixel.
    pub const MOVING: u8 = 0;

    /// Creates a mask with every pixel moving.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            plane: GrayPlane::filled(width, height, Self::MOVING),
        }
    }

    #[cfg(test)]
    fn from_magnitudes(magnitudes: &[f32], width: usize, height: usize, threshold: f32) -> Self {
        let mut mask = Self::new(width, height);
        for (m, &mag) in mask.plane.as_mut_slice().iter_mut().zip(magnitudes) {
            *m = classify(mag, threshold);
        }
        mask
    }

    /// Ensures the mask is `width x height`.
    pub(crate) fn resize(&mut self, width: usize, height: usize) {
        self.plane.resize(width, height);
    }

    /// `(width, height)`.
    pub fn extent(&self) -> (usize, usize) {
        self.plane.extent()
    }

    /// The underlying 0/255 plane.
    pub fn plane(&self) -> &GrayPlane {
        &self.plane
    }

    pub(crate) fn plane_mut(&mut self) -> &mut GrayPlane {
        &mut self.plane
    }

    /// Marks every pixel as moving.
    pub fn clear(&mut self) {
        self.plane.fill(Self::MOVING);
    }

    /// Fraction of static pixels, 0 for an empty mask.
    pub fn static_ratio(&self) -> f64 {
        let n = self.plane.len();
        if n == 0 {
            return 0.0;
        }
        let count = self.plane.as_slice().iter().filter(|&&v| v == Self::STATIC).count();
        count as f64 / n as f64
    }
}

/// Static when at or below the threshold; NaN counts as moving.
#[inline]
pub(crate) fn classify(magnitude: f32, threshold: f32) -> u8 {
    if magnitude <= threshold {
        MotionMask::STATIC
    } else {
        MotionMask::MOVING
    }
}

/// Writes `255 - v` for every sample of `src` into `dst`.
pub fn complement(src: &GrayPlane, dst: &mut GrayPlane) {
    let (w, h) = src.extent();
    dst.resize(w, h);
    for (d, &s) in dst.as_mut_slice().iter_mut().zip(src.as_slice()) {
        *d = 255 - s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let mask = MotionMask::from_magnitudes(&[0.0, 2.0, 2.0001, f32::NAN], 4, 1, 2.0);
        assert_eq!(mask.plane().as_slice(), &[255, 255, 0, 0]);
    }

    #[test]
    fn test_static_ratio() {
        let mask = MotionMask::from_magnitudes(&[0.0, 5.0, 1.0, 9.0], 2, 2, 2.0);
        assert_eq!(mask.static_ratio(), 0.5);
        assert_eq!(mask.plane().get(0, 0), MotionMask::STATIC);
        assert_eq!(mask.plane().get(1, 0), MotionMask::MOVING);
    }

    #[test]
    fn test_complement_and_clear() {
        let mut mask = MotionMask::from_magnitudes(&[0.0, 5.0], 2, 1, 1.0);
        let mut inverted = GrayPlane::default();
        complement(mask.plane(), &mut inverted);
        assert_eq!(inverted.as_slice(), &[0, 255]);

        mask.clear();
        assert_eq!(mask.static_ratio(), 0.0);
    }
}

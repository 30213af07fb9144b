//! Per-pixel motion vectors.

use crate::buffer::Plane;
use crate::imgproc::resize_nearest;

/// One displacement, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowVector {
    /// Horizontal displacement.
    pub dx: f32,
    /// Vertical displacement.
    pub dy: f32,
}

impl FlowVector {
    /// No motion.
    pub const ZERO: FlowVector = FlowVector { dx: 0.0, dy: 0.0 };

    /// Creates a vector.
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.dx.hypot(self.dy)
    }

    /// Rounds both components to the nearest 16-bit integer.
    ///
    /// Ties go to even and values saturate at the `i16` range; NaN
    /// becomes zero.
    #[inline]
    pub fn quantized(self) -> Self {
        Self {
            dx: quantize_i16(self.dx),
            dy: quantize_i16(self.dy),
        }
    }
}

#[inline]
fn quantize_i16(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.round_ties_even().clamp(i16::MIN as f32, i16::MAX as f32)
}

/// A dense field of [`FlowVector`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionField {
    vectors: Plane<FlowVector>,
}

impl MotionField {
    /// Creates a zero field.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            vectors: Plane::new(width, height),
        }
    }

    /// Builds a field by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl FnMut(usize, usize) -> FlowVector) -> Self {
        Self {
            vectors: Plane::from_fn(width, height, f),
        }
    }

    /// Ensures the field is `width x height`; see [`Plane::resize`].
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        self.vectors.resize(width, height)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.vectors.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.vectors.height()
    }

    /// `(width, height)`.
    pub fn extent(&self) -> (usize, usize) {
        self.vectors.extent()
    }

    /// Vector at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> FlowVector {
        self.vectors.get(x, y)
    }

    /// Sets the vector at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, v: FlowVector) {
        self.vectors.set(x, y, v);
    }

    /// Row `y`.
    pub fn row(&self, y: usize) -> &[FlowVector] {
        self.vectors.row(y)
    }

    /// All vectors in row-major order.
    pub fn as_slice(&self) -> &[FlowVector] {
        self.vectors.as_slice()
    }

    /// Mutable vectors in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [FlowVector] {
        self.vectors.as_mut_slice()
    }

    /// Sets every vector to zero.
    pub fn clear(&mut self) {
        self.vectors.fill(FlowVector::ZERO);
    }

    /// Rounds every vector to 16-bit integer precision in place.
    pub fn quantize(&mut self) {
        for v in self.vectors.as_mut_slice() {
            *v = v.quantized();
        }
    }

    /// Nearest-neighbour upsample into `dst`'s current extent.
    ///
    /// Vectors are copied, not rescaled: a low-resolution displacement
    /// keeps its magnitude at full resolution.
    pub fn upsample_nearest_into(&self, dst: &mut MotionField) {
        resize_nearest(&self.vectors, &mut dst.vectors);
    }

    /// Mean vector length, 0 for an empty field.
    pub fn mean_magnitude(&self) -> f32 {
        let n = self.vectors.len();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.vectors.as_slice().iter().map(|v| v.magnitude() as f64).sum();
        (sum / n as f64) as f32
    }

    /// Mean `(dx, dy)` over the half-open window `[x0, x1) x [y0, y1)`.
    pub fn mean_in(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> FlowVector {
        let (x1, y1) = (x1.min(self.width()), y1.min(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return FlowVector::ZERO;
        }
        let (mut sx, mut sy) = (0.0f64, 0.0f64);
        for y in y0..y1 {
            for v in &self.row(y)[x0..x1] {
                sx += v.dx as f64;
                sy += v.dy as f64;
            }
        }
        let n = ((x1 - x0) * (y1 - y0)) as f64;
        FlowVector::new((sx / n) as f32, (sy / n) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_rounds_half_to_even() {
        let v = FlowVector::new(2.5, -1.5).quantized();
        assert_eq!(v, FlowVector::new(2.0, -2.0));
        let v = FlowVector::new(0.49, 3.51).quantized();
        assert_eq!(v, FlowVector::new(0.0, 4.0));
    }

    #[test]
    fn test_quantize_saturates() {
        let v = FlowVector::new(1.0e9, f32::NAN).quantized();
        assert_eq!(v, FlowVector::new(32767.0, 0.0));
    }

    #[test]
    fn test_upsample_keeps_magnitude() {
        let coarse = MotionField::from_fn(2, 2, |x, y| FlowVector::new(x as f32 + 1.0, y as f32));
        let mut fine = MotionField::new(6, 4);
        coarse.upsample_nearest_into(&mut fine);

        assert_eq!(fine.get(0, 0), FlowVector::new(1.0, 0.0));
        assert_eq!(fine.get(2, 1), FlowVector::new(1.0, 0.0));
        assert_eq!(fine.get(3, 0), FlowVector::new(2.0, 0.0));
        assert_eq!(fine.get(5, 3), FlowVector::new(2.0, 1.0));
    }

    #[test]
    fn test_mean_magnitude() {
        let field = MotionField::from_fn(4, 1, |x, _| if x < 2 { FlowVector::new(3.0, 4.0) } else { FlowVector::ZERO });
        assert!((field.mean_magnitude() - 2.5).abs() < 1e-6);
        assert_eq!(MotionField::default().mean_magnitude(), 0.0);
    }

    #[test]
    fn test_mean_in_window() {
        let field = MotionField::from_fn(4, 4, |x, _| FlowVector::new(x as f32, 1.0));
        assert_eq!(field.mean_in(1, 0, 3, 4), FlowVector::new(1.5, 1.0));
        assert_eq!(field.mean_in(3, 3, 3, 3), FlowVector::ZERO);
    }
}

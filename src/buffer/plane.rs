//! Single-channel grids.

use super::BufferError;

/// A dense row-major 2-D grid of one sample type.
///
/// Used for grayscale images, float coordinate maps, masks and
/// per-pixel motion vectors. Resizing keeps the allocation when the
/// dimensions are unchanged, which lets per-frame scratch planes live
/// across calls without reallocating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plane<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

/// 8-bit grayscale plane.
pub type GrayPlane = Plane<u8>;

/// 32-bit float plane.
pub type FloatPlane = Plane<f32>;

impl<T: Copy + Default> Plane<T> {
    /// Creates a plane filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Creates a plane with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wraps an existing row-major vector.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, BufferError> {
        if data.len() != width * height {
            return Err(BufferError::DataTooShort {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Builds a plane by evaluating `f(x, y)` for every sample.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { data, width, height }
    }

    /// Ensures the plane is `width x height`.
    ///
    /// Returns true when the dimensions changed, in which case every
    /// sample is reset to `T::default()`.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.data.clear();
        self.data.resize(width * height, T::default());
        self.width = width;
        self.height = height;
        true
    }

    /// Sets every sample to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Width in samples.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn extent(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Total sample count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-sized plane.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(x, y)`; panics out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    /// Writes the sample at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }

    /// Reads with coordinates clamped into the plane.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> T {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.get(x, y)
    }

    /// One row of samples.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// One row of samples, mutably.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        &mut self.data[y * self.width..(y + 1) * self.width]
    }

    /// All samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All samples in row-major order, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_keeps_allocation_when_unchanged() {
        let mut plane: FloatPlane = Plane::filled(4, 4, 1.5);
        assert!(!plane.resize(4, 4));
        assert_eq!(plane.get(3, 3), 1.5);

        assert!(plane.resize(2, 3));
        assert_eq!(plane.extent(), (2, 3));
        assert!(plane.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let plane = Plane::from_fn(3, 2, |x, y| (y * 10 + x) as u8);
        assert_eq!(plane.row(1), &[10, 11, 12]);
        assert_eq!(plane.get(2, 0), 2);
    }

    #[test]
    fn test_get_clamped() {
        let plane = Plane::from_fn(3, 3, |x, y| (y * 3 + x) as u8);
        assert_eq!(plane.get_clamped(-5, -1), 0);
        assert_eq!(plane.get_clamped(10, 10), 8);
    }

    #[test]
    fn test_from_vec_length_checked() {
        assert!(GrayPlane::from_vec(2, 2, vec![0; 3]).is_err());
        assert!(GrayPlane::from_vec(2, 2, vec![0; 4]).is_ok());
    }
}

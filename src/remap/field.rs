//! Remap field storage.

use crate::buffer::FloatPlane;
use crate::motion::MotionField;

/// Cached pixel-centre coordinates, rebuilt only when the extent changes.
#[derive(Debug, Clone, Default)]
pub struct IdentityGrid {
    xs: FloatPlane,
    ys: FloatPlane,
}

impl IdentityGrid {
    /// Makes the grid `width x height`; returns true if it was rebuilt.
    pub fn ensure(&mut self, width: usize, height: usize) -> bool {
        if self.xs.extent() == (width, height) && !self.xs.is_empty() {
            return false;
        }
        self.xs = FloatPlane::from_fn(width, height, |x, _| x as f32);
        self.ys = FloatPlane::from_fn(width, height, |_, y| y as f32);
        true
    }

    /// `(width, height)`.
    pub fn extent(&self) -> (usize, usize) {
        self.xs.extent()
    }
}

/// A pair of source-coordinate maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemapField {
    /// Source x for every destination pixel.
    pub map_x: FloatPlane,
    /// Source y for every destination pixel.
    pub map_y: FloatPlane,
}

impl RemapField {
    /// `(width, height)`.
    pub fn extent(&self) -> (usize, usize) {
        self.map_x.extent()
    }

    /// Source position sampled for destination `(x, y)`.
    pub fn source(&self, x: usize, y: usize) -> (f32, f32) {
        (self.map_x.get(x, y), self.map_y.get(x, y))
    }

    /// `map = grid - (field * gain + drift)`.
    pub fn fill(&mut self, grid: &IdentityGrid, field: &MotionField, gain: (f32, f32), drift: (f32, f32)) {
        let (w, h) = grid.extent();
        debug_assert_eq!(field.extent(), (w, h));
        self.map_x.resize(w, h);
        self.map_y.resize(w, h);

        let vectors = field.as_slice();
        for (i, ((mx, my), v)) in self
            .map_x
            .as_mut_slice()
            .iter_mut()
            .zip(self.map_y.as_mut_slice().iter_mut())
            .zip(vectors)
            .enumerate()
        {
            *mx = grid.xs.as_slice()[i] - (v.dx * gain.0 + drift.0);
            *my = grid.ys.as_slice()[i] - (v.dy * gain.1 + drift.1);
        }
    }
}

//! Coordinate maps that pull the accumulator along the motion field.
//!
//! For every destination pixel the source position is
//! `(x - (dx * gain_x + drift_x), y - (dy * gain_y + drift_y))`. With a
//! colour shift the red and blue channels get their own maps with gains
//! scaled by `1 - s` and `1 + s`; green and alpha use the base map.

mod field;

pub use field::{IdentityGrid, RemapField};

use crate::motion::MotionField;
use crate::params::ParameterSnapshot;

/// The maps for one update.
#[derive(Debug, Clone, Copy)]
pub enum RemapFields<'a> {
    /// One map for all four channels.
    Uniform(&'a RemapField),
    /// Separate maps per channel group.
    Split {
        /// Red channel.
        red: &'a RemapField,
        /// Green and alpha channels.
        base: &'a RemapField,
        /// Blue channel.
        blue: &'a RemapField,
    },
}

/// Builds remap fields, reusing its grid and map storage across frames.
#[derive(Debug, Clone, Default)]
pub struct RemapEngine {
    grid: IdentityGrid,
    base: RemapField,
    red: RemapField,
    blue: RemapField,
}

impl RemapEngine {
    /// An engine with no cached grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the maps for `field` under `params`.
    pub fn build(&mut self, field: &MotionField, params: &ParameterSnapshot) -> RemapFields<'_> {
        let (w, h) = field.extent();
        if self.grid.ensure(w, h) {
            tracing::debug!(width = w, height = h, "rebuilt identity grid");
        }
        let (gx, gy) = params.intensity_multipliers();
        let drift = params.drift();
        self.base.fill(&self.grid, field, (gx, gy), drift);

        let shift = params.color_shift_fraction();
        if shift > 0.0 {
            let red = 1.0 - shift;
            let blue = 1.0 + shift;
            self.red.fill(&self.grid, field, (gx * red, gy * red), drift);
            self.blue.fill(&self.grid, field, (gx * blue, gy * blue), drift);
            RemapFields::Split {
                red: &self.red,
                base: &self.base,
                blue: &self.blue,
            }
        } else {
            RemapFields::Uniform(&self.base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::FlowVector;

    #[test]
    fn test_zero_motion_is_identity() {
        let field = MotionField::new(5, 3);
        let mut engine = RemapEngine::new();
        let params = ParameterSnapshot::default();
        match engine.build(&field, &params) {
            RemapFields::Uniform(map) => {
                assert_eq!(map.source(4, 2), (4.0, 2.0));
                assert_eq!(map.source(0, 1), (0.0, 1.0));
            }
            RemapFields::Split { .. } => panic!("expected a single map"),
        }
    }

    #[test]
    fn test_gain_and_drift() {
        let field = MotionField::from_fn(4, 4, |_, _| FlowVector::new(1.0, -1.0));
        let params = ParameterSnapshot {
            intensity_x: 40.0,
            intensity_y: 20.0,
            drift_x: 0.5,
            drift_y: 0.0,
            ..Default::default()
        };
        let mut engine = RemapEngine::new();
        let RemapFields::Uniform(map) = engine.build(&field, &params) else {
            panic!("expected a single map");
        };
        // gain (2, 1): x - (1 * 2 + 0.5), y - (-1 * 1)
        assert_eq!(map.source(3, 1), (0.5, 2.0));
    }

    #[test]
    fn test_color_shift_splits_channels() {
        let field = MotionField::from_fn(2, 2, |_, _| FlowVector::new(1.0, 0.0));
        let params = ParameterSnapshot {
            intensity_x: 20.0,
            color_shift: 50.0,
            ..Default::default()
        };
        let mut engine = RemapEngine::new();
        let RemapFields::Split { red, base, blue } = engine.build(&field, &params) else {
            panic!("expected split maps");
        };
        assert_eq!(base.source(1, 0).0, 0.0);
        assert_eq!(red.source(1, 0).0, 0.5);
        assert_eq!(blue.source(1, 0).0, -0.5);
    }
}

//! Animated parameter values.
//!
//! The host owns the real curve evaluator; this is the read interface
//! the effect consumes plus a small keyframe implementation so the
//! effect can be driven from configuration files and tests.

use serde::{Deserialize, Serialize};

/// A value that can be resolved for a given frame of an item.
pub trait Parameter {
    /// Resolves the value at `frame` of an item lasting `duration` frames
    /// played at `fps`.
    fn resolve(&self, frame: u64, duration: u64, fps: u32) -> f64;
}

impl Parameter for f64 {
    fn resolve(&self, _frame: u64, _duration: u64, _fps: u32) -> f64 {
        *self
    }
}

/// One keyframe of an [`Animation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Frame offset from the start of the item.
    pub frame: u64,
    /// Value at that frame.
    pub value: f64,
}

/// A constant or linearly keyframed parameter.
///
/// In TOML either a bare number (`decay = 20.0`) or a table with a
/// keyframe list (`decay = { keyframes = [{ frame = 0, value = 0.0 }, ...] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Animation {
    /// The same value on every frame.
    Constant(f64),
    /// Linear interpolation between keys, holding the end values.
    Keyframes {
        /// Keys in frame order.
        keyframes: Vec<Keyframe>,
    },
}

impl Animation {
    /// Creates a keyframed animation, sorting keys by frame.
    pub fn keyframed(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by_key(|k| k.frame);
        Animation::Keyframes { keyframes }
    }

    /// Returns true when keyframes exist and are in frame order.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Animation::Constant(v) => v.is_finite(),
            Animation::Keyframes { keyframes } => {
                !keyframes.is_empty()
                    && keyframes.windows(2).all(|w| w[0].frame <= w[1].frame)
                    && keyframes.iter().all(|k| k.value.is_finite())
            }
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::Constant(0.0)
    }
}

impl From<f64> for Animation {
    fn from(value: f64) -> Self {
        Animation::Constant(value)
    }
}

impl Parameter for Animation {
    fn resolve(&self, frame: u64, duration: u64, _fps: u32) -> f64 {
        let keyframes = match self {
            Animation::Constant(v) => return *v,
            Animation::Keyframes { keyframes } => keyframes,
        };
        let (first, last) = match (keyframes.first(), keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        // Frames past the end of the item hold the item's final value.
        let frame = if duration > 0 { frame.min(duration.saturating_sub(1)) } else { frame };

        if frame <= first.frame {
            return first.value;
        }
        if frame >= last.frame {
            return last.value;
        }
        let next = keyframes.partition_point(|k| k.frame <= frame);
        let (a, b) = (keyframes[next - 1], keyframes[next]);
        if b.frame == a.frame {
            return b.value;
        }
        let t = (frame - a.frame) as f64 / (b.frame - a.frame) as f64;
        a.value + (b.value - a.value) * t
    }
}

/// Inclusive slider range a parameter is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ParameterRange {
    /// Creates a range from its bounds.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps `value` into the range; NaN resolves to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Animation {
        Animation::keyframed(vec![
            Keyframe { frame: 10, value: 100.0 },
            Keyframe { frame: 0, value: 0.0 },
        ])
    }

    #[test]
    fn test_constant_ignores_frame() {
        let anim = Animation::Constant(42.0);
        assert_eq!(anim.resolve(0, 100, 30), 42.0);
        assert_eq!(anim.resolve(99, 100, 30), 42.0);
    }

    #[test]
    fn test_keyframes_interpolate_linearly() {
        let anim = ramp();
        assert_eq!(anim.resolve(0, 0, 30), 0.0);
        assert_eq!(anim.resolve(5, 0, 30), 50.0);
        assert_eq!(anim.resolve(25, 0, 30), 100.0);
    }

    #[test]
    fn test_frame_clamped_to_duration() {
        let anim = ramp();
        // Item is 6 frames long, so frame 9 resolves as frame 5
        assert_eq!(anim.resolve(9, 6, 30), 50.0);
    }

    #[test]
    fn test_parse_both_forms() {
        #[derive(Deserialize)]
        struct Holder {
            a: Animation,
            b: Animation,
        }
        let h: Holder = toml::from_str(
            r#"
            a = 3.5
            b = { keyframes = [{ frame = 0, value = 1.0 }, { frame = 4, value = 2.0 }] }
            "#,
        )
        .unwrap();
        assert_eq!(h.a, Animation::Constant(3.5));
        assert!(h.b.is_well_formed());
        assert_eq!(h.b.resolve(2, 0, 30), 1.5);
    }

    #[test]
    fn test_unsorted_keyframes_are_malformed() {
        let anim = Animation::Keyframes {
            keyframes: vec![Keyframe { frame: 5, value: 0.0 }, Keyframe { frame: 1, value: 1.0 }],
        };
        assert!(!anim.is_well_formed());
    }

    #[test]
    fn test_range_clamp() {
        let r = ParameterRange::new(1.0, 30.0);
        assert_eq!(r.clamp(0.0), 1.0);
        assert_eq!(r.clamp(31.0), 30.0);
        assert_eq!(r.clamp(f64::NAN), 1.0);
    }
}

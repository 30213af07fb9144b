//! Effect parameters.
//!
//! The host resolves each animated parameter per frame; the effect only
//! ever sees the resulting [`ParameterSnapshot`], which is immutable for
//! the duration of one update call.

mod animation;
mod modes;
mod parameters;
mod snapshot;

pub use crate::imgproc::Interpolation;
pub use animation::{Animation, Keyframe, Parameter, ParameterRange};
pub use modes::{MaskMode, MotionMode, TargetMode};
pub use parameters::{ranges, EffectParameters};
pub use snapshot::ParameterSnapshot;

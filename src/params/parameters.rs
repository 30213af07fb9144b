//! The effect's declared parameter set.

use serde::{Deserialize, Serialize};

use super::animation::{Animation, Parameter, ParameterRange};
use super::modes::{MaskMode, MotionMode, TargetMode};
use super::snapshot::ParameterSnapshot;
use crate::imgproc::Interpolation;

/// Slider ranges; resolved values are clamped into these.
#[allow(missing_docs)]
pub mod ranges {
    use super::ParameterRange;

    pub const FREEZE: ParameterRange = ParameterRange::new(0.0, 1.0);
    pub const REFRESH_INTERVAL: ParameterRange = ParameterRange::new(0.0, 300.0);
    pub const UPDATE_INTERVAL: ParameterRange = ParameterRange::new(1.0, 30.0);
    pub const BLOCK_SIZE: ParameterRange = ParameterRange::new(1.0, 100.0);
    pub const INTENSITY: ParameterRange = ParameterRange::new(0.0, 200.0);
    pub const DRIFT: ParameterRange = ParameterRange::new(-20.0, 20.0);
    pub const COLOR_SHIFT: ParameterRange = ParameterRange::new(0.0, 100.0);
    pub const DECAY: ParameterRange = ParameterRange::new(0.0, 100.0);
    pub const MASK_SOFTNESS: ParameterRange = ParameterRange::new(0.0, 50.0);
    pub const EDGE_FACTOR: ParameterRange = ParameterRange::new(0.0, 100.0);
    pub const MOTION_THRESHOLD: ParameterRange = ParameterRange::new(0.0, 100.0);
}

/// Freeze values at or above this count as "on".
const FREEZE_ON: f64 = 0.5;

/// Every animatable parameter plus the static mode selections.
///
/// Field meanings and units follow [`ParameterSnapshot`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParameters {
    pub freeze: Animation,
    pub refresh_interval: Animation,
    pub update_interval: Animation,
    pub block_size: Animation,
    pub intensity_x: Animation,
    pub intensity_y: Animation,
    pub drift_x: Animation,
    pub drift_y: Animation,
    pub color_shift: Animation,
    pub decay: Animation,
    pub mask_softness: Animation,
    pub edge_factor: Animation,
    pub motion_threshold: Animation,
    pub target: TargetMode,
    pub mask_mode: MaskMode,
    pub interpolation: Interpolation,
    pub motion_mode: MotionMode,
    pub show_mask: bool,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            freeze: 1.0.into(),
            refresh_interval: 0.0.into(),
            update_interval: 1.0.into(),
            block_size: 10.0.into(),
            intensity_x: 100.0.into(),
            intensity_y: 100.0.into(),
            drift_x: 0.0.into(),
            drift_y: 0.0.into(),
            color_shift: 0.0.into(),
            decay: 0.0.into(),
            mask_softness: 0.0.into(),
            edge_factor: 0.0.into(),
            motion_threshold: 2.0.into(),
            target: TargetMode::default(),
            mask_mode: MaskMode::default(),
            interpolation: Interpolation::default(),
            motion_mode: MotionMode::default(),
            show_mask: false,
        }
    }
}

impl EffectParameters {
    /// Resolves every parameter for `frame`, clamped to its slider range.
    pub fn snapshot(&self, frame: u64, duration: u64, fps: u32) -> ParameterSnapshot {
        let value = |anim: &Animation, range: ParameterRange| range.clamp(anim.resolve(frame, duration, fps));

        ParameterSnapshot {
            freeze: value(&self.freeze, ranges::FREEZE) >= FREEZE_ON,
            refresh_interval: value(&self.refresh_interval, ranges::REFRESH_INTERVAL) as u32,
            update_interval: (value(&self.update_interval, ranges::UPDATE_INTERVAL) as u32).max(1),
            block_size: value(&self.block_size, ranges::BLOCK_SIZE),
            intensity_x: value(&self.intensity_x, ranges::INTENSITY),
            intensity_y: value(&self.intensity_y, ranges::INTENSITY),
            drift_x: value(&self.drift_x, ranges::DRIFT),
            drift_y: value(&self.drift_y, ranges::DRIFT),
            color_shift: value(&self.color_shift, ranges::COLOR_SHIFT),
            decay: value(&self.decay, ranges::DECAY),
            edge_factor: value(&self.edge_factor, ranges::EDGE_FACTOR),
            mask_softness: value(&self.mask_softness, ranges::MASK_SOFTNESS) as u32,
            motion_threshold: value(&self.motion_threshold, ranges::MOTION_THRESHOLD),
            target: self.target,
            mask_mode: self.mask_mode,
            interpolation: self.interpolation,
            motion_mode: self.motion_mode,
            debug: self.show_mask,
        }
    }

    /// Names of parameters whose animation is malformed.
    pub fn malformed(&self) -> Vec<&'static str> {
        [
            ("freeze", &self.freeze),
            ("refresh_interval", &self.refresh_interval),
            ("update_interval", &self.update_interval),
            ("block_size", &self.block_size),
            ("intensity_x", &self.intensity_x),
            ("intensity_y", &self.intensity_y),
            ("drift_x", &self.drift_x),
            ("drift_y", &self.drift_y),
            ("color_shift", &self.color_shift),
            ("decay", &self.decay),
            ("mask_softness", &self.mask_softness),
            ("edge_factor", &self.edge_factor),
            ("motion_threshold", &self.motion_threshold),
        ]
        .into_iter()
        .filter(|(_, anim)| !anim.is_well_formed())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Keyframe;

    #[test]
    fn test_default_snapshot_matches_defaults() {
        let snap = EffectParameters::default().snapshot(0, 100, 30);
        assert_eq!(snap, ParameterSnapshot::default());
    }

    #[test]
    fn test_values_clamped_to_slider_range() {
        let params = EffectParameters {
            intensity_x: 500.0.into(),
            drift_y: (-80.0).into(),
            update_interval: 0.0.into(),
            ..Default::default()
        };
        let snap = params.snapshot(0, 0, 30);
        assert_eq!(snap.intensity_x, 200.0);
        assert_eq!(snap.drift_y, -20.0);
        assert_eq!(snap.update_interval, 1);
    }

    #[test]
    fn test_freeze_threshold_and_truncation() {
        let params = EffectParameters {
            freeze: Animation::keyframed(vec![
                Keyframe { frame: 0, value: 0.0 },
                Keyframe { frame: 10, value: 1.0 },
            ]),
            refresh_interval: 12.9.into(),
            ..Default::default()
        };
        assert!(!params.snapshot(4, 0, 30).freeze);
        assert!(params.snapshot(5, 0, 30).freeze);
        assert_eq!(params.snapshot(0, 0, 30).refresh_interval, 12);
    }

    #[test]
    fn test_malformed_reports_names() {
        let params = EffectParameters {
            decay: Animation::Keyframes { keyframes: vec![] },
            ..Default::default()
        };
        assert_eq!(params.malformed(), vec!["decay"]);
    }
}

//! Per-frame resolved parameter values.

use super::modes::{MaskMode, MotionMode, TargetMode};
use crate::imgproc::Interpolation;

/// Intensity percentage that maps to a 1x flow multiplier is 20 %; the
/// slider's 100 % means five times the estimated motion.
const INTENSITY_GAIN: f64 = 5.0;

/// Every parameter resolved for one frame.
///
/// Percentages and pixel amounts are kept in slider units; the accessor
/// methods convert them to the values the pipeline works with.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    /// Hold the accumulator and push it along motion vectors.
    pub freeze: bool,
    /// Frames between forced refreshes; 0 disables.
    pub refresh_interval: u32,
    /// Motion is recomputed every this many frames (at least 1).
    pub update_interval: u32,
    /// Working-resolution divisor for motion estimation, in pixels.
    pub block_size: f64,
    /// Horizontal motion intensity, percent.
    pub intensity_x: f64,
    /// Vertical motion intensity, percent.
    pub intensity_y: f64,
    /// Constant horizontal displacement per update, pixels.
    pub drift_x: f64,
    /// Constant vertical displacement per update, pixels.
    pub drift_y: f64,
    /// Chromatic desync between channels, percent.
    pub color_shift: f64,
    /// Pull back toward the live frame per update, percent.
    pub decay: f64,
    /// Live-frame edge overlay strength, percent.
    pub edge_factor: f64,
    /// Mask blur radius, pixels.
    pub mask_softness: u32,
    /// Motion magnitude at or below which a pixel counts as static.
    pub motion_threshold: f64,
    /// Colour components the corruption may touch.
    pub target: TargetMode,
    /// Which region the live frame refreshes.
    pub mask_mode: MaskMode,
    /// Sampling used when warping.
    pub interpolation: Interpolation,
    /// Stepped or smooth motion vectors.
    pub motion_mode: MotionMode,
    /// Emit the motion mask instead of the accumulator.
    pub debug: bool,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            freeze: true,
            refresh_interval: 0,
            update_interval: 1,
            block_size: 10.0,
            intensity_x: 100.0,
            intensity_y: 100.0,
            drift_x: 0.0,
            drift_y: 0.0,
            color_shift: 0.0,
            decay: 0.0,
            edge_factor: 0.0,
            mask_softness: 0,
            motion_threshold: 2.0,
            target: TargetMode::All,
            mask_mode: MaskMode::None,
            interpolation: Interpolation::Nearest,
            motion_mode: MotionMode::Stepped,
            debug: false,
        }
    }
}

impl ParameterSnapshot {
    /// Flow multipliers `(x, y)`: `(pct / 100) * 5`.
    pub fn intensity_multipliers(&self) -> (f32, f32) {
        (
            (self.intensity_x / 100.0 * INTENSITY_GAIN) as f32,
            (self.intensity_y / 100.0 * INTENSITY_GAIN) as f32,
        )
    }

    /// Drift `(x, y)` in pixels.
    pub fn drift(&self) -> (f32, f32) {
        (self.drift_x as f32, self.drift_y as f32)
    }

    /// Colour shift as a fraction in `0..=1`.
    pub fn color_shift_fraction(&self) -> f32 {
        (self.color_shift / 100.0) as f32
    }

    /// Edge overlay weight as a fraction in `0..=1`.
    pub fn edge_fraction(&self) -> f32 {
        (self.edge_factor / 100.0) as f32
    }

    /// Decay as a fraction in `0..=1`.
    pub fn decay_fraction(&self) -> f32 {
        (self.decay / 100.0) as f32
    }

    /// Scale from full to working resolution, `1 / max(1, block_size)`.
    pub fn working_scale(&self) -> f64 {
        1.0 / self.block_size.max(1.0)
    }

    /// Gaussian aperture for the softened mask, if softening is enabled.
    pub fn mask_kernel_size(&self) -> Option<usize> {
        (self.mask_softness > 0).then(|| 2 * self.mask_softness as usize + 1)
    }

    /// Frame 0 and every `update_interval`-th frame recompute motion.
    pub fn is_update_frame(&self, frame: u64) -> bool {
        frame == 0 || frame % u64::from(self.update_interval.max(1)) == 0
    }

    /// Every `refresh_interval`-th frame after the first resets to live.
    pub fn is_forced_refresh(&self, frame: u64) -> bool {
        self.refresh_interval > 0 && frame > 0 && frame % u64::from(self.refresh_interval) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_percent_to_multiplier() {
        let snap = ParameterSnapshot {
            intensity_x: 200.0,
            intensity_y: 20.0,
            ..Default::default()
        };
        assert_eq!(snap.intensity_multipliers(), (10.0, 1.0));
    }

    #[test]
    fn test_working_scale_clamps_block_size() {
        let mut snap = ParameterSnapshot::default();
        snap.block_size = 0.25;
        assert_eq!(snap.working_scale(), 1.0);
        snap.block_size = 4.0;
        assert_eq!(snap.working_scale(), 0.25);
    }

    #[test]
    fn test_update_and_refresh_cadence() {
        let snap = ParameterSnapshot {
            update_interval: 3,
            refresh_interval: 4,
            ..Default::default()
        };
        let updates: Vec<u64> = (0..10).filter(|&f| snap.is_update_frame(f)).collect();
        assert_eq!(updates, vec![0, 3, 6, 9]);
        let refreshes: Vec<u64> = (0..10).filter(|&f| snap.is_forced_refresh(f)).collect();
        assert_eq!(refreshes, vec![4, 8]);
    }

    #[test]
    fn test_refresh_disabled_at_zero() {
        let snap = ParameterSnapshot::default();
        assert!((0..100).all(|f| !snap.is_forced_refresh(f)));
    }

    #[test]
    fn test_mask_kernel_size() {
        let mut snap = ParameterSnapshot::default();
        assert_eq!(snap.mask_kernel_size(), None);
        snap.mask_softness = 3;
        assert_eq!(snap.mask_kernel_size(), Some(7));
    }
}

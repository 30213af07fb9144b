//! Running counters for one effect instance.

use super::plan::{FramePlan, ResetReason};

/// What the effect has done so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectStats {
    /// Frames processed.
    pub frames: u64,
    /// Frames that ran the full pipeline.
    pub update_frames: u64,
    /// Frames that held the accumulator.
    pub held_frames: u64,
    /// Resets because freeze was off.
    pub unfrozen_resets: u64,
    /// Resets because the refresh interval elapsed.
    pub refresh_resets: u64,
    /// Buffer (re)allocations.
    pub initializations: u64,
    /// Static pixel fraction of the most recent mask.
    pub last_static_ratio: Option<f64>,
    /// Mean motion magnitude of the most recent update, pixels.
    pub last_mean_motion: Option<f64>,
}

impl EffectStats {
    /// Counts one executed plan.
    pub fn record(&mut self, plan: FramePlan) {
        self.frames += 1;
        match plan {
            FramePlan::Initialize => self.initializations += 1,
            FramePlan::Reset(ResetReason::Unfrozen) => self.unfrozen_resets += 1,
            FramePlan::Reset(ResetReason::ForcedRefresh) => self.refresh_resets += 1,
            FramePlan::Update => self.update_frames += 1,
            FramePlan::Hold => self.held_frames += 1,
        }
    }

    /// Total resets of either kind.
    pub fn resets(&self) -> u64 {
        self.unfrozen_resets + self.refresh_resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_plan() {
        let mut stats = EffectStats::default();
        for plan in [
            FramePlan::Initialize,
            FramePlan::Update,
            FramePlan::Hold,
            FramePlan::Hold,
            FramePlan::Reset(ResetReason::ForcedRefresh),
            FramePlan::Reset(ResetReason::Unfrozen),
        ] {
            stats.record(plan);
        }
        assert_eq!(stats.frames, 6);
        assert_eq!(stats.held_frames, 2);
        assert_eq!(stats.resets(), 2);
        assert_eq!(stats.initializations, 1);
    }
}

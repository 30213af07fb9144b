//! Per-frame state decisions.

use crate::params::ParameterSnapshot;

/// Why the accumulator was reset to the live frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// Freeze is off; the effect passes the live frame through.
    Unfrozen,
    /// The refresh interval elapsed.
    ForcedRefresh,
}

/// What one call does with the persistent buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    /// No state yet, or the frame size changed: allocate from the frame.
    Initialize,
    /// Overwrite both buffers with the frame and clear the mask.
    Reset(ResetReason),
    /// Run the full motion, mask, remap and composite pipeline.
    Update,
    /// Leave the accumulator untouched.
    Hold,
}

impl FramePlan {
    /// Chooses the plan for `frame_index`.
    ///
    /// Initialisation beats everything; a reset beats freezing; only
    /// update frames recompute motion.
    pub fn decide(has_state: bool, dims_match: bool, params: &ParameterSnapshot, frame_index: u64) -> Self {
        if !has_state || !dims_match {
            return FramePlan::Initialize;
        }
        if !params.freeze {
            return FramePlan::Reset(ResetReason::Unfrozen);
        }
        if params.is_forced_refresh(frame_index) {
            return FramePlan::Reset(ResetReason::ForcedRefresh);
        }
        if params.is_update_frame(frame_index) {
            FramePlan::Update
        } else {
            FramePlan::Hold
        }
    }

    /// True for plans that run motion estimation.
    pub fn computes_motion(&self) -> bool {
        matches!(self, FramePlan::Update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen(update_interval: u32, refresh_interval: u32) -> ParameterSnapshot {
        ParameterSnapshot {
            update_interval,
            refresh_interval,
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_without_state_or_on_resize() {
        let params = frozen(1, 0);
        assert_eq!(FramePlan::decide(false, true, &params, 5), FramePlan::Initialize);
        assert_eq!(FramePlan::decide(true, false, &params, 5), FramePlan::Initialize);
    }

    #[test]
    fn test_unfrozen_resets() {
        let params = ParameterSnapshot {
            freeze: false,
            ..Default::default()
        };
        assert_eq!(
            FramePlan::decide(true, true, &params, 3),
            FramePlan::Reset(ResetReason::Unfrozen)
        );
    }

    #[test]
    fn test_forced_refresh_beats_update() {
        let params = frozen(2, 4);
        assert_eq!(
            FramePlan::decide(true, true, &params, 4),
            FramePlan::Reset(ResetReason::ForcedRefresh)
        );
        assert_eq!(FramePlan::decide(true, true, &params, 2), FramePlan::Update);
        assert_eq!(FramePlan::decide(true, true, &params, 3), FramePlan::Hold);
        // Frame 0 never refreshes.
        assert_eq!(FramePlan::decide(true, true, &params, 0), FramePlan::Update);
    }
}

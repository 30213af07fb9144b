//! The datamosh effect.
//!
//! [`DatamoshEffect`] owns the accumulator, the previous input frame and
//! a [`Workspace`] of scratch buffers. Each call decides a
//! [`FramePlan`], executes it and emits either the accumulator or a
//! debug view of the motion mask.

mod emit;
mod plan;
mod stats;
mod workspace;

pub use emit::{emit, Emitted};
pub use plan::{FramePlan, ResetReason};
pub use stats::EffectStats;
pub use workspace::Workspace;

use thiserror::Error;

use crate::buffer::{BufferError, GrayPlane, PixelBuffer};
use crate::ingest::HostFrame;
use crate::mask::MotionMask;
use crate::motion::MotionField;
use crate::params::ParameterSnapshot;

/// Errors surfaced by [`DatamoshEffect::process`].
#[derive(Debug, Error)]
pub enum EffectError {
    /// A frame or internal buffer had the wrong shape.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// A plan ran without the buffers it needs.
    #[error("effect state missing: {0}")]
    MissingState(&'static str),
}

/// Buffers that persist between frames.
#[derive(Debug, Clone)]
struct Persistent {
    accumulator: PixelBuffer,
    previous: PixelBuffer,
}

/// A stateful temporal effect instance.
///
/// Calls must arrive in timeline order for the result to be meaningful;
/// `&mut self` serialises them.
#[derive(Debug, Clone, Default)]
pub struct DatamoshEffect {
    state: Option<Persistent>,
    workspace: Workspace,
    stats: EffectStats,
}

impl DatamoshEffect {
    /// An effect with no state; the first frame initialises it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one frame and returns the output frame.
    pub fn process(
        &mut self,
        frame: &HostFrame,
        params: &ParameterSnapshot,
        frame_index: u64,
    ) -> Result<HostFrame, EffectError> {
        let current = &frame.buffer;
        let dims_match = self
            .state
            .as_ref()
            .is_some_and(|s| s.accumulator.same_extent(current));
        let mut plan = FramePlan::decide(self.state.is_some(), dims_match, params, frame_index);
        tracing::debug!(
            frame = frame_index,
            plan = ?plan,
            motion = plan.computes_motion(),
            "frame plan"
        );

        match plan {
            FramePlan::Initialize => self.initialize(current),
            FramePlan::Reset(reason) => self.reset_to(current, reason)?,
            FramePlan::Update => {
                if !self.update(current, params)? {
                    tracing::warn!(frame = frame_index, "buffer size mismatch during update, reinitialising");
                    plan = FramePlan::Initialize;
                    self.initialize(current);
                }
            }
            FramePlan::Hold => {}
        }
        self.stats.record(plan);

        let state = self.state.as_ref().ok_or(EffectError::MissingState("accumulator"))?;
        let (out, emitted) = emit(&state.accumulator, &self.workspace.masks, frame, params)?;
        tracing::trace!(frame = frame_index, emitted = ?emitted, "emitted frame");
        Ok(out)
    }

    /// Allocates both buffers as copies of `current` and drops the mask.
    fn initialize(&mut self, current: &PixelBuffer) {
        let reinit = self.state.is_some();
        self.state = Some(Persistent {
            accumulator: current.clone(),
            previous: current.clone(),
        });
        self.workspace.masks.discard();
        tracing::info!(
            width = current.width(),
            height = current.height(),
            reinit,
            "initialised effect buffers"
        );
    }

    fn reset_to(&mut self, current: &PixelBuffer, reason: ResetReason) -> Result<(), EffectError> {
        let state = self.state.as_mut().ok_or(EffectError::MissingState("accumulator"))?;
        state.accumulator.copy_from(current)?;
        state.previous.copy_from(current)?;
        self.workspace.masks.clear();
        tracing::debug!(reason = ?reason, "reset accumulator to live frame");
        Ok(())
    }

    /// Runs the full pipeline; returns false if the buffers no longer
    /// match the frame and must be reinitialised.
    fn update(&mut self, current: &PixelBuffer, params: &ParameterSnapshot) -> Result<bool, EffectError> {
        let state = self.state.as_mut().ok_or(EffectError::MissingState("previous frame"))?;
        let ws = &mut self.workspace;

        match ws.estimator.estimate(&state.previous, current, params, &mut ws.field) {
            Ok(()) => {}
            Err(BufferError::DimensionMismatch { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        let mask = ws
            .masks
            .build(&mut ws.field, params.motion_threshold as f32, params.mask_kernel_size());
        self.stats.last_static_ratio = Some(mask.static_ratio());
        self.stats.last_mean_motion = Some(ws.field.mean_magnitude() as f64);

        let maps = ws.remap.build(&ws.field, params);
        match ws
            .compositor
            .composite(&mut state.accumulator, current, maps, ws.masks.weights(), params)
        {
            Ok(()) => {}
            Err(BufferError::DimensionMismatch { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        state.previous.copy_from(current)?;
        tracing::trace!(
            static_ratio = self.stats.last_static_ratio,
            mean_motion = self.stats.last_mean_motion,
            "updated accumulator"
        );
        Ok(true)
    }

    /// Drops the persistent buffers and mask; the next frame
    /// reinitialises. Statistics are kept.
    pub fn reset(&mut self) {
        self.state = None;
        self.workspace.masks.discard();
        tracing::info!("effect state reset");
    }

    /// The accumulator, once initialised.
    pub fn accumulator(&self) -> Option<&PixelBuffer> {
        self.state.as_ref().map(|s| &s.accumulator)
    }

    /// The last frame used for motion comparison.
    pub fn previous_frame(&self) -> Option<&PixelBuffer> {
        self.state.as_ref().map(|s| &s.previous)
    }

    /// The binary motion mask, once an update has run.
    pub fn mask(&self) -> Option<&MotionMask> {
        self.workspace.masks.mask()
    }

    /// The softened mask from the last update, if softness was on.
    pub fn soft_mask(&self) -> Option<&GrayPlane> {
        self.workspace.masks.soft_mask()
    }

    /// Motion of the last update frame, after static vectors were zeroed.
    pub fn motion_field(&self) -> &MotionField {
        &self.workspace.field
    }

    /// Running counters.
    pub fn stats(&self) -> &EffectStats {
        &self.stats
    }
}

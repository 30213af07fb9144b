//! Metrics collection and registry.

use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::effect::EffectStats;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A point-in-time copy of effect counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
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
    /// Static fraction of the latest mask.
    pub static_ratio: Option<f64>,
    /// Mean motion magnitude of the latest update.
    pub mean_motion: Option<f64>,
}

impl MetricsSnapshot {
    /// Copies the counters out of an effect's statistics.
    pub fn from_stats(stats: &EffectStats) -> Self {
        Self {
            frames: stats.frames,
            update_frames: stats.update_frames,
            held_frames: stats.held_frames,
            unfrozen_resets: stats.unfrozen_resets,
            refresh_resets: stats.refresh_resets,
            initializations: stats.initializations,
            static_ratio: stats.last_static_ratio,
            mean_motion: stats.last_mean_motion,
        }
    }
}

/// Prometheus registry for the effect's counters.
pub struct MetricsRegistry {
    registry: Registry,

    frames_total: IntCounter,
    update_frames_total: IntCounter,
    held_frames_total: IntCounter,
    resets_total: IntCounterVec,
    initializations_total: IntCounter,

    static_ratio: Gauge,
    mean_motion: Gauge,
}

/// Advances a monotonic counter to `target`; never decreases.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a registry with every effect metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new("vector_melt_frames_total", "Frames processed")?;
        let update_frames_total = IntCounter::new(
            "vector_melt_update_frames_total",
            "Frames that recomputed motion and warped the accumulator",
        )?;
        let held_frames_total = IntCounter::new(
            "vector_melt_held_frames_total",
            "Frames that held the accumulator between updates",
        )?;
        let resets_total = IntCounterVec::new(
            Opts::new("vector_melt_resets_total", "Accumulator resets to the live frame"),
            &["reason"],
        )?;
        let initializations_total = IntCounter::new(
            "vector_melt_initializations_total",
            "Buffer allocations, including resolution changes",
        )?;

        let static_ratio = Gauge::new(
            "vector_melt_static_ratio",
            "Fraction of pixels classified static in the latest mask",
        )?;
        let mean_motion = Gauge::new(
            "vector_melt_mean_motion_pixels",
            "Mean motion vector magnitude of the latest update",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(update_frames_total.clone()))?;
        registry.register(Box::new(held_frames_total.clone()))?;
        registry.register(Box::new(resets_total.clone()))?;
        registry.register(Box::new(initializations_total.clone()))?;
        registry.register(Box::new(static_ratio.clone()))?;
        registry.register(Box::new(mean_motion.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            update_frames_total,
            held_frames_total,
            resets_total,
            initializations_total,
            static_ratio,
            mean_motion,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters move by the difference to the snapshot's totals
        advance(&self.frames_total, snapshot.frames);
        advance(&self.update_frames_total, snapshot.update_frames);
        advance(&self.held_frames_total, snapshot.held_frames);
        advance(&self.initializations_total, snapshot.initializations);
        advance(&self.resets_total.with_label_values(&["unfrozen"]), snapshot.unfrozen_resets);
        advance(
            &self.resets_total.with_label_values(&["forced-refresh"]),
            snapshot.refresh_resets,
        );

        if let Some(ratio) = snapshot.static_ratio {
            self.static_ratio.set(ratio);
        }
        if let Some(motion) = snapshot.mean_motion {
            self.mean_motion.set(motion);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

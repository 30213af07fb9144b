//! Prometheus counters for a running effect.
//!
//! # Metrics Exposed
//!
//! - `vector_melt_frames_total` - Frames processed
//! - `vector_melt_update_frames_total` - Frames that warped the accumulator
//! - `vector_melt_held_frames_total` - Frames held between updates
//! - `vector_melt_resets_total{reason}` - Resets, labelled `unfrozen` or `forced-refresh`
//! - `vector_melt_initializations_total` - Buffer allocations
//! - `vector_melt_static_ratio` - Static fraction of the latest mask
//! - `vector_melt_mean_motion_pixels` - Mean motion of the latest update
//!
//! # Example
//!
//! ```no_run
//! use vector_melt::effect::DatamoshEffect;
//! use vector_melt::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let effect = DatamoshEffect::new();
//!
//! registry.update(&MetricsSnapshot::from_stats(effect.stats()));
//! println!("{}", registry.encode().expect("encode"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};

//! Vector Melt Library
//!
//! A datamosh-style temporal video effect. The effect keeps an
//! accumulated frame and, on every update, pushes it along the dense
//! motion between consecutive input frames, so pixels smear and melt
//! instead of refreshing.
//!
//! # Architecture
//!
//! Each update frame follows an explicit data flow:
//!
//! ```text
//! previous + current ─▶ motion ─▶ mask ─▶ remap ─▶ composite ─▶ accumulator
//!                                   │                              │
//!                                   └──────── effect (emit) ◀──────┘
//! ```
//!
//! # Design Principles
//!
//! - **Stateful but explicit**: all persistence lives in one
//!   [`DatamoshEffect`]; dropping it discards everything
//! - **Deterministic**: identical inputs and parameters give identical
//!   output bytes
//! - **Reusable scratch**: intermediate planes are resized in place and
//!   only reallocate when the frame size changes
//!
//! # Example
//!
//! ```no_run
//! use vector_melt::{
//!     config::RenderConfig,
//!     effect::DatamoshEffect,
//!     ingest::{FrameSource, SyntheticSource},
//!     params::EffectParameters,
//! };
//!
//! let render = RenderConfig::default();
//! let mut source = SyntheticSource::new();
//! source.open(&render).unwrap();
//!
//! let params = EffectParameters::default();
//! let mut effect = DatamoshEffect::new();
//!
//! for index in 0..render.frames {
//!     let frame = source.next_frame().unwrap();
//!     let snapshot = params.snapshot(index, render.frames, render.fps);
//!     let output = effect.process(&frame, &snapshot, index).unwrap();
//!     assert_eq!(output.width(), render.width);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod composite;
pub mod config;
pub mod effect;
pub mod imgproc;
pub mod ingest;
pub mod mask;
pub mod metrics;
pub mod motion;
pub mod params;
pub mod remap;

// Re-export commonly used types at crate root
pub use buffer::{BufferError, PixelBuffer, Plane};
pub use config::{ConfigError, FileConfig, RenderConfig};
pub use effect::{DatamoshEffect, EffectError, EffectStats, FramePlan};
pub use ingest::{FrameSource, HostFrame, HostSurface, SyntheticSource};
pub use motion::{MotionEstimator, MotionField};
pub use params::{EffectParameters, ParameterSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

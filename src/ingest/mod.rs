//! Frame input and the host image boundary.
//!
//! [`HostFrame`] is what crosses between the host and the effect.
//! [`FrameSource`] abstracts where frames come from so the pipeline can
//! be driven by synthetic sequences when no host is present.

mod host;
mod source;

pub use host::{HostFrame, HostSurface};
pub use source::{FrameSource, Pattern, SourceError, SyntheticSource};

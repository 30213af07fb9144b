//! Enumerated effect modes.

use serde::{Deserialize, Serialize};

/// How the low-resolution motion field is prepared before upsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionMode {
    /// Vectors quantised to whole pixels: visibly stepped, blocky motion.
    #[default]
    Stepped,
    /// Vectors kept at full float precision.
    Smooth,
}

/// Which pixels are refreshed from the live frame after warping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskMode {
    /// No masking; the whole frame stays corrupted.
    #[default]
    None,
    /// Static regions show the live frame, moving regions stay corrupted.
    OverwriteUnchanged,
    /// Moving regions show the live frame, static regions stay corrupted.
    OverwriteChanged,
}

/// Which colour components the corruption is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetMode {
    /// Every channel is warped.
    #[default]
    All,
    /// Live luma with warped chroma.
    ColorOnly,
    /// Live chroma with warped luma.
    LumaOnly,
}

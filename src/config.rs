//! File configuration.
//!
//! A TOML file with two optional sections: `[effect]` holds the effect
//! parameters (constants or keyframe lists) and `[render]` describes the
//! synthetic sequence the CLI feeds through the effect.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ingest::Pattern;
use crate::params::EffectParameters;

/// Largest accepted frame side, in pixels.
const MAX_SIDE: u32 = 16_384;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid frame rate {0} (must be 1-240 fps)")]
    InvalidFrameRate(u32),
    #[error("velocity must be finite")]
    InvalidVelocity,
    #[error("parameter `{0}` has an empty, unsorted or non-finite animation")]
    MalformedAnimation(&'static str),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Synthetic sequence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames to render.
    pub frames: u64,
    /// Frames per second reported to parameter animation.
    pub fps: u32,
    /// Synthetic content.
    pub pattern: Pattern,
    /// Seed for generated textures and noise.
    pub seed: u64,
    /// Horizontal scroll per frame for the translate pattern, pixels.
    pub velocity_x: f32,
    /// Vertical scroll per frame for the translate pattern, pixels.
    pub velocity_y: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            frames: 60,
            fps: 30,
            pattern: Pattern::Translate,
            seed: 0,
            velocity_x: 3.0,
            velocity_y: 0.0,
        }
    }
}

impl RenderConfig {
    /// Creates a configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.fps == 0 || self.fps > 240 {
            return Err(ConfigError::InvalidFrameRate(self.fps));
        }
        if !self.velocity_x.is_finite() || !self.velocity_y.is_finite() {
            return Err(ConfigError::InvalidVelocity);
        }
        Ok(())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Effect parameters.
    #[serde(default)]
    pub effect: EffectParameters,
    /// Synthetic sequence settings.
    #[serde(default)]
    pub render: RenderConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = self.effect.malformed().into_iter().next() {
            return Err(ConfigError::MalformedAnimation(name));
        }
        self.render.validate()
    }
}

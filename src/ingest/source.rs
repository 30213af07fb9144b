//! Frame sources.
//!
//! The effect itself never pulls frames; a source stands in for the
//! host timeline when rendering from the command line or in tests.

use std::str::FromStr;

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::HostFrame;
use crate::buffer::{BufferError, PixelBuffer};
use crate::config::RenderConfig;

/// Side of one texture cell of the translate pattern, pixels.
const TEXTURE_CELL: usize = 24;

/// Errors that can occur while producing frames.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source not opened")]
    NotOpen,
    #[error("invalid source configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Synthetic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// One flat colour on every frame.
    Uniform,
    /// A smooth seeded texture scrolled by the configured velocity.
    #[default]
    Translate,
    /// Fresh seeded noise every frame.
    Noise,
}

impl FromStr for Pattern {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Pattern::Uniform),
            "translate" => Ok(Pattern::Translate),
            "noise" => Ok(Pattern::Noise),
            other => Err(SourceError::InvalidConfig(format!("unknown pattern `{other}`"))),
        }
    }
}

/// Trait for frame producers.
pub trait FrameSource {
    /// Prepares the source for the given configuration.
    fn open(&mut self, config: &RenderConfig) -> Result<(), SourceError>;

    /// Produces the next frame.
    fn next_frame(&mut self) -> Result<HostFrame, SourceError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Releases the source.
    fn close(&mut self);
}

/// A periodic value-noise texture, one lattice per colour channel.
#[derive(Debug, Clone)]
struct Texture {
    cols: usize,
    rows: usize,
    lattice: Vec<[u8; 3]>,
}

impl Texture {
    fn generate(rng: &mut ChaCha8Rng, width: usize, height: usize) -> Self {
        let cols = width.div_ceil(TEXTURE_CELL).max(2);
        let rows = height.div_ceil(TEXTURE_CELL).max(2);
        let lattice = (0..cols * rows)
            .map(|_| {
                let v = rng.next_u32().to_le_bytes();
                [v[0], v[1], v[2]]
            })
            .collect();
        Self { cols, rows, lattice }
    }

    /// Bilinear sample at a position in pixels; wraps in both axes.
    fn sample(&self, x: f32, y: f32) -> [u8; 3] {
        let period_x = (self.cols * TEXTURE_CELL) as f32;
        let period_y = (self.rows * TEXTURE_CELL) as f32;
        let gx = x.rem_euclid(period_x) / TEXTURE_CELL as f32;
        let gy = y.rem_euclid(period_y) / TEXTURE_CELL as f32;
        let (x0, y0) = (gx.floor(), gy.floor());
        let (fx, fy) = (gx - x0, gy - y0);
        let x0 = x0 as usize % self.cols;
        let y0 = y0 as usize % self.rows;
        let x1 = (x0 + 1) % self.cols;
        let y1 = (y0 + 1) % self.rows;
        let at = |cx: usize, cy: usize| self.lattice[cy * self.cols + cx];
        let (a, b, c, d) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
        let mut out = [0u8; 3];
        for i in 0..3 {
            let top = a[i] as f32 * (1.0 - fx) + b[i] as f32 * fx;
            let bottom = c[i] as f32 * (1.0 - fx) + d[i] as f32 * fx;
            out[i] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[derive(Debug, Clone)]
struct OpenState {
    config: RenderConfig,
    texture: Option<Texture>,
    flat: [u8; 4],
}

/// Deterministic synthetic frames for the CLI, benchmarks and tests.
#[derive(Debug, Default)]
pub struct SyntheticSource {
    state: Option<OpenState>,
    sequence: u64,
}

impl SyntheticSource {
    /// A closed source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames produced since the source was opened.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn render(state: &OpenState, index: u64) -> Result<PixelBuffer, SourceError> {
        let config = &state.config;
        let buffer = match config.pattern {
            Pattern::Uniform => PixelBuffer::filled(config.width, config.height, state.flat)?,
            Pattern::Translate => {
                let texture = state.texture.as_ref().ok_or(SourceError::NotOpen)?;
                let sx = config.velocity_x * index as f32;
                let sy = config.velocity_y * index as f32;
                let mut buffer = PixelBuffer::new(config.width, config.height)?;
                for y in 0..config.height as usize {
                    for x in 0..config.width as usize {
                        let [b, g, r] = texture.sample(x as f32 - sx, y as f32 - sy);
                        buffer.set_pixel(x, y, [b, g, r, 255]);
                    }
                }
                buffer
            }
            Pattern::Noise => {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
                let mut buffer = PixelBuffer::new(config.width, config.height)?;
                for y in 0..config.height as usize {
                    for x in 0..config.width as usize {
                        let v = rng.next_u32().to_le_bytes();
                        buffer.set_pixel(x, y, [v[0], v[1], v[2], 255]);
                    }
                }
                buffer
            }
        };
        Ok(buffer)
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self, config: &RenderConfig) -> Result<(), SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::InvalidConfig(e.to_string()))?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let v = rng.next_u32().to_le_bytes();
        let texture = (config.pattern == Pattern::Translate)
            .then(|| Texture::generate(&mut rng, config.width as usize, config.height as usize));
        self.state = Some(OpenState {
            config: config.clone(),
            texture,
            flat: [v[0], v[1], v[2], 255],
        });
        self.sequence = 0;
        tracing::info!(
            width = config.width,
            height = config.height,
            pattern = ?config.pattern,
            seed = config.seed,
            "synthetic source opened"
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<HostFrame, SourceError> {
        let state = self.state.as_ref().ok_or(SourceError::NotOpen)?;
        let buffer = Self::render(state, self.sequence)?;
        self.sequence += 1;
        Ok(HostFrame::new(buffer, (0.0, 0.0)))
    }

    fn is_open(&self) -> bool {
        self.state.is_some()
    }

    fn close(&mut self) {
        self.state = None;
        tracing::info!("synthetic source closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pattern: Pattern) -> RenderConfig {
        RenderConfig {
            pattern,
            velocity_x: 5.0,
            ..RenderConfig::with_dimensions(48, 32)
        }
    }

    #[test]
    fn test_source_lifecycle() {
        let mut source = SyntheticSource::new();
        assert!(!source.is_open());

        source.open(&config(Pattern::Uniform)).unwrap();
        assert!(source.is_open());

        let frame = source.next_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (48, 32));
        assert_eq!(source.sequence(), 1);

        source.close();
        assert!(!source.is_open());
    }

    #[test]
    fn test_next_frame_without_open() {
        let mut source = SyntheticSource::new();
        assert!(matches!(source.next_frame(), Err(SourceError::NotOpen)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut source = SyntheticSource::new();
        let err = source.open(&RenderConfig::with_dimensions(0, 4)).unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));
    }

    #[test]
    fn test_uniform_frames_are_flat_and_stable() {
        let mut source = SyntheticSource::new();
        source.open(&config(Pattern::Uniform)).unwrap();
        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();
        let px = a.buffer.pixel(0, 0);
        assert!(a.buffer.is_uniform(px));
        assert_eq!(a, b);
    }

    #[test]
    fn test_translate_scrolls_by_velocity() {
        let mut source = SyntheticSource::new();
        source.open(&config(Pattern::Translate)).unwrap();
        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();
        for y in 0..32 {
            for x in 5..48 {
                assert_eq!(b.buffer.pixel(x, y), a.buffer.pixel(x - 5, y));
            }
        }
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticSource::new();
        let mut b = SyntheticSource::new();
        a.open(&config(Pattern::Noise)).unwrap();
        b.open(&config(Pattern::Noise)).unwrap();
        let (fa, fb) = (a.next_frame().unwrap(), b.next_frame().unwrap());
        assert_eq!(fa, fb);
        assert_ne!(a.next_frame().unwrap(), fa);
    }

    #[test]
    fn test_pattern_from_str() {
        assert_eq!("noise".parse::<Pattern>().unwrap(), Pattern::Noise);
        assert!("plaid".parse::<Pattern>().is_err());
    }
}

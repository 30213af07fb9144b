//! Coordinate-map sampling of BGRA pixel buffers.
//!
//! Each destination pixel reads the source at `(map_x, map_y)`.
//! Out-of-range taps are mirrored back into the image with the edge
//! sample repeated, so a warp never pulls in black from outside the
//! frame. A non-finite coordinate samples the destination pixel's own
//! position. Fractional coordinates are quantised to 1/32 pixel before
//! weighting.

use serde::{Deserialize, Serialize};

use super::border::reflect;
use super::color::saturate_u8;
use crate::buffer::{FloatPlane, PixelBuffer, BYTES_PER_PIXEL};

/// Sub-pixel positions per pixel for linear and cubic sampling.
const SUBPIXEL_STEPS: f32 = 32.0;

/// Cubic convolution coefficient.
const CUBIC_A: f32 = -0.75;

/// Interpolation used when sampling between source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Nearest source pixel; hard, blocky smears.
    #[default]
    Nearest,
    /// Bilinear blend of the 2x2 neighbourhood.
    Linear,
    /// Bicubic convolution over the 4x4 neighbourhood.
    Cubic,
}

/// Up to four source indices along one axis with their weights.
#[derive(Debug, Clone, Copy)]
struct Taps {
    index: [usize; 4],
    weight: [f32; 4],
    len: usize,
}

impl Taps {
    fn compute(coord: f32, size: usize, interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Nearest => {
                let i = coord.round_ties_even() as i64;
                Taps {
                    index: [reflect(i, size), 0, 0, 0],
                    weight: [1.0, 0.0, 0.0, 0.0],
                    len: 1,
                }
            }
            Interpolation::Linear => {
                let (base, t) = split_subpixel(coord);
                Taps {
                    index: [reflect(base, size), reflect(base + 1, size), 0, 0],
                    weight: [1.0 - t, t, 0.0, 0.0],
                    len: 2,
                }
            }
            Interpolation::Cubic => {
                let (base, t) = split_subpixel(coord);
                Taps {
                    index: [
                        reflect(base - 1, size),
                        reflect(base, size),
                        reflect(base + 1, size),
                        reflect(base + 2, size),
                    ],
                    weight: cubic_weights(t),
                    len: 4,
                }
            }
        }
    }
}

/// Splits a coordinate into its integer base and a 1/32-quantised fraction.
#[inline]
fn split_subpixel(coord: f32) -> (i64, f32) {
    let q = (coord * SUBPIXEL_STEPS).round_ties_even() as i64;
    let steps = SUBPIXEL_STEPS as i64;
    (q.div_euclid(steps), q.rem_euclid(steps) as f32 / SUBPIXEL_STEPS)
}

#[inline]
fn cubic_weights(t: f32) -> [f32; 4] {
    let w0 = ((CUBIC_A * (t + 1.0) - 5.0 * CUBIC_A) * (t + 1.0) + 8.0 * CUBIC_A) * (t + 1.0) - 4.0 * CUBIC_A;
    let w1 = ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0;
    let w2 = ((CUBIC_A + 2.0) * (1.0 - t) - (CUBIC_A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

/// Samples the listed `channels` of `src` through the coordinate maps
/// into the same channels of `dst`; other channels of `dst` are left
/// untouched.
///
/// `dst`, `map_x` and `map_y` must share `src`'s extent.
pub fn remap_channels(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    map_x: &FloatPlane,
    map_y: &FloatPlane,
    channels: &[usize],
    interpolation: Interpolation,
) {
    let (w, h) = src.extent();
    debug_assert_eq!(dst.extent(), (w, h));
    debug_assert_eq!(map_x.extent(), (w, h));
    debug_assert_eq!(map_y.extent(), (w, h));

    for y in 0..h {
        let mx = map_x.row(y);
        let my = map_y.row(y);
        for x in 0..w {
            let (mut sx, mut sy) = (mx[x], my[x]);
            // Non-finite coordinates sample the pixel itself
            if !sx.is_finite() || !sy.is_finite() {
                sx = x as f32;
                sy = y as f32;
            }
            let tx = Taps::compute(sx, w, interpolation);
            let ty = Taps::compute(sy, h, interpolation);

            let mut acc = [0.0f32; BYTES_PER_PIXEL];
            for j in 0..ty.len {
                let row = src.row(ty.index[j]);
                let wy = ty.weight[j];
                for i in 0..tx.len {
                    let wxy = wy * tx.weight[i];
                    let base = tx.index[i] * BYTES_PER_PIXEL;
                    for &c in channels {
                        acc[c] += wxy * row[base + c] as f32;
                    }
                }
            }

            let mut px = dst.pixel(x, y);
            for &c in channels {
                px[c] = saturate_u8(acc[c]);
            }
            dst.set_pixel(x, y, px);
        }
    }
}

/// Samples all four channels through the coordinate maps.
pub fn remap(src: &PixelBuffer, dst: &mut PixelBuffer, map_x: &FloatPlane, map_y: &FloatPlane, interpolation: Interpolation) {
    remap_channels(src, dst, map_x, map_y, &[0, 1, 2, 3], interpolation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h).unwrap();
        for y in 0..h as usize {
            for x in 0..w as usize {
                buf.set_pixel(x, y, [(x * 20) as u8, (y * 20) as u8, (x + y) as u8, 255]);
            }
        }
        buf
    }

    fn identity_maps(w: usize, h: usize) -> (FloatPlane, FloatPlane) {
        (
            FloatPlane::from_fn(w, h, |x, _| x as f32),
            FloatPlane::from_fn(w, h, |_, y| y as f32),
        )
    }

    #[test]
    fn test_identity_maps_copy_exactly() {
        let src = gradient(8, 6);
        let (mx, my) = identity_maps(8, 6);
        for interp in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Cubic] {
            let mut dst = PixelBuffer::new(8, 6).unwrap();
            remap(&src, &mut dst, &mx, &my, interp);
            assert_eq!(dst, src, "{interp:?}");
        }
    }

    #[test]
    fn test_shift_reflects_at_border() {
        let src = gradient(6, 1);
        let mx = FloatPlane::from_fn(6, 1, |x, _| x as f32 - 2.0);
        let my = FloatPlane::filled(6, 1, 0.0);
        let mut dst = PixelBuffer::new(6, 1).unwrap();
        remap(&src, &mut dst, &mx, &my, Interpolation::Nearest);

        // Columns -2, -1 mirror to 1, 0
        let blues: Vec<u8> = (0..6).map(|x| dst.pixel(x, 0)[0]).collect();
        assert_eq!(blues, vec![20, 0, 0, 20, 40, 60]);
    }

    #[test]
    fn test_channel_subset_leaves_others() {
        let src = gradient(4, 4);
        let mx = FloatPlane::from_fn(4, 4, |x, _| x as f32 + 1.0);
        let my = FloatPlane::from_fn(4, 4, |_, y| y as f32);
        let mut dst = PixelBuffer::filled(4, 4, [7, 7, 7, 7]).unwrap();
        remap_channels(&src, &mut dst, &mx, &my, &[0], Interpolation::Nearest);

        assert_eq!(dst.pixel(0, 0), [20, 7, 7, 7]);
    }

    #[test]
    fn test_non_finite_coordinates_copy_source_pixel() {
        let src = gradient(4, 3);
        let mx = FloatPlane::from_fn(4, 3, |x, y| if (x, y) == (2, 1) { f32::NAN } else { 0.0 });
        let my = FloatPlane::from_fn(4, 3, |x, y| if (x, y) == (3, 2) { f32::INFINITY } else { 0.0 });
        let mut dst = PixelBuffer::filled(4, 3, [7, 7, 7, 7]).unwrap();
        for interp in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Cubic] {
            remap(&src, &mut dst, &mx, &my, interp);
            assert_eq!(dst.pixel(2, 1), src.pixel(2, 1), "{interp:?}");
            assert_eq!(dst.pixel(3, 2), src.pixel(3, 2), "{interp:?}");
            assert_eq!(dst.pixel(1, 1), src.pixel(0, 0), "{interp:?}");
        }
    }

    #[test]
    fn test_linear_half_pixel() {
        let src = gradient(4, 1);
        let mx = FloatPlane::filled(4, 1, 0.5);
        let my = FloatPlane::filled(4, 1, 0.0);
        let mut dst = PixelBuffer::new(4, 1).unwrap();
        remap(&src, &mut dst, &mx, &my, Interpolation::Linear);
        assert_eq!(dst.pixel(2, 0)[0], 10);
    }

    #[test]
    fn test_cubic_weights_sum_to_one() {
        for step in 0..32 {
            let w = cubic_weights(step as f32 / 32.0);
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
        assert_eq!(cubic_weights(0.0), [0.0, 1.0, 0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_any_coordinates_stay_in_bounds(sx in -1.0e4f32..1.0e4, sy in -1.0e4f32..1.0e4) {
            let src = gradient(5, 3);
            let mx = FloatPlane::filled(5, 3, sx);
            let my = FloatPlane::filled(5, 3, sy);
            let mut dst = PixelBuffer::new(5, 3).unwrap();
            remap(&src, &mut dst, &mx, &my, Interpolation::Cubic);
            // Alpha is 255 everywhere in the source, so any in-bounds sample keeps it
            prop_assert!((0..3).all(|y| (0..5).all(|x| dst.pixel(x, y)[3] == 255)));
        }
    }
}

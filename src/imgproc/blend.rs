//! Per-pixel weighted combinations of BGRA buffers.
//!
//! All arithmetic is done in `f32` and saturated back to 8 bits with
//! round-half-to-even.

use super::color::saturate_u8;
use crate::buffer::{GrayPlane, PixelBuffer, BYTES_PER_PIXEL};

/// `dst = dst * alpha + other * beta` on every channel.
pub fn add_weighted(dst: &mut PixelBuffer, alpha: f32, other: &PixelBuffer, beta: f32) {
    debug_assert!(dst.same_extent(other));
    for y in 0..dst.height() as usize {
        let src = other.row(y);
        for (d, &s) in dst.row_mut(y).iter_mut().zip(src) {
            *d = saturate_u8(*d as f32 * alpha + s as f32 * beta);
        }
    }
}

/// `dst = dst * (1 - m/255) + current * (m/255)` with `m` taken from
/// `mask`, applied to all four channels.
pub fn blend_with_mask(dst: &mut PixelBuffer, current: &PixelBuffer, mask: &GrayPlane) {
    debug_assert!(dst.same_extent(current));
    debug_assert_eq!(dst.extent(), mask.extent());
    for y in 0..dst.height() as usize {
        let live = current.row(y);
        let weights = mask.row(y);
        let out = dst.row_mut(y);
        for ((px, lp), &m) in out
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(live.chunks_exact(BYTES_PER_PIXEL))
            .zip(weights)
        {
            let keep_live = m as f32 * (1.0 / 255.0);
            let keep_warped = 1.0 - keep_live;
            for c in 0..BYTES_PER_PIXEL {
                px[c] = saturate_u8(px[c] as f32 * keep_warped + lp[c] as f32 * keep_live);
            }
        }
    }
}

/// Adds `edges` expanded to opaque BGRA `(e, e, e, 255)` into `dst`,
/// scaled by `weight`.
pub fn overlay_gray(dst: &mut PixelBuffer, edges: &GrayPlane, weight: f32) {
    debug_assert_eq!(dst.extent(), edges.extent());
    let alpha_boost = 255.0 * weight;
    for y in 0..dst.height() as usize {
        let e = edges.row(y);
        for (px, &v) in dst.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL).zip(e) {
            let add = v as f32 * weight;
            px[0] = saturate_u8(px[0] as f32 + add);
            px[1] = saturate_u8(px[1] as f32 + add);
            px[2] = saturate_u8(px[2] as f32 + add);
            px[3] = saturate_u8(px[3] as f32 + alpha_boost);
        }
    }
}

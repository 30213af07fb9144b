//! Plane resampling.
//!
//! Linear resampling uses pixel-centre alignment with samples clamped at
//! the borders. Nearest resampling picks `floor(dst * src_len / dst_len)`,
//! which keeps every destination pixel inside one source cell and so
//! preserves hard block edges when upsampling.

use super::color::saturate_u8;
use crate::buffer::{FloatPlane, GrayPlane, Plane};

/// One destination coordinate's two source taps and the weight of the
/// second.
#[derive(Debug, Clone, Copy)]
struct LinearTap {
    lo: usize,
    hi: usize,
    frac: f32,
}

fn linear_taps(src_len: usize, dst_len: usize) -> Vec<LinearTap> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let f = (d as f64 + 0.5) * scale - 0.5;
            let mut lo = f.floor();
            let mut frac = f - lo;
            if lo < 0.0 {
                lo = 0.0;
                frac = 0.0;
            }
            let mut lo = lo as usize;
            if lo >= src_len - 1 {
                lo = src_len - 1;
                frac = 0.0;
            }
            LinearTap {
                lo,
                hi: (lo + 1).min(src_len - 1),
                frac: frac as f32,
            }
        })
        .collect()
}

fn resize_linear_with<T, F>(src: &Plane<T>, dst: &mut Plane<T>, convert: F)
where
    T: Copy + Default + Into<f32>,
    F: Fn(f32) -> T,
{
    let (sw, sh) = src.extent();
    let (dw, dh) = dst.extent();
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }
    let xs = linear_taps(sw, dw);
    let ys = linear_taps(sh, dh);

    for (dy, ty) in ys.iter().enumerate() {
        let row0 = src.row(ty.lo);
        let row1 = src.row(ty.hi);
        let out = dst.row_mut(dy);
        for (dx, tx) in xs.iter().enumerate() {
            let top = row0[tx.lo].into() * (1.0 - tx.frac) + row0[tx.hi].into() * tx.frac;
            let bottom = row1[tx.lo].into() * (1.0 - tx.frac) + row1[tx.hi].into() * tx.frac;
            out[dx] = convert(top * (1.0 - ty.frac) + bottom * ty.frac);
        }
    }
}

/// Bilinear resample of a float plane into `dst`'s current extent.
pub fn resize_linear(src: &FloatPlane, dst: &mut FloatPlane) {
    resize_linear_with(src, dst, |v| v);
}

/// Bilinear resample of a grayscale plane into `dst`'s current extent.
pub fn resize_linear_gray(src: &GrayPlane, dst: &mut GrayPlane) {
    resize_linear_with(src, dst, saturate_u8);
}

/// Nearest-neighbour resample into `dst`'s current extent.
pub fn resize_nearest<T: Copy + Default>(src: &Plane<T>, dst: &mut Plane<T>) {
    let (sw, sh) = src.extent();
    let (dw, dh) = dst.extent();
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }
    let xs: Vec<usize> = (0..dw).map(|d| (d * sw / dw).min(sw - 1)).collect();
    for dy in 0..dh {
        let sy = (dy * sh / dh).min(sh - 1);
        let row = src.row(sy);
        let out = dst.row_mut(dy);
        for (o, &sx) in out.iter_mut().zip(&xs) {
            *o = row[sx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_size_is_copy() {
        let src = FloatPlane::from_fn(5, 4, |x, y| (x * 3 + y * 7) as f32);
        let mut dst = FloatPlane::new(5, 4);
        resize_linear(&src, &mut dst);
        assert_eq!(src, dst);
    }

    #[test]
    fn test_halving_averages_pairs() {
        let src = GrayPlane::from_fn(4, 2, |x, _| if x % 2 == 0 { 10 } else { 20 });
        let mut dst = GrayPlane::new(2, 1);
        resize_linear_gray(&src, &mut dst);
        assert_eq!(dst.as_slice(), &[15, 15]);
    }

    #[test]
    fn test_nearest_upsample_makes_blocks() {
        let src = Plane::from_fn(2, 2, |x, y| (y * 2 + x) as u8);
        let mut dst = Plane::new(4, 4);
        resize_nearest(&src, &mut dst);
        assert_eq!(dst.row(0), &[0, 0, 1, 1]);
        assert_eq!(dst.row(3), &[2, 2, 3, 3]);
    }

    #[test]
    fn test_linear_upsample_clamps_edges() {
        let src = FloatPlane::from_vec(2, 1, vec![0.0, 8.0]).unwrap();
        let mut dst = FloatPlane::new(4, 1);
        resize_linear(&src, &mut dst);
        assert_eq!(dst.as_slice(), &[0.0, 2.0, 6.0, 8.0]);
    }
}

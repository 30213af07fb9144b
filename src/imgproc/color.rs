//! Colour model conversions for BGRA8 pixels.
//!
//! Luma uses the BT.601 weights in 14-bit fixed point; YCrCb uses the
//! analogue BT.601 offsets around 128. Intermediate YCrCb values are
//! quantised to 8 bits, exactly like an 8-bit three-channel image would
//! hold them.

use crate::buffer::{BufferError, GrayPlane, PixelBuffer, BYTES_PER_PIXEL};

const LUMA_SHIFT: u32 = 14;
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;

/// Rounds half to even and saturates into `0..=255`.
#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Luma of one BGRA pixel, ignoring alpha.
#[inline]
pub fn luma(px: &[u8]) -> u8 {
    let sum = px[0] as u32 * LUMA_B + px[1] as u32 * LUMA_G + px[2] as u32 * LUMA_R;
    ((sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Writes the luma of every pixel of `src` into `dst`, resizing it first.
pub fn bgra_to_gray(src: &PixelBuffer, dst: &mut GrayPlane) {
    let (w, h) = src.extent();
    dst.resize(w, h);
    for y in 0..h {
        let row = src.row(y);
        for (out, px) in dst.row_mut(y).iter_mut().zip(row.chunks_exact(BYTES_PER_PIXEL)) {
            *out = luma(px);
        }
    }
}

/// Expands a grayscale plane into opaque BGRA pixels `(v, v, v, 255)`.
pub fn gray_to_bgra(src: &GrayPlane) -> Result<PixelBuffer, BufferError> {
    let (w, h) = src.extent();
    let mut out = PixelBuffer::new(w as u32, h as u32)?;
    for y in 0..h {
        let row = src.row(y);
        for (px, &v) in out.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL).zip(row) {
            px.copy_from_slice(&[v, v, v, 255]);
        }
    }
    Ok(out)
}

/// Converts a BGR triple to quantised `[Y, Cr, Cb]`.
#[inline]
pub fn bgr_to_ycrcb(b: u8, g: u8, r: u8) -> [u8; 3] {
    let (b, g, r) = (b as f32, g as f32, r as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;
    [saturate_u8(y), saturate_u8(cr), saturate_u8(cb)]
}

/// Converts quantised `[Y, Cr, Cb]` back to a BGR triple.
#[inline]
pub fn ycrcb_to_bgr(ycrcb: [u8; 3]) -> [u8; 3] {
    let y = ycrcb[0] as f32;
    let cr = ycrcb[1] as f32 - 128.0;
    let cb = ycrcb[2] as f32 - 128.0;
    let r = y + 1.403 * cr;
    let g = y - 0.714 * cr - 0.344 * cb;
    let b = y + 1.773 * cb;
    [saturate_u8(b), saturate_u8(g), saturate_u8(r)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(&[0, 0, 0, 255]), 0);
        assert_eq!(luma(&[255, 255, 255, 0]), 255);
        // Pure green carries most of the luma
        assert_eq!(luma(&[0, 255, 0, 255]), 150);
    }

    #[test]
    fn test_gray_to_bgra_is_opaque() {
        let plane = GrayPlane::filled(3, 2, 77);
        let bgra = gray_to_bgra(&plane).unwrap();
        assert!(bgra.is_uniform([77, 77, 77, 255]));
    }

    #[test]
    fn test_ycrcb_neutral_gray() {
        assert_eq!(bgr_to_ycrcb(100, 100, 100), [100, 128, 128]);
        assert_eq!(ycrcb_to_bgr([100, 128, 128]), [100, 100, 100]);
    }

    #[test]
    fn test_ycrcb_round_trip_is_close() {
        for &(b, g, r) in &[(10u8, 200u8, 30u8), (250, 10, 120), (64, 64, 200)] {
            let [b2, g2, r2] = ycrcb_to_bgr(bgr_to_ycrcb(b, g, r));
            assert!((b as i32 - b2 as i32).abs() <= 3);
            assert!((g as i32 - g2 as i32).abs() <= 3);
            assert!((r as i32 - r2 as i32).abs() <= 3);
        }
    }

    #[test]
    fn test_saturate_rounds_half_to_even() {
        assert_eq!(saturate_u8(2.5), 2);
        assert_eq!(saturate_u8(3.5), 4);
        assert_eq!(saturate_u8(-4.0), 0);
        assert_eq!(saturate_u8(300.0), 255);
    }
}

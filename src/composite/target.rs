//! Luma/chroma recombination.

use crate::buffer::{PixelBuffer, BYTES_PER_PIXEL, CHANNEL_A};
use crate::imgproc::{bgr_to_ycrcb, ycrcb_to_bgr};
use crate::params::TargetMode;

/// Restricts `warped` to the colour components `target` allows, taking
/// the rest from `current`. Alpha always comes from `warped`.
pub fn restrict_target(warped: &mut PixelBuffer, current: &PixelBuffer, target: TargetMode) {
    let keep_live_luma = match target {
        TargetMode::All => return,
        TargetMode::ColorOnly => true,
        TargetMode::LumaOnly => false,
    };
    debug_assert!(warped.same_extent(current));

    for y in 0..warped.height() as usize {
        let live = current.row(y);
        for (px, lp) in warped
            .row_mut(y)
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(live.chunks_exact(BYTES_PER_PIXEL))
        {
            let w = bgr_to_ycrcb(px[0], px[1], px[2]);
            let c = bgr_to_ycrcb(lp[0], lp[1], lp[2]);
            let mixed = if keep_live_luma {
                [c[0], w[1], w[2]]
            } else {
                [w[0], c[1], c[2]]
            };
            let alpha = px[CHANNEL_A];
            let bgr = ycrcb_to_bgr(mixed);
            px[..3].copy_from_slice(&bgr);
            px[CHANNEL_A] = alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma_of(px: [u8; 4]) -> u8 {
        bgr_to_ycrcb(px[0], px[1], px[2])[0]
    }

    fn chroma_of(px: [u8; 4]) -> [u8; 2] {
        let c = bgr_to_ycrcb(px[0], px[1], px[2]);
        [c[1], c[2]]
    }

    #[test]
    fn test_all_is_untouched() {
        let mut warped = PixelBuffer::filled(2, 2, [10, 200, 30, 77]).unwrap();
        let before = warped.clone();
        let current = PixelBuffer::filled(2, 2, [200, 10, 90, 255]).unwrap();
        restrict_target(&mut warped, &current, TargetMode::All);
        assert_eq!(warped, before);
    }

    #[test]
    fn test_color_only_takes_live_luma() {
        let mut warped = PixelBuffer::filled(2, 2, [40, 60, 180, 77]).unwrap();
        let current = PixelBuffer::filled(2, 2, [128, 128, 128, 255]).unwrap();
        restrict_target(&mut warped, &current, TargetMode::ColorOnly);

        let px = warped.pixel(0, 0);
        assert_eq!(px[CHANNEL_A], 77);
        assert!(luma_of(px).abs_diff(128) <= 2);
        // Warped chroma survives: red-dominant pixel keeps Cr above neutral.
        assert!(chroma_of(px)[0] > 140);
    }

    #[test]
    fn test_luma_only_takes_live_chroma() {
        let mut warped = PixelBuffer::filled(2, 2, [100, 100, 100, 255]).unwrap();
        let current = PixelBuffer::filled(2, 2, [30, 40, 200, 255]).unwrap();
        restrict_target(&mut warped, &current, TargetMode::LumaOnly);

        let px = warped.pixel(1, 1);
        assert!(luma_of(px).abs_diff(100) <= 2);
        let live = chroma_of([30, 40, 200, 255]);
        let got = chroma_of(px);
        assert!(got[0].abs_diff(live[0]) <= 3 && got[1].abs_diff(live[1]) <= 3);
    }
}

//! Output emission.

use crate::buffer::{BufferError, PixelBuffer};
use crate::imgproc::gray_to_bgra;
use crate::ingest::HostFrame;
use crate::mask::MaskBuilder;
use crate::params::ParameterSnapshot;

/// Which buffer an emitted frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    /// The accumulator.
    Accumulator,
    /// The binary motion mask as grayscale.
    Mask,
    /// The softened motion mask as grayscale.
    SoftMask,
}

/// Builds the frame handed back to the host, anchored at `input`'s
/// offset.
///
/// Debug output shows the softened mask when softness is on and one
/// exists, else the binary mask; with no mask yet it falls back to the
/// accumulator.
pub fn emit(
    accumulator: &PixelBuffer,
    masks: &MaskBuilder,
    input: &HostFrame,
    params: &ParameterSnapshot,
) -> Result<(HostFrame, Emitted), BufferError> {
    if params.debug {
        let soft = masks.soft_mask().filter(|_| params.mask_softness > 0);
        if let Some(soft) = soft {
            return Ok((input.reanchor(gray_to_bgra(soft)?), Emitted::SoftMask));
        }
        if let Some(mask) = masks.mask() {
            return Ok((input.reanchor(gray_to_bgra(mask.plane())?), Emitted::Mask));
        }
    }
    Ok((input.reanchor(accumulator.clone()), Emitted::Accumulator))
}

//! Out-of-range index handling.

/// Mirrors an index with the edge sample repeated: `fedcba|abcdef|fedcba`.
#[inline]
pub fn reflect(i: i64, len: usize) -> usize {
    let len = len as i64;
    if len <= 1 {
        return 0;
    }
    let period = 2 * len;
    let i = i.rem_euclid(period);
    (if i >= len { period - 1 - i } else { i }) as usize
}

/// Mirrors an index without repeating the edge sample: `gfedcb|abcdefgh|gfedcb`.
#[inline]
pub fn reflect_101(i: i64, len: usize) -> usize {
    let len = len as i64;
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let i = i.rem_euclid(period);
    (if i >= len { period - i } else { i }) as usize
}

/// Clamps an index to the nearest edge sample.
#[inline]
pub fn replicate(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

//! Canny edge detection.
//!
//! 3x3 Sobel gradients with replicated borders, L1 magnitude
//! (`|dx| + |dy|`), non-maximum suppression along the quantised gradient
//! direction, then hysteresis: pixels above `high` seed edges which grow
//! through 8-connected pixels above `low`.

use super::border::replicate;
use crate::buffer::{GrayPlane, Plane};

/// tan(22.5°) in Q15.
const TG22: i64 = 13573;
const SHIFT: u32 = 15;

const NOT_EDGE: u8 = 1;
const CANDIDATE: u8 = 0;
const EDGE: u8 = 2;

/// Scratch state for repeated edge detection at one resolution.
#[derive(Debug, Clone, Default)]
pub struct CannyDetector {
    dx: Plane<i32>,
    dy: Plane<i32>,
    magnitude: Plane<i32>,
    map: Plane<u8>,
    stack: Vec<(usize, usize)>,
}

impl CannyDetector {
    /// A detector with no scratch allocated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detects edges of `src` into `dst` (0 or 255), resizing `dst`.
    pub fn detect(&mut self, src: &GrayPlane, dst: &mut GrayPlane, low: f32, high: f32) {
        let (w, h) = src.extent();
        dst.resize(w, h);
        if w == 0 || h == 0 {
            return;
        }
        let low = low.floor() as i32;
        let high = high.floor() as i32;

        self.sobel(src);
        self.suppress(low, high);
        self.hysteresis();

        for (d, &m) in dst.as_mut_slice().iter_mut().zip(self.map.as_slice()) {
            *d = if m == EDGE { 255 } else { 0 };
        }
    }

    fn sobel(&mut self, src: &GrayPlane) {
        let (w, h) = src.extent();
        self.dx.resize(w, h);
        self.dy.resize(w, h);
        self.magnitude.resize(w, h);
        let px = |x: i64, y: i64| src.get(replicate(x, w), replicate(y, h)) as i32;

        for y in 0..h as i64 {
            for x in 0..w as i64 {
                let gx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
                let gy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
                let (ux, uy) = (x as usize, y as usize);
                self.dx.set(ux, uy, gx);
                self.dy.set(ux, uy, gy);
                self.magnitude.set(ux, uy, gx.abs() + gy.abs());
            }
        }
    }

    fn suppress(&mut self, low: i32, high: i32) {
        let (w, h) = self.magnitude.extent();
        self.map.resize(w, h);
        self.map.fill(NOT_EDGE);
        self.stack.clear();

        let mag = |x: i64, y: i64| -> i32 {
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                0
            } else {
                self.magnitude.get(x as usize, y as usize)
            }
        };

        for y in 0..h {
            for x in 0..w {
                let m = self.magnitude.get(x, y);
                if m <= low {
                    continue;
                }
                let xs = self.dx.get(x, y) as i64;
                let ys = self.dy.get(x, y) as i64;
                let ax = xs.abs();
                let ay = ys.abs() << SHIFT;
                let tg22x = ax * TG22;
                let (xi, yi) = (x as i64, y as i64);

                let is_max = if ay < tg22x {
                    m > mag(xi - 1, yi) && m >= mag(xi + 1, yi)
                } else {
                    let tg67x = tg22x + (ax << (SHIFT + 1));
                    if ay > tg67x {
                        m > mag(xi, yi - 1) && m >= mag(xi, yi + 1)
                    } else {
                        let s = if (xs ^ ys) < 0 { -1 } else { 1 };
                        m > mag(xi - s, yi - 1) && m > mag(xi + s, yi + 1)
                    }
                };
                if !is_max {
                    continue;
                }
                if m > high {
                    self.map.set(x, y, EDGE);
                    self.stack.push((x, y));
                } else {
                    self.map.set(x, y, CANDIDATE);
                }
            }
        }
    }

    fn hysteresis(&mut self) {
        let (w, h) = self.map.extent();
        while let Some((x, y)) = self.stack.pop() {
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    if self.map.get(nx, ny) == CANDIDATE {
                        self.map.set(nx, ny, EDGE);
                        self.stack.push((nx, ny));
                    }
                }
            }
        }
    }
}

//! Dense optical flow by polynomial expansion.
//!
//! Each neighbourhood of both images is approximated by a quadratic
//! polynomial `x^T A x + b^T x + c`, fitted by weighted least squares with
//! a Gaussian applicability. The displacement that best maps the first
//! polynomial onto the second is solved per pixel from box-filtered
//! normal equations, iteratively and coarse to fine over an image
//! pyramid.
//!
//! Coefficient planes store five values per pixel in the order
//! `[y, x, yy, xx, xy]`; the constant term is never needed.

use super::field::{FlowVector, MotionField};
use crate::buffer::{FloatPlane, GrayPlane, Plane};
use crate::imgproc::border::replicate;
use crate::imgproc::{resize_linear, GaussianBlur};

/// Pyramid levels stop before either side drops below this.
const MIN_LEVEL_SIZE: f64 = 32.0;

/// Width of the frame border whose equations are down-weighted.
const BORDER: usize = 5;
const BORDER_WEIGHTS: [f32; BORDER] = [0.14, 0.14, 0.4472, 0.4472, 0.4472];

/// Regularises the 2x2 solve in textureless regions.
const DET_EPSILON: f64 = 1e-3;

type Coeffs = [f32; 5];
type Sums = [f64; 5];

/// Estimator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarnebackParams {
    /// Scale between consecutive pyramid levels.
    pub pyr_scale: f64,
    /// Maximum number of levels above the base image.
    pub levels: usize,
    /// Side of the averaging window.
    pub win_size: usize,
    /// Solver iterations per level.
    pub iterations: usize,
    /// Radius of the polynomial neighbourhood.
    pub poly_n: usize,
    /// Standard deviation of the applicability.
    pub poly_sigma: f64,
}

impl FarnebackParams {
    /// The fixed settings the effect runs with.
    pub const REFERENCE: FarnebackParams = FarnebackParams {
        pyr_scale: 0.5,
        levels: 3,
        win_size: 15,
        iterations: 3,
        poly_n: 5,
        poly_sigma: 1.2,
    };
}

impl Default for FarnebackParams {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Applicability kernels and the inverse moment terms of the
/// least-squares fit.
#[derive(Debug, Clone)]
struct PolyKernel {
    n: usize,
    g: Vec<f32>,
    xg: Vec<f32>,
    xxg: Vec<f32>,
    ig11: f64,
    ig03: f64,
    ig33: f64,
    ig55: f64,
}

impl PolyKernel {
    fn new(n: usize, sigma: f64) -> Self {
        let sigma = if sigma < f64::from(f32::EPSILON) { n as f64 * 0.3 } else { sigma };
        let radius = n as i64;
        let raw: Vec<f32> = (-radius..=radius)
            .map(|x| (-((x * x) as f64) / (2.0 * sigma * sigma)).exp() as f32)
            .collect();
        let inv_sum = 1.0 / raw.iter().map(|&v| v as f64).sum::<f64>();
        let g: Vec<f32> = raw.iter().map(|&v| (v as f64 * inv_sum) as f32).collect();
        let xg: Vec<f32> = (-radius..=radius).zip(&g).map(|(x, &w)| x as f32 * w).collect();
        let xxg: Vec<f32> = (-radius..=radius).zip(&g).map(|(x, &w)| (x * x) as f32 * w).collect();

        // Moments of the separable applicability: total weight, second,
        // fourth and mixed second order.
        let (mut m0, mut m2, mut m4, mut m22) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for (y, &gy) in (-radius..=radius).zip(&g) {
            for (x, &gx) in (-radius..=radius).zip(&g) {
                let w = gy as f64 * gx as f64;
                let (xf, yf) = (x as f64, y as f64);
                m0 += w;
                m2 += w * xf * xf;
                m4 += w * xf * xf * xf * xf;
                m22 += w * xf * xf * yf * yf;
            }
        }
        let det = m0 * (m4 + m22) - 2.0 * m2 * m2;

        Self {
            n,
            g,
            xg,
            xxg,
            ig11: 1.0 / m2,
            ig03: -m2 / det,
            ig33: (m0 * m4 - m2 * m2) / ((m4 - m22) * det),
            ig55: 1.0 / m22,
        }
    }

    /// Fits the polynomial coefficients of every pixel of `src`.
    fn expand(&self, src: &FloatPlane, dst: &mut Plane<Coeffs>, row: &mut Vec<f32>) {
        let (w, h) = src.extent();
        dst.resize(w, h);
        if w == 0 || h == 0 {
            return;
        }
        let n = self.n;
        row.clear();
        row.resize((w + 2 * n) * 3, 0.0);
        let base = n * 3;

        for y in 0..h {
            // Vertical pass: smoothed value, first and second y moments.
            let center = src.row(y);
            let g0 = self.g[n];
            for (x, &v) in center.iter().enumerate() {
                let i = base + x * 3;
                row[i] = v * g0;
                row[i + 1] = 0.0;
                row[i + 2] = 0.0;
            }
            for k in 1..=n {
                let (gk, xgk, xxgk) = (self.g[n + k], self.xg[n + k], self.xxg[n + k]);
                let up = src.row(y.saturating_sub(k));
                let down = src.row((y + k).min(h - 1));
                for x in 0..w {
                    let i = base + x * 3;
                    let p = up[x] + down[x];
                    row[i] += gk * p;
                    row[i + 1] += xgk * (down[x] - up[x]);
                    row[i + 2] += xxgk * p;
                }
            }

            for i in 0..n {
                for c in 0..3 {
                    row[(n - 1 - i) * 3 + c] = row[base + c];
                    row[base + (w + i) * 3 + c] = row[base + (w - 1) * 3 + c];
                }
            }

            // Horizontal pass.
            let out = dst.row_mut(y);
            for (x, coeffs) in out.iter_mut().enumerate() {
                let c = (x + n) * 3;
                let g0 = self.g[n] as f64;
                let mut b1 = row[c] as f64 * g0;
                let mut b2 = 0.0f64;
                let mut b3 = row[c + 1] as f64 * g0;
                let mut b4 = 0.0f64;
                let mut b5 = row[c + 2] as f64 * g0;
                let mut b6 = 0.0f64;
                for k in 1..=n {
                    let (r, l) = (c + k * 3, c - k * 3);
                    let gk = self.g[n + k] as f64;
                    let xgk = self.xg[n + k] as f64;
                    let tg = (row[r] + row[l]) as f64;
                    b1 += tg * gk;
                    b4 += tg * self.xxg[n + k] as f64;
                    b2 += (row[r] - row[l]) as f64 * xgk;
                    b3 += (row[r + 1] + row[l + 1]) as f64 * gk;
                    b6 += (row[r + 1] - row[l + 1]) as f64 * xgk;
                    b5 += (row[r + 2] + row[l + 2]) as f64 * gk;
                }
                *coeffs = [
                    (b3 * self.ig11) as f32,
                    (b2 * self.ig11) as f32,
                    (b1 * self.ig03 + b5 * self.ig33) as f32,
                    (b1 * self.ig03 + b4 * self.ig33) as f32,
                    (b6 * self.ig55) as f32,
                ];
            }
        }
    }
}

/// Reusable Farnebäck flow solver.
///
/// All pyramid images, coefficient planes and flow planes are kept
/// between calls and only reallocated when the input size changes.
#[derive(Debug, Clone)]
pub struct FarnebackFlow {
    params: FarnebackParams,
    kernel: PolyKernel,
    blur: GaussianBlur,
    source: [FloatPlane; 2],
    smoothed: FloatPlane,
    level: FloatPlane,
    row: Vec<f32>,
    expansions: [Plane<Coeffs>; 2],
    matrices: Plane<Coeffs>,
    column: Plane<Sums>,
    flow_x: FloatPlane,
    flow_y: FloatPlane,
    coarse_x: FloatPlane,
    coarse_y: FloatPlane,
}

impl FarnebackFlow {
    /// Creates a solver for `params`.
    pub fn new(params: FarnebackParams) -> Self {
        Self {
            kernel: PolyKernel::new(params.poly_n, params.poly_sigma),
            params,
            blur: GaussianBlur::default(),
            source: Default::default(),
            smoothed: FloatPlane::default(),
            level: FloatPlane::default(),
            row: Vec::new(),
            expansions: Default::default(),
            matrices: Plane::default(),
            column: Plane::default(),
            flow_x: FloatPlane::default(),
            flow_y: FloatPlane::default(),
            coarse_x: FloatPlane::default(),
            coarse_y: FloatPlane::default(),
        }
    }

    /// Number of pyramid levels above the base used for a `w x h` input.
    pub fn pyramid_levels(&self, w: usize, h: usize) -> usize {
        let mut levels = 0;
        let mut scale = 1.0;
        for k in 0..self.params.levels {
            scale *= self.params.pyr_scale;
            if (w as f64) * scale < MIN_LEVEL_SIZE || (h as f64) * scale < MIN_LEVEL_SIZE {
                break;
            }
            levels = k + 1;
        }
        levels
    }

    /// Computes the flow from `prev` to `next` into `out`, resized to the
    /// input extent.
    ///
    /// The result satisfies `prev(x, y) ≈ next(x + dx, y + dy)`.
    pub fn estimate(&mut self, prev: &GrayPlane, next: &GrayPlane, out: &mut MotionField) {
        let (w, h) = prev.extent();
        debug_assert_eq!(next.extent(), (w, h));
        out.resize(w, h);
        if w == 0 || h == 0 {
            return;
        }
        to_float(prev, &mut self.source[0]);
        to_float(next, &mut self.source[1]);

        let p = self.params;
        let levels = self.pyramid_levels(w, h);
        for k in (0..=levels).rev() {
            let scale = p.pyr_scale.powi(k as i32);
            let sigma = (1.0 / scale - 1.0) * 0.5;
            let smooth_size = ((sigma * 5.0).round_ties_even() as usize | 1).max(3);
            let lw = ((w as f64 * scale).round_ties_even() as usize).max(1);
            let lh = ((h as f64 * scale).round_ties_even() as usize).max(1);

            self.flow_x.resize(lw, lh);
            self.flow_y.resize(lw, lh);
            if k == levels {
                self.flow_x.fill(0.0);
                self.flow_y.fill(0.0);
            } else {
                let up = 1.0 / p.pyr_scale as f32;
                resize_linear(&self.coarse_x, &mut self.flow_x);
                resize_linear(&self.coarse_y, &mut self.flow_y);
                self.flow_x.as_mut_slice().iter_mut().for_each(|v| *v *= up);
                self.flow_y.as_mut_slice().iter_mut().for_each(|v| *v *= up);
            }

            self.blur.configure(smooth_size, sigma);
            for i in 0..2 {
                self.blur.apply(&self.source[i], &mut self.smoothed);
                self.level.resize(lw, lh);
                resize_linear(&self.smoothed, &mut self.level);
                self.kernel.expand(&self.level, &mut self.expansions[i], &mut self.row);
            }

            let [r0, r1] = &self.expansions;
            update_matrices(r0, r1, &self.flow_x, &self.flow_y, &mut self.matrices);
            for it in 0..p.iterations {
                update_flow(&self.matrices, &mut self.flow_x, &mut self.flow_y, p.win_size, &mut self.column);
                if it + 1 < p.iterations {
                    update_matrices(r0, r1, &self.flow_x, &self.flow_y, &mut self.matrices);
                }
            }

            std::mem::swap(&mut self.coarse_x, &mut self.flow_x);
            std::mem::swap(&mut self.coarse_y, &mut self.flow_y);
        }

        for ((v, &dx), &dy) in out
            .as_mut_slice()
            .iter_mut()
            .zip(self.coarse_x.as_slice())
            .zip(self.coarse_y.as_slice())
        {
            *v = FlowVector::new(dx, dy);
        }
    }
}

impl Default for FarnebackFlow {
    fn default() -> Self {
        Self::new(FarnebackParams::REFERENCE)
    }
}

fn to_float(src: &GrayPlane, dst: &mut FloatPlane) {
    let (w, h) = src.extent();
    dst.resize(w, h);
    for (d, &s) in dst.as_mut_slice().iter_mut().zip(src.as_slice()) {
        *d = s as f32;
    }
}

/// Bilinear sample of a coefficient plane; `(sx, sy)` must lie inside
/// the plane, neighbours past the last row or column are clamped.
fn sample(plane: &Plane<Coeffs>, sx: f32, sy: f32) -> Coeffs {
    let (w, h) = plane.extent();
    let (x0, y0) = (sx.floor(), sy.floor());
    let (fx, fy) = (sx - x0, sy - y0);
    let (x0, y0) = (x0 as usize, y0 as usize);
    let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
    let (p00, p01) = (plane.get(x0, y0), plane.get(x1, y0));
    let (p10, p11) = (plane.get(x0, y1), plane.get(x1, y1));
    let a00 = (1.0 - fx) * (1.0 - fy);
    let a01 = fx * (1.0 - fy);
    let a10 = (1.0 - fx) * fy;
    let a11 = fx * fy;
    let mut out = [0.0f32; 5];
    for c in 0..5 {
        out[c] = a00 * p00[c] + a01 * p01[c] + a10 * p10[c] + a11 * p11[c];
    }
    out
}

#[inline]
fn border_weight(i: usize, len: usize) -> f32 {
    let mut weight = 1.0;
    if i < BORDER {
        weight *= BORDER_WEIGHTS[i];
    }
    if i + BORDER >= len {
        weight *= BORDER_WEIGHTS[len - 1 - i];
    }
    weight
}

/// Builds the per-pixel normal equations `[G11, G12, G22, h1, h2]` for
/// the current flow estimate.
fn update_matrices(
    r0: &Plane<Coeffs>,
    r1: &Plane<Coeffs>,
    flow_x: &FloatPlane,
    flow_y: &FloatPlane,
    m: &mut Plane<Coeffs>,
) {
    let (w, h) = r0.extent();
    m.resize(w, h);
    let (max_x, max_y) = ((w - 1) as f32, (h - 1) as f32);

    for y in 0..h {
        let first = r0.row(y);
        let fxs = flow_x.row(y);
        let fys = flow_y.row(y);
        let out = m.row_mut(y);
        for x in 0..w {
            let (dx, dy) = (fxs[x], fys[x]);
            let c0 = first[x];
            let (sx, sy) = (x as f32 + dx, y as f32 + dy);

            // Targets that leave the image keep only the first frame's
            // quadratic terms and contribute no linear difference.
            let (t2, t3, mut r4, mut r5, mut r6) = if sx >= 0.0 && sy >= 0.0 && sx <= max_x && sy <= max_y {
                let c1 = sample(r1, sx, sy);
                (
                    c1[0],
                    c1[1],
                    (c0[2] + c1[2]) * 0.5,
                    (c0[3] + c1[3]) * 0.5,
                    (c0[4] + c1[4]) * 0.25,
                )
            } else {
                (0.0, 0.0, c0[2], c0[3], c0[4] * 0.5)
            };
            let mut r2 = (c0[0] - t2) * 0.5;
            let mut r3 = (c0[1] - t3) * 0.5;
            r2 += r4 * dy + r6 * dx;
            r3 += r6 * dy + r5 * dx;

            let weight = border_weight(x, w) * border_weight(y, h);
            if weight != 1.0 {
                r2 *= weight;
                r3 *= weight;
                r4 *= weight;
                r5 *= weight;
                r6 *= weight;
            }

            out[x] = [
                r4 * r4 + r6 * r6,
                (r4 + r5) * r6,
                r5 * r5 + r6 * r6,
                r4 * r2 + r6 * r3,
                r6 * r2 + r5 * r3,
            ];
        }
    }
}

/// Box-filters the normal equations over a `win x win` window with
/// replicated borders and solves each pixel's 2x2 system.
fn update_flow(m: &Plane<Coeffs>, flow_x: &mut FloatPlane, flow_y: &mut FloatPlane, win: usize, column: &mut Plane<Sums>) {
    let (w, h) = m.extent();
    let radius = (win / 2) as i64;
    let scale = 1.0 / (win * win) as f64;

    column.resize(w, h);
    for y in 0..h {
        let out = column.row_mut(y);
        out.fill([0.0; 5]);
        for k in -radius..=radius {
            let src = m.row(replicate(y as i64 + k, h));
            for (acc, s) in out.iter_mut().zip(src) {
                for c in 0..5 {
                    acc[c] += s[c] as f64;
                }
            }
        }
    }

    for y in 0..h {
        let sums = column.row(y);
        let fx = flow_x.row_mut(y);
        for x in 0..w {
            let mut acc = [0.0f64; 5];
            for k in -radius..=radius {
                let s = sums[replicate(x as i64 + k, w)];
                for c in 0..5 {
                    acc[c] += s[c];
                }
            }
            let [g11, g12, g22, h1, h2] = acc.map(|v| v * scale);
            let idet = 1.0 / (g11 * g22 - g12 * g12 + DET_EPSILON);
            fx[x] = ((g11 * h2 - g12 * h1) * idet) as f32;
            flow_y.row_mut(y)[x] = ((g22 * h1 - g12 * h2) * idet) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: usize, h: usize, shift: f32) -> GrayPlane {
        use std::f32::consts::TAU;
        GrayPlane::from_fn(w, h, |x, y| {
            let (x, y) = (x as f32 - shift, y as f32);
            let v = 128.0
                + 60.0 * (TAU * x / 37.0).sin() * (TAU * y / 29.0).cos()
                + 40.0 * (TAU * (x + y) / 23.0).sin();
            v.round().clamp(0.0, 255.0) as u8
        })
    }

    #[test]
    fn test_kernel_is_normalised() {
        let kernel = PolyKernel::new(5, 1.2);
        let sum: f32 = kernel.g.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(kernel.g.len(), 11);
        assert!(kernel.ig11 > 0.0 && kernel.ig55 > 0.0);
    }

    #[test]
    fn test_pyramid_levels_respect_min_size() {
        let flow = FarnebackFlow::default();
        assert_eq!(flow.pyramid_levels(64, 36), 0);
        assert_eq!(flow.pyramid_levels(128, 128), 2);
        assert_eq!(flow.pyramid_levels(640, 360), 3);
    }

    #[test]
    fn test_identical_frames_give_zero_flow() {
        let frame = pattern(80, 60, 0.0);
        let mut flow = FarnebackFlow::default();
        let mut out = MotionField::default();
        flow.estimate(&frame, &frame, &mut out);

        assert_eq!(out.extent(), (80, 60));
        assert!(out.as_slice().iter().all(|v| *v == FlowVector::ZERO));
    }

    #[test]
    fn test_uniform_frames_give_zero_flow() {
        let a = GrayPlane::filled(64, 64, 90);
        let b = GrayPlane::filled(64, 64, 90);
        let mut out = MotionField::default();
        FarnebackFlow::default().estimate(&a, &b, &mut out);
        assert!(out.as_slice().iter().all(|v| *v == FlowVector::ZERO));
    }

    #[test]
    fn test_horizontal_translation_detected() {
        let prev = pattern(128, 128, 0.0);
        let next = pattern(128, 128, 5.0);
        let mut out = MotionField::default();
        FarnebackFlow::default().estimate(&prev, &next, &mut out);

        let mean = out.mean_in(32, 32, 96, 96);
        assert!(mean.dx > 3.5 && mean.dx < 6.5, "mean dx {}", mean.dx);
        assert!(mean.dy.abs() < 1.0, "mean dy {}", mean.dy);
    }

    #[test]
    fn test_tiny_input() {
        let a = GrayPlane::filled(1, 1, 10);
        let b = GrayPlane::filled(1, 1, 200);
        let mut out = MotionField::default();
        FarnebackFlow::default().estimate(&a, &b, &mut out);
        assert_eq!(out.extent(), (1, 1));
        assert!(out.get(0, 0).dx.is_finite());
    }
}

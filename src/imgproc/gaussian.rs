//! Separable Gaussian blur with mirrored (101) borders.

use super::border::reflect_101;
use super::color::saturate_u8;
use crate::buffer::{FloatPlane, GrayPlane};

/// Fixed kernels used for small apertures when no sigma is given.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Builds a normalised 1-D Gaussian kernel of odd length `ksize`.
///
/// A non-positive `sigma` is derived from the aperture as
/// `0.3 * ((ksize - 1) / 2 - 1) + 0.8`; apertures up to 7 then use the
/// fixed binomial-like tables.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    if sigma <= 0.0 && ksize <= 7 {
        return SMALL_KERNELS[ksize / 2].to_vec();
    }
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);
    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|w| (w / sum) as f32).collect()
}

/// A reusable blur: kernel plus scratch planes that survive across calls.
#[derive(Debug, Clone, Default)]
pub struct GaussianBlur {
    kernel: Vec<f32>,
    ksize: usize,
    sigma: f64,
    scratch: FloatPlane,
    staging: FloatPlane,
    output: FloatPlane,
}

impl GaussianBlur {
    /// Creates a blur with an aperture of `ksize` and the given sigma.
    pub fn new(ksize: usize, sigma: f64) -> Self {
        let mut blur = Self::default();
        blur.configure(ksize, sigma);
        blur
    }

    /// Rebuilds the kernel only if the aperture or sigma changed.
    pub fn configure(&mut self, ksize: usize, sigma: f64) {
        if self.kernel.is_empty() || self.ksize != ksize || self.sigma != sigma {
            self.kernel = gaussian_kernel(ksize, sigma);
            self.ksize = ksize;
            self.sigma = sigma;
        }
    }

    /// Returns the current kernel weights.
    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    /// Blurs `src` into `dst`, resizing `dst` to match.
    pub fn apply(&mut self, src: &FloatPlane, dst: &mut FloatPlane) {
        let (w, h) = src.extent();
        self.scratch.resize(w, h);
        dst.resize(w, h);
        horizontal_pass(src, &mut self.scratch, &self.kernel);
        vertical_pass(&self.scratch, dst, &self.kernel);
    }

    /// Blurs an 8-bit plane, rounding the result back to 8 bits.
    pub fn apply_gray(&mut self, src: &GrayPlane, dst: &mut GrayPlane) {
        let (w, h) = src.extent();
        self.staging.resize(w, h);
        for (f, &v) in self.staging.as_mut_slice().iter_mut().zip(src.as_slice()) {
            *f = v as f32;
        }
        let staging = std::mem::take(&mut self.staging);
        let mut output = std::mem::take(&mut self.output);
        self.apply(&staging, &mut output);
        dst.resize(w, h);
        for (d, &v) in dst.as_mut_slice().iter_mut().zip(output.as_slice()) {
            *d = saturate_u8(v);
        }
        self.staging = staging;
        self.output = output;
    }
}

fn horizontal_pass(src: &FloatPlane, dst: &mut FloatPlane, kernel: &[f32]) {
    let (w, h) = src.extent();
    let radius = (kernel.len() / 2) as i64;
    for y in 0..h {
        let row = src.row(y);
        let out = dst.row_mut(y);
        for (x, o) in out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &kw) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w);
                acc += kw * row[sx];
            }
            *o = acc;
        }
    }
}

fn vertical_pass(src: &FloatPlane, dst: &mut FloatPlane, kernel: &[f32]) {
    let (w, h) = src.extent();
    let radius = (kernel.len() / 2) as i64;
    for y in 0..h {
        let out = dst.row_mut(y);
        out.fill(0.0);
        for (k, &kw) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i64 + k as i64 - radius, h);
            let row = src.row(sy);
            for x in 0..w {
                out[x] += kw * row[x];
            }
        }
    }
}

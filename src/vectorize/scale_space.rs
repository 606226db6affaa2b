//! Gaussian scale space.
//!
//! Level `i` is the *source* image blurred with
//! `sigma = BASE_SIGMA + i * sigma_step`, using a kernel of radius
//! `ceil(2 * sigma)`. Levels never blur a previous level, so they can be
//! built independently.

use image::RgbImage;
use imageproc::filter::separable_filter_equal;
use log::debug;
use rayon::prelude::*;

/// Sigma of the first level.
pub const BASE_SIGMA: f32 = 0.4;

/// One blurred copy of the source image.
#[derive(Debug, Clone)]
pub struct ScaleLevel {
    pub sigma: f32,
    pub image: RgbImage,
}

/// Stack of progressively blurred copies of one image.
#[derive(Debug, Clone, Default)]
pub struct GaussianStack {
    levels: Vec<ScaleLevel>,
}

impl GaussianStack {
    /// Build up to `height` levels.
    ///
    /// With a `std_dev_cutoff`, the stack ends before the first level whose
    /// mean per-channel standard deviation falls below the cutoff.
    pub fn build(
        image: &RgbImage,
        height: usize,
        sigma_step: f32,
        std_dev_cutoff: Option<f32>,
    ) -> Self {
        let mut levels: Vec<ScaleLevel> = (0..height)
            .into_par_iter()
            .map(|i| {
                let sigma = BASE_SIGMA + i as f32 * sigma_step;
                ScaleLevel {
                    sigma,
                    image: blur(image, sigma),
                }
            })
            .collect();

        if let Some(cutoff) = std_dev_cutoff {
            if let Some(end) = levels.iter().position(|l| mean_std_dev(&l.image) < cutoff) {
                debug!("scale space: level {end} below std-dev cutoff {cutoff}");
                levels.truncate(end);
            }
        }
        Self { levels }
    }

    pub fn height(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&ScaleLevel> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[ScaleLevel] {
        &self.levels
    }

    /// Drop every level at or above `height`.
    pub fn restrict(&mut self, height: usize) {
        self.levels.truncate(height);
    }
}

/// Normalized 1D Gaussian of radius `ceil(2 * sigma)`.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (2.0 * sigma).ceil().max(0.0) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with a `ceil(2 * sigma)` radius kernel.
pub fn blur(image: &RgbImage, sigma: f32) -> RgbImage {
    if image.width() == 0 || image.height() == 0 || !(sigma > 0.0) {
        return image.clone();
    }
    separable_filter_equal(image, &gaussian_kernel(sigma))
}

/// Per-channel standard deviation, averaged over R, G and B.
pub fn mean_std_dev(image: &RgbImage) -> f32 {
    let n = (image.width() as f64) * (image.height() as f64);
    if n == 0.0 {
        return 0.0;
    }
    let mut sum = [0.0f64; 3];
    let mut sum2 = [0.0f64; 3];
    for p in image.pixels() {
        for c in 0..3 {
            let v = p[c] as f64;
            sum[c] += v;
            sum2[c] += v * v;
        }
    }
    let total: f64 = (0..3)
        .map(|c| {
            let mean = sum[c] / n;
            (sum2[c] / n - mean * mean).max(0.0).sqrt()
        })
        .sum();
    (total / 3.0) as f32
}

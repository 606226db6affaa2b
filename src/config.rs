//! Tunable parameters for vectorization and diffusion rendering.
//!
//! Both structs deserialize from partial presets and expose `clamped()`,
//! which bounds everything that drives allocation or sampling counts.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::curve::Rgba;

/// Largest working-grid side the diffusion solver will allocate.
pub const MAX_WORKING_SIZE: u32 = 4096;

/// Most scale-space levels built for one image. Each level is a full copy.
pub const MAX_STACK_HEIGHT: usize = 32;

/// Most random color samples per pixel of arc length, per side.
pub const MAX_SAMPLE_DENSITY: f64 = 1.0;

/// All vectorization parameters in one struct.
/// Serializable (for saving presets) and adjustable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    // -- Scale space --
    /// Number of Gaussian levels to build before edge detection.
    pub stack_height: usize,
    /// Sigma increase between consecutive levels (level 0 uses 0.4).
    pub sigma_step: f32,
    /// Stop the scale space once the mean per-channel standard deviation
    /// of a level drops below this value. `None` disables the test.
    pub std_dev_cutoff: Option<f32>,

    // -- Edge detection --
    /// Low hysteresis threshold on gradient magnitude.
    pub canny_low: f32,
    /// High hysteresis threshold on gradient magnitude.
    pub canny_high: f32,
    /// Which edge stack level to trace. Clamped to the stack height.
    pub edge_level: usize,

    // -- Chains and curves --
    /// Chains with fewer pixels than this are dropped.
    pub min_chain_length: usize,
    /// Catmull-Rom style tension; derivatives are divided by it.
    pub tension: f64,
    /// Curves shorter than this (in pixels of arc length) are marked void.
    pub void_threshold: f64,
    /// Contour thickness assigned to fitted curves.
    pub contour_thickness: f32,
    /// Diffusion width assigned to fitted curves.
    pub diffusion_width: f32,

    // -- Color sampling --
    /// Random samples per pixel of arc length (per side).
    pub sample_density: f64,
    /// Distance from the curve, along the normal, at which colors are read.
    pub sample_distance: f64,
    /// Reject samples that deviate from their 3x3 patch in Lab space.
    pub reject_outliers: bool,
    /// Seed for the sampling RNG. `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            stack_height: 8,
            sigma_step: 0.4,
            std_dev_cutoff: None,
            canny_low: 20.0,
            canny_high: 200.0,
            edge_level: 0,
            min_chain_length: 10,
            tension: 2.0,
            void_threshold: 0.0,
            contour_thickness: 3.0,
            diffusion_width: 3.0,
            sample_density: 0.05,
            sample_distance: 3.0,
            reject_outliers: false,
            seed: None,
        }
    }
}

impl VectorizerConfig {
    /// Copy of this config with thresholds ordered and degenerate values
    /// replaced by their defaults.
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        if config.canny_low > config.canny_high {
            warn!(
                "canny_low {} exceeds canny_high {}, swapping",
                config.canny_low, config.canny_high
            );
            std::mem::swap(&mut config.canny_low, &mut config.canny_high);
        }
        if !(config.sigma_step > 0.0) {
            warn!("sigma_step {} is not positive, using 0.4", config.sigma_step);
            config.sigma_step = 0.4;
        }
        if !(config.tension > 0.0) {
            warn!("tension {} is not positive, using 2.0", config.tension);
            config.tension = 2.0;
        }
        if config.stack_height > MAX_STACK_HEIGHT {
            warn!(
                "stack_height {} clamped to {}",
                config.stack_height, MAX_STACK_HEIGHT
            );
            config.stack_height = MAX_STACK_HEIGHT;
        }
        let density = if config.sample_density.is_nan() {
            0.0
        } else {
            config.sample_density.clamp(0.0, MAX_SAMPLE_DENSITY)
        };
        if density != config.sample_density {
            warn!("sample_density {} clamped to {}", config.sample_density, density);
            config.sample_density = density;
        }
        if config.min_chain_length < 2 {
            warn!("min_chain_length {} raised to 2", config.min_chain_length);
            config.min_chain_length = 2;
        }
        config
    }
}

/// Parameters for the multigrid diffusion solver and the final presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Working resolution relative to the output size.
    pub quality: f32,
    /// Jacobi sweeps per pyramid level.
    pub smooth_iterations: usize,
    /// Upper bound on either side of the working grid.
    pub max_working_size: u32,
    /// Blur radius (output pixels) reached at blur strength 1.
    pub max_blur_radius: f32,
    /// Stroke curve outlines on top of the diffused image.
    pub draw_contours: bool,
    /// Color composited under the (possibly translucent) diffused field.
    pub background: Rgba,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            quality: 1.0,
            smooth_iterations: 20,
            max_working_size: MAX_WORKING_SIZE,
            max_blur_radius: 8.0,
            draw_contours: false,
            background: Rgba::WHITE,
        }
    }
}

impl DiffusionConfig {
    /// Copy of this config bounded so that pyramid allocation stays finite.
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();
        let quality = if config.quality.is_finite() {
            config.quality.clamp(0.125, 4.0)
        } else {
            1.0
        };
        if quality != config.quality {
            warn!("quality {} clamped to {}", config.quality, quality);
            config.quality = quality;
        }
        let iterations = config.smooth_iterations.clamp(1, 500);
        if iterations != config.smooth_iterations {
            warn!(
                "smooth_iterations {} clamped to {}",
                config.smooth_iterations, iterations
            );
            config.smooth_iterations = iterations;
        }
        config.max_working_size = config.max_working_size.clamp(1, MAX_WORKING_SIZE);
        if !(config.max_blur_radius >= 0.0) {
            config.max_blur_radius = 0.0;
        }
        config.max_blur_radius = config.max_blur_radius.min(64.0);
        config
    }
}

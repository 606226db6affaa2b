//! diffusion-curves: photograph → diffusion curves → rendered image.
//!
//! Vectorizes a raster image into Bézier curves carrying colors on both
//! sides, and renders such curves back into an image by diffusing their
//! colors across the plane with a multigrid solver.
//!
//! # Example
//!
//! ```no_run
//! use diffusion_curves::{render, vectorize_path, DiffusionConfig, VectorizerConfig};
//! use std::path::Path;
//!
//! let report = vectorize_path(Path::new("photo.png"), &VectorizerConfig::default())?;
//! let image = render(&report.curves, 640, 480, &DiffusionConfig::default())?;
//! image.save("diffused.png").ok();
//! # Ok::<(), diffusion_curves::CurveError>(())
//! ```

#![forbid(unsafe_code)]

mod bitmap;
mod config;
mod geom;

pub mod curve;
pub mod diffusion;
pub mod error;
pub mod render;
pub mod vectorize;

// Re-export kurbo so downstream users get the same Point/Vec2/Rect
// types used throughout the curve model.
pub use kurbo;

pub use config::{
    DiffusionConfig, VectorizerConfig, MAX_SAMPLE_DENSITY, MAX_STACK_HEIGHT, MAX_WORKING_SIZE,
};
pub use curve::{
    export_records, import_records, Bezier, BlurPoint, ColorPoint, CurveRecord, CurveSet, Rgba,
    Side,
};
pub use error::CurveError;
pub use vectorize::{CancelToken, VectorizeReport};

use image::{RgbImage, RgbaImage};
use std::path::Path;

/// Full pipeline: in-memory image → colored diffusion curves.
///
/// Pipeline: Gaussian scale space, Canny edge stack, chain tracing,
/// optimal polyline simplification, Bézier fitting and color sampling.
/// `cancel` is polled between stages.
pub fn vectorize(
    image: &RgbImage,
    config: &VectorizerConfig,
    cancel: Option<&CancelToken>,
) -> Result<VectorizeReport, CurveError> {
    vectorize::run(image, config, cancel)
}

/// Load an image from disk and vectorize it.
pub fn vectorize_path(path: &Path, config: &VectorizerConfig) -> Result<VectorizeReport, CurveError> {
    let image = bitmap::load_rgb(path)?;
    vectorize::run(&image, config, None)
}

/// Diffuse `curves` into a `width x height` RGBA image.
pub fn render(
    curves: &CurveSet,
    width: u32,
    height: u32,
    config: &DiffusionConfig,
) -> Result<RgbaImage, CurveError> {
    render::render(curves, width, height, config)
}

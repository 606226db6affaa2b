//! Diffusion solver: curve constraints → filled color and blur field.
//!
//! 1. Rasterize curve-side colors into a working grid
//! 2. Restrict to a 1x1 pyramid
//! 3. Prolongate and relax with constrained Jacobi, coarse to fine
//! 4. Re-stamp the blur channel from blur points
//!
//! The working grid is the output size times `quality`, shrunk if needed
//! so neither side exceeds `max_working_size`.

pub mod field;
pub mod multigrid;
pub mod rasterize;

use log::info;

use crate::config::DiffusionConfig;
use crate::curve::CurveSet;
use crate::error::CurveError;

pub use self::field::{Cell, Field};
pub use self::rasterize::GridMapping;

/// Working-grid size for an output of `width x height`.
///
/// `config` should already be clamped.
pub fn working_size(width: u32, height: u32, config: &DiffusionConfig) -> (u32, u32) {
    let q = config.quality as f64;
    let mut w = (width as f64 * q).round().max(1.0);
    let mut h = (height as f64 * q).round().max(1.0);
    let limit = config.max_working_size.max(1) as f64;
    let over = (w.max(h) / limit).max(1.0);
    if over > 1.0 {
        w = (w / over).floor().max(1.0);
        h = (h / over).floor().max(1.0);
    }
    (w as u32, h as u32)
}

/// Solve the diffusion field for `curves` at the working resolution of
/// a `width x height` output.
pub fn diffuse(
    curves: &CurveSet,
    width: u32,
    height: u32,
    config: &DiffusionConfig,
) -> Result<Field, CurveError> {
    diffuse_clamped(curves, width, height, &config.clamped())
}

/// [`diffuse`] for a config that has already been through
/// [`DiffusionConfig::clamped`].
pub(crate) fn diffuse_clamped(
    curves: &CurveSet,
    width: u32,
    height: u32,
    config: &DiffusionConfig,
) -> Result<Field, CurveError> {
    if width == 0 || height == 0 {
        return Err(CurveError::InvalidSize { width, height });
    }
    let (ww, wh) = working_size(width, height, config);
    let mapping = GridMapping::new((width, height), (ww, wh));

    let mut constraints = Field::new(ww, wh);
    rasterize::rasterize(curves, &mut constraints, &mapping);
    info!(
        "Diffuse      {} curves -> {}x{} grid, {} fixed cells, {} sweeps/level",
        curves.visible().count(),
        ww,
        wh,
        constraints.constrained_count(),
        config.smooth_iterations
    );

    let mut field = multigrid::solve(&constraints, config.smooth_iterations);
    rasterize::rasterize_blur(curves, &mut field, &mapping);
    Ok(field)
}

//! Vectorization pipeline: raster image → diffusion curves.
//!
//! 1. Gaussian scale space
//! 2. Canny edge stack, truncated at the first edgeless level
//! 3. Edge chain tracing
//! 4. Dominant-point polyline extraction (DP)
//! 5. Catmull-Rom style Bézier construction, split at the control-point budget
//! 6. Color sampling along curve normals
//!
//! Stages run strictly in sequence. Within a stage, chains and curves are
//! processed in parallel with rayon.

pub mod chain;
pub mod color;
pub mod curve;
pub mod edges;
pub mod polyline;
pub mod scale_space;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use kurbo::Point;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::VectorizerConfig;
use crate::curve::{Bezier, CurveSet};
use crate::error::CurveError;

use self::color::{LabImage, SampleParams};
use self::curve::FitParams;
use self::edges::EdgeStack;
use self::scale_space::GaussianStack;

/// Shared flag for abandoning a vectorization between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The curves produced by a run, plus per-stage counts.
#[derive(Debug, Clone, Default)]
pub struct VectorizeReport {
    pub curves: CurveSet,
    /// Levels left after edge-stack truncation.
    pub stack_height: usize,
    pub chains: usize,
    pub polylines: usize,
    pub curve_count: usize,
    pub color_points: usize,
    pub elapsed: Duration,
}

/// Run the full vectorization pipeline on an in-memory image.
pub fn run(
    image: &RgbImage,
    config: &VectorizerConfig,
    cancel: Option<&CancelToken>,
) -> Result<VectorizeReport, CurveError> {
    let t_start = Instant::now();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CurveError::EmptyImage);
    }
    let config = config.clamped();
    let checkpoint = || match cancel {
        Some(token) if token.is_cancelled() => Err(CurveError::Cancelled),
        _ => Ok(()),
    };
    let mut report = VectorizeReport::default();

    // ── Scale space ───────────────────────────────────────
    let mut stack = GaussianStack::build(
        image,
        config.stack_height,
        config.sigma_step,
        config.std_dev_cutoff,
    );
    info!(
        "Scale space  {} levels from {}x{} px (sigma step {})",
        stack.height(),
        width,
        height,
        config.sigma_step
    );
    checkpoint()?;

    // ── Edges ─────────────────────────────────────────────
    let edges = EdgeStack::build(&mut stack, config.canny_low, config.canny_high);
    report.stack_height = edges.height();
    info!(
        "Edges        {} levels with edges (thresholds {}/{})",
        edges.height(),
        config.canny_low,
        config.canny_high
    );
    let level = config.edge_level.min(edges.height().saturating_sub(1));
    let Some(edge_image) = edges.level(level) else {
        info!("Result       no edges detected, 0 curves");
        report.elapsed = t_start.elapsed();
        return Ok(report);
    };
    checkpoint()?;

    // ── Chains ────────────────────────────────────────────
    let chains = chain::trace_edges(edge_image, config.min_chain_length);
    report.chains = chains.len();
    info!(
        "Chains       {} chains of >= {} px on level {}",
        chains.len(),
        config.min_chain_length,
        level
    );
    checkpoint()?;

    // ── Polylines ─────────────────────────────────────────
    let polylines: Vec<Vec<Point>> = chains
        .par_iter()
        .filter_map(|c| match polyline::simplify(&c.to_vec()) {
            Ok(poly) => Some(poly),
            Err(e) => {
                debug!("skipping chain: {e}");
                None
            }
        })
        .collect();
    report.polylines = polylines.len();
    let vertices: usize = polylines.iter().map(Vec::len).sum();
    info!("Polylines    {} polylines, {} vertices", polylines.len(), vertices);
    checkpoint()?;

    // ── Curves ────────────────────────────────────────────
    let fit = FitParams {
        tension: config.tension,
        contour_thickness: config.contour_thickness,
        diffusion_width: config.diffusion_width,
    };
    let mut curves: Vec<Bezier> = polylines
        .par_iter()
        .flat_map_iter(|poly| match curve::fit_polyline(poly, &fit) {
            Ok(curves) => curves,
            Err(e) => {
                debug!("skipping polyline: {e}");
                Vec::new()
            }
        })
        .collect();
    report.curve_count = curves.len();
    info!("Curves       {} curves (tension {})", curves.len(), config.tension);
    checkpoint()?;

    // ── Colors ────────────────────────────────────────────
    let lab = config.reject_outliers.then(|| LabImage::from_rgb(image));
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let sample = SampleParams {
        density: config.sample_density,
        distance: config.sample_distance,
        reject_outliers: config.reject_outliers,
    };
    report.color_points = curves
        .par_iter_mut()
        .enumerate()
        .map(|(i, curve)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            color::sample_curve(curve, image, lab.as_ref(), &sample, &mut rng)
        })
        .sum();
    info!(
        "Colors       {} color points (seed {}{})",
        report.color_points,
        seed,
        if sample.reject_outliers { ", outliers rejected" } else { "" }
    );
    checkpoint()?;

    let mut set: CurveSet = curves.into_iter().collect();
    if config.void_threshold > 0.0 {
        set.mark_void(config.void_threshold);
    }
    report.curves = set;
    report.elapsed = t_start.elapsed();
    info!(
        "Result       {} curves, {} color points  ({}ms)",
        report.curves.len(),
        report.color_points,
        report.elapsed.as_millis()
    );
    Ok(report)
}

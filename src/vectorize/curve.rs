//! Polyline → Bézier curves.
//!
//! Knots get central-difference tangents divided by the tension. Each
//! interior knot contributes `knot - d/3, knot, knot + d/3`; the endpoints
//! contribute themselves plus one handle. A polyline of `n` knots therefore
//! produces `3n - 2` control points with knots at multiples of 3.
//!
//! Lists longer than [`SPLIT_BUDGET`] are cut at a knot. The next piece
//! starts at that same knot, followed by its outgoing handle, so adjacent
//! pieces meet with a shared endpoint and a continuous tangent.

use kurbo::{Point, Vec2};
use log::debug;

use crate::curve::{Bezier, MAX_CONTROL_POINTS};
use crate::error::CurveError;

/// Largest piece the fitter emits, leaving headroom under the hard cap.
pub const SPLIT_BUDGET: usize = 28;

/// Parameters for curve construction.
#[derive(Debug, Clone)]
pub struct FitParams {
    /// Tangents are `(next - prev) / tension`. Default: 2.0.
    pub tension: f64,
    pub contour_thickness: f32,
    pub diffusion_width: f32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            tension: 2.0,
            contour_thickness: crate::curve::DEFAULT_CONTOUR_THICKNESS,
            diffusion_width: crate::curve::DEFAULT_DIFFUSION_WIDTH,
        }
    }
}

/// Fit one polyline. Fails only for fewer than two knots.
pub fn fit_polyline(polyline: &[Point], params: &FitParams) -> Result<Vec<Bezier>, CurveError> {
    let control_points = control_points(polyline, params.tension)?;
    let pieces = split(&control_points);
    if pieces.len() > 1 {
        debug!(
            "split {} control points into {} curves",
            control_points.len(),
            pieces.len()
        );
    }
    pieces
        .into_iter()
        .map(|piece| {
            let mut curve = Bezier::from_control_points(piece.to_vec())?;
            curve.contour_thickness = params.contour_thickness;
            curve.diffusion_width = params.diffusion_width;
            Ok(curve)
        })
        .collect()
}

/// Catmull-Rom style control polygon through every knot.
pub fn control_points(polyline: &[Point], tension: f64) -> Result<Vec<Point>, CurveError> {
    let n = polyline.len();
    if n < 2 {
        return Err(CurveError::DegeneratePolyline(n));
    }
    let derivative = |i: usize| -> Vec2 {
        let d = if i == 0 {
            polyline[1] - polyline[0]
        } else if i == n - 1 {
            polyline[n - 1] - polyline[n - 2]
        } else {
            polyline[i + 1] - polyline[i - 1]
        };
        d / tension
    };

    let mut points = Vec::with_capacity(3 * n - 2);
    points.push(polyline[0]);
    points.push(polyline[0] + derivative(0) / 3.0);
    for i in 1..n - 1 {
        let d = derivative(i) / 3.0;
        points.push(polyline[i] - d);
        points.push(polyline[i]);
        points.push(polyline[i] + d);
    }
    points.push(polyline[n - 1] - derivative(n - 1) / 3.0);
    points.push(polyline[n - 1]);
    Ok(points)
}

/// Cut a control polygon into pieces of at most [`SPLIT_BUDGET`] points.
/// Every piece starts and ends on a knot; neighbors share the cut knot.
pub fn split(points: &[Point]) -> Vec<&[Point]> {
    const _: () = assert!(SPLIT_BUDGET <= MAX_CONTROL_POINTS);
    let total = points.len();
    let mut pieces = Vec::new();
    let mut start = 0;
    while total - start > SPLIT_BUDGET {
        let end = (start + SPLIT_BUDGET - 1) / 3 * 3;
        pieces.push(&points[start..=end]);
        start = end;
    }
    pieces.push(&points[start..]);
    pieces
}

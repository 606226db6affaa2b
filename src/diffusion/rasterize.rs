//! Curve constraints → initial fixed cells of the working grid.
//!
//! Every non-void curve is walked in depth order at sub-cell spacing. At
//! each sample the interpolated left color is written along `+normal` and
//! the right color along `-normal`, out to the curve's diffusion width.
//! Later (deeper) curves overwrite earlier ones.

use kurbo::{Point, Vec2};

use super::field::{Cell, Field};
use crate::curve::{Bezier, CurveSet, Side, DEFAULT_INTERVALS};

/// Spacing between writes, in working cells.
const STEP: f64 = 0.5;

/// Maps curve coordinates (output pixels) to working-grid cells.
#[derive(Debug, Clone, Copy)]
pub struct GridMapping {
    pub scale: Vec2,
}

impl GridMapping {
    pub fn new(output: (u32, u32), working: (u32, u32)) -> Self {
        Self {
            scale: Vec2::new(
                working.0 as f64 / output.0.max(1) as f64,
                working.1 as f64 / output.1.max(1) as f64,
            ),
        }
    }

    pub fn to_cell(&self, p: Point) -> (i64, i64) {
        (
            (p.x * self.scale.x).floor() as i64,
            (p.y * self.scale.y).floor() as i64,
        )
    }

    fn min_scale(&self) -> f64 {
        self.scale.x.min(self.scale.y)
    }

    fn max_scale(&self) -> f64 {
        self.scale.x.max(self.scale.y)
    }
}

/// Sample parameters along a curve, no more than [`STEP`] cells apart.
fn parameters(curve: &Bezier, mapping: &GridMapping) -> impl Iterator<Item = f64> {
    let length = curve.length(DEFAULT_INTERVALS) * mapping.max_scale();
    let n = ((length / STEP).ceil() as usize).max(1);
    (0..=n).map(move |i| i as f64 / n as f64)
}

/// Offsets along the normal in `(0, width]`, in curve coordinates.
fn offsets(width: f32, mapping: &GridMapping) -> impl Iterator<Item = f64> {
    let step = STEP / mapping.min_scale();
    let width = width.max(0.0) as f64;
    let n = (width / step).ceil() as usize;
    (1..=n).map(move |i| (i as f64 * step).min(width))
}

/// Rasterize color and blur constraints of every visible curve.
pub fn rasterize(curves: &CurveSet, field: &mut Field, mapping: &GridMapping) {
    for curve in curves.visible() {
        rasterize_curve(curve, field, mapping);
    }
}

fn rasterize_curve(curve: &Bezier, field: &mut Field, mapping: &GridMapping) {
    for t in parameters(curve, mapping) {
        let normal = curve.normal_at(t);
        if normal.hypot2() == 0.0 {
            continue;
        }
        let origin = curve.value_at(t);
        let blur = curve.blur_at(t).unwrap_or(0.0);
        for side in [Side::Left, Side::Right] {
            let Some(color) = curve.color_at(side, t) else {
                continue;
            };
            let cell = Cell::new(color.to_array(), blur);
            for d in offsets(curve.diffusion_width, mapping) {
                let (x, y) = mapping.to_cell(origin + normal * (side.sign() * d));
                field.constrain(x, y, cell);
            }
        }
    }
}

/// Re-stamp the blur channel of curves that carry blur points, leaving
/// colors untouched.
pub fn rasterize_blur(curves: &CurveSet, field: &mut Field, mapping: &GridMapping) {
    for curve in curves.visible().filter(|c| c.blur_points().len() >= 2) {
        for t in parameters(curve, mapping) {
            let normal = curve.normal_at(t);
            let Some(blur) = curve.blur_at(t) else {
                continue;
            };
            if normal.hypot2() == 0.0 {
                continue;
            }
            let origin = curve.value_at(t);
            let (x, y) = mapping.to_cell(origin);
            field.set_blur(x, y, blur);
            for d in offsets(curve.diffusion_width, mapping) {
                for sign in [1.0, -1.0] {
                    let (x, y) = mapping.to_cell(origin + normal * (sign * d));
                    field.set_blur(x, y, blur);
                }
            }
        }
    }
}

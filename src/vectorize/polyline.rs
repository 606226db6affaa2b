//! Dominant-point polyline extraction from an open pixel chain.
//!
//! 1. **Straight pairs**: `(i, k)` is straight when every pixel strictly
//!    between them lies within one pixel of the ray `i → k` and no farther
//!    from `i` than `k` is (plus one pixel).
//! 2. **Penalty**: each straight pair gets a closed-form fit error from
//!    prefix sums of x, y, x², xy and y².
//! 3. **Backward DP**: from the last pixel toward the first, choose the
//!    next vertex minimizing segment count, then accumulated penalty.
//!
//! Straight pairs from `i` are found in one forward pass with an angular
//! corridor, so the whole simplification is O(n²) in time and O(n) in
//! memory. Rows are consumed by the DP as they are produced.

use std::f64::consts::{PI, TAU};

use kurbo::{Point, Vec2};

use crate::error::CurveError;

/// Maximum distance from the ray for a pixel to count as on it.
const STRAIGHT_TOLERANCE: f64 = 1.0;

/// Prefix sum accumulator for O(1) line-fit statistics.
#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    x: f64,
    y: f64,
    x2: f64,
    xy: f64,
    y2: f64,
}

/// Reduce a pixel chain to its dominant points.
///
/// A straight chain of any length reduces to its two endpoints.
pub fn simplify(chain: &[(i32, i32)]) -> Result<Vec<Point>, CurveError> {
    let n = chain.len();
    if n < 2 {
        return Err(CurveError::DegeneratePolyline(n));
    }
    let points: Vec<Point> = chain
        .iter()
        .map(|&(x, y)| Point::new(x as f64, y as f64))
        .collect();
    let sums = calc_sums(&points);

    let path = best_path(n, |i| straight_row(&points, &sums, i));
    Ok(path.into_iter().map(|i| points[i]).collect())
}

/// Prefix sums relative to the first point, so `sums[k+1] - sums[i]`
/// covers the inclusive range `[i..=k]`.
fn calc_sums(pt: &[Point]) -> Vec<Sums> {
    let origin = pt[0];
    let mut sums = vec![Sums::default(); pt.len() + 1];
    for (i, p) in pt.iter().enumerate() {
        let x = p.x - origin.x;
        let y = p.y - origin.y;
        sums[i + 1] = Sums {
            x: sums[i].x + x,
            y: sums[i].y + y,
            x2: sums[i].x2 + x * x,
            xy: sums[i].xy + x * y,
            y2: sums[i].y2 + y * y,
        };
    }
    sums
}

// ── Straight pairs ───────────────────────────────────────

/// Open interval of ray angles from one pixel. Unbounded until the first
/// pixel at least [`STRAIGHT_TOLERANCE`] away constrains it.
#[derive(Debug, Clone, Copy)]
struct Corridor {
    lo: f64,
    hi: f64,
}

impl Corridor {
    fn open() -> Self {
        Self {
            lo: f64::NEG_INFINITY,
            hi: f64::INFINITY,
        }
    }

    fn is_bounded(&self) -> bool {
        self.lo.is_finite()
    }

    fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    /// `angle` shifted by whole turns to lie nearest the corridor center.
    fn unwrap(&self, angle: f64) -> f64 {
        let mid = (self.lo + self.hi) / 2.0;
        angle + TAU * ((mid - angle) / TAU).round()
    }

    fn contains(&self, angle: f64) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let a = self.unwrap(angle);
        self.lo < a && a < self.hi
    }

    /// Keep only rays passing within the tolerance of the pixel at `v`.
    fn narrow(&mut self, v: Vec2) {
        let dist = v.hypot();
        if dist < STRAIGHT_TOLERANCE {
            return;
        }
        let half = (STRAIGHT_TOLERANCE / dist).asin().min(PI / 2.0);
        let angle = if self.is_bounded() {
            self.unwrap(v.atan2())
        } else {
            v.atan2()
        };
        self.lo = self.lo.max(angle - half);
        self.hi = self.hi.min(angle + half);
    }
}

/// Every `k > i` such that `i → k` is straight, with its penalty.
///
/// ## Algorithm: angular corridor
///
/// Walking forward from `i`, the corridor holds every ray direction that
/// passes within the tolerance of all pixels seen so far. A pixel at
/// distance `d` allows directions within `asin(1 / d)` of its own, so the
/// corridor only shrinks. Pixel `k` is straight from `i` when its direction
/// lies inside the corridor built from `i + 1 .. k`. Once the corridor is
/// empty no later pixel can qualify.
fn straight_row(pt: &[Point], sums: &[Sums], i: usize) -> Vec<(usize, f64)> {
    let mut row = Vec::new();
    let mut corridor = Corridor::open();
    let mut reach = 0.0f64;
    for k in i + 1..pt.len() {
        let v = pt[k] - pt[i];
        let dist = v.hypot();
        if dist > 0.0 && reach < dist + STRAIGHT_TOLERANCE && corridor.contains(v.atan2()) {
            row.push((k, penalty(pt, sums, i, k)));
        }
        corridor.narrow(v);
        if corridor.is_empty() {
            break;
        }
        reach = reach.max(dist);
    }
    row
}

/// RMS-style distance of `[i..=k]` from the segment `i → k`, scaled by its
/// length. Computed from the second moments about the segment midpoint.
fn penalty(pt: &[Point], sums: &[Sums], i: usize, k: usize) -> f64 {
    let count = (k - i + 1) as f64;
    let origin = pt[0];

    let x = sums[k + 1].x - sums[i].x;
    let y = sums[k + 1].y - sums[i].y;
    let x2 = sums[k + 1].x2 - sums[i].x2;
    let xy = sums[k + 1].xy - sums[i].xy;
    let y2 = sums[k + 1].y2 - sums[i].y2;

    let px = (pt[i].x + pt[k].x) / 2.0 - origin.x;
    let py = (pt[i].y + pt[k].y) / 2.0 - origin.y;
    let dx = pt[k].x - pt[i].x;
    let dy = pt[k].y - pt[i].y;

    let a = (x2 - 2.0 * x * px) / count + px * px;
    let b = (xy - x * py - y * px) / count + px * py;
    let c = (y2 - 2.0 * y * py) / count + py * py;

    let s = dy * dy * a - 2.0 * dx * dy * b + dx * dx * c;
    s.max(0.0).sqrt()
}

// ── Optimal path ─────────────────────────────────────────

/// Backward DP over straight pairs. `row(i)` lists the straight pairs
/// starting at `i`; rows are requested from `n - 2` down to 0. Returns the
/// chosen vertex indices, always starting at 0 and ending at `n - 1`.
fn best_path(n: usize, mut row: impl FnMut(usize) -> Vec<(usize, f64)>) -> Vec<usize> {
    // (segments, penalty) from each index to the end.
    let mut cost = vec![(usize::MAX, f64::INFINITY); n];
    let mut next = vec![n - 1; n];
    cost[n - 1] = (0, 0.0);

    for i in (0..n - 1).rev() {
        for (k, pen) in row(i) {
            let (segments, total) = cost[k];
            if segments == usize::MAX {
                continue;
            }
            let candidate = (segments + 1, total + pen);
            if candidate.0 < cost[i].0 || (candidate.0 == cost[i].0 && candidate.1 < cost[i].1) {
                cost[i] = candidate;
                next[i] = k;
            }
        }
        // Neighbors in a chain are always joinable.
        if cost[i].0 == usize::MAX {
            let (segments, total) = cost[i + 1];
            cost[i] = (segments + 1, total);
            next[i] = i + 1;
        }
    }

    let mut path = vec![0];
    let mut i = 0;
    while i < n - 1 {
        i = next[i];
        path.push(i);
    }
    path
}

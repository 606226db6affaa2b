//! A single diffusion curve: Bernstein-form Bézier geometry plus the color
//! and blur constraints it owns.

use kurbo::{Point, Rect, Vec2};

use super::points::{BlurPoint, BlurPointRef, ColorPoint, ColorPointRef, Rgba, Side};
use crate::error::CurveError;
use crate::geom::{bernstein, perpendicular};

/// Hard cap on control points per curve.
pub const MAX_CONTROL_POINTS: usize = 32;

/// Sampling resolution used when a caller has no better choice.
pub const DEFAULT_INTERVALS: usize = 100;

pub const DEFAULT_CONTOUR_THICKNESS: f32 = 3.0;
pub const DEFAULT_DIFFUSION_WIDTH: f32 = 3.0;

/// Derivatives shorter than this are treated as degenerate.
const TANGENT_EPSILON: f64 = 1e-12;

/// A Bézier curve of degree `control_points.len() - 1`.
///
/// Color points are kept sorted by `t` per side, blur points by `t`.
/// Points with equal `t` keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bezier {
    control_points: Vec<Point>,
    left_colors: Vec<ColorPoint>,
    right_colors: Vec<ColorPoint>,
    blur_points: Vec<BlurPoint>,
    pub contour_color: Rgba,
    pub contour_thickness: f32,
    pub diffusion_width: f32,
    /// Draw order; larger depths paint over smaller ones.
    pub depth: i32,
    /// Too short to matter: skipped by picking and diffusion.
    pub is_void: bool,
}

impl Default for Bezier {
    fn default() -> Self {
        Self {
            control_points: Vec::new(),
            left_colors: Vec::new(),
            right_colors: Vec::new(),
            blur_points: Vec::new(),
            contour_color: Rgba::BLACK,
            contour_thickness: DEFAULT_CONTOUR_THICKNESS,
            diffusion_width: DEFAULT_DIFFUSION_WIDTH,
            depth: 0,
            is_void: false,
        }
    }
}

impl Bezier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from control points, rejecting more than 32.
    pub fn from_control_points(points: Vec<Point>) -> Result<Self, CurveError> {
        if points.len() > MAX_CONTROL_POINTS {
            return Err(CurveError::ControlPointLimit {
                count: points.len(),
            });
        }
        Ok(Self {
            control_points: points,
            ..Self::default()
        })
    }

    // ── Control points ───────────────────────────────────

    pub fn control_points(&self) -> &[Point] {
        &self.control_points
    }

    pub fn push_control_point(&mut self, point: Point) -> Result<(), CurveError> {
        if self.control_points.len() >= MAX_CONTROL_POINTS {
            return Err(CurveError::ControlPointLimit {
                count: self.control_points.len() + 1,
            });
        }
        self.control_points.push(point);
        Ok(())
    }

    pub fn remove_control_point(&mut self, index: usize) -> Option<Point> {
        (index < self.control_points.len()).then(|| self.control_points.remove(index))
    }

    /// Number of control points (degree + 1).
    pub fn order(&self) -> usize {
        self.control_points.len()
    }

    pub fn degree(&self) -> usize {
        self.order().saturating_sub(1)
    }

    // ── Geometry ─────────────────────────────────────────

    /// Position at `t` via the Bernstein sum over all control points.
    pub fn value_at(&self, t: f64) -> Point {
        if self.control_points.is_empty() {
            return Point::ZERO;
        }
        let n = self.degree();
        self.control_points
            .iter()
            .enumerate()
            .fold(Vec2::ZERO, |acc, (i, p)| acc + p.to_vec2() * bernstein(n, i, t))
            .to_point()
    }

    /// Unit tangent at `t`, or the zero vector where the derivative vanishes.
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        let n = self.degree();
        if n == 0 {
            return Vec2::ZERO;
        }
        let derivative = self
            .control_points
            .windows(2)
            .enumerate()
            .fold(Vec2::ZERO, |acc, (i, pair)| {
                acc + (pair[1] - pair[0]) * bernstein(n - 1, i, t)
            });
        let len = derivative.hypot();
        if !len.is_finite() || len < TANGENT_EPSILON {
            return Vec2::ZERO;
        }
        derivative / len
    }

    /// Tangent rotated by +90 degrees. Points toward the left side.
    pub fn normal_at(&self, t: f64) -> Vec2 {
        perpendicular(self.tangent_at(t))
    }

    /// Parameter of the closest of `intervals + 1` evenly spaced samples.
    pub fn parameter_at(&self, point: Point, intervals: usize) -> f64 {
        let intervals = intervals.max(1);
        let mut best_t = 0.0;
        let mut best_distance = f64::INFINITY;
        for i in 0..=intervals {
            let t = i as f64 / intervals as f64;
            let distance = self.value_at(t).distance(point);
            if distance < best_distance {
                best_distance = distance;
                best_t = t;
            }
        }
        best_t
    }

    /// Arc length approximated by `intervals` chords.
    pub fn length(&self, intervals: usize) -> f64 {
        let intervals = intervals.max(1);
        let mut length = 0.0;
        let mut prev = self.value_at(0.0);
        for i in 1..=intervals {
            let next = self.value_at(i as f64 / intervals as f64);
            length += prev.distance(next);
            prev = next;
        }
        length
    }

    /// Smallest distance from `point` to `intervals + 1` curve samples.
    pub fn distance_to_point(&self, point: Point, intervals: usize) -> f64 {
        let intervals = intervals.max(1);
        (0..=intervals)
            .map(|i| self.value_at(i as f64 / intervals as f64).distance(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Axis-aligned bounds of `intervals + 1` curve samples.
    pub fn bounding_box(&self, intervals: usize) -> Rect {
        let intervals = intervals.max(1);
        let first = self.value_at(0.0);
        (1..=intervals)
            .map(|i| self.value_at(i as f64 / intervals as f64))
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    // ── Color points ─────────────────────────────────────

    pub fn color_points(&self, side: Side) -> &[ColorPoint] {
        match side {
            Side::Left => &self.left_colors,
            Side::Right => &self.right_colors,
        }
    }

    fn color_points_mut(&mut self, side: Side) -> &mut Vec<ColorPoint> {
        match side {
            Side::Left => &mut self.left_colors,
            Side::Right => &mut self.right_colors,
        }
    }

    /// Left and right color points, left first.
    pub fn all_color_points(&self) -> impl Iterator<Item = &ColorPoint> {
        self.left_colors.iter().chain(self.right_colors.iter())
    }

    /// Insert keeping the side sorted by `t`; ties go after existing points.
    pub fn add_color_point(&mut self, point: ColorPoint) -> ColorPointRef {
        let point = ColorPoint {
            t: sanitize_parameter(point.t),
            ..point
        };
        let points = self.color_points_mut(point.side);
        let index = points.partition_point(|p| p.t <= point.t);
        points.insert(index, point);
        ColorPointRef {
            side: point.side,
            index,
        }
    }

    pub fn color_point(&self, handle: ColorPointRef) -> Option<&ColorPoint> {
        self.color_points(handle.side).get(handle.index)
    }

    pub fn remove_color_point(&mut self, handle: ColorPointRef) -> Option<ColorPoint> {
        let points = self.color_points_mut(handle.side);
        (handle.index < points.len()).then(|| points.remove(handle.index))
    }

    /// Stable re-sort of both sides by `t`.
    pub fn sort_color_points(&mut self) {
        self.left_colors.sort_by(|a, b| a.t.total_cmp(&b.t));
        self.right_colors.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    /// Color on `side` at `t`, linearly interpolated between the bracketing
    /// points and held constant past the first and last point.
    ///
    /// Fewer than two points on a side contribute nothing.
    pub fn color_at(&self, side: Side, t: f64) -> Option<Rgba> {
        let points = self.color_points(side);
        interpolate(points, t, |p| p.t, |a, b, s| a.color.lerp(b.color, s))
    }

    // ── Blur points ──────────────────────────────────────

    pub fn blur_points(&self) -> &[BlurPoint] {
        &self.blur_points
    }

    pub fn add_blur_point(&mut self, point: BlurPoint) -> BlurPointRef {
        let t = sanitize_parameter(point.t);
        let index = self.blur_points.partition_point(|p| p.t <= t);
        self.blur_points.insert(index, BlurPoint { t, ..point });
        BlurPointRef { index }
    }

    pub fn blur_point(&self, handle: BlurPointRef) -> Option<&BlurPoint> {
        self.blur_points.get(handle.index)
    }

    pub fn remove_blur_point(&mut self, handle: BlurPointRef) -> Option<BlurPoint> {
        (handle.index < self.blur_points.len()).then(|| self.blur_points.remove(handle.index))
    }

    pub fn sort_blur_points(&mut self) {
        self.blur_points.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    /// Blur strength at `t`, interpolated like [`Bezier::color_at`].
    pub fn blur_at(&self, t: f64) -> Option<f32> {
        interpolate(&self.blur_points, t, |p| p.t, |a, b, s| {
            a.strength + s * (b.strength - a.strength)
        })
    }

    /// Set every blur point to `strength`.
    pub fn set_blur_strength(&mut self, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        for point in &mut self.blur_points {
            point.strength = strength;
        }
    }

    // ── Constraint positions ─────────────────────────────

    /// World position of a color point, offset from the curve by the
    /// contour thickness plus `gap` toward its side.
    pub fn color_point_position(&self, handle: ColorPointRef, gap: f64) -> Option<Point> {
        let point = self.color_point(handle)?;
        let offset = (self.contour_thickness as f64 + gap) * point.side.sign();
        Some(self.value_at(point.t) + self.normal_at(point.t) * offset)
    }

    /// World position of a blur point, offset toward the left side.
    pub fn blur_point_position(&self, handle: BlurPointRef, gap: f64) -> Option<Point> {
        let point = self.blur_point(handle)?;
        let offset = self.contour_thickness as f64 + gap;
        Some(self.value_at(point.t) + self.normal_at(point.t) * offset)
    }
}

fn sanitize_parameter(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Piecewise-linear lookup over points sorted by parameter.
fn interpolate<P, V>(
    points: &[P],
    t: f64,
    param: impl Fn(&P) -> f64,
    lerp: impl Fn(&P, &P, f32) -> V,
) -> Option<V> {
    if points.len() < 2 {
        return None;
    }
    let first = &points[0];
    let last = &points[points.len() - 1];
    if t <= param(first) {
        return Some(lerp(first, first, 0.0));
    }
    if t >= param(last) {
        return Some(lerp(last, last, 0.0));
    }
    let i = points.partition_point(|p| param(p) <= t).clamp(1, points.len() - 1);
    let (a, b) = (&points[i - 1], &points[i]);
    let span = param(b) - param(a);
    if span <= 0.0 {
        return Some(lerp(b, b, 0.0));
    }
    Some(lerp(a, b, ((t - param(a)) / span) as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn wavy() -> Bezier {
        Bezier::from_control_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 25.0),
            Point::new(30.0, -12.0),
            Point::new(55.0, 8.0),
            Point::new(70.0, 40.0),
        ])
        .unwrap()
    }

    fn red() -> Rgba {
        Rgba::new(1.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn endpoints_are_interpolated() {
        let curve = wavy();
        assert_eq!(curve.value_at(0.0), Point::new(0.0, 0.0));
        assert_eq!(curve.value_at(1.0), Point::new(70.0, 40.0));
    }

    #[test]
    fn tangent_is_unit_length() {
        let curve = wavy();
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            assert_relative_eq!(curve.tangent_at(t).hypot(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn coincident_points_give_zero_tangent() {
        let curve = Bezier::from_control_points(vec![Point::new(3.0, 3.0); 4]).unwrap();
        let tangent = curve.tangent_at(0.5);
        assert_eq!(tangent, Vec2::ZERO);
        assert!(!curve.normal_at(0.5).x.is_nan());
    }

    #[test]
    fn normal_points_left_of_travel() {
        let curve =
            Bezier::from_control_points(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        assert_eq!(curve.normal_at(0.3), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn straight_line_length_and_parameter() {
        let curve =
            Bezier::from_control_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]).unwrap();
        assert_relative_eq!(curve.length(50), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curve.parameter_at(Point::new(25.0, 7.0), 100), 0.25, epsilon = 1e-9);
        assert_relative_eq!(curve.distance_to_point(Point::new(50.0, 5.0), 100), 5.0);
    }

    #[test]
    fn control_point_cap_is_enforced() {
        let mut curve =
            Bezier::from_control_points(vec![Point::ZERO; MAX_CONTROL_POINTS]).unwrap();
        assert!(matches!(
            curve.push_control_point(Point::ZERO),
            Err(CurveError::ControlPointLimit { count: 33 })
        ));
        assert!(Bezier::from_control_points(vec![Point::ZERO; 33]).is_err());
    }

    #[test]
    fn color_points_stay_sorted_with_stable_ties() {
        let mut curve = wavy();
        curve.add_color_point(ColorPoint::new(0.8, red(), Side::Left));
        curve.add_color_point(ColorPoint::new(0.2, Rgba::BLACK, Side::Left));
        curve.add_color_point(ColorPoint::new(0.2, Rgba::WHITE, Side::Left));
        let handle = curve.add_color_point(ColorPoint::new(0.5, red(), Side::Right));
        assert_eq!(handle, ColorPointRef { side: Side::Right, index: 0 });

        let left = curve.color_points(Side::Left);
        assert_eq!(left.iter().map(|p| p.t).collect::<Vec<_>>(), vec![0.2, 0.2, 0.8]);
        assert_eq!(left[0].color, Rgba::BLACK);
        assert_eq!(left[1].color, Rgba::WHITE);
    }

    #[test]
    fn sorting_twice_matches_sorting_once() {
        let mut curve = wavy();
        for (i, t) in [0.9, 0.1, 0.5, 0.1, 0.3].into_iter().enumerate() {
            let side = if i % 2 == 0 { Side::Left } else { Side::Right };
            curve.add_color_point(ColorPoint::new(t, Rgba::new(i as f32 / 5.0, 0.0, 0.0, 1.0), side));
        }
        curve.sort_color_points();
        let once = curve.clone();
        curve.sort_color_points();
        assert_eq!(curve, once);
    }

    #[test]
    fn color_interpolation_between_brackets() {
        let mut curve = wavy();
        assert_eq!(curve.color_at(Side::Left, 0.5), None);
        curve.add_color_point(ColorPoint::new(0.0, Rgba::BLACK, Side::Left));
        assert_eq!(curve.color_at(Side::Left, 0.5), None);
        curve.add_color_point(ColorPoint::new(1.0, Rgba::WHITE, Side::Left));

        let mid = curve.color_at(Side::Left, 0.25).unwrap();
        assert_relative_eq!(mid.r, 0.25);
        assert_relative_eq!(mid.a, 1.0);
        assert_eq!(curve.color_at(Side::Right, 0.25), None);
    }

    #[test]
    fn values_outside_the_points_are_held() {
        let mut curve = wavy();
        curve.add_blur_point(BlurPoint::new(0.4, 0.2));
        curve.add_blur_point(BlurPoint::new(0.6, 0.8));
        assert_relative_eq!(curve.blur_at(0.0).unwrap(), 0.2);
        assert_relative_eq!(curve.blur_at(1.0).unwrap(), 0.8);
        assert_relative_eq!(curve.blur_at(0.5).unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn color_point_handle_resolves_to_offset_position() {
        let mut curve =
            Bezier::from_control_points(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        curve.contour_thickness = 2.0;
        let left = curve.add_color_point(ColorPoint::new(0.5, red(), Side::Left));
        let right = curve.add_color_point(ColorPoint::new(0.5, red(), Side::Right));
        assert_eq!(curve.color_point_position(left, 1.0), Some(Point::new(5.0, 3.0)));
        assert_eq!(curve.color_point_position(right, 1.0), Some(Point::new(5.0, -3.0)));

        curve.remove_color_point(left);
        assert_eq!(curve.color_point_position(left, 1.0), None);
    }
}

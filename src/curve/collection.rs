//! An ordered set of curves, kept sorted by depth.

use kurbo::{Point, Rect};
use log::debug;

use super::bezier::{Bezier, DEFAULT_INTERVALS};
use super::points::Rgba;

/// Curves sorted by ascending `depth`. Curves sharing a depth keep the order
/// in which they were added, so later additions draw on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSet {
    curves: Vec<Bezier>,
}

impl CurveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every curve whose depth is `<=` the new curve's.
    /// Returns the index the curve landed at.
    pub fn add(&mut self, curve: Bezier) -> usize {
        let index = self.curves.partition_point(|c| c.depth <= curve.depth);
        self.curves.insert(index, curve);
        index
    }

    pub fn add_all(&mut self, curves: impl IntoIterator<Item = Bezier>) {
        for curve in curves {
            self.add(curve);
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Bezier> {
        (index < self.curves.len()).then(|| self.curves.remove(index))
    }

    pub fn clear(&mut self) {
        self.curves.clear();
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bezier> {
        self.curves.get(index)
    }

    /// Mutable access. Changing `depth` through this does not re-sort;
    /// use [`CurveSet::set_depth`] for that.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bezier> {
        self.curves.get_mut(index)
    }

    /// Move a curve to a new depth, keeping the set ordered.
    /// Returns the curve's new index.
    pub fn set_depth(&mut self, index: usize, depth: i32) -> Option<usize> {
        let mut curve = self.remove(index)?;
        curve.depth = depth;
        Some(self.add(curve))
    }

    /// Curves in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bezier> {
        self.curves.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Bezier> {
        self.curves.iter_mut()
    }

    /// Curves that take part in diffusion and picking.
    pub fn visible(&self) -> impl Iterator<Item = &Bezier> {
        self.curves.iter().filter(|c| !c.is_void)
    }

    /// Flag every curve shorter than `threshold` as void.
    /// Returns how many curves are void afterwards.
    pub fn mark_void(&mut self, threshold: f64) -> usize {
        let mut void = 0;
        for curve in &mut self.curves {
            curve.is_void = curve.length(DEFAULT_INTERVALS) < threshold;
            void += curve.is_void as usize;
        }
        debug!("{void} of {} curves marked void", self.curves.len());
        void
    }

    /// Index of the non-void curve closest to `point`, if one lies within
    /// `max_distance`.
    pub fn nearest_curve(&self, point: Point, max_distance: f64) -> Option<usize> {
        self.curves
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_void)
            .map(|(i, c)| (i, c.distance_to_point(point, DEFAULT_INTERVALS)))
            .filter(|&(_, d)| d <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Union of the sampled bounds of every curve.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.curves
            .iter()
            .filter(|c| !c.control_points().is_empty())
            .map(|c| c.bounding_box(DEFAULT_INTERVALS))
            .reduce(|a, b| a.union(b))
    }

    // ── Global setters ───────────────────────────────────

    pub fn set_diffusion_width(&mut self, width: f32) {
        let width = width.max(0.0);
        for curve in &mut self.curves {
            curve.diffusion_width = width;
        }
    }

    pub fn set_contour_thickness(&mut self, thickness: f32) {
        let thickness = thickness.max(0.0);
        for curve in &mut self.curves {
            curve.contour_thickness = thickness;
        }
    }

    pub fn set_contour_color(&mut self, color: Rgba) {
        for curve in &mut self.curves {
            curve.contour_color = color;
        }
    }

    pub fn set_blur_strength(&mut self, strength: f32) {
        for curve in &mut self.curves {
            curve.set_blur_strength(strength);
        }
    }

    /// Total number of left and right color points.
    pub fn color_point_count(&self) -> usize {
        self.curves.iter().map(|c| c.all_color_points().count()).sum()
    }
}

impl<'a> IntoIterator for &'a CurveSet {
    type Item = &'a Bezier;
    type IntoIter = std::slice::Iter<'a, Bezier>;

    fn into_iter(self) -> Self::IntoIter {
        self.curves.iter()
    }
}

impl FromIterator<Bezier> for CurveSet {
    fn from_iter<I: IntoIterator<Item = Bezier>>(iter: I) -> Self {
        let mut set = CurveSet::new();
        set.add_all(iter);
        set
    }
}

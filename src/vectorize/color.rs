//! Color sampling along curve normals.

use image::RgbImage;
use kurbo::Point;
use palette::{FromColor, Lab, Srgb};
use rand::Rng;
use rayon::prelude::*;

use crate::curve::{Bezier, ColorPoint, Rgba, Side};

/// Parameters for color sampling.
#[derive(Debug, Clone)]
pub struct SampleParams {
    /// Random samples per pixel of arc length, per side.
    pub density: f64,
    /// Distance from the curve along the normal, in pixels.
    pub distance: f64,
    pub reject_outliers: bool,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            density: 0.05,
            distance: 3.0,
            reject_outliers: false,
        }
    }
}

/// Parameters sampled on both sides of every curve.
const FIXED_SAMPLES: [f64; 3] = [0.0, 0.5, 1.0];

/// Deviations below this are rounding noise.
const LAB_EPSILON: f32 = 1e-3;

/// CIE-Lab copy of an image, used for patch statistics.
#[derive(Debug, Clone)]
pub struct LabImage {
    width: u32,
    height: u32,
    data: Vec<[f32; 3]>,
}

impl LabImage {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let data = image
            .as_raw()
            .par_chunks_exact(3)
            .map(|p| {
                let srgb = Srgb::new(p[0], p[1], p[2]).into_format::<f32>();
                let lab: Lab = Lab::from_color(srgb.into_linear());
                [lab.l, lab.a, lab.b]
            })
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    fn get(&self, x: u32, y: u32) -> [f32; 3] {
        self.data[(y * self.width + x) as usize]
    }

    /// Whether `(x, y)` deviates from the mean of its (edge-clipped) 3x3
    /// patch by more than one standard deviation in any Lab channel.
    pub fn is_outlier(&self, x: u32, y: u32) -> bool {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x1 = (x + 1).min(self.width - 1);
        let y1 = (y + 1).min(self.height - 1);
        let patch: Vec<[f32; 3]> = (y0..=y1)
            .flat_map(|py| (x0..=x1).map(move |px| (px, py)))
            .map(|(px, py)| self.get(px, py))
            .collect();
        let n = patch.len() as f32;
        let center = self.get(x, y);

        (0..3).any(|c| {
            let mean = patch.iter().map(|p| p[c]).sum::<f32>() / n;
            let variance = patch.iter().map(|p| (p[c] - mean).powi(2)).sum::<f32>() / n;
            let deviation = (center[c] - mean).abs();
            deviation > variance.sqrt() && deviation > LAB_EPSILON
        })
    }
}

/// Attach color points to `curve`: fixed samples at `t = 0, 0.5, 1` on both
/// sides, plus random ones in proportion to arc length. Returns how many
/// samples were accepted.
pub fn sample_curve<R: Rng>(
    curve: &mut Bezier,
    image: &RgbImage,
    lab: Option<&LabImage>,
    params: &SampleParams,
    rng: &mut R,
) -> usize {
    let mut accepted = 0;
    let mut take = |curve: &mut Bezier, t: f64, side: Side| {
        if let Some(color) = sample_along_normal(curve, image, lab, t, side, params.distance) {
            curve.add_color_point(ColorPoint::new(t, color, side));
            accepted += 1;
        }
    };

    for t in FIXED_SAMPLES {
        take(&mut *curve, t, Side::Left);
        take(&mut *curve, t, Side::Right);
    }

    let total = (params.density * curve.length(crate::curve::DEFAULT_INTERVALS)) as usize;
    for _ in 0..total.saturating_sub(FIXED_SAMPLES.len()) {
        take(&mut *curve, rng.gen_range(0.0..=1.0), Side::Left);
        take(&mut *curve, rng.gen_range(0.0..=1.0), Side::Right);
    }
    accepted
}

/// Color at `distance` pixels from `value_at(t)` toward `side`, rounded to
/// the nearest pixel. `None` when the normal is degenerate, the pixel is
/// outside the image, or it is rejected as an outlier.
pub fn sample_along_normal(
    curve: &Bezier,
    image: &RgbImage,
    lab: Option<&LabImage>,
    t: f64,
    side: Side,
    distance: f64,
) -> Option<Rgba> {
    let normal = curve.normal_at(t);
    if normal.hypot2() == 0.0 {
        return None;
    }
    let sample: Point = curve.value_at(t) + normal * (side.sign() * distance);
    let (x, y) = (sample.x.round(), sample.y.round());
    if !(x >= 0.0 && y >= 0.0 && x < image.width() as f64 && y < image.height() as f64) {
        return None;
    }
    let (x, y) = (x as u32, y as u32);
    if lab.is_some_and(|lab| lab.is_outlier(x, y)) {
        return None;
    }
    let p = image.get_pixel(x, y);
    Some(Rgba::from_rgb8(p[0], p[1], p[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::{rngs::StdRng, SeedableRng};

    /// Red above y = 20, blue below.
    fn two_tone() -> RgbImage {
        RgbImage::from_fn(60, 40, |_, y| {
            if y < 20 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    fn horizontal(x0: f64, x1: f64) -> Bezier {
        Bezier::from_control_points(vec![Point::new(x0, 20.0), Point::new(x1, 20.0)]).unwrap()
    }

    #[test]
    fn sides_pick_up_their_colors() {
        // Travelling +x, the left normal points toward +y (blue).
        let mut curve = horizontal(5.0, 55.0);
        let mut rng = StdRng::seed_from_u64(7);
        let params = SampleParams {
            density: 0.21,
            ..Default::default()
        };
        let accepted = sample_curve(&mut curve, &two_tone(), None, &params, &mut rng);
        assert_eq!(accepted, 6 + 2 * (10 - 3));
        assert!(curve.color_points(Side::Left).iter().all(|p| p.color == Rgba::from_rgb8(0, 0, 255)));
        assert!(curve.color_points(Side::Right).iter().all(|p| p.color == Rgba::from_rgb8(255, 0, 0)));
    }

    #[test]
    fn samples_outside_the_image_are_dropped() {
        let curve =
            Bezier::from_control_points(vec![Point::new(0.0, 1.0), Point::new(30.0, 1.0)]).unwrap();
        let img = two_tone();
        assert!(sample_along_normal(&curve, &img, None, 0.5, Side::Right, 3.0).is_none());
        assert!(sample_along_normal(&curve, &img, None, 0.5, Side::Left, 3.0).is_some());
    }

    #[test]
    fn degenerate_curve_contributes_nothing() {
        let mut curve = Bezier::from_control_points(vec![Point::new(10.0, 10.0); 4]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let n = sample_curve(&mut curve, &two_tone(), None, &SampleParams::default(), &mut rng);
        assert_eq!(n, 0);
    }

    #[test]
    fn speckle_is_an_outlier_but_flat_color_is_not() {
        let mut img = RgbImage::from_pixel(9, 9, Rgb([40, 120, 40]));
        img.put_pixel(4, 4, Rgb([255, 255, 255]));
        let lab = LabImage::from_rgb(&img);
        assert!(lab.is_outlier(4, 4));
        assert!(!lab.is_outlier(1, 1));
        assert!(!lab.is_outlier(0, 8));
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let img = two_tone();
        let run = |seed| {
            let mut curve = horizontal(2.0, 58.0);
            let mut rng = StdRng::seed_from_u64(seed);
            let params = SampleParams {
                density: 0.5,
                ..Default::default()
            };
            sample_curve(&mut curve, &img, None, &params, &mut rng);
            curve
        };
        assert_eq!(run(42), run(42));
    }
}

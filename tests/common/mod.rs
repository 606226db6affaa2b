//! Synthetic inputs shared by the integration tests.

use diffusion_curves::kurbo::Point;
use diffusion_curves::{Bezier, ColorPoint, Rgba, Side};
use image::{Rgb, RgbImage};

pub const NAVY: Rgb<u8> = Rgb([20, 30, 120]);
pub const YELLOW: Rgb<u8> = Rgb([250, 220, 60]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Navy left half, yellow right half.
pub fn vertical_split(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| if x < width / 2 { NAVY } else { YELLOW })
}

/// Yellow disc of radius `size / 4` centered on a navy background.
pub fn disc(size: u32) -> RgbImage {
    let c = size as f64 / 2.0;
    let r = size as f64 / 4.0;
    RgbImage::from_fn(size, size, |x, y| {
        let d = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
        if d < r {
            YELLOW
        } else {
            NAVY
        }
    })
}

/// Straight curve from `(x0, y)` to `(x1, y)` with constant colors on
/// each side.
pub fn two_sided_line(x0: f64, x1: f64, y: f64, left: Rgba, right: Rgba) -> Bezier {
    let mut curve = Bezier::from_control_points(vec![Point::new(x0, y), Point::new(x1, y)])
        .expect("two control points");
    for t in [0.0, 1.0] {
        curve.add_color_point(ColorPoint::new(t, left, Side::Left));
        curve.add_color_point(ColorPoint::new(t, right, Side::Right));
    }
    curve
}

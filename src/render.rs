//! Presentation of a solved diffusion field as an RGBA raster.
//!
//! The working-resolution field is resampled to the output size, blurred
//! per pixel by its blur channel, composited over the background, and
//! optionally overlaid with curve contours via tiny-skia.

use image::RgbaImage;
use log::debug;
use rayon::prelude::*;

use crate::config::DiffusionConfig;
use crate::curve::{Bezier, CurveSet, Rgba, DEFAULT_INTERVALS};
use crate::diffusion::{self, Field};
use crate::error::CurveError;

/// Render `curves` into a `width x height` image.
pub fn render(
    curves: &CurveSet,
    width: u32,
    height: u32,
    config: &DiffusionConfig,
) -> Result<RgbaImage, CurveError> {
    let config = config.clamped();
    let field = diffusion::diffuse_clamped(curves, width, height, &config)?;
    let field = if (field.width(), field.height()) == (width, height) {
        field
    } else {
        field.resample(width, height)
    };

    let premultiplied = blur_by_strength(&field, config.max_blur_radius);
    let mut image = composite(&premultiplied, width, height, config.background)?;
    if config.draw_contours {
        draw_contours(&mut image, curves)?;
    }
    Ok(image)
}

fn premultiply(c: [f32; 4]) -> [f64; 4] {
    let a = c[3].clamp(0.0, 1.0) as f64;
    [c[0] as f64 * a, c[1] as f64 * a, c[2] as f64 * a, a]
}

/// Summed-area table over premultiplied colors, `(w + 1) x (h + 1)`.
fn summed_area(field: &Field) -> Vec<[f64; 4]> {
    let (w, h) = (field.width() as usize, field.height() as usize);
    let stride = w + 1;
    let mut sat = vec![[0.0f64; 4]; stride * (h + 1)];
    for y in 0..h {
        let mut row = [0.0f64; 4];
        for x in 0..w {
            let c = premultiply(field.cells()[y * w + x].color);
            for k in 0..4 {
                row[k] += c[k];
                sat[(y + 1) * stride + x + 1][k] = sat[y * stride + x + 1][k] + row[k];
            }
        }
    }
    sat
}

/// Box blur with a per-pixel radius of `blur * max_radius`.
/// Returns premultiplied colors.
fn blur_by_strength(field: &Field, max_radius: f32) -> Vec<[f64; 4]> {
    let (w, h) = (field.width() as usize, field.height() as usize);
    if max_radius <= 0.0 {
        return field.cells().iter().map(|c| premultiply(c.color)).collect();
    }
    let sat = summed_area(field);
    let stride = w + 1;
    let mut out = vec![[0.0f64; 4]; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            let cell = field.cells()[y * w + x];
            let r = (cell.blur.clamp(0.0, 1.0) * max_radius).round() as usize;
            if r == 0 {
                *px = premultiply(cell.color);
                continue;
            }
            let x0 = x.saturating_sub(r);
            let y0 = y.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let y1 = (y + r + 1).min(h);
            let area = ((x1 - x0) * (y1 - y0)) as f64;
            for k in 0..4 {
                let sum = sat[y1 * stride + x1][k] - sat[y0 * stride + x1][k]
                    - sat[y1 * stride + x0][k]
                    + sat[y0 * stride + x0][k];
                px[k] = sum / area;
            }
        }
    });
    out
}

/// Source-over onto `background`, converted back to straight 8-bit RGBA.
fn composite(
    premultiplied: &[[f64; 4]],
    width: u32,
    height: u32,
    background: Rgba,
) -> Result<RgbaImage, CurveError> {
    let bg = premultiply(background.to_array());
    let mut raw = vec![0u8; premultiplied.len() * 4];
    raw.par_chunks_mut(4)
        .zip(premultiplied.par_iter())
        .for_each(|(dst, src)| {
            let inv = 1.0 - src[3].clamp(0.0, 1.0);
            let out: [f64; 4] = std::array::from_fn(|k| src[k] + bg[k] * inv);
            let a = out[3];
            let straight = |v: f64| {
                let v = if a > 0.0 { v / a } else { 0.0 };
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            };
            dst[0] = straight(out[0]);
            dst[1] = straight(out[1]);
            dst[2] = straight(out[2]);
            dst[3] = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        });
    RgbaImage::from_raw(width, height, raw).ok_or(CurveError::InvalidSize { width, height })
}

/// Sampled polyline of a curve as a tiny-skia path.
fn curve_to_tinyskia(curve: &Bezier) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    let start = curve.value_at(0.0);
    pb.move_to(start.x as f32, start.y as f32);
    for i in 1..=DEFAULT_INTERVALS {
        let p = curve.value_at(i as f64 / DEFAULT_INTERVALS as f64);
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

/// Stroke every visible curve with its contour color and thickness.
fn draw_contours(image: &mut RgbaImage, curves: &CurveSet) -> Result<(), CurveError> {
    let (width, height) = image.dimensions();
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(CurveError::InvalidSize { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }

    let mut stroked = 0;
    for curve in curves.visible() {
        if curve.contour_thickness <= 0.0 {
            continue;
        }
        let Some(path) = curve_to_tinyskia(curve) else {
            continue;
        };
        let [r, g, b, a] = curve.contour_color.to_rgba8();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width: curve.contour_thickness,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, tiny_skia::Transform::identity(), None);
        stroked += 1;
    }
    debug!("stroked {stroked} contours");

    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ColorPoint, Side};
    use kurbo::Point;

    fn two_sided(y: f64) -> Bezier {
        let mut curve =
            Bezier::from_control_points(vec![Point::new(0.0, y), Point::new(64.0, y)]).unwrap();
        for t in [0.0, 1.0] {
            curve.add_color_point(ColorPoint::new(t, Rgba::new(1.0, 0.0, 0.0, 1.0), Side::Left));
            curve.add_color_point(ColorPoint::new(t, Rgba::new(0.0, 0.0, 1.0, 1.0), Side::Right));
        }
        curve
    }

    #[test]
    fn empty_set_renders_background() {
        let img = render(&CurveSet::new(), 8, 6, &DiffusionConfig::default()).unwrap();
        assert_eq!(img.dimensions(), (8, 6));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn sides_fill_their_half_planes() {
        let set: CurveSet = [two_sided(32.0)].into_iter().collect();
        let img = render(&set, 64, 64, &DiffusionConfig::default()).unwrap();
        let below = img.get_pixel(32, 50);
        let above = img.get_pixel(32, 12);
        assert!(below[0] > 200 && below[2] < 55, "below = {below:?}");
        assert!(above[2] > 200 && above[0] < 55, "above = {above:?}");
    }

    #[test]
    fn contours_are_drawn_on_top() {
        let mut curve = two_sided(32.0);
        curve.contour_color = Rgba::new(0.0, 1.0, 0.0, 1.0);
        curve.contour_thickness = 3.0;
        let set: CurveSet = [curve].into_iter().collect();
        let config = DiffusionConfig {
            draw_contours: true,
            ..Default::default()
        };
        let img = render(&set, 64, 64, &config).unwrap();
        let on = img.get_pixel(32, 32);
        assert!(on[1] > 200 && on[0] < 55 && on[2] < 55, "on = {on:?}");
    }

    #[test]
    fn zero_blur_radius_keeps_pixels() {
        let mut field = Field::new(3, 1);
        field.constrain(1, 0, crate::diffusion::Cell::new([1.0, 0.0, 0.0, 1.0], 1.0));
        let out = blur_by_strength(&field, 0.0);
        assert_eq!(out[1], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(out[0], [0.0; 4]);
        let blurred = blur_by_strength(&field, 1.0);
        // Radius 1 in a 3x1 grid averages all three cells.
        assert!((blurred[1][0] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(blurred[0], [0.0; 4]);
    }
}

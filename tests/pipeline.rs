mod common;

use approx::assert_abs_diff_eq;
use diffusion_curves::diffusion;
use diffusion_curves::{
    export_records, import_records, render, vectorize, vectorize_path, CurveRecord, CurveSet,
    DiffusionConfig, Rgba, Side, VectorizerConfig,
};
use image::RgbImage;

fn seeded() -> VectorizerConfig {
    VectorizerConfig {
        seed: Some(11),
        stack_height: 3,
        ..Default::default()
    }
}

#[test]
fn black_image_has_no_curves() {
    common::init_logging();
    let image = RgbImage::new(200, 200);
    let report = vectorize(&image, &seeded(), None).unwrap();
    assert!(report.curves.is_empty());
    assert_eq!(report.stack_height, 0);
    assert_eq!(report.color_points, 0);
}

#[test]
fn step_edge_is_colored_from_both_regions() {
    common::init_logging();
    let report = vectorize(&common::vertical_split(64, 64), &seeded(), None).unwrap();
    assert!(!report.curves.is_empty());

    let colors: Vec<Rgba> = report
        .curves
        .iter()
        .flat_map(|c| c.all_color_points().map(|p| p.color))
        .collect();
    let navy = Rgba::from_rgb8(20, 30, 120);
    let yellow = Rgba::from_rgb8(250, 220, 60);
    assert!(colors.iter().any(|c| (c.r - navy.r).abs() < 0.05));
    assert!(colors.iter().any(|c| (c.r - yellow.r).abs() < 0.05));
}

#[test]
fn long_edges_are_split_under_the_control_point_cap() {
    common::init_logging();
    let report = vectorize(&common::disc(128), &seeded(), None).unwrap();
    assert!(!report.curves.is_empty());
    for curve in &report.curves {
        assert!(curve.control_points().len() >= 2);
        assert!(curve.control_points().len() <= 32);
        assert!(!curve.color_points(Side::Left).is_empty());
        assert!(!curve.color_points(Side::Right).is_empty());
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let a = vectorize(&common::disc(48), &seeded(), None).unwrap();
    let b = vectorize(&common::disc(48), &seeded(), None).unwrap();
    assert_eq!(export_records(&a.curves), export_records(&b.curves));
}

#[test]
fn horizontal_curve_colors_its_half_planes() {
    common::init_logging();
    let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
    let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
    let set: CurveSet = [common::two_sided_line(0.0, 100.0, 50.0, red, blue)]
        .into_iter()
        .collect();
    let image = render(&set, 100, 100, &DiffusionConfig::default()).unwrap();

    // Left of a curve running towards +x is +y in image coordinates.
    let below = image.get_pixel(50, 80);
    let above = image.get_pixel(50, 20);
    assert!(below[0] > 200 && below[2] < 55, "below = {below:?}");
    assert!(above[2] > 200 && above[0] < 55, "above = {above:?}");
}

#[test]
fn equal_constraints_diffuse_to_a_uniform_field() {
    let c = Rgba::new(0.25, 0.5, 0.75, 1.0);
    let set: CurveSet = [common::two_sided_line(10.0, 90.0, 40.0, c, c)]
        .into_iter()
        .collect();
    let field = diffusion::diffuse(&set, 100, 80, &DiffusionConfig::default()).unwrap();
    for cell in field.cells() {
        for (got, want) in cell.color.iter().zip(c.to_array()) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
        }
    }
}

#[test]
fn records_survive_a_json_round_trip() {
    let report = vectorize(&common::disc(64), &seeded(), None).unwrap();
    let records = export_records(&report.curves);
    let json = serde_json::to_string(&records).unwrap();
    let parsed: Vec<CurveRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);

    let restored = import_records(&parsed);
    assert_eq!(restored.len(), report.curves.len());
    for (a, b) in report.curves.iter().zip(restored.iter()) {
        assert_eq!(a.control_points(), b.control_points());
        assert_eq!(a.color_points(Side::Left), b.color_points(Side::Left));
        assert_eq!(a.color_points(Side::Right), b.color_points(Side::Right));
    }
}

#[test]
fn vectorized_disc_renders_back_yellow_inside() {
    common::init_logging();
    let report = vectorize(&common::disc(64), &seeded(), None).unwrap();
    let image = render(&report.curves, 64, 64, &DiffusionConfig::default()).unwrap();
    assert_eq!(image.dimensions(), (64, 64));
    let center = image.get_pixel(32, 32);
    assert!(center[0] > center[2], "center = {center:?}");
}

#[test]
fn images_load_from_disk() {
    let path = std::env::temp_dir().join(format!("diffusion-curves-{}.png", std::process::id()));
    common::vertical_split(40, 30).save(&path).unwrap();
    let report = vectorize_path(&path, &seeded());
    std::fs::remove_file(&path).ok();
    let report = report.unwrap();
    assert!(!report.curves.is_empty());
}

//! Plain data records for exchanging curves with a persistence layer.
//!
//! The shape mirrors the JSON documents produced by the curve editor:
//! control points wrap a `position` object, color and blur points store
//! their curve parameter under `position`, and depth is stored as `z`.

use kurbo::Point;
use log::warn;
use serde::{Deserialize, Serialize};

use super::bezier::{Bezier, MAX_CONTROL_POINTS};
use super::collection::CurveSet;
use super::points::{BlurPoint, ColorPoint, Rgba, Side};
use crate::error::CurveError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPointRecord {
    pub position: PointRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    pub color: Rgba,
    /// Curve parameter `t`.
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurRecord {
    /// Curve parameter `t`.
    pub position: f64,
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveRecord {
    pub control_points: Vec<ControlPointRecord>,
    pub left_color_points: Vec<ColorRecord>,
    pub right_color_points: Vec<ColorRecord>,
    pub blur_points: Vec<BlurRecord>,
    pub z: i32,
}

impl CurveRecord {
    pub fn from_bezier(curve: &Bezier) -> Self {
        let colors = |side: Side| -> Vec<ColorRecord> {
            curve
                .color_points(side)
                .iter()
                .map(|p| ColorRecord {
                    color: p.color,
                    position: p.t,
                })
                .collect()
        };
        Self {
            control_points: curve
                .control_points()
                .iter()
                .map(|p| ControlPointRecord {
                    position: PointRecord { x: p.x, y: p.y },
                })
                .collect(),
            left_color_points: colors(Side::Left),
            right_color_points: colors(Side::Right),
            blur_points: curve
                .blur_points()
                .iter()
                .map(|p| BlurRecord {
                    position: p.t,
                    strength: p.strength,
                })
                .collect(),
            z: curve.depth,
        }
    }

    /// Rebuild a curve, rejecting records a curve cannot represent.
    pub fn to_bezier(&self) -> Result<Bezier, CurveError> {
        let count = self.control_points.len();
        if count > MAX_CONTROL_POINTS {
            return Err(CurveError::ControlPointLimit { count });
        }
        if count < 2 {
            return Err(CurveError::InvalidRecord(format!(
                "{count} control points, need at least 2"
            )));
        }
        let points = self
            .control_points
            .iter()
            .map(|c| {
                let PointRecord { x, y } = c.position;
                if x.is_finite() && y.is_finite() {
                    Ok(Point::new(x, y))
                } else {
                    Err(CurveError::InvalidRecord(format!(
                        "non-finite control point ({x}, {y})"
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut curve = Bezier::from_control_points(points)?;
        curve.depth = self.z;
        for (records, side) in [
            (&self.left_color_points, Side::Left),
            (&self.right_color_points, Side::Right),
        ] {
            for record in records {
                if !record.position.is_finite() {
                    return Err(CurveError::InvalidRecord(format!(
                        "non-finite color point parameter {}",
                        record.position
                    )));
                }
                curve.add_color_point(ColorPoint::new(record.position, record.color, side));
            }
        }
        for record in &self.blur_points {
            if !record.position.is_finite() {
                return Err(CurveError::InvalidRecord(format!(
                    "non-finite blur point parameter {}",
                    record.position
                )));
            }
            curve.add_blur_point(BlurPoint::new(record.position, record.strength));
        }
        Ok(curve)
    }
}

/// One record per curve, in draw order.
pub fn export_records(curves: &CurveSet) -> Vec<CurveRecord> {
    curves.iter().map(CurveRecord::from_bezier).collect()
}

/// Build a collection from records. Malformed records are logged and skipped.
pub fn import_records(records: &[CurveRecord]) -> CurveSet {
    let mut set = CurveSet::new();
    for (i, record) in records.iter().enumerate() {
        match record.to_bezier() {
            Ok(curve) => {
                set.add(curve);
            }
            Err(e) => warn!("skipping curve record {i}: {e}"),
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> CurveSet {
        let mut set = CurveSet::new();
        for depth in [2, 0, 1] {
            let mut curve = Bezier::from_control_points(vec![
                Point::new(0.0, depth as f64),
                Point::new(12.5, 3.25),
                Point::new(40.0, -7.0),
                Point::new(64.0, 1.0),
            ])
            .unwrap();
            curve.depth = depth;
            curve.add_color_point(ColorPoint::new(0.0, Rgba::new(1.0, 0.0, 0.0, 1.0), Side::Left));
            curve.add_color_point(ColorPoint::new(0.7, Rgba::new(0.2, 0.4, 0.6, 0.8), Side::Left));
            curve.add_color_point(ColorPoint::new(0.7, Rgba::new(0.1, 0.1, 0.1, 1.0), Side::Left));
            curve.add_color_point(ColorPoint::new(0.3, Rgba::new(0.0, 0.0, 1.0, 1.0), Side::Right));
            curve.add_blur_point(BlurPoint::new(0.5, 0.6));
            set.add(curve);
        }
        set
    }

    #[test]
    fn export_then_import_is_lossless() {
        let set = sample_set();
        let restored = import_records(&export_records(&set));
        assert_eq!(restored.len(), set.len());
        for (a, b) in set.iter().zip(restored.iter()) {
            assert_eq!(a.control_points(), b.control_points());
            assert_eq!(a.color_points(Side::Left), b.color_points(Side::Left));
            assert_eq!(a.color_points(Side::Right), b.color_points(Side::Right));
            assert_eq!(a.blur_points(), b.blur_points());
            assert_eq!(a.depth, b.depth);
        }
    }

    #[test]
    fn json_round_trip_keeps_records() {
        let records = export_records(&sample_set());
        let json = serde_json::to_string(&records).unwrap();
        let parsed: Vec<CurveRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
        assert!(json.contains("\"left_color_points\""));
        assert!(json.contains("\"z\""));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let good = CurveRecord::from_bezier(sample_set().get(0).unwrap());
        let too_short = CurveRecord {
            control_points: good.control_points[..1].to_vec(),
            ..Default::default()
        };
        let too_long = CurveRecord {
            control_points: vec![good.control_points[0]; MAX_CONTROL_POINTS + 1],
            ..Default::default()
        };
        let set = import_records(&[too_short, good, too_long]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let json = r#"[{"control_points":[{"position":{"x":0,"y":0}},{"position":{"x":5,"y":0}}]}]"#;
        let records: Vec<CurveRecord> = serde_json::from_str(json).unwrap();
        let set = import_records(&records);
        let curve = set.get(0).unwrap();
        assert_eq!(curve.depth, 0);
        assert!(curve.blur_points().is_empty());
        assert_eq!(curve.value_at(1.0), Point::new(5.0, 0.0));
    }
}

//! The curve data model shared by vectorization and diffusion.

mod bezier;
mod collection;
mod points;
mod record;

pub use bezier::{
    Bezier, DEFAULT_CONTOUR_THICKNESS, DEFAULT_DIFFUSION_WIDTH, DEFAULT_INTERVALS,
    MAX_CONTROL_POINTS,
};
pub use collection::CurveSet;
pub use points::{BlurPoint, BlurPointRef, ColorPoint, ColorPointRef, Rgba, Side};
pub use record::{
    export_records, import_records, BlurRecord, ColorRecord, ControlPointRecord, CurveRecord,
    PointRecord,
};

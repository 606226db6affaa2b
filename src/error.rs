use thiserror::Error;

/// Errors produced by vectorization, the curve model, and rendering.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CurveError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("polyline with {0} point(s) cannot form a curve")]
    DegeneratePolyline(usize),

    #[error("curve would hold {count} control points (limit is 32)")]
    ControlPointLimit { count: usize },

    #[error("invalid curve record: {0}")]
    InvalidRecord(String),

    #[error("invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("vectorization cancelled")]
    Cancelled,
}

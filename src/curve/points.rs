//! Constraint points attached to a curve.

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Linear interpolation, `s = 0` gives `self`.
    pub fn lerp(self, other: Rgba, s: f32) -> Rgba {
        Rgba::new(
            self.r + s * (other.r - self.r),
            self.g + s * (other.g - self.g),
            self.b + s * (other.b - self.b),
            self.a + s * (other.a - self.a),
        )
    }

    /// 8-bit channels, clamped and rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        self.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Which side of the curve a color point lives on, relative to the tangent.
///
/// `Left` lies along the normal `(-ty, tx)`, `Right` along its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign applied to the curve normal for this side.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// A color constraint at curve parameter `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPoint {
    pub t: f64,
    pub color: Rgba,
    pub side: Side,
}

impl ColorPoint {
    pub fn new(t: f64, color: Rgba, side: Side) -> Self {
        Self {
            t: t.clamp(0.0, 1.0),
            color,
            side,
        }
    }
}

/// A blur-strength constraint at curve parameter `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurPoint {
    pub t: f64,
    /// Strength in `[0, 1]`.
    pub strength: f32,
}

impl BlurPoint {
    pub const DEFAULT_STRENGTH: f32 = 0.25;

    pub fn new(t: f64, strength: f32) -> Self {
        Self {
            t: t.clamp(0.0, 1.0),
            strength: strength.clamp(0.0, 1.0),
        }
    }
}

/// Handle to a color point inside its owning curve.
///
/// Handles are plain indices, valid until the curve's color points on that
/// side are next inserted into or removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPointRef {
    pub side: Side,
    pub index: usize,
}

/// Handle to a blur point inside its owning curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlurPointRef {
    pub index: usize,
}

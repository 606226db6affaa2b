//! Shared geometry utilities.

use kurbo::Vec2;

/// `n!` as a float. Exact for every degree a curve can reach (n <= 31).
pub fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Binomial coefficient `n choose k` via factorials.
pub fn choose(n: usize, k: usize) -> f64 {
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// Bernstein basis polynomial `b_{i,n}(t)`.
pub fn bernstein(n: usize, i: usize, t: f64) -> f64 {
    choose(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// Rotate a vector by +90 degrees: `(x, y) -> (-y, x)`.
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

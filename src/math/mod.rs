pub mod arc_2d;
pub mod frame;
pub mod intersect_2d;
pub mod polygon_2d;
pub mod spline;

pub use frame::LocalFrame;

/// 2D point type (layout units, conventionally micrometres).
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Rigid 2D transform (rotation + translation).
pub type Isometry2 = nalgebra::Isometry2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when comparing user-facing lengths such as port widths.
pub const LENGTH_TOLERANCE: f64 = 1e-6;

/// Unit vector pointing along `angle` (radians, CCW from +x).
#[must_use]
pub fn unit(angle: f64) -> Vector2 {
    Vector2::new(angle.cos(), angle.sin())
}

/// Left-pointing normal of the heading `angle`.
#[must_use]
pub fn left_normal(angle: f64) -> Vector2 {
    Vector2::new(-angle.sin(), angle.cos())
}

/// Wraps an angle into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

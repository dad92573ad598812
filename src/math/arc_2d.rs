//! 2D arc math utilities.
//!
//! Angles are radians, counter-clockwise from +x. A positive `sweep` turns
//! left (counter-clockwise), a negative one turns right.

use std::f64::consts::PI;

use super::Point2;

/// Computes the number of line segments needed to approximate an arc
/// within the given sagitta tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    // For a given tolerance: θ = 2 * acos(1 - tolerance/r)
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Turning angle between two headings, in `(-PI, PI]`.
#[must_use]
pub fn turn_between(from: f64, to: f64) -> f64 {
    super::normalize_angle(to - from)
}

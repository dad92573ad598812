use super::{Curve, PathSample};
use crate::math::arc_2d::{arc_point_at, arc_subdivision_count};
use crate::math::Point2;

use std::f64::consts::FRAC_PI_2;

/// A circular arc of `radius` turning by `turn` radians (positive = left).
#[derive(Debug, Clone, Copy)]
pub struct CircularArc {
    radius: f64,
    turn: f64,
}

impl CircularArc {
    /// Creates a new arc.
    #[must_use]
    pub fn new(radius: f64, turn: f64) -> Self {
        Self { radius, turn }
    }
}

impl Curve for CircularArc {
    fn sample(&self, tolerance: f64) -> Vec<PathSample> {
        let sign = if self.turn >= 0.0 { 1.0 } else { -1.0 };
        // Center sits on the left normal for a left turn, right for a right turn.
        let center = Point2::new(0.0, sign * self.radius);
        let start_angle = -sign * FRAC_PI_2;
        let n = arc_subdivision_count(self.radius, self.turn.abs(), tolerance);

        (0..=n)
            .map(|j| {
                let t = f64::from(j) / f64::from(n);
                PathSample::new(
                    arc_point_at(&center, self.radius, start_angle, self.turn, t),
                    self.turn * t,
                )
            })
            .collect()
    }

    fn turn(&self) -> f64 {
        self.turn
    }

    fn min_radius(&self) -> f64 {
        self.radius
    }
}

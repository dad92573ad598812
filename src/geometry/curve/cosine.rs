use std::f64::consts::PI;

use super::{Curve, PathSample};
use crate::math::arc_2d::arc_subdivision_count;
use crate::math::{Point2, TOLERANCE};

/// Raised-cosine S-bend: `y = h/2 · (1 - cos(π x / L))` for `x ∈ [0, L]`.
///
/// Starts and ends with the input heading; the peak curvature
/// `h π² / (2 L²)` is reached at both ends.
#[derive(Debug, Clone, Copy)]
pub struct CosineSBend {
    length: f64,
    height: f64,
}

impl CosineSBend {
    /// Creates a new S-bend spanning `length` forward and `height` sideways.
    #[must_use]
    pub fn new(length: f64, height: f64) -> Self {
        Self { length, height }
    }

    /// Point and tangent heading at `x`.
    fn at(&self, x: f64) -> PathSample {
        let k = PI / self.length;
        let y = 0.5 * self.height * (1.0 - (k * x).cos());
        let slope = 0.5 * self.height * k * (k * x).sin();
        PathSample::new(Point2::new(x, y), slope.atan())
    }

    /// Largest absolute heading reached (at the midpoint).
    fn peak_heading(&self) -> f64 {
        (0.5 * self.height * PI / self.length).abs().atan()
    }
}

impl Curve for CosineSBend {
    fn sample(&self, tolerance: f64) -> Vec<PathSample> {
        let total_turn = 2.0 * self.peak_heading();
        let n = if self.height.abs() < TOLERANCE {
            1
        } else {
            arc_subdivision_count(self.min_radius(), total_turn, tolerance).max(8)
        };
        let mut samples: Vec<PathSample> = (0..=n)
            .map(|j| self.at(self.length * f64::from(j) / f64::from(n)))
            .collect();
        if let Some(last) = samples.last_mut() {
            *last = PathSample::new(Point2::new(self.length, self.height), 0.0);
        }
        samples
    }

    fn turn(&self) -> f64 {
        0.0
    }

    fn min_radius(&self) -> f64 {
        if self.height.abs() < TOLERANCE {
            return f64::INFINITY;
        }
        2.0 * self.length * self.length / (self.height.abs() * PI * PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn endpoints_and_headings() {
        let s = CosineSBend::new(100.0, 20.0).sample(1e-3);
        assert_abs_diff_eq!(s[0].point.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[0].angle, 0.0, epsilon = 1e-12);
        let last = s[s.len() - 1];
        assert_abs_diff_eq!(last.point.x, 100.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last.point.y, 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last.angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn min_radius_formula() {
        let c = CosineSBend::new(100.0, 20.0);
        assert_abs_diff_eq!(c.min_radius(), 2.0 * 1e4 / (20.0 * PI * PI), epsilon = 1e-9);
        assert!(CosineSBend::new(10.0, 0.0).min_radius().is_infinite());
    }

    #[test]
    fn flat_bend_is_a_single_segment() {
        assert_eq!(CosineSBend::new(10.0, 0.0).sample(1e-3).len(), 2);
    }
}

use super::{Curve, PathSample};
use crate::error::{ConfigurationError, GeometryError, Result};
use crate::math::arc_2d::arc_subdivision_count;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Number of evenly spaced parameter values used to survey the curve before
/// choosing a sampling density.
const SURVEY_SAMPLES: u32 = 256;

/// Upper bound on output samples for a single Bézier curve.
const MAX_SAMPLES: u32 = 8192;

/// A Bézier curve of arbitrary degree.
///
/// The control points are expressed in the local frame (the first is the
/// origin and the first control leg points along +x) when used through
/// [`Curve`]; [`Bezier::to_local`] performs that normalisation.
#[derive(Debug, Clone)]
pub struct Bezier {
    controls: Vec<Point2>,
    /// First derivative control points (scaled by the degree).
    d1: Vec<Vector2>,
    /// Second derivative control points (scaled).
    d2: Vec<Vector2>,
}

impl Bezier {
    /// Creates a Bézier curve from its control points.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` if fewer than 3 control points are given
    /// - `GeometryError::Degenerate` if the first or last control leg has zero
    ///   length (the end tangent would be undefined)
    pub fn new(controls: Vec<Point2>) -> Result<Self> {
        if controls.len() < 3 {
            return Err(ConfigurationError::Invalid(
                "a Bézier bend needs at least 3 control points".to_owned(),
            )
            .into());
        }
        let n = controls.len();
        let first_leg = controls[1] - controls[0];
        let last_leg = controls[n - 1] - controls[n - 2];
        if first_leg.norm() < TOLERANCE || last_leg.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "Bézier end tangent is undefined (repeated end control point)".to_owned(),
            )
            .into());
        }

        #[allow(clippy::cast_precision_loss)]
        let degree = (n - 1) as f64;
        let d1: Vec<Vector2> = controls
            .windows(2)
            .map(|w| (w[1] - w[0]) * degree)
            .collect();
        let d2: Vec<Vector2> = d1
            .windows(2)
            .map(|w| (w[1] - w[0]) * (degree - 1.0))
            .collect();
        Ok(Self { controls, d1, d2 })
    }

    /// Re-expresses world control points in the local frame anchored at the
    /// first control point and heading along the first control leg.
    ///
    /// Returns the local curve plus the world anchor and heading.
    ///
    /// # Errors
    ///
    /// Same as [`Bezier::new`].
    pub fn to_local(world: &[Point2]) -> Result<(Self, Point2, f64)> {
        // Validate on the world points first so errors match the caller's input.
        let checked = Self::new(world.to_vec())?;
        let origin = checked.controls[0];
        let lead = checked.controls[1] - origin;
        let heading = lead.y.atan2(lead.x);
        let (s, c) = (-heading).sin_cos();
        let local = world
            .iter()
            .map(|p| {
                let d = p - origin;
                Point2::new(c * d.x - s * d.y, s * d.x + c * d.y)
            })
            .collect();
        Ok((Self::new(local)?, origin, heading))
    }

    /// Control points.
    #[must_use]
    pub fn controls(&self) -> &[Point2] {
        &self.controls
    }

    /// Point at parameter `t ∈ [0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let coords: Vec<Vector2> = self.controls.iter().map(|p| p.coords).collect();
        Point2::from(de_casteljau(&coords, t))
    }

    /// First derivative at `t`.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vector2 {
        de_casteljau(&self.d1, t)
    }

    /// Signed curvature at `t`.
    #[must_use]
    pub fn curvature_at(&self, t: f64) -> f64 {
        let d = self.derivative_at(t);
        let dd = if self.d2.is_empty() {
            Vector2::zeros()
        } else {
            de_casteljau(&self.d2, t)
        };
        let speed = d.norm();
        if speed < TOLERANCE {
            return f64::INFINITY;
        }
        (d.x * dd.y - d.y * dd.x) / (speed * speed * speed)
    }

    /// Surveys the curve at evenly spaced parameters, returning the minimum
    /// radius of curvature and the total absolute turning.
    fn survey(&self) -> (f64, f64) {
        let mut min_radius = f64::INFINITY;
        let mut total_turn = 0.0;
        let mut prev_heading: Option<f64> = None;
        for i in 0..=SURVEY_SAMPLES {
            let t = f64::from(i) / f64::from(SURVEY_SAMPLES);
            let k = self.curvature_at(t).abs();
            if k > TOLERANCE {
                min_radius = min_radius.min(1.0 / k);
            }
            let d = self.derivative_at(t);
            let heading = d.y.atan2(d.x);
            if let Some(prev) = prev_heading {
                total_turn += crate::math::arc_2d::turn_between(prev, heading).abs();
            }
            prev_heading = Some(heading);
        }
        (min_radius, total_turn)
    }
}

impl Curve for Bezier {
    fn sample(&self, tolerance: f64) -> Vec<PathSample> {
        let (min_radius, total_turn) = self.survey();
        let n = if min_radius.is_finite() {
            arc_subdivision_count(min_radius, total_turn, tolerance).clamp(16, MAX_SAMPLES)
        } else {
            1
        };

        // Unwrap headings so consecutive samples never jump by 2π.
        let mut samples: Vec<PathSample> = Vec::with_capacity(n as usize + 1);
        let mut heading = 0.0;
        for j in 0..=n {
            let t = f64::from(j) / f64::from(n);
            let d = self.derivative_at(t);
            let raw = d.y.atan2(d.x);
            heading += crate::math::arc_2d::turn_between(heading, raw);
            samples.push(PathSample::new(self.point_at(t), heading));
        }
        samples
    }

    fn turn(&self) -> f64 {
        let n = self.d1.len();
        let end = self.d1[n - 1];
        let start = self.d1[0];
        crate::math::arc_2d::turn_between(start.y.atan2(start.x), end.y.atan2(end.x))
    }

    fn min_radius(&self) -> f64 {
        self.survey().0
    }
}

/// Evaluates a Bézier polynomial given its control vectors.
fn de_casteljau(points: &[Vector2], t: f64) -> Vector2 {
    let mut work = points.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i] * (1.0 - t) + work[i + 1] * t;
        }
    }
    work.first().copied().unwrap_or_else(Vector2::zeros)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn cubic_s_curve_endpoints() {
        let b = Bezier::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 100.0),
        ])
        .unwrap();
        let s = b.sample(1e-3);
        let last = s[s.len() - 1];
        assert_abs_diff_eq!(last.point.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.point.y, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.angle, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.turn(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn quadratic_curvature_at_apex() {
        // y = x² parabola segment as a quadratic Bézier: curvature 2 at x = 0.
        let b = Bezier::new(vec![
            Point2::new(-1.0, 1.0),
            Point2::new(0.0, -1.0),
            Point2::new(1.0, 1.0),
        ])
        .unwrap();
        assert_abs_diff_eq!(b.curvature_at(0.5), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.min_radius(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn to_local_normalises_heading() {
        let (local, origin, heading) = Bezier::to_local(&[
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 10.0),
            Point2::new(0.0, 10.0),
        ])
        .unwrap();
        assert_abs_diff_eq!(origin.x, 5.0);
        assert_abs_diff_eq!(heading, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(local.controls()[1].x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local.controls()[1].y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local.turn(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn rejects_short_or_degenerate_controls() {
        assert!(Bezier::new(vec![Point2::origin(), Point2::new(1.0, 0.0)]).is_err());
        assert!(Bezier::new(vec![
            Point2::origin(),
            Point2::origin(),
            Point2::new(1.0, 1.0)
        ])
        .is_err());
    }
}

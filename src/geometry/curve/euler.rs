//! Euler (clothoid) bends.
//!
//! Curvature grows linearly with arc length from zero at the start to
//! `1 / min_radius` at the midpoint, then falls back to zero. A bend turning
//! by `θ` therefore has length `L = 2 |θ| R` and heading
//!
//! ```text
//! φ(s) = s² / (R L)               for s ≤ L/2
//! φ(s) = |θ| - (L - s)² / (R L)   for s > L/2
//! ```
//!
//! The position is the integral of `(cos φ, sin φ)`, evaluated with
//! composite Simpson steps.

use std::f64::consts::FRAC_PI_2;

use super::{Curve, PathSample};
use crate::math::arc_2d::arc_subdivision_count;
use crate::math::{Point2, TOLERANCE};

/// Simpson sub-steps per output interval.
const SUBSTEPS: u32 = 8;

/// Simpson intervals used when only the end point is needed.
const END_POINT_STEPS: u32 = 128;

/// A symmetric Euler bend with peak curvature `1 / min_radius`.
#[derive(Debug, Clone, Copy)]
pub struct EulerBend {
    min_radius: f64,
    turn: f64,
}

impl EulerBend {
    /// Creates a new Euler bend.
    #[must_use]
    pub fn new(min_radius: f64, turn: f64) -> Self {
        Self { min_radius, turn }
    }

    /// Total arc length of the bend.
    #[must_use]
    pub fn length(&self) -> f64 {
        2.0 * self.turn.abs() * self.min_radius
    }

    /// Signed heading at arc length `s`.
    #[must_use]
    pub fn heading_at(&self, s: f64) -> f64 {
        let l = self.length();
        if l < TOLERANCE {
            return 0.0;
        }
        let rl = self.min_radius * l;
        let s = s.clamp(0.0, l);
        let phi = if s <= 0.5 * l {
            s * s / rl
        } else {
            self.turn.abs() - (l - s) * (l - s) / rl
        };
        phi * self.turn.signum()
    }

    /// Signed curvature at arc length `s`.
    #[must_use]
    pub fn curvature_at(&self, s: f64) -> f64 {
        let l = self.length();
        if l < TOLERANCE {
            return 0.0;
        }
        let s = s.clamp(0.0, l);
        let k = 2.0 * s.min(l - s) / (self.min_radius * l);
        k * self.turn.signum()
    }

    /// End point of the bend in its local frame.
    #[must_use]
    pub fn end_point(&self) -> Point2 {
        let l = self.length();
        self.integrate(0.0, l, END_POINT_STEPS)
    }

    /// Integrates `(cos φ, sin φ)` over `[s0, s1]` with `steps` (even) Simpson
    /// intervals.
    fn integrate(&self, s0: f64, s1: f64, steps: u32) -> Point2 {
        let h = (s1 - s0) / f64::from(steps);
        let mut x = 0.0;
        let mut y = 0.0;
        for i in 0..=steps {
            let w = if i == 0 || i == steps {
                1.0
            } else if i % 2 == 1 {
                4.0
            } else {
                2.0
            };
            let phi = self.heading_at(s0 + h * f64::from(i));
            x += w * phi.cos();
            y += w * phi.sin();
        }
        Point2::new(x * h / 3.0, y * h / 3.0)
    }
}

impl Curve for EulerBend {
    fn sample(&self, tolerance: f64) -> Vec<PathSample> {
        // The heading changes at most twice as fast per unit length as on a
        // circle of `min_radius` spanning the same turn.
        let n = 2 * arc_subdivision_count(self.min_radius, self.turn.abs(), tolerance);
        let l = self.length();
        let ds = l / f64::from(n);

        let mut samples = Vec::with_capacity(n as usize + 1);
        let mut point = Point2::origin();
        samples.push(PathSample::new(point, 0.0));
        for j in 1..=n {
            let s0 = ds * f64::from(j - 1);
            let step = self.integrate(s0, s0 + ds, SUBSTEPS);
            point += step.coords;
            samples.push(PathSample::new(point, self.heading_at(ds * f64::from(j))));
        }
        if let Some(last) = samples.last_mut() {
            last.angle = self.turn;
        }
        samples
    }

    fn turn(&self) -> f64 {
        self.turn
    }

    fn min_radius(&self) -> f64 {
        if self.turn.abs() < TOLERANCE {
            f64::INFINITY
        } else {
            self.min_radius
        }
    }
}

/// Solves an Euler S-bend: two opposite Euler bends of turn `±α` joined by a
/// straight run of length `m`, spanning `length` along the input heading and
/// `height` across it.
///
/// Returns `(α, m)` with the sign of `α` matching `height`, or `None` when no
/// such S-bend exists for `min_radius`.
#[must_use]
pub fn euler_s_bend(length: f64, height: f64, min_radius: f64) -> Option<(f64, f64)> {
    let h = height.abs();
    if h < TOLERANCE {
        return Some((0.0, length));
    }
    let end = |alpha: f64| EulerBend::new(min_radius, alpha).end_point();

    // Largest turn whose two bends alone do not overshoot the height.
    let mut alpha_max = FRAC_PI_2;
    if 2.0 * end(alpha_max).y > h {
        let (mut lo, mut hi) = (0.0, FRAC_PI_2);
        for _ in 0..80 {
            let mid = 0.5 * (lo + hi);
            if 2.0 * end(mid).y > h {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        alpha_max = lo;
    }
    if alpha_max < TOLERANCE {
        return None;
    }

    // Horizontal span required for a given turn angle; decreasing in alpha.
    let span = |alpha: f64| {
        let p = end(alpha);
        2.0 * p.x + (h - 2.0 * p.y) / alpha.tan()
    };
    if span(alpha_max) > length + TOLERANCE {
        return None;
    }

    let (mut lo, mut hi) = (TOLERANCE, alpha_max);
    for _ in 0..80 {
        let mid = 0.5 * (lo + hi);
        if span(mid) > length {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let alpha = 0.5 * (lo + hi);
    let straight = ((h - 2.0 * end(alpha).y) / alpha.sin()).max(0.0);
    Some((alpha * height.signum(), straight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn curvature_vanishes_at_ends_and_peaks_mid_bend() {
        let bend = EulerBend::new(25.0, FRAC_PI_4);
        let l = bend.length();
        assert_abs_diff_eq!(bend.curvature_at(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bend.curvature_at(l), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bend.curvature_at(0.5 * l), 1.0 / 25.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_reaches_the_turn() {
        let bend = EulerBend::new(25.0, -FRAC_PI_2);
        assert_abs_diff_eq!(bend.heading_at(bend.length()), -FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(bend.heading_at(0.5 * bend.length()), -FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn sampled_end_matches_integrated_end() {
        let bend = EulerBend::new(25.0, FRAC_PI_2);
        let samples = bend.sample(5e-4);
        let last = samples[samples.len() - 1].point;
        let end = bend.end_point();
        assert_abs_diff_eq!(last.x, end.x, epsilon = 1e-6);
        assert_abs_diff_eq!(last.y, end.y, epsilon = 1e-6);
        // Symmetric 90° bend: equal reach along both axes.
        assert_abs_diff_eq!(end.x, end.y, epsilon = 1e-6);
    }

    #[test]
    fn discrete_curvature_profile() {
        let bend = EulerBend::new(20.0, FRAC_PI_2);
        let samples = bend.sample(1e-4);
        let curvature = |i: usize| {
            let ds = (samples[i + 1].point - samples[i].point).norm();
            (samples[i + 1].angle - samples[i].angle) / ds
        };
        let mid = samples.len() / 2;
        assert!(curvature(0) < 0.1 / 20.0);
        assert!((curvature(mid) - 1.0 / 20.0).abs() < 0.05 / 20.0);
    }

    #[test]
    fn s_bend_solution_reaches_the_target() {
        let (alpha, m) = euler_s_bend(200.0, 100.0, 25.0).unwrap_or((0.0, 0.0));
        assert!(alpha > 0.0);
        let p = EulerBend::new(25.0, alpha).end_point();
        assert_abs_diff_eq!(2.0 * p.x + m * alpha.cos(), 200.0, epsilon = 1e-6);
        assert_abs_diff_eq!(2.0 * p.y + m * alpha.sin(), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn s_bend_too_short_has_no_solution() {
        assert!(euler_s_bend(10.0, 100.0, 25.0).is_none());
    }

    #[test]
    fn s_bend_negative_height() {
        let (alpha, _) = euler_s_bend(200.0, -50.0, 25.0).unwrap_or((0.0, 0.0));
        assert!(alpha < 0.0);
    }
}

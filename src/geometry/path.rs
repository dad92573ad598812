use super::curve::{Curve, PathSample};
use super::stroke::Stroke;
use crate::math::{unit, Point2, TOLERANCE};

/// Turtle-style centerline builder.
///
/// Starts at a point with a heading and width, then appends straight runs
/// and curves. Each appended piece may change the width linearly over its
/// length, so tapers and width-crossing couplers share one code path.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    samples: Vec<PathSample>,
    widths: Vec<f64>,
    tolerance: f64,
}

impl PathBuilder {
    /// Starts a path at `start` heading along `angle` with the given width.
    ///
    /// `tolerance` is the sagitta tolerance used to sample curves.
    #[must_use]
    pub fn new(start: Point2, angle: f64, width: f64, tolerance: f64) -> Self {
        Self {
            samples: vec![PathSample::new(start, angle)],
            widths: vec![width],
            tolerance,
        }
    }

    /// Current end position.
    #[must_use]
    pub fn position(&self) -> Point2 {
        self.last().point
    }

    /// Current end heading.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.last().angle
    }

    /// Current end width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.widths.last().copied().unwrap_or(0.0)
    }

    fn last(&self) -> PathSample {
        // `samples` is never empty: `new` seeds it.
        self.samples[self.samples.len() - 1]
    }

    /// Appends a straight run keeping the current width.
    pub fn straight(&mut self, length: f64) -> &mut Self {
        let w = self.width();
        self.straight_to_width(length, w)
    }

    /// Appends a straight run whose width changes linearly to `end_width`.
    ///
    /// Runs shorter than the geometric tolerance are skipped.
    pub fn straight_to_width(&mut self, length: f64, end_width: f64) -> &mut Self {
        if length <= TOLERANCE {
            return self;
        }
        let last = self.last();
        let point = last.point + unit(last.angle) * length;
        self.samples.push(PathSample::new(point, last.angle));
        self.widths.push(end_width);
        self
    }

    /// Appends a curve keeping the current width.
    pub fn curve(&mut self, curve: &dyn Curve) -> &mut Self {
        let w = self.width();
        self.curve_to_width(curve, w)
    }

    /// Appends a curve, rotating and translating its local samples onto the
    /// current end, with the width changing linearly in arc length.
    pub fn curve_to_width(&mut self, curve: &dyn Curve, end_width: f64) -> &mut Self {
        let local = curve.sample(self.tolerance);
        if local.len() < 2 {
            return self;
        }
        let last = self.last();
        let start_width = self.width();
        let (s, c) = last.angle.sin_cos();

        let mut cumulative = Vec::with_capacity(local.len());
        let mut acc = 0.0;
        cumulative.push(0.0);
        for w in local.windows(2) {
            acc += (w[1].point - w[0].point).norm();
            cumulative.push(acc);
        }
        let total = acc.max(TOLERANCE);

        for (sample, s_len) in local.iter().zip(&cumulative).skip(1) {
            let p = sample.point;
            let world = Point2::new(
                last.point.x + c * p.x - s * p.y,
                last.point.y + s * p.x + c * p.y,
            );
            self.samples
                .push(PathSample::new(world, last.angle + sample.angle));
            self.widths
                .push(start_width + (end_width - start_width) * (s_len / total));
        }
        self
    }

    /// Finishes the path into a stroke.
    #[must_use]
    pub fn finish(self) -> Stroke {
        Stroke::new(self.samples, self.widths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::curve::CircularArc;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn straight_then_left_turn() {
        let mut path = PathBuilder::new(Point2::origin(), 0.0, 1.0, 1e-3);
        path.straight(10.0).curve(&CircularArc::new(5.0, FRAC_PI_2)).straight(3.0);
        assert_abs_diff_eq!(path.position().x, 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.position().y, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.angle(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn curve_width_interpolates_in_arc_length() {
        let mut path = PathBuilder::new(Point2::origin(), 0.0, 1.0, 1e-3);
        path.curve_to_width(&CircularArc::new(5.0, FRAC_PI_2), 3.0);
        assert_abs_diff_eq!(path.width(), 3.0, epsilon = 1e-12);
        let stroke = path.finish();
        let mid = stroke.widths()[stroke.widths().len() / 2];
        assert!(mid > 1.5 && mid < 2.5, "mid width {mid}");
    }

    #[test]
    fn zero_length_straight_is_skipped() {
        let mut path = PathBuilder::new(Point2::origin(), 0.0, 1.0, 1e-3);
        path.straight(0.0);
        assert_eq!(path.finish().samples().len(), 1);
    }
}

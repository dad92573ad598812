mod arc;
mod bezier;
mod cosine;
mod euler;

pub use arc::CircularArc;
pub use bezier::Bezier;
pub use cosine::CosineSBend;
pub use euler::{euler_s_bend, EulerBend};

use crate::math::Point2;

/// One sample of a centerline: a point and the tangent heading there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Position on the centerline.
    pub point: Point2,
    /// Tangent heading in radians, CCW from +x.
    pub angle: f64,
}

impl PathSample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(point: Point2, angle: f64) -> Self {
        Self { point, angle }
    }
}

/// A planar centerline curve expressed in its own local frame: it starts at
/// the origin heading along +x.
pub trait Curve {
    /// Samples the curve from start to end (both included).
    ///
    /// `tolerance` bounds the sagitta between the curve and its chords.
    fn sample(&self, tolerance: f64) -> Vec<PathSample>;

    /// Net change of heading from start to end, in radians.
    fn turn(&self) -> f64;

    /// Smallest radius of curvature along the curve (`f64::INFINITY` for a
    /// straight curve).
    fn min_radius(&self) -> f64;
}

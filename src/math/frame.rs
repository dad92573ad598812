use nalgebra::{Translation2, UnitComplex};

use super::{normalize_angle, Isometry2, Point2};

/// Maps geometry built in a component's local frame (anchor at the origin,
/// heading +x) into world coordinates.
///
/// An optional mirror about the local x-axis is applied before the rigid
/// transform, which is how parity-flipped composites are produced.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    isometry: Isometry2,
    mirror: f64,
}

impl LocalFrame {
    /// Creates a frame anchored at `origin` heading along `angle`.
    #[must_use]
    pub fn new(origin: Point2, angle: f64, mirrored: bool) -> Self {
        Self {
            isometry: Isometry2::from_parts(
                Translation2::new(origin.x, origin.y),
                UnitComplex::new(angle),
            ),
            mirror: if mirrored { -1.0 } else { 1.0 },
        }
    }

    /// The identity frame.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            isometry: Isometry2::identity(),
            mirror: 1.0,
        }
    }

    /// Returns `true` if the frame mirrors the local y-axis.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirror < 0.0
    }

    /// Transforms a local point into world coordinates.
    #[must_use]
    pub fn point(&self, local: &Point2) -> Point2 {
        self.isometry
            .transform_point(&Point2::new(local.x, self.mirror * local.y))
    }

    /// Transforms a local heading into a world heading.
    #[must_use]
    pub fn angle(&self, local: f64) -> f64 {
        normalize_angle(self.mirror * local + self.isometry.rotation.angle())
    }
}

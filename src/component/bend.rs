use std::f64::consts::PI;

use tracing::trace;

use super::{check_radius, input_port, Geometry, GeometryBuilder};
use crate::error::{require_positive, ConfigurationError, GeometryError, Result};
use crate::geometry::curve::euler_s_bend;
use crate::geometry::{Bezier, CosineSBend, EulerBend, PathBuilder};
use crate::math::{Point2, TOLERANCE};
use crate::port::{role, Direction, Port};
use crate::template::WaveguideTemplate;

/// Starts a local path at the origin with the template width.
fn local_path(template: &WaveguideTemplate) -> PathBuilder {
    PathBuilder::new(
        Point2::origin(),
        0.0,
        template.wg_width(),
        template.curve_tolerance(),
    )
}

/// Euler (clothoid) bend turning by an explicit angle.
#[derive(Debug, Clone)]
pub struct EBend {
    geometry: Geometry,
}

impl EBend {
    /// Builds an Euler bend turning by `turn` radians (positive turns left)
    /// with peak curvature `1 / bend_radius`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` when `turn` is zero or its
    ///   magnitude exceeds `PI`
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, turn: f64, port: Port) -> Result<Self> {
        if !turn.is_finite() || turn.abs() < TOLERANCE || turn.abs() > PI {
            return Err(ConfigurationError::out_of_range(
                "turn",
                turn,
                "must be non-zero and at most PI in magnitude",
            )
            .into());
        }
        let input = input_port(template, port)?;

        let bend = EulerBend::new(template.bend_radius(), turn);
        let mut path = local_path(template);
        path.curve(&bend);
        let end = path.position();

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.stroke(&path.finish())?;
        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, end, turn, template.wg_width());
        Ok(Self {
            geometry: builder.finish("EBend"),
        })
    }
}

impl_component!(EBend);

/// Raised-cosine S-bend.
#[derive(Debug, Clone)]
pub struct SBend {
    geometry: Geometry,
}

impl SBend {
    /// Builds an S-bend ending `length` ahead of and `height` to the left of
    /// `port` (negative heights go right), with the input heading.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for `length <= 0`
    /// - `GeometryError::RadiusViolation` when the peak curvature
    ///   `h PI^2 / (2 L^2)` exceeds `1 / bend_radius`
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, length: f64, height: f64, port: Port) -> Result<Self> {
        let length = require_positive("length", length)?;
        let input = input_port(template, port)?;

        let curve = CosineSBend::new(length, height);
        check_radius(template, &curve)?;
        let mut path = local_path(template);
        path.curve(&curve);

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.stroke(&path.finish())?;
        builder.world_port(role::INPUT, input);
        builder.port(
            role::OUTPUT,
            Point2::new(length, height),
            0.0,
            template.wg_width(),
        );
        Ok(Self {
            geometry: builder.finish("SBend"),
        })
    }
}

impl_component!(SBend);

/// S-bend made of two opposite Euler bends joined by a straight run.
#[derive(Debug, Clone)]
pub struct EulerSBend {
    geometry: Geometry,
    turn: f64,
}

impl EulerSBend {
    /// Builds an Euler S-bend with the same endpoint convention as
    /// [`SBend::new`]. The turn angle of the two bends is found by bisection.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for `length <= 0`
    /// - `GeometryError::Degenerate` when no S-bend at `bend_radius` spans
    ///   the requested deltas
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, length: f64, height: f64, port: Port) -> Result<Self> {
        let length = require_positive("length", length)?;
        let input = input_port(template, port)?;

        let Some((turn, straight)) = euler_s_bend(length, height, template.bend_radius()) else {
            return Err(GeometryError::Degenerate(format!(
                "no Euler S-bend of radius {:.4} spans length {length:.4} and height {height:.4}",
                template.bend_radius()
            ))
            .into());
        };
        trace!(turn, straight, "euler s-bend solved");

        let mut path = local_path(template);
        if turn.abs() < TOLERANCE {
            path.straight(length);
        } else {
            path.curve(&EulerBend::new(template.bend_radius(), turn))
                .straight(straight)
                .curve(&EulerBend::new(template.bend_radius(), -turn));
        }

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.stroke(&path.finish())?;
        builder.world_port(role::INPUT, input);
        builder.port(
            role::OUTPUT,
            Point2::new(length, height),
            0.0,
            template.wg_width(),
        );
        Ok(Self {
            geometry: builder.finish("EulerSBend"),
            turn,
        })
    }

    /// Signed turn angle of the first Euler bend.
    #[must_use]
    pub fn turn(&self) -> f64 {
        self.turn
    }
}

impl_component!(EulerSBend);

/// Generic bend following a Bézier curve through world control points.
#[derive(Debug, Clone)]
pub struct BBend {
    geometry: Geometry,
}

impl BBend {
    /// Builds a Bézier bend. The input port sits on the first control point
    /// heading along the first control leg; the output port sits on the last
    /// control point heading along the last leg.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` for fewer than 3 control points
    /// - `GeometryError::Degenerate` for a zero-length end leg
    /// - `GeometryError::RadiusViolation` when the curve bends tighter than
    ///   `bend_radius`
    pub fn new(template: &WaveguideTemplate, controls: &[Point2]) -> Result<Self> {
        let (curve, origin, heading) = Bezier::to_local(controls)?;
        check_radius(template, &curve)?;

        let mut path = local_path(template);
        path.curve(&curve);
        let end_angle = path.angle();
        let end = curve
            .controls()
            .last()
            .copied()
            .unwrap_or_else(Point2::origin);

        let input = Port::new(origin, Direction::from_radians(heading)).with_width(template.wg_width());
        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.stroke(&path.finish())?;
        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, end, end_angle, template.wg_width());
        Ok(Self {
            geometry: builder.finish("BBend"),
        })
    }
}

impl_component!(BBend);

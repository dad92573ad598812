use std::f64::consts::PI;

use tracing::trace;

use super::{Geometry, GeometryBuilder};
use crate::error::{ConfigurationError, GeometryError, Result};
use crate::geometry::{Curve, PathBuilder};
use crate::math::arc_2d::turn_between;
use crate::math::{Point2, LENGTH_TOLERANCE, TOLERANCE};
use crate::port::{role, Direction, Port};
use crate::template::WaveguideTemplate;

/// Turns smaller than this are treated as collinear pass-through vertices.
const COLLINEAR_TURN: f64 = 1e-9;

/// A routed waveguide through a list of waypoints, with a template bend at
/// every interior vertex.
#[derive(Debug, Clone)]
pub struct Waveguide {
    geometry: Geometry,
    length: f64,
}

/// One interior corner of the route.
struct Corner {
    curve: Option<Box<dyn Curve>>,
    /// Distance the bend consumes on the incoming segment.
    lead_in: f64,
    /// Distance the bend consumes on the outgoing segment.
    lead_out: f64,
}

impl Waveguide {
    /// Routes a waveguide through `waypoints`.
    ///
    /// Ports "input" and "output" sit exactly at the first and last waypoint,
    /// pointing along the direction of propagation.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` for fewer than 2 waypoints
    /// - `GeometryError::Degenerate` for coincident consecutive waypoints or a
    ///   full reversal
    /// - `GeometryError::SegmentTooShort` when adjacent bends do not fit on a
    ///   segment
    pub fn new(template: &WaveguideTemplate, waypoints: &[Point2]) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(ConfigurationError::Invalid(format!(
                "a waveguide needs at least 2 waypoints, got {}",
                waypoints.len()
            ))
            .into());
        }

        let mut headings = Vec::with_capacity(waypoints.len() - 1);
        let mut lengths = Vec::with_capacity(waypoints.len() - 1);
        for (index, pair) in waypoints.windows(2).enumerate() {
            let d = pair[1] - pair[0];
            let length = d.norm();
            if length < LENGTH_TOLERANCE {
                return Err(GeometryError::Degenerate(format!(
                    "waypoints {index} and {} coincide",
                    index + 1
                ))
                .into());
            }
            headings.push(d.y.atan2(d.x));
            lengths.push(length);
        }

        let corners = headings
            .windows(2)
            .enumerate()
            .map(|(index, pair)| corner(template, index + 1, pair[0], pair[1]))
            .collect::<Result<Vec<_>>>()?;

        for (index, &available) in lengths.iter().enumerate() {
            let required = index
                .checked_sub(1)
                .map_or(0.0, |i| corners[i].lead_out)
                + corners.get(index).map_or(0.0, |c| c.lead_in);
            if required > available + LENGTH_TOLERANCE {
                return Err(GeometryError::SegmentTooShort {
                    index,
                    available,
                    required,
                }
                .into());
            }
        }

        let width = template.wg_width();
        let mut path = PathBuilder::new(
            waypoints[0],
            headings[0],
            width,
            template.curve_tolerance(),
        );
        for (index, &length) in lengths.iter().enumerate() {
            let before = index.checked_sub(1).map_or(0.0, |i| corners[i].lead_out);
            let after = corners.get(index).map_or(0.0, |c| c.lead_in);
            path.straight(length - before - after);
            if let Some(curve) = corners.get(index).and_then(|c| c.curve.as_deref()) {
                path.curve(curve);
            }
        }
        let stroke = path.finish();
        let length = stroke.length();

        let mut builder = GeometryBuilder::world(template);
        builder.stroke(&stroke)?;

        let last = waypoints.len() - 1;
        builder.world_port(
            role::INPUT,
            Port::new(waypoints[0], Direction::from_radians(headings[0])).with_width(width),
        );
        builder.world_port(
            role::OUTPUT,
            Port::new(waypoints[last], Direction::from_radians(headings[last - 1]))
                .with_width(width),
        );

        Ok(Self {
            geometry: builder.finish("Waveguide"),
            length,
        })
    }

    /// Centerline length of the routed path (sampled).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl_component!(Waveguide);

fn corner(template: &WaveguideTemplate, vertex: usize, from: f64, to: f64) -> Result<Corner> {
    let turn = turn_between(from, to);
    if turn.abs() < COLLINEAR_TURN {
        trace!(vertex, "collinear vertex, no bend");
        return Ok(Corner {
            curve: None,
            lead_in: 0.0,
            lead_out: 0.0,
        });
    }
    if turn.abs() > PI - COLLINEAR_TURN {
        return Err(GeometryError::Degenerate(format!(
            "the route reverses direction at waypoint {vertex}"
        ))
        .into());
    }

    let curve = template.bend(turn);
    let (lead_in, lead_out) = tangent_lengths(curve.as_ref(), template.curve_tolerance());
    trace!(vertex, turn, lead_in, lead_out, "bend inserted");
    Ok(Corner {
        curve: Some(curve),
        lead_in,
        lead_out,
    })
}

/// Distances from the corner of the two tangent lines to the start and end
/// of `curve`.
///
/// With the curve ending at `P` after turning by `θ`, the corner lies at
/// `(a, 0)` and `P = (a + b cos θ, b sin θ)`.
pub(super) fn tangent_lengths(curve: &dyn Curve, tolerance: f64) -> (f64, f64) {
    let turn = curve.turn();
    let end = curve
        .sample(tolerance)
        .last()
        .map_or_else(Point2::origin, |s| s.point);
    let sin = turn.sin();
    if sin.abs() < TOLERANCE {
        return (0.0, 0.0);
    }
    let lead_out = end.y / sin;
    let lead_in = end.x - lead_out * turn.cos();
    (lead_in, lead_out)
}

//! Metal wire routing.

use std::f64::consts::PI;

use tracing::{debug, trace};

use super::Geometry;
use crate::error::{ConfigurationError, GeometryError, Result};
use crate::geometry::{CircularArc, LayerSpec, PathBuilder, PathSample, Polygon, PolygonSet, Stroke};
use crate::math::arc_2d::turn_between;
use crate::math::{Point2, LENGTH_TOLERANCE};
use crate::port::{role, Direction, Port, PortMap};
use crate::template::MetalTemplate;

/// Turns smaller than this pass straight through a waypoint.
const COLLINEAR_TURN: f64 = 1e-9;

/// Sample spacing tolerance for rounded corners.
const CURVE_TOLERANCE: f64 = 5e-4;

/// A metal wire through a list of waypoints.
///
/// With a zero bend radius every corner is mitered: the outline meets at the
/// corner bisector and the wire keeps its full width through the turn.
/// Otherwise each corner is rounded by a circular arc of the template radius.
#[derive(Debug, Clone)]
pub struct MetalRoute {
    geometry: Geometry,
    length: f64,
}

impl MetalRoute {
    /// Routes a wire through `waypoints`. Ports "input" and "output" sit on
    /// the first and last waypoint.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` for fewer than 2 waypoints
    /// - `GeometryError::Degenerate` for coincident waypoints or a reversal
    /// - `GeometryError::SegmentTooShort` when rounded corners do not fit
    /// - `GeometryError::SelfIntersecting` when mitered corners collide
    pub fn new(template: &MetalTemplate, waypoints: &[Point2]) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(ConfigurationError::Invalid(format!(
                "a metal route needs at least 2 waypoints, got {}",
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
        let turns = headings
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let turn = turn_between(pair[0], pair[1]);
                if turn.abs() > PI - COLLINEAR_TURN {
                    return Err(GeometryError::Degenerate(format!(
                        "the route reverses direction at waypoint {}",
                        index + 1
                    ))
                    .into());
                }
                Ok(turn)
            })
            .collect::<Result<Vec<_>>>()?;

        let width = template.width();
        let clad = template.clad_width();
        let mut polygons = PolygonSet::new();
        let length = if template.bend_radius() > 0.0 {
            let stroke = rounded(template.bend_radius(), width, waypoints, &headings, &lengths, &turns)?;
            push_pieces(&mut polygons, template.metal_layer(), &stroke, 0.5 * width)?;
            if clad > 0.0 {
                push_pieces(&mut polygons, template.clad_layer(), &stroke, 0.5 * width + clad)?;
            }
            stroke.length()
        } else {
            let core = mitered(width, waypoints, &headings, &turns);
            polygons.push(Polygon::new(template.metal_layer(), &core.outline()?)?);
            if clad > 0.0 {
                let cladding = mitered(width + 2.0 * clad, waypoints, &headings, &turns);
                polygons.push(Polygon::new(template.clad_layer(), &cladding.outline()?)?);
            }
            lengths.iter().sum()
        };

        let last = waypoints.len() - 1;
        let mut ports = PortMap::new();
        ports.insert(
            role::INPUT,
            Port::new(waypoints[0], Direction::from_radians(headings[0])).with_width(width),
        );
        ports.insert(
            role::OUTPUT,
            Port::new(waypoints[last], Direction::from_radians(headings[last - 1])).with_width(width),
        );
        debug!(kind = "MetalRoute", polygons = polygons.len(), length, "component built");
        Ok(Self {
            geometry: Geometry { polygons, ports },
            length,
        })
    }

    /// Centerline length of the wire.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl_component!(MetalRoute);

/// Centerline through the waypoints with the width widened by
/// `1 / cos(turn / 2)` on each corner bisector.
fn mitered(width: f64, waypoints: &[Point2], headings: &[f64], turns: &[f64]) -> Stroke {
    let last = waypoints.len() - 1;
    let mut samples = Vec::with_capacity(waypoints.len());
    let mut widths = Vec::with_capacity(waypoints.len());
    for (index, &point) in waypoints.iter().enumerate() {
        let (angle, scale) = if index == 0 {
            (headings[0], 1.0)
        } else if index == last {
            (headings[last - 1], 1.0)
        } else {
            let turn = turns[index - 1];
            (headings[index - 1] + 0.5 * turn, 1.0 / (0.5 * turn).cos())
        };
        samples.push(PathSample { point, angle });
        widths.push(width * scale);
    }
    Stroke::new(samples, widths)
}

/// Centerline with every corner replaced by a tangent arc of `radius`.
fn rounded(
    radius: f64,
    width: f64,
    waypoints: &[Point2],
    headings: &[f64],
    lengths: &[f64],
    turns: &[f64],
) -> Result<Stroke> {
    let setback: Vec<f64> = turns.iter().map(|t| radius * (0.5 * t.abs()).tan()).collect();
    let mut path = PathBuilder::new(waypoints[0], headings[0], width, CURVE_TOLERANCE);
    for (index, &available) in lengths.iter().enumerate() {
        let before = index.checked_sub(1).map_or(0.0, |i| setback[i]);
        let after = setback.get(index).copied().unwrap_or(0.0);
        let required = before + after;
        if required > available + LENGTH_TOLERANCE {
            return Err(GeometryError::SegmentTooShort {
                index,
                available,
                required,
            }
            .into());
        }
        path.straight(available - required);
        if let Some(&turn) = turns.get(index) {
            if turn.abs() >= COLLINEAR_TURN {
                trace!(vertex = index + 1, turn, "corner rounded");
                path.curve(&CircularArc::new(radius, turn));
            }
        }
    }
    Ok(path.finish())
}

fn push_pieces(polygons: &mut PolygonSet, layer: LayerSpec, stroke: &Stroke, half: f64) -> Result<()> {
    for piece in stroke.band_pieces(|_| -half, |_| half)? {
        polygons.push(Polygon::new(layer, &piece)?);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::error::PicError;
    use approx::assert_abs_diff_eq;

    fn staircase() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 250.0),
            Point2::new(100.0, 250.0),
            Point2::new(100.0, 500.0),
            Point2::new(400.0, 500.0),
        ]
    }

    #[test]
    fn mitered_route_keeps_full_width() {
        let route = MetalRoute::new(&MetalTemplate::default(), &staircase()).unwrap();
        assert_abs_diff_eq!(route.length(), 900.0, epsilon = 1e-9);
        let set = route.polygons();
        assert_eq!(set.len(), 2);
        assert_abs_diff_eq!(set.area_on(LayerSpec::new(11, 0)), 20.0 * 900.0, epsilon = 1e-6);
        assert_abs_diff_eq!(set.area_on(LayerSpec::new(12, 0)), 60.0 * 900.0, epsilon = 1e-6);
        let output = route.port(role::OUTPUT).unwrap();
        assert_eq!(output.position, Point2::new(400.0, 500.0));
        assert_eq!(output.direction, Direction::East);
        assert_eq!(route.port(role::INPUT).unwrap().direction, Direction::North);
    }

    #[test]
    fn rounded_corners_shorten_the_wire() {
        let template = MetalTemplate::default().with_bend_radius(40.0).unwrap();
        let route = MetalRoute::new(&template, &staircase()).unwrap();
        let expected = 900.0 - 3.0 * (80.0 - 20.0 * PI);
        assert_abs_diff_eq!(route.length(), expected, epsilon = 1e-2);
        assert_abs_diff_eq!(route.polygons().area(), 80.0 * expected, epsilon = 1.0);
    }

    #[test]
    fn rejects_short_segments_and_reversals() {
        let template = MetalTemplate::default().with_bend_radius(60.0).unwrap();
        assert!(matches!(
            MetalRoute::new(&template, &staircase()),
            Err(PicError::Geometry(GeometryError::SegmentTooShort { index: 1, .. }))
        ));
        let back = [Point2::new(0.0, 0.0), Point2::new(100.0, 0.0), Point2::new(50.0, 0.0)];
        assert!(matches!(
            MetalRoute::new(&MetalTemplate::default(), &back),
            Err(PicError::Geometry(GeometryError::Degenerate(_)))
        ));
    }
}

//! Rectangular double spiral delay line.

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, trace};

use super::waveguide::tangent_lengths;
use super::{input_port, Component, Geometry, Waveguide};
use crate::error::{require_positive, ConfigurationError, GeometryError, Result};
use crate::math::{LocalFrame, Point2, LENGTH_TOLERANCE};
use crate::port::{role, Direction, Parity, Port, PortMap};
use crate::template::WaveguideTemplate;

/// Extra height tried when fitting the spiral height to the length.
const HEIGHT_STEP: f64 = 100.0;

/// Parameters of a [`Spiral`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralParams {
    /// Outer width of the spiral along the input heading.
    pub width: f64,
    /// Total centerline length.
    pub length: f64,
    /// Center-to-center pitch of neighbouring turns.
    pub spacing: f64,
    pub parity: Parity,
}

impl SpiralParams {
    #[must_use]
    pub fn new(width: f64, length: f64, spacing: f64) -> Self {
        Self {
            width,
            length,
            spacing,
            parity: Parity::Positive,
        }
    }

    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }
}

/// A waveguide coiled into two interleaved rectangular spirals joined by an
/// S-turn in the middle. Input and output point the same way; the output
/// sits `width` ahead of the input and the spiral height to the left.
///
/// The number of turns is the largest that fits the width; the height is
/// then chosen so the centerline has the requested length.
#[derive(Debug, Clone)]
pub struct Spiral {
    geometry: Geometry,
    length: f64,
    turns: usize,
}

impl Spiral {
    /// Builds a spiral whose input sits on `port`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions, a
    ///   width too small for one turn, or a length too short for the width
    /// - `GeometryError::Overlap` when the spacing is below the waveguide
    ///   plus cladding width
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, params: &SpiralParams, port: Port) -> Result<Self> {
        let width = require_positive("width", params.width)?;
        let target = require_positive("length", params.length)?;
        let spacing = require_positive("spacing", params.spacing)?;
        let pitch = template.wg_width() + 2.0 * template.clad_width();
        if spacing < pitch {
            return Err(GeometryError::Overlap(format!(
                "spacing {spacing:.4} is below the waveguide and cladding width {pitch:.4}"
            ))
            .into());
        }
        let input = input_port(template, port)?;

        let (lead, deficit) = corner(template);
        let half_width = 0.5 * width;
        let reach = half_width - spacing - lead - LENGTH_TOLERANCE;
        if reach < 0.0 {
            return Err(ConfigurationError::out_of_range("width", width, "too narrow for one spiral turn").into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_turns = (reach / (2.0 * spacing)).floor() as usize + 1;

        #[allow(clippy::cast_precision_loss)]
        let length_at = |half_height: f64, turns: usize| {
            let points = waypoints(half_width, half_height, spacing, turns);
            polyline_length(&points) - deficit * (points.len() - 2) as f64
        };
        let mut fitted = None;
        for turns in (1..=max_turns).rev() {
            #[allow(clippy::cast_precision_loss)]
            let lowest = 2.0 * (turns - 1) as f64 * spacing + spacing + 2.0 * lead + LENGTH_TOLERANCE;
            let (l1, l2) = (length_at(lowest, turns), length_at(lowest + HEIGHT_STEP, turns));
            // the length grows linearly with the height for a fixed turn count
            let half_height = lowest + (target - l1) * HEIGHT_STEP / (l2 - l1);
            trace!(turns, half_height, "spiral height fitted");
            if half_height >= lowest {
                fitted = Some((turns, half_height));
                break;
            }
        }
        let Some((turns, half_height)) = fitted else {
            return Err(ConfigurationError::out_of_range("length", target, "too short for the spiral width").into());
        };

        let shift = Point2::new(half_width, half_height).coords;
        let local: Vec<Point2> = waypoints(half_width, half_height, spacing, turns)
            .into_iter()
            .map(|p| p + shift)
            .collect();
        let path = Waveguide::new(template, &local)?;
        let frame = LocalFrame::new(input.position, input.angle(), params.parity.is_mirrored());

        let mut ports = PortMap::new();
        ports.insert(role::INPUT, input);
        ports.insert(
            role::OUTPUT,
            Port::new(
                frame.point(&Point2::new(width, 2.0 * half_height)),
                Direction::from_radians(frame.angle(0.0)),
            )
            .with_width(template.wg_width()),
        );
        let polygons = path.polygons().transformed(&frame);
        debug!(kind = "Spiral", turns, length = path.length(), polygons = polygons.len(), "component built");
        Ok(Self {
            geometry: Geometry { polygons, ports },
            length: path.length(),
            turns,
        })
    }

    /// Centerline length as drawn.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Loops of the inward spiral.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.turns
    }
}

impl_component!(Spiral);

/// Corner points of the spiral, centred on the origin with the input at
/// `(-a, -b)` and the output at `(a, b)`, both heading along +x.
///
/// The inward half winds clockwise down to the centre; the outward half is
/// its point reflection, so the two interleave at pitch `s`.
fn waypoints(a: f64, b: f64, s: f64, turns: usize) -> Vec<Point2> {
    let mut inward = vec![Point2::new(-a, -b)];
    for k in 0..turns {
        #[allow(clippy::cast_precision_loss)]
        let d = 2.0 * k as f64 * s;
        inward.push(Point2::new(a - d, -b + d));
        inward.push(Point2::new(a - d, b - d - s));
        inward.push(Point2::new(-a + d + s, b - d - s));
        if k + 1 < turns {
            inward.push(Point2::new(-a + d + s, -b + d + 2.0 * s));
        } else {
            inward.push(Point2::new(-a + d + s, 0.0));
        }
    }
    let outward: Vec<Point2> = inward.iter().rev().map(|p| Point2::new(-p.x, -p.y)).collect();
    inward.extend(outward);
    inward
}

fn polyline_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Longer tangent leg of a right-angle template bend, and the length saved
/// when the bend replaces both legs.
fn corner(template: &WaveguideTemplate) -> (f64, f64) {
    let tolerance = template.curve_tolerance();
    let bend = template.bend(FRAC_PI_2);
    let (lead_in, lead_out) = tangent_lengths(bend.as_ref(), tolerance);
    let samples = bend.sample(tolerance);
    let arc: f64 = samples.windows(2).map(|w| (w[1].point - w[0].point).norm()).sum();
    (lead_in.max(lead_out), lead_in + lead_out - arc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PicError;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    fn east() -> Port {
        Port::at(0.0, 0.0, Direction::East)
    }

    #[test]
    fn length_and_ports() {
        let t = WaveguideTemplate::default();
        let spiral = Spiral::new(&t, &SpiralParams::new(2000.0, 20_000.0, 50.0), east()).unwrap();
        assert_eq!(spiral.turns(), 2);
        assert_abs_diff_eq!(spiral.length(), 20_000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(spiral.polygons().area(), 24.0 * 20_000.0, epsilon = 1.0);
        let output = spiral.port(role::OUTPUT).unwrap();
        assert_abs_diff_eq!(output.position.x, 2000.0, epsilon = 1e-9);
        assert!(output.position.y > 0.0);
        assert_eq!(output.direction, Direction::East);
        assert_eq!(spiral.port(role::INPUT).unwrap(), east().with_width(2.0));
    }

    #[test]
    fn negative_parity_coils_to_the_right() {
        let t = WaveguideTemplate::default();
        let params = SpiralParams::new(1000.0, 8000.0, 40.0);
        let pos = Spiral::new(&t, &params, east()).unwrap();
        let neg = Spiral::new(&t, &params.with_parity(Parity::Negative), east()).unwrap();
        let up = pos.port(role::OUTPUT).unwrap().position;
        let down = neg.port(role::OUTPUT).unwrap().position;
        assert_abs_diff_eq!(up.x, down.x, epsilon = 1e-9);
        assert_abs_diff_eq!(up.y, -down.y, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.polygons().area(), neg.polygons().area(), epsilon = 1e-6);
    }

    #[test]
    fn waypoints_interleave_at_the_pitch() {
        let points = waypoints(500.0, 300.0, 50.0, 2);
        assert_eq!(points.len(), 18);
        assert_eq!(points[0], Point2::new(-500.0, -300.0));
        assert_eq!(points[17], Point2::new(500.0, 300.0));
        // the outer outward leg runs one pitch above the outer inward leg
        assert_abs_diff_eq!(points[16].y - points[2].y, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[3].x - points[16].x, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_short_length_and_tight_spacing() {
        let t = WaveguideTemplate::default();
        assert!(matches!(
            Spiral::new(&t, &SpiralParams::new(2000.0, 3000.0, 50.0), east()),
            Err(PicError::Configuration(ConfigurationError::OutOfRange { parameter: "length", .. }))
        ));
        assert!(matches!(
            Spiral::new(&t, &SpiralParams::new(2000.0, 20_000.0, 20.0), east()),
            Err(PicError::Geometry(GeometryError::Overlap(_)))
        ));
        let bare = WaveguideTemplate::new(&TemplateOptions::new().with_clad_width(0.0)).unwrap();
        assert!(Spiral::new(&bare, &SpiralParams::new(2000.0, 20_000.0, 20.0), east()).is_ok());
    }
}

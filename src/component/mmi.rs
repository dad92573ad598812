//! Multimode interference splitters.

use std::f64::consts::{FRAC_PI_6, PI};

use super::{arc_s_bend_extent, check_bend_angle, input_port, Geometry, GeometryBuilder};
use crate::error::{require_positive, GeometryError, Result};
use crate::geometry::{CosineSBend, PathBuilder};
use crate::math::{Point2, LENGTH_TOLERANCE};
use crate::port::{role, Parity, Port};
use crate::template::WaveguideTemplate;

/// Emits a straight access taper from `start` heading +x.
fn access_taper(
    builder: &mut GeometryBuilder<'_>,
    template: &WaveguideTemplate,
    start: Point2,
    length: f64,
    widths: (f64, f64),
) -> Result<()> {
    let mut path = PathBuilder::new(start, 0.0, widths.0, template.curve_tolerance());
    path.straight_to_width(length, widths.1);
    builder.stroke(&path.finish())
}

/// Emits the rectangular multimode body and its cladding.
fn body(
    builder: &mut GeometryBuilder<'_>,
    template: &WaveguideTemplate,
    x: (f64, f64),
    axis_y: f64,
    width: f64,
) -> Result<()> {
    let half = 0.5 * width;
    builder.core_rect(x.0, axis_y - half, x.1, axis_y + half)?;
    let clad = half + template.clad_width();
    builder.clad_rect(x.0, axis_y - clad, x.1, axis_y + clad)
}

/// Checks that tapers of `taper_width` spaced `wg_sep` apart fit side by
/// side on a body of `width`.
fn check_access_layout(width: f64, taper_width: f64, wg_sep: f64) -> Result<()> {
    if taper_width > width {
        return Err(GeometryError::Overlap(format!(
            "taper width {taper_width:.4} exceeds the body width {width:.4}"
        ))
        .into());
    }
    if wg_sep < taper_width {
        return Err(GeometryError::Overlap(format!(
            "access tapers overlap: separation {wg_sep:.4} is below the taper width {taper_width:.4}"
        ))
        .into());
    }
    if 0.5 * (wg_sep + taper_width) > 0.5 * width {
        return Err(GeometryError::Overlap(format!(
            "access tapers separated by {wg_sep:.4} overhang the body width {width:.4}"
        ))
        .into());
    }
    Ok(())
}

/// Parameters of an [`Mmi1x2`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mmi1x2Params {
    /// Length of the multimode body.
    pub length: f64,
    /// Width of the multimode body.
    pub width: f64,
    /// Width of the access tapers where they meet the body.
    pub taper_width: f64,
    pub taper_length: f64,
    /// Center-to-center separation of the output tapers.
    pub wg_sep: f64,
    /// Length of the output fan-out (S-bends when `output_wg_sep` is set,
    /// straight otherwise).
    pub output_length: Option<f64>,
    /// Center-to-center separation of the output ports after the fan-out.
    pub output_wg_sep: Option<f64>,
}

impl Mmi1x2Params {
    #[must_use]
    pub fn new(length: f64, width: f64, taper_width: f64, taper_length: f64, wg_sep: f64) -> Self {
        Self {
            length,
            width,
            taper_width,
            taper_length,
            wg_sep,
            output_length: None,
            output_wg_sep: None,
        }
    }

    #[must_use]
    pub fn with_output_length(mut self, length: f64) -> Self {
        self.output_length = Some(length);
        self
    }

    #[must_use]
    pub fn with_output_wg_sep(mut self, wg_sep: f64) -> Self {
        self.output_wg_sep = Some(wg_sep);
        self
    }
}

/// 1x2 MMI splitter: one input taper, a multimode body and two output
/// tapers with an optional fan-out.
#[derive(Debug, Clone)]
pub struct Mmi1x2 {
    geometry: Geometry,
}

impl Mmi1x2 {
    /// Builds a 1x2 MMI whose input sits on `port`. The body axis continues
    /// the input axis; "output_top" lies on its left.
    ///
    /// Without an explicit `output_length`, a fan-out to `output_wg_sep` uses
    /// the shortest raised-cosine S-bend that respects `bend_radius`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions
    /// - `GeometryError::Overlap` when the access tapers overlap each other,
    ///   exceed the body width, or the fan-out separation is below the
    ///   waveguide width
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, params: &Mmi1x2Params, port: Port) -> Result<Self> {
        let length = require_positive("length", params.length)?;
        let width = require_positive("width", params.width)?;
        let taper_width = require_positive("taper_width", params.taper_width)?;
        let taper_length = require_positive("taper_length", params.taper_length)?;
        let wg_sep = require_positive("wg_sep", params.wg_sep)?;
        check_access_layout(width, taper_width, wg_sep)?;
        let w = template.wg_width();

        let fan_out = match (params.output_length, params.output_wg_sep) {
            (fan_length, Some(sep)) => {
                let sep = require_positive("output_wg_sep", sep)?;
                if sep < w {
                    return Err(GeometryError::Overlap(format!(
                        "output separation {sep:.4} is below the waveguide width {w:.4}"
                    ))
                    .into());
                }
                let height = 0.5 * (sep - wg_sep);
                let fan_length = match fan_length {
                    Some(l) => require_positive("output_length", l)?,
                    None => PI * (0.5 * template.bend_radius() * height.abs()).sqrt(),
                };
                (fan_length > LENGTH_TOLERANCE).then_some((fan_length, height))
            }
            (Some(l), None) => Some((require_positive("output_length", l)?, 0.0)),
            (None, None) => None,
        };
        let input = input_port(template, port)?;

        let body_end = taper_length + length;
        let taper_end = body_end + taper_length;
        let half_sep = 0.5 * wg_sep;

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        access_taper(&mut builder, template, Point2::origin(), taper_length, (w, taper_width))?;
        body(&mut builder, template, (taper_length, body_end), 0.0, width)?;

        let mut end = (taper_end, half_sep);
        for side in [1.0, -1.0] {
            let start = Point2::new(body_end, side * half_sep);
            access_taper(&mut builder, template, start, taper_length, (taper_width, w))?;
            if let Some((fan_length, height)) = fan_out {
                let mut path = PathBuilder::new(
                    Point2::new(taper_end, side * half_sep),
                    0.0,
                    w,
                    template.curve_tolerance(),
                );
                path.curve(&CosineSBend::new(fan_length, side * height));
                builder.stroke(&path.finish())?;
                end = (taper_end + fan_length, half_sep + height);
            }
        }

        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT_TOP, Point2::new(end.0, end.1), 0.0, w);
        builder.port(role::OUTPUT_BOT, Point2::new(end.0, -end.1), 0.0, w);
        Ok(Self {
            geometry: builder.finish("Mmi1x2"),
        })
    }
}

impl_component!(Mmi1x2);

/// Parameters of an [`Mmi2x2`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mmi2x2Params {
    /// Length of the multimode body.
    pub length: f64,
    /// Width of the multimode body.
    pub width: f64,
    /// Width of the access tapers where they meet the body.
    pub taper_width: f64,
    pub taper_length: f64,
    /// Center-to-center separation of the access tapers on each side.
    pub wg_sep: f64,
    /// Turn of each arc in the access S-bends (default `PI / 6`).
    pub angle: f64,
    pub parity: Parity,
}

impl Mmi2x2Params {
    #[must_use]
    pub fn new(length: f64, width: f64, taper_width: f64, taper_length: f64, wg_sep: f64) -> Self {
        Self {
            length,
            width,
            taper_width,
            taper_length,
            wg_sep,
            angle: FRAC_PI_6,
            parity: Parity::Positive,
        }
    }

    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }
}

/// 2x2 MMI coupler. Each of the four access waveguides leaves the body
/// through a taper and an arc S-bend that fans it away from its partner,
/// so the ports sit as far apart as those of a [`DirectionalCoupler`]
/// with the same bend angle.
///
/// [`DirectionalCoupler`]: super::DirectionalCoupler
#[derive(Debug, Clone)]
pub struct Mmi2x2 {
    geometry: Geometry,
}

impl Mmi2x2 {
    /// Builds a 2x2 MMI whose "input_top" sits on `port`; the body lies to
    /// the right of the input (left with negative parity).
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions or an
    ///   angle outside `(0, PI/2]`
    /// - `GeometryError::Overlap` when the access tapers overlap each other
    ///   or exceed the body width
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, params: &Mmi2x2Params, port: Port) -> Result<Self> {
        let length = require_positive("length", params.length)?;
        let width = require_positive("width", params.width)?;
        let taper_width = require_positive("taper_width", params.taper_width)?;
        let taper_length = require_positive("taper_length", params.taper_length)?;
        let wg_sep = require_positive("wg_sep", params.wg_sep)?;
        let angle = check_bend_angle(params.angle)?;
        check_access_layout(width, taper_width, wg_sep)?;
        let input = input_port(template, port)?;
        let w = template.wg_width();

        let (sx, sy) = arc_s_bend_extent(template, angle);
        let body_start = sx + taper_length;
        let body_end = body_start + length;
        let end_x = body_end + taper_length + sx;
        let port_sep = wg_sep + 2.0 * sy;
        let tolerance = template.curve_tolerance();

        let mut builder = GeometryBuilder::at_port(template, &input, params.parity.is_mirrored());
        // (port y, sign of the turn that heads towards the body axis)
        for (port_y, inward) in [(0.0, -1.0), (-port_sep, 1.0)] {
            let turn = inward * angle;
            let mut arm_in = PathBuilder::new(Point2::new(0.0, port_y), 0.0, w, tolerance);
            arm_in
                .curve(template.bend(turn).as_ref())
                .curve(template.bend(-turn).as_ref())
                .straight_to_width(taper_length, taper_width);
            builder.stroke(&arm_in.finish())?;

            let body_y = port_y + inward * sy;
            let mut arm_out = PathBuilder::new(Point2::new(body_end, body_y), 0.0, taper_width, tolerance);
            arm_out
                .straight_to_width(taper_length, w)
                .curve(template.bend(-turn).as_ref())
                .curve(template.bend(turn).as_ref());
            builder.stroke(&arm_out.finish())?;
        }
        body(&mut builder, template, (body_start, body_end), -0.5 * port_sep, width)?;

        builder.world_port(role::INPUT_TOP, input);
        builder.port(role::INPUT_BOT, Point2::new(0.0, -port_sep), 0.0, w);
        builder.port(role::OUTPUT_TOP, Point2::new(end_x, 0.0), 0.0, w);
        builder.port(role::OUTPUT_BOT, Point2::new(end_x, -port_sep), 0.0, w);
        Ok(Self {
            geometry: builder.finish("Mmi2x2"),
        })
    }
}

impl_component!(Mmi2x2);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::error::PicError;
    use crate::port::Direction;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    fn bare() -> WaveguideTemplate {
        WaveguideTemplate::new(&TemplateOptions::new().with_clad_width(0.0)).unwrap()
    }

    #[test]
    fn mmi1x2_core_area() {
        let t = bare();
        let mmi = Mmi1x2::new(
            &t,
            &Mmi1x2Params::new(20.0, 7.0, 2.0, 10.0, 3.5),
            Port::at(0.0, 0.0, Direction::East),
        )
        .unwrap();
        // three constant-width tapers plus the body
        assert_abs_diff_eq!(mmi.polygons().area(), 3.0 * 20.0 + 140.0, epsilon = 1e-9);
        let top = mmi.port(role::OUTPUT_TOP).unwrap().position;
        let bot = mmi.port(role::OUTPUT_BOT).unwrap().position;
        assert_abs_diff_eq!(top.x, 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(top.y, 1.75, epsilon = 1e-12);
        assert_abs_diff_eq!(bot.y, -1.75, epsilon = 1e-12);
    }

    #[test]
    fn mmi1x2_fan_out() {
        let t = bare();
        let params = Mmi1x2Params::new(20.0, 7.0, 2.0, 10.0, 3.5)
            .with_output_wg_sep(10.0)
            .with_output_length(20.0);
        let mmi = Mmi1x2::new(&t, &params, Port::at(0.0, 0.0, Direction::East)).unwrap();
        let top = mmi.port(role::OUTPUT_TOP).unwrap().position;
        let bot = mmi.port(role::OUTPUT_BOT).unwrap().position;
        assert_abs_diff_eq!(top.x, 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(top.y - bot.y, 10.0, epsilon = 1e-12);

        let auto = Mmi1x2::new(
            &t,
            &Mmi1x2Params::new(20.0, 7.0, 2.0, 10.0, 3.5).with_output_wg_sep(10.0),
            Port::at(0.0, 0.0, Direction::East),
        )
        .unwrap();
        // shortest S-bend for a 3.25 offset at radius 50
        let expected = 40.0 + PI * (25.0_f64 * 3.25).sqrt();
        assert_abs_diff_eq!(
            auto.port(role::OUTPUT_TOP).unwrap().position.x,
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn mmi_rejects_overlapping_tapers() {
        let t = bare();
        let port = Port::at(0.0, 0.0, Direction::East);
        for params in [
            Mmi1x2Params::new(20.0, 7.0, 2.0, 10.0, 1.0),
            Mmi1x2Params::new(20.0, 7.0, 2.0, 10.0, 6.0),
            Mmi1x2Params::new(20.0, 1.0, 2.0, 10.0, 3.0),
        ] {
            assert!(matches!(
                Mmi1x2::new(&t, &params, port),
                Err(PicError::Geometry(GeometryError::Overlap(_)))
            ));
        }
    }

    #[test]
    fn mmi2x2_ports_and_parity() {
        let t = bare();
        let params = Mmi2x2Params::new(50.0, 10.0, 2.0, 20.0, 3.0);
        let port = Port::at(0.0, 0.0, Direction::East);
        let pos = Mmi2x2::new(&t, &params, port).unwrap();
        let neg = Mmi2x2::new(&t, &params.with_parity(Parity::Negative), port).unwrap();
        // arc S-bend at the default radius 50: dx = 100 sin 30, dy = 100 (1 - cos 30)
        let sx = 100.0 * FRAC_PI_6.sin();
        let sy = 100.0 * (1.0 - FRAC_PI_6.cos());
        assert_eq!(pos.ports().len(), 4);
        assert_abs_diff_eq!(pos.port(role::INPUT_BOT).unwrap().position.y, -(3.0 + 2.0 * sy), epsilon = 1e-9);
        assert_abs_diff_eq!(neg.port(role::INPUT_BOT).unwrap().position.y, 3.0 + 2.0 * sy, epsilon = 1e-9);
        let out = pos.port(role::OUTPUT_TOP).unwrap();
        assert_abs_diff_eq!(out.position.x, 2.0 * sx + 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.position.y, 0.0, epsilon = 1e-9);
        assert_eq!(out.direction, Direction::East);
        assert_abs_diff_eq!(pos.polygons().area(), neg.polygons().area(), epsilon = 1e-9);
    }

    #[test]
    fn mmi2x2_area_counts_access_bends() {
        let t = bare();
        let mmi = Mmi2x2::new(
            &t,
            &Mmi2x2Params::new(50.0, 10.0, 2.0, 20.0, 3.0),
            Port::at(0.0, 0.0, Direction::East),
        )
        .unwrap();
        // body, four constant-width tapers, four S-bends of two 30 degree arcs
        let bends = 4.0 * 2.0 * (2.0 * 50.0 * FRAC_PI_6);
        assert_abs_diff_eq!(mmi.polygons().area(), 500.0 + 160.0 + bends, epsilon = 1e-2);
    }

    #[test]
    fn mmi2x2_steeper_angle_spreads_ports() {
        let t = bare();
        let port = Port::at(0.0, 0.0, Direction::East);
        let params = Mmi2x2Params::new(50.0, 10.0, 2.0, 20.0, 3.0);
        let shallow = Mmi2x2::new(&t, &params.with_angle(PI / 12.0), port).unwrap();
        let steep = Mmi2x2::new(&t, &params, port).unwrap();
        let spread = |m: &Mmi2x2| -m.port(role::OUTPUT_BOT).unwrap().position.y;
        assert!(spread(&steep) > spread(&shallow));
        assert!(Mmi2x2::new(&t, &params.with_angle(2.0), port).is_err());
    }
}

//! Two-waveguide couplers.
//!
//! All couplers share one local layout: the "top" arm starts on the input
//! port (local origin) and the "bot" arm starts below it, at negative local
//! y. [`Parity::Negative`] mirrors the layout so the bottom arm ends up on
//! the left of the input heading.

use std::f64::consts::FRAC_PI_6;

use super::grating::{check_dutycycle, period_count, periodic_sections};
use super::{arc_s_bend_extent, check_bend_angle, input_port, Geometry, GeometryBuilder};
use crate::error::{require_non_negative, require_positive, ConfigurationError, GeometryError, Result};
use crate::geometry::{CosineSBend, PathBuilder, Stroke};
use crate::math::Point2;
use crate::port::{role, Parity, Port};
use crate::template::WaveguideTemplate;

/// Which way an arm's input S-bend heads: top arms dive towards negative
/// local y, bottom arms climb.
#[derive(Debug, Clone, Copy)]
enum Arm {
    Top,
    Bot,
}

impl Arm {
    fn toward_partner(self) -> f64 {
        match self {
            Self::Top => -1.0,
            Self::Bot => 1.0,
        }
    }
}

fn check_gap(gap: f64) -> Result<()> {
    if gap < 0.0 || !gap.is_finite() {
        return Err(GeometryError::Overlap(format!("negative coupling gap {gap:.4}")).into());
    }
    Ok(())
}

fn check_width_delta(template: &WaveguideTemplate, dw: f64) -> Result<f64> {
    let dw = require_non_negative("dw", dw)?;
    if dw >= template.wg_width() {
        return Err(ConfigurationError::out_of_range("dw", dw, "must be narrower than wg_width").into());
    }
    Ok(dw)
}

/// One arm of an arc-bend coupler: S-bend in, coupling straight, S-bend
/// out. Widths change from `wg_width` to `coupling.0` through the inner
/// input bend, to `coupling.1` along the straight, and back through the
/// inner output bend.
fn arc_coupler_arm(
    template: &WaveguideTemplate,
    arm: Arm,
    start_y: f64,
    angle: f64,
    length: f64,
    coupling: (f64, f64),
) -> Stroke {
    let w = template.wg_width();
    let turn = arm.toward_partner() * angle;
    let mut path = PathBuilder::new(Point2::new(0.0, start_y), 0.0, w, template.curve_tolerance());
    path.curve(template.bend(turn).as_ref())
        .curve_to_width(template.bend(-turn).as_ref(), coupling.0)
        .straight_to_width(length, coupling.1)
        .curve_to_width(template.bend(-turn).as_ref(), w)
        .curve(template.bend(turn).as_ref());
    path.finish()
}

/// Shape shared by the directional and full couplers.
#[derive(Debug, Clone, Copy)]
struct ArcCouplerShape {
    angle: f64,
    length: f64,
    gap: f64,
    dw: f64,
}

impl ArcCouplerShape {
    fn build(
        self,
        template: &WaveguideTemplate,
        port: Port,
        parity: Parity,
        kind: &'static str,
    ) -> Result<Geometry> {
        let input = input_port(template, port)?;
        let w = template.wg_width();
        let (sx, sy) = arc_s_bend_extent(template, self.angle);
        let separation = 2.0 * sy + self.gap + w;
        let end_x = 2.0 * sx + self.length;
        let (angle, length, dw) = (self.angle, self.length, self.dw);

        let top = arc_coupler_arm(template, Arm::Top, 0.0, angle, length, (w + dw, w - dw));
        let bot = arc_coupler_arm(template, Arm::Bot, -separation, angle, length, (w - dw, w + dw));

        let mut builder = GeometryBuilder::at_port(template, &input, parity.is_mirrored());
        builder.stroke(&top)?;
        builder.stroke(&bot)?;
        builder.world_port(role::INPUT_TOP, input);
        builder.port(role::INPUT_BOT, Point2::new(0.0, -separation), 0.0, w);
        builder.port(role::OUTPUT_TOP, Point2::new(end_x, 0.0), 0.0, w);
        builder.port(role::OUTPUT_BOT, Point2::new(end_x, -separation), 0.0, w);
        Ok(builder.finish(kind))
    }
}

/// Parameters of a [`DirectionalCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalCouplerParams {
    /// Length of the straight coupling region.
    pub length: f64,
    /// Edge-to-edge gap in the coupling region.
    pub gap: f64,
    /// Turn of each arc in the S-bends (default `PI / 6`).
    pub angle: f64,
    pub parity: Parity,
}

impl DirectionalCouplerParams {
    #[must_use]
    pub fn new(length: f64, gap: f64) -> Self {
        Self {
            length,
            gap,
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

/// Two waveguides brought together by arc S-bends over a straight coupling
/// region.
#[derive(Debug, Clone)]
pub struct DirectionalCoupler {
    geometry: Geometry,
}

impl DirectionalCoupler {
    /// Builds a directional coupler whose top input sits on `port`.
    ///
    /// # Errors
    ///
    /// - `GeometryError::Overlap` for a negative gap
    /// - `ConfigurationError::OutOfRange` for a negative length or an angle
    ///   outside `(0, PI/2]`
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        params: &DirectionalCouplerParams,
        port: Port,
    ) -> Result<Self> {
        check_gap(params.gap)?;
        let length = require_non_negative("length", params.length)?;
        let angle = check_bend_angle(params.angle)?;
        let shape = ArcCouplerShape {
            angle,
            length,
            gap: params.gap,
            dw: 0.0,
        };
        let geometry = shape.build(template, port, params.parity, "DirectionalCoupler")?;
        Ok(Self { geometry })
    }
}

impl_component!(DirectionalCoupler);

/// Parameters of a [`FullCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullCouplerParams {
    /// Length of the coupling region.
    pub length: f64,
    /// Edge-to-edge gap, constant along the coupling region.
    pub gap: f64,
    /// Width offset: the arms taper between `w - dw` and `w + dw`.
    pub dw: f64,
    /// Turn of each arc in the S-bends (default `PI / 6`).
    pub angle: f64,
    pub parity: Parity,
}

impl FullCouplerParams {
    #[must_use]
    pub fn new(length: f64, gap: f64, dw: f64) -> Self {
        Self {
            length,
            gap,
            dw,
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

/// Directional coupler whose arm widths cross over the coupling region,
/// the top arm narrowing from `w + dw` to `w - dw` while the bottom arm
/// widens.
#[derive(Debug, Clone)]
pub struct FullCoupler {
    geometry: Geometry,
}

impl FullCoupler {
    /// Builds a full coupler whose top input sits on `port`.
    ///
    /// # Errors
    ///
    /// Same as [`DirectionalCoupler::new`], plus
    /// `ConfigurationError::OutOfRange` unless `0 <= dw < wg_width`.
    pub fn new(template: &WaveguideTemplate, params: &FullCouplerParams, port: Port) -> Result<Self> {
        check_gap(params.gap)?;
        let length = require_positive("length", params.length)?;
        let angle = check_bend_angle(params.angle)?;
        let dw = check_width_delta(template, params.dw)?;
        let shape = ArcCouplerShape {
            angle,
            length,
            gap: params.gap,
            dw,
        };
        let geometry = shape.build(template, port, params.parity, "FullCoupler")?;
        Ok(Self { geometry })
    }
}

impl_component!(FullCoupler);

/// Parameters of an [`AdiabaticCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdiabaticCouplerParams {
    /// Length of the raised-cosine approach.
    pub length1: f64,
    /// Length of the width-crossing coupling region.
    pub length2: f64,
    /// Length of the raised-cosine exit.
    pub length3: f64,
    /// Edge-to-edge gap in the coupling region.
    pub wg_sep: f64,
    /// Edge-to-edge gap between the two inputs.
    pub input_wg_sep: f64,
    /// Edge-to-edge gap between the two outputs.
    pub output_wg_sep: f64,
    /// Width offset: the arms cross between `w - dw` and `w + dw`.
    pub dw: f64,
    pub parity: Parity,
}

impl AdiabaticCouplerParams {
    #[must_use]
    pub fn new(
        length1: f64,
        length2: f64,
        length3: f64,
        wg_sep: f64,
        input_wg_sep: f64,
        output_wg_sep: f64,
        dw: f64,
    ) -> Self {
        Self {
            length1,
            length2,
            length3,
            wg_sep,
            input_wg_sep,
            output_wg_sep,
            dw,
            parity: Parity::Positive,
        }
    }

    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }
}

/// Coupler whose arms approach along raised-cosine S-bends, swap widths
/// over the coupling region and separate again.
#[derive(Debug, Clone)]
pub struct AdiabaticCoupler {
    geometry: Geometry,
}

impl AdiabaticCoupler {
    /// Builds an adiabatic coupler whose top input sits on `port`.
    ///
    /// All three separations are edge-to-edge gaps between `wg_width` arms,
    /// like the gap of a [`DirectionalCoupler`].
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive lengths, or
    ///   unless `0 <= dw < wg_width`
    /// - `GeometryError::Overlap` for a negative gap
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        params: &AdiabaticCouplerParams,
        port: Port,
    ) -> Result<Self> {
        let l1 = require_positive("length1", params.length1)?;
        let l2 = require_positive("length2", params.length2)?;
        let l3 = require_positive("length3", params.length3)?;
        let dw = check_width_delta(template, params.dw)?;
        check_gap(params.wg_sep)?;
        check_gap(params.input_wg_sep)?;
        check_gap(params.output_wg_sep)?;
        let input = input_port(template, port)?;

        let w = template.wg_width();
        let coupling_sep = params.wg_sep + w;
        let input_sep = params.input_wg_sep + w;
        let approach = 0.5 * (params.input_wg_sep - params.wg_sep);
        let exit = 0.5 * (params.output_wg_sep - params.wg_sep);
        let top_y = -approach;
        let bot_y = top_y - coupling_sep;
        let end_x = l1 + l2 + l3;

        let mut top = PathBuilder::new(Point2::origin(), 0.0, w, template.curve_tolerance());
        top.curve_to_width(&CosineSBend::new(l1, -approach), w + dw)
            .straight_to_width(l2, w - dw)
            .curve_to_width(&CosineSBend::new(l3, exit), w);

        let mut bot = PathBuilder::new(
            Point2::new(0.0, -input_sep),
            0.0,
            w,
            template.curve_tolerance(),
        );
        bot.curve_to_width(&CosineSBend::new(l1, approach), w - dw)
            .straight_to_width(l2, w + dw)
            .curve_to_width(&CosineSBend::new(l3, -exit), w);

        let mut builder = GeometryBuilder::at_port(template, &input, params.parity.is_mirrored());
        builder.stroke(&top.finish())?;
        builder.stroke(&bot.finish())?;
        builder.world_port(role::INPUT_TOP, input);
        builder.port(role::INPUT_BOT, Point2::new(0.0, -input_sep), 0.0, w);
        builder.port(role::OUTPUT_TOP, Point2::new(end_x, top_y + exit), 0.0, w);
        builder.port(role::OUTPUT_BOT, Point2::new(end_x, bot_y - exit), 0.0, w);
        Ok(Self {
            geometry: builder.finish("AdiabaticCoupler"),
        })
    }
}

impl_component!(AdiabaticCoupler);

/// Parameters of a [`ContraDirectionalCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContraDirectionalCouplerParams {
    /// Length of the corrugated coupling region.
    pub length: f64,
    /// Edge-to-edge gap between the unperturbed coupling waveguides.
    pub gap: f64,
    /// Corrugation period.
    pub period: f64,
    /// Fraction of each period kept at full width.
    pub dutycycle: f64,
    /// Turn of each arc in the S-bends (default `PI / 6`).
    pub angle: f64,
    /// Width of the top arm in the coupling region.
    pub width_top: f64,
    /// Width of the bottom arm in the coupling region.
    pub width_bot: f64,
    /// Corrugation depth of the top arm; `None` means half of `width_top`.
    pub dw_top: Option<f64>,
    /// Corrugation depth of the bottom arm; `None` means half of `width_bot`.
    pub dw_bot: Option<f64>,
    /// Attach the supplied port to the bottom arm instead of the top one.
    pub input_bot: bool,
    pub parity: Parity,
}

impl ContraDirectionalCouplerParams {
    #[must_use]
    pub fn new(
        length: f64,
        gap: f64,
        period: f64,
        dutycycle: f64,
        width_top: f64,
        width_bot: f64,
    ) -> Self {
        Self {
            length,
            gap,
            period,
            dutycycle,
            angle: FRAC_PI_6,
            width_top,
            width_bot,
            dw_top: None,
            dw_bot: None,
            input_bot: false,
            parity: Parity::Positive,
        }
    }

    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub fn with_corrugation(mut self, dw_top: f64, dw_bot: f64) -> Self {
        self.dw_top = Some(dw_top);
        self.dw_bot = Some(dw_bot);
        self
    }

    #[must_use]
    pub fn with_input_bot(mut self, input_bot: bool) -> Self {
        self.input_bot = input_bot;
        self
    }

    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }
}

/// Corrugation depth for an arm of `width`, defaulting to half the width.
fn corrugation_depth(name: &'static str, depth: Option<f64>, width: f64) -> Result<f64> {
    let depth = require_non_negative(name, depth.unwrap_or(0.5 * width))?;
    if depth >= width {
        return Err(ConfigurationError::out_of_range(name, depth, "must be narrower than the arm").into());
    }
    Ok(depth)
}

/// Outline of a straight arm centred on `centre` whose sidewall on the
/// `facing` side (+1 up, -1 down) is recessed by `depth` in narrow sections.
fn corrugated_outline(
    sections: &[(f64, f64, bool)],
    centre: f64,
    width: f64,
    depth: f64,
    facing: f64,
) -> Vec<Point2> {
    let mut outline = Vec::with_capacity(2 * sections.len() + 2);
    for &(x0, x1, wide) in sections {
        let recess = if wide { 0.0 } else { depth };
        let edge = centre + facing * (0.5 * width - recess);
        outline.push(Point2::new(x0, edge));
        outline.push(Point2::new(x1, edge));
    }
    if let (Some(first), Some(last)) = (sections.first(), sections.last()) {
        let outer = centre - facing * 0.5 * width;
        outline.push(Point2::new(last.1, outer));
        outline.push(Point2::new(first.0, outer));
    }
    outline
}

/// Grating-assisted coupler: two arms of different widths meet over a
/// coupling region whose facing sidewalls are corrugated.
#[derive(Debug, Clone)]
pub struct ContraDirectionalCoupler {
    geometry: Geometry,
}

impl ContraDirectionalCoupler {
    /// Builds a contra-directional coupler whose top input (bottom input
    /// with `input_bot`) sits on `port`. Arms leave their inputs through an
    /// arc S-bend whose inner bend tapers to the coupling width.
    ///
    /// # Errors
    ///
    /// - `GeometryError::Overlap` for a negative gap
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions, a
    ///   duty cycle outside `(0, 1)`, an angle outside `(0, PI/2]`, a
    ///   corrugation at least as deep as its arm, or a period longer than
    ///   `length`
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        params: &ContraDirectionalCouplerParams,
        port: Port,
    ) -> Result<Self> {
        check_gap(params.gap)?;
        let length = require_positive("length", params.length)?;
        let period = require_positive("period", params.period)?;
        let dutycycle = check_dutycycle(params.dutycycle)?;
        let angle = check_bend_angle(params.angle)?;
        let width_top = require_positive("width_top", params.width_top)?;
        let width_bot = require_positive("width_bot", params.width_bot)?;
        let dw_top = corrugation_depth("dw_top", params.dw_top, width_top)?;
        let dw_bot = corrugation_depth("dw_bot", params.dw_bot, width_bot)?;
        let periods = period_count(length, period)?;
        let input = input_port(template, port)?;

        let w = template.wg_width();
        let tolerance = template.curve_tolerance();
        let (sx, sy) = arc_s_bend_extent(template, angle);
        let coupling_sep = params.gap + 0.5 * (width_top + width_bot);
        let port_sep = 2.0 * sy + coupling_sep;
        let top_y = if params.input_bot { port_sep } else { 0.0 };
        let bot_y = top_y - port_sep;
        let coupling_end = sx + length;
        let end_x = coupling_end + sx;
        let sections = periodic_sections(sx, length, period, dutycycle, periods);

        let mut builder = GeometryBuilder::at_port(template, &input, params.parity.is_mirrored());
        for (arm, port_y, width, depth) in [
            (Arm::Top, top_y, width_top, dw_top),
            (Arm::Bot, bot_y, width_bot, dw_bot),
        ] {
            let turn = arm.toward_partner() * angle;
            let centre = port_y + arm.toward_partner() * sy;

            let mut arm_in = PathBuilder::new(Point2::new(0.0, port_y), 0.0, w, tolerance);
            arm_in
                .curve(template.bend(turn).as_ref())
                .curve_to_width(template.bend(-turn).as_ref(), width);
            builder.stroke(&arm_in.finish())?;

            let facing = arm.toward_partner();
            builder.core_polygon(&corrugated_outline(&sections, centre, width, depth, facing))?;
            let mut straight = PathBuilder::new(Point2::new(sx, centre), 0.0, width, tolerance);
            straight.straight(length);
            builder.stroke_cladding(&straight.finish())?;

            let mut arm_out = PathBuilder::new(Point2::new(coupling_end, centre), 0.0, width, tolerance);
            arm_out
                .curve_to_width(template.bend(-turn).as_ref(), w)
                .curve(template.bend(turn).as_ref());
            builder.stroke(&arm_out.finish())?;
        }

        let (input_role, other_role, other_y) = if params.input_bot {
            (role::INPUT_BOT, role::INPUT_TOP, top_y)
        } else {
            (role::INPUT_TOP, role::INPUT_BOT, bot_y)
        };
        builder.world_port(input_role, input);
        builder.port(other_role, Point2::new(0.0, other_y), 0.0, w);
        builder.port(role::OUTPUT_TOP, Point2::new(end_x, top_y), 0.0, w);
        builder.port(role::OUTPUT_BOT, Point2::new(end_x, bot_y), 0.0, w);
        Ok(Self {
            geometry: builder.finish("ContraDirectionalCoupler"),
        })
    }
}

impl_component!(ContraDirectionalCoupler);

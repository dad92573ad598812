//! Periodic structures: straight and focusing grating couplers and Bragg
//! reflectors.

use std::f64::consts::{FRAC_PI_2, PI};

use super::{input_port, Geometry, GeometryBuilder};
use crate::error::{require_non_negative, require_positive, ConfigurationError, Result};
use crate::geometry::PathBuilder;
use crate::math::arc_2d::{arc_point_at, arc_subdivision_count};
use crate::math::{Point2, LENGTH_TOLERANCE};
use crate::port::{role, Port};
use crate::template::WaveguideTemplate;

pub(super) fn check_dutycycle(dutycycle: f64) -> Result<f64> {
    if dutycycle > 0.0 && dutycycle < 1.0 {
        Ok(dutycycle)
    } else {
        Err(ConfigurationError::out_of_range("dutycycle", dutycycle, "must lie in (0, 1)").into())
    }
}

/// Upper bound on the periods of one grating or reflector.
pub const MAX_PERIODS: u32 = 1_000_000;

/// Number of whole periods that fit in `length`.
pub(super) fn period_count(length: f64, period: f64) -> Result<u32> {
    let ratio = (length + LENGTH_TOLERANCE) / period;
    if ratio < 1.0 {
        return Err(ConfigurationError::out_of_range(
            "period",
            period,
            "must not exceed the grating length",
        )
        .into());
    }
    if ratio >= f64::from(MAX_PERIODS) + 1.0 {
        return Err(ConfigurationError::out_of_range(
            "period",
            period,
            "yields more than 1000000 periods",
        )
        .into());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = ratio.floor() as u32;
    Ok(count)
}

/// Splits `[start, start + length]` into `(x0, x1, wide)` sections. Each
/// of the `periods` whole periods opens with a wide section of
/// `dutycycle * period` and closes with a narrow one; a trailing partial
/// period stays wide.
pub(super) fn periodic_sections(
    start: f64,
    length: f64,
    period: f64,
    dutycycle: f64,
    periods: u32,
) -> Vec<(f64, f64, bool)> {
    let mut sections = Vec::with_capacity(2 * periods as usize + 1);
    for i in 0..periods {
        let x0 = start + period * f64::from(i);
        let split = x0 + dutycycle * period;
        sections.push((x0, split, true));
        sections.push((split, start + period * f64::from(i + 1), false));
    }
    let covered = start + period * f64::from(periods);
    if start + length - covered > LENGTH_TOLERANCE {
        sections.push((covered, start + length, true));
    }
    sections
}

/// Parameters of a [`GratingCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GratingCouplerParams {
    /// Lateral width of the grating teeth.
    pub width: f64,
    /// Length of the grating region.
    pub length: f64,
    /// Length of the taper from the waveguide to the grating width.
    pub taper_length: f64,
    pub period: f64,
    /// Fraction of each period occupied by a tooth.
    pub dutycycle: f64,
}

impl GratingCouplerParams {
    #[must_use]
    pub fn new(width: f64, length: f64, taper_length: f64, period: f64, dutycycle: f64) -> Self {
        Self {
            width,
            length,
            taper_length,
            period,
            dutycycle,
        }
    }
}

/// Straight grating coupler terminating a waveguide.
#[derive(Debug, Clone)]
pub struct GratingCoupler {
    geometry: Geometry,
    teeth: u32,
}

impl GratingCoupler {
    /// Builds a grating coupler whose only port, "input", sits on `port`.
    ///
    /// The waveguide tapers to `width` over `taper_length`; each following
    /// period starts with a gap and ends with a tooth.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions, a duty
    ///   cycle outside `(0, 1)` or a period longer than the grating
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        params: &GratingCouplerParams,
        port: Port,
    ) -> Result<Self> {
        let width = require_positive("width", params.width)?;
        let length = require_positive("length", params.length)?;
        let taper_length = require_positive("taper_length", params.taper_length)?;
        let period = require_positive("period", params.period)?;
        let dutycycle = check_dutycycle(params.dutycycle)?;
        let teeth = period_count(length, period)?;
        let input = input_port(template, port)?;

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        let mut taper = PathBuilder::new(
            Point2::origin(),
            0.0,
            template.wg_width(),
            template.curve_tolerance(),
        );
        taper.straight_to_width(taper_length, width);
        builder.stroke(&taper.finish())?;

        let half = 0.5 * width;
        let gap = period * (1.0 - dutycycle);
        for i in 0..teeth {
            let start = taper_length + period * f64::from(i);
            builder.core_rect(start + gap, -half, start + period, half)?;
        }
        let clad = half + template.clad_width();
        builder.clad_rect(taper_length, -clad, taper_length + length, clad)?;

        builder.world_port(role::INPUT, input);
        Ok(Self {
            geometry: builder.finish("GratingCoupler"),
            teeth,
        })
    }

    /// Number of grating teeth.
    #[must_use]
    pub fn teeth(&self) -> u32 {
        self.teeth
    }
}

impl_component!(GratingCoupler);

/// Parameters of a [`FocusingGratingCoupler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusingGratingCouplerParams {
    /// Radius at which the teeth start; the taper fans out up to it.
    pub focus_distance: f64,
    /// Chord width of the fan at its outer radius.
    pub width: f64,
    /// Radial length of the grating region.
    pub length: f64,
    pub period: f64,
    pub dutycycle: f64,
    /// Full opening angle of the fan. When unset it follows from `width`.
    pub angle: Option<f64>,
}

impl FocusingGratingCouplerParams {
    #[must_use]
    pub fn new(focus_distance: f64, width: f64, length: f64, period: f64, dutycycle: f64) -> Self {
        Self {
            focus_distance,
            width,
            length,
            period,
            dutycycle,
            angle: None,
        }
    }

    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }
}

/// Grating coupler with circular teeth centred on the input port, so the
/// grating focuses onto the waveguide.
#[derive(Debug, Clone)]
pub struct FocusingGratingCoupler {
    geometry: Geometry,
    teeth: u32,
}

impl FocusingGratingCoupler {
    /// Builds a focusing grating whose only port, "input", sits on `port`.
    ///
    /// The waveguide fans out to radius `focus_distance`; the teeth are
    /// annular sectors and each period starts with a gap.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions, a duty
    ///   cycle outside `(0, 1)`, an opening angle outside `(0, PI)` or a
    ///   period longer than the grating
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        params: &FocusingGratingCouplerParams,
        port: Port,
    ) -> Result<Self> {
        let focus = require_positive("focus_distance", params.focus_distance)?;
        let width = require_positive("width", params.width)?;
        let length = require_positive("length", params.length)?;
        let period = require_positive("period", params.period)?;
        let dutycycle = check_dutycycle(params.dutycycle)?;
        let outer = focus + length;
        let half_angle = match params.angle {
            Some(angle) if angle > 0.0 && angle < PI => 0.5 * angle,
            Some(angle) => {
                return Err(ConfigurationError::out_of_range("angle", angle, "must lie in (0, PI)").into())
            }
            None => (0.5 * width).atan2(outer),
        };
        let teeth = period_count(length, period)?;
        let input = input_port(template, port)?;
        let tolerance = template.curve_tolerance();

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        let half_wg = 0.5 * template.wg_width();
        builder.core_polygon(&fan(half_wg, focus, half_angle, tolerance))?;
        let gap = period * (1.0 - dutycycle);
        for i in 0..teeth {
            let start = focus + period * f64::from(i);
            builder.core_polygon(&annular_sector(start + gap, start + period, half_angle, tolerance))?;
        }
        let clad = template.clad_width();
        if clad > 0.0 {
            let widen = (clad / outer).min(1.0).asin();
            let clad_angle = (half_angle + widen).min(0.99 * FRAC_PI_2);
            builder.clad_polygon(&fan(half_wg + clad, outer + clad, clad_angle, tolerance))?;
        }

        builder.world_port(role::INPUT, input);
        Ok(Self {
            geometry: builder.finish("FocusingGratingCoupler"),
            teeth,
        })
    }

    /// Number of grating teeth.
    #[must_use]
    pub fn teeth(&self) -> u32 {
        self.teeth
    }
}

impl_component!(FocusingGratingCoupler);

/// Points of an arc about the origin from `-half_angle` to `half_angle`,
/// reversed when `backwards` is set.
fn arc_points(radius: f64, half_angle: f64, tolerance: f64, backwards: bool) -> Vec<Point2> {
    let sweep = 2.0 * half_angle;
    let n = arc_subdivision_count(radius, sweep, tolerance);
    let centre = Point2::origin();
    (0..=n)
        .map(|i| {
            let t = f64::from(i) / f64::from(n);
            let t = if backwards { 1.0 - t } else { t };
            arc_point_at(&centre, radius, -half_angle, sweep, t)
        })
        .collect()
}

/// Fan from a chord of half width `half_start` at the origin out to an arc
/// of `radius`.
fn fan(half_start: f64, radius: f64, half_angle: f64, tolerance: f64) -> Vec<Point2> {
    let mut points = vec![Point2::new(0.0, -half_start)];
    points.extend(arc_points(radius, half_angle, tolerance, false));
    points.push(Point2::new(0.0, half_start));
    points
}

/// Ring sector between radii `r0 < r1`.
fn annular_sector(r0: f64, r1: f64, half_angle: f64, tolerance: f64) -> Vec<Point2> {
    let mut points = arc_points(r1, half_angle, tolerance, false);
    points.extend(arc_points(r0, half_angle, tolerance, true));
    points
}

/// Parameters of a [`Dbr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbrParams {
    /// Length of the periodic region.
    pub length: f64,
    pub period: f64,
    /// Fraction of each period kept at the wide section width.
    pub dutycycle: f64,
    /// Width of the narrow (photonic crystal) sections.
    pub w_phc: f64,
    /// Length of the linear tapers on either side of the periodic region
    /// (default 20).
    pub taper_length: f64,
    /// Width of the wide sections; `None` keeps the template width.
    pub dbr_wg_width: Option<f64>,
}

impl DbrParams {
    pub const DEFAULT_TAPER_LENGTH: f64 = 20.0;

    #[must_use]
    pub fn new(length: f64, period: f64, dutycycle: f64, w_phc: f64) -> Self {
        Self {
            length,
            period,
            dutycycle,
            w_phc,
            taper_length: Self::DEFAULT_TAPER_LENGTH,
            dbr_wg_width: None,
        }
    }

    #[must_use]
    pub fn with_taper_length(mut self, taper_length: f64) -> Self {
        self.taper_length = taper_length;
        self
    }

    #[must_use]
    pub fn with_dbr_wg_width(mut self, width: f64) -> Self {
        self.dbr_wg_width = Some(width);
        self
    }
}

/// Distributed Bragg reflector: a taper into a waveguide whose width
/// alternates between the wide section width and `w_phc`, and a taper back
/// out, drawn as one stepped outline.
#[derive(Debug, Clone)]
pub struct Dbr {
    geometry: Geometry,
}

impl Dbr {
    /// Builds a DBR starting at `port`. After the input taper each whole
    /// period holds a wide section of `dutycycle * period` followed by a
    /// `w_phc` section; any remainder past the last whole period stays wide.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions, a
    ///   negative taper length, a duty cycle outside `(0, 1)`, a period
    ///   longer than `length` or more than [`MAX_PERIODS`] periods
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, params: &DbrParams, port: Port) -> Result<Self> {
        let length = require_positive("length", params.length)?;
        let period = require_positive("period", params.period)?;
        let dutycycle = check_dutycycle(params.dutycycle)?;
        let w_phc = require_positive("w_phc", params.w_phc)?;
        let taper = require_non_negative("taper_length", params.taper_length)?;
        let w = template.wg_width();
        let wide = match params.dbr_wg_width {
            Some(width) => require_positive("dbr_wg_width", width)?,
            None => w,
        };
        let periods = period_count(length, period)?;
        let input = input_port(template, port)?;

        let sections: Vec<(f64, f64, f64)> = periodic_sections(taper, length, period, dutycycle, periods)
            .into_iter()
            .map(|(x0, x1, is_wide)| (x0, x1, if is_wide { wide } else { w_phc }))
            .collect();
        let body_end = sections.last().map_or(taper + length, |s| s.1);
        let end_x = body_end + taper;

        let mut outline = Vec::with_capacity(4 * sections.len() + 4);
        outline.push(Point2::new(0.0, 0.5 * w));
        for &(x0, x1, width) in &sections {
            outline.push(Point2::new(x0, 0.5 * width));
            outline.push(Point2::new(x1, 0.5 * width));
        }
        outline.push(Point2::new(end_x, 0.5 * w));
        outline.push(Point2::new(end_x, -0.5 * w));
        for &(x0, x1, width) in sections.iter().rev() {
            outline.push(Point2::new(x1, -0.5 * width));
            outline.push(Point2::new(x0, -0.5 * width));
        }
        outline.push(Point2::new(0.0, -0.5 * w));

        let clad = template.clad_width();
        let port_clad = 0.5 * w + clad;
        let body_clad = 0.5 * wide.max(w_phc) + clad;
        let cladding = [
            Point2::new(0.0, -port_clad),
            Point2::new(taper, -body_clad),
            Point2::new(body_end, -body_clad),
            Point2::new(end_x, -port_clad),
            Point2::new(end_x, port_clad),
            Point2::new(body_end, body_clad),
            Point2::new(taper, body_clad),
            Point2::new(0.0, port_clad),
        ];

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.core_polygon(&outline)?;
        builder.clad_polygon(&cladding)?;

        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, Point2::new(end_x, 0.0), 0.0, w);
        Ok(Self {
            geometry: builder.finish("Dbr"),
        })
    }
}

impl_component!(Dbr);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::port::Direction;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    fn bare() -> WaveguideTemplate {
        WaveguideTemplate::new(&TemplateOptions::new().with_clad_width(0.0)).unwrap()
    }

    #[test]
    fn grating_teeth_and_area() {
        let t = bare();
        let gc = GratingCoupler::new(
            &t,
            &GratingCouplerParams::new(20.0, 50.0, 20.0, 1.0, 0.7),
            Port::at(0.0, 0.0, Direction::West),
        )
        .unwrap();
        assert_eq!(gc.teeth(), 50);
        assert_eq!(gc.ports().len(), 1);
        // taper (2 -> 20 over 20) plus 50 teeth of 0.7 x 20
        let expected = 0.5 * (2.0 + 20.0) * 20.0 + 50.0 * 0.7 * 20.0;
        assert_abs_diff_eq!(gc.polygons().area(), expected, epsilon = 1e-6);
        // grating extends away from the port, along the port heading
        let far = gc
            .polygons()
            .iter()
            .flat_map(|p| p.points().iter())
            .map(|p| p.x)
            .fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(far, -70.0, epsilon = 1e-9);
    }

    #[test]
    fn grating_rejects_bad_dutycycle() {
        let t = bare();
        let port = Port::at(0.0, 0.0, Direction::East);
        assert!(GratingCoupler::new(&t, &GratingCouplerParams::new(20.0, 50.0, 20.0, 1.0, 1.0), port).is_err());
        assert!(GratingCoupler::new(&t, &GratingCouplerParams::new(20.0, 0.5, 20.0, 1.0, 0.5), port).is_err());
    }

    #[test]
    fn dbr_is_one_stepped_polygon() {
        let t = bare();
        let dbr = Dbr::new(
            &t,
            &DbrParams::new(10.0, 0.85, 0.5, 0.4).with_taper_length(0.0),
            Port::at(100.0, 0.0, Direction::East),
        )
        .unwrap();
        assert_eq!(dbr.polygons().len(), 1);
        // 11 periods, the 0.65 remainder stays full width
        let periods = 11.0;
        let expected = periods * 0.85 * (0.5 * 2.0 + 0.5 * 0.4) + 0.65 * 2.0;
        assert_abs_diff_eq!(dbr.polygons().area(), expected, epsilon = 1e-9);
        let out = dbr.port(role::OUTPUT).unwrap();
        assert_abs_diff_eq!(out.position.x, 110.0, epsilon = 1e-9);
        assert_eq!(out.width, Some(2.0));
    }

    #[test]
    fn dbr_tapers_into_wide_sections() {
        let t = WaveguideTemplate::default();
        let params = DbrParams::new(10.0, 0.85, 0.5, 0.4).with_dbr_wg_width(3.0);
        let dbr = Dbr::new(&t, &params, Port::at(0.0, 0.0, Direction::East)).unwrap();
        assert_eq!(dbr.polygons().len(), 2);
        let out = dbr.port(role::OUTPUT).unwrap();
        assert_abs_diff_eq!(out.position.x, 50.0, epsilon = 1e-9);
        assert_eq!(out.width, Some(2.0));

        let taper_core = 2.0 * 0.5 * (2.0 + 3.0) * 20.0;
        let body_core = 11.0 * 0.85 * (0.5 * 3.0 + 0.5 * 0.4) + 0.65 * 3.0;
        assert_abs_diff_eq!(
            dbr.polygons().area_on(t.wg_layer()),
            taper_core + body_core,
            epsilon = 1e-9
        );
        let taper_clad = 2.0 * 0.5 * (22.0 + 23.0) * 20.0;
        assert_abs_diff_eq!(
            dbr.polygons().area_on(t.clad_layer()),
            taper_clad + 23.0 * 10.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn period_count_is_capped() {
        assert_eq!(period_count(10.0, 0.85).unwrap(), 11);
        assert_eq!(period_count(1000.0, 0.001).unwrap(), MAX_PERIODS);
        assert!(period_count(1.0e9, 1.0).is_err());
        let t = bare();
        let err = GratingCoupler::new(
            &t,
            &GratingCouplerParams::new(20.0, 1.0e7, 20.0, 1.0, 0.5),
            Port::at(0.0, 0.0, Direction::East),
        );
        assert!(err.is_err());
    }

    #[test]
    fn focusing_grating_fans_out_to_the_teeth() {
        let t = bare();
        let params = FocusingGratingCouplerParams::new(20.0, 20.0, 50.0, 1.0, 0.7);
        let gc = FocusingGratingCoupler::new(&t, &params, Port::at(0.0, 0.0, Direction::East)).unwrap();
        assert_eq!(gc.teeth(), 50);
        assert_eq!(gc.polygons().len(), 51);
        assert_eq!(gc.ports().len(), 1);

        let alpha = 10.0_f64.atan2(70.0);
        let taper = (1.0 + 20.0 * alpha.sin()) * 20.0 * alpha.cos()
            + 0.5 * 400.0 * (2.0 * alpha - (2.0 * alpha).sin());
        let teeth: f64 = (0..50)
            .map(|k| {
                let r = 20.0 + f64::from(k);
                alpha * ((r + 1.0).powi(2) - (r + 0.3).powi(2))
            })
            .sum();
        let expected = taper + teeth;
        assert_abs_diff_eq!(gc.polygons().area(), expected, epsilon = 1e-3 * expected);
        // the outermost tooth ends on the outer radius
        let reach = gc
            .polygons()
            .iter()
            .flat_map(|p| p.points().iter())
            .map(|p| p.coords.norm())
            .fold(0.0, f64::max);
        assert_abs_diff_eq!(reach, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn focusing_grating_angle_and_cladding() {
        let t = WaveguideTemplate::default();
        let params = FocusingGratingCouplerParams::new(20.0, 20.0, 50.0, 1.0, 0.7).with_angle(PI / 5.0);
        let gc = FocusingGratingCoupler::new(&t, &params, Port::at(0.0, 0.0, Direction::North)).unwrap();
        let core = gc.polygons().area_on(t.wg_layer());
        let clad = gc.polygons().area_on(t.clad_layer());
        assert!(clad > core);
        // every point of the fan lies ahead of the port
        assert!(gc.polygons().iter().flat_map(|p| p.points().iter()).all(|p| p.y >= -1e-9));
        for bad in [0.0, PI] {
            let params = FocusingGratingCouplerParams::new(20.0, 20.0, 50.0, 1.0, 0.7).with_angle(bad);
            assert!(FocusingGratingCoupler::new(&t, &params, Port::at(0.0, 0.0, Direction::East)).is_err());
        }
    }
}

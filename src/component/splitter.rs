//! Spline-profiled Y-splitter.

use tracing::trace;

use super::{input_port, Geometry, GeometryBuilder};
use crate::error::{require_non_negative, require_positive, ConfigurationError, GeometryError, Result};
use crate::geometry::{CosineSBend, PathBuilder};
use crate::math::spline::CubicSpline;
use crate::math::Point2;
use crate::port::{role, Port};
use crate::template::WaveguideTemplate;

/// Straight sub-steps per spline interval.
const STEPS_PER_KNOT: u32 = 16;

/// Parameters of a [`SplineYSplitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplineYSplitterParams {
    /// Length of the spline-profiled body.
    pub length: f64,
    /// Body widths at evenly spaced stations from start to end.
    pub widths: Vec<f64>,
    /// Length of the output S-bends.
    pub output_length: f64,
    /// Center-to-center separation of the output ports.
    pub output_wg_sep: f64,
    /// Width of the output arms.
    pub output_width: f64,
    /// Length of an optional linear taper from the waveguide width to the
    /// first body width (0 for none).
    pub taper_length: f64,
}

impl SplineYSplitterParams {
    #[must_use]
    pub fn new(
        length: f64,
        widths: Vec<f64>,
        output_length: f64,
        output_wg_sep: f64,
        output_width: f64,
    ) -> Self {
        Self {
            length,
            widths,
            output_length,
            output_wg_sep,
            output_width,
            taper_length: 0.0,
        }
    }

    #[must_use]
    pub fn with_taper_length(mut self, taper_length: f64) -> Self {
        self.taper_length = taper_length;
        self
    }
}

/// Y-splitter whose body width follows a natural cubic spline through the
/// given stations. Two arms leave from the edges of the body end and fan
/// out along raised-cosine S-bends.
#[derive(Debug, Clone)]
pub struct SplineYSplitter {
    geometry: Geometry,
}

impl SplineYSplitter {
    /// Builds a splitter whose input sits on `port`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` for fewer than 2 widths
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions or
    ///   widths, or a negative taper length
    /// - `GeometryError::Overlap` when the arms would overlap at the body
    ///   end or at the outputs
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(template: &WaveguideTemplate, params: &SplineYSplitterParams, port: Port) -> Result<Self> {
        let length = require_positive("length", params.length)?;
        let output_length = require_positive("output_length", params.output_length)?;
        let output_width = require_positive("output_width", params.output_width)?;
        let sep = require_positive("output_wg_sep", params.output_wg_sep)?;
        let taper = require_non_negative("taper_length", params.taper_length)?;
        for &w in &params.widths {
            require_positive("widths", w)?;
        }
        let (first, last) = match params.widths.as_slice() {
            [first, .., last] => (*first, *last),
            _ => {
                return Err(ConfigurationError::Invalid(format!(
                    "a spline splitter needs at least 2 widths, got {}",
                    params.widths.len()
                ))
                .into())
            }
        };
        let arm_y = 0.5 * (last - output_width);
        if arm_y < 0.5 * output_width {
            return Err(GeometryError::Overlap(format!(
                "two arms of width {output_width:.4} do not fit on a body end of {last:.4}"
            ))
            .into());
        }
        if sep < output_width {
            return Err(GeometryError::Overlap(format!(
                "output separation {sep:.4} is below the arm width {output_width:.4}"
            ))
            .into());
        }
        let input = input_port(template, port)?;

        let knots = params.widths.len() - 1;
        #[allow(clippy::cast_precision_loss)]
        let stations: Vec<f64> = (0..=knots).map(|i| length * i as f64 / knots as f64).collect();
        let spline = CubicSpline::natural(&stations, &params.widths).ok_or_else(|| {
            ConfigurationError::Invalid("spline stations must be strictly increasing".to_owned())
        })?;

        let tolerance = template.curve_tolerance();
        let mut builder = GeometryBuilder::at_port(template, &input, false);
        if taper > 0.0 {
            let mut path = PathBuilder::new(Point2::origin(), 0.0, template.wg_width(), tolerance);
            path.straight_to_width(taper, first);
            builder.stroke(&path.finish())?;
        }

        #[allow(clippy::cast_possible_truncation)]
        let steps = STEPS_PER_KNOT * knots as u32;
        let step = length / f64::from(steps);
        let mut body = PathBuilder::new(Point2::new(taper, 0.0), 0.0, first, tolerance);
        for i in 1..=steps {
            body.straight_to_width(step, spline.eval(step * f64::from(i)));
        }
        builder.stroke(&body.finish())?;
        trace!(steps, end_width = last, "spline body sampled");

        let body_end = taper + length;
        let end_x = body_end + output_length;
        let rise = 0.5 * sep - arm_y;
        for side in [1.0, -1.0] {
            let mut arm = PathBuilder::new(Point2::new(body_end, side * arm_y), 0.0, output_width, tolerance);
            arm.curve(&CosineSBend::new(output_length, side * rise));
            builder.stroke(&arm.finish())?;
        }

        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT_TOP, Point2::new(end_x, 0.5 * sep), 0.0, output_width);
        builder.port(role::OUTPUT_BOT, Point2::new(end_x, -0.5 * sep), 0.0, output_width);
        Ok(Self {
            geometry: builder.finish("SplineYSplitter"),
        })
    }
}

impl_component!(SplineYSplitter);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::error::PicError;
    use crate::port::Direction;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    fn bare(wg_width: f64) -> WaveguideTemplate {
        WaveguideTemplate::new(&TemplateOptions::new().with_wg_width(wg_width).with_clad_width(0.0)).unwrap()
    }

    fn east() -> Port {
        Port::at(0.0, 0.0, Direction::East)
    }

    #[test]
    fn constant_profile_with_straight_arms() {
        let t = bare(0.5);
        // arms start at +-0.35 and the outputs sit at +-0.35: no S-bend rise
        let params = SplineYSplitterParams::new(2.0, vec![1.2, 1.2, 1.2], 10.0, 0.7, 0.5);
        let ys = SplineYSplitter::new(&t, &params, east()).unwrap();
        assert_abs_diff_eq!(ys.polygons().area(), 1.2 * 2.0 + 2.0 * 0.5 * 10.0, epsilon = 1e-9);
        let top = ys.port(role::OUTPUT_TOP).unwrap();
        assert_eq!(top.position, Point2::new(12.0, 0.35));
        assert_eq!(top.width, Some(0.5));
    }

    #[test]
    fn published_profile_fans_out() {
        let t = bare(0.5);
        let widths = vec![0.5, 0.5, 0.6, 0.7, 0.9, 1.26, 1.4, 1.4, 1.4, 1.4, 1.31, 1.2, 1.2];
        let params = SplineYSplitterParams::new(2.0, widths, 10.0, 5.0, 0.5).with_taper_length(1.0);
        let ys = SplineYSplitter::new(&t, &params, east()).unwrap();
        let top = ys.port(role::OUTPUT_TOP).unwrap().position;
        let bot = ys.port(role::OUTPUT_BOT).unwrap().position;
        assert_abs_diff_eq!(top.x, 13.0, epsilon = 1e-12);
        assert_abs_diff_eq!(top.y - bot.y, 5.0, epsilon = 1e-12);
        // the body lies between the narrowest and widest station
        let arms_and_taper = ys.polygons().area() - 0.5 * 1.0;
        assert!(arms_and_taper > 0.5 * 2.0 + 2.0 * 0.5 * 10.0);
        assert!(arms_and_taper < 1.5 * 2.0 + 2.0 * 0.5 * 10.5);
    }

    #[test]
    fn rejects_arms_that_do_not_fit() {
        let t = bare(0.5);
        let narrow_end = SplineYSplitterParams::new(2.0, vec![0.5, 0.8], 10.0, 5.0, 0.5);
        assert!(matches!(
            SplineYSplitter::new(&t, &narrow_end, east()),
            Err(PicError::Geometry(GeometryError::Overlap(_)))
        ));
        let one_width = SplineYSplitterParams::new(2.0, vec![1.2], 10.0, 5.0, 0.5);
        assert!(matches!(
            SplineYSplitter::new(&t, &one_width, east()),
            Err(PicError::Configuration(ConfigurationError::Invalid(_)))
        ));
    }
}

use super::{input_port, Geometry, GeometryBuilder};
use crate::error::{require_non_negative, require_positive, Result};
use crate::geometry::PathBuilder;
use crate::math::Point2;
use crate::port::{role, Port};
use crate::template::WaveguideTemplate;

/// Linear width taper from the template width to an end width.
#[derive(Debug, Clone)]
pub struct Taper {
    geometry: Geometry,
}

impl Taper {
    /// Builds a taper of `length` starting at `port`, narrowing or widening
    /// the core linearly to `end_width`. An end width of zero yields a
    /// triangular tip.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for `length <= 0` or `end_width < 0`
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        length: f64,
        end_width: f64,
        port: Port,
    ) -> Result<Self> {
        let length = require_positive("length", length)?;
        let end_width = require_non_negative("end_width", end_width)?;
        let input = input_port(template, port)?;

        let mut path = PathBuilder::new(
            Point2::origin(),
            0.0,
            template.wg_width(),
            template.curve_tolerance(),
        );
        path.straight_to_width(length, end_width);

        let mut builder = GeometryBuilder::at_port(template, &input, false);
        builder.stroke(&path.finish())?;
        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, Point2::new(length, 0.0), 0.0, end_width);

        Ok(Self {
            geometry: builder.finish("Taper"),
        })
    }
}

impl_component!(Taper);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::port::Direction;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_width_taper_is_a_rectangle() {
        let t = WaveguideTemplate::default();
        let taper = Taper::new(&t, 40.0, 2.0, Port::at(0.0, 0.0, Direction::North)).unwrap();
        assert_abs_diff_eq!(taper.polygons().area_on(t.wg_layer()), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_end_width_gives_triangle() {
        let t = WaveguideTemplate::default();
        let taper = Taper::new(&t, 100.0, 0.0, Port::at(0.0, 0.0, Direction::East)).unwrap();
        let core = taper
            .polygons()
            .iter()
            .find(|p| p.layer() == t.wg_layer())
            .unwrap();
        assert_eq!(core.points().len(), 3);
        assert_abs_diff_eq!(core.area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn output_port_carries_end_width() {
        let t = WaveguideTemplate::default();
        let taper = Taper::new(&t, 10.0, 0.5, Port::at(1.0, 1.0, Direction::West)).unwrap();
        let out = taper.port(role::OUTPUT).unwrap();
        assert_abs_diff_eq!(out.position.x, -9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.position.y, 1.0, epsilon = 1e-12);
        assert_eq!(out.direction, Direction::West);
        assert_eq!(out.width, Some(0.5));
    }

    #[test]
    fn invalid_parameters() {
        let t = WaveguideTemplate::default();
        let port = Port::at(0.0, 0.0, Direction::East);
        assert!(Taper::new(&t, 0.0, 1.0, port).is_err());
        assert!(Taper::new(&t, 10.0, -1.0, port).is_err());
        assert!(Taper::new(&t, 10.0, 1.0, port.with_width(0.3)).is_err());
    }
}

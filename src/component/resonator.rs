use std::f64::consts::{PI, TAU};

use super::{input_port, Geometry, GeometryBuilder};
use crate::error::{require_positive, GeometryError, Result};
use crate::geometry::{CircularArc, PathBuilder};
use crate::math::arc_2d::{arc_point_at, arc_subdivision_count};
use crate::math::Point2;
use crate::port::{role, Parity, Port};
use crate::template::WaveguideTemplate;

/// Fewest vertices used for a full circle.
const MIN_CIRCLE_VERTICES: u32 = 16;

/// Closed polygon approximating a circle within the sagitta `tolerance`.
fn circle(center: Point2, radius: f64, tolerance: f64) -> Vec<Point2> {
    let n = arc_subdivision_count(radius, TAU, tolerance).max(MIN_CIRCLE_VERTICES);
    (0..n)
        .map(|i| arc_point_at(&center, radius, -0.5 * PI, TAU, f64::from(i) / f64::from(n)))
        .collect()
}

fn check_gap(gap: f64) -> Result<f64> {
    if gap < 0.0 || !gap.is_finite() {
        return Err(GeometryError::Overlap(format!(
            "negative resonator gap {gap:.4}"
        ))
        .into());
    }
    Ok(gap)
}

/// Straight bus of length `2 radius` along the local x-axis.
fn bus(
    builder: &mut GeometryBuilder<'_>,
    template: &WaveguideTemplate,
    radius: f64,
) -> Result<()> {
    let mut path = PathBuilder::new(
        Point2::origin(),
        0.0,
        template.wg_width(),
        template.curve_tolerance(),
    );
    path.straight(2.0 * radius);
    builder.stroke(&path.finish())
}

/// Ring resonator side-coupled to a straight bus.
#[derive(Debug, Clone)]
pub struct Ring {
    geometry: Geometry,
    center: Point2,
}

impl Ring {
    /// Builds a bus of length `2 radius` from `port` with a ring of
    /// centerline `radius` beside it, separated from the bus by the edge gap
    /// `gap`. Positive parity puts the ring on the left of the bus.
    ///
    /// The ring is emitted as two half-annuli so that every polygon stays
    /// simple.
    ///
    /// # Errors
    ///
    /// - `GeometryError::RadiusViolation` when `radius < bend_radius`
    /// - `GeometryError::Overlap` for a negative gap
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        radius: f64,
        gap: f64,
        parity: Parity,
        port: Port,
    ) -> Result<Self> {
        let radius = require_positive("radius", radius)?;
        if radius < template.bend_radius() {
            return Err(GeometryError::RadiusViolation {
                radius,
                bend_radius: template.bend_radius(),
            }
            .into());
        }
        let gap = check_gap(gap)?;
        let input = input_port(template, port)?;
        let w = template.wg_width();
        let tolerance = template.curve_tolerance();
        let center = Point2::new(radius, radius + gap + w);

        let mut builder = GeometryBuilder::at_port(template, &input, parity.is_mirrored());
        bus(&mut builder, template, radius)?;

        let mut halves = Vec::with_capacity(2);
        for (start, heading) in [
            (Point2::new(radius, center.y - radius), 0.0),
            (Point2::new(radius, center.y + radius), PI),
        ] {
            let mut half = PathBuilder::new(start, heading, w, tolerance);
            half.curve(&CircularArc::new(radius, PI));
            halves.push(half.finish());
        }
        for half in &halves {
            builder.stroke_core(half)?;
        }
        let clad = template.clad_width();
        if radius - 0.5 * w - clad > 0.0 {
            for half in &halves {
                builder.stroke_cladding(half)?;
            }
        } else if clad > 0.0 {
            // The cladding annulus would close over the center: fill it.
            builder.clad_polygon(&circle(center, radius + 0.5 * w + clad, tolerance))?;
        }

        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, Point2::new(2.0 * radius, 0.0), 0.0, w);
        let center = builder.to_world(&center);
        Ok(Self {
            geometry: builder.finish("Ring"),
            center,
        })
    }

    /// Ring center in world coordinates.
    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }
}

impl_component!(Ring);

/// Disk resonator side-coupled to a straight bus.
#[derive(Debug, Clone)]
pub struct Disk {
    geometry: Geometry,
}

impl Disk {
    /// Builds a bus of length `2 radius` from `port` with a filled disk of
    /// `radius` beside it, separated from the bus by the edge gap `gap`, and
    /// a disk-shaped cladding of radius `radius + clad_width`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::OutOfRange` for `radius <= 0`
    /// - `GeometryError::Overlap` for a negative gap
    /// - `PortMismatchError::Width` if `port` declares a foreign width
    pub fn new(
        template: &WaveguideTemplate,
        radius: f64,
        gap: f64,
        parity: Parity,
        port: Port,
    ) -> Result<Self> {
        let radius = require_positive("radius", radius)?;
        let gap = check_gap(gap)?;
        let input = input_port(template, port)?;
        let w = template.wg_width();
        let tolerance = template.curve_tolerance();
        let center = Point2::new(radius, radius + gap + 0.5 * w);

        let mut builder = GeometryBuilder::at_port(template, &input, parity.is_mirrored());
        bus(&mut builder, template, radius)?;
        builder.core_polygon(&circle(center, radius, tolerance))?;
        builder.clad_polygon(&circle(center, radius + template.clad_width(), tolerance))?;

        builder.world_port(role::INPUT, input);
        builder.port(role::OUTPUT, Point2::new(2.0 * radius, 0.0), 0.0, w);
        Ok(Self {
            geometry: builder.finish("Disk"),
        })
    }
}

impl_component!(Disk);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::test_support::template;
    use crate::component::Component;
    use crate::error::PicError;
    use crate::port::Direction;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ring_area_matches_annuli() {
        let t = template(50.0, 1.0);
        let ring = Ring::new(&t, 60.0, 1.0, Parity::Positive, Port::at(100.0, 0.0, Direction::East))
            .unwrap();
        let exact = 120.0 * 1.0 + 120.0 * 21.0 + TAU * 60.0 * 1.0 + TAU * 60.0 * 21.0;
        assert_abs_diff_eq!(ring.polygons().area(), exact, epsilon = 0.2);
        // bus core and cladding plus two halves of each annulus
        assert_eq!(ring.polygons().len(), 6);
        assert_abs_diff_eq!(ring.center().y, 62.0, epsilon = 1e-9);
    }

    #[test]
    fn ring_parity_moves_ring_to_the_other_side() {
        let t = template(50.0, 1.0);
        let port = Port::at(0.0, 0.0, Direction::East);
        let pos = Ring::new(&t, 60.0, 1.0, Parity::Positive, port).unwrap();
        let neg = Ring::new(&t, 60.0, 1.0, Parity::Negative, port).unwrap();
        assert_abs_diff_eq!(pos.center().y, -neg.center().y, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.polygons().area(), neg.polygons().area(), epsilon = 1e-6);
        assert_eq!(pos.port(role::OUTPUT).unwrap(), neg.port(role::OUTPUT).unwrap());
    }

    #[test]
    fn ring_below_bend_radius_fails() {
        let t = template(50.0, 1.0);
        let err = Ring::new(&t, 40.0, 1.0, Parity::Positive, Port::at(0.0, 0.0, Direction::East))
            .unwrap_err();
        assert!(matches!(err, PicError::Geometry(GeometryError::RadiusViolation { .. })));
        let err = Ring::new(&t, 60.0, -1.0, Parity::Positive, Port::at(0.0, 0.0, Direction::East))
            .unwrap_err();
        assert!(matches!(err, PicError::Geometry(GeometryError::Overlap(_))));
    }

    #[test]
    fn wide_cladding_fills_ring_center() {
        let t = WaveguideTemplate::new(
            &TemplateOptions::new()
                .with_bend_radius(5.0)
                .with_wg_width(1.0)
                .with_clad_width(10.0),
        )
        .unwrap();
        let ring = Ring::new(&t, 5.0, 0.5, Parity::Positive, Port::at(0.0, 0.0, Direction::East))
            .unwrap();
        let clad = ring.polygons().area_on(t.clad_layer());
        let disk = PI * 15.5 * 15.5;
        assert_abs_diff_eq!(clad, 10.0 * 21.0 + disk, epsilon = 0.1);
    }

    #[test]
    fn disk_area() {
        let t = template(50.0, 1.0);
        let disk = Disk::new(&t, 60.0, 1.0, Parity::Positive, Port::at(100.0, 0.0, Direction::East))
            .unwrap();
        let exact = 120.0 * 22.0 + PI * 60.0 * 60.0 + PI * 70.0 * 70.0;
        assert_abs_diff_eq!(disk.polygons().area(), exact, epsilon = 0.5);
    }
}

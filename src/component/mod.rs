//! Photonic components.
//!
//! Every component is built eagerly by its constructor from a template,
//! shape parameters and an input [`Port`], and is immutable afterwards.
//! Geometry is generated in a local frame (input port at the origin, heading
//! +x) and mapped to world coordinates by the port's rigid transform.

/// Implements [`Component`] for a struct holding a `geometry: Geometry`
/// field, using the type name as the kind.
macro_rules! impl_component {
    ($ty:ident) => {
        impl $crate::component::Component for $ty {
            fn kind(&self) -> &'static str {
                stringify!($ty)
            }

            fn geometry(&self) -> &$crate::component::Geometry {
                &self.geometry
            }
        }
    };
}

mod bend;
mod converter;
mod coupler;
mod grating;
mod metal;
mod mmi;
mod resonator;
mod spiral;
mod splitter;
mod taper;
mod waveguide;

pub use bend::{BBend, EBend, EulerSBend, SBend};
pub use converter::{
    StripSlotConverter, StripSlotConverterParams, StripSlotMmiConverter, StripSlotMmiConverterParams,
    StripSlotYConverter, StripSlotYConverterParams,
};
pub use coupler::{
    AdiabaticCoupler, AdiabaticCouplerParams, ContraDirectionalCoupler, ContraDirectionalCouplerParams,
    DirectionalCoupler, DirectionalCouplerParams, FullCoupler, FullCouplerParams,
};
pub use grating::{
    Dbr, DbrParams, FocusingGratingCoupler, FocusingGratingCouplerParams, GratingCoupler,
    GratingCouplerParams, MAX_PERIODS,
};
pub use metal::MetalRoute;
pub use mmi::{Mmi1x2, Mmi1x2Params, Mmi2x2, Mmi2x2Params};
pub use resonator::{Disk, Ring};
pub use spiral::{Spiral, SpiralParams};
pub use splitter::{SplineYSplitter, SplineYSplitterParams};
pub use taper::Taper;
pub use waveguide::Waveguide;

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::error::{require_positive, ConfigurationError, GeometryError, Result};
use crate::geometry::{Curve, LayerSpec, PathBuilder, Polygon, PolygonSet, Stroke};
use crate::math::{LocalFrame, Point2};
use crate::port::{Direction, Port, PortMap};
use crate::template::{WaveguideTemplate, WgType};

/// Finished geometry of a component: polygons plus ports, in world
/// coordinates.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    polygons: PolygonSet,
    ports: PortMap,
}

impl Geometry {
    /// Polygon set.
    #[must_use]
    pub fn polygons(&self) -> &PolygonSet {
        &self.polygons
    }

    /// Port map.
    #[must_use]
    pub fn ports(&self) -> &PortMap {
        &self.ports
    }
}

/// Common contract of every component: a polygon set and named ports.
///
/// Third-party components implement this trait to take part in chaining and
/// to be added to a [`LayoutDocument`](crate::layout::LayoutDocument).
pub trait Component {
    /// Component kind, used to name layout cells.
    fn kind(&self) -> &'static str;

    /// The finished geometry.
    fn geometry(&self) -> &Geometry;

    /// Polygon set in world coordinates.
    fn polygons(&self) -> &PolygonSet {
        self.geometry().polygons()
    }

    /// Port map in world coordinates.
    fn ports(&self) -> &PortMap {
        self.geometry().ports()
    }

    /// Looks up one port by role.
    ///
    /// # Errors
    ///
    /// Returns `PortMismatchError::UnknownRole` if the role does not exist.
    fn port(&self, role: &str) -> Result<Port> {
        self.ports().get(role)
    }
}

/// Collects polygons and ports in a component's local frame.
pub(crate) struct GeometryBuilder<'t> {
    template: &'t WaveguideTemplate,
    frame: LocalFrame,
    polygons: PolygonSet,
    ports: PortMap,
}

impl<'t> GeometryBuilder<'t> {
    /// Builder whose local frame is anchored at `port`, mirrored when
    /// `mirrored` is set.
    pub(crate) fn at_port(template: &'t WaveguideTemplate, port: &Port, mirrored: bool) -> Self {
        Self::new(template, LocalFrame::new(port.position, port.angle(), mirrored))
    }

    /// Builder working directly in world coordinates.
    pub(crate) fn world(template: &'t WaveguideTemplate) -> Self {
        Self::new(template, LocalFrame::identity())
    }

    fn new(template: &'t WaveguideTemplate, frame: LocalFrame) -> Self {
        Self {
            template,
            frame,
            polygons: PolygonSet::new(),
            ports: PortMap::new(),
        }
    }

    fn push(&mut self, layer: LayerSpec, local: &[Point2]) -> Result<()> {
        let polygon = Polygon::new(layer, local)?;
        self.polygons.push(polygon.transformed(&self.frame));
        Ok(())
    }

    fn push_band<L, U>(&mut self, layer: LayerSpec, stroke: &Stroke, lower: L, upper: U) -> Result<()>
    where
        L: Fn(f64) -> f64,
        U: Fn(f64) -> f64,
    {
        for piece in stroke.band_pieces(lower, upper)? {
            self.push(layer, &piece)?;
        }
        Ok(())
    }

    /// Emits the core (strip or slot rails) and cladding of a stroke.
    pub(crate) fn stroke(&mut self, stroke: &Stroke) -> Result<()> {
        self.stroke_core(stroke)?;
        self.stroke_cladding(stroke)
    }

    /// Emits only the core of a stroke.
    pub(crate) fn stroke_core(&mut self, stroke: &Stroke) -> Result<()> {
        let template = self.template;
        match template.wg_type() {
            WgType::Strip => {
                self.push_band(template.wg_layer(), stroke, |w| -0.5 * w, |w| 0.5 * w)?;
            }
            WgType::Slot => {
                let half_slot = 0.5 * template.slot();
                if stroke.min_width() <= template.slot() {
                    return Err(GeometryError::Degenerate(format!(
                        "slot rails vanish: width {:.4} is not wider than the slot {:.4}",
                        stroke.min_width(),
                        template.slot()
                    ))
                    .into());
                }
                self.push_band(template.wg_layer(), stroke, |_| half_slot, |w| 0.5 * w)?;
                self.push_band(template.wg_layer(), stroke, |w| -0.5 * w, |_| -half_slot)?;
            }
        }
        Ok(())
    }

    /// Emits only the cladding of a stroke (no-op for zero cladding width).
    pub(crate) fn stroke_cladding(&mut self, stroke: &Stroke) -> Result<()> {
        let clad = self.template.clad_width();
        if clad <= 0.0 {
            return Ok(());
        }
        let layer = self.template.clad_layer();
        self.push_band(layer, stroke, |w| -(0.5 * w + clad), |w| 0.5 * w + clad)
    }

    /// Emits a raw core polygon given in local coordinates.
    pub(crate) fn core_polygon(&mut self, local: &[Point2]) -> Result<()> {
        self.push(self.template.wg_layer(), local)
    }

    /// Emits a raw cladding polygon given in local coordinates.
    pub(crate) fn clad_polygon(&mut self, local: &[Point2]) -> Result<()> {
        if self.template.clad_width() <= 0.0 {
            return Ok(());
        }
        self.push(self.template.clad_layer(), local)
    }

    /// Emits an axis-aligned core rectangle `[x0, x1] × [y0, y1]`.
    pub(crate) fn core_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<()> {
        self.core_polygon(&rect(x0, y0, x1, y1))
    }

    /// Emits an axis-aligned cladding rectangle `[x0, x1] × [y0, y1]`.
    pub(crate) fn clad_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<()> {
        self.clad_polygon(&rect(x0, y0, x1, y1))
    }

    /// Maps a local point to world coordinates.
    pub(crate) fn to_world(&self, local: &Point2) -> Point2 {
        self.frame.point(local)
    }

    /// Registers a port given by a local anchor and heading.
    pub(crate) fn port(&mut self, role: &str, local: Point2, local_angle: f64, width: f64) {
        let port = Port::new(
            self.frame.point(&local),
            Direction::from_radians(self.frame.angle(local_angle)),
        )
        .with_width(width);
        self.ports.insert(role, port);
    }

    /// Registers a port verbatim (already in world coordinates).
    pub(crate) fn world_port(&mut self, role: &str, port: Port) {
        self.ports.insert(role, port);
    }

    /// Finishes the geometry.
    pub(crate) fn finish(self, kind: &'static str) -> Geometry {
        debug!(
            kind,
            polygons = self.polygons.len(),
            ports = self.ports.len(),
            "component built"
        );
        Geometry {
            polygons: self.polygons,
            ports: self.ports,
        }
    }
}

/// The input port as stored on a chained component: the supplied value with
/// the template width filled in when none was declared.
pub(crate) fn input_port(template: &WaveguideTemplate, port: Port) -> Result<Port> {
    template.check_port(&port)?;
    Ok(Port {
        width: port.width.or(Some(template.wg_width())),
        ..port
    })
}

/// Fails with `GeometryError::RadiusViolation` if `curve` bends tighter than
/// the template allows.
pub(crate) fn check_radius(template: &WaveguideTemplate, curve: &dyn Curve) -> Result<()> {
    let radius = curve.min_radius();
    if radius < template.bend_radius() * (1.0 - 1e-9) {
        return Err(GeometryError::RadiusViolation {
            radius,
            bend_radius: template.bend_radius(),
        }
        .into());
    }
    Ok(())
}

/// Validates the turn of each arc in an arc S-bend, `(0, PI/2]`.
pub(crate) fn check_bend_angle(angle: f64) -> Result<f64> {
    let angle = require_positive("angle", angle)?;
    if angle > FRAC_PI_2 {
        return Err(ConfigurationError::out_of_range("angle", angle, "must not exceed PI/2").into());
    }
    Ok(angle)
}

/// Lateral and forward extent of one arc S-bend (two opposite template
/// bends of `angle`).
pub(crate) fn arc_s_bend_extent(template: &WaveguideTemplate, angle: f64) -> (f64, f64) {
    let mut trial = PathBuilder::new(Point2::origin(), 0.0, 1.0, template.curve_tolerance());
    trial
        .curve(template.bend(angle).as_ref())
        .curve(template.bend(-angle).as_ref());
    let end = trial.position();
    (end.x, end.y.abs())
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point2; 4] {
    [
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

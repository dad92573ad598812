//! Waveguide cross-section and fabrication templates.

use serde::{Deserialize, Serialize};

use crate::error::{
    require_non_negative, require_positive, ConfigurationError, PicError, PortMismatchError, Result,
};
use crate::geometry::curve::{CircularArc, Curve, EulerBend};
use crate::geometry::LayerSpec;
use crate::math::LENGTH_TOLERANCE;
use crate::port::Port;

/// Cross-section family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WgType {
    /// Single solid core.
    #[default]
    Strip,
    /// Two rails separated by a narrow slot.
    Slot,
}

/// Resist polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resist {
    #[default]
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

/// Fabrication process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Fab {
    #[default]
    Etch,
    Liftoff,
}

/// Curve family used for bends in routed waveguides and couplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BendStyle {
    #[default]
    Circular,
    Euler,
}

/// Which drawn region the final mask exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposedRegion {
    /// The waveguide-layer polygons are written.
    Core,
    /// The cladding trench (cladding minus core) is written.
    Cladding,
}

/// Recognised template options. Every field is optional; missing fields take
/// the defaults documented on [`WaveguideTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateOptions {
    pub wg_width: Option<f64>,
    pub clad_width: Option<f64>,
    pub bend_radius: Option<f64>,
    pub wg_type: Option<WgType>,
    pub slot: Option<f64>,
    pub resist: Option<Resist>,
    pub fab: Option<Fab>,
    pub wg_layer: Option<u16>,
    pub wg_datatype: Option<u16>,
    pub clad_layer: Option<u16>,
    pub clad_datatype: Option<u16>,
    pub bend_style: Option<BendStyle>,
    pub curve_tolerance: Option<f64>,
}

impl TemplateOptions {
    /// Creates an empty option set (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON object.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::UnknownOption` for an unrecognised key
    /// - `ConfigurationError::Invalid` for malformed JSON or mistyped values
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(json_error)
    }

    #[must_use]
    pub fn with_wg_width(mut self, width: f64) -> Self {
        self.wg_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_clad_width(mut self, width: f64) -> Self {
        self.clad_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_bend_radius(mut self, radius: f64) -> Self {
        self.bend_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_wg_type(mut self, wg_type: WgType) -> Self {
        self.wg_type = Some(wg_type);
        self
    }

    #[must_use]
    pub fn with_slot(mut self, slot: f64) -> Self {
        self.slot = Some(slot);
        self
    }

    #[must_use]
    pub fn with_resist(mut self, resist: Resist) -> Self {
        self.resist = Some(resist);
        self
    }

    #[must_use]
    pub fn with_fab(mut self, fab: Fab) -> Self {
        self.fab = Some(fab);
        self
    }

    #[must_use]
    pub fn with_wg_layer(mut self, layer: LayerSpec) -> Self {
        self.wg_layer = Some(layer.layer);
        self.wg_datatype = Some(layer.datatype);
        self
    }

    #[must_use]
    pub fn with_clad_layer(mut self, layer: LayerSpec) -> Self {
        self.clad_layer = Some(layer.layer);
        self.clad_datatype = Some(layer.datatype);
        self
    }

    #[must_use]
    pub fn with_bend_style(mut self, style: BendStyle) -> Self {
        self.bend_style = Some(style);
        self
    }

    #[must_use]
    pub fn with_curve_tolerance(mut self, tolerance: f64) -> Self {
        self.curve_tolerance = Some(tolerance);
        self
    }
}

/// Immutable cross-section and fabrication configuration shared by every
/// component built with it.
///
/// Defaults: `wg_width = 2.0`, `clad_width = 10.0`, `bend_radius = 50.0`,
/// strip cross-section, `slot = 0.1`, positive resist, etch, waveguide layer
/// 1/0, cladding layer 2/0, circular bends, curve tolerance `5e-4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveguideTemplate {
    wg_width: f64,
    clad_width: f64,
    bend_radius: f64,
    wg_type: WgType,
    slot: f64,
    resist: Resist,
    fab: Fab,
    wg_layer: LayerSpec,
    clad_layer: LayerSpec,
    bend_style: BendStyle,
    curve_tolerance: f64,
}

impl WaveguideTemplate {
    pub const DEFAULT_WG_WIDTH: f64 = 2.0;
    pub const DEFAULT_CLAD_WIDTH: f64 = 10.0;
    pub const DEFAULT_BEND_RADIUS: f64 = 50.0;
    pub const DEFAULT_SLOT: f64 = 0.1;
    pub const DEFAULT_CURVE_TOLERANCE: f64 = 5e-4;

    /// Builds a template from options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::OutOfRange` when `bend_radius <= 0`,
    /// `wg_width <= 0`, `clad_width < 0`, `curve_tolerance <= 0`, or (slot
    /// templates) the slot is not strictly between 0 and `wg_width`.
    pub fn new(options: &TemplateOptions) -> Result<Self> {
        let wg_width = require_positive("wg_width", options.wg_width.unwrap_or(Self::DEFAULT_WG_WIDTH))?;
        let bend_radius = require_positive(
            "bend_radius",
            options.bend_radius.unwrap_or(Self::DEFAULT_BEND_RADIUS),
        )?;
        let clad_width = require_non_negative(
            "clad_width",
            options.clad_width.unwrap_or(Self::DEFAULT_CLAD_WIDTH),
        )?;
        let curve_tolerance = require_positive(
            "curve_tolerance",
            options.curve_tolerance.unwrap_or(Self::DEFAULT_CURVE_TOLERANCE),
        )?;
        let wg_type = options.wg_type.unwrap_or_default();
        let slot = options.slot.unwrap_or(Self::DEFAULT_SLOT);
        if wg_type == WgType::Slot {
            require_positive("slot", slot)?;
            if slot >= wg_width {
                return Err(ConfigurationError::out_of_range(
                    "slot",
                    slot,
                    "must be narrower than wg_width",
                )
                .into());
            }
        }

        Ok(Self {
            wg_width,
            clad_width,
            bend_radius,
            wg_type,
            slot,
            resist: options.resist.unwrap_or_default(),
            fab: options.fab.unwrap_or_default(),
            wg_layer: LayerSpec::new(
                options.wg_layer.unwrap_or(1),
                options.wg_datatype.unwrap_or(0),
            ),
            clad_layer: LayerSpec::new(
                options.clad_layer.unwrap_or(2),
                options.clad_datatype.unwrap_or(0),
            ),
            bend_style: options.bend_style.unwrap_or_default(),
            curve_tolerance,
        })
    }

    /// Parses options from JSON and builds a template.
    ///
    /// # Errors
    ///
    /// See [`TemplateOptions::from_json`] and [`WaveguideTemplate::new`].
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(&TemplateOptions::from_json(json)?)
    }

    #[must_use]
    pub fn wg_width(&self) -> f64 {
        self.wg_width
    }

    #[must_use]
    pub fn clad_width(&self) -> f64 {
        self.clad_width
    }

    #[must_use]
    pub fn bend_radius(&self) -> f64 {
        self.bend_radius
    }

    #[must_use]
    pub fn wg_type(&self) -> WgType {
        self.wg_type
    }

    /// Slot width (meaningful for [`WgType::Slot`] only).
    #[must_use]
    pub fn slot(&self) -> f64 {
        self.slot
    }

    #[must_use]
    pub fn resist(&self) -> Resist {
        self.resist
    }

    #[must_use]
    pub fn fab(&self) -> Fab {
        self.fab
    }

    #[must_use]
    pub fn wg_layer(&self) -> LayerSpec {
        self.wg_layer
    }

    #[must_use]
    pub fn clad_layer(&self) -> LayerSpec {
        self.clad_layer
    }

    #[must_use]
    pub fn bend_style(&self) -> BendStyle {
        self.bend_style
    }

    #[must_use]
    pub fn curve_tolerance(&self) -> f64 {
        self.curve_tolerance
    }

    /// Region written by the mask for this resist/process combination.
    #[must_use]
    pub fn exposed_region(&self) -> ExposedRegion {
        exposed_region(self.resist, self.fab)
    }

    /// A bend of the template's style and radius turning by `turn`.
    #[must_use]
    pub fn bend(&self, turn: f64) -> Box<dyn Curve> {
        match self.bend_style {
            BendStyle::Circular => Box::new(CircularArc::new(self.bend_radius, turn)),
            BendStyle::Euler => Box::new(EulerBend::new(self.bend_radius, turn)),
        }
    }

    /// Checks that a supplied input port fits this cross-section.
    ///
    /// Ports without a declared width are accepted.
    ///
    /// # Errors
    ///
    /// Returns `PortMismatchError::Width` if the declared width differs from
    /// `wg_width`.
    pub fn check_port(&self, port: &Port) -> Result<()> {
        match port.width {
            Some(found) if (found - self.wg_width).abs() > LENGTH_TOLERANCE => {
                Err(PortMismatchError::Width {
                    expected: self.wg_width,
                    found,
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}

impl Default for WaveguideTemplate {
    fn default() -> Self {
        Self {
            wg_width: Self::DEFAULT_WG_WIDTH,
            clad_width: Self::DEFAULT_CLAD_WIDTH,
            bend_radius: Self::DEFAULT_BEND_RADIUS,
            wg_type: WgType::Strip,
            slot: Self::DEFAULT_SLOT,
            resist: Resist::Positive,
            fab: Fab::Etch,
            wg_layer: LayerSpec::new(1, 0),
            clad_layer: LayerSpec::new(2, 0),
            bend_style: BendStyle::Circular,
            curve_tolerance: Self::DEFAULT_CURVE_TOLERANCE,
        }
    }
}

/// Maps a serde error onto the configuration error taxonomy.
fn json_error(e: serde_json::Error) -> PicError {
    let message = e.to_string();
    match message.strip_prefix("unknown field `") {
        Some(rest) => {
            let name = rest.split('`').next().unwrap_or(rest);
            ConfigurationError::UnknownOption(name.to_owned()).into()
        }
        None => ConfigurationError::Invalid(message).into(),
    }
}

fn exposed_region(resist: Resist, fab: Fab) -> ExposedRegion {
    match (resist, fab) {
        (Resist::Positive, Fab::Etch) | (Resist::Negative, Fab::Liftoff) => ExposedRegion::Cladding,
        (Resist::Negative, Fab::Etch) | (Resist::Positive, Fab::Liftoff) => ExposedRegion::Core,
    }
}

/// Cross-section of metal wires and pads.
///
/// Defaults: width 20, cladding 20 on each side, sharp mitered corners
/// (bend radius 0), metal on layer 11/0 and cladding on 12/0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetalTemplate {
    width: f64,
    clad_width: f64,
    bend_radius: f64,
    resist: Resist,
    fab: Fab,
    metal_layer: LayerSpec,
    clad_layer: LayerSpec,
}

impl MetalTemplate {
    pub const DEFAULT_WIDTH: f64 = 20.0;
    pub const DEFAULT_CLAD_WIDTH: f64 = 20.0;

    /// A metal template with the given wire and cladding widths.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::OutOfRange` for a non-positive width or a
    /// negative cladding width.
    pub fn new(width: f64, clad_width: f64) -> Result<Self> {
        Ok(Self {
            width: require_positive("width", width)?,
            clad_width: require_non_negative("clad_width", clad_width)?,
            ..Self::default()
        })
    }

    /// Parses a metal template from a JSON object; missing keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::UnknownOption` for an unrecognised key
    /// - `ConfigurationError::Invalid` for malformed JSON
    /// - `ConfigurationError::OutOfRange` for invalid dimensions
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Self = serde_json::from_str(json).map_err(json_error)?;
        Self::new(parsed.width, parsed.clad_width)?.with_bend_radius(parsed.bend_radius).map(|t| Self {
            resist: parsed.resist,
            fab: parsed.fab,
            metal_layer: parsed.metal_layer,
            clad_layer: parsed.clad_layer,
            ..t
        })
    }

    /// Rounds route corners with arcs of `radius`; 0 keeps mitered corners.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::OutOfRange` for a negative radius.
    pub fn with_bend_radius(mut self, radius: f64) -> Result<Self> {
        self.bend_radius = require_non_negative("bend_radius", radius)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_resist(mut self, resist: Resist) -> Self {
        self.resist = resist;
        self
    }

    #[must_use]
    pub fn with_fab(mut self, fab: Fab) -> Self {
        self.fab = fab;
        self
    }

    #[must_use]
    pub fn with_layers(mut self, metal: LayerSpec, clad: LayerSpec) -> Self {
        self.metal_layer = metal;
        self.clad_layer = clad;
        self
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn clad_width(&self) -> f64 {
        self.clad_width
    }

    #[must_use]
    pub fn bend_radius(&self) -> f64 {
        self.bend_radius
    }

    #[must_use]
    pub fn resist(&self) -> Resist {
        self.resist
    }

    #[must_use]
    pub fn fab(&self) -> Fab {
        self.fab
    }

    #[must_use]
    pub fn metal_layer(&self) -> LayerSpec {
        self.metal_layer
    }

    #[must_use]
    pub fn clad_layer(&self) -> LayerSpec {
        self.clad_layer
    }

    /// Region written by the mask for this resist/process combination.
    #[must_use]
    pub fn exposed_region(&self) -> ExposedRegion {
        exposed_region(self.resist, self.fab)
    }
}

impl Default for MetalTemplate {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            clad_width: Self::DEFAULT_CLAD_WIDTH,
            bend_radius: 0.0,
            resist: Resist::Positive,
            fab: Fab::Etch,
            metal_layer: LayerSpec::new(11, 0),
            clad_layer: LayerSpec::new(12, 0),
        }
    }
}

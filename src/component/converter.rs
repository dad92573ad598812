//! Strip-to-slot mode converters.
//!
//! Each converter takes a strip template for its input and a slot template
//! for its output. Polygons go on the strip template's layers; the output
//! port carries the slot width so a slot waveguide can continue from it.

use super::{input_port, Geometry, GeometryBuilder};
use crate::error::{require_non_negative, require_positive, ConfigurationError, GeometryError, Result};
use crate::math::Point2;
use crate::port::{role, Port};
use crate::template::{WaveguideTemplate, WgType};

fn check_pair(strip: &WaveguideTemplate, slot: &WaveguideTemplate) -> Result<()> {
    if strip.wg_type() != WgType::Strip {
        return Err(ConfigurationError::Invalid(
            "the input template of a strip-slot converter must be a strip template".to_owned(),
        )
        .into());
    }
    if slot.wg_type() != WgType::Slot {
        return Err(ConfigurationError::Invalid(
            "the output template of a strip-slot converter must be a slot template".to_owned(),
        )
        .into());
    }
    Ok(())
}

/// Registers the shared ports and finishes the converter.
fn finish(
    mut builder: GeometryBuilder<'_>,
    input: Port,
    end_x: f64,
    slot: &WaveguideTemplate,
    kind: &'static str,
) -> Geometry {
    builder.world_port(role::INPUT, input);
    builder.port(role::OUTPUT, Point2::new(end_x, 0.0), 0.0, slot.wg_width());
    builder.finish(kind)
}

/// Parameters of a [`StripSlotConverter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripSlotConverterParams {
    /// Length over which the second rail converges onto the slot.
    pub length1: f64,
    /// Length over which the strip narrows to a rail.
    pub length2: f64,
    /// Width of the second rail where it starts.
    pub start_rail_width: f64,
    /// Width of the strip at the end of the first region.
    pub end_strip_width: f64,
    /// Gap between the strip and the second rail where the rail starts.
    pub d: f64,
}

impl StripSlotConverterParams {
    #[must_use]
    pub fn new(length1: f64, length2: f64, start_rail_width: f64, end_strip_width: f64, d: f64) -> Self {
        Self {
            length1,
            length2,
            start_rail_width,
            end_strip_width,
            d,
        }
    }
}

/// Two-stage converter. Over `length1` the strip slides down onto the
/// lower rail position while a second rail, starting `d` above it,
/// converges onto the upper rail position. Over `length2` the strip then
/// narrows to the rail width.
#[derive(Debug, Clone)]
pub struct StripSlotConverter {
    geometry: Geometry,
}

impl StripSlotConverter {
    /// Builds the converter with its input on `port`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` unless `strip` and `slot` are strip
    ///   and slot templates
    /// - `ConfigurationError::OutOfRange` for non-positive lengths or
    ///   widths, or a negative `d`
    /// - `GeometryError::Overlap` when the strip would reach into the upper
    ///   rail at the end of the first region
    /// - `PortMismatchError::Width` if `port` declares a width other than
    ///   the strip width
    pub fn new(
        strip: &WaveguideTemplate,
        slot: &WaveguideTemplate,
        params: &StripSlotConverterParams,
        port: Port,
    ) -> Result<Self> {
        check_pair(strip, slot)?;
        let l1 = require_positive("length1", params.length1)?;
        let l2 = require_positive("length2", params.length2)?;
        let rail = require_positive("start_rail_width", params.start_rail_width)?;
        let end_strip = require_positive("end_strip_width", params.end_strip_width)?;
        let d = require_non_negative("d", params.d)?;
        let (ws, w, gap) = (strip.wg_width(), slot.wg_width(), slot.slot());
        if end_strip - 0.5 * w > 0.5 * gap {
            return Err(GeometryError::Overlap(format!(
                "strip of width {end_strip:.4} reaches into the upper rail"
            ))
            .into());
        }
        let input = input_port(strip, port)?;
        let end_x = l1 + l2;

        let lower = [
            Point2::new(0.0, -0.5 * ws),
            Point2::new(l1, -0.5 * w),
            Point2::new(end_x, -0.5 * w),
            Point2::new(end_x, -0.5 * gap),
            Point2::new(l1, end_strip - 0.5 * w),
            Point2::new(0.0, 0.5 * ws),
        ];
        let rail_y = 0.5 * ws + d;
        let upper = [
            Point2::new(0.0, rail_y),
            Point2::new(l1, 0.5 * gap),
            Point2::new(end_x, 0.5 * gap),
            Point2::new(end_x, 0.5 * w),
            Point2::new(l1, 0.5 * w),
            Point2::new(0.0, rail_y + rail),
        ];
        let c = strip.clad_width();
        let cladding = [
            Point2::new(0.0, -(0.5 * ws + c)),
            Point2::new(l1, -(0.5 * w + c)),
            Point2::new(end_x, -(0.5 * w + c)),
            Point2::new(end_x, 0.5 * w + c),
            Point2::new(l1, 0.5 * w + c),
            Point2::new(0.0, rail_y + rail + c),
        ];

        let mut builder = GeometryBuilder::at_port(strip, &input, false);
        builder.core_polygon(&lower)?;
        builder.core_polygon(&upper)?;
        builder.clad_polygon(&cladding)?;
        Ok(Self {
            geometry: finish(builder, input, end_x, slot, "StripSlotConverter"),
        })
    }
}

impl_component!(StripSlotConverter);

/// Parameters of a [`StripSlotYConverter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripSlotYConverterParams {
    pub length: f64,
    /// Width of the strip tip where the rails reach the slot.
    pub end_strip_width: f64,
    /// Gap between the strip edge and each rail where the rails begin
    /// (default 0).
    pub start_gap: f64,
}

impl StripSlotYConverterParams {
    #[must_use]
    pub fn new(length: f64, end_strip_width: f64) -> Self {
        Self {
            length,
            end_strip_width,
            start_gap: 0.0,
        }
    }

    #[must_use]
    pub fn with_start_gap(mut self, gap: f64) -> Self {
        self.start_gap = gap;
        self
    }
}

/// Y-junction converter: the strip tapers to a narrow tip while two rails
/// grow from zero width along its sides and close in onto the slot.
#[derive(Debug, Clone)]
pub struct StripSlotYConverter {
    geometry: Geometry,
}

impl StripSlotYConverter {
    /// Builds the converter with its input on `port`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` unless `strip` and `slot` are strip
    ///   and slot templates
    /// - `ConfigurationError::OutOfRange` for a non-positive length or a
    ///   negative tip width or gap
    /// - `GeometryError::Overlap` when the tip is wider than the slot
    /// - `PortMismatchError::Width` if `port` declares a width other than
    ///   the strip width
    pub fn new(
        strip: &WaveguideTemplate,
        slot: &WaveguideTemplate,
        params: &StripSlotYConverterParams,
        port: Port,
    ) -> Result<Self> {
        check_pair(strip, slot)?;
        let length = require_positive("length", params.length)?;
        let tip = require_non_negative("end_strip_width", params.end_strip_width)?;
        let start_gap = require_non_negative("start_gap", params.start_gap)?;
        let (ws, w, gap) = (strip.wg_width(), slot.wg_width(), slot.slot());
        if tip > gap {
            return Err(GeometryError::Overlap(format!(
                "strip tip {tip:.4} is wider than the slot {gap:.4}"
            ))
            .into());
        }
        let input = input_port(strip, port)?;

        let mut builder = GeometryBuilder::at_port(strip, &input, false);
        builder.core_polygon(&[
            Point2::new(0.0, -0.5 * ws),
            Point2::new(length, -0.5 * tip),
            Point2::new(length, 0.5 * tip),
            Point2::new(0.0, 0.5 * ws),
        ])?;
        let rail_start = 0.5 * ws + start_gap;
        for side in [1.0, -1.0] {
            builder.core_polygon(&[
                Point2::new(0.0, side * rail_start),
                Point2::new(length, side * 0.5 * gap),
                Point2::new(length, side * 0.5 * w),
            ])?;
        }
        let c = strip.clad_width();
        builder.clad_polygon(&[
            Point2::new(0.0, -(rail_start + c)),
            Point2::new(length, -(0.5 * w + c)),
            Point2::new(length, 0.5 * w + c),
            Point2::new(0.0, rail_start + c),
        ])?;
        Ok(Self {
            geometry: finish(builder, input, length, slot, "StripSlotYConverter"),
        })
    }
}

impl_component!(StripSlotYConverter);

/// Parameters of a [`StripSlotMmiConverter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripSlotMmiConverterParams {
    /// Width of the multimode section.
    pub w_mmi: f64,
    /// Length of the multimode section.
    pub l_mmi: f64,
    /// Length of the rail tapers after the multimode section.
    pub length: f64,
}

impl StripSlotMmiConverterParams {
    #[must_use]
    pub fn new(w_mmi: f64, l_mmi: f64, length: f64) -> Self {
        Self { w_mmi, l_mmi, length }
    }
}

/// Converter through a short multimode section that splits into the two
/// rails, each tapering down to the slot rail width.
#[derive(Debug, Clone)]
pub struct StripSlotMmiConverter {
    geometry: Geometry,
}

impl StripSlotMmiConverter {
    /// Builds the converter with its input on `port`.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::Invalid` unless `strip` and `slot` are strip
    ///   and slot templates
    /// - `ConfigurationError::OutOfRange` for non-positive dimensions or a
    ///   multimode section no wider than the slot
    /// - `PortMismatchError::Width` if `port` declares a width other than
    ///   the strip width
    pub fn new(
        strip: &WaveguideTemplate,
        slot: &WaveguideTemplate,
        params: &StripSlotMmiConverterParams,
        port: Port,
    ) -> Result<Self> {
        check_pair(strip, slot)?;
        let w_mmi = require_positive("w_mmi", params.w_mmi)?;
        let l_mmi = require_positive("l_mmi", params.l_mmi)?;
        let length = require_positive("length", params.length)?;
        let (ws, w, gap) = (strip.wg_width(), slot.wg_width(), slot.slot());
        if w_mmi <= gap {
            return Err(ConfigurationError::out_of_range(
                "w_mmi",
                w_mmi,
                "must be wider than the slot",
            )
            .into());
        }
        let input = input_port(strip, port)?;
        let end_x = l_mmi + length;
        let half = 0.5 * w_mmi;

        let mut builder = GeometryBuilder::at_port(strip, &input, false);
        builder.core_rect(0.0, -half, l_mmi, half)?;
        for side in [1.0, -1.0] {
            builder.core_polygon(&[
                Point2::new(l_mmi, side * 0.5 * gap),
                Point2::new(end_x, side * 0.5 * gap),
                Point2::new(end_x, side * 0.5 * w),
                Point2::new(l_mmi, side * half),
            ])?;
        }
        let c = strip.clad_width();
        let body = half.max(0.5 * ws) + c;
        builder.clad_polygon(&[
            Point2::new(0.0, -body),
            Point2::new(l_mmi, -body),
            Point2::new(end_x, -(0.5 * w + c)),
            Point2::new(end_x, 0.5 * w + c),
            Point2::new(l_mmi, body),
            Point2::new(0.0, body),
        ])?;
        Ok(Self {
            geometry: finish(builder, input, end_x, slot, "StripSlotMmiConverter"),
        })
    }
}

impl_component!(StripSlotMmiConverter);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::{Component, Waveguide};
    use crate::error::PicError;
    use crate::port::Direction;
    use crate::template::TemplateOptions;
    use approx::assert_abs_diff_eq;

    fn strip() -> WaveguideTemplate {
        WaveguideTemplate::new(&TemplateOptions::new().with_wg_width(0.7)).unwrap()
    }

    fn slot() -> WaveguideTemplate {
        WaveguideTemplate::new(
            &TemplateOptions::new()
                .with_wg_type(WgType::Slot)
                .with_wg_width(0.7)
                .with_slot(0.2),
        )
        .unwrap()
    }

    fn east() -> Port {
        Port::at(0.0, 0.0, Direction::East)
    }

    #[test]
    fn two_stage_converter_areas() {
        let (strip, slot) = (strip(), slot());
        let params = StripSlotConverterParams::new(15.0, 15.0, 0.1, 0.4, 1.0);
        let conv = StripSlotConverter::new(&strip, &slot, &params, east()).unwrap();
        // strip 0.7 -> 0.4 then 0.4 -> 0.25; rail 0.1 -> 0.25 then 0.25
        let lower = 0.5 * (0.7 + 0.4) * 15.0 + 0.5 * (0.4 + 0.25) * 15.0;
        let upper = 0.5 * (0.1 + 0.25) * 15.0 + 0.25 * 15.0;
        assert_abs_diff_eq!(conv.polygons().area_on(strip.wg_layer()), lower + upper, epsilon = 1e-9);
        let clad = 0.5 * (21.8 + 20.7) * 15.0 + 20.7 * 15.0;
        assert_abs_diff_eq!(conv.polygons().area_on(strip.clad_layer()), clad, epsilon = 1e-9);
        let out = conv.port(role::OUTPUT).unwrap();
        assert_eq!(out.position, Point2::new(30.0, 0.0));
        assert_eq!(out.width, Some(0.7));
    }

    #[test]
    fn slot_waveguide_continues_from_converter() {
        let (strip, slot) = (strip(), slot());
        let y = StripSlotYConverter::new(&strip, &slot, &StripSlotYConverterParams::new(10.0, 0.2), east())
            .unwrap();
        let out = y.port(role::OUTPUT).unwrap();
        let wg = Waveguide::new(&slot, &[out.position, Point2::new(110.0, 0.0)]).unwrap();
        slot.check_port(&out).unwrap();
        assert_eq!(wg.polygons().len(), 3);
        // tip taper plus two rails growing from zero to 0.25
        let core = 0.5 * (0.7 + 0.2) * 10.0 + 2.0 * 0.5 * 0.25 * 10.0;
        assert_abs_diff_eq!(y.polygons().area_on(strip.wg_layer()), core, epsilon = 1e-9);
    }

    #[test]
    fn mmi_converter_areas() {
        let (strip, slot) = (strip(), slot());
        let conv = StripSlotMmiConverter::new(
            &strip,
            &slot,
            &StripSlotMmiConverterParams::new(2.5, 6.0, 20.0),
            east(),
        )
        .unwrap();
        // body plus two rails tapering 1.15 -> 0.25
        let core = 2.5 * 6.0 + 2.0 * 0.5 * (1.15 + 0.25) * 20.0;
        assert_abs_diff_eq!(conv.polygons().area_on(strip.wg_layer()), core, epsilon = 1e-9);
        assert_eq!(conv.port(role::OUTPUT).unwrap().position, Point2::new(26.0, 0.0));
    }

    #[test]
    fn converters_validate_templates_and_overlap() {
        let (strip, slot) = (strip(), slot());
        let swapped = StripSlotYConverter::new(&slot, &strip, &StripSlotYConverterParams::new(10.0, 0.2), east());
        assert!(matches!(swapped, Err(PicError::Configuration(ConfigurationError::Invalid(_)))));
        let wide_tip = StripSlotYConverter::new(&strip, &slot, &StripSlotYConverterParams::new(10.0, 0.3), east());
        assert!(matches!(wide_tip, Err(PicError::Geometry(GeometryError::Overlap(_)))));
        let wide_strip = StripSlotConverterParams::new(15.0, 15.0, 0.1, 0.6, 1.0);
        assert!(StripSlotConverter::new(&strip, &slot, &wide_strip, east()).is_err());
        let foreign = Port::at(0.0, 0.0, Direction::East).with_width(0.7 + 0.1);
        assert!(matches!(
            StripSlotMmiConverter::new(&strip, &slot, &StripSlotMmiConverterParams::new(2.5, 6.0, 20.0), foreign),
            Err(PicError::PortMismatch(_))
        ));
    }
}

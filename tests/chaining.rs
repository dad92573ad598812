//! Port-chaining scenarios across several component kinds.

#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_abs_diff_eq;
use picforge::component::{
    DirectionalCoupler, DirectionalCouplerParams, EBend, GratingCoupler, GratingCouplerParams,
    Mmi1x2, Mmi1x2Params, SBend, Taper, Waveguide,
};
use picforge::error::{GeometryError, PortMismatchError};
use picforge::geometry::{Curve, EulerBend};
use picforge::math::Point2;
use picforge::port::role;
use picforge::{
    Component, Direction, LayoutDocument, Parity, PicError, Port, PortMap, TemplateOptions,
    WaveguideTemplate,
};

#[test]
fn coupler_chains_from_upstream_output() {
    let t = WaveguideTemplate::default();
    let params = DirectionalCouplerParams::new(10.0, 0.5);
    let dc1 = DirectionalCoupler::new(&t, &params, Port::at(0.0, 0.0, Direction::East)).unwrap();
    let upstream = dc1.port(role::OUTPUT_TOP).unwrap();
    let dc2 = DirectionalCoupler::new(&t, &params, upstream).unwrap();

    assert_eq!(dc2.port(role::INPUT_TOP).unwrap(), upstream);

    let mut doc = LayoutDocument::new("top");
    doc.add(&dc1);
    doc.add(&dc2);
    assert_eq!(doc.references().len(), 2);
    assert_abs_diff_eq!(doc.area(), 2.0 * dc1.polygons().area(), epsilon = 1e-6);
}

#[test]
fn parity_swaps_sides_and_keeps_area() {
    let t = WaveguideTemplate::default();
    let port = Port::at(0.0, 0.0, Direction::East);
    let pos = DirectionalCoupler::new(&t, &DirectionalCouplerParams::new(10.0, 0.5), port).unwrap();
    let neg = DirectionalCoupler::new(
        &t,
        &DirectionalCouplerParams::new(10.0, 0.5).with_parity(Parity::Negative),
        port,
    )
    .unwrap();

    let pos_bot = pos.port(role::INPUT_BOT).unwrap();
    let neg_bot = neg.port(role::INPUT_BOT).unwrap();
    assert!(pos_bot.position.y < 0.0);
    assert_abs_diff_eq!(neg_bot.position.y, -pos_bot.position.y, epsilon = 1e-9);
    assert_abs_diff_eq!(pos.polygons().area(), neg.polygons().area(), epsilon = 1e-6);
}

#[test]
fn mixed_chain_keeps_ports_exact() {
    let t = WaveguideTemplate::default();
    let wg = Waveguide::new(&t, &[Point2::new(0.0, 0.0), Point2::new(200.0, 0.0), Point2::new(200.0, 200.0)])
        .unwrap();
    let out = wg.port(role::OUTPUT).unwrap();
    assert_eq!(out.direction, Direction::North);

    let bend = EBend::new(&t, -FRAC_PI_2, out).unwrap();
    let bend_out = bend.port(role::OUTPUT).unwrap();
    assert_eq!(bend.port(role::INPUT).unwrap(), out);
    assert_eq!(bend_out.direction, Direction::East);

    let sbend = SBend::new(&t, 100.0, 20.0, bend_out).unwrap();
    let s_out = sbend.port(role::OUTPUT).unwrap();
    assert_abs_diff_eq!(s_out.position.x, bend_out.position.x + 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(s_out.position.y, bend_out.position.y + 20.0, epsilon = 1e-9);

    let mmi = Mmi1x2::new(&t, &Mmi1x2Params::new(30.0, 12.0, 3.0, 10.0, 5.0), s_out).unwrap();
    assert_eq!(mmi.port(role::INPUT).unwrap(), s_out);
    let top = mmi.port(role::OUTPUT_TOP).unwrap();
    let bot = mmi.port(role::OUTPUT_BOT).unwrap();
    assert!(top.position.y > bot.position.y);

    let gc = GratingCoupler::new(&t, &GratingCouplerParams::new(20.0, 30.0, 20.0, 1.0, 0.5), top)
        .unwrap();
    assert_eq!(gc.ports().len(), 1);
}

#[test]
fn taper_off_the_start_of_a_waveguide() {
    let t = WaveguideTemplate::new(&TemplateOptions::new().with_clad_width(0.0)).unwrap();
    let wg = Waveguide::new(&t, &[Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)]).unwrap();
    let start = wg.port(role::INPUT).unwrap().reversed();
    let taper = Taper::new(&t, 40.0, t.wg_width(), start).unwrap();

    assert_abs_diff_eq!(taper.polygons().area(), t.wg_width() * 40.0, epsilon = 1e-9);
    let end = taper.port(role::OUTPUT).unwrap();
    assert_abs_diff_eq!(end.position.x, -40.0, epsilon = 1e-9);
    assert_eq!(end.direction, Direction::West);
}

#[test]
fn foreign_port_width_is_rejected() {
    let t = WaveguideTemplate::default();
    let narrow = WaveguideTemplate::new(&TemplateOptions::new().with_wg_width(0.5)).unwrap();
    let wg = Waveguide::new(&narrow, &[Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)]).unwrap();
    let err = Taper::new(&t, 10.0, 1.0, wg.port(role::OUTPUT).unwrap()).unwrap_err();
    assert!(matches!(err, PicError::PortMismatch(PortMismatchError::Width { .. })));
}

#[test]
fn tight_waveguide_corner_fails() {
    let t = WaveguideTemplate::default();
    let err = Waveguide::new(&t, &[Point2::new(0.0, 0.0), Point2::new(20.0, 0.0), Point2::new(20.0, 20.0)])
        .unwrap_err();
    assert!(matches!(err, PicError::Geometry(GeometryError::SegmentTooShort { .. })));
}

#[test]
fn euler_curvature_profile() {
    let t = WaveguideTemplate::default();
    let bend = EulerBend::new(t.bend_radius(), PI / 3.0);
    let l = bend.length();
    assert_abs_diff_eq!(bend.curvature_at(0.0), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(bend.curvature_at(l), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(bend.curvature_at(0.5 * l), 1.0 / t.bend_radius(), epsilon = 1e-12);
    assert_abs_diff_eq!(bend.min_radius(), t.bend_radius(), epsilon = 1e-9);
}

#[test]
fn port_map_serialises_as_json_object() {
    let t = WaveguideTemplate::default();
    let wg = Waveguide::new(&t, &[Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)]).unwrap();
    let json = serde_json::to_value(wg.ports()).unwrap();
    assert_eq!(json["output"]["direction"], "East");
    assert_eq!(json["output"]["position"][0], 100.0);
    assert_eq!(json["output"]["width"], 2.0);

    let back: PortMap = serde_json::from_value(json).unwrap();
    assert_eq!(&back, wg.ports());
}

#[test]
fn template_from_json() {
    let t = WaveguideTemplate::from_json(r#"{"wg_width": 0.5, "bend_radius": 20.0}"#).unwrap();
    assert_abs_diff_eq!(t.wg_width(), 0.5);
    assert_abs_diff_eq!(t.bend_radius(), 20.0);
    assert!(WaveguideTemplate::from_json(r#"{"radius": 20.0}"#).is_err());
    assert!(WaveguideTemplate::from_json(r#"{"bend_radius": 0.0}"#).is_err());
}

//! Builds a small chained circuit and prints what ended up in the layout.
//!
//! Usage:
//! ```text
//! cargo run --example chain
//! RUST_LOG=picforge=debug cargo run --example chain
//! ```

use std::f64::consts::FRAC_PI_2;

use picforge::component::{
    DirectionalCoupler, DirectionalCouplerParams, EBend, GratingCoupler, GratingCouplerParams,
    Ring, Taper, Waveguide,
};
use picforge::math::Point2;
use picforge::port::role;
use picforge::{
    Component, Direction, LayoutDocument, Parity, Port, Result, TemplateOptions, WaveguideTemplate,
};

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for picforge.
    // Override with RUST_LOG env var (e.g. RUST_LOG=picforge=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("picforge=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let template = WaveguideTemplate::new(
        &TemplateOptions::new()
            .with_wg_width(0.5)
            .with_clad_width(3.0)
            .with_bend_radius(20.0),
    )?;
    let mut doc = LayoutDocument::new("chain");

    let gc_in = GratingCoupler::new(
        &template,
        &GratingCouplerParams::new(12.0, 20.0, 25.0, 0.6, 0.5),
        Port::at(0.0, 0.0, Direction::West),
    )?;
    let wg = Waveguide::new(
        &template,
        &[
            Point2::new(0.0, 0.0),
            Point2::new(150.0, 0.0),
            Point2::new(150.0, 100.0),
        ],
    )?;
    let bend = EBend::new(&template, -FRAC_PI_2, wg.port(role::OUTPUT)?)?;
    let taper = Taper::new(&template, 10.0, 0.5, bend.port(role::OUTPUT)?)?;
    let dc = DirectionalCoupler::new(
        &template,
        &DirectionalCouplerParams::new(15.0, 0.2),
        taper.port(role::OUTPUT)?,
    )?;
    let ring = Ring::new(&template, 25.0, 0.15, Parity::Negative, dc.port(role::OUTPUT_TOP)?)?;
    let gc_out = GratingCoupler::new(
        &template,
        &GratingCouplerParams::new(12.0, 20.0, 25.0, 0.6, 0.5),
        ring.port(role::OUTPUT)?,
    )?;

    let parts: [&dyn Component; 7] = [&gc_in, &wg, &bend, &taper, &dc, &ring, &gc_out];
    for part in parts {
        doc.add(part);
    }

    for cell in doc.cells() {
        println!(
            "{:<22} polygons={:<3} area={:>10.3}",
            cell.name(),
            cell.polygons().len(),
            cell.polygons().area()
        );
        for (name, port) in cell.ports().iter() {
            println!(
                "    {name:<11} ({:>9.3}, {:>9.3}) heading {:>7.4} rad",
                port.position.x,
                port.position.y,
                port.angle()
            );
        }
    }
    println!(
        "total: {} references, {} polygons, core {:.3}, cladding {:.3}",
        doc.references().len(),
        doc.polygon_count(),
        doc.area_on(template.wg_layer()),
        doc.area_on(template.clad_layer())
    );
    Ok(())
}

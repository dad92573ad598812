pub mod curve;
mod path;
mod polygon;
mod stroke;

pub use curve::{Bezier, CircularArc, CosineSBend, Curve, EulerBend, PathSample};
pub use path::PathBuilder;
pub use polygon::{LayerSpec, Polygon, PolygonSet};
pub use stroke::Stroke;

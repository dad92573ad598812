use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{dedup_closed, is_simple, signed_area_2d};
use crate::math::{LocalFrame, Point2, TOLERANCE};

/// GDSII layer/datatype pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerSpec {
    pub layer: u16,
    pub datatype: u16,
}

impl LayerSpec {
    /// Creates a layer/datatype pair.
    #[must_use]
    pub const fn new(layer: u16, datatype: u16) -> Self {
        Self { layer, datatype }
    }
}

/// A closed, simple vertex loop on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    layer: LayerSpec,
    points: Vec<Point2>,
}

impl Polygon {
    /// Creates a polygon, dropping repeated consecutive vertices.
    ///
    /// # Errors
    ///
    /// - `GeometryError::Degenerate` if fewer than 3 distinct vertices remain
    /// - `GeometryError::SelfIntersecting` if the loop is not simple
    pub fn new(layer: LayerSpec, points: &[Point2]) -> Result<Self> {
        let points = dedup_closed(points, TOLERANCE * 1e3);
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon on layer {}/{} has fewer than 3 distinct vertices",
                layer.layer, layer.datatype
            ))
            .into());
        }
        if !is_simple(&points) {
            return Err(GeometryError::SelfIntersecting {
                layer: layer.layer,
                datatype: layer.datatype,
            }
            .into());
        }
        Ok(Self { layer, points })
    }

    /// Layer/datatype tag.
    #[must_use]
    pub fn layer(&self) -> LayerSpec {
        self.layer
    }

    /// Vertices (implicitly closed).
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Unsigned enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.points).abs()
    }

    /// Returns this polygon mapped through `frame`.
    ///
    /// Rigid transforms and mirrors preserve simplicity, so no re-validation
    /// is needed.
    #[must_use]
    pub fn transformed(&self, frame: &LocalFrame) -> Self {
        Self {
            layer: self.layer,
            points: self.points.iter().map(|p| frame.point(p)).collect(),
        }
    }
}

/// Ordered collection of polygons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    polygons: Vec<Polygon>,
}

impl PolygonSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a polygon.
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if the set holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Iterates the polygons in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    /// Sum of polygon areas (overlaps are counted once per polygon).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Sum of polygon areas on one layer.
    #[must_use]
    pub fn area_on(&self, layer: LayerSpec) -> f64 {
        self.polygons
            .iter()
            .filter(|p| p.layer == layer)
            .map(Polygon::area)
            .sum()
    }

    /// Returns this set mapped through `frame`.
    #[must_use]
    pub fn transformed(&self, frame: &LocalFrame) -> Self {
        Self {
            polygons: self.polygons.iter().map(|p| p.transformed(frame)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PolygonSet {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

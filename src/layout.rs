//! Write-only layout document collecting finished components.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::component::Component;
use crate::geometry::{LayerSpec, PolygonSet};
use crate::port::PortMap;

slotmap::new_key_type! {
    /// Unique identifier for a cell in a layout document.
    pub struct CellId;
}

/// A named polygon set, with the ports of the component it came from.
#[derive(Debug, Clone)]
pub struct Cell {
    name: String,
    polygons: PolygonSet,
    ports: PortMap,
}

impl Cell {
    /// Unique cell name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polygons of the cell.
    #[must_use]
    pub fn polygons(&self) -> &PolygonSet {
        &self.polygons
    }

    /// Ports of the originating component (empty for raw polygon cells).
    #[must_use]
    pub fn ports(&self) -> &PortMap {
        &self.ports
    }
}

/// Top-level layout: an arena of cells plus the ordered list of top-level
/// references to them.
///
/// Components never query the document; it only receives finished geometry.
#[derive(Debug, Default)]
pub struct LayoutDocument {
    name: String,
    cells: SlotMap<CellId, Cell>,
    references: Vec<CellId>,
    name_counts: BTreeMap<String, usize>,
}

impl LayoutDocument {
    /// Creates an empty document whose top cell is called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name of the top cell.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a component as a new cell named after its kind and records a
    /// top-level reference to it.
    pub fn add(&mut self, component: &dyn Component) -> CellId {
        let name = self.unique_name(component.kind());
        self.insert(Cell {
            name,
            polygons: component.polygons().clone(),
            ports: component.ports().clone(),
        })
    }

    /// Stores a raw polygon set as a new cell and records a top-level
    /// reference to it. Repeated names get a numeric suffix.
    pub fn add_polygons(&mut self, name: &str, polygons: PolygonSet) -> CellId {
        let name = self.unique_name(name);
        self.insert(Cell {
            name,
            polygons,
            ports: PortMap::new(),
        })
    }

    fn unique_name(&mut self, base: &str) -> String {
        let count = self.name_counts.entry(base.to_owned()).or_insert(0);
        *count += 1;
        format!("{base}_{count}")
    }

    fn insert(&mut self, cell: Cell) -> CellId {
        debug!(
            cell = cell.name.as_str(),
            polygons = cell.polygons.len(),
            "reference added"
        );
        let id = self.cells.insert(cell);
        self.references.push(id);
        id
    }

    /// Top-level references in insertion order.
    #[must_use]
    pub fn references(&self) -> &[CellId] {
        &self.references
    }

    /// Looks up a cell.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Referenced cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.references.iter().filter_map(|id| self.cells.get(*id))
    }

    /// Total area of all referenced polygons, each polygon counted once
    /// (overlaps are not merged).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.cells().map(|c| c.polygons.area()).sum()
    }

    /// Total referenced area on one layer.
    #[must_use]
    pub fn area_on(&self, layer: LayerSpec) -> f64 {
        self.cells().map(|c| c.polygons.area_on(layer)).sum()
    }

    /// Number of referenced polygons.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.cells().map(|c| c.polygons.len()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::{Taper, Waveguide};
    use crate::geometry::Polygon;
    use crate::math::Point2;
    use crate::port::role;
    use crate::template::WaveguideTemplate;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cells_get_unique_kind_names() {
        let t = WaveguideTemplate::default();
        let mut doc = LayoutDocument::new("top");
        let wg = Waveguide::new(&t, &[Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)]).unwrap();
        let a = doc.add(&wg);
        let b = doc.add(&wg);
        let tp = Taper::new(&t, 10.0, 1.0, wg.port(role::OUTPUT).unwrap()).unwrap();
        let c = doc.add(&tp);
        assert_eq!(doc.references(), &[a, b, c]);
        assert_eq!(doc.cell(a).unwrap().name(), "Waveguide_1");
        assert_eq!(doc.cell(b).unwrap().name(), "Waveguide_2");
        assert_eq!(doc.cell(c).unwrap().name(), "Taper_1");
        assert!(doc.cell(c).unwrap().ports().contains(role::OUTPUT));
        assert_abs_diff_eq!(doc.area(), 2.0 * 2400.0 + tp.polygons().area(), epsilon = 1e-9);
    }

    #[test]
    fn raw_polygon_cells() {
        let mut doc = LayoutDocument::new("top");
        let layer = LayerSpec::new(5, 0);
        let mut set = PolygonSet::new();
        set.push(
            Polygon::new(
                layer,
                &[Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(3.0, 2.0)],
            )
            .unwrap(),
        );
        let id = doc.add_polygons("marker", set);
        assert_eq!(doc.cell(id).unwrap().name(), "marker_1");
        assert!(doc.cell(id).unwrap().ports().is_empty());
        assert_eq!(doc.polygon_count(), 1);
        assert_abs_diff_eq!(doc.area_on(layer), 3.0, epsilon = 1e-12);
    }
}

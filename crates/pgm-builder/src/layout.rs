//! Layout engine for positioning nodes and plates.
//!
//! # Pipeline Position
//!
//! ```text
//! Pgm (declaration)
//!     ↓ structure
//! DiagramStructure
//!     ↓ layout (this module)
//! Layout
//!     ↓ render
//! Diagram
//! ```
//!
//! # Submodules
//!
//! - `nodes` - Places nodes in dependency order of their anchors
//! - `plates` - Bounds plates around their members and separates overlapping plates

mod nodes;
mod plates;

pub use plates::OverlapCase;

use log::{debug, info};

use pgm_builder_core::geometry::{Bounds, Point, Rect, Size};

use crate::{
    config::LayoutConfig,
    error::PgmError,
    pgm::{NodeId, Pgm, PlateId},
    structure::DiagramStructure,
};

/// The computed extent of one plate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateLayout {
    bounds: Bounds,
    rect: Rect,
}

impl PlateLayout {
    /// Returns the extent of the plate's member coordinates.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the rectangle drawn for the plate.
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// Coordinates computed for a [`Pgm`].
///
/// Everything is indexed by the ids of the declaration it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: Vec<Point>,
    plates: Vec<PlateLayout>,
    shape: Size,
}

impl Layout {
    /// Returns a node's coordinates.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(id.index()).copied()
    }

    /// Returns a plate's rectangle.
    pub fn plate_rect(&self, id: PlateId) -> Option<Rect> {
        self.plates.get(id.index()).map(PlateLayout::rect)
    }

    /// Returns the extent of a plate's member coordinates.
    pub fn plate_bounds(&self, id: PlateId) -> Option<Bounds> {
        self.plates.get(id.index()).map(PlateLayout::bounds)
    }

    /// Returns all plate layouts in declaration order.
    pub fn plates(&self) -> &[PlateLayout] {
        &self.plates
    }

    /// Returns the canvas shape.
    pub fn shape(&self) -> Size {
        self.shape
    }
}

/// Runs node and plate placement with one set of offsets and margins.
#[derive(Debug)]
pub(crate) struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    shape: Option<Size>,
}

impl<'a> LayoutEngine<'a> {
    /// Creates an engine. A `shape` disables automatic canvas sizing.
    pub fn new(config: &'a LayoutConfig, shape: Option<Size>) -> Self {
        Self { config, shape }
    }

    /// Computes the layout of `pgm`.
    pub fn calculate(&self, pgm: &Pgm, structure: &DiagramStructure) -> Result<Layout, PgmError> {
        info!(nodes = pgm.node_count(); "Placing nodes");
        let positions = nodes::place_nodes(pgm, structure, self.config)?;

        info!(plates = pgm.plate_count(); "Placing plates");
        let plates = plates::place_plates(pgm, structure, &positions, self.config)?;

        let shape = match self.shape {
            Some(shape) => shape,
            None => self.canvas_shape(&positions, !plates.is_empty()),
        };
        debug!(width = shape.width(), height = shape.height(); "Canvas shape");

        Ok(Layout {
            positions,
            plates,
            shape,
        })
    }

    /// Bounds all nodes as if they formed one plate, and takes its far corner.
    ///
    /// This over-approximates the drawing extent when there are plates, and
    /// ignores negative coordinates.
    fn canvas_shape(&self, positions: &[Point], has_plates: bool) -> Size {
        let Some(bounds) = Bounds::from_points(positions.iter().copied()) else {
            return Size::default();
        };
        let corner = bounds.expand(self.config.plate_margins()).far_corner();
        if has_plates {
            corner.grow(self.config.canvas_plate_padding())
        } else {
            corner
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{Node, Plate};

    fn layout_of(pgm: &Pgm) -> Layout {
        pgm.layout().unwrap()
    }

    #[test]
    fn test_empty_diagram() {
        let layout = layout_of(&Pgm::new());
        assert_eq!(layout.shape(), Size::default());
        assert!(layout.plates().is_empty());
    }

    #[test]
    fn test_canvas_shape_without_plates() {
        let pgm = Pgm::new()
            .with_node(Node::variable("$a$").at(0.0, 0.0).build().unwrap())
            .with_node(Node::variable("$b$").right_of("a").build().unwrap());

        let shape = layout_of(&pgm).shape();
        assert_approx_eq!(f32, shape.width(), 1.6, epsilon = 1e-4);
        assert_approx_eq!(f32, shape.height(), 0.75, epsilon = 1e-4);
    }

    #[test]
    fn test_canvas_shape_with_plates() {
        let pgm = Pgm::new().with_plate(
            Plate::new("$N$").with_node(Node::data("$x$").at(1.0, 1.0).build().unwrap()),
        );

        let shape = layout_of(&pgm).shape();
        assert_approx_eq!(f32, shape.width(), 2.1, epsilon = 1e-4);
        assert_approx_eq!(f32, shape.height(), 2.05, epsilon = 1e-4);
    }

    #[test]
    fn test_explicit_shape_wins() {
        let pgm = Pgm::new()
            .with_node(Node::variable("$a$").at(10.0, 10.0).build().unwrap())
            .with_shape(Size::new(3.0, 2.0));

        assert_eq!(layout_of(&pgm).shape(), Size::new(3.0, 2.0));
    }

    #[test]
    fn test_lookups_by_id() {
        let pgm = Pgm::new().with_plate(
            Plate::new("$N$").with_node(Node::data("$x$").at(0.0, 0.0).build().unwrap()),
        );
        let layout = layout_of(&pgm);
        let x = pgm.node_id("x").unwrap();
        let plate = pgm.plate_ids().next().unwrap();

        assert_eq!(layout.position(x), Some(Point::new(0.0, 0.0)));
        let rect = layout.plate_rect(plate).unwrap();
        assert_approx_eq!(f32, rect.x(), -0.4);
        assert_approx_eq!(f32, rect.y(), -0.35);
        assert_approx_eq!(f32, rect.width(), 1.2);
        assert_approx_eq!(f32, rect.height(), 1.1);
        assert!(layout.plate_bounds(plate).is_some());
        assert!(layout.plate_rect(PlateId::new(3)).is_none());
    }
}

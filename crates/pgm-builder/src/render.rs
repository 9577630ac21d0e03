//! Render payload and the backend seam.
//!
//! A built [`Diagram`] holds everything a drawing backend needs: canvas
//! settings, positioned plates, positioned nodes with their attributes, and
//! edges. Backends implement [`Canvas`] and receive the diagram through
//! [`Diagram::render`], or consume the serialized payload out of process.

use std::collections::{BTreeMap, HashSet};

use log::warn;
use serde::Serialize;

use pgm_builder_core::{
    geometry::{Point, Rect, Size},
    identifier::Name,
};

use crate::{layout::Layout, pgm::Pgm};

/// A drawing backend.
///
/// [`Diagram::render`] creates the canvas and then calls `add_plate` for
/// every plate, `add_node` for every node and `add_edge` for every edge, in
/// that order. Plates come in declaration order. Top-level nodes come before
/// plate nodes, and edges follow their source nodes.
pub trait Canvas {
    fn new(settings: &CanvasSettings) -> Self;

    fn add_plate(&mut self, plate: &PlateDraw);

    fn add_node(&mut self, node: &NodeDraw);

    /// Draws an edge between the nodes named `from` and `to`.
    fn add_edge(&mut self, from: Name, to: Name);
}

/// Canvas-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasSettings {
    pub origin: Point,
    pub grid_unit: f32,
    pub label_font_size: u32,
    pub observed_style: String,
    pub shape: Size,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDraw {
    pub name: Name,
    /// The display symbol.
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub observed: bool,
    pub fixed: bool,
    /// Label offset in points.
    pub offset: Option<Point>,
    pub alternate: bool,
    pub plot_params: BTreeMap<String, String>,
}

/// A positioned plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateDraw {
    pub rect: Rect,
    pub label: String,
    pub shift: f32,
    pub bbox: BTreeMap<String, String>,
    pub position: String,
}

/// A directed dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeDraw {
    pub from: Name,
    pub to: Name,
}

/// A laid-out diagram, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    canvas: CanvasSettings,
    plates: Vec<PlateDraw>,
    nodes: Vec<NodeDraw>,
    edges: Vec<EdgeDraw>,
}

impl Diagram {
    /// Collects the draw calls for `pgm` at the coordinates in `layout`.
    pub(crate) fn assemble(pgm: &Pgm, layout: &Layout) -> Self {
        let config = pgm.config().canvas();
        let canvas = CanvasSettings {
            origin: config.origin(),
            grid_unit: config.grid_unit(),
            label_font_size: config.label_font_size(),
            observed_style: config.observed_style().to_string(),
            shape: layout.shape(),
        };

        let plates = pgm
            .plate_ids()
            .filter_map(|id| {
                let style = pgm.plate_style(id)?;
                Some(PlateDraw {
                    rect: layout.plate_rect(id).unwrap_or_default(),
                    label: pgm.plate_label(id)?.to_string(),
                    shift: style.shift(),
                    bbox: style.bbox().clone(),
                    position: style.position().to_string(),
                })
            })
            .collect();

        let ordered = pgm.nodes_in_draw_order();
        let nodes = ordered
            .iter()
            .map(|&(id, node)| {
                let position = layout.position(id).unwrap_or_default();
                let style = node.style();
                NodeDraw {
                    name: node.name(),
                    content: node.symbol().to_string(),
                    x: position.x(),
                    y: position.y(),
                    scale: style.scale().unwrap_or(config.node_scale()),
                    observed: style.observed(),
                    fixed: style.fixed(),
                    offset: style.offset(),
                    alternate: style.alternate(),
                    plot_params: style.plot_params().clone(),
                }
            })
            .collect();

        let known: HashSet<Name> = pgm.nodes().map(|(_, node)| node.name()).collect();
        let edges = ordered
            .iter()
            .flat_map(|&(_, node)| {
                node.edges_to().iter().map(move |to| EdgeDraw {
                    from: node.name(),
                    to: *to,
                })
            })
            .inspect(|edge| {
                if !known.contains(&edge.to) {
                    warn!(from:% = edge.from, to:% = edge.to; "Edge target names no node");
                }
            })
            .collect();

        Self {
            canvas,
            plates,
            nodes,
            edges,
        }
    }

    pub fn canvas(&self) -> &CanvasSettings {
        &self.canvas
    }

    pub fn plates(&self) -> &[PlateDraw] {
        &self.plates
    }

    pub fn nodes(&self) -> &[NodeDraw] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeDraw] {
        &self.edges
    }

    /// Returns the node called `name`.
    pub fn node(&self, name: impl Into<Name>) -> Option<&NodeDraw> {
        let name = name.into();
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Replays the diagram onto a new canvas: plates, then nodes, then edges.
    pub fn render<C: Canvas>(&self) -> C {
        let mut canvas = C::new(&self.canvas);
        for plate in &self.plates {
            canvas.add_plate(plate);
        }
        for node in &self.nodes {
            canvas.add_node(node);
        }
        for edge in &self.edges {
            canvas.add_edge(edge.from, edge.to);
        }
        canvas
    }
}

//! The diagram declaration.
//!
//! [`Pgm`] owns every node and plate of a diagram in two arenas. Nodes and
//! plates are identified by their arena index ([`NodeId`], [`PlateId`]);
//! names and labels are only used to resolve references and to draw.
//!
//! Building never mutates the declaration: [`Pgm::layout`] and
//! [`Pgm::build`] compute fresh results on every call, so one declaration
//! can be built repeatedly, and cloned to try variants.

use std::fmt;

use log::{debug, info};

use pgm_builder_core::{
    geometry::Size,
    identifier::Name,
};

use crate::{
    config::{AppConfig, CanvasConfig, LayoutConfig},
    error::PgmError,
    layout::{Layout, LayoutEngine},
    node::Node,
    plate::{Member, Plate, PlateStyle},
    render::{Canvas, Diagram},
    structure::DiagramStructure,
};

/// Index of a node in its [`Pgm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Index of a plate in its [`Pgm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlateId(usize);

impl PlateId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plate#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NodeEntry {
    node: Node,
    plate: Option<PlateId>,
}

/// A plate member after its owned nodes moved into the node arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MemberRef {
    Owned(NodeId),
    Named(Name),
}

#[derive(Debug, Clone, PartialEq)]
struct PlateEntry {
    label: String,
    style: PlateStyle,
    members: Vec<MemberRef>,
}

/// A probabilistic graphical model diagram.
///
/// # Examples
///
/// ```
/// use pgm_builder::{Node, Pgm, Plate};
///
/// let pgm = Pgm::new()
///     .with_node(Node::hyper_param(r"$\alpha$").at(0.0, 2.0).of("theta").build().unwrap())
///     .with_node(Node::variable(r"$\theta$").below("alpha").build().unwrap())
///     .with_plate(
///         Plate::new("$N$")
///             .with_node(Node::data("$x_n$").below("theta").build().unwrap()),
///     );
///
/// let diagram = pgm.build().unwrap();
/// assert_eq!(diagram.nodes().len(), 3);
/// assert_eq!(diagram.plates().len(), 1);
/// assert_eq!(diagram.edges().len(), 1);
///
/// // Building is repeatable.
/// assert_eq!(pgm.build().unwrap(), diagram);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pgm {
    nodes: Vec<NodeEntry>,
    plates: Vec<PlateEntry>,
    config: AppConfig,
}

impl Pgm {
    /// Creates an empty diagram with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the distance used by `above`/`below` placements.
    pub fn with_vertical_offset(self, offset: f32) -> Self {
        let layout = self.config.layout().clone().with_vertical_offset(offset);
        self.with_layout(layout)
    }

    /// Sets the distance used by `left_of`/`right_of` placements.
    pub fn with_horizontal_offset(self, offset: f32) -> Self {
        let layout = self.config.layout().clone().with_horizontal_offset(offset);
        self.with_layout(layout)
    }

    /// Fixes the canvas shape instead of computing it from the layout.
    pub fn with_shape(self, shape: Size) -> Self {
        let canvas = self.config.canvas().clone().with_shape(shape);
        self.with_canvas(canvas)
    }

    fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.config = AppConfig::new(layout, self.config.canvas().clone());
        self
    }

    fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.config = AppConfig::new(self.config.layout().clone(), canvas);
        self
    }

    /// Adds a top-level node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.push_node(node, None);
        self
    }

    /// Adds top-level nodes in order.
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        for node in nodes {
            self.push_node(node, None);
        }
        self
    }

    /// Adds a plate. Nodes declared inside it become owned by it.
    pub fn with_plate(mut self, plate: Plate) -> Self {
        let plate_id = PlateId::new(self.plates.len());
        let (label, members, style) = plate.into_parts();

        let members = members
            .into_iter()
            .map(|member| match member {
                Member::Node(node) => MemberRef::Owned(self.push_node(node, Some(plate_id))),
                Member::Named(name) => MemberRef::Named(name),
            })
            .collect();

        debug!(plate = label.as_str(), plate_id:%; "Added plate");
        self.plates.push(PlateEntry {
            label,
            style,
            members,
        });
        self
    }

    /// Adds plates in order.
    pub fn with_plates(self, plates: impl IntoIterator<Item = Plate>) -> Self {
        plates.into_iter().fold(self, Self::with_plate)
    }

    fn push_node(&mut self, node: Node, plate: Option<PlateId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeEntry { node, plate });
        id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the number of nodes, including those declared inside plates.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of plates.
    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).map(|entry| &entry.node)
    }

    /// Returns the id of the first node called `name`.
    pub fn node_id(&self, name: impl Into<Name>) -> Option<NodeId> {
        let name = name.into();
        self.nodes
            .iter()
            .position(|entry| entry.node.name() == name)
            .map(NodeId::new)
    }

    /// Returns the first node called `name`.
    pub fn node_named(&self, name: impl Into<Name>) -> Option<&Node> {
        self.node_id(name).and_then(|id| self.node(id))
    }

    /// Returns the plate that declared the node, if any.
    pub fn owning_plate(&self, id: NodeId) -> Option<PlateId> {
        self.nodes.get(id.0).and_then(|entry| entry.plate)
    }

    /// Iterates over all nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, entry)| (NodeId::new(idx), &entry.node))
    }

    /// Returns all nodes with top-level nodes first, then each plate's own
    /// nodes, plate by plate.
    pub fn nodes_in_draw_order(&self) -> Vec<(NodeId, &Node)> {
        let mut nodes: Vec<_> = self.nodes().collect();
        nodes.sort_by_key(|(id, _)| self.owning_plate(*id));
        nodes
    }

    /// Iterates over plate ids in declaration order.
    pub fn plate_ids(&self) -> impl Iterator<Item = PlateId> + use<> {
        (0..self.plates.len()).map(PlateId::new)
    }

    /// Returns a plate's label.
    pub fn plate_label(&self, id: PlateId) -> Option<&str> {
        self.plates.get(id.0).map(|entry| entry.label.as_str())
    }

    pub(crate) fn plate_style(&self, id: PlateId) -> Option<&PlateStyle> {
        self.plates.get(id.0).map(|entry| &entry.style)
    }

    pub(crate) fn plate_members(&self, id: PlateId) -> &[MemberRef] {
        self.plates
            .get(id.0)
            .map(|entry| entry.members.as_slice())
            .unwrap_or_default()
    }

    /// Computes node coordinates, plate rectangles and the canvas shape.
    ///
    /// # Errors
    ///
    /// Returns [`PgmError`] for unresolvable references, empty plates,
    /// duplicate names, unknown anchors and placement cycles.
    pub fn layout(&self) -> Result<Layout, PgmError> {
        info!(nodes = self.nodes.len(), plates = self.plates.len(); "Building diagram structure");
        let structure = DiagramStructure::from_pgm(self)?;
        debug!("Structure built successfully");

        let engine = LayoutEngine::new(self.config.layout(), self.config.canvas().shape());
        engine.calculate(self, &structure)
    }

    /// Lays the diagram out and collects everything a canvas needs to draw it.
    ///
    /// # Errors
    ///
    /// See [`Pgm::layout`].
    pub fn build(&self) -> Result<Diagram, PgmError> {
        let layout = self.layout()?;
        let diagram = Diagram::assemble(self, &layout);
        info!(
            nodes = diagram.nodes().len(),
            plates = diagram.plates().len(),
            edges = diagram.edges().len();
            "Diagram built"
        );
        Ok(diagram)
    }

    /// Builds the diagram and replays it onto a new canvas of type `C`.
    ///
    /// # Errors
    ///
    /// See [`Pgm::layout`].
    pub fn render<C: Canvas>(&self) -> Result<C, PgmError> {
        Ok(self.build()?.render())
    }
}

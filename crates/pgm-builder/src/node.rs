//! Node declarations.
//!
//! A [`Node`] is one variable of the model. It is declared through a
//! [`NodeBuilder`], which collects exactly one placement directive (absolute
//! coordinates, or a position relative to an anchor node) together with
//! render attributes, and validates them in [`NodeBuilder::build`].
//!
//! # Example
//!
//! ```
//! use pgm_builder::Node;
//!
//! let x = Node::data("$x_n$").at(0.0, 0.0).build().unwrap();
//! let z = Node::variable("$z_n$").above("x_n").build().unwrap();
//! let mu = Node::param(r"$\mu$").left_of("z_n").build().unwrap();
//!
//! assert_eq!(x.name(), "x_n");
//! assert!(x.style().observed());
//! assert_eq!(z.anchor().unwrap(), "x_n");
//! // A parameter placed next to a node is a parameter of that node.
//! assert_eq!(mu.edges_to()[0], "z_n");
//! ```

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use pgm_builder_core::{
    geometry::Point,
    identifier::Name,
    naming::derive_name,
};

use crate::{config::LayoutConfig, error::PgmError};

/// Sideways or vertical nudge applied by the `_l`, `_r`, `_a` and `_b` placements.
const NUDGE: f32 = 0.3;

/// Extra horizontal distance used to clear the border of the anchor's plate.
const PLATE_CLEARANCE: f32 = 0.1;

/// Label offset of fixed nodes placed below their anchor.
const FIXED_LABEL_OFFSET_BELOW: (f32, f32) = (0.0, -25.0);

/// Label offset of all other fixed nodes.
const FIXED_LABEL_OFFSET: (f32, f32) = (0.0, 10.0);

/// What a node stands for, which drives its default render attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A latent random variable.
    #[default]
    Variable,
    /// An observed variable; drawn observed by default.
    Data,
    /// A parameter of one or more other nodes.
    Param,
    /// A fixed parameter; drawn fixed by default.
    HyperParam,
    /// Free text placed like a node, drawn without a border.
    Text,
}

impl NodeKind {
    fn is_param(self) -> bool {
        matches!(self, Self::Param | Self::HyperParam)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
    LeftOf,
    RightOf,
}

/// Where a node sits relative to its anchor.
///
/// The suffixed variants add a small nudge: `_l`/`_r` move left/right,
/// `_a`/`_b` move up/down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativePosition {
    Above,
    AboveLeft,
    AboveRight,
    Below,
    BelowLeft,
    BelowRight,
    LeftOf,
    LeftOfAbove,
    LeftOfBelow,
    RightOf,
    RightOfAbove,
    RightOfBelow,
}

impl RelativePosition {
    /// All positions, in keyword order.
    pub const ALL: [Self; 12] = [
        Self::Above,
        Self::AboveLeft,
        Self::AboveRight,
        Self::Below,
        Self::BelowLeft,
        Self::BelowRight,
        Self::LeftOf,
        Self::LeftOfAbove,
        Self::LeftOfBelow,
        Self::RightOf,
        Self::RightOfAbove,
        Self::RightOfBelow,
    ];

    /// Returns the keyword naming this position, e.g. `"above_l"`.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::AboveLeft => "above_l",
            Self::AboveRight => "above_r",
            Self::Below => "below",
            Self::BelowLeft => "below_l",
            Self::BelowRight => "below_r",
            Self::LeftOf => "left_of",
            Self::LeftOfAbove => "left_of_a",
            Self::LeftOfBelow => "left_of_b",
            Self::RightOf => "right_of",
            Self::RightOfAbove => "right_of_a",
            Self::RightOfBelow => "right_of_b",
        }
    }

    /// Returns `true` for the `below` family.
    pub fn is_below(self) -> bool {
        self.side() == Side::Below
    }

    fn side(self) -> Side {
        match self {
            Self::Above | Self::AboveLeft | Self::AboveRight => Side::Above,
            Self::Below | Self::BelowLeft | Self::BelowRight => Side::Below,
            Self::LeftOf | Self::LeftOfAbove | Self::LeftOfBelow => Side::LeftOf,
            Self::RightOf | Self::RightOfAbove | Self::RightOfBelow => Side::RightOf,
        }
    }

    fn nudge(self) -> (f32, f32) {
        match self {
            Self::AboveLeft | Self::BelowLeft => (-NUDGE, 0.0),
            Self::AboveRight | Self::BelowRight => (NUDGE, 0.0),
            Self::LeftOfAbove | Self::RightOfAbove => (0.0, NUDGE),
            Self::LeftOfBelow | Self::RightOfBelow => (0.0, -NUDGE),
            Self::Above | Self::Below | Self::LeftOf | Self::RightOf => (0.0, 0.0),
        }
    }
}

impl fmt::Display for RelativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error returned when a string is not a placement keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement `{0}`")]
pub struct ParsePositionError(String);

impl FromStr for RelativePosition {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|position| position.keyword() == s)
            .ok_or_else(|| ParsePositionError(s.to_string()))
    }
}

/// How a node's coordinates are determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fixed coordinates.
    Absolute(Point),
    /// A position relative to the node named `anchor`.
    Relative {
        position: RelativePosition,
        anchor: Name,
    },
}

impl Placement {
    /// Returns the anchor of a relative placement.
    pub fn anchor(&self) -> Option<Name> {
        match self {
            Self::Absolute(_) => None,
            Self::Relative { anchor, .. } => Some(*anchor),
        }
    }
}

/// The node(s) a parameter belongs to.
///
/// # Examples
///
/// ```
/// use pgm_builder::DependencyTarget;
///
/// let one = DependencyTarget::from("x");
/// let many = DependencyTarget::from(["x", "w"]);
/// let numbered = DependencyTarget::from(22);
///
/// assert_eq!(one.into_names().len(), 1);
/// assert_eq!(many.into_names().len(), 2);
/// assert_eq!(numbered.into_names()[0], "22");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyTarget {
    Single(Name),
    Many(Vec<Name>),
}

impl DependencyTarget {
    /// Returns the targets in declaration order.
    pub fn into_names(self) -> Vec<Name> {
        match self {
            Self::Single(name) => vec![name],
            Self::Many(names) => names,
        }
    }
}

impl From<Name> for DependencyTarget {
    fn from(name: Name) -> Self {
        Self::Single(name)
    }
}

impl From<&str> for DependencyTarget {
    fn from(name: &str) -> Self {
        Self::Single(Name::new(name))
    }
}

impl From<String> for DependencyTarget {
    fn from(name: String) -> Self {
        Self::Single(Name::from(name))
    }
}

impl From<i64> for DependencyTarget {
    fn from(value: i64) -> Self {
        Self::Single(Name::from(value))
    }
}

impl From<i32> for DependencyTarget {
    fn from(value: i32) -> Self {
        Self::Single(Name::from(value))
    }
}

impl From<f64> for DependencyTarget {
    fn from(value: f64) -> Self {
        Self::Single(Name::from(value))
    }
}

impl<T: Into<Name>> From<Vec<T>> for DependencyTarget {
    fn from(names: Vec<T>) -> Self {
        Self::Many(names.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Name>, const N: usize> From<[T; N]> for DependencyTarget {
    fn from(names: [T; N]) -> Self {
        Self::Many(names.into_iter().map(Into::into).collect())
    }
}

/// Render attributes passed through to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    scale: Option<f32>,
    observed: bool,
    fixed: bool,
    offset: Option<Point>,
    alternate: bool,
    plot_params: BTreeMap<String, String>,
}

impl NodeStyle {
    /// Returns the node's scale, if it overrides the canvas default.
    pub fn scale(&self) -> Option<f32> {
        self.scale
    }

    pub fn observed(&self) -> bool {
        self.observed
    }

    pub fn fixed(&self) -> bool {
        self.fixed
    }

    /// Returns the label offset in points.
    pub fn offset(&self) -> Option<Point> {
        self.offset
    }

    pub fn alternate(&self) -> bool {
        self.alternate
    }

    /// Returns backend-specific plotting parameters.
    pub fn plot_params(&self) -> &BTreeMap<String, String> {
        &self.plot_params
    }
}

/// A validated node declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Name,
    symbol: String,
    kind: NodeKind,
    placement: Placement,
    shift: Point,
    edges_to: Vec<Name>,
    style: NodeStyle,
}

impl Node {
    /// Starts a latent variable declaration.
    pub fn variable(symbol: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Variable, symbol)
    }

    /// Starts an observed variable declaration.
    pub fn data(symbol: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Data, symbol)
    }

    /// Starts a parameter declaration.
    ///
    /// A parameter needs the node(s) it belongs to, either through
    /// [`NodeBuilder::of`] or implicitly through a relative placement.
    pub fn param(symbol: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Param, symbol)
    }

    /// Starts a fixed parameter declaration.
    pub fn hyper_param(symbol: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::HyperParam, symbol)
    }

    /// Starts a free-text declaration.
    pub fn text(text: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Text, text)
    }

    pub fn name(&self) -> Name {
        self.name
    }

    /// Returns the display symbol the node was declared with.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Returns the anchor node's name for relative placements.
    pub fn anchor(&self) -> Option<Name> {
        self.placement.anchor()
    }

    /// Returns the shift applied after relative placement.
    pub fn shift(&self) -> Point {
        self.shift
    }

    /// Returns the dependency edge targets in declaration order.
    pub fn edges_to(&self) -> &[Name] {
        &self.edges_to
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    /// Appends dependency edges from this node to `names`.
    pub fn with_edges_to<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Name>,
    {
        self.edges_to.extend(names.into_iter().map(Into::into));
        self
    }

    /// Computes this node's coordinates from its anchor's coordinates.
    ///
    /// `clears_plate` adds a little horizontal distance for `left_of` and
    /// `right_of` placements; it is set when the anchor sits in a plate this
    /// node is not part of. Absolute placements ignore every argument.
    pub fn resolve_position(&self, anchor: Point, layout: &LayoutConfig, clears_plate: bool) -> Point {
        let position = match self.placement {
            Placement::Absolute(point) => return point,
            Placement::Relative { position, .. } => position,
        };

        let vertical = layout.vertical_offset();
        let clearance = if clears_plate { PLATE_CLEARANCE } else { 0.0 };
        let horizontal = layout.horizontal_offset() + clearance;

        let base = match position.side() {
            Side::Above => anchor.translate(0.0, vertical),
            Side::Below => anchor.translate(0.0, -vertical),
            Side::LeftOf => anchor.translate(-horizontal, 0.0),
            Side::RightOf => anchor.translate(horizontal, 0.0),
        };
        let (dx, dy) = position.nudge();
        base.translate(dx, dy).add_point(self.shift)
    }
}

macro_rules! relative_placements {
    ($($(#[$doc:meta])* $method:ident => $position:ident,)*) => {
        $(
            $(#[$doc])*
            pub fn $method(self, anchor: impl Into<Name>) -> Self {
                self.placed(RelativePosition::$position, anchor)
            }
        )*
    };
}

/// Collects a node declaration; see [`Node`] for the entry points.
#[derive(Debug, Clone)]
#[must_use = "call `build` to validate the node"]
pub struct NodeBuilder {
    kind: NodeKind,
    symbol: String,
    name: Option<Name>,
    placements: Vec<Placement>,
    shift: Point,
    of: Option<DependencyTarget>,
    extra_edges: Vec<Name>,
    observed: Option<bool>,
    fixed: Option<bool>,
    scale: Option<f32>,
    offset: Option<Point>,
    alternate: bool,
    plot_params: BTreeMap<String, String>,
}

impl NodeBuilder {
    fn new(kind: NodeKind, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            name: None,
            placements: Vec::new(),
            shift: Point::default(),
            of: None,
            extra_edges: Vec::new(),
            observed: None,
            fixed: None,
            scale: None,
            offset: None,
            alternate: false,
            plot_params: BTreeMap::new(),
        }
    }

    /// Overrides the name derived from the symbol.
    pub fn name(mut self, name: impl Into<Name>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Places the node at fixed coordinates.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.placements.push(Placement::Absolute(Point::new(x, y)));
        self
    }

    /// Places the node relative to the node named `anchor`.
    pub fn placed(mut self, position: RelativePosition, anchor: impl Into<Name>) -> Self {
        self.placements.push(Placement::Relative {
            position,
            anchor: anchor.into(),
        });
        self
    }

    relative_placements! {
        /// Places the node above `anchor`.
        above => Above,
        /// Places the node above `anchor`, nudged left.
        above_l => AboveLeft,
        /// Places the node above `anchor`, nudged right.
        above_r => AboveRight,
        /// Places the node below `anchor`.
        below => Below,
        /// Places the node below `anchor`, nudged left.
        below_l => BelowLeft,
        /// Places the node below `anchor`, nudged right.
        below_r => BelowRight,
        /// Places the node left of `anchor`.
        left_of => LeftOf,
        /// Places the node left of `anchor`, nudged up.
        left_of_a => LeftOfAbove,
        /// Places the node left of `anchor`, nudged down.
        left_of_b => LeftOfBelow,
        /// Places the node right of `anchor`.
        right_of => RightOf,
        /// Places the node right of `anchor`, nudged up.
        right_of_a => RightOfAbove,
        /// Places the node right of `anchor`, nudged down.
        right_of_b => RightOfBelow,
    }

    /// Shifts a relatively placed node after placement.
    pub fn shift(mut self, dx: f32, dy: f32) -> Self {
        self.shift = Point::new(dx, dy);
        self
    }

    pub fn shift_x(mut self, dx: f32) -> Self {
        self.shift = Point::new(dx, self.shift.y());
        self
    }

    pub fn shift_y(mut self, dy: f32) -> Self {
        self.shift = Point::new(self.shift.x(), dy);
        self
    }

    /// Names the node(s) this node is a parameter of; they become its edges.
    pub fn of(mut self, target: impl Into<DependencyTarget>) -> Self {
        self.of = Some(target.into());
        self
    }

    /// Adds dependency edges after those implied by `of` or the anchor.
    pub fn with_edges_to<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Name>,
    {
        self.extra_edges.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn observed(mut self, observed: bool) -> Self {
        self.observed = Some(observed);
        self
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = Some(fixed);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the label offset in points.
    pub fn offset(mut self, dx: f32, dy: f32) -> Self {
        self.offset = Some(Point::new(dx, dy));
        self
    }

    /// Draws the node with the backend's alternate style.
    pub fn alternate(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    /// Sets a backend-specific plotting parameter.
    pub fn plot_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.plot_params.insert(key.into(), value.into());
        self
    }

    /// Validates the declaration.
    ///
    /// # Errors
    ///
    /// - [`PgmError::InvalidPlacement`] unless exactly one placement directive was given.
    /// - [`PgmError::UnsupportedExponent`] if the name has to be derived from a
    ///   symbol with an exponent other than 2.
    /// - [`PgmError::MissingDependencyTarget`] for a parameter with neither
    ///   `of` nor a relative placement.
    pub fn build(self) -> Result<Node, PgmError> {
        let Self {
            kind,
            symbol,
            name,
            mut placements,
            shift,
            of,
            extra_edges,
            observed,
            fixed,
            scale,
            offset,
            alternate,
            mut plot_params,
        } = self;

        let given = placements.len();
        let placement = match placements.pop() {
            Some(placement) if given == 1 => placement,
            _ => return Err(PgmError::InvalidPlacement { symbol, given }),
        };

        let name = match name {
            Some(name) => name,
            None => Name::from(derive_name(&symbol)?),
        };

        let mut edges_to = Vec::new();
        match of {
            Some(target) => edges_to.extend(target.into_names()),
            None if kind.is_param() => match placement.anchor() {
                Some(anchor) => edges_to.push(anchor),
                None => return Err(PgmError::MissingDependencyTarget { name }),
            },
            None => {}
        }
        edges_to.extend(extra_edges);

        let fixed = fixed.unwrap_or(kind == NodeKind::HyperParam);
        let offset = offset.or_else(|| {
            fixed.then(|| {
                let below = matches!(placement, Placement::Relative { position, .. } if position.is_below());
                Point::from(if below {
                    FIXED_LABEL_OFFSET_BELOW
                } else {
                    FIXED_LABEL_OFFSET
                })
            })
        });

        if kind == NodeKind::Text {
            plot_params.insert("ec".to_string(), "none".to_string());
        }

        let shift = match placement {
            Placement::Absolute(_) => Point::default(),
            Placement::Relative { .. } => shift,
        };

        Ok(Node {
            name,
            symbol,
            kind,
            placement,
            shift,
            edges_to,
            style: NodeStyle {
                scale,
                observed: observed.unwrap_or(kind == NodeKind::Data),
                fixed,
                offset,
                alternate,
                plot_params,
            },
        })
    }
}

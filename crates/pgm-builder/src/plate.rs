//! Plate declarations.
//!
//! A plate groups nodes that are repeated, e.g. once per data point. Its
//! members are either nodes declared inside it, which the plate then owns,
//! or names of nodes declared elsewhere. Names are resolved when the diagram
//! is built, so a plate may reference a node declared after it.

use std::collections::BTreeMap;

use pgm_builder_core::identifier::Name;

use crate::node::Node;

/// One entry of a plate's member list.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// A node declared inside the plate.
    Node(Node),
    /// A reference to a node declared elsewhere in the diagram.
    Named(Name),
}

impl From<Node> for Member {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Name> for Member {
    fn from(name: Name) -> Self {
        Self::Named(name)
    }
}

impl From<&str> for Member {
    fn from(name: &str) -> Self {
        Self::Named(Name::new(name))
    }
}

impl From<String> for Member {
    fn from(name: String) -> Self {
        Self::Named(Name::from(name))
    }
}

/// Render attributes of a plate's label, passed through to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateStyle {
    shift: f32,
    bbox: BTreeMap<String, String>,
    position: String,
}

impl Default for PlateStyle {
    fn default() -> Self {
        Self {
            shift: -0.1,
            bbox: BTreeMap::from([("color".to_string(), "none".to_string())]),
            position: "bottom right".to_string(),
        }
    }
}

impl PlateStyle {
    /// Returns the label shift.
    pub fn shift(&self) -> f32 {
        self.shift
    }

    /// Returns the label bounding-box attributes.
    pub fn bbox(&self) -> &BTreeMap<String, String> {
        &self.bbox
    }

    /// Returns where the label sits on the plate, e.g. `"bottom right"`.
    pub fn position(&self) -> &str {
        &self.position
    }
}

/// A labelled group of nodes drawn as a rectangle around them.
///
/// # Examples
///
/// ```
/// use pgm_builder::{Member, Node, Plate};
///
/// let plate = Plate::new("$N$")
///     .with_node(Node::data("$x_n$").at(0.0, 0.0).build().unwrap())
///     .with_nodes(["z_n"]);
///
/// assert_eq!(plate.label(), "$N$");
/// assert_eq!(plate.members().len(), 2);
/// assert!(matches!(plate.members()[1], Member::Named(name) if name == "z_n"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    label: String,
    members: Vec<Member>,
    style: PlateStyle,
}

impl Plate {
    /// Creates an empty plate. It must receive members before the diagram is built.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
            style: PlateStyle::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn style(&self) -> &PlateStyle {
        &self.style
    }

    /// Adds one member.
    pub fn with_node(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Adds members in order.
    pub fn with_nodes<I>(mut self, members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Member>,
    {
        self.members.extend(members.into_iter().map(Into::into));
        self
    }

    /// Sets the label shift.
    pub fn with_shift(mut self, shift: f32) -> Self {
        self.style.shift = shift;
        self
    }

    /// Sets one attribute of the label's bounding box.
    pub fn with_bbox(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.bbox.insert(key.into(), value.into());
        self
    }

    /// Sets the label position.
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.style.position = position.into();
        self
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Member>, PlateStyle) {
        (self.label, self.members, self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let plate = Plate::new("$K$");
        assert_eq!(plate.style().shift(), -0.1);
        assert_eq!(plate.style().position(), "bottom right");
        assert_eq!(
            plate.style().bbox().get("color").map(String::as_str),
            Some("none")
        );
        assert!(plate.members().is_empty());
    }

    #[test]
    fn test_style_setters() {
        let plate = Plate::new("$K$")
            .with_shift(0.2)
            .with_position("top left")
            .with_bbox("color", "white");

        assert_eq!(plate.style().shift(), 0.2);
        assert_eq!(plate.style().position(), "top left");
        assert_eq!(plate.style().bbox().get("color").map(String::as_str), Some("white"));
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let node = Node::variable("$z$").at(0.0, 0.0).build().unwrap();
        let plate = Plate::new("$N$")
            .with_nodes(["a", "b"])
            .with_node(node.clone())
            .with_node(Name::new("c"));

        assert_eq!(
            plate.members(),
            &[
                Member::Named(Name::new("a")),
                Member::Named(Name::new("b")),
                Member::Node(node),
                Member::Named(Name::new("c")),
            ]
        );
    }
}

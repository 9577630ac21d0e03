//! Diagram documents.
//!
//! A document is a TOML file declaring the nodes and plates of one diagram,
//! optionally overriding the `[layout]` and `[canvas]` configuration
//! sections:
//!
//! ```toml
//! [[node]]
//! kind = "data"
//! symbol = '$x_n$'
//! xy = [0.0, 0.0]
//!
//! [[node]]
//! kind = "param"
//! symbol = '$\mu$'
//! left_of = "x_n"
//!
//! [[plate]]
//! label = '$N$'
//! members = ["x_n"]
//! ```
//!
//! Top-level nodes are declared before the nodes of plates, in file order.

use std::collections::BTreeMap;

use serde::Deserialize;

use pgm_builder::{
    DependencyTarget, Node, NodeKind, Pgm, PgmError, Plate, RelativePosition,
    config::{AppConfig, CanvasConfig, LayoutConfig},
    identifier::Name,
};

/// A node name as written in a document: text or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum NameValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<NameValue> for Name {
    fn from(value: NameValue) -> Self {
        match value {
            NameValue::Text(text) => Name::from(text),
            NameValue::Integer(value) => Name::from(value),
            NameValue::Float(value) => Name::from(value),
        }
    }
}

/// The `of` key: one name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum OfValue {
    One(NameValue),
    Many(Vec<NameValue>),
}

impl From<OfValue> for DependencyTarget {
    fn from(value: OfValue) -> Self {
        match value {
            OfValue::One(name) => DependencyTarget::Single(name.into()),
            OfValue::Many(names) => DependencyTarget::Many(names.into_iter().map(Name::from).collect()),
        }
    }
}

/// One `[[node]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDecl {
    #[serde(default)]
    kind: NodeKind,
    symbol: String,
    name: Option<NameValue>,

    xy: Option<[f32; 2]>,
    above: Option<NameValue>,
    above_l: Option<NameValue>,
    above_r: Option<NameValue>,
    below: Option<NameValue>,
    below_l: Option<NameValue>,
    below_r: Option<NameValue>,
    left_of: Option<NameValue>,
    left_of_a: Option<NameValue>,
    left_of_b: Option<NameValue>,
    right_of: Option<NameValue>,
    right_of_a: Option<NameValue>,
    right_of_b: Option<NameValue>,
    shift: Option<[f32; 2]>,

    of: Option<OfValue>,
    #[serde(default)]
    edges_to: Vec<NameValue>,

    observed: Option<bool>,
    fixed: Option<bool>,
    scale: Option<f32>,
    offset: Option<[f32; 2]>,
    #[serde(default)]
    alternate: bool,
    #[serde(default)]
    plot_params: BTreeMap<String, String>,
}

impl NodeDecl {
    fn into_node(self) -> Result<Node, PgmError> {
        // Same order as `RelativePosition::ALL`.
        let anchors = [
            self.above,
            self.above_l,
            self.above_r,
            self.below,
            self.below_l,
            self.below_r,
            self.left_of,
            self.left_of_a,
            self.left_of_b,
            self.right_of,
            self.right_of_a,
            self.right_of_b,
        ];

        let mut builder = match self.kind {
            NodeKind::Variable => Node::variable(self.symbol),
            NodeKind::Data => Node::data(self.symbol),
            NodeKind::Param => Node::param(self.symbol),
            NodeKind::HyperParam => Node::hyper_param(self.symbol),
            NodeKind::Text => Node::text(self.symbol),
        };

        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some([x, y]) = self.xy {
            builder = builder.at(x, y);
        }
        for (position, anchor) in RelativePosition::ALL.into_iter().zip(anchors) {
            if let Some(anchor) = anchor {
                builder = builder.placed(position, anchor);
            }
        }
        if let Some([dx, dy]) = self.shift {
            builder = builder.shift(dx, dy);
        }
        if let Some(of) = self.of {
            builder = builder.of(of);
        }
        if let Some(observed) = self.observed {
            builder = builder.observed(observed);
        }
        if let Some(fixed) = self.fixed {
            builder = builder.fixed(fixed);
        }
        if let Some(scale) = self.scale {
            builder = builder.scale(scale);
        }
        if let Some([dx, dy]) = self.offset {
            builder = builder.offset(dx, dy);
        }
        for (key, value) in self.plot_params {
            builder = builder.plot_param(key, value);
        }

        builder
            .alternate(self.alternate)
            .with_edges_to(self.edges_to)
            .build()
    }
}

/// One `[[plate]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlateDecl {
    label: String,
    #[serde(default)]
    members: Vec<NameValue>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeDecl>,
    shift: Option<f32>,
    position: Option<String>,
    #[serde(default)]
    bbox: BTreeMap<String, String>,
}

impl PlateDecl {
    fn into_plate(self) -> Result<Plate, PgmError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(NodeDecl::into_node)
            .collect::<Result<Vec<_>, _>>()?;

        let mut plate = Plate::new(self.label)
            .with_nodes(nodes)
            .with_nodes(self.members.into_iter().map(Name::from));
        if let Some(shift) = self.shift {
            plate = plate.with_shift(shift);
        }
        if let Some(position) = self.position {
            plate = plate.with_position(position);
        }
        for (key, value) in self.bbox {
            plate = plate.with_bbox(key, value);
        }
        Ok(plate)
    }
}

/// A parsed diagram document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    layout: Option<LayoutConfig>,
    canvas: Option<CanvasConfig>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeDecl>,
    #[serde(default, rename = "plate")]
    plates: Vec<PlateDecl>,
}

impl Document {
    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Returns the TOML error, which carries the offending span.
    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Declares the document's diagram.
    ///
    /// A `[layout]` or `[canvas]` section of the document replaces the
    /// corresponding section of `config` as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`PgmError`] if a node declaration is invalid.
    pub fn into_pgm(self, config: AppConfig) -> Result<Pgm, PgmError> {
        let config = AppConfig::new(
            self.layout.unwrap_or_else(|| config.layout().clone()),
            self.canvas.unwrap_or_else(|| config.canvas().clone()),
        );

        let nodes = self
            .nodes
            .into_iter()
            .map(NodeDecl::into_node)
            .collect::<Result<Vec<_>, _>>()?;
        let plates = self
            .plates
            .into_iter()
            .map(PlateDecl::into_plate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Pgm::new()
            .with_config(config)
            .with_nodes(nodes)
            .with_plates(plates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LDA: &str = r#"
        [[node]]
        kind = "hyper_param"
        symbol = '$\alpha$'
        xy = [0.0, 1.0]
        of = "theta"

        [[node]]
        kind = "data"
        symbol = '$w$'
        right_of = "z"
        edges_to = ["z"]

        [[plate]]
        label = '$M$'
        members = ["w"]

        [[plate.node]]
        symbol = '$\theta$'
        right_of = "alpha"

        [[plate.node]]
        symbol = '$z$'
        right_of = "theta"

        [[plate]]
        label = '$N$'
        members = ["z", "w"]
        position = "top left"
    "#;

    #[test]
    fn test_parse_and_build() {
        let pgm = Document::parse(LDA)
            .unwrap()
            .into_pgm(AppConfig::default())
            .unwrap();

        assert_eq!(pgm.node_count(), 4);
        assert_eq!(pgm.plate_count(), 2);

        let diagram = pgm.build().unwrap();
        let w = diagram.node("w").unwrap();
        assert!(w.observed);
        assert_eq!(diagram.plates()[1].position, "top left");
        assert_eq!(diagram.edges().len(), 2);
    }

    #[test]
    fn test_numeric_names() {
        let doc = r#"
            [[node]]
            symbol = '$x$'
            name = 22
            xy = [0.0, 0.0]

            [[node]]
            kind = "param"
            symbol = '$y$'
            xy = [1.0, 0.0]
            of = [22, 22.5]
        "#;

        let pgm = Document::parse(doc).unwrap().into_pgm(AppConfig::default()).unwrap();
        let y = pgm.node_named("y").unwrap();
        assert_eq!(y.edges_to(), &[Name::new("22"), Name::new("22.5")]);
        assert!(pgm.node_named("22").is_some());
    }

    #[test]
    fn test_sections_override_config() {
        let doc = r#"
            [layout]
            vertical_offset = 3.0

            [[node]]
            symbol = '$x$'
            xy = [0.0, 0.0]
        "#;

        let base = AppConfig::new(
            LayoutConfig::default().with_horizontal_offset(2.0),
            CanvasConfig::default().with_observed_style("outer"),
        );
        let pgm = Document::parse(doc).unwrap().into_pgm(base).unwrap();

        assert_eq!(pgm.config().layout().vertical_offset(), 3.0);
        // The whole section is replaced.
        assert_eq!(pgm.config().layout().horizontal_offset(), 0.8);
        assert_eq!(pgm.config().canvas().observed_style(), "outer");
    }

    #[test]
    fn test_two_placements_rejected() {
        let doc = r#"
            [[node]]
            symbol = '$x$'
            xy = [0.0, 0.0]
            above = "y"
        "#;

        let err = Document::parse(doc)
            .unwrap()
            .into_pgm(AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, PgmError::InvalidPlacement { given: 2, .. }));
    }

    #[test]
    fn test_unknown_key_has_span() {
        let doc = "[[node]]\nsymbol = '$x$'\nxy = [0.0, 0.0]\ncolour = 'red'\n";
        let err = Document::parse(doc).unwrap_err();
        assert!(err.span().is_some());
    }
}

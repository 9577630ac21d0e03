//! pgm-builder - Declarative diagrams of probabilistic graphical models.
//!
//! Declare the variables of a model as [`Node`]s, placed either at fixed
//! coordinates or relative to another node, group repeated variables into
//! [`Plate`]s, and let [`Pgm::build`] work out the coordinates. The result
//! is a [`Diagram`] that any [`Canvas`] backend can draw, or that can be
//! serialized and handed to an external renderer.
//!
//! # Example
//!
//! ```
//! use pgm_builder::{Node, Pgm, Plate};
//!
//! let pgm = Pgm::new()
//!     .with_node(Node::hyper_param(r"$\alpha$").at(0.0, 1.0).of("theta").build()?)
//!     .with_plate(
//!         Plate::new("$M$")
//!             .with_node(Node::variable(r"$\theta$").right_of("alpha").build()?)
//!             .with_node(Node::variable("$z$").right_of("theta").build()?)
//!             .with_nodes(["w"]),
//!     )
//!     .with_plate(Plate::new("$N$").with_nodes(["z", "w"]))
//!     .with_node(Node::data("$w$").right_of("z").with_edges_to(["z"]).build()?);
//!
//! let diagram = pgm.build()?;
//! assert_eq!(diagram.nodes().len(), 4);
//! assert_eq!(diagram.plates().len(), 2);
//! # Ok::<(), pgm_builder::PgmError>(())
//! ```

pub mod config;

mod error;
mod layout;
mod node;
mod pgm;
mod plate;
mod render;
mod structure;

pub use pgm_builder_core::{geometry, identifier, naming, toposort};

pub use error::PgmError;
pub use layout::{Layout, OverlapCase, PlateLayout};
pub use node::{
    DependencyTarget, Node, NodeBuilder, NodeKind, NodeStyle, ParsePositionError, Placement,
    RelativePosition,
};
pub use pgm::{NodeId, Pgm, PlateId};
pub use plate::{Member, Plate, PlateStyle};
pub use render::{Canvas, CanvasSettings, Diagram, EdgeDraw, NodeDraw, PlateDraw};

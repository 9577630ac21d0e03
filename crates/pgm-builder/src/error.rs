//! Error types for building PGMs.
//!
//! This module provides [`PgmError`], returned by node construction and by
//! [`Pgm::build`](crate::Pgm::build). Node-level problems surface when a
//! [`NodeBuilder`](crate::NodeBuilder) is built; graph-level problems
//! (references, anchors, cycles) surface when the diagram is built.

use thiserror::Error;

use pgm_builder_core::{identifier::Name, naming::NamingError, toposort::CyclicDependency};

/// The error type for pgm-builder operations.
///
/// Every variant is terminal: nothing is retried, and no partial diagram is
/// produced. Fix the declaration and build again.
#[derive(Debug, Error)]
pub enum PgmError {
    #[error("node `{symbol}` needs exactly one placement directive but was given {given}")]
    InvalidPlacement { symbol: String, given: usize },

    #[error(
        "parameter `{name}` must name the node it is a parameter of, via `of` or a relative placement"
    )]
    MissingDependencyTarget { name: Name },

    #[error(transparent)]
    UnsupportedExponent(#[from] NamingError),

    #[error("plate `{plate}` references unknown node `{name}`")]
    UnknownNodeReference { plate: String, name: Name },

    #[error("node `{node}` is placed relative to unknown node `{anchor}`")]
    UnknownAnchor { node: Name, anchor: Name },

    #[error("node name `{name}` is used by more than one node")]
    DuplicateNodeName { name: Name },

    #[error("plate `{label}` must contain at least one node")]
    EmptyPlate { label: String },

    #[error(transparent)]
    CyclicDependency(#[from] CyclicDependency<Name>),
}

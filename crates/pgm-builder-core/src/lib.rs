//! pgm-builder Core Types
//!
//! This crate provides the leaf types shared by the pgm-builder crates:
//!
//! - **Names**: Interned node identifiers ([`identifier::Name`])
//! - **Geometry**: Points, sizes, rectangles and margins in grid units ([`geometry`] module)
//! - **Naming**: Deriving plain identifiers from TeX display symbols ([`naming`] module)
//! - **Toposort**: Batched topological ordering of dependency maps ([`toposort`] module)

pub mod geometry;
pub mod identifier;
pub mod naming;
pub mod toposort;

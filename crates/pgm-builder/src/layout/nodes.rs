//! Node placement.
//!
//! Nodes are placed batch by batch in topological order of their anchors,
//! so every anchor has coordinates by the time a node relative to it is
//! resolved. The result does not depend on the order nodes were declared in.

use indexmap::{IndexMap, IndexSet};
use log::trace;

use pgm_builder_core::{
    geometry::Point,
    identifier::Name,
    toposort::{CyclicDependency, Toposort},
};

use crate::{
    config::LayoutConfig,
    error::PgmError,
    pgm::{NodeId, Pgm},
    structure::DiagramStructure,
};

/// Computes the coordinates of every node, indexed by [`NodeId`].
///
/// # Errors
///
/// Returns [`PgmError::CyclicDependency`] if anchors form a cycle, including
/// a node anchored to itself.
pub(super) fn place_nodes(
    pgm: &Pgm,
    structure: &DiagramStructure,
    config: &LayoutConfig,
) -> Result<Vec<Point>, PgmError> {
    let names: Vec<Name> = pgm.nodes().map(|(_, node)| node.name()).collect();
    let graph = structure.placement_dependencies();
    let mut positions: Vec<Option<Point>> = vec![None; names.len()];

    for (depth, batch) in Toposort::new(&graph).enumerate() {
        let batch = batch.map_err(|err| err.map(|id: NodeId| names[id.index()]))?;
        trace!(depth, size = batch.len(); "Placing node batch");

        for id in batch {
            let Some(node) = pgm.node(id) else {
                continue;
            };

            let (anchor_point, clears_plate) = match structure.anchor(id) {
                None => (Point::default(), false),
                Some(anchor) => {
                    let Some(point) = positions[anchor.index()] else {
                        // Only a node anchored to itself reaches here unplaced.
                        return Err(self_anchored(node.name()).into());
                    };
                    (point, structure.clears_plate(id, anchor))
                }
            };

            let point = node.resolve_position(anchor_point, config, clears_plate);
            trace!(node:% = node.name(), x = point.x(), y = point.y(), clears_plate; "Placed node");
            positions[id.index()] = Some(point);
        }
    }

    Ok(positions.into_iter().flatten().collect())
}

fn self_anchored(name: Name) -> CyclicDependency<Name> {
    let residue = IndexMap::from([(name, IndexSet::from([name]))]);
    CyclicDependency::from_residue(residue)
}

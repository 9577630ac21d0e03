//! Reference resolution.
//!
//! Turns the names used in a [`Pgm`] declaration (plate members given by
//! name, placement anchors) into arena ids, and records which plate each
//! anchor lives in. Everything here is validated once, up front, so the
//! layout stage only deals with ids.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::{debug, trace};

use pgm_builder_core::{identifier::Name, toposort::DependencyMap};

use crate::{
    error::PgmError,
    pgm::{MemberRef, NodeId, Pgm, PlateId},
};

/// A [`Pgm`] with every name resolved to an id.
#[derive(Debug)]
pub(crate) struct DiagramStructure {
    anchors: Vec<Option<NodeId>>,
    plate_members: Vec<IndexSet<NodeId>>,
    home_plates: Vec<Option<PlateId>>,
}

impl DiagramStructure {
    /// Resolves all references of `pgm`.
    ///
    /// # Errors
    ///
    /// - [`PgmError::DuplicateNodeName`] if two nodes share a name.
    /// - [`PgmError::EmptyPlate`] for a plate without members.
    /// - [`PgmError::UnknownNodeReference`] for a plate member naming no node.
    /// - [`PgmError::UnknownAnchor`] for a placement relative to no node.
    pub fn from_pgm(pgm: &Pgm) -> Result<Self, PgmError> {
        let mut names: HashMap<Name, NodeId> = HashMap::with_capacity(pgm.node_count());
        for (id, node) in pgm.nodes() {
            if names.insert(node.name(), id).is_some() {
                return Err(PgmError::DuplicateNodeName { name: node.name() });
            }
        }

        let mut plate_members = Vec::with_capacity(pgm.plate_count());
        for plate_id in pgm.plate_ids() {
            let label = pgm.plate_label(plate_id).unwrap_or_default();
            let members = pgm.plate_members(plate_id);
            if members.is_empty() {
                return Err(PgmError::EmptyPlate {
                    label: label.to_string(),
                });
            }

            let resolved = members
                .iter()
                .map(|member| match member {
                    MemberRef::Owned(id) => Ok(*id),
                    MemberRef::Named(name) => {
                        names
                            .get(name)
                            .copied()
                            .ok_or_else(|| PgmError::UnknownNodeReference {
                                plate: label.to_string(),
                                name: *name,
                            })
                    }
                })
                .collect::<Result<IndexSet<_>, _>>()?;

            debug!(plate = label, members = resolved.len(); "Resolved plate members");
            plate_members.push(resolved);
        }

        // A node's home plate is the plate declaring it, else the first plate listing it.
        let mut home_plates: Vec<Option<PlateId>> =
            pgm.nodes().map(|(id, _)| pgm.owning_plate(id)).collect();
        for (plate_id, members) in pgm.plate_ids().zip(&plate_members) {
            for member in members {
                home_plates[member.index()].get_or_insert(plate_id);
            }
        }

        let anchors = pgm
            .nodes()
            .map(|(_, node)| match node.anchor() {
                None => Ok(None),
                Some(anchor) => names.get(&anchor).copied().map(Some).ok_or(
                    PgmError::UnknownAnchor {
                        node: node.name(),
                        anchor,
                    },
                ),
            })
            .collect::<Result<Vec<_>, _>>()?;

        trace!(names = names.len(); "Resolved node anchors");

        Ok(Self {
            anchors,
            plate_members,
            home_plates,
        })
    }

    /// Returns the resolved anchor of a node.
    pub fn anchor(&self, id: NodeId) -> Option<NodeId> {
        self.anchors.get(id.index()).copied().flatten()
    }

    /// Returns the resolved members of a plate, in declaration order.
    pub fn plate_members(&self, id: PlateId) -> Option<&IndexSet<NodeId>> {
        self.plate_members.get(id.index())
    }

    /// Iterates over the resolved member sets of all plates.
    pub fn plates(&self) -> impl Iterator<Item = (PlateId, &IndexSet<NodeId>)> {
        self.plate_members
            .iter()
            .enumerate()
            .map(|(idx, members)| (PlateId::new(idx), members))
    }

    /// Returns `true` if a node placed next to `anchor` has to clear the
    /// border of the anchor's plate, i.e. the anchor is in a plate the node
    /// is not a member of.
    pub fn clears_plate(&self, node: NodeId, anchor: NodeId) -> bool {
        let Some(home) = self.home_plates.get(anchor.index()).copied().flatten() else {
            return false;
        };
        self.plate_members(home)
            .is_some_and(|members| !members.contains(&node))
    }

    /// Maps every node to the node it is placed relative to.
    pub fn placement_dependencies(&self) -> DependencyMap<NodeId> {
        self.anchors
            .iter()
            .enumerate()
            .map(|(idx, anchor)| (NodeId::new(idx), anchor.iter().copied().collect()))
            .collect()
    }
}

//! Batched topological sorting of dependency maps.
//!
//! The input maps each item to the set of items it depends on. The output
//! is a sequence of *batches*: batch 0 holds the items without dependencies,
//! and batch `k` holds the items whose dependencies all lie in earlier
//! batches. Items within a batch are mutually independent.
//!
//! # Example
//!
//! ```
//! use indexmap::{IndexMap, IndexSet};
//! use pgm_builder_core::toposort::toposort;
//!
//! let mut graph: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
//! graph.insert("theta", IndexSet::from(["alpha"]));
//! graph.insert("z", IndexSet::from(["theta"]));
//! graph.insert("w", IndexSet::from(["z", "beta"]));
//!
//! let batches = toposort(&graph).unwrap();
//! assert_eq!(batches.len(), 4);
//! assert!(batches[0].contains("alpha") && batches[0].contains("beta"));
//! assert_eq!(batches[3], IndexSet::from(["w"]));
//! ```

use std::{fmt, hash::Hash, mem};

use indexmap::{IndexMap, IndexSet};
use log::trace;
use petgraph::{algo::tarjan_scc, graph::DiGraph};

/// A dependency map: item → the items it depends on.
pub type DependencyMap<T> = IndexMap<T, IndexSet<T>>;

/// Lazy iterator over the batches of a dependency map.
///
/// Each call to [`next`](Iterator::next) peels off the next batch. Once a
/// cycle blocks progress the iterator yields a single [`CyclicDependency`]
/// and then ends. Batches yielded before the error are valid; the items
/// involved in the cycle (and everything depending on them) never appear in
/// a batch.
///
/// The input is copied on construction and never mutated.
#[derive(Debug, Clone)]
pub struct Toposort<T> {
    remaining: DependencyMap<T>,
    failed: bool,
}

impl<T> Toposort<T>
where
    T: Clone + Eq + Hash,
{
    /// Prepares a sort over `graph`.
    ///
    /// Self-dependencies are dropped, and items that appear only as
    /// dependencies are added with no dependencies of their own.
    pub fn new(graph: &DependencyMap<T>) -> Self {
        let mut remaining: DependencyMap<T> = graph
            .iter()
            .map(|(item, deps)| {
                let deps = deps.iter().filter(|dep| *dep != item).cloned().collect();
                (item.clone(), deps)
            })
            .collect();

        let implicit: Vec<T> = remaining
            .values()
            .flatten()
            .filter(|dep| !remaining.contains_key(*dep))
            .cloned()
            .collect();
        for item in implicit {
            remaining.entry(item).or_default();
        }

        Self {
            remaining,
            failed: false,
        }
    }
}

impl<T> Iterator for Toposort<T>
where
    T: Clone + Eq + Hash,
{
    type Item = Result<IndexSet<T>, CyclicDependency<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        let batch: IndexSet<T> = self
            .remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(item, _)| item.clone())
            .collect();

        if batch.is_empty() {
            self.failed = true;
            let residue = mem::take(&mut self.remaining);
            return Some(Err(CyclicDependency::from_residue(residue)));
        }

        self.remaining.retain(|item, _| !batch.contains(item));
        for deps in self.remaining.values_mut() {
            deps.retain(|dep| !batch.contains(dep));
        }

        trace!(batch_size = batch.len(), remaining = self.remaining.len(); "Extracted toposort batch");
        Some(Ok(batch))
    }
}

/// Sorts `graph` into batches eagerly.
///
/// # Errors
///
/// Returns [`CyclicDependency`] if the graph contains a cycle. No batches
/// are returned in that case.
pub fn toposort<T>(graph: &DependencyMap<T>) -> Result<Vec<IndexSet<T>>, CyclicDependency<T>>
where
    T: Clone + Eq + Hash,
{
    Toposort::new(graph).collect()
}

/// The part of a dependency map that could not be ordered.
///
/// Carries the unresolved residue (every item that is on a cycle or depends
/// on one, with its still-unresolved dependencies) and the cycles found in
/// it. Each cycle lists its members in residue order.
#[derive(Debug, Clone)]
pub struct CyclicDependency<T> {
    residue: DependencyMap<T>,
    cycles: Vec<Vec<T>>,
}

impl<T> CyclicDependency<T>
where
    T: Clone + Eq + Hash,
{
    /// Builds the error from an unresolved residue, locating its cycles.
    pub fn from_residue(residue: DependencyMap<T>) -> Self {
        let mut graph = DiGraph::<usize, ()>::new();
        let indices: Vec<_> = (0..residue.len()).map(|idx| graph.add_node(idx)).collect();
        for (idx, deps) in residue.values().enumerate() {
            for dep in deps {
                if let Some(dep_idx) = residue.get_index_of(dep) {
                    graph.add_edge(indices[idx], indices[dep_idx], ());
                }
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut members: Vec<usize> = component.iter().map(|node| graph[*node]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        cycles.sort_unstable();

        let cycles = cycles
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .filter_map(|idx| residue.get_index(idx).map(|(item, _)| item.clone()))
                    .collect()
            })
            .collect();

        Self { residue, cycles }
    }

    /// Returns the unresolved items with their unresolved dependencies.
    pub fn residue(&self) -> &DependencyMap<T> {
        &self.residue
    }

    /// Returns the cycles found in the residue.
    pub fn cycles(&self) -> &[Vec<T>] {
        &self.cycles
    }

    /// Converts the items of this error with `f`.
    ///
    /// Used to report cycles over internal indices in terms of user-facing
    /// names.
    pub fn map<U, F>(self, mut f: F) -> CyclicDependency<U>
    where
        U: Clone + Eq + Hash,
        F: FnMut(T) -> U,
    {
        let residue = self
            .residue
            .into_iter()
            .map(|(item, deps)| (f(item), deps.into_iter().map(&mut f).collect()))
            .collect();
        let cycles = self
            .cycles
            .into_iter()
            .map(|cycle| cycle.into_iter().map(&mut f).collect())
            .collect();
        CyclicDependency { residue, cycles }
    }
}

impl<T: Eq + Hash> PartialEq for CyclicDependency<T> {
    fn eq(&self, other: &Self) -> bool {
        self.residue == other.residue && self.cycles == other.cycles
    }
}

impl<T: fmt::Display> fmt::Display for CyclicDependency<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyclic dependency: ")?;
        for (idx, cycle) in self.cycles.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            for (pos, item) in cycle.iter().enumerate() {
                if pos > 0 {
                    write!(f, " <-> ")?;
                }
                write!(f, "{item}")?;
            }
        }
        write!(f, " (unresolved: ")?;
        for (idx, (item, deps)) in self.residue.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item} -> {{")?;
            for (pos, dep) in deps.iter().enumerate() {
                if pos > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{dep}")?;
            }
            write!(f, "}}")?;
        }
        write!(f, ")")
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for CyclicDependency<T> {}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Random DAGs: item `i` may only depend on items `< i`, then the keys
    /// are shuffled so insertion order carries no hint.
    fn dag_strategy() -> impl Strategy<Value = DependencyMap<u32>> {
        (1u32..24)
            .prop_flat_map(|n| {
                let deps: Vec<_> = (0..n)
                    .map(|i| prop::collection::vec(0..i.max(1), 0..4))
                    .collect();
                let order = Just((0..n).collect::<Vec<u32>>()).prop_shuffle();
                (deps, order)
            })
            .prop_map(|(deps, order)| {
                order
                    .into_iter()
                    .map(|item| {
                        let item_deps = deps[item as usize]
                            .iter()
                            .copied()
                            .filter(|dep| *dep < item)
                            .collect();
                        (item, item_deps)
                    })
                    .collect()
            })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every item's dependencies lie in strictly earlier batches.
    fn check_dependencies_precede(graph: &DependencyMap<u32>) -> Result<(), TestCaseError> {
        let batches = toposort(graph).map_err(|err| TestCaseError::fail(err.to_string()))?;

        for (k, batch) in batches.iter().enumerate() {
            for item in batch {
                for dep in &graph[item] {
                    let dep_batch = batches.iter().position(|b| b.contains(dep));
                    prop_assert!(matches!(dep_batch, Some(d) if d < k));
                }
            }
        }
        Ok(())
    }

    /// The batches partition the items.
    fn check_batches_cover_items(graph: &DependencyMap<u32>) -> Result<(), TestCaseError> {
        let batches = toposort(graph).map_err(|err| TestCaseError::fail(err.to_string()))?;

        let total: usize = batches.iter().map(IndexSet::len).sum();
        let union: IndexSet<u32> = batches.into_iter().flatten().collect();
        let expected: IndexSet<u32> = graph
            .iter()
            .flat_map(|(item, deps)| std::iter::once(*item).chain(deps.iter().copied()))
            .collect();

        prop_assert_eq!(total, union.len());
        prop_assert_eq!(union.len(), expected.len());
        prop_assert!(expected.iter().all(|item| union.contains(item)));
        Ok(())
    }

    /// Closing any chain into a loop makes the sort fail.
    fn check_back_edge_fails(mut graph: DependencyMap<u32>) -> Result<(), TestCaseError> {
        let Some((item, dep)) = graph
            .iter()
            .find(|(_, deps)| !deps.is_empty())
            .map(|(item, deps)| (*item, deps[0]))
        else {
            return Ok(());
        };
        graph.entry(dep).or_default().insert(item);

        prop_assert!(toposort(&graph).is_err());
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn dependencies_precede(graph in dag_strategy()) {
            check_dependencies_precede(&graph)?;
        }

        #[test]
        fn batches_cover_items(graph in dag_strategy()) {
            check_batches_cover_items(&graph)?;
        }

        #[test]
        fn back_edge_fails(graph in dag_strategy()) {
            check_back_edge_fails(graph)?;
        }
    }
}

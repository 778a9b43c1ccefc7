//! The set of methods reachable from the entry points.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::{analysis::callgraph::CallGraph, metadata::token::MethodId};

/// Monotonically growing set of reachable methods.
///
/// Iteration follows discovery order, which for a builder run is the order in which methods
/// were taken off the worklist.
#[derive(Debug, Clone, Default)]
pub struct ReachableMethods {
    order: Vec<MethodId>,
    members: HashSet<MethodId>,
}

impl ReachableMethods {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the methods reachable from `entries` over the edges of an existing graph.
    ///
    /// Breadth-first, independent of how the graph was built. For a complete builder run the
    /// result contains exactly the builder's own reachable set, which makes this usable as an
    /// audit of closure under edges.
    ///
    /// # Arguments
    ///
    /// * `graph` - The call graph to traverse
    /// * `entries` - The entry point methods
    #[must_use]
    pub fn from_call_graph(graph: &CallGraph, entries: &[MethodId]) -> Self {
        let mut reachable = Self::new();
        let mut queue: VecDeque<MethodId> = VecDeque::new();

        for &entry in entries {
            if reachable.insert(entry) {
                queue.push_back(entry);
            }
        }
        while let Some(method) = queue.pop_front() {
            for edge in graph.edges_out_of(method) {
                if reachable.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }

        reachable
    }

    /// Adds a method, returning `true` if it was not yet present.
    pub(crate) fn insert(&mut self, method: MethodId) -> bool {
        if self.members.insert(method) {
            self.order.push(method);
            true
        } else {
            false
        }
    }

    /// Returns `true` if `method` is reachable.
    #[must_use]
    pub fn contains(&self, method: MethodId) -> bool {
        self.members.contains(&method)
    }

    /// Returns the number of reachable methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no method is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates the reachable methods in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.order.iter().copied()
    }

    /// Returns an ordered copy of the set, independent of discovery order.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<MethodId> {
        self.order.iter().copied().collect()
    }
}

impl<'a> IntoIterator for &'a ReachableMethods {
    type Item = MethodId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, MethodId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::callgraph::{CallGraph, CallSiteRef, DispatchKind, ReachableMethods},
        metadata::token::MethodId,
    };

    fn m(id: u32) -> MethodId {
        MethodId::new(id)
    }

    #[test]
    fn test_insert_keeps_discovery_order() {
        let mut reachable = ReachableMethods::new();
        assert!(reachable.is_empty());
        assert!(reachable.insert(m(4)));
        assert!(reachable.insert(m(1)));
        assert!(!reachable.insert(m(4)));

        assert_eq!(reachable.len(), 2);
        assert!(reachable.contains(m(1)));
        assert!(!reachable.contains(m(2)));
        assert_eq!(reachable.iter().collect::<Vec<_>>(), vec![m(4), m(1)]);
        assert_eq!(reachable.snapshot().into_iter().collect::<Vec<_>>(), vec![m(1), m(4)]);
    }

    #[test]
    fn test_from_call_graph() {
        let mut graph = CallGraph::new();
        graph.add_edge(m(0), CallSiteRef::new(m(0), 0), m(1), DispatchKind::Static);
        graph.add_edge(m(1), CallSiteRef::new(m(1), 0), m(2), DispatchKind::Static);
        graph.add_edge(m(2), CallSiteRef::new(m(2), 0), m(0), DispatchKind::Static);
        graph.add_edge(m(5), CallSiteRef::new(m(5), 0), m(6), DispatchKind::Static);

        let reachable = ReachableMethods::from_call_graph(&graph, &[m(0), m(0)]);
        assert_eq!(reachable.iter().collect::<Vec<_>>(), vec![m(0), m(1), m(2)]);
        assert!(!reachable.contains(m(5)));

        // An entry without edges is still reachable.
        let isolated = ReachableMethods::from_call_graph(&graph, &[m(9)]);
        assert_eq!(isolated.len(), 1);
    }
}

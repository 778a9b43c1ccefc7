//! Call graph data structure.
//!
//! The [`CallGraph`] stores resolved call edges in an append-only arena with forward, reverse
//! and per-site indices over it. Edges are never removed; inserting an edge that already exists
//! is a no-op, so the graph can be fed by a worklist that revisits sites without producing
//! duplicates.

use std::{
    collections::{HashMap, HashSet},
    fmt::Write,
};

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    analysis::callgraph::{CallSiteRef, DispatchKind},
    metadata::{token::MethodId, typesystem::TypeHierarchy},
};

/// A resolved call edge from a call site to one target method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallEdge {
    /// The calling method.
    pub source: MethodId,
    /// The call site within the caller.
    pub site: CallSiteRef,
    /// The callee.
    pub target: MethodId,
    /// Dispatch kind of the call site.
    pub kind: DispatchKind,
}

/// Directed multigraph of resolved calls between methods.
///
/// Several edges may share a source (a method with several calls) and several edges may share a
/// call site (virtual fan-out). Edge identity is the `(source, site, target, kind)` tuple.
///
/// # Examples
///
/// ```rust
/// use callscope::{
///     analysis::{CallGraph, CallSiteRef, DispatchKind},
///     metadata::token::MethodId,
/// };
///
/// let main = MethodId::new(0);
/// let print = MethodId::new(1);
/// let site = CallSiteRef::new(main, 3);
///
/// let mut graph = CallGraph::new();
/// assert!(graph.add_edge(main, site, print, DispatchKind::Virtual));
/// assert!(!graph.add_edge(main, site, print, DispatchKind::Virtual));
/// assert_eq!(graph.callees(main), vec![print]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    edges: Vec<CallEdge>,
    index: HashSet<CallEdge>,
    outgoing: HashMap<MethodId, Vec<usize>>,
    incoming: HashMap<MethodId, Vec<usize>>,
    by_site: HashMap<CallSiteRef, Vec<usize>>,
}

impl CallGraph {
    /// Creates an empty call graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an edge unless an identical edge already exists.
    ///
    /// # Arguments
    ///
    /// * `source` - The calling method
    /// * `site` - The call site within `source`
    /// * `target` - The resolved callee
    /// * `kind` - The dispatch kind of the call site
    ///
    /// # Returns
    ///
    /// `true` if the edge was new, `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `site` does not belong to `source`.
    pub fn add_edge(
        &mut self,
        source: MethodId,
        site: CallSiteRef,
        target: MethodId,
        kind: DispatchKind,
    ) -> bool {
        debug_assert_eq!(site.caller, source, "call site {site} is not owned by {source}");

        let edge = CallEdge {
            source,
            site,
            target,
            kind,
        };
        if !self.index.insert(edge) {
            return false;
        }

        let position = self.edges.len();
        self.edges.push(edge);
        self.outgoing.entry(source).or_default().push(position);
        self.incoming.entry(target).or_default().push(position);
        self.by_site.entry(site).or_default().push(position);
        true
    }

    /// Returns all edges whose target is `method`, in insertion order.
    pub fn edges_into(&self, method: MethodId) -> impl Iterator<Item = &CallEdge> {
        self.indexed(self.incoming.get(&method))
    }

    /// Returns all edges whose source is `method`, in insertion order.
    pub fn edges_out_of(&self, method: MethodId) -> impl Iterator<Item = &CallEdge> {
        self.indexed(self.outgoing.get(&method))
    }

    /// Returns all edges leaving a call site, in insertion order.
    pub fn edges_at(&self, site: CallSiteRef) -> impl Iterator<Item = &CallEdge> {
        self.indexed(self.by_site.get(&site))
    }

    fn indexed<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a CallEdge> + 'a {
        positions
            .into_iter()
            .flatten()
            .filter_map(|&position| self.edges.get(position))
    }

    /// Returns the distinct methods calling `method`, in first-seen order.
    #[must_use]
    pub fn callers(&self, method: MethodId) -> Vec<MethodId> {
        let mut seen = HashSet::new();
        self.edges_into(method)
            .map(|edge| edge.source)
            .filter(|source| seen.insert(*source))
            .collect()
    }

    /// Returns the distinct methods called by `method`, in first-seen order.
    #[must_use]
    pub fn callees(&self, method: MethodId) -> Vec<MethodId> {
        let mut seen = HashSet::new();
        self.edges_out_of(method)
            .map(|edge| edge.target)
            .filter(|target| seen.insert(*target))
            .collect()
    }

    /// Returns `true` if the exact edge is present.
    #[must_use]
    pub fn contains_edge(
        &self,
        source: MethodId,
        site: CallSiteRef,
        target: MethodId,
        kind: DispatchKind,
    ) -> bool {
        self.index.contains(&CallEdge {
            source,
            site,
            target,
            kind,
        })
    }

    /// Returns all edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of methods that appear as source or target of an edge.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.outgoing
            .keys()
            .chain(self.incoming.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Returns `true` if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns statistics about the call graph.
    ///
    /// # Returns
    ///
    /// A [`CallGraphStats`] structure containing various metrics about the graph.
    #[must_use]
    pub fn stats(&self) -> CallGraphStats {
        let mut edges_by_kind = [(DispatchKind::Virtual, 0); DispatchKind::COUNT];
        for (slot, kind) in edges_by_kind.iter_mut().zip(DispatchKind::iter()) {
            *slot = (kind, 0);
        }
        for edge in &self.edges {
            edges_by_kind[edge.kind as usize].1 += 1;
        }

        let leaf_methods = self
            .incoming
            .keys()
            .filter(|method| !self.outgoing.contains_key(method))
            .count();

        let recursive_methods = self
            .edges
            .iter()
            .filter(|edge| edge.source == edge.target)
            .map(|edge| edge.source)
            .collect::<HashSet<_>>()
            .len();

        CallGraphStats {
            method_count: self.method_count(),
            edge_count: self.edges.len(),
            call_sites: self.by_site.len(),
            polymorphic_sites: self.by_site.values().filter(|edges| edges.len() > 1).count(),
            leaf_methods,
            recursive_methods,
            edges_by_kind,
        }
    }

    /// Generates a DOT format representation of this call graph.
    ///
    /// Nodes are labelled with their qualified names; edges are labelled with the call site
    /// offset and dispatch kind.
    ///
    /// # Arguments
    ///
    /// * `hierarchy` - The hierarchy the method identifiers belong to
    /// * `title` - Optional title for the graph
    ///
    /// # Returns
    ///
    /// A string containing the DOT representation of the call graph.
    #[must_use]
    pub fn to_dot(&self, hierarchy: &TypeHierarchy, title: Option<&str>) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph {{");
        if let Some(title) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape(title));
        }
        let _ = writeln!(dot, "    node [shape=box, fontname=\"monospace\"];");

        let mut nodes: Vec<MethodId> = self
            .outgoing
            .keys()
            .chain(self.incoming.keys())
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        nodes.sort_unstable();

        for method in nodes {
            let label = hierarchy
                .qualified_name(method)
                .unwrap_or_else(|_| method.to_string());
            let _ = writeln!(dot, "    \"{method}\" [label=\"{}\"];", escape(&label));
        }
        for edge in &self.edges {
            let _ = writeln!(
                dot,
                "    \"{}\" -> \"{}\" [label=\"@{:04x} {}\"];",
                edge.source, edge.target, edge.site.offset, edge.kind
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Statistics about a call graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallGraphStats {
    /// Number of methods that appear in at least one edge.
    pub method_count: usize,
    /// Number of call edges between methods.
    pub edge_count: usize,
    /// Number of call sites with at least one resolved edge.
    pub call_sites: usize,
    /// Number of call sites with more than one target.
    pub polymorphic_sites: usize,
    /// Number of methods that are called but call nothing themselves.
    pub leaf_methods: usize,
    /// Number of methods calling themselves directly.
    pub recursive_methods: usize,
    /// Number of edges per dispatch kind.
    pub edges_by_kind: [(DispatchKind, usize); DispatchKind::COUNT],
}

impl CallGraphStats {
    /// Returns the number of edges of one dispatch kind.
    #[must_use]
    pub fn edges_of_kind(&self, kind: DispatchKind) -> usize {
        self.edges_by_kind[kind as usize].1
    }

    /// Returns the average number of targets per resolved call site.
    ///
    /// # Returns
    ///
    /// The mean fan-out, or 0.0 for an empty graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fan_out(&self) -> f64 {
        if self.call_sites == 0 {
            0.0
        } else {
            self.edge_count as f64 / self.call_sites as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::callgraph::{CallGraph, CallSiteRef, DispatchKind},
        metadata::token::MethodId,
        test::factories::diamond_hierarchy,
    };

    fn m(id: u32) -> MethodId {
        MethodId::new(id)
    }

    #[test]
    fn test_add_edge_idempotent() {
        let mut graph = CallGraph::new();
        let site = CallSiteRef::new(m(0), 1);

        assert!(graph.add_edge(m(0), site, m(1), DispatchKind::Static));
        assert!(!graph.add_edge(m(0), site, m(1), DispatchKind::Static));
        assert_eq!(graph.edge_count(), 1);

        // Same endpoints from a different site is a different edge.
        assert!(graph.add_edge(m(0), CallSiteRef::new(m(0), 2), m(1), DispatchKind::Static));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.callees(m(0)), vec![m(1)]);
        assert_eq!(graph.callers(m(1)), vec![m(0)]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not owned by")]
    fn test_add_edge_rejects_foreign_site() {
        let mut graph = CallGraph::new();
        graph.add_edge(m(0), CallSiteRef::new(m(1), 0), m(2), DispatchKind::Static);
    }

    #[test]
    fn test_edge_queries() {
        let mut graph = CallGraph::new();
        let site = CallSiteRef::new(m(0), 4);
        graph.add_edge(m(0), site, m(1), DispatchKind::Virtual);
        graph.add_edge(m(0), site, m(2), DispatchKind::Virtual);
        graph.add_edge(m(1), CallSiteRef::new(m(1), 0), m(2), DispatchKind::Special);

        assert_eq!(graph.edges_out_of(m(0)).count(), 2);
        assert_eq!(graph.edges_into(m(2)).count(), 2);
        assert_eq!(graph.edges_into(m(0)).count(), 0);
        assert_eq!(graph.edges_at(site).count(), 2);
        assert!(graph.contains_edge(m(0), site, m(2), DispatchKind::Virtual));
        assert!(!graph.contains_edge(m(0), site, m(2), DispatchKind::Interface));

        let targets: Vec<MethodId> = graph.edges().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![m(1), m(2), m(2)]);
        assert_eq!(graph.method_count(), 3);
        assert!(!graph.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut graph = CallGraph::new();
        let site = CallSiteRef::new(m(0), 4);
        graph.add_edge(m(0), site, m(1), DispatchKind::Interface);
        graph.add_edge(m(0), site, m(2), DispatchKind::Interface);
        graph.add_edge(m(1), CallSiteRef::new(m(1), 0), m(1), DispatchKind::Special);

        let stats = graph.stats();
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.method_count, 3);
        assert_eq!(stats.call_sites, 2);
        assert_eq!(stats.polymorphic_sites, 1);
        assert_eq!(stats.leaf_methods, 1);
        assert_eq!(stats.recursive_methods, 1);
        assert_eq!(stats.edges_of_kind(DispatchKind::Interface), 2);
        assert_eq!(stats.edges_of_kind(DispatchKind::Special), 1);
        assert_eq!(stats.edges_of_kind(DispatchKind::Static), 0);
        assert!((stats.average_fan_out() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_graph() {
        let graph = CallGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.method_count(), 0);
        assert!(graph.callers(m(0)).is_empty());
        assert!((graph.stats().average_fan_out() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_dot() {
        let fixture = diamond_hierarchy();
        let mut graph = CallGraph::new();
        graph.add_edge(
            fixture.base_ctor,
            CallSiteRef::new(fixture.base_ctor, 0),
            fixture.object_ctor,
            DispatchKind::Special,
        );

        let dot = graph.to_dot(&fixture.hierarchy, Some("diamond"));
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label=\"diamond\""));
        assert!(dot.contains("Base::<init>()V"));
        assert!(dot.contains("@0000 special"));
    }
}

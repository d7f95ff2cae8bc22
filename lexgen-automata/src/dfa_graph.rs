use crate::charset::CharSet;

use std::collections::BTreeMap;



// ================
// == DfaGraph ====
// ================

/// The transition graph of a DFA: a vertex count plus an edge-labeled
/// adjacency relation, `(source, target) -> CharSet`.
///
/// Edges are keyed by endpoints rather than stored per-character, since a
/// single transition out of a derivative-class-built DFA state already
/// covers a whole `CharSet` of input symbols at once. Outgoing edges from
/// the same source are kept pairwise disjoint by the builder (each
/// target receives a distinct derivative class); `DfaGraph` itself does
/// not enforce this, it only merges an edge into whatever is already
/// recorded between the same two vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DfaGraph {
    vertex_count: usize,
    edges: BTreeMap<(usize, usize), CharSet>,
}

impl DfaGraph {
    /// An empty graph with no vertices.
    pub fn new() -> Self {
        DfaGraph::default()
    }

    /// Adds a fresh vertex and returns its id.
    pub fn create_vertex(&mut self) -> usize {
        let id = self.vertex_count;
        self.vertex_count += 1;
        id
    }

    /// The number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Adds `set` to the label on the edge `source -> target`, unioning
    /// with whatever label that edge already carries.
    pub fn add_edge(&mut self, source: usize, target: usize, set: CharSet) {
        if set.is_empty() {
            return;
        }
        self.edges
            .entry((source, target))
            .and_modify(|existing| *existing = existing.union(&set))
            .or_insert(set);
    }

    /// The label on the edge `source -> target`, if any.
    pub fn edge(&self, source: usize, target: usize) -> Option<&CharSet> {
        self.edges.get(&(source, target))
    }

    /// Every outgoing edge of `source`, as `(target, label)` pairs.
    pub fn outgoing(&self, source: usize) -> impl Iterator<Item = (usize, &CharSet)> {
        self.edges
            .range((source, usize::MIN)..(source + 1, usize::MIN))
            .map(|(&(_, target), set)| (target, set))
    }

    /// Every edge in the graph, as `((source, target), label)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&(usize, usize), &CharSet)> {
        self.edges.iter()
    }
}



// =============
// === Tests ===
// =============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_vertex_assigns_sequential_ids() {
        let mut g = DfaGraph::new();
        assert_eq!(g.create_vertex(), 0);
        assert_eq!(g.create_vertex(), 1);
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn add_edge_unions_repeated_labels() {
        let mut g = DfaGraph::new();
        let (s, t) = (g.create_vertex(), g.create_vertex());
        g.add_edge(s, t, CharSet::of_range(0, 5));
        g.add_edge(s, t, CharSet::of_range(10, 15));
        assert_eq!(g.edge(s, t).unwrap().ranges(), &[(0, 5), (10, 15)]);
    }

    #[test]
    fn add_edge_with_empty_set_is_a_no_op() {
        let mut g = DfaGraph::new();
        let (s, t) = (g.create_vertex(), g.create_vertex());
        g.add_edge(s, t, CharSet::empty());
        assert!(g.edge(s, t).is_none());
    }

    #[test]
    fn outgoing_lists_only_edges_from_the_given_source() {
        let mut g = DfaGraph::new();
        let (a, b, c) = (g.create_vertex(), g.create_vertex(), g.create_vertex());
        g.add_edge(a, b, CharSet::of_range(0, 5));
        g.add_edge(a, c, CharSet::of_range(6, 10));
        g.add_edge(b, c, CharSet::of_range(0, 1));
        let mut targets: Vec<usize> = g.outgoing(a).map(|(t, _)| t).collect();
        targets.sort_unstable();
        assert_eq!(targets, vec![b, c]);
    }
}

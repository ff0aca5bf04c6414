//! Convert trees and the network itself to petgraph graphs

use crate::assemble::SpanningTree;
use crate::universe::{PermutationUniverse, VertexId};
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};

/// Directed graph with one `parent -> child` edge per tree edge
///
/// Node `i` carries vertex id `i`.
pub fn tree_to_graph(tree: &SpanningTree) -> DiGraph<VertexId, ()> {
    let count = tree.vertex_count();
    let mut graph = DiGraph::with_capacity(count, tree.edge_count());
    for v in 0..count as VertexId {
        graph.add_node(v);
    }
    for (parent, child) in tree.edges() {
        graph.add_edge(NodeIndex::new(parent as usize), NodeIndex::new(child as usize), ());
    }
    graph
}

/// The bubble-sort network `B_n` as an undirected graph
///
/// Each edge appears once, from the smaller id to the larger.
pub fn bubble_sort_network(universe: &PermutationUniverse) -> UnGraph<VertexId, ()> {
    let count = universe.len();
    let n = universe.n();
    let mut graph = UnGraph::with_capacity(count, count * (n - 1) / 2);
    for v in 0..count as VertexId {
        graph.add_node(v);
    }
    for v in 0..count as VertexId {
        for w in universe.neighbors(v).into_iter().filter(|&w| w > v) {
            graph.add_edge(NodeIndex::new(v as usize), NodeIndex::new(w as usize), ());
        }
    }
    graph
}

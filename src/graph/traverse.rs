// src/graph/traverse.rs

//! Generic traversal primitives shared by the task graph and the command
//! graph.
//!
//! All early exits use a cooperative stop signal: the callback returns
//! `true` to halt the walk, and the driver simply stops calling it. No
//! panics or unwinding are involved in control flow.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, IntoNeighbors, IntoNeighborsDirected, Visitable};

use crate::errors::{Result, ShardplanError};

/// Calls `visit` on every predecessor of vertex `v` within the graph, in
/// edge-storage order. Returning `true` from the callback stops the walk.
///
/// Returns `false` if the walk was stopped early.
pub fn for_predecessors<G, F>(graph: G, v: G::NodeId, mut visit: F) -> bool
where
    G: IntoNeighborsDirected,
    F: FnMut(G::NodeId) -> bool,
{
    for pre in graph.neighbors_directed(v, Direction::Incoming) {
        if visit(pre) {
            return false;
        }
    }
    true
}

/// Calls `visit` on every successor of vertex `v` within the graph, in
/// edge-storage order. Returning `true` from the callback stops the walk.
///
/// Returns `false` if the walk was stopped early.
pub fn for_successors<G, F>(graph: G, v: G::NodeId, mut visit: F) -> bool
where
    G: IntoNeighborsDirected,
    F: FnMut(G::NodeId) -> bool,
{
    for suc in graph.neighbors_directed(v, Direction::Outgoing) {
        if visit(suc) {
            return false;
        }
    }
    true
}

/// Breadth-first search from `start`, calling `visit` once on first
/// discovery of each reachable vertex. A `true` return stops the search
/// immediately; no further vertices are visited.
///
/// Results are communicated through state captured by the closure.
pub fn search_breadth_first<G, F>(graph: G, start: G::NodeId, mut visit: F)
where
    G: IntoNeighbors + Visitable,
    G::NodeId: Copy + PartialEq,
    F: FnMut(G::NodeId) -> bool,
{
    let mut bfs = Bfs::new(graph, start);
    while let Some(v) = bfs.next(graph) {
        if visit(v) {
            break;
        }
    }
}

/// Replace the edge `u -> v` with `u -> w -> v` where `w` is a fresh vertex
/// carrying `weight`. Both new edges inherit the removed edge's weight.
///
/// The edge `u -> v` must exist; callers only invoke this where graph
/// construction history guarantees it. A missing edge means the caller's
/// bookkeeping and the graph have diverged.
pub fn insert_vertex_on_edge<N, E: Clone>(
    u: NodeIndex,
    v: NodeIndex,
    weight: N,
    graph: &mut DiGraph<N, E>,
) -> Result<NodeIndex> {
    let edge = graph
        .find_edge(u, v)
        .ok_or(ShardplanError::MissingEdge { from: u, to: v })?;
    let dep = graph
        .remove_edge(edge)
        .ok_or(ShardplanError::MissingEdge { from: u, to: v })?;
    let w = graph.add_node(weight);
    graph.add_edge(u, w, dep.clone());
    graph.add_edge(w, v, dep);
    Ok(w)
}

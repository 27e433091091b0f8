// src/graph/readiness.rs

//! Readiness engine: which tasks may be synthesized next.
//!
//! Distributed synthesis commits to how each task's iteration space is
//! split across nodes. Tasks that are transitively linked through shared
//! parents have to make that commitment together, so the engine only hands
//! out whole sibling groups.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::graph::task::{TaskGraph, TaskNode};
use crate::graph::traverse::{for_predecessors, for_successors};
use crate::types::TaskId;

/// Returns a set of tasks that
///  (1) have all their requirements satisfied (i.e., all predecessors are
///      marked as processed)
///  (2) don't have any unsatisfied siblings.
///
/// Siblingness is transitive: not every pair of returned tasks necessarily
/// shares a parent, but all of them are connected through some
/// child->parent->child chain. The result is sorted by task id; it is empty
/// when no complete group is ready yet.
pub fn satisfied_sibling_set(task_graph: &TaskGraph) -> Vec<TaskId> {
    let graph = task_graph.graph();
    for seed in graph.node_indices() {
        if graph[seed].processed || !requirements_met(graph, seed) {
            continue;
        }
        if let Some(mut set) = collect_sibling_group(graph, seed) {
            set.sort_unstable();
            debug!(tasks = ?set, "satisfied sibling set found");
            return set;
        }
    }
    Vec::new()
}

/// All predecessors processed? Stops at the first unprocessed one.
fn requirements_met(graph: &DiGraph<TaskNode, ()>, v: NodeIndex) -> bool {
    for_predecessors(graph, v, |pre| !graph[pre].processed)
}

/// Expand `seed` into its transitive sibling group, or `None` if any
/// reachable sibling disqualifies the group.
///
/// A sibling that is already processed also disqualifies: groups are meant
/// to be processed atomically, so finding one half-done means the caller
/// marked tasks out of band, and handing out the remainder would split the
/// group's partitioning decision.
fn collect_sibling_group(graph: &DiGraph<TaskNode, ()>, seed: NodeIndex) -> Option<Vec<TaskId>> {
    let mut group: HashSet<NodeIndex> = HashSet::new();
    let mut checked_parents: HashSet<NodeIndex> = HashSet::new();
    let mut pending: VecDeque<NodeIndex> = VecDeque::new();
    group.insert(seed);
    pending.push_back(seed);

    while let Some(sib) = pending.pop_front() {
        let completed = for_predecessors(graph, sib, |parent| {
            if !checked_parents.insert(parent) {
                // Parent already expanded; nothing new behind it.
                return false;
            }
            let group_ok = for_successors(graph, parent, |candidate| {
                if group.contains(&candidate) {
                    return false;
                }
                if graph[candidate].processed || !requirements_met(graph, candidate) {
                    // Disqualified sibling; abort the whole group.
                    return true;
                }
                group.insert(candidate);
                pending.push_back(candidate);
                false
            });
            !group_ok
        });
        if !completed {
            return None;
        }
    }

    Some(group.iter().map(|&v| graph[v].id).collect())
}

// src/graph/mod.rs

//! Graph structures and the command-synthesis core.
//!
//! - [`traverse`] provides generic predecessor/successor iteration,
//!   breadth-first search with cooperative early abort, and the
//!   edge-splitting insertion primitive.
//! - [`task`] holds the task graph and its `processed` bookkeeping.
//! - [`readiness`] computes the next satisfied sibling set.
//! - [`command`] holds the command graph, task spans and the compute /
//!   master-access builders.
//! - [`pull`] splices PULL / AWAIT_PULL pairs across node boundaries.

pub mod command;
pub mod pull;
pub mod readiness;
pub mod task;
pub mod traverse;

pub use command::{
    Command, CommandGraph, CommandPayload, CommandVertex, EdgeKind, TaskSpan, VertexKind,
};
pub use readiness::satisfied_sibling_set;
pub use task::{TaskGraph, TaskNode};
pub use traverse::{for_predecessors, for_successors, insert_vertex_on_edge, search_breadth_first};

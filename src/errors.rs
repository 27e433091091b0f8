// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Two classes of failure flow through [`ShardplanError`]:
//!
//! - invariant violations in the graph core (duplicate spans, missing
//!   edges, an unmatchable pull source) — these indicate a defect in the
//!   caller or an inconsistent plan and are never retried;
//! - plan loading problems (IO, TOML syntax, semantic validation).
//!
//! Traversal early exits are *not* errors; they are plain control flow
//! inside `graph::traverse`.

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::types::{BufferId, NodeId, TaskId};

#[derive(Error, Debug)]
pub enum ShardplanError {
    #[error("Plan error: {0}")]
    PlanError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("task {0} already has a span in the command graph")]
    DuplicateSpan(TaskId),

    #[error("no edge between vertices {from:?} and {to:?}")]
    MissingEdge { from: NodeIndex, to: NodeIndex },

    #[error("vertex {0:?} is not a compute or master-access command")]
    NotARequiringCommand(NodeIndex),

    #[error("no command produces buffer {buffer} on node {node} within task {task}'s span")]
    NoSourceCommand {
        buffer: BufferId,
        node: NodeId,
        task: TaskId,
    },

    #[error("task graph stalled: {0} tasks can never become satisfied")]
    Stalled(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShardplanError>;

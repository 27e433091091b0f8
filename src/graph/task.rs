// src/graph/task.rs

//! The task graph: submitted tasks and their data dependencies.
//!
//! Task vertices are produced by the upstream submission side; this core
//! only reads the dependency structure and flips the per-task `processed`
//! flag once command synthesis for the task is done.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::errors::{Result, ShardplanError};
use crate::types::TaskId;

/// Vertex payload of the task graph.
#[derive(Debug, Clone)]
pub struct TaskNode {
    pub id: TaskId,
    /// Set once the task's commands have been synthesized.
    pub processed: bool,
}

/// Directed acyclic graph of tasks. An edge `parent -> child` means the
/// child's command synthesis may depend on the parent's buffer contents.
///
/// Tasks persist for the whole scheduling session; they are never removed.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    name: String,
    graph: DiGraph<TaskNode, ()>,
    index: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Graph name used by the export adapter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new task vertex, initially unprocessed.
    pub fn add_task(&mut self, id: TaskId) -> Result<NodeIndex> {
        if self.index.contains_key(&id) {
            return Err(ShardplanError::PlanError(format!(
                "task {id} submitted twice to the task graph"
            )));
        }
        let v = self.graph.add_node(TaskNode {
            id,
            processed: false,
        });
        self.index.insert(id, v);
        Ok(v)
    }

    /// Record that `child` depends on `parent`'s buffer contents.
    pub fn add_dependency(&mut self, parent: TaskId, child: TaskId) -> Result<()> {
        let p = self.node_index(parent).ok_or(ShardplanError::UnknownTask(parent))?;
        let c = self.node_index(child).ok_or(ShardplanError::UnknownTask(child))?;
        // update_edge keeps the edge set simple even if a dependency is
        // declared twice.
        self.graph.update_edge(p, c, ());
        Ok(())
    }

    pub fn node_index(&self, id: TaskId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    /// Processed flag for `id`, or `None` for an unknown task.
    pub fn processed(&self, id: TaskId) -> Option<bool> {
        self.node_index(id).map(|v| self.graph[v].processed)
    }

    /// Mark a task's command synthesis as done. Idempotent.
    pub fn mark_as_processed(&mut self, id: TaskId) -> Result<()> {
        let v = self
            .node_index(id)
            .ok_or(ShardplanError::UnknownTask(id))?;
        let node = &mut self.graph[v];
        if node.processed {
            debug!(task = %id, "task already marked as processed");
            return Ok(());
        }
        node.processed = true;
        debug!(task = %id, "task marked as processed");
        Ok(())
    }

    /// Number of tasks not yet processed.
    pub fn unprocessed_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&v| !self.graph[v].processed)
            .count()
    }

    /// Underlying petgraph structure, for traversal and export.
    pub fn graph(&self) -> &DiGraph<TaskNode, ()> {
        &self.graph
    }
}

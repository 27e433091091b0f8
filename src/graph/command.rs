// src/graph/command.rs

//! The command graph: per-node actions synthesized for each task.
//!
//! Every task owns a *span*: a `(begin, end)` vertex pair bracketing all of
//! its commands. Commands are attached inside the span, either directly
//! (first command on a node) or by splitting an existing edge, so that a
//! `begin -> ... -> end` path always exists and every command lies on one.
//! Command vertices are append-only; nothing is deleted or mutated after
//! creation.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::errors::{Result, ShardplanError};
use crate::graph::task::TaskGraph;
use crate::graph::traverse::for_predecessors;
use crate::region::{GridBox, Subrange};
use crate::types::{BufferId, NodeId, TaskId, MASTER_NODE};

/// Edge payload of the command graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `source` must be ordered before `target` in its node's local
    /// command sequence.
    Order,
    /// One half of the bidirectional PULL <-> AWAIT_PULL association. Not
    /// an execution-order constraint; lets consumers find the counterpart
    /// command in O(1) from either side.
    Sync,
}

/// The `(begin, end)` vertex pair bracketing one task's commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpan {
    pub begin: NodeIndex,
    pub end: NodeIndex,
}

/// Vertex payload of the command graph.
#[derive(Debug, Clone)]
pub struct CommandVertex {
    /// Owning task: for compute / master-access the task being executed,
    /// for pull / await-pull the task that triggered the transfer.
    pub task: TaskId,
    /// Human-readable description for diagnostics. Never consulted by
    /// scheduling logic.
    pub label: String,
    pub kind: VertexKind,
}

impl CommandVertex {
    /// The concrete command, or `None` for span markers.
    pub fn command(&self) -> Option<&Command> {
        match &self.kind {
            VertexKind::Command(cmd) => Some(cmd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum VertexKind {
    /// Structural marker opening a task's span.
    SpanBegin,
    /// Structural marker closing a task's span.
    SpanEnd,
    Command(Command),
}

/// One concrete per-node action.
#[derive(Debug, Clone)]
pub struct Command {
    /// The cluster node this command executes on.
    pub node: NodeId,
    pub payload: CommandPayload,
}

#[derive(Debug, Clone)]
pub enum CommandPayload {
    /// Execute the task's kernel on a sub-range of its iteration space.
    Compute { chunk: GridBox },
    /// Whole-task access on the master node.
    MasterAccess,
    /// Fetch `region` of `buffer` from `source` before the requiring
    /// command runs.
    Pull {
        buffer: BufferId,
        source: NodeId,
        region: GridBox,
    },
    /// Serve `region` of `buffer` to the requesting node `target` (for its
    /// task `target_task`); ordered ahead of the local producing command.
    AwaitPull {
        buffer: BufferId,
        target: NodeId,
        target_task: TaskId,
        region: GridBox,
    },
}

/// Per-session command graph plus the span table for all synthesized tasks.
#[derive(Debug, Clone)]
pub struct CommandGraph {
    name: String,
    graph: DiGraph<CommandVertex, EdgeKind>,
    spans: HashMap<TaskId, TaskSpan>,
}

impl CommandGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: DiGraph::new(),
            spans: HashMap::new(),
        }
    }

    /// Graph name used by the export adapter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying petgraph structure, for traversal and export.
    pub fn graph(&self) -> &DiGraph<CommandVertex, EdgeKind> {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut DiGraph<CommandVertex, EdgeKind> {
        &mut self.graph
    }

    /// Span of an already-synthesized task.
    pub fn span(&self, task: TaskId) -> Option<TaskSpan> {
        self.spans.get(&task).copied()
    }

    pub fn vertex(&self, v: NodeIndex) -> Option<&CommandVertex> {
        self.graph.node_weight(v)
    }

    /// Number of concrete commands (span markers excluded).
    pub fn command_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&v| self.graph[v].command().is_some())
            .count()
    }

    /// Allocate a fresh `(begin, end)` span for `task` and order it after
    /// the spans of all already-synthesized parents.
    ///
    /// Calling this twice for one task id is a defect in the driving loop
    /// and fails with [`ShardplanError::DuplicateSpan`].
    pub fn add_task(&mut self, task: TaskId, task_graph: &TaskGraph) -> Result<TaskSpan> {
        if self.spans.contains_key(&task) {
            return Err(ShardplanError::DuplicateSpan(task));
        }
        let begin = self.graph.add_node(CommandVertex {
            task,
            label: format!("Begin task {task}"),
            kind: VertexKind::SpanBegin,
        });
        let end = self.graph.add_node(CommandVertex {
            task,
            label: format!("End task {task}"),
            kind: VertexKind::SpanEnd,
        });
        self.graph.add_edge(begin, end, EdgeKind::Order);
        let span = TaskSpan { begin, end };
        self.spans.insert(task, span);

        // Task-graph dependency edges become ordering edges at span
        // granularity: parent end -> child begin.
        if let Some(tv) = task_graph.node_index(task) {
            let tdag = task_graph.graph();
            for_predecessors(tdag, tv, |parent| {
                if let Some(parent_span) = self.spans.get(&tdag[parent].id) {
                    self.graph.add_edge(parent_span.end, begin, EdgeKind::Order);
                }
                false
            });
        }

        debug!(task = %task, "allocated command span");
        Ok(span)
    }

    /// Append a COMPUTE command for `chunk` of the span's task on `node`.
    ///
    /// The span must have been returned by [`add_task`](Self::add_task) on
    /// this graph.
    pub fn add_compute_cmd(&mut self, node: NodeId, span: TaskSpan, chunk: &Subrange) -> NodeIndex {
        let task = self.graph[span.begin].task;
        let region = chunk.to_box();
        let v = self.graph.add_node(CommandVertex {
            task,
            label: format!("Node {node}:\\nCOMPUTE {region}"),
            kind: VertexKind::Command(Command {
                node,
                payload: CommandPayload::Compute { chunk: region },
            }),
        });
        self.graph.add_edge(span.begin, v, EdgeKind::Order);
        self.graph.add_edge(v, span.end, EdgeKind::Order);
        debug!(task = %task, node = %node, %region, "added compute command");
        v
    }

    /// Append a MASTER_ACCESS command for the span's task. Master access
    /// is implicitly bound to the master node and covers the whole task.
    pub fn add_master_access_cmd(&mut self, span: TaskSpan) -> NodeIndex {
        let task = self.graph[span.begin].task;
        let v = self.graph.add_node(CommandVertex {
            task,
            label: format!("Node {MASTER_NODE}:\\nMASTER ACCESS"),
            kind: VertexKind::Command(Command {
                node: MASTER_NODE,
                payload: CommandPayload::MasterAccess,
            }),
        });
        self.graph.add_edge(span.begin, v, EdgeKind::Order);
        self.graph.add_edge(v, span.end, EdgeKind::Order);
        debug!(task = %task, "added master access command");
        v
    }

    /// The counterpart of a PULL / AWAIT_PULL vertex, via its `Sync` edge.
    pub fn sync_counterpart(&self, v: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges(v)
            .find(|e| *e.weight() == EdgeKind::Sync)
            .map(|e| e.target())
    }

    /// Insert `vertex` ordered between `begin` and `target`.
    ///
    /// Splits the direct `begin -> target` edge when it exists. An earlier
    /// insertion may already have consumed that edge; the new vertex then
    /// opens a parallel `begin -> v -> target` path, which preserves both
    /// the ordering constraint and span reachability.
    pub(crate) fn insert_ordered_before(
        &mut self,
        begin: NodeIndex,
        target: NodeIndex,
        vertex: CommandVertex,
    ) -> NodeIndex {
        if let Some(edge) = self.graph.find_edge(begin, target) {
            self.graph.remove_edge(edge);
        }
        let v = self.graph.add_node(vertex);
        self.graph.add_edge(begin, v, EdgeKind::Order);
        self.graph.add_edge(v, target, EdgeKind::Order);
        v
    }
}

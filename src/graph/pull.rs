// src/graph/pull.rs

//! Pull protocol synthesizer.
//!
//! When a compute or master-access command needs a buffer region that
//! lives on another node, a PULL command is spliced in before the consumer
//! on the requesting node, and a matching AWAIT_PULL is spliced into the
//! source task's span on the owning node. The pair is linked with a
//! bidirectional `Sync` edge so either side can find its counterpart.

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::errors::{Result, ShardplanError};
use crate::graph::command::{
    Command, CommandGraph, CommandPayload, CommandVertex, EdgeKind, TaskSpan, VertexKind,
};
use crate::graph::traverse::search_breadth_first;
use crate::region::GridBox;
use crate::types::{BufferId, NodeId, MASTER_NODE};

impl CommandGraph {
    /// Synthesize the data movement for one unresolved buffer requirement:
    /// `requiring_cmd` on `node` needs `region` of `buffer`, currently
    /// owned on `source_node` by the task of `source_span`.
    ///
    /// The PULL lands strictly before `requiring_cmd` inside `span`; the
    /// AWAIT_PULL lands before the source task's producing command on
    /// `source_node` (or before the source span's `end`, if the source is
    /// the master node and no producing command exists). Returns the PULL
    /// vertex.
    pub fn add_pull_cmd(
        &mut self,
        node: NodeId,
        source_node: NodeId,
        buffer: BufferId,
        span: TaskSpan,
        source_span: TaskSpan,
        requiring_cmd: NodeIndex,
        region: &GridBox,
    ) -> Result<NodeIndex> {
        let task = self.graph()[span.begin].task;
        let source_task = self.graph()[source_span.begin].task;

        // The consumer must be a compute / master-access command of the
        // requesting task; anything else means the caller handed us spans
        // and vertices that don't belong together.
        match self.graph().node_weight(requiring_cmd) {
            Some(CommandVertex {
                task: cmd_task,
                kind:
                    VertexKind::Command(Command {
                        payload: CommandPayload::Compute { .. } | CommandPayload::MasterAccess,
                        ..
                    }),
                ..
            }) if *cmd_task == task => {}
            _ => return Err(ShardplanError::NotARequiringCommand(requiring_cmd)),
        }

        let pull = self.insert_ordered_before(
            span.begin,
            requiring_cmd,
            CommandVertex {
                task,
                label: format!("Node {node}:\\nPULL {buffer} from {source_node}\\n {region}"),
                kind: VertexKind::Command(Command {
                    node,
                    payload: CommandPayload::Pull {
                        buffer,
                        source: source_node,
                        region: *region,
                    },
                }),
            },
        );

        // Find the compute / master access command for the source node in
        // the source task. Master access always qualifies: it stands in
        // for "the master node owns this data regardless of partitioning",
        // and is generally not on the source node at all.
        let graph = self.graph();
        let mut source_cmd: Option<NodeIndex> = None;
        search_breadth_first(graph, source_span.begin, |v| {
            if let Some(cmd) = graph[v].command() {
                let qualifies = match cmd.payload {
                    CommandPayload::MasterAccess => true,
                    CommandPayload::Compute { .. } => cmd.node == source_node,
                    _ => false,
                };
                if qualifies {
                    source_cmd = Some(v);
                    return true;
                }
            }
            false
        });

        // If the buffer lives on the master node there is often no
        // explicit producing command in the source task; the await then
        // goes anywhere in the span, i.e. right before its end. Only node
        // 0 gets this fallback.
        let source_cmd = match source_cmd {
            Some(v) => v,
            None if source_node == MASTER_NODE => source_span.end,
            None => {
                return Err(ShardplanError::NoSourceCommand {
                    buffer,
                    node: source_node,
                    task: source_task,
                });
            }
        };

        let await_pull = self.insert_ordered_before(
            source_span.begin,
            source_cmd,
            CommandVertex {
                task: source_task,
                label: format!("Node {source_node}:\\nAWAIT PULL {buffer} by {node}\\n {region}"),
                kind: VertexKind::Command(Command {
                    node: source_node,
                    payload: CommandPayload::AwaitPull {
                        buffer,
                        target: node,
                        target_task: task,
                        region: *region,
                    },
                }),
            },
        );

        // Cross-node association, both directions.
        self.graph_mut().add_edge(pull, await_pull, EdgeKind::Sync);
        self.graph_mut().add_edge(await_pull, pull, EdgeKind::Sync);

        debug!(
            task = %task,
            node = %node,
            source_task = %source_task,
            source_node = %source_node,
            buffer = %buffer,
            %region,
            "synthesized pull / await-pull pair"
        );

        Ok(pull)
    }
}

#![allow(dead_code)]

use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use petgraph::visit::{EdgeFiltered, EdgeRef};
use shardplan::graph::{Command, CommandGraph, CommandPayload, EdgeKind};
use shardplan::types::TaskId;

/// True if `to` is reachable from `from` over `Order` edges only.
///
/// `Sync` edges are deliberately excluded: they model the cross-node
/// pull/await association, not execution order.
pub fn ordered_path(cdag: &CommandGraph, from: NodeIndex, to: NodeIndex) -> bool {
    let ordered = EdgeFiltered::from_fn(cdag.graph(), |e| *e.weight() == EdgeKind::Order);
    has_path_connecting(&ordered, from, to, None)
}

/// All command vertices (span markers excluded) matching `pred`.
pub fn find_commands(
    cdag: &CommandGraph,
    mut pred: impl FnMut(&Command) -> bool,
) -> Vec<NodeIndex> {
    cdag.graph()
        .node_indices()
        .filter(|&v| {
            cdag.graph()[v]
                .command()
                .map(|c| pred(c))
                .unwrap_or(false)
        })
        .collect()
}

/// The single command vertex matching `pred`; panics if there isn't
/// exactly one.
pub fn the_command(cdag: &CommandGraph, pred: impl FnMut(&Command) -> bool) -> NodeIndex {
    let found = find_commands(cdag, pred);
    assert_eq!(found.len(), 1, "expected exactly one matching command");
    found[0]
}

/// Assert the span invariant for `task`: `end` is reachable from `begin`,
/// and every one of the task's commands lies on a `begin -> ... -> end`
/// path.
pub fn assert_span_invariant(cdag: &CommandGraph, task: TaskId) {
    let span = cdag.span(task).expect("task has no span");
    assert!(
        ordered_path(cdag, span.begin, span.end),
        "span end not reachable from begin for task {task}"
    );
    for v in cdag.graph().node_indices() {
        let vertex = &cdag.graph()[v];
        if vertex.task != task || vertex.command().is_none() {
            continue;
        }
        assert!(
            ordered_path(cdag, span.begin, v),
            "command {v:?} of task {task} not reachable from span begin"
        );
        assert!(
            ordered_path(cdag, v, span.end),
            "span end not reachable from command {v:?} of task {task}"
        );
    }
}

/// Assert that every PULL has exactly one AWAIT_PULL counterpart and vice
/// versa, linked through `Sync` edges in both directions.
pub fn assert_pull_await_bijection(cdag: &CommandGraph) {
    let pulls = find_commands(cdag, |c| matches!(c.payload, CommandPayload::Pull { .. }));
    let awaits = find_commands(cdag, |c| matches!(c.payload, CommandPayload::AwaitPull { .. }));
    assert_eq!(pulls.len(), awaits.len(), "unpaired pulls or awaits");

    for &pull in &pulls {
        let counterpart = cdag
            .sync_counterpart(pull)
            .expect("pull without sync counterpart");
        assert!(
            awaits.contains(&counterpart),
            "pull counterpart is not an await-pull"
        );
        assert_eq!(
            cdag.sync_counterpart(counterpart),
            Some(pull),
            "await-pull does not link back to its pull"
        );
    }
}

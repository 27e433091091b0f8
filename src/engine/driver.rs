// src/engine/driver.rs

//! Plan-driven synthesis loop.
//!
//! This is the upstream scheduler loop the graph core serves: repeatedly
//! take a satisfied sibling set from the readiness engine, allocate spans,
//! add the declared compute / master-access commands, wire the declared
//! pulls, and mark the set processed. Incremental by construction — each
//! round only commits to tasks whose whole sibling group is ready.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::NodeIndex;
use tracing::info;

use crate::config::model::{PlanFile, TaskConfig};
use crate::errors::{Result, ShardplanError};
use crate::graph::{satisfied_sibling_set, CommandGraph, TaskGraph};
use crate::region::Subrange;
use crate::types::{BufferId, NodeId, TaskId, MASTER_NODE};

/// Build the task graph for a validated plan.
///
/// Task ids are assigned in plan order (the task table is sorted by name);
/// the returned map translates plan names to ids.
pub fn build_task_graph(plan: &PlanFile) -> Result<(TaskGraph, BTreeMap<String, TaskId>)> {
    let mut tdag = TaskGraph::new("TaskGraph");
    let mut ids = BTreeMap::new();

    for (i, name) in plan.task.keys().enumerate() {
        let id = TaskId(i as u64);
        tdag.add_task(id)?;
        ids.insert(name.clone(), id);
    }
    for (name, task) in plan.task.iter() {
        for dep in task.after.iter() {
            tdag.add_dependency(ids[dep.as_str()], ids[name.as_str()])?;
        }
    }

    Ok((tdag, ids))
}

/// Run command synthesis for a whole plan and return the finished command
/// graph.
///
/// Fails with [`ShardplanError::Stalled`] if unprocessed tasks remain but
/// no sibling set can become satisfied (which a validated plan should
/// never produce).
pub fn build_command_graph(plan: &PlanFile) -> Result<CommandGraph> {
    let (mut tdag, ids) = build_task_graph(plan)?;
    let names: HashMap<TaskId, String> = ids.iter().map(|(n, &id)| (id, n.clone())).collect();
    let mut cdag = CommandGraph::new("CommandGraph");

    // Consumer command vertices, for resolving which command a pull feeds.
    let mut computes: HashMap<(TaskId, NodeId), NodeIndex> = HashMap::new();
    let mut master_accesses: HashMap<TaskId, NodeIndex> = HashMap::new();

    loop {
        let set = satisfied_sibling_set(&tdag);
        if set.is_empty() {
            let remaining = tdag.unprocessed_count();
            if remaining == 0 {
                break;
            }
            return Err(ShardplanError::Stalled(remaining));
        }
        info!(tasks = ?set, "synthesizing sibling set");

        // Spans and local commands for the whole set first; pulls can then
        // resolve consumer commands regardless of in-set order.
        for &tid in &set {
            let cfg = config_for(plan, &names, tid)?;
            let span = cdag.add_task(tid, &tdag)?;
            for compute in cfg.compute.iter() {
                let chunk = subrange_of(&compute.offset, &compute.range)?;
                let node = NodeId(compute.node);
                let v = cdag.add_compute_cmd(node, span, &chunk);
                computes.insert((tid, node), v);
            }
            if cfg.master_access {
                let v = cdag.add_master_access_cmd(span);
                master_accesses.insert(tid, v);
            }
        }

        for &tid in &set {
            let cfg = config_for(plan, &names, tid)?;
            let span = cdag.span(tid).ok_or_else(|| {
                ShardplanError::PlanError(format!("task {tid} lost its span during synthesis"))
            })?;
            for pull in cfg.pull.iter() {
                let source_tid = ids[pull.source_task.as_str()];
                let source_span = cdag.span(source_tid).ok_or_else(|| {
                    ShardplanError::PlanError(format!(
                        "pull source task '{}' has no span yet",
                        pull.source_task
                    ))
                })?;
                let requiring = match pull.node {
                    Some(n) => computes.get(&(tid, NodeId(n))),
                    None => master_accesses.get(&tid),
                }
                .copied()
                .ok_or_else(|| {
                    ShardplanError::PlanError(format!(
                        "task {tid}: pull has no consuming command"
                    ))
                })?;
                let node = pull.node.map(NodeId).unwrap_or(MASTER_NODE);
                let region = subrange_of(&pull.offset, &pull.range)?.to_box();
                cdag.add_pull_cmd(
                    node,
                    NodeId(pull.source_node),
                    BufferId(pull.buffer),
                    span,
                    source_span,
                    requiring,
                    &region,
                )?;
            }
            tdag.mark_as_processed(tid)?;
        }
    }

    info!(
        tasks = ids.len(),
        commands = cdag.command_count(),
        "command graph complete"
    );
    Ok(cdag)
}

fn config_for<'p>(
    plan: &'p PlanFile,
    names: &HashMap<TaskId, String>,
    tid: TaskId,
) -> Result<&'p TaskConfig> {
    names
        .get(&tid)
        .and_then(|name| plan.task.get(name))
        .ok_or(ShardplanError::UnknownTask(tid))
}

fn subrange_of(offset: &[u64], range: &[u64]) -> Result<Subrange> {
    Subrange::from_dims(offset, range).ok_or_else(|| {
        ShardplanError::PlanError("malformed offset/range survived plan validation".to_string())
    })
}

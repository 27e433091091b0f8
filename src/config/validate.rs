// src/config/validate.rs

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{PlanFile, RawPlanFile};
use crate::errors::{Result, ShardplanError};
use crate::region::Subrange;

impl TryFrom<RawPlanFile> for PlanFile {
    type Error = crate::errors::ShardplanError;

    fn try_from(raw: RawPlanFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_plan(&raw)?;
        Ok(PlanFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_plan(plan: &RawPlanFile) -> Result<()> {
    ensure_has_tasks(plan)?;
    validate_global_config(plan)?;
    validate_task_references(plan)?;
    validate_dag(plan)?;
    validate_commands(plan)?;
    validate_pulls(plan)?;
    Ok(())
}

fn ensure_has_tasks(plan: &RawPlanFile) -> Result<()> {
    if plan.task.is_empty() {
        return Err(ShardplanError::PlanError(
            "plan must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(plan: &RawPlanFile) -> Result<()> {
    if plan.config.nodes == 0 {
        return Err(ShardplanError::PlanError(
            "[config].nodes must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_references(plan: &RawPlanFile) -> Result<()> {
    for (name, task) in plan.task.iter() {
        for dep in task.after.iter() {
            if !plan.task.contains_key(dep) {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

/// Dependency graph over task names.
///
/// Edge direction: dep -> task. For
/// ```toml
/// [task.B]
/// after = ["A"]
/// ```
/// we add edge A -> B.
fn dependency_graph(plan: &RawPlanFile) -> DiGraphMap<&str, ()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in plan.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in plan.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    graph
}

fn validate_dag(plan: &RawPlanFile) -> Result<()> {
    // A topological sort will fail if there is a cycle.
    match toposort(&dependency_graph(plan), None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(ShardplanError::DagCycle(format!(
                "cycle detected in task dependencies involving task '{}'",
                node
            )))
        }
    }
}

fn validate_subrange(name: &str, what: &str, offset: &[u64], range: &[u64]) -> Result<()> {
    let sr = Subrange::from_dims(offset, range).ok_or_else(|| {
        ShardplanError::PlanError(format!(
            "task '{}': {} needs matching offset/range of 1 to 3 dimensions",
            name, what
        ))
    })?;
    if sr.is_empty() {
        return Err(ShardplanError::PlanError(format!(
            "task '{}': {} covers an empty range",
            name, what
        )));
    }
    Ok(())
}

fn validate_commands(plan: &RawPlanFile) -> Result<()> {
    let nodes = plan.config.nodes;
    for (name, task) in plan.task.iter() {
        let mut seen_nodes = Vec::new();
        for compute in task.compute.iter() {
            if compute.node >= nodes {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}': compute node {} out of range (nodes = {})",
                    name, compute.node, nodes
                )));
            }
            if seen_nodes.contains(&compute.node) {
                // One chunk per node: two unordered compute commands on the
                // same node would leave that node's local sequence undefined.
                return Err(ShardplanError::PlanError(format!(
                    "task '{}': more than one compute entry for node {}",
                    name, compute.node
                )));
            }
            seen_nodes.push(compute.node);
            validate_subrange(name, "compute chunk", &compute.offset, &compute.range)?;
        }
        if task.compute.is_empty() && !task.master_access {
            return Err(ShardplanError::PlanError(format!(
                "task '{}' declares no compute entries and no master access",
                name
            )));
        }
    }
    Ok(())
}

fn validate_pulls(plan: &RawPlanFile) -> Result<()> {
    let graph = dependency_graph(plan);
    let nodes = plan.config.nodes;

    for (name, task) in plan.task.iter() {
        for pull in task.pull.iter() {
            if !plan.task.contains_key(&pull.source_task) {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}': pull references unknown source task '{}'",
                    name, pull.source_task
                )));
            }
            if pull.source_task == *name
                || !has_path_connecting(&graph, pull.source_task.as_str(), name.as_str(), None)
            {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}': pull source task '{}' is not an ancestor",
                    name, pull.source_task
                )));
            }
            if pull.source_node >= nodes {
                return Err(ShardplanError::PlanError(format!(
                    "task '{}': pull source node {} out of range (nodes = {})",
                    name, pull.source_node, nodes
                )));
            }
            match pull.node {
                Some(n) => {
                    if n >= nodes {
                        return Err(ShardplanError::PlanError(format!(
                            "task '{}': pull node {} out of range (nodes = {})",
                            name, n, nodes
                        )));
                    }
                    if !task.compute.iter().any(|c| c.node == n) {
                        return Err(ShardplanError::PlanError(format!(
                            "task '{}': pull on node {} has no compute entry consuming it",
                            name, n
                        )));
                    }
                }
                None => {
                    if !task.master_access {
                        return Err(ShardplanError::PlanError(format!(
                            "task '{}': pull without a node requires master_access = true",
                            name
                        )));
                    }
                }
            }
            validate_subrange(name, "pull region", &pull.offset, &pull.range)?;
        }
    }
    Ok(())
}

#![allow(dead_code)]

use std::collections::BTreeMap;

use shardplan::config::{ComputeSpec, ConfigSection, PlanFile, PullSpec, RawPlanFile, TaskConfig};
use shardplan::graph::TaskGraph;
use shardplan::types::TaskId;

/// Builder for `PlanFile` to simplify test setup.
pub struct PlanBuilder {
    plan: RawPlanFile,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            plan: RawPlanFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn nodes(mut self, nodes: u32) -> Self {
        self.plan.config.nodes = nodes;
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.plan.task.insert(name.to_string(), task);
        self
    }

    pub fn build(self) -> PlanFile {
        PlanFile::try_from(self.plan).expect("Failed to build valid plan from builder")
    }

    /// Validation outcome without the panic, for negative tests.
    pub fn try_build(self) -> shardplan::errors::Result<PlanFile> {
        PlanFile::try_from(self.plan)
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskBuilder {
    task: TaskConfig,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn compute(mut self, node: u32, offset: &[u64], range: &[u64]) -> Self {
        self.task.compute.push(ComputeSpec {
            node,
            offset: offset.to_vec(),
            range: range.to_vec(),
        });
        self
    }

    pub fn master_access(mut self) -> Self {
        self.task.master_access = true;
        self
    }

    pub fn pull(
        mut self,
        buffer: u32,
        source_node: u32,
        source_task: &str,
        node: Option<u32>,
        offset: &[u64],
        range: &[u64],
    ) -> Self {
        self.task.pull.push(PullSpec {
            buffer,
            source_node,
            source_task: source_task.to_string(),
            node,
            offset: offset.to_vec(),
            range: range.to_vec(),
        });
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Task graph fixture: tasks `0..num_tasks` plus the given
/// `parent -> child` dependency edges.
pub fn task_graph_from_edges(num_tasks: u64, edges: &[(u64, u64)]) -> TaskGraph {
    let mut tdag = TaskGraph::new("TaskGraph");
    for i in 0..num_tasks {
        tdag.add_task(TaskId(i)).expect("duplicate task id in fixture");
    }
    for &(parent, child) in edges {
        tdag.add_dependency(TaskId(parent), TaskId(child))
            .expect("unknown task id in fixture");
    }
    tdag
}

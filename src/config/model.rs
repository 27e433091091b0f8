// src/config/model.rs

//! TOML-backed plan model.
//!
//! A *plan* declares the task graph and, per task, the concrete commands
//! the (external) partitioning policy chose: compute chunks per node, an
//! optional master access, and the buffer regions to pull from ancestor
//! tasks. The scheduling core turns this into a command graph.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level plan as read from a TOML file, prior to validation.
///
/// ```toml
/// [config]
/// nodes = 2
///
/// [task.produce]
/// [[task.produce.compute]]
/// node = 0
/// offset = [0]
/// range = [10]
///
/// [task.consume]
/// after = ["produce"]
/// [[task.consume.compute]]
/// node = 1
/// offset = [0]
/// range = [10]
/// [[task.consume.pull]]
/// buffer = 0
/// source_node = 0
/// source_task = "produce"
/// node = 1
/// offset = [0]
/// range = [10]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Number of cluster nodes commands may be placed on. Node 0 is the
    /// master node.
    #[serde(default = "default_nodes")]
    pub nodes: u32,
}

fn default_nodes() -> u32 {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Dependency list: this task consumes buffers written by these tasks.
    #[serde(default)]
    pub after: Vec<String>,

    /// Compute chunks, at most one per node.
    #[serde(default)]
    pub compute: Vec<ComputeSpec>,

    /// Whole-task access on the master node.
    #[serde(default)]
    pub master_access: bool,

    /// Buffer regions to fetch from other nodes before computing.
    #[serde(default)]
    pub pull: Vec<PullSpec>,
}

/// One `[[task.<name>.compute]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeSpec {
    pub node: u32,
    /// Per-dimension offset of the chunk (1 to 3 dimensions).
    pub offset: Vec<u64>,
    /// Per-dimension extent of the chunk; same length as `offset`.
    pub range: Vec<u64>,
}

/// One `[[task.<name>.pull]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PullSpec {
    pub buffer: u32,
    /// Node currently owning the region.
    pub source_node: u32,
    /// Ancestor task whose span serves the transfer.
    pub source_task: String,
    /// Requesting node whose compute command consumes the data. Absent
    /// means the task's master-access command is the consumer.
    #[serde(default)]
    pub node: Option<u32>,
    pub offset: Vec<u64>,
    pub range: Vec<u64>,
}

/// A validated plan.
///
/// Construct via `PlanFile::try_from(raw)`; see `config::validate`.
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl PlanFile {
    /// Construct without validation. Only the validator and test builders
    /// should call this.
    pub fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }
}

// src/types.rs

//! Shared identifier vocabulary for the scheduling core.
//!
//! All three ids are plain integers on the wire and in plan files, but kept
//! as distinct newtypes so a node id can never be passed where a task id is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a submitted task. Assigned monotonically by the producer
/// of the task graph; never reused within a scheduling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a cluster node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The designated master node.
///
/// Node 0 has special ownership semantics: buffer data with no explicit
/// producing command is assumed resident here (see the pull synthesizer's
/// fallback rule).
pub const MASTER_NODE: NodeId = NodeId(0);

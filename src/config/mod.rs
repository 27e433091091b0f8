// src/config/mod.rs

//! Plan loading and validation for shardplan.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file from disk (`loader.rs`).
//! - Validate invariants like dependency correctness (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ComputeSpec, ConfigSection, PlanFile, PullSpec, RawPlanFile, TaskConfig};

// src/config/mod.rs

//! Workflow loading and validation.
//!
//! Responsibilities:
//! - Define the YAML-backed data model (`model.rs`).
//! - Load a workflow file from disk (`loader.rs`).
//! - Validate module names and commands (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ModuleConfig, RawWorkflowFile, WorkflowFile, USAGE_VAR_KEY};

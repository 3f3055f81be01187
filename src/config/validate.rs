// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{RawWorkflowFile, WorkflowFile};
use crate::errors::{Result, RunnerError};

impl TryFrom<RawWorkflowFile> for WorkflowFile {
    type Error = RunnerError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_workflow(&raw)?;
        Ok(WorkflowFile::new_unchecked(raw.vars, raw.usage, raw.modules))
    }
}

/// Semantic checks on top of YAML deserialization:
/// - module names are non-empty
/// - no command or cleanup action is blank
///
/// An empty module list and repeated module names are legal (modules are
/// identified by position) and only produce warnings.
fn validate_raw_workflow(cfg: &RawWorkflowFile) -> Result<()> {
    warn_if_no_modules(cfg);
    validate_module_names(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn warn_if_no_modules(cfg: &RawWorkflowFile) {
    if cfg.modules.is_empty() {
        warn!("workflow has no entries under `modules`; nothing to run");
    }
}

fn validate_module_names(cfg: &RawWorkflowFile) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, module) in cfg.modules.iter().enumerate() {
        if module.name.trim().is_empty() {
            return Err(RunnerError::ConfigError(format!(
                "module #{} has an empty `name`",
                idx + 1
            )));
        }
        if !seen.insert(module.name.as_str()) {
            warn!(module = %module.name, position = idx + 1, "duplicate module name");
        }
    }
    Ok(())
}

fn validate_commands(cfg: &RawWorkflowFile) -> Result<()> {
    for module in cfg.modules.iter() {
        if module.commands.iter().any(|c| c.trim().is_empty()) {
            return Err(RunnerError::ConfigError(format!(
                "module '{}' has an empty entry in `cmds`",
                module.name
            )));
        }
        if module.cleanup_actions.iter().any(|c| c.trim().is_empty()) {
            return Err(RunnerError::ConfigError(format!(
                "module '{}' has an empty entry in `ctrlc`",
                module.name
            )));
        }
    }
    Ok(())
}

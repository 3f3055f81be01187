#![allow(dead_code)]

use modrunner::config::{ModuleConfig, RawWorkflowFile, WorkflowFile};

/// Builder for `WorkflowFile` to simplify test setup.
pub struct WorkflowBuilder {
    raw: RawWorkflowFile,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawWorkflowFile::default(),
        }
    }

    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.raw.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn usage(mut self, text: &str) -> Self {
        self.raw.usage = text.to_string();
        self
    }

    pub fn module(mut self, module: ModuleConfig) -> Self {
        self.raw.modules.push(module);
        self
    }

    pub fn build(self) -> WorkflowFile {
        WorkflowFile::try_from(self.raw).expect("Failed to build valid workflow from builder")
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ModuleConfig`.
pub struct ModuleBuilder {
    module: ModuleConfig,
}

impl ModuleBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            module: ModuleConfig {
                name: name.to_string(),
                commands: vec![],
                silent: false,
                run_concurrently: false,
                cleanup_actions: vec![],
            },
        }
    }

    pub fn cmd(mut self, command: &str) -> Self {
        self.module.commands.push(command.to_string());
        self
    }

    pub fn silent(mut self) -> Self {
        self.module.silent = true;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.module.run_concurrently = true;
        self
    }

    pub fn ctrlc(mut self, action: &str) -> Self {
        self.module.cleanup_actions.push(action.to_string());
        self
    }

    pub fn build(self) -> ModuleConfig {
        self.module
    }
}

/// Shorthand for a sequential module with the given commands.
pub fn sequential(name: &str, cmds: &[&str]) -> ModuleConfig {
    cmds.iter()
        .fold(ModuleBuilder::new(name), |b, c| b.cmd(c))
        .build()
}

/// Shorthand for a concurrent module with the given commands.
pub fn parallel(name: &str, cmds: &[&str]) -> ModuleConfig {
    cmds.iter()
        .fold(ModuleBuilder::new(name).parallel(), |b, c| b.cmd(c))
        .build()
}

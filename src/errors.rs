// src/errors.rs

//! Crate-wide error type and aliases.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("failed to spawn command `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// `code` is `None` when the process was terminated by a signal.
    #[error("command `{command}` exited with {}", describe_exit(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("modules did not finish within {0:?} after interrupt cleanup")]
    InterruptTimeout(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RunnerError {
    /// Errors that abort the process before any module is started.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RunnerError::ConfigError(_) | RunnerError::IoError(_) | RunnerError::YamlError(_)
        )
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;

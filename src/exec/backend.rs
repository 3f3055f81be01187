// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The engine talks to a `CommandRunner` instead of spawning processes
//! directly. Production code uses [`ShellRunner`]; tests provide a scripted
//! runner that records commands and decides their outcome without touching
//! the OS.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, RunnerError};

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait abstracting how a single, fully rendered command is executed.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// - `silent == false`: the command shares the invoking process's
    ///   stdin/stdout/stderr, so interactive programs work.
    /// - `silent == true`: output is discarded and stdin is closed.
    ///
    /// Returns `Err` when the process cannot be spawned or exits unsuccessfully.
    /// Implementations never retry.
    fn run<'a>(&'a self, command: &'a str, silent: bool) -> RunFuture<'a>;
}

/// Real runner used in production: `sh -c <command>` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

impl CommandRunner for ShellRunner {
    fn run<'a>(&'a self, command: &'a str, silent: bool) -> RunFuture<'a> {
        Box::pin(async move {
            debug!(cmd = %command, silent, "spawning shell command");

            let mut cmd = shell_command(command);
            if silent {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
            } else {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }

            let status = cmd.status().await.map_err(|source| RunnerError::CommandSpawn {
                command: command.to_string(),
                source,
            })?;

            info!(
                cmd = %command,
                exit_code = ?status.code(),
                success = status.success(),
                "shell command exited"
            );

            if status.success() {
                Ok(())
            } else {
                Err(RunnerError::CommandFailed {
                    command: command.to_string(),
                    code: status.code(),
                })
            }
        })
    }
}

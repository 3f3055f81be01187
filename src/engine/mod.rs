// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the shared per-run state ([`context`])
//! - the cleanup registry ([`registry`])
//! - the coordinator/orchestrator handshake ([`rendezvous`])
//! - the interrupt coordinator ([`interrupt`])
//! - the module orchestrator ([`orchestrator`])
//!
//! [`execute`] runs the orchestrator and the coordinator side by side and
//! turns a coordinator timeout into [`RunnerError::InterruptTimeout`].

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::config::ModuleConfig;
use crate::errors::{Result, RunnerError};

pub mod context;
pub mod interrupt;
pub mod orchestrator;
pub mod registry;
pub mod rendezvous;

pub use context::{InterruptState, RunContext};
pub use interrupt::{shutdown_signal, InterruptCoordinator, InterruptVerdict};
pub use orchestrator::Orchestrator;
pub use registry::{CleanupEntry, CleanupRegistry, DrainReport};
pub use rendezvous::{Latch, Rendezvous, DEFAULT_RENDEZVOUS_TIMEOUT};

/// Position of a module in the workflow's module list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// What happened to one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Completed,
    Failed,
    /// Skipped: an earlier sequential module failed, or the run was
    /// interrupted before this module could start.
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub id: ModuleId,
    pub name: String,
    pub status: ModuleStatus,
}

impl ModuleReport {
    pub fn new(id: ModuleId, name: &str, status: ModuleStatus) -> Self {
        Self {
            id,
            name: name.to_string(),
            status,
        }
    }
}

/// Aggregate result of one run, one report per module in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub any_module_failed: bool,
    pub interrupted: bool,
    pub reports: Vec<ModuleReport>,
}

impl RunOutcome {
    pub fn new(reports: Vec<ModuleReport>, interrupted: bool) -> Self {
        let any_module_failed = reports.iter().any(|r| r.status == ModuleStatus::Failed);
        Self {
            any_module_failed,
            interrupted,
            reports,
        }
    }

    /// Process exit code: `1` if any module failed, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.any_module_failed { 1 } else { 0 }
    }

    pub fn status_of(&self, name: &str) -> Option<ModuleStatus> {
        self.reports
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.status)
    }

    pub fn count(&self, status: ModuleStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

/// Run `modules` with an interrupt coordinator listening on `signal`.
///
/// Returns the run outcome, or [`RunnerError::InterruptTimeout`] when an
/// interrupt was handled but the modules did not finish within the
/// rendezvous timeout. In that case the caller is expected to exit at once.
pub async fn execute<S>(
    ctx: Arc<RunContext>,
    modules: &[ModuleConfig],
    signal: S,
) -> Result<RunOutcome>
where
    S: Future<Output = ()> + Send + 'static,
{
    let coordinator = InterruptCoordinator::new(Arc::clone(&ctx));
    let mut watcher = tokio::spawn(coordinator.watch(signal));

    let orchestrator = Orchestrator::new(Arc::clone(&ctx));
    let run = orchestrator.run_all(modules);
    tokio::pin!(run);

    tokio::select! {
        outcome = &mut run => {
            // Either disarmed or already acknowledged; the watcher ends promptly.
            let verdict = watcher.await.map_err(anyhow::Error::from)?;
            debug!(?verdict, "interrupt coordinator finished after the run");
            Ok(outcome)
        }
        joined = &mut watcher => {
            match joined.map_err(anyhow::Error::from)? {
                InterruptVerdict::TimedOut => {
                    Err(RunnerError::InterruptTimeout(ctx.rendezvous().timeout()))
                }
                verdict => {
                    debug!(?verdict, "interrupt coordinator finished before the run");
                    Ok(run.await)
                }
            }
        }
    }
}

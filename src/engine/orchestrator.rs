// src/engine/orchestrator.rs

//! Module orchestrator.
//!
//! Walks the module list in order:
//! - sequential modules run inline; the first failure stops the walk,
//! - concurrent modules are spawned onto a `JoinSet` and the walk continues,
//! - no new module starts once the run has been interrupted.
//!
//! After the walk every spawned unit is awaited, and the orchestrator either
//! disarms the interrupt coordinator or completes the rendezvous with it.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::ModuleConfig;
use crate::console;
use crate::engine::context::RunContext;
use crate::engine::{ModuleId, ModuleReport, ModuleStatus, RunOutcome};
use crate::errors::Result;
use crate::exec;

#[derive(Debug)]
pub struct Orchestrator {
    ctx: Arc<RunContext>,
}

impl Orchestrator {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Run every module once and aggregate the outcome.
    ///
    /// Module failures are part of the returned [`RunOutcome`], never errors.
    pub async fn run_all(&self, modules: &[ModuleConfig]) -> RunOutcome {
        let mut reports: Vec<ModuleReport> = Vec::with_capacity(modules.len());
        let mut spawned: Vec<ModuleId> = Vec::new();
        let mut units = JoinSet::new();

        for (idx, module) in modules.iter().enumerate() {
            let id = ModuleId(idx);

            if self.ctx.is_interrupted() {
                info!(module = %module.name, "run interrupted; not starting remaining modules");
                break;
            }

            if module.run_concurrently {
                let ctx = Arc::clone(&self.ctx);
                let module = module.clone();
                units.spawn(async move { run_unit(&ctx, id, &module).await });
                spawned.push(id);
                continue;
            }

            let report = run_unit(&self.ctx, id, module).await;
            let failed = report.status == ModuleStatus::Failed;
            reports.push(report);

            if failed {
                info!(module = %module.name, "sequential module failed; stopping the walk");
                break;
            }
        }

        if !units.is_empty() {
            debug!(count = units.len(), "waiting for concurrent modules");
        }
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => error!(error = %err, "concurrent module unit did not complete"),
            }
        }

        // A spawned unit without a report panicked; count it as failed.
        for id in spawned {
            if !reports.iter().any(|r| r.id == id) {
                reports.push(ModuleReport::new(id, &modules[id.0].name, ModuleStatus::Failed));
            }
        }
        for (idx, module) in modules.iter().enumerate() {
            if !reports.iter().any(|r| r.id == ModuleId(idx)) {
                reports.push(ModuleReport::new(
                    ModuleId(idx),
                    &module.name,
                    ModuleStatus::NotStarted,
                ));
            }
        }
        reports.sort_by_key(|r| r.id);

        let interrupted = self.ctx.finish_run();
        if interrupted {
            debug!("confirming to interrupt coordinator that all modules finished");
            let rendezvous = self.ctx.rendezvous();
            rendezvous.confirm_tasks_done();
            rendezvous.wait_acknowledged().await;
        }

        let outcome = RunOutcome::new(reports, interrupted);
        if !outcome.any_module_failed {
            let not_started = outcome.count(ModuleStatus::NotStarted);
            if not_started == 0 {
                console::all_completed();
            } else {
                console::run_interrupted(not_started);
            }
        }

        info!(
            failed = outcome.any_module_failed,
            interrupted = outcome.interrupted,
            "run finished"
        );
        outcome
    }
}

/// One module: register cleanup, run commands, unregister on success.
///
/// If the run was interrupted by the time the module finishes, wait for the
/// cleanup drain before reporting.
async fn run_unit(ctx: &RunContext, id: ModuleId, module: &ModuleConfig) -> ModuleReport {
    let cleanup: Vec<String> = module
        .cleanup_actions
        .iter()
        .map(|action| ctx.bindings().render(action).into_owned())
        .collect();

    if !ctx.registry().register(id, &cleanup) {
        info!(module = %module.name, "cleanup already drained; module not started");
        return ModuleReport::new(id, &module.name, ModuleStatus::NotStarted);
    }

    // The interrupt flag is raised before the drain seals the registry, so a
    // unit first polled in between must not start either.
    if ctx.is_interrupted() {
        let withdrawn = ctx.registry().unregister(id, &cleanup);
        info!(module = %module.name, withdrawn, "run interrupted before module start; not started");
        return ModuleReport::new(id, &module.name, ModuleStatus::NotStarted);
    }

    console::module_running(&module.name);
    info!(
        module = %module.name,
        commands = module.commands.len(),
        concurrent = module.run_concurrently,
        "module started"
    );

    let status = match run_commands(ctx, module).await {
        Ok(()) => {
            ctx.registry().unregister(id, &cleanup);
            console::module_completed(&module.name);
            ModuleStatus::Completed
        }
        Err(err) => {
            // Cleanup stays registered: the module may have left work behind.
            error!(module = %module.name, error = %err, "module failed");
            console::module_errored(&module.name);
            ModuleStatus::Failed
        }
    };

    if ctx.is_interrupted() {
        debug!(module = %module.name, "waiting for interrupt cleanup to drain");
        ctx.rendezvous().wait_drained().await;
    }

    ModuleReport::new(id, &module.name, status)
}

/// Run the module's commands in order, stopping at the first failure.
async fn run_commands(ctx: &RunContext, module: &ModuleConfig) -> Result<()> {
    for (step, template) in module.commands.iter().enumerate() {
        debug!(module = %module.name, step, "running command");
        exec::execute(ctx.runner(), template, module.silent, ctx.bindings()).await?;
    }
    Ok(())
}

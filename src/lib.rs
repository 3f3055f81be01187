// src/lib.rs

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod vars;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, WorkflowFile};
use crate::engine::{shutdown_signal, RunContext, RunOutcome};
use crate::errors::Result;
use crate::exec::{prepare_command, ShellRunner};
use crate::vars::{parse_var_tokens, Bindings, VarTokens};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - workflow loading
/// - variable bindings (defaults + CLI overrides)
/// - the interrupt handler
/// - the orchestration engine
///
/// Returns `None` when nothing was executed (`usage` or `--dry-run`).
pub async fn run(args: CliArgs) -> Result<Option<RunOutcome>> {
    if !args.quiet {
        console::banner();
    }

    let overrides = match parse_var_tokens(&args.vars) {
        VarTokens::UsageRequested => {
            print_usage(&args.workflow);
            return Ok(None);
        }
        VarTokens::Overrides(overrides) => overrides,
    };

    let workflow = load_and_validate(&args.workflow)?;
    let bindings = Bindings::resolve(workflow.vars(), overrides, &args.workflow);

    if args.dry_run {
        print_dry_run(&workflow, &bindings);
        return Ok(None);
    }

    let signal = shutdown_signal().context("installing interrupt handlers")?;
    let ctx = Arc::new(RunContext::new(bindings, Arc::new(ShellRunner::new())));

    info!(
        workflow = %args.workflow.display(),
        modules = workflow.modules().len(),
        "starting workflow"
    );
    let outcome = engine::execute(ctx, workflow.modules(), signal).await?;
    Ok(Some(outcome))
}

/// `usage` never fails: an unreadable workflow just contributes no text and
/// no defaults.
fn print_usage(path: &Path) {
    match load_and_validate(path) {
        Ok(workflow) => console::usage(workflow.usage_text(), workflow.vars()),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "workflow not loaded for usage");
            console::usage("", &BTreeMap::new());
        }
    }
}

/// Dry-run output: modules, flags and fully rendered commands.
fn print_dry_run(workflow: &WorkflowFile, bindings: &Bindings) {
    println!("modrunner dry-run");
    println!();

    println!("variables:");
    for (key, value) in bindings.iter() {
        println!("  {key} = {value}");
    }
    println!();

    println!("modules ({}):", workflow.modules().len());
    for module in workflow.modules() {
        println!("  - {}", module.name);
        if module.run_concurrently {
            println!("      parallel: true");
        }
        if module.silent {
            println!("      silent: true");
        }
        for cmd in module.commands.iter() {
            println!("      cmd: {}", prepare_command(cmd, module.silent, bindings));
        }
        for action in module.cleanup_actions.iter() {
            println!("      ctrlc: {}", bindings.render(action));
        }
    }

    debug!("dry-run complete (no execution)");
}

// tests/shell_scenarios.rs
//
// End-to-end runs through the real `sh -c` runner. Side effects go to a
// temporary directory bound as `{{DIR}}`.

#![cfg(unix)]

mod common;
use crate::common::builders::{parallel, ModuleBuilder, WorkflowBuilder};
use crate::common::{init_tracing, manual_signal, no_signal, with_timeout};

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use modrunner::config::WorkflowFile;
use modrunner::engine::{execute, ModuleStatus, RunContext};
use modrunner::exec::ShellRunner;
use modrunner::vars::Bindings;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn shell_context(workflow: &WorkflowFile, dir: &TempDir) -> Arc<RunContext> {
    let overrides = BTreeMap::from([("DIR".to_string(), dir.path().display().to_string())]);
    let bindings = Bindings::resolve(workflow.vars(), overrides, Path::new("scenario.yaml"));
    Arc::new(RunContext::new(bindings, Arc::new(ShellRunner::new())))
}

fn read_log(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("log")).unwrap_or_default()
}

#[tokio::test]
async fn sequential_failure_skips_later_modules() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let workflow = WorkflowBuilder::new()
        .module(ModuleBuilder::new("A").cmd("echo 1 >> {{DIR}}/log").silent().build())
        .module(ModuleBuilder::new("B").cmd("exit 1").silent().build())
        .module(ModuleBuilder::new("C").cmd("echo 3 >> {{DIR}}/log").silent().build())
        .build();

    let outcome = with_timeout(execute(
        shell_context(&workflow, &dir),
        workflow.modules(),
        no_signal(),
    ))
    .await?;

    assert_eq!(read_log(&dir), "1\n");
    assert_eq!(outcome.status_of("C"), Some(ModuleStatus::NotStarted));
    assert_eq!(outcome.exit_code(), 1);

    Ok(())
}

#[tokio::test]
async fn parallel_sibling_finishes_despite_failure() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let workflow = WorkflowBuilder::new()
        .module(parallel("X", &["sleep 0.3; echo x >> {{DIR}}/log"]))
        .module(parallel("Y", &["exit 1"]))
        .build();

    let outcome = with_timeout(execute(
        shell_context(&workflow, &dir),
        workflow.modules(),
        no_signal(),
    ))
    .await?;

    assert_eq!(read_log(&dir), "x\n");
    assert_eq!(outcome.status_of("X"), Some(ModuleStatus::Completed));
    assert_eq!(outcome.status_of("Y"), Some(ModuleStatus::Failed));
    assert_eq!(outcome.exit_code(), 1);

    Ok(())
}

#[tokio::test]
async fn interrupt_runs_cleanup_before_module_exits() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let workflow = WorkflowBuilder::new()
        .module(
            ModuleBuilder::new("svc")
                .cmd("sleep 0.5; echo done >> {{DIR}}/log")
                .ctrlc("echo cleanup >> {{DIR}}/log")
                .silent()
                .build(),
        )
        .build();
    let ctx = shell_context(&workflow, &dir);
    let (mut trigger, signal) = manual_signal();

    let modules = workflow.modules().to_vec();
    let run = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { execute(ctx, &modules, signal).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    trigger.fire();

    let outcome = with_timeout(run).await??;

    assert_eq!(read_log(&dir), "cleanup\ndone\n");
    assert!(outcome.interrupted);
    assert_eq!(outcome.exit_code(), 0);

    Ok(())
}

#[tokio::test]
async fn workflow_path_and_defaults_reach_the_shell() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let workflow = WorkflowBuilder::new()
        .var("GREETING", "hello")
        .module(
            ModuleBuilder::new("write")
                .cmd("echo {{GREETING}} {{YamlName}} >> {{DIR}}/log")
                .silent()
                .build(),
        )
        .build();

    with_timeout(execute(
        shell_context(&workflow, &dir),
        workflow.modules(),
        no_signal(),
    ))
    .await?;

    assert_eq!(read_log(&dir), "hello scenario.yaml\n");

    Ok(())
}

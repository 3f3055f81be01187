// tests/orchestration_properties.rs

use std::sync::Arc;

use proptest::prelude::*;
use modrunner::config::WorkflowFile;
use modrunner::engine::{execute, ModuleStatus, RunOutcome};
use modrunner_test_utils::builders::{parallel, sequential, WorkflowBuilder};
use modrunner_test_utils::context;
use modrunner_test_utils::fake_runner::ScriptedRunner;

// Each generated module is (concurrent, fails).
fn workflow_for(modules: &[(bool, bool)]) -> (WorkflowFile, ScriptedRunner) {
    let mut builder = WorkflowBuilder::new();
    let mut runner = ScriptedRunner::new();

    for (i, (concurrent, fails)) in modules.iter().enumerate() {
        let name = format!("module_{i}");
        let cmd = format!("cmd_{i}");
        builder = if *concurrent {
            builder.module(parallel(&name, &[&cmd]))
        } else {
            builder.module(sequential(&name, &[&cmd]))
        };
        if *fails {
            runner = runner.fail(&cmd);
        }
    }

    (builder.build(), runner)
}

fn run(workflow: &WorkflowFile, runner: Arc<ScriptedRunner>) -> RunOutcome {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(execute(context(runner), workflow.modules(), std::future::pending::<()>()))
        .unwrap()
}

proptest! {
    #[test]
    fn sequential_walk_stops_at_first_failure(
        failures in proptest::collection::vec(any::<bool>(), 1..8)
    ) {
        let modules: Vec<_> = failures.iter().map(|f| (false, *f)).collect();
        let (workflow, runner) = workflow_for(&modules);
        let runner = Arc::new(runner);

        let outcome = run(&workflow, runner.clone());

        let first_failure = failures.iter().position(|f| *f);
        for (i, report) in outcome.reports.iter().enumerate() {
            let expected = match first_failure {
                Some(ff) if i < ff => ModuleStatus::Completed,
                Some(ff) if i == ff => ModuleStatus::Failed,
                Some(_) => ModuleStatus::NotStarted,
                None => ModuleStatus::Completed,
            };
            prop_assert_eq!(report.status, expected);
            prop_assert_eq!(runner.ran(&format!("cmd_{i}")), expected != ModuleStatus::NotStarted);
        }
        prop_assert_eq!(outcome.exit_code(), i32::from(first_failure.is_some()));
    }

    #[test]
    fn concurrent_modules_all_run_regardless_of_failures(
        failures in proptest::collection::vec(any::<bool>(), 1..8)
    ) {
        let modules: Vec<_> = failures.iter().map(|f| (true, *f)).collect();
        let (workflow, runner) = workflow_for(&modules);
        let runner = Arc::new(runner);

        let outcome = run(&workflow, runner.clone());

        prop_assert_eq!(runner.started().len(), failures.len());
        prop_assert_eq!(outcome.count(ModuleStatus::NotStarted), 0);
        prop_assert_eq!(outcome.count(ModuleStatus::Failed), failures.iter().filter(|f| **f).count());
        prop_assert_eq!(outcome.any_module_failed, failures.iter().any(|f| *f));
    }

    #[test]
    fn every_module_gets_exactly_one_report(
        modules in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..8)
    ) {
        let (workflow, runner) = workflow_for(&modules);
        let runner = Arc::new(runner);

        let outcome = run(&workflow, runner.clone());

        prop_assert_eq!(outcome.reports.len(), modules.len());
        for (i, report) in outcome.reports.iter().enumerate() {
            prop_assert_eq!(&report.name, &format!("module_{i}"));
            // No command runs twice without an interrupt.
            let runs = runner.count(&format!("cmd_{i}"));
            prop_assert!(runs <= 1);
        }
        prop_assert!(!outcome.interrupted);
    }
}

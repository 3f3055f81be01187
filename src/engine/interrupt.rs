// src/engine/interrupt.rs

//! Interrupt coordinator.
//!
//! Waits for the external shutdown signal, raises the run's interrupt flag,
//! drains the cleanup registry and then gives the orchestrator a bounded
//! amount of time to confirm that every module unit has finished.
//!
//! The coordinator is the only writer of the interrupt flag. It never kills
//! running commands; commands keep running until they exit on their own.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::console;
use crate::engine::context::{InterruptState, RunContext};

/// How the coordinator finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptVerdict {
    /// No interrupt was handled: the run finished first, or the interrupt
    /// had already been taken by another call.
    NotTriggered,
    /// Cleanup drained and the orchestrator confirmed in time.
    Confirmed,
    /// The orchestrator did not confirm within the rendezvous timeout. Fatal.
    TimedOut,
}

#[derive(Debug)]
pub struct InterruptCoordinator {
    ctx: Arc<RunContext>,
}

impl InterruptCoordinator {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Wait for `signal` (or for the run to finish and disarm us), then
    /// handle the interrupt.
    ///
    /// `signal` is awaited once, so further signals never re-enter the drain.
    pub async fn watch<S>(self, signal: S) -> InterruptVerdict
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            () = signal => {
                debug!("shutdown signal observed");
            }
            () = self.ctx.wait_disarmed() => {
                debug!("run finished before any interrupt; coordinator disarmed");
                return InterruptVerdict::NotTriggered;
            }
        }

        self.handle_interrupt().await
    }

    /// Run the interrupt sequence. Only the first call (while `Idle`) does
    /// anything.
    pub async fn handle_interrupt(&self) -> InterruptVerdict {
        if !self.ctx.begin_interrupt() {
            return InterruptVerdict::NotTriggered;
        }

        console::interrupt_received();
        warn!("interrupt received; running registered cleanup actions");

        self.ctx.set_interrupt_state(InterruptState::Draining);
        let report = self
            .ctx
            .registry()
            .drain_and_execute(self.ctx.runner())
            .await;
        info!(
            executed = report.executed,
            failed = report.failed,
            "cleanup drain finished"
        );

        self.ctx
            .set_interrupt_state(InterruptState::AwaitingOrchestrator);
        let rendezvous = self.ctx.rendezvous();
        rendezvous.mark_drained();

        if rendezvous.await_tasks_done().await {
            self.ctx.set_interrupt_state(InterruptState::Done);
            rendezvous.acknowledge();
            info!("orchestrator confirmed all modules finished");
            InterruptVerdict::Confirmed
        } else {
            self.ctx.set_interrupt_state(InterruptState::TimedOut);
            console::interrupt_timeout();
            warn!(
                timeout = ?rendezvous.timeout(),
                "modules did not finish after cleanup; forcing exit"
            );
            InterruptVerdict::TimedOut
        }
    }
}

/// Future that resolves on the first SIGINT or SIGTERM.
///
/// Handlers are installed eagerly, so an interrupt arriving before the
/// future is first polled is not lost (and does not kill the process).
#[cfg(unix)]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => debug!("SIGINT received"),
            _ = terminate.recv() => debug!("SIGTERM received"),
        }
    })
}

/// Future that resolves on the first Ctrl-C.
#[cfg(not(unix))]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C; interrupts will not be handled");
            std::future::pending::<()>().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::engine::ModuleId;
    use crate::exec::{CommandRunner, RunFuture};
    use crate::vars::Bindings;

    #[derive(Default)]
    struct CountingRunner {
        runs: std::sync::Mutex<Vec<String>>,
    }

    impl CommandRunner for CountingRunner {
        fn run<'a>(&'a self, command: &'a str, _silent: bool) -> RunFuture<'a> {
            Box::pin(async move {
                self.runs.lock().unwrap().push(command.to_string());
                Ok(())
            })
        }
    }

    fn context(timeout: Duration) -> (Arc<RunContext>, Arc<CountingRunner>) {
        let runner = Arc::new(CountingRunner::default());
        let ctx = Arc::new(RunContext::with_rendezvous_timeout(
            Bindings::default(),
            runner.clone(),
            timeout,
        ));
        (ctx, runner)
    }

    #[tokio::test]
    async fn second_interrupt_does_not_drain_again() {
        let (ctx, runner) = context(Duration::from_millis(50));
        ctx.registry()
            .register(ModuleId(0), &["echo cleanup".to_string()]);
        ctx.rendezvous().confirm_tasks_done();

        let coordinator = InterruptCoordinator::new(Arc::clone(&ctx));
        assert_eq!(coordinator.handle_interrupt().await, InterruptVerdict::Confirmed);
        assert_eq!(coordinator.handle_interrupt().await, InterruptVerdict::NotTriggered);

        assert_eq!(*runner.runs.lock().unwrap(), vec!["echo cleanup".to_string()]);
        assert_eq!(ctx.interrupt_state(), InterruptState::Done);
        assert!(ctx.is_interrupted());
    }

    #[tokio::test]
    async fn unconfirmed_rendezvous_times_out() {
        let (ctx, _runner) = context(Duration::from_millis(30));
        let coordinator = InterruptCoordinator::new(Arc::clone(&ctx));

        assert_eq!(coordinator.handle_interrupt().await, InterruptVerdict::TimedOut);
        assert_eq!(ctx.interrupt_state(), InterruptState::TimedOut);
        assert!(ctx.rendezvous().is_drained());
    }

    #[tokio::test]
    async fn disarmed_coordinator_ignores_later_signal() {
        let (ctx, runner) = context(Duration::from_millis(30));
        ctx.registry().register(ModuleId(0), &["echo late".to_string()]);
        assert!(!ctx.finish_run());

        let coordinator = InterruptCoordinator::new(Arc::clone(&ctx));
        let verdict = coordinator.watch(std::future::pending::<()>()).await;

        assert_eq!(verdict, InterruptVerdict::NotTriggered);
        assert!(!ctx.is_interrupted());
        assert!(runner.runs.lock().unwrap().is_empty());
        assert_eq!(ctx.interrupt_state(), InterruptState::Disarmed);
    }
}

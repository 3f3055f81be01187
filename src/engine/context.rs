// src/engine/context.rs

//! Shared state for one run.
//!
//! A single `RunContext` is created at startup and handed (as
//! `Arc<RunContext>`) to the orchestrator, every module unit and the
//! interrupt coordinator. Nothing in the engine is global.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::registry::CleanupRegistry;
use crate::engine::rendezvous::{Latch, Rendezvous, DEFAULT_RENDEZVOUS_TIMEOUT};
use crate::exec::CommandRunner;
use crate::vars::Bindings;

/// Lifecycle of the interrupt coordinator.
///
/// `Idle -> Triggered -> Draining -> AwaitingOrchestrator -> Done | TimedOut`,
/// or `Idle -> Disarmed` when the run finishes before any interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Idle,
    Triggered,
    Draining,
    AwaitingOrchestrator,
    Done,
    TimedOut,
    Disarmed,
}

pub struct RunContext {
    bindings: Bindings,
    runner: Arc<dyn CommandRunner>,
    registry: CleanupRegistry,
    interrupt: CancellationToken,
    state: Mutex<InterruptState>,
    disarmed: Latch,
    rendezvous: Rendezvous,
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("bindings", &self.bindings)
            .field("registry", &self.registry)
            .field("interrupted", &self.is_interrupted())
            .field("state", &self.interrupt_state())
            .field("rendezvous", &self.rendezvous)
            .finish_non_exhaustive()
    }
}

impl RunContext {
    pub fn new(bindings: Bindings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_rendezvous_timeout(bindings, runner, DEFAULT_RENDEZVOUS_TIMEOUT)
    }

    pub fn with_rendezvous_timeout(
        bindings: Bindings,
        runner: Arc<dyn CommandRunner>,
        timeout: Duration,
    ) -> Self {
        Self {
            bindings,
            runner,
            registry: CleanupRegistry::new(),
            interrupt: CancellationToken::new(),
            state: Mutex::new(InterruptState::Idle),
            disarmed: Latch::new(),
            rendezvous: Rendezvous::new(timeout),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn registry(&self) -> &CleanupRegistry {
        &self.registry
    }

    pub fn rendezvous(&self) -> &Rendezvous {
        &self.rendezvous
    }

    /// Child token that is cancelled when the run is interrupted.
    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.child_token()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_cancelled()
    }

    pub fn interrupt_state(&self) -> InterruptState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, InterruptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Idle -> Triggered`, raising the interrupt flag.
    ///
    /// Returns `false` if the coordinator already left `Idle` (a repeated
    /// signal, or the run was disarmed).
    pub(crate) fn begin_interrupt(&self) -> bool {
        let mut state = self.lock_state();
        if *state != InterruptState::Idle {
            debug!(state = ?*state, "interrupt ignored");
            return false;
        }
        *state = InterruptState::Triggered;
        self.interrupt.cancel();
        true
    }

    pub(crate) fn set_interrupt_state(&self, next: InterruptState) {
        let mut state = self.lock_state();
        debug!(from = ?*state, to = ?next, "interrupt state transition");
        *state = next;
    }

    /// Called once by the orchestrator after every unit has finished.
    ///
    /// If no interrupt happened yet, the coordinator is disarmed (later
    /// signals are ignored) and `false` is returned. Otherwise returns `true`
    /// and the caller must complete the rendezvous.
    pub(crate) fn finish_run(&self) -> bool {
        let mut state = self.lock_state();
        if *state == InterruptState::Idle {
            *state = InterruptState::Disarmed;
            self.disarmed.open();
            return false;
        }
        true
    }

    pub(crate) async fn wait_disarmed(&self) {
        self.disarmed.wait().await;
    }
}

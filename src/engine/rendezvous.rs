// src/engine/rendezvous.rs

//! Two-phase handshake between the interrupt coordinator and the
//! orchestrator.
//!
//! Phase 1: the coordinator opens `drained` once every pending cleanup action
//! has run; units that finish during an interrupt wait for it.
//!
//! Phase 2: the orchestrator opens `tasks_done` once all units are finished;
//! the coordinator waits for it with a deadline and answers by opening
//! `acknowledged`.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

/// Default deadline for the orchestrator to confirm after a drain.
pub const DEFAULT_RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(3);

/// One-shot gate: starts closed, can be opened once, stays open.
///
/// Waiters that arrive after `open` return immediately.
#[derive(Debug)]
pub struct Latch {
    tx: watch::Sender<bool>,
}

impl Latch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Rendezvous {
    drained: Latch,
    tasks_done: Latch,
    acknowledged: Latch,
    timeout: Duration,
}

impl Rendezvous {
    pub fn new(timeout: Duration) -> Self {
        Self {
            drained: Latch::new(),
            tasks_done: Latch::new(),
            acknowledged: Latch::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn mark_drained(&self) {
        self.drained.open();
    }

    pub fn is_drained(&self) -> bool {
        self.drained.is_open()
    }

    pub async fn wait_drained(&self) {
        self.drained.wait().await;
    }

    pub fn confirm_tasks_done(&self) {
        self.tasks_done.open();
    }

    /// Wait up to the configured deadline for [`Self::confirm_tasks_done`].
    /// Returns `false` on timeout.
    pub async fn await_tasks_done(&self) -> bool {
        timeout(self.timeout, self.tasks_done.wait()).await.is_ok()
    }

    pub fn acknowledge(&self) {
        self.acknowledged.open();
    }

    pub async fn wait_acknowledged(&self) {
        self.acknowledged.wait().await;
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new(DEFAULT_RENDEZVOUS_TIMEOUT)
    }
}

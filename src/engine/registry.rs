// src/engine/registry.rs

//! Pending cleanup actions contributed by in-flight modules.
//!
//! Entries are tagged with the module that registered them, so removing one
//! module's actions never removes an identical action still owed by another
//! module. Once drained, the registry is sealed: later registrations are
//! refused, which is how a module that loses the race against an interrupt
//! learns that it must not start.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::console;
use crate::engine::ModuleId;
use crate::exec::CommandRunner;

/// One pending cleanup action and the module that owes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub owner: ModuleId,
    pub action: String,
}

/// What a drain did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub executed: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: Vec<CleanupEntry>,
    sealed: bool,
}

#[derive(Debug, Default)]
pub struct CleanupRegistry {
    state: Mutex<RegistryState>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Every critical section leaves `entries` consistent, so poisoning is ignored.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `actions` on behalf of `owner`.
    ///
    /// Returns `false` (and appends nothing) if the registry was already
    /// drained.
    pub fn register(&self, owner: ModuleId, actions: &[String]) -> bool {
        let mut state = self.lock();
        if state.sealed {
            return false;
        }

        state
            .entries
            .extend(actions.iter().map(|action| CleanupEntry {
                owner,
                action: action.clone(),
            }));
        debug!(?owner, added = actions.len(), pending = state.entries.len(), "cleanup registered");
        true
    }

    /// For each of `actions`, remove the first remaining entry owned by
    /// `owner` with the same text. Returns the number of entries removed.
    pub fn unregister(&self, owner: ModuleId, actions: &[String]) -> usize {
        let mut state = self.lock();
        let mut removed = 0;

        for action in actions {
            if let Some(pos) = state
                .entries
                .iter()
                .position(|e| e.owner == owner && &e.action == action)
            {
                state.entries.remove(pos);
                removed += 1;
            }
        }

        debug!(?owner, removed, pending = state.entries.len(), "cleanup unregistered");
        removed
    }

    /// Current pending actions, in registration order.
    pub fn pending(&self) -> Vec<String> {
        self.lock().entries.iter().map(|e| e.action.clone()).collect()
    }

    /// Current pending entries with their owners.
    pub fn entries(&self) -> Vec<CleanupEntry> {
        self.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }

    /// Atomically take everything and seal the registry.
    fn take_and_seal(&self) -> Vec<CleanupEntry> {
        let mut state = self.lock();
        state.sealed = true;
        std::mem::take(&mut state.entries)
    }

    /// Snapshot, clear and seal the registry, then run every action that was
    /// pending, in order, with inherited stdio.
    ///
    /// Individual failures are logged and counted but never stop the
    /// remaining actions. Calling this again executes nothing.
    pub async fn drain_and_execute(&self, runner: &dyn CommandRunner) -> DrainReport {
        let entries = self.take_and_seal();
        let mut report = DrainReport::default();

        if entries.is_empty() {
            debug!("cleanup drain: nothing pending");
            return report;
        }

        info!(count = entries.len(), "running cleanup actions");
        for entry in entries {
            console::cleanup_action(&entry.action);
            report.executed += 1;
            if let Err(err) = runner.run(&entry.action, false).await {
                report.failed += 1;
                warn!(
                    owner = ?entry.owner,
                    action = %entry.action,
                    error = %err,
                    "cleanup action failed; continuing"
                );
            }
        }

        report
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use modrunner::engine::Latch;
use modrunner::errors::RunnerError;
use modrunner::exec::{CommandRunner, RunFuture};

/// A fake runner that:
/// - records every command it is asked to run (start and finish order)
/// - succeeds unless a command was scripted to fail
/// - can hold a command until the test releases it (`gate`), or delay it.
///
/// Commands are matched by their fully rendered text.
pub struct ScriptedRunner {
    started: watch::Sender<Vec<(String, bool)>>,
    finished: Mutex<Vec<String>>,
    failures: HashMap<String, i32>,
    delays: HashMap<String, Duration>,
    gates: HashMap<String, Arc<Latch>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        let (started, _rx) = watch::channel(Vec::new());
        Self {
            started,
            finished: Mutex::new(Vec::new()),
            failures: HashMap::new(),
            delays: HashMap::new(),
            gates: HashMap::new(),
        }
    }

    /// `command` exits with status `1`.
    pub fn fail(self, command: &str) -> Self {
        self.fail_with(command, 1)
    }

    pub fn fail_with(mut self, command: &str, code: i32) -> Self {
        self.failures.insert(command.to_string(), code);
        self
    }

    /// `command` takes `delay` to finish.
    pub fn delay(mut self, command: &str, delay: Duration) -> Self {
        self.delays.insert(command.to_string(), delay);
        self
    }

    /// `command` blocks until [`ScriptedRunner::release`] is called for it.
    pub fn gate(mut self, command: &str) -> Self {
        self.gates.insert(command.to_string(), Arc::new(Latch::new()));
        self
    }

    pub fn release(&self, command: &str) {
        if let Some(gate) = self.gates.get(command) {
            gate.open();
        }
    }

    /// Commands in the order they were started.
    pub fn started(&self) -> Vec<String> {
        self.started.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    /// `(command, silent)` pairs in the order they were started.
    pub fn started_with_silence(&self) -> Vec<(String, bool)> {
        self.started.borrow().clone()
    }

    /// Commands in the order they finished.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.started.borrow().iter().filter(|(c, _)| c == command).count()
    }

    pub fn ran(&self, command: &str) -> bool {
        self.count(command) > 0
    }

    /// Resolve once `command` has been started at least once.
    pub async fn wait_started(&self, command: &str) {
        let mut rx = self.started.subscribe();
        let _ = rx
            .wait_for(|cmds| cmds.iter().any(|(c, _)| c == command))
            .await;
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(&'a self, command: &'a str, silent: bool) -> RunFuture<'a> {
        Box::pin(async move {
            self.started
                .send_modify(|cmds| cmds.push((command.to_string(), silent)));

            if let Some(gate) = self.gates.get(command) {
                gate.wait().await;
            }
            if let Some(delay) = self.delays.get(command) {
                tokio::time::sleep(*delay).await;
            }

            self.finished.lock().unwrap().push(command.to_string());

            match self.failures.get(command) {
                Some(code) => Err(RunnerError::CommandFailed {
                    command: command.to_string(),
                    code: Some(*code),
                }),
                None => Ok(()),
            }
        })
    }
}

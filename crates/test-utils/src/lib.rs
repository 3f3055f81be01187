pub mod builders;
pub mod fake_runner;

use std::future::Future;
use std::sync::{Arc, Once};
use std::time::Duration;

use modrunner::engine::RunContext;
use modrunner::vars::Bindings;
use tokio::sync::oneshot;
use tracing_subscriber::{fmt, EnvFilter};

use crate::fake_runner::ScriptedRunner;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Run context backed by `runner`, with empty bindings and the default
/// rendezvous timeout.
pub fn context(runner: Arc<ScriptedRunner>) -> Arc<RunContext> {
    Arc::new(RunContext::new(Bindings::default(), runner))
}

pub fn context_with(
    runner: Arc<ScriptedRunner>,
    bindings: Bindings,
    rendezvous_timeout: Duration,
) -> Arc<RunContext> {
    Arc::new(RunContext::with_rendezvous_timeout(
        bindings,
        runner,
        rendezvous_timeout,
    ))
}

/// A signal that never fires.
pub fn no_signal() -> impl Future<Output = ()> + Send + 'static {
    std::future::pending()
}

/// Test-controlled interrupt: call [`InterruptTrigger::fire`] to deliver it.
pub struct InterruptTrigger {
    tx: Option<oneshot::Sender<()>>,
}

impl InterruptTrigger {
    pub fn fire(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A signal future plus the trigger that fires it. Dropping the trigger
/// without firing never delivers the signal.
pub fn manual_signal() -> (InterruptTrigger, impl Future<Output = ()> + Send + 'static) {
    let (tx, rx) = oneshot::channel::<()>();
    let signal = async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    (InterruptTrigger { tx: Some(tx) }, signal)
}

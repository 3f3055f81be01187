#![allow(dead_code)]

pub use modrunner_test_utils::*;

use std::time::Duration;

/// Poll `cond` every few milliseconds until it holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    while !cond() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

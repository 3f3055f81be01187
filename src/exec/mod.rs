// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `CommandRunner` trait and the production
//!   `ShellRunner`, which tests replace with a scripted fake.
//! - [`command`] prepares command templates (placeholder rendering, the
//!   silent `docker run -it` accommodation) and runs them through a runner.

pub mod backend;
pub mod command;

pub use backend::{CommandRunner, RunFuture, ShellRunner};
pub use command::{execute, prepare_command};

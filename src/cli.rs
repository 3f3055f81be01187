// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `modrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "modrunner",
    version,
    about = "Run workflow modules of shell commands with interrupt cleanup.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow file (YAML).
    #[arg(short = 'w', long = "workflow", value_name = "PATH")]
    pub workflow: PathBuf,

    /// Suppress the banner.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MODRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print modules with resolved commands, but don't
    /// execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Variable overrides (`KEY=VALUE`), or `usage` to print the workflow's
    /// usage text and exit.
    #[arg(value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

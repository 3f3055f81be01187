// src/console.rs

//! User-facing status output on stdout.
//!
//! Every status line has the shape
//! `[<timestamp>] [INFO] Module '<name>' <status> <emoji>`, with the
//! timestamp in yellow and the module name in cyan. Diagnostics go through
//! `tracing` on stderr instead.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::Local;
use crossterm::style::{style, Stylize};

use crate::config::USAGE_VAR_KEY;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BANNER: &str = r"
   __  ___        __
  /  |/  /__  ___/ /______ _____  ___  ___ ____
 / /|_/ / _ \/ _  / __/ // / _ \/ _ \/ -_) __/
/_/  /_/\___/\_,_/_/  \_,_/_//_/_//_/\__/_/
";

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Build one status line. `tag` is the already-coloured `INFO` marker.
fn status_line(tag: impl Display, message: impl Display) -> String {
    format!("[{}] [{}] {}", style(timestamp()).yellow(), tag, message)
}

fn module_line(name: &str, status: impl Display, emoji: &str) -> String {
    status_line(
        style("INFO").yellow(),
        format!("Module '{}' {} {}", style(name).cyan(), status, emoji),
    )
}

pub fn banner() {
    println!("{}", style(BANNER).white());
    println!("{:>44}\n", format!("v{} 🔱", env!("CARGO_PKG_VERSION")));
}

pub fn module_running(name: &str) {
    println!("{}", module_line(name, style("running").yellow(), "✨"));
}

pub fn module_completed(name: &str) {
    println!("{}", module_line(name, style("completed").green(), "✅"));
}

pub fn module_errored(name: &str) {
    println!("{}", module_line(name, style("errored").red(), "❌"));
}

pub fn interrupt_received() {
    println!();
    println!(
        "{}",
        status_line(style("INFO").red(), "Received interrupt signal ⭕")
    );
}

pub fn cleanup_action(action: &str) {
    println!(
        "{}",
        status_line(
            style("INFO").red(),
            format!("Running cleanup '{}'", style(action).magenta())
        )
    );
}

pub fn interrupt_timeout() {
    println!(
        "{}",
        status_line(style("INFO").red(), "Modules may not have exited ❌")
    );
}

pub fn all_completed() {
    println!(
        "{}",
        status_line(style("INFO").yellow(), "All modules completed successfully ✅")
    );
}

pub fn run_interrupted(not_started: usize) {
    println!(
        "{}",
        status_line(
            style("INFO").red(),
            format!("Run interrupted; {not_started} module(s) not started ⭕")
        )
    );
}

/// Print the workflow's usage text followed by its variable defaults.
pub fn usage(text: &str, defaults: &BTreeMap<String, String>) {
    for line in usage_lines(text, defaults) {
        println!("{line}");
    }
}

fn usage_lines(text: &str, defaults: &BTreeMap<String, String>) -> Vec<String> {
    let mut lines = vec!["Usage:".to_string(), text.to_string(), String::new()];
    lines.push("Variables from workflow:".to_string());
    lines.extend(
        defaults
            .iter()
            .filter(|(key, _)| key.as_str() != USAGE_VAR_KEY)
            .map(|(key, value)| format!("{key}: {value}")),
    );
    lines
}

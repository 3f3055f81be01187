// src/exec/command.rs

//! Turning a command template into the text that is actually executed.

use tracing::debug;

use crate::errors::Result;
use crate::exec::backend::CommandRunner;
use crate::vars::Bindings;

/// Prepare a command template for execution.
///
/// 1. When `silent` is requested, rewrite interactive `docker run -it`
///    invocations to `-i` (a TTY cannot be attached to discarded output).
/// 2. Resolve `{{KEY}}` placeholders from `bindings`.
pub fn prepare_command(template: &str, silent: bool, bindings: &Bindings) -> String {
    let template = if silent {
        strip_interactive_tty(template)
    } else {
        template.to_string()
    };

    bindings.render(&template).into_owned()
}

/// Render and run one command template.
pub async fn execute(
    runner: &dyn CommandRunner,
    template: &str,
    silent: bool,
    bindings: &Bindings,
) -> Result<()> {
    let command = prepare_command(template, silent, bindings);
    runner.run(&command, silent).await
}

/// Replace every `-it` with `-i` when the template looks like `docker ... run
/// ... -it`, judged by the first occurrence of each marker.
fn strip_interactive_tty(template: &str) -> String {
    let docker = template.find("docker");
    let run = template.find("run");
    let tty = template.find("-it");

    match (docker, run, tty) {
        (Some(d), Some(r), Some(t)) if d < r && r < t => {
            debug!(cmd = %template, "silent docker run: dropping -t from -it");
            template.replace("-it", "-i")
        }
        _ => template.to_string(),
    }
}

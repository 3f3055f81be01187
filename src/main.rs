// src/main.rs

use modrunner::errors::RunnerError;
use modrunner::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) if err.is_config_error() => {
            eprintln!("modrunner: cannot load workflow: {err}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("modrunner error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> Result<i32, RunnerError> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let outcome = run(args).await?;
    Ok(outcome.map_or(0, |o| o.exit_code()))
}

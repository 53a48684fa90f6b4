use std::process::ExitCode;

use clap::Parser;
use lstk::config::ConfigLocations;
use lstk::env::EnvConfig;
use lstk::output::is_silent;
use lstk_cli::cli::Cli;
use lstk_cli::commands::{execute, is_cancelled, Context};
use lstk_cli::logging;
use lstk_terminal::is_interactive;
use tokio_util::sync::CancellationToken;

/// Conventional exit status after SIGINT.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = EnvConfig::from_env();
    logging::init(env.log_filter.as_deref());

    let locations = match ConfigLocations::detect() {
        Ok(locations) => locations,
        Err(error) => {
            eprintln!("Error: could not determine working directory: {error}");
            return ExitCode::FAILURE;
        }
    };

    // Raw mode swallows SIGINT while the UI runs; this covers line mode.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let ctx = Context {
        env,
        locations,
        interactive: is_interactive(),
        cancel,
    };
    match execute(cli.command(), ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if is_cancelled(&error) => ExitCode::from(EXIT_CANCELLED),
        Err(error) if error.chain().any(|cause| is_silent(cause)) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

//! `termline`: match, complete, highlight and validate input against a
//! grammar from the command line.

use std::io::Write;

use clap::Parser;
use tracing::{error, info};

use termline_cli::cli::Args;
use termline_cli::config::CliConfig;
use termline_cli::error::CliError;
use termline_cli::logging::init_logging;
use termline_cli::session::{Outcome, Session};

/// Exit code for configuration and grammar errors.
const CONFIG_ERROR: i32 = 2;

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&CliConfig::default());
            error!(error = %e, "invalid configuration");
            std::process::exit(CONFIG_ERROR);
        }
    };
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "starting termline");

    match run(&args, &config) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            error!(error = %e, "command failed");
            std::process::exit(CONFIG_ERROR);
        }
    }
}

fn build_config(args: &Args) -> Result<CliConfig, CliError> {
    let config = CliConfig::from_env()?;
    let default_style = args
        .default_style
        .as_deref()
        .map(termline_cli::config::parse_style)
        .transpose()?;
    Ok(config.apply_overrides(args.log_level, default_style))
}

fn run(args: &Args, config: &CliConfig) -> Result<Outcome, CliError> {
    let session = Session::from_args(args, config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = session.run(&args.command, &mut out)?;
    out.flush()?;
    Ok(outcome)
}

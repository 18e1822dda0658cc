//! The runner entry point for binaries that register mtest suites.
//!
//! A runner builds an [`Engine`], registers its tests and hands it to [`run`],
//! which parses arguments, applies configuration, installs logging, runs every
//! suite and exits with a non-zero code when anything failed.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::engine::{Engine, RunSummary};
use crate::error::MtestError;

pub mod args;
pub mod diagnostics;
pub mod output;

pub use args::Args;

/// Environment variable holding the default log filter.
pub const ENV_LOG: &str = "MTEST_LOG";

/// Exit code used when the run could not start (bad config, bad arguments).
pub const EXIT_SETUP_ERROR: i32 = 2;

/// The main entry point for runner binaries. Never returns.
pub fn run(mut engine: Engine) -> ! {
    let args = Args::parse();
    let code = match execute(&mut engine, &args) {
        Ok(summary) => summary.exit_code(),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            EXIT_SETUP_ERROR
        }
    };
    process::exit(code)
}

/// Resolves configuration from `args` and runs all suites of `engine`.
pub fn execute(engine: &mut Engine, args: &Args) -> Result<RunSummary, MtestError> {
    init_logging(args.log_level.as_deref());
    let config = args.resolve_config()?;
    tracing::debug!(?config, suites = engine.registry().len(), "starting run");
    engine.set_config(config);
    Ok(engine.run_all())
}

/// Builds the log filter from `--log-level`, else `MTEST_LOG`, else `error`.
/// Unparsable directives fall back to `error`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(d) => EnvFilter::try_new(d).ok(),
        None => EnvFilter::try_from_env(ENV_LOG).ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("error"))
}

/// Installs a stderr `tracing` subscriber. A second call is a no-op.
fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

//! Defines the command-line arguments accepted by an mtest runner binary.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{OutputFormat, RunConfig};
use crate::error::MtestError;

/// The runner argument structure.
#[derive(Debug, Default, Parser)]
#[command(
    name = "mtest",
    version,
    about = "Run every registered test suite and report the results."
)]
pub struct Args {
    /// Output format (overrides config file and MTEST_FORMAT).
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Path to a YAML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Let panics in test bodies abort the whole run.
    #[arg(long)]
    pub no_catch_panics: bool,

    /// Do not read source files when rendering failures.
    #[arg(long)]
    pub no_source_context: bool,

    /// Log filter for engine diagnostics, e.g. `debug` (defaults to MTEST_LOG).
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Args {
    /// Merges defaults, the config file, the environment and these flags.
    pub fn resolve_config(&self) -> Result<RunConfig, MtestError> {
        let base = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        Ok(self.apply(base.apply_env()?))
    }

    fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.no_color {
            config.use_colors = false;
        }
        if self.no_catch_panics {
            config.catch_panics = false;
        }
        if self.no_source_context {
            config.source_context = false;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "mtest",
            "--format",
            "json",
            "--no-color",
            "--no-catch-panics",
        ]);
        let config = args.apply(RunConfig {
            use_colors: true,
            ..RunConfig::default()
        });
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.use_colors);
        assert!(!config.catch_panics);
        assert!(config.source_context);
    }

    #[test]
    fn no_flags_keep_config() {
        let base = RunConfig {
            format: OutputFormat::Json,
            use_colors: true,
            catch_panics: false,
            source_context: false,
        };
        assert_eq!(Args::parse_from(["mtest"]).apply(base.clone()), base);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("definitely/not/here.yaml")),
            ..Args::default()
        };
        assert!(matches!(args.resolve_config(), Err(MtestError::Read { .. })));
    }
}

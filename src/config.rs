//! Run configuration.
//!
//! Precedence, lowest first: built-in defaults, a YAML file, environment
//! variables, command-line flags (applied by [`crate::cli`]).
//!
//! ```yaml
//! format: json          # text | json
//! use_colors: false
//! catch_panics: true
//! source_context: true
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::MtestError;

pub const ENV_FORMAT: &str = "MTEST_FORMAT";
pub const ENV_CATCH_PANICS: &str = "MTEST_CATCH_PANICS";
pub const ENV_NO_COLOR: &str = "NO_COLOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = MtestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(MtestError::InvalidSetting {
                setting: "format".to_string(),
                value: other.to_string(),
                help: Some("expected `text` or `json`".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub format: OutputFormat,
    pub use_colors: bool,
    /// Convert panics inside test bodies into fatal diagnostics.
    pub catch_panics: bool,
    /// Read source files to show real lines around a failure.
    pub source_context: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            use_colors: atty::is(atty::Stream::Stdout),
            catch_panics: true,
            source_context: true,
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(name: &str, text: &str) -> Result<Self, MtestError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| MtestError::config_parse(name, text, e))
    }

    pub fn load(path: &Path) -> Result<Self, MtestError> {
        let text = fs::read_to_string(path).map_err(|source| MtestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&path.display().to_string(), &text)
    }

    /// Applies `MTEST_FORMAT`, `MTEST_CATCH_PANICS` and `NO_COLOR` from the
    /// process environment.
    pub fn apply_env(self) -> Result<Self, MtestError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, MtestError> {
        if let Some(format) = var(ENV_FORMAT) {
            self.format = format.parse()?;
        }
        if let Some(flag) = var(ENV_CATCH_PANICS) {
            self.catch_panics = parse_flag(ENV_CATCH_PANICS, &flag)?;
        }
        // https://no-color.org: any non-empty value disables color.
        if var(ENV_NO_COLOR).is_some_and(|v| !v.is_empty()) {
            self.use_colors = false;
        }
        Ok(self)
    }
}

fn parse_flag(setting: &str, value: &str) -> Result<bool, MtestError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MtestError::InvalidSetting {
            setting: setting.to_string(),
            value: other.to_string(),
            help: Some("expected a boolean such as `true` or `0`".to_string()),
        }),
    }
}

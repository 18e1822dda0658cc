//! Errors at the edges of the engine: configuration loading and reporter output.
//!
//! Registration and checks never produce these; test failures are data
//! ([`Diagnostic`](crate::Diagnostic)s), not errors.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum MtestError {
    #[error("could not read {}", path.display())]
    #[diagnostic(code(mtest::io::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report output")]
    #[diagnostic(code(mtest::io::write))]
    Write(#[from] std::io::Error),

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(mtest::config::parse))]
    ConfigParse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("invalid value '{value}' for {setting}")]
    #[diagnostic(code(mtest::config::setting))]
    InvalidSetting {
        setting: String,
        value: String,
        #[help]
        help: Option<String>,
    },

    #[error("failed to encode event as JSON")]
    #[diagnostic(code(mtest::report::json))]
    Json(#[from] serde_json::Error),
}

impl MtestError {
    /// Wraps a YAML error with the offending document so miette can point at it.
    pub(crate) fn config_parse(name: &str, text: &str, err: serde_yaml::Error) -> Self {
        let span = err.location().map(|loc| SourceSpan::from((loc.index(), 1)));
        MtestError::ConfigParse {
            message: err.to_string(),
            src: NamedSource::new(name, text.to_string()),
            span,
        }
    }
}

//! The record produced by one failed check.
//!
//! A [`Diagnostic`] is created exactly once, at the failing call site, and is
//! owned by the [`Recorder`](crate::Recorder) log from then on. Nothing mutates
//! it after construction; reporters only ever see shared references or clones.

use std::borrow::Cow;

use serde::Serialize;

/// Whether a failed check stops the rest of its suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The test body stops and the remaining tests of the suite are skipped.
    Fatal,
    /// The failure is recorded and execution continues.
    Recoverable,
}

impl Severity {
    pub fn is_fatal(self) -> bool {
        matches!(self, Severity::Fatal)
    }
}

/// How the two stringified values of a diagnostic are labeled when reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Raw comparison: values are shown as `V1` / `V2`.
    Comparison,
    /// Expectation-style: values are shown as `Expected` / `Got`.
    ExpectationLabeled,
}

/// Textual value stored for the missing operand of a unary check.
pub const UNARY_SENTINEL: &str = "null";

/// Location and call text captured by a check macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub expression: String,
    pub message: String,
}

impl CallSite {
    pub fn new(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        expression: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub source_file: String,
    pub source_line: u32,
    pub expression_text: String,
    pub actual: String,
    /// `None` for unary checks (`check_true!`, `require_false!`, ...).
    pub expected: Option<String>,
    pub mode: LabelMode,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        actual: String,
        expected: Option<String>,
        site: CallSite,
        severity: Severity,
        mode: LabelMode,
    ) -> Self {
        Self {
            message: site.message,
            source_file: site.file.into_owned(),
            source_line: site.line,
            expression_text: site.expression,
            actual,
            expected,
            mode,
            severity,
        }
    }

    /// The expected value as displayed, with the unary sentinel substituted.
    pub fn expected_text(&self) -> &str {
        self.expected.as_deref().unwrap_or(UNARY_SENTINEL)
    }

    /// The two labeled values in display order.
    ///
    /// Comparison mode lists the actual value first (`V1`), expectation mode
    /// lists the expected value first.
    pub fn labeled_values(&self) -> [(&'static str, &str); 2] {
        match self.mode {
            LabelMode::Comparison => [("V1", self.actual.as_str()), ("V2", self.expected_text())],
            LabelMode::ExpectationLabeled => [
                ("Expected", self.expected_text()),
                ("Got", self.actual.as_str()),
            ],
        }
    }

    /// `file:line` of the failing check.
    pub fn location(&self) -> String {
        format!("{}:{}", self.source_file, self.source_line)
    }
}

//! Events emitted by the run loop, and the trait renderers implement to
//! consume them.

use serde::Serialize;

use crate::diagnostic::Diagnostic;
use crate::error::MtestError;

/// Terminal state of one executed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SuiteStarted {
        name: String,
    },
    TestResult {
        suite: String,
        name: String,
        /// 1-based position within the suite.
        index: usize,
        total: usize,
        outcome: Outcome,
        /// The last diagnostic recorded by this test, if it failed.
        diagnostic: Option<Diagnostic>,
    },
    RunSummary {
        passed: usize,
        failed: usize,
    },
}

/// A sink for run events: text, JSON, or anything else.
///
/// Errors returned here are logged by the engine and never change the outcome
/// of a run.
pub trait Reporter {
    fn on_event(&mut self, event: &Event) -> Result<(), MtestError>;
}

/// A reporter that discards everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_event(&mut self, _event: &Event) -> Result<(), MtestError> {
        Ok(())
    }
}

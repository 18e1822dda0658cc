//! The test engine: registration, failure recording and the run loop.
//!
//! One [`Engine`] is built per process, before any test is registered, and is
//! passed explicitly to registration sites and to [`Engine::run_all`].
//!
//! Per test the run loop moves `Pending -> Running -> {Succeeded, FailedFatal,
//! FailedSoft}`. A fatal failure ends the current suite after reporting; the
//! next suite still runs.

use serde::Serialize;

use crate::cli::output;
use crate::config::RunConfig;
use crate::diagnostic::{CallSite, Diagnostic, LabelMode, Severity};
use crate::events::{Event, Outcome, Reporter};
use crate::recorder::Recorder;
use crate::registry::{Registry, TestCase};

mod unwind;

// ============================================================================
// RUN RESULTS
// ============================================================================

/// Final counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    /// Number of recorded diagnostics, not of failed tests.
    pub failed: usize,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Conventional process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Terminal state of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TestState {
    Succeeded,
    FailedFatal,
    FailedSoft,
}

impl TestState {
    fn outcome(self) -> Outcome {
        match self {
            TestState::Succeeded => Outcome::Succeeded,
            TestState::FailedFatal | TestState::FailedSoft => Outcome::Failed,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Default)]
pub struct Engine {
    registry: Registry,
    recorder: Recorder,
    passed: usize,
    config: RunConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RunConfig) {
        self.config = config;
    }

    /// Registers a test body under `suite_name`. See [`Registry::register`].
    #[track_caller]
    pub fn register<F>(&mut self, suite_name: &str, test_name: &str, body: F)
    where
        F: Fn(&mut Recorder) + 'static,
    {
        self.registry.register(suite_name, test_name, body);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Records a failure outside of any test body. Test bodies use the
    /// recorder they are handed instead.
    pub fn record_failure(
        &mut self,
        actual: String,
        expected: Option<String>,
        site: CallSite,
        severity: Severity,
        mode: LabelMode,
    ) {
        self.recorder.record_failure(actual, expected, site, severity, mode);
    }

    /// Every diagnostic recorded so far, in order. Never cleared.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.recorder.diagnostics()
    }

    pub fn passed_count(&self) -> usize {
        self.passed
    }

    pub fn failed_count(&self) -> usize {
        self.recorder.failed_count()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.passed,
            failed: self.recorder.failed_count(),
        }
    }

    /// Runs every suite, reporting to stdout in the configured format.
    pub fn run_all(&mut self) -> RunSummary {
        let mut reporter = output::stdout_reporter(&self.config);
        self.run_with(reporter.as_mut())
    }

    /// Runs every suite in registration order, sending events to `reporter`.
    pub fn run_with(&mut self, reporter: &mut dyn Reporter) -> RunSummary {
        let Engine {
            registry,
            recorder,
            passed,
            config,
        } = self;

        for suite in registry.suites() {
            tracing::info!(suite = suite.name(), tests = suite.len(), "running suite");
            emit(
                reporter,
                &Event::SuiteStarted {
                    name: suite.name().to_string(),
                },
            );

            let total = suite.len();
            for (pos, test) in suite.tests().iter().enumerate() {
                let (state, diagnostic) = run_test(test, recorder, config.catch_panics);
                if state == TestState::Succeeded {
                    *passed += 1;
                }
                emit(
                    reporter,
                    &Event::TestResult {
                        suite: suite.name().to_string(),
                        name: test.name().to_string(),
                        index: pos + 1,
                        total,
                        outcome: state.outcome(),
                        diagnostic,
                    },
                );

                if state == TestState::FailedFatal {
                    tracing::warn!(
                        suite = suite.name(),
                        test = test.name(),
                        skipped = total - pos - 1,
                        "fatal failure, aborting suite"
                    );
                    break;
                }
            }
        }

        let summary = RunSummary {
            passed: *passed,
            failed: recorder.failed_count(),
        };
        emit(
            reporter,
            &Event::RunSummary {
                passed: summary.passed,
                failed: summary.failed,
            },
        );
        summary
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// Executes one test body and classifies it. The returned diagnostic is the
/// last one appended while this test ran.
fn run_test(
    test: &TestCase,
    recorder: &mut Recorder,
    catch_panics: bool,
) -> (TestState, Option<Diagnostic>) {
    let before = recorder.begin_test();

    if catch_panics {
        unwind::invoke_catching(test, recorder);
    } else {
        test.invoke(recorder);
    }

    let flags = recorder.take_flags();
    let last = recorder.last_since(before).cloned();
    let state = if flags.abort_requested {
        TestState::FailedFatal
    } else if flags.any() || last.is_some() {
        TestState::FailedSoft
    } else {
        TestState::Succeeded
    };
    (state, last)
}

fn emit(reporter: &mut dyn Reporter, event: &Event) {
    if let Err(e) = reporter.on_event(event) {
        tracing::warn!(error = %e, "reporter failed to handle event");
    }
}

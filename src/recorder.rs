//! Failure bookkeeping shared between check primitives and the run loop.

use crate::diagnostic::{CallSite, Diagnostic, LabelMode, Severity};

/// Transient flags raised by failures since the last time they were consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PendingFlags {
    pub abort_requested: bool,
    pub soft_failure_pending: bool,
}

impl PendingFlags {
    pub fn any(self) -> bool {
        self.abort_requested || self.soft_failure_pending
    }
}

/// The append-only diagnostic log plus failure counters.
///
/// Test bodies receive `&mut Recorder`; the check macros call
/// [`Recorder::record_failure`] on it. Nothing else can alter the log.
#[derive(Debug, Default)]
pub struct Recorder {
    diagnostics: Vec<Diagnostic>,
    failed: usize,
    flags: PendingFlags,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one diagnostic and raises the flag matching its severity.
    ///
    /// Every check primitive funnels its failures through here.
    pub fn record_failure(
        &mut self,
        actual: String,
        expected: Option<String>,
        site: CallSite,
        severity: Severity,
        mode: LabelMode,
    ) {
        tracing::debug!(
            file = %site.file,
            line = site.line,
            ?severity,
            message = %site.message,
            "check failed"
        );
        self.diagnostics.push(Diagnostic::new(actual, expected, site, severity, mode));
        self.failed += 1;
        match severity {
            Severity::Fatal => self.flags.abort_requested = true,
            Severity::Recoverable => self.flags.soft_failure_pending = true,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Whether a fatal failure has been recorded in the current test.
    pub fn abort_requested(&self) -> bool {
        self.flags.abort_requested
    }

    /// Opens a new test window: clears the transient flags and returns the
    /// log length the window starts at.
    pub(crate) fn begin_test(&mut self) -> usize {
        self.flags = PendingFlags::default();
        self.diagnostics.len()
    }

    /// Returns and clears the transient flags.
    pub(crate) fn take_flags(&mut self) -> PendingFlags {
        std::mem::take(&mut self.flags)
    }

    /// Last diagnostic appended at or after `start`.
    pub(crate) fn last_since(&self, start: usize) -> Option<&Diagnostic> {
        self.diagnostics.get(start..).and_then(<[Diagnostic]>::last)
    }
}

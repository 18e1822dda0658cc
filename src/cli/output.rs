//! Handles all user-facing output of a run.
//!
//! Reporters consume [`Event`]s from the engine. The text reporter reproduces
//! the classic console layout (suite banners, `[i/n] Testing: name ...` rows,
//! failure blocks with a source window, a summary rule); the JSON reporter
//! writes one object per event per line; [`EventBuffer`] keeps the events in
//! memory for tests and embedders.

// ============================================================================
// REPORTER SELECTION
// ============================================================================

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::diagnostics::{SourceCache, SourceWindow};
use crate::config::{OutputFormat, RunConfig};
use crate::diagnostic::{Diagnostic, LabelMode};
use crate::error::MtestError;
use crate::events::{Event, Outcome, Reporter};

/// Values shorter than this are compared by eye; longer ones get a diff line.
const DIFF_MIN_LEN: usize = 16;

const RULE: &str = "-------------------------";

/// Builds the reporter selected by `config`, writing to stdout.
pub fn stdout_reporter(config: &RunConfig) -> Box<dyn Reporter> {
    match config.format {
        OutputFormat::Text => {
            let choice = if config.use_colors {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            };
            Box::new(TextReporter::new(
                StandardStream::stdout(choice),
                config.source_context,
            ))
        }
        OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
    }
}

// ============================================================================
// EVENT BUFFER
// ============================================================================

/// EventBuffer: collects events for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pub events: Vec<Event>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics attached to failure reports, in report order.
    pub fn reported_diagnostics(&self) -> Vec<&Diagnostic> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::TestResult {
                    diagnostic: Some(d),
                    ..
                } => Some(d),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for EventBuffer {
    fn on_event(&mut self, event: &Event) -> Result<(), MtestError> {
        self.events.push(event.clone());
        Ok(())
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Writes each event as a single JSON line.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_event(&mut self, event: &Event) -> Result<(), MtestError> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        if matches!(event, Event::RunSummary { .. }) {
            self.out.flush()?;
        }
        Ok(())
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Colored console reporter. Colors are dropped when `W` does not support them.
pub struct TextReporter<W: WriteColor> {
    out: W,
    sources: Option<SourceCache>,
}

impl<W: WriteColor> TextReporter<W> {
    /// `source_context` enables reading source files for the failure window.
    pub fn new(out: W, source_context: bool) -> Self {
        Self {
            out,
            sources: source_context.then(SourceCache::new),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&mut self, color: Option<Color>, text: &str) -> io::Result<()> {
        match color {
            Some(c) => {
                self.out.set_color(ColorSpec::new().set_fg(Some(c)).set_bold(true))?;
                write!(self.out, "{text}")?;
                self.out.reset()
            }
            None => write!(self.out, "{text}"),
        }
    }

    fn suite_banner(&mut self, name: &str) -> io::Result<()> {
        self.paint(Some(Color::Green), RULE)?;
        writeln!(self.out)?;
        self.paint(Some(Color::Blue), " Running Suite: ")?;
        self.paint(Some(Color::Yellow), name)?;
        writeln!(self.out)?;
        self.paint(Some(Color::Green), RULE)?;
        writeln!(self.out)
    }

    fn result_row(
        &mut self,
        name: &str,
        index: usize,
        total: usize,
        outcome: Outcome,
    ) -> io::Result<()> {
        self.paint(Some(Color::Cyan), &format!("[{index}/{total}]"))?;
        self.paint(Some(Color::Green), " Testing: ")?;
        self.paint(Some(Color::Blue), name)?;
        self.paint(Some(Color::White), " ..............")?;
        match outcome {
            Outcome::Succeeded => self.paint(Some(Color::Green), " Success")?,
            Outcome::Failed => self.paint(Some(Color::Red), " Failure")?,
        }
        writeln!(self.out)
    }

    fn failure_block(&mut self, d: &Diagnostic) -> io::Result<()> {
        self.paint(Some(Color::White), &format!("{}: ", d.location()))?;
        self.paint(Some(Color::Red), "error: ")?;
        self.paint(Some(Color::White), &d.message)?;
        writeln!(self.out)?;

        let [(first_label, first), (second_label, second)] = d.labeled_values();
        let pad = first_label.len().max(second_label.len());
        self.paint(Some(Color::Blue), &format!(" {first_label:<pad$} : "))?;
        self.paint(Some(Color::Green), first)?;
        writeln!(self.out)?;
        self.paint(Some(Color::Blue), &format!(" {second_label:<pad$} : "))?;
        let second_color = match d.mode {
            LabelMode::Comparison => Color::Red,
            LabelMode::ExpectationLabeled => Color::Green,
        };
        self.paint(Some(second_color), second)?;
        writeln!(self.out)?;

        if d.mode == LabelMode::ExpectationLabeled {
            if let Some(expected) = d.expected.as_deref() {
                if expected.len().max(d.actual.len()) >= DIFF_MIN_LEN {
                    self.paint(Some(Color::Blue), &format!(" {:<pad$} : ", "Diff"))?;
                    let changeset = Changeset::new(expected, &d.actual, "");
                    self.print_diff(&changeset.diffs)?;
                    writeln!(self.out)?;
                }
            }
        }
        writeln!(self.out)?;

        let window = SourceWindow::build(d, self.sources.as_mut());
        for (line, marked) in window.lines() {
            self.paint(marked.then_some(Color::Red), &line)?;
            writeln!(self.out)?;
        }
        writeln!(self.out)
    }

    fn print_diff(&mut self, diffs: &[Difference]) -> io::Result<()> {
        for diff in diffs {
            match diff {
                Difference::Same(x) => self.paint(None, x)?,
                Difference::Add(x) => self.paint(Some(Color::Green), &format!("{{+{x}+}}"))?,
                Difference::Rem(x) => self.paint(Some(Color::Red), &format!("[-{x}-]"))?,
            }
        }
        Ok(())
    }

    fn summary(&mut self, passed: usize, failed: usize) -> io::Result<()> {
        writeln!(self.out)?;
        self.paint(Some(Color::White), &format!("{RULE} Tests: "))?;
        self.paint(Some(Color::Green), &format!("{passed} succeeded, "))?;
        self.paint(Some(Color::Red), &format!("{failed} failed "))?;
        self.paint(Some(Color::White), RULE)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: WriteColor> Reporter for TextReporter<W> {
    fn on_event(&mut self, event: &Event) -> Result<(), MtestError> {
        match event {
            Event::SuiteStarted { name } => self.suite_banner(name)?,
            Event::TestResult {
                name,
                index,
                total,
                outcome,
                diagnostic,
                ..
            } => {
                self.result_row(name, *index, *total, *outcome)?;
                if let Some(d) = diagnostic {
                    self.failure_block(d)?;
                }
            }
            Event::RunSummary { passed, failed } => self.summary(*passed, *failed)?,
        }
        Ok(())
    }
}

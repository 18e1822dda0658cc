//! Run-loop behavior: ordering, grouping, counting and abort propagation.

use std::cell::RefCell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use mtest::cli::output::EventBuffer;
use mtest::{
    check_eq, check_false, check_gt, check_le, require_expect, require_ne, Engine, Event,
    LabelMode, MtestError, Outcome, Reporter, RunConfig, RunSummary, Severity,
};

fn engine() -> Engine {
    Engine::with_config(RunConfig {
        use_colors: false,
        ..RunConfig::default()
    })
}

type Trace = Rc<RefCell<Vec<&'static str>>>;

/// Registers a test that appends `name` to `trace` when it runs.
fn traced(engine: &mut Engine, trace: &Trace, suite: &str, name: &'static str) {
    let trace = Rc::clone(trace);
    engine.register(suite, name, move |_| trace.borrow_mut().push(name));
}

#[test]
fn executes_in_registration_order() {
    let mut engine = engine();
    let trace = Trace::default();
    traced(&mut engine, &trace, "beta", "b1");
    traced(&mut engine, &trace, "alpha", "a1");
    traced(&mut engine, &trace, "beta", "b2");
    traced(&mut engine, &trace, "gamma", "g1");
    traced(&mut engine, &trace, "alpha", "a2");

    let mut buffer = EventBuffer::new();
    let summary = engine.run_with(&mut buffer);

    assert_eq!(*trace.borrow(), vec!["b1", "b2", "a1", "a2", "g1"]);
    assert_eq!(summary, RunSummary { passed: 5, failed: 0 });

    let suites: Vec<_> = buffer
        .events
        .iter()
        .filter_map(|e| match e {
            Event::SuiteStarted { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(suites, vec!["beta", "alpha", "gamma"]);
}

#[test]
fn same_suite_name_groups_into_one_suite() {
    let mut engine = engine();
    for i in 0..4 {
        let suite = if i % 2 == 0 { "even" } else { "odd" };
        engine.register(suite, "t", |_| {});
    }
    assert_eq!(engine.registry().len(), 2);
    assert_eq!(engine.registry().test_count(), 4);
}

#[test]
fn result_events_carry_position_and_total() {
    let mut engine = engine();
    engine.register("S", "first", |_| {});
    engine.register("S", "second", |_| {});

    let mut buffer = EventBuffer::new();
    engine.run_with(&mut buffer);

    let positions: Vec<_> = buffer
        .events
        .iter()
        .filter_map(|e| match e {
            Event::TestResult { index, total, .. } => Some((*index, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(positions, vec![(1, 2), (2, 2)]);
}

#[test]
fn failed_count_counts_diagnostics_not_tests() {
    let mut engine = engine();
    engine.register("S", "three failures", |t| {
        check_eq!(t, 1, 2, "a");
        check_gt!(t, 1, 2, "b");
        check_false!(t, true, "c");
    });
    engine.register("S", "passes", |t| {
        check_le!(t, 1, 2, "fine");
    });

    let summary = engine.run_with(&mut EventBuffer::new());
    assert_eq!(summary, RunSummary { passed: 1, failed: 3 });
    assert_eq!(engine.failed_count(), 3);
    assert_eq!(engine.passed_count(), 1);
    assert_eq!(engine.diagnostics().len(), 3);
}

#[test]
fn fatal_failure_aborts_only_its_suite() {
    let mut engine = engine();
    let trace = Trace::default();
    engine.register("A", "t1", |t| {
        require_ne!(t, 1, 1, "must differ");
    });
    traced(&mut engine, &trace, "A", "t2");
    traced(&mut engine, &trace, "B", "t3");

    let summary = engine.run_with(&mut EventBuffer::new());

    assert_eq!(*trace.borrow(), vec!["t3"]);
    assert_eq!(summary, RunSummary { passed: 1, failed: 1 });
}

#[test]
fn fatal_check_stops_the_test_body() {
    let mut engine = engine();
    engine.register("S", "stops", |t| {
        require_expect!(t, "got", "want", "labeled");
        check_eq!(t, 1, 2, "never recorded");
    });

    let mut buffer = EventBuffer::new();
    engine.run_with(&mut buffer);

    assert_eq!(engine.diagnostics().len(), 1);
    let d = &engine.diagnostics()[0];
    assert_eq!(d.severity, Severity::Fatal);
    assert_eq!(d.mode, LabelMode::ExpectationLabeled);
    assert_eq!(d.labeled_values(), [("Expected", "\"want\""), ("Got", "\"got\"")]);
}

#[test]
fn recoverable_failure_continues_with_next_test() {
    let mut engine = engine();
    let trace = Trace::default();
    engine.register("S", "t1", |t| {
        check_eq!(t, "a", "b", "soft");
    });
    traced(&mut engine, &trace, "S", "t2");

    let summary = engine.run_with(&mut EventBuffer::new());

    assert_eq!(*trace.borrow(), vec!["t2"]);
    assert_eq!(summary, RunSummary { passed: 1, failed: 1 });
}

#[test]
fn only_last_failure_of_a_test_is_reported() {
    let mut engine = engine();
    engine.register("S", "two soft failures", |t| {
        check_eq!(t, 10, 11, "first");
        check_eq!(t, 20, 21, "second");
    });

    let mut buffer = EventBuffer::new();
    engine.run_with(&mut buffer);

    assert_eq!(engine.diagnostics().len(), 2);
    let reported = buffer.reported_diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].message, "second");
    assert_eq!(reported[0].actual, "20");
    assert_eq!(reported[0].expected.as_deref(), Some("21"));
}

#[test]
fn soft_then_fatal_reports_fatal_and_aborts() {
    let mut engine = engine();
    let trace = Trace::default();
    engine.register("S", "mixed", |t| {
        check_eq!(t, 1, 2, "soft");
        require_ne!(t, 3, 3, "hard");
    });
    traced(&mut engine, &trace, "S", "after");

    let mut buffer = EventBuffer::new();
    engine.run_with(&mut buffer);

    assert!(trace.borrow().is_empty());
    let reported = buffer.reported_diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].message, "hard");
}

#[test]
fn passing_checks_after_a_failing_test_report_success() {
    let mut engine = engine();
    engine.register("S", "fails", |t| {
        check_eq!(t, 1, 2, "soft");
    });
    engine.register("S", "passes", |t| {
        check_eq!(t, 2, 2, "fine");
    });

    let mut buffer = EventBuffer::new();
    engine.run_with(&mut buffer);

    let last = buffer
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            Event::TestResult {
                outcome,
                diagnostic,
                ..
            } => Some((*outcome, diagnostic.is_none())),
            _ => None,
        });
    assert_eq!(last, Some((Outcome::Succeeded, true)));
}

#[test]
fn empty_engine_emits_only_the_summary() {
    let mut engine = engine();
    let mut buffer = EventBuffer::new();
    let summary = engine.run_with(&mut buffer);

    assert_eq!(summary, RunSummary { passed: 0, failed: 0 });
    assert_eq!(buffer.events, vec![Event::RunSummary { passed: 0, failed: 0 }]);
}

#[test]
fn comparison_check_round_trip() {
    let mut engine = engine();
    engine.register("math", "equal", |t| {
        check_eq!(t, 2 + 2, 4, "math");
    });
    engine.register("math", "unequal", |t| {
        check_eq!(t, 2 + 2, 5, "math");
    });
    engine.run_with(&mut EventBuffer::new());

    assert_eq!(engine.diagnostics().len(), 1);
    let d = &engine.diagnostics()[0];
    assert_eq!(d.actual, "4");
    assert_eq!(d.expected.as_deref(), Some("5"));
    assert_eq!(d.mode, LabelMode::Comparison);
    assert_eq!(d.severity, Severity::Recoverable);
    assert!(d.source_file.ends_with("test_execution.rs"));
}

#[test]
fn panics_propagate_when_catching_is_disabled() {
    let mut engine = Engine::with_config(RunConfig {
        use_colors: false,
        catch_panics: false,
        ..RunConfig::default()
    });
    engine.register("S", "boom", |_| panic!("raw panic"));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.run_with(&mut EventBuffer::new());
    }));
    assert!(result.is_err());
}

#[test]
fn caught_panic_is_a_fatal_diagnostic_at_the_panic_site() {
    let mut engine = engine();
    let line = line!() + 1;
    engine.register("S", "boom", |_| panic!("exploded"));
    engine.register("S", "skipped", |_| {});

    let mut buffer = EventBuffer::new();
    let summary = engine.run_with(&mut buffer);

    assert_eq!(summary, RunSummary { passed: 0, failed: 1 });
    let d = &engine.diagnostics()[0];
    assert_eq!(d.actual, "exploded");
    assert_eq!(d.expected.as_deref(), Some("no panic"));
    assert_eq!(d.source_line, line);
    assert!(d.source_file.ends_with("test_execution.rs"));
}

/// Accepts every event and then reports a write failure for it.
#[derive(Default)]
struct BrokenPipe {
    seen: Vec<Event>,
}

impl Reporter for BrokenPipe {
    fn on_event(&mut self, event: &Event) -> Result<(), MtestError> {
        self.seen.push(event.clone());
        Err(MtestError::Write(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "stdout closed",
        )))
    }
}

#[test]
fn reporter_errors_do_not_change_the_outcome() {
    let mut engine = engine();
    engine.register("S", "fails", |t| {
        check_eq!(t, 1, 2, "soft");
    });
    engine.register("S", "passes", |_| {});

    let mut reporter = BrokenPipe::default();
    let summary = engine.run_with(&mut reporter);

    assert_eq!(summary, RunSummary { passed: 1, failed: 1 });
    assert_eq!(summary.exit_code(), 1);
    // suite banner, two results, summary
    assert_eq!(reporter.seen.len(), 4);
    assert_eq!(
        reporter.seen.last(),
        Some(&Event::RunSummary {
            passed: 1,
            failed: 1
        })
    );
}

#[test]
fn nested_engine_keeps_the_outer_panic_site() {
    let mut engine = engine();
    let line = line!() + 8;
    engine.register("outer", "drives an inner engine", |_| {
        let mut inner = Engine::with_config(RunConfig {
            use_colors: false,
            ..RunConfig::default()
        });
        inner.register("inner", "passes", |_| {});
        inner.run_with(&mut EventBuffer::new());
        panic!("after inner run");
    });

    engine.run_with(&mut EventBuffer::new());

    let d = &engine.diagnostics()[0];
    assert_eq!(d.actual, "after inner run");
    assert_eq!(d.source_line, line);
}

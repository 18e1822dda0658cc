//! # mtest: Suite Registry
//!
//! Holds every registered test, grouped by suite name. Suites keep the position
//! of their first registration; tests keep call order within their suite.
//!
//! Registry Invariant: suite names are unique, test names are not. Registering a
//! second test with an existing test name simply appends another test case.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;

use crate::recorder::Recorder;

/// Body of a registered test. The recorder is the only channel for failures.
pub type TestFn = Box<dyn Fn(&mut Recorder)>;

/// A named test body. Immutable once registered.
pub struct TestCase {
    name: String,
    body: TestFn,
    registered_at: &'static Location<'static>,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where `register` was called; used when a body fails outside any check.
    pub fn registered_at(&self) -> &'static Location<'static> {
        self.registered_at
    }

    pub(crate) fn invoke(&self, recorder: &mut Recorder) {
        (self.body)(recorder)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("registered_at", &self.registered_at)
            .finish_non_exhaustive()
    }
}

/// A named, ordered group of tests.
#[derive(Debug)]
pub struct Suite {
    name: String,
    tests: Vec<TestCase>,
}

impl Suite {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

// Insertion-ordered suite storage with a name index for O(1) lookup.
#[derive(Debug, Default)]
pub struct Registry {
    suites: Vec<Suite>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a test to `suite_name`, creating the suite on first sight.
    ///
    /// This cannot fail.
    #[track_caller]
    pub fn register<F>(&mut self, suite_name: &str, test_name: &str, body: F)
    where
        F: Fn(&mut Recorder) + 'static,
    {
        let test = TestCase {
            name: test_name.to_string(),
            body: Box::new(body),
            registered_at: Location::caller(),
        };

        let pos = match self.index.get(suite_name) {
            Some(&pos) => pos,
            None => {
                let pos = self.suites.len();
                self.suites.push(Suite::new(suite_name));
                self.index.insert(suite_name.to_string(), pos);
                pos
            }
        };
        self.suites[pos].tests.push(test);

        tracing::debug!(suite = suite_name, test = test_name, "registered test");
    }

    /// Suites in first-registration order. Restartable: call again to iterate anew.
    pub fn suites(&self) -> impl Iterator<Item = &Suite> + '_ {
        self.suites.iter()
    }

    pub fn suite(&self, name: &str) -> Option<&Suite> {
        self.index.get(name).map(|&pos| &self.suites[pos])
    }

    /// Number of suites.
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Number of tests across all suites.
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(Suite::len).sum()
    }
}

pub use crate::checks::Relation;
pub use crate::config::{OutputFormat, RunConfig};
pub use crate::diagnostic::{CallSite, Diagnostic, LabelMode, Severity};
pub use crate::engine::{Engine, RunSummary};
pub use crate::error::MtestError;
pub use crate::events::{Event, NullReporter, Outcome, Reporter};
pub use crate::recorder::Recorder;
pub use crate::registry::{Registry, Suite, TestCase, TestFn};

pub mod checks;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod events;
pub mod recorder;
pub mod registry;

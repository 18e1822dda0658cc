//! Turning panics inside test bodies into fatal diagnostics.
//!
//! A process-wide hook is installed once. While a test body runs with capture
//! enabled on the current thread, the hook stores the panic location instead of
//! printing; otherwise it defers to whatever hook was installed before.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::diagnostic::{CallSite, LabelMode, Severity};
use crate::recorder::Recorder;
use crate::registry::TestCase;

static INSTALL: Once = Once::new();

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<(String, u32)>> = const { RefCell::new(None) };
}

fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info
                    .location()
                    .map(|loc| (loc.file().to_string(), loc.line()));
                LAST_PANIC.with(|slot| *slot.borrow_mut() = location);
            } else {
                previous(info);
            }
        }));
    });
}

/// Enables capture for its lifetime and restores the previous state on drop,
/// even if the body unwinds past it. Scopes nest when a test body drives an
/// engine of its own.
struct CaptureScope {
    was_capturing: bool,
}

impl CaptureScope {
    fn enter() -> Self {
        LAST_PANIC.with(|slot| slot.borrow_mut().take());
        CaptureScope {
            was_capturing: CAPTURING.with(|c| c.replace(true)),
        }
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        CAPTURING.with(|c| c.set(self.was_capturing));
    }
}

/// Runs `test`, converting a panic into a fatal diagnostic on `recorder`.
pub(super) fn invoke_catching(test: &TestCase, recorder: &mut Recorder) {
    install_hook();
    let result = {
        let _scope = CaptureScope::enter();
        panic::catch_unwind(AssertUnwindSafe(|| test.invoke(recorder)))
    };

    if let Err(payload) = result {
        let message = payload_message(payload.as_ref());
        let site = match LAST_PANIC.with(|slot| slot.borrow_mut().take()) {
            Some((file, line)) => CallSite::new(file, line, "<panic>", "test body panicked"),
            None => {
                let at = test.registered_at();
                CallSite::new(at.file(), at.line(), "<panic>", "test body panicked")
            }
        };
        tracing::warn!(test = test.name(), %message, "test body panicked");
        recorder.record_failure(
            message,
            Some("no panic".to_string()),
            site,
            Severity::Fatal,
            LabelMode::ExpectationLabeled,
        );
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

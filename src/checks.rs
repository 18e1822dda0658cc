//! Check primitives and the macros that capture their call sites.
//!
//! Every check evaluates a predicate and, only when it does not hold, calls
//! [`Recorder::record_failure`]. Operands are stringified with `Debug`.
//!
//! Two macro families exist:
//!
//! - `check_*!` record a [`Severity::Recoverable`] failure and keep going.
//! - `require_*!` record a [`Severity::Fatal`] failure and `return` from the
//!   enclosing test body, which must therefore return `()`.
//!
//! `check_expect!` / `require_expect!` are equality checks whose report labels
//! the values as `Expected` / `Got`.
//!
//! ```
//! use mtest::{check_eq, require_true, Engine};
//!
//! let mut engine = Engine::new();
//! engine.register("math", "addition", |t| {
//!     check_eq!(t, 2 + 2, 4, "math");
//!     require_true!(t, 4 > 3, "ordering");
//! });
//! ```

use std::fmt::Debug;

use crate::diagnostic::{CallSite, LabelMode, Severity};
use crate::recorder::Recorder;

/// The binary relation a check asserts between `actual` and `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Equality and inequality checks. Returns whether the check held.
///
/// Only `Relation::Eq` and `Relation::Ne` are meaningful here; operands that
/// are merely `PartialEq` cannot be ordered.
pub fn equality<A, B>(
    recorder: &mut Recorder,
    relation: Relation,
    actual: &A,
    expected: &B,
    site: CallSite,
    severity: Severity,
    mode: LabelMode,
) -> bool
where
    A: PartialEq<B> + Debug + ?Sized,
    B: Debug + ?Sized,
{
    debug_assert!(matches!(relation, Relation::Eq | Relation::Ne));
    let holds = match relation {
        Relation::Ne => actual != expected,
        _ => actual == expected,
    };
    settle(recorder, holds, actual, Some(expected), site, severity, mode)
}

/// Ordering checks (`<`, `>`, `<=`, `>=`, plus `==`/`!=`). Returns whether the
/// check held. Incomparable operands (e.g. NaN) fail every relation but `!=`.
pub fn ordering<A, B>(
    recorder: &mut Recorder,
    relation: Relation,
    actual: &A,
    expected: &B,
    site: CallSite,
    severity: Severity,
) -> bool
where
    A: PartialOrd<B> + Debug + ?Sized,
    B: Debug + ?Sized,
{
    let holds = match relation {
        Relation::Eq => actual == expected,
        Relation::Ne => actual != expected,
        Relation::Lt => actual < expected,
        Relation::Gt => actual > expected,
        Relation::Le => actual <= expected,
        Relation::Ge => actual >= expected,
    };
    settle(
        recorder,
        holds,
        actual,
        Some(expected),
        site,
        severity,
        LabelMode::Comparison,
    )
}

/// `check_true!` / `check_false!` and friends. The expected side is the unary
/// sentinel.
pub fn boolean(
    recorder: &mut Recorder,
    value: bool,
    wanted: bool,
    site: CallSite,
    severity: Severity,
) -> bool {
    settle::<bool, bool>(
        recorder,
        value == wanted,
        &value,
        None,
        site,
        severity,
        LabelMode::Comparison,
    )
}

fn settle<A, B>(
    recorder: &mut Recorder,
    holds: bool,
    actual: &A,
    expected: Option<&B>,
    site: CallSite,
    severity: Severity,
    mode: LabelMode,
) -> bool
where
    A: Debug + ?Sized,
    B: Debug + ?Sized,
{
    if !holds {
        recorder.record_failure(
            format!("{actual:?}"),
            expected.map(|e| format!("{e:?}")),
            site,
            severity,
            mode,
        );
    }
    holds
}

// ============================================================================
// CALL-SITE CAPTURING MACROS
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __mtest_equality {
    ($t:expr, $rel:ident, $a:expr, $b:expr, $msg:expr, $sev:ident, $mode:ident, $name:literal) => {
        $crate::checks::equality(
            &mut *$t,
            $crate::checks::Relation::$rel,
            &$a,
            &$b,
            $crate::CallSite::new(
                file!(),
                line!(),
                concat!(
                    $name,
                    "!(",
                    stringify!($a),
                    ", ",
                    stringify!($b),
                    ", ",
                    stringify!($msg),
                    ")"
                ),
                $msg,
            ),
            $crate::Severity::$sev,
            $crate::LabelMode::$mode,
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __mtest_ordering {
    ($t:expr, $rel:ident, $a:expr, $b:expr, $msg:expr, $sev:ident, $name:literal) => {
        $crate::checks::ordering(
            &mut *$t,
            $crate::checks::Relation::$rel,
            &$a,
            &$b,
            $crate::CallSite::new(
                file!(),
                line!(),
                concat!(
                    $name,
                    "!(",
                    stringify!($a),
                    ", ",
                    stringify!($b),
                    ", ",
                    stringify!($msg),
                    ")"
                ),
                $msg,
            ),
            $crate::Severity::$sev,
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __mtest_boolean {
    ($t:expr, $v:expr, $want:literal, $msg:expr, $sev:ident, $name:literal) => {
        $crate::checks::boolean(
            &mut *$t,
            $v,
            $want,
            $crate::CallSite::new(
                file!(),
                line!(),
                concat!($name, "!(", stringify!($v), ", ", stringify!($msg), ")"),
                $msg,
            ),
            $crate::Severity::$sev,
        )
    };
}

// --- Recoverable family ---

#[macro_export]
macro_rules! check_eq {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_equality!($t, Eq, $a, $b, $msg, Recoverable, Comparison, "check_eq")
    };
}

#[macro_export]
macro_rules! check_expect {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_equality!(
            $t,
            Eq,
            $a,
            $b,
            $msg,
            Recoverable,
            ExpectationLabeled,
            "check_expect"
        )
    };
}

#[macro_export]
macro_rules! check_ne {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_equality!($t, Ne, $a, $b, $msg, Recoverable, Comparison, "check_ne")
    };
}

#[macro_export]
macro_rules! check_lt {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_ordering!($t, Lt, $a, $b, $msg, Recoverable, "check_lt")
    };
}

#[macro_export]
macro_rules! check_gt {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_ordering!($t, Gt, $a, $b, $msg, Recoverable, "check_gt")
    };
}

#[macro_export]
macro_rules! check_le {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_ordering!($t, Le, $a, $b, $msg, Recoverable, "check_le")
    };
}

#[macro_export]
macro_rules! check_ge {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        $crate::__mtest_ordering!($t, Ge, $a, $b, $msg, Recoverable, "check_ge")
    };
}

#[macro_export]
macro_rules! check_true {
    ($t:expr, $v:expr, $msg:expr $(,)?) => {
        $crate::__mtest_boolean!($t, $v, true, $msg, Recoverable, "check_true")
    };
}

#[macro_export]
macro_rules! check_false {
    ($t:expr, $v:expr, $msg:expr $(,)?) => {
        $crate::__mtest_boolean!($t, $v, false, $msg, Recoverable, "check_false")
    };
}

// --- Fatal family: record, then leave the test body ---

#[macro_export]
macro_rules! require_eq {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_equality!($t, Eq, $a, $b, $msg, Fatal, Comparison, "require_eq") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_expect {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_equality!(
            $t,
            Eq,
            $a,
            $b,
            $msg,
            Fatal,
            ExpectationLabeled,
            "require_expect"
        ) {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_ne {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_equality!($t, Ne, $a, $b, $msg, Fatal, Comparison, "require_ne") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_lt {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_ordering!($t, Lt, $a, $b, $msg, Fatal, "require_lt") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_gt {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_ordering!($t, Gt, $a, $b, $msg, Fatal, "require_gt") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_le {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_ordering!($t, Le, $a, $b, $msg, Fatal, "require_le") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_ge {
    ($t:expr, $a:expr, $b:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_ordering!($t, Ge, $a, $b, $msg, Fatal, "require_ge") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_true {
    ($t:expr, $v:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_boolean!($t, $v, true, $msg, Fatal, "require_true") {
            return;
        }
    };
}

#[macro_export]
macro_rules! require_false {
    ($t:expr, $v:expr, $msg:expr $(,)?) => {
        if !$crate::__mtest_boolean!($t, $v, false, $msg, Fatal, "require_false") {
            return;
        }
    };
}

/// Registers a group of tests under one suite name.
///
/// ```
/// use mtest::{check_eq, suite, Engine};
///
/// let mut engine = Engine::new();
/// suite!(engine, Strings {
///     fn upper(t) {
///         check_eq!(t, "a".to_uppercase(), "A", "uppercase");
///     }
///     fn len(t) {
///         check_eq!(t, "abc".len(), 3, "length");
///     }
/// });
/// assert_eq!(engine.registry().test_count(), 2);
/// ```
#[macro_export]
macro_rules! suite {
    ($engine:ident, $suite:ident { $(fn $name:ident($t:ident) $body:block)* }) => {
        $(
            $engine.register(
                stringify!($suite),
                stringify!($name),
                |$t: &mut $crate::Recorder| $body,
            );
        )*
    };
}

//! Construction-time failures.
//!
//! These are mismatches between an operator token and the builder asked to
//! wire it: bugs in the front end or the runtime, not script errors.

use dollar_ir::OpKind;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OperatorTableError {
    #[error("operator '{op}' is {found:?}, builder expects {expected:?}")]
    KindMismatch {
        op: &'static str,
        expected: OpKind,
        found: OpKind,
    },
    #[error("operator '{op}' takes {expected} operands, got {found}")]
    ArityMismatch {
        op: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("operator '{op}' was requested {requested} but its builder is {built}")]
    ReactivityMismatch {
        op: &'static str,
        requested: &'static str,
        built: &'static str,
    },
    #[error("operator '{op}' has side effects and cannot be built as pure")]
    PurityMismatch { op: &'static str },
    #[error("when-assignment to '{target}' has no condition")]
    MissingCondition { target: String },
    #[error("'{op}' binds a variable; build it through an assignment")]
    AssignmentToken { op: &'static str },
}

pub(super) fn mode(reactive: bool) -> &'static str {
    if reactive {
        "reactive"
    } else {
        "immediate"
    }
}

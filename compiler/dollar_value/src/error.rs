//! Runtime errors.
//!
//! An [`EvalError`] is both the `Err` side of [`EvalResult`] and, wrapped
//! in `Value::Error`, the sticky error value that flows through arithmetic.
//! Build them with the factory functions below rather than by hand.

use std::fmt;

use dollar_diagnostic::{locate, short_source_message, source_message, ErrorKind};
use dollar_ir::SourceSegment;

use crate::Value;

/// Result of any operation that may fail at runtime.
pub type EvalResult = Result<Value, EvalError>;

#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    /// Source window of the operator that failed, when known.
    pub source: Option<SourceSegment>,
    /// Earlier failures this one wraps, innermost last.
    pub causes: Vec<EvalError>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            source: None,
            causes: Vec::new(),
        }
    }

    /// Attach a source window unless one is already set.
    #[must_use]
    pub fn with_source(mut self, source: &SourceSegment) -> Self {
        if self.source.is_none() && source.is_known() {
            self.source = Some(source.clone());
        }
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: EvalError) -> Self {
        self.causes.push(cause);
        self
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Wrap as a sticky error value.
    pub fn into_value(self) -> Value {
        Value::error(self)
    }

    /// Full report for the top-level runner: message, location and excerpt,
    /// followed by any causes.
    pub fn report(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.message);
        if let Some(source) = &self.source {
            if let Some(location) = locate(source) {
                out.push_str(&format!(" at {location}"));
            }
            out.push_str(&source_message(source));
        }
        for cause in &self.causes {
            out.push_str("\ncaused by ");
            out.push_str(&cause.to_string());
        }
        out
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(source) = &self.source {
            f.write_str(&short_source_message(source))?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

#[cold]
pub fn invalid_cast(from: &str, to: &str) -> EvalError {
    EvalError::new(ErrorKind::InvalidCast, format!("cannot cast {from} to {to}"))
}

#[cold]
pub fn invalid_map_operation(operation: &str, operand: &str) -> EvalError {
    EvalError::new(
        ErrorKind::InvalidMapOperation,
        format!("cannot apply '{operation}' to a map and {operand}"),
    )
}

#[cold]
pub fn type_mismatch(operation: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeMismatch,
        format!("'{operation}' is not defined for {left} and {right}"),
    )
}

#[cold]
pub fn declared_type_mismatch(name: &str, expected: &str, actual: &str) -> EvalError {
    EvalError::new(
        ErrorKind::TypeMismatch,
        format!("'{name}' is declared {expected} but was assigned {actual}"),
    )
}

#[cold]
pub fn variable_not_found(name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::VariableNotFound,
        format!("variable '{name}' not found"),
    )
}

#[cold]
pub fn reserved_name(name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::ReservedName,
        format!("'{name}' is a builtin and cannot be assigned"),
    )
}

#[cold]
pub fn immutable_variable(name: &str) -> EvalError {
    EvalError::new(
        ErrorKind::ImmutableVariable,
        format!("cannot re-assign const variable '{name}'"),
    )
}

/// `fingerprint` is the constraint's original source text.
#[cold]
pub fn constraint_violation(name: &str, fingerprint: &str) -> EvalError {
    EvalError::new(
        ErrorKind::ConstraintViolation,
        format!("value of '{name}' violates constraint ({fingerprint})"),
    )
}

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::new(
        ErrorKind::RecursionLimitExceeded,
        format!("maximum recursion depth of {limit} exceeded"),
    )
}

#[cold]
pub fn parse_error(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::ParseError, message)
}

#[cold]
pub fn exception(message: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::Exception, message)
}

#[cold]
pub fn scope_stack_corrupted(detail: impl Into<String>) -> EvalError {
    EvalError::new(ErrorKind::ScopeStackCorrupted, detail)
}

#[cfg(test)]
mod tests;

use std::fmt;

/// Kind of a runtime failure.
///
/// Format of the stable code: D#### where the first digit is the layer:
/// - D1xxx: value model
/// - D2xxx: scope chain
/// - D3xxx: reactive evaluation
/// - D4xxx: front end and host
/// - D9xxx: internal consistency
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    /// `$as` to a type the value cannot become
    InvalidCast,
    /// Map operation on an incompatible operand
    InvalidMapOperation,
    /// Operands of incompatible cases
    TypeMismatch,
    VariableNotFound,
    /// Assignment to a builtin identifier
    ReservedName,
    /// Re-binding a `const` variable
    ImmutableVariable,
    ConstraintViolation,
    RecursionLimitExceeded,
    ParseError,
    /// Uncategorized host failure
    Exception,
    /// Scope stack popped out of order
    ScopeStackCorrupted,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::InvalidCast,
        ErrorKind::InvalidMapOperation,
        ErrorKind::TypeMismatch,
        ErrorKind::VariableNotFound,
        ErrorKind::ReservedName,
        ErrorKind::ImmutableVariable,
        ErrorKind::ConstraintViolation,
        ErrorKind::RecursionLimitExceeded,
        ErrorKind::ParseError,
        ErrorKind::Exception,
        ErrorKind::ScopeStackCorrupted,
    ];

    /// Stable diagnostic code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidCast => "D1001",
            ErrorKind::InvalidMapOperation => "D1002",
            ErrorKind::TypeMismatch => "D1003",
            ErrorKind::VariableNotFound => "D2001",
            ErrorKind::ReservedName => "D2002",
            ErrorKind::ImmutableVariable => "D2003",
            ErrorKind::ConstraintViolation => "D2004",
            ErrorKind::RecursionLimitExceeded => "D3001",
            ErrorKind::ParseError => "D4001",
            ErrorKind::Exception => "D4002",
            ErrorKind::ScopeStackCorrupted => "D9001",
        }
    }

    /// Name as exposed to scripts (`INVALID_CAST`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidCast => "INVALID_CAST",
            ErrorKind::InvalidMapOperation => "INVALID_MAP_OPERATION",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::VariableNotFound => "VARIABLE_NOT_FOUND",
            ErrorKind::ReservedName => "RESERVED_NAME",
            ErrorKind::ImmutableVariable => "IMMUTABLE_VARIABLE",
            ErrorKind::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorKind::RecursionLimitExceeded => "RECURSION_LIMIT_EXCEEDED",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::Exception => "EXCEPTION",
            ErrorKind::ScopeStackCorrupted => "SCOPE_STACK_CORRUPTED",
        }
    }

    /// Fatal kinds bypass scope error handlers.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::RecursionLimitExceeded | ErrorKind::ScopeStackCorrupted
        )
    }

    pub fn from_name(name: &str) -> Option<ErrorKind> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;

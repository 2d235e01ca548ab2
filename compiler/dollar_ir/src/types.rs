//! Runtime type tags.
//!
//! Used for type annotations on declarations, cast targets and the
//! type-prediction table.

use std::fmt;
use std::str::FromStr;

/// The concrete case of a runtime value, as seen by scripts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Boolean,
    String,
    List,
    Map,
    Decimal,
    Integer,
    Void,
    Range,
    Error,
    /// Matches every value; only meaningful as an annotation.
    Any,
}

impl Type {
    /// All type tags, in declaration order.
    pub const ALL: [Type; 10] = [
        Type::Boolean,
        Type::String,
        Type::List,
        Type::Map,
        Type::Decimal,
        Type::Integer,
        Type::Void,
        Type::Range,
        Type::Error,
        Type::Any,
    ];

    /// Upper-case script name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            Type::Boolean => "BOOLEAN",
            Type::String => "STRING",
            Type::List => "LIST",
            Type::Map => "MAP",
            Type::Decimal => "DECIMAL",
            Type::Integer => "INTEGER",
            Type::Void => "VOID",
            Type::Range => "RANGE",
            Type::Error => "ERROR",
            Type::Any => "ANY",
        }
    }

    /// Whether `$as(self)` is defined at all.
    pub const fn is_cast_target(self) -> bool {
        matches!(
            self,
            Type::Boolean
                | Type::String
                | Type::List
                | Type::Map
                | Type::Decimal
                | Type::Integer
                | Type::Void
        )
    }

    /// Whether a value of type `actual` satisfies an annotation of `self`.
    pub fn accepts(self, actual: Type) -> bool {
        self == Type::Any || self == actual
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type annotation that names no known type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type '{}'", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for Type {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Type::ALL
            .into_iter()
            .find(|t| t.name() == upper)
            .ok_or_else(|| UnknownType(s.to_string()))
    }
}

#[cfg(test)]
mod tests;

//! Variable names.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A variable name as bound in a scope.
///
/// Cheap to clone; positional parameters (`1`, `2`, …) are ordinary keys
/// whose text is all digits.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarKey(Arc<str>);

impl VarKey {
    pub fn new(name: &str) -> Self {
        VarKey(Arc::from(name))
    }

    /// Key for the `n`th positional parameter (1-based).
    pub fn positional(n: usize) -> Self {
        VarKey(Arc::from(n.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_positional(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl From<&str> for VarKey {
    fn from(name: &str) -> Self {
        VarKey::new(name)
    }
}

impl From<String> for VarKey {
    fn from(name: String) -> Self {
        VarKey(Arc::from(name))
    }
}

impl Borrow<str> for VarKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

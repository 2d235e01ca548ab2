//! Value metadata side tables.
//!
//! Metadata rides along with a value (constraint fingerprints, named
//! parameter tags) but never takes part in equality.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Well-known string keys.
pub mod keys {
    /// Source text of the constraint a value was checked against.
    pub const CONSTRAINT_FINGERPRINT: &str = "constraint_fingerprint";
    /// Name of the parameter a value was passed as.
    pub const PARAMETER_NAME: &str = "parameter_name";
}

#[derive(Clone, Default)]
pub struct Metadata {
    strings: FxHashMap<String, String>,
    objects: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// Typed entry, one per type.
    pub fn get_typed<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.objects
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn set_typed<T: Any + Send + Sync>(&mut self, value: T) {
        self.objects.insert(TypeId::of::<T>(), Arc::new(value));
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.objects.is_empty()
    }

    /// Copy every entry of `other` over this table.
    pub fn extend(&mut self, other: &Metadata) {
        for (k, v) in &other.strings {
            self.strings.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.objects {
            self.objects.insert(*k, Arc::clone(v));
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("strings", &self.strings)
            .field("objects", &self.objects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;

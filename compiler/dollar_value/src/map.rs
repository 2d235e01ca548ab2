//! Ordered maps with unique string keys.
//!
//! Keys are the human-readable form of the key value; insertion order is
//! preserved and re-inserting an existing key keeps its position.

use indexmap::IndexMap;

use crate::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    entries: IndexMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entry at `index` in insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&str, &Value)> {
        self.entries
            .get_index(index)
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether any entry holds `value`.
    pub fn has_value(&self, value: &Value) -> bool {
        self.entries.values().any(|v| v == value)
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Insert at the front, moving an existing key there.
    pub fn insert_first(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.entries.shift_remove(&key);
        self.entries.shift_insert(0, key, value);
    }

    /// Remove a key, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Key used when a non-pair value is appended: `_<index>`.
    pub fn synthetic_key(&self) -> String {
        let mut index = self.len();
        loop {
            let key = format!("_{index}");
            if !self.contains_key(&key) {
                return key;
            }
            index += 1;
        }
    }

    /// Right-hand keys override left-hand ones.
    #[must_use]
    pub fn merged(&self, other: &ValueMap) -> ValueMap {
        let mut out = self.clone();
        for (k, v) in other.iter() {
            out.insert(k, v.clone());
        }
        out
    }

    #[must_use]
    pub fn without_keys<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> ValueMap {
        let mut out = self.clone();
        for k in keys {
            out.remove(k);
        }
        out
    }

    /// Entries in reverse insertion order.
    #[must_use]
    pub fn reversed(&self) -> ValueMap {
        ValueMap {
            entries: self
                .entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Value)> + ExactSizeIterator {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Rebuild with every value passed through `f`, keeping keys and order.
    pub fn try_map_values<E>(
        &self,
        mut f: impl FnMut(&Value) -> Result<Value, E>,
    ) -> Result<ValueMap, E> {
        let mut out = ValueMap::with_capacity(self.len());
        for (k, v) in self.iter() {
            out.insert(k, f(v)?);
        }
        Ok(out)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        ValueMap {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests;

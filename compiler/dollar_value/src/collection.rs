//! Container access: `$get`, `$size`, `$append`, `$prepend`, `$remove`,
//! `$set`, `$containsKey`, `$has`.

use crate::error::{invalid_map_operation, type_mismatch};
use crate::{EvalResult, Value, ValueMap};

fn usize_index(key: &Value) -> Option<usize> {
    key.as_int().and_then(|n| usize::try_from(n).ok())
}

impl Value {
    /// Element lookup. On maps an integer key selects the entry at that
    /// position (as a pair); any other key is matched by its string form.
    /// Missing entries are `Void`.
    pub fn get(&self, key: &Value) -> EvalResult {
        let v = self.fix(1)?;
        let key = key.fix_deep()?;
        if v.is_error() {
            return Ok(v);
        }
        Ok(match v.untagged() {
            Value::Map(m) => match key.untagged() {
                Value::Int(_) => usize_index(&key)
                    .and_then(|i| m.get_index(i))
                    .map_or(Value::Void, |(k, v)| Value::pair(k, v.clone())),
                other => m.get(&other.to_string()).cloned().unwrap_or(Value::Void),
            },
            Value::List(items) => usize_index(&key)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Void),
            Value::Str(s) => usize_index(&key)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Void, |c| Value::string(c.to_string())),
            Value::Range(r) => key
                .as_int()
                .and_then(|i| u64::try_from(i).ok())
                .and_then(|i| r.get(i))
                .map_or(Value::Void, Value::Int),
            other => return Err(type_mismatch("get", other.type_name(), key.type_name())),
        })
    }

    pub fn size(&self) -> EvalResult {
        let v = self.fix(1)?;
        let n = match v.untagged() {
            Value::Map(m) => m.len(),
            Value::List(items) => items.len(),
            Value::Str(s) => s.chars().count(),
            Value::Range(r) => usize::try_from(r.len()).unwrap_or(usize::MAX),
            Value::Void => 0,
            Value::Error(_) => return Ok(v),
            _ => 1,
        };
        Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
    }

    /// Add at the end. Pairs appended to a map become entries (moving an
    /// existing key to the end); other values get a `_<index>` key.
    pub fn append(&self, item: &Value) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        if v.is_error() {
            return Ok(v);
        }
        Ok(match v {
            Value::Map(m) => {
                let mut entries = m.into_inner();
                match item.untagged() {
                    Value::Map(pair) if pair.len() == 1 => {
                        for (k, val) in pair.iter() {
                            entries.remove(k);
                            entries.insert(k, val.clone());
                        }
                    }
                    other => {
                        let key = entries.synthetic_key();
                        entries.insert(key, other.clone());
                    }
                }
                Value::map(entries)
            }
            Value::List(items) => {
                let mut items = items.into_inner();
                items.push(item.clone());
                Value::list(items)
            }
            Value::Str(s) => Value::string(format!("{}{item}", s.as_str())),
            Value::Void => Value::list(vec![item.clone()]),
            other => Value::list(vec![other, item.clone()]),
        })
    }

    /// Add at the front; see [`append`](Value::append).
    pub fn prepend(&self, item: &Value) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        if v.is_error() {
            return Ok(v);
        }
        Ok(match v {
            Value::Map(m) => {
                let mut entries = m.into_inner();
                match item.untagged() {
                    Value::Map(pair) if pair.len() == 1 => {
                        for (k, val) in pair.iter() {
                            entries.insert_first(k, val.clone());
                        }
                    }
                    other => {
                        let key = entries.synthetic_key();
                        entries.insert_first(key, other.clone());
                    }
                }
                Value::map(entries)
            }
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len() + 1);
                out.push(item.clone());
                out.extend(items.iter().cloned());
                Value::list(out)
            }
            Value::Str(s) => Value::string(format!("{item}{}", s.as_str())),
            Value::Void => Value::list(vec![item.clone()]),
            other => Value::list(vec![item.clone(), other]),
        })
    }

    /// Remove a key from a map or matching elements from a list.
    pub fn remove(&self, key: &Value) -> EvalResult {
        self.minus(key)
    }

    /// Bind `key` to `value` in a map, or replace a list element by index.
    pub fn set(&self, key: &Value, value: Value) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        let key = key.fix_deep()?;
        if v.is_error() {
            return Ok(v);
        }
        match v {
            Value::Map(m) => {
                let mut entries = m.into_inner();
                entries.insert(key.to_string(), value);
                Ok(Value::map(entries))
            }
            Value::Void => Ok(Value::pair(key.to_string(), value)),
            Value::List(items) => {
                let mut items = items.into_inner();
                match usize_index(&key) {
                    Some(i) if i < items.len() => items[i] = value,
                    Some(i) if i == items.len() => items.push(value),
                    _ => return Err(type_mismatch("set", "LIST", key.type_name())),
                }
                Ok(Value::list(items))
            }
            other => Err(invalid_map_operation("set", other.type_name())),
        }
    }

    pub fn contains_key(&self, key: &Value) -> EvalResult {
        let v = self.fix(1)?;
        let key = key.fix_deep()?;
        Ok(Value::Bool(match v.untagged() {
            Value::Map(m) => m.contains_key(&key.to_string()),
            Value::List(items) => usize_index(&key).is_some_and(|i| i < items.len()),
            _ => false,
        }))
    }

    /// Whether the value holds `item`: map values, list elements, substrings,
    /// range members.
    pub fn has(&self, item: &Value) -> EvalResult {
        let v = self.fix(1)?;
        let item = item.fix_deep()?;
        Ok(Value::Bool(match v.untagged() {
            Value::Map(m) => m.has_value(&item),
            Value::List(items) => items.contains(&item),
            Value::Str(s) => s.contains(item.to_string().as_str()),
            Value::Range(r) => item.as_int().is_some_and(|n| r.contains(n)),
            other => *other == item,
        }))
    }

    /// Build a map from key/value pairs.
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::map(pairs.into_iter().collect::<ValueMap>())
    }
}

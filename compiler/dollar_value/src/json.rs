//! JSON serialization.
//!
//! Maps keep their entry order. Non-finite decimals, nodes and resources
//! serialize as strings; errors as `{"error": KIND, "message": ...}`.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::parse_error;
use crate::value::format_decimal;
use crate::{EvalResult, Value, ValueMap};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Decimal(d) if d.is_finite() => serializer.serialize_f64(*d),
            Value::Decimal(d) => serializer.serialize_str(&format_decimal(*d)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Void => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Range(r) => {
                let mut seq = serializer.serialize_seq(None)?;
                for n in r.iter() {
                    seq.serialize_element(&n)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Error(err) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", err.kind.as_str())?;
                map.serialize_entry("message", &err.message)?;
                map.end()
            }
            Value::Node(_) | Value::Resource(_) => serializer.serialize_str(&self.to_string()),
            Value::Tagged(tagged) => tagged.value.serialize(serializer),
        }
    }
}

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Void,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Decimal(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::string(s.as_str()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(entries) => Value::map(
                entries
                    .iter()
                    .map(|(k, v)| (k.as_str(), Value::from_json(v)))
                    .collect::<ValueMap>(),
            ),
        }
    }

    /// Parse JSON text; malformed input is a `PARSE_ERROR`.
    pub fn parse_json(text: &str) -> EvalResult {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| parse_error(format!("invalid JSON: {e}")))?;
        Ok(Value::from_json(&json))
    }
}

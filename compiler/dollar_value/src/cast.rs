//! `$as(Type)` coercion.

use dollar_ir::Type;

use crate::error::invalid_cast;
use crate::{EvalResult, Value, ValueMap};

impl Value {
    /// Convert to `target`. Defined for BOOLEAN, STRING, LIST, MAP, DECIMAL,
    /// INTEGER and VOID; any other target fails with `INVALID_CAST`.
    pub fn cast(&self, target: Type) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        if v.is_error() {
            return Ok(v);
        }
        let from = v.type_name();
        let fail = move || invalid_cast(from, target.name());
        Ok(match target {
            Type::Boolean => Value::Bool(match &v {
                Value::Str(s) if s.eq_ignore_ascii_case("false") => false,
                other => other.is_true(),
            }),
            Type::String => Value::string(v.to_string()),
            Type::List => match v {
                Value::List(_) => v,
                Value::Void => Value::list(Vec::new()),
                Value::Map(m) => Value::list(
                    m.iter()
                        .map(|(k, v)| Value::pair(k, v.clone()))
                        .collect(),
                ),
                Value::Range(r) => Value::list(r.iter().map(Value::Int).collect()),
                other => Value::list(vec![other]),
            },
            Type::Map => match v {
                Value::Map(_) => v,
                Value::Void => Value::empty_map(),
                Value::List(items) => Value::map(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| (format!("_{i}"), item.clone()))
                        .collect::<ValueMap>(),
                ),
                other => Value::pair("value", other),
            },
            Type::Decimal => match &v {
                Value::Void => Value::Decimal(0.0),
                Value::Bool(b) => Value::Decimal(if *b { 1.0 } else { 0.0 }),
                Value::Str(s) => Value::Decimal(s.trim().parse().map_err(|_| fail())?),
                other => Value::Decimal(other.as_f64().ok_or_else(fail)?),
            },
            Type::Integer => match &v {
                Value::Void => Value::Int(0),
                Value::Bool(b) => Value::Int(i64::from(*b)),
                Value::Int(n) => Value::Int(*n),
                Value::Decimal(d) => Value::Int(truncate(*d).ok_or_else(fail)?),
                Value::Str(s) => {
                    let s = s.trim();
                    match s.parse::<i64>() {
                        Ok(n) => Value::Int(n),
                        Err(_) => {
                            let d: f64 = s.parse().map_err(|_| fail())?;
                            Value::Int(truncate(d).ok_or_else(fail)?)
                        }
                    }
                }
                _ => return Err(fail()),
            },
            Type::Void => Value::Void,
            Type::Range | Type::Error | Type::Any => return Err(fail()),
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate(d: f64) -> Option<i64> {
    if d.is_finite() && d.abs() < i64::MAX as f64 {
        Some(d.trunc() as i64)
    } else {
        None
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

//! Arithmetic.
//!
//! Every binary operator resolves its left operand to a concrete value,
//! deep-forces its right operand, then dispatches on both cases. An error
//! operand is returned untouched.
//!
//! Numbers: integer with integer stays integer (falling back to decimal on
//! `i64` overflow); a decimal on either side promotes to decimal. Division
//! and modulus by zero or infinity give an infinity carrying the dividend's
//! sign.

use crate::error::{exception, invalid_map_operation, type_mismatch};
use crate::{EvalError, EvalResult, Value};

/// Resolve operands: left to a concrete value, right all the way down.
fn operands(lhs: &Value, rhs: &Value) -> Result<(Value, Value), EvalError> {
    let l = lhs.fix(1)?.into_untagged();
    let r = rhs.fix_deep()?.into_untagged();
    Ok((l, r))
}

fn sticky(l: &Value, r: &Value) -> Option<Value> {
    if l.is_error() {
        Some(l.clone())
    } else if r.is_error() {
        Some(r.clone())
    } else {
        None
    }
}

#[allow(clippy::cast_precision_loss)]
fn decimal(n: i64) -> f64 {
    n as f64
}

/// Infinity with the sign of `dividend`.
fn signed_infinity(dividend: f64) -> Value {
    Value::infinity(!dividend.is_sign_negative())
}

/// Longest string or list a repetition may produce.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

/// Clamp a repetition count: negative repeats nothing, and a result longer
/// than [`MAX_REPEAT_LEN`] is an exception rather than an allocation.
fn repeat_count(operation: &str, len: usize, n: i64, kind: &str) -> Result<usize, EvalError> {
    let times = usize::try_from(n).unwrap_or(0);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(times),
        _ => Err(exception(format!(
            "{kind} {operation} {n} exceeds {MAX_REPEAT_LEN} elements"
        ))),
    }
}

fn range_list(v: Value) -> Value {
    match v {
        Value::Range(r) => Value::list(r.iter().map(Value::Int).collect()),
        other => other,
    }
}

impl Value {
    pub fn plus(&self, rhs: &Value) -> EvalResult {
        let (l, r) = operands(self, rhs)?;
        if let Some(err) = sticky(&l, &r) {
            return Ok(err);
        }
        let (l, r) = (range_list(l), range_list(r));
        Ok(match (l, r) {
            (Value::Map(a), Value::Map(b)) => Value::map(a.merged(&b)),
            (map @ Value::Map(_), Value::Str(s)) => Value::string(format!("{map}{}", s.as_str())),
            (Value::Map(a), other) => {
                let mut entries = a.into_inner();
                let key = entries.synthetic_key();
                entries.insert(key, other);
                Value::map(entries)
            }
            (Value::Void, other) | (other, Value::Void) => other,
            (Value::List(a), Value::List(b)) => {
                Value::list(a.iter().chain(b.iter()).cloned().collect())
            }
            (Value::List(a), other) => {
                let mut items = a.into_inner();
                items.push(other);
                Value::list(items)
            }
            (Value::Str(a), other) => Value::string(format!("{}{other}", a.as_str())),
            (other, Value::Str(b)) => Value::string(format!("{other}{}", b.as_str())),
            (other, Value::List(b)) => {
                let mut items = Vec::with_capacity(b.len() + 1);
                items.push(other);
                items.extend(b.iter().cloned());
                Value::list(items)
            }
            (Value::Int(a), Value::Int(b)) => match a.checked_add(b) {
                Some(n) => Value::Int(n),
                None => Value::Decimal(decimal(a) + decimal(b)),
            },
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => Value::Decimal(a + b),
                _ => return Err(type_mismatch("+", l.type_name(), r.type_name())),
            },
        })
    }

    pub fn minus(&self, rhs: &Value) -> EvalResult {
        let (l, r) = operands(self, rhs)?;
        if let Some(err) = sticky(&l, &r) {
            return Ok(err);
        }
        let l = range_list(l);
        Ok(match (l, r) {
            (Value::Void, _) => Value::Void,
            (other, Value::Void) => other,
            (Value::Map(a), Value::Map(b)) => Value::map(a.without_keys(b.keys())),
            (Value::Map(a), key) => {
                let key = key.to_string();
                Value::map(a.without_keys([key.as_str()]))
            }
            (Value::List(a), Value::List(b)) => {
                Value::list(a.iter().filter(|v| !b.contains(*v)).cloned().collect())
            }
            (Value::List(a), other) => {
                Value::list(a.iter().filter(|v| **v != other).cloned().collect())
            }
            (Value::Str(a), other) => Value::string(a.replace(&other.to_string(), "")),
            (Value::Int(a), Value::Int(b)) => match a.checked_sub(b) {
                Some(n) => Value::Int(n),
                None => Value::Decimal(decimal(a) - decimal(b)),
            },
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => Value::Decimal(a - b),
                _ => return Err(type_mismatch("-", l.type_name(), r.type_name())),
            },
        })
    }

    pub fn multiply(&self, rhs: &Value) -> EvalResult {
        let (l, r) = operands(self, rhs)?;
        if let Some(err) = sticky(&l, &r) {
            return Ok(err);
        }
        Ok(match (l, r) {
            (Value::Void, _) | (_, Value::Void) => Value::Void,
            (Value::Map(_), other) => {
                return Err(invalid_map_operation("*", other.type_name()));
            }
            (Value::Str(s), Value::Int(n)) => {
                let times = repeat_count("*", s.len(), n, "string")?;
                Value::string(s.repeat(times))
            }
            (Value::List(items), Value::Int(n)) => {
                let times = repeat_count("*", items.len(), n, "list")?;
                let mut out = Vec::with_capacity(items.len() * times);
                for _ in 0..times {
                    out.extend(items.iter().cloned());
                }
                Value::list(out)
            }
            (Value::Int(a), Value::Int(b)) => match a.checked_mul(b) {
                Some(n) => Value::Int(n),
                None => multiply_decimal(decimal(a), decimal(b)),
            },
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => multiply_decimal(a, b),
                _ => return Err(type_mismatch("*", l.type_name(), r.type_name())),
            },
        })
    }

    pub fn divide(&self, rhs: &Value) -> EvalResult {
        let (l, r) = operands(self, rhs)?;
        if let Some(err) = sticky(&l, &r) {
            return Ok(err);
        }
        Ok(match (l, r) {
            (Value::Void, _) | (_, Value::Void) => Value::Void,
            (Value::Map(_), other) => {
                return Err(invalid_map_operation("/", other.type_name()));
            }
            (Value::Int(a), Value::Int(b)) => {
                if b == 0 {
                    signed_infinity(decimal(a))
                } else {
                    a.checked_div(b)
                        .map_or_else(|| Value::Decimal(decimal(a) / decimal(b)), Value::Int)
                }
            }
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) if b == 0.0 || b.is_infinite() => signed_infinity(a),
                (Some(a), Some(b)) => Value::Decimal(a / b),
                _ => return Err(type_mismatch("/", l.type_name(), r.type_name())),
            },
        })
    }

    pub fn modulus(&self, rhs: &Value) -> EvalResult {
        let (l, r) = operands(self, rhs)?;
        if let Some(err) = sticky(&l, &r) {
            return Ok(err);
        }
        Ok(match (l, r) {
            (Value::Void, _) | (_, Value::Void) => Value::Void,
            (Value::Map(_), other) => {
                return Err(invalid_map_operation("%", other.type_name()));
            }
            (Value::Int(a), Value::Int(b)) => {
                if b == 0 {
                    signed_infinity(decimal(a))
                } else {
                    Value::Int(a.checked_rem(b).unwrap_or(0))
                }
            }
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) if b == 0.0 || b.is_infinite() => signed_infinity(a),
                (Some(a), Some(b)) => Value::Decimal(a % b),
                _ => return Err(type_mismatch("%", l.type_name(), r.type_name())),
            },
        })
    }

    /// Unary negation. On maps and lists this reverses entry order; on
    /// strings it reverses characters; on booleans it is logical not.
    pub fn negate(&self) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        Ok(match v {
            Value::Int(n) => n
                .checked_neg()
                .map_or_else(|| Value::Decimal(-decimal(n)), Value::Int),
            Value::Decimal(d) => Value::Decimal(-d),
            Value::Bool(b) => Value::Bool(!b),
            Value::Str(s) => Value::string(s.chars().rev().collect::<String>()),
            Value::List(items) => Value::list(items.iter().rev().cloned().collect()),
            Value::Map(entries) => Value::map(entries.reversed()),
            Value::Range(r) => Value::Range(r.reversed()),
            other => other,
        })
    }

    pub fn abs(&self) -> EvalResult {
        let v = self.fix(1)?.into_untagged();
        Ok(match v {
            Value::Int(n) => n
                .checked_abs()
                .map_or_else(|| Value::Decimal(decimal(n).abs()), Value::Int),
            Value::Decimal(d) => Value::Decimal(d.abs()),
            other => other,
        })
    }
}

/// Overflow saturates to an infinity signed by the product of the operand
/// signs; a zero factor always gives zero.
fn multiply_decimal(a: f64, b: f64) -> Value {
    if a == 0.0 || b == 0.0 {
        return Value::Decimal(0.0);
    }
    let product = a * b;
    if product.is_infinite() {
        Value::infinity(a.signum() * b.signum() > 0.0)
    } else {
        Value::Decimal(product)
    }
}

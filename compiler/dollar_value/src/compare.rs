//! Equality, ordering and truthiness.

use std::cmp::Ordering;

use crate::{EvalResult, Value};

impl Value {
    /// Equality after deep-forcing both sides.
    pub fn equals(&self, other: &Value) -> Result<bool, crate::EvalError> {
        Ok(self.fix_deep()? == other.fix_deep()?)
    }

    /// Ordering of two concrete values: numbers numerically, strings
    /// lexically, collections by size, anything else by string form.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self.untagged(), other.untagged()) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (a, b) if a.is_number() && b.is_number() => a.as_f64()?.partial_cmp(&b.as_f64()?),
            (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Void, Value::Void) => Some(Ordering::Equal),
            (Value::Void, _) | (_, Value::Void) => None,
            (Value::List(a), Value::List(b)) => Some(a.len().cmp(&b.len())),
            (Value::Map(a), Value::Map(b)) => Some(a.len().cmp(&b.len())),
            (Value::Range(a), Value::Range(b)) => Some(a.len().cmp(&b.len())),
            (a, b) => Some(a.to_string().cmp(&b.to_string())),
        }
    }

    fn compare_with(&self, rhs: &Value, test: fn(Ordering) -> bool) -> EvalResult {
        let l = self.fix_deep()?;
        let r = rhs.fix_deep()?;
        if l.is_error() {
            return Ok(l);
        }
        if r.is_error() {
            return Ok(r);
        }
        Ok(Value::Bool(l.compare(&r).is_some_and(test)))
    }

    pub fn less_than(&self, rhs: &Value) -> EvalResult {
        self.compare_with(rhs, Ordering::is_lt)
    }

    pub fn greater_than(&self, rhs: &Value) -> EvalResult {
        self.compare_with(rhs, Ordering::is_gt)
    }

    pub fn less_equal(&self, rhs: &Value) -> EvalResult {
        self.compare_with(rhs, Ordering::is_le)
    }

    pub fn greater_equal(&self, rhs: &Value) -> EvalResult {
        self.compare_with(rhs, Ordering::is_ge)
    }

    /// `==` as a value; an error operand propagates.
    pub fn equal_to(&self, rhs: &Value) -> EvalResult {
        let l = self.fix_deep()?;
        let r = rhs.fix_deep()?;
        if l.is_error() && !r.is_error() {
            return Ok(l);
        }
        if r.is_error() && !l.is_error() {
            return Ok(r);
        }
        Ok(Value::Bool(l == r))
    }

    pub fn not_equal_to(&self, rhs: &Value) -> EvalResult {
        match self.equal_to(rhs)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Ok(other),
        }
    }

    /// Numbers are true when their truncated value is non-zero, collections
    /// and strings when non-empty. `Void`, errors, nodes and resources are
    /// never true; force nodes before asking.
    pub fn is_true(&self) -> bool {
        match self.untagged() {
            Value::Int(n) => *n != 0,
            Value::Decimal(d) => d.trunc() != 0.0 && !d.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Range(_) => true,
            Value::Void
            | Value::Error(_)
            | Value::Node(_)
            | Value::Resource(_)
            | Value::Tagged(_) => false,
        }
    }

    /// Counterpart of [`is_true`](Value::is_true); `Void` and errors are
    /// neither true nor false.
    pub fn is_false(&self) -> bool {
        match self.untagged() {
            Value::Int(n) => *n == 0,
            Value::Decimal(d) => d.trunc() == 0.0,
            Value::Bool(b) => !*b,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::Range(_)
            | Value::Void
            | Value::Error(_)
            | Value::Node(_)
            | Value::Resource(_)
            | Value::Tagged(_) => false,
        }
    }

    /// Force to a concrete value and test it.
    pub fn truthy(&self) -> Result<bool, crate::EvalError> {
        Ok(self.fix(1)?.is_true())
    }

    pub fn and(&self, rhs: &Value) -> EvalResult {
        let l = self.fix(1)?;
        if l.is_error() {
            return Ok(l);
        }
        if !l.is_true() {
            return Ok(Value::Bool(false));
        }
        let r = rhs.fix(1)?;
        if r.is_error() {
            return Ok(r);
        }
        Ok(Value::Bool(r.is_true()))
    }

    pub fn or(&self, rhs: &Value) -> EvalResult {
        let l = self.fix(1)?;
        if l.is_error() {
            return Ok(l);
        }
        if l.is_true() {
            return Ok(Value::Bool(true));
        }
        let r = rhs.fix(1)?;
        if r.is_error() {
            return Ok(r);
        }
        Ok(Value::Bool(r.is_true()))
    }

    /// Logical not; `Void` stays `Void`.
    pub fn not(&self) -> EvalResult {
        let v = self.fix(1)?;
        Ok(match v.untagged() {
            Value::Void | Value::Error(_) => v,
            other => Value::Bool(!other.is_true()),
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

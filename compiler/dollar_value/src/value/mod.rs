//! Runtime values.
//!
//! Heap payloads go through [`Heap`], whose constructor is private to this
//! crate; build values with the factory methods (`Value::string`,
//! `Value::map`, ...).
//!
//! A `Value` is either concrete or a [`Node`](Value::Node) standing for a
//! computation that has not run yet. Every operation in this crate first
//! forces the operands it needs, so results never hold a dangling node
//! unless one was put there on purpose.

mod range;

use std::fmt;
use std::sync::Arc;

use dollar_ir::Type;

use crate::{EvalError, Heap, Metadata, NodeRef, ResourceHandle, ValueMap};

pub use range::RangeValue;

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Decimal(f64),
    Bool(bool),
    /// Absence of a value; neither true nor false.
    Void,
    Str(Heap<String>),
    List(Heap<Vec<Value>>),
    /// A map of exactly one entry doubles as a pair.
    Map(Heap<ValueMap>),
    Range(RangeValue),
    /// Sticky error: propagates untouched through arithmetic.
    Error(Heap<EvalError>),
    /// Unresolved computation.
    Node(NodeRef),
    Resource(ResourceHandle),
    /// A value with metadata attached. Transparent to every operation.
    Tagged(Heap<Tagged>),
}

#[derive(Clone, Debug)]
pub struct Tagged {
    pub value: Value,
    pub meta: Metadata,
}

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    #[inline]
    pub fn decimal(d: f64) -> Self {
        Value::Decimal(d)
    }

    /// Signed infinity.
    pub fn infinity(positive: bool) -> Self {
        if positive {
            Value::Decimal(f64::INFINITY)
        } else {
            Value::Decimal(f64::NEG_INFINITY)
        }
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    pub fn map(entries: ValueMap) -> Self {
        Value::Map(Heap::new(entries))
    }

    pub fn empty_map() -> Self {
        Value::map(ValueMap::new())
    }

    /// A one-entry map.
    pub fn pair(key: impl Into<String>, value: Value) -> Self {
        let mut entries = ValueMap::with_capacity(1);
        entries.insert(key, value);
        Value::map(entries)
    }

    /// Inclusive range.
    pub fn range(start: i64, end: i64) -> Self {
        Value::Range(RangeValue::new(start, end))
    }

    pub fn error(err: EvalError) -> Self {
        Value::Error(Heap::new(err))
    }

    pub fn node(node: NodeRef) -> Self {
        Value::Node(node)
    }

    pub fn resource(handle: ResourceHandle) -> Self {
        Value::Resource(handle)
    }

    /// Attach metadata; tagging a tagged value merges the tables.
    #[must_use]
    pub fn with_metadata(self, meta: Metadata) -> Self {
        match self {
            Value::Tagged(tagged) => {
                let mut tagged = tagged.into_inner();
                tagged.meta.extend(&meta);
                Value::Tagged(Heap::new(tagged))
            }
            value => Value::Tagged(Heap::new(Tagged { value, meta })),
        }
    }
}

impl Value {
    /// The value with any metadata wrapper removed.
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Tagged(tagged) => tagged.value.untagged(),
            other => other,
        }
    }

    #[must_use]
    pub fn into_untagged(self) -> Value {
        match self {
            Value::Tagged(tagged) => tagged.into_inner().value.into_untagged(),
            other => other,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Value::Tagged(tagged) => Some(&tagged.meta),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.untagged() {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Any number as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.untagged() {
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => Some(*n as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.untagged() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.untagged() {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self.untagged() {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self.untagged() {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self.untagged() {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceHandle> {
        match self.untagged() {
            Value::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&EvalError> {
        match self.untagged() {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self.untagged(), Value::Void)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.untagged(), Value::Error(_))
    }

    #[inline]
    pub fn is_node(&self) -> bool {
        matches!(self.untagged(), Value::Node(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self.untagged(), Value::Int(_) | Value::Decimal(_))
    }

    pub fn is_pair(&self) -> bool {
        self.as_map().is_some_and(|m| m.len() == 1)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.untagged(), Value::Decimal(d) if d.is_infinite())
    }

    pub fn is_zero(&self) -> bool {
        self.as_f64().is_some_and(|d| d == 0.0)
    }

    /// Whether a node remains anywhere inside this value.
    pub fn contains_node(&self) -> bool {
        match self.untagged() {
            Value::Node(_) => true,
            Value::List(items) => items.iter().any(Value::contains_node),
            Value::Map(m) => m.values().any(Value::contains_node),
            _ => false,
        }
    }

    /// Concrete type, or `None` for nodes and resources.
    pub fn type_of(&self) -> Option<Type> {
        Some(match self.untagged() {
            Value::Int(_) => Type::Integer,
            Value::Decimal(_) => Type::Decimal,
            Value::Bool(_) => Type::Boolean,
            Value::Void => Type::Void,
            Value::Str(_) => Type::String,
            Value::List(_) => Type::List,
            Value::Map(_) => Type::Map,
            Value::Range(_) => Type::Range,
            Value::Error(_) => Type::Error,
            Value::Node(_) | Value::Resource(_) | Value::Tagged(_) => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self.untagged() {
            Value::Node(_) => "NODE",
            Value::Resource(_) => "RESOURCE",
            other => other.type_of().map_or("ANY", Type::name),
        }
    }
}

/// Human-readable rendering of a decimal: always carries a fraction or an
/// infinity marker.
pub(crate) fn format_decimal(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d.is_infinite() {
        if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if d.fract() == 0.0 && d.abs() < 1e15 {
        format!("{d:.1}")
    } else {
        format!("{d}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Decimal(d) => f.write_str(&format_decimal(*d)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Void => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::List(_) | Value::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Value::Range(r) => write!(f, "{r}"),
            Value::Error(e) => write!(f, "{e}"),
            Value::Node(n) => write!(f, "<{}{}>", n.operation(), n.id()),
            Value::Resource(r) => write!(f, "<resource {}>", r.name()),
            Value::Tagged(t) => fmt::Display::fmt(&t.value, f),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality on concrete values. Metadata is ignored, numbers
    /// compare numerically across integer/decimal, nodes and resources by
    /// identity, and otherwise mismatched cases by their string forms.
    fn eq(&self, other: &Self) -> bool {
        match (self.untagged(), other.untagged()) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b || (a.is_nan() && b.is_nan()),
            (a @ (Value::Int(_) | Value::Decimal(_)), b @ (Value::Int(_) | Value::Decimal(_))) => {
                a.as_f64() == b.as_f64()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a.kind == b.kind && a.message == b.message,
            (Value::Node(a), Value::Node(b)) => Arc::ptr_eq(a, b) || a.id() == b.id(),
            (Value::Resource(a), Value::Resource(b)) => a.ptr_eq(b),
            (Value::Node(_) | Value::Resource(_) | Value::Void, _)
            | (_, Value::Node(_) | Value::Resource(_) | Value::Void) => false,
            (a, b) => a.to_string() == b.to_string(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<ValueMap> for Value {
    fn from(entries: ValueMap) -> Self {
        Value::map(entries)
    }
}

impl From<EvalError> for Value {
    fn from(err: EvalError) -> Self {
        Value::error(err)
    }
}

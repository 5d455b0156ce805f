//! Native value types for registry entries.
//!
//! This module provides [`Value`], the set of native types a registry property
//! can carry, and [`ValueMap`], the nested-map form produced by the export
//! engine and consumed by the merge engine and the accessor facade.
//!
//! Values are persisted as strings; the [`codec`](crate::codec) module owns
//! the conversion in both directions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// A nested map of registry values, ordered by key ascending.
///
/// `BTreeMap` gives the sibling ordering the tree guarantees (key ascending)
/// without a separate sort step.
pub type ValueMap = BTreeMap<String, Value>;

/// A two-endpoint integer interval.
///
/// `exclusive` mirrors the `...` form of the persisted representation, which
/// excludes the end point; the `..` form includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub end: i64,
    pub exclusive: bool,
}

impl RangeValue {
    pub fn inclusive(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclusive: false,
        }
    }

    pub fn exclusive(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclusive: true,
        }
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dots = if self.exclusive { "..." } else { ".." };
        write!(f, "{}{}{}", self.start, dots, self.end)
    }
}

/// A value held by a registry property, or a nested map of them.
///
/// Scalar variants cover every type the built-in codec set round-trips;
/// `Map` appears only in exported/imported nested structures, never as a
/// persisted property value (nested maps become folders).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Symbol(String),
    Range(RangeValue),
    Array(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Returns a human-readable name for this value type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "Text",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Symbol(_) => "Symbol",
            Value::Range(_) => "Range",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
        }
    }

    /// Boolean coercion used by the accessor facade's `foo?` probe.
    ///
    /// Only `Bool(false)` is falsy; every other present value is truthy.
    /// Absence is handled by the caller.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }
}

impl fmt::Display for Value {
    /// The literal string form, used as the universal codec fallback.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S UTC")),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Range(r) => write!(f, "{r}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<RangeValue> for Value {
    fn from(r: RangeValue) -> Self {
        Value::Range(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

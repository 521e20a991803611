//! Loosely-typed values
//!
//!     Render input is a tree of [`Value`]s. Containers are reference counted so that
//!     adapting a value into a provider, or binding it into a loop scope, never copies the
//!     underlying data. Values are created per render and are not shared across threads;
//!     only functions (which also live in the shared default map) are `Send + Sync`.

use super::provider::{ProviderRef, ValueProvider};
use crate::functions::Function;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Insertion-ordered string-keyed map
pub type ValueMap = IndexMap<String, Value>;

/// A loosely-typed data value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Rc<Vec<Value>>),
    Map(Rc<ValueMap>),
    /// Raw key/value pairs, iterated in order
    Entries(Rc<Vec<(Value, Value)>>),
    /// A single key/value pair, as produced while iterating a map
    Entry(Rc<(Value, Value)>),
    Date(DateTime<FixedOffset>),
    /// A host object exposing named properties
    Object(Rc<dyn Reflect>),
    /// A host collection addressable by numeric index
    Indexed(Rc<dyn Indexable>),
    Function(Arc<dyn Function>),
    /// A host-supplied provider, used as-is wherever a scope is needed
    Provider(ProviderRef),
}

/// Property access for host objects.
///
/// Record-like objects expose their fields in declaration order; other objects expose
/// named accessors, enumerated in name order.
pub trait Reflect: fmt::Debug {
    fn type_name(&self) -> &str;

    fn is_record(&self) -> bool {
        false
    }

    fn property_names(&self) -> Vec<String>;

    fn property(&self, name: &str) -> Option<Value>;
}

/// A host collection with numeric indexing
pub trait Indexable: fmt::Debug {
    fn len(&self) -> usize;

    fn item(&self, index: usize) -> Option<Value>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Value {
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn entries(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Entries(Rc::new(pairs.into_iter().collect()))
    }

    pub fn entry(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::Entry(Rc::new((key.into(), value.into())))
    }

    pub fn function(f: impl Function + 'static) -> Self {
        Value::Function(Arc::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Condition semantics used by `[if]`.
    ///
    /// False iff boolean false, null, empty string, the string "false" (any case), NaN or
    /// numeric zero. Everything else, empty collections included, is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => !(f.is_nan() || *f == 0.0),
            Value::String(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
            _ => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<dyn Function>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Entries(_) => "entries",
            Value::Entry(_) => "entry",
            Value::Date(_) => "date",
            Value::Object(_) => "object",
            Value::Indexed(_) => "indexed",
            Value::Function(_) => "function",
            Value::Provider(_) => "scope",
        }
    }

    /// The text a value interpolation prints before escaping
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => write_seq(f, items.iter()),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
            Value::Entries(pairs) => {
                write!(f, "[")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "]")
            }
            Value::Entry(pair) => write!(f, "{}={}", pair.0, pair.1),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Object(o) => write!(f, "{}", o.type_name()),
            Value::Indexed(ix) => {
                write_seq(f, (0..ix.len()).map(|i| ix.item(i).unwrap_or_default()))
            }
            Value::Function(_) => write!(f, "<function>"),
            Value::Provider(provider) => {
                let mut entries = Vec::new();
                provider.visit(&mut |k, v| entries.push((k.to_string(), v.clone())));
                if provider.is_indexed() {
                    return write_seq(f, entries.iter().map(|(_, v)| v));
                }
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_seq<I, V>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: Iterator<Item = V>,
    V: std::borrow::Borrow<Value>,
{
    write!(f, "[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item.borrow())?;
    }
    write!(f, "]")
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Entries(pairs) => f
                .debug_list()
                .entries(pairs.iter().map(|(k, v)| (k, v)))
                .finish(),
            Value::Entry(pair) => write!(f, "Entry({:?}, {:?})", pair.0, pair.1),
            Value::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
            Value::Object(o) => write!(f, "Object({o:?})"),
            Value::Indexed(ix) => write!(f, "Indexed({ix:?})"),
            Value::Function(_) => write!(f, "Function"),
            Value::Provider(p) => write!(f, "Provider({p:?})"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Entries(a), Value::Entries(b)) => a == b,
            (Value::Entry(a), Value::Entry(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Indexed(a), Value::Indexed(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Provider(a), Value::Provider(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
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
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Value::Float(i as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items.into_iter().map(Into::into))
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(Rc::new(map))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::map(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

/// Tri-state lookup result: absent, present with null, or present with a value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionalValue {
    #[default]
    Absent,
    Present(Value),
}

impl OptionalValue {
    pub fn is_present(&self) -> bool {
        matches!(self, OptionalValue::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, OptionalValue::Absent)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            OptionalValue::Present(v) => Some(v),
            OptionalValue::Absent => None,
        }
    }

    /// The value, with absence collapsed to null
    pub fn into_value(self) -> Value {
        match self {
            OptionalValue::Present(v) => v,
            OptionalValue::Absent => Value::Null,
        }
    }
}

impl From<Option<Value>> for OptionalValue {
    fn from(v: Option<Value>) -> Self {
        v.map_or(OptionalValue::Absent, OptionalValue::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("FALSE").is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::from("no").is_truthy());
        assert!(Value::list(Vec::new()).is_truthy());
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Float(2.5).to_text(), "2.5");
        assert_eq!(Value::from(vec![1, 2]).to_text(), "[1, 2]");
        assert_eq!(Value::map([("a", Value::Int(1))]).to_text(), "{a=1}");
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"n": 3, "x": 1.5, "tags": ["a"], "none": null}));
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map["n"], Value::Int(3));
        assert_eq!(map["x"], Value::Float(1.5));
        assert_eq!(map["tags"], Value::list([Value::from("a")]));
        assert_eq!(map["none"], Value::Null);
    }

    #[test]
    fn test_optional_value() {
        assert!(OptionalValue::Present(Value::Null).is_present());
        assert_eq!(OptionalValue::Absent.into_value(), Value::Null);
    }
}

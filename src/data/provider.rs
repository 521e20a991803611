//! Value providers
//!
//!     A provider is one link in the resolution chain. Each one answers lookups from its own
//!     data (`get_local`) and, failing that, from its parent (`get`). Every provider except a
//!     root has exactly one parent, so the chain mirrors the lexical nesting of the template:
//!     a loop iteration scope is parented to the scope enclosing the loop, a `[use]` scope to
//!     the scope enclosing the `[use]`, and a nested map to the container it was found in.
//!
//!     The variants here are immutable. Writes go through [`MutableProvider`], which overlays
//!     any of them.

use super::overlay::MutableProvider;
use super::value::{Indexable, OptionalValue, Reflect, Value, ValueMap};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a provider
pub type ProviderRef = Rc<dyn ValueProvider>;

/// The lookup capability every scope exposes
pub trait ValueProvider: fmt::Debug {
    /// Look `name` up in this scope only, never consulting the parent
    fn get_local(&self, name: &str) -> OptionalValue;

    fn parent(&self) -> Option<&ProviderRef>;

    /// Look `name` up here, then in the ancestors
    fn get(&self, name: &str) -> OptionalValue {
        match self.get_local(name) {
            OptionalValue::Absent => self
                .parent()
                .map_or(OptionalValue::Absent, |parent| parent.get(name)),
            found => found,
        }
    }

    /// Enumerate the entries this scope defines locally
    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value));

    /// Downcast to the mutable overlay, if this is one
    fn as_overlay(&self) -> Option<MutableProvider> {
        None
    }

    /// Whether this scope is addressed by numeric index rather than by key
    fn is_indexed(&self) -> bool {
        false
    }
}

/// The empty provider at the base of a chain
#[derive(Debug, Default)]
pub struct NullProvider {
    parent: Option<ProviderRef>,
}

impl NullProvider {
    pub fn new(parent: Option<ProviderRef>) -> Self {
        Self { parent }
    }
}

impl ValueProvider for NullProvider {
    fn get_local(&self, _name: &str) -> OptionalValue {
        OptionalValue::Absent
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn visit(&self, _visitor: &mut dyn FnMut(&str, &Value)) {}
}

pub(crate) fn is_synthetic(name: &str) -> bool {
    matches!(name, "size" | "isEmpty")
}

pub(crate) fn synthetic_size(name: &str, len: usize) -> OptionalValue {
    match name {
        "size" => OptionalValue::Present(Value::from(len)),
        "isEmpty" => OptionalValue::Present(Value::Bool(len == 0)),
        _ => OptionalValue::Absent,
    }
}

/// Key/value scope over a map, with synthetic `size` and `isEmpty`
#[derive(Debug)]
pub struct MapProvider {
    map: Rc<ValueMap>,
    parent: Option<ProviderRef>,
}

impl MapProvider {
    pub fn new(map: Rc<ValueMap>, parent: Option<ProviderRef>) -> Self {
        Self { map, parent }
    }
}

impl ValueProvider for MapProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        match self.map.get(name) {
            Some(v) => OptionalValue::Present(v.clone()),
            None => synthetic_size(name, self.map.len()),
        }
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value)) {
        for (k, v) in self.map.iter() {
            visitor(k, v);
        }
    }
}

/// Anything that can be walked by numeric index
#[derive(Debug, Clone)]
pub enum Sequence {
    Empty,
    /// A lone value treated as a one-element sequence
    Single(Value),
    List(Rc<Vec<Value>>),
    Entries(Rc<Vec<(Value, Value)>>),
    Custom(Rc<dyn Indexable>),
    /// An indexed provider addressed through its `size` and numeric keys
    Scope(ProviderRef),
}

impl Sequence {
    pub fn len(&self) -> usize {
        match self {
            Sequence::Empty => 0,
            Sequence::Single(_) => 1,
            Sequence::List(items) => items.len(),
            Sequence::Entries(pairs) => pairs.len(),
            Sequence::Custom(ix) => ix.len(),
            Sequence::Scope(p) => p
                .get_local("size")
                .value()
                .and_then(Value::as_i64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`; key/value pairs come back as [`Value::Entry`]
    pub fn item(&self, index: usize) -> Option<Value> {
        match self {
            Sequence::Empty => None,
            Sequence::Single(v) => (index == 0).then(|| v.clone()),
            Sequence::List(items) => items.get(index).cloned(),
            Sequence::Entries(pairs) => pairs
                .get(index)
                .map(|(k, v)| Value::entry(k.clone(), v.clone())),
            Sequence::Custom(ix) => {
                if index < ix.len() {
                    ix.item(index)
                } else {
                    None
                }
            }
            Sequence::Scope(p) => p.get_local(&index.to_string()).value().cloned(),
        }
    }
}

/// Numeric-index scope over arrays, lists, entries and custom indexables.
///
/// Exposes `size` and `isEmpty`. Out-of-range, negative and non-numeric names are absent
/// locally and therefore fall through to the parent.
#[derive(Debug)]
pub struct IndexedProvider {
    sequence: Sequence,
    parent: Option<ProviderRef>,
}

impl IndexedProvider {
    pub fn new(sequence: Sequence, parent: Option<ProviderRef>) -> Self {
        Self { sequence, parent }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<Value> {
        self.sequence.item(index)
    }
}

impl ValueProvider for IndexedProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        if let Ok(index) = name.parse::<usize>() {
            return self.sequence.item(index).into();
        }
        synthetic_size(name, self.sequence.len())
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn is_indexed(&self) -> bool {
        true
    }

    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value)) {
        for index in 0..self.sequence.len() {
            if let Some(item) = self.sequence.item(index) {
                visitor(&index.to_string(), &item);
            }
        }
    }
}

/// Property scope over a host object
#[derive(Debug)]
pub struct ReflectedProvider {
    object: Rc<dyn Reflect>,
    parent: Option<ProviderRef>,
}

impl ReflectedProvider {
    pub fn new(object: Rc<dyn Reflect>, parent: Option<ProviderRef>) -> Self {
        Self { object, parent }
    }
}

impl ValueProvider for ReflectedProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        self.object.property(name).into()
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value)) {
        let mut names = self.object.property_names();
        if !self.object.is_record() {
            names.sort();
        }
        for name in names {
            if let Some(value) = self.object.property(&name) {
                visitor(&name, &value);
            }
        }
    }
}

/// Scope for a value with no addressable structure (strings, numbers, functions).
///
/// Strings expose `length` and `isEmpty`; everything else inherits from the parent.
#[derive(Debug)]
pub struct ScalarProvider {
    value: Value,
    parent: Option<ProviderRef>,
}

impl ScalarProvider {
    pub fn new(value: Value, parent: Option<ProviderRef>) -> Self {
        Self { value, parent }
    }
}

impl ValueProvider for ScalarProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        match (&self.value, name) {
            (Value::String(s), "length") => OptionalValue::Present(Value::from(s.chars().count())),
            (Value::String(s), "isEmpty") => OptionalValue::Present(Value::Bool(s.is_empty())),
            _ => OptionalValue::Absent,
        }
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn visit(&self, _visitor: &mut dyn FnMut(&str, &Value)) {}
}

/// Loop iteration scope: `value`, `key`, `index`, `size`.
///
/// `key` is only defined when the element is a key/value pair; otherwise it is
/// inherited like any other missing name.
#[derive(Debug)]
pub struct ListEntryProvider {
    value: Value,
    key: Option<Value>,
    index: usize,
    size: usize,
    parent: Option<ProviderRef>,
}

impl ListEntryProvider {
    pub fn new(element: Value, index: usize, size: usize, parent: Option<ProviderRef>) -> Self {
        let (key, value) = match element {
            Value::Entry(pair) => (Some(pair.0.clone()), pair.1.clone()),
            other => (None, other),
        };
        Self {
            value,
            key,
            index,
            size,
            parent,
        }
    }
}

impl ValueProvider for ListEntryProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        match name {
            "value" => OptionalValue::Present(self.value.clone()),
            "key" => self.key.clone().into(),
            "index" => OptionalValue::Present(Value::from(self.index)),
            "size" => OptionalValue::Present(Value::from(self.size)),
            _ => OptionalValue::Absent,
        }
    }

    fn parent(&self) -> Option<&ProviderRef> {
        self.parent.as_ref()
    }

    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value)) {
        visitor("value", &self.value);
        if let Some(key) = &self.key {
            visitor("key", key);
        }
        visitor("index", &Value::from(self.index));
        visitor("size", &Value::from(self.size));
    }
}

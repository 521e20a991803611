//! Path resolution, adaptation and mutation
//!
//!     `resolve` folds over the segments of a path. Every intermediate value is adapted into a
//!     fresh provider parented to the scope it was found in, so `a.b.c` looks `c` up in a
//!     scope that still inherits from `a.b`, `a` and everything enclosing them.
//!
//!     `mutate` walks the same way but replaces each immutable scope on the path with a
//!     [`MutableProvider`] overlay, writes that overlay back into its own parent, and finally
//!     writes the value into the last overlay.

use super::overlay::MutableProvider;
use super::provider::{
    IndexedProvider, ListEntryProvider, MapProvider, NullProvider, ProviderRef, ReflectedProvider,
    ScalarProvider, Sequence, ValueProvider,
};
use super::value::{OptionalValue, Value, ValueMap};
use std::rc::Rc;

/// Adapt a value into a provider parented to `parent`.
///
/// Checked in order: providers pass through unchanged (the parent is ignored), host objects
/// get a property scope, maps a key scope, sequences an index scope, anything else a scalar
/// scope.
pub fn adapt(value: Value, parent: Option<ProviderRef>) -> ProviderRef {
    match value {
        Value::Provider(provider) => provider,
        Value::Object(object) => Rc::new(ReflectedProvider::new(object, parent)),
        Value::Map(map) => Rc::new(MapProvider::new(map, parent)),
        Value::Entry(pair) => {
            let map = ValueMap::from([
                ("key".to_string(), pair.0.clone()),
                ("value".to_string(), pair.1.clone()),
            ]);
            Rc::new(MapProvider::new(Rc::new(map), parent))
        }
        Value::List(items) => Rc::new(IndexedProvider::new(Sequence::List(items), parent)),
        Value::Entries(pairs) => Rc::new(IndexedProvider::new(Sequence::Entries(pairs), parent)),
        Value::Indexed(ix) => Rc::new(IndexedProvider::new(Sequence::Custom(ix), parent)),
        Value::Null => Rc::new(NullProvider::new(parent)),
        scalar => Rc::new(ScalarProvider::new(scalar, parent)),
    }
}

/// View a value as a sequence, the way `[loop]` iterates it.
///
/// Maps iterate as key/value entries in map order, and so do scopes that were written to,
/// unless they overlay a sequence; null is empty; a lone scalar or object is a one-element
/// sequence.
pub fn to_sequence(value: Value) -> Sequence {
    match value {
        Value::Null => Sequence::Empty,
        Value::List(items) => Sequence::List(items),
        Value::Entries(pairs) => Sequence::Entries(pairs),
        Value::Indexed(ix) => Sequence::Custom(ix),
        Value::Map(map) => Sequence::Entries(Rc::new(
            map.iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
        )),
        Value::Provider(provider) if provider.is_indexed() => Sequence::Scope(provider),
        Value::Provider(provider) => {
            let mut pairs = Vec::new();
            provider.visit(&mut |k, v| pairs.push((Value::String(k.to_string()), v.clone())));
            Sequence::Entries(Rc::new(pairs))
        }
        other => Sequence::Single(other),
    }
}

/// Adapt a value into an index scope
pub fn adapt_indexed(value: Value, parent: Option<ProviderRef>) -> IndexedProvider {
    IndexedProvider::new(to_sequence(value), parent)
}

/// Build the scope for one loop iteration
pub fn loop_entry(
    element: Value,
    index: usize,
    size: usize,
    parent: ProviderRef,
) -> ProviderRef {
    Rc::new(ListEntryProvider::new(element, index, size, Some(parent)))
}

/// Resolve a path with inheritance at every hop
pub fn resolve(provider: &ProviderRef, segments: &[String]) -> OptionalValue {
    walk(provider, segments, false)
}

/// Resolve a path without inheritance: each hop must define its segment itself
pub fn resolve_local(provider: &ProviderRef, segments: &[String]) -> OptionalValue {
    walk(provider, segments, true)
}

fn walk(provider: &ProviderRef, segments: &[String], local: bool) -> OptionalValue {
    let Some((last, init)) = segments.split_last() else {
        return OptionalValue::Present(Value::Provider(provider.clone()));
    };
    let lookup = |scope: &ProviderRef, name: &str| {
        if local {
            scope.get_local(name)
        } else {
            scope.get(name)
        }
    };

    let mut current = provider.clone();
    for segment in init {
        match lookup(&current, segment) {
            OptionalValue::Present(Value::Null) | OptionalValue::Absent => {
                return OptionalValue::Absent
            }
            OptionalValue::Present(value) => current = adapt(value, Some(current)),
        }
    }
    lookup(&current, last)
}

/// Write `value` at `segments` below `root`, creating overlays along the way.
///
/// Returns without writing when the path is empty.
pub fn mutate(root: &MutableProvider, segments: &[String], value: Value) {
    let Some((last, init)) = segments.split_last() else {
        return;
    };

    let mut current = root.clone();
    for segment in init {
        let next = match current.get(segment) {
            OptionalValue::Present(Value::Null) | OptionalValue::Absent => {
                let scope = MutableProvider::scope(Some(current.as_provider()));
                current.set(segment.clone(), Value::Provider(scope.as_provider()));
                scope
            }
            OptionalValue::Present(existing) => {
                let adapted = adapt(existing, Some(current.as_provider()));
                match adapted.as_overlay() {
                    Some(overlay) => overlay,
                    None => {
                        let overlay = MutableProvider::wrap(adapted);
                        current.set(segment.clone(), Value::Provider(overlay.as_provider()));
                        overlay
                    }
                }
            }
        };
        current = next;
    }
    current.set(last.clone(), value);
}

/// Like [`mutate`], but does nothing if the scope already defines the path locally.
///
/// Returns whether the value was written.
pub fn put_if_missing(root: &MutableProvider, segments: &[String], value: Value) -> bool {
    if resolve_local(&root.as_provider(), segments).is_present() {
        return false;
    }
    mutate(root, segments, value);
    true
}

/// Export a value to a JSON-like structure
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null | Value::Function(_) => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.clone()),
        Value::Date(d) => Json::String(d.to_rfc3339()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Indexed(ix) => Json::Array(
            (0..ix.len())
                .map(|i| ix.item(i).map_or(Json::Null, |v| to_json(&v)))
                .collect(),
        ),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
        Value::Entries(pairs) => Json::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_text(), to_json(v)))
                .collect(),
        ),
        Value::Entry(pair) => serde_json::json!({
            "key": to_json(&pair.0),
            "value": to_json(&pair.1),
        }),
        Value::Object(_) | Value::Provider(_) => {
            let scope = adapt(value.clone(), None);
            let mut object = serde_json::Map::new();
            scope.visit(&mut |k, v| {
                object.insert(k.to_string(), to_json(v));
            });
            Json::Object(object)
        }
    }
}

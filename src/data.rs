//! Value resolution
//!
//!     Render input is addressed through a chain of [providers](provider). This module ties the
//!     pieces together behind [`Data`], the per-render facade that templates and functions see.
//!
//!     A `Data` starts out over an immutable provider. The first write promotes it to a
//!     [`MutableProvider`] overlay in place; reads before and after the promotion see the same
//!     values except for what was written.

pub mod overlay;
pub mod path;
pub mod provider;
pub mod resolve;
pub mod value;

pub use overlay::MutableProvider;
pub use path::DataPath;
pub use provider::{ProviderRef, Sequence, ValueProvider};
pub use value::{Indexable, OptionalValue, Reflect, Value, ValueMap};

use provider::NullProvider;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-render facade over one provider
#[derive(Debug)]
pub struct Data {
    provider: RefCell<ProviderRef>,
}

impl Data {
    pub fn new(provider: ProviderRef) -> Self {
        Self {
            provider: RefCell::new(provider),
        }
    }

    /// A root scope with nothing in it
    pub fn empty() -> Self {
        Self::new(Rc::new(NullProvider::default()))
    }

    /// A root scope over a value (usually a map)
    pub fn from_value(value: Value) -> Self {
        Self::new(resolve::adapt(value, None))
    }

    pub fn from_json(json: serde_json::Value) -> Self {
        Self::from_value(Value::from(json))
    }

    /// A child scope over `value`, parented to this one
    pub fn child(&self, value: Value) -> Data {
        Data::new(resolve::adapt(value, Some(self.provider())))
    }

    pub fn provider(&self) -> ProviderRef {
        self.provider.borrow().clone()
    }

    pub fn get(&self, path: &str) -> OptionalValue {
        self.get_path(&DataPath::parse(path))
    }

    pub fn get_path(&self, path: &DataPath) -> OptionalValue {
        resolve::resolve(&self.provider(), path.segments())
    }

    /// Resolve without consulting inherited scopes
    pub fn get_local(&self, path: &DataPath) -> OptionalValue {
        resolve::resolve_local(&self.provider(), path.segments())
    }

    pub fn put(&self, path: &str, value: impl Into<Value>) {
        self.put_path(&DataPath::parse(path), value.into());
    }

    pub fn put_path(&self, path: &DataPath, value: Value) {
        let overlay = self.promote();
        resolve::mutate(&overlay, path.segments(), value);
    }

    /// Write only if this scope does not already define the path.
    /// Returns whether anything was written.
    pub fn put_if_missing(&self, path: &str, value: impl Into<Value>) -> bool {
        let path = DataPath::parse(path);
        let overlay = self.promote();
        resolve::put_if_missing(&overlay, path.segments(), value.into())
    }

    /// Export the local view of this scope (without inherited names)
    pub fn to_json(&self) -> serde_json::Value {
        resolve::to_json(&Value::Provider(self.provider()))
    }

    fn promote(&self) -> MutableProvider {
        let current = self.provider();
        if let Some(overlay) = current.as_overlay() {
            return overlay;
        }
        let overlay = MutableProvider::wrap(current);
        *self.provider.borrow_mut() = overlay.as_provider();
        overlay
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_then_get() {
        let data = Data::from_json(json!({"user": {"name": "Ann"}}));
        data.put("user.greeting", "hi");
        data.put("count", 3);
        assert_eq!(data.get("user.greeting"), OptionalValue::Present(Value::from("hi")));
        assert_eq!(data.get("user.name"), OptionalValue::Present(Value::from("Ann")));
        assert_eq!(data.get("count"), OptionalValue::Present(Value::Int(3)));
    }

    #[test]
    fn test_child_scope_inherits_and_isolates_writes() {
        let data = Data::from_json(json!({"site": "example"}));
        let child = data.child(Value::from(json!({"page": 1})));
        assert_eq!(child.get("site"), OptionalValue::Present(Value::from("example")));
        child.put("local", true);
        assert!(data.get("local").is_absent());
    }

    #[test]
    fn test_put_if_missing_respects_local_values() {
        let data = Data::from_json(json!({"a": 1}));
        assert!(!data.put_if_missing("a", 2));
        assert!(data.put_if_missing("b", 2));
        assert_eq!(data.get("a"), OptionalValue::Present(Value::Int(1)));
    }

    #[test]
    fn test_to_json_round_trips_writes() {
        let data = Data::from_json(json!({"a": 1, "nested": {"b": 2}}));
        data.put("nested.c", 3);
        assert_eq!(data.to_json(), json!({"a": 1, "nested": {"b": 2, "c": 3}}));
    }
}

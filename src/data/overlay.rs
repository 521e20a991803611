//! Copy-on-write mutation layer
//!
//!     A [`MutableProvider`] holds explicit overrides in front of either a delegate provider
//!     (the immutable scope it replaced) or, for a fresh scope, a plain parent. Reads consult
//!     the overrides first and then read through. The delegate itself is never written to.
//!
//!     The handle is cheap to clone and clones share state, so an overlay can be stored as a
//!     value in its parent and still be reached again on a later write.

use super::provider::{is_synthetic, synthetic_size, ProviderRef, ValueProvider};
use super::value::{OptionalValue, Value, ValueMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
enum Base {
    /// Read-through target; its parent chain is this overlay's parent chain
    Delegate(ProviderRef),
    /// Fresh scope with no data of its own beyond the overrides
    Parent(Option<ProviderRef>),
}

struct OverlayState {
    overrides: RefCell<ValueMap>,
    base: Base,
}

/// Explicit override map in front of a read-through delegate
#[derive(Clone)]
pub struct MutableProvider {
    state: Rc<OverlayState>,
}

impl MutableProvider {
    /// Overlay an existing provider
    pub fn wrap(delegate: ProviderRef) -> Self {
        Self::with_base(Base::Delegate(delegate))
    }

    /// A new empty scope under `parent`
    pub fn scope(parent: Option<ProviderRef>) -> Self {
        Self::with_base(Base::Parent(parent))
    }

    fn with_base(base: Base) -> Self {
        Self {
            state: Rc::new(OverlayState {
                overrides: RefCell::new(ValueMap::new()),
                base,
            }),
        }
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.state.overrides.borrow_mut().insert(name.into(), value);
    }

    /// This overlay as a provider handle sharing the same state
    pub fn as_provider(&self) -> ProviderRef {
        Rc::new(self.clone())
    }

    pub fn ptr_eq(&self, other: &MutableProvider) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn override_of(&self, name: &str) -> Option<Value> {
        self.state.overrides.borrow().get(name).cloned()
    }

    /// A scope created by a write, standing for a new map
    fn is_fresh(&self) -> bool {
        matches!(self.state.base, Base::Parent(_))
    }

    /// Whether the delegate enumerates `name` as one of its own entries
    fn delegate_defines(&self, name: &str) -> bool {
        let Base::Delegate(delegate) = &self.state.base else {
            return false;
        };
        let mut defined = false;
        delegate.visit(&mut |key, _| defined |= key == name);
        defined
    }

    fn merged_len(&self) -> usize {
        let mut len = 0;
        self.visit(&mut |_, _| len += 1);
        len
    }
}

impl fmt::Debug for MutableProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableProvider")
            .field("overrides", &self.state.overrides.borrow().keys().collect::<Vec<_>>())
            .field("base", &self.state.base)
            .finish()
    }
}

impl ValueProvider for MutableProvider {
    fn get_local(&self, name: &str) -> OptionalValue {
        if let Some(v) = self.override_of(name) {
            return OptionalValue::Present(v);
        }
        let found = match &self.state.base {
            Base::Delegate(delegate) => delegate.get_local(name),
            Base::Parent(_) => OptionalValue::Absent,
        };
        // `size` and `isEmpty` count the merged keys unless the delegate defines them
        match found {
            OptionalValue::Present(_) if is_synthetic(name) && !self.delegate_defines(name) => {
                synthetic_size(name, self.merged_len())
            }
            OptionalValue::Absent if is_synthetic(name) && self.is_fresh() => {
                synthetic_size(name, self.merged_len())
            }
            found => found,
        }
    }

    fn parent(&self) -> Option<&ProviderRef> {
        match &self.state.base {
            Base::Delegate(delegate) => delegate.parent(),
            Base::Parent(parent) => parent.as_ref(),
        }
    }

    fn visit(&self, visitor: &mut dyn FnMut(&str, &Value)) {
        let overrides = self.state.overrides.borrow().clone();
        if let Base::Delegate(delegate) = &self.state.base {
            delegate.visit(&mut |name, value| {
                if !overrides.contains_key(name) {
                    visitor(name, value);
                }
            });
        }
        for (name, value) in overrides.iter() {
            visitor(name, value);
        }
    }

    fn as_overlay(&self) -> Option<MutableProvider> {
        Some(self.clone())
    }

    fn is_indexed(&self) -> bool {
        match &self.state.base {
            Base::Delegate(delegate) => delegate.is_indexed(),
            Base::Parent(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::MapProvider;

    #[test]
    fn test_overrides_shadow_delegate_without_touching_it() {
        let map = Rc::new(ValueMap::from([("a".to_string(), Value::Int(1))]));
        let delegate: ProviderRef = Rc::new(MapProvider::new(map.clone(), None));
        let overlay = MutableProvider::wrap(delegate.clone());
        overlay.set("a", Value::Int(2));
        overlay.set("b", Value::Int(3));

        assert_eq!(overlay.get("a"), OptionalValue::Present(Value::Int(2)));
        assert_eq!(overlay.get_local("b"), OptionalValue::Present(Value::Int(3)));
        assert_eq!(delegate.get("a"), OptionalValue::Present(Value::Int(1)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_size_counts_merged_keys() {
        let map = Rc::new(ValueMap::from([("a".to_string(), Value::Int(1))]));
        let overlay = MutableProvider::wrap(Rc::new(MapProvider::new(map, None)));
        overlay.set("a", Value::Int(10));
        overlay.set("b", Value::Int(2));
        assert_eq!(overlay.get("size"), OptionalValue::Present(Value::Int(2)));
        assert_eq!(overlay.get("isEmpty"), OptionalValue::Present(Value::Bool(false)));

        let fresh = MutableProvider::scope(None);
        assert_eq!(fresh.get("isEmpty"), OptionalValue::Present(Value::Bool(true)));
        fresh.set("x", Value::Int(1));
        assert_eq!(fresh.get("size"), OptionalValue::Present(Value::Int(1)));
    }

    #[test]
    fn test_real_size_key_is_kept() {
        let map = Rc::new(ValueMap::from([("size".to_string(), Value::from("XL"))]));
        let overlay = MutableProvider::wrap(Rc::new(MapProvider::new(map, None)));
        overlay.set("b", Value::Int(2));
        assert_eq!(overlay.get("size"), OptionalValue::Present(Value::from("XL")));
    }

    #[test]
    fn test_clones_share_state() {
        let overlay = MutableProvider::scope(None);
        let handle = overlay.as_provider();
        overlay.set("x", Value::from("y"));
        assert_eq!(handle.get("x"), OptionalValue::Present(Value::from("y")));
        assert!(handle.as_overlay().is_some_and(|o| o.ptr_eq(&overlay)));
    }

    #[test]
    fn test_visit_merges_overrides() {
        let map = Rc::new(ValueMap::from([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ]));
        let overlay = MutableProvider::wrap(Rc::new(MapProvider::new(map, None)));
        overlay.set("b", Value::Int(20));
        let mut seen = Vec::new();
        overlay.visit(&mut |k, v| seen.push((k.to_string(), v.clone())));
        assert_eq!(
            seen,
            vec![("a".to_string(), Value::Int(1)), ("b".to_string(), Value::Int(20))]
        );
    }
}

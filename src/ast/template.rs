//! Templates and lazily compiled template handles

use super::block::Block;
use crate::error::StencilResult;
use crate::source::StencilId;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// An ordered, immutable sequence of blocks
#[derive(Debug, Clone, Default)]
pub struct Template {
    name: String,
    blocks: Vec<Block>,
}

impl Template {
    pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Display name of the stencil this template was compiled from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Templates are equal when their blocks are; the name is informational
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

/// Handle to a stencil referenced by `[include]` or `[{resource}]`.
///
/// The target is compiled on first render and remembered; clones share the slot.
#[derive(Clone)]
pub struct LazyTemplate {
    id: StencilId,
    slot: Arc<OnceCell<Arc<Template>>>,
}

impl LazyTemplate {
    pub fn new(id: StencilId) -> Self {
        Self {
            id,
            slot: Arc::new(OnceCell::new()),
        }
    }

    pub fn id(&self) -> &StencilId {
        &self.id
    }

    /// The compiled target, if it has been loaded
    pub fn get(&self) -> Option<&Arc<Template>> {
        self.slot.get()
    }

    /// Load the target through `compile` unless already loaded. A failed load is not
    /// remembered.
    pub fn get_or_load(
        &self,
        compile: impl FnOnce(&StencilId) -> StencilResult<Arc<Template>>,
    ) -> StencilResult<&Arc<Template>> {
        self.slot.get_or_try_init(|| compile(&self.id))
    }
}

impl PartialEq for LazyTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for LazyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTemplate")
            .field("id", &self.id.to_string())
            .field("loaded", &self.slot.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StencilError;
    use crate::source::{clean_path, Locale};
    use std::cell::Cell;

    fn handle() -> LazyTemplate {
        let path = clean_path(Some("/part"), "").expect("path");
        LazyTemplate::new(StencilId::source(path, Locale::root(), None, "html"))
    }

    #[test]
    fn test_loads_once() {
        let calls = Cell::new(0);
        let lazy = handle();
        let shared = lazy.clone();
        for _ in 0..3 {
            lazy.get_or_load(|_| {
                calls.set(calls.get() + 1);
                Ok(Arc::new(Template::new("part", vec![Block::static_text("x")])))
            })
            .expect("load");
        }
        assert_eq!(calls.get(), 1);
        assert!(shared.get().is_some());
    }

    #[test]
    fn test_failures_are_retried() {
        let lazy = handle();
        assert!(lazy
            .get_or_load(|id| Err(StencilError::not_found(id.to_string())))
            .is_err());
        assert!(lazy.get().is_none());
        assert!(lazy
            .get_or_load(|_| Ok(Arc::new(Template::default())))
            .is_ok());
    }

    #[test]
    fn test_equality_ignores_name() {
        let a = Template::new("a", vec![Block::static_text("x")]);
        let b = Template::new("b", vec![Block::static_text("x")]);
        assert_eq!(a, b);
    }
}

//! Single-flight compile cache
//!
//!     One slot per [`StencilId`]. The map shard is locked only long enough to fetch or create
//!     the slot; the compile itself runs against the slot, so concurrent first requests for the
//!     same id wait on each other while requests for different ids never do. A failed compile
//!     leaves the slot empty and the next request tries again.

use crate::ast::Template;
use crate::error::StencilResult;
use crate::source::StencilId;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

type Slot = Arc<OnceCell<Arc<Template>>>;

#[derive(Debug, Default)]
pub struct StencilCache {
    slots: DashMap<StencilId, Slot>,
}

impl StencilCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached template for `id`, compiling it with `compile` on a miss
    pub fn get_or_compile(
        &self,
        id: &StencilId,
        compile: impl FnOnce() -> StencilResult<Template>,
    ) -> StencilResult<Arc<Template>> {
        let slot: Slot = Arc::clone(self.slots.entry(id.clone()).or_default().value());
        slot.get_or_try_init(|| {
            debug!(stencil = %id, "compiling");
            compile().map(Arc::new)
        })
        .map(Arc::clone)
    }

    /// The cached template for `id`, if compiled
    pub fn get(&self, id: &StencilId) -> Option<Arc<Template>> {
        self.slots.get(id).and_then(|slot| slot.get().cloned())
    }

    /// Number of compiled templates
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Functions callable from `[apply]`
//!
//!     Functions are ordinary addressable data: `[apply fmt.money(total)]` resolves
//!     `fmt.money` in the render data and calls whatever [`Function`] it finds there. When the
//!     data has nothing at that path, the engine's [`FunctionRegistry`] is consulted, which
//!     comes seeded with the [default functions](defaults).
//!
//!     A function may return a value (stored at the `out=` path when one is given) and may
//!     write into the data directly; either way the effect is visible to the blocks that
//!     follow the `[apply]`.

pub mod defaults;
pub mod paging;

pub use crate::ast::Argument;
pub use paging::PageIndex;

use crate::data::{Data, Value};
use dashmap::DashMap;
use std::sync::Arc;

/// Runtime failure of a function call. These abort the render.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FunctionError {
    #[error("expected {expected} argument(s), got {found}")]
    Arity { expected: String, found: usize },
    #[error("`{0}` is not a function")]
    NotAFunction(String),
    #[error("argument {index}: {message}")]
    BadArgument { index: usize, message: String },
    #[error("{0}")]
    Failed(String),
}

impl FunctionError {
    pub fn arity(expected: impl Into<String>, found: usize) -> Self {
        FunctionError::Arity {
            expected: expected.into(),
            found,
        }
    }

    pub fn bad_argument(index: usize, message: impl Into<String>) -> Self {
        FunctionError::BadArgument {
            index,
            message: message.into(),
        }
    }
}

/// Something `[apply]` can invoke
pub trait Function: Send + Sync {
    fn call(&self, data: &Data, args: &[Argument]) -> Result<Value, FunctionError>;
}

impl<F> Function for F
where
    F: Fn(&Data, &[Argument]) -> Result<Value, FunctionError> + Send + Sync,
{
    fn call(&self, data: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
        self(data, args)
    }
}

/// Check the argument count against an inclusive range
pub fn expect_arity(args: &[Argument], min: usize, max: usize) -> Result<(), FunctionError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(FunctionError::arity(expected, args.len()));
    }
    Ok(())
}

/// Named functions shared by every render of one engine
pub struct FunctionRegistry {
    functions: DashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            functions: DashMap::new(),
        }
    }

    /// A registry seeded with the default functions
    pub fn with_defaults(page_size: usize) -> Self {
        let registry = Self::new();
        defaults::install(&registry, page_size);
        registry
    }

    pub fn register(&self, name: impl Into<String>, function: impl Function + 'static) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).map(|f| Arc::clone(f.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.functions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

//! Template AST
//!
//!     A compiled [`Template`] is an ordered, immutable list of [`Block`]s. Blocks never change
//!     after parsing; the only state they carry is the lazily filled handle of an include or
//!     resource reference, which is shared through the engine's compile cache.
//!
//!     Templates hold no render data, so one template may be rendered from many threads at
//!     once.

pub mod block;
pub mod parameter;
pub mod position;
pub mod template;

pub use block::{Block, Branch};
pub use parameter::{Argument, Parameter};
pub use position::{Position, SourceLocation};
pub use template::{LazyTemplate, Template};

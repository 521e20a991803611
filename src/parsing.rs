//! Parsing
//!
//!     Template text becomes a [`Template`](crate::ast::Template) in three steps:
//!
//!         1. global      the first `[global ...]` directive is applied (or, with `!`, ignored)
//!                        and removed before anything else looks at the text
//!         2. parser      recursive descent over the matcher's token stream, one call per
//!                        (sub)template, each with its own terminator expectation
//!         3. elision     layout-only whitespace is dropped from every finished block list
//!
//!     Parsing is eager and complete: a template that parses has no structural surprises left
//!     for render time.

pub mod context;
pub mod elision;
pub mod global;
pub mod parser;

pub use context::{ParseOptions, Scope};
pub use parser::parse;

//! # stencil
//!
//! A text-template engine. Template source is literal text interleaved with value interpolations
//! (`{path}`) and control directives (`[if]`, `[loop]`, `[use]`, `[apply]`, `[include]`, ...).
//! It is compiled once into an immutable [`Template`](ast::Template) and rendered many times
//! against loosely-typed hierarchical [`Data`](data::Data).
//!
//! File Layout
//!
//!     lexing      Pattern table, the earliest-match directive matcher, the argument tokenizer
//!     parsing     Recursive-descent parser, global pre-pass, whitespace elision
//!     ast         Blocks, parameters and templates (immutable after parse)
//!     data        Values, the provider chain, path resolution and mutation, the Data facade
//!     escape      Output escape strategies and the name registry
//!     format      Typed value formatters (dates, numbers, printf-style)
//!     functions   The function contract and the default function map
//!     render      Render contract for blocks
//!     source      Source paths, locales, stencil ids and source providers
//!     engine      Compile cache and top-level API
//!
//! The usual entry point is [`Engine`](engine::Engine):
//!
//! ```rust,ignore
//! let mut source = InMemorySource::new();
//! source.add("/hello", "Hello, {name}!");
//! let engine = Engine::new(source);
//! let data = Data::from_json(serde_json::json!({ "name": "World" }));
//! let out = engine.render_to_string("/hello", &Locale::root(), &data)?;
//! ```

pub mod ast;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod escape;
pub mod format;
pub mod functions;
pub mod lexing;
pub mod parsing;
pub mod render;
pub mod source;

pub use ast::Template;
pub use data::{Data, OptionalValue, Value};
pub use engine::Engine;
pub use error::{ParseError, RenderError, StencilError};
pub use source::{InMemorySource, Locale, SourceProvider, StencilId};

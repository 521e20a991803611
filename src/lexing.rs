//! Lexing
//!
//!     Template source is scanned by the [`Matcher`](matcher::Matcher): every directive kind
//!     owns one regular expression, built from the named fragments of the
//!     [pattern table](patterns). At each position the earliest match across all kinds wins;
//!     text in between becomes a static token.
//!
//!     Directive parameters (the argument list of `[apply]`, the settings of `[set]` and
//!     `[global]`) are small enough to be tokenized by a plain logos lexer in
//!     [`arguments`].

pub mod arguments;
pub mod matcher;
pub mod patterns;

pub use matcher::{LexError, Matcher, Spanned, Token};

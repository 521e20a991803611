//! Error types
//!
//!     The checked taxonomy is small: a stencil is either not found, unreachable because the
//!     storage failed, or broken because its text does not parse. All three travel as
//!     [`StencilError`] and carry the identity of the stencil they concern.
//!
//!     Render-time failures are a separate layer ([`RenderError`]). Function invocation errors
//!     are not part of the checked taxonomy: they abort the render and surface as
//!     [`RenderError::Function`]. Output already written to the sink before the failure is not
//!     rolled back.

use crate::ast::Position;
use crate::functions::FunctionError;
use std::fmt;
use std::sync::Arc;

/// Error raised by a source provider when the backing storage cannot be reached
#[derive(Debug, Clone, thiserror::Error)]
#[error("storage error: {message}")]
pub struct StorageError {
    pub message: String,
    #[source]
    pub source: Option<Arc<std::io::Error>>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// An I/O failure, with `context` (usually the file) leading the message
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        Self {
            message: format!("{context}: {err}"),
            source: Some(Arc::new(err)),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }
}

/// A template that could not be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{stencil}{}: {message}", at(.position))]
pub struct ParseError {
    /// Display form of the stencil identity
    pub stencil: String,
    pub message: String,
    /// One-based position of the offending text, when known
    pub position: Option<Position>,
}

fn at(position: &Option<Position>) -> String {
    position.map_or_else(String::new, |pos| format!(" at {pos}"))
}

impl ParseError {
    pub fn new(stencil: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stencil: stencil.into(),
            message: message.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Errors that can occur while locating or compiling a stencil
#[derive(Debug, Clone, thiserror::Error)]
pub enum StencilError {
    /// No source resolves for the path/locale, or the message key is missing from its bundle
    #[error("stencil not found: {0}")]
    NotFound(String),
    /// The source could not be read
    #[error("{stencil}: {source}")]
    Storage {
        stencil: String,
        #[source]
        source: StorageError,
    },
    /// The source was found but is not a valid template
    #[error("parse error in {0}")]
    Parse(#[from] ParseError),
}

impl StencilError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StencilError::NotFound(what.into())
    }
}

/// Errors that abort a render
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An included or referenced stencil failed to compile on first use
    #[error(transparent)]
    Stencil(#[from] StencilError),
    /// A function invoked by `[apply]` failed
    #[error("function `{function}` failed: {source}")]
    Function {
        function: String,
        #[source]
        source: FunctionError,
    },
    /// The output sink refused a write
    #[error("failed to write output")]
    Write(#[from] fmt::Error),
    /// `[include]`/`[{resource}]` nesting went past the configured limit
    #[error("include depth limit of {limit} exceeded while rendering {stencil}")]
    IncludeDepth { stencil: String, limit: usize },
}

/// Type alias for compile results
pub type StencilResult<T> = Result<T, StencilError>;

/// Type alias for render results
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_reports_one_based_position() {
        let err = ParseError::new("/pages/home", "missing [end]").at(Position::new(3, 5));
        assert_eq!(err.to_string(), "/pages/home at 3:5: missing [end]");
    }

    #[test]
    fn parse_error_without_position() {
        let err = ParseError::new("/a", "unknown escape `foo`");
        assert_eq!(err.to_string(), "/a: unknown escape `foo`");
    }

    #[test]
    fn storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StencilError::Storage {
            stencil: "/x".into(),
            source: io.into(),
        };
        assert_eq!(err.to_string(), "/x: storage error: denied");
        let source = std::error::Error::source(&err).expect("storage source");
        let io = std::error::Error::source(source).expect("io source");
        assert_eq!(io.to_string(), "denied");
    }
}

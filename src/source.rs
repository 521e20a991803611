//! Stencil sources
//!
//!     A stencil comes either from a source path (`/mail/welcome`) or from a message bundle
//!     (`messages` + `greeting`). Both are looked up through a [`SourceProvider`], the storage
//!     collaborator of the engine, with most-specific-to-root locale fallback:
//!
//!         fr_CA  ->  fr  ->  (root)
//!
//!     Two providers ship with the crate: [`InMemorySource`] for embedding and tests, and
//!     [`DirectorySource`] over a directory tree.

pub mod directory;
pub mod memory;
pub mod path;

pub use directory::DirectorySource;
pub use memory::InMemorySource;
pub use path::{clean_path, SourcePath};

use crate::error::StorageError;
use std::fmt;

/// A normalised locale tag such as `fr_CA`; the empty tag is the root locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    /// Accepts `fr-CA`, `fr_ca` and `fr_CA` alike
    pub fn parse(tag: &str) -> Self {
        let parts: Vec<String> = tag
            .split(['-', '_'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, p)| match i {
                0 => p.to_ascii_lowercase(),
                1 if p.len() == 2 => p.to_ascii_uppercase(),
                _ => p.to_string(),
            })
            .collect();
        Locale(parts.join("_"))
    }

    pub fn root() -> Self {
        Locale(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tag(&self) -> &str {
        &self.0
    }

    /// This locale followed by each less specific one, ending with the root locale
    pub fn fallbacks(&self) -> Vec<Locale> {
        let mut chain = Vec::new();
        let mut tag = self.0.as_str();
        while !tag.is_empty() {
            chain.push(Locale(tag.to_string()));
            tag = tag.rfind('_').map_or("", |at| &tag[..at]);
        }
        chain.push(Locale::root());
        chain
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Where a stencil's text comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StencilKind {
    Source { path: SourcePath },
    Message { bundle: String, key: String },
}

/// Compile-cache key. Equal ids compile to interchangeable templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StencilId {
    pub kind: StencilKind,
    pub locale: Locale,
    /// Default bundle for `[{key}]` inside the stencil
    pub bundle: Option<String>,
    /// Canonical name of the default escape style
    pub escape: String,
}

impl StencilId {
    pub fn source(path: SourcePath, locale: Locale, bundle: Option<String>, escape: &str) -> Self {
        Self {
            kind: StencilKind::Source { path },
            locale,
            bundle,
            escape: escape.to_string(),
        }
    }

    /// A message stencil; its own bundle is the default for nested `[{key}]`
    pub fn message(bundle: &str, key: &str, locale: Locale, escape: &str) -> Self {
        Self {
            kind: StencilKind::Message {
                bundle: bundle.to_string(),
                key: key.to_string(),
            },
            locale,
            bundle: Some(bundle.to_string()),
            escape: escape.to_string(),
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, StencilKind::Message { .. })
    }

    /// Source path, for source-backed stencils
    pub fn path(&self) -> Option<&SourcePath> {
        match &self.kind {
            StencilKind::Source { path } => Some(path),
            StencilKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for StencilId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StencilKind::Source { path } => write!(f, "{path}")?,
            StencilKind::Message { bundle, key } => write!(f, "{bundle}:{key}")?,
        }
        if !self.locale.is_root() {
            write!(f, " [{}]", self.locale)?;
        }
        Ok(())
    }
}

/// Storage collaborator of the engine.
///
/// Implementations answer for one exact locale; the provided `find_*` methods walk the
/// fallback chain. `Ok(None)` means "not here", `Err` means the storage itself failed.
pub trait SourceProvider: Send + Sync {
    fn get_source(&self, path: &SourcePath, locale: &Locale) -> Result<Option<String>, StorageError>;

    fn get_message(
        &self,
        bundle: &str,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<String>, StorageError>;

    fn find_source(&self, path: &SourcePath, locale: &Locale) -> Result<Option<String>, StorageError> {
        for candidate in locale.fallbacks() {
            if let Some(text) = self.get_source(path, &candidate)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn find_message(
        &self,
        bundle: &str,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<String>, StorageError> {
        for candidate in locale.fallbacks() {
            if let Some(text) = self.get_message(bundle, key, &candidate)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }
}

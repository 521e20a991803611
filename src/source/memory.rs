//! In-memory stencil store

use super::path::clean_path;
use super::{Locale, SourcePath, SourceProvider};
use crate::error::StorageError;
use std::collections::HashMap;

/// Stencils and message bundles held in maps. Paths are cleaned on insertion with the
/// default `.stencil` suffix, so `mail/welcome.stencil` and `/mail/welcome` are the same
/// entry.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    sources: HashMap<(String, Locale), String>,
    messages: HashMap<(String, Locale), HashMap<String, String>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &str) -> String {
        clean_path(Some(path), ".stencil")
            .map(|p| p.to_string())
            .unwrap_or_else(|_| path.to_string())
    }

    /// Add a stencil for the root locale
    pub fn add(&mut self, path: &str, text: impl Into<String>) -> &mut Self {
        self.add_localized(path, Locale::root(), text)
    }

    pub fn add_localized(&mut self, path: &str, locale: Locale, text: impl Into<String>) -> &mut Self {
        self.sources.insert((Self::key(path), locale), text.into());
        self
    }

    /// Add a message to a bundle for the root locale
    pub fn add_message(&mut self, bundle: &str, key: &str, text: impl Into<String>) -> &mut Self {
        self.add_localized_message(bundle, Locale::root(), key, text)
    }

    pub fn add_localized_message(
        &mut self,
        bundle: &str,
        locale: Locale,
        key: &str,
        text: impl Into<String>,
    ) -> &mut Self {
        self.messages
            .entry((bundle.to_string(), locale))
            .or_default()
            .insert(key.to_string(), text.into());
        self
    }
}

impl SourceProvider for InMemorySource {
    fn get_source(&self, path: &SourcePath, locale: &Locale) -> Result<Option<String>, StorageError> {
        Ok(self
            .sources
            .get(&(path.to_string(), locale.clone()))
            .cloned())
    }

    fn get_message(
        &self,
        bundle: &str,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<String>, StorageError> {
        Ok(self
            .messages
            .get(&(bundle.to_string(), locale.clone()))
            .and_then(|messages| messages.get(key))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_fallback() {
        let mut source = InMemorySource::new();
        source
            .add("mail/welcome.stencil", "Welcome")
            .add_localized("/mail/welcome", Locale::parse("fr"), "Bienvenue");
        let path = clean_path(Some("/mail/welcome"), "").expect("path");

        let found = |tag: &str| source.find_source(&path, &Locale::parse(tag)).expect("storage");
        assert_eq!(found("fr_CA").as_deref(), Some("Bienvenue"));
        assert_eq!(found("de").as_deref(), Some("Welcome"));
        assert_eq!(found("").as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_messages() {
        let mut source = InMemorySource::new();
        source
            .add_message("messages", "hi", "Hello")
            .add_localized_message("messages", Locale::parse("de"), "hi", "Hallo");
        let find = |tag: &str, key: &str| {
            source
                .find_message("messages", key, &Locale::parse(tag))
                .expect("storage")
        };
        assert_eq!(find("de_AT", "hi").as_deref(), Some("Hallo"));
        assert_eq!(find("en", "hi").as_deref(), Some("Hello"));
        assert_eq!(find("en", "bye"), None);
    }
}

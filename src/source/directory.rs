//! Filesystem stencil store
//!
//!     Layout under the root directory:
//!
//!         <path>[_<locale>]<suffix>           stencils, e.g. mail/welcome_fr.stencil
//!         <bundle>[_<locale>].properties      message bundles, e.g. messages_fr.properties
//!
//!     Bundles are `key=value` (or `key: value`) lines; `#` and `!` start comments and a
//!     trailing backslash continues the value on the next line.

use super::{Locale, SourcePath, SourceProvider};
use crate::error::StorageError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    suffix: String,
}

fn read_optional(file: &Path) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(file) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StorageError::io(file.display(), err)),
    }
}

fn localized(name: &str, locale: &Locale) -> String {
    if locale.is_root() {
        name.to_string()
    } else {
        format!("{name}_{}", locale.tag())
    }
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_suffix(root, ".stencil")
    }

    pub fn with_suffix(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn stencil_file(&self, path: &SourcePath, locale: &Locale) -> PathBuf {
        self.root
            .join(format!("{}{}", localized(path.relative(), locale), self.suffix))
    }

    fn bundle_file(&self, bundle: &str, locale: &Locale) -> PathBuf {
        self.root
            .join(format!("{}.properties", localized(bundle, locale)))
    }
}

impl SourceProvider for DirectorySource {
    fn get_source(&self, path: &SourcePath, locale: &Locale) -> Result<Option<String>, StorageError> {
        let file = self.stencil_file(path, locale);
        debug!(file = %file.display(), "reading stencil");
        read_optional(&file)
    }

    fn get_message(
        &self,
        bundle: &str,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<String>, StorageError> {
        let file = self.bundle_file(bundle, locale);
        Ok(read_optional(&file)?.and_then(|text| parse_properties(&text).remove(key)))
    }
}

/// Parse the `key=value` lines of a message bundle
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let mut logical = line.to_string();
        while logical.ends_with('\\') {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        let split = logical.find(['=', ':']);
        let (key, value) = match split {
            Some(at) => (&logical[..at], &logical[at + 1..]),
            None => (logical.as_str(), ""),
        };
        entries.insert(key.trim().to_string(), value.trim_start().to_string());
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::clean_path;
    use std::fs;

    #[test]
    fn test_properties() {
        let parsed = parse_properties("# comment\n! also\ngreeting = Hello, {name}!\nlong=one \\\n   two\nflag\nurl: http://x\n");
        assert_eq!(parsed["greeting"], "Hello, {name}!");
        assert_eq!(parsed["long"], "one two");
        assert_eq!(parsed["flag"], "");
        assert_eq!(parsed["url"], "http://x");
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn test_reads_localized_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::create_dir_all(dir.path().join("mail")).expect("mkdir");
        fs::write(dir.path().join("mail/welcome.stencil"), "Welcome").expect("write");
        fs::write(dir.path().join("mail/welcome_fr.stencil"), "Bienvenue").expect("write");
        fs::write(dir.path().join("messages.properties"), "hi=Hello\n").expect("write");

        let source = DirectorySource::new(dir.path());
        let path = clean_path(Some("mail/welcome"), ".stencil").expect("path");
        let find = |tag: &str| source.find_source(&path, &Locale::parse(tag)).expect("io");
        assert_eq!(find("fr_BE").as_deref(), Some("Bienvenue"));
        assert_eq!(find("en").as_deref(), Some("Welcome"));

        let missing = clean_path(Some("nope"), ".stencil").expect("path");
        assert_eq!(source.find_source(&missing, &Locale::root()).expect("io"), None);
        assert_eq!(
            source
                .find_message("messages", "hi", &Locale::parse("fr"))
                .expect("io")
                .as_deref(),
            Some("Hello")
        );
    }

    #[test]
    fn test_unreadable_file_is_a_storage_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        // a directory where a file is expected cannot be read as text
        fs::create_dir_all(dir.path().join("broken.stencil")).expect("mkdir");
        let source = DirectorySource::new(dir.path());
        let path = clean_path(Some("broken"), ".stencil").expect("path");
        assert!(source.get_source(&path, &Locale::root()).is_err());
    }
}

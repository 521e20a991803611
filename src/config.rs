//! Engine configuration
//!
//! `defaults/stencil.default.toml` is embedded into the crate so that the documented defaults
//! and the runtime behaviour stay in sync. Callers layer their own files and overrides on top
//! through [`Loader`] before deserializing into [`EngineConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/stencil.default.toml");

/// Settings consumed by [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Locale tag used when none is given
    pub locale: String,
    /// Default escape style name
    pub escape: String,
    /// Default bundle for `[{key}]`
    #[serde(default)]
    pub bundle: Option<String>,
    /// Template file suffix, stripped from source paths
    pub suffix: String,
    pub max_include_depth: usize,
    pub page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            escape: "html".to_string(),
            bundle: None,
            suffix: ".stencil".to_string(),
            max_include_depth: 64,
            page_size: 10,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (command-line settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone
pub fn load_defaults() -> Result<EngineConfig, ConfigError> {
    Loader::new().build()
}

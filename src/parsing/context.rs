//! Parse context
//!
//!     [`ParseOptions`] describe the stencil being parsed and stay fixed for the whole parse.
//!     A [`Scope`] holds the settings that `[set]` may change: the default bundle and escape
//!     style. Every sub-template starts from a copy of its parent's scope, so a `[set]` only
//!     affects the rest of the (sub)template it appears in.

use crate::escape::{EscapeRegistry, EscapeStyle};
use crate::source::StencilId;
use tracing::warn;

/// Fixed inputs of one parse
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions<'e> {
    pub id: &'e StencilId,
    pub escapes: &'e EscapeRegistry,
    /// Template suffix, stripped from include paths
    pub suffix: &'e str,
}

impl<'e> ParseOptions<'e> {
    pub fn new(id: &'e StencilId, escapes: &'e EscapeRegistry, suffix: &'e str) -> Self {
        Self {
            id,
            escapes,
            suffix,
        }
    }

    pub fn escape(&self, name: &str) -> Result<EscapeStyle, String> {
        self.escapes
            .resolve(name)
            .ok_or_else(|| format!("unknown escape style `{name}`"))
    }
}

/// Settings in effect at one point of the parse
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub bundle: Option<String>,
    pub escape: EscapeStyle,
}

impl Scope {
    /// The scope a stencil starts with, from its id
    pub fn initial(options: &ParseOptions<'_>) -> Result<Self, String> {
        Ok(Self {
            bundle: options.id.bundle.clone(),
            escape: options.escape(&options.id.escape)?,
        })
    }

    /// Apply one `[set]` setting
    pub fn apply(&mut self, options: &ParseOptions<'_>, key: &str, value: &str) -> Result<(), String> {
        match key {
            "bundle" => {
                let value = value.trim();
                self.bundle = (!value.is_empty()).then(|| value.to_string());
            }
            "escape" => self.escape = options.escape(value)?,
            "version" => warn!(stencil = %options.id, version = value, "ignoring version setting"),
            other => return Err(format!("unknown setting `{other}`")),
        }
        Ok(())
    }
}

//! Output escaping
//!
//!     Every value interpolation carries an [`EscapeStyle`], resolved by name when the template
//!     is parsed (`{html:title}`, or the scope default set with `[set escape=...]`). A style
//!     wraps one [`Escaper`] strategy.
//!
//!     Built-in styles:
//!
//!         none        text is written as-is
//!         html        markup is neutralised, legal character entities are kept
//!         html_strict every markup-significant character is entity-encoded
//!         ecma        JavaScript string literal body (ecma_ascii: ASCII-only output)
//!         java        Java string literal body (java_ascii)
//!         json        JSON string body (json_ascii)
//!         url         percent-encoding of everything but unreserved characters
//!         log         single-line-safe text for log files
//!
//!     Names are looked up case-insensitively, and `.`, `_`, `-` and whitespace are
//!     interchangeable, so `HTML-Strict`, `html.strict` and `html_strict` are the same style.

pub mod html;
pub mod literal;
pub mod log;
pub mod url;

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// An output-sanitising text transform
pub trait Escaper: Send + Sync + fmt::Debug {
    fn escape_into(&self, text: &str, out: &mut String);

    /// Escape `text`; null escapes to the empty string
    fn escape(&self, text: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(text) = text {
            out.reserve(text.len());
            self.escape_into(text, &mut out);
        }
        out
    }
}

/// Writes text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEscape;

impl Escaper for NoEscape {
    fn escape_into(&self, text: &str, out: &mut String) {
        out.push_str(text);
    }
}

/// A named escape strategy, as bound into the template at parse time
#[derive(Clone)]
pub struct EscapeStyle {
    name: Arc<str>,
    escaper: Arc<dyn Escaper>,
}

impl EscapeStyle {
    pub fn new(name: &str, escaper: Arc<dyn Escaper>) -> Self {
        Self {
            name: Arc::from(name),
            escaper,
        }
    }

    pub fn none() -> Self {
        Self::new("none", Arc::new(NoEscape))
    }

    /// Canonical name of the style
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn escape(&self, text: Option<&str>) -> String {
        self.escaper.escape(text)
    }

    pub fn escape_into(&self, text: &str, out: &mut String) {
        self.escaper.escape_into(text, out)
    }
}

impl fmt::Debug for EscapeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EscapeStyle({})", self.name)
    }
}

impl PartialEq for EscapeStyle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EscapeStyle {}

/// Canonical form of a style name: lower case, separators folded to `_`
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch == '.' || ch == '_' || ch == '-' || ch.is_whitespace() {
            if !canonical.ends_with('_') {
                canonical.push('_');
            }
        } else {
            canonical.extend(ch.to_lowercase());
        }
    }
    canonical
}

/// Name to strategy table, owned by one engine.
///
/// Lookups are memoised by the exact input string. Registering a style clears the memo so
/// that later lookups see it.
pub struct EscapeRegistry {
    styles: DashMap<String, EscapeStyle>,
    memo: DashMap<String, Option<EscapeStyle>>,
}

impl EscapeRegistry {
    /// A registry holding only the built-in styles
    pub fn new() -> Self {
        let registry = Self {
            styles: DashMap::new(),
            memo: DashMap::new(),
        };
        registry.register("none", NoEscape);
        registry.register("html", html::HtmlEscaper::safe());
        registry.register("html_strict", html::HtmlEscaper::strict());
        for flavor in [
            literal::Flavor::Ecma,
            literal::Flavor::Java,
            literal::Flavor::Json,
        ] {
            registry.register(flavor.name(), literal::LiteralEscaper::new(flavor, false));
            registry.register(
                &format!("{}_ascii", flavor.name()),
                literal::LiteralEscaper::new(flavor, true),
            );
        }
        registry.register("url", url::UrlEscaper);
        registry.register("log", log::LogEscaper::default());
        registry
    }

    pub fn register(&self, name: &str, escaper: impl Escaper + 'static) {
        let canonical = canonical_name(name);
        let style = EscapeStyle::new(&canonical, Arc::new(escaper));
        self.styles.insert(canonical, style);
        self.memo.clear();
    }

    /// Look a style up by name
    pub fn resolve(&self, name: &str) -> Option<EscapeStyle> {
        if let Some(hit) = self.memo.get(name) {
            return hit.value().clone();
        }
        let found = self
            .styles
            .get(&canonical_name(name))
            .map(|s| s.value().clone());
        self.memo.insert(name.to_string(), found.clone());
        found
    }

    /// Canonical names of every registered style, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.styles.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for EscapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EscapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscapeRegistry")
            .field("styles", &self.names())
            .finish()
    }
}

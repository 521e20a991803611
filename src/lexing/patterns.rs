//! Pattern Table
//!
//!     Directive patterns are written against named fragments: `%{path}` in a pattern is
//!     replaced by the (recursively expanded) `path` fragment, wrapped in a non-capturing group.
//!     Fragments may refer to other fragments, so the table is a small DAG. Expansion is
//!     memoised, and a fragment that refers back to itself, directly or not, is rejected when
//!     the table is built.
//!
//!     Pattern Kinds (declaration order breaks ties between matches at the same position)
//!
//!         directive_comment   [* ... *]
//!         value_comment       {* ... *}
//!         heredoc             {>>M} / {path,>>M} / {escape:path,kind,>>M}
//!         value               {path} / {escape:path,kind,style}
//!         resource            [{key}] / [{bundle,key}]
//!         directive           [if ...] [loop ...] [use ...] [apply ...] [include ...]
//!                             [set ...] [else] [end]

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Named fragments, referenced as `%{name}`
pub const FRAGMENTS: &[(&str, &str)] = &[
    ("ident", r"[A-Za-z_][A-Za-z0-9_]*"),
    ("segment", r"[A-Za-z0-9_]+"),
    ("path", r"%{ident}(?:\.%{segment})*"),
    ("escape", r"[A-Za-z][A-Za-z0-9_.\-]*"),
    ("key", r"[A-Za-z0-9_][A-Za-z0-9_.\-/]*"),
    ("quoted", r"'(?:[^']|'')*'"),
    ("param", r"(?:%{quoted}|[^\]'])*?"),
    ("directive_name", r"if|loop|use|apply|include|set|else|end"),
];

/// Directive patterns in kind order
pub const DIRECTIVE_PATTERNS: &[(&str, &str)] = &[
    ("directive_comment", r"\[\*(?s:.*?)\*\]"),
    ("value_comment", r"\{\*(?s:.*?)\*\}"),
    (
        "heredoc",
        r"\{(?:(?P<escape>%{escape}):)?(?:(?P<path>%{path})\s*,\s*(?:(?P<kind>%{ident})\s*,\s*(?:(?P<styles>[^{}]*?)\s*,\s*)?)?)?>>\s*(?P<marker>%{ident})\s*\}",
    ),
    (
        "value",
        r"\{(?:(?P<escape>%{escape}):)?(?P<path>%{path})(?:\s*,(?P<rest>[^{}]*))?\}",
    ),
    (
        "resource",
        r"\[\{\s*(?P<first>%{key})\s*(?:,\s*(?P<second>%{key})\s*)?\}\]",
    ),
    (
        "directive",
        r"\[(?P<name>%{directive_name})\b\s*(?P<param>%{param})\s*\]",
    ),
];

/// The `[global ...]` pre-pass pattern; `!` marks a directive to leave in place
pub const GLOBAL_PATTERN: &str = r"\[(?P<ignore>!)?global\b\s*(?P<param>%{param})\s*\](?:\r?\n)?";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("unknown pattern fragment `{0}`")]
    UnknownFragment(String),
    #[error("pattern fragment `{0}` refers to itself")]
    Cycle(String),
    #[error("pattern `{name}` does not compile: {message}")]
    Invalid { name: String, message: String },
}

/// Expands `%{name}` references against a fragment table
pub struct PatternTable<'a> {
    fragments: HashMap<&'a str, &'a str>,
    expanded: HashMap<String, String>,
}

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

impl<'a> PatternTable<'a> {
    /// Build the table, expanding every fragment up front so that cycles fail here
    pub fn new(fragments: &'a [(&'a str, &'a str)]) -> Result<Self, PatternError> {
        let mut table = Self {
            fragments: fragments.iter().copied().collect(),
            expanded: HashMap::new(),
        };
        for (name, _) in fragments {
            table.fragment(name, &mut Vec::new())?;
        }
        Ok(table)
    }

    fn fragment(&mut self, name: &str, stack: &mut Vec<String>) -> Result<String, PatternError> {
        if let Some(done) = self.expanded.get(name) {
            return Ok(done.clone());
        }
        if stack.iter().any(|n| n == name) {
            return Err(PatternError::Cycle(name.to_string()));
        }
        let raw = *self
            .fragments
            .get(name)
            .ok_or_else(|| PatternError::UnknownFragment(name.to_string()))?;
        stack.push(name.to_string());
        let expanded = self.substitute(raw, stack)?;
        stack.pop();
        self.expanded.insert(name.to_string(), expanded.clone());
        Ok(expanded)
    }

    fn substitute(&mut self, pattern: &str, stack: &mut Vec<String>) -> Result<String, PatternError> {
        let mut out = String::with_capacity(pattern.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&pattern[last..whole.start()]);
            out.push_str("(?:");
            out.push_str(&self.fragment(name.as_str(), stack)?);
            out.push(')');
            last = whole.end();
        }
        out.push_str(&pattern[last..]);
        Ok(out)
    }

    /// Expand the references in `pattern`
    pub fn expand(&mut self, pattern: &str) -> Result<String, PatternError> {
        self.substitute(pattern, &mut Vec::new())
    }

    /// Expand and compile `pattern`
    pub fn compile(&mut self, name: &str, pattern: &str) -> Result<Regex, PatternError> {
        let expanded = self.expand(pattern)?;
        Regex::new(&expanded).map_err(|e| PatternError::Invalid {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// The compiled directive patterns, in kind order
pub static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(DIRECTIVE_PATTERNS).expect("built-in pattern table")
});

/// The compiled `[global]` pattern
pub static GLOBAL: Lazy<Regex> = Lazy::new(|| {
    PatternTable::new(FRAGMENTS)
        .and_then(|mut table| table.compile("global", GLOBAL_PATTERN))
        .expect("built-in global pattern")
});

pub fn compile_all(patterns: &[(&str, &str)]) -> Result<Vec<Regex>, PatternError> {
    let mut table = PatternTable::new(FRAGMENTS)?;
    patterns
        .iter()
        .map(|(name, pattern)| table.compile(name, pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_references_expand() {
        let fragments = [("a", "x"), ("b", "%{a}y"), ("c", "%{b}%{a}")];
        let mut table = PatternTable::new(&fragments).expect("table");
        assert_eq!(table.expand("^%{c}$").expect("expand"), "^(?:(?:(?:x)y)(?:x))$");
    }

    #[test]
    fn test_cycles_are_rejected() {
        let fragments = [("a", "%{b}"), ("b", "x%{c}"), ("c", "%{a}")];
        assert!(matches!(
            PatternTable::new(&fragments),
            Err(PatternError::Cycle(_))
        ));
        let selfish = [("a", "(%{a})?")];
        assert_eq!(
            PatternTable::new(&selfish).err(),
            Some(PatternError::Cycle("a".into()))
        );
    }

    #[test]
    fn test_unknown_fragment() {
        let mut table = PatternTable::new(FRAGMENTS).expect("table");
        assert_eq!(
            table.expand("%{nope}"),
            Err(PatternError::UnknownFragment("nope".into()))
        );
    }

    #[test]
    fn test_builtin_table_compiles() {
        assert_eq!(COMPILED.len(), DIRECTIVE_PATTERNS.len());
        assert!(GLOBAL.is_match("[global mode=inverted]"));
    }

    #[test]
    fn test_value_pattern() {
        let value = &COMPILED[3];
        let caps = value.captures("{html:user.name,date,short}").expect("match");
        assert_eq!(&caps["escape"], "html");
        assert_eq!(&caps["path"], "user.name");
        assert_eq!(&caps["rest"], "date,short");
        // leading whitespace keeps CSS and code braces literal
        assert!(!value.is_match("a { color: red }"));
    }

    #[test]
    fn test_directive_pattern() {
        let directive = &COMPILED[5];
        let caps = directive.captures("[apply f('a]b', x)]").expect("match");
        assert_eq!(&caps["name"], "apply");
        assert_eq!(&caps["param"], "f('a]b', x)");
        assert!(!directive.is_match("[iffy]"));
        assert!(!directive.is_match("[global x=y]"));
    }
}

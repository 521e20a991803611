//! Earliest-match directive scanner
//!
//!     The matcher keeps, per pattern kind, the next match at or after the scan position.
//!     Matches that fall behind the position are searched again; kinds that have run out of
//!     matches are never searched again. The kind whose match starts first wins, ties going to
//!     the kind declared first. Text before the winning match is emitted as [`Token::Text`].
//!
//!     In inverted mode only here-documents are recognised; everything else is text.
//!
//!     One token may be pushed back and is returned by the next call to
//!     [`Matcher::next_token`].

use super::patterns::COMPILED;
use regex::Captures;
use std::ops::Range;
use tracing::trace;

/// A token paired with its byte range in the source
pub type Spanned<'a> = (Token<'a>, Range<usize>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text between directives
    Text(&'a str),
    /// `[* ... *]`, or `{* ... *}` when `value` is set
    Comment { value: bool },
    /// `{[escape:]path[,rest]}`
    Value {
        escape: Option<&'a str>,
        path: &'a str,
        rest: Option<&'a str>,
    },
    /// `{[escape:][path,[kind,[styles,]]]>>marker} body {marker}`
    Heredoc {
        escape: Option<&'a str>,
        path: Option<&'a str>,
        kind: Option<&'a str>,
        styles: Option<&'a str>,
        body: &'a str,
        /// Byte offset of `body` in the source
        body_start: usize,
    },
    /// `[{key}]` or `[{bundle,key}]`
    Resource {
        first: &'a str,
        second: Option<&'a str>,
    },
    /// `[name param]`
    Directive { name: &'a str, param: &'a str },
}

impl Token<'_> {
    pub fn is_directive(&self, wanted: &str) -> bool {
        matches!(self, Token::Directive { name, .. } if *name == wanted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("here-document `{marker}` is never closed")]
    UnterminatedHeredoc { marker: String, at: usize },
}

impl LexError {
    /// Byte offset the error refers to
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedHeredoc { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Unknown,
    At(usize, usize),
    Exhausted,
}

const HEREDOC: usize = 2;

/// Scans one source text
pub struct Matcher<'a> {
    source: &'a str,
    position: usize,
    inverted: bool,
    next: Vec<Next>,
    pushed: Option<Spanned<'a>>,
}

impl<'a> Matcher<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            inverted: false,
            next: vec![Next::Unknown; COMPILED.len()],
            pushed: None,
        }
    }

    /// A matcher that only recognises here-documents
    pub fn inverted(source: &'a str) -> Self {
        Self {
            inverted: true,
            ..Self::new(source)
        }
    }

    /// Scan only `range` of `source`; spans stay relative to the whole source
    pub fn within(source: &'a str, range: Range<usize>) -> Self {
        Self {
            position: range.start,
            ..Self::new(&source[..range.end])
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Return a token so that the next call yields it again
    pub fn push_back(&mut self, token: Spanned<'a>) {
        debug_assert!(self.pushed.is_none(), "only one token of lookahead");
        self.pushed = Some(token);
    }

    fn active(&self, kind: usize) -> bool {
        !self.inverted || kind == HEREDOC
    }

    /// Earliest (start, end, kind) among the active kinds
    fn earliest(&mut self) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        for kind in 0..COMPILED.len() {
            if !self.active(kind) {
                continue;
            }
            let stale = match self.next[kind] {
                Next::Unknown => true,
                Next::At(start, _) => start < self.position,
                Next::Exhausted => false,
            };
            if stale {
                self.next[kind] = match COMPILED[kind].find_at(self.source, self.position) {
                    Some(m) => Next::At(m.start(), m.end()),
                    None => Next::Exhausted,
                };
            }
            if let Next::At(start, end) = self.next[kind] {
                if best.map_or(true, |(s, _, _)| start < s) {
                    best = Some((start, end, kind));
                }
            }
        }
        best
    }

    pub fn next_token(&mut self) -> Result<Option<Spanned<'a>>, LexError> {
        if let Some(token) = self.pushed.take() {
            return Ok(Some(token));
        }
        if self.position >= self.source.len() {
            return Ok(None);
        }
        let start = self.position;
        match self.earliest() {
            Some((at, _, _)) if at > start => {
                self.position = at;
                Ok(Some((Token::Text(&self.source[start..at]), start..at)))
            }
            Some((at, end, kind)) => {
                let token = self.directive(kind, at, end)?;
                trace!(kind, span = ?token.1, "token");
                Ok(Some(token))
            }
            None => {
                self.position = self.source.len();
                Ok(Some((Token::Text(&self.source[start..]), start..self.source.len())))
            }
        }
    }

    fn directive(&mut self, kind: usize, start: usize, end: usize) -> Result<Spanned<'a>, LexError> {
        let source = self.source;
        let caps = COMPILED[kind].captures_at(source, start);
        let group = |caps: &Option<Captures<'a>>, name: &str| {
            caps.as_ref().and_then(|c| c.name(name)).map(|m| m.as_str())
        };
        let token = match kind {
            0 => Token::Comment { value: false },
            1 => Token::Comment { value: true },
            HEREDOC => {
                let marker = group(&caps, "marker").unwrap_or_default();
                let (body_start, body_end, close_end) = find_terminator(source, end, marker)
                    .ok_or_else(|| LexError::UnterminatedHeredoc {
                        marker: marker.to_string(),
                        at: start,
                    })?;
                self.position = close_end;
                return Ok((
                    Token::Heredoc {
                        escape: group(&caps, "escape"),
                        path: group(&caps, "path"),
                        kind: group(&caps, "kind"),
                        styles: group(&caps, "styles"),
                        body: &source[body_start..body_end],
                        body_start,
                    },
                    start..close_end,
                ));
            }
            3 => Token::Value {
                escape: group(&caps, "escape"),
                path: group(&caps, "path").unwrap_or_default(),
                rest: group(&caps, "rest"),
            },
            4 => Token::Resource {
                first: group(&caps, "first").unwrap_or_default(),
                second: group(&caps, "second"),
            },
            _ => Token::Directive {
                name: group(&caps, "name").unwrap_or_default(),
                param: group(&caps, "param").unwrap_or_default(),
            },
        };
        self.position = end;
        Ok((token, start..end))
    }
}

/// Locate `{marker}` after a here-document header ending at `from`.
///
/// A single line break directly after the header is not part of the body. Returns the body
/// range and the end of the terminator.
fn find_terminator(source: &str, from: usize, marker: &str) -> Option<(usize, usize, usize)> {
    let rest = &source[from..];
    let skip = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        0
    };
    let body_start = from + skip;
    let mut search = body_start;
    while let Some(found) = source[search..].find('{') {
        let open = search + found;
        if let Some(len) = terminator_len(&source[open + 1..], marker) {
            return Some((body_start, open, open + 1 + len));
        }
        search = open + 1;
    }
    None
}

/// Length of `\s*marker\s*}` at the start of `text`, if it is there
fn terminator_len(text: &str, marker: &str) -> Option<usize> {
    let inner = text.trim_start();
    let after_marker = inner.strip_prefix(marker)?.trim_start();
    let close = after_marker.strip_prefix('}')?;
    Some(text.len() - close.len())
}

impl<'a> Iterator for Matcher<'a> {
    type Item = Result<Spanned<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        Matcher::new(source)
            .map(|t| t.expect("lex").0)
            .collect()
    }

    #[test]
    fn test_text_and_values() {
        assert_eq!(
            tokens("Hi {name}, {html:a.b,number,integer}!"),
            vec![
                Token::Text("Hi "),
                Token::Value {
                    escape: None,
                    path: "name",
                    rest: None
                },
                Token::Text(", "),
                Token::Value {
                    escape: Some("html"),
                    path: "a.b",
                    rest: Some("number,integer")
                },
                Token::Text("!"),
            ]
        );
    }

    #[test]
    fn test_directives_and_comments() {
        assert_eq!(
            tokens("[if x]a[else]b[end][* note *]{* v *}[{greeting}]"),
            vec![
                Token::Directive {
                    name: "if",
                    param: "x"
                },
                Token::Text("a"),
                Token::Directive {
                    name: "else",
                    param: ""
                },
                Token::Text("b"),
                Token::Directive {
                    name: "end",
                    param: ""
                },
                Token::Comment { value: false },
                Token::Comment { value: true },
                Token::Resource {
                    first: "greeting",
                    second: None
                },
            ]
        );
    }

    #[test]
    fn test_unknown_brackets_are_text() {
        assert_eq!(
            tokens("a[0] = { x }; [global y=z]"),
            vec![Token::Text("a[0] = { x }; [global y=z]")]
        );
    }

    #[test]
    fn test_heredoc_body_is_raw() {
        let source = "{>>EOT}\n[if x]{y}\n{EOT}tail";
        let all: Vec<Spanned<'_>> = Matcher::new(source).map(|t| t.expect("lex")).collect();
        match &all[0].0 {
            Token::Heredoc { body, body_start, path, .. } => {
                assert_eq!(*body, "[if x]{y}\n");
                assert_eq!(*body_start, 8);
                assert_eq!(*path, None);
            }
            other => panic!("expected heredoc, got {other:?}"),
        }
        assert_eq!(all[0].1, 0..source.len() - 4);
        assert_eq!(all[1].0, Token::Text("tail"));
    }

    #[test]
    fn test_value_heredoc_header() {
        let found = tokens("{ecma:n,format,>>F}%05d{F}");
        assert_eq!(
            found,
            vec![Token::Heredoc {
                escape: Some("ecma"),
                path: Some("n"),
                kind: Some("format"),
                styles: None,
                body: "%05d",
                body_start: 19,
            }]
        );
    }

    #[test]
    fn test_terminator_allows_inner_whitespace_only() {
        assert_eq!(find_terminator("x{EOTX}{ EOT }y", 0, "EOT"), Some((0, 7, 14)));
        assert_eq!(find_terminator("\nbody{EOT", 0, "EOT"), None);
        assert_eq!(find_terminator("\r\n{EOT}", 0, "EOT"), Some((2, 2, 7)));
    }

    #[test]
    fn test_unterminated_heredoc() {
        let result: Result<Vec<_>, _> = Matcher::new("x {>>END} never closed").collect();
        assert_eq!(
            result,
            Err(LexError::UnterminatedHeredoc {
                marker: "END".into(),
                at: 2
            })
        );
    }

    #[test]
    fn test_inverted_mode_only_sees_heredocs() {
        let mut matcher = Matcher::inverted("[if x]{y}{>>T}{z}{T}!");
        assert_eq!(matcher.next_token().expect("lex").map(|t| t.0), Some(Token::Text("[if x]{y}")));
        let (heredoc, _) = matcher.next_token().expect("lex").expect("token");
        assert!(matches!(heredoc, Token::Heredoc { body: "{z}", .. }));
        assert_eq!(matcher.next_token().expect("lex").map(|t| t.0), Some(Token::Text("!")));
        assert_eq!(matcher.next_token().expect("lex"), None);
    }

    #[test]
    fn test_push_back() {
        let mut matcher = Matcher::new("[end]x");
        let end = matcher.next_token().expect("lex").expect("token");
        assert!(end.0.is_directive("end"));
        matcher.push_back(end.clone());
        assert_eq!(matcher.next_token().expect("lex"), Some(end));
        assert_eq!(matcher.next_token().expect("lex").map(|t| t.0), Some(Token::Text("x")));
    }

    proptest! {
        #[test]
        fn lexing_never_panics_and_covers_the_source(source in "[a-z{}\\[\\]*>:,.' \n]{0,64}") {
            let mut covered = 0;
            for token in Matcher::new(&source) {
                match token {
                    Ok((_, span)) => {
                        prop_assert_eq!(span.start, covered);
                        covered = span.end;
                    }
                    Err(_) => return Ok(()),
                }
            }
            prop_assert_eq!(covered, source.len());
        }
    }
}

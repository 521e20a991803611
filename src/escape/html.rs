//! HTML escaping
//!
//!     Both variants canonicalise line breaks (CR, LF and CRLF all become LF) and drop
//!     characters that have no business in an HTML document: DEL, C0 controls other than tab
//!     and newline, C1 controls and Unicode non-characters.
//!
//!     The safe variant neutralises markup but keeps well-formed character references
//!     (`&amp;`, `&#169;`, `&#x2014;`) so already-encoded text survives. The strict variant
//!     encodes every `&`, plus backtick and `=` which matter inside unquoted attributes.

use super::Escaper;
use once_cell::sync::Lazy;
use regex::Regex;

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlEscaper {
    strict: bool,
}

impl HtmlEscaper {
    pub fn safe() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// True for characters an HTML document must not contain
pub fn is_dropped(ch: char) -> bool {
    let cp = ch as u32;
    match cp {
        0x09 | 0x0A => false,
        0x00..=0x1F | 0x7F..=0x9F => true,
        0xFDD0..=0xFDEF => true,
        _ => cp & 0xFFFE == 0xFFFE,
    }
}

impl Escaper for HtmlEscaper {
    fn escape_into(&self, text: &str, out: &mut String) {
        let mut chars = text.char_indices().peekable();
        while let Some((at, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if matches!(chars.peek(), Some((_, '\n'))) {
                        chars.next();
                    }
                    out.push('\n');
                }
                '&' if !self.strict && ENTITY.is_match(&text[at..]) => out.push('&'),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                '`' if self.strict => out.push_str("&#96;"),
                '=' if self.strict => out.push_str("&#61;"),
                c if is_dropped(c) => {}
                c => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn safe(text: &str) -> String {
        HtmlEscaper::safe().escape(Some(text))
    }

    fn strict(text: &str) -> String {
        HtmlEscaper::strict().escape(Some(text))
    }

    #[test]
    fn test_markup_is_neutralised() {
        assert_eq!(
            safe("<a href=\"x\">it's</a>"),
            "&lt;a href=&quot;x&quot;&gt;it&#39;s&lt;/a&gt;"
        );
    }

    #[rstest]
    #[case("&amp;", "&amp;")]
    #[case("&#169;", "&#169;")]
    #[case("&#x2014;", "&#x2014;")]
    #[case("fish & chips", "fish &amp; chips")]
    #[case("&nosemicolon", "&amp;nosemicolon")]
    fn test_safe_keeps_legal_entities(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(safe(input), expected);
    }

    #[test]
    fn test_strict_encodes_every_ampersand() {
        assert_eq!(strict("&amp; a=`b`"), "&amp;amp; a&#61;&#96;b&#96;");
    }

    #[test]
    fn test_line_breaks_are_canonical() {
        assert_eq!(safe("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_controls_and_noncharacters_are_dropped() {
        assert_eq!(safe("a\u{7F}b\u{85}c\u{FDD0}d\u{FFFE}e\u{1FFFF}f\u{0}g"), "abcdefg");
        assert_eq!(safe("tab\there"), "tab\there");
    }
}

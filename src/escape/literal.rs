//! String-literal escaping for ECMAScript, Java and JSON
//!
//!     The three flavours share one table and differ only in a handful of single-character
//!     escapes:
//!
//!         \'   ECMA, Java
//!         \`   ECMA
//!         \v   ECMA
//!         \/   JSON
//!
//!     Backslash, double quote, `\b \f \n \r \t` are escaped by all of them. Other control
//!     characters and the line separators U+2028/U+2029 become `\uHHHH`.
//!
//!     In ASCII mode every non-ASCII character is escaped too. Characters beyond the BMP are
//!     written as `\u{1F600}` for ECMA and as a UTF-16 surrogate pair for Java and JSON.

use super::Escaper;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Ecma,
    Java,
    Json,
}

impl Flavor {
    pub fn name(self) -> &'static str {
        match self {
            Flavor::Ecma => "ecma",
            Flavor::Java => "java",
            Flavor::Json => "json",
        }
    }

    fn single_char_escape(self, ch: char) -> Option<&'static str> {
        let escape = match ch {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\u{8}' => "\\b",
            '\u{C}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\'' if self != Flavor::Json => "\\'",
            '`' if self == Flavor::Ecma => "\\`",
            '\u{B}' if self == Flavor::Ecma => "\\v",
            '/' if self == Flavor::Json => "\\/",
            _ => return None,
        };
        Some(escape)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralEscaper {
    flavor: Flavor,
    ascii: bool,
}

impl LiteralEscaper {
    pub fn new(flavor: Flavor, ascii: bool) -> Self {
        Self { flavor, ascii }
    }
}

fn push_unit(out: &mut String, unit: u32) {
    let _ = write!(out, "\\u{unit:04X}");
}

impl Escaper for LiteralEscaper {
    fn escape_into(&self, text: &str, out: &mut String) {
        for ch in text.chars() {
            if let Some(escape) = self.flavor.single_char_escape(ch) {
                out.push_str(escape);
                continue;
            }
            let cp = ch as u32;
            if cp < 0x20 || cp == 0x7F || cp == 0x2028 || cp == 0x2029 {
                push_unit(out, cp);
            } else if !self.ascii || cp < 0x80 {
                out.push(ch);
            } else if cp <= 0xFFFF {
                push_unit(out, cp);
            } else if self.flavor == Flavor::Ecma {
                let _ = write!(out, "\\u{{{cp:X}}}");
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    push_unit(out, u32::from(*unit));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn escape(flavor: Flavor, ascii: bool, text: &str) -> String {
        LiteralEscaper::new(flavor, ascii).escape(Some(text))
    }

    #[rstest]
    #[case(Flavor::Ecma, r#"a\'b\`c\vd/e"#)]
    #[case(Flavor::Java, r#"a\'b`c\u000Bd/e"#)]
    #[case(Flavor::Json, r#"a'b`c\u000Bd\/e"#)]
    fn test_flavour_specific_escapes(#[case] flavor: Flavor, #[case] expected: &str) {
        assert_eq!(escape(flavor, false, "a'b`c\u{B}d/e"), expected);
    }

    #[test]
    fn test_common_escapes() {
        for flavor in [Flavor::Ecma, Flavor::Java, Flavor::Json] {
            assert_eq!(
                escape(flavor, false, "\"q\"\\\n\t\u{1}"),
                r#"\"q\"\\\n\t\u0001"#
            );
        }
    }

    #[test]
    fn test_unicode_passes_through_unless_ascii() {
        assert_eq!(escape(Flavor::Json, false, "café"), "café");
        assert_eq!(escape(Flavor::Json, true, "café"), r"caf\u00E9");
    }

    #[rstest]
    #[case(Flavor::Ecma, r"\u{1F600}")]
    #[case(Flavor::Java, r"\uD83D\uDE00")]
    #[case(Flavor::Json, r"\uD83D\uDE00")]
    fn test_astral_characters_in_ascii_mode(#[case] flavor: Flavor, #[case] expected: &str) {
        assert_eq!(escape(flavor, true, "😀"), expected);
    }

    #[test]
    fn test_line_separators_are_always_escaped() {
        assert_eq!(escape(Flavor::Ecma, false, "a\u{2028}b"), r"a\u2028b");
    }
}

//! Percent-encoding for URL components

use super::Escaper;

/// Encodes every UTF-8 byte except the RFC 3986 unreserved set `A-Z a-z 0-9 - . _ ~`
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEscaper;

impl Escaper for UrlEscaper {
    fn escape_into(&self, text: &str, out: &mut String) {
        out.push_str(&urlencoding::encode(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_and_unicode() {
        assert_eq!(
            UrlEscaper.escape(Some("a b&c=d/é~")),
            "a%20b%26c%3Dd%2F%C3%A9~"
        );
    }
}

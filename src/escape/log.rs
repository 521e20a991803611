//! Log-safe escaping
//!
//!     Output of this style can be embedded in a line-oriented log without forging entries:
//!
//!         line breaks     replaced by the continuation marker, then a newline and the prefix
//!         tabs            expanded with spaces to the next 8-column stop
//!         controls        C0/C1 controls, DEL and non-characters become U+FFFD
//!
//!     Text that needs none of this is written byte-for-byte.

use super::html::is_dropped;
use super::Escaper;

pub const CONTINUATION_MARKER: &str = "\u{21B5}";
pub const LINE_PREFIX: &str = "    ";
const TAB_STOP: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEscaper {
    marker: String,
    prefix: String,
}

impl LogEscaper {
    pub fn new(marker: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            prefix: prefix.into(),
        }
    }
}

impl Default for LogEscaper {
    fn default() -> Self {
        Self::new(CONTINUATION_MARKER, LINE_PREFIX)
    }
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

impl Escaper for LogEscaper {
    fn escape_into(&self, text: &str, out: &mut String) {
        let mut column = 0;
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if is_line_break(ch) {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(&self.marker);
                out.push('\n');
                out.push_str(&self.prefix);
                column = self.prefix.chars().count();
            } else if ch == '\t' {
                let width = TAB_STOP - column % TAB_STOP;
                out.extend(std::iter::repeat(' ').take(width));
                column += width;
            } else if is_dropped(ch) {
                out.push(char::REPLACEMENT_CHARACTER);
                column += 1;
            } else {
                out.push(ch);
                column += 1;
            }
        }
    }
}

//! Byte offset to line/column conversion
//!
//!     The matcher works on byte offsets into the template text. Those never leave the
//!     parser except through error reports, which convert them to [`Position`] with a
//!     [`SourceLocation`] built once per parsed text.

use std::fmt;

/// Represents a position in template text (one-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a one-based line/column position. Columns count characters.
    pub fn byte_to_position(&self, source: &str, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        let start = self.line_starts[line];
        let end = byte_offset.min(source.len());
        let column = source.get(start..end).map_or(end - start, |s| s.chars().count());

        Position::new(line + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_comparison() {
        assert!(Position::new(1, 5) < Position::new(2, 3));
        assert_eq!(Position::new(1, 5), Position::new(1, 5));
    }

    #[test]
    fn test_byte_to_position() {
        let source = "ab\ncd\n[end]";
        let loc = SourceLocation::new(source);
        assert_eq!(loc.line_count(), 3);
        assert_eq!(loc.byte_to_position(source, 0), Position::new(1, 1));
        assert_eq!(loc.byte_to_position(source, 4), Position::new(2, 2));
        assert_eq!(loc.byte_to_position(source, 6), Position::new(3, 1));
    }

    #[test]
    fn test_columns_count_characters() {
        let source = "héllo [end]";
        let loc = SourceLocation::new(source);
        let offset = source.find('[').unwrap();
        assert_eq!(loc.byte_to_position(source, offset), Position::new(1, 7));
    }
}

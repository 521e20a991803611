//! Whitespace elision
//!
//!     Templates are indented for readability:
//!
//!         [loop items]
//!             [if value.visible]
//!                 {value.name}
//!             [end]
//!         [end]
//!
//!     The line breaks and indentation between directives are layout, not output. One pass
//!     over a finished block list, right to left, removes every static block that
//!
//!         - is whitespace only and contains a line break,
//!         - does not come from a here-document, and
//!         - has no value-producing neighbour on either side.
//!
//!     Whitespace touching an interpolation is kept, so blank lines around real output
//!     survive.

use crate::ast::Block;
use tracing::trace;

/// Elide layout whitespace in place; returns the number of blocks removed
pub fn elide(blocks: &mut Vec<Block>) -> usize {
    let before = blocks.len();
    for i in (0..blocks.len()).rev() {
        if !blocks[i].is_layout() {
            continue;
        }
        let after_value = i > 0 && blocks[i - 1].is_value_producing();
        let before_value = blocks.get(i + 1).is_some_and(Block::is_value_producing);
        if !after_value && !before_value {
            blocks.remove(i);
        }
    }
    let removed = before - blocks.len();
    if removed > 0 {
        trace!(removed, "elided layout whitespace");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPath;
    use crate::escape::EscapeStyle;

    fn value() -> Block {
        Block::Value {
            path: DataPath::parse("v"),
            escape: EscapeStyle::none(),
            fallback: None,
        }
    }

    fn set() -> Block {
        Block::Set { settings: vec![] }
    }

    #[test]
    fn test_layout_between_directives_goes() {
        let mut blocks = vec![set(), Block::static_text("\n\n  "), set()];
        assert_eq!(elide(&mut blocks), 1);
        assert_eq!(blocks, vec![set(), set()]);
    }

    #[test]
    fn test_whitespace_next_to_values_stays() {
        let mut blocks = vec![
            set(),
            Block::static_text("\n"),
            value(),
            Block::static_text("\n\n"),
            set(),
        ];
        assert_eq!(elide(&mut blocks), 0);
    }

    #[test]
    fn test_text_and_heredocs_stay() {
        let mut blocks = vec![
            set(),
            Block::static_text("  "),
            set(),
            Block::static_text("\n x \n"),
            Block::Static {
                text: "\n".into(),
                required: true,
            },
        ];
        assert_eq!(elide(&mut blocks), 0);
    }

    #[test]
    fn test_value_comment_protects_like_a_value() {
        let mut blocks = vec![
            Block::Comment { value: true },
            Block::static_text("\n"),
            Block::Comment { value: false },
            Block::static_text("\n"),
            set(),
        ];
        assert_eq!(elide(&mut blocks), 1);
        assert_eq!(blocks.len(), 4);
    }
}

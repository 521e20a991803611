//! Block nodes

use super::parameter::Parameter;
use super::template::{LazyTemplate, Template};
use crate::data::DataPath;
use crate::escape::EscapeStyle;
use crate::format::TypedFormat;

/// A sub-template selected by data: the body of `[if]`, `[loop]` and `[use]`
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub path: DataPath,
    pub main: Template,
    /// The `[else]` part; empty when the directive had none
    pub otherwise: Template,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Literal text. Here-document text is `required` and survives whitespace elision.
    Static { text: String, required: bool },
    /// `{path}`, written through `escape`; `fallback` replaces an absent or null value
    Value {
        path: DataPath,
        escape: EscapeStyle,
        fallback: Option<String>,
    },
    /// `{path,kind,style}`
    Typed {
        path: DataPath,
        escape: EscapeStyle,
        format: TypedFormat,
    },
    /// `[apply out=fn(args)]`
    Apply {
        function: DataPath,
        out: Option<DataPath>,
        parameters: Vec<Parameter>,
    },
    If(Branch),
    Loop(Branch),
    Use(Branch),
    /// `[include path]`
    Include { handle: LazyTemplate },
    /// `[{bundle,key}]`
    Resource { handle: LazyTemplate },
    /// `[set ...]`; takes effect while parsing, renders nothing
    Set { settings: Vec<(String, String)> },
    /// `[* *]`, or `{* *}` when `value` is set
    Comment { value: bool },
    /// A nested template, e.g. a here-document body in inverted mode
    Template(Template),
}

impl Block {
    /// Blocks that write data-derived text. Layout whitespace next to them is kept.
    pub fn is_value_producing(&self) -> bool {
        matches!(
            self,
            Block::Value { .. } | Block::Typed { .. } | Block::Comment { value: true }
        )
    }

    /// Whitespace-only static text containing a line break, not from a here-document
    pub fn is_layout(&self) -> bool {
        match self {
            Block::Static {
                text,
                required: false,
            } => text.contains('\n') && text.chars().all(char::is_whitespace),
            _ => false,
        }
    }

    pub fn static_text(text: impl Into<String>) -> Self {
        Block::Static {
            text: text.into(),
            required: false,
        }
    }
}

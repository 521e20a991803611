//! Typed value formatting
//!
//!     A value interpolation may name a formatting kind after its path:
//!
//!         {when,date}                 medium date
//!         {when,datetime,short}       short date and time
//!         {when,datetime,long,short}  long date, short time
//!         {total,number,currency}     $1,234.50
//!         {ratio,number,#,##0.0%}     decimal pattern
//!         {n,format,>>F}%08.3f{F}     printf-style, the pattern given as a here-document
//!
//!     Styles are compiled when the template is parsed, so a malformed style is a parse
//!     failure rather than a render surprise. Names are English for every locale.

pub mod date;
pub mod number;
pub mod printf;

use crate::data::Value;
use date::{DatePart, DateStyle};
use number::NumberStyle;
use printf::PrintfFormat;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FormatError(pub String);

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        FormatError(message.into())
    }
}

/// A compiled formatter for one typed interpolation
#[derive(Debug, Clone, PartialEq)]
pub enum TypedFormat {
    Date(DateStyle),
    Time(DateStyle),
    DateTime(DateStyle),
    DateTime2(DateStyle, DateStyle),
    Number(NumberStyle),
    Format(PrintfFormat),
}

impl TypedFormat {
    /// Compile `kind` with its style arguments
    pub fn compile(kind: &str, styles: &[&str]) -> Result<Self, FormatError> {
        let style = |i: usize| styles.get(i).copied().filter(|s| !s.trim().is_empty());
        let max_styles = match kind {
            "datetime" => 2,
            "date" | "time" | "number" | "format" => 1,
            other => return Err(FormatError::new(format!("unknown format kind `{other}`"))),
        };
        if styles.len() > max_styles {
            return Err(FormatError::new(format!(
                "`{kind}` takes at most {max_styles} style argument(s)"
            )));
        }
        let date_style = |i: usize| style(i).map_or(Ok(DateStyle::Medium), DateStyle::parse);
        Ok(match kind {
            "date" => TypedFormat::Date(date_style(0)?),
            "time" => TypedFormat::Time(date_style(0)?),
            "datetime" if styles.len() == 2 => {
                TypedFormat::DateTime2(date_style(0)?, date_style(1)?)
            }
            "datetime" => TypedFormat::DateTime(date_style(0)?),
            "number" => TypedFormat::Number(style(0).map_or(Ok(NumberStyle::Number), NumberStyle::parse)?),
            _ => match style(0) {
                Some(pattern) => TypedFormat::Format(PrintfFormat::parse(pattern)?),
                None => return Err(FormatError::new("`format` needs a pattern")),
            },
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TypedFormat::Date(_) => "date",
            TypedFormat::Time(_) => "time",
            TypedFormat::DateTime(_) | TypedFormat::DateTime2(..) => "datetime",
            TypedFormat::Number(_) => "number",
            TypedFormat::Format(_) => "format",
        }
    }

    /// Format `value`; null formats to `None`.
    ///
    /// A value of the wrong shape (text that is not a number or a date) is written as plain
    /// text.
    pub fn format(&self, value: &Value) -> Option<String> {
        if value.is_null() {
            return None;
        }
        let formatted = match self {
            TypedFormat::Date(style) => date::format(value, &[(DatePart::Date, style)]),
            TypedFormat::Time(style) => date::format(value, &[(DatePart::Time, style)]),
            TypedFormat::DateTime(style) => {
                date::format(value, &[(DatePart::Date, style), (DatePart::Time, style)])
            }
            TypedFormat::DateTime2(d, t) => {
                date::format(value, &[(DatePart::Date, d), (DatePart::Time, t)])
            }
            TypedFormat::Number(style) => style.format(value),
            TypedFormat::Format(pattern) => pattern.format(value),
        };
        Some(formatted.unwrap_or_else(|| value.to_text()))
    }
}

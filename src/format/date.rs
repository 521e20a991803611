//! Date and time styles

use super::FormatError;
use crate::data::Value;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate};

/// A named style or a strftime pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStyle {
    Short,
    Medium,
    Long,
    Full,
    Iso,
    Pattern(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
}

impl DateStyle {
    pub fn parse(style: &str) -> Result<Self, FormatError> {
        let style = style.trim();
        Ok(match style.to_ascii_lowercase().as_str() {
            "short" => DateStyle::Short,
            "medium" | "default" => DateStyle::Medium,
            "long" => DateStyle::Long,
            "full" => DateStyle::Full,
            "iso" => DateStyle::Iso,
            _ if style.contains('%') => {
                if StrftimeItems::new(style).any(|item| matches!(item, Item::Error)) {
                    return Err(FormatError::new(format!("malformed date pattern `{style}`")));
                }
                DateStyle::Pattern(style.to_string())
            }
            _ => return Err(FormatError::new(format!("unknown date style `{style}`"))),
        })
    }

    fn pattern(&self, part: DatePart) -> &str {
        match (self, part) {
            (DateStyle::Short, DatePart::Date) => "%-m/%-d/%y",
            (DateStyle::Medium, DatePart::Date) => "%b %-d, %Y",
            (DateStyle::Long, DatePart::Date) => "%B %-d, %Y",
            (DateStyle::Full, DatePart::Date) => "%A, %B %-d, %Y",
            (DateStyle::Iso, DatePart::Date) => "%Y-%m-%d",
            (DateStyle::Short, DatePart::Time) => "%-I:%M %p",
            (DateStyle::Medium, DatePart::Time) => "%-I:%M:%S %p",
            (DateStyle::Long | DateStyle::Full, DatePart::Time) => "%-I:%M:%S %p %:z",
            (DateStyle::Iso, DatePart::Time) => "%H:%M:%S%:z",
            (DateStyle::Pattern(pattern), _) => pattern,
        }
    }
}

/// Interpret a value as a point in time: dates, RFC 3339 text, `YYYY-MM-DD` text (midnight
/// UTC) or epoch milliseconds
pub fn to_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Int(millis) => DateTime::from_timestamp_millis(*millis).map(|d| d.fixed_offset()),
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text).ok().or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc().fixed_offset())
            })
        }
        _ => None,
    }
}

/// Format the parts in order, space separated; ISO date and time join with `T`
pub fn format(value: &Value, parts: &[(DatePart, &DateStyle)]) -> Option<String> {
    let when = to_datetime(value)?;
    let iso_pair = parts.len() == 2 && parts.iter().all(|(_, s)| **s == DateStyle::Iso);
    let separator = if iso_pair { "T" } else { " " };
    let rendered: Vec<String> = parts
        .iter()
        .map(|(part, style)| when.format(style.pattern(*part)).to_string())
        .collect();
    Some(rendered.join(separator))
}

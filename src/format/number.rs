//! Number styles and decimal patterns
//!
//!     A decimal pattern is `prefix number suffix`, where the number part uses `0` for a
//!     required digit, `#` for an optional one, `,` for grouping and `.` for the fraction:
//!
//!         #,##0.00    1,234.50
//!         0.###       1234.5
//!         $#,##0      $1,235
//!         #0.0%       12.5%  (a `%` in the affixes scales by 100)
//!
//!     Rounding is half-even.

use super::FormatError;
use crate::data::Value;
use bigdecimal::BigDecimal;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberStyle {
    Integer,
    Number,
    Percent,
    Currency,
    Pattern(DecimalPattern),
}

impl NumberStyle {
    pub fn parse(style: &str) -> Result<Self, FormatError> {
        Ok(match style.trim().to_ascii_lowercase().as_str() {
            "integer" => NumberStyle::Integer,
            "number" | "default" => NumberStyle::Number,
            "percent" => NumberStyle::Percent,
            "currency" => NumberStyle::Currency,
            _ => NumberStyle::Pattern(DecimalPattern::parse(style)?),
        })
    }

    fn pattern(&self) -> DecimalPattern {
        let builtin = match self {
            NumberStyle::Integer => "#,##0",
            NumberStyle::Number => "#,##0.###",
            NumberStyle::Percent => "#,##0%",
            NumberStyle::Currency => "$#,##0.00",
            NumberStyle::Pattern(pattern) => return pattern.clone(),
        };
        DecimalPattern::builtin(builtin)
    }

    pub fn format(&self, value: &Value) -> Option<String> {
        Some(self.pattern().format(&to_decimal(value)?))
    }
}

/// Numbers, and text that reads as a number
pub fn to_decimal(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Int(i) => Some(BigDecimal::from(*i)),
        Value::Float(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPattern {
    prefix: String,
    suffix: String,
    min_int: usize,
    /// Zero means no grouping
    grouping: usize,
    min_frac: usize,
    max_frac: usize,
    percent: bool,
}

fn is_number_char(c: char) -> bool {
    matches!(c, '#' | '0' | ',' | '.')
}

impl DecimalPattern {
    fn builtin(pattern: &str) -> Self {
        Self::parse(pattern).expect("built-in decimal pattern")
    }

    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let malformed = |why: &str| FormatError::new(format!("malformed number pattern `{pattern}`: {why}"));
        let start = pattern.find(is_number_char).ok_or_else(|| malformed("no digits"))?;
        let end = pattern[start..]
            .find(|c| !is_number_char(c))
            .map_or(pattern.len(), |i| start + i);
        let (prefix, number, suffix) = (&pattern[..start], &pattern[start..end], &pattern[end..]);
        if suffix.contains(is_number_char) {
            return Err(malformed("digits after the suffix"));
        }
        let (int_part, frac_part) = match number.split_once('.') {
            Some((_, frac)) if frac.contains('.') => return Err(malformed("two decimal points")),
            Some((int, frac)) => (int, frac),
            None => (number, ""),
        };
        if frac_part.contains(',') {
            return Err(malformed("grouping in the fraction"));
        }
        if frac_part.trim_end_matches('#').contains('#') {
            return Err(malformed("`0` after `#` in the fraction"));
        }
        let int_digits = int_part.replace(',', "");
        if int_digits.trim_start_matches('#').contains('#') {
            return Err(malformed("`#` after `0` in the integer part"));
        }
        let grouping = match int_part.rfind(',') {
            Some(at) => int_part.len() - at - 1,
            None => 0,
        };
        if int_part.contains(',') && grouping == 0 {
            return Err(malformed("empty group"));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            min_int: int_digits.matches('0').count(),
            grouping,
            min_frac: frac_part.matches('0').count(),
            max_frac: frac_part.len(),
            percent: prefix.contains('%') || suffix.contains('%'),
        })
    }

    pub fn format(&self, value: &BigDecimal) -> String {
        let scaled = if self.percent {
            value * &BigDecimal::from(100)
        } else {
            value.clone()
        };
        let (negative, int_digits, frac_digits) = fixed_digits(&scaled, self.max_frac);

        let frac = frac_digits.trim_end_matches('0');
        let frac = if frac.len() < self.min_frac {
            &frac_digits[..self.min_frac]
        } else {
            frac
        };

        let int_digits = int_digits.trim_start_matches('0');
        let mut int = "0".repeat(self.min_int.saturating_sub(int_digits.len()));
        int.push_str(int_digits);
        if int.is_empty() && frac.is_empty() {
            int.push('0');
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&group(&int, self.grouping));
        if !frac.is_empty() {
            out.push('.');
            out.push_str(frac);
        }
        out.push_str(&self.suffix);
        out
    }
}

/// Sign, integer digits and exactly `scale` fraction digits of `value` rounded to `scale`
pub(super) fn fixed_digits(value: &BigDecimal, scale: usize) -> (bool, String, String) {
    let scale = scale as i64;
    let rounded = value.round(scale).with_scale(scale);
    let (unscaled, _) = rounded.as_bigint_and_exponent();
    let text = unscaled.to_string();
    let digits = text.trim_start_matches('-');
    let width = scale as usize + 1;
    let padded = if digits.len() < width {
        format!("{}{}", "0".repeat(width - digits.len()), digits)
    } else {
        digits.to_string()
    };
    let (int, frac) = padded.split_at(padded.len() - scale as usize);
    let negative = text.starts_with('-') && padded.bytes().any(|b| b != b'0');
    (negative, int.to_string(), frac.to_string())
}

pub(super) fn group(digits: &str, size: usize) -> String {
    if size == 0 || digits.len() <= size {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / size);
    let first = digits.len() % size;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + size - first) % size == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

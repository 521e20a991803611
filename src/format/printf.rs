//! printf-style patterns for the `format` kind
//!
//!     Supported conversions: `%s` (`%S` upper-cases), `%d`, `%f`, `%x`/`%X`, `%%` and `%n`.
//!     Flags: `-` left-justify, `0` zero-pad, `+` always sign, `,` group thousands. Width and
//!     `.precision` follow the flags. Every conversion formats the same interpolated value.

use super::number::{fixed_digits, group, to_decimal};
use super::FormatError;
use crate::data::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Text { upper: bool },
    Decimal,
    Float,
    Hex { upper: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    left: bool,
    zero: bool,
    plus: bool,
    grouping: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintfFormat {
    segments: Vec<Segment>,
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

impl PrintfFormat {
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let bad = |why: String| FormatError::new(format!("malformed format `{pattern}`: {why}"));
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }
            let (mut left, mut zero, mut plus, mut grouping) = (false, false, false, false);
            while let Some(flag) = chars.peek().copied() {
                match flag {
                    '-' => left = true,
                    '0' => zero = true,
                    '+' => plus = true,
                    ',' => grouping = true,
                    _ => break,
                }
                chars.next();
            }
            let width = take_number(&mut chars);
            let precision = if chars.peek() == Some(&'.') {
                chars.next();
                Some(take_number(&mut chars).ok_or_else(|| bad("missing precision".into()))?)
            } else {
                None
            };
            let conversion = match chars.next() {
                Some('%') | Some('n') if left || zero || plus || grouping || width.is_some() => {
                    return Err(bad("flags on `%%` or `%n`".into()))
                }
                Some('%') => {
                    literal.push('%');
                    continue;
                }
                Some('n') => {
                    literal.push('\n');
                    continue;
                }
                Some('s') => Conversion::Text { upper: false },
                Some('S') => Conversion::Text { upper: true },
                Some('d') => Conversion::Decimal,
                Some('f') => Conversion::Float,
                Some('x') => Conversion::Hex { upper: false },
                Some('X') => Conversion::Hex { upper: true },
                Some(other) => return Err(bad(format!("unknown conversion `%{other}`"))),
                None => return Err(bad("dangling `%`".into())),
            };
            let numeric = !matches!(conversion, Conversion::Text { .. });
            if left && zero {
                return Err(bad("`-` and `0` together".into()));
            }
            if (zero || left) && width.is_none() {
                return Err(bad("padding flag without a width".into()));
            }
            if !numeric && (zero || plus || grouping) {
                return Err(bad("numeric flag on `%s`".into()));
            }
            if precision.is_some() && matches!(conversion, Conversion::Decimal | Conversion::Hex { .. }) {
                return Err(bad("precision on an integer conversion".into()));
            }
            if grouping && matches!(conversion, Conversion::Hex { .. }) {
                return Err(bad("grouping on `%x`".into()));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(Placeholder {
                left,
                zero,
                plus,
                grouping,
                width: width.unwrap_or(0),
                precision,
                conversion,
            }));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// `None` when a numeric conversion meets a non-numeric value
    pub fn format(&self, value: &Value) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(spec) => out.push_str(&spec.format(value)?),
            }
        }
        Some(out)
    }
}

impl Placeholder {
    fn format(&self, value: &Value) -> Option<String> {
        let (negative, body) = match self.conversion {
            Conversion::Text { upper } => {
                let mut text = value.to_text();
                if let Some(max) = self.precision {
                    text = text.chars().take(max).collect();
                }
                if upper {
                    text = text.to_uppercase();
                }
                return Some(self.pad(String::new(), text));
            }
            Conversion::Decimal => {
                let (negative, int, _) = fixed_digits(&to_decimal(value)?, 0);
                (negative, self.group(int))
            }
            Conversion::Float => {
                let (negative, int, frac) =
                    fixed_digits(&to_decimal(value)?, self.precision.unwrap_or(6));
                let mut body = self.group(int);
                if !frac.is_empty() {
                    body.push('.');
                    body.push_str(&frac);
                }
                (negative, body)
            }
            Conversion::Hex { upper } => {
                let n = to_integer(value)?;
                let hex = if upper {
                    format!("{:X}", n as u64)
                } else {
                    format!("{:x}", n as u64)
                };
                (false, hex)
            }
        };
        let sign = if negative {
            "-"
        } else if self.plus {
            "+"
        } else {
            ""
        };
        Some(self.pad(sign.to_string(), body))
    }

    fn group(&self, int: String) -> String {
        let int = match int.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        };
        if self.grouping {
            group(&int, 3)
        } else {
            int
        }
    }

    fn pad(&self, sign: String, body: String) -> String {
        let len = sign.chars().count() + body.chars().count();
        let fill = self.width.saturating_sub(len);
        if self.left {
            format!("{sign}{body}{}", " ".repeat(fill))
        } else if self.zero {
            format!("{sign}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{sign}{body}", " ".repeat(fill))
        }
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::String(s) => s.trim().parse().ok(),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
        _ => None,
    }
}

//! Function parameters
//!
//!     `[apply fn(a, 'b', )]` compiles to a list of [`Parameter`]s: bare identifiers are data
//!     paths, quoted text is a literal, and an empty slot is null. At render time every
//!     parameter is bound against the current data, producing an [`Argument`].

use crate::data::{Data, DataPath, OptionalValue, Value};
use bigdecimal::BigDecimal;
use std::cmp::Ordering;
use std::str::FromStr;

/// An unbound positional parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Literal(String),
    Datum(DataPath),
    Null,
}

impl Parameter {
    pub fn bind(&self, data: &Data) -> Argument {
        match self {
            Parameter::Literal(text) => Argument::Literal(text.clone()),
            Parameter::Datum(path) => Argument::Datum {
                path: path.clone(),
                value: data.get_path(path),
            },
            Parameter::Null => Argument::Null,
        }
    }
}

/// A parameter bound to the data of one render
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(String),
    Datum { path: DataPath, value: OptionalValue },
    Null,
}

impl Argument {
    /// The bound value; absent data reads as null
    pub fn value(&self) -> Value {
        match self {
            Argument::Literal(text) => Value::String(text.clone()),
            Argument::Datum { value, .. } => value.clone().into_value(),
            Argument::Null => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value().is_null()
    }

    fn decimal(&self) -> Option<BigDecimal> {
        match self.value() {
            Value::Int(i) => Some(BigDecimal::from(i)),
            Value::Float(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
            Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Typed comparison.
    ///
    /// Two numeric arguments compare by decimal magnitude, anything else by text. Null sorts
    /// after every non-null value.
    pub fn compare(&self, other: &Argument) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        if let (Some(a), Some(b)) = (self.decimal(), other.decimal()) {
            return a.cmp(&b);
        }
        self.value().to_text().cmp(&other.value().to_text())
    }
}

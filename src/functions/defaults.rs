//! The default function map
//!
//!     Comparisons (`eq`, `ne`, `lt`, `le`, `gt`, `ge`) use the typed comparison of
//!     [`Argument::compare`]. Boolean helpers use `[if]` truthiness.

use super::paging::Page;
use super::{expect_arity, Argument, FunctionError, FunctionRegistry};
use crate::data::{Data, OptionalValue, Sequence, Value};
use crate::data::resolve::to_sequence;
use std::cmp::Ordering;

pub fn install(registry: &FunctionRegistry, page_size: usize) {
    registry.register("eq", |_: &Data, args: &[Argument]| compare(args, |o| o.is_eq()));
    registry.register("ne", |_: &Data, args: &[Argument]| compare(args, |o| o.is_ne()));
    registry.register("lt", |_: &Data, args: &[Argument]| compare(args, |o| o.is_lt()));
    registry.register("le", |_: &Data, args: &[Argument]| compare(args, |o| o.is_le()));
    registry.register("gt", |_: &Data, args: &[Argument]| compare(args, |o| o.is_gt()));
    registry.register("ge", |_: &Data, args: &[Argument]| compare(args, |o| o.is_ge()));
    registry.register("not", not);
    registry.register("and", and);
    registry.register("or", or);
    registry.register("empty", empty);
    registry.register("concat", concat);
    registry.register("upper", upper);
    registry.register("lower", lower);
    registry.register("size", size);
    registry.register(
        "page",
        Page {
            default_page_size: page_size,
        },
    );
}

fn compare(args: &[Argument], test: fn(Ordering) -> bool) -> Result<Value, FunctionError> {
    expect_arity(args, 2, 2)?;
    Ok(Value::Bool(test(args[0].compare(&args[1]))))
}

fn not(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, 1)?;
    Ok(Value::Bool(!args[0].value().is_truthy()))
}

fn and(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, usize::MAX)?;
    Ok(Value::Bool(args.iter().all(|a| a.value().is_truthy())))
}

fn or(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, usize::MAX)?;
    Ok(Value::Bool(args.iter().any(|a| a.value().is_truthy())))
}

fn length_of(value: Value) -> Option<usize> {
    match value {
        Value::Null => Some(0),
        Value::String(s) => Some(s.chars().count()),
        Value::Map(map) => Some(map.len()),
        other => match to_sequence(other) {
            Sequence::Single(_) => None,
            seq => Some(seq.len()),
        },
    }
}

/// True for absent or null data, empty text and empty collections
fn empty(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, 1)?;
    let is_empty = match &args[0] {
        Argument::Datum {
            value: OptionalValue::Absent,
            ..
        } => true,
        arg => length_of(arg.value()) == Some(0),
    };
    Ok(Value::Bool(is_empty))
}

fn concat(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    Ok(Value::String(
        args.iter().map(|a| a.value().to_text()).collect(),
    ))
}

fn upper(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, 1)?;
    Ok(Value::String(args[0].value().to_text().to_uppercase()))
}

fn lower(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, 1)?;
    Ok(Value::String(args[0].value().to_text().to_lowercase()))
}

fn size(_: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, 1)?;
    length_of(args[0].value())
        .map(Value::from)
        .ok_or_else(|| FunctionError::bad_argument(0, "value has no size"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPath;
    use crate::ast::Parameter;
    use rstest::rstest;
    use serde_json::json;

    fn call(name: &str, data: &Data, params: &[Parameter]) -> Result<Value, FunctionError> {
        let registry = FunctionRegistry::with_defaults(10);
        let args: Vec<Argument> = params.iter().map(|p| p.bind(data)).collect();
        registry.get(name).expect("default function").call(data, &args)
    }

    fn datum(path: &str) -> Parameter {
        Parameter::Datum(DataPath::parse(path))
    }

    fn lit(text: &str) -> Parameter {
        Parameter::Literal(text.to_string())
    }

    #[rstest]
    #[case("eq", "3", true)]
    #[case("ne", "3", false)]
    #[case("lt", "10", true)]
    #[case("ge", "2.5", true)]
    #[case("gt", "3.0", false)]
    fn test_comparisons(#[case] name: &str, #[case] other: &str, #[case] expected: bool) {
        let data = Data::from_json(json!({"n": 3}));
        let result = call(name, &data, &[datum("n"), lit(other)]);
        assert_eq!(result, Ok(Value::Bool(expected)));
    }

    #[test]
    fn test_wrong_arity_is_an_error() {
        let data = Data::empty();
        assert!(matches!(
            call("eq", &data, &[lit("a")]),
            Err(FunctionError::Arity { found: 1, .. })
        ));
    }

    #[test]
    fn test_empty() {
        let data = Data::from_json(json!({"list": [], "text": "x", "nothing": null}));
        assert_eq!(call("empty", &data, &[datum("list")]), Ok(Value::Bool(true)));
        assert_eq!(call("empty", &data, &[datum("text")]), Ok(Value::Bool(false)));
        assert_eq!(call("empty", &data, &[datum("nothing")]), Ok(Value::Bool(true)));
        assert_eq!(call("empty", &data, &[datum("missing")]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_text_helpers() {
        let data = Data::from_json(json!({"name": "Ann"}));
        assert_eq!(
            call("concat", &data, &[lit("Dear "), datum("name"), Parameter::Null]),
            Ok(Value::from("Dear Ann"))
        );
        assert_eq!(call("upper", &data, &[datum("name")]), Ok(Value::from("ANN")));
        assert_eq!(call("size", &data, &[datum("name")]), Ok(Value::Int(3)));
    }

    #[test]
    fn test_boolean_helpers() {
        let data = Data::from_json(json!({"yes": true, "no": "false"}));
        assert_eq!(call("not", &data, &[datum("no")]), Ok(Value::Bool(true)));
        assert_eq!(call("and", &data, &[datum("yes"), datum("no")]), Ok(Value::Bool(false)));
        assert_eq!(call("or", &data, &[datum("yes"), datum("no")]), Ok(Value::Bool(true)));
    }
}

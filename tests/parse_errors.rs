//! Parse failures carry the stencil and a position

use rstest::rstest;
use stencil::ast::Position;
use stencil::{Engine, InMemorySource, StencilError};

fn parse_error(text: &str) -> stencil::ParseError {
    let engine = Engine::new(InMemorySource::new());
    match engine.compile_str("/bad", text) {
        Err(StencilError::Parse(err)) => err,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[rstest]
#[case("[if a]x", "missing [end]", 1, 1)]
#[case("x\n  [else]", "[else] without an open [if], [loop] or [use]", 2, 3)]
#[case("[loop a][else][else][end]", "[else] without an open [if], [loop] or [use]", 1, 15)]
#[case("ok [end]", "[end] without an open block", 1, 4)]
#[case("[set colour=red]", "unknown setting `colour`", 1, 1)]
#[case("{rot13:x}", "unknown escape style `rot13`", 1, 1)]
#[case("\n\n{>>EOF} body", "here-document `EOF` is never closed", 3, 1)]
#[case("[loop]x[end]", "[loop] needs a data path, found ``", 1, 1)]
#[case("{d,date,sideways}", "unknown date style `sideways`", 1, 1)]
#[case("{n,number,0.#0}", "malformed number pattern `0.#0`", 1, 1)]
#[case("[{key}]", "[{key}] needs a default bundle", 1, 1)]
#[case("[apply f(a b)]", "unexpected `b` in arguments", 1, 1)]
#[case("[global mode=sideways]", "unknown global mode `sideways`", 1, 1)]
fn test_parse_errors(
    #[case] text: &str,
    #[case] message: &str,
    #[case] line: usize,
    #[case] column: usize,
) {
    let err = parse_error(text);
    assert_eq!(err.stencil, "/bad [en]");
    assert!(
        err.message.starts_with(message),
        "`{}` does not start with `{message}`",
        err.message
    );
    assert_eq!(err.position, Some(Position::new(line, column)));
}

#[test]
fn test_positions_are_stored_one_based() {
    let err = parse_error("[end]");
    assert_eq!(err.position, Some(Position::new(1, 1)));
    assert_eq!(err.to_string(), "/bad [en] at 1:1: [end] without an open block");
}

#[test]
fn test_display_is_one_based() {
    let err = parse_error("line\n  [end]");
    assert_eq!(err.to_string(), "/bad [en] at 2:3: [end] without an open block");
}

#[test]
fn test_unknown_directive_names_are_text() {
    let engine = Engine::new(InMemorySource::new());
    let template = engine.compile_str("/ok", "[iff x] {css { color: red }}").expect("compile");
    assert_eq!(template.blocks().len(), 1);
}

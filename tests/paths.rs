//! Source path normalisation

use rstest::rstest;
use stencil::error::StencilError;
use stencil::source::clean_path;

#[rstest]
#[case("foo//bat/.././bar/", "/foo/bar")]
#[case("../..//foo//bat//../bar/", "/foo/bar")]
#[case("mail\\welcome.stencil", "/mail/welcome")]
#[case("/a/./b.stencil", "/a/b")]
#[case(".stencil", "/.stencil")]
fn test_clean_path(#[case] raw: &str, #[case] expected: &str) {
    let path = clean_path(Some(raw), ".stencil").expect("clean path");
    assert_eq!(path.as_str(), expected);
}

#[rstest]
#[case(Some(""))]
#[case(Some("/"))]
#[case(Some("./.."))]
#[case(None)]
fn test_empty_paths_are_not_found(#[case] raw: Option<&str>) {
    assert!(matches!(
        clean_path(raw, ".stencil"),
        Err(StencilError::NotFound(_))
    ));
}

#[test]
fn test_resolve_against_directory() {
    let base = clean_path(Some("/mail/welcome"), ".stencil").expect("base");
    let resolve = |target: &str| {
        base.resolve(target, ".stencil")
            .expect("resolve")
            .to_string()
    };
    assert_eq!(resolve("footer"), "/mail/footer");
    assert_eq!(resolve("../parts/header.stencil"), "/parts/header");
    assert_eq!(resolve("/top"), "/top");
}

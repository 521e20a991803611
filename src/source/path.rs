//! Source path normalisation

use crate::error::{StencilError, StencilResult};
use std::fmt;

/// A clean absolute source path: `/`-separated, no empty, `.` or `..` segments, template
/// suffix removed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePath(String);

/// Normalise a path.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment (and is ignored at
/// the top), and `suffix` is stripped from the last segment. A path with nothing left is
/// not found.
pub fn clean_path(path: Option<&str>, suffix: &str) -> StencilResult<SourcePath> {
    let raw = path.ok_or_else(|| StencilError::not_found("(no path)"))?;
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment.trim() {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if let Some(last) = segments.last_mut() {
        let name: &str = *last;
        if !suffix.is_empty() && name.len() > suffix.len() && name.ends_with(suffix) {
            *last = &name[..name.len() - suffix.len()];
        }
    }
    if segments.is_empty() {
        return Err(StencilError::not_found(format!("`{raw}` names no stencil")));
    }
    Ok(SourcePath(format!("/{}", segments.join("/"))))
}

impl SourcePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory holding this path, with a trailing `/`
    pub fn directory(&self) -> &str {
        self.0.rfind('/').map_or("/", |at| &self.0[..=at])
    }

    /// Resolve `target` against this path's directory; targets starting with `/` are
    /// absolute
    pub fn resolve(&self, target: &str, suffix: &str) -> StencilResult<SourcePath> {
        if target.trim_start().starts_with('/') {
            clean_path(Some(target), suffix)
        } else {
            clean_path(Some(&format!("{}{}", self.directory(), target)), suffix)
        }
    }

    /// Segments without the leading `/`
    pub fn relative(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo//bat/.././bar/", "/foo/bar")]
    #[case("../..//foo//bat//../bar/", "/foo/bar")]
    #[case("/mail/welcome.stencil", "/mail/welcome")]
    #[case("a/./b/./c", "/a/b/c")]
    #[case(".stencil/x", "/.stencil/x")]
    fn test_clean(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            clean_path(Some(input), ".stencil").expect("clean").as_str(),
            expected
        );
    }

    #[rstest]
    #[case(Some(""))]
    #[case(Some("/"))]
    #[case(Some("./.."))]
    #[case(None)]
    fn test_nothing_left_is_not_found(#[case] input: Option<&str>) {
        assert!(matches!(
            clean_path(input, ".stencil"),
            Err(StencilError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve() {
        let base = clean_path(Some("/mail/welcome"), "").expect("clean");
        assert_eq!(base.directory(), "/mail/");
        assert_eq!(base.resolve("footer", "").expect("resolve").as_str(), "/mail/footer");
        assert_eq!(base.resolve("../shared/head", "").expect("resolve").as_str(), "/shared/head");
        assert_eq!(base.resolve("/top", "").expect("resolve").as_str(), "/top");
    }

    proptest! {
        #[test]
        fn cleaning_is_idempotent(raw in "[a-z./]{0,24}") {
            if let Ok(once) = clean_path(Some(&raw), "") {
                let twice = clean_path(Some(once.as_str()), "").expect("clean path stays valid");
                prop_assert_eq!(once, twice);
            }
        }
    }
}

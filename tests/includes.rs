//! `[include]` and `[{resource}]` against a directory of stencils and bundles

use serde_json::json;
use std::fs;
use std::path::Path;
use stencil::source::DirectorySource;
use stencil::{Data, Engine, Locale, RenderError, StencilError};
use tempfile::TempDir;

fn write(root: &Path, file: &str, text: &str) {
    let path = root.join(file);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).expect("create dir");
    }
    fs::write(path, text).expect("write file");
}

fn site() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();
    write(
        root,
        "mail/welcome.stencil",
        "[include /parts/header]\nWelcome, {name}!\n[{labels,signoff}]",
    );
    write(root, "parts/header.stencil", "== {site} ==");
    write(root, "parts/header_fr.stencil", "== {site} (fr) ==");
    write(root, "mail/nested.stencil", "[include ../parts/header][include welcome]");
    write(root, "mail/self.stencil", "x[include self]");
    write(root, "labels.properties", "# sign-offs\nsignoff = Regards, {site}\n");
    write(root, "labels_fr.properties", "signoff: Cordialement\n");
    write(root, "bad.properties", "sneaky=[include /parts/header]\n");
    write(root, "page.stencil", "[set bundle=bad][{sneaky}]");
    dir
}

fn data() -> Data {
    Data::from_json(json!({"name": "Ann", "site": "example.org"}))
}

#[test]
fn test_include_and_resource() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    let out = engine
        .render_to_string("/mail/welcome", &Locale::root(), &data())
        .expect("render");
    assert_eq!(out, "== example.org ==\nWelcome, Ann!\nRegards, example.org");
}

#[test]
fn test_locale_fallback_per_stencil() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    let out = engine
        .render_to_string("/mail/welcome", &Locale::parse("fr-CA"), &data())
        .expect("render");
    assert_eq!(out, "== example.org (fr) ==\nWelcome, Ann!\nCordialement");
}

#[test]
fn test_relative_includes_share_compiled_targets() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    let out = engine
        .render_to_string("/mail/nested", &Locale::root(), &data())
        .expect("render");
    assert!(out.starts_with("== example.org ===="));
    let header = engine.stencil("/parts/header", &Locale::root()).expect("header");
    let again = engine.stencil("parts/header.stencil", &Locale::root()).expect("header");
    assert!(std::sync::Arc::ptr_eq(&header, &again));
}

#[test]
fn test_self_include_hits_depth_limit() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    let err = engine
        .render_to_string("/mail/self", &Locale::root(), &Data::empty())
        .expect_err("too deep");
    assert!(matches!(err, RenderError::IncludeDepth { limit: 64, .. }));
}

#[test]
fn test_include_inside_message_fails_to_compile() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    let err = engine
        .render_to_string("/page", &Locale::root(), &Data::empty())
        .expect_err("include in message");
    match err {
        RenderError::Stencil(StencilError::Parse(parse)) => {
            assert_eq!(parse.stencil, "bad:sneaky");
            assert!(parse.message.contains("not allowed in message stencils"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_missing_sources() {
    let dir = site();
    let engine = Engine::new(DirectorySource::new(dir.path()));
    assert!(matches!(
        engine.stencil("/nowhere", &Locale::root()),
        Err(StencilError::NotFound(_))
    ));
    assert!(matches!(
        engine.message("labels", "nokey", &Locale::root()),
        Err(StencilError::NotFound(_))
    ));
}

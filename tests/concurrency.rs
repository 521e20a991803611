//! Concurrent first-time compiles share one parse

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use stencil::error::StorageError;
use stencil::source::SourcePath;
use stencil::{Data, Engine, InMemorySource, Locale, SourceProvider};

/// Counts source fetches and holds each one long enough for the other threads to pile up
struct SlowCountingSource {
    inner: InMemorySource,
    fetches: Arc<AtomicUsize>,
}

impl SourceProvider for SlowCountingSource {
    fn get_source(&self, path: &SourcePath, locale: &Locale) -> Result<Option<String>, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        self.inner.get_source(path, locale)
    }

    fn get_message(
        &self,
        bundle: &str,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<String>, StorageError> {
        self.inner.get_message(bundle, key, locale)
    }
}

fn engine(fetches: &Arc<AtomicUsize>) -> Engine {
    let mut inner = InMemorySource::new();
    inner
        .add("/page", "[loop xs]{value}[end]")
        .add("/other", "other");
    Engine::new(SlowCountingSource {
        inner,
        fetches: Arc::clone(fetches),
    })
}

#[test]
fn test_parallel_first_compiles_parse_once() {
    const THREADS: usize = 16;
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(&fetches);
    let barrier = Barrier::new(THREADS);

    let templates: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    engine.stencil("/page", &Locale::root()).expect("compile")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(templates.iter().all(|t| Arc::ptr_eq(t, &templates[0])));
}

#[test]
fn test_distinct_ids_compile_independently() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(&fetches);
    thread::scope(|scope| {
        scope.spawn(|| engine.stencil("/page", &Locale::root()).expect("page"));
        scope.spawn(|| engine.stencil("/other", &Locale::root()).expect("other"));
    });
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shared_template_renders_on_many_threads() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let engine = engine(&fetches);
    let template = engine.stencil("/page", &Locale::root()).expect("compile");
    thread::scope(|scope| {
        for n in 0..8i64 {
            let (engine, template) = (&engine, &template);
            scope.spawn(move || {
                let data = Data::from_json(serde_json::json!({"xs": [n, n]}));
                let mut out = String::new();
                engine.render(template, &data, &mut out).expect("render");
                assert_eq!(out, format!("{n}{n}"));
            });
        }
    });
}

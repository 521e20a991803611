//! Engine
//!
//!     The engine ties the pieces together: it owns the source provider, the escape and
//!     function registries, the configuration, and the compile cache. Everything in it is
//!     shareable between threads; an `Engine` behind an `Arc` serves any number of concurrent
//!     renders.
//!
//!         stencil / message       id for a path or bundle key, then `compile`
//!         compile                 cached, single-flight fetch + parse per id
//!         compile_str             parse text directly, bypassing source and cache
//!         render                  write a compiled template for one data scope
//!
//!     Registries are per engine. Two engines never see each other's escape styles or
//!     functions.

pub mod cache;

use crate::ast::Template;
use crate::config::EngineConfig;
use crate::data::Data;
use crate::error::{RenderResult, StencilError, StencilResult};
use crate::escape::EscapeRegistry;
use crate::functions::FunctionRegistry;
use crate::parsing::{parse, ParseOptions};
use crate::render::{Render, RenderContext, StencilCompiler};
use crate::source::{clean_path, Locale, SourceProvider, StencilId, StencilKind};
use cache::StencilCache;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct Engine {
    source: Box<dyn SourceProvider>,
    escapes: EscapeRegistry,
    functions: FunctionRegistry,
    config: EngineConfig,
    cache: StencilCache,
}

impl Engine {
    /// An engine with the default configuration
    pub fn new(source: impl SourceProvider + 'static) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: impl SourceProvider + 'static, config: EngineConfig) -> Self {
        Self {
            source: Box::new(source),
            escapes: EscapeRegistry::new(),
            functions: FunctionRegistry::with_defaults(config.page_size),
            config,
            cache: StencilCache::new(),
        }
    }

    /// Escape styles; register custom ones before compiling stencils that use them
    pub fn escapes(&self) -> &EscapeRegistry {
        &self.escapes
    }

    /// The fallback function map for `[apply]`
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The configured default locale
    pub fn default_locale(&self) -> Locale {
        Locale::parse(&self.config.locale)
    }

    /// Canonical name of the configured default escape style
    fn default_escape(&self) -> String {
        self.escapes
            .resolve(&self.config.escape)
            .map_or_else(|| self.config.escape.clone(), |style| style.name().to_string())
    }

    /// Id of the source stencil at `path`, with the configured defaults
    pub fn source_id(&self, path: &str, locale: &Locale) -> StencilResult<StencilId> {
        let path = clean_path(Some(path), &self.config.suffix)?;
        Ok(StencilId::source(
            path,
            locale.clone(),
            self.config.bundle.clone(),
            &self.default_escape(),
        ))
    }

    /// Compile the source stencil at `path`
    pub fn stencil(&self, path: &str, locale: &Locale) -> StencilResult<Arc<Template>> {
        self.compile(&self.source_id(path, locale)?)
    }

    /// Compile the message `key` of `bundle`
    pub fn message(&self, bundle: &str, key: &str, locale: &Locale) -> StencilResult<Arc<Template>> {
        let id = StencilId::message(bundle, key, locale.clone(), &self.default_escape());
        self.compile(&id)
    }

    /// Compile `id`, once; later calls with an equal id share the result
    pub fn compile(&self, id: &StencilId) -> StencilResult<Arc<Template>> {
        self.cache.get_or_compile(id, || {
            let text = self.fetch(id)?;
            self.parse(id, &text)
        })
    }

    /// Parse template text that does not come from the source provider. The result is not
    /// cached; includes inside it resolve relative to `name`.
    pub fn compile_str(&self, name: &str, text: &str) -> StencilResult<Template> {
        let id = self.source_id(name, &self.default_locale())?;
        self.parse(&id, text)
    }

    pub fn render(&self, template: &Template, data: &Data, out: &mut dyn fmt::Write) -> RenderResult<()> {
        let ctx = RenderContext::new(self, &self.functions, self.config.max_include_depth);
        template.render(&ctx, data, out)
    }

    /// Compile the stencil at `path` and render it to a string
    pub fn render_to_string(&self, path: &str, locale: &Locale, data: &Data) -> RenderResult<String> {
        let template = self.stencil(path, locale)?;
        let mut out = String::new();
        self.render(&template, data, &mut out)?;
        Ok(out)
    }

    fn fetch(&self, id: &StencilId) -> StencilResult<String> {
        debug!(stencil = %id, "fetching source");
        let found = match &id.kind {
            StencilKind::Source { path } => self.source.find_source(path, &id.locale),
            StencilKind::Message { bundle, key } => self.source.find_message(bundle, key, &id.locale),
        };
        found
            .map_err(|source| StencilError::Storage {
                stencil: id.to_string(),
                source,
            })?
            .ok_or_else(|| StencilError::not_found(id.to_string()))
    }

    fn parse(&self, id: &StencilId, text: &str) -> StencilResult<Template> {
        let options = ParseOptions::new(id, &self.escapes, &self.config.suffix);
        Ok(parse(text, &options)?)
    }
}

impl StencilCompiler for Engine {
    fn compile(&self, id: &StencilId) -> StencilResult<Arc<Template>> {
        Engine::compile(self, id)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("escapes", &self.escapes)
            .field("functions", &self.functions)
            .field("compiled", &self.cache.len())
            .finish()
    }
}

//! Rendering
//!
//!     A compiled [`Template`] writes itself to any [`fmt::Write`] sink, block by block. Blocks
//!     never change after parsing; everything that varies between renders lives in the
//!     [`Data`] passed down and in the [`RenderContext`]:
//!
//!         compiler        fetches and compiles include/resource targets on first use
//!         functions       the fallback function map for `[apply]`
//!         depth           current include/resource nesting, bounded by `max_depth`
//!
//!     Output already written when a render fails stays written. Render into a `String` first
//!     when the output must be all or nothing.

use crate::ast::{Block, Branch, LazyTemplate, Template};
use crate::data::resolve::{loop_entry, to_sequence};
use crate::data::{Data, DataPath, OptionalValue, Value};
use crate::error::{RenderError, RenderResult, StencilResult};
use crate::escape::EscapeStyle;
use crate::functions::{Argument, Function, FunctionError, FunctionRegistry};
use crate::source::StencilId;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Compiles the targets of `[include]` and `[{resource}]` on first use
pub trait StencilCompiler {
    fn compile(&self, id: &StencilId) -> StencilResult<Arc<Template>>;
}

/// Shared state of one render call
#[derive(Clone, Copy)]
pub struct RenderContext<'r> {
    compiler: &'r dyn StencilCompiler,
    functions: &'r FunctionRegistry,
    max_depth: usize,
    depth: usize,
}

impl<'r> RenderContext<'r> {
    pub fn new(
        compiler: &'r dyn StencilCompiler,
        functions: &'r FunctionRegistry,
        max_depth: usize,
    ) -> Self {
        Self {
            compiler,
            functions,
            max_depth,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn nested(&self, id: &StencilId) -> RenderResult<Self> {
        if self.depth >= self.max_depth {
            return Err(RenderError::IncludeDepth {
                stencil: id.to_string(),
                limit: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

/// Something that writes output for one data scope
pub trait Render {
    fn render(&self, ctx: &RenderContext<'_>, data: &Data, out: &mut dyn fmt::Write) -> RenderResult<()>;
}

impl Render for Template {
    fn render(&self, ctx: &RenderContext<'_>, data: &Data, out: &mut dyn fmt::Write) -> RenderResult<()> {
        for block in self.blocks() {
            block.render(ctx, data, out)?;
        }
        Ok(())
    }
}

impl Render for Block {
    fn render(&self, ctx: &RenderContext<'_>, data: &Data, out: &mut dyn fmt::Write) -> RenderResult<()> {
        match self {
            Block::Static { text, .. } => out.write_str(text)?,
            Block::Value {
                path,
                escape,
                fallback,
            } => {
                let text = match data.get_path(path) {
                    OptionalValue::Present(value) if !value.is_null() => Some(value.to_text()),
                    _ => fallback.clone(),
                };
                write_escaped(out, escape, text.as_deref())?;
            }
            Block::Typed {
                path,
                escape,
                format,
            } => {
                let text = data.get_path(path).value().and_then(|v| format.format(v));
                write_escaped(out, escape, text.as_deref())?;
            }
            Block::Apply {
                function,
                out: result,
                parameters,
            } => {
                let args: Vec<Argument> = parameters.iter().map(|p| p.bind(data)).collect();
                let value = lookup_function(ctx, data, function)?
                    .call(data, &args)
                    .map_err(|source| RenderError::Function {
                        function: function.to_string(),
                        source,
                    })?;
                if let Some(path) = result {
                    data.put_path(path, value);
                }
            }
            Block::If(branch) => {
                let truthy = data
                    .get_path(&branch.path)
                    .value()
                    .is_some_and(Value::is_truthy);
                pick(branch, truthy).render(ctx, data, out)?;
            }
            Block::Loop(branch) => render_loop(branch, ctx, data, out)?,
            Block::Use(branch) => match data.get_path(&branch.path) {
                OptionalValue::Present(value) => branch.main.render(ctx, &data.child(value), out)?,
                OptionalValue::Absent => branch.otherwise.render(ctx, data, out)?,
            },
            Block::Include { handle } | Block::Resource { handle } => {
                render_lazy(handle, ctx, data, out)?
            }
            Block::Set { .. } | Block::Comment { .. } => {}
            Block::Template(template) => template.render(ctx, data, out)?,
        }
        Ok(())
    }
}

fn write_escaped(out: &mut dyn fmt::Write, escape: &EscapeStyle, text: Option<&str>) -> fmt::Result {
    match text {
        Some(text) if !text.is_empty() => out.write_str(&escape.escape(Some(text))),
        _ => Ok(()),
    }
}

fn pick(branch: &Branch, main: bool) -> &Template {
    if main {
        &branch.main
    } else {
        &branch.otherwise
    }
}

/// Functions are looked up in the data first, then in the engine's function map
fn lookup_function(
    ctx: &RenderContext<'_>,
    data: &Data,
    path: &DataPath,
) -> RenderResult<Arc<dyn Function>> {
    let not_a_function = || RenderError::Function {
        function: path.to_string(),
        source: FunctionError::NotAFunction(path.to_string()),
    };
    match data.get_path(path) {
        OptionalValue::Present(Value::Function(f)) => Ok(f),
        OptionalValue::Present(value) if !value.is_null() => Err(not_a_function()),
        _ => ctx.functions.get(&path.to_string()).ok_or_else(not_a_function),
    }
}

fn render_loop(
    branch: &Branch,
    ctx: &RenderContext<'_>,
    data: &Data,
    out: &mut dyn fmt::Write,
) -> RenderResult<()> {
    let OptionalValue::Present(value) = data.get_path(&branch.path) else {
        return branch.otherwise.render(ctx, data, out);
    };
    let sequence = to_sequence(value);
    let size = sequence.len();
    if size == 0 {
        return branch.otherwise.render(ctx, data, out);
    }
    let parent = data.provider();
    for index in 0..size {
        let element = sequence.item(index).unwrap_or(Value::Null);
        let scope = Data::new(loop_entry(element, index, size, parent.clone()));
        branch.main.render(ctx, &scope, out)?;
    }
    Ok(())
}

fn render_lazy(
    handle: &LazyTemplate,
    ctx: &RenderContext<'_>,
    data: &Data,
    out: &mut dyn fmt::Write,
) -> RenderResult<()> {
    let nested = ctx.nested(handle.id())?;
    let template = handle.get_or_load(|id| ctx.compiler.compile(id))?;
    trace!(stencil = %handle.id(), depth = nested.depth, "rendering nested stencil");
    template.render(&nested, data, out)
}

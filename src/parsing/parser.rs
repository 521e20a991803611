//! Recursive-descent parser
//!
//!     Each call of `parse_blocks` consumes tokens for one (sub)template and carries what may
//!     end it:
//!
//!         Expect::Nothing     end of input only; `[else]` and `[end]` are errors
//!         Expect::Else        the main part of `[if]`/`[loop]`/`[use]`: ends at `[else]`;
//!                             an `[end]` is pushed back so the else part ends at once, empty
//!         Expect::End         the else part: ends at `[end]`
//!
//!     Running out of input while a terminator is expected is an error reported at the
//!     directive that opened the block.

use super::context::{ParseOptions, Scope};
use super::elision::elide;
use super::global::{prepare, Prepared};
use crate::ast::{Block, Branch, LazyTemplate, Parameter, SourceLocation, Template};
use crate::data::DataPath;
use crate::error::ParseError;
use crate::escape::EscapeStyle;
use crate::format::TypedFormat;
use crate::lexing::arguments::{parse_settings, tokenize, ArgToken};
use crate::lexing::{Matcher, Token};
use crate::source::StencilId;
use std::collections::HashMap;
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Nothing,
    Else,
    End,
}

/// Parse template text
pub fn parse(text: &str, options: &ParseOptions<'_>) -> Result<Template, ParseError> {
    let location = SourceLocation::new(text);
    let prepared = prepare(text).map_err(|err| {
        ParseError::new(options.id.to_string(), err.message.clone())
            .at(location.byte_to_position(text, err.offset))
    })?;

    let mut parser = Parser {
        options,
        original: text,
        location,
        prepared: &prepared,
        handles: HashMap::new(),
    };
    let mut scope = parser.initial_scope()?;
    let source: &str = &prepared.text;
    let mut matcher = if prepared.settings.inverted {
        Matcher::inverted(source)
    } else {
        Matcher::new(source)
    };
    let blocks = parser.parse_blocks(&mut matcher, &mut scope, Expect::Nothing, 0)?;
    trace!(stencil = %options.id, blocks = blocks.len(), "parsed");
    Ok(Template::new(options.id.to_string(), blocks))
}

struct Parser<'p, 'e> {
    options: &'p ParseOptions<'e>,
    original: &'p str,
    location: SourceLocation,
    prepared: &'p Prepared<'p>,
    /// One handle per referenced stencil
    handles: HashMap<StencilId, LazyTemplate>,
}

impl<'p, 'e> Parser<'p, 'e> {
    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let original = self.prepared.original_offset(offset);
        ParseError::new(self.options.id.to_string(), message)
            .at(self.location.byte_to_position(self.original, original))
    }

    fn initial_scope(&self) -> Result<Scope, ParseError> {
        let mut scope = Scope::initial(self.options).map_err(|m| self.error(0, m))?;
        let settings = &self.prepared.settings;
        if let Some(bundle) = &settings.bundle {
            scope.bundle = Some(bundle.clone());
        }
        if let Some(name) = &settings.escape {
            scope.escape = self.options.escape(name).map_err(|m| self.error(0, m))?;
        }
        Ok(scope)
    }

    fn parse_blocks<'t>(
        &mut self,
        matcher: &mut Matcher<'t>,
        scope: &mut Scope,
        expect: Expect,
        opened_at: usize,
    ) -> Result<Vec<Block>, ParseError> {
        let mut blocks = Vec::new();
        loop {
            let next = matcher
                .next_token()
                .map_err(|err| self.error(err.offset(), err.to_string()))?;
            let Some((token, span)) = next else {
                if expect != Expect::Nothing {
                    return Err(self.error(opened_at, "missing [end]"));
                }
                break;
            };
            match token {
                Token::Text(text) => blocks.push(Block::static_text(text)),
                Token::Comment { value } => blocks.push(Block::Comment { value }),
                Token::Value { escape, path, rest } => {
                    blocks.push(self.value(scope, escape, path, rest, span.start)?)
                }
                Token::Heredoc {
                    escape,
                    path,
                    kind,
                    styles,
                    body,
                    body_start,
                } => {
                    let body_range = body_start..body_start + body.len();
                    let block = if matcher.is_inverted() {
                        self.inverted_heredoc(matcher.source(), scope, escape, path, body_range, span)?
                    } else {
                        self.heredoc(scope, escape, path, kind, styles, body, span.start)?
                    };
                    blocks.push(block);
                }
                Token::Resource { first, second } => {
                    blocks.push(self.resource(scope, first, second, span.start)?)
                }
                Token::Directive { name: "else", .. } => match expect {
                    Expect::Else => break,
                    _ => {
                        return Err(self.error(span.start, "[else] without an open [if], [loop] or [use]"))
                    }
                },
                Token::Directive { name: "end", param } => match expect {
                    Expect::Nothing => return Err(self.error(span.start, "[end] without an open block")),
                    Expect::Else => {
                        matcher.push_back((Token::Directive { name: "end", param }, span));
                        break;
                    }
                    Expect::End => break,
                },
                Token::Directive { name, param } => {
                    let block = match name {
                        "if" | "loop" | "use" => self.branch(matcher, scope, name, param, span.start)?,
                        "apply" => self.apply(param, span.start)?,
                        "include" => self.include(scope, param, span.start)?,
                        "set" => self.set(scope, param, span.start)?,
                        other => return Err(self.error(span.start, format!("unknown directive [{other}]"))),
                    };
                    blocks.push(block);
                }
            }
        }
        elide(&mut blocks);
        Ok(blocks)
    }

    fn data_path(&self, text: &str, directive: &str, at: usize) -> Result<DataPath, ParseError> {
        let text = text.trim();
        let valid = !text.is_empty()
            && text
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(self.error(at, format!("[{directive}] needs a data path, found `{text}`")));
        }
        Ok(DataPath::parse(text))
    }

    fn branch<'t>(
        &mut self,
        matcher: &mut Matcher<'t>,
        scope: &Scope,
        name: &str,
        param: &str,
        at: usize,
    ) -> Result<Block, ParseError> {
        let path = self.data_path(param, name, at)?;
        let main = self.parse_blocks(matcher, &mut scope.clone(), Expect::Else, at)?;
        let otherwise = self.parse_blocks(matcher, &mut scope.clone(), Expect::End, at)?;
        let branch = Branch {
            path,
            main: self.sub_template(main),
            otherwise: self.sub_template(otherwise),
        };
        Ok(match name {
            "if" => Block::If(branch),
            "loop" => Block::Loop(branch),
            _ => Block::Use(branch),
        })
    }

    fn sub_template(&self, blocks: Vec<Block>) -> Template {
        Template::new(self.options.id.to_string(), blocks)
    }

    fn escape(&self, scope: &Scope, name: Option<&str>, at: usize) -> Result<EscapeStyle, ParseError> {
        match name {
            Some(name) => self.options.escape(name).map_err(|m| self.error(at, m)),
            None => Ok(scope.escape.clone()),
        }
    }

    /// Style arguments of a typed value: `datetime` takes two, every other kind one, which
    /// may itself contain commas
    fn styles<'s>(kind: &str, text: Option<&'s str>) -> Vec<&'s str> {
        match text.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(text) if kind == "datetime" => text.splitn(2, ',').map(str::trim).collect(),
            Some(text) => vec![text],
        }
    }

    fn typed(
        &self,
        path: DataPath,
        escape: EscapeStyle,
        kind: &str,
        styles: &[&str],
        at: usize,
    ) -> Result<Block, ParseError> {
        let format = TypedFormat::compile(kind, styles).map_err(|e| self.error(at, e.to_string()))?;
        Ok(Block::Typed {
            path,
            escape,
            format,
        })
    }

    fn value(
        &self,
        scope: &Scope,
        escape: Option<&str>,
        path: &str,
        rest: Option<&str>,
        at: usize,
    ) -> Result<Block, ParseError> {
        let escape = self.escape(scope, escape, at)?;
        let path = DataPath::parse(path);
        let rest = rest.map(str::trim).filter(|r| !r.is_empty());
        match rest {
            None => Ok(Block::Value {
                path,
                escape,
                fallback: None,
            }),
            Some(quoted) if quoted.starts_with('\'') => match tokenize(quoted).as_deref() {
                Ok([(ArgToken::Quoted(text), _)]) => Ok(Block::Value {
                    path,
                    escape,
                    fallback: Some(text.clone()),
                }),
                _ => Err(self.error(at, format!("malformed fallback `{quoted}`"))),
            },
            Some(rest) => {
                let (kind, styles) = match rest.split_once(',') {
                    Some((kind, styles)) => (kind.trim(), Some(styles)),
                    None => (rest, None),
                };
                self.typed(path, escape, kind, &Self::styles(kind, styles), at)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn heredoc(
        &self,
        scope: &Scope,
        escape: Option<&str>,
        path: Option<&str>,
        kind: Option<&str>,
        styles: Option<&str>,
        body: &str,
        at: usize,
    ) -> Result<Block, ParseError> {
        let escape = self.escape(scope, escape, at)?;
        let Some(path) = path else {
            return Ok(Block::Static {
                text: escape.escape(Some(body)),
                required: true,
            });
        };
        let path = DataPath::parse(path);
        match kind {
            None => Ok(Block::Value {
                path,
                escape,
                fallback: Some(body.to_string()),
            }),
            Some(kind) => {
                let mut all = Self::styles(kind, styles);
                all.push(body);
                self.typed(path, escape, kind, &all, at)
            }
        }
    }

    /// In inverted mode the here-document body is ordinary template text
    fn inverted_heredoc(
        &mut self,
        source: &str,
        scope: &Scope,
        escape: Option<&str>,
        path: Option<&str>,
        body: Range<usize>,
        span: Range<usize>,
    ) -> Result<Block, ParseError> {
        if path.is_some() {
            return Err(self.error(span.start, "value here-documents are not available in inverted mode"));
        }
        let mut inner = scope.clone();
        inner.escape = self.escape(scope, escape, span.start)?;
        let mut matcher = Matcher::within(source, body);
        let blocks = self.parse_blocks(&mut matcher, &mut inner, Expect::Nothing, span.start)?;
        Ok(Block::Template(self.sub_template(blocks)))
    }

    fn handle(&mut self, id: StencilId) -> LazyTemplate {
        self.handles
            .entry(id)
            .or_insert_with_key(|id| LazyTemplate::new(id.clone()))
            .clone()
    }

    fn resource(
        &mut self,
        scope: &Scope,
        first: &str,
        second: Option<&str>,
        at: usize,
    ) -> Result<Block, ParseError> {
        let (bundle, key) = match second {
            Some(key) => (first.to_string(), key),
            None => match &scope.bundle {
                Some(bundle) => (bundle.clone(), first),
                None => return Err(self.error(at, format!("[{{{first}}}] needs a default bundle"))),
            },
        };
        let id = StencilId::message(&bundle, key, self.options.id.locale.clone(), scope.escape.name());
        Ok(Block::Resource {
            handle: self.handle(id),
        })
    }

    fn include(&mut self, scope: &Scope, param: &str, at: usize) -> Result<Block, ParseError> {
        let Some(base) = self.options.id.path() else {
            return Err(self.error(at, "[include] is not allowed in message stencils"));
        };
        let target = param.trim();
        if target.is_empty() {
            return Err(self.error(at, "[include] needs a path"));
        }
        let path = base
            .resolve(target, self.options.suffix)
            .map_err(|_| self.error(at, format!("include path `{target}` names no stencil")))?;
        let id = StencilId::source(
            path,
            self.options.id.locale.clone(),
            scope.bundle.clone(),
            scope.escape.name(),
        );
        Ok(Block::Include {
            handle: self.handle(id),
        })
    }

    fn set(&self, scope: &mut Scope, param: &str, at: usize) -> Result<Block, ParseError> {
        let settings = parse_settings(param).map_err(|m| self.error(at, m))?;
        if settings.is_empty() {
            return Err(self.error(at, "[set] needs at least one setting"));
        }
        for (key, value) in &settings {
            scope
                .apply(self.options, key, value)
                .map_err(|m| self.error(at, m))?;
        }
        Ok(Block::Set { settings })
    }

    fn apply(&self, param: &str, at: usize) -> Result<Block, ParseError> {
        let fail = |message: String| self.error(at, message);
        let tokens = tokenize(param)
            .map_err(|span| fail(format!("unexpected `{}` in [apply]", &param[span])))?;
        let mut tokens = tokens.into_iter().map(|(t, _)| t).peekable();

        let first = match tokens.next() {
            Some(ArgToken::Word(word)) => word,
            _ => return Err(fail("[apply] needs a function".into())),
        };
        let (out, function) = if tokens.peek() == Some(&ArgToken::Equals) {
            tokens.next();
            match tokens.next() {
                Some(ArgToken::Word(function)) => (Some(DataPath::parse(&first)), function),
                _ => return Err(fail(format!("expected a function after `{first}=`"))),
            }
        } else {
            (None, first)
        };

        let mut parameters = Vec::new();
        match tokens.next() {
            None => {}
            Some(ArgToken::OpenParen) => {
                let mut slot: Option<Parameter> = None;
                let mut separated = false;
                loop {
                    match tokens.next() {
                        Some(ArgToken::CloseParen) => {
                            if slot.is_some() || separated {
                                parameters.push(slot.take().unwrap_or(Parameter::Null));
                            }
                            break;
                        }
                        Some(ArgToken::Comma) => {
                            parameters.push(slot.take().unwrap_or(Parameter::Null));
                            separated = true;
                        }
                        Some(ArgToken::Word(word)) if slot.is_none() => {
                            slot = Some(Parameter::Datum(DataPath::parse(&word)))
                        }
                        Some(ArgToken::Quoted(text)) if slot.is_none() => {
                            slot = Some(Parameter::Literal(text))
                        }
                        Some(other) => return Err(fail(format!("unexpected {other} in arguments"))),
                        None => return Err(fail("missing `)` in [apply]".into())),
                    }
                }
                if let Some(extra) = tokens.next() {
                    return Err(fail(format!("unexpected {extra} after arguments")));
                }
            }
            Some(other) => return Err(fail(format!("expected `(`, found {other}"))),
        }

        Ok(Block::Apply {
            function: DataPath::parse(&function),
            out,
            parameters,
        })
    }
}

/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template parser.
//!
//! A single left-to-right recursive-descent scan over the template source.
//! Literal runs are collected between `{{ ... }}` markers; when a block
//! opener (`{{#if}}`, `{{#unless}}`, `{{#each}}`) is found, the parser
//! recurses into the text that follows it and returns once it meets the
//! closer for that block at the same nesting level. Nesting therefore
//! works the same way whichever directive types are combined.

use crate::ast::{Block, BlockKind, Literal, Span, TemplateNode, VariableRef};
use crate::error::{TemplateError, TemplateResult};

/// Blocks nested deeper than this are rejected at parse time.
const MAX_NESTING: usize = 256;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A compiled template ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The parsed template AST.
    pub(crate) nodes: Vec<TemplateNode>,

    /// Original source text.
    pub(crate) source: String,
}

impl Template {
    /// Compile a template from source text.
    ///
    /// # Returns
    /// A compiled template, or a [`TemplateError::ParseError`] describing
    /// the first structural problem found.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        let mut parser = Parser::new(source);
        let nodes = parser.parse_sequence(None)?.0;

        Ok(Template {
            nodes,
            source: source.to_string(),
        })
    }

    /// Get the AST nodes of this template.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Get the source text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A classified `{{ ... }}` marker.
#[derive(Debug, PartialEq)]
enum Tag<'s> {
    Variable(&'s str),
    Open(BlockKind, &'s str),
    Close(BlockKind),
}

struct Parser<'s> {
    source: &'s str,
    pos: usize,
    depth: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse nodes until end of input (top level) or until the closer of
    /// `enclosing`. Returns the nodes and the offset just past the closer.
    fn parse_sequence(
        &mut self,
        enclosing: Option<(BlockKind, usize)>,
    ) -> TemplateResult<(Vec<TemplateNode>, usize)> {
        let mut nodes = Vec::new();

        loop {
            let rest = &self.source[self.pos..];
            let Some(rel) = rest.find(OPEN) else {
                self.push_literal(&mut nodes, self.source.len());
                return match enclosing {
                    Some((kind, opened_at)) => Err(self.error_at(
                        opened_at,
                        format!(
                            "unclosed {{{{#{0}}}}} block (missing {{{{/{0}}}}})",
                            kind.keyword()
                        ),
                    )),
                    None => Ok((nodes, self.source.len())),
                };
            };

            let tag_start = self.pos + rel;
            self.push_literal(&mut nodes, tag_start);

            let inner_start = tag_start + OPEN.len();
            let Some(close_rel) = self.source[inner_start..].find(CLOSE) else {
                return Err(self.error_at(tag_start, "unterminated tag (missing '}}')"));
            };
            let inner_end = inner_start + close_rel;
            let tag_end = inner_end + CLOSE.len();
            let inner = &self.source[inner_start..inner_end];

            match classify_tag(inner).map_err(|msg| self.error_at(tag_start, msg))? {
                Tag::Variable(path) => {
                    nodes.push(TemplateNode::Variable(VariableRef::new(
                        path,
                        Span::new(tag_start, tag_end),
                    )));
                    self.pos = tag_end;
                }

                Tag::Open(kind, path) => {
                    if self.depth >= MAX_NESTING {
                        return Err(self.error_at(
                            tag_start,
                            format!("blocks nested deeper than {} levels", MAX_NESTING),
                        ));
                    }
                    let path_start = inner_start + (inner.len() - path.len());
                    let subject =
                        VariableRef::new(path, Span::new(path_start, path_start + path.len()));

                    self.pos = tag_end;
                    self.depth += 1;
                    let (body, block_end) = self.parse_sequence(Some((kind, tag_start)))?;
                    self.depth -= 1;

                    let block = Block {
                        subject,
                        body,
                        span: Span::new(tag_start, block_end),
                    };
                    nodes.push(match kind {
                        BlockKind::If => TemplateNode::Conditional(block),
                        BlockKind::Unless => TemplateNode::Negation(block),
                        BlockKind::Each => TemplateNode::Iteration(block),
                    });
                }

                Tag::Close(kind) => {
                    return match enclosing {
                        Some((open_kind, _)) if open_kind == kind => {
                            self.pos = tag_end;
                            Ok((nodes, tag_end))
                        }
                        Some((open_kind, opened_at)) => {
                            let (line, column) = line_column(self.source, opened_at);
                            Err(self.error_at(
                                tag_start,
                                format!(
                                    "found {{{{/{}}}}} but the {{{{#{}}}}} block opened at line {}, column {} is still open",
                                    kind.keyword(),
                                    open_kind.keyword(),
                                    line,
                                    column
                                ),
                            ))
                        }
                        None => Err(self.error_at(
                            tag_start,
                            format!(
                                "unmatched {{{{/{0}}}}} with no open {{{{#{0}}}}} block",
                                kind.keyword()
                            ),
                        )),
                    };
                }
            }
        }
    }

    fn push_literal(&mut self, nodes: &mut Vec<TemplateNode>, end: usize) {
        if end > self.pos {
            nodes.push(TemplateNode::Literal(Literal {
                text: self.source[self.pos..end].to_string(),
                span: Span::new(self.pos, end),
            }));
        }
        self.pos = end;
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> TemplateError {
        let (line, column) = line_column(self.source, offset);
        TemplateError::ParseError {
            message: format!("line {}, column {}: {}", line, column, message.into()),
        }
    }
}

/// Classify the text between `{{` and `}}`.
fn classify_tag(inner: &str) -> Result<Tag<'_>, String> {
    if let Some(rest) = inner.strip_prefix('#') {
        let (keyword, path) = match rest.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((keyword, path)) => (keyword, path.trim_start()),
            None => (rest, ""),
        };
        let kind = BlockKind::from_keyword(keyword)
            .ok_or_else(|| format!("unknown block directive '{{{{#{}}}}}'", keyword))?;
        if path.is_empty() {
            return Err(format!("missing path in '{{{{#{}}}}}'", keyword));
        }
        if !is_valid_path(path) {
            return Err(format!(
                "invalid path '{}' in '{{{{#{}}}}}'",
                path, keyword
            ));
        }
        return Ok(Tag::Open(kind, path));
    }

    if let Some(keyword) = inner.strip_prefix('/') {
        return BlockKind::from_keyword(keyword)
            .map(Tag::Close)
            .ok_or_else(|| format!("unknown closing directive '{{{{/{}}}}}'", keyword));
    }

    if is_valid_path(inner) {
        Ok(Tag::Variable(inner))
    } else {
        Err(format!("malformed directive '{{{{{}}}}}'", inner))
    }
}

/// A path is `[@\w][\w.]*` with ASCII word characters.
pub(crate) fn is_valid_path(path: &str) -> bool {
    let mut chars = path.chars();
    match chars.next() {
        Some(first) if first == '@' || is_word_char(first) => {
            chars.all(|c| c == '.' || is_word_char(c))
        }
        _ => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// 1-based line and column (in characters) of a byte offset.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template AST types.
//!
//! This module defines the abstract syntax tree for parsed templates.
//! Each node records the byte range of the source it came from so that
//! diagnostics can point back at the template text.

/// A byte range in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A node in the template AST.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Literal text to be output as-is.
    Literal(Literal),

    /// Variable interpolation: `{{var}}` or `{{obj.field}}`
    Variable(VariableRef),

    /// Conditional block: `{{#if var}}...{{/if}}`
    Conditional(Block),

    /// Negated conditional block: `{{#unless var}}...{{/unless}}`
    Negation(Block),

    /// Iteration block: `{{#each var}}...{{/each}}`
    Iteration(Block),
}

impl TemplateNode {
    /// Source range of this node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Literal(lit) => lit.span,
            TemplateNode::Variable(var) => var.span,
            TemplateNode::Conditional(block)
            | TemplateNode::Negation(block)
            | TemplateNode::Iteration(block) => block.span,
        }
    }
}

/// Literal text node.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The literal text content.
    pub text: String,
    /// Source location of this literal.
    pub span: Span,
}

/// Which block directive a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    If,
    Unless,
    Each,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::If, BlockKind::Unless, BlockKind::Each];

    /// Keyword used in the markers (`{{#if ..}}` / `{{/if}}`).
    pub fn keyword(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
            BlockKind::Each => "each",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        BlockKind::ALL.into_iter().find(|k| k.keyword() == keyword)
    }
}

/// The three block directives share one shape: a subject path and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The path tested (if/unless) or iterated (each).
    pub subject: VariableRef,
    /// Nodes between the opening and closing markers.
    pub body: Vec<TemplateNode>,
    /// Source location from the opening marker through the closer.
    pub span: Span,
}

/// A reference to a variable by dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    /// The path as written (e.g., `employee.salary`, `@index`, `this`).
    pub path: String,
    /// Source location of this variable reference.
    pub span: Span,
}

impl VariableRef {
    pub fn new(path: impl Into<String>, span: Span) -> Self {
        Self {
            path: path.into(),
            span,
        }
    }

    /// Whether this path names a loop-local binding (`this`, `this.x`, `@index`, ...).
    pub fn is_loop_local(&self) -> bool {
        is_loop_local(&self.path)
    }
}

/// Loop-local paths: `this`, `this.*` and anything starting with `@`.
pub(crate) fn is_loop_local(path: &str) -> bool {
    path.starts_with('@') || path == "this" || path.starts_with("this.")
}

/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive-based text template engine for Quarto reports and manifests.
//!
//! Templates are plain text with `{{ ... }}` directives:
//!
//! - Variable interpolation: `{{name}}`
//! - Nested field access: `{{project.owner.name}}`
//! - Conditionals: `{{#if path}}...{{/if}}`
//! - Negated conditionals: `{{#unless path}}...{{/unless}}`
//! - Iteration: `{{#each path}}...{{/each}}`, with the loop-local bindings
//!   `this`, `@index`, `@first`, `@last` and `@length` inside the body
//!
//! # Architecture
//!
//! A template is parsed once, at registration, into an AST by a single
//! recursive-descent pass ([`parser`]). Rendering walks that AST against a
//! stack of variable frames ([`scope`]) and never touches the source text
//! again. Named templates live in a [`TemplateStore`] owned by a
//! [`TemplateEngine`]; there is no process-wide registry.
//!
//! Missing data is handled per [`RenderOptions`]: lenient mode (the default)
//! substitutes a default value or empty output and keeps going, strict mode
//! fails the whole render.
//!
//! # Example
//!
//! ```
//! use quarto_reporttemplate::{TemplateContext, TemplateEngine};
//!
//! let engine = TemplateEngine::new();
//! engine.register_template("greeting", "Hello {{name}}!")?;
//!
//! let mut ctx = TemplateContext::new();
//! ctx.insert("name", "World");
//!
//! assert_eq!(engine.render("greeting", &ctx)?, "Hello World!");
//! # Ok::<(), quarto_reporttemplate::TemplateError>(())
//! ```

pub mod ast;
pub mod builtin;
pub mod context;
pub mod engine;
pub mod error;
pub mod eval_context;
pub mod evaluator;
pub mod options;
pub mod parser;
pub mod scope;
pub mod stats;
pub mod store;
pub mod validator;

// Re-export main types at crate root
pub use ast::{Block, BlockKind, Literal, Span, TemplateNode, VariableRef};
pub use context::{TemplateContext, TemplateValue};
pub use engine::{RenderRequest, TemplateEngine};
pub use error::{TemplateError, TemplateResult};
pub use eval_context::{DiagnosticCollector, EvalContext, RenderWarning, WarningKind};
pub use evaluator::RenderReport;
pub use options::{DEFAULT_MAX_DEPTH, RenderOptions};
pub use parser::Template;
pub use scope::{LoopFrame, Scope};
pub use stats::TemplateStats;
pub use store::TemplateStore;
pub use validator::{ValidationReport, validate_source};

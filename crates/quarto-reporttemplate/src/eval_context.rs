/*
 * eval_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluation context for template rendering.
//!
//! This module provides [`EvalContext`], which is threaded through all evaluation
//! functions to support:
//!
//! 1. **Diagnostics**: Collect lenient-mode degradations with source locations
//! 2. **State tracking**: Block nesting depth for recursion protection
//! 3. **Configuration**: The [`RenderOptions`] in effect for this render

use std::fmt;

use crate::ast::Span;
use crate::error::{TemplateError, TemplateResult};
use crate::options::RenderOptions;

/// What the evaluator substituted for data it could not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A variable resolved to nothing and the default value was emitted.
    MissingVariable,
    /// An `{{#each}}` target was not a list and the block was skipped.
    NotIterable,
}

/// A lenient-mode degradation recorded during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    pub kind: WarningKind,
    /// The path as written in the template.
    pub path: String,
    /// Where the offending directive sits in the template source.
    pub span: Span,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::MissingVariable => write!(f, "missing variable '{}'", self.path),
            WarningKind::NotIterable => write!(f, "'{}' is not iterable", self.path),
        }
    }
}

/// Collector for warnings produced during template evaluation.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    warnings: Vec<RenderWarning>,
}

impl DiagnosticCollector {
    /// Create a new empty diagnostic collector.
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Add a warning.
    pub fn add(&mut self, warning: RenderWarning) {
        self.warnings.push(warning);
    }

    /// Get a reference to the collected warnings.
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Consume the collector and return the warnings, sorted by source location.
    pub fn into_warnings(mut self) -> Vec<RenderWarning> {
        self.warnings.sort_by_key(|w| w.span.start);
        self.warnings
    }

    /// Check if the collector is empty.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Context for template evaluation.
///
/// This struct is threaded through all evaluation functions to:
/// 1. Collect warnings with source locations
/// 2. Track the current block nesting depth
/// 3. Decide, per the options, whether missing data is an error
#[derive(Debug)]
pub struct EvalContext<'o> {
    /// Options for this render.
    pub options: &'o RenderOptions,

    /// Degradations recorded so far.
    pub diagnostics: DiagnosticCollector,

    /// Current block nesting depth.
    pub depth: usize,

    /// Template name, used in log events.
    pub template_name: Option<&'o str>,
}

impl<'o> EvalContext<'o> {
    /// Create a new evaluation context with the given options.
    pub fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            diagnostics: DiagnosticCollector::new(),
            depth: 0,
            template_name: None,
        }
    }

    /// Attach a template name for log events.
    pub fn with_template_name(mut self, name: &'o str) -> Self {
        self.template_name = Some(name);
        self
    }

    /// Enter a block body. Fails once the nesting limit is exceeded.
    pub fn enter_block(&mut self) -> TemplateResult<()> {
        if self.depth >= self.options.max_depth {
            return Err(TemplateError::DepthExceeded {
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a block body entered with [`EvalContext::enter_block`].
    pub fn exit_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Handle a variable that resolved to nothing.
    ///
    /// In strict mode this is a [`TemplateError::MissingVariable`]; otherwise
    /// a warning is recorded and the default value is returned for output.
    pub fn missing_variable(&mut self, path: &str, span: Span) -> TemplateResult<&'o str> {
        if self.options.strict {
            return Err(TemplateError::MissingVariable {
                path: path.to_string(),
            });
        }
        self.degrade(WarningKind::MissingVariable, path, span);
        Ok(self.options.default_value.as_str())
    }

    /// Handle an `{{#each}}` target that is not a list.
    ///
    /// In strict mode this is a [`TemplateError::NotIterable`]; otherwise a
    /// warning is recorded and the block renders nothing.
    pub fn not_iterable(&mut self, path: &str, span: Span) -> TemplateResult<()> {
        if self.options.strict {
            return Err(TemplateError::NotIterable {
                path: path.to_string(),
            });
        }
        self.degrade(WarningKind::NotIterable, path, span);
        Ok(())
    }

    fn degrade(&mut self, kind: WarningKind, path: &str, span: Span) {
        let warning = RenderWarning {
            kind,
            path: path.to_string(),
            span,
        };
        if self.options.report_degradations {
            tracing::warn!(
                template = self.template_name.unwrap_or("<inline>"),
                offset = span.start,
                "{}",
                warning
            );
        }
        self.diagnostics.add(warning);
    }

    /// Consume the context and return collected warnings.
    pub fn into_warnings(self) -> Vec<RenderWarning> {
        self.diagnostics.into_warnings()
    }
}

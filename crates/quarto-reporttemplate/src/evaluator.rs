/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template evaluation engine.
//!
//! This module implements the evaluation of parsed templates against a context.
//! Evaluation is a depth-first walk over the AST that appends to a single
//! output buffer; `{{#each}}` bodies are re-evaluated once per element with a
//! loop frame pushed onto the [`Scope`].

use std::borrow::Cow;

use crate::ast::{Block, Literal, TemplateNode};
use crate::context::{TemplateContext, TemplateValue};
use crate::error::TemplateResult;
use crate::eval_context::{EvalContext, RenderWarning};
use crate::options::RenderOptions;
use crate::parser::Template;
use crate::scope::{LoopFrame, Scope};

/// Output of a render together with the degradations made to produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub output: String,
    /// Lenient-mode substitutions, in source order. Always empty in strict
    /// mode, where they are errors instead.
    pub warnings: Vec<RenderWarning>,
}

impl Template {
    /// Render this template with the given context.
    ///
    /// # Arguments
    /// * `context` - The variable context for evaluation
    /// * `options` - Strictness, default value and depth limit
    ///
    /// # Returns
    /// The rendered output string, or an error if evaluation fails. No
    /// partial output is returned on error.
    pub fn render(
        &self,
        context: &TemplateContext,
        options: &RenderOptions,
    ) -> TemplateResult<String> {
        Ok(self.render_report(context, options)?.output)
    }

    /// Render this template and also return the lenient-mode warnings.
    pub fn render_report(
        &self,
        context: &TemplateContext,
        options: &RenderOptions,
    ) -> TemplateResult<RenderReport> {
        self.render_in(context, EvalContext::new(options))
    }

    pub(crate) fn render_in(
        &self,
        context: &TemplateContext,
        mut eval_ctx: EvalContext<'_>,
    ) -> TemplateResult<RenderReport> {
        let mut scope = Scope::new(context);
        let mut output = String::with_capacity(self.source.len());
        evaluate(&self.nodes, &mut scope, &mut eval_ctx, &mut output)?;
        Ok(RenderReport {
            output,
            warnings: eval_ctx.into_warnings(),
        })
    }
}

/// Evaluate a list of template nodes, appending to `out`.
pub fn evaluate<'a>(
    nodes: &[TemplateNode],
    scope: &mut Scope<'a>,
    ctx: &mut EvalContext<'_>,
    out: &mut String,
) -> TemplateResult<()> {
    for node in nodes {
        evaluate_node(node, scope, ctx, out)?;
    }
    Ok(())
}

/// Evaluate a single template node.
fn evaluate_node<'a>(
    node: &TemplateNode,
    scope: &mut Scope<'a>,
    ctx: &mut EvalContext<'_>,
    out: &mut String,
) -> TemplateResult<()> {
    match node {
        TemplateNode::Literal(Literal { text, .. }) => {
            out.push_str(text);
            Ok(())
        }

        TemplateNode::Variable(var) => {
            match scope.resolve(&var.path) {
                // An explicit null is treated the same as an absent value
                Some(value) if !value.is_null() => out.push_str(&value.render()),
                _ => out.push_str(ctx.missing_variable(&var.path, var.span)?),
            }
            Ok(())
        }

        TemplateNode::Conditional(block) => evaluate_conditional(block, true, scope, ctx, out),

        TemplateNode::Negation(block) => evaluate_conditional(block, false, scope, ctx, out),

        TemplateNode::Iteration(block) => evaluate_iteration(block, scope, ctx, out),
    }
}

/// Evaluate an `{{#if}}` (`expected == true`) or `{{#unless}}` block.
///
/// The body sees the same scope as the block itself; no frame is pushed.
fn evaluate_conditional<'a>(
    block: &Block,
    expected: bool,
    scope: &mut Scope<'a>,
    ctx: &mut EvalContext<'_>,
    out: &mut String,
) -> TemplateResult<()> {
    let truthy = scope
        .resolve(&block.subject.path)
        .is_some_and(|value| value.is_truthy());
    if truthy != expected {
        return Ok(());
    }

    ctx.enter_block()?;
    evaluate(&block.body, scope, ctx, out)?;
    ctx.exit_block();
    Ok(())
}

/// Evaluate an `{{#each}}` block.
fn evaluate_iteration<'a>(
    block: &Block,
    scope: &mut Scope<'a>,
    ctx: &mut EvalContext<'_>,
    out: &mut String,
) -> TemplateResult<()> {
    let items: &'a [TemplateValue] = match scope.resolve(&block.subject.path) {
        Some(Cow::Borrowed(TemplateValue::List(items))) => items,
        _ => return ctx.not_iterable(&block.subject.path, block.subject.span),
    };

    if items.is_empty() {
        return Ok(());
    }

    ctx.enter_block()?;
    for (index, item) in items.iter().enumerate() {
        scope.push_loop(LoopFrame::new(item, index, items.len()));
        let result = evaluate(&block.body, scope, ctx, out);
        scope.pop_loop();
        result?;
    }
    ctx.exit_block();
    Ok(())
}

/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The public entry point: named-template rendering over a [`TemplateStore`].
//!
//! Each [`TemplateEngine`] owns its own store and default options, so
//! independent engines never see each other's registrations.

use crate::context::TemplateContext;
use crate::error::{TemplateError, TemplateResult};
use crate::eval_context::EvalContext;
use crate::evaluator::RenderReport;
use crate::options::RenderOptions;
use crate::stats::TemplateStats;
use crate::store::TemplateStore;
use crate::validator::{ValidationReport, validate_source};

/// One entry of a [`TemplateEngine::render_multiple`] batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub name: String,
    pub context: TemplateContext,
}

impl RenderRequest {
    pub fn new(name: impl Into<String>, context: TemplateContext) -> Self {
        Self {
            name: name.into(),
            context,
        }
    }
}

/// Renders named templates from an owned store.
///
/// Rendering only reads the store, so an engine can be shared across
/// threads (for example behind an `Arc`) while templates are rendered.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    store: TemplateStore,
    options: RenderOptions,
}

impl TemplateEngine {
    /// Create an engine whose store holds the built-in templates.
    pub fn new() -> Self {
        Self::with_store(TemplateStore::new())
    }

    /// Create an engine over an existing store.
    pub fn with_store(store: TemplateStore) -> Self {
        Self {
            store,
            options: RenderOptions::default(),
        }
    }

    /// Set the options used by [`TemplateEngine::render`].
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Render a named template with the engine's options.
    pub fn render(&self, name: &str, context: &TemplateContext) -> TemplateResult<String> {
        self.render_with_options(name, context, &self.options)
    }

    /// Render a named template with explicit options.
    pub fn render_with_options(
        &self,
        name: &str,
        context: &TemplateContext,
        options: &RenderOptions,
    ) -> TemplateResult<String> {
        Ok(self.render_report_with_options(name, context, options)?.output)
    }

    /// Render a named template with the engine's options, returning warnings too.
    pub fn render_report(
        &self,
        name: &str,
        context: &TemplateContext,
    ) -> TemplateResult<RenderReport> {
        self.render_report_with_options(name, context, &self.options)
    }

    fn render_report_with_options(
        &self,
        name: &str,
        context: &TemplateContext,
        options: &RenderOptions,
    ) -> TemplateResult<RenderReport> {
        let template = self.store.require(name)?;
        tracing::debug!(template = %name, strict = options.strict, "Rendering template");
        template.render_in(context, EvalContext::new(options).with_template_name(name))
    }

    /// Render several templates and join their outputs with `separator`.
    ///
    /// The first failing request aborts the batch.
    pub fn render_multiple(
        &self,
        requests: &[RenderRequest],
        separator: &str,
    ) -> TemplateResult<String> {
        let outputs = requests
            .iter()
            .map(|request| self.render(&request.name, &request.context))
            .collect::<TemplateResult<Vec<_>>>()?;
        Ok(outputs.join(separator))
    }

    /// Render `primary`, or `fallback` if `primary` is missing or fails.
    ///
    /// Errors from the fallback template are returned as-is.
    pub fn render_with_fallback(
        &self,
        primary: &str,
        fallback: &str,
        context: &TemplateContext,
    ) -> TemplateResult<String> {
        match self.render(primary, context) {
            Ok(output) => Ok(output),
            Err(err) => {
                tracing::warn!(
                    template = %primary,
                    fallback = %fallback,
                    error = %err,
                    "Falling back to alternate template"
                );
                self.render(fallback, context)
            }
        }
    }

    /// Register (or replace) a template. Fails with a parse error on malformed source.
    pub fn register_template(&self, name: &str, source: &str) -> TemplateResult<()> {
        self.store.register(name, source)
    }

    pub fn unregister_template(&self, name: &str) -> bool {
        self.store.unregister(name)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.store.has(name)
    }

    pub fn get_raw_template(&self, name: &str) -> Option<String> {
        self.store.get_raw(name)
    }

    /// Registered template names, sorted.
    pub fn list_templates(&self) -> Vec<String> {
        self.store.list_names()
    }

    /// Run the lightweight validator over a registered template's source.
    pub fn validate_template(&self, name: &str) -> TemplateResult<ValidationReport> {
        Ok(validate_source(&self.raw_or_not_found(name)?))
    }

    /// Introspect a registered template.
    pub fn get_template_stats(&self, name: &str) -> TemplateResult<TemplateStats> {
        Ok(TemplateStats::from_source(&self.raw_or_not_found(name)?))
    }

    fn raw_or_not_found(&self, name: &str) -> TemplateResult<String> {
        self.store
            .get_raw(name)
            .ok_or_else(|| TemplateError::TemplateNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TemplateValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx(value: serde_json::Value) -> TemplateContext {
        TemplateContext::from_json(value).unwrap()
    }

    fn engine_with(templates: &[(&str, &str)]) -> TemplateEngine {
        let engine = TemplateEngine::with_store(TemplateStore::empty());
        for (name, source) in templates {
            engine.register_template(name, source).unwrap();
        }
        engine
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine>();
    }

    #[test]
    fn test_new_engine_lists_builtins() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.list_templates(),
            vec!["feature-list", "manifest", "progress-report", "recommendations"]
        );
    }

    #[test]
    fn test_render_named() {
        let engine = engine_with(&[("hello", "Hello {{name}}!")]);
        assert_eq!(
            engine.render("hello", &ctx(json!({"name": "World"}))).unwrap(),
            "Hello World!"
        );
    }

    #[test]
    fn test_render_unknown_template() {
        let engine = engine_with(&[]);
        let err = engine.render("missing", &TemplateContext::new()).unwrap_err();
        assert!(matches!(err, TemplateError::TemplateNotFound { name } if name == "missing"));
    }

    #[test]
    fn test_render_uses_engine_options() {
        let engine = engine_with(&[("t", "[{{x}}]")])
            .with_options(RenderOptions::default().with_default_value("n/a"));
        assert_eq!(engine.render("t", &TemplateContext::new()).unwrap(), "[n/a]");

        let strict = RenderOptions::default().with_strict_mode(true);
        assert!(matches!(
            engine.render_with_options("t", &TemplateContext::new(), &strict),
            Err(TemplateError::MissingVariable { .. })
        ));
    }

    #[test]
    fn test_render_report_collects_warnings() {
        let engine = engine_with(&[("t", "{{a}}{{#each b}}x{{/each}}")]);
        let report = engine
            .render_report("t", &ctx(json!({"b": "not a list"})))
            .unwrap();
        assert_eq!(report.output, "");
        let messages: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            messages,
            vec!["missing variable 'a'", "'b' is not iterable"]
        );
    }

    #[test]
    fn test_idempotent_and_read_only() {
        let engine = TemplateEngine::new();
        let names_before = engine.list_templates();
        let raw_before = engine.get_raw_template("feature-list");
        let data = ctx(json!({"features": [{"name": "Export", "done": true}]}));

        let first = engine.render("feature-list", &data).unwrap();
        let second = engine.render("feature-list", &data).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.list_templates(), names_before);
        assert_eq!(engine.get_raw_template("feature-list"), raw_before);
    }

    #[test]
    fn test_render_multiple() {
        let engine = engine_with(&[("a", "A={{x}}"), ("b", "B={{y}}")]);
        let requests = vec![
            RenderRequest::new("a", ctx(json!({"x": 1}))),
            RenderRequest::new("b", ctx(json!({"y": 2}))),
        ];
        assert_eq!(engine.render_multiple(&requests, "\n---\n").unwrap(), "A=1\n---\nB=2");
        assert_eq!(engine.render_multiple(&[], ", ").unwrap(), "");
    }

    #[test]
    fn test_render_multiple_aborts_on_first_error() {
        let engine = engine_with(&[("a", "A")]);
        let requests = vec![
            RenderRequest::new("a", TemplateContext::new()),
            RenderRequest::new("nope", TemplateContext::new()),
        ];
        assert!(matches!(
            engine.render_multiple(&requests, ""),
            Err(TemplateError::TemplateNotFound { name }) if name == "nope"
        ));
    }

    #[test]
    fn test_render_with_fallback() {
        let engine = engine_with(&[("primary", "P {{x}}"), ("fallback", "F {{x}}")]);
        let data = ctx(json!({"x": "ok"}));

        assert_eq!(
            engine.render_with_fallback("primary", "fallback", &data).unwrap(),
            "P ok"
        );
        assert_eq!(
            engine.render_with_fallback("absent", "fallback", &data).unwrap(),
            "F ok"
        );
        assert!(matches!(
            engine.render_with_fallback("absent", "also-absent", &data),
            Err(TemplateError::TemplateNotFound { name }) if name == "also-absent"
        ));
    }

    #[test]
    fn test_render_with_fallback_on_render_error() {
        let engine = engine_with(&[("primary", "{{required}}"), ("fallback", "plain")])
            .with_options(RenderOptions::default().with_strict_mode(true));
        assert_eq!(
            engine
                .render_with_fallback("primary", "fallback", &TemplateContext::new())
                .unwrap(),
            "plain"
        );
    }

    #[test]
    fn test_register_unregister_has_get_raw() {
        let engine = engine_with(&[]);
        assert!(!engine.has_template("t"));
        assert_eq!(engine.get_raw_template("t"), None);

        engine.register_template("t", "{{x}}").unwrap();
        assert!(engine.has_template("t"));
        assert_eq!(engine.get_raw_template("t").as_deref(), Some("{{x}}"));

        assert!(engine.unregister_template("t"));
        assert!(!engine.unregister_template("t"));
        assert!(!engine.has_template("t"));
    }

    #[test]
    fn test_register_rejects_malformed_template() {
        let engine = engine_with(&[]);
        assert!(matches!(
            engine.register_template("bad", "{{#each xs}}no closer"),
            Err(TemplateError::ParseError { .. })
        ));
        assert!(!engine.has_template("bad"));
    }

    #[test]
    fn test_validate_template() {
        let engine = engine_with(&[("ok", "{{#if a}}b{{/if}}")]);
        assert!(engine.validate_template("ok").unwrap().valid);
        assert!(matches!(
            engine.validate_template("missing"),
            Err(TemplateError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_get_template_stats() {
        let engine = TemplateEngine::new();
        let stats = engine.get_template_stats("manifest").unwrap();
        assert!(stats.variables.contains("name"));
        assert!(stats.variables.contains("files"));
        assert_eq!(stats.loop_count, 1);
        assert!(matches!(
            engine.get_template_stats("missing"),
            Err(TemplateError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_engines_are_independent() {
        let first = TemplateEngine::new();
        let second = TemplateEngine::new();

        first.register_template("custom", "x").unwrap();
        first.unregister_template("manifest");

        assert!(!second.has_template("custom"));
        assert!(second.has_template("manifest"));
    }

    #[test]
    fn test_shared_engine_across_threads() {
        let engine = Arc::new(engine_with(&[("count", "{{#each xs}}{{this}}{{/each}}")]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    let mut data = TemplateContext::new();
                    data.insert("xs", TemplateValue::from(vec![i, i + 1]));
                    engine.render("count", &data).unwrap()
                })
            })
            .collect();

        let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(outputs, vec!["01", "12", "23", "34"]);
    }
}

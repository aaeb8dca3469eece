/*
 * builtin.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in templates shipped with the engine.
//!
//! These templates are embedded in the binary and loaded into every
//! [`crate::TemplateStore`] created with [`crate::TemplateStore::new`].

/// List of available built-in template names.
pub const BUILTIN_TEMPLATE_NAMES: &[&str] = &[
    "progress-report",
    "feature-list",
    "recommendations",
    "manifest",
];

/// Get the source of a built-in template by name.
///
/// Returns `None` if the name is not a recognized built-in template.
pub fn get_builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "progress-report" => Some(PROGRESS_REPORT_TEMPLATE),
        "feature-list" => Some(FEATURE_LIST_TEMPLATE),
        "recommendations" => Some(RECOMMENDATIONS_TEMPLATE),
        "manifest" => Some(MANIFEST_TEMPLATE),
        _ => None,
    }
}

/// Check if a name refers to a built-in template.
pub fn is_builtin_template(name: &str) -> bool {
    BUILTIN_TEMPLATE_NAMES.contains(&name)
}

/// All built-ins as `(name, source)` pairs.
pub fn builtin_templates() -> impl Iterator<Item = (&'static str, &'static str)> {
    BUILTIN_TEMPLATE_NAMES
        .iter()
        .filter_map(|name| get_builtin_template(name).map(|source| (*name, source)))
}

// =============================================================================
// Template content
// =============================================================================

/// Project progress summary: counters, phases and blockers.
const PROGRESS_REPORT_TEMPLATE: &str =
    include_str!("../resources/templates/progress-report.template");

/// Checklist of features with completion state.
const FEATURE_LIST_TEMPLATE: &str = include_str!("../resources/templates/feature-list.template");

/// Prioritized recommendation text.
const RECOMMENDATIONS_TEMPLATE: &str =
    include_str!("../resources/templates/recommendations.template");

/// Package-style manifest.
const MANIFEST_TEMPLATE: &str = include_str!("../resources/templates/manifest.template");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderOptions, Template, TemplateContext};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render_builtin(name: &str, data: serde_json::Value) -> String {
        let template = Template::compile(get_builtin_template(name).unwrap()).unwrap();
        template
            .render(
                &TemplateContext::from_json(data).unwrap(),
                &RenderOptions::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_all_builtins_compile() {
        for (name, source) in builtin_templates() {
            let result = Template::compile(source);
            assert!(
                result.is_ok(),
                "{} template should compile: {:?}",
                name,
                result.err()
            );
        }
        assert_eq!(builtin_templates().count(), BUILTIN_TEMPLATE_NAMES.len());
    }

    #[test]
    fn test_is_builtin_template() {
        assert!(is_builtin_template("manifest"));
        assert!(is_builtin_template("progress-report"));
        assert!(!is_builtin_template("unknown"));
        assert!(get_builtin_template("unknown").is_none());
    }

    #[test]
    fn test_progress_report() {
        let output = render_builtin(
            "progress-report",
            json!({
                "project": "Atlas",
                "completed": 3,
                "total": 5,
                "phases": [
                    {"name": "Design", "done": true},
                    {"name": "Build", "done": false}
                ],
                "blockers": ["Waiting on API keys"]
            }),
        );
        assert_eq!(
            output,
            "# Atlas Progress Report\n\
             \n\
             Completed: 3 of 5 tasks\n\
             - Design: done\n\
             - Build: in progress\n\
             \n\
             ## Blockers\n\
             - Waiting on API keys\n"
        );
    }

    #[test]
    fn test_feature_list() {
        let output = render_builtin(
            "feature-list",
            json!({"features": [
                {"name": "Login", "done": true, "description": "OAuth only"},
                {"name": "Search", "done": false}
            ]}),
        );
        assert_eq!(
            output,
            "## Features\n- [x] Login: OAuth only\n- [ ] Search\n"
        );

        let empty = render_builtin("feature-list", json!({"features": []}));
        assert_eq!(empty, "## Features\n_No features recorded._\n");
    }

    #[test]
    fn test_recommendations() {
        let output = render_builtin(
            "recommendations",
            json!({"recommendations": [
                {"title": "Add caching", "priority": "high", "rationale": "Repeated lookups dominate."},
                {"title": "Split module", "rationale": "It is too large."}
            ]}),
        );
        assert_eq!(
            output,
            "## Recommendations\n\
             ### Add caching (high)\n\
             Repeated lookups dominate.\n\
             \n\
             ### Split module\n\
             It is too large.\n"
        );
    }

    #[test]
    fn test_manifest() {
        let output = render_builtin(
            "manifest",
            json!({"name": "atlas", "version": "1.2.0", "files": ["src/lib.rs", "README.md"]}),
        );
        assert_eq!(
            output,
            "name: atlas\nversion: 1.2.0\nfiles:\n  - src/lib.rs\n  - README.md\n"
        );
    }
}

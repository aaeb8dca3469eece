/*
 * validator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lightweight structural checks on raw template text.
//!
//! The validator counts block openers and closers per directive type and
//! looks for a `{{` that is never closed. It does not build an AST, so it
//! can miss problems the parser would reject (a closer before its opener,
//! for example). Registration always runs the full parser.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::ast::BlockKind;
use crate::parser::line_column;

/// A complete `{{ ... }}` marker with no braces inside. Capture 1 is the
/// text between the braces.
pub(crate) static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("tag regex is valid"));

/// Block opener inside a marker. Capture 1 is the keyword, 2 the (possibly empty) path.
pub(crate) static OPENER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^#(if|unless|each)(?:\s+(.*))?$").expect("opener regex is valid")
});

/// Block closer inside a marker. Capture 1 is the keyword.
pub(crate) static CLOSER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(if|unless|each)$").expect("closer regex is valid"));

/// Outcome of [`validate_source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check opener/closer balance and tag termination in `source`.
pub fn validate_source(source: &str) -> ValidationReport {
    let mut opened = [0usize; 3];
    let mut closed = [0usize; 3];
    let mut scanned_to = 0;
    let mut unterminated = None;

    for captures in TAG_RE.captures_iter(source) {
        let inner = captures.get(1).map_or("", |m| m.as_str());
        if let Some(kind) = keyword_kind(&OPENER_RE, inner) {
            opened[slot(kind)] += 1;
        } else if let Some(kind) = keyword_kind(&CLOSER_RE, inner) {
            closed[slot(kind)] += 1;
        }
        if let Some(whole) = captures.get(0) {
            if unterminated.is_none() {
                unterminated = find_open_marker(source, scanned_to, whole.start());
            }
            scanned_to = whole.end();
        }
    }
    if unterminated.is_none() {
        unterminated = find_open_marker(source, scanned_to, source.len());
    }

    let mut errors = Vec::new();
    for kind in BlockKind::ALL {
        let (open, close) = (opened[slot(kind)], closed[slot(kind)]);
        let keyword = kind.keyword();
        if open > close {
            errors.push(format!(
                "unclosed {0}: {1} {{{{#{0}}}}} without matching {{{{/{0}}}}}",
                keyword,
                open - close
            ));
        } else if close > open {
            errors.push(format!(
                "unexpected {{{{/{0}}}}}: {1} closing tag(s) without a matching {{{{#{0}}}}}",
                keyword,
                close - open
            ));
        }
    }

    if let Some(offset) = unterminated {
        let (line, column) = line_column(source, offset);
        errors.push(format!(
            "unterminated tag at line {}, column {}",
            line, column
        ));
    }

    ValidationReport::from_errors(errors)
}

/// Offset of the first `{{` in `source[from..to]`, which lies outside every
/// complete marker.
fn find_open_marker(source: &str, from: usize, to: usize) -> Option<usize> {
    source[from..to].find("{{").map(|rel| from + rel)
}

fn keyword_kind(re: &Regex, inner: &str) -> Option<BlockKind> {
    re.captures(inner)
        .and_then(|c| c.get(1))
        .and_then(|m| BlockKind::from_keyword(m.as_str()))
}

fn slot(kind: BlockKind) -> usize {
    match kind {
        BlockKind::If => 0,
        BlockKind::Unless => 1,
        BlockKind::Each => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_template() {
        let report = validate_source(
            "{{#each items}}{{#if this.active}}{{this.name}}{{/if}}{{/each}}{{#unless x}}y{{/unless}}",
        );
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_plain_text_is_valid() {
        assert!(validate_source("no directives here").valid);
        assert!(validate_source("").valid);
    }

    #[test]
    fn test_unclosed_if() {
        let report = validate_source("{{#if show}}visible");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["unclosed if: 1 {{#if}} without matching {{/if}}".to_string()]
        );
    }

    #[test]
    fn test_unexpected_closers() {
        let report = validate_source("a{{/each}}b{{/each}}");
        assert_eq!(
            report.errors,
            vec![
                "unexpected {{/each}}: 2 closing tag(s) without a matching {{#each}}".to_string()
            ]
        );
    }

    #[test]
    fn test_each_kind_reported_separately() {
        let report = validate_source("{{#if a}}{{#unless b}}{{/if}}{{/each}}");
        assert_eq!(
            report.errors,
            vec![
                "unclosed unless: 1 {{#unless}} without matching {{/unless}}".to_string(),
                "unexpected {{/each}}: 1 closing tag(s) without a matching {{#each}}".to_string(),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag() {
        let report = validate_source("Hello\n  {{name");
        assert_eq!(
            report.errors,
            vec!["unterminated tag at line 2, column 3".to_string()]
        );
    }

    #[test]
    fn test_unterminated_after_complete_tags() {
        let report = validate_source("{{a}} {{b}} {{c");
        assert_eq!(
            report.errors,
            vec!["unterminated tag at line 1, column 13".to_string()]
        );
    }

    #[test]
    fn test_unterminated_before_complete_tag() {
        let report = validate_source("Hi {{name and {{other}}");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["unterminated tag at line 1, column 4".to_string()]
        );
    }

    #[test]
    fn test_unterminated_inside_block_keeps_closer() {
        let report = validate_source("{{#if a}} {{ oops {{/if}}");
        assert_eq!(
            report.errors,
            vec!["unterminated tag at line 1, column 11".to_string()]
        );
    }

    #[test]
    fn test_order_is_not_checked() {
        // Counts balance even though the closer comes first; the parser rejects this.
        assert!(validate_source("{{/if}}{{#if x}}").valid);
        assert!(crate::Template::compile("{{/if}}{{#if x}}").is_err());
    }
}

/*
 * stats.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template introspection.
//!
//! Summarizes what data a template needs without evaluating it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ast::{BlockKind, is_loop_local};
use crate::parser::is_valid_path;
use crate::validator::{CLOSER_RE, OPENER_RE, TAG_RE};

/// Size, referenced data paths and directive counts of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    /// Source length in bytes.
    pub size: usize,
    /// Data paths referenced by interpolations and block directives.
    /// Loop-local names (`this`, `this.*`, `@*`) are not included.
    pub variables: BTreeSet<String>,
    /// `{{#if}}` plus `{{#unless}}` openers.
    pub conditional_count: usize,
    /// `{{#each}}` openers.
    pub loop_count: usize,
}

impl TemplateStats {
    /// Scan raw template text.
    pub fn from_source(source: &str) -> Self {
        let mut stats = TemplateStats {
            size: source.len(),
            ..Default::default()
        };

        for captures in TAG_RE.captures_iter(source) {
            let inner = captures.get(1).map_or("", |m| m.as_str());

            let path = if let Some(opener) = OPENER_RE.captures(inner) {
                match opener.get(1).and_then(|m| BlockKind::from_keyword(m.as_str())) {
                    Some(BlockKind::Each) => stats.loop_count += 1,
                    Some(_) => stats.conditional_count += 1,
                    None => {}
                }
                opener.get(2).map_or("", |m| m.as_str().trim())
            } else if CLOSER_RE.is_match(inner) {
                continue;
            } else {
                inner
            };

            if is_valid_path(path) && !is_loop_local(path) {
                stats.variables.insert(path.to_string());
            }
        }

        stats
    }
}

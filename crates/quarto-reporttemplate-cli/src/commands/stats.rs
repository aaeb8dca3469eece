/*
 * stats.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stats command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use super::build_engine;

/// Execute the stats command: pretty-printed JSON followed by a newline.
pub fn execute(name: &str, templates: Option<&Path>) -> Result<String> {
    let engine = build_engine(templates)?;
    let stats = engine
        .get_template_stats(name)
        .with_context(|| format!("Failed to inspect template '{}'", name))?;
    Ok(serde_json::to_string_pretty(&stats)? + "\n")
}

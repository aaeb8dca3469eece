/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! List command implementation.

use std::path::Path;

use anyhow::Result;

use super::build_engine;

/// Execute the list command: one template name per line, sorted.
pub fn execute(templates: Option<&Path>) -> Result<String> {
    let engine = build_engine(templates)?;
    Ok(engine
        .list_templates()
        .into_iter()
        .map(|name| name + "\n")
        .collect())
}

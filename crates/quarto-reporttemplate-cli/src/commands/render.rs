/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Renders one named template (built-in or from `--templates`) against a
//! JSON or YAML data file and returns the output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use quarto_reporttemplate::TemplateContext;

use super::{OptionOverrides, build_engine, load_data, load_options};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Template name
    pub name: String,
    /// Data file (JSON, or YAML by extension)
    pub data: Option<PathBuf>,
    /// Extra template directory
    pub templates: Option<PathBuf>,
    /// TOML render options
    pub config: Option<PathBuf>,
    /// Command-line option overrides
    pub overrides: OptionOverrides,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<String> {
    let engine = build_engine(args.templates.as_deref())?;
    let options = load_options(args.config.as_deref(), args.overrides)?;
    let context = match &args.data {
        Some(path) => load_data(path)?,
        None => TemplateContext::new(),
    };
    debug!(?options, "Resolved render options");

    let report = engine
        .with_options(options)
        .render_report(&args.name, &context)
        .with_context(|| format!("Failed to render template '{}'", args.name))?;

    if !report.warnings.is_empty() {
        info!(
            template = %args.name,
            count = report.warnings.len(),
            "Rendered with missing or non-iterable data"
        );
    }
    Ok(report.output)
}

/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the reporttemplate CLI
//!
//! Each command returns the text to print on stdout; `main` does the printing.
//! Helpers shared by several commands live here.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use quarto_reporttemplate::{RenderOptions, TemplateContext, TemplateEngine};

pub mod list;
pub mod render;
pub mod stats;
pub mod validate;

/// Render options given on the command line. They win over the config file.
#[derive(Debug, Default)]
pub struct OptionOverrides {
    pub strict: bool,
    pub default_value: Option<String>,
    pub max_depth: Option<usize>,
    pub report_degradations: bool,
}

/// Engine with the built-in templates plus any `*.template` files in `templates`.
pub fn build_engine(templates: Option<&Path>) -> Result<TemplateEngine> {
    let engine = TemplateEngine::new();
    if let Some(dir) = templates {
        let names = engine
            .store()
            .register_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
        debug!(dir = %dir.display(), count = names.len(), "Loaded template directory");
    }
    Ok(engine)
}

/// Read template data. `.yml`/`.yaml` files are YAML, anything else JSON.
pub fn load_data(path: &Path) -> Result<TemplateContext> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml" | "yaml")
    );
    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML data in {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON data in {}", path.display()))?
    };

    TemplateContext::from_json(value)
        .with_context(|| format!("Data in {} must be a mapping at the top level", path.display()))
}

/// Options from an optional TOML config file with command-line overrides applied.
pub fn load_options(config: Option<&Path>, overrides: OptionOverrides) -> Result<RenderOptions> {
    let mut options = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<RenderOptions>(&text)
                .with_context(|| format!("Invalid render options in {}", path.display()))?
        }
        None => RenderOptions::default(),
    };

    if overrides.strict {
        options.strict = true;
    }
    if let Some(value) = overrides.default_value {
        options.default_value = value;
    }
    if let Some(depth) = overrides.max_depth {
        options.max_depth = depth;
    }
    if overrides.report_degradations {
        options.report_degradations = true;
    }
    Ok(options)
}

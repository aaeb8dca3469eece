/*
 * validate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Validate command implementation.
//!
//! The target is a template file when such a path exists, otherwise a
//! template name. Files get the lightweight structural check and then a
//! full parse, so problems the check cannot see are still reported.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use quarto_reporttemplate::{Template, ValidationReport, validate_source};

use super::build_engine;

/// Execute the validate command. Fails when the template is invalid.
pub fn execute(target: &str, templates: Option<&Path>) -> Result<String> {
    let path = Path::new(target);
    let report = if path.is_file() {
        debug!(path = %path.display(), "Validating template file");
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file {}", path.display()))?;
        validate_file_source(&source)
    } else {
        build_engine(templates)?
            .validate_template(target)
            .with_context(|| format!("Failed to validate '{}'", target))?
    };

    if report.valid {
        Ok(format!("{}: valid\n", target))
    } else {
        bail!("{} is invalid:\n  {}", target, report.errors.join("\n  "))
    }
}

fn validate_file_source(source: &str) -> ValidationReport {
    let mut report = validate_source(source);
    if report.valid
        && let Err(err) = Template::compile(source)
    {
        report.valid = false;
        report.errors.push(err.to_string());
    }
    report
}

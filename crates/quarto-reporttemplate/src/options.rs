/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render options.
//!
//! Options can be built in code with the `with_*` setters or deserialized
//! from a configuration file (keys are kebab-case, every key optional):
//!
//! ```toml
//! strict = true
//! default-value = "N/A"
//! max-depth = 32
//! report-degradations = true
//! ```

use serde::Deserialize;

/// Default recursion guard for nested blocks.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling how missing data is handled during rendering.
///
/// In lenient mode (the default) the engine favors producing a complete
/// document: a missing variable renders as [`RenderOptions::default_value`]
/// and an `{{#each}}` over a non-list renders nothing. This trades strict
/// correctness for liveness. Set `strict` to abort instead, or
/// `report_degradations` to log every substitution the engine makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RenderOptions {
    /// Raise on missing variables and non-iterable loop targets.
    pub strict: bool,

    /// Substituted for missing variables in lenient mode.
    pub default_value: String,

    /// Maximum block nesting depth before evaluation aborts.
    pub max_depth: usize,

    /// Log lenient-mode degradations at `warn` level.
    pub report_degradations: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            default_value: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            report_degradations: false,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict mode.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the value substituted for missing variables in lenient mode.
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Set the maximum block nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enable or disable warning logs for lenient-mode degradations.
    pub fn with_degradation_reports(mut self, report: bool) -> Self {
        self.report_degradations = report;
        self
    }
}

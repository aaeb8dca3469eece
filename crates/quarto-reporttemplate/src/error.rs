/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template registration and rendering.

use thiserror::Error;

/// Errors that can occur during template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template is registered under the requested name.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// Malformed directive structure. Raised when a template is registered,
    /// never deferred to render time.
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// A variable could not be resolved (strict mode only).
    #[error("Missing variable: {path}")]
    MissingVariable { path: String },

    /// An `{{#each}}` target did not resolve to a list (strict mode only).
    #[error("Value at '{path}' is not iterable")]
    NotIterable { path: String },

    /// Block nesting went deeper than the configured limit.
    #[error("Maximum nesting depth exceeded (depth > {max_depth})")]
    DepthExceeded { max_depth: usize },

    /// I/O error (e.g., reading a template file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

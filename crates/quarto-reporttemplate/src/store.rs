/*
 * store.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Registry of named templates.
//!
//! The store owns every template's source text together with its parsed
//! AST. Templates are parsed when they are registered, so a malformed
//! template is rejected up front instead of failing at render time.
//!
//! # Thread Safety
//!
//! Entries are held as `Arc<Template>` behind a `RwLock`. Readers clone the
//! `Arc` under the read lock and render without holding it. Registration
//! parses outside the lock and swaps the finished entry in under the write
//! lock, so a reader sees either the old template or the new one, never a
//! partially-registered one.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::builtin::builtin_templates;
use crate::error::{TemplateError, TemplateResult};
use crate::parser::Template;

/// File extension picked up by [`TemplateStore::register_dir`].
pub const TEMPLATE_EXTENSION: &str = "template";

/// Registry of named, pre-parsed templates.
#[derive(Debug)]
pub struct TemplateStore {
    templates: RwLock<HashMap<String, Arc<Template>>>,
}

impl TemplateStore {
    /// Create a store preloaded with the built-in templates.
    ///
    /// # Panics
    ///
    /// Panics if a built-in template fails to parse (should never happen;
    /// the built-ins are covered by tests).
    pub fn new() -> Self {
        let store = Self::empty();
        for (name, source) in builtin_templates() {
            store
                .register(name, source)
                .expect("built-in templates should always parse");
        }
        store
    }

    /// Create an empty store (for testing).
    pub fn empty() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Parse `source` and store it under `name`.
    ///
    /// Replaces any existing template with the same name. On a parse error
    /// the store is left unchanged.
    pub fn register(&self, name: impl Into<String>, source: &str) -> TemplateResult<()> {
        let name = name.into();
        let template = Template::compile(source).map_err(|e| match e {
            TemplateError::ParseError { message } => TemplateError::ParseError {
                message: format!("{}: {}", name, message),
            },
            other => other,
        })?;

        let replaced = self
            .write()
            .insert(name.clone(), Arc::new(template))
            .is_some();
        tracing::debug!(template = %name, replaced, "Registered template");
        Ok(())
    }

    /// Register a template file under its file stem.
    ///
    /// Returns the name the template was registered under.
    pub fn register_file(&self, path: &Path) -> TemplateResult<String> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TemplateError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a template file: {}", path.display()),
                ))
            })?;
        let source = std::fs::read_to_string(path)?;
        self.register(name.clone(), &source)?;
        Ok(name)
    }

    /// Register every `*.template` file directly inside `dir`.
    ///
    /// Returns the registered names, sorted.
    pub fn register_dir(&self, dir: &Path) -> TemplateResult<Vec<String>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut names = Vec::with_capacity(paths.len());
        for path in paths {
            names.push(self.register_file(&path)?);
        }
        Ok(names)
    }

    /// Remove a template. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            tracing::debug!(template = %name, "Unregistered template");
        }
        removed
    }

    /// Check if a template is registered.
    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Get a registered template.
    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.read().get(name).cloned()
    }

    /// Get a registered template or fail with [`TemplateError::TemplateNotFound`].
    pub fn require(&self, name: &str) -> TemplateResult<Arc<Template>> {
        self.get(name).ok_or_else(|| TemplateError::TemplateNotFound {
            name: name.to_string(),
        })
    }

    /// Get the source text of a registered template.
    pub fn get_raw(&self, name: &str) -> Option<String> {
        self.read().get(name).map(|t| t.source().to_string())
    }

    /// List registered template names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered templates.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated
    // (every mutation is a single insert or remove), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Template>>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Template>>> {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

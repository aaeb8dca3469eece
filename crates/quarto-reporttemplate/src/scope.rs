/*
 * scope.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Layered variable lookup during evaluation.
//!
//! A [`Scope`] is a stack of frames: the caller's [`TemplateContext`] at the
//! bottom and one [`LoopFrame`] per active `{{#each}}` iteration above it.
//! Lookups scan from the innermost frame outward, so loop bindings shadow
//! outer ones without the caller's context ever being modified.

use std::borrow::Cow;

use crate::context::{TemplateContext, TemplateValue};

/// Bindings introduced by one iteration of an `{{#each}}` block.
#[derive(Debug, Clone, Copy)]
pub struct LoopFrame<'a> {
    item: &'a TemplateValue,
    index: usize,
    length: usize,
}

impl<'a> LoopFrame<'a> {
    pub fn new(item: &'a TemplateValue, index: usize, length: usize) -> Self {
        Self {
            item,
            index,
            length,
        }
    }

    /// Look up a single name in this frame.
    ///
    /// Reserved names (`this`, `@index`, `@first`, `@last`, `@length`) take
    /// precedence over fields of a map item.
    fn lookup(&self, name: &str) -> Option<Cow<'a, TemplateValue>> {
        match name {
            "this" => Some(Cow::Borrowed(self.item)),
            "@index" => Some(Cow::Owned(TemplateValue::from(self.index))),
            "@first" => Some(Cow::Owned(TemplateValue::Bool(self.index == 0))),
            "@last" => Some(Cow::Owned(TemplateValue::Bool(self.index + 1 == self.length))),
            "@length" => Some(Cow::Owned(TemplateValue::from(self.length))),
            _ => match self.item {
                TemplateValue::Map(fields) => fields.get(name).map(Cow::Borrowed),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    Root(&'a TemplateContext),
    Loop(LoopFrame<'a>),
}

impl<'a> Frame<'a> {
    fn lookup(&self, name: &str) -> Option<Cow<'a, TemplateValue>> {
        match *self {
            Frame::Root(ctx) => ctx.get(name).map(Cow::Borrowed),
            Frame::Loop(frame) => frame.lookup(name),
        }
    }
}

/// The stack of frames visible while evaluating a node.
///
/// Never empty: the root frame is installed at construction and cannot be
/// popped.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(root: &'a TemplateContext) -> Self {
        Self {
            frames: vec![Frame::Root(root)],
        }
    }

    /// Number of frames, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_loop(&mut self, frame: LoopFrame<'a>) {
        self.frames.push(Frame::Loop(frame));
    }

    /// Pop the innermost loop frame. The root frame is never removed.
    pub fn pop_loop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Resolve a dotted path.
    ///
    /// Paths starting with `@`, and the bare path `this`, are looked up in
    /// the innermost frame only and are not split. Other paths are split on
    /// `.`: the first segment is looked up from the innermost frame outward
    /// and the remaining segments walk nested maps. Walking through a
    /// missing value or a non-map yields `None`; resolution never fails.
    pub fn resolve(&self, path: &str) -> Option<Cow<'a, TemplateValue>> {
        if path.starts_with('@') || path == "this" {
            return self.innermost().lookup(path);
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let rest: Vec<&str> = segments.collect();

        let head = self.frames.iter().rev().find_map(|f| f.lookup(first))?;
        if rest.is_empty() {
            return Some(head);
        }
        match head {
            Cow::Borrowed(value) => value.get_path(&rest).map(Cow::Borrowed),
            // Owned values are loop metadata scalars; they have no fields.
            Cow::Owned(_) => None,
        }
    }

    fn innermost(&self) -> &Frame<'a> {
        // The root frame is always present.
        &self.frames[self.frames.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: serde_json::Value) -> TemplateContext {
        TemplateContext::from_json(value).unwrap()
    }

    fn resolved(scope: &Scope, path: &str) -> Option<TemplateValue> {
        scope.resolve(path).map(Cow::into_owned)
    }

    #[test]
    fn test_resolve_root() {
        let ctx = context(json!({"name": "World", "user": {"address": {"city": "Oslo"}}}));
        let scope = Scope::new(&ctx);

        assert_eq!(resolved(&scope, "name"), Some(TemplateValue::from("World")));
        assert_eq!(
            resolved(&scope, "user.address.city"),
            Some(TemplateValue::from("Oslo"))
        );
        assert_eq!(resolved(&scope, "user.phone"), None);
        assert_eq!(resolved(&scope, "missing.deeper"), None);
        assert_eq!(resolved(&scope, "name.length"), None);
    }

    #[test]
    fn test_absent_distinct_from_falsy() {
        let ctx = context(json!({"empty": "", "zero": 0, "off": false}));
        let scope = Scope::new(&ctx);

        assert_eq!(resolved(&scope, "empty"), Some(TemplateValue::from("")));
        assert_eq!(resolved(&scope, "zero"), Some(TemplateValue::Number(0.0)));
        assert_eq!(resolved(&scope, "off"), Some(TemplateValue::Bool(false)));
        assert_eq!(resolved(&scope, "nothing"), None);
    }

    #[test]
    fn test_loop_frame_reserved_bindings() {
        let ctx = TemplateContext::new();
        let items = vec![
            TemplateValue::from("a"),
            TemplateValue::from("b"),
            TemplateValue::from("c"),
        ];

        for (i, item) in items.iter().enumerate() {
            let mut scope = Scope::new(&ctx);
            scope.push_loop(LoopFrame::new(item, i, items.len()));

            assert_eq!(resolved(&scope, "this"), Some(item.clone()));
            assert_eq!(resolved(&scope, "@index"), Some(TemplateValue::from(i)));
            assert_eq!(resolved(&scope, "@first"), Some(TemplateValue::Bool(i == 0)));
            assert_eq!(resolved(&scope, "@last"), Some(TemplateValue::Bool(i == 2)));
            assert_eq!(resolved(&scope, "@length"), Some(TemplateValue::from(3)));
        }
    }

    #[test]
    fn test_loop_frame_shadows_outer_bindings() {
        let ctx = context(json!({"name": "outer", "title": "Report"}));
        let item = TemplateValue::from(json!({"name": "inner"}));

        let mut scope = Scope::new(&ctx);
        scope.push_loop(LoopFrame::new(&item, 0, 1));

        assert_eq!(resolved(&scope, "name"), Some(TemplateValue::from("inner")));
        assert_eq!(resolved(&scope, "this.name"), Some(TemplateValue::from("inner")));
        // Outer bindings remain visible when not shadowed
        assert_eq!(resolved(&scope, "title"), Some(TemplateValue::from("Report")));

        scope.pop_loop();
        assert_eq!(resolved(&scope, "name"), Some(TemplateValue::from("outer")));
        // The caller's context is untouched
        assert_eq!(ctx.get("name"), Some(&TemplateValue::from("outer")));
    }

    #[test]
    fn test_reserved_names_win_over_item_fields() {
        let ctx = TemplateContext::new();
        let item = TemplateValue::from(json!({"this": "field", "@index": 99}));

        let mut scope = Scope::new(&ctx);
        scope.push_loop(LoopFrame::new(&item, 1, 2));

        assert_eq!(resolved(&scope, "@index"), Some(TemplateValue::from(1)));
        assert_eq!(resolved(&scope, "this"), Some(item.clone()));
    }

    #[test]
    fn test_reserved_paths_use_innermost_frame() {
        let ctx = TemplateContext::new();
        let outer_item = TemplateValue::from("outer");
        let inner_item = TemplateValue::from("inner");

        let mut scope = Scope::new(&ctx);
        scope.push_loop(LoopFrame::new(&outer_item, 4, 5));
        scope.push_loop(LoopFrame::new(&inner_item, 0, 1));

        assert_eq!(resolved(&scope, "this"), Some(inner_item.clone()));
        assert_eq!(resolved(&scope, "@index"), Some(TemplateValue::from(0)));
        assert_eq!(scope.depth(), 3);
    }

    #[test]
    fn test_reserved_paths_outside_loop() {
        let ctx = context(json!({"name": "x"}));
        let scope = Scope::new(&ctx);

        assert_eq!(resolved(&scope, "@index"), None);
        assert_eq!(resolved(&scope, "this"), None);
    }

    #[test]
    fn test_metadata_has_no_fields() {
        let ctx = TemplateContext::new();
        let item = TemplateValue::from("a");
        let mut scope = Scope::new(&ctx);
        scope.push_loop(LoopFrame::new(&item, 0, 1));

        assert_eq!(resolved(&scope, "@index.value"), None);
    }

    #[test]
    fn test_root_frame_is_never_popped() {
        let ctx = context(json!({"name": "x"}));
        let mut scope = Scope::new(&ctx);
        scope.pop_loop();
        assert_eq!(scope.depth(), 1);
        assert_eq!(resolved(&scope, "name"), Some(TemplateValue::from("x")));
    }
}

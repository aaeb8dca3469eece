/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template value and context types.
//!
//! This module defines the types used to represent template variable values
//! and the caller-supplied bindings a template is rendered against.
//!
//! Report generators usually build their data as JSON or as plain Rust
//! structs; both convert into a [`TemplateContext`] without any knowledge of
//! the engine internals.

use std::collections::HashMap;

use serde::Serialize;

/// A value that can be used in template evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TemplateValue {
    /// A string value.
    String(String),

    /// A numeric value.
    Number(f64),

    /// A boolean value.
    Bool(bool),

    /// A list of values.
    List(Vec<TemplateValue>),

    /// A map of string keys to values.
    Map(HashMap<String, TemplateValue>),

    /// A null/missing value.
    #[default]
    Null,
}

impl TemplateValue {
    /// Check if this value is "truthy" for conditional evaluation.
    ///
    /// Falsy values: `false`, null, zero (and NaN), the empty string, the
    /// empty list and the empty map. Everything else is truthy, including
    /// the string `"false"` and lists whose elements are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::Bool(b) => *b,
            TemplateValue::Number(n) => *n != 0.0 && !n.is_nan(),
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::List(items) => !items.is_empty(),
            TemplateValue::Map(m) => !m.is_empty(),
            TemplateValue::Null => false,
        }
    }

    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, TemplateValue::Null)
    }

    /// Get a nested field by path.
    ///
    /// For example, `get_path(&["employee", "salary"])` on a Map containing
    /// `{"employee": {"salary": 50000}}` returns the salary value. Walking
    /// through anything that is not a map yields `None`.
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        if path.is_empty() {
            return Some(self);
        }

        match self {
            TemplateValue::Map(m) => {
                let first = path[0];
                m.get(first).and_then(|v| v.get_path(&path[1..]))
            }
            _ => None,
        }
    }

    /// Render this value as a string for output.
    ///
    /// - String: returned as-is
    /// - Number: integral values without a fractional part, others in
    ///   shortest round-trip form
    /// - Bool: "true" or "false"
    /// - List: rendered elements joined with ","
    /// - Map: compact JSON
    /// - Null: ""
    pub fn render(&self) -> String {
        match self {
            TemplateValue::String(s) => s.clone(),
            TemplateValue::Number(n) => format_number(*n),
            TemplateValue::Bool(b) => b.to_string(),
            TemplateValue::List(items) => items
                .iter()
                .map(|v| v.render())
                .collect::<Vec<_>>()
                .join(","),
            TemplateValue::Map(_) => self.to_json().to_string(),
            TemplateValue::Null => String::new(),
        }
    }

    /// Convert this value to JSON.
    ///
    /// Non-finite numbers have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TemplateValue::String(s) => serde_json::Value::String(s.clone()),
            TemplateValue::Number(n) if is_integral(*n) => serde_json::Value::from(*n as i64),
            TemplateValue::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            TemplateValue::Bool(b) => serde_json::Value::Bool(*b),
            TemplateValue::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            TemplateValue::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            TemplateValue::Null => serde_json::Value::Null,
        }
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if is_integral(n) {
        // Also folds -0 into "0".
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<serde_json::Value> for TemplateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => TemplateValue::Null,
            serde_json::Value::Bool(b) => TemplateValue::Bool(b),
            serde_json::Value::Number(n) => {
                n.as_f64().map_or(TemplateValue::Null, TemplateValue::Number)
            }
            serde_json::Value::String(s) => TemplateValue::String(s),
            serde_json::Value::Array(items) => {
                TemplateValue::List(items.into_iter().map(TemplateValue::from).collect())
            }
            serde_json::Value::Object(fields) => TemplateValue::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, TemplateValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}

impl From<f64> for TemplateValue {
    fn from(n: f64) -> Self {
        TemplateValue::Number(n)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for TemplateValue {
                fn from(n: $t) -> Self {
                    TemplateValue::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl<T: Into<TemplateValue>> From<Vec<T>> for TemplateValue {
    fn from(items: Vec<T>) -> Self {
        TemplateValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TemplateValue>> From<Option<T>> for TemplateValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TemplateValue::Null, Into::into)
    }
}

/// The top-level variable bindings a template is rendered against.
///
/// This is the outermost frame of the rendering scope; loop frames are
/// layered on top of it during evaluation (see [`crate::scope`]) without
/// ever mutating it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    variables: HashMap<String, TemplateValue>,
}

impl TemplateContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object.
    ///
    /// Fails if `value` is not an object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(k, v)| (k, TemplateValue::from(v)))
                .collect()),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "template context must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build a context from any serializable value whose serialized form is
    /// an object (typically a struct or a map).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Self::from_json(serde_json::to_value(value)?)
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Get a top-level variable.
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.variables.get(key)
    }

    /// Get a variable by path (e.g., `["employee", "salary"]`).
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        if path.is_empty() {
            return None;
        }

        self.get(path[0]).and_then(|v| v.get_path(&path[1..]))
    }

    /// Number of top-level bindings.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the context has no bindings.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, TemplateValue)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, TemplateValue)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

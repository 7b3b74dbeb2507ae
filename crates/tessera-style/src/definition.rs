//! Declarative style definitions.
//!
//! A [`StyleDefinition`] is the input to style construction: an
//! insertion-ordered map from key to [`DefinitionValue`]. The key prefix
//! decides what an entry means:
//!
//! | Key                          | Meaning                        |
//! |------------------------------|--------------------------------|
//! | `$setup`, `$kill`, `$state`  | lifecycle hooks                |
//! | `$$hover`, `$$hover:focus`   | pseudo-class group             |
//! | `$title`                     | label sub-style                |
//! | `name` with a nested value   | nested component style         |
//! | `name` with a scalar value   | literal CSS property           |
//!
//! # Example
//!
//! ```
//! use tessera_style::StyleDefinition;
//!
//! let definition = StyleDefinition::new()
//!     .with("color", "black")
//!     .with("fontSize", 12)
//!     .with("$$hover", StyleDefinition::new().with("color", "red"));
//! assert_eq!(definition.len(), 3);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::css::CssScalar;
use crate::error::{Error, Result};
use crate::style::Style;

/// A lifecycle hook invoked with the component a style is applied to.
pub type Hook = Arc<dyn Fn(&dyn Component) + Send + Sync>;

/// The value side of a definition entry.
#[derive(Clone)]
pub enum DefinitionValue {
    /// A literal CSS value.
    Scalar(CssScalar),
    /// A nested definition (component style, label style or pseudo-class group).
    Definition(StyleDefinition),
    /// An already-constructed style.
    Style(Style),
    /// A lifecycle hook.
    Hook(Hook),
}

impl DefinitionValue {
    /// Wrap a closure as a hook value.
    pub fn hook<F>(hook: F) -> Self
    where
        F: Fn(&dyn Component) + Send + Sync + 'static,
    {
        DefinitionValue::Hook(Arc::new(hook))
    }

    /// Short description used in error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            DefinitionValue::Scalar(_) => "a literal value",
            DefinitionValue::Definition(_) => "a nested definition",
            DefinitionValue::Style(_) => "a Style object",
            DefinitionValue::Hook(_) => "a function",
        }
    }
}

impl fmt::Debug for DefinitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            DefinitionValue::Definition(def) => f.debug_tuple("Definition").field(def).finish(),
            DefinitionValue::Style(style) => f.debug_tuple("Style").field(style).finish(),
            DefinitionValue::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

impl From<CssScalar> for DefinitionValue {
    fn from(value: CssScalar) -> Self {
        DefinitionValue::Scalar(value)
    }
}

impl From<f64> for DefinitionValue {
    fn from(value: f64) -> Self {
        DefinitionValue::Scalar(value.into())
    }
}

impl From<i32> for DefinitionValue {
    fn from(value: i32) -> Self {
        DefinitionValue::Scalar(value.into())
    }
}

impl From<&str> for DefinitionValue {
    fn from(value: &str) -> Self {
        DefinitionValue::Scalar(value.into())
    }
}

impl From<String> for DefinitionValue {
    fn from(value: String) -> Self {
        DefinitionValue::Scalar(value.into())
    }
}

impl From<StyleDefinition> for DefinitionValue {
    fn from(value: StyleDefinition) -> Self {
        DefinitionValue::Definition(value)
    }
}

impl From<Style> for DefinitionValue {
    fn from(value: Style) -> Self {
        DefinitionValue::Style(value)
    }
}

impl From<&Style> for DefinitionValue {
    fn from(value: &Style) -> Self {
        DefinitionValue::Style(value.clone())
    }
}

/// An insertion-ordered style definition.
///
/// Inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default)]
pub struct StyleDefinition {
    entries: Vec<(String, DefinitionValue)>,
}

impl StyleDefinition {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DefinitionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DefinitionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&DefinitionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether an entry exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefinitionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the definition has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow merge: every entry of `other` is inserted over this one.
    pub fn merge(&mut self, other: &StyleDefinition) {
        for (key, value) in &other.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Load a definition from a JSON object.
    ///
    /// Numbers and strings become literal values, booleans become the text
    /// `true`/`false`, and objects become nested definitions. Key order is
    /// preserved. Arrays and `null` have no meaning in a definition and are
    /// rejected, as is any non-object at the top level.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut definition = StyleDefinition::new();
                for (key, value) in map {
                    definition.insert(key.clone(), json_entry(key, value)?);
                }
                Ok(definition)
            }
            other => Err(Error::invalid_definition(
                "",
                format!("expected a JSON object, found {}", json_kind(other)),
            )),
        }
    }
}

fn json_entry(key: &str, value: &serde_json::Value) -> Result<DefinitionValue> {
    use serde_json::Value;

    match value {
        Value::Number(number) => number
            .as_f64()
            .map(DefinitionValue::from)
            .ok_or_else(|| Error::invalid_definition(key, "number is out of range")),
        Value::String(text) => Ok(DefinitionValue::from(text.as_str())),
        Value::Bool(flag) => Ok(DefinitionValue::from(flag.to_string())),
        Value::Object(_) => Ok(DefinitionValue::Definition(StyleDefinition::from_json(
            value,
        )?)),
        Value::Array(_) | Value::Null => Err(Error::invalid_definition(
            key,
            format!("{} can't be used as a style value", json_kind(value)),
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_keeps_first_position() {
        let mut definition = StyleDefinition::new().with("color", "red").with("width", 5);
        definition.insert("color", "blue");

        let keys: Vec<_> = definition.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["color", "width"]);
        assert!(matches!(
            definition.get("color"),
            Some(DefinitionValue::Scalar(CssScalar::Text(text))) if text == "blue"
        ));
    }

    #[test]
    fn merge_overrides_shared_keys() {
        let mut base = StyleDefinition::new().with("color", "red").with("width", 5);
        base.merge(&StyleDefinition::new().with("width", 7).with("height", 2));

        let keys: Vec<_> = base.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["color", "width", "height"]);
        assert!(matches!(
            base.get("width"),
            Some(DefinitionValue::Scalar(CssScalar::Number(n))) if *n == 7.0
        ));
    }

    #[test]
    fn from_json_preserves_order_and_nesting() {
        let value = json!({
            "zIndex": 2,
            "color": "red",
            "$$hover": { "color": "blue" },
            "visible": true
        });
        let definition = StyleDefinition::from_json(&value).unwrap();

        let keys: Vec<_> = definition.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zIndex", "color", "$$hover", "visible"]);
        assert!(matches!(
            definition.get("$$hover"),
            Some(DefinitionValue::Definition(nested)) if nested.len() == 1
        ));
        assert!(matches!(
            definition.get("visible"),
            Some(DefinitionValue::Scalar(CssScalar::Text(text))) if text == "true"
        ));
    }

    #[test]
    fn from_json_rejects_arrays_and_null() {
        let err = StyleDefinition::from_json(&json!({ "margin": [1, 2] })).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { ref key, .. } if key == "margin"));

        let err = StyleDefinition::from_json(&json!({ "nested": { "color": null } })).unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { ref key, .. } if key == "color"));

        assert!(StyleDefinition::from_json(&json!("color: red")).is_err());
    }
}

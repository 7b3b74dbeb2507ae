//! CSS property names and values.
//!
//! Definitions use camelCase names (`backgroundColor`) and bare numbers
//! (`width: 10`). Before anything reaches a stylesheet backend the name is
//! mapped to kebab-case and numbers pick up a `px` unit, unless the property is
//! dimensionless (`opacity`, `z-index`, ...).

use std::fmt;

/// Properties whose numeric values are written without a unit.
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "column-count",
    "fill-opacity",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "widows",
    "z-index",
    "zoom",
];

/// A literal property value as written in a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum CssScalar {
    /// A number; gains `px` unless the property is unitless.
    Number(f64),
    /// Text, used verbatim.
    Text(String),
}

impl From<f64> for CssScalar {
    fn from(value: f64) -> Self {
        CssScalar::Number(value)
    }
}

impl From<i32> for CssScalar {
    fn from(value: i32) -> Self {
        CssScalar::Number(f64::from(value))
    }
}

impl From<&str> for CssScalar {
    fn from(value: &str) -> Self {
        CssScalar::Text(value.to_string())
    }
}

impl From<String> for CssScalar {
    fn from(value: String) -> Self {
        CssScalar::Text(value)
    }
}

/// Map a camelCase property name to kebab-case.
///
/// Every ASCII uppercase letter becomes `-` followed by its lowercase form, so
/// `MozBoxSizing` maps to `-moz-box-sizing`. Names without uppercase letters
/// are returned unchanged.
pub fn map_camel_case(name: &str) -> String {
    let mut mapped = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            mapped.push('-');
            mapped.push(ch.to_ascii_lowercase());
        } else {
            mapped.push(ch);
        }
    }
    mapped
}

/// Whether numbers for `property` (kebab-case) are written without a unit.
pub fn is_unitless(property: &str) -> bool {
    UNITLESS_PROPERTIES.contains(&property)
}

/// Render a literal value for `property` (kebab-case).
pub fn css_value(property: &str, value: &CssScalar) -> String {
    match value {
        CssScalar::Number(n) if is_unitless(property) => n.to_string(),
        CssScalar::Number(n) => format!("{n}px"),
        CssScalar::Text(text) => text.clone(),
    }
}

/// An insertion-ordered set of normalized CSS declarations.
///
/// Inserting an existing property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssProperties {
    entries: Vec<(String, String)>,
}

impl CssProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-normalized declaration.
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == property) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Normalize a definition entry and insert it.
    pub fn insert_literal(&mut self, name: &str, value: &CssScalar) {
        let property = map_camel_case(name);
        let value = css_value(&property, value);
        self.insert(property, value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(property, value);
        self
    }

    /// Value of a declaration.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CssProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

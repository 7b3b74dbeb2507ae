//! Stylesheet backends.
//!
//! Style construction hands every generated rule to a [`StylesheetBackend`].
//! Backends must be idempotent on selectors: registering a selector that is
//! already present replaces its declarations rather than adding a second
//! rule. [`StyleSheet`] is the in-memory backend used by tests and headless
//! hosts; it keeps rules in registration order and can render them as CSS.

use std::fmt::Write as _;

use parking_lot::Mutex;

use crate::css::CssProperties;
use crate::logging::targets;

/// Receiver of generated CSS rules.
pub trait StylesheetBackend: Send + Sync {
    /// Register (or replace) the rule for `selector`.
    fn register(&self, selector: &str, properties: &CssProperties);
}

/// A single registered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// The rule's selector, e.g. `._ComponentStyle_3:first-line`.
    pub selector: String,
    /// The rule's declarations.
    pub properties: CssProperties,
    /// Position of the first registration of this selector.
    pub order: u32,
}

#[derive(Debug, Default)]
struct SheetInner {
    rules: Vec<StyleRule>,
    registrations: usize,
}

/// An in-memory stylesheet.
#[derive(Debug, Default)]
pub struct StyleSheet {
    inner: Mutex<SheetInner>,
}

impl StyleSheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every rule in registration order.
    pub fn rules(&self) -> Vec<StyleRule> {
        self.inner.lock().rules.clone()
    }

    /// The rule registered for `selector`, if any.
    pub fn rule(&self, selector: &str) -> Option<StyleRule> {
        self.inner
            .lock()
            .rules
            .iter()
            .find(|rule| rule.selector == selector)
            .cloned()
    }

    /// Get the number of rules.
    pub fn len(&self) -> usize {
        self.inner.lock().rules.len()
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().rules.is_empty()
    }

    /// Total number of `register` calls, including repeated selectors.
    pub fn registration_count(&self) -> usize {
        self.inner.lock().registrations
    }

    /// Clear all rules.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.rules.clear();
        inner.registrations = 0;
    }

    /// Render every rule as CSS text.
    pub fn to_css(&self) -> String {
        let inner = self.inner.lock();
        let mut css = String::new();
        for rule in &inner.rules {
            let _ = writeln!(css, "{} {{", rule.selector);
            for (name, value) in rule.properties.iter() {
                let _ = writeln!(css, "  {name}: {value};");
            }
            css.push_str("}\n");
        }
        css
    }
}

impl StylesheetBackend for StyleSheet {
    fn register(&self, selector: &str, properties: &CssProperties) {
        let mut inner = self.inner.lock();
        inner.registrations += 1;
        match inner.rules.iter_mut().find(|rule| rule.selector == selector) {
            Some(rule) => {
                tracing::trace!(target: targets::BACKEND, selector, "replacing rule");
                rule.properties = properties.clone();
            }
            None => {
                tracing::trace!(target: targets::BACKEND, selector, "adding rule");
                let order = inner.rules.len() as u32;
                inner.rules.push(StyleRule {
                    selector: selector.to_string(),
                    properties: properties.clone(),
                    order,
                });
            }
        }
    }
}

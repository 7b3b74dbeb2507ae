//! The construction context.
//!
//! A [`Styler`] bundles what building a style needs: the configuration, the
//! pseudo-class registry that decides which tokens are emulated, and the
//! backend that receives generated rules. There is no global registry; every
//! construction goes through a styler.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_style::{StyleDefinition, StyleSheet, Styler};
//!
//! let sheet = Arc::new(StyleSheet::new());
//! let styler = Styler::new(sheet.clone());
//!
//! let style = styler
//!     .style(&StyleDefinition::new().with("color", "red").with("width", 10))
//!     .unwrap();
//! let rule = sheet.rule(&style.selector()).unwrap();
//! assert_eq!(rule.properties.get("width"), Some("10px"));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::StylesheetBackend;
use crate::config::StylerConfig;
use crate::css::CssProperties;
use crate::defaults::{DEFAULT_CLASS_NAME, default_style_values, input_style_values};
use crate::definition::StyleDefinition;
use crate::error::Result;
use crate::logging::targets;
use crate::pseudo::registry::{PseudoClassEmulator, PseudoClassRegistry};
use crate::style::{self, RuleDefinition, Style};

static NEXT_CLASS_NUMBER: AtomicU64 = AtomicU64::new(0);

/// Options for a single construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleOptions {
    /// The definition is a label style; it may not declare labels itself.
    pub in_label: bool,
}

impl StyleOptions {
    /// Options for building a label style.
    pub fn in_label() -> Self {
        Self { in_label: true }
    }
}

/// Builds styles against a registry and a stylesheet backend.
pub struct Styler {
    config: StylerConfig,
    registry: PseudoClassRegistry,
    backend: Arc<dyn StylesheetBackend>,
}

impl fmt::Debug for Styler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Styler")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Styler {
    /// A styler with the default configuration and the built-in emulators.
    pub fn new(backend: Arc<dyn StylesheetBackend>) -> Self {
        Self::with_config(backend, StylerConfig::default())
    }

    /// A styler with a custom configuration.
    pub fn with_config(backend: Arc<dyn StylesheetBackend>, config: StylerConfig) -> Self {
        Self {
            config,
            registry: PseudoClassRegistry::new(),
            backend,
        }
    }

    /// Replace the pseudo-class registry.
    pub fn with_registry(mut self, registry: PseudoClassRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &StylerConfig {
        &self.config
    }

    /// The pseudo-class registry.
    pub fn registry(&self) -> &PseudoClassRegistry {
        &self.registry
    }

    /// The stylesheet backend.
    pub fn backend(&self) -> &Arc<dyn StylesheetBackend> {
        &self.backend
    }

    /// Register an emulated pseudo-class for styles built from now on.
    pub fn add_pseudo_class<E>(&mut self, name: impl Into<String>, emulator: E) -> Result<()>
    where
        E: PseudoClassEmulator + 'static,
    {
        self.registry.add_pseudo_class(name, emulator)
    }

    /// Build a style.
    pub fn style(&self, definition: &StyleDefinition) -> Result<Style> {
        self.style_with(definition, StyleOptions::default())
    }

    /// Build a style with explicit options.
    pub fn style_with(&self, definition: &StyleDefinition, options: StyleOptions) -> Result<Style> {
        style::build(self, definition, options)
    }

    /// Register the `_default_` inheritance-reset class and the `input`
    /// cursor rule.
    pub fn install_defaults(&self) {
        self.backend
            .register(&format!(".{DEFAULT_CLASS_NAME}"), &default_style_values());
        self.backend.register("input", &input_style_values());
        tracing::debug!(target: targets::PARSE, "installed default rules");
    }

    pub(crate) fn next_class_name(&self) -> String {
        let number = NEXT_CLASS_NUMBER.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.config.class_prefix, number)
    }

    pub(crate) fn register_rule(
        &self,
        selector: String,
        properties: &CssProperties,
        record: &mut Vec<RuleDefinition>,
    ) {
        self.backend.register(&selector, properties);
        if self.config.dev_mode {
            record.push(RuleDefinition {
                selector,
                properties: properties.clone(),
            });
        }
    }
}

//! Configuration for a [`Styler`](crate::Styler).

/// Prefix of generated class names unless configured otherwise.
pub const DEFAULT_CLASS_PREFIX: &str = "_ComponentStyle_";

/// Styler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StylerConfig {
    /// Prefix of generated class names; a global counter is appended.
    pub class_prefix: String,
    /// Record every rule a style registers, see
    /// [`Style::rule_definitions`](crate::Style::rule_definitions).
    pub dev_mode: bool,
}

impl Default for StylerConfig {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            dev_mode: false,
        }
    }
}

impl StylerConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class name prefix.
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Enable or disable dev mode.
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = StylerConfig::new();
        assert_eq!(config.class_prefix, "_ComponentStyle_");
        assert!(!config.dev_mode);

        let config = StylerConfig::new().class_prefix("app-").dev_mode(true);
        assert_eq!(config.class_prefix, "app-");
        assert!(config.dev_mode);
    }
}

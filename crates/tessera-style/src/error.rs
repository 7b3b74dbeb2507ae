//! Error types for style construction and pseudo-class registration.
//!
//! Every error here is a configuration fault: it is raised synchronously while
//! a definition is being turned into a [`Style`](crate::Style) or while the
//! pseudo-class registry is being extended, and never while a style is live.

use std::fmt;

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which kind of prefixed key had an empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A `$` label key.
    Label,
    /// A `$$` pseudo-class group key.
    PseudoClass,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Label => write!(f, "label"),
            NameKind::PseudoClass => write!(f, "pseudo-class"),
        }
    }
}

/// Errors that can occur in the styling system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `$setup`, `$kill` or `$state` was given something other than a hook.
    #[error("'{key}' must be a function")]
    LifecycleHookType { key: String },

    /// A `$` or `$$` key with nothing after the prefix.
    #[error("Empty {kind} name not valid (style key '{key}')")]
    EmptyName { kind: NameKind, key: String },

    /// A label style declared inside another label style.
    #[error("Can't create nested label style '{label}' because components can only have one label")]
    NestedLabel { label: String },

    /// A purely native pseudo-class carrying something only emulation supports.
    #[error("{what} can't be used within the pseudo-class '{pseudo_class}'")]
    UnsupportedInPseudoClass { pseudo_class: String, what: String },

    /// A pseudo-class token or parameter that could not be parsed.
    #[error("Pseudo-class '{pseudo_class}' is invalid: {message}")]
    InvalidPseudoClassSyntax {
        pseudo_class: String,
        message: String,
    },

    /// A pseudo-class registered twice.
    #[error("The pseudo-class '{name}' is already defined")]
    DuplicatePseudoClass { name: String },

    /// A definition entry whose value cannot be used for its key.
    #[error("Invalid style definition entry '{key}': {message}")]
    InvalidDefinition { key: String, message: String },
}

impl Error {
    /// Create a lifecycle hook type error.
    pub fn lifecycle_hook_type(key: impl Into<String>) -> Self {
        Self::LifecycleHookType { key: key.into() }
    }

    /// Create an empty-name error.
    pub fn empty_name(kind: NameKind, key: impl Into<String>) -> Self {
        Self::EmptyName {
            kind,
            key: key.into(),
        }
    }

    /// Create a nested label error.
    pub fn nested_label(label: impl Into<String>) -> Self {
        Self::NestedLabel {
            label: label.into(),
        }
    }

    /// Create an unsupported-in-pseudo-class error.
    pub fn unsupported_in_pseudo_class(
        pseudo_class: impl Into<String>,
        what: impl Into<String>,
    ) -> Self {
        Self::UnsupportedInPseudoClass {
            pseudo_class: pseudo_class.into(),
            what: what.into(),
        }
    }

    /// Create a pseudo-class syntax error.
    pub fn invalid_pseudo_class(
        pseudo_class: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPseudoClassSyntax {
            pseudo_class: pseudo_class.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate pseudo-class error.
    pub fn duplicate_pseudo_class(name: impl Into<String>) -> Self {
        Self::DuplicatePseudoClass { name: name.into() }
    }

    /// Create an invalid definition error.
    pub fn invalid_definition(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            key: key.into(),
            message: message.into(),
        }
    }
}

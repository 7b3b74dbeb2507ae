//! The component abstraction styles are applied to.
//!
//! Styles never own components. A host implements [`Component`] for its
//! widget type; the engine reads the component's DOM node, parent, label and
//! value, subscribes to its events, and assigns styles through
//! [`Component::set_style`]. Hosts are expected to kill the previous style and
//! set up the new one inside `set_style`; see [`Widget`](crate::Widget) for the
//! reference implementation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tessera_core::{ConnectionId, DomNode};

use crate::style::Style;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique component identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Component events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentEvent {
    /// The component was attached to a (new) parent.
    NewParent,
    /// The component was removed from its parent.
    ParentRemoved,
    /// The component's value changed.
    Change,
}

/// A component's current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ComponentValue {
    /// No value.
    #[default]
    Empty,
    /// A boolean, e.g. a checkbox.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text.
    Text(String),
}

impl ComponentValue {
    /// Truthiness: `false`, `0`, `NaN`, empty text and no value are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            ComponentValue::Empty => false,
            ComponentValue::Bool(value) => *value,
            ComponentValue::Number(value) => *value != 0.0 && !value.is_nan(),
            ComponentValue::Text(text) => !text.is_empty(),
        }
    }
}

impl From<bool> for ComponentValue {
    fn from(value: bool) -> Self {
        ComponentValue::Bool(value)
    }
}

impl From<f64> for ComponentValue {
    fn from(value: f64) -> Self {
        ComponentValue::Number(value)
    }
}

impl From<&str> for ComponentValue {
    fn from(value: &str) -> Self {
        ComponentValue::Text(value.to_string())
    }
}

impl From<String> for ComponentValue {
    fn from(value: String) -> Self {
        ComponentValue::Text(value)
    }
}

/// Listener callback for component events.
pub type ComponentListener = Box<dyn Fn() + Send + Sync>;

/// A UI component that styles can be applied to.
pub trait Component: Send + Sync {
    /// Stable identity, used to key per-component emulation state.
    fn id(&self) -> ComponentId;

    /// The component's root DOM node.
    fn dom_node(&self) -> &DomNode;

    /// The component's parent, if attached.
    fn parent(&self) -> Option<Arc<dyn Component>>;

    /// The component's label, used to pick label styles.
    fn label(&self) -> Option<&str>;

    /// The component's current value.
    fn val(&self) -> ComponentValue;

    /// Read an attribute of the component's DOM node.
    fn attr(&self, name: &str) -> Option<String> {
        self.dom_node().attribute(name)
    }

    /// Subscribe to a component event.
    fn on(&self, event: ComponentEvent, listener: ComponentListener) -> ConnectionId;

    /// Remove a listener added with [`on`](Self::on). Returns `true` if it
    /// was registered.
    fn remove_listener(&self, event: ComponentEvent, id: ConnectionId) -> bool;

    /// The style currently applied.
    fn style(&self) -> Option<Style>;

    /// Replace the applied style.
    ///
    /// Implementations call [`Style::kill`] on the previous style and
    /// [`Style::setup`] on the new one, in that order, and do nothing when
    /// the style is unchanged.
    fn set_style(&self, style: Option<Style>);
}

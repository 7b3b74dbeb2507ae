//! Reference [`Component`] implementation over a headless [`DomNode`].
//!
//! A [`Widget`] owns one element node, an optional label, a value and a style
//! slot. Parent/child relations are mirrored into the DOM, and the component
//! events the emulators rely on are emitted from the matching mutators:
//! [`add`](Widget::add) emits `NewParent`, [`remove`](Widget::remove) emits
//! `ParentRemoved`, [`set_val`](Widget::set_val) emits `Change`.
//!
//! Assigning a style kills the previous one before setting up the new one.
//! Dropping a widget kills its style and releases its node.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_core::Document;
//! use tessera_style::{StyleDefinition, StyleSheet, Styler, Widget};
//!
//! let document = Document::new();
//! let styler = Styler::new(Arc::new(StyleSheet::new()));
//! let style = styler
//!     .style(
//!         &StyleDefinition::new()
//!             .with("color", "black")
//!             .with("$$checked", StyleDefinition::new().with("color", "green")),
//!     )
//!     .unwrap();
//!
//! let checkbox = Widget::new(&document, "input");
//! checkbox.apply_style(&style);
//! assert_eq!(checkbox.current_style(), Some(style.clone()));
//!
//! checkbox.set_val(true);
//! assert_eq!(checkbox.current_style(), style.variant("checked"));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tessera_core::{ConnectionId, Document, DomError, DomNode, Signal};

use crate::component::{Component, ComponentEvent, ComponentId, ComponentListener, ComponentValue};
use crate::logging::targets;
use crate::style::Style;

/// A minimal styled component.
pub struct Widget {
    id: ComponentId,
    node: DomNode,
    label: Option<String>,
    this: Weak<Widget>,
    parent: Mutex<Option<Weak<Widget>>>,
    value: Mutex<ComponentValue>,
    style: Mutex<Option<Style>>,
    new_parent: Signal<()>,
    parent_removed: Signal<()>,
    change: Signal<()>,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("node", &self.node.id())
            .field("label", &self.label)
            .field("value", &*self.value.lock())
            .finish_non_exhaustive()
    }
}

impl Widget {
    /// Create an unlabelled widget backed by a new `tag` element.
    pub fn new(document: &Arc<Document>, tag: &str) -> Arc<Self> {
        Self::build(document, tag, None)
    }

    /// Create a labelled widget.
    pub fn with_label(document: &Arc<Document>, tag: &str, label: impl Into<String>) -> Arc<Self> {
        Self::build(document, tag, Some(label.into()))
    }

    fn build(document: &Arc<Document>, tag: &str, label: Option<String>) -> Arc<Self> {
        let node = document.create_element(tag);
        Arc::new_cyclic(|this| Self {
            id: ComponentId::next(),
            node,
            label,
            this: this.clone(),
            parent: Mutex::new(None),
            value: Mutex::new(ComponentValue::Empty),
            style: Mutex::new(None),
            new_parent: Signal::new(),
            parent_removed: Signal::new(),
            change: Signal::new(),
        })
    }

    fn as_component(&self) -> Option<Arc<dyn Component>> {
        self.this.upgrade().map(|this| this as Arc<dyn Component>)
    }

    fn signal(&self, event: ComponentEvent) -> &Signal<()> {
        match event {
            ComponentEvent::NewParent => &self.new_parent,
            ComponentEvent::ParentRemoved => &self.parent_removed,
            ComponentEvent::Change => &self.change,
        }
    }

    /// The widget's parent widget.
    pub fn parent_widget(&self) -> Option<Arc<Widget>> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Append `child`, moving it out of its current parent first.
    pub fn add(self: &Arc<Self>, child: &Arc<Widget>) -> Result<(), DomError> {
        if let Some(previous) = child.parent_widget() {
            previous.remove(child)?;
        }
        self.node.append_child(&child.node)?;
        *child.parent.lock() = Some(Arc::downgrade(self));
        tracing::trace!(target: targets::EMULATION, parent = %self.id, child = %child.id, "widget added");
        child.new_parent.emit(());
        Ok(())
    }

    /// Remove `child` from this widget.
    pub fn remove(&self, child: &Arc<Widget>) -> Result<(), DomError> {
        self.node.remove_child(&child.node)?;
        *child.parent.lock() = None;
        tracing::trace!(target: targets::EMULATION, parent = %self.id, child = %child.id, "widget removed");
        child.parent_removed.emit(());
        Ok(())
    }

    /// Remove this widget from its parent, if it has one.
    pub fn detach(self: &Arc<Self>) -> Result<(), DomError> {
        match self.parent_widget() {
            Some(parent) => parent.remove(self),
            None => Ok(()),
        }
    }

    /// Set the value and emit `Change`.
    pub fn set_val(&self, value: impl Into<ComponentValue>) {
        *self.value.lock() = value.into();
        self.change.emit(());
    }

    /// Set an attribute on the widget's node.
    pub fn set_attr(&self, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        self.node.set_attribute(name, value)
    }

    /// Remove an attribute from the widget's node.
    pub fn remove_attr(&self, name: &str) -> Result<bool, DomError> {
        self.node.remove_attribute(name)
    }

    /// Apply `style` resolved for this widget's label.
    pub fn apply_style(&self, style: &Style) {
        self.set_style(Some(style.get(self)));
    }

    /// Remove the current style.
    pub fn clear_style(&self) {
        self.set_style(None);
    }

    /// The style currently applied.
    pub fn current_style(&self) -> Option<Style> {
        self.style.lock().clone()
    }

    /// Number of listeners subscribed to `event`.
    pub fn listener_count(&self, event: ComponentEvent) -> usize {
        self.signal(event).connection_count()
    }
}

impl Component for Widget {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn dom_node(&self) -> &DomNode {
        &self.node
    }

    fn parent(&self) -> Option<Arc<dyn Component>> {
        self.parent_widget().map(|parent| parent as Arc<dyn Component>)
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn val(&self) -> ComponentValue {
        self.value.lock().clone()
    }

    fn on(&self, event: ComponentEvent, listener: ComponentListener) -> ConnectionId {
        self.signal(event).connect(move |_| listener())
    }

    fn remove_listener(&self, event: ComponentEvent, id: ConnectionId) -> bool {
        self.signal(event).disconnect(id)
    }

    fn style(&self) -> Option<Style> {
        self.style.lock().clone()
    }

    fn set_style(&self, style: Option<Style>) {
        let previous = self.style.lock().clone();
        if previous == style {
            return;
        }
        let Some(this) = self.as_component() else {
            *self.style.lock() = style;
            return;
        };

        if let Some(previous) = &previous {
            previous.kill(this.as_ref());
        }
        *self.style.lock() = style.clone();
        if let Some(next) = &style {
            next.setup(&this);
        }
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        if let Some(style) = self.style.get_mut().take() {
            style.kill(&*self);
        }
        self.node.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn add_and_remove_emit_parent_events() {
        let document = Document::new();
        let parent = Widget::new(&document, "div");
        let child = Widget::new(&document, "span");

        let added = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));
        child.on(ComponentEvent::NewParent, {
            let added = added.clone();
            Box::new(move || {
                added.fetch_add(1, Ordering::SeqCst);
            })
        });
        child.on(ComponentEvent::ParentRemoved, {
            let removed = removed.clone();
            Box::new(move || {
                removed.fetch_add(1, Ordering::SeqCst);
            })
        });

        parent.add(&child).unwrap();
        assert_eq!(added.load(Ordering::SeqCst), 1);
        assert_eq!(child.parent().unwrap().id(), parent.id());
        assert_eq!(child.dom_node().parent_node(), Some(parent.dom_node().clone()));

        child.detach().unwrap();
        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert!(child.parent().is_none());
        assert!(parent.dom_node().children().is_empty());
    }

    #[test]
    fn moving_between_parents_emits_both_events() {
        let document = Document::new();
        let first = Widget::new(&document, "div");
        let second = Widget::new(&document, "div");
        let child = Widget::new(&document, "span");
        first.add(&child).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        for (event, name) in [
            (ComponentEvent::NewParent, "new"),
            (ComponentEvent::ParentRemoved, "removed"),
        ] {
            let events = events.clone();
            child.on(event, Box::new(move || events.lock().push(name)));
        }

        second.add(&child).unwrap();
        assert_eq!(*events.lock(), vec!["removed", "new"]);
        assert_eq!(child.parent_widget().unwrap().id(), second.id());
    }

    #[test]
    fn set_val_emits_change_and_listeners_can_be_removed() {
        let document = Document::new();
        let widget = Widget::new(&document, "input");
        let changes = Arc::new(AtomicUsize::new(0));
        let id = widget.on(ComponentEvent::Change, {
            let changes = changes.clone();
            Box::new(move || {
                changes.fetch_add(1, Ordering::SeqCst);
            })
        });

        widget.set_val(true);
        assert!(widget.val().is_truthy());
        assert!(widget.remove_listener(ComponentEvent::Change, id));
        assert!(!widget.remove_listener(ComponentEvent::Change, id));
        widget.set_val(false);
        assert_eq!(changes.load(Ordering::SeqCst), 1);
        assert_eq!(widget.listener_count(ComponentEvent::Change), 0);
    }

    #[test]
    fn attr_reads_the_dom_node() {
        let document = Document::new();
        let widget = Widget::with_label(&document, "input", "name");
        assert_eq!(widget.label(), Some("name"));
        widget.set_attr("required", "").unwrap();
        assert_eq!(widget.attr("required").as_deref(), Some(""));
        assert!(widget.remove_attr("required").unwrap());
        assert_eq!(widget.attr("required"), None);
    }
}

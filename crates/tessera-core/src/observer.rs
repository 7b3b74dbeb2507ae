//! Mutation observation for the headless document.
//!
//! A [`MutationObserver`] is created with a callback and then pointed at one or
//! more nodes with [`MutationObserver::observe`]. Attribute edits and child-list
//! edits on observed nodes invoke the callback synchronously, after the
//! document lock has been released, so callbacks are free to edit the tree or
//! re-target observers. Observation stops on [`MutationObserver::disconnect`]
//! or when the observer is dropped; an observer disconnected while a mutation
//! is being delivered does not receive it.

use std::sync::Arc;

use slotmap::new_key_type;

use crate::dom::{Document, DomNode, NodeId};
use crate::error::DomError;
use crate::logging::targets;

new_key_type! {
    /// Identifier of an observer registration within a [`Document`].
    pub struct ObserverId;
}

pub(crate) type ObserverCallback = Arc<dyn Fn(&MutationRecord) + Send + Sync>;

/// Which kinds of mutation an observation reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Report attribute edits on the target.
    pub attributes: bool,
    /// Report additions and removals of the target's children.
    pub child_list: bool,
}

impl ObserveOptions {
    /// Observe attribute edits only.
    pub fn attributes() -> Self {
        Self {
            attributes: true,
            child_list: false,
        }
    }

    /// Observe child-list edits only.
    pub fn child_list() -> Self {
        Self {
            attributes: false,
            child_list: true,
        }
    }
}

/// The kind of a reported mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// An attribute was set or removed.
    Attributes {
        /// The attribute name.
        name: String,
    },
    /// A child was appended or removed.
    ChildList,
}

/// A single mutation delivered to an observer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// What changed.
    pub kind: MutationKind,
    /// The observed node that changed.
    pub target: NodeId,
}

/// Observes attribute and child-list changes on document nodes.
pub struct MutationObserver {
    document: Arc<Document>,
    id: ObserverId,
}

impl std::fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationObserver")
            .field("id", &self.id)
            .field("observing", &self.is_observing())
            .finish()
    }
}

impl MutationObserver {
    /// Create an observer for nodes of `document`. It observes nothing until
    /// [`observe`](Self::observe) is called.
    pub fn new<F>(document: &Arc<Document>, callback: F) -> Self
    where
        F: Fn(&MutationRecord) + Send + Sync + 'static,
    {
        let id = document.register_observer(Arc::new(callback));
        Self {
            document: document.clone(),
            id,
        }
    }

    /// Start (or re-configure) observation of `target`.
    pub fn observe(&self, target: &DomNode, options: ObserveOptions) -> Result<(), DomError> {
        if !Arc::ptr_eq(&self.document, target.document()) {
            return Err(DomError::ForeignNode);
        }
        tracing::trace!(target: targets::OBSERVER, observer = ?self.id, node = ?target.id(), "observing");
        self.document.observe(self.id, target.id(), options)
    }

    /// Stop observing every target. The observer may be re-targeted afterwards.
    pub fn disconnect(&self) {
        tracing::trace!(target: targets::OBSERVER, observer = ?self.id, "disconnected");
        self.document.disconnect_observer(self.id);
    }

    /// Whether the observer currently has at least one target.
    pub fn is_observing(&self) -> bool {
        self.document.is_observing(self.id)
    }
}

impl Drop for MutationObserver {
    fn drop(&mut self) {
        self.document.release_observer(self.id);
    }
}

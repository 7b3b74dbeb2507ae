//! Headless document model.
//!
//! [`Document`] is a minimal DOM: element nodes with attributes and an ordered
//! child list, a single hover target, per-node event listeners and
//! [`MutationObserver`](crate::MutationObserver) delivery. It is the substrate
//! the pseudo-class emulation runs against when no browser is present, and it
//! is deliberately small: there is no text content, no bubbling and no
//! selector engine.
//!
//! Nodes are addressed through [`DomNode`] handles, which pair the owning
//! document with a [`NodeId`]. A node lives until [`DomNode::release`] frees
//! it; handles do not own their node.
//!
//! # Hover
//!
//! [`Document::set_hovered`] moves the hover target. A node is hovered when it
//! is the target or one of the target's ancestors, mirroring CSS `:hover`.
//! Nodes leaving the hover chain receive `mouseout`, nodes entering it receive
//! `mouseover`.
//!
//! # Example
//!
//! ```
//! use tessera_core::Document;
//!
//! let document = Document::new();
//! let list = document.create_element("ul");
//! let item = document.create_element("li");
//! list.append_child(&item).unwrap();
//!
//! assert_eq!(item.position_in_parent(), Some((0, 1)));
//! assert_eq!(item.parent_node().map(|p| p.id()), Some(list.id()));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::DomError;
use crate::logging::targets;
use crate::observer::{MutationKind, MutationRecord, ObserveOptions, ObserverCallback, ObserverId};
use crate::signal::{ConnectionId, Signal};

new_key_type! {
    /// Identifier of a node within its [`Document`].
    pub struct NodeId;
}

/// Event delivered to DOM event listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// Event type, e.g. `"mouseover"`.
    pub kind: String,
    /// The node the event was dispatched to.
    pub target: NodeId,
}

struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    listeners: HashMap<String, Arc<Signal<DomEvent>>>,
}

impl NodeData {
    fn new(tag: String) -> Self {
        Self {
            tag,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            listeners: HashMap::new(),
        }
    }
}

struct ObserverEntry {
    callback: ObserverCallback,
    targets: Vec<(NodeId, ObserveOptions)>,
}

#[derive(Default)]
struct DocumentInner {
    nodes: SlotMap<NodeId, NodeData>,
    hovered: Option<NodeId>,
    observers: SlotMap<ObserverId, ObserverEntry>,
}

impl DocumentInner {
    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id).ok_or(DomError::NodeNotFound)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(id).ok_or(DomError::NodeNotFound)
    }

    /// The node followed by all of its ancestors.
    fn chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes.get(parent).and_then(|n| n.parent);
        }
        chain
    }

    fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(child)?.parent.take()?;
        if let Some(data) = self.nodes.get_mut(parent) {
            data.children.retain(|&c| c != child);
        }
        Some(parent)
    }

    fn interested(&self, record: &MutationRecord) -> Vec<(ObserverId, ObserverCallback)> {
        self.observers
            .iter()
            .filter(|(_, entry)| {
                entry.targets.iter().any(|(node, options)| {
                    *node == record.target
                        && match record.kind {
                            MutationKind::Attributes { .. } => options.attributes,
                            MutationKind::ChildList => options.child_list,
                        }
                })
            })
            .map(|(id, entry)| (id, entry.callback.clone()))
            .collect()
    }
}

/// A headless document owning a tree of element nodes.
///
/// Documents are always handled through `Arc<Document>`; node handles keep
/// their document alive.
pub struct Document {
    inner: Mutex<DocumentInner>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Document")
            .field("nodes", &inner.nodes.len())
            .field("hovered", &inner.hovered)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(DocumentInner::default()),
        })
    }

    /// Create a detached element node.
    pub fn create_element(self: &Arc<Self>, tag: impl Into<String>) -> DomNode {
        let id = self.inner.lock().nodes.insert(NodeData::new(tag.into()));
        DomNode {
            document: self.clone(),
            id,
        }
    }

    /// Get a handle for an existing node.
    pub fn node(self: &Arc<Self>, id: NodeId) -> Option<DomNode> {
        self.inner.lock().nodes.contains_key(id).then(|| DomNode {
            document: self.clone(),
            id,
        })
    }

    /// Number of nodes in the document.
    pub fn node_count(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    /// The current hover target, if any.
    pub fn hovered(&self) -> Option<NodeId> {
        self.inner.lock().hovered
    }

    /// Move the hover target, dispatching `mouseout` and `mouseover`.
    pub fn set_hovered(self: &Arc<Self>, target: Option<&DomNode>) {
        let (left, entered) = {
            let mut inner = self.inner.lock();
            let old_chain = inner.hovered.map(|id| inner.chain(id)).unwrap_or_default();
            let new_chain = target.map(|node| inner.chain(node.id)).unwrap_or_default();
            inner.hovered = target.map(|node| node.id);

            let left: Vec<NodeId> = old_chain
                .iter()
                .copied()
                .filter(|id| !new_chain.contains(id))
                .collect();
            let entered: Vec<NodeId> = new_chain
                .iter()
                .copied()
                .filter(|id| !old_chain.contains(id))
                .collect();
            (left, entered)
        };

        tracing::trace!(
            target: targets::DOM,
            left = left.len(),
            entered = entered.len(),
            "hover target moved"
        );

        for id in left {
            self.dispatch(id, "mouseout");
        }
        for id in entered {
            self.dispatch(id, "mouseover");
        }
    }

    fn dispatch(&self, id: NodeId, kind: &str) -> usize {
        let signal = {
            let inner = self.inner.lock();
            inner
                .nodes
                .get(id)
                .and_then(|node| node.listeners.get(kind).cloned())
        };
        match signal {
            Some(signal) => signal.emit(DomEvent {
                kind: kind.to_string(),
                target: id,
            }),
            None => 0,
        }
    }

    fn notify(&self, record: MutationRecord) {
        let callbacks = self.inner.lock().interested(&record);
        if callbacks.is_empty() {
            return;
        }
        tracing::trace!(
            target: targets::OBSERVER,
            observers = callbacks.len(),
            kind = ?record.kind,
            "delivering mutation"
        );
        for (id, callback) in callbacks {
            // A previous callback may have disconnected this observer.
            if !self.is_observing(id) {
                continue;
            }
            callback(&record);
        }
    }

    pub(crate) fn register_observer(&self, callback: ObserverCallback) -> ObserverId {
        self.inner.lock().observers.insert(ObserverEntry {
            callback,
            targets: Vec::new(),
        })
    }

    pub(crate) fn observe(
        &self,
        id: ObserverId,
        target: NodeId,
        options: ObserveOptions,
    ) -> Result<(), DomError> {
        let mut inner = self.inner.lock();
        inner.node(target)?;
        let entry = inner
            .observers
            .get_mut(id)
            .ok_or(DomError::ObserverReleased)?;
        match entry.targets.iter_mut().find(|(node, _)| *node == target) {
            Some((_, existing)) => *existing = options,
            None => entry.targets.push((target, options)),
        }
        Ok(())
    }

    pub(crate) fn disconnect_observer(&self, id: ObserverId) {
        if let Some(entry) = self.inner.lock().observers.get_mut(id) {
            entry.targets.clear();
        }
    }

    pub(crate) fn release_observer(&self, id: ObserverId) {
        self.inner.lock().observers.remove(id);
    }

    pub(crate) fn is_observing(&self, id: ObserverId) -> bool {
        self.inner
            .lock()
            .observers
            .get(id)
            .is_some_and(|entry| !entry.targets.is_empty())
    }

    /// Number of observers that currently have at least one target.
    pub fn active_observer_count(&self) -> usize {
        self.inner
            .lock()
            .observers
            .values()
            .filter(|entry| !entry.targets.is_empty())
            .count()
    }
}

/// Handle to a node in a [`Document`].
#[derive(Clone)]
pub struct DomNode {
    document: Arc<Document>,
    id: NodeId,
}

impl std::fmt::Debug for DomNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomNode").field("id", &self.id).finish()
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.document, &other.document)
    }
}

impl Eq for DomNode {}

impl DomNode {
    /// The node's identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document owning this node.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// The element tag this node was created with.
    pub fn tag(&self) -> String {
        self.document
            .inner
            .lock()
            .nodes
            .get(self.id)
            .map(|node| node.tag.clone())
            .unwrap_or_default()
    }

    /// The parent node, if attached.
    pub fn parent_node(&self) -> Option<DomNode> {
        let parent = self.document.inner.lock().nodes.get(self.id)?.parent?;
        Some(DomNode {
            document: self.document.clone(),
            id: parent,
        })
    }

    /// Child nodes in document order.
    pub fn children(&self) -> Vec<DomNode> {
        let ids = self
            .document
            .inner
            .lock()
            .nodes
            .get(self.id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        ids.into_iter()
            .map(|id| DomNode {
                document: self.document.clone(),
                id,
            })
            .collect()
    }

    /// Zero-based index among the parent's children, with the sibling count.
    ///
    /// Returns `None` for detached nodes.
    pub fn position_in_parent(&self) -> Option<(usize, usize)> {
        let inner = self.document.inner.lock();
        let parent = inner.nodes.get(self.id)?.parent?;
        let siblings = &inner.nodes.get(parent)?.children;
        let index = siblings.iter().position(|&id| id == self.id)?;
        Some((index, siblings.len()))
    }

    /// Append `child`, moving it out of its current parent first.
    pub fn append_child(&self, child: &DomNode) -> Result<(), DomError> {
        if !Arc::ptr_eq(&self.document, &child.document) {
            return Err(DomError::ForeignNode);
        }
        let old_parent = {
            let mut inner = self.document.inner.lock();
            inner.node(self.id)?;
            inner.node(child.id)?;
            if inner.chain(self.id).contains(&child.id) {
                return Err(DomError::HierarchyRequest);
            }
            let old_parent = inner.detach(child.id);
            inner.node_mut(self.id)?.children.push(child.id);
            inner.node_mut(child.id)?.parent = Some(self.id);
            old_parent
        };

        tracing::trace!(target: targets::DOM, parent = ?self.id, child = ?child.id, "appended child");

        if let Some(old_parent) = old_parent {
            self.document.notify(MutationRecord {
                kind: MutationKind::ChildList,
                target: old_parent,
            });
        }
        self.document.notify(MutationRecord {
            kind: MutationKind::ChildList,
            target: self.id,
        });
        Ok(())
    }

    /// Remove `child` from this node's child list.
    pub fn remove_child(&self, child: &DomNode) -> Result<(), DomError> {
        {
            let mut inner = self.document.inner.lock();
            if inner.node(child.id)?.parent != Some(self.id) {
                return Err(DomError::NotAChild);
            }
            inner.detach(child.id);
        }

        tracing::trace!(target: targets::DOM, parent = ?self.id, child = ?child.id, "removed child");

        self.document.notify(MutationRecord {
            kind: MutationKind::ChildList,
            target: self.id,
        });
        Ok(())
    }

    /// Free this node.
    ///
    /// The node is removed from its parent, its children become detached
    /// roots and observer targets on it are dropped. If the node is on the
    /// hover chain the hover target first moves to its former parent.
    /// Afterwards every operation on the node fails with
    /// [`DomError::NodeNotFound`].
    ///
    /// Returns `false` if the node was already released.
    pub fn release(&self) -> bool {
        if self.is_hovered() {
            self.document.set_hovered(self.parent_node().as_ref());
        }
        let parent = {
            let mut inner = self.document.inner.lock();
            let Some(node) = inner.nodes.get(self.id) else {
                return false;
            };
            let children = node.children.clone();
            let parent = inner.detach(self.id);
            for child in children {
                if let Some(data) = inner.nodes.get_mut(child) {
                    data.parent = None;
                }
            }
            for entry in inner.observers.values_mut() {
                entry.targets.retain(|(target, _)| *target != self.id);
            }
            inner.nodes.remove(self.id);
            parent
        };

        tracing::trace!(target: targets::DOM, node = ?self.id, "released node");

        if let Some(parent) = parent {
            self.document.notify(MutationRecord {
                kind: MutationKind::ChildList,
                target: parent,
            });
        }
        true
    }

    /// Read an attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let inner = self.document.inner.lock();
        inner
            .nodes
            .get(self.id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Set an attribute, notifying attribute observers.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        let value = value.into();
        {
            let mut inner = self.document.inner.lock();
            let node = inner.node_mut(self.id)?;
            match node.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value,
                None => node.attributes.push((name.to_string(), value)),
            }
        }
        self.document.notify(MutationRecord {
            kind: MutationKind::Attributes {
                name: name.to_string(),
            },
            target: self.id,
        });
        Ok(())
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&self, name: &str) -> Result<bool, DomError> {
        let removed = {
            let mut inner = self.document.inner.lock();
            let node = inner.node_mut(self.id)?;
            let before = node.attributes.len();
            node.attributes.retain(|(key, _)| key != name);
            node.attributes.len() != before
        };
        if removed {
            self.document.notify(MutationRecord {
                kind: MutationKind::Attributes {
                    name: name.to_string(),
                },
                target: self.id,
            });
        }
        Ok(removed)
    }

    /// Register an event listener for `kind` events on this node.
    pub fn add_event_listener<F>(&self, kind: &str, listener: F) -> Result<ConnectionId, DomError>
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let signal = {
            let mut inner = self.document.inner.lock();
            inner
                .node_mut(self.id)?
                .listeners
                .entry(kind.to_string())
                .or_default()
                .clone()
        };
        Ok(signal.connect(listener))
    }

    /// Remove an event listener. Returns `true` if it was registered.
    pub fn remove_event_listener(&self, kind: &str, id: ConnectionId) -> bool {
        let signal = {
            let inner = self.document.inner.lock();
            inner
                .nodes
                .get(self.id)
                .and_then(|node| node.listeners.get(kind).cloned())
        };
        signal.is_some_and(|signal| signal.disconnect(id))
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: &str) -> usize {
        let inner = self.document.inner.lock();
        inner
            .nodes
            .get(self.id)
            .and_then(|node| node.listeners.get(kind))
            .map_or(0, |signal| signal.connection_count())
    }

    /// Dispatch an event to this node's listeners. Returns the number invoked.
    pub fn dispatch_event(&self, kind: &str) -> usize {
        self.document.dispatch(self.id, kind)
    }

    /// Whether this node is the hover target or one of its ancestors.
    pub fn is_hovered(&self) -> bool {
        let inner = self.document.inner.lock();
        inner
            .hovered
            .is_some_and(|hovered| inner.chain(hovered).contains(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_append_and_position() {
        let document = Document::new();
        let list = document.create_element("ul");
        let items: Vec<DomNode> = (0..3).map(|_| document.create_element("li")).collect();
        for item in &items {
            list.append_child(item).unwrap();
        }

        assert_eq!(list.children().len(), 3);
        assert_eq!(items[0].position_in_parent(), Some((0, 3)));
        assert_eq!(items[2].position_in_parent(), Some((2, 3)));
        assert_eq!(list.position_in_parent(), None);

        list.remove_child(&items[0]).unwrap();
        assert_eq!(items[2].position_in_parent(), Some((1, 2)));
        assert!(items[0].parent_node().is_none());
    }

    #[test]
    fn test_append_moves_between_parents() {
        let document = Document::new();
        let a = document.create_element("div");
        let b = document.create_element("div");
        let child = document.create_element("span");

        a.append_child(&child).unwrap();
        b.append_child(&child).unwrap();

        assert!(a.children().is_empty());
        assert_eq!(child.parent_node(), Some(b.clone()));
    }

    #[test]
    fn test_hierarchy_errors() {
        let document = Document::new();
        let outer = document.create_element("div");
        let inner = document.create_element("div");
        outer.append_child(&inner).unwrap();

        assert_eq!(inner.append_child(&outer), Err(DomError::HierarchyRequest));
        assert_eq!(outer.append_child(&outer), Err(DomError::HierarchyRequest));
        assert_eq!(inner.remove_child(&outer), Err(DomError::NotAChild));

        let other = Document::new().create_element("div");
        assert_eq!(outer.append_child(&other), Err(DomError::ForeignNode));
    }

    #[test]
    fn test_release_unlinks_and_frees() {
        let document = Document::new();
        let list = document.create_element("ul");
        let item = document.create_element("li");
        let inner = document.create_element("span");
        list.append_child(&item).unwrap();
        item.append_child(&inner).unwrap();
        assert_eq!(document.node_count(), 3);

        assert!(item.release());
        assert!(!item.release());
        assert_eq!(document.node_count(), 2);
        assert!(list.children().is_empty());
        assert!(inner.parent_node().is_none());
        assert!(document.node(item.id()).is_none());
        assert_eq!(item.set_attribute("id", "x"), Err(DomError::NodeNotFound));
        assert_eq!(list.append_child(&item), Err(DomError::NodeNotFound));
    }

    #[test]
    fn test_attributes() {
        let document = Document::new();
        let input = document.create_element("input");

        assert_eq!(input.attribute("required"), None);
        input.set_attribute("required", "").unwrap();
        assert_eq!(input.attribute("required"), Some(String::new()));
        assert!(input.remove_attribute("required").unwrap());
        assert!(!input.remove_attribute("required").unwrap());
    }

    #[test]
    fn test_hover_chain_and_events() {
        let document = Document::new();
        let outer = document.create_element("div");
        let inner = document.create_element("div");
        outer.append_child(&inner).unwrap();

        let overs = Arc::new(AtomicUsize::new(0));
        let outs = Arc::new(AtomicUsize::new(0));
        let overs_clone = overs.clone();
        let outs_clone = outs.clone();
        outer
            .add_event_listener("mouseover", move |_| {
                overs_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        outer
            .add_event_listener("mouseout", move |_| {
                outs_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        document.set_hovered(Some(&inner));
        assert!(inner.is_hovered());
        assert!(outer.is_hovered());
        assert_eq!(overs.load(Ordering::SeqCst), 1);

        // Moving within the chain does not leave `outer`.
        document.set_hovered(Some(&outer));
        assert!(!inner.is_hovered());
        assert_eq!(outs.load(Ordering::SeqCst), 0);

        document.set_hovered(None);
        assert!(!outer.is_hovered());
        assert_eq!(outs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_listener_removal() {
        let document = Document::new();
        let node = document.create_element("button");
        let id = node.add_event_listener("click", |_| {}).unwrap();

        assert_eq!(node.listener_count("click"), 1);
        assert_eq!(node.dispatch_event("click"), 1);
        assert!(node.remove_event_listener("click", id));
        assert!(!node.remove_event_listener("click", id));
        assert_eq!(node.dispatch_event("click"), 0);
    }
}

//! Error types for Tessera core.

use std::fmt;

/// Errors raised by the headless document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node does not exist in its document.
    NodeNotFound,
    /// The node belongs to a different document.
    ForeignNode,
    /// The edit would make a node its own ancestor.
    HierarchyRequest,
    /// The node is not a child of the node it was removed from.
    NotAChild,
    /// The observer registration has been released.
    ObserverReleased,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound => write!(f, "Node does not exist in its document"),
            Self::ForeignNode => write!(f, "Node belongs to a different document"),
            Self::HierarchyRequest => {
                write!(f, "The operation would make a node its own ancestor")
            }
            Self::NotAChild => write!(f, "The node is not a child of this node"),
            Self::ObserverReleased => write!(f, "The mutation observer has been released"),
        }
    }
}

impl std::error::Error for DomError {}

/// A specialized Result type for document operations.
pub type Result<T> = std::result::Result<T, DomError>;

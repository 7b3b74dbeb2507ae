//! Core systems for Tessera.
//!
//! This crate provides the substrate the Tessera style engine runs against:
//!
//! - **Signal/Slot System**: type-safe subscription with [`ConnectionId`]s,
//!   used for component events
//! - **Headless Document**: element nodes, attributes, child lists, hover and
//!   per-node event listeners
//! - **Mutation Observers**: attribute and child-list change notification
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tessera_core::{Document, MutationObserver, ObserveOptions};
//!
//! let document = Document::new();
//! let input = document.create_element("input");
//!
//! let changes = Arc::new(AtomicUsize::new(0));
//! let changes_clone = changes.clone();
//! let observer = MutationObserver::new(&document, move |_| {
//!     changes_clone.fetch_add(1, Ordering::SeqCst);
//! });
//! observer.observe(&input, ObserveOptions::attributes()).unwrap();
//!
//! input.set_attribute("required", "").unwrap();
//! assert_eq!(changes.load(Ordering::SeqCst), 1);
//! ```

pub mod dom;
mod error;
pub mod logging;
pub mod observer;
pub mod signal;

pub use dom::{DomEvent, DomNode, Document, NodeId};
pub use error::{DomError, Result};
pub use observer::{MutationKind, MutationObserver, MutationRecord, ObserveOptions, ObserverId};
pub use signal::{ConnectionId, Signal};

static_assertions::assert_impl_all!(Document: Send, Sync);
static_assertions::assert_impl_all!(DomNode: Send, Sync);
static_assertions::assert_impl_all!(MutationObserver: Send, Sync);
static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

//! Style composition and pseudo-class emulation for Tessera components.
//!
//! This crate compiles nested style definitions into generated CSS classes and
//! keeps components styled as their state changes:
//!
//! - **Definitions**: literal properties, nested component styles (`Name`),
//!   label styles (`$label`), pseudo-class groups (`$$hover`) and lifecycle
//!   hooks (`$setup`, `$kill`, `$state`)
//! - **Combination**: every subset of declared emulated pseudo-classes gets a
//!   variant carrying the merged properties of its parts
//! - **Emulation**: pseudo-classes a stylesheet cannot express per component
//!   (`hover`, `checked`, `required`, `last-child`, `nth-child(..)`) are
//!   tracked per component, and the most specific matching variant is applied
//! - **Backends**: generated rules go to a [`StylesheetBackend`]; [`StyleSheet`]
//!   is an in-memory one
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_core::Document;
//! use tessera_style::{Component, StyleDefinition, StyleSheet, Styler, Widget};
//!
//! let sheet = Arc::new(StyleSheet::new());
//! let styler = Styler::new(sheet.clone());
//!
//! let style = styler
//!     .style(
//!         &StyleDefinition::new()
//!             .with("backgroundColor", "white")
//!             .with("$$hover", StyleDefinition::new().with("backgroundColor", "gray"))
//!             .with("$$visited", StyleDefinition::new().with("color", "purple")),
//!     )
//!     .unwrap();
//!
//! // `visited` is native and becomes a rule; `hover` is emulated.
//! assert!(sheet.rule(&format!("{}:visited", style.selector())).is_some());
//! assert_eq!(style.emulated_pseudo_classes(), vec!["hover"]);
//!
//! let document = Document::new();
//! let button = Widget::new(&document, "button");
//! button.apply_style(&style);
//!
//! document.set_hovered(Some(button.dom_node()));
//! assert_eq!(button.current_style(), style.variant("hover"));
//! document.set_hovered(None);
//! assert_eq!(button.current_style(), Some(style));
//! ```

pub mod backend;
pub mod component;
pub mod config;
pub mod css;
pub mod defaults;
pub mod definition;
mod error;
pub mod logging;
pub(crate) mod parser;
pub mod pseudo;
pub mod state;
pub mod style;
pub mod styler;
pub mod widget;

pub use backend::{StyleRule, StyleSheet, StylesheetBackend};
pub use component::{Component, ComponentEvent, ComponentId, ComponentListener, ComponentValue};
pub use config::StylerConfig;
pub use css::{CssProperties, CssScalar};
pub use definition::{DefinitionValue, Hook, StyleDefinition};
pub use error::{Error, NameKind, Result};
pub use pseudo::{
    NthExpr, PseudoClassEmulator, PseudoClassParameter, PseudoClassRegistry, PseudoClassToken,
    SetupState, Transitions,
};
pub use state::{PseudoClassState, select_variant};
pub use style::{RuleDefinition, Style, StyleVariant};
pub use styler::{StyleOptions, Styler};
pub use widget::Widget;

static_assertions::assert_impl_all!(Style: Send, Sync);
static_assertions::assert_impl_all!(Styler: Send, Sync);
static_assertions::assert_impl_all!(StyleSheet: Send, Sync);
static_assertions::assert_impl_all!(Widget: Send, Sync);

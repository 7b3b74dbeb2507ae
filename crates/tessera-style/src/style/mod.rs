//! Style objects.
//!
//! A [`Style`] is what a definition compiles to: a generated class name
//! registered with the stylesheet backend, the styles of nested components and
//! labels, optional lifecycle hooks, and (when the definition declared
//! emulated pseudo-classes) a table of variants to switch between.
//!
//! A style and its variants form a *family* that is shared behind one `Arc`.
//! `Style` is a cheap handle into that family, so cloning is free and two
//! handles compare equal exactly when they name the same member of the same
//! family. Styles are immutable once built.
//!
//! # Hook stages
//!
//! Applying a style runs, in order, the user `$setup` hook and then the
//! emulation stage, which attaches pseudo-class listeners to the component.
//! Removing it runs the emulation stage's teardown first and the user `$kill`
//! hook last.
//!
//! If a different member of the family already applies when a style is set
//! up, the component is handed to that member through
//! [`Component::set_style`] and neither of this member's hooks runs.

mod builder;
mod emulation;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::component::{Component, ComponentId};
use crate::css::CssProperties;
use crate::definition::Hook;
use crate::pseudo::token::canonical_key;
use crate::state::PseudoClassState;

pub(crate) use builder::build;
pub(crate) use emulation::{Emulation, Variant};

/// A rule registered during construction, recorded in dev mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    /// The rule's selector.
    pub selector: String,
    /// The rule's declarations.
    pub properties: CssProperties,
}

/// Everything one member of a style family holds.
#[derive(Clone)]
pub(crate) struct StyleData {
    pub(crate) class_name: String,
    pub(crate) css: CssProperties,
    pub(crate) component_styles: BTreeMap<String, Style>,
    pub(crate) label_styles: BTreeMap<String, Style>,
    pub(crate) setup: Option<Hook>,
    pub(crate) kill: Option<Hook>,
    pub(crate) state_handler: Option<Hook>,
    pub(crate) rule_definitions: Vec<RuleDefinition>,
}

/// A base style and its pseudo-class variants. Member 0 is the base.
pub(crate) struct StyleFamily {
    pub(crate) members: Vec<StyleData>,
    pub(crate) emulation: Option<Emulation>,
}

/// One entry of a style's variant table.
#[derive(Debug, Clone)]
pub struct StyleVariant {
    /// Canonical key of the emulated pseudo-classes, e.g. `checked:hover`.
    pub key: String,
    /// The variant applies while all of these hold.
    pub pseudo_classes: Vec<String>,
    /// Whether the variant was generated by combining declared ones.
    pub generated: bool,
    /// The variant's style.
    pub style: Style,
}

/// A compiled style.
#[derive(Clone)]
pub struct Style {
    family: Arc<StyleFamily>,
    index: usize,
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family) && self.index == other.index
    }
}

impl Eq for Style {}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("Style")
            .field("class_name", &data.class_name)
            .field("css", &data.css)
            .field("components", &data.component_styles.keys().collect::<Vec<_>>())
            .field("labels", &data.label_styles.keys().collect::<Vec<_>>())
            .field("variant", &self.index)
            .finish_non_exhaustive()
    }
}

impl Style {
    pub(crate) fn from_family(family: StyleFamily) -> Self {
        Self {
            family: Arc::new(family),
            index: 0,
        }
    }

    pub(crate) fn data(&self) -> &StyleData {
        &self.family.members[self.index]
    }

    fn member(&self, index: usize) -> Style {
        Style {
            family: self.family.clone(),
            index,
        }
    }

    /// The generated class name, e.g. `_ComponentStyle_12`.
    pub fn class_name(&self) -> &str {
        &self.data().class_name
    }

    /// The class selector, e.g. `._ComponentStyle_12`.
    pub fn selector(&self) -> String {
        format!(".{}", self.data().class_name)
    }

    /// The normalized declarations registered for this style's class.
    pub fn css(&self) -> &CssProperties {
        &self.data().css
    }

    /// The style for the nested component `name`.
    pub fn component_style(&self, name: &str) -> Option<&Style> {
        self.data().component_styles.get(name)
    }

    /// All nested component styles, by name.
    pub fn component_styles(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.data()
            .component_styles
            .iter()
            .map(|(name, style)| (name.as_str(), style))
    }

    /// The style used for components labelled `label`.
    pub fn label_style(&self, label: &str) -> Option<&Style> {
        self.data().label_styles.get(label)
    }

    /// All label styles, by label.
    pub fn label_styles(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.data()
            .label_styles
            .iter()
            .map(|(label, style)| (label.as_str(), style))
    }

    /// Resolve the style for `component`: its label style if one matches,
    /// otherwise this style.
    pub fn get(&self, component: &dyn Component) -> Style {
        component
            .label()
            .and_then(|label| self.label_style(label))
            .cloned()
            .unwrap_or_else(|| self.clone())
    }

    /// The `$state` handler, if declared.
    pub fn state_handler(&self) -> Option<&Hook> {
        self.data().state_handler.as_ref()
    }

    /// Rules registered while building this style. Empty unless the styler
    /// runs in dev mode.
    pub fn rule_definitions(&self) -> &[RuleDefinition] {
        &self.data().rule_definitions
    }

    /// The family's base style.
    pub fn base(&self) -> Style {
        self.member(0)
    }

    /// Whether this handle names a pseudo-class variant rather than the base.
    pub fn is_variant(&self) -> bool {
        self.index != 0
    }

    /// Whether the family emulates any pseudo-classes.
    pub fn has_emulation(&self) -> bool {
        self.family.emulation.is_some()
    }

    /// The distinct emulated pseudo-class tokens, e.g. `nth-child(2n+1)`.
    pub fn emulated_pseudo_classes(&self) -> Vec<&str> {
        self.family
            .emulation
            .as_ref()
            .map(|emulation| emulation.token_keys().collect())
            .unwrap_or_default()
    }

    /// The variant table, most general entries first.
    pub fn variants(&self) -> Vec<StyleVariant> {
        let Some(emulation) = self.family.emulation.as_ref() else {
            return Vec::new();
        };
        emulation
            .variants()
            .iter()
            .map(|variant| StyleVariant {
                key: variant.key.clone(),
                pseudo_classes: variant
                    .tokens
                    .iter()
                    .map(|&token| emulation.token_key(token).to_string())
                    .collect(),
                generated: variant.generated,
                style: self.member(variant.member),
            })
            .collect()
    }

    /// The variant for `key`, in any token order.
    pub fn variant(&self, key: &str) -> Option<Style> {
        let key = canonical_key(key);
        let emulation = self.family.emulation.as_ref()?;
        emulation
            .variants()
            .iter()
            .find(|variant| variant.key == key)
            .map(|variant| self.member(variant.member))
    }

    /// Apply this style to `component`: run the `$setup` hook, then start
    /// pseudo-class emulation.
    ///
    /// The host's `set_style` is expected to kill the previous style and set
    /// up the new one.
    pub fn setup(&self, component: &Arc<dyn Component>) {
        if let Some(emulation) = &self.family.emulation {
            let member = emulation.initial_member(component.as_ref());
            if member != self.index {
                let selected = self.member(member);
                emulation.redirect(component.id(), || component.set_style(Some(selected)));
                return;
            }
        }
        if let Some(hook) = &self.data().setup {
            hook(component.as_ref());
        }
        if let Some(emulation) = &self.family.emulation {
            emulation.attach(&self.family, component);
        }
    }

    /// Remove this style from `component`: stop pseudo-class emulation, then
    /// run the `$kill` hook. An emulating style that is not attached to
    /// `component` does nothing.
    pub fn kill(&self, component: &dyn Component) {
        if let Some(emulation) = &self.family.emulation
            && !emulation.detach(component)
        {
            return;
        }
        if let Some(hook) = &self.data().kill {
            hook(component);
        }
    }

    /// Whether pseudo-class emulation is attached to the component `id`.
    pub fn is_attached(&self, id: ComponentId) -> bool {
        self.family
            .emulation
            .as_ref()
            .is_some_and(|emulation| emulation.is_attached(id))
    }

    /// Number of components the family's emulation is attached to.
    pub fn attachment_count(&self) -> usize {
        self.family
            .emulation
            .as_ref()
            .map_or(0, |emulation| emulation.attachment_count())
    }

    /// Snapshot of the pseudo-class state held for the component `id`.
    pub fn pseudo_class_state(&self, id: ComponentId) -> Option<PseudoClassState> {
        self.family.emulation.as_ref()?.state(id)
    }
}

//! Classification of definition entries.
//!
//! Every entry of a [`StyleDefinition`] is classified exactly once into a
//! [`DefinitionEntry`] before anything is built or registered, so a
//! malformed definition fails without leaving rules behind.

use crate::css::{CssProperties, CssScalar, map_camel_case};
use crate::definition::{DefinitionValue, Hook, StyleDefinition};
use crate::error::{Error, NameKind, Result};
use crate::logging::targets;
use crate::pseudo::flatten::PseudoValue;
use crate::style::Style;

/// Lifecycle hook slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookKind {
    Setup,
    Kill,
    State,
}

impl HookKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "$setup" => Some(HookKind::Setup),
            "$kill" => Some(HookKind::Kill),
            "$state" => Some(HookKind::State),
            _ => None,
        }
    }
}

/// A nested value: a definition still to be built, or a finished style.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Nested<'a> {
    Definition(&'a StyleDefinition),
    Style(&'a Style),
}

impl Nested<'_> {
    pub(crate) fn to_pseudo(self) -> PseudoValue {
        match self {
            Nested::Definition(definition) => PseudoValue::Definition(definition.clone()),
            Nested::Style(style) => PseudoValue::Style(style.clone()),
        }
    }
}

/// One classified definition entry.
pub(crate) enum DefinitionEntry<'a> {
    LiteralProperty {
        name: &'a str,
        value: &'a CssScalar,
    },
    NestedComponentStyle {
        name: &'a str,
        value: Nested<'a>,
    },
    LabelStyle {
        label: &'a str,
        value: Nested<'a>,
    },
    PseudoClassGroup {
        key: String,
        value: Nested<'a>,
    },
    LifecycleHook {
        kind: HookKind,
        hook: &'a Hook,
    },
}

fn nested<'a>(key: &str, value: &'a DefinitionValue, role: &str) -> Result<Nested<'a>> {
    match value {
        DefinitionValue::Definition(definition) => Ok(Nested::Definition(definition)),
        DefinitionValue::Style(style) => Ok(Nested::Style(style)),
        other => Err(Error::invalid_definition(
            key,
            format!("a {role} needs a definition or a Style object, not {}", other.kind()),
        )),
    }
}

/// Classify a single entry.
pub(crate) fn classify<'a>(
    key: &'a str,
    value: &'a DefinitionValue,
    in_label: bool,
) -> Result<DefinitionEntry<'a>> {
    if let Some(kind) = HookKind::from_key(key) {
        return match value {
            DefinitionValue::Hook(hook) => Ok(DefinitionEntry::LifecycleHook { kind, hook }),
            _ => Err(Error::lifecycle_hook_type(key)),
        };
    }

    if let Some(group) = key.strip_prefix("$$") {
        if group.is_empty() {
            return Err(Error::empty_name(NameKind::PseudoClass, key));
        }
        return Ok(DefinitionEntry::PseudoClassGroup {
            key: map_camel_case(group),
            value: nested(key, value, "pseudo-class group")?,
        });
    }

    if let Some(label) = key.strip_prefix('$') {
        if in_label {
            return Err(Error::nested_label(label));
        }
        if label.is_empty() {
            return Err(Error::empty_name(NameKind::Label, key));
        }
        return Ok(DefinitionEntry::LabelStyle {
            label,
            value: nested(key, value, "label style")?,
        });
    }

    match value {
        DefinitionValue::Scalar(scalar) => Ok(DefinitionEntry::LiteralProperty {
            name: key,
            value: scalar,
        }),
        DefinitionValue::Definition(_) | DefinitionValue::Style(_) => {
            Ok(DefinitionEntry::NestedComponentStyle {
                name: key,
                value: nested(key, value, "component style")?,
            })
        }
        DefinitionValue::Hook(_) => Err(Error::invalid_definition(
            key,
            "functions are only valid for $setup, $kill and $state",
        )),
    }
}

/// A definition split by entry kind, in declaration order.
#[derive(Default)]
pub(crate) struct ParsedDefinition<'a> {
    pub css: CssProperties,
    pub components: Vec<(&'a str, Nested<'a>)>,
    pub labels: Vec<(&'a str, Nested<'a>)>,
    pub pseudo_groups: Vec<(String, Nested<'a>)>,
    pub setup: Option<Hook>,
    pub kill: Option<Hook>,
    pub state_handler: Option<Hook>,
}

/// Classify every entry of `definition`.
pub(crate) fn parse(definition: &StyleDefinition, in_label: bool) -> Result<ParsedDefinition<'_>> {
    let mut parsed = ParsedDefinition::default();
    for (key, value) in definition.iter() {
        match classify(key, value, in_label)? {
            DefinitionEntry::LiteralProperty { name, value } => parsed.css.insert_literal(name, value),
            DefinitionEntry::NestedComponentStyle { name, value } => {
                parsed.components.push((name, value))
            }
            DefinitionEntry::LabelStyle { label, value } => parsed.labels.push((label, value)),
            DefinitionEntry::PseudoClassGroup { key, value } => {
                parsed.pseudo_groups.push((key, value))
            }
            DefinitionEntry::LifecycleHook { kind, hook } => {
                let slot = match kind {
                    HookKind::Setup => &mut parsed.setup,
                    HookKind::Kill => &mut parsed.kill,
                    HookKind::State => &mut parsed.state_handler,
                };
                *slot = Some(hook.clone());
            }
        }
    }

    tracing::trace!(
        target: targets::PARSE,
        properties = parsed.css.len(),
        components = parsed.components.len(),
        labels = parsed.labels.len(),
        pseudo_groups = parsed.pseudo_groups.len(),
        "classified definition"
    );
    Ok(parsed)
}

/// A definition holding `css` as literal text entries.
pub(crate) fn literal_definition(css: &CssProperties) -> StyleDefinition {
    let mut definition = StyleDefinition::new();
    for (name, value) in css.iter() {
        definition.insert(name, value);
    }
    definition
}

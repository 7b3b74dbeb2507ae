//! Flattening of nested pseudo-class groups.
//!
//! `$$hover: { color: red, $$focus: { outline: 0 } }` becomes two flat
//! entries: `hover` with `{color: red}` and `hover:focus` with
//! `{color: red, outline: 0}`. A nested group inherits its parent's own
//! entries and overrides them.

use crate::css::map_camel_case;
use crate::definition::{DefinitionValue, StyleDefinition};
use crate::error::{Error, NameKind, Result};
use crate::style::Style;

/// The value of a pseudo-class group after classification.
#[derive(Debug, Clone)]
pub(crate) enum PseudoValue {
    Definition(StyleDefinition),
    Style(Style),
}

impl PseudoValue {
    /// Accept a group value, rejecting scalars and hooks.
    pub(crate) fn from_group(key: &str, value: &DefinitionValue) -> Result<Self> {
        match value {
            DefinitionValue::Definition(definition) => Ok(PseudoValue::Definition(definition.clone())),
            DefinitionValue::Style(style) => Ok(PseudoValue::Style(style.clone())),
            other => Err(Error::invalid_definition(
                key,
                format!(
                    "a pseudo-class group needs a definition or a Style object, not {}",
                    other.kind()
                ),
            )),
        }
    }

    pub(crate) fn into_definition_value(self) -> DefinitionValue {
        match self {
            PseudoValue::Definition(definition) => DefinitionValue::Definition(definition),
            PseudoValue::Style(style) => DefinitionValue::Style(style),
        }
    }

    /// Fold `incoming` into this value. Definitions merge shallowly; anything
    /// involving a Style object is replaced wholesale.
    pub(crate) fn absorb(&mut self, incoming: PseudoValue) {
        match (self, incoming) {
            (PseudoValue::Definition(current), PseudoValue::Definition(next)) => current.merge(&next),
            (slot, next) => *slot = next,
        }
    }
}

/// Flat pseudo-class entries in first-declaration order.
pub(crate) type FlatGroups = Vec<(String, PseudoValue)>;

/// Insert or replace a flat entry, keeping its first position.
pub(crate) fn insert_flat(flat: &mut FlatGroups, key: String, value: PseudoValue) {
    match flat.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, slot)) => *slot = value,
        None => flat.push((key, value)),
    }
}

/// Flatten the group `group` into `flat`.
pub(crate) fn flatten_into(flat: &mut FlatGroups, group: &str, value: PseudoValue) -> Result<()> {
    let definition = match value {
        PseudoValue::Style(style) => {
            insert_flat(flat, group.to_string(), PseudoValue::Style(style));
            return Ok(());
        }
        PseudoValue::Definition(definition) => definition,
    };

    let mut own = StyleDefinition::new();
    let mut subgroups = Vec::new();
    for (key, value) in definition.iter() {
        match key.strip_prefix("$$") {
            Some(sub) => {
                let sub = map_camel_case(sub);
                if sub.is_empty() {
                    return Err(Error::empty_name(NameKind::PseudoClass, key));
                }
                subgroups.push((sub, PseudoValue::from_group(key, value)?));
            }
            None => own.insert(key, value.clone()),
        }
    }

    insert_flat(flat, group.to_string(), PseudoValue::Definition(own.clone()));
    for (sub, value) in subgroups {
        let key = format!("{group}:{sub}");
        let value = match value {
            PseudoValue::Definition(nested) => {
                let mut merged = own.clone();
                merged.merge(&nested);
                PseudoValue::Definition(merged)
            }
            style => style,
        };
        flatten_into(flat, &key, value)?;
    }
    Ok(())
}

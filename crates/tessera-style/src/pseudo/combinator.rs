//! Pseudo-class bucketing and combination.
//!
//! Flat pseudo-class entries are split into two kinds. Entries made only of
//! native tokens become plain stylesheet rules (`.class:first-line`). Entries
//! with at least one emulated token are bucketed by their sorted emulated
//! tokens; any native tokens left over are pushed one level down as a `$$`
//! group of the bucket, to be handled natively by the variant's own class.
//!
//! Because several emulated pseudo-classes can hold at once, every
//! combination of declared buckets is precomputed here. The value of any
//! bucket `K` starts from `K`'s own declaration; every other declared bucket
//! whose tokens are a subset of `K` is merged over it, fewest tokens first,
//! declaration order breaking ties.

use std::sync::Arc;

use crate::css::CssProperties;
use crate::definition::{DefinitionValue, StyleDefinition};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::pseudo::flatten::{FlatGroups, PseudoValue};
use crate::pseudo::registry::{PseudoClassEmulator, PseudoClassParameter, PseudoClassRegistry};
use crate::pseudo::token::{PseudoClassToken, SplitKey, split_key};

/// A rule for a purely native key, registered as `.<class>:<key>`.
#[derive(Debug, Clone)]
pub(crate) struct NativeRule {
    pub key: String,
    pub properties: CssProperties,
}

/// A distinct emulated token with its compiled parameter.
#[derive(Clone)]
pub(crate) struct EmulatedToken {
    pub key: String,
    pub emulator: Arc<dyn PseudoClassEmulator>,
    pub parameter: PseudoClassParameter,
}

/// A bucket of emulated tokens and the style applied while they all hold.
#[derive(Debug, Clone)]
pub(crate) struct Bucket {
    /// Canonical key, e.g. `checked:hover`.
    pub key: String,
    /// Sorted tokens of the key.
    pub tokens: Vec<String>,
    /// Positions of `tokens` in [`PseudoPlan::tokens`].
    pub indices: Vec<usize>,
    pub value: PseudoValue,
    /// Whether the bucket was produced by combination rather than declared.
    pub generated: bool,
}

/// Everything pseudo-class related a style needs, computed without side
/// effects.
pub(crate) struct PseudoPlan {
    pub native_rules: Vec<NativeRule>,
    pub buckets: Vec<Bucket>,
    pub tokens: Vec<EmulatedToken>,
}

/// Split, validate, bucket and combine flat pseudo-class entries.
pub(crate) fn plan(flat: FlatGroups, registry: &PseudoClassRegistry) -> Result<PseudoPlan> {
    let mut native_rules = Vec::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for (key, value) in flat {
        let split = split_key(&key, registry)?;
        if split.emulated.is_empty() {
            let properties = native_properties(&key, &value)?;
            native_rules.push(NativeRule { key, properties });
            continue;
        }

        let value = if split.native.is_empty() {
            value
        } else {
            PseudoValue::Definition(
                StyleDefinition::new()
                    .with(format!("$${}", split.native_key()), value.into_definition_value()),
            )
        };
        add_to_bucket(&mut buckets, split, value);
    }

    let declared = buckets.len();
    combine(&mut buckets);
    let tokens = compile_tokens(&mut buckets, registry)?;

    tracing::debug!(
        target: targets::PSEUDO,
        native = native_rules.len(),
        declared,
        generated = buckets.len() - declared,
        tokens = tokens.len(),
        "planned pseudo-classes"
    );

    Ok(PseudoPlan {
        native_rules,
        buckets,
        tokens,
    })
}

fn add_to_bucket(buckets: &mut Vec<Bucket>, split: SplitKey, value: PseudoValue) {
    let key = split.emulated_key();
    match buckets.iter_mut().find(|bucket| bucket.key == key) {
        Some(bucket) => bucket.value.absorb(value),
        None => buckets.push(Bucket {
            key,
            tokens: split.emulated,
            indices: Vec::new(),
            value,
            generated: false,
        }),
    }
}

/// Validate a purely native entry and normalize it into declarations.
fn native_properties(key: &str, value: &PseudoValue) -> Result<CssProperties> {
    let definition = match value {
        PseudoValue::Style(_) => {
            return Err(Error::unsupported_in_pseudo_class(key, "Style objects"));
        }
        PseudoValue::Definition(definition) => definition,
    };

    let mut properties = CssProperties::new();
    for (name, value) in definition.iter() {
        match (name, value) {
            ("$setup" | "$kill" | "$state", _) => {
                return Err(Error::unsupported_in_pseudo_class(key, format!("'{name}'")));
            }
            (name, _) if name.starts_with('$') => {
                return Err(Error::unsupported_in_pseudo_class(key, "Label styles"));
            }
            (_, DefinitionValue::Scalar(scalar)) => properties.insert_literal(name, scalar),
            (_, DefinitionValue::Style(_)) => {
                return Err(Error::unsupported_in_pseudo_class(key, "Style objects"));
            }
            (_, DefinitionValue::Definition(_)) => {
                return Err(Error::unsupported_in_pseudo_class(key, "Nested component styles"));
            }
            (_, DefinitionValue::Hook(_)) => {
                return Err(Error::unsupported_in_pseudo_class(key, "Functions"));
            }
        }
    }
    Ok(properties)
}

/// Generate every combination of declared buckets and compute each bucket's
/// merged value.
fn combine(buckets: &mut Vec<Bucket>) {
    let declared: Vec<(Vec<String>, StyleDefinition)> = buckets
        .iter()
        .filter_map(|bucket| match &bucket.value {
            PseudoValue::Definition(definition) => Some((bucket.tokens.clone(), definition.clone())),
            PseudoValue::Style(_) => None,
        })
        .collect();

    for size in 2..=declared.len() {
        for combination in combinations(declared.len(), size) {
            let mut tokens: Vec<String> = combination
                .iter()
                .flat_map(|&index| declared[index].0.iter().cloned())
                .collect();
            tokens.sort();
            tokens.dedup();
            let key = tokens.join(":");
            if !buckets.iter().any(|bucket| bucket.key == key) {
                buckets.push(Bucket {
                    key,
                    tokens,
                    indices: Vec::new(),
                    value: PseudoValue::Definition(StyleDefinition::new()),
                    generated: true,
                });
            }
        }
    }

    for bucket in buckets.iter_mut() {
        let own = &bucket.tokens;
        let PseudoValue::Definition(value) = &mut bucket.value else {
            continue;
        };
        let mut contributors: Vec<&(Vec<String>, StyleDefinition)> = declared
            .iter()
            .filter(|(tokens, _)| tokens.iter().all(|token| own.contains(token)))
            .collect();
        contributors.sort_by_key(|(tokens, _)| (tokens != own, tokens.len()));

        let mut merged = StyleDefinition::new();
        for (_, definition) in contributors {
            merged.merge(definition);
        }
        *value = merged;
    }
}

/// All `size`-element index combinations of `0..count`, lexicographic.
fn combinations(count: usize, size: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if size == 0 || size > count {
        return result;
    }
    let mut current: Vec<usize> = (0..size).collect();
    loop {
        result.push(current.clone());
        // Rightmost position that can still advance.
        let Some(position) = (0..size).rev().find(|&i| current[i] < count - size + i) else {
            return result;
        };
        current[position] += 1;
        for i in position + 1..size {
            current[i] = current[i - 1] + 1;
        }
    }
}

/// Collect distinct tokens in first-use order, process their parameters once
/// and point each bucket at them.
fn compile_tokens(
    buckets: &mut [Bucket],
    registry: &PseudoClassRegistry,
) -> Result<Vec<EmulatedToken>> {
    let mut compiled: Vec<EmulatedToken> = Vec::new();
    for bucket in buckets.iter_mut() {
        let mut indices = Vec::with_capacity(bucket.tokens.len());
        for raw in &bucket.tokens {
            let index = match compiled.iter().position(|token| token.key == *raw) {
                Some(index) => index,
                None => {
                    let token = PseudoClassToken::parse(raw)?;
                    let emulator = registry.get(token.name()).cloned().ok_or_else(|| {
                        Error::invalid_pseudo_class(raw.as_str(), "no emulator registered")
                    })?;
                    let parameter = emulator.process_parameter(token.parameter())?;
                    compiled.push(EmulatedToken {
                        key: raw.clone(),
                        emulator,
                        parameter,
                    });
                    compiled.len() - 1
                }
            };
            indices.push(index);
        }
        bucket.indices = indices;
    }
    Ok(compiled)
}

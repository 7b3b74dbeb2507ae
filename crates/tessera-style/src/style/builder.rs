//! Construction of styles from definitions.
//!
//! Construction runs in two phases. [`prepare`] classifies the definition and
//! everything nested in it (component styles, label styles, pseudo-class
//! variants), flattens and combines pseudo-class groups, and compiles
//! parameters. It has no side effects, so every configuration error surfaces
//! before a single rule is registered. [`realize`] then walks the prepared
//! tree, allocates class names and registers rules; it cannot fail.

use std::collections::BTreeMap;

use tessera_core::logging::PerfSpan;

use crate::css::CssProperties;
use crate::definition::{Hook, StyleDefinition};
use crate::error::Result;
use crate::logging::targets;
use crate::parser::{self, Nested};
use crate::pseudo::combinator::{self, EmulatedToken, NativeRule};
use crate::pseudo::flatten::{FlatGroups, PseudoValue, flatten_into};
use crate::pseudo::registry::PseudoClassRegistry;
use crate::style::{Emulation, RuleDefinition, Style, StyleData, StyleFamily, Variant};
use crate::styler::{StyleOptions, Styler};

/// A nested style that is either finished or still to be realized.
enum PreparedNested {
    Built(Style),
    Pending(Box<Prepared>),
}

struct PreparedVariant {
    key: String,
    indices: Vec<usize>,
    generated: bool,
    body: PreparedNested,
}

/// A fully validated definition, ready to be registered.
struct Prepared {
    css: CssProperties,
    components: Vec<(String, PreparedNested)>,
    labels: Vec<(String, PreparedNested)>,
    native_rules: Vec<NativeRule>,
    variants: Vec<PreparedVariant>,
    tokens: Vec<EmulatedToken>,
    setup: Option<Hook>,
    kill: Option<Hook>,
    state_handler: Option<Hook>,
}

/// Maps a realized style falls back to for names it does not define itself.
#[derive(Clone, Copy, Default)]
struct Inherited<'a> {
    components: Option<&'a BTreeMap<String, Style>>,
    labels: Option<&'a BTreeMap<String, Style>>,
}

/// Build a style from `definition`.
pub(crate) fn build(
    styler: &Styler,
    definition: &StyleDefinition,
    options: StyleOptions,
) -> Result<Style> {
    let _span = PerfSpan::new("style_construction");
    let prepared = prepare(styler.registry(), definition, options.in_label)?;
    Ok(realize(styler, prepared, Inherited::default()))
}

fn prepare_nested(
    registry: &PseudoClassRegistry,
    nested: Nested<'_>,
    in_label: bool,
) -> Result<PreparedNested> {
    Ok(match nested {
        Nested::Style(style) => PreparedNested::Built(style.clone()),
        Nested::Definition(definition) => {
            PreparedNested::Pending(Box::new(prepare(registry, definition, in_label)?))
        }
    })
}

fn prepare(
    registry: &PseudoClassRegistry,
    definition: &StyleDefinition,
    in_label: bool,
) -> Result<Prepared> {
    let parsed = parser::parse(definition, in_label)?;

    let mut components = Vec::with_capacity(parsed.components.len());
    for (name, nested) in &parsed.components {
        components.push((name.to_string(), prepare_nested(registry, *nested, false)?));
    }

    // Labels start from the parent's literal CSS; component styles are
    // inherited when the label is realized.
    let mut labels = Vec::with_capacity(parsed.labels.len());
    for (label, nested) in &parsed.labels {
        let body = match nested {
            Nested::Style(style) => PreparedNested::Built((*style).clone()),
            Nested::Definition(overrides) => {
                let mut merged = parser::literal_definition(&parsed.css);
                merged.merge(overrides);
                PreparedNested::Pending(Box::new(prepare(registry, &merged, true)?))
            }
        };
        labels.push((label.to_string(), body));
    }

    let mut native_rules = Vec::new();
    let mut variants = Vec::new();
    let mut tokens = Vec::new();
    if !parsed.pseudo_groups.is_empty() {
        let mut flat = FlatGroups::new();
        for (key, nested) in &parsed.pseudo_groups {
            flatten_into(&mut flat, key, nested.to_pseudo())?;
        }
        let plan = combinator::plan(flat, registry)?;

        for bucket in plan.buckets {
            let body = match bucket.value {
                PseudoValue::Style(style) => PreparedNested::Built(style),
                PseudoValue::Definition(overrides) => {
                    let mut merged = parser::literal_definition(&parsed.css);
                    merged.merge(&overrides);
                    PreparedNested::Pending(Box::new(prepare(registry, &merged, in_label)?))
                }
            };
            variants.push(PreparedVariant {
                key: bucket.key,
                indices: bucket.indices,
                generated: bucket.generated,
                body,
            });
        }
        native_rules = plan.native_rules;
        tokens = plan.tokens;
    }

    Ok(Prepared {
        css: parsed.css,
        components,
        labels,
        native_rules,
        variants,
        tokens,
        setup: parsed.setup,
        kill: parsed.kill,
        state_handler: parsed.state_handler,
    })
}

fn inherit_missing(own: &mut BTreeMap<String, Style>, inherited: Option<&BTreeMap<String, Style>>) {
    for (name, style) in inherited.into_iter().flatten() {
        own.entry(name.clone()).or_insert_with(|| style.clone());
    }
}

fn realize_nested(styler: &Styler, nested: PreparedNested, inherited: Inherited<'_>) -> Style {
    match nested {
        PreparedNested::Built(style) => style,
        PreparedNested::Pending(prepared) => realize(styler, *prepared, inherited),
    }
}

fn realize(styler: &Styler, prepared: Prepared, inherited: Inherited<'_>) -> Style {
    let Prepared {
        css,
        components,
        labels,
        native_rules,
        variants,
        tokens,
        setup,
        kill,
        state_handler,
    } = prepared;

    let mut component_styles = BTreeMap::new();
    for (name, nested) in components {
        let style = realize_nested(styler, nested, Inherited::default());
        component_styles.insert(name, style);
    }
    inherit_missing(&mut component_styles, inherited.components);

    let class_name = styler.next_class_name();
    let mut rule_definitions: Vec<RuleDefinition> = Vec::new();
    styler.register_rule(format!(".{class_name}"), &css, &mut rule_definitions);

    let mut label_styles = BTreeMap::new();
    for (label, nested) in labels {
        let for_label = Inherited {
            components: Some(&component_styles),
            labels: None,
        };
        label_styles.insert(label, realize_nested(styler, nested, for_label));
    }
    inherit_missing(&mut label_styles, inherited.labels);

    for rule in native_rules {
        styler.register_rule(
            format!(".{class_name}:{}", rule.key),
            &rule.properties,
            &mut rule_definitions,
        );
    }

    tracing::debug!(
        target: targets::PARSE,
        class_name = %class_name,
        components = component_styles.len(),
        labels = label_styles.len(),
        variants = variants.len(),
        "created style"
    );

    let mut members = vec![StyleData {
        class_name,
        css,
        component_styles,
        label_styles,
        setup,
        kill,
        state_handler,
        rule_definitions,
    }];

    if variants.is_empty() {
        return Style::from_family(StyleFamily {
            members,
            emulation: None,
        });
    }

    let mut table = Vec::with_capacity(variants.len());
    for variant in variants {
        let style = match variant.body {
            PreparedNested::Built(style) => {
                if style.has_emulation() {
                    tracing::warn!(
                        target: targets::PSEUDO,
                        key = %variant.key,
                        "a Style object used as a pseudo-class variant keeps only its base member"
                    );
                }
                style
            }
            PreparedNested::Pending(prepared) => {
                let base = &members[0];
                let for_variant = Inherited {
                    components: Some(&base.component_styles),
                    labels: Some(&base.label_styles),
                };
                realize(styler, *prepared, for_variant)
            }
        };
        members.push(style.data().clone());
        table.push(Variant {
            key: variant.key,
            tokens: variant.indices,
            member: members.len() - 1,
            generated: variant.generated,
        });
    }

    Style::from_family(StyleFamily {
        members,
        emulation: Some(Emulation::new(tokens, table)),
    })
}

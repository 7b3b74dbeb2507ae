//! Pseudo-class keys and tokens.
//!
//! A key such as `hover:nth-child(2n+1):first-line` is a colon-separated list
//! of tokens. Each token is a name with an optional parenthesized parameter.
//! Splitting a key sorts its emulated tokens and its native tokens separately,
//! so `focus:hover` and `hover:focus` name the same bucket.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::pseudo::registry::PseudoClassRegistry;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]*)(\((.*)\))?$").expect("token pattern is valid"));

/// One token of a pseudo-class key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PseudoClassToken {
    raw: String,
    name: String,
    parameter: Option<String>,
}

impl PseudoClassToken {
    /// Parse `name` or `name(parameter)`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_pseudo_class(raw, "empty pseudo-class token"));
        }
        let captures = TOKEN_PATTERN
            .captures(raw)
            .ok_or_else(|| Error::invalid_pseudo_class(raw, "unbalanced parentheses"))?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        if name.is_empty() {
            return Err(Error::invalid_pseudo_class(raw, "missing pseudo-class name"));
        }
        Ok(Self {
            raw: raw.to_string(),
            name: name.to_string(),
            parameter: captures.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// The token as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The pseudo-class name, without parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text between the parentheses, if any.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

impl fmt::Display for PseudoClassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A key split into its emulated and native tokens, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitKey {
    /// Tokens whose names are registered emulators.
    pub emulated: Vec<String>,
    /// Every other token.
    pub native: Vec<String>,
}

impl SplitKey {
    /// The canonical bucket key, e.g. `checked:hover`.
    pub fn emulated_key(&self) -> String {
        self.emulated.join(":")
    }

    /// The canonical native key, e.g. `first-line`.
    pub fn native_key(&self) -> String {
        self.native.join(":")
    }
}

/// Split a colon-separated key by registry membership.
///
/// Duplicate tokens collapse.
pub fn split_key(key: &str, registry: &PseudoClassRegistry) -> Result<SplitKey> {
    let mut split = SplitKey::default();
    for raw in split_tokens(key) {
        let token = PseudoClassToken::parse(raw)?;
        let target = if registry.is_emulated(token.name()) {
            &mut split.emulated
        } else {
            &mut split.native
        };
        target.push(token.raw);
    }
    for tokens in [&mut split.emulated, &mut split.native] {
        tokens.sort();
        tokens.dedup();
    }
    Ok(split)
}

/// Sort and deduplicate the tokens of a key, so `hover:checked` becomes
/// `checked:hover`.
pub fn canonical_key(key: &str) -> String {
    let mut tokens = split_tokens(key);
    tokens.sort_unstable();
    tokens.dedup();
    tokens.join(":")
}

/// Split on colons that are not inside parentheses.
fn split_tokens(key: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in key.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                tokens.push(&key[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    tokens.push(&key[start..]);
    tokens
}

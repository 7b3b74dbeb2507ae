//! `An+B` expressions for `nth-child`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static NTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<a>[+-]?\d*)n(?P<b>[+-]\d+)?|(?P<constant>[+-]?\d+)(?:(?P<trailing>[+-]\d*)n)?)$",
    )
    .expect("nth-child pattern is valid")
});

/// Expression for `nth-child` (An+B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthExpr {
    /// Coefficient (A in An+B).
    pub a: i32,
    /// Offset (B in An+B).
    pub b: i32,
}

impl NthExpr {
    /// Create a new nth expression.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if a 0-indexed position matches this expression.
    pub fn matches(&self, index: usize) -> bool {
        let position = index as i64 + 1;
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            position == b
        } else {
            let diff = position - b;
            diff % a == 0 && diff / a >= 0
        }
    }

    /// `odd` = 2n+1.
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// `even` = 2n.
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Parse an expression such as `2n+1`, `-n+3`, `3`, `4 + 2n`, `odd`.
    ///
    /// Whitespace anywhere in the input is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "odd" => return Ok(Self::odd()),
            "even" => return Ok(Self::even()),
            _ => {}
        }

        let invalid = || {
            Error::invalid_pseudo_class(
                format!("nth-child({raw})"),
                "expected an expression of the form An+B",
            )
        };
        let captures = NTH_PATTERN.captures(&compact).ok_or_else(invalid)?;

        let (a, b) = if let Some(constant) = captures.name("constant") {
            let a = match captures.name("trailing") {
                Some(coefficient) => parse_coefficient(coefficient.as_str()).ok_or_else(invalid)?,
                None => 0,
            };
            (a, constant.as_str().parse().map_err(|_| invalid())?)
        } else {
            let a = captures
                .name("a")
                .map_or(Some(1), |m| parse_coefficient(m.as_str()))
                .ok_or_else(invalid)?;
            let b = match captures.name("b") {
                Some(offset) => offset.as_str().parse().map_err(|_| invalid())?,
                None => 0,
            };
            (a, b)
        };
        Ok(Self { a, b })
    }
}

fn parse_coefficient(text: &str) -> Option<i32> {
    match text {
        "" | "+" => Some(1),
        "-" => Some(-1),
        digits => digits.parse().ok(),
    }
}

impl FromStr for NthExpr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (2, 1) => write!(f, "odd"),
            (2, 0) => write!(f, "even"),
            (0, b) => write!(f, "{}", b),
            (1, 0) => write!(f, "n"),
            (a, 0) => write!(f, "{}n", a),
            (1, b) if b > 0 => write!(f, "n+{}", b),
            (1, b) => write!(f, "n{}", b),
            (a, b) if b > 0 => write!(f, "{}n+{}", a, b),
            (a, b) => write!(f, "{}n{}", a, b),
        }
    }
}

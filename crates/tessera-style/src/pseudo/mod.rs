//! Pseudo-class handling: token parsing, the emulator registry and its
//! built-ins, group flattening and combination.

pub mod builtin;
pub(crate) mod combinator;
pub(crate) mod flatten;
pub mod nth;
pub mod registry;
pub mod token;

pub use builtin::{Checked, Hover, LastChild, NthChild, Required};
pub use nth::NthExpr;
pub use registry::{
    PseudoClassEmulator, PseudoClassParameter, PseudoClassRegistry, SetupState, Transitions,
};
pub use token::{PseudoClassToken, SplitKey, canonical_key, split_key};

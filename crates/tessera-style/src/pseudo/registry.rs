//! Pseudo-class emulator registry.
//!
//! The browser offers no hook for transitions of most pseudo-classes on
//! arbitrary elements, so each emulated pseudo-class is described by a
//! [`PseudoClassEmulator`]: how to test whether it currently holds, how to
//! listen for it starting and ending, and how to stop listening. A token in a
//! `$$` key is emulated exactly when its name is registered here; every other
//! token is left to the native stylesheet.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::pseudo::builtin;
use crate::pseudo::nth::NthExpr;

/// A pseudo-class parameter after [`PseudoClassEmulator::process_parameter`].
#[derive(Clone, Default)]
pub enum PseudoClassParameter {
    /// The token had no parameter.
    #[default]
    None,
    /// The parameter text, unprocessed.
    Raw(String),
    /// A compiled `nth-child` expression.
    Nth(NthExpr),
    /// Anything a custom emulator compiles its parameter into.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for PseudoClassParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClassParameter::None => f.write_str("None"),
            PseudoClassParameter::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            PseudoClassParameter::Nth(expr) => f.debug_tuple("Nth").field(expr).finish(),
            PseudoClassParameter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Whatever an emulator's `setup` needs to hand back to its `kill`.
pub type SetupState = Box<dyn Any + Send + Sync>;

/// Callbacks an emulator uses to report that its pseudo-class started or
/// stopped holding.
///
/// Reporting the current state again is harmless.
#[derive(Clone)]
pub struct Transitions {
    on_start: Arc<dyn Fn() + Send + Sync>,
    on_end: Arc<dyn Fn() + Send + Sync>,
}

impl Transitions {
    /// Create a pair of transition callbacks.
    pub fn new<S, E>(on_start: S, on_end: E) -> Self
    where
        S: Fn() + Send + Sync + 'static,
        E: Fn() + Send + Sync + 'static,
    {
        Self {
            on_start: Arc::new(on_start),
            on_end: Arc::new(on_end),
        }
    }

    /// The pseudo-class started holding.
    pub fn start(&self) {
        (self.on_start)()
    }

    /// The pseudo-class stopped holding.
    pub fn end(&self) {
        (self.on_end)()
    }

    /// Report the pseudo-class as holding or not.
    pub fn set(&self, active: bool) {
        if active { self.start() } else { self.end() }
    }
}

impl fmt::Debug for Transitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transitions").finish_non_exhaustive()
    }
}

/// Capability bundle for one emulated pseudo-class.
pub trait PseudoClassEmulator: Send + Sync {
    /// Whether the pseudo-class currently holds. Must be side-effect free.
    fn check(&self, component: &dyn Component, parameter: &PseudoClassParameter) -> bool;

    /// Start listening for transitions.
    ///
    /// Must not invoke `transitions` synchronously. The returned state is
    /// handed back to [`kill`](Self::kill).
    fn setup(
        &self,
        component: &Arc<dyn Component>,
        transitions: Transitions,
        parameter: &PseudoClassParameter,
    ) -> SetupState;

    /// Release everything acquired by [`setup`](Self::setup).
    fn kill(&self, component: &dyn Component, state: SetupState);

    /// Compile the raw parameter text once, at style construction.
    fn process_parameter(&self, raw: Option<&str>) -> Result<PseudoClassParameter> {
        Ok(raw.map_or(PseudoClassParameter::None, |raw| {
            PseudoClassParameter::Raw(raw.to_string())
        }))
    }
}

/// Maps pseudo-class names to their emulators.
#[derive(Clone)]
pub struct PseudoClassRegistry {
    emulators: HashMap<String, Arc<dyn PseudoClassEmulator>>,
}

impl Default for PseudoClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PseudoClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PseudoClassRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl PseudoClassRegistry {
    /// A registry holding the built-in emulators: `hover`, `checked`,
    /// `required`, `last-child` and `nth-child`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, emulator) in builtin::emulators() {
            registry.emulators.insert(name.to_string(), emulator);
        }
        registry
    }

    /// A registry with nothing registered; every token is native.
    pub fn empty() -> Self {
        Self {
            emulators: HashMap::new(),
        }
    }

    /// Register an emulator under `name`.
    pub fn add_pseudo_class<E>(&mut self, name: impl Into<String>, emulator: E) -> Result<()>
    where
        E: PseudoClassEmulator + 'static,
    {
        self.add_shared(name, Arc::new(emulator))
    }

    /// Register a shared emulator under `name`.
    pub fn add_shared(
        &mut self,
        name: impl Into<String>,
        emulator: Arc<dyn PseudoClassEmulator>,
    ) -> Result<()> {
        let name = name.into();
        if self.emulators.contains_key(&name) {
            return Err(Error::duplicate_pseudo_class(name));
        }
        self.emulators.insert(name, emulator);
        Ok(())
    }

    /// The emulator registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PseudoClassEmulator>> {
        self.emulators.get(name)
    }

    /// Whether `name` is emulated.
    pub fn is_emulated(&self, name: &str) -> bool {
        self.emulators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.emulators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

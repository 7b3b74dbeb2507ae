//! The pseudo-class emulation stage of a style family.
//!
//! Attaching a family to a component creates a [`PseudoClassState`] for that
//! component alone, seeds it from every token's `check`, and starts every
//! token's listeners. Transitions update the state and re-run selection; when
//! the selected member differs from the component's current style it is
//! assigned through [`Component::set_style`]. That assignment is the only
//! effect emulation has on a component.
//!
//! Every member of a family shares this stage. A host that kills the old style
//! and sets up the new one on assignment therefore detaches and re-attaches on
//! each swap, and the new attachment is seeded from `check` again.
//!
//! When the member being set up is not the one `check` selects, the component
//! is redirected to that member before anything is attached. The host's kill
//! of the member it was redirected away from is expected and stays quiet.
//!
//! No lock is held while calling into emulators or the component.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::component::{Component, ComponentId};
use crate::logging::targets;
use crate::pseudo::combinator::EmulatedToken;
use crate::pseudo::registry::{SetupState, Transitions};
use crate::state::{PseudoClassState, select_variant};
use crate::style::{Style, StyleFamily};

/// A variant table entry.
#[derive(Debug, Clone)]
pub(crate) struct Variant {
    pub key: String,
    /// Indices into the emulation's tokens.
    pub tokens: Vec<usize>,
    /// Index of the variant's member in the family.
    pub member: usize,
    pub generated: bool,
}

struct Attachment {
    state: Arc<Mutex<PseudoClassState>>,
    setup_states: Vec<SetupState>,
}

pub(crate) struct Emulation {
    tokens: Vec<EmulatedToken>,
    variants: Vec<Variant>,
    attachments: Mutex<HashMap<ComponentId, Attachment>>,
    redirecting: Mutex<HashSet<ComponentId>>,
}

impl Emulation {
    pub(crate) fn new(tokens: Vec<EmulatedToken>, variants: Vec<Variant>) -> Self {
        Self {
            tokens,
            variants,
            attachments: Mutex::new(HashMap::new()),
            redirecting: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub(crate) fn token_key(&self, index: usize) -> &str {
        &self.tokens[index].key
    }

    pub(crate) fn token_keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|token| token.key.as_str())
    }

    /// Family member to show for `active`; 0 is the base.
    fn select(&self, active: &[bool]) -> usize {
        select_variant(
            self.variants.iter().map(|variant| variant.tokens.as_slice()),
            active,
        )
        .map_or(0, |position| self.variants[position].member)
    }

    /// Family member `check` selects for `component` right now.
    pub(crate) fn initial_member(&self, component: &dyn Component) -> usize {
        let active: Vec<bool> = self
            .tokens
            .iter()
            .map(|token| token.emulator.check(component, &token.parameter))
            .collect();
        self.select(&active)
    }

    /// Run `assign` with `id` marked as redirected, so the kill it causes
    /// for a member that never attached is not reported.
    pub(crate) fn redirect(&self, id: ComponentId, assign: impl FnOnce()) {
        self.redirecting.lock().insert(id);
        tracing::trace!(target: targets::EMULATION, component = %id, "redirecting to the selected member");
        assign();
        self.redirecting.lock().remove(&id);
    }

    pub(crate) fn attachment_count(&self) -> usize {
        self.attachments.lock().len()
    }

    pub(crate) fn is_attached(&self, id: ComponentId) -> bool {
        self.attachments.lock().contains_key(&id)
    }

    pub(crate) fn state(&self, id: ComponentId) -> Option<PseudoClassState> {
        let state = self.attachments.lock().get(&id)?.state.clone();
        let snapshot = state.lock().clone();
        Some(snapshot)
    }

    pub(crate) fn attach(&self, family: &Arc<StyleFamily>, component: &Arc<dyn Component>) {
        let id = component.id();
        if self.is_attached(id) {
            tracing::warn!(
                target: targets::EMULATION,
                component = %id,
                "component attached twice, replacing the previous attachment"
            );
            self.detach(component.as_ref());
        }

        let initial: Vec<bool> = self
            .tokens
            .iter()
            .map(|token| token.emulator.check(component.as_ref(), &token.parameter))
            .collect();
        let state = Arc::new(Mutex::new(PseudoClassState::new(initial)));

        let weak_family = Arc::downgrade(family);
        let weak_component = Arc::downgrade(component);
        let setup_states = self
            .tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let callback = |active: bool| {
                    let state = state.clone();
                    let family = weak_family.clone();
                    let component = weak_component.clone();
                    move || transition(&state, &family, &component, index, active)
                };
                let transitions = Transitions::new(callback(true), callback(false));
                token.emulator.setup(component, transitions, &token.parameter)
            })
            .collect();

        let member = self.select(state.lock().flags());
        self.attachments.lock().insert(
            id,
            Attachment {
                state,
                setup_states,
            },
        );

        tracing::debug!(
            target: targets::EMULATION,
            component = %id,
            tokens = self.tokens.len(),
            member,
            "attached pseudo-class emulation"
        );
        apply(family, component, member);
    }

    /// Stop emulation for `component`. Returns `false` if it was not
    /// attached.
    pub(crate) fn detach(&self, component: &dyn Component) -> bool {
        let id = component.id();
        let attachment = self.attachments.lock().remove(&id);
        let Some(attachment) = attachment else {
            if self.redirecting.lock().contains(&id) {
                tracing::trace!(target: targets::EMULATION, component = %id, "skipping teardown of a redirected member");
            } else {
                tracing::warn!(
                    target: targets::EMULATION,
                    component = %id,
                    "detach of a component that is not attached"
                );
            }
            return false;
        };
        attachment.state.lock().release();

        for (token, setup_state) in self.tokens.iter().zip(attachment.setup_states) {
            token.emulator.kill(component, setup_state);
        }
        tracing::debug!(target: targets::EMULATION, component = %id, "detached pseudo-class emulation");
        true
    }
}

fn transition(
    state: &Mutex<PseudoClassState>,
    family: &Weak<StyleFamily>,
    component: &Weak<dyn Component>,
    index: usize,
    active: bool,
) {
    let (Some(family), Some(component)) = (family.upgrade(), component.upgrade()) else {
        return;
    };
    let Some(emulation) = family.emulation.as_ref() else {
        return;
    };

    let member = {
        let mut state = state.lock();
        if !state.set(index, active) {
            tracing::trace!(
                target: targets::EMULATION,
                component = %component.id(),
                "ignoring transition for a released attachment"
            );
            return;
        }
        emulation.select(state.flags())
    };

    tracing::trace!(
        target: targets::EMULATION,
        component = %component.id(),
        pseudo_class = emulation.token_key(index),
        active,
        member,
        "pseudo-class transition"
    );
    apply(&family, &component, member);
}

/// Assign family member `member` to `component` unless it already has it.
fn apply(family: &Arc<StyleFamily>, component: &Arc<dyn Component>, member: usize) {
    let target = Style {
        family: family.clone(),
        index: member,
    };
    if component.style().as_ref() == Some(&target) {
        return;
    }
    component.set_style(Some(target));
}

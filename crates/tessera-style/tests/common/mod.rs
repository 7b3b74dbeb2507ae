//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tessera_style::{
    Component, PseudoClassEmulator, PseudoClassParameter, SetupState, Transitions,
};

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct SwitchInner {
    active: AtomicBool,
    next_setup: AtomicUsize,
    live: Mutex<HashMap<usize, Transitions>>,
    setups: AtomicUsize,
    kills: AtomicUsize,
    foreign_kills: AtomicUsize,
}

/// An emulated pseudo-class driven by hand.
///
/// `check` reports the switch position and every live setup is notified when
/// it is flipped. Setups and kills are counted so tests can verify that
/// everything acquired is released exactly once.
#[derive(Clone, Default)]
pub struct Switch(Arc<SwitchInner>);

impl Switch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the switch and notify every live setup.
    pub fn set(&self, active: bool) {
        self.0.active.store(active, Ordering::SeqCst);
        let live: Vec<Transitions> = self.0.live.lock().values().cloned().collect();
        for transitions in live {
            transitions.set(active);
        }
    }

    pub fn is_active(&self) -> bool {
        self.0.active.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.0.live.lock().len()
    }

    pub fn setups(&self) -> usize {
        self.0.setups.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.0.kills.load(Ordering::SeqCst)
    }

    /// Kills that received a state this switch never handed out or had
    /// already released.
    pub fn foreign_kills(&self) -> usize {
        self.0.foreign_kills.load(Ordering::SeqCst)
    }
}

impl PseudoClassEmulator for Switch {
    fn check(&self, _: &dyn Component, _: &PseudoClassParameter) -> bool {
        self.is_active()
    }

    fn setup(
        &self,
        _: &Arc<dyn Component>,
        transitions: Transitions,
        _: &PseudoClassParameter,
    ) -> SetupState {
        let id = self.0.next_setup.fetch_add(1, Ordering::SeqCst);
        self.0.live.lock().insert(id, transitions);
        self.0.setups.fetch_add(1, Ordering::SeqCst);
        Box::new(id)
    }

    fn kill(&self, _: &dyn Component, state: SetupState) {
        self.0.kills.fetch_add(1, Ordering::SeqCst);
        let released = state
            .downcast::<usize>()
            .ok()
            .and_then(|id| self.0.live.lock().remove(&id));
        if released.is_none() {
            self.0.foreign_kills.fetch_add(1, Ordering::SeqCst);
        }
    }
}

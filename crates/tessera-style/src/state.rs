//! Per-component pseudo-class state and variant selection.

/// Which emulated pseudo-classes currently hold for one attached component.
///
/// Slots are indexed like the style's emulated tokens. Once released (the
/// component was detached or restyled) the state ignores further updates, so
/// a late transition from a misbehaving emulator cannot restyle anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoClassState {
    active: Vec<bool>,
    released: bool,
}

impl PseudoClassState {
    /// Start from the initial `check` results.
    pub fn new(active: Vec<bool>) -> Self {
        Self {
            active,
            released: false,
        }
    }

    /// Whether token `index` holds.
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Record a transition. Returns `false` if the state is released or the
    /// index is out of range.
    pub fn set(&mut self, index: usize, active: bool) -> bool {
        if self.released {
            return false;
        }
        match self.active.get_mut(index) {
            Some(slot) => {
                *slot = active;
                true
            }
            None => false,
        }
    }

    /// The flags, indexed by token.
    pub fn flags(&self) -> &[bool] {
        &self.active
    }

    /// Stop accepting transitions.
    pub fn release(&mut self) {
        self.released = true;
    }

    /// Whether [`release`](Self::release) was called.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// Pick the most specific variant whose tokens all hold.
///
/// `variants` yields each variant's token indices in list order. The variant
/// with the most tokens wins; among equally long matches the first one in
/// list order wins. Returns the winner's position, or `None` when nothing
/// matches and the base style applies.
pub fn select_variant<'a, I>(variants: I, active: &[bool]) -> Option<usize>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    let mut best: Option<(usize, usize)> = None;
    for (position, tokens) in variants.into_iter().enumerate() {
        let matches = tokens
            .iter()
            .all(|&token| active.get(token).copied().unwrap_or(false));
        if matches && best.is_none_or(|(_, len)| tokens.len() > len) {
            best = Some((position, tokens.len()));
        }
    }
    best.map(|(position, _)| position)
}

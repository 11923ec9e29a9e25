//! One-way boolean state.
//!
//! Inclusion, reassignment, "declaration reached" and deoptimization escalation
//! only ever move from unset to set within a bundling run. `Latch` encodes that:
//! there is no way to clear it once set.

use std::cell::Cell;

#[derive(Debug, Default)]
pub struct Latch(Cell<bool>);

impl Latch {
    pub const fn new() -> Self {
        Latch(Cell::new(false))
    }

    /// Sets the latch. Returns `true` if this call performed the transition.
    pub fn set(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl Clone for Latch {
    fn clone(&self) -> Self {
        Latch(Cell::new(self.0.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_unset() {
        let latch = Latch::new();
        assert!(!latch.is_set());
    }

    #[test]
    fn test_first_set_reports_transition() {
        let latch = Latch::new();
        assert!(latch.set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[test]
    fn test_clone_keeps_state() {
        let latch = Latch::new();
        latch.set();
        assert!(latch.clone().is_set());
    }
}

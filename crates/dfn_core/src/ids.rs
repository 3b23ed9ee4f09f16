//! Process-wide-style identifiers for global fractures.
//!
//! The microfracture/macrofracture counters are owned rather than hidden
//! statics; here they are plain fields on [`crate::dfn::GlobalDfn`], and
//! this module only supplies the newtypes and the small counter type that
//! increments them.

use serde::{Deserialize, Serialize};

/// Identifies a [`crate::global::GlobalMicrofracture`]. `0` is reserved to
/// mean "no fracture", used wherever a null terminating-id is needed.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MicroId(pub u64);

/// Identifies a [`crate::global::GlobalMacrofracture`]. `0` is reserved to
/// mean "no fracture".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MacroId(pub u64);

impl MicroId {
    pub const NONE: MicroId = MicroId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl MacroId {
    pub const NONE: MacroId = MacroId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// A single monotone counter, starting at 1 so that `0` is free to mean
/// "no id". Two such counters exist, one each for microfractures and
/// macrofractures; [`crate::dfn::GlobalDfn`] owns one `IdCounter` of
/// each, rather than a hidden static.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_micro(&mut self) -> MicroId {
        let id = MicroId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }

    pub fn next_macro(&mut self) -> MacroId {
        let id = MacroId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_produces_strictly_increasing_ids() {
        let mut counter = IdCounter::new();
        let a = counter.next_micro();
        let b = counter.next_micro();
        let c = counter.next_micro();
        assert!(a.0 < b.0 && b.0 < c.0);
    }

    #[test]
    fn independent_counters_do_not_interleave() {
        let mut micro = IdCounter::new();
        let mut macro_ = IdCounter::new();
        let a = micro.next_micro();
        let b = macro_.next_macro();
        assert_eq!(a.0, 1);
        assert_eq!(b.0, 1);
    }

    #[test]
    fn none_id_is_recognised() {
        assert!(MicroId::NONE.is_none());
        assert!(MacroId::NONE.is_none());
        assert!(!MicroId(1).is_none());
    }
}

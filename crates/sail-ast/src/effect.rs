//! Effects: a finite set drawn from a closed vocabulary (spec.md §3/§GLOSSARY).
//!
//! Represented as a bitset rather than a `HashSet<Id>` the way
//! `tsz-solver` uses `bitflags` for its own closed-vocabulary flag sets —
//! union is bitwise-or, equality is `PartialEq` on the underlying bits.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Effect: u16 {
        /// Read register.
        const RREG   = 1 << 0;
        /// Write register.
        const WREG   = 1 << 1;
        /// Read memory.
        const RMEM   = 1 << 2;
        /// Write memory.
        const WMEM   = 1 << 3;
        /// Memory value announcement.
        const WMV    = 1 << 4;
        /// Configure (register with an initializer expression).
        const CONFIG = 1 << 5;
        /// Exceptions / exit.
        const ESCAPE = 1 << 6;
        /// `L_undef` and other underspecified values.
        const UNDEF  = 1 << 7;
        /// Non-determinism.
        const NONDET = 1 << 8;
    }
}

impl Effect {
    pub fn pure() -> Self {
        Effect::empty()
    }

    /// `self` is an acceptable instantiation of a declared effect set,
    /// i.e. `self ⊆ declared`.
    pub fn is_subset_of(&self, declared: Effect) -> bool {
        declared.contains(*self)
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "pure");
        }
        let names = [
            (Effect::RREG, "rreg"),
            (Effect::WREG, "wreg"),
            (Effect::RMEM, "rmem"),
            (Effect::WMEM, "wmem"),
            (Effect::WMV, "wmv"),
            (Effect::CONFIG, "config"),
            (Effect::ESCAPE, "escape"),
            (Effect::UNDEF, "undef"),
            (Effect::NONDET, "nondet"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

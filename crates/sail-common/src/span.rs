//! Source location tracking (byte offsets).
//!
//! Every syntactic node carries a `Span` so diagnostics can point at the
//! offending source text (spec.md §3, "Source locations accompany every
//! syntactic node").

use serde::{Deserialize, Serialize};

/// A byte-offset range `[start, end)` into a single source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::DUMMY
    }
}

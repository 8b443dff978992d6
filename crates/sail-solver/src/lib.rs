//! The constraint oracle, unification, and subtyping (spec.md §2,
//! components 2/4/5).
//!
//! Deep recursion in `subtype`/`unify`/`canonicalize` can blow the
//! default stack on pathologically nested types; callers that walk
//! arbitrarily deep user syntax should wrap their entry point in
//! `stacker::maybe_grow` (as the teacher's checker does around its own
//! recursive descent).

pub mod oracle;
pub mod subtype;
pub mod unify;

pub use oracle::{ConstraintOracle, StubOracle, Z3Oracle};
pub use subtype::{subtype, typ_equality, SubtypeError};
pub use unify::{unify, unify_nexp, UnifyError, UnifyResult};

/// Red zone before `stacker` grows the stack for a deeply recursive
/// subtyping/unification call (spec.md §4, "the checker recurses
/// structurally over types and expressions without an explicit bound").
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Run `f` with a guaranteed stack allocation, growing the stack first
/// if fewer than [`STACK_RED_ZONE`] bytes remain (mirrors `tsz-solver`'s
/// own use of `stacker` around its recursive unifier).
pub fn with_stack_guard<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, 8 * 1024 * 1024, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_guard_runs_closure_and_returns_its_value() {
        assert_eq!(with_stack_guard(|| 1 + 1), 2);
    }
}

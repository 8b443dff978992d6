//! Overload resolution (spec.md §4.6 "Overload resolution", §5 "overload
//! candidates are tried in declaration order").
//!
//! Plain identifiers and overloaded identifiers are resolved the same
//! way: `resolve` just skips the loop when `id` has no overload-table
//! entry, so callers never need to branch on whether a name happens to
//! be overloaded.

use crate::error::TypeError;
use sail_ast::Id;
use sail_common::Span;
use sail_env::Environment;

/// Try `id`, or each of its registered overload candidates in order,
/// via `attempt`. The first candidate that succeeds wins; if every
/// candidate fails, raises `NoOverloading` carrying every candidate's
/// error (spec.md §7).
pub fn resolve<T>(
    env: &Environment,
    id: &Id,
    span: Span,
    mut attempt: impl FnMut(&Id) -> Result<T, TypeError>,
) -> Result<T, TypeError> {
    let Some(candidates) = env.lookup_overload(id) else {
        return attempt(id);
    };
    let candidates = candidates.to_vec();
    let mut alts = Vec::new();
    for candidate in &candidates {
        match attempt(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => alts.push((candidate.clone(), e)),
        }
    }
    Err(TypeError::NoOverloading {
        span,
        id: id.clone(),
        alts,
    })
}

//! The checker's error taxonomy (spec.md §7).
//!
//! A plain enum, not a `thiserror`-derived type — matching
//! `tsz_common::diagnostics::Diagnostic`, a hand-written struct with a
//! hand-written renderer, which this taxonomy's `to_diagnostic` mirrors.
//! Checking functions return `Result<_, TypeError>`; overload and cast
//! search catch it as a value and accumulate per-candidate failures
//! rather than using exceptions (spec.md §9).

use sail_ast::{Id, NConstraint, Type};
use sail_common::diagnostics::{codes, Diagnostic};
use sail_common::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// `T1 </: T2` under these constraints.
    Subtype {
        span: Span,
        t1: Type,
        t2: Type,
        constraints: Vec<NConstraint>,
    },
    /// No coercion from `T1` to `T2`; `trigger` is the original subtype
    /// failure, `alts` are the per-cast failures.
    NoCasts {
        span: Span,
        t1: Type,
        t2: Type,
        trigger: Box<TypeError>,
        alts: Vec<(Id, TypeError)>,
    },
    /// No overload candidate for `id` typechecks; `alts` pairs each
    /// candidate with its error.
    NoOverloading {
        span: Span,
        id: Id,
        alts: Vec<(Id, TypeError)>,
    },
    /// Instantiation left a universal quantifier unbound.
    UnresolvedQuants {
        span: Span,
        id: Id,
        quants: Vec<Id>,
    },
    /// Named numeric constant not found.
    NoNumIdent { span: Span, id: Id },
    /// Catch-all with a free-form message.
    Other { span: Span, message: String },
}

impl TypeError {
    pub fn other(span: Span, message: impl Into<String>) -> Self {
        TypeError::Other {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeError::Subtype { span, .. }
            | TypeError::NoCasts { span, .. }
            | TypeError::NoOverloading { span, .. }
            | TypeError::UnresolvedQuants { span, .. }
            | TypeError::NoNumIdent { span, .. }
            | TypeError::Other { span, .. } => *span,
        }
    }

    /// Render into the shared `Diagnostic` shape (spec.md §7 "User-visible
    /// behaviour"): identifies the failing expression, the clashing
    /// types, the constraint list, and — for overload/cast search — every
    /// candidate's own failure as related information.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TypeError::Subtype {
                span,
                t1,
                t2,
                constraints,
            } => {
                let mut d = Diagnostic::error(
                    *span,
                    codes::SUBTYPE,
                    format!("`{t1:?}` is not a subtype of `{t2:?}`"),
                );
                if !constraints.is_empty() {
                    d = d.with_related(
                        *span,
                        format!("under constraints: {constraints:?}"),
                    );
                }
                d
            }
            TypeError::NoCasts {
                span,
                t1,
                t2,
                trigger,
                alts,
            } => {
                let mut d = Diagnostic::error(
                    *span,
                    codes::NO_CASTS,
                    format!("no coercion from `{t1:?}` to `{t2:?}`"),
                );
                d = d.with_related(trigger.span(), trigger.to_diagnostic().message_text);
                for (cast, err) in alts {
                    d = d.with_related(err.span(), format!("cast `{cast}` failed: {}", err.to_diagnostic().message_text));
                }
                d
            }
            TypeError::NoOverloading { span, id, alts } => {
                let mut d = Diagnostic::error(
                    *span,
                    codes::NO_OVERLOADING,
                    format!("no overload of `{id}` typechecks"),
                );
                for (candidate, err) in alts {
                    d = d.with_related(
                        err.span(),
                        format!("candidate `{candidate}`: {}", err.to_diagnostic().message_text),
                    );
                }
                d
            }
            TypeError::UnresolvedQuants { span, id, quants } => Diagnostic::error(
                *span,
                codes::UNRESOLVED_QUANTS,
                format!(
                    "instantiating `{id}` left quantifier variable(s) {quants:?} unresolved"
                ),
            ),
            TypeError::NoNumIdent { span, id } => Diagnostic::error(
                *span,
                codes::NO_NUM_IDENT,
                format!("no numeric identifier `{id}` in scope"),
            ),
            TypeError::Other { span, message } => {
                Diagnostic::error(*span, codes::OTHER, message.clone())
            }
        }
    }
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for TypeError {}

/// Attach `span` to a result whose error type doesn't carry one yet
/// (`UnifyError`, `EnvError`, `CanonicalizeError`). Every checker-level
/// call site that crosses into `sail-env`/`sail-solver` for something
/// other than a subtype obligation goes through this so the resulting
/// `TypeError` is always located.
pub fn at<T, E: std::fmt::Display>(span: Span, result: Result<T, E>) -> Result<T, TypeError> {
    result.map_err(|e| TypeError::other(span, e.to_string()))
}

/// Run a `subtype(env, t1, t2)` call and, on failure, render it as the
/// `Subtype` variant of the taxonomy (spec.md §7) rather than `Other` —
/// `subtype`/`typ_equality` are the one place a bare `SubtypeError`
/// deserves its own structured variant instead of a flattened message.
pub fn require_subtype(
    span: Span,
    env: &sail_env::Environment,
    oracle: &mut dyn sail_solver::ConstraintOracle,
    t1: &Type,
    t2: &Type,
) -> Result<sail_env::Environment, TypeError> {
    sail_solver::subtype(env, oracle, t1, t2).map_err(|_| TypeError::Subtype {
        span,
        t1: t1.clone(),
        t2: t2.clone(),
        constraints: env.constraints().to_vec(),
    })
}

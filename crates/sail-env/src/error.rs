//! Environment-level errors: the `No_num_ident` and `Other` members of
//! the top-level error taxonomy (spec.md §7) that originate from table
//! lookups and well-formedness checks rather than from subtyping or
//! overload resolution.

use sail_ast::Id;
use sail_common::diagnostics::{codes, Diagnostic};
use sail_common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// Lookup failed for a name in a table that requires the name to
    /// already be bound (value spec, register, type, mapping, ...).
    Unbound { what: &'static str, name: Id },
    /// A numeric constant, constraint synonym, or type synonym name is
    /// referenced but was never registered (spec.md §7 `No_num_ident`).
    NoNumIdent { name: Id },
    /// A well-formedness check failed (spec.md §4.3 "Well-formedness").
    IllFormed { message: String },
}

impl EnvError {
    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        match self {
            EnvError::Unbound { what, name } => Diagnostic::error(
                span,
                codes::OTHER,
                format!("unbound {what} `{name}`"),
            ),
            EnvError::NoNumIdent { name } => Diagnostic::error(
                span,
                codes::NO_NUM_IDENT,
                format!("no numeric identifier `{name}` in scope"),
            ),
            EnvError::IllFormed { message } => {
                Diagnostic::error(span, codes::OTHER, message)
            }
        }
    }
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::Unbound { what, name } => write!(f, "unbound {what} `{name}`"),
            EnvError::NoNumIdent { name } => write!(f, "no numeric identifier `{name}` in scope"),
            EnvError::IllFormed { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for EnvError {}

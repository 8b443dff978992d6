//! The Sail type checker (spec.md §4): a bidirectional `check_exp`/
//! `infer_exp` core over `sail-ast` expressions, built on the binder
//! state in `sail-env` and the constraint/unification machinery in
//! `sail-solver`.
//!
//! Module layout mirrors `tsz-checker`'s split between the binder
//! (here, `sail-env`), the per-run context (`ctx`), and the checking
//! passes proper (`dispatch` for expressions, `pat` for patterns,
//! `toplevel` for definitions), with the narrower concerns — casts,
//! overload resolution, function application, l-values, annotations,
//! flow typing — each broken out into their own module rather than
//! folded into one large `dispatch.rs`.

pub mod annotation;
pub mod coerce;
pub mod ctx;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod funapp;
pub mod lexpr;
pub mod overload;
pub mod pat;
pub mod toplevel;

pub use annotation::{Annotation, Annotations};
pub use ctx::CheckCtx;
pub use error::TypeError;
pub use toplevel::{check_def, check_program, CheckedProgram};

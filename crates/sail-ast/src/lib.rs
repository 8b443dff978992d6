//! AST & term algebra for Sail (component 1 of spec.md §2).
//!
//! Typed representation of identifiers, kinds, numeric expressions,
//! numeric constraints, types, patterns, expressions, l-expressions, and
//! top-level definitions; substitution, free-variable computation, and
//! structural equality live in [`subst`].
//!
//! This crate only defines the term algebra — it has no parser. Terms are
//! built directly (by an upstream parser, or, in this workspace, by
//! deserializing the JSON interchange format `sail-cli` reads).

pub mod constraint;
pub mod def;
pub mod effect;
pub mod expr;
pub mod ident;
pub mod kind;
pub mod lexpr;
pub mod nexp;
pub mod node;
pub mod order;
pub mod pattern;
pub mod subst;
pub mod ty;

pub use constraint::NConstraint;
pub use def::{Def, FunClause, MappingClause, TypeDefKind};
pub use effect::Effect;
pub use expr::{Expr, ExprKind};
pub use ident::Id;
pub use kind::Kind;
pub use lexpr::{LExpr, LExprKind};
pub use nexp::NExp;
pub use node::{NodeId, NodeIdGen};
pub use order::Order;
pub use pattern::{Lit, Pat, PatKind};
pub use ty::{Type, TypeArg, TypeScheme};

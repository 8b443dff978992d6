//! L-expressions, the assignable-location side of `Assign` (spec.md §3
//! "L-expressions", §6 "bind_lexp").

use crate::expr::Expr;
use crate::ident::Id;
use crate::node::NodeId;
use crate::ty::Type;
use sail_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LExprKind {
    Id(Id),
    /// `(lexpr : typ)`, seeds the expected type instead of looking one
    /// up (spec.md §6, "l-expression ... cast").
    Cast(Box<LExpr>, Box<Type>),
    Tuple(Vec<LExpr>),
    /// `vector[i]`.
    VectorIndex(Box<LExpr>, Box<Expr>),
    /// `vector[lo .. hi]`.
    VectorRange(Box<LExpr>, Box<Expr>, Box<Expr>),
    Field(Box<LExpr>, Id),
    /// `*reg = e`, a register-memory write discriminated from ordinary
    /// assignment at checking time (spec.md §6).
    Deref(Box<Expr>),
    MemoryWrite {
        address: Box<Expr>,
        value: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LExpr {
    pub id: NodeId,
    pub span: Span,
    pub kind: LExprKind,
}

impl LExpr {
    pub fn new(id: NodeId, span: Span, kind: LExprKind) -> Self {
        LExpr { id, span, kind }
    }

    /// Whether bounds checking on a vector index/range write may be
    /// skipped under `no_lexp_bounds_check` (spec.md §9 config toggles).
    pub fn is_vector_access(&self) -> bool {
        matches!(self.kind, LExprKind::VectorIndex(..) | LExprKind::VectorRange(..))
    }
}

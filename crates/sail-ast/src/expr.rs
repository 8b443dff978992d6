//! Expressions (spec.md §3 "Expressions", §6 "Bidirectional expression
//! checker").

use crate::ident::Id;
use crate::lexpr::LExpr;
use crate::node::NodeId;
use crate::pattern::{Lit, Pat};
use crate::ty::Type;
use sail_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pat: Pat,
    /// `pat if guard => body`.
    pub guard: Option<Box<Expr>>,
    pub body: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub field: Id,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Lit(Lit),
    Id(Id),
    Block(Vec<Expr>),
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Let {
        pat: Pat,
        bound: Box<Expr>,
        body: Box<Expr>,
    },
    /// Function, union-constructor, or mapping application — overload
    /// resolution and mapping-vs-function disambiguation happen during
    /// checking, not parsing (spec.md §6 "Overload resolution").
    App {
        callee: Id,
        args: Vec<Expr>,
    },
    Tuple(Vec<Expr>),
    /// `{ base with field1 = e1, field2 = e2 }`.
    RecordUpdate {
        base: Box<Expr>,
        fields: Vec<FieldUpdate>,
    },
    Vector(Vec<Expr>),
    /// An explicit type annotation; may require inserting an implicit
    /// numeric/effect coercion during checking (spec.md §6 "Cast /
    /// coercion").
    Cast {
        expr: Box<Expr>,
        typ: Box<Type>,
    },
    Assign {
        lhs: LExpr,
        rhs: Box<Expr>,
    },
    Assert {
        cond: Box<Expr>,
        message: Option<Box<Expr>>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, span: Span, kind: ExprKind) -> Self {
        Expr { id, span, kind }
    }
}

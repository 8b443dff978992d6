//! Top-level definitions (spec.md §7 "Top-level definition checker").

use crate::effect::Effect;
use crate::expr::Expr;
use crate::ident::Id;
use crate::kind::Kind;
use crate::node::NodeId;
use crate::order::Order;
use crate::pattern::Pat;
use crate::ty::{Type, TypeScheme};
use sail_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunClause {
    pub id: NodeId,
    pub span: Span,
    pub name: Id,
    pub pat: Pat,
    pub body: Expr,
}

/// A mapping clause, in one of the three directions a mapping definition
/// may declare a case in (spec.md §7 "Mapping", §GLOSSARY "Mapping").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MappingClause {
    /// `lhs <-> rhs`: usable in both directions.
    Bidir { lhs: Pat, rhs: Pat, span: Span },
    /// `lhs => rhs`: forwards only, `rhs` is a general expression.
    Forwards { lhs: Pat, rhs: Expr, span: Span },
    /// `lhs <= rhs`: backwards only, `lhs` is a general expression.
    Backwards { lhs: Expr, rhs: Pat, span: Span },
}

impl MappingClause {
    pub fn span(&self) -> Span {
        match self {
            MappingClause::Bidir { span, .. }
            | MappingClause::Forwards { span, .. }
            | MappingClause::Backwards { span, .. } => *span,
        }
    }

    pub fn usable_forwards(&self) -> bool {
        !matches!(self, MappingClause::Backwards { .. })
    }

    pub fn usable_backwards(&self) -> bool {
        !matches!(self, MappingClause::Forwards { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: Id,
    pub typ: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnionCase {
    pub name: Id,
    pub typ: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeDefKind {
    Record {
        quant: Vec<(Id, Kind)>,
        fields: Vec<RecordField>,
    },
    Union {
        quant: Vec<(Id, Kind)>,
        cases: Vec<UnionCase>,
    },
    Enum {
        members: Vec<Id>,
    },
    /// A bitfield type over an underlying fixed-width bitvector, with
    /// named sub-ranges (spec.md §GLOSSARY "Bitfield").
    Bitfield {
        width: crate::nexp::NExp,
        ranges: Vec<(Id, u32, u32)>,
    },
    /// `type synonym = typ` / `type synonym('a : Type) = typ`.
    Abbrev {
        quant: Vec<(Id, Kind)>,
        body: Type,
    },
    /// `constraint synonym(...) = nc`, resolved during `expand_synonyms`
    /// only when the `constraint_synonyms` toggle is enabled (spec.md §9).
    ConstraintSynonym {
        quant: Vec<(Id, Kind)>,
        body: crate::constraint::NConstraint,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Def {
    Kind {
        id: NodeId,
        span: Span,
        name: Id,
        def: TypeDefKind,
    },
    ValSpec {
        id: NodeId,
        span: Span,
        name: Id,
        scheme: TypeScheme,
        /// Names this valspec is externally bound to, e.g. for multiple
        /// target backends; empty if none declared.
        externs: Vec<(String, String)>,
    },
    Fun {
        id: NodeId,
        span: Span,
        name: Id,
        clauses: Vec<FunClause>,
    },
    Mapping {
        id: NodeId,
        span: Span,
        name: Id,
        typ: Option<Type>,
        clauses: Vec<MappingClause>,
    },
    Let {
        id: NodeId,
        span: Span,
        pat: Pat,
        bound: Expr,
    },
    DefaultOrder {
        id: NodeId,
        span: Span,
        order: Order,
    },
    /// `overload name = {f1, f2, ...}`.
    Overload {
        id: NodeId,
        span: Span,
        name: Id,
        members: Vec<Id>,
    },
    Register {
        id: NodeId,
        span: Span,
        name: Id,
        typ: Type,
        effect: Effect,
    },
}

impl Def {
    pub fn span(&self) -> Span {
        match self {
            Def::Kind { span, .. }
            | Def::ValSpec { span, .. }
            | Def::Fun { span, .. }
            | Def::Mapping { span, .. }
            | Def::Let { span, .. }
            | Def::DefaultOrder { span, .. }
            | Def::Overload { span, .. }
            | Def::Register { span, .. } => *span,
        }
    }

    pub fn name(&self) -> Option<&Id> {
        match self {
            Def::Kind { name, .. }
            | Def::ValSpec { name, .. }
            | Def::Fun { name, .. }
            | Def::Mapping { name, .. }
            | Def::Overload { name, .. }
            | Def::Register { name, .. } => Some(name),
            Def::Let { .. } | Def::DefaultOrder { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_clause_directionality() {
        let span = Span::DUMMY;
        let bidir = MappingClause::Bidir {
            lhs: dummy_pat(),
            rhs: dummy_pat(),
            span,
        };
        assert!(bidir.usable_forwards() && bidir.usable_backwards());
    }

    fn dummy_pat() -> Pat {
        use crate::node::NodeIdGen;
        use crate::pattern::PatKind;
        let gen = NodeIdGen::new();
        Pat::new(gen.next(), Span::DUMMY, PatKind::Wild)
    }
}

//! Patterns (spec.md §3 "Patterns", §6 "bind_pat").

use crate::ident::Id;
use crate::node::NodeId;
use sail_common::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Lit {
    Unit,
    True,
    False,
    Num(i128),
    Bin(String),
    Hex(String),
    Str(String),
    Undef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PatKind {
    Wild,
    /// A binding occurrence; also used for nullary union constructors
    /// and enum members once resolved against the environment.
    Id(Id),
    Lit(Lit),
    Tuple(Vec<Pat>),
    /// Union/enum constructor application. A constructor applied to more
    /// than one argument is re-parsed as a single tuple argument (spec.md
    /// §3 note on application patterns), so `args` here is always of
    /// length 0 or 1 by construction.
    App(Id, Vec<Pat>),
    /// `pat as id`.
    As(Box<Pat>, Id),
    /// `pat : typ`, a type ascription that seeds `bind_pat` with an
    /// expected type instead of inferring one.
    Typ(Box<Pat>, Box<crate::ty::Type>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pat {
    pub id: NodeId,
    pub span: Span,
    pub kind: PatKind,
}

impl Pat {
    pub fn new(id: NodeId, span: Span, kind: PatKind) -> Self {
        Pat { id, span, kind }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.kind, PatKind::Wild)
    }

    /// Identifiers this pattern binds, in left-to-right occurrence order
    /// (spec.md §6, l-expression/pattern binding must reject duplicate
    /// binders within one pattern).
    pub fn bound_ids(&self) -> Vec<Id> {
        let mut out = Vec::new();
        self.collect_bound_ids(&mut out);
        out
    }

    fn collect_bound_ids(&self, out: &mut Vec<Id>) {
        match &self.kind {
            PatKind::Wild | PatKind::Lit(_) => {}
            PatKind::Id(id) => out.push(id.clone()),
            PatKind::Tuple(pats) => {
                for p in pats {
                    p.collect_bound_ids(out);
                }
            }
            PatKind::App(_, args) => {
                for p in args {
                    p.collect_bound_ids(out);
                }
            }
            PatKind::As(inner, id) => {
                inner.collect_bound_ids(out);
                out.push(id.clone());
            }
            PatKind::Typ(inner, _) => inner.collect_bound_ids(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeIdGen;

    #[test]
    fn bound_ids_collects_through_as_and_tuple() {
        let gen = NodeIdGen::new();
        let inner = Pat::new(gen.next(), Span::DUMMY, PatKind::Id(Id::new("x")));
        let wrapped = Pat::new(
            gen.next(),
            Span::DUMMY,
            PatKind::As(Box::new(inner), Id::new("y")),
        );
        let tup = Pat::new(
            gen.next(),
            Span::DUMMY,
            PatKind::Tuple(vec![wrapped, Pat::new(gen.next(), Span::DUMMY, PatKind::Wild)]),
        );
        let ids: Vec<String> = tup.bound_ids().iter().map(|i| i.as_str().to_string()).collect();
        assert_eq!(ids, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn duplicate_free_pattern_has_no_duplicate_binders() {
        let gen = NodeIdGen::new();
        let p = Pat::new(gen.next(), Span::DUMMY, PatKind::Id(Id::new("x")));
        assert_eq!(p.bound_ids().len(), 1);
    }
}

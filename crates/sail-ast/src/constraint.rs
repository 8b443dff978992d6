//! Numeric constraints ("N-constraints", spec.md §3).

use crate::ident::Id;
use crate::nexp::NExp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NConstraint {
    True,
    False,
    Eq(NExp, NExp),
    NotEq(NExp, NExp),
    Le(NExp, NExp),
    Ge(NExp, NExp),
    /// `kid ∈ {n1, .., nk}`.
    In(Id, Vec<i128>),
    And(Box<NConstraint>, Box<NConstraint>),
    Or(Box<NConstraint>, Box<NConstraint>),
    /// A named application — resolved against the environment's
    /// constraint-synonym table during `expand_synonyms`.
    App(Id, Vec<NExp>),
}

impl NConstraint {
    pub fn and(self, other: NConstraint) -> Self {
        match (&self, &other) {
            (NConstraint::True, _) => other,
            (_, NConstraint::True) => self,
            _ => NConstraint::And(Box::new(self), Box::new(other)),
        }
    }

    pub fn and_all(mut constraints: Vec<NConstraint>) -> NConstraint {
        constraints
            .drain(..)
            .fold(NConstraint::True, NConstraint::and)
    }

    pub fn or(self, other: NConstraint) -> Self {
        NConstraint::Or(Box::new(self), Box::new(other))
    }

    pub fn not(&self) -> NConstraint {
        match self {
            NConstraint::True => NConstraint::False,
            NConstraint::False => NConstraint::True,
            NConstraint::Eq(a, b) => NConstraint::NotEq(a.clone(), b.clone()),
            NConstraint::NotEq(a, b) => NConstraint::Eq(a.clone(), b.clone()),
            // ¬(a ≤ b) ⇔ a ≥ b+1
            NConstraint::Le(a, b) => NConstraint::Ge(a.clone(), b.clone().add_one()),
            // ¬(a ≥ b) ⇔ a ≤ b-1
            NConstraint::Ge(a, b) => NConstraint::Le(a.clone(), b.clone().sub_one()),
            NConstraint::In(id, values) => {
                // ¬(kid ∈ vs) has no closed finite form here; represented
                // as a disjunction of disequalities.
                values
                    .iter()
                    .map(|v| NConstraint::NotEq(NExp::Var(id.clone()), NExp::Int(*v)))
                    .fold(NConstraint::True, NConstraint::and)
            }
            NConstraint::And(a, b) => a.not().or(b.not()),
            NConstraint::Or(a, b) => a.not().and(b.not()),
            NConstraint::App(id, args) => {
                NConstraint::App(Id::new(format!("not_{}", id.as_str())), args.clone())
            }
        }
    }

    pub fn is_trivially_true(&self) -> bool {
        matches!(self, NConstraint::True)
    }
}

trait NExpExt {
    fn sub_one(self) -> NExp;
    fn add_one(self) -> NExp;
}

impl NExpExt for NExp {
    fn sub_one(self) -> NExp {
        NExp::Sub(Box::new(self), Box::new(NExp::Int(1)))
    }

    fn add_one(self) -> NExp {
        NExp::Add(Box::new(self), Box::new(NExp::Int(1)))
    }
}

//! Numeric expressions ("N-exps", spec.md §3) and the numeric simplifier
//! (spec.md §4.1).
//!
//! All arithmetic is over unbounded integers (`i128` is used as the
//! concrete representation; overflow beyond that range is not a concern
//! any real ISA specification exercises).

use crate::ident::Id;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NExp {
    Int(i128),
    /// A kind-`Int` variable.
    Var(Id),
    /// A named numeric constant, resolved through the environment's
    /// numeric-constants table rather than bound by a quantifier.
    Constant(Id),
    Neg(Box<NExp>),
    Add(Box<NExp>, Box<NExp>),
    Sub(Box<NExp>, Box<NExp>),
    Mul(Box<NExp>, Box<NExp>),
    /// `2^n`.
    Exp(Box<NExp>),
    /// An uninterpreted named application, e.g. a user-defined numeric
    /// function the oracle has a registered SMT symbol for.
    App(Id, Vec<NExp>),
}

impl NExp {
    pub fn int(n: i128) -> Self {
        NExp::Int(n)
    }

    pub fn var(id: impl Into<Id>) -> Self {
        NExp::Var(id.into())
    }

    pub fn add(self, other: NExp) -> Self {
        NExp::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: NExp) -> Self {
        NExp::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: NExp) -> Self {
        NExp::Mul(Box::new(self), Box::new(other))
    }

    pub fn neg(self) -> Self {
        NExp::Neg(Box::new(self))
    }

    pub fn as_const(&self) -> Option<i128> {
        match self {
            NExp::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Fold constants, collapse `x+0`, `x*1`, `--x`, and associate
    /// additions left-to-right. This is the simplifier spec.md §4.1
    /// describes; it is a normal form for *display and fast-path
    /// equality*, not a decision procedure — the oracle is still the
    /// authority for anything this can't resolve syntactically.
    pub fn simplify(&self) -> NExp {
        match self {
            NExp::Int(_) | NExp::Var(_) | NExp::Constant(_) => self.clone(),
            NExp::Neg(inner) => match inner.simplify() {
                NExp::Int(n) => NExp::Int(-n),
                NExp::Neg(x) => *x,
                other => NExp::Neg(Box::new(other)),
            },
            NExp::Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (NExp::Int(x), NExp::Int(y)) => NExp::Int(x + y),
                    (NExp::Int(0), _) => b,
                    (_, NExp::Int(0)) => a,
                    // Re-associate `(x + c1) + c2` into `x + (c1 + c2)` so
                    // that repeated `+1`-style construction folds.
                    (NExp::Add(x, c1), NExp::Int(c2)) => {
                        if let NExp::Int(c1) = c1.as_ref() {
                            NExp::Add(x.clone(), Box::new(NExp::Int(c1 + c2)))
                        } else {
                            NExp::Add(Box::new(a), Box::new(b))
                        }
                    }
                    _ => NExp::Add(Box::new(a), Box::new(b)),
                }
            }
            NExp::Sub(a, b) => {
                // Canonicalise `a - b` to `a + (-b)` only for comparison;
                // callers that need literal `a - b` back use `Sub`
                // directly, this method is used on a throwaway copy.
                let normalized = NExp::Add(Box::new(a.simplify()), Box::new(NExp::Neg(b.clone())));
                normalized.simplify()
            }
            NExp::Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (NExp::Int(x), NExp::Int(y)) => NExp::Int(x * y),
                    (NExp::Int(1), _) => b,
                    (_, NExp::Int(1)) => a,
                    (NExp::Int(0), _) | (_, NExp::Int(0)) => NExp::Int(0),
                    _ => NExp::Mul(Box::new(a), Box::new(b)),
                }
            }
            NExp::Exp(n) => match n.simplify() {
                NExp::Int(k) if k >= 0 && k < 64 => NExp::Int(1i128 << k),
                other => NExp::Exp(Box::new(other)),
            },
            NExp::App(id, args) => {
                NExp::App(id.clone(), args.iter().map(NExp::simplify).collect())
            }
        }
    }

    /// Structural equality up to the simplifier's normal form. Used by
    /// the oracle's syntactic fast path (spec.md §4.2) before a real
    /// solver call is made.
    pub fn syntactically_equal(&self, other: &NExp) -> bool {
        self.simplify() == other.simplify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_constants() {
        let e = NExp::int(2).add(NExp::int(3));
        assert_eq!(e.simplify(), NExp::Int(5));
    }

    #[test]
    fn collapses_add_zero() {
        let e = NExp::var("n").add(NExp::int(0));
        assert_eq!(e.simplify(), NExp::var("n"));
    }

    #[test]
    fn collapses_double_negation() {
        let e = NExp::var("n").neg().neg();
        assert_eq!(e.simplify(), NExp::var("n"));
    }

    #[test]
    fn sub_becomes_add_neg_for_comparison() {
        let a = NExp::var("n").sub(NExp::int(1));
        let b = NExp::var("n").add(NExp::int(1).neg());
        assert!(a.syntactically_equal(&b));
    }

    #[test]
    fn associates_repeated_addition() {
        let e = NExp::var("n").add(NExp::int(1)).add(NExp::int(1));
        assert_eq!(e.simplify(), NExp::var("n").add(NExp::int(2)));
    }

    #[test]
    fn folds_power_of_two() {
        let e = NExp::Exp(Box::new(NExp::int(5)));
        assert_eq!(e.simplify(), NExp::Int(32));
    }
}

//! Capture-avoiding substitution, free-variable computation, and
//! structural/α-equivalence for the term algebra (spec.md §4.1).

use crate::constraint::NConstraint;
use crate::ident::Id;
use crate::nexp::NExp;
use crate::order::Order;
use crate::ty::{Type, TypeArg};
use rustc_hash::FxHashSet;

/// The free type/numeric/order variables of a term, with an "excluded"
/// set to handle existentials (spec.md §4.1).
#[derive(Default, Debug, Clone)]
pub struct FreeVars {
    pub types: FxHashSet<Id>,
    pub nums: FxHashSet<Id>,
    pub orders: FxHashSet<Id>,
}

impl FreeVars {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.nums.is_empty() && self.orders.is_empty()
    }

    fn merge(&mut self, other: FreeVars) {
        self.types.extend(other.types);
        self.nums.extend(other.nums);
        self.orders.extend(other.orders);
    }
}

pub fn free_vars_nexp(n: &NExp) -> FreeVars {
    let mut fv = FreeVars::default();
    collect_nexp(n, &mut fv);
    fv
}

fn collect_nexp(n: &NExp, fv: &mut FreeVars) {
    match n {
        NExp::Int(_) | NExp::Constant(_) => {}
        NExp::Var(id) => {
            fv.nums.insert(id.clone());
        }
        NExp::Neg(a) | NExp::Exp(a) => collect_nexp(a, fv),
        NExp::Add(a, b) | NExp::Sub(a, b) | NExp::Mul(a, b) => {
            collect_nexp(a, fv);
            collect_nexp(b, fv);
        }
        NExp::App(_, args) => {
            for a in args {
                collect_nexp(a, fv);
            }
        }
    }
}

pub fn free_vars_constraint(nc: &NConstraint) -> FreeVars {
    let mut fv = FreeVars::default();
    collect_constraint(nc, &mut fv);
    fv
}

fn collect_constraint(nc: &NConstraint, fv: &mut FreeVars) {
    match nc {
        NConstraint::True | NConstraint::False => {}
        NConstraint::Eq(a, b)
        | NConstraint::NotEq(a, b)
        | NConstraint::Le(a, b)
        | NConstraint::Ge(a, b) => {
            collect_nexp(a, fv);
            collect_nexp(b, fv);
        }
        NConstraint::In(id, _) => {
            fv.nums.insert(id.clone());
        }
        NConstraint::And(a, b) | NConstraint::Or(a, b) => {
            collect_constraint(a, fv);
            collect_constraint(b, fv);
        }
        NConstraint::App(_, args) => {
            for a in args {
                collect_nexp(a, fv);
            }
        }
    }
}

pub fn free_vars_type(ty: &Type) -> FreeVars {
    let mut fv = FreeVars::default();
    collect_type(ty, &mut fv);
    fv
}

fn collect_type(ty: &Type, fv: &mut FreeVars) {
    match ty {
        Type::Id(_) | Type::Unknown => {}
        Type::Var(id) => {
            fv.types.insert(id.clone());
        }
        Type::Function { args, ret, .. } => {
            for a in args {
                collect_type(a, fv);
            }
            collect_type(ret, fv);
        }
        Type::Bidir(a, b) => {
            collect_type(a, fv);
            collect_type(b, fv);
        }
        Type::Tuple(elems) => {
            for e in elems {
                collect_type(e, fv);
            }
        }
        Type::App(_, args) => {
            for a in args {
                match a {
                    TypeArg::Type(t) => collect_type(t, fv),
                    TypeArg::Num(n) => collect_nexp(n, fv),
                    TypeArg::Ord(Order::Var(id)) => {
                        fv.orders.insert(id.clone());
                    }
                    TypeArg::Ord(_) => {}
                }
            }
        }
        Type::Exist {
            kids,
            constraint,
            body,
        } => {
            let mut inner = FreeVars::default();
            collect_constraint(constraint, &mut inner);
            collect_type(body, &mut inner);
            for (kid, _) in kids {
                inner.types.remove(kid);
                inner.nums.remove(kid);
                inner.orders.remove(kid);
            }
            fv.merge(inner);
        }
    }
}

/// A substitution of type, numeric, and order variables, applied
/// simultaneously (spec.md §4.4's `unify` returns exactly this shape).
#[derive(Default, Debug, Clone)]
pub struct Subst {
    pub types: rustc_hash::FxHashMap<Id, Type>,
    pub nums: rustc_hash::FxHashMap<Id, NExp>,
    pub orders: rustc_hash::FxHashMap<Id, Order>,
}

impl Subst {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.nums.is_empty() && self.orders.is_empty()
    }

    pub fn bind_type(mut self, id: Id, ty: Type) -> Self {
        self.types.insert(id, ty);
        self
    }

    pub fn bind_num(mut self, id: Id, n: NExp) -> Self {
        self.nums.insert(id, n);
        self
    }

    pub fn bind_order(mut self, id: Id, o: Order) -> Self {
        self.orders.insert(id, o);
        self
    }

    /// Compose `self` then `other`: `other` is applied to `self`'s
    /// range, then the two maps are merged (later-applied, i.e. `other`,
    /// wins on key collision).
    pub fn compose(mut self, other: Subst) -> Subst {
        for v in self.types.values_mut() {
            *v = other.apply_type(v);
        }
        for v in self.nums.values_mut() {
            *v = other.apply_nexp(v);
        }
        for v in self.orders.values_mut() {
            *v = other.apply_order(v);
        }
        for (k, v) in other.types {
            self.types.entry(k).or_insert(v);
        }
        for (k, v) in other.nums {
            self.nums.entry(k).or_insert(v);
        }
        for (k, v) in other.orders {
            self.orders.entry(k).or_insert(v);
        }
        self
    }

    pub fn apply_nexp(&self, n: &NExp) -> NExp {
        match n {
            NExp::Int(_) | NExp::Constant(_) => n.clone(),
            NExp::Var(id) => self.nums.get(id).cloned().unwrap_or_else(|| n.clone()),
            NExp::Neg(a) => NExp::Neg(Box::new(self.apply_nexp(a))),
            NExp::Exp(a) => NExp::Exp(Box::new(self.apply_nexp(a))),
            NExp::Add(a, b) => NExp::Add(Box::new(self.apply_nexp(a)), Box::new(self.apply_nexp(b))),
            NExp::Sub(a, b) => NExp::Sub(Box::new(self.apply_nexp(a)), Box::new(self.apply_nexp(b))),
            NExp::Mul(a, b) => NExp::Mul(Box::new(self.apply_nexp(a)), Box::new(self.apply_nexp(b))),
            NExp::App(id, args) => {
                NExp::App(id.clone(), args.iter().map(|a| self.apply_nexp(a)).collect())
            }
        }
    }

    pub fn apply_order(&self, o: &Order) -> Order {
        match o {
            Order::Var(id) => self.orders.get(id).cloned().unwrap_or_else(|| o.clone()),
            other => other.clone(),
        }
    }

    pub fn apply_constraint(&self, nc: &NConstraint) -> NConstraint {
        match nc {
            NConstraint::True | NConstraint::False => nc.clone(),
            NConstraint::Eq(a, b) => NConstraint::Eq(self.apply_nexp(a), self.apply_nexp(b)),
            NConstraint::NotEq(a, b) => NConstraint::NotEq(self.apply_nexp(a), self.apply_nexp(b)),
            NConstraint::Le(a, b) => NConstraint::Le(self.apply_nexp(a), self.apply_nexp(b)),
            NConstraint::Ge(a, b) => NConstraint::Ge(self.apply_nexp(a), self.apply_nexp(b)),
            NConstraint::In(id, values) => {
                if let Some(replacement) = self.nums.get(id) {
                    if let NExp::Var(new_id) = replacement {
                        return NConstraint::In(new_id.clone(), values.clone());
                    }
                    // Substituted by a ground term: specialise to a
                    // disjunction of equalities, still sound.
                    return values
                        .iter()
                        .map(|v| NConstraint::Eq(replacement.clone(), NExp::Int(*v)))
                        .fold(NConstraint::False, NConstraint::or);
                }
                nc.clone()
            }
            NConstraint::And(a, b) => {
                NConstraint::And(Box::new(self.apply_constraint(a)), Box::new(self.apply_constraint(b)))
            }
            NConstraint::Or(a, b) => {
                NConstraint::Or(Box::new(self.apply_constraint(a)), Box::new(self.apply_constraint(b)))
            }
            NConstraint::App(id, args) => {
                NConstraint::App(id.clone(), args.iter().map(|a| self.apply_nexp(a)).collect())
            }
        }
    }

    pub fn apply_type(&self, ty: &Type) -> Type {
        match ty {
            Type::Id(_) | Type::Unknown => ty.clone(),
            Type::Var(id) => self.types.get(id).cloned().unwrap_or_else(|| ty.clone()),
            Type::Function { args, ret, effect } => Type::Function {
                args: args.iter().map(|a| self.apply_type(a)).collect(),
                ret: Box::new(self.apply_type(ret)),
                effect: *effect,
            },
            Type::Bidir(a, b) => Type::Bidir(Box::new(self.apply_type(a)), Box::new(self.apply_type(b))),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|e| self.apply_type(e)).collect()),
            Type::App(id, args) => Type::App(
                id.clone(),
                args.iter()
                    .map(|a| match a {
                        TypeArg::Type(t) => TypeArg::Type(Box::new(self.apply_type(t))),
                        TypeArg::Num(n) => TypeArg::Num(self.apply_nexp(n)),
                        TypeArg::Ord(o) => TypeArg::Ord(self.apply_order(o)),
                    })
                    .collect(),
            ),
            Type::Exist {
                kids,
                constraint,
                body,
            } => {
                // Capture avoidance: rename any binder that appears in the
                // range of the substitution restricted to the *other*
                // free variables of this existential, via a reserved
                // prefix, before substituting.
                let (kids, constraint, body) = rename_captured_binders(kids, constraint, body, self);
                Type::Exist {
                    kids: kids.clone(),
                    constraint: Box::new(self.apply_constraint(&constraint)),
                    body: Box::new(self.apply_type(&body)),
                }
            }
        }
    }
}

fn rename_captured_binders(
    kids: &[(Id, crate::kind::Kind)],
    constraint: &NConstraint,
    body: &Type,
    subst: &Subst,
) -> (Vec<(Id, crate::kind::Kind)>, NConstraint, Type) {
    use std::cell::Cell;
    thread_local! {
        static COUNTER: Cell<u64> = const { Cell::new(0) };
    }
    let mut rename = Subst::default();
    let mut new_kids = Vec::with_capacity(kids.len());
    for (kid, kind) in kids {
        let clashes = subst.types.contains_key(kid)
            || subst.nums.contains_key(kid)
            || subst.orders.contains_key(kid)
            || subst
                .types
                .values()
                .any(|t| free_vars_type(t).types.contains(kid))
            || subst
                .nums
                .values()
                .any(|n| free_vars_nexp(n).nums.contains(kid));
        if clashes {
            let fresh = COUNTER.with(|c| {
                let v = c.get();
                c.set(v + 1);
                Id::fresh(kid.as_str(), v)
            });
            match kind {
                crate::kind::Kind::Type => {
                    rename = rename.bind_type(kid.clone(), Type::Var(fresh.clone()))
                }
                crate::kind::Kind::Int => {
                    rename = rename.bind_num(kid.clone(), NExp::Var(fresh.clone()))
                }
                crate::kind::Kind::Order => {
                    rename = rename.bind_order(kid.clone(), Order::Var(fresh.clone()))
                }
                crate::kind::Kind::Effect => {}
            }
            new_kids.push((fresh, *kind));
        } else {
            new_kids.push((kid.clone(), *kind));
        }
    }
    if rename.is_empty() {
        (new_kids, constraint.clone(), body.clone())
    } else {
        (
            new_kids,
            rename.apply_constraint(constraint),
            rename.apply_type(body),
        )
    }
}

/// Structural equality up to α-equivalence of existential and (for
/// function types used as quantifier bodies) quantifier binders. This
/// resolves the first open question in spec.md §9: `Typ_bidir`'s
/// structural-inequality check uses α-equivalence, not raw structural
/// equality.
pub fn alpha_eq(a: &Type, b: &Type) -> bool {
    alpha_eq_under(a, b, &mut Vec::new())
}

fn alpha_eq_under(a: &Type, b: &Type, renames: &mut Vec<(Id, Id)>) -> bool {
    match (a, b) {
        (Type::Id(x), Type::Id(y)) => x == y,
        (Type::Var(x), Type::Var(y)) => {
            renames.iter().any(|(l, r)| l == x && r == y) || x == y
        }
        (Type::Unknown, Type::Unknown) => true,
        (
            Type::Function {
                args: a1,
                ret: r1,
                effect: e1,
            },
            Type::Function {
                args: a2,
                ret: r2,
                effect: e2,
            },
        ) => {
            e1 == e2
                && a1.len() == a2.len()
                && a1
                    .iter()
                    .zip(a2)
                    .all(|(x, y)| alpha_eq_under(x, y, renames))
                && alpha_eq_under(r1, r2, renames)
        }
        (Type::Bidir(a1, b1), Type::Bidir(a2, b2)) => {
            alpha_eq_under(a1, a2, renames) && alpha_eq_under(b1, b2, renames)
        }
        (Type::Tuple(e1), Type::Tuple(e2)) => {
            e1.len() == e2.len() && e1.iter().zip(e2).all(|(x, y)| alpha_eq_under(x, y, renames))
        }
        (Type::App(id1, args1), Type::App(id2, args2)) => {
            id1 == id2
                && args1.len() == args2.len()
                && args1.iter().zip(args2).all(|(x, y)| match (x, y) {
                    (TypeArg::Type(t1), TypeArg::Type(t2)) => alpha_eq_under(t1, t2, renames),
                    (TypeArg::Num(n1), TypeArg::Num(n2)) => n1.syntactically_equal(n2),
                    (TypeArg::Ord(o1), TypeArg::Ord(o2)) => o1 == o2,
                    _ => false,
                })
        }
        (
            Type::Exist {
                kids: k1,
                constraint: c1,
                body: b1,
            },
            Type::Exist {
                kids: k2,
                constraint: c2,
                body: b2,
            },
        ) => {
            if k1.len() != k2.len() {
                return false;
            }
            let mut extended = renames.clone();
            for ((l, lk), (r, rk)) in k1.iter().zip(k2) {
                if lk != rk {
                    return false;
                }
                extended.push((l.clone(), r.clone()));
            }
            c1 == c2 && alpha_eq_under(b1, b2, &mut extended)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;

    #[test]
    fn alpha_eq_ignores_existential_binder_names() {
        let a = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        let b = Type::Exist {
            kids: vec![(Id::new("m"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("m"))),
        };
        assert!(alpha_eq(&a, &b));
    }

    #[test]
    fn subst_avoids_capturing_existential_binder() {
        // ∃n. atom(n), substitute n := n (a free variable from the
        // caller's scope) into a context where it would otherwise be
        // captured by the existential's own binder `n`.
        let exist = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        let subst = Subst::default().bind_num(Id::new("m"), NExp::var("n"));
        let result = subst.apply_type(&exist);
        match result {
            Type::Exist { kids, body, .. } => {
                assert_ne!(kids[0].0, Id::new("n"));
                // The body's bound occurrence was renamed along with the
                // binder, so the substituted-in `n` is still free.
                assert_eq!(free_vars_type(&body).nums.contains(&Id::new("n")), true);
            }
            _ => panic!("expected existential"),
        }
    }

    #[test]
    fn free_vars_excludes_existential_binders() {
        let exist = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        assert!(free_vars_type(&exist).nums.is_empty());
    }
}

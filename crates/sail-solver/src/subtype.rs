//! Subtyping (spec.md §4.5).

use crate::oracle::ConstraintOracle;
use crate::unify::{unify_positional_args, unify_types, UnifyResult};
use rustc_hash::FxHashSet;
use sail_ast::subst::alpha_eq;
use sail_ast::ty::canonicalize;
use sail_ast::{Id, NConstraint, Type};
use sail_env::{BindingLocation, Environment, TypeVarEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeError {
    pub message: String,
}

impl std::fmt::Display for SubtypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SubtypeError {}

fn err(message: impl Into<String>) -> SubtypeError {
    SubtypeError {
        message: message.into(),
    }
}

/// `subtype(env, T1, T2)`: does every value of `T1` also inhabit `T2`?
/// (spec.md §4.5, the 5-step procedure.) Returns the environment extended
/// with whatever binders/constraints step 2/4/5 opened along the way, so
/// the caller can keep threading it; the environment is unchanged on
/// failure.
pub fn subtype(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    t1: &Type,
    t2: &Type,
) -> Result<Environment, SubtypeError> {
    // Step 3: α-equivalent types are always subtypes of one another,
    // checked up front since it is the cheapest and most common case
    // (e.g. repeated checks against an unchanged annotation).
    if alpha_eq(t1, t2) {
        return Ok(env.clone());
    }

    // Step 1: tuples are pointwise subtypes.
    if let (Type::Tuple(e1), Type::Tuple(e2)) = (t1, t2) {
        if e1.len() != e2.len() {
            return Err(err("tuple arity mismatch during subtyping"));
        }
        let mut cur = env.clone();
        for (x, y) in e1.iter().zip(e2) {
            cur = subtype(&cur, oracle, x, y)?;
        }
        return Ok(cur);
    }

    // Step 4: T1 existential — open it into the environment and recurse
    // on the body, with T2 held fixed (spec.md §4.5 rule 4).
    if let Type::Exist {
        kids,
        constraint,
        body,
    } = t1
    {
        let mut opened = env.clone();
        for (kid, kind) in kids {
            opened = opened.add_type_var(
                kid.clone(),
                TypeVarEntry {
                    location: BindingLocation::ExistentialGoal,
                    kind: *kind,
                },
            );
        }
        opened = opened.add_constraint((**constraint).clone());
        return subtype(&opened, oracle, body, t2);
    }

    // Step 2: both numeric types dispatch to the oracle over their
    // uniform (kids, nc, nexp) destructuring.
    if t1.is_numeric() && t2.is_numeric() {
        return subtype_numeric(env, oracle, t1, t2);
    }

    // Step 5: canonicalise T2, unify its base shape against T1 with T2's
    // own existential binders as goals, then discharge the residual
    // constraint universally.
    subtype_structural(env, oracle, t1, t2)
}

fn subtype_numeric(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    t1: &Type,
    t2: &Type,
) -> Result<Environment, SubtypeError> {
    let (kids1, nc1, nexp1) = t1
        .as_numeric_destructured(|| env.fresh_kid("n"))
        .ok_or_else(|| err(format!("`{t1:?}` is not a numeric type")))?;
    let (kids2, nc2, nexp2) = t2
        .as_numeric_destructured(|| env.fresh_kid("n"))
        .ok_or_else(|| err(format!("`{t2:?}` is not a numeric type")))?;

    let mut extended = env.clone();
    for kid in &kids1 {
        extended = extended.add_type_var(
            kid.clone(),
            TypeVarEntry {
                location: BindingLocation::ExistentialGoal,
                kind: sail_ast::Kind::Int,
            },
        );
    }
    extended = extended.add_constraint(nc1);

    // The obligation: for every assignment of kids2 satisfying nc2,
    // nexp1 must equal nexp2. Equivalently, `nexp1 = nexp2 ∧ ¬nc2` must
    // be unsatisfiable — kids2 are left unbound (existentially
    // quantified from the oracle's point of view; an UNSAT check over
    // all free variables already covers that).
    let obligation = NConstraint::Eq(nexp1, nexp2.clone()).and(nc2.not());
    let _ = kids2; // kids2 only scope nc2/nexp2 inside the obligation above.
    if oracle.prove(&extended, &obligation.not()) {
        Ok(extended)
    } else {
        Err(err(format!(
            "could not prove numeric subtyping obligation {obligation:?} is unsatisfiable"
        )))
    }
}

fn subtype_structural(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    t1: &Type,
    t2: &Type,
) -> Result<Environment, SubtypeError> {
    let canon2 = canonicalize(t2).map_err(|e| err(e.message))?;
    let (kids2, nc2, base2) = match canon2 {
        Type::Exist {
            kids,
            constraint,
            body,
        } => (kids, *constraint, *body),
        other => (Vec::new(), NConstraint::True, other),
    };

    let type_goals: FxHashSet<Id> = kids2
        .iter()
        .filter(|(_, k)| *k == sail_ast::Kind::Type)
        .map(|(id, _)| id.clone())
        .collect();
    let num_goals: FxHashSet<Id> = kids2
        .iter()
        .filter(|(_, k)| *k == sail_ast::Kind::Int)
        .map(|(id, _)| id.clone())
        .collect();
    let mut result = UnifyResult::default();
    match (&base2, t1) {
        (Type::App(id2, args2), Type::App(id1, args1)) if id1 == id2 && args1.len() == args2.len() => {
            unify_positional_args(env, oracle, &type_goals, &num_goals, args2, args1, &mut result)
                .map_err(|e| err(e.message))?;
        }
        _ => {
            unify_types(
                env,
                oracle,
                &type_goals,
                &num_goals,
                &base2,
                t1,
                &mut result,
            )
            .map_err(|e| err(e.message))?;
        }
    }

    let residual = result.subst.apply_constraint(&nc2);
    let mut extended = env.clone();
    for (id, n) in &result.subst.nums {
        extended = extended.add_constraint(NConstraint::Eq(sail_ast::NExp::Var(id.clone()), n.clone()));
    }
    if !residual.is_trivially_true() && !oracle.prove(&extended, &residual) {
        return Err(err(format!(
            "residual constraint `{residual:?}` does not hold universally"
        )));
    }
    Ok(extended)
}

/// `typ_equality(env, T1, T2) = subtype(T1,T2) ∧ subtype(T2,T1)` (spec.md
/// §4.5).
pub fn typ_equality(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    t1: &Type,
    t2: &Type,
) -> bool {
    subtype(env, oracle, t1, t2).is_ok() && subtype(env, oracle, t2, t1).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{StubOracle, Z3Oracle};
    use sail_ast::{Kind, NExp};

    #[test]
    fn alpha_equivalent_types_are_subtypes() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        assert!(subtype(&env, &mut oracle, &Type::bool_(), &Type::bool_()).is_ok());
    }

    #[test]
    fn atom_is_subtype_of_equal_atom() {
        let env = Environment::new();
        let mut oracle = Z3Oracle::new();
        let t1 = Type::atom(NExp::int(3));
        let t2 = Type::atom(NExp::int(3));
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_ok());
    }

    #[test]
    fn atom_is_not_subtype_of_different_atom() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let t1 = Type::atom(NExp::int(3));
        let t2 = Type::atom(NExp::int(4));
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_err());
    }

    #[test]
    fn atom_is_subtype_of_enclosing_range() {
        let env = Environment::new();
        let mut oracle = Z3Oracle::new();
        let t1 = Type::atom(NExp::int(3));
        let t2 = Type::range(NExp::int(0), NExp::int(10));
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_ok());
    }

    #[test]
    fn range_is_not_subtype_of_narrower_range() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let t1 = Type::range(NExp::int(0), NExp::int(10));
        let t2 = Type::range(NExp::int(0), NExp::int(5));
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_err());
    }

    #[test]
    fn existential_t1_opens_into_environment() {
        let env = Environment::new();
        let mut oracle = Z3Oracle::new();
        let t1 = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::Eq(NExp::var("n"), NExp::int(3))),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        let t2 = Type::range(NExp::int(0), NExp::int(10));
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_ok());
    }

    #[test]
    fn tuple_subtyping_is_pointwise() {
        let env = Environment::new();
        let mut oracle = Z3Oracle::new();
        let t1 = Type::Tuple(vec![Type::atom(NExp::int(3)), Type::bool_()]);
        let t2 = Type::Tuple(vec![Type::range(NExp::int(0), NExp::int(10)), Type::bool_()]);
        assert!(subtype(&env, &mut oracle, &t1, &t2).is_ok());
    }

    #[test]
    fn typ_equality_requires_both_directions() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let t1 = Type::range(NExp::int(0), NExp::int(10));
        let t2 = Type::range(NExp::int(0), NExp::int(5));
        assert!(!typ_equality(&env, &mut oracle, &t1, &t2));
        assert!(typ_equality(&env, &mut oracle, &t1, &t1));
    }
}

//! Unification (spec.md §4.4).

use crate::oracle::ConstraintOracle;
use rustc_hash::FxHashSet;
use sail_ast::subst::{free_vars_nexp, free_vars_type, Subst};
use sail_ast::{Id, Kind, NConstraint, NExp, Order, Type, TypeArg};
use sail_env::Environment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifyError {
    pub message: String,
}

impl std::fmt::Display for UnifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UnifyError {}

fn err(message: impl Into<String>) -> UnifyError {
    UnifyError {
        message: message.into(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnifyResult {
    pub subst: Subst,
    /// Existential goals opened from `t_actual`, to be added to the
    /// environment by the caller (spec.md §4.4).
    pub opened_existentials: Vec<(Id, Kind)>,
    pub opened_constraint: Option<NConstraint>,
}

/// `unify(env, T_pat, T_actual) -> substitution x opened_existentials x
/// opened_constraint?` (spec.md §4.4). Goals are the `Int`- and
/// `Type`-kinded free variables of `t_pat` that do not occur in
/// `t_actual`.
pub fn unify(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    t_pat: &Type,
    t_actual: &Type,
) -> Result<UnifyResult, UnifyError> {
    let pat_fv = free_vars_type(t_pat);
    let actual_fv = free_vars_type(t_actual);
    let type_goals: FxHashSet<Id> = pat_fv
        .types
        .difference(&actual_fv.types)
        .cloned()
        .collect();
    let num_goals: FxHashSet<Id> = pat_fv.nums.difference(&actual_fv.nums).cloned().collect();
    let mut result = UnifyResult::default();
    unify_types(env, oracle, &type_goals, &num_goals, t_pat, t_actual, &mut result)?;
    Ok(result)
}

pub(crate) fn unify_types(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    type_goals: &FxHashSet<Id>,
    num_goals: &FxHashSet<Id>,
    t_pat: &Type,
    t_actual: &Type,
    result: &mut UnifyResult,
) -> Result<(), UnifyError> {
    // Opening an existential actual type takes priority: its binders
    // become fresh goals the caller adds to the environment.
    if let Type::Exist {
        kids,
        constraint,
        body,
    } = t_actual
    {
        result.opened_existentials.extend(kids.iter().cloned());
        result.opened_constraint = Some(match result.opened_constraint.take() {
            Some(prior) => prior.and((**constraint).clone()),
            None => (**constraint).clone(),
        });
        return unify_types(env, oracle, type_goals, num_goals, t_pat, body, result);
    }

    if let Type::Var(id) = t_pat {
        if type_goals.contains(id) {
            result.subst = std::mem::take(&mut result.subst).bind_type(id.clone(), t_actual.clone());
            return Ok(());
        }
    }

    match (t_pat, t_actual) {
        (Type::Id(a), Type::Id(b)) if a == b => Ok(()),
        (Type::Var(a), Type::Var(b)) if a == b => Ok(()),
        (Type::Unknown, _) | (_, Type::Unknown) => Ok(()),
        (
            Type::Function {
                args: a1,
                ret: r1,
                ..
            },
            Type::Function {
                args: a2,
                ret: r2,
                ..
            },
        ) => {
            if a1.len() != a2.len() {
                return Err(err("function arity mismatch during unification"));
            }
            for (x, y) in a1.iter().zip(a2) {
                unify_types(env, oracle, type_goals, num_goals, x, y, result)?;
            }
            unify_types(env, oracle, type_goals, num_goals, r1, r2, result)
        }
        (Type::Bidir(a1, b1), Type::Bidir(a2, b2)) => {
            unify_types(env, oracle, type_goals, num_goals, a1, a2, result)?;
            unify_types(env, oracle, type_goals, num_goals, b1, b2, result)
        }
        (Type::Tuple(e1), Type::Tuple(e2)) => unify_positional(
            env,
            oracle,
            type_goals,
            num_goals,
            e1.iter().collect(),
            e2.iter().collect(),
            result,
        ),
        (Type::App(id1, args1), Type::App(id2, args2)) if id1 == id2 && args1.len() == args2.len() => {
            unify_positional_args(env, oracle, type_goals, num_goals, args1, args2, result)
        }
        _ => Err(err(format!(
            "cannot unify `{t_pat:?}` with `{t_actual:?}`"
        ))),
    }
}

/// Tuple-and-application unification: repeat passes over the remaining
/// positions, substituting each pass's successes into the rest, until a
/// pass resolves nothing (spec.md §4.4).
fn unify_positional(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    type_goals: &FxHashSet<Id>,
    num_goals: &FxHashSet<Id>,
    pats: Vec<&Type>,
    actuals: Vec<&Type>,
    result: &mut UnifyResult,
) -> Result<(), UnifyError> {
    if pats.len() != actuals.len() {
        return Err(err("tuple arity mismatch during unification"));
    }
    let mut pats: Vec<Type> = pats.into_iter().cloned().collect();
    let actuals: Vec<Type> = actuals.into_iter().cloned().collect();
    let mut remaining: Vec<usize> = (0..pats.len()).collect();
    loop {
        if remaining.is_empty() {
            return Ok(());
        }
        let mut resolved_this_pass = Vec::new();
        for &i in &remaining {
            if unify_types(
                env,
                oracle,
                type_goals,
                num_goals,
                &pats[i],
                &actuals[i],
                result,
            )
            .is_ok()
            {
                resolved_this_pass.push(i);
            }
        }
        if resolved_this_pass.is_empty() {
            return Err(err("unification made no progress on remaining positions"));
        }
        for p in pats.iter_mut() {
            *p = result.subst.apply_type(p);
        }
        remaining.retain(|i| !resolved_this_pass.contains(i));
    }
}

pub(crate) fn unify_positional_args(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    type_goals: &FxHashSet<Id>,
    num_goals: &FxHashSet<Id>,
    pats: &[TypeArg],
    actuals: &[TypeArg],
    result: &mut UnifyResult,
) -> Result<(), UnifyError> {
    for (p, a) in pats.iter().zip(actuals) {
        match (p, a) {
            (TypeArg::Type(t1), TypeArg::Type(t2)) => {
                unify_types(env, oracle, type_goals, num_goals, t1, t2, result)?
            }
            (TypeArg::Num(n1), TypeArg::Num(n2)) => {
                if let Some((id, binding)) = unify_nexp(env, oracle, num_goals, n1, n2)? {
                    result.subst = std::mem::take(&mut result.subst).bind_num(id, binding);
                }
            }
            (TypeArg::Ord(o1), TypeArg::Ord(o2)) => unify_order(o1, o2)?,
            _ => return Err(err("type-argument kind mismatch during unification")),
        }
    }
    Ok(())
}

/// Orders are not unification goals (spec.md §4.4 scopes goals to the
/// `Int`- and `Type`-kinded free variables of `T_pat`); an order
/// position must simply match, or both sides must be the same order
/// variable (e.g. a shared `default_order`).
fn unify_order(pat: &Order, actual: &Order) -> Result<(), UnifyError> {
    if pat == actual {
        Ok(())
    } else {
        Err(err(format!("cannot unify order `{pat}` with `{actual}`")))
    }
}

/// `unify_nexp`: solve one numeric equation `pat = actual` (spec.md
/// §4.4). Returns `Some((goal, binding))` when a goal variable is
/// bound, `None` when the equation holds without binding anything
/// (e.g. it was already ground-equal or discharged by the oracle).
pub fn unify_nexp(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    goals: &FxHashSet<Id>,
    pat: &NExp,
    actual: &NExp,
) -> Result<Option<(Id, NExp)>, UnifyError> {
    let pat = pat.simplify();
    let actual = actual.simplify();

    // `k = e` where `k` is a goal.
    if let NExp::Var(id) = &pat {
        if goals.contains(id) {
            return Ok(Some((id.clone(), actual)));
        }
    }
    // Symmetric case: the goal appears on the actual side (can happen
    // when the caller passes positions in the opposite order).
    if let NExp::Var(id) = &actual {
        if goals.contains(id) && free_vars_nexp(&pat).nums.is_empty() {
            return Ok(Some((id.clone(), pat)));
        }
    }

    // `c1 = c2`: a pure consistency check.
    if let (Some(x), Some(y)) = (pat.as_const(), actual.as_const()) {
        return if x == y {
            Ok(None)
        } else {
            Err(err(format!("{x} != {y}")))
        };
    }

    match &pat {
        // `e1 + e2 = rhs`: if one side is ground, rewrite and recurse.
        NExp::Add(a, b) => {
            if let Some(av) = a.as_const() {
                return unify_nexp(env, oracle, goals, b, &actual.clone().sub(NExp::Int(av)));
            }
            if let Some(bv) = b.as_const() {
                return unify_nexp(env, oracle, goals, a, &actual.clone().sub(NExp::Int(bv)));
            }
            defer_to_oracle(env, oracle, &pat, &actual)
        }
        NExp::Sub(a, b) => {
            if let Some(bv) = b.as_const() {
                return unify_nexp(env, oracle, goals, a, &actual.clone().add(NExp::Int(bv)));
            }
            defer_to_oracle(env, oracle, &pat, &actual)
        }
        NExp::Mul(a, b) => {
            // `e1 * k = rhs`: if `e1` is a nonzero ground factor and
            // `rhs` is an exact multiple, bind `k = rhs / e1` (spec.md
            // §4.4's integer div/mod strategy).
            if let (Some(av), NExp::Var(kid)) = (a.as_const(), b.as_ref()) {
                if goals.contains(kid) && av != 0 {
                    if let Some(rv) = actual.as_const() {
                        if rv.rem_euclid(av) == 0 {
                            return Ok(Some((kid.clone(), NExp::Int(rv / av))));
                        }
                        return Err(err("no integer quotient satisfies multiplication equation"));
                    }
                }
            }
            if let (NExp::Var(kid), Some(bv)) = (a.as_ref(), b.as_const()) {
                if goals.contains(kid) && bv != 0 {
                    if let Some(rv) = actual.as_const() {
                        if rv.rem_euclid(bv) == 0 {
                            return Ok(Some((kid.clone(), NExp::Int(rv / bv))));
                        }
                        return Err(err("no integer quotient satisfies multiplication equation"));
                    }
                }
            }
            defer_to_oracle(env, oracle, &pat, &actual)
        }
        _ => defer_to_oracle(env, oracle, &pat, &actual),
    }
}

fn defer_to_oracle(
    env: &Environment,
    oracle: &mut dyn ConstraintOracle,
    pat: &NExp,
    actual: &NExp,
) -> Result<Option<(Id, NExp)>, UnifyError> {
    if oracle.prove(env, &NConstraint::Eq(pat.clone(), actual.clone())) {
        Ok(None)
    } else {
        Err(err(format!(
            "oracle could not prove {pat:?} = {actual:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StubOracle;

    #[test]
    fn binds_atom_goal_variable() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let result = unify(
            &env,
            &mut oracle,
            &Type::atom(NExp::var("n")),
            &Type::atom(NExp::int(32)),
        )
        .unwrap();
        assert_eq!(result.subst.nums.get(&Id::new("n")), Some(&NExp::Int(32)));
    }

    #[test]
    fn opens_existential_actual() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let exist = Type::Exist {
            kids: vec![(Id::new("m"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("m"))),
        };
        let result = unify(&env, &mut oracle, &Type::atom(NExp::var("n")), &exist).unwrap();
        assert_eq!(result.opened_existentials.len(), 1);
    }

    #[test]
    fn unify_nexp_rewrites_additive_equation() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let goals: FxHashSet<Id> = [Id::new("k")].into_iter().collect();
        let pat = NExp::var("k").add(NExp::int(1));
        let actual = NExp::int(5);
        let bound = unify_nexp(&env, &mut oracle, &goals, &pat, &actual)
            .unwrap()
            .unwrap();
        assert_eq!(bound, (Id::new("k"), NExp::Int(4)));
    }

    #[test]
    fn unify_nexp_divides_multiplicative_equation() {
        let env = Environment::new();
        let mut oracle = StubOracle;
        let goals: FxHashSet<Id> = [Id::new("k")].into_iter().collect();
        let pat = NExp::int(8).mul(NExp::var("k"));
        let actual = NExp::int(24);
        let bound = unify_nexp(&env, &mut oracle, &goals, &pat, &actual)
            .unwrap()
            .unwrap();
        assert_eq!(bound, (Id::new("k"), NExp::Int(3)));
    }
}

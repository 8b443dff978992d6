//! Function-application instantiation (spec.md §4.6 "Function-application
//! algorithm (`infer_funapp`)"), the 7-step procedure applied uniformly
//! to ordinary functions, union/enum constructors (once re-parsed to a
//! single-argument call), and the function identifier a mapping
//! application dispatches to.

use crate::coerce::coerce;
use crate::ctx::CheckCtx;
use crate::error::TypeError;
use rustc_hash::FxHashSet;
use sail_ast::subst::{free_vars_constraint, free_vars_nexp, free_vars_type, Subst};
use sail_ast::{Effect, Expr, Id, Kind, NConstraint, NExp, Type};
use sail_common::Span;
use sail_env::{BindingLocation, Environment, TypeVarEntry};

fn quant_local_id(freshen: &Subst, qid: &Id, kind: Kind) -> Id {
    match kind {
        Kind::Type => match freshen.types.get(qid) {
            Some(Type::Var(v)) => v.clone(),
            _ => qid.clone(),
        },
        Kind::Int => match freshen.nums.get(qid) {
            Some(NExp::Var(v)) => v.clone(),
            _ => qid.clone(),
        },
        Kind::Order | Kind::Effect => qid.clone(),
    }
}

fn is_bound(subst: &Subst, id: &Id) -> bool {
    subst.types.contains_key(id) || subst.nums.contains_key(id) || subst.orders.contains_key(id)
}

/// Whether `ty`, after `subst`, still mentions any quantifier that isn't
/// bound yet — such an argument's target is "deferred" (spec.md §4.6
/// step 3).
fn has_unresolved_goal(ty: &Type, quant: &[(Id, Kind)], subst: &Subst) -> bool {
    let fv = free_vars_type(ty);
    quant.iter().any(|(q, _)| {
        (fv.types.contains(q) || fv.nums.contains(q) || fv.orders.contains(q)) && !is_bound(subst, q)
    })
}

/// Rename an opened existential's binders with an `argN#` tag so two
/// arguments opening existentials in the same call never capture each
/// other's bindings (spec.md §4.6 step 4).
fn tag_opened(
    arg_index: usize,
    subst: sail_ast::subst::Subst,
    opened: Vec<(Id, Kind)>,
    opened_constraint: Option<NConstraint>,
) -> (sail_ast::subst::Subst, Vec<(Id, Kind)>, Option<NConstraint>) {
    let mut rename = Subst::default();
    let mut tagged = Vec::with_capacity(opened.len());
    for (id, kind) in opened {
        let fresh = Id::new(format!("arg{arg_index}#{}", id.as_str()));
        match kind {
            Kind::Type => rename = rename.bind_type(id.clone(), Type::Var(fresh.clone())),
            Kind::Int => rename = rename.bind_num(id.clone(), NExp::Var(fresh.clone())),
            Kind::Order => rename = rename.bind_order(id.clone(), sail_ast::Order::Var(fresh.clone())),
            Kind::Effect => {}
        }
        tagged.push((fresh, kind));
    }
    let renamed_subst = Subst {
        types: subst
            .types
            .into_iter()
            .map(|(k, v)| (k, rename.apply_type(&v)))
            .collect(),
        nums: subst
            .nums
            .into_iter()
            .map(|(k, v)| (k, rename.apply_nexp(&v)))
            .collect(),
        orders: subst.orders,
    };
    let renamed_constraint = opened_constraint.map(|nc| rename.apply_constraint(&nc));
    (renamed_subst, tagged, renamed_constraint)
}

pub fn infer_funapp(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    id: &Id,
    args: &[Expr],
    expected_ret: Option<&Type>,
) -> Result<(Environment, Type, Effect), TypeError> {
    let entry = env
        .lookup_val_spec(id)
        .cloned()
        .ok_or_else(|| TypeError::other(span, format!("unbound function `{id}`")))?;
    let scheme = entry.canonical;
    let (fargs0, ret0, declared_effect) = match &scheme.body {
        Type::Function { args, ret, effect } => (args.clone(), (**ret).clone(), *effect),
        other => {
            return Err(TypeError::other(
                span,
                format!("`{id}` is not applicable (has type `{other:?}`)"),
            ))
        }
    };
    if fargs0.len() != args.len() {
        return Err(TypeError::other(
            span,
            format!(
                "`{id}` expects {} argument(s), got {}",
                fargs0.len(),
                args.len()
            ),
        ));
    }

    let freshen = env.freshen_bind(&scheme);
    let mut scheme_env = env.clone();
    let mut quant: Vec<(Id, Kind)> = Vec::new();
    for (qid, kind) in &scheme.quant {
        let local = quant_local_id(&freshen, qid, *kind);
        scheme_env = scheme_env.add_type_var(
            local.clone(),
            TypeVarEntry {
                location: BindingLocation::Quantifier,
                kind: *kind,
            },
        );
        quant.push((local, *kind));
    }
    let mut subst = freshen;
    let mut constraints: Vec<NConstraint> = scheme
        .constraints
        .iter()
        .map(|nc| subst.apply_constraint(nc))
        .collect();

    // Step 1: seed unifiers from simple quantifier equations `kid = e`.
    let quant_nums: FxHashSet<Id> = quant
        .iter()
        .filter(|(_, k)| *k == Kind::Int)
        .map(|(q, _)| q.clone())
        .collect();
    for nc in &constraints {
        if let NConstraint::Eq(a, b) = nc {
            if let NExp::Var(k) = a {
                if quant_nums.contains(k) && !is_bound(&subst, k) && !free_vars_nexp(b).nums.contains(k) {
                    subst = subst.compose(Subst::default().bind_num(k.clone(), b.clone()));
                    continue;
                }
            }
            if let NExp::Var(k) = b {
                if quant_nums.contains(k) && !is_bound(&subst, k) && !free_vars_nexp(a).nums.contains(k) {
                    subst = subst.compose(Subst::default().bind_num(k.clone(), a.clone()));
                }
            }
        }
    }
    constraints = constraints.iter().map(|nc| subst.apply_constraint(nc)).collect();
    for nc in &constraints {
        scheme_env = scheme_env.add_constraint(nc.clone());
    }

    let mut fargs: Vec<Type> = fargs0.iter().map(|t| subst.apply_type(t)).collect();
    let mut ret = subst.apply_type(&ret0);

    // Step 2: instantiate from the return-type expectation, if any.
    if let Some(expected) = expected_ret {
        if !matches!(expected, Type::Exist { .. }) {
            if let Ok(u) = sail_solver::unify(&scheme_env, ctx.oracle, &ret, expected) {
                subst = subst.compose(u.subst);
                for (kid, kind) in u.opened_existentials {
                    scheme_env = scheme_env.add_type_var(
                        kid.clone(),
                        TypeVarEntry {
                            location: BindingLocation::ExistentialGoal,
                            kind,
                        },
                    );
                    quant.push((kid, kind));
                }
                if let Some(nc) = u.opened_constraint {
                    scheme_env = scheme_env.add_constraint(nc);
                }
                fargs = fargs.iter().map(|t| subst.apply_type(t)).collect();
                ret = subst.apply_type(&ret);
            }
        }
    }

    // Step 3/4: per-argument pass, resolved targets checked directly,
    // deferred targets inferred then coercingly unified.
    let mut call_env = scheme_env;
    let mut total_effect = declared_effect;
    let resolved_first = fargs
        .iter()
        .enumerate()
        .filter(|(_, t)| !has_unresolved_goal(t, &quant, &subst));
    let deferred_first = fargs
        .iter()
        .enumerate()
        .filter(|(_, t)| has_unresolved_goal(t, &quant, &subst))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    for (i, target) in resolved_first.collect::<Vec<_>>() {
        let target = subst.apply_type(target);
        call_env = crate::dispatch::check_exp(ctx, &call_env, &args[i], &target)?;
        if let Some(ann) = ctx.annotations.get(args[i].id) {
            total_effect |= ann.effect;
        }
    }

    for i in deferred_first {
        let target = subst.apply_type(&fargs[i]);
        let (after_infer, inferred_ty) = crate::dispatch::infer_exp(ctx, &call_env, &args[i])?;
        call_env = after_infer;
        if let Some(ann) = ctx.annotations.get(args[i].id) {
            total_effect |= ann.effect;
        }
        match sail_solver::unify(&call_env, ctx.oracle, &target, &inferred_ty) {
            Ok(u) => {
                let (renamed_subst, tagged, renamed_constraint) =
                    tag_opened(i, u.subst, u.opened_existentials, u.opened_constraint);
                subst = subst.compose(renamed_subst);
                for (kid, kind) in tagged {
                    call_env = call_env.add_type_var(
                        kid.clone(),
                        TypeVarEntry {
                            location: BindingLocation::ExistentialGoal,
                            kind,
                        },
                    );
                    quant.push((kid, kind));
                }
                if let Some(nc) = renamed_constraint {
                    call_env = call_env.add_constraint(nc);
                }
            }
            Err(_) => {
                let (coerced_env, _cast) = coerce(ctx, &call_env, args[i].span, &inferred_ty, &target)?;
                call_env = coerced_env;
            }
        }
        fargs = fargs.iter().map(|t| subst.apply_type(t)).collect();
        ret = subst.apply_type(&ret);
    }

    // Step 5: final resolution — every residual quantifier is either
    // proved (a constraint over already-bound variables) or must have
    // been unified away; an `Int`/`Type`/`Order` quantifier that is
    // still free and not part of the packed return existential is
    // `Unresolved_quants`.
    let ret_fv = free_vars_type(&ret);
    let mut unresolved = Vec::new();
    let mut residual: Vec<(Id, Kind)> = Vec::new();
    for (qid, kind) in &quant {
        if is_bound(&subst, qid) {
            continue;
        }
        let free_in_ret = match kind {
            Kind::Type => ret_fv.types.contains(qid),
            Kind::Int => ret_fv.nums.contains(qid),
            Kind::Order => ret_fv.orders.contains(qid),
            Kind::Effect => false,
        };
        if free_in_ret {
            residual.push((qid.clone(), *kind));
        } else {
            unresolved.push(qid.clone());
        }
    }
    if !unresolved.is_empty() {
        return Err(TypeError::UnresolvedQuants {
            span,
            id: id.clone(),
            quants: unresolved,
        });
    }
    for nc in call_env.constraints().to_vec() {
        // Constraints were registered before argument unification pinned
        // down the scheme's quantifiers, so a resolved quantifier's
        // constraint still mentions it by name until substituted here.
        let nc = subst.apply_constraint(&nc);
        let fv = free_vars_constraint(&nc);
        let mentions_residual = residual
            .iter()
            .any(|(q, _)| fv.types.contains(q) || fv.nums.contains(q) || fv.orders.contains(q));
        if !mentions_residual && !ctx.oracle.prove(&call_env, &nc) {
            return Err(TypeError::other(
                span,
                format!("could not discharge constraint `{nc:?}` at call to `{id}`"),
            ));
        }
    }

    // Step 6: pack surviving quantifiers into a return-type existential.
    let ret = if residual.is_empty() {
        ret
    } else {
        let constraint = call_env
            .constraints()
            .iter()
            .map(|nc| subst.apply_constraint(nc))
            .filter(|nc| {
                let fv = free_vars_constraint(nc);
                residual
                    .iter()
                    .any(|(q, _)| fv.types.contains(q) || fv.nums.contains(q) || fv.orders.contains(q))
            })
            .fold(NConstraint::True, NConstraint::and);
        Type::Exist {
            kids: residual,
            constraint: Box::new(constraint),
            body: Box::new(ret),
        }
    };

    let ret = ret.simplify();

    // Step 7: the call carries the callee's declared effect, unioned
    // with every argument's own effect (already recorded per-argument
    // above) so the enclosing expression's effect stays the union of
    // its children's (spec.md §8 property 4).
    Ok((call_env, ret, total_effect))
}

//! The bidirectional expression checker (spec.md §4.6): `check_exp`/
//! `infer_exp`, mutually recursive over every `ExprKind` variant.
//!
//! Every rule records its result in `ctx.annotations` before returning,
//! so that later rules (flow-typing witnesses, l-expression binding)
//! can read back what a subexpression was found to be.

use crate::annotation::Annotation;
use crate::coerce::coerce;
use crate::ctx::CheckCtx;
use crate::error::TypeError;
use crate::flow;
use crate::overload;
use crate::pat::bind_pat;
use sail_ast::subst::free_vars_type;
use sail_ast::{Effect, Expr, ExprKind, Id, Lit, MatchArm, NConstraint, NExp, Order, Type};
use sail_common::Span;
use sail_env::Environment;

/// The fixed type of each literal form (spec.md §4.6 "Literals"). Bin/hex
/// string literals are bitvectors whose length is the literal's bit
/// width under the environment's default order; `L_undef` has no fixed
/// type and is handled specially by `check_exp`/`infer_exp`.
pub fn lit_type(lit: &Lit, default_order: Order) -> Type {
    match lit {
        Lit::Unit => Type::unit(),
        Lit::True | Lit::False => Type::bool_(),
        Lit::Num(n) => Type::atom(sail_ast::NExp::int(*n)),
        Lit::Bin(bits) => Type::bitvector(sail_ast::NExp::int(bits.len() as i128), default_order),
        Lit::Hex(hex) => {
            Type::bitvector(sail_ast::NExp::int(hex.len() as i128 * 4), default_order)
        }
        Lit::Str(_) => Type::string(),
        Lit::Undef => Type::Unknown,
    }
}

fn is_monomorphic_type(ty: &Type) -> bool {
    free_vars_type(ty).is_empty()
}

fn record_infer(ctx: &mut CheckCtx, expr: &Expr, typ: Type, effect: Effect) -> Type {
    ctx.annotations.insert(
        expr.id,
        Annotation {
            typ: typ.clone(),
            effect,
            expected: None,
        },
    );
    typ
}

fn record_check(ctx: &mut CheckCtx, expr: &Expr, typ: Type, expected: Type, effect: Effect) {
    ctx.annotations.insert(
        expr.id,
        Annotation {
            typ,
            effect,
            expected: Some(expected),
        },
    );
}

fn effect_of(ctx: &CheckCtx, expr: &Expr) -> Effect {
    ctx.annotations.get(expr.id).map(|a| a.effect).unwrap_or_else(Effect::pure)
}

/// `check(env, e, T)`: returns the extended environment, or falls
/// through to `infer` plus an implicit coercion when no direct rule
/// applies (spec.md §4.6).
pub fn check_exp(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
    target: &Type,
) -> Result<Environment, TypeError> {
    let _scope = env.naming().enter_debug_scope();
    let depth = env.naming().debug_depth();
    let _span = tracing::debug_span!("check_exp", depth, node = ?expr.id, target = ?target).entered();
    sail_solver::with_stack_guard(|| check_exp_inner(ctx, env, expr, target))
}

fn check_exp_inner(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
    target: &Type,
) -> Result<Environment, TypeError> {
    let target = env.expand_type_synonyms(target);
    match &expr.kind {
        ExprKind::Lit(Lit::Undef) => {
            if is_monomorphic_type(&target) || env.policy().polymorphic_undefineds_allowed {
                record_check(ctx, expr, target.clone(), target.clone(), Effect::UNDEF);
                Ok(env.clone())
            } else {
                Err(TypeError::other(
                    expr.span,
                    "undefined value needs a monomorphic checking target",
                ))
            }
        }
        ExprKind::Block(stmts) => check_block(ctx, env, expr, stmts, &target),
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let env1 = check_exp(ctx, env, cond, &Type::bool_())?;
            let witness = flow::witness(ctx.annotations, cond);
            let then_env = match &witness {
                Some(nc) => env1.add_constraint(nc.clone()),
                None => env1.clone(),
            };
            let then_env = check_exp(ctx, &then_env, then_branch, &target)?;
            let mut effect = effect_of(ctx, cond) | effect_of(ctx, then_branch);
            if let Some(else_branch) = else_branch {
                let else_env = match &witness {
                    Some(nc) => env1.add_constraint(nc.not()),
                    None => env1.clone(),
                };
                let _ = check_exp(ctx, &else_env, else_branch, &target)?;
                effect |= effect_of(ctx, else_branch);
            }
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(env1)
        }
        ExprKind::Match { scrutinee, arms } => {
            let (env1, scrutinee_ty) = infer_exp(ctx, env, scrutinee)?;
            let mut effect = effect_of(ctx, scrutinee);
            for arm in arms {
                effect |= check_match_arm(ctx, &env1, &scrutinee_ty, arm, &target)?;
            }
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(env1)
        }
        ExprKind::Let { pat, bound, body } => {
            let (env1, bound_ty, bound_eff) = check_or_infer_let_bound(ctx, env, pat, bound)?;
            let env2 = bind_pat(ctx, &env1, pat, &bound_ty)?;
            let env3 = check_exp(ctx, &env2, body, &target)?;
            let effect = bound_eff | effect_of(ctx, body);
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(env3)
        }
        ExprKind::App { callee, args } => {
            let (env1, ret_ty, effect) =
                infer_application(ctx, env, expr.span, callee, args, Some(&target))?;
            let (extended, _cast) = coerce(ctx, &env1, expr.span, &ret_ty, &target)?;
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(extended)
        }
        ExprKind::Tuple(elems) => match &target {
            Type::Tuple(targets) if targets.len() == elems.len() => {
                let mut cur = env.clone();
                let mut effect = Effect::pure();
                for (e, t) in elems.iter().zip(targets) {
                    cur = check_exp(ctx, &cur, e, t)?;
                    effect |= effect_of(ctx, e);
                }
                record_check(ctx, expr, target.clone(), target.clone(), effect);
                Ok(cur)
            }
            _ => fallback_check(ctx, env, expr, &target),
        },
        ExprKind::RecordUpdate { base, fields } => {
            let (env1, record_ty) = infer_exp(ctx, env, base)?;
            let mut cur = env1;
            let mut effect = effect_of(ctx, base);
            for update in fields {
                let field_ty = crate::toplevel::instantiate_field(&cur, &record_ty, &update.field)
                    .map_err(|e| TypeError::other(update.value.span, e))?;
                cur = check_exp(ctx, &cur, &update.value, &field_ty)?;
                effect |= effect_of(ctx, &update.value);
            }
            let (extended, _cast) = coerce(ctx, &cur, expr.span, &record_ty, &target)?;
            record_check(ctx, expr, record_ty.clone(), target.clone(), effect);
            Ok(extended)
        }
        ExprKind::Vector(elems) => {
            let (len, elem_ty) = as_vector_target(&target).ok_or_else(|| {
                TypeError::other(expr.span, format!("`{target:?}` is not a vector type"))
            })?;
            let actual_len = sail_ast::NExp::int(elems.len() as i128);
            if !ctx.oracle.prove(env, &sail_ast::NConstraint::Eq(len.clone(), actual_len)) {
                return Err(TypeError::other(
                    expr.span,
                    format!("vector literal has {} element(s), target length is `{len:?}`", elems.len()),
                ));
            }
            let mut cur = env.clone();
            let mut effect = Effect::pure();
            for e in elems {
                cur = check_exp(ctx, &cur, e, &elem_ty)?;
                effect |= effect_of(ctx, e);
            }
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(cur)
        }
        ExprKind::Cast { expr: inner, typ } => {
            let declared = env.expand_type_synonyms(typ);
            let env1 = check_exp(ctx, env, inner, &declared)?;
            let (extended, _cast) = coerce(ctx, &env1, expr.span, &declared, &target)?;
            let effect = effect_of(ctx, inner);
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(extended)
        }
        ExprKind::Assign { lhs, rhs } => {
            let (env1, rhs_ty) = infer_exp(ctx, env, rhs)?;
            let (env2, lexp_effect) = crate::lexpr::bind_lexp(ctx, &env1, lhs, &rhs_ty)?;
            let effect = effect_of(ctx, rhs) | lexp_effect;
            let (extended, _) = coerce(ctx, &env2, expr.span, &Type::unit(), &target)?;
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(extended)
        }
        ExprKind::Assert { cond, message } => {
            let env1 = check_exp(ctx, env, cond, &Type::bool_())?;
            let mut effect = effect_of(ctx, cond);
            let env2 = if let Some(message) = message {
                let e = check_exp(ctx, &env1, message, &Type::string())?;
                effect |= effect_of(ctx, message);
                e
            } else {
                env1
            };
            let (extended, _) = coerce(ctx, &env2, expr.span, &Type::unit(), &target)?;
            record_check(ctx, expr, target.clone(), target.clone(), effect);
            Ok(extended)
        }
        _ => fallback_check(ctx, env, expr, &target),
    }
}

/// The generic check-mode fallback (spec.md §4.6: "When no rule applies
/// directly, the checker falls through to infer `e`, then inserts an
/// implicit coercion from the inferred type to `T`").
fn fallback_check(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
    target: &Type,
) -> Result<Environment, TypeError> {
    let (env1, inferred) = infer_exp(ctx, env, expr)?;
    let (extended, _cast) = coerce(ctx, &env1, expr.span, &inferred, target)?;
    let effect = effect_of(ctx, expr);
    record_check(ctx, expr, target.clone(), target.clone(), effect);
    Ok(extended)
}

/// The join of two branch types inferred in parallel contexts (`if`
/// without a checking target, spec.md §8 "`if c then 1 else 2` ... has
/// type `atom(1) ∨ atom(2)` internally, which after canonicalisation is
/// packed into `∃k, k∈{1,2}. atom(k)`"). Equal types join to themselves;
/// a strict subtype/supertype pair joins to the more general side;
/// mismatched atoms join into a fresh existential ranging over both
/// constants. Anything else must already stand in a subtype relation one
/// way or the other.
fn join_types(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    t1: &Type,
    t2: &Type,
) -> Result<Type, TypeError> {
    if sail_ast::subst::alpha_eq(t1, t2) {
        return Ok(t1.clone());
    }
    if let (Some(n1), Some(n2)) = (t1.as_atom(), t2.as_atom()) {
        let k = env.fresh_kid("k");
        return Ok(Type::Exist {
            kids: vec![(k.clone(), sail_ast::Kind::Int)],
            constraint: Box::new(NConstraint::In(
                k.clone(),
                vec![solved_const(ctx, env, n1), solved_const(ctx, env, n2)],
            )),
            body: Box::new(Type::atom(NExp::var(k))),
        });
    }
    if sail_solver::subtype(env, ctx.oracle, t1, t2).is_ok() {
        return Ok(t2.clone());
    }
    if sail_solver::subtype(env, ctx.oracle, t2, t1).is_ok() {
        return Ok(t1.clone());
    }
    Err(TypeError::Subtype {
        span,
        t1: t1.clone(),
        t2: t2.clone(),
        constraints: env.constraints().to_vec(),
    })
}

fn solved_const(ctx: &mut CheckCtx, env: &Environment, n: &NExp) -> i128 {
    n.simplify().as_const().or_else(|| ctx.oracle.solve(env, n)).unwrap_or(0)
}

/// `infer(env, e)`: returns the extended environment and `e`'s type.
pub fn infer_exp(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
) -> Result<(Environment, Type), TypeError> {
    let _scope = env.naming().enter_debug_scope();
    let depth = env.naming().debug_depth();
    let _span = tracing::debug_span!("infer_exp", depth, node = ?expr.id).entered();
    sail_solver::with_stack_guard(|| infer_exp_inner(ctx, env, expr))
}

fn infer_exp_inner(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
) -> Result<(Environment, Type), TypeError> {
    match &expr.kind {
        ExprKind::Lit(Lit::Undef) => Err(TypeError::other(
            expr.span,
            "undefined value is only inferable in a checking context",
        )),
        ExprKind::Lit(lit) => {
            let ty = lit_type(lit, env.policy().default_order);
            Ok((env.clone(), record_infer(ctx, expr, ty, Effect::pure())))
        }
        ExprKind::Id(id) => {
            if let Some(local) = env.lookup_local(id) {
                let ty = env.flow_refine(id, &local.typ);
                Ok((env.clone(), record_infer(ctx, expr, ty, Effect::pure())))
            } else if let Some(reg) = env.lookup_register(id) {
                let ty = reg.typ.clone();
                let eff = reg.read_effect;
                Ok((env.clone(), record_infer(ctx, expr, ty, eff)))
            } else if let Some(n) = env.lookup_numeric_constant(id) {
                let ty = Type::atom(n.clone());
                Ok((env.clone(), record_infer(ctx, expr, ty, Effect::pure())))
            } else if let Some(entry) = env.lookup_val_spec(id) {
                if entry.declared.is_monomorphic() {
                    let ty = entry.declared.body.clone();
                    Ok((env.clone(), record_infer(ctx, expr, ty, Effect::pure())))
                } else {
                    Err(TypeError::other(
                        expr.span,
                        format!("`{id}` is polymorphic and cannot be used as a bare value"),
                    ))
                }
            } else {
                Err(TypeError::NoNumIdent {
                    span: expr.span,
                    id: id.clone(),
                })
            }
        }
        ExprKind::Block(stmts) => infer_block(ctx, env, expr, stmts),
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let env1 = check_exp(ctx, env, cond, &Type::bool_())?;
            let witness = flow::witness(ctx.annotations, cond);
            let then_env = match &witness {
                Some(nc) => env1.add_constraint(nc.clone()),
                None => env1.clone(),
            };
            let (_, then_ty) = infer_exp(ctx, &then_env, then_branch)?;
            let mut effect = effect_of(ctx, cond) | effect_of(ctx, then_branch);
            let joined = if let Some(else_branch) = else_branch {
                let else_env = match &witness {
                    Some(nc) => env1.add_constraint(nc.not()),
                    None => env1.clone(),
                };
                let (_, else_ty) = infer_exp(ctx, &else_env, else_branch)?;
                effect |= effect_of(ctx, else_branch);
                join_types(ctx, &env1, expr.span, &then_ty, &else_ty)?
            } else {
                then_ty
            };
            Ok((env1, record_infer(ctx, expr, joined, effect)))
        }
        ExprKind::Match { scrutinee, arms } => {
            let (env1, scrutinee_ty) = infer_exp(ctx, env, scrutinee)?;
            let mut effect = effect_of(ctx, scrutinee);
            let mut arms_iter = arms.iter();
            let first = arms_iter
                .next()
                .ok_or_else(|| TypeError::other(expr.span, "match has no arms"))?;
            let (first_body_ty, eff) = infer_match_arm(ctx, &env1, &scrutinee_ty, first)?;
            effect |= eff;
            for arm in arms_iter {
                effect |= check_match_arm(ctx, &env1, &scrutinee_ty, arm, &first_body_ty)?;
            }
            Ok((env1, record_infer(ctx, expr, first_body_ty, effect)))
        }
        ExprKind::Let { pat, bound, body } => {
            let (env1, bound_ty, bound_eff) = check_or_infer_let_bound(ctx, env, pat, bound)?;
            let env2 = bind_pat(ctx, &env1, pat, &bound_ty)?;
            let (env3, body_ty) = infer_exp(ctx, &env2, body)?;
            let effect = bound_eff | effect_of(ctx, body);
            Ok((env3, record_infer(ctx, expr, body_ty, effect)))
        }
        ExprKind::App { callee, args } => {
            let (env1, ret_ty, effect) = infer_application(ctx, env, expr.span, callee, args, None)?;
            Ok((env1, record_infer(ctx, expr, ret_ty, effect)))
        }
        ExprKind::Tuple(elems) => {
            let mut cur = env.clone();
            let mut tys = Vec::with_capacity(elems.len());
            let mut effect = Effect::pure();
            for e in elems {
                let (next, ty) = infer_exp(ctx, &cur, e)?;
                cur = next;
                effect |= effect_of(ctx, e);
                tys.push(ty);
            }
            Ok((cur, record_infer(ctx, expr, Type::Tuple(tys), effect)))
        }
        ExprKind::RecordUpdate { base, fields } => {
            let (env1, record_ty) = infer_exp(ctx, env, base)?;
            let mut cur = env1;
            let mut effect = effect_of(ctx, base);
            for update in fields {
                let field_ty = crate::toplevel::instantiate_field(&cur, &record_ty, &update.field)
                    .map_err(|e| TypeError::other(update.value.span, e))?;
                cur = check_exp(ctx, &cur, &update.value, &field_ty)?;
                effect |= effect_of(ctx, &update.value);
            }
            Ok((cur, record_infer(ctx, expr, record_ty, effect)))
        }
        ExprKind::Vector(_) => Err(TypeError::other(
            expr.span,
            "vector literal needs a checking-mode target to fix its length",
        )),
        ExprKind::Cast { expr: inner, typ } => {
            let declared = env.expand_type_synonyms(typ);
            let env1 = check_exp(ctx, env, inner, &declared)?;
            let effect = effect_of(ctx, inner);
            Ok((env1, record_infer(ctx, expr, declared, effect)))
        }
        ExprKind::Assign { lhs, rhs } => {
            let (env1, rhs_ty) = infer_exp(ctx, env, rhs)?;
            let (env2, lexp_effect) = crate::lexpr::bind_lexp(ctx, &env1, lhs, &rhs_ty)?;
            let effect = effect_of(ctx, rhs) | lexp_effect;
            Ok((env2, record_infer(ctx, expr, Type::unit(), effect)))
        }
        ExprKind::Assert { cond, message } => {
            let env1 = check_exp(ctx, env, cond, &Type::bool_())?;
            let mut effect = effect_of(ctx, cond);
            let env2 = if let Some(message) = message {
                let e = check_exp(ctx, &env1, message, &Type::string())?;
                effect |= effect_of(ctx, message);
                e
            } else {
                env1
            };
            Ok((env2, record_infer(ctx, expr, Type::unit(), effect)))
        }
    }
}

fn check_match_arm(
    ctx: &mut CheckCtx,
    env: &Environment,
    scrutinee_ty: &Type,
    arm: &MatchArm,
    target: &Type,
) -> Result<Effect, TypeError> {
    let arm_env = bind_pat(ctx, env, &arm.pat, scrutinee_ty)?;
    let arm_env = if let Some(guard) = &arm.guard {
        check_exp(ctx, &arm_env, guard, &Type::bool_())?
    } else {
        arm_env
    };
    check_exp(ctx, &arm_env, &arm.body, target)?;
    let mut effect = effect_of(ctx, &arm.body);
    if let Some(guard) = &arm.guard {
        effect |= effect_of(ctx, guard);
    }
    Ok(effect)
}

fn infer_match_arm(
    ctx: &mut CheckCtx,
    env: &Environment,
    scrutinee_ty: &Type,
    arm: &MatchArm,
) -> Result<(Type, Effect), TypeError> {
    let arm_env = bind_pat(ctx, env, &arm.pat, scrutinee_ty)?;
    let arm_env = if let Some(guard) = &arm.guard {
        check_exp(ctx, &arm_env, guard, &Type::bool_())?
    } else {
        arm_env
    };
    let (_, body_ty) = infer_exp(ctx, &arm_env, &arm.body)?;
    let mut effect = effect_of(ctx, &arm.body);
    if let Some(guard) = &arm.guard {
        effect |= effect_of(ctx, guard);
    }
    Ok((body_ty, effect))
}

/// `Let`'s bound expression is checked at the pattern's type ascription
/// if it carries one, else inferred (spec.md §4.6 "Let").
fn check_or_infer_let_bound(
    ctx: &mut CheckCtx,
    env: &Environment,
    pat: &sail_ast::Pat,
    bound: &Expr,
) -> Result<(Environment, Type, Effect), TypeError> {
    if let sail_ast::PatKind::Typ(_, declared) = &pat.kind {
        let declared = env.expand_type_synonyms(declared);
        let env1 = check_exp(ctx, env, bound, &declared)?;
        Ok((env1, declared, effect_of(ctx, bound)))
    } else {
        let (env1, ty) = infer_exp(ctx, env, bound)?;
        Ok((env1, ty, effect_of(ctx, bound)))
    }
}

/// Function/constructor/mapping application dispatch (spec.md §4.6
/// "Mapping application"): if `callee` names a mapping, try the
/// synthesized forwards function first, then backwards; otherwise treat
/// it as an ordinary (possibly overloaded) function/constructor name.
fn infer_application(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    callee: &sail_ast::Id,
    args: &[Expr],
    expected_ret: Option<&Type>,
) -> Result<(Environment, Type, Effect), TypeError> {
    if env.lookup_mapping(callee).is_some() {
        let forwards = sail_env::mappings::id_forwards(callee);
        let backwards = sail_env::mappings::id_backwards(callee);
        match crate::funapp::infer_funapp(ctx, env, span, &forwards, args, expected_ret) {
            Ok(result) => Ok(result),
            Err(forward_err) => {
                crate::funapp::infer_funapp(ctx, env, span, &backwards, args, expected_ret)
                    .map_err(|backward_err| TypeError::NoOverloading {
                        span,
                        id: callee.clone(),
                        alts: vec![
                            (forwards, forward_err),
                            (backwards, backward_err),
                        ],
                    })
            }
        }
    } else {
        overload::resolve(env, callee, span, |candidate| {
            crate::funapp::infer_funapp(ctx, env, span, candidate, args, expected_ret)
        })
    }
}

fn as_vector_target(ty: &Type) -> Option<(sail_ast::NExp, Type)> {
    match ty {
        Type::App(id, targs) if id.as_str() == "vector" && targs.len() == 3 => {
            match (&targs[0], &targs[2]) {
                (sail_ast::TypeArg::Num(len), sail_ast::TypeArg::Type(elem)) => {
                    Some((len.clone(), (**elem).clone()))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn infer_block(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
    stmts: &[Expr],
) -> Result<(Environment, Type), TypeError> {
    let Some((last, init)) = stmts.split_last() else {
        return Ok((env.clone(), record_infer(ctx, expr, Type::unit(), Effect::pure())));
    };
    let mut cur = env.clone();
    let mut effect = Effect::pure();
    for stmt in init {
        cur = check_exp(ctx, &cur, stmt, &Type::unit())?;
        effect |= effect_of(ctx, stmt);
        cur = apply_assert_witness(ctx, cur, stmt);
    }
    let (final_env, ty) = infer_exp(ctx, &cur, last)?;
    effect |= effect_of(ctx, last);
    Ok((final_env, record_infer(ctx, expr, ty, effect)))
}

fn check_block(
    ctx: &mut CheckCtx,
    env: &Environment,
    expr: &Expr,
    stmts: &[Expr],
    target: &Type,
) -> Result<Environment, TypeError> {
    let Some((last, init)) = stmts.split_last() else {
        let (extended, _) = coerce(ctx, env, expr.span, &Type::unit(), target)?;
        record_check(ctx, expr, target.clone(), target.clone(), Effect::pure());
        return Ok(extended);
    };
    let mut cur = env.clone();
    let mut effect = Effect::pure();
    for stmt in init {
        cur = check_exp(ctx, &cur, stmt, &Type::unit())?;
        effect |= effect_of(ctx, stmt);
        cur = apply_assert_witness(ctx, cur, stmt);
    }
    let final_env = check_exp(ctx, &cur, last, target)?;
    effect |= effect_of(ctx, last);
    record_check(ctx, expr, target.clone(), target.clone(), effect);
    Ok(final_env)
}

/// An `assert` whose condition is a pure constraint expression adds that
/// proposition to the environment for the remainder of the block
/// (spec.md §4.6 "Blocks").
fn apply_assert_witness(ctx: &CheckCtx, env: Environment, stmt: &Expr) -> Environment {
    if let ExprKind::Assert { cond, .. } = &stmt.kind {
        if effect_of(ctx, stmt).is_empty() {
            if let Some(nc) = flow::witness(ctx.annotations, cond) {
                return env.add_constraint(nc);
            }
        }
    }
    env
}

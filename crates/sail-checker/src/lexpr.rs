//! L-expression binding (spec.md §4.6 "Assignment (l-expression)", §6
//! "bind_lexp").
//!
//! `bind_lexp(ctx, env, lexp, target)` binds `lexp` to `target` (the
//! already-inferred type of the bound expression) and returns the
//! resulting environment together with the write's effect. Vector index/
//! range writes also emit a bounds obligation, dispatched to the oracle
//! unless `ctx.options.no_lexp_bounds_check` is set (spec.md §6
//! configuration table).

use crate::ctx::CheckCtx;
use crate::error::{require_subtype, TypeError};
use sail_ast::{Effect, LExpr, LExprKind, NExp, Order, Type, TypeArg};
use sail_common::Span;
use sail_env::{Environment, LocalEntry, Mutability};

/// `vector('n, order, elem_type)`, the one constructor shape not given a
/// dedicated accessor in `sail_ast::Type` because only l-expression/
/// vector-literal checking ever needs to take it apart.
fn as_vector(ty: &Type) -> Option<(&NExp, Order, &Type)> {
    match ty {
        Type::App(id, args) if id.as_str() == "vector" && args.len() == 3 => {
            match (&args[0], &args[1], &args[2]) {
                (TypeArg::Num(len), TypeArg::Ord(order), TypeArg::Type(elem)) => {
                    Some((len, *order, elem))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// The type an already-bound l-expression currently has, without
/// rebinding it — needed to know what a nested index/field write is
/// indexing/projecting into.
fn current_type(env: &Environment, lexp: &LExpr) -> Result<Type, TypeError> {
    match &lexp.kind {
        LExprKind::Id(id) => {
            if let Some(reg) = env.lookup_register(id) {
                Ok(reg.typ.clone())
            } else if let Some(local) = env.lookup_local(id) {
                Ok(local.typ.clone())
            } else {
                Err(TypeError::other(
                    lexp.span,
                    format!("`{id}` is not bound, cannot index/project into it"),
                ))
            }
        }
        LExprKind::Cast(_, declared) => Ok(env.expand_type_synonyms(declared)),
        LExprKind::Field(inner, field) => {
            let owner_ty = current_type(env, inner)?;
            let owner_id = match &owner_ty {
                Type::Id(id) => id.clone(),
                other => {
                    return Err(TypeError::other(
                        lexp.span,
                        format!("`{other:?}` has no fields"),
                    ))
                }
            };
            env.lookup_field(&owner_id, field)
                .map(|f| f.typ.clone())
                .ok_or_else(|| {
                    TypeError::other(lexp.span, format!("no field `{field}` on `{owner_id}`"))
                })
        }
        LExprKind::VectorIndex(base, _) | LExprKind::VectorRange(base, _, _) => {
            let base_ty = current_type(env, base)?;
            as_vector(&base_ty)
                .map(|(_, _, elem)| elem.clone())
                .ok_or_else(|| {
                    TypeError::other(lexp.span, format!("`{base_ty:?}` is not a vector"))
                })
        }
        LExprKind::Tuple(_) | LExprKind::Deref(_) | LExprKind::MemoryWrite { .. } => {
            Err(TypeError::other(
                lexp.span,
                "this l-expression form has no standalone current type",
            ))
        }
    }
}

/// A bounds obligation `0 <= i < len` (or, for a range, `0 <= lo <= hi <
/// len`), dispatched to the oracle unless disabled.
fn check_bounds(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    nexp: &NExp,
    len: &NExp,
) -> Result<(), TypeError> {
    if ctx.options.no_lexp_bounds_check {
        return Ok(());
    }
    let lower_ok = ctx.oracle.prove(env, &sail_ast::NConstraint::Ge(nexp.clone(), NExp::int(0)));
    let upper_ok = ctx.oracle.prove(
        env,
        &sail_ast::NConstraint::Le(nexp.clone(), NExp::sub(len.clone(), NExp::int(1))),
    );
    if lower_ok && upper_ok {
        Ok(())
    } else {
        Err(TypeError::other(
            span,
            format!("index `{nexp:?}` is not provably within bounds of length `{len:?}`"),
        ))
    }
}

pub fn bind_lexp(
    ctx: &mut CheckCtx,
    env: &Environment,
    lexp: &LExpr,
    target: &Type,
) -> Result<(Environment, Effect), TypeError> {
    let target = env.expand_type_synonyms(target);
    match &lexp.kind {
        LExprKind::Id(id) => {
            if let Some(reg) = env.lookup_register(id) {
                let reg_ty = reg.typ.clone();
                let write_effect = reg.write_effect;
                let extended = require_subtype(lexp.span, env, ctx.oracle, &target, &reg_ty)?;
                Ok((extended, write_effect))
            } else if let Some(local) = env.lookup_local(id) {
                if local.mutability != Mutability::Mutable {
                    return Err(TypeError::other(
                        lexp.span,
                        format!("`{id}` is not a mutable local"),
                    ));
                }
                let local_ty = local.typ.clone();
                let extended = require_subtype(lexp.span, env, ctx.oracle, &target, &local_ty)?;
                Ok((extended.clear_flow_refinement(id), Effect::pure()))
            } else {
                let extended = env.add_local(
                    id.clone(),
                    LocalEntry {
                        mutability: Mutability::Mutable,
                        typ: target,
                    },
                );
                Ok((extended, Effect::pure()))
            }
        }
        LExprKind::Cast(inner, declared) => {
            let declared = env.expand_type_synonyms(declared);
            let extended = require_subtype(lexp.span, env, ctx.oracle, &target, &declared)?;
            bind_lexp(ctx, &extended, inner, &declared)
        }
        LExprKind::Tuple(elems) => match &target {
            Type::Tuple(targets) if targets.len() == elems.len() => {
                let mut cur = env.clone();
                let mut effect = Effect::pure();
                for (l, t) in elems.iter().zip(targets) {
                    let (next, eff) = bind_lexp(ctx, &cur, l, t)?;
                    cur = next;
                    effect |= eff;
                }
                Ok((cur, effect))
            }
            other => Err(TypeError::other(
                lexp.span,
                format!("expected a {}-tuple l-expression target, got `{other:?}`", elems.len()),
            )),
        },
        LExprKind::VectorIndex(base, index_expr) => {
            let base_ty = current_type(env, base)?;
            let (len, order, elem) = as_vector(&base_ty).ok_or_else(|| {
                TypeError::other(lexp.span, format!("`{base_ty:?}` is not a vector"))
            })?;
            let len = len.clone();
            let elem = elem.clone();
            let (env_after_idx, idx_ty) = crate::dispatch::infer_exp(ctx, env, index_expr)?;
            let idx_nexp = idx_ty.as_atom().cloned().ok_or_else(|| {
                TypeError::other(index_expr.span, "vector index must have an atom('n) type")
            })?;
            check_bounds(ctx, &env_after_idx, lexp.span, &idx_nexp, &len)?;
            let extended = require_subtype(lexp.span, &env_after_idx, ctx.oracle, &target, &elem)?;
            let _ = order;
            bind_lexp(ctx, &extended, base, &base_ty)
        }
        LExprKind::VectorRange(base, lo_expr, hi_expr) => {
            let base_ty = current_type(env, base)?;
            let (len, _order, elem) = as_vector(&base_ty).ok_or_else(|| {
                TypeError::other(lexp.span, format!("`{base_ty:?}` is not a vector"))
            })?;
            let len = len.clone();
            let elem = elem.clone();
            let (env1, lo_ty) = crate::dispatch::infer_exp(ctx, env, lo_expr)?;
            let (env2, hi_ty) = crate::dispatch::infer_exp(ctx, &env1, hi_expr)?;
            let lo_nexp = lo_ty
                .as_atom()
                .cloned()
                .ok_or_else(|| TypeError::other(lo_expr.span, "range bound must be atom('n)"))?;
            let hi_nexp = hi_ty
                .as_atom()
                .cloned()
                .ok_or_else(|| TypeError::other(hi_expr.span, "range bound must be atom('n)"))?;
            check_bounds(ctx, &env2, lexp.span, &lo_nexp, &len)?;
            check_bounds(ctx, &env2, lexp.span, &hi_nexp, &len)?;
            let width = NExp::add(NExp::sub(hi_nexp, lo_nexp), NExp::int(1));
            let slice_ty = Type::bitvector(width, sail_ast::Order::Inc);
            let _ = elem;
            let extended = require_subtype(lexp.span, &env2, ctx.oracle, &target, &slice_ty)?;
            bind_lexp(ctx, &extended, base, &base_ty)
        }
        LExprKind::Field(inner, field) => {
            let owner_ty = current_type(env, inner)?;
            let owner_id = match &owner_ty {
                Type::Id(id) => id.clone(),
                other => {
                    return Err(TypeError::other(
                        lexp.span,
                        format!("`{other:?}` has no fields"),
                    ))
                }
            };
            let field_entry = env
                .lookup_field(&owner_id, field)
                .cloned()
                .ok_or_else(|| {
                    TypeError::other(lexp.span, format!("no field `{field}` on `{owner_id}`"))
                })?;
            let extended =
                require_subtype(lexp.span, env, ctx.oracle, &target, &field_entry.typ)?;
            bind_lexp(ctx, &extended, inner, &owner_ty)
        }
        LExprKind::Deref(reg_expr) => {
            let (extended, reg_ref_ty) = crate::dispatch::infer_exp(ctx, env, reg_expr)?;
            let pointee = match &reg_ref_ty {
                Type::App(id, args) if id.as_str() == "register" && args.len() == 1 => {
                    match &args[0] {
                        TypeArg::Type(t) => (**t).clone(),
                        _ => reg_ref_ty.clone(),
                    }
                }
                other => other.clone(),
            };
            let extended = require_subtype(lexp.span, &extended, ctx.oracle, &target, &pointee)?;
            Ok((extended, Effect::WREG))
        }
        LExprKind::MemoryWrite { address, value } => {
            let (env1, _addr_ty) = crate::dispatch::infer_exp(ctx, env, address)?;
            let (env2, value_ty) = crate::dispatch::infer_exp(ctx, &env1, value)?;
            let extended = require_subtype(lexp.span, &env2, ctx.oracle, &target, &value_ty)?;
            Ok((extended, Effect::WMEM))
        }
    }
}

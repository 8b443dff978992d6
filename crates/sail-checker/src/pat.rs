//! Pattern binding (spec.md §4.6 "Matches"/"Let", §6 "bind_pat").
//!
//! `bind_pat(ctx, env, pat, target)` extends `env` with whatever locals
//! `pat` binds against `target`, or fails. Union/enum constructor
//! applications are resolved the same way an ordinary function call is
//! (through the value-spec registered for the case, see
//! `toplevel::register_type_def`), so this module needs nothing beyond
//! `Environment::lookup_val_spec`/`freshen_bind`.

use crate::ctx::CheckCtx;
use crate::error::{require_subtype, TypeError};
use rustc_hash::FxHashSet;
use sail_ast::{Pat, PatKind, Type};
use sail_common::Span;
use sail_env::{BindingLocation, Environment, LocalEntry, Mutability, TypeVarEntry};

/// Rejects a pattern that binds the same identifier twice (spec.md §6,
/// "l-expression/pattern binding must reject duplicate binders within
/// one pattern").
pub fn check_no_duplicate_binders(pat: &Pat, span: Span) -> Result<(), TypeError> {
    let ids = pat.bound_ids();
    let mut seen = FxHashSet::default();
    for id in &ids {
        if !seen.insert(id.clone()) {
            return Err(TypeError::other(
                span,
                format!("pattern binds `{id}` more than once"),
            ));
        }
    }
    Ok(())
}

pub fn bind_pat(
    ctx: &mut CheckCtx,
    env: &Environment,
    pat: &Pat,
    target: &Type,
) -> Result<Environment, TypeError> {
    check_no_duplicate_binders(pat, pat.span)?;
    bind_pat_inner(ctx, env, pat, target)
}

fn bind_pat_inner(
    ctx: &mut CheckCtx,
    env: &Environment,
    pat: &Pat,
    target: &Type,
) -> Result<Environment, TypeError> {
    let target = env.expand_type_synonyms(target);

    // An existential target is opened before matching against it: its
    // kids become fresh type variables (and its constraint an ambient
    // fact) in the pattern environment, the same way a constructor's own
    // quantifiers are registered directly in `bind_constructor_pat`
    // below rather than left as an unresolved witness.
    if let Type::Exist { kids, constraint, body } = &target {
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
        return bind_pat_inner(ctx, &opened, pat, body);
    }

    match &pat.kind {
        PatKind::Wild => Ok(env.clone()),
        PatKind::Id(id) => {
            // A nullary constructor/enum member reference: resolved
            // against the environment, no binding introduced.
            if let Some(entry) = env.lookup_val_spec(id) {
                if entry.declared.is_monomorphic() {
                    if let Ok(extended) =
                        require_subtype(pat.span, env, ctx.oracle, &entry.declared.body, &target)
                    {
                        return Ok(extended);
                    }
                }
            }
            Ok(env.add_local(
                id.clone(),
                LocalEntry {
                    mutability: Mutability::Immutable,
                    typ: target,
                },
            ))
        }
        PatKind::Lit(lit) => {
            let lit_ty = crate::dispatch::lit_type(lit, env.policy().default_order);
            require_subtype(pat.span, env, ctx.oracle, &lit_ty, &target)
        }
        PatKind::Tuple(elems) => match &target {
            Type::Tuple(targets) if targets.len() == elems.len() => {
                let mut cur = env.clone();
                for (p, t) in elems.iter().zip(targets) {
                    cur = bind_pat_inner(ctx, &cur, p, t)?;
                }
                Ok(cur)
            }
            other => Err(TypeError::other(
                pat.span,
                format!("expected a {}-tuple pattern target, got `{other:?}`", elems.len()),
            )),
        },
        PatKind::App(ctor, args) => bind_constructor_pat(ctx, env, pat.span, ctor, args, &target),
        PatKind::As(inner, id) => {
            let extended = bind_pat_inner(ctx, env, inner, &target)?;
            Ok(extended.add_local(
                id.clone(),
                LocalEntry {
                    mutability: Mutability::Immutable,
                    typ: target,
                },
            ))
        }
        PatKind::Typ(inner, declared) => {
            let declared = env.expand_type_synonyms(declared);
            require_subtype(pat.span, env, ctx.oracle, &declared, &target)?;
            bind_pat_inner(ctx, env, inner, &declared)
        }
    }
}

/// A union/enum case application: `ctor` must name a value spec
/// `case_arg -> union_type` (enum members and nullary cases are
/// registered with `case_arg = unit`), synthesised when the owning type
/// definition was processed (spec.md §4.7).
fn bind_constructor_pat(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    ctor: &sail_ast::Id,
    args: &[Pat],
    target: &Type,
) -> Result<Environment, TypeError> {
    let entry = env.lookup_val_spec(ctor).cloned().ok_or_else(|| {
        TypeError::other(span, format!("unbound union/enum constructor `{ctor}`"))
    })?;
    let subst = env.freshen_bind(&entry.canonical);
    let mut scheme_env = env.clone();
    for (id, kind) in &entry.canonical.quant {
        let renamed = subst
            .types
            .get(id)
            .cloned()
            .map(|t| if let Type::Var(v) = t { v } else { id.clone() })
            .unwrap_or_else(|| id.clone());
        scheme_env = scheme_env.add_type_var(
            renamed,
            TypeVarEntry {
                location: BindingLocation::Quantifier,
                kind: *kind,
            },
        );
    }
    for nc in &entry.canonical.constraints {
        scheme_env = scheme_env.add_constraint(subst.apply_constraint(nc));
    }
    let body = subst.apply_type(&entry.canonical.body);
    let (arg_ty, ret_ty) = match &body {
        Type::Function { args: fargs, ret, .. } if fargs.len() <= 1 => {
            (fargs.first().cloned().unwrap_or_else(Type::unit), (**ret).clone())
        }
        other => (Type::unit(), other.clone()),
    };
    let extended = require_subtype(span, &scheme_env, ctx.oracle, &ret_ty, target)?;
    match args.len() {
        0 => Ok(extended),
        1 => bind_pat_inner(ctx, &extended, &args[0], &arg_ty),
        _ => unreachable!(
            "constructor patterns applied to more than one argument are re-parsed as a single tuple"
        ),
    }
}

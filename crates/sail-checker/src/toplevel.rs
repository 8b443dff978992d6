//! Top-level definition checker (spec.md §4.7).
//!
//! `check_program` processes a definition stream in source order,
//! folding each `Def` into an `Environment`. A definition that fails is
//! reported but does not poison the stream: the environment is left as
//! it was before that definition (spec.md §4.7 "Failure semantics"),
//! and checking continues with the next one.

use crate::ctx::CheckCtx;
use crate::error::{at, TypeError};
use crate::pat::bind_pat;
use sail_ast::subst::free_vars_type;
use sail_ast::{
    Def, Effect, FunClause, Id, Kind, MappingClause, Pat, PatKind, Type, TypeArg, TypeDefKind,
    TypeScheme,
};
use sail_common::Span;
use sail_env::{
    BindingLocation, Environment, MappingEntry, PolicyFlags, RegisterEntry, TypeVarEntry,
    ValSpecEntry,
};

/// The result of checking one definition stream: the final environment
/// plus every definition-level failure encountered along the way, each
/// tagged with its source location (spec.md §4.7 "Failure semantics").
pub struct CheckedProgram {
    pub env: Environment,
    pub errors: Vec<TypeError>,
}

pub fn check_program(ctx: &mut CheckCtx, env: Environment, defs: &[Def]) -> CheckedProgram {
    let mut env = env;
    let mut errors = Vec::new();
    for def in defs {
        match check_def(ctx, &env, def) {
            Ok(next) => env = next,
            Err(e) => {
                tracing::debug!(span = ?def.span(), error = %e, "definition failed, environment unchanged");
                errors.push(e);
            }
        }
    }
    CheckedProgram { env, errors }
}

pub fn check_def(ctx: &mut CheckCtx, env: &Environment, def: &Def) -> Result<Environment, TypeError> {
    match def {
        Def::Kind { span, name, def, .. } => check_type_def(ctx, env, *span, name, def),
        Def::ValSpec { span, name, scheme, .. } => check_val_spec(ctx, env, *span, name, scheme),
        Def::Fun { span, name, clauses, .. } => check_fun_def(ctx, env, *span, name, clauses),
        Def::Mapping { span, name, typ, clauses, .. } => {
            check_mapping_def(ctx, env, *span, name, typ.as_ref(), clauses)
        }
        Def::Let { span, pat, bound, .. } => check_top_let(ctx, env, *span, pat, bound),
        Def::DefaultOrder { span, order, .. } => check_default_order(env, *span, *order),
        Def::Overload { name, members, .. } => {
            let mut combined = env.lookup_overload(name).map(|s| s.to_vec()).unwrap_or_default();
            combined.extend(members.iter().cloned());
            Ok(env.add_overload(name.clone(), combined))
        }
        Def::Register { span, name, typ, effect, .. } => {
            check_register(ctx, env, *span, name, typ, *effect)
        }
    }
}

// ---- Kind/type/record/variant/enum/bitfield -------------------------------

/// Registers a type definition and, for unions/enums, the constructor/
/// member value specs that `pat::bind_constructor_pat` and the `Id`
/// fallback in `pat::bind_pat` expect to find (spec.md §4.7, pat.rs's own
/// doc comment). Bitfield-to-record-plus-accessor expansion is performed
/// by an external macro (spec.md §1, "explicitly out of scope"); the
/// bitfield definition itself is still registered so its width/ranges
/// are available to whatever consumes the expansion downstream.
fn check_type_def(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    name: &Id,
    def: &TypeDefKind,
) -> Result<Environment, TypeError> {
    if env.lookup_type_def(name).is_some() {
        return Err(TypeError::other(span, format!("type `{name}` is already defined")));
    }
    // Well-formedness of a generic def's fields/cases/body is checked
    // against an environment that already knows about its own
    // quantifier, so a field referencing the type's own `'n`/`'a` isn't
    // mistaken for an unbound variable.
    let quant_env = |quant: &[(Id, Kind)]| {
        let mut e = env.clone();
        for (qid, kind) in quant {
            e = e.add_type_var(
                qid.clone(),
                TypeVarEntry {
                    location: BindingLocation::Quantifier,
                    kind: *kind,
                },
            );
        }
        e
    };
    match def {
        TypeDefKind::Record { quant, fields } => {
            let qe = quant_env(quant);
            for f in fields {
                at(span, sail_env::wf::wf_type(&qe, &f.typ, &mut |e, nc| ctx.oracle.prove(e, nc)))?;
            }
        }
        TypeDefKind::Union { quant, cases } => {
            let qe = quant_env(quant);
            for c in cases {
                at(span, sail_env::wf::wf_type(&qe, &c.typ, &mut |e, nc| ctx.oracle.prove(e, nc)))?;
            }
        }
        TypeDefKind::Bitfield { .. } | TypeDefKind::Enum { .. } => {}
        TypeDefKind::Abbrev { quant, body } => {
            let qe = quant_env(quant);
            at(span, sail_env::wf::wf_type(&qe, body, &mut |e, nc| ctx.oracle.prove(e, nc)))?;
        }
        TypeDefKind::ConstraintSynonym { quant, body } => {
            if !ctx.options.constraint_synonyms {
                return Err(TypeError::other(
                    span,
                    "constraint synonyms are disabled (`constraint_synonyms` is off)",
                ));
            }
            let qe = quant_env(quant);
            at(span, sail_env::wf::wf_constraint(&qe, body))?;
        }
    }

    let mut env = env.add_type_def(name.clone(), def.clone());
    match def {
        TypeDefKind::Enum { members } => {
            for member in members {
                env = env.add_val_spec(
                    member.clone(),
                    ValSpecEntry {
                        declared: TypeScheme::monomorphic(Type::Id(name.clone())),
                        canonical: TypeScheme::monomorphic(Type::Id(name.clone())),
                    },
                );
            }
        }
        TypeDefKind::Union { quant, cases } => {
            let ret_ty = if quant.is_empty() {
                Type::Id(name.clone())
            } else {
                Type::App(name.clone(), quant.iter().map(|(id, kind)| quant_arg(id, *kind)).collect())
            };
            for case in cases {
                let scheme = TypeScheme {
                    quant: quant.clone(),
                    constraints: Vec::new(),
                    body: Type::Function {
                        args: vec![case.typ.clone()],
                        ret: Box::new(ret_ty.clone()),
                        effect: Effect::pure(),
                    },
                };
                env = env.add_val_spec(
                    case.name.clone(),
                    ValSpecEntry {
                        declared: scheme.clone(),
                        canonical: scheme,
                    },
                );
            }
        }
        TypeDefKind::Abbrev { quant, body } => {
            env = env.add_type_synonym(
                name.clone(),
                sail_env::TypeSynonym {
                    quant: quant.clone(),
                    body: body.clone(),
                },
            );
        }
        TypeDefKind::ConstraintSynonym { quant, body } => {
            env = env.add_constraint_synonym(
                name.clone(),
                sail_env::ConstraintSynonym {
                    quant: quant.clone(),
                    body: body.clone(),
                },
            );
        }
        TypeDefKind::Record { .. } | TypeDefKind::Bitfield { .. } => {}
    }
    Ok(env)
}

fn quant_arg(id: &Id, kind: Kind) -> TypeArg {
    match kind {
        Kind::Type => TypeArg::Type(Box::new(Type::Var(id.clone()))),
        Kind::Int => TypeArg::Num(sail_ast::NExp::Var(id.clone())),
        Kind::Order => TypeArg::Ord(sail_ast::Order::Var(id.clone())),
        Kind::Effect => TypeArg::Type(Box::new(Type::Unknown)),
    }
}

/// The type of `field` on `record_ty`, with the owning record's own
/// quantifier instantiated to `record_ty`'s actual type arguments
/// (spec.md §4.6 "Record update"). Returns a plain `String` error since
/// callers in `dispatch.rs` attach their own span.
pub fn instantiate_field(env: &Environment, record_ty: &Type, field: &Id) -> Result<Type, String> {
    let expanded = env.expand_type_synonyms(record_ty);
    let (owner, args): (Id, Vec<TypeArg>) = match expanded {
        Type::Id(id) => (id, Vec::new()),
        Type::App(id, args) => (id, args),
        other => return Err(format!("`{other:?}` is not a record type")),
    };
    let entry = env
        .lookup_field(&owner, field)
        .cloned()
        .ok_or_else(|| format!("no field `{field}` on `{owner}`"))?;
    let quant = match env.lookup_type_def(&owner) {
        Some(TypeDefKind::Record { quant, .. }) => quant.clone(),
        _ => return Err(format!("`{owner}` is not a record type")),
    };
    let mut subst = sail_ast::subst::Subst::default();
    for ((qid, kind), arg) in quant.iter().zip(&args) {
        match (kind, arg) {
            (Kind::Type, TypeArg::Type(t)) => subst = subst.bind_type(qid.clone(), (**t).clone()),
            (Kind::Int, TypeArg::Num(n)) => subst = subst.bind_num(qid.clone(), n.clone()),
            (Kind::Order, TypeArg::Ord(o)) => subst = subst.bind_order(qid.clone(), o.clone()),
            _ => {}
        }
    }
    Ok(subst.apply_type(&entry.typ))
}

// ---- Value specification ---------------------------------------------------

fn check_val_spec(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    name: &Id,
    scheme: &TypeScheme,
) -> Result<Environment, TypeError> {
    let canonical = canonicalize_scheme(env, span, scheme, ctx.options.expand_valspec)?;
    let mut wf_env = env.clone();
    for (qid, kind) in &canonical.quant {
        wf_env = wf_env.add_type_var(
            qid.clone(),
            TypeVarEntry {
                location: BindingLocation::Quantifier,
                kind: *kind,
            },
        );
    }
    at(
        span,
        sail_env::wf::wf_type(&wf_env, &canonical.body, &mut |e, nc| ctx.oracle.prove(e, nc)),
    )?;
    if let Some(existing) = env.lookup_val_spec(name) {
        if existing.canonical != canonical {
            return Err(TypeError::other(
                span,
                format!("`{name}` is already declared with a different (canonicalised) type"),
            ));
        }
        return Ok(env.clone());
    }
    Ok(env.add_val_spec(
        name.clone(),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical,
        },
    ))
}

/// Expand synonyms (if enabled), canonicalise, and lift any existential
/// left in a function argument position into the scheme's own
/// quantifier (spec.md §4.7 "Value specification", §4.1 invariant 4) —
/// `ty::canonicalize` itself rejects such a type outright since it
/// cannot see the enclosing scheme to lift into.
fn canonicalize_scheme(
    env: &Environment,
    span: Span,
    scheme: &TypeScheme,
    expand: bool,
) -> Result<TypeScheme, TypeError> {
    let body = if expand {
        env.expand_type_synonyms(&scheme.body)
    } else {
        scheme.body.clone()
    };
    let mut quant = scheme.quant.clone();
    let mut constraints: Vec<_> = scheme
        .constraints
        .iter()
        .map(|nc| if expand { env.expand_constraint_synonyms(nc) } else { nc.clone() })
        .collect();

    let canon_body = match body {
        Type::Function { args, ret, effect } => {
            let mut lifted_args = Vec::with_capacity(args.len());
            for a in &args {
                let c = canon(span, a)?;
                match c {
                    Type::Exist { kids, constraint, body } => {
                        quant.extend(kids);
                        constraints.push(*constraint);
                        lifted_args.push(*body);
                    }
                    other => lifted_args.push(other),
                }
            }
            let canon_ret = canon(span, &ret)?;
            Type::Function {
                args: lifted_args,
                ret: Box::new(canon_ret),
                effect,
            }
        }
        other => canon(span, &other)?,
    };
    Ok(TypeScheme {
        quant,
        constraints,
        body: canon_body,
    })
}

/// `ty::canonicalize` wrapped so its (non-`Display`) error joins the
/// rest of the checker's `TypeError` taxonomy.
fn canon(span: Span, ty: &Type) -> Result<Type, TypeError> {
    sail_ast::ty::canonicalize(ty).map_err(|e| TypeError::other(span, e.message))
}

// ---- Function definition ---------------------------------------------------

fn check_fun_def(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    name: &Id,
    clauses: &[FunClause],
) -> Result<Environment, TypeError> {
    if env.is_fun_defined(name) {
        return Err(TypeError::other(span, format!("function `{name}` is already defined")));
    }
    let existing = env.lookup_val_spec(name).cloned();
    let scheme = match &existing {
        Some(entry) => entry.canonical.clone(),
        None => {
            let [clause] = clauses else {
                return Err(TypeError::other(
                    span,
                    format!(
                        "function `{name}` has no value specification and cannot infer one from \
                         {} clauses (only a single annotated clause can seed one)",
                        clauses.len()
                    ),
                ));
            };
            infer_scheme_from_clause(clause)?
        }
    };
    let (fargs, ret, declared_effect) = match &scheme.body {
        Type::Function { args, ret, effect } => (args.clone(), (**ret).clone(), *effect),
        other => {
            return Err(TypeError::other(
                span,
                format!("`{name}` is not a function type (`{other:?}`)"),
            ))
        }
    };
    let arg_target = match fargs.len() {
        0 => Type::unit(),
        1 => fargs[0].clone(),
        _ => Type::Tuple(fargs.clone()),
    };

    let env_with_spec = match existing {
        Some(_) => env.clone(),
        None => env.add_val_spec(
            name.clone(),
            ValSpecEntry {
                declared: scheme.clone(),
                canonical: scheme.clone(),
            },
        ),
    };

    let mut fn_env = env_with_spec.clone();
    for (qid, kind) in &scheme.quant {
        fn_env = fn_env.add_type_var(
            qid.clone(),
            TypeVarEntry {
                location: BindingLocation::Quantifier,
                kind: *kind,
            },
        );
    }
    for nc in &scheme.constraints {
        fn_env = fn_env.add_constraint(nc.clone());
    }
    fn_env = fn_env.with_policy(PolicyFlags {
        return_type: Some(ret.clone()),
        ..fn_env.policy().clone()
    });

    let mut total_effect = Effect::pure();
    for clause in clauses {
        let clause_env = bind_pat(ctx, &fn_env, &clause.pat, &arg_target)?;
        crate::dispatch::check_exp(ctx, &clause_env, &clause.body, &ret)?;
        if let Some(ann) = ctx.annotations.get(clause.body.id) {
            total_effect |= ann.effect;
        }
    }
    if !ctx.options.no_effects && !total_effect.is_subset_of(declared_effect) {
        return Err(TypeError::other(
            span,
            format!(
                "function `{name}` has effect {total_effect} not contained in its declared \
                 effect {declared_effect}"
            ),
        ));
    }
    Ok(env_with_spec.mark_fun_defined(name.clone()))
}

/// The "infer one from the single clause's annotations" fallback
/// (spec.md §4.7 "Function definition"): the clause's pattern must
/// fully type-ascribe its arguments, and the clause's body must be a
/// top-level cast ascribing its result; free quantifier variables
/// mentioned by either become the inferred scheme's own quantifier.
fn infer_scheme_from_clause(clause: &FunClause) -> Result<TypeScheme, TypeError> {
    let arg_ty = pat_type_ascription(&clause.pat).ok_or_else(|| {
        TypeError::other(
            clause.span,
            format!(
                "function `{}` has no value specification and its clause's pattern carries no \
                 type ascription to infer one from",
                clause.name
            ),
        )
    })?;
    let ret_ty = match &clause.body.kind {
        sail_ast::ExprKind::Cast { typ, .. } => typ.clone(),
        _ => {
            return Err(TypeError::other(
                clause.span,
                format!(
                    "function `{}` has no value specification and its body has no top-level \
                     type ascription to infer a return type from",
                    clause.name
                ),
            ))
        }
    };
    let fn_ty = Type::Function {
        args: vec![arg_ty],
        ret: Box::new(ret_ty),
        effect: Effect::pure(),
    };
    let fv = free_vars_type(&fn_ty);
    let mut quant: Vec<(Id, Kind)> = fv.types.iter().cloned().map(|id| (id, Kind::Type)).collect();
    quant.extend(fv.nums.iter().cloned().map(|id| (id, Kind::Int)));
    quant.extend(fv.orders.iter().cloned().map(|id| (id, Kind::Order)));
    Ok(TypeScheme {
        quant,
        constraints: Vec::new(),
        body: fn_ty,
    })
}

fn pat_type_ascription(pat: &Pat) -> Option<Type> {
    match &pat.kind {
        PatKind::Typ(_, t) => Some(t.clone()),
        PatKind::Tuple(elems) => {
            let mut tys = Vec::with_capacity(elems.len());
            for e in elems {
                tys.push(pat_type_ascription(e)?);
            }
            Some(Type::Tuple(tys))
        }
        _ => None,
    }
}

// ---- Mapping definition -----------------------------------------------------

fn check_mapping_def(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    name: &Id,
    typ: Option<&Type>,
    clauses: &[MappingClause],
) -> Result<Environment, TypeError> {
    if env.lookup_mapping(name).is_some() {
        return Err(TypeError::other(span, format!("mapping `{name}` is already defined")));
    }
    let scheme = match env.lookup_val_spec(name) {
        Some(entry) => entry.canonical.clone(),
        None => {
            let typ = typ.ok_or_else(|| {
                TypeError::other(span, format!("mapping `{name}` has no `T1 <-> T2` type"))
            })?;
            TypeScheme::monomorphic(typ.clone())
        }
    };
    let (lhs_ty, rhs_ty) = match &scheme.body {
        Type::Bidir(a, b) => ((**a).clone(), (**b).clone()),
        other => {
            return Err(TypeError::other(
                span,
                format!("mapping `{name}` does not have a bidirectional type (`{other:?}`)"),
            ))
        }
    };
    let entry = MappingEntry {
        quant: scheme.quant.clone(),
        lhs: lhs_ty.clone(),
        rhs: rhs_ty.clone(),
    };
    let env_with_mapping = env.add_mapping(name.clone(), entry);

    let mut mapping_env = env_with_mapping.clone();
    for (qid, kind) in &scheme.quant {
        mapping_env = mapping_env.add_type_var(
            qid.clone(),
            TypeVarEntry {
                location: BindingLocation::Quantifier,
                kind: *kind,
            },
        );
    }

    let mut total_effect = Effect::pure();
    for clause in clauses {
        total_effect |= check_mapping_clause(ctx, &mapping_env, clause, &lhs_ty, &rhs_ty)?;
    }
    let allowed = Effect::pure() | Effect::ESCAPE;
    if !total_effect.is_subset_of(allowed) {
        return Err(TypeError::other(
            span,
            format!("mapping `{name}` has effect {total_effect}, must be pure or `{{escape}}`"),
        ));
    }
    Ok(env_with_mapping)
}

/// A bidirectional clause binds each side from its own pattern, then
/// re-checks each side inside the *other* side's environment, so shared
/// variables between LHS and RHS are consistently typed both ways
/// (spec.md §4.7 "Mapping definition").
fn check_mapping_clause(
    ctx: &mut CheckCtx,
    env: &Environment,
    clause: &MappingClause,
    lhs_ty: &Type,
    rhs_ty: &Type,
) -> Result<Effect, TypeError> {
    match clause {
        MappingClause::Bidir { lhs, rhs, .. } => {
            let env_from_lhs = bind_pat(ctx, env, lhs, lhs_ty)?;
            bind_pat(ctx, &env_from_lhs, rhs, rhs_ty)?;
            let env_from_rhs = bind_pat(ctx, env, rhs, rhs_ty)?;
            bind_pat(ctx, &env_from_rhs, lhs, lhs_ty)?;
            Ok(Effect::pure())
        }
        MappingClause::Forwards { lhs, rhs, .. } => {
            let env1 = bind_pat(ctx, env, lhs, lhs_ty)?;
            crate::dispatch::check_exp(ctx, &env1, rhs, rhs_ty)?;
            Ok(ctx.annotations.get(rhs.id).map(|a| a.effect).unwrap_or_else(Effect::pure))
        }
        MappingClause::Backwards { lhs, rhs, .. } => {
            let env1 = bind_pat(ctx, env, rhs, rhs_ty)?;
            crate::dispatch::check_exp(ctx, &env1, lhs, lhs_ty)?;
            Ok(ctx.annotations.get(lhs.id).map(|a| a.effect).unwrap_or_else(Effect::pure))
        }
    }
}

// ---- Top-level let, default order, register --------------------------------

fn check_top_let(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    pat: &Pat,
    bound: &sail_ast::Expr,
) -> Result<Environment, TypeError> {
    let (env1, bound_ty) = if let PatKind::Typ(_, declared) = &pat.kind {
        let declared = env.expand_type_synonyms(declared);
        let env1 = crate::dispatch::check_exp(ctx, env, bound, &declared)?;
        (env1, declared)
    } else {
        crate::dispatch::infer_exp(ctx, env, bound)?
    };
    let effect = ctx.annotations.get(bound.id).map(|a| a.effect).unwrap_or_else(Effect::pure);
    if !ctx.options.no_effects && !effect.is_empty() {
        return Err(TypeError::other(
            span,
            format!("top-level let-binding must be pure, has effect {effect}"),
        ));
    }
    bind_pat(ctx, &env1, pat, &bound_ty)
}

fn check_default_order(env: &Environment, span: Span, order: sail_ast::Order) -> Result<Environment, TypeError> {
    if env.default_order_installed() {
        return Err(TypeError::other(span, "default order is already installed"));
    }
    Ok(env.install_default_order(order))
}

fn check_register(
    ctx: &mut CheckCtx,
    env: &Environment,
    span: Span,
    name: &Id,
    typ: &Type,
    effect: Effect,
) -> Result<Environment, TypeError> {
    if env.lookup_register(name).is_some() {
        return Err(TypeError::other(span, format!("register `{name}` is already declared")));
    }
    at(span, sail_env::wf::wf_type(env, typ, &mut |e, nc| ctx.oracle.prove(e, nc)))?;
    Ok(env.add_register(
        name.clone(),
        RegisterEntry {
            read_effect: Effect::RREG | effect,
            write_effect: Effect::WREG | effect,
            typ: typ.clone(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotations;
    use sail_ast::node::NodeIdGen;
    use sail_ast::{ExprKind, Lit};
    use sail_common::CheckerOptions;
    use sail_solver::StubOracle;

    fn def_span() -> Span {
        Span::new(0, 1)
    }

    fn fresh_ctx<'a>(
        oracle: &'a mut StubOracle,
        options: &'a CheckerOptions,
        annotations: &'a mut Annotations,
    ) -> CheckCtx<'a> {
        CheckCtx::new(oracle, options, annotations)
    }

    fn unit_fun(gen: &NodeIdGen, name: &str) -> Def {
        Def::Fun {
            id: gen.next(),
            span: def_span(),
            name: Id::new(name),
            clauses: vec![FunClause {
                id: gen.next(),
                span: def_span(),
                name: Id::new(name),
                pat: Pat::new(gen.next(), def_span(), PatKind::Wild),
                body: sail_ast::Expr::new(gen.next(), def_span(), ExprKind::Lit(Lit::Unit)),
            }],
        }
    }

    fn unit_val_spec(gen: &NodeIdGen, name: &str) -> Def {
        Def::ValSpec {
            id: gen.next(),
            span: def_span(),
            name: Id::new(name),
            scheme: TypeScheme::monomorphic(Type::Function {
                args: vec![Type::unit()],
                ret: Box::new(Type::unit()),
                effect: Effect::pure(),
            }),
            externs: Default::default(),
        }
    }

    #[test]
    fn redefining_a_function_is_an_error() {
        let gen = NodeIdGen::new();
        let mut oracle = StubOracle;
        let options = CheckerOptions::default();
        let mut annotations = Annotations::new();
        let mut ctx = fresh_ctx(&mut oracle, &options, &mut annotations);

        let spec = unit_val_spec(&gen, "f");
        let first = unit_fun(&gen, "f");
        let second = unit_fun(&gen, "f");
        let env = check_def(&mut ctx, &Environment::new(), &spec).expect("val spec registers");
        let env = check_def(&mut ctx, &env, &first).expect("first definition checks");
        assert!(check_def(&mut ctx, &env, &second).is_err());
    }

    #[test]
    fn default_order_installs_once() {
        let env = Environment::new();
        let first = check_default_order(&env, def_span(), sail_ast::Order::Inc)
            .expect("first install succeeds");
        assert!(check_default_order(&first, def_span(), sail_ast::Order::Dec).is_err());
    }

    #[test]
    fn enum_members_get_a_monomorphic_value_spec() {
        let gen = NodeIdGen::new();
        let mut oracle = StubOracle;
        let options = CheckerOptions::default();
        let mut annotations = Annotations::new();
        let mut ctx = fresh_ctx(&mut oracle, &options, &mut annotations);

        let def = Def::Kind {
            id: gen.next(),
            span: def_span(),
            name: Id::new("direction"),
            def: TypeDefKind::Enum {
                members: vec![Id::new("Left"), Id::new("Right")],
            },
        };
        let env = check_def(&mut ctx, &Environment::new(), &def).expect("enum registers");
        let entry = env.lookup_val_spec(&Id::new("Left")).expect("member has a value spec");
        assert_eq!(entry.canonical.body, Type::Id(Id::new("direction")));
        assert!(entry.canonical.is_monomorphic());
    }

    #[test]
    fn bidir_mapping_clause_binds_both_directions() {
        let gen = NodeIdGen::new();
        let mut oracle = StubOracle;
        let options = CheckerOptions::default();
        let mut annotations = Annotations::new();
        let mut ctx = fresh_ctx(&mut oracle, &options, &mut annotations);

        let typ = Type::Bidir(Box::new(Type::unit()), Box::new(Type::int()));
        let rhs_pat = Pat::new(gen.next(), def_span(), PatKind::Wild);
        let lhs_pat = Pat::new(gen.next(), def_span(), PatKind::Wild);
        let def = Def::Mapping {
            id: gen.next(),
            span: def_span(),
            name: Id::new("m"),
            typ: Some(typ),
            clauses: vec![MappingClause::Bidir {
                lhs: lhs_pat,
                rhs: rhs_pat,
                span: def_span(),
            }],
        };
        assert!(check_def(&mut ctx, &Environment::new(), &def).is_ok());
    }
}

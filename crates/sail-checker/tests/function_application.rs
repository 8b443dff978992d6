//! spec.md §8 testable property 5 ("function application completeness")
//! and its first two concrete scenarios.

use sail_ast::node::NodeIdGen;
use sail_ast::{Effect, Expr, ExprKind, Id, Kind, Lit, NConstraint, NExp, Type, TypeScheme};
use sail_checker::ctx::CheckCtx;
use sail_checker::{annotation::Annotations, funapp::infer_funapp};
use sail_common::{CheckerOptions, Span};
use sail_env::{Environment, ValSpecEntry};
use sail_solver::StubOracle;

fn leaf(gen: &NodeIdGen, kind: ExprKind) -> Expr {
    Expr::new(gen.next(), Span::DUMMY, kind)
}

fn num(gen: &NodeIdGen, n: i128) -> Expr {
    leaf(gen, ExprKind::Lit(Lit::Num(n)))
}

/// `val f : forall 'n, 'n >= 0. atom('n) -> atom('n + 1)`.
fn increment_scheme() -> TypeScheme {
    TypeScheme {
        quant: vec![(Id::new("n"), Kind::Int)],
        constraints: vec![NConstraint::Ge(NExp::var("n"), NExp::int(0))],
        body: Type::Function {
            args: vec![Type::atom(NExp::var("n"))],
            ret: Box::new(Type::atom(NExp::var("n").add(NExp::int(1)))),
            effect: Effect::pure(),
        },
    }
}

/// `val g : forall 'n 'm. (atom('n), atom('m)) -> atom('n * 'm)`.
fn product_scheme() -> TypeScheme {
    TypeScheme {
        quant: vec![(Id::new("n"), Kind::Int), (Id::new("m"), Kind::Int)],
        constraints: Vec::new(),
        body: Type::Function {
            args: vec![Type::atom(NExp::var("n")), Type::atom(NExp::var("m"))],
            ret: Box::new(Type::atom(NExp::var("n").mul(NExp::var("m")))),
            effect: Effect::pure(),
        },
    }
}

#[test]
fn f_of_3_infers_atom_4_with_a_pure_effect() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let scheme = increment_scheme();
    let env = Environment::new().add_val_spec(
        Id::new("f"),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical: scheme,
        },
    );

    let arg = num(&gen, 3);
    let (_, ty, effect) =
        infer_funapp(&mut ctx, &env, Span::DUMMY, &Id::new("f"), &[arg], None).expect("f(3) checks");

    let n = ty.as_atom().expect("result is an atom");
    assert_eq!(*n, NExp::Int(4));
    assert_eq!(effect, Effect::pure());
}

#[test]
fn g_of_2_3_checked_against_atom_6_succeeds() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let scheme = product_scheme();
    let env = Environment::new().add_val_spec(
        Id::new("g"),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical: scheme,
        },
    );

    let args = [num(&gen, 2), num(&gen, 3)];
    let expected = Type::atom(NExp::int(6));
    let (_, ty, _) = infer_funapp(
        &mut ctx,
        &env,
        Span::DUMMY,
        &Id::new("g"),
        &args,
        Some(&expected),
    )
    .expect("g(2, 3) checks against atom(6)");
    assert_eq!(*ty.as_atom().unwrap(), NExp::Int(6));
}

#[test]
fn g_of_2_3_checked_against_atom_7_fails_subtype() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let scheme = product_scheme();
    let env = Environment::new().add_val_spec(
        Id::new("g"),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical: scheme,
        },
    );

    let args = [num(&gen, 2), num(&gen, 3)];
    let (_, ty, _) = infer_funapp(&mut ctx, &env, Span::DUMMY, &Id::new("g"), &args, None)
        .expect("inference alone always succeeds");
    assert_eq!(*ty.as_atom().unwrap(), NExp::Int(6));

    let mismatched = sail_solver::subtype(&env, &mut StubOracle, &ty, &Type::atom(NExp::int(7)));
    assert!(mismatched.is_err());
}

#[test]
fn unresolved_quantifier_is_rejected() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    // `h : forall 'n, unit -> unit` — `'n` occurs neither in an
    // argument position nor in the return type, so nothing in the call
    // can pin it down; the application must fail rather than silently
    // leaving it free.
    let scheme = TypeScheme {
        quant: vec![(Id::new("n"), Kind::Int)],
        constraints: Vec::new(),
        body: Type::Function {
            args: vec![Type::unit()],
            ret: Box::new(Type::unit()),
            effect: Effect::pure(),
        },
    };
    let env = Environment::new().add_val_spec(
        Id::new("h"),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical: scheme,
        },
    );

    let arg = leaf(&gen, ExprKind::Lit(Lit::Unit));
    let result = infer_funapp(&mut ctx, &env, Span::DUMMY, &Id::new("h"), &[arg], None);
    assert!(result.is_err());
}

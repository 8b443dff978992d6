//! spec.md §8 concrete scenario 5: an `assert` makes its witnessed fact
//! available to the rest of the block, and an equivalent block without
//! the assert fails to discharge a callee's constraint that needs it.

use sail_ast::node::NodeIdGen;
use sail_ast::{Effect, Expr, ExprKind, Id, Kind, NConstraint, NExp, Type, TypeScheme};
use sail_checker::ctx::CheckCtx;
use sail_checker::{annotation::Annotations, dispatch::infer_exp};
use sail_common::{CheckerOptions, Span};
use sail_env::{Environment, LocalEntry, Mutability, ValSpecEntry};
use sail_solver::Z3Oracle;

fn leaf(gen: &NodeIdGen, kind: ExprKind) -> Expr {
    Expr::new(gen.next(), Span::DUMMY, kind)
}

/// `val need_pos : forall 'n, 'n >= 0. atom('n) -> unit`.
fn need_pos_scheme() -> TypeScheme {
    TypeScheme {
        quant: vec![(Id::new("n"), Kind::Int)],
        constraints: vec![NConstraint::Ge(NExp::var("n"), NExp::int(0))],
        body: Type::Function {
            args: vec![Type::atom(NExp::var("n"))],
            ret: Box::new(Type::unit()),
            effect: Effect::pure(),
        },
    }
}

/// `val operator >= : forall 'n 'm. (atom('n), atom('m)) -> bool`.
fn ge_scheme() -> TypeScheme {
    TypeScheme {
        quant: vec![(Id::new("n"), Kind::Int), (Id::new("m"), Kind::Int)],
        constraints: Vec::new(),
        body: Type::Function {
            args: vec![Type::atom(NExp::var("n")), Type::atom(NExp::var("m"))],
            ret: Box::new(Type::bool_()),
            effect: Effect::pure(),
        },
    }
}

fn base_env() -> Environment {
    Environment::new()
        .add_val_spec(Id::new("need_pos"), {
            let scheme = need_pos_scheme();
            ValSpecEntry { declared: scheme.clone(), canonical: scheme }
        })
        .add_val_spec(Id::operator(">="), {
            let scheme = ge_scheme();
            ValSpecEntry { declared: scheme.clone(), canonical: scheme }
        })
        .add_local(
            Id::new("x"),
            LocalEntry {
                mutability: Mutability::Immutable,
                typ: Type::atom(NExp::var("x")),
            },
        )
}

fn call_need_pos(gen: &NodeIdGen) -> Expr {
    leaf(
        gen,
        ExprKind::App {
            callee: Id::new("need_pos"),
            args: vec![leaf(gen, ExprKind::Id(Id::new("x")))],
        },
    )
}

fn assert_x_nonneg(gen: &NodeIdGen) -> Expr {
    let cond = leaf(
        gen,
        ExprKind::App {
            callee: Id::operator(">="),
            args: vec![
                leaf(gen, ExprKind::Id(Id::new("x"))),
                leaf(gen, ExprKind::Lit(sail_ast::Lit::Num(0))),
            ],
        },
    );
    leaf(
        gen,
        ExprKind::Assert {
            cond: Box::new(cond),
            message: None,
        },
    )
}

#[test]
fn assert_makes_its_witness_available_to_the_rest_of_the_block() {
    let gen = NodeIdGen::new();
    let mut oracle = Z3Oracle::new();
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let block = leaf(
        &gen,
        ExprKind::Block(vec![assert_x_nonneg(&gen), call_need_pos(&gen)]),
    );
    let result = infer_exp(&mut ctx, &base_env(), &block);
    assert!(result.is_ok(), "block with assert(x >= 0) should discharge need_pos's constraint");
}

#[test]
fn the_same_block_without_the_assert_fails_to_discharge_the_constraint() {
    let gen = NodeIdGen::new();
    let mut oracle = Z3Oracle::new();
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let block = leaf(&gen, ExprKind::Block(vec![call_need_pos(&gen)]));
    let result = infer_exp(&mut ctx, &base_env(), &block);
    assert!(result.is_err(), "without the assert, 'n >= 0' is not known to hold for x");
}

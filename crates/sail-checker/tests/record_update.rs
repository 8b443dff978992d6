//! `{ base with field = value }` must check its inferred record type
//! against the checking target like every other `check_exp_inner` arm
//! (see `dispatch.rs`'s `RecordUpdate` case); it must not accept because
//! it only wrote an annotation and skipped the coercion.

use sail_ast::def::RecordField;
use sail_ast::expr::FieldUpdate;
use sail_ast::node::NodeIdGen;
use sail_ast::{Expr, ExprKind, Id, Lit, Type, TypeDefKind};
use sail_checker::ctx::CheckCtx;
use sail_checker::{annotation::Annotations, dispatch::check_exp};
use sail_common::{CheckerOptions, Span};
use sail_env::{Environment, LocalEntry, Mutability};
use sail_solver::StubOracle;

fn leaf(gen: &NodeIdGen, kind: ExprKind) -> Expr {
    Expr::new(gen.next(), Span::DUMMY, kind)
}

fn point_env() -> Environment {
    Environment::new()
        .add_type_def(
            Id::new("point"),
            TypeDefKind::Record {
                quant: Vec::new(),
                fields: vec![
                    RecordField {
                        name: Id::new("x"),
                        typ: Type::int(),
                    },
                    RecordField {
                        name: Id::new("y"),
                        typ: Type::int(),
                    },
                ],
            },
        )
        .add_local(
            Id::new("p"),
            LocalEntry {
                mutability: Mutability::Immutable,
                typ: Type::Id(Id::new("point")),
            },
        )
}

fn update_x(gen: &NodeIdGen) -> Expr {
    leaf(
        gen,
        ExprKind::RecordUpdate {
            base: Box::new(leaf(gen, ExprKind::Id(Id::new("p")))),
            fields: vec![FieldUpdate {
                field: Id::new("x"),
                value: Box::new(leaf(gen, ExprKind::Lit(Lit::Num(5)))),
            }],
        },
    )
}

#[test]
fn record_update_checks_against_its_own_record_type() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let expr = update_x(&gen);
    let result = check_exp(&mut ctx, &point_env(), &expr, &Type::Id(Id::new("point")));
    assert!(result.is_ok());
}

#[test]
fn record_update_rejects_a_mismatched_target() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let expr = update_x(&gen);
    let result = check_exp(&mut ctx, &point_env(), &expr, &Type::int());
    assert!(result.is_err(), "`{{ p with x = 5 }}` is a `point`, not an `int`");
}

//! spec.md §8 testable property 2 ("preservation of subtyping by
//! unification") and concrete scenario 4 (`if`-join packs mismatched
//! atoms into an existential).

use sail_ast::node::NodeIdGen;
use sail_ast::{Expr, ExprKind, Lit, NExp, Type};
use sail_checker::ctx::CheckCtx;
use sail_checker::{annotation::Annotations, dispatch::infer_exp};
use sail_common::{CheckerOptions, Span};
use sail_env::Environment;
use sail_solver::{unify, StubOracle};

fn leaf(gen: &NodeIdGen, kind: ExprKind) -> Expr {
    Expr::new(gen.next(), Span::DUMMY, kind)
}

#[test]
fn unification_preserves_mutual_subtyping() {
    let env = Environment::new();
    let mut oracle = StubOracle;

    let t_pat = Type::atom(NExp::var("n"));
    let t_actual = Type::atom(NExp::int(5));
    let result = unify(&env, &mut oracle, &t_pat, &t_actual).expect("unifies");

    let sigma_pat = result.subst.apply_type(&t_pat);
    let sigma_actual = result.subst.apply_type(&t_actual);

    assert!(sail_solver::subtype(&env, &mut oracle, &sigma_pat, &sigma_actual).is_ok());
    assert!(sail_solver::subtype(&env, &mut oracle, &sigma_actual, &sigma_pat).is_ok());
}

#[test]
fn unification_of_tuples_preserves_subtyping_pointwise() {
    let env = Environment::new();
    let mut oracle = StubOracle;

    let t_pat = Type::Tuple(vec![Type::atom(NExp::var("n")), Type::atom(NExp::var("m"))]);
    let t_actual = Type::Tuple(vec![Type::atom(NExp::int(2)), Type::atom(NExp::int(3))]);
    let result = unify(&env, &mut oracle, &t_pat, &t_actual).expect("unifies");

    let sigma_pat = result.subst.apply_type(&t_pat);
    let sigma_actual = result.subst.apply_type(&t_actual);
    assert!(sail_solver::subtype(&env, &mut oracle, &sigma_pat, &sigma_actual).is_ok());
    assert!(sail_solver::subtype(&env, &mut oracle, &sigma_actual, &sigma_pat).is_ok());
}

#[test]
fn if_without_an_else_target_joins_mismatched_atoms_into_an_existential() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let cond = leaf(&gen, ExprKind::Lit(Lit::True));
    let then_branch = leaf(&gen, ExprKind::Lit(Lit::Num(1)));
    let else_branch = leaf(&gen, ExprKind::Lit(Lit::Num(2)));
    let if_expr = leaf(
        &gen,
        ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        },
    );

    let (_, ty) = infer_exp(&mut ctx, &Environment::new(), &if_expr).expect("if infers a joined type");
    match ty {
        Type::Exist { kids, constraint, body } => {
            assert_eq!(kids.len(), 1);
            let (k, _) = &kids[0];
            assert_eq!(*constraint, sail_ast::NConstraint::In(k.clone(), vec![1, 2]));
            assert_eq!(*body, Type::atom(NExp::var(k.clone())));
        }
        other => panic!("expected a packed existential, got {other:?}"),
    }
}

#[test]
fn if_branches_of_equal_type_join_without_an_existential() {
    let gen = NodeIdGen::new();
    let mut oracle = StubOracle;
    let options = CheckerOptions::default();
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(&mut oracle, &options, &mut annotations);

    let cond = leaf(&gen, ExprKind::Lit(Lit::False));
    let then_branch = leaf(&gen, ExprKind::Lit(Lit::True));
    let else_branch = leaf(&gen, ExprKind::Lit(Lit::False));
    let if_expr = leaf(
        &gen,
        ExprKind::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        },
    );

    let (_, ty) = infer_exp(&mut ctx, &Environment::new(), &if_expr).expect("if infers bool");
    assert_eq!(ty, Type::bool_());
}

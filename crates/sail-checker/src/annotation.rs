//! Output annotations (spec.md §6: "each node ... replaced by a node
//! whose annotation is `Some((environment, type, effect), expected_type?)`").
//!
//! Rather than threading an annotation slot through every `Expr`/`Pat`/
//! `LExpr` node (which would mean forking `sail-ast`'s term algebra, shared
//! as-is by `sail-solver`), annotations are recorded in a side table keyed
//! by `NodeId`, the way `tsz-checker`'s `CheckerContext` keeps `FxHashMap<
//! NodeId, Type>`-shaped caches alongside the AST instead of mutating it.

use rustc_hash::FxHashMap;
use sail_ast::{Effect, NodeId, Type};
use serde::Serialize;

/// What a single expression/pattern/l-expression node was checked in and
/// against (spec.md §3 invariant 6).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    /// The type the node turned out to have.
    pub typ: Type,
    /// The effect of evaluating this node, already the union of its
    /// children's effects (spec.md §8 property 4).
    pub effect: Effect,
    /// The type the node was checked *against*, if it was checked rather
    /// than inferred.
    pub expected: Option<Type>,
}

#[derive(Debug, Default)]
pub struct Annotations {
    table: FxHashMap<NodeId, Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Annotations::default()
    }

    pub fn insert(&mut self, id: NodeId, annotation: Annotation) {
        self.table.insert(id, annotation);
    }

    pub fn get(&self, id: NodeId) -> Option<&Annotation> {
        self.table.get(&id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Every recorded annotation, for `sail-cli --emit-json` to serialize
    /// the checked program without forking the AST.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Annotation)> {
        self.table.iter().map(|(id, ann)| (*id, ann))
    }
}

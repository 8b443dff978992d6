//! The typing environment (component 3 of spec.md §2).

pub mod environment;
pub mod error;
pub mod mappings;
pub mod naming;
pub mod tables;
pub mod wf;

pub use environment::Environment;
pub use error::EnvError;
pub use naming::NamingContext;
pub use tables::{
    BindingLocation, ConstraintSynonym, FieldEntry, FlowRefinement, LocalEntry, MappingEntry,
    Mutability, PolicyFlags, RegisterEntry, TypeSynonym, TypeVarEntry, ValSpecEntry,
};

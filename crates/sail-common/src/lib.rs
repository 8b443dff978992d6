//! Common types and utilities for the Sail static semantics engine.
//!
//! This crate provides foundational pieces shared by every other crate in
//! the workspace:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, error codes)
//! - Process-wide checker options (`CheckerOptions`)

pub mod checker_options;
pub mod diagnostics;
pub mod interner;
pub mod span;

pub use checker_options::CheckerOptions;
pub use diagnostics::{Diagnostic, DiagnosticCategory};
pub use interner::{Atom, Interner};
pub use span::Span;

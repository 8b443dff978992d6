//! Process-wide checker configuration.
//!
//! This lives in `sail-common` so that both `sail-solver` and
//! `sail-checker` can reference `CheckerOptions` without a circular
//! dependency — the same reason `tsz_common::checker_options` gives for
//! living where it does.
//!
//! These toggles are read-only from the checker's perspective and fixed
//! for the duration of a single checking run (spec.md §5).

/// Verbosity of the tree-trace the checker emits through `tracing`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    #[default]
    Silent,
    Tree,
    Verbose,
}

impl From<u8> for DebugLevel {
    fn from(value: u8) -> Self {
        match value {
            0 => DebugLevel::Silent,
            1 => DebugLevel::Tree,
            _ => DebugLevel::Verbose,
        }
    }
}

/// Process-wide toggles named in spec.md §6's configuration table.
#[derive(Clone, Debug, Default)]
pub struct CheckerOptions {
    /// `tc_debug`: silent / tree trace / verbose trace.
    pub tc_debug: DebugLevel,
    /// `no_effects`: skip effect-set checks.
    pub no_effects: bool,
    /// `no_lexp_bounds_check`: skip vector-index bounds obligations.
    pub no_lexp_bounds_check: bool,
    /// `constraint_synonyms`: permit type-level constraint synonyms.
    pub constraint_synonyms: bool,
    /// `expand_valspec`: expand synonyms eagerly in value specs.
    pub expand_valspec: bool,
}

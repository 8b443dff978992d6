use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the `sail-check` binary.
#[derive(Parser, Debug)]
#[command(
    name = "sail-check",
    version,
    about = "Typecheck a Sail definition stream"
)]
pub struct CliArgs {
    /// JSON file containing a top-level array of `Def` nodes; `-` reads stdin.
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    /// Increase the `tracing` tree-trace verbosity (repeatable: `-v`, `-vv`).
    #[arg(short = 'v', long = "tc-debug", action = ArgAction::Count)]
    pub tc_debug: u8,

    /// Skip effect-set checks (`CheckerOptions::no_effects`).
    #[arg(long = "no-effects")]
    pub no_effects: bool,

    /// Skip vector-index bounds obligations on l-expressions.
    #[arg(long = "no-lexp-bounds-check")]
    pub no_lexp_bounds_check: bool,

    /// Permit type-level constraint synonyms.
    #[arg(long = "constraint-synonyms")]
    pub constraint_synonyms: bool,

    /// Expand synonyms eagerly while canonicalising value specifications.
    #[arg(long = "expand-valspec")]
    pub expand_valspec: bool,

    /// Constraint solver backend.
    #[arg(long, value_enum, default_value = "z3")]
    pub oracle: Oracle,

    /// Print the checked program's node annotations as JSON instead of
    /// rendering diagnostics.
    #[arg(long = "emit-json")]
    pub emit_json: bool,

    /// Colourise diagnostics. Defaults to auto-detecting the terminal.
    #[arg(long)]
    pub pretty: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Oracle {
    /// The syntactic-fast-path-only backend; no z3 dependency at runtime.
    Stub,
    /// The real Presburger/LIA backend over z3.
    #[default]
    Z3,
}

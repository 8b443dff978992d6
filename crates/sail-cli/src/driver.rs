//! The `sail-check` end-to-end harness: JSON definition stream in,
//! diagnostics or an annotated program out (spec.md §9 "AMBIENT CLI
//! driver"). `anyhow` wraps I/O and JSON-parse failures; `TypeError` is
//! reserved for checker-level diagnostics, the same split `tsz-cli`'s
//! `driver.rs` keeps between its own `anyhow::Result` plumbing and
//! `tsz_checker::diagnostics::Diagnostic`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sail_ast::Def;
use sail_checker::{Annotations, CheckCtx};
use sail_common::CheckerOptions;
use sail_env::Environment;
use sail_solver::{ConstraintOracle, StubOracle, Z3Oracle};

use crate::args::{CliArgs, Oracle};
use crate::reporter::Reporter;

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading definition stream from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading `{}`", path.display()))
    }
}

fn checker_options(args: &CliArgs) -> CheckerOptions {
    CheckerOptions {
        tc_debug: args.tc_debug.into(),
        no_effects: args.no_effects,
        no_lexp_bounds_check: args.no_lexp_bounds_check,
        constraint_synonyms: args.constraint_synonyms,
        expand_valspec: args.expand_valspec,
    }
}

fn build_oracle(kind: Oracle) -> Box<dyn ConstraintOracle> {
    match kind {
        Oracle::Stub => Box::new(StubOracle),
        Oracle::Z3 => Box::new(Z3Oracle::new()),
    }
}

/// Run one checking pass and return the process exit code: `0` if every
/// definition checked cleanly, `1` otherwise.
pub fn run(args: &CliArgs) -> Result<i32> {
    let source = read_input(&args.input)?;
    let defs: Vec<Def> = serde_json::from_str(&source)
        .context("parsing the input as a JSON array of `Def` nodes")?;

    let options = checker_options(args);
    let mut oracle = build_oracle(args.oracle);
    let mut annotations = Annotations::new();
    let mut ctx = CheckCtx::new(oracle.as_mut(), &options, &mut annotations);

    let checked = sail_checker::check_program(&mut ctx, Environment::new(), &defs);
    let ok = checked.errors.is_empty();

    if args.emit_json {
        let mut entries: Vec<_> = annotations.iter().map(|(id, ann)| (id.as_u32(), ann)).collect();
        entries.sort_by_key(|(id, _)| *id);
        let rendered = serde_json::to_string_pretty(&entries)
            .context("serializing the checked program's annotations")?;
        println!("{rendered}");
    } else {
        let pretty = args.pretty.unwrap_or_else(|| {
            std::io::IsTerminal::is_terminal(&std::io::stdout())
        });
        let diagnostics: Vec<_> = checked.errors.iter().map(|e| e.to_diagnostic()).collect();
        let reporter = Reporter::new(pretty);
        print!("{}", reporter.render(&diagnostics));
        if ok {
            println!("checked {} definition(s), no errors", defs.len());
        }
    }

    Ok(if ok { 0 } else { 1 })
}

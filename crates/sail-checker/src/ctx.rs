//! The per-run checking context (spec.md §5 "Process-wide state").
//!
//! Bundles the one piece of state that is shared but not part of the
//! value-typed `Environment`: the oracle (an external solver handle,
//! `!Clone` by nature) and the read-only process-wide option toggles —
//! mirroring how `tsz-checker::context::CheckerContext` threads its
//! caches and compiler options alongside the binder state for a single
//! checking run, without making either global.

use crate::annotation::Annotations;
use sail_common::CheckerOptions;
use sail_solver::ConstraintOracle;

pub struct CheckCtx<'a> {
    pub oracle: &'a mut dyn ConstraintOracle,
    pub options: &'a CheckerOptions,
    pub annotations: &'a mut Annotations,
}

impl<'a> CheckCtx<'a> {
    pub fn new(
        oracle: &'a mut dyn ConstraintOracle,
        options: &'a CheckerOptions,
        annotations: &'a mut Annotations,
    ) -> Self {
        CheckCtx {
            oracle,
            options,
            annotations,
        }
    }

    /// Reborrow as a shorter-lived `CheckCtx`, the way a `&mut CheckCtx`
    /// is passed down through mutually recursive `check_exp`/`infer_exp`
    /// calls without moving the original out of the caller's stack frame.
    pub fn reborrow(&mut self) -> CheckCtx<'_> {
        CheckCtx {
            oracle: self.oracle,
            options: self.options,
            annotations: self.annotations,
        }
    }
}

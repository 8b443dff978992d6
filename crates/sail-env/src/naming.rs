//! Process-wide fresh-name and debug-depth counters (spec.md §5
//! "Process-wide state").
//!
//! Threaded through the checker as an explicit `Rc<RefCell<NamingContext>>`
//! shared by every [`crate::Environment`] clone within one checking
//! session, rather than true global/static state — this keeps repeated
//! runs (e.g. in tests, or a long-lived `sail-lsp`-style process)
//! independent of each other as long as each session gets its own
//! `NamingContext::new()`.

use sail_ast::Id;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Counters {
    /// Existential-opening / goal-variable freshening counter.
    kid: u64,
    /// Quantifier-instantiation (`freshen_bind`) counter.
    bind: u64,
    /// Current nesting depth of trace output; incremented on entry to a
    /// traced operation, decremented on every exit path.
    debug_depth: u32,
}

#[derive(Debug, Clone)]
pub struct NamingContext {
    inner: Rc<RefCell<Counters>>,
}

impl Default for NamingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingContext {
    pub fn new() -> Self {
        NamingContext {
            inner: Rc::new(RefCell::new(Counters::default())),
        }
    }

    /// Mint a fresh existential/goal variable name.
    pub fn fresh_kid(&self, base: &str) -> Id {
        let mut c = self.inner.borrow_mut();
        let n = c.kid;
        c.kid += 1;
        Id::fresh(base, n)
    }

    /// Mint a fresh name for `freshen_bind`'s quantifier renaming.
    pub fn fresh_bind_name(&self, base: &str) -> Id {
        let mut c = self.inner.borrow_mut();
        let n = c.bind;
        c.bind += 1;
        Id::fresh(base, n)
    }

    pub fn debug_depth(&self) -> u32 {
        self.inner.borrow().debug_depth
    }

    /// RAII guard that increments on construction and decrements on
    /// every exit path, including unwinding through an error return
    /// (spec.md §5: "must be decremented on every exit path").
    pub fn enter_debug_scope(&self) -> DebugScopeGuard {
        self.inner.borrow_mut().debug_depth += 1;
        DebugScopeGuard {
            naming: self.clone(),
        }
    }
}

pub struct DebugScopeGuard {
    naming: NamingContext,
}

impl Drop for DebugScopeGuard {
    fn drop(&mut self) {
        let mut c = self.naming.inner.borrow_mut();
        c.debug_depth = c.debug_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_kids_increase_monotonically_and_never_collide() {
        let ctx = NamingContext::new();
        let a = ctx.fresh_kid("n");
        let b = ctx.fresh_kid("n");
        assert_ne!(a, b);
    }

    #[test]
    fn debug_scope_decrements_on_drop_even_mid_propagation() {
        let ctx = NamingContext::new();
        assert_eq!(ctx.debug_depth(), 0);
        {
            let _g1 = ctx.enter_debug_scope();
            assert_eq!(ctx.debug_depth(), 1);
            {
                let _g2 = ctx.enter_debug_scope();
                assert_eq!(ctx.debug_depth(), 2);
            }
            assert_eq!(ctx.debug_depth(), 1);
        }
        assert_eq!(ctx.debug_depth(), 0);
    }

    #[test]
    fn independent_sessions_do_not_share_counters() {
        let a = NamingContext::new();
        let b = NamingContext::new();
        let _ = a.fresh_kid("n");
        let _ = a.fresh_kid("n");
        let first_b = b.fresh_kid("n");
        assert_eq!(first_b, Id::fresh("n", 0));
    }
}

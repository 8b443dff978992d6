//! Native CLI support for the Sail type checker.
//!
//! Provides the `sail-check` binary's argument parsing, the end-to-end
//! driver that threads a JSON definition stream through `sail-checker`,
//! and diagnostic rendering.

pub mod args;
pub mod driver;
pub mod reporter;

//! Diagnostic rendering shared by every checker crate.
//!
//! Shaped after `tsz_common::diagnostics`: a plain struct rather than a
//! `thiserror`-derived enum, with a stable numeric `code` per error kind
//! and a free-form rendered message.

use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

/// Stable numeric codes for the error taxonomy in spec.md §7.
pub mod codes {
    pub const SUBTYPE: u32 = 1;
    pub const NO_CASTS: u32 = 2;
    pub const NO_OVERLOADING: u32 = 3;
    pub const UNRESOLVED_QUANTS: u32 = 4;
    pub const NO_NUM_IDENT: u32 = 5;
    pub const OTHER: u32 = 9;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRelatedInformation {
    pub span: Span,
    pub message_text: String,
}

/// A single rendered diagnostic, ready to print or serialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub span: Span,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    pub fn error(span: Span, code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            category: DiagnosticCategory::Error,
            code,
            span,
            message_text: message.into(),
            related_information: Vec::new(),
        }
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            span,
            message_text: message.into(),
        });
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[E{:03}] {}..{}: {}",
            self.code, self.span.start, self.span.end, self.message_text
        )?;
        for related in &self.related_information {
            write!(
                f,
                "\n  note: {}..{}: {}",
                related.span.start, related.span.end, related.message_text
            )?;
        }
        Ok(())
    }
}

//! Diagnostic rendering (spec.md §7 "User-visible behaviour"), coloured
//! the way `tsz-cli`'s own reporter colourises `tsc`-style diagnostics.

use colored::Colorize;
use sail_common::diagnostics::Diagnostic;

pub struct Reporter {
    pretty: bool,
}

impl Reporter {
    pub fn new(pretty: bool) -> Self {
        Reporter { pretty }
    }

    /// Render every diagnostic, one per line, plus its related
    /// information indented underneath.
    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for d in diagnostics {
            let header = format!("{}..{}: error TS{:03}: {}", d.span.start, d.span.end, d.code, d.message_text);
            if self.pretty {
                out.push_str(&header.red().bold().to_string());
            } else {
                out.push_str(&header);
            }
            out.push('\n');
            for related in &d.related_information {
                let note = format!(
                    "  note: {}..{}: {}",
                    related.span.start, related.span.end, related.message_text
                );
                if self.pretty {
                    out.push_str(&note.dimmed().to_string());
                } else {
                    out.push_str(&note);
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sail_common::Span;

    #[test]
    fn plain_mode_has_no_escape_codes() {
        let d = Diagnostic::error(Span::new(0, 3), 9, "boom");
        let reporter = Reporter::new(false);
        let rendered = reporter.render(std::slice::from_ref(&d));
        assert!(!rendered.contains('\u{1b}'));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn pretty_mode_colourises_the_header() {
        let d = Diagnostic::error(Span::new(0, 3), 9, "boom");
        let reporter = Reporter::new(true);
        let rendered = reporter.render(std::slice::from_ref(&d));
        assert!(rendered.contains('\u{1b}'));
    }
}

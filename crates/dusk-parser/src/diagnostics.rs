//! Ariadne-based rendering for syntax errors.
//!
//! Collaborators (CLI, server) call this to turn a structured
//! [`SyntaxError`] into terminal output with the offending source excerpt.
//! Output is colorless for consistent test snapshots.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use dusk_common::error::SyntaxError;

/// Render a syntax error into a formatted diagnostic string.
pub fn render_diagnostic(error: &SyntaxError, source: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp to source bounds and keep the span non-empty so the label has
    // something to point at.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let span = clamp(error.start_offset as usize..error.end_offset as usize);
    let report = Report::build(ReportKind::Error, span.clone())
        .with_message(&error.message)
        .with_config(config)
        .with_label(Label::new(span).with_message(format!(
            "{} (line {}, column {})",
            error.message, error.line, error.column
        )))
        .finish();

    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dusk_common::span::{LineIndex, Span};

    #[test]
    fn renders_message_and_location() {
        let source = "var x = ;";
        let lines = LineIndex::new(source);
        let err = SyntaxError::at("unexpected token `;`", Span::new(8, 9), &lines);
        let out = render_diagnostic(&err, source);
        assert!(out.contains("unexpected token `;`"));
        assert!(out.contains("line 1, column 9"));
    }

    #[test]
    fn clamps_out_of_range_spans() {
        let source = "x";
        let lines = LineIndex::new(source);
        let err = SyntaxError::at("unexpected end of input", Span::new(1, 1), &lines);
        let out = render_diagnostic(&err, source);
        assert!(out.contains("unexpected end of input"));
    }
}

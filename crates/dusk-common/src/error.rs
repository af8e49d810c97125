use std::fmt;

use serde::Serialize;

use crate::span::{LineIndex, Span};

/// A syntax error raised by the scanner or parser.
///
/// Carries the human-readable message plus the full location payload:
/// 1-based `line` and `column`, and byte offsets for the containing line
/// start and the offending span. Collaborators render these into terminal
/// output with the offending source excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub line_offset: u32,
    pub start_offset: u32,
    pub end_offset: u32,
}

impl SyntaxError {
    /// Build a syntax error at the given span, resolving line/column
    /// through the line index.
    pub fn at(message: impl Into<String>, span: Span, lines: &LineIndex) -> Self {
        let pos = lines.position(span);
        Self {
            message: message.into(),
            line: pos.line,
            column: pos.column,
            line_offset: pos.line_offset,
            start_offset: pos.start_offset,
            end_offset: pos.end_offset,
        }
    }

    /// The offending span.
    pub fn span(&self) -> Span {
        Span::new(self.start_offset, self.end_offset)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_resolves_location() {
        let src = "var x;\nvar ;";
        let lines = LineIndex::new(src);
        let err = SyntaxError::at("unexpected token `;`", Span::new(11, 12), &lines);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 5);
        assert_eq!(err.line_offset, 7);
        assert_eq!(err.start_offset, 11);
        assert_eq!(err.end_offset, 12);
    }

    #[test]
    fn syntax_error_display() {
        let lines = LineIndex::new("x");
        let err = SyntaxError::at("unexpected end of input", Span::new(1, 1), &lines);
        assert_eq!(err.to_string(), "unexpected end of input at 1:2");
    }
}

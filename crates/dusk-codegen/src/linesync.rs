//! Line-sync utility.
//!
//! Every rewritten region is padded with trailing newlines until it spans
//! as many lines as the source region it replaces. This keeps every
//! downstream source line on the same line number in the output, which is
//! the whole debugging story in the absence of source maps.

use dusk_common::span::{LineIndex, Span};

/// Count the line terminators in a piece of output text.
pub fn count_newlines(s: &str) -> u32 {
    s.chars().filter(|&c| c == '\n').count() as u32
}

/// Pad `text` with trailing newlines until it covers `height` lines.
pub fn preserve_newlines(text: String, height: u32) -> String {
    let have = count_newlines(&text);
    if have >= height {
        return text;
    }
    let mut text = text;
    for _ in have..height {
        text.push('\n');
    }
    text
}

/// Pad `text` to the line height of the source span it replaces.
pub fn sync_newlines(span: Span, lines: &LineIndex, text: String) -> String {
    if span.is_empty() {
        return text;
    }
    let height = lines.line(span.end - 1) - lines.line(span.start);
    preserve_newlines(text, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_newlines_counts() {
        assert_eq!(count_newlines(""), 0);
        assert_eq!(count_newlines("a\nb"), 1);
        assert_eq!(count_newlines("a\nb\n"), 2);
    }

    #[test]
    fn preserve_newlines_pads_up() {
        assert_eq!(preserve_newlines("x".into(), 2), "x\n\n");
        assert_eq!(preserve_newlines("x\n\n\n".into(), 2), "x\n\n\n");
    }

    #[test]
    fn sync_newlines_matches_source_height() {
        let source = "var a = {\n  b: 1\n};\nnext";
        let lines = LineIndex::new(source);
        // The object spans offsets 8..19 over three lines (two terminators).
        let span = Span::new(8, 19);
        let out = sync_newlines(span, &lines, "{ b: 1 }".into());
        assert_eq!(count_newlines(&out), 2);
    }

    #[test]
    fn sync_newlines_leaves_tall_output_alone() {
        let source = "a;\nb;";
        let lines = LineIndex::new(source);
        let out = sync_newlines(Span::new(0, 2), &lines, "x\n\n".into());
        assert_eq!(out, "x\n\n");
    }
}

use serde::Serialize;

/// Half-open byte range `[start, end)` into the source text.
///
/// Everything the compiler tracks about location is a byte offset into the
/// original UTF-8 input; spans never store line or column. [`LineIndex`]
/// resolves offsets on demand when an error or diagnostic needs a
/// human-readable position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// A span over `[start, end)`.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "backwards span: {start}..{end}");
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-length spans.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The smallest span containing both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A resolved source location, carrying everything the error contract needs.
///
/// `line` and `column` are 1-based; the three offsets are byte offsets into
/// the source (`line_offset` is the start of the line containing the span).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub line_offset: u32,
    pub start_offset: u32,
    pub end_offset: u32,
}

/// Pre-computed index of line start positions for on-demand line/column lookup.
///
/// Constructed once per source file, then used to convert byte offsets to
/// human-readable (line, column) pairs via binary search.
///
/// The scanned dialect recognizes four line terminators: `\n`, `\r` (when not
/// part of `\r\n`), `U+2028`, and `U+2029`. All of them start a new line here,
/// which keeps this index in agreement with the scanner's newline tracking.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index by scanning the source text for line terminators.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut iter = source.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            match c {
                '\n' => line_starts.push((i + 1) as u32),
                // \r\n counts as a single terminator; the push happens at \n.
                '\r' => {
                    if !matches!(iter.peek(), Some((_, '\n'))) {
                        line_starts.push((i + 1) as u32);
                    }
                }
                '\u{2028}' | '\u{2029}' => {
                    line_starts.push((i + c.len_utf8()) as u32);
                }
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-based line number.
    pub fn line(&self, offset: u32) -> u32 {
        let idx = self.line_starts.partition_point(|&start| start <= offset);
        idx.saturating_sub(1) as u32
    }

    /// Byte offset of the start of the given 0-based line.
    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts[line as usize]
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    ///
    /// Column is measured in bytes from the start of the line (1-based).
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let col = offset - self.line_starts[line as usize] + 1;
        (line + 1, col)
    }

    /// Resolve a span into a full [`Position`].
    pub fn position(&self, span: Span) -> Position {
        let line = self.line(span.start);
        let line_offset = self.line_starts[line as usize];
        Position {
            line: line + 1,
            column: span.start - line_offset + 1,
            line_offset,
            start_offset: span.start,
            end_offset: span.end,
        }
    }

    /// Return the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_measures_bytes() {
        let span = Span::new(2, 8);
        assert_eq!((span.start, span.end), (2, 8));
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
    }

    #[test]
    fn zero_length_span_is_empty() {
        assert!(Span::new(7, 7).is_empty());
        assert_eq!(Span::new(7, 7).len(), 0);
    }

    #[test]
    fn merge_covers_both_operands_in_either_order() {
        let a = Span::new(4, 9);
        let b = Span::new(12, 20);
        assert_eq!(a.merge(b), Span::new(4, 20));
        assert_eq!(b.merge(a), Span::new(4, 20));
        // Overlapping spans collapse to their hull.
        assert_eq!(Span::new(0, 6).merge(Span::new(3, 5)), Span::new(0, 6));
    }

    #[test]
    fn line_index_single_line() {
        let idx = LineIndex::new("hello");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(4), (1, 5));
    }

    #[test]
    fn line_index_multiple_lines() {
        let src = "hello\nworld\nfoo";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(12), (3, 1));
        assert_eq!(idx.line_col(13), (3, 2));
    }

    #[test]
    fn line_index_crlf_is_one_terminator() {
        let src = "ab\r\ncd\ref";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_count(), 3);
        // 'c' follows \r\n -> line 2
        assert_eq!(idx.line_col(4), (2, 1));
        // 'e' follows a lone \r -> line 3
        assert_eq!(idx.line_col(7), (3, 1));
    }

    #[test]
    fn line_index_unicode_separators() {
        let src = "a\u{2028}b\u{2029}c";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_count(), 3);
        // U+2028 is 3 bytes, so 'b' starts at offset 4.
        assert_eq!(idx.line_col(4), (2, 1));
        assert_eq!(idx.line_col(8), (3, 1));
    }

    #[test]
    fn line_index_position_payload() {
        let src = "let x;\nlet y;";
        let idx = LineIndex::new(src);
        let pos = idx.position(Span::new(11, 12));
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.line_offset, 7);
        assert_eq!(pos.start_offset, 11);
        assert_eq!(pos.end_offset, 12);
    }

    #[test]
    fn line_index_line_count() {
        let idx = LineIndex::new("a\nb\nc");
        assert_eq!(idx.line_count(), 3);
    }
}

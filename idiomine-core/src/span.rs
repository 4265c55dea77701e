use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, start + len)` over a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Build a span from its two bounds. `end` is clamped to `start`.
    #[must_use]
    pub const fn from_bounds(start: usize, end: usize) -> Self {
        let len = if end > start { end - start } else { 0 };
        Self { start, len }
    }

    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Two spans overlap when they share at least one position.
    /// Empty spans never overlap anything.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        self.start.max(other.start) < self.end().min(other.end())
    }

    #[must_use]
    pub const fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    /// Smallest span covering both inputs.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span::from_bounds(self.start.min(other.start), self.end().max(other.end()))
    }

    /// Slice `text` by this span, `None` if out of bounds or not on a char boundary.
    #[must_use]
    pub fn slice(self, text: &str) -> Option<&str> {
        text.get(self.start..self.end())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end())
    }
}

// -- Line index ---------------------------------------------------------------

/// Line-start table of a text.
///
/// A text with `k` line breaks has `k + 1` lines, so a trailing newline yields
/// a final empty line. Line ends exclude the line break (`\n` or `\r\n`).
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut ends = Vec::new();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                let end = if i > 0 && bytes[i - 1] == b'\r' { i - 1 } else { i };
                ends.push(end.max(starts[starts.len() - 1]));
                starts.push(i + 1);
            }
        }
        ends.push(text.len());
        Self { starts, ends }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Zero-based line containing byte `offset`. Offsets past the end map to the last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }

    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        self.starts[line.min(self.starts.len() - 1)]
    }

    #[must_use]
    pub fn line_end(&self, line: usize) -> usize {
        self.ends[line.min(self.ends.len() - 1)]
    }

    /// Span of a line without its line break.
    #[must_use]
    pub fn line_span(&self, line: usize) -> Span {
        Span::from_bounds(self.line_start(line), self.line_end(line))
    }

    /// First and last line touched by `span`. The end position is exclusive,
    /// but a span ending at the start of a line still touches that line.
    #[must_use]
    pub fn lines_of(&self, span: Span) -> (usize, usize) {
        (self.line_of(span.start), self.line_of(span.end()))
    }

    /// Number of lines touched by `span`.
    #[must_use]
    pub fn line_count_of(&self, span: Span) -> usize {
        let (first, last) = self.lines_of(span);
        last - first + 1
    }
}

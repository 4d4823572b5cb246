//! Source positions
//!
//!     Every token, structure-data record and syntax tree node carries a [`Range`]: the byte
//!     span into the unit's source plus the zero based line/column of both ends. Errors
//!     carry a [`Location`], which adds the file name and prints one based.
//!
//!     Converting offsets to line/column goes through a [`LineIndex`] built once per source
//!     text; the tokenizer and the grammar engine each keep one.
//!
//!     Columns count bytes from the start of the line, so they agree with the span even on
//!     lines holding multi-byte characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// Zero based line and column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A stretch of source: byte span plus the positions of its ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    /// Empty range at a single position, used for nodes that cover no tokens.
    pub fn point(offset: usize, position: Position) -> Self {
        Self::new(offset..offset, position, position)
    }

    /// Range from the start of `self` to the end of `other`, whichever comes first or last.
    /// Binary expressions use it to cover both operands.
    pub fn join(&self, other: &Range) -> Range {
        let (start, span_start) = if other.span.start < self.span.start {
            (other.start, other.span.start)
        } else {
            (self.start, self.span.start)
        };
        let (end, span_end) = if other.span.end > self.span.end {
            (other.end, other.span.end)
        } else {
            (self.end, self.span.end)
        };
        Range::new(span_start..span_end, start, end)
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A range inside a named unit. Displays as `file:line:column`, one based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub range: Range,
}

impl Location {
    pub fn new(file: impl Into<String>, range: Range) -> Self {
        Self {
            file: file.into(),
            range,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Position { line, column } = self.range.start;
        write!(f, "{}:{}:{}", self.file, line + 1, column + 1)
    }
}

/// Offsets of the line starts of one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let breaks = source.match_indices('\n').map(|(offset, _)| offset + 1);
        Self {
            starts: std::iter::once(0).chain(breaks).collect(),
        }
    }

    /// Line/column of a byte offset. Offsets past the end land on the last line.
    pub fn position(&self, offset: usize) -> Position {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        Position::new(line, offset - self.starts[line])
    }

    pub fn range(&self, span: &ByteRange<usize>) -> Range {
        Range::new(
            span.clone(),
            self.position(span.start),
            self.position(span.end),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_order_by_line_first() {
        assert!(Position::new(0, 40) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_join_covers_both_operands() {
        let index = LineIndex::new("a +\n  b");
        let left = index.range(&(0..1));
        let right = index.range(&(6..7));
        let joined = left.join(&right);
        assert_eq!(joined.span, 0..7);
        assert_eq!(joined.start, Position::new(0, 0));
        assert_eq!(joined.end, Position::new(1, 3));
        assert_eq!(right.join(&left), joined);
    }

    #[test]
    fn test_point_is_empty() {
        assert!(Range::point(4, Position::new(0, 4)).is_empty());
        assert!(!LineIndex::new("ab").range(&(0..2)).is_empty());
    }

    #[test]
    fn test_location_display_is_one_based() {
        let location = Location::new(
            "main.shade",
            Range::new(0..0, Position::new(1, 0), Position::new(2, 5)),
        );
        assert_eq!(location.to_string(), "main.shade:2:1");
    }

    #[test]
    fn test_positions_across_lines() {
        let index = LineIndex::new("const a\n= 1;\n\nx");
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(7), Position::new(0, 7));
        assert_eq!(index.position(8), Position::new(1, 0));
        assert_eq!(index.position(13), Position::new(2, 0));
        assert_eq!(index.position(14), Position::new(3, 0));
    }

    #[test]
    fn test_columns_count_bytes() {
        let index = LineIndex::new("// ü\nx");
        assert_eq!(index.position(3), Position::new(0, 3));
        assert_eq!(index.position(5), Position::new(0, 5));
        assert_eq!(index.position(6), Position::new(1, 0));
    }
}

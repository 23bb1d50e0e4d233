use serde::{Deserialize, Serialize};

/// A position in the source text. The index is a byte offset, so it can be used
/// to slice the input directly; line and column are 1-based, and the column
/// counts characters rather than bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl Position {
    /// The position of the first character of any input.
    pub const START: Position = Position { index: 0, line: 1, column: 1 };

    /// Returns the position following the given text, assuming the text starts
    /// at this position.
    pub fn advance(self, text: &str) -> Position {
        let index = self.index + text.len();
        match text.rfind('\n') {
            Some(last) => Position {
                index,
                line: self.line + text.matches('\n').count(),
                column: 1 + text[last + 1..].chars().count(),
            },
            None => Position { index, line: self.line, column: self.column + text.chars().count() },
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// The source span of a token, from its first character up to (but excluding)
/// the character following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// The span of the given text starting at the given position.
    pub fn of(start: Position, text: &str) -> Self {
        Self { start, end: start.advance(text) }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.index - self.start.index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

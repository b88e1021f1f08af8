//! Positions and selections.
//!
//! All coordinates are zero-based. Columns are counted in characters (Unicode scalar values),
//! matching how [`crate::Document`] and the mode collaborators address text.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Same line, different column.
    pub const fn with_column(self, column: usize) -> Self {
        Self {
            line: self.line,
            column,
        }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Selection range.
///
/// `start <= end` always holds for selections produced by this crate. The user's anchor/head
/// order is kept in `reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Selection start position
    pub start: Position,
    /// Selection end position
    pub end: Position,
    /// `true` when the anchor sits at `end` and the head (caret) at `start`.
    #[serde(default)]
    pub reversed: bool,
    /// Marks the selection single-selection APIs treat as "the" selection.
    #[serde(default)]
    pub primary: bool,
}

impl Selection {
    /// Create a forward selection; the endpoints are ordered if needed.
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Self {
                start,
                end,
                reversed: false,
                primary: false,
            }
        } else {
            Self {
                start: end,
                end: start,
                reversed: false,
                primary: false,
            }
        }
    }

    /// Create a zero-width selection (caret).
    pub fn caret(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    /// Create a selection from anchor/head, recording the direction.
    pub fn from_anchor_head(anchor: Position, head: Position) -> Self {
        let mut selection = Self::new(anchor, head);
        selection.reversed = anchor > head;
        selection
    }

    /// Builder-style primary flag.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Builder-style direction flag.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// The fixed end of the selection.
    pub fn anchor(&self) -> Position {
        if self.reversed { self.end } else { self.start }
    }

    /// The moving end of the selection (where the caret is drawn).
    pub fn head(&self) -> Position {
        if self.reversed { self.start } else { self.end }
    }

    /// Returns `true` for a caret.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Copy of `self` with new endpoints, keeping direction and primary flags.
    pub fn with_range(&self, start: Position, end: Position) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self {
            start,
            end,
            reversed: self.reversed,
            primary: self.primary,
        }
    }
}

//! Errors of the multi-edit engine and the comment commands.

use crate::position::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the multi-edit engine.
pub enum EditError {
    #[error(
        "overlapping edits: {}:{}..{}:{} overlaps {}:{}..{}:{}",
        first.0.line, first.0.column, first.1.line, first.1.column,
        second.0.line, second.0.column, second.1.line, second.1.column
    )]
    /// Two descriptors touch the same text. The batch was rejected before any mutation.
    OverlappingEdits {
        /// Range of the edit positioned later in the document.
        first: (Position, Position),
        /// Range of the edit that overlaps it.
        second: (Position, Position),
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors surfaced by the toggle commands.
pub enum CommentError {
    #[error("edit failed: {0}")]
    /// The computed edit batch could not be applied.
    Edit(#[from] EditError),
}

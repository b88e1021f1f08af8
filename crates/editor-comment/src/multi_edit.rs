//! Batched edits with selection tracking.
//!
//! Each [`EditDescriptor`] carries the edits for one logical change plus the selections that
//! must follow it. [`do_multiple_edits`] applies a whole batch inside one atomic operation,
//! bottom-up, and re-maps every tracked selection through every edit at or before it.
//!
//! Semantics:
//! - Edits inside one descriptor are applied **in order**, each expressed in the coordinates of
//!   the document after the previous one.
//! - Edit ranges of different descriptors must not overlap (touching is fine).
//! - A tracked selection flagged `is_before_edit` is in pre-edit coordinates and is adjusted by
//!   every edit; an unflagged one is already positioned after its own descriptor's edits and is
//!   only adjusted by edits of descriptors applied after it.

use crate::buffer::{AtomicOperation, TextBuffer};
use crate::error::EditError;
use crate::position::{Position, Selection};
use std::cmp::Ordering;

/// A single replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Replacement text (may be empty).
    pub text: String,
    /// Start of the replaced range.
    pub start: Position,
    /// Exclusive end of the replaced range (equal to `start` for insertions).
    pub end: Position,
}

impl Edit {
    /// Replace `[start, end)` with `text`.
    pub fn replace(text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Insert `text` at `pos`.
    pub fn insert(text: impl Into<String>, pos: Position) -> Self {
        Self::replace(text, pos, pos)
    }

    /// Delete `[start, end)`.
    pub fn delete(start: Position, end: Position) -> Self {
        Self::replace(String::new(), start, end)
    }
}

/// A selection followed through a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedSelection {
    /// The selection.
    pub selection: Selection,
    /// `true`: pre-edit coordinates, let the engine adjust it.
    /// `false`: already placed after its own descriptor's edits.
    pub is_before_edit: bool,
}

impl TrackedSelection {
    /// A selection in pre-edit coordinates.
    pub fn before_edit(selection: Selection) -> Self {
        Self {
            selection,
            is_before_edit: true,
        }
    }

    /// A selection the builder already repositioned.
    pub fn manual(selection: Selection) -> Self {
        Self {
            selection,
            is_before_edit: false,
        }
    }
}

/// Edits plus the selections that follow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDescriptor {
    /// Edits applied in order.
    pub edits: Vec<Edit>,
    /// Selections tracked through the batch.
    pub selections: Vec<TrackedSelection>,
}

impl EditDescriptor {
    /// Create a descriptor.
    pub fn new(edits: Vec<Edit>, selections: Vec<TrackedSelection>) -> Self {
        Self { edits, selections }
    }

    /// A descriptor that changes nothing and tracks `selections` as they are.
    pub fn no_op(selections: &[Selection]) -> Self {
        Self {
            edits: Vec::new(),
            selections: selections
                .iter()
                .copied()
                .map(TrackedSelection::before_edit)
                .collect(),
        }
    }

    /// Lowest edit start.
    pub fn min_start(&self) -> Option<Position> {
        self.edits.iter().map(|e| e.start.min(e.end)).min()
    }

    /// Highest edit end.
    pub fn max_end(&self) -> Option<Position> {
        self.edits.iter().map(|e| e.start.max(e.end)).max()
    }

    fn range(&self) -> Option<(Position, Position)> {
        Some((self.min_start()?, self.max_end()?))
    }
}

/// Where `pos` ends up after `[from, to)` was replaced by `text`.
///
/// Positions before `from` are kept, positions inside `[from, to]` move to the end of the
/// inserted text, positions after `to` shift by the change's line and column delta.
pub fn adjust_pos_for_change(pos: Position, from: Position, to: Position, text: &str) -> Position {
    if pos < from {
        return pos;
    }
    let change_end = change_end(from, text);
    if pos <= to {
        return change_end;
    }
    let inserted_lines = text.matches('\n').count();
    let line = pos.line + inserted_lines - (to.line - from.line);
    let mut column = pos.column;
    if pos.line == to.line {
        column = column + change_end.column - to.column;
    }
    Position::new(line, column)
}

fn change_end(from: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(idx) => Position::new(
            from.line + text.matches('\n').count(),
            text[idx + 1..].chars().count(),
        ),
        None => Position::new(from.line, from.column + text.chars().count()),
    }
}

fn adjust_selection(sel: Selection, from: Position, to: Position, text: &str) -> Selection {
    sel.with_range(
        adjust_pos_for_change(sel.start, from, to, text),
        adjust_pos_for_change(sel.end, from, to, text),
    )
}

/// Apply a batch of descriptors atomically and return the re-mapped selections, sorted by start.
///
/// The result does not depend on the order of `descriptors`. Overlapping descriptors are
/// rejected with [`EditError::OverlappingEdits`] before the buffer is touched.
pub fn do_multiple_edits<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    mut descriptors: Vec<EditDescriptor>,
) -> Result<Vec<Selection>, EditError> {
    // Bottom-up; descriptors without edits first.
    descriptors.sort_by(|a, b| match (a.min_start(), b.min_start()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    });

    let mut later: Option<(Position, Position)> = None;
    for descriptor in &descriptors {
        let Some(range) = descriptor.range() else {
            continue;
        };
        if let Some(later_range) = later
            && range.1 > later_range.0
        {
            log::warn!(
                "rejecting edit batch: {:?} overlaps {:?}",
                later_range,
                range
            );
            return Err(EditError::OverlappingEdits {
                first: later_range,
                second: range,
            });
        }
        later = Some(range);
    }

    let edit_count: usize = descriptors.iter().map(|d| d.edits.len()).sum();
    log::debug!(
        "applying {} edits from {} descriptors",
        edit_count,
        descriptors.len()
    );

    {
        let mut op = AtomicOperation::new(buffer);
        for current in 0..descriptors.len() {
            let edits = std::mem::take(&mut descriptors[current].edits);
            for edit in &edits {
                let from = op.clip_position(edit.start.min(edit.end));
                let to = op.clip_position(edit.start.max(edit.end));
                op.replace_range(&edit.text, from, to);

                for (index, descriptor) in descriptors.iter_mut().enumerate() {
                    let applied = index < current;
                    for tracked in &mut descriptor.selections {
                        if tracked.is_before_edit || applied {
                            tracked.selection =
                                adjust_selection(tracked.selection, from, to, &edit.text);
                        }
                    }
                }
            }
            descriptors[current].edits = edits;
        }
    }

    let mut selections: Vec<Selection> = descriptors
        .into_iter()
        .flat_map(|d| d.selections)
        .map(|t| t.selection)
        .collect();
    selections.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));
    Ok(selections)
}

//! Line-granular views of a selection set.

use crate::position::{Position, Selection};

/// A line-expanded range plus the original selections it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSelection {
    /// Whole-line range the edit builders work on. `end` is column 0 of the line after the
    /// last covered line (which may be one past the last document line).
    pub selection_for_edit: Selection,
    /// Original selections, in input order, tracked through the edit.
    pub selections_to_track: Vec<Selection>,
}

/// Options of [`convert_to_line_selections`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelectionOptions {
    /// Expand a non-empty selection ending at column 0 to include that line too.
    pub expand_end_at_start_of_line: bool,
    /// Merge ranges that touch (one ends on the line where the next starts).
    pub merge_adjacent: bool,
}

impl Default for LineSelectionOptions {
    fn default() -> Self {
        Self {
            expand_end_at_start_of_line: false,
            merge_adjacent: true,
        }
    }
}

/// Expand each selection to whole lines, merging the ones whose line ranges collide.
///
/// `selections` must be sorted by start.
pub fn convert_to_line_selections(
    selections: &[Selection],
    options: LineSelectionOptions,
) -> Vec<LineSelection> {
    let mut groups: Vec<LineSelection> = Vec::new();

    for sel in selections {
        let start = Position::new(sel.start.line, 0);
        let end = if sel.end.column == 0 && !sel.is_empty() && !options.expand_end_at_start_of_line
        {
            sel.end
        } else {
            Position::new(sel.end.line + 1, 0)
        };

        if let Some(last) = groups.last_mut() {
            let prev_end = last.selection_for_edit.end;
            let touches = start.line < prev_end.line
                || (options.merge_adjacent && start.line == prev_end.line);
            if touches {
                let merged_end = prev_end.max(end);
                let primary = last.selection_for_edit.primary || sel.primary;
                last.selection_for_edit = Selection {
                    start: last.selection_for_edit.start,
                    end: merged_end,
                    reversed: false,
                    primary,
                };
                last.selections_to_track.push(*sel);
                continue;
            }
        }

        groups.push(LineSelection {
            selection_for_edit: Selection {
                start,
                end,
                reversed: false,
                primary: sel.primary,
            },
            selections_to_track: vec![*sel],
        });
    }

    groups
}

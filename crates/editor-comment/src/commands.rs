//! Command Interface Layer
//!
//! The two user-facing commands, `toggleLineComment` and `toggleBlockComment`. Both operate on
//! the buffer's whole selection set, compute one [`EditDescriptor`] per selection (or line
//! group), merge descriptors that edit the same comment, apply them through
//! [`do_multiple_edits`], and write the re-mapped selections back.
//!
//! # Example
//!
//! ```rust
//! use editor_comment::{
//!     CommentCommand, CommentOptions, Document, Position, execute_comment_command,
//! };
//! use editor_comment_modes::ModeRegistry;
//!
//! let registry = ModeRegistry::with_builtins();
//! let mut doc = Document::new("let a = 1;\nlet b = 2;");
//! doc.set_selection(Position::new(0, 0), Position::new(1, 3));
//!
//! let modes = registry.analyze("javascript", &doc).unwrap();
//! execute_comment_command(
//!     CommentCommand::ToggleLineComment,
//!     &mut doc,
//!     &modes,
//!     &CommentOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(doc.text(), "//let a = 1;\n//let b = 2;");
//! ```

use crate::block_comment::{BlockCommentBuilder, BlockOutcome};
use crate::buffer::TextBuffer;
use crate::error::CommentError;
use crate::line_comment::line_comment_edit;
use crate::mode::LanguageModes;
use crate::multi_edit::{EditDescriptor, do_multiple_edits};
use crate::position::{Position, Selection};
use crate::selection_set::{LineSelection, LineSelectionOptions, convert_to_line_selections};
use crate::syntax::{CommentOptions, CommentSyntaxResolver};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The comment commands a host registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentCommand {
    /// Comment or uncomment whole lines.
    ToggleLineComment,
    /// Wrap the selection in a block comment, or unwrap the block around it.
    ToggleBlockComment,
}

impl CommentCommand {
    /// All commands, in registration order.
    pub const ALL: [CommentCommand; 2] = [Self::ToggleLineComment, Self::ToggleBlockComment];

    /// Stable command id.
    pub fn id(&self) -> &'static str {
        match self {
            Self::ToggleLineComment => "toggleLineComment",
            Self::ToggleBlockComment => "toggleBlockComment",
        }
    }

    /// Look a command up by id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

impl fmt::Display for CommentCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Run `command` against `buffer`.
pub fn execute_comment_command(
    command: CommentCommand,
    buffer: &mut dyn TextBuffer,
    modes: &dyn LanguageModes,
    options: &CommentOptions,
) -> Result<(), CommentError> {
    log::debug!("executing {command}");
    match command {
        CommentCommand::ToggleLineComment => toggle_line_comment(buffer, modes, options),
        CommentCommand::ToggleBlockComment => toggle_block_comment(buffer, modes, options),
    }
}

/// Toggle line comments on every line touched by a selection.
///
/// Languages without line comment syntax fall back to wrapping each line group in a block.
pub fn toggle_line_comment(
    buffer: &mut dyn TextBuffer,
    modes: &dyn LanguageModes,
    options: &CommentOptions,
) -> Result<(), CommentError> {
    let selections = sorted_selections(&*buffer);
    if selections.is_empty() {
        return Ok(());
    }
    let line_sels = convert_to_line_selections(
        &selections,
        LineSelectionOptions {
            expand_end_at_start_of_line: false,
            merge_adjacent: false,
        },
    );
    let pending = line_descriptors(&*buffer, modes, options, &line_sels);
    apply(buffer, pending)
}

/// Toggle a block comment around every selection.
///
/// Languages without block comment syntax fall back to line comments, as do selections that
/// only cover line comments.
pub fn toggle_block_comment(
    buffer: &mut dyn TextBuffer,
    modes: &dyn LanguageModes,
    options: &CommentOptions,
) -> Result<(), CommentError> {
    let selections = sorted_selections(&*buffer);
    if selections.is_empty() {
        return Ok(());
    }

    let resolver = CommentSyntaxResolver::new(modes, options);
    let mut pending = Vec::with_capacity(selections.len());
    let mut delegated: Vec<Selection> = Vec::new();

    for sel in &selections {
        let Some(syntax) = resolver.resolve_range(sel.start, sel.end) else {
            pending.push(Pending::no_op(&[*sel]));
            continue;
        };
        match &syntax.block {
            Some((prefix, suffix)) => {
                let builder = BlockCommentBuilder::new(
                    &*buffer,
                    modes,
                    (prefix.as_str(), suffix.as_str()),
                    &syntax.line_prefixes,
                    CommentCommand::ToggleBlockComment,
                    options,
                );
                match builder.edit(sel, &[*sel]) {
                    BlockOutcome::Edit(descriptor) => {
                        pending.push(Pending::new(descriptor, &[*sel]))
                    }
                    BlockOutcome::LineUncomment => delegated.push(*sel),
                }
            }
            None if syntax.has_line() => delegated.push(*sel),
            None => pending.push(Pending::no_op(&[*sel])),
        }
    }

    if !delegated.is_empty() {
        let line_sels = convert_to_line_selections(
            &delegated,
            LineSelectionOptions {
                expand_end_at_start_of_line: false,
                merge_adjacent: true,
            },
        );
        pending.extend(line_descriptors(&*buffer, modes, options, &line_sels));
    }

    apply(buffer, pending)
}

fn sorted_selections(buffer: &dyn TextBuffer) -> Vec<Selection> {
    let mut selections = buffer.selections();
    selections.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));
    selections
}

/// A descriptor and the selections it was built from.
struct Pending {
    descriptor: EditDescriptor,
    origin: Vec<Selection>,
}

impl Pending {
    fn new(descriptor: EditDescriptor, origin: &[Selection]) -> Self {
        Self {
            descriptor,
            origin: origin.to_vec(),
        }
    }

    fn no_op(origin: &[Selection]) -> Self {
        Self::new(EditDescriptor::no_op(origin), origin)
    }

    fn range(&self) -> Option<(Position, Position)> {
        Some((self.descriptor.min_start()?, self.descriptor.max_end()?))
    }
}

/// Whether the engine would reject `a` and `b` as overlapping, whatever their order.
fn conflicts(a: (Position, Position), b: (Position, Position)) -> bool {
    if a.0 == b.0 {
        return a.1 > a.0 || b.1 > b.0;
    }
    let (first, second) = if a.0 < b.0 { (a, b) } else { (b, a) };
    first.1 > second.0
}

/// Merge descriptors that make the same edits (several cursors in one comment) and turn any
/// descriptor that still collides with an earlier one into a no-op for its selections.
fn coalesce(pending: Vec<Pending>) -> Vec<EditDescriptor> {
    let mut merged: Vec<Pending> = Vec::with_capacity(pending.len());
    for item in pending {
        if !item.descriptor.edits.is_empty()
            && let Some(existing) = merged
                .iter_mut()
                .find(|other| other.descriptor.edits == item.descriptor.edits)
        {
            existing.descriptor.selections.extend(item.descriptor.selections);
            existing.origin.extend(item.origin);
            continue;
        }
        merged.push(item);
    }

    let mut claimed: Vec<(Position, Position)> = Vec::with_capacity(merged.len());
    merged
        .into_iter()
        .map(|item| {
            let Some(range) = item.range() else {
                return item.descriptor;
            };
            if claimed.iter().any(|&other| conflicts(other, range)) {
                log::debug!("comment edit at {range:?} collides with another selection, skipped");
                return EditDescriptor::no_op(&item.origin);
            }
            claimed.push(range);
            item.descriptor
        })
        .collect()
}

fn line_descriptors(
    buffer: &dyn TextBuffer,
    modes: &dyn LanguageModes,
    options: &CommentOptions,
    line_sels: &[LineSelection],
) -> Vec<Pending> {
    let resolver = CommentSyntaxResolver::new(modes, options);
    line_sels
        .iter()
        .map(|line_sel| {
            let range = &line_sel.selection_for_edit;
            let tracked = &line_sel.selections_to_track;
            let Some(syntax) = resolver.resolve_range(range.start, range.end) else {
                return Pending::no_op(tracked);
            };
            let block = syntax
                .block
                .as_ref()
                .map(|(start, end)| (start.as_str(), end.as_str()));

            if syntax.has_line() {
                let descriptor =
                    line_comment_edit(buffer, &syntax.line_prefixes, block, line_sel, options);
                return Pending::new(descriptor, tracked);
            }
            let Some(block) = block else {
                return Pending::no_op(tracked);
            };
            let builder = BlockCommentBuilder::new(
                buffer,
                modes,
                block,
                &syntax.line_prefixes,
                CommentCommand::ToggleLineComment,
                options,
            );
            match builder.edit(range, tracked) {
                BlockOutcome::Edit(descriptor) => Pending::new(descriptor, tracked),
                // Without line syntax there is nothing to uncomment line by line.
                BlockOutcome::LineUncomment => Pending::no_op(tracked),
            }
        })
        .collect()
}

fn apply(buffer: &mut dyn TextBuffer, pending: Vec<Pending>) -> Result<(), CommentError> {
    let selections = do_multiple_edits(&mut *buffer, coalesce(pending))?;
    buffer.set_selections(selections);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi_edit::{Edit, TrackedSelection};
    use pretty_assertions::assert_eq;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_command_ids_round_trip() {
        for command in CommentCommand::ALL {
            assert_eq!(CommentCommand::from_id(command.id()), Some(command));
        }
        assert_eq!(CommentCommand::from_id("toggleFold"), None);
        assert_eq!(
            CommentCommand::ToggleBlockComment.to_string(),
            "toggleBlockComment"
        );
    }

    #[test]
    fn test_command_serializes_as_id() {
        let json = serde_json::to_string(&CommentCommand::ToggleLineComment).unwrap();
        assert_eq!(json, "\"toggleLineComment\"");
    }

    #[test]
    fn test_coalesce_merges_identical_edits() {
        let edits = vec![
            Edit::delete(pos(0, 10), pos(0, 12)),
            Edit::delete(pos(0, 4), pos(0, 6)),
        ];
        let first = Selection::caret(pos(0, 7));
        let second = Selection::caret(pos(0, 9));
        let pending = [first, second]
            .iter()
            .map(|sel| {
                let tracked = vec![TrackedSelection::before_edit(*sel)];
                Pending::new(EditDescriptor::new(edits.clone(), tracked), &[*sel])
            })
            .collect();

        let descriptors = coalesce(pending);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].edits, edits);
        assert_eq!(descriptors[0].selections.len(), 2);
    }

    #[test]
    fn test_coalesce_turns_collisions_into_no_ops() {
        let kept = Selection::new(pos(0, 0), pos(0, 4));
        let dropped = Selection::new(pos(0, 2), pos(0, 6));
        let pending = vec![
            Pending::new(
                EditDescriptor::new(vec![Edit::delete(pos(0, 0), pos(0, 4))], Vec::new()),
                &[kept],
            ),
            Pending::new(
                EditDescriptor::new(
                    vec![Edit::insert("*/", pos(0, 6)), Edit::insert("/*", pos(0, 2))],
                    vec![TrackedSelection::manual(dropped)],
                ),
                &[dropped],
            ),
        ];

        let descriptors = coalesce(pending);
        assert_eq!(descriptors[0].edits.len(), 1);
        assert_eq!(descriptors[1], EditDescriptor::no_op(&[dropped]));
    }

    #[test]
    fn test_conflicts_matches_engine_overlap_rule() {
        // Touching ranges and shared insertion points are fine.
        assert!(!conflicts((pos(0, 0), pos(0, 3)), (pos(0, 3), pos(0, 6))));
        assert!(!conflicts((pos(0, 2), pos(0, 2)), (pos(0, 2), pos(0, 2))));
        assert!(conflicts((pos(0, 0), pos(0, 4)), (pos(0, 3), pos(0, 6))));
        assert!(conflicts((pos(1, 0), pos(1, 0)), (pos(1, 0), pos(2, 0))));
    }
}

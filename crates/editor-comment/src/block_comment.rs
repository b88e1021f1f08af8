//! Block comment toggling for one selection.
//!
//! Classification walks tokens with a [`TokenCursor`] starting at the selection:
//!
//! - no comment token inside the selection: wrap the selection in a new block;
//! - inside a block comment: remove its delimiters (or do nothing when the selection reaches
//!   into a second block);
//! - inside line comments only: hand the lines to the line builder
//!   ([`BlockOutcome::LineUncomment`]).

use crate::buffer::{TextBuffer, first_non_whitespace, is_blank, leading_whitespace};
use crate::commands::CommentCommand;
use crate::line_comment::LinePrefixes;
use crate::mode::LanguageModes;
use crate::multi_edit::{Edit, EditDescriptor, TrackedSelection};
use crate::position::{Position, Selection};
use crate::syntax::CommentOptions;
use crate::token_cursor::TokenCursor;

/// Upper bound on tokens examined while deciding whether a line comment sits inside a block
/// whose start and end delimiters are identical.
pub const MAX_AMBIGUITY_STEPS: usize = 1000;

/// Result of [`BlockCommentBuilder::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Apply this descriptor (possibly without edits).
    Edit(EditDescriptor),
    /// Every line of the selection is blank or line-commented; uncomment them as lines.
    LineUncomment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockContext {
    Inside,
    Outside,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    CanComment,
    Invalid,
    LineUncomment,
    Uncomment {
        prefix: Position,
        suffix: Option<Position>,
    },
}

/// Builds block comment edits for one language context.
pub struct BlockCommentBuilder<'a> {
    buffer: &'a dyn TextBuffer,
    modes: &'a dyn LanguageModes,
    prefix: &'a str,
    suffix: &'a str,
    line_prefixes: &'a [String],
    command: CommentCommand,
    options: &'a CommentOptions,
}

impl<'a> BlockCommentBuilder<'a> {
    /// Create a builder for the block delimiters `prefix`/`suffix`.
    ///
    /// `line_prefixes` (possibly empty) let the builder recognize line comments; `command`
    /// tells whether it runs for the line command's block fallback.
    pub fn new(
        buffer: &'a dyn TextBuffer,
        modes: &'a dyn LanguageModes,
        (prefix, suffix): (&'a str, &'a str),
        line_prefixes: &'a [String],
        command: CommentCommand,
        options: &'a CommentOptions,
    ) -> Self {
        Self {
            buffer,
            modes,
            prefix,
            suffix,
            line_prefixes,
            command,
            options,
        }
    }

    /// Decide and build the edit for `sel`, carrying `tracked` through it.
    pub fn edit(&self, sel: &Selection, tracked: &[Selection]) -> BlockOutcome {
        let end = self.buffer.clip_position(sel.end);
        let sel = sel.with_range(sel.start, end);

        match self.classify(&sel) {
            Classification::Invalid => {
                log::debug!("block comment: selection spans several comments, no-op");
                BlockOutcome::Edit(EditDescriptor::no_op(tracked))
            }
            Classification::LineUncomment => {
                log::debug!("block comment: line comment region, delegating");
                BlockOutcome::LineUncomment
            }
            Classification::CanComment => {
                log::debug!(
                    "block comment: commenting {}:{}..{}:{}",
                    sel.start.line,
                    sel.start.column,
                    sel.end.line,
                    sel.end.column
                );
                BlockOutcome::Edit(self.comment(&sel, tracked))
            }
            Classification::Uncomment { prefix, suffix } => {
                log::debug!("block comment: uncommenting block at {prefix:?} .. {suffix:?}");
                BlockOutcome::Edit(self.uncomment(prefix, suffix, tracked))
            }
        }
    }

    fn indent_line_command(&self) -> bool {
        self.options.indent && self.command == CommentCommand::ToggleLineComment
    }

    fn line_text(&self, line: usize) -> String {
        self.buffer.line(line).unwrap_or_default()
    }

    fn classify(&self, sel: &Selection) -> Classification {
        let line_exps = LinePrefixes::new(self.line_prefixes, Some((self.prefix, self.suffix)));
        let mut cursor = TokenCursor::new(self.buffer, self.modes, sel.start);
        // A closed block ending exactly at the start of a non-empty selection is outside of it.
        let bare_delimiter =
            self.prefix == self.suffix && cursor.token().text.trim() == self.prefix;
        if !sel.is_empty()
            && cursor.token_end() == sel.start
            && self.suffix_at(&cursor).is_some()
            && !bare_delimiter
            && (!cursor.move_next() || cursor.token_start() >= sel.end)
        {
            return Classification::CanComment;
        }
        let mut comment_at_start = true;
        let mut found = true;

        if cursor.token().is_whitespace() {
            found = cursor.move_next_skipping_whitespace() && {
                let start = cursor.token_start();
                start < sel.end || (sel.is_empty() && start.line == sel.end.line)
            };
        }
        while found && !cursor.token().is_comment() {
            found = cursor.move_next_skipping_whitespace() && cursor.token_start() < sel.end;
            comment_at_start = false;
        }
        if !found {
            return Classification::CanComment;
        }

        let is_block = if line_exps.is_match(&cursor.token().text) {
            if comment_at_start && cursor.token_starts_line_content() {
                match self.context_before(&cursor, &line_exps) {
                    BlockContext::Inside => true,
                    BlockContext::Outside => false,
                    BlockContext::Unknown => return Classification::CanComment,
                }
            } else {
                false
            }
        } else {
            true
        };

        if is_block {
            return self.locate_block(cursor, sel, &line_exps);
        }

        let mut end_line = sel.end.line;
        if sel.end.column == 0 && !sel.is_empty() && sel.end.line > sel.start.line {
            end_line -= 1;
        }
        let all_line_comments = (sel.start.line..=end_line).all(|line| {
            let text = self.line_text(line);
            is_blank(&text) || line_exps.is_match(&text)
        });
        if all_line_comments {
            Classification::LineUncomment
        } else {
            Classification::CanComment
        }
    }

    /// Whether the text just before the cursor's token is inside a block comment.
    fn context_before(&self, origin: &TokenCursor<'_>, line_exps: &LinePrefixes) -> BlockContext {
        let identical = self.prefix == self.suffix;
        let mut cursor = origin.clone();
        let mut flipped = false;
        let resolve = |inside: bool, flipped: bool| {
            if inside != flipped {
                BlockContext::Inside
            } else {
                BlockContext::Outside
            }
        };

        for _ in 0..MAX_AMBIGUITY_STEPS {
            if !cursor.move_prev_skipping_whitespace() {
                return resolve(false, flipped);
            }
            let token = cursor.token();
            if !token.is_comment() {
                return resolve(false, flipped);
            }
            if line_exps.is_match(&token.text) {
                continue;
            }
            let text = token.text.trim();
            if identical && text == self.prefix {
                flipped = !flipped;
                continue;
            }
            if text.ends_with(self.suffix) {
                return resolve(false, flipped);
            }
            // An opener or a continuation line of a block.
            return resolve(true, flipped);
        }
        log::debug!("block comment: ambiguity limit reached at line {}", origin.pos().line);
        BlockContext::Unknown
    }

    fn prefix_at(&self, cursor: &TokenCursor<'_>) -> Option<Position> {
        let token = cursor.token();
        if !token.is_comment() {
            return None;
        }
        let trimmed = token.text.trim_start();
        if !trimmed.starts_with(self.prefix) {
            return None;
        }
        let offset = token.text.chars().count() - trimmed.chars().count();
        Some(Position::new(cursor.pos().line, token.start + offset))
    }

    fn suffix_at(&self, cursor: &TokenCursor<'_>) -> Option<Position> {
        let token = cursor.token();
        if !token.is_comment() {
            return None;
        }
        let trimmed = token.text.trim_end();
        if !trimmed.ends_with(self.suffix) {
            return None;
        }
        let end = token.start + trimmed.chars().count();
        Some(Position::new(
            cursor.pos().line,
            end - self.suffix.chars().count(),
        ))
    }

    fn find_prefix(&self, mut cursor: TokenCursor<'_>, skip_current: bool) -> Option<Position> {
        if skip_current && !cursor.move_prev_skipping_whitespace() {
            return None;
        }
        loop {
            if let Some(pos) = self.prefix_at(&cursor) {
                return Some(pos);
            }
            if !cursor.move_prev_skipping_whitespace() {
                return None;
            }
        }
    }

    fn find_suffix<'c>(
        &self,
        mut cursor: TokenCursor<'c>,
        skip_current: bool,
    ) -> Option<(Position, TokenCursor<'c>)> {
        if skip_current && !cursor.move_next_skipping_whitespace() {
            return None;
        }
        loop {
            if let Some(pos) = self.suffix_at(&cursor) {
                return Some((pos, cursor));
            }
            if !cursor.move_next_skipping_whitespace() {
                return None;
            }
        }
    }

    fn locate_block(
        &self,
        origin: TokenCursor<'_>,
        sel: &Selection,
        line_exps: &LinePrefixes,
    ) -> Classification {
        let bare_origin = self.prefix == self.suffix && origin.token().text.trim() == self.prefix;

        let (prefix, suffix) = if bare_origin {
            if self.context_before(&origin, line_exps) == BlockContext::Inside {
                // The delimiter under the cursor closes the block.
                let suffix = self.suffix_at(&origin).map(|pos| (pos, origin.clone()));
                (self.find_prefix(origin, true), suffix)
            } else {
                (self.prefix_at(&origin), self.find_suffix(origin, true))
            }
        } else {
            (
                self.find_prefix(origin.clone(), false),
                self.find_suffix(origin, false),
            )
        };

        let Some(prefix) = prefix else {
            return Classification::Invalid;
        };

        let suffix = match suffix {
            Some((pos, mut cursor)) => {
                while cursor.move_next_skipping_whitespace() && cursor.token_start() < sel.end {
                    if self.prefix_at(&cursor).is_some() {
                        return Classification::Invalid;
                    }
                }
                Some(pos)
            }
            None => None,
        };

        let suffix_end =
            suffix.map(|pos| pos.with_column(pos.column + self.suffix.chars().count()));
        let after_suffix = |end: Position| sel.start > end || (!sel.is_empty() && sel.start == end);
        if suffix_end.is_some_and(after_suffix) || sel.end < prefix {
            return Classification::CanComment;
        }
        Classification::Uncomment { prefix, suffix }
    }

    fn comment(&self, sel: &Selection, tracked: &[Selection]) -> EditDescriptor {
        let prefix = self.prefix;
        let suffix = self.suffix;
        let padding = self.options.padding.as_str();
        let indent_line = self.indent_line_command();
        let complete_line =
            sel.start.column == 0 && sel.end.column == 0 && sel.start.line < sel.end.line;
        let start_text = self.line_text(sel.start.line);
        let start_ch = first_non_whitespace(&start_text);
        let settings = self.buffer.indent_settings();

        let mut edits = Vec::with_capacity(2);
        let mut start_indent_len = 0;
        let insert_point;
        let prefix_len;
        let suffix_len;

        if complete_line {
            if indent_line {
                let last_text = self.line_text(sel.end.line - 1);
                let end_indent =
                    settings.render(settings.visual_width(leading_whitespace(&last_text)));
                let start_indent =
                    settings.render(settings.visual_width(leading_whitespace(&start_text)));
                start_indent_len = start_indent.chars().count();
                edits.push(Edit::insert(
                    format!("{end_indent}{suffix}\n"),
                    Position::new(sel.end.line, 0),
                ));
                edits.push(Edit::insert(
                    format!("{prefix}\n{start_indent}"),
                    Position::new(sel.start.line, start_ch),
                ));
            } else {
                edits.push(Edit::insert(format!("{suffix}\n"), sel.end));
                edits.push(Edit::insert(format!("{prefix}\n"), sel.start));
            }
            insert_point = sel.start;
            prefix_len = 0;
            suffix_len = 0;
        } else {
            insert_point = if indent_line {
                Position::new(sel.start.line, start_ch)
            } else {
                sel.start
            };
            let opening = format!("{prefix}{padding}");
            let closing = format!("{padding}{suffix}");
            prefix_len = opening.chars().count();
            suffix_len = closing.chars().count();
            edits.push(Edit::insert(closing, sel.end));
            edits.push(Edit::insert(opening, insert_point));
        }

        let fix = |pos: Position| -> Position {
            let mut out = pos;
            if pos > sel.end {
                if complete_line {
                    out.line += 1;
                } else if pos.line == sel.end.line {
                    out.column += suffix_len;
                }
            }
            if complete_line {
                if pos >= sel.start {
                    if indent_line && pos.line == sel.start.line && pos.column >= start_ch {
                        out.column = pos.column - start_ch + start_indent_len;
                    }
                    out.line += 1;
                }
            } else if pos.line == insert_point.line && pos >= insert_point {
                out.column += prefix_len;
            }
            out
        };

        let selections = tracked
            .iter()
            .map(|t| TrackedSelection::manual(t.with_range(fix(t.start), fix(t.end))))
            .collect();
        EditDescriptor::new(edits, selections)
    }

    fn uncomment(
        &self,
        prefix_pos: Position,
        suffix_pos: Option<Position>,
        tracked: &[Selection],
    ) -> EditDescriptor {
        let prefix_len = self.prefix.chars().count();
        let suffix_len = self.suffix.chars().count();
        let padding = self.options.padding.as_str();
        let pad_len = padding.chars().count();
        let indent = self.options.indent;

        let prefix_line = self.line_text(prefix_pos.line);
        let prefix_alone = prefix_line.trim() == self.prefix;
        let prefix_at_start = prefix_pos.column == 0 && prefix_alone;
        let prefix_indented = indent && prefix_alone;

        let after_prefix: String = prefix_line
            .chars()
            .skip(prefix_pos.column + prefix_len)
            .collect();
        let mut prefix_pad = if pad_len > 0 && after_prefix.starts_with(padding) {
            pad_len
        } else {
            0
        };
        let prefix_end = prefix_pos.with_column(prefix_pos.column + prefix_len);

        let mut edits = Vec::with_capacity(2);
        let mut suffix_at_start = false;

        if let Some(suffix_pos) = suffix_pos {
            let suffix_line = self.line_text(suffix_pos.line);
            let suffix_alone = suffix_line.trim() == self.suffix;
            suffix_at_start = suffix_pos.column == 0 && suffix_alone;
            let suffix_indented = indent && suffix_alone;

            // Padding is shared when prefix and suffix are adjacent.
            if suffix_pos.line == prefix_pos.line
                && prefix_end.column + prefix_pad > suffix_pos.column
            {
                prefix_pad = suffix_pos.column.saturating_sub(prefix_end.column);
            }

            let edit = if suffix_indented {
                Edit::delete(
                    Position::new(suffix_pos.line, 0),
                    Position::new(suffix_pos.line + 1, 0),
                )
            } else if prefix_at_start && suffix_at_start {
                Edit::delete(suffix_pos, Position::new(suffix_pos.line + 1, 0))
            } else {
                let before_suffix: String = suffix_line.chars().take(suffix_pos.column).collect();
                let reserved = if suffix_pos.line == prefix_pos.line {
                    prefix_end.column + prefix_pad
                } else {
                    0
                };
                let suffix_pad = if pad_len > 0
                    && before_suffix.ends_with(padding)
                    && suffix_pos.column >= reserved + pad_len
                {
                    pad_len
                } else {
                    0
                };
                Edit::delete(
                    suffix_pos.with_column(suffix_pos.column - suffix_pad),
                    suffix_pos.with_column(suffix_pos.column + suffix_len),
                )
            };
            edits.push(edit);
        }

        let edit = if prefix_indented {
            Edit::delete(
                Position::new(prefix_pos.line, 0),
                Position::new(prefix_pos.line + 1, 0),
            )
        } else if prefix_at_start && suffix_at_start {
            Edit::delete(prefix_pos, Position::new(prefix_pos.line + 1, 0))
        } else {
            Edit::delete(prefix_pos, prefix_end.with_column(prefix_end.column + prefix_pad))
        };
        edits.push(edit);

        EditDescriptor::new(
            edits,
            tracked
                .iter()
                .copied()
                .map(TrackedSelection::before_edit)
                .collect(),
        )
    }
}

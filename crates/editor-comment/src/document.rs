//! In-memory reference buffer.
//!
//! [`Document`] stores text in a [`ropey::Rope`] (O(log n) line access and char/line
//! conversion), keeps a multi-selection set, and groups edits made inside one atomic
//! operation into a single undo step and a single change notification.

use crate::buffer::{IndentSettings, TextBuffer};
use crate::position::{Position, Selection};
use ropey::Rope;

#[derive(Debug, Clone)]
struct TextEdit {
    start: usize,
    deleted_text: String,
    inserted_text: String,
}

#[derive(Debug, Clone)]
struct UndoGroup {
    edits: Vec<TextEdit>,
    before_selections: Vec<Selection>,
}

/// A rope-backed text buffer with selections and grouped undo.
///
/// # Example
///
/// ```rust
/// use editor_comment::{Document, Position, TextBuffer};
///
/// let mut doc = Document::new("Hello\nWorld");
/// doc.replace_range("Big ", Position::new(1, 0), Position::new(1, 0));
/// assert_eq!(doc.text(), "Hello\nBig World");
/// assert!(doc.undo());
/// assert_eq!(doc.text(), "Hello\nWorld");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    selections: Vec<Selection>,
    indent: IndentSettings,
    operation_depth: usize,
    pending: Option<UndoGroup>,
    undo_stack: Vec<UndoGroup>,
    version: u64,
    change_notifications: usize,
}

impl Document {
    /// Create a document with a single caret at the start.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selections: vec![Selection::caret(Position::new(0, 0)).primary()],
            indent: IndentSettings::default(),
            operation_depth: 0,
            pending: None,
            undo_stack: Vec::new(),
            version: 0,
            change_notifications: 0,
        }
    }

    /// Builder-style indentation settings.
    pub fn with_indent_settings(mut self, indent: IndentSettings) -> Self {
        self.indent = indent;
        self
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Incremented once per completed outermost operation that changed text.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of change notifications fired so far.
    pub fn change_notifications(&self) -> usize {
        self.change_notifications
    }

    /// Number of undo groups.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// The primary selection (the first one if none is flagged).
    pub fn primary_selection(&self) -> Option<Selection> {
        self.selections
            .iter()
            .find(|s| s.primary)
            .or_else(|| self.selections.first())
            .copied()
    }

    /// Replace the selection set with a single caret.
    pub fn set_cursor(&mut self, pos: Position) {
        self.set_selections(vec![Selection::caret(pos).primary()]);
    }

    /// Replace the selection set with a single selection.
    pub fn set_selection(&mut self, start: Position, end: Position) {
        self.set_selections(vec![Selection::new(start, end).primary()]);
    }

    /// Revert the last undo group and restore the selections it started from.
    pub fn undo(&mut self) -> bool {
        let Some(group) = self.undo_stack.pop() else {
            return false;
        };
        for edit in group.edits.iter().rev() {
            let inserted_len = edit.inserted_text.chars().count();
            if inserted_len > 0 {
                self.rope.remove(edit.start..edit.start + inserted_len);
            }
            if !edit.deleted_text.is_empty() {
                self.rope.insert(edit.start, &edit.deleted_text);
            }
        }
        self.selections = group.before_selections;
        self.notify_change();
        true
    }

    fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }

    fn notify_change(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.change_notifications += 1;
    }

    fn finish_group(&mut self) {
        if let Some(group) = self.pending.take()
            && !group.edits.is_empty()
        {
            self.undo_stack.push(group);
            self.notify_change();
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer for Document {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        // Rope's line() includes the line break.
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    fn text_range(&self, start: Position, end: Position) -> String {
        let start = self.index_from_pos(start);
        let end = self.index_from_pos(end);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn replace_range(&mut self, text: &str, start: Position, end: Position) {
        let mut start = self.index_from_pos(start);
        let mut end = self.index_from_pos(end);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        if start == end && text.is_empty() {
            return;
        }

        let deleted_text = self.rope.slice(start..end).to_string();
        if end > start {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }

        let selections = self.selections.clone();
        let group = self.pending.get_or_insert_with(|| UndoGroup {
            edits: Vec::new(),
            before_selections: selections,
        });
        group.edits.push(TextEdit {
            start,
            deleted_text,
            inserted_text: text.to_string(),
        });

        if self.operation_depth == 0 {
            self.finish_group();
        }
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, mut selections: Vec<Selection>) {
        for sel in &mut selections {
            let start = self.clip_position(sel.start);
            let end = self.clip_position(sel.end);
            *sel = sel.with_range(start, end);
        }
        selections.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));
        if !selections.is_empty() && !selections.iter().any(|s| s.primary) {
            let last = selections.len() - 1;
            selections[last].primary = true;
        }
        self.selections = selections;
    }

    fn index_from_pos(&self, pos: Position) -> usize {
        let pos = self.clip_position(pos);
        self.line_start(pos.line) + pos.column
    }

    fn pos_from_index(&self, index: usize) -> Position {
        let index = index.min(self.rope.len_chars());
        let line = self.rope.char_to_line(index);
        let column = (index - self.line_start(line)).min(self.line_len(line));
        Position::new(line, column)
    }

    fn clip_position(&self, pos: Position) -> Position {
        let last = self.rope.len_lines().saturating_sub(1);
        if pos.line > last {
            return Position::new(last, self.line_len(last));
        }
        Position::new(pos.line, pos.column.min(self.line_len(pos.line)))
    }

    fn begin_operation(&mut self) {
        self.operation_depth += 1;
    }

    fn end_operation(&mut self) {
        self.operation_depth = self.operation_depth.saturating_sub(1);
        if self.operation_depth == 0 {
            self.finish_group();
        }
    }

    fn indent_settings(&self) -> IndentSettings {
        self.indent
    }
}

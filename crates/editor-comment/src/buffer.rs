//! The text buffer collaborator.
//!
//! The comment commands never own text. They read lines, replace ranges and get/set selections
//! through [`TextBuffer`], which a host editor implements on top of its own storage.
//! [`crate::Document`] is the in-crate reference implementation.

use crate::position::{Position, Selection};
use std::ops::{Deref, DerefMut};

/// Indentation preferences of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentSettings {
    /// Indent with `'\t'` instead of spaces.
    pub use_tabs: bool,
    /// Visual width of a tab stop.
    pub tab_width: usize,
}

impl Default for IndentSettings {
    fn default() -> Self {
        Self {
            use_tabs: false,
            tab_width: 4,
        }
    }
}

impl IndentSettings {
    /// Visual width of a run of leading whitespace.
    pub fn visual_width(&self, whitespace: &str) -> usize {
        let tab_width = self.tab_width.max(1);
        whitespace.chars().fold(0, |width, ch| match ch {
            '\t' => (width / tab_width + 1) * tab_width,
            _ => width + 1,
        })
    }

    /// Render indentation of the given visual width using these settings.
    pub fn render(&self, width: usize) -> String {
        if self.use_tabs {
            let tab_width = self.tab_width.max(1);
            let mut out = "\t".repeat(width / tab_width);
            out.push_str(&" ".repeat(width % tab_width));
            out
        } else {
            " ".repeat(width)
        }
    }
}

/// Operations the comment engine needs from a text buffer.
///
/// Positions passed to [`TextBuffer::replace_range`] may lie past the end of a line or of the
/// document; implementations clip them like [`TextBuffer::clip_position`] does.
pub trait TextBuffer {
    /// Number of logical lines (an empty document has one line).
    fn line_count(&self) -> usize;

    /// Text of a line without its line terminator.
    fn line(&self, line: usize) -> Option<String>;

    /// Text in the half-open range `[start, end)`.
    fn text_range(&self, start: Position, end: Position) -> String;

    /// Replace `[start, end)` with `text`, recording one undo entry.
    fn replace_range(&mut self, text: &str, start: Position, end: Position);

    /// All selections, sorted by start.
    fn selections(&self) -> Vec<Selection>;

    /// Replace the selection set.
    fn set_selections(&mut self, selections: Vec<Selection>);

    /// Character offset of a position.
    fn index_from_pos(&self, pos: Position) -> usize;

    /// Position of a character offset.
    fn pos_from_index(&self, index: usize) -> Position;

    /// Clamp a position into the document.
    fn clip_position(&self, pos: Position) -> Position;

    /// Open an atomic operation; nests.
    fn begin_operation(&mut self);

    /// Close the innermost atomic operation. Change notification happens when the outermost one
    /// closes.
    fn end_operation(&mut self);

    /// Current indentation preferences.
    fn indent_settings(&self) -> IndentSettings {
        IndentSettings::default()
    }

    /// Length of a line in characters.
    fn line_len(&self, line: usize) -> usize {
        self.line(line).map(|text| text.chars().count()).unwrap_or(0)
    }
}

/// Scoped atomic operation over a buffer.
///
/// Calls [`TextBuffer::begin_operation`] on creation and [`TextBuffer::end_operation`] on drop,
/// so the operation is closed on every exit path.
pub struct AtomicOperation<'a, B: TextBuffer + ?Sized> {
    buffer: &'a mut B,
}

impl<'a, B: TextBuffer + ?Sized> AtomicOperation<'a, B> {
    /// Open the operation.
    pub fn new(buffer: &'a mut B) -> Self {
        buffer.begin_operation();
        Self { buffer }
    }
}

impl<B: TextBuffer + ?Sized> Deref for AtomicOperation<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        &*self.buffer
    }
}

impl<B: TextBuffer + ?Sized> DerefMut for AtomicOperation<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut *self.buffer
    }
}

impl<B: TextBuffer + ?Sized> Drop for AtomicOperation<'_, B> {
    fn drop(&mut self) {
        self.buffer.end_operation();
    }
}

/// Column of the first non-whitespace character (line length for blank lines).
pub(crate) fn first_non_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Leading whitespace of a line.
pub(crate) fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

/// Returns `true` for lines made only of whitespace (including empty lines).
pub(crate) fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

//! Token-by-token navigation over a document.

use crate::buffer::TextBuffer;
use crate::mode::{LanguageModes, Token};
use crate::position::Position;

/// A position in the document together with the mode's token there.
///
/// Moves report `false` (and leave the cursor unchanged) at document boundaries.
#[derive(Clone)]
pub struct TokenCursor<'a> {
    buffer: &'a dyn TextBuffer,
    modes: &'a dyn LanguageModes,
    pos: Position,
    token: Token,
}

impl<'a> TokenCursor<'a> {
    /// Create a cursor at `pos`.
    pub fn new(buffer: &'a dyn TextBuffer, modes: &'a dyn LanguageModes, pos: Position) -> Self {
        let token = modes.token_at(pos);
        Self {
            buffer,
            modes,
            pos,
            token,
        }
    }

    /// Current position.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Current token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Document position where the current token starts.
    pub fn token_start(&self) -> Position {
        Position::new(self.pos.line, self.token.start)
    }

    /// Document position where the current token ends.
    pub fn token_end(&self) -> Position {
        Position::new(self.pos.line, self.token.end)
    }

    /// Returns `true` when only whitespace precedes the current token on its line.
    pub fn token_starts_line_content(&self) -> bool {
        let Some(line) = self.buffer.line(self.pos.line) else {
            return false;
        };
        line.chars()
            .take(self.token.start)
            .all(char::is_whitespace)
    }

    /// Move to the next token, crossing line boundaries.
    pub fn move_next(&mut self) -> bool {
        let eol = self.buffer.line_len(self.pos.line);
        let next = if self.pos.column >= eol || self.token.end >= eol {
            if self.pos.line + 1 >= self.buffer.line_count() {
                return false;
            }
            Position::new(self.pos.line + 1, 0)
        } else {
            Position::new(self.pos.line, self.token.end + 1)
        };
        self.seek(next);
        true
    }

    /// Move to the previous token, crossing line boundaries.
    pub fn move_prev(&mut self) -> bool {
        let prev = if self.pos.column == 0 || self.token.start == 0 {
            if self.pos.line == 0 {
                return false;
            }
            let line = self.pos.line - 1;
            Position::new(line, self.buffer.line_len(line))
        } else {
            Position::new(self.pos.line, self.token.start)
        };
        self.seek(prev);
        true
    }

    /// Move forward until a non-whitespace token is reached.
    pub fn move_next_skipping_whitespace(&mut self) -> bool {
        self.move_skipping_whitespace(Self::move_next)
    }

    /// Move backward until a non-whitespace token is reached.
    pub fn move_prev_skipping_whitespace(&mut self) -> bool {
        self.move_skipping_whitespace(Self::move_prev)
    }

    fn move_skipping_whitespace(&mut self, step: fn(&mut Self) -> bool) -> bool {
        let saved = (self.pos, self.token.clone());
        if !step(self) {
            return false;
        }
        while self.token.is_whitespace() {
            if !step(self) {
                (self.pos, self.token) = saved;
                return false;
            }
        }
        log::trace!(
            "token cursor at {}:{} {:?}",
            self.pos.line,
            self.token.start,
            self.token.text
        );
        true
    }

    fn seek(&mut self, pos: Position) {
        self.pos = pos;
        self.token = self.modes.token_at(pos);
    }
}

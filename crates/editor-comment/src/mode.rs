//! The language-mode collaborator.
//!
//! Block comment classification needs to know which spans of the document the language treats
//! as comments, and delimiter resolution needs the (innermost) language at a position. Both come
//! from a [`LanguageModes`] implementation; `editor-comment-modes` ships a scanner-based one.

use crate::position::Position;
use editor_comment_lang::CommentDelimiters;
use std::fmt;

/// Name of a syntactic mode (`"javascript"`, `"html"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mode(String);

impl Mode {
    /// Create a mode name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The mode name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mode {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Token classification. Only [`TokenKind::Comment`] and [`TokenKind::Whitespace`] drive
/// decisions; the rest exist so tokens partition a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Part of a line or block comment.
    Comment,
    /// String literal.
    String,
    /// Identifier, keyword or number.
    Word,
    /// Anything else that is not whitespace.
    Punctuation,
    /// Whitespace run, or the empty token of an empty line.
    Whitespace,
}

/// A token on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Start column (inclusive).
    pub start: usize,
    /// End column (exclusive).
    pub end: usize,
    /// Token text.
    pub text: String,
    /// Classification.
    pub kind: TokenKind,
}

impl Token {
    /// The placeholder token reported for an empty line.
    pub fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            text: String::new(),
            kind: TokenKind::Whitespace,
        }
    }

    /// Returns `true` if the mode classified this token as a comment.
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// Non-comment tokens made only of whitespace are skipped by cursor walks.
    pub fn is_whitespace(&self) -> bool {
        !self.is_comment() && self.text.chars().all(char::is_whitespace)
    }
}

/// Operations the comment engine needs from the language-mode subsystem.
///
/// Implementations describe one fixed text; callers must not mix an analysis with a buffer
/// that has changed since.
pub trait LanguageModes {
    /// The innermost mode of the character before `pos` (the outer mode at the document
    /// start). `None` if the position is not covered by any mode.
    fn mode_at(&self, pos: Position) -> Option<Mode>;

    /// Comment delimiters a mode declares by default.
    fn comment_syntax(&self, mode: &Mode) -> Option<CommentDelimiters>;

    /// The token covering the character before `pos`.
    ///
    /// At column 0 this is the first token of the line; past the end of the line it is the last
    /// one. Empty lines yield [`Token::empty`].
    fn token_at(&self, pos: Position) -> Token;
}

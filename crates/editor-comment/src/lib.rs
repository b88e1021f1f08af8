#![warn(missing_docs)]
//! Editor Comment - Headless Comment Toggling for Code Editors
//!
//! # Overview
//!
//! `editor-comment` implements the `toggleLineComment` and `toggleBlockComment` commands of a
//! code editor. Given the buffer's selections and the comment delimiters of the language under
//! each of them, it decides whether to insert or remove comment markers and applies all edits
//! in one atomic operation while keeping every selection consistent with the new text.
//!
//! The crate owns no text and no tokenizer. Hosts plug in:
//!
//! - a [`TextBuffer`] (the in-crate [`Document`] is a rope-backed reference implementation);
//! - a [`LanguageModes`] implementation (`editor-comment-modes` ships a scanner-based one).
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Commands (toggle line / block comment)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Line / Block Edit Builders                 │  ← Decision + edit synthesis
//! ├─────────────────────────────────────────────┤
//! │  Syntax Resolver │ Selection Normalizer     │
//! ├─────────────────────────────────────────────┤
//! │  Token Cursor                               │  ← Token walks
//! ├─────────────────────────────────────────────┤
//! │  Multi-Edit Engine                          │  ← Atomic apply + selection mapping
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer / LanguageModes collaborators   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_comment::{CommentOptions, Document, Position, toggle_block_comment};
//! use editor_comment_modes::ModeRegistry;
//!
//! let registry = ModeRegistry::with_builtins();
//! let mut doc = Document::new("a { color: red; }");
//! doc.set_selection(Position::new(0, 4), Position::new(0, 15));
//!
//! let modes = registry.analyze("css", &doc).unwrap();
//! toggle_block_comment(&mut doc, &modes, &CommentOptions::default()).unwrap();
//! assert_eq!(doc.text(), "a { /*color: red;*/ }");
//!
//! // Toggling again inside the comment removes it.
//! let modes = registry.analyze("css", &doc).unwrap();
//! toggle_block_comment(&mut doc, &modes, &CommentOptions::default()).unwrap();
//! assert_eq!(doc.text(), "a { color: red; }");
//! ```
//!
//! # Module Description
//!
//! - [`position`] - Positions and selections
//! - [`buffer`] - The text buffer collaborator and atomic operations
//! - [`mode`] - The language-mode collaborator (modes, tokens)
//! - [`token_cursor`] - Token-by-token navigation
//! - [`selection_set`] - Line-granular selection groups
//! - [`syntax`] - Comment options and delimiter resolution
//! - [`line_comment`] - Line comment decision and edits
//! - [`block_comment`] - Block comment classification and edits
//! - [`multi_edit`] - Batched edit application with selection tracking
//! - [`commands`] - The toggle commands
//! - [`document`] - Rope-backed reference buffer

pub mod block_comment;
pub mod buffer;
pub mod commands;
pub mod document;
pub mod error;
pub mod line_comment;
pub mod mode;
pub mod multi_edit;
pub mod position;
pub mod selection_set;
pub mod syntax;
pub mod token_cursor;

pub use block_comment::{BlockCommentBuilder, BlockOutcome, MAX_AMBIGUITY_STEPS};
pub use buffer::{AtomicOperation, IndentSettings, TextBuffer};
pub use commands::{
    CommentCommand, execute_comment_command, toggle_block_comment, toggle_line_comment,
};
pub use document::Document;
pub use error::{CommentError, EditError};
pub use line_comment::{LinePrefixes, line_comment_edit};
pub use mode::{LanguageModes, Mode, Token, TokenKind};
pub use multi_edit::{
    Edit, EditDescriptor, TrackedSelection, adjust_pos_for_change, do_multiple_edits,
};
pub use position::{Position, Selection};
pub use selection_set::{LineSelection, LineSelectionOptions, convert_to_line_selections};
pub use syntax::{CommentOptions, CommentSyntaxResolver, DelimiterLookup, ResolvedSyntax};
pub use token_cursor::TokenCursor;

pub use editor_comment_lang::{CommentDelimiters, LineCommentTokens};

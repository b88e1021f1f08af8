#![warn(missing_docs)]
//! `editor-comment-modes` - scanner-based language modes for `editor-comment`.
//!
//! Languages are described as data ([`LanguageDefinition`]): comment delimiters, string quote
//! characters and regions embedding another language (such as `<script>` in HTML). A
//! [`ModeRegistry`] compiles the definitions and scans a buffer into an [`AnalyzedDocument`],
//! which implements [`editor_comment::LanguageModes`].
//!
//! The scanner recognizes only what comment toggling needs: comments, strings, whitespace and
//! language boundaries. Everything else is split into words and punctuation.
//!
//! # Example
//!
//! ```rust
//! use editor_comment::{Document, LanguageModes, Position};
//! use editor_comment_modes::ModeRegistry;
//!
//! let registry = ModeRegistry::with_builtins();
//! let doc = Document::new("<style>\np { }\n</style>");
//! let modes = registry.analyze("html", &doc).unwrap();
//!
//! assert_eq!(modes.mode_at(Position::new(1, 2)).unwrap().name(), "css");
//! assert_eq!(modes.mode_at(Position::new(2, 3)).unwrap().name(), "html");
//! ```

mod definition;
mod error;
mod registry;
mod scanner;

pub use definition::{BUILTIN_DEFINITIONS, EmbeddedRegion, LanguageDefinition};
pub use error::ModeError;
pub use registry::{AnalyzedDocument, ModeRegistry};

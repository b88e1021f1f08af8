//! Comment options and delimiter resolution.
//!
//! Precedence when resolving the delimiters at a position:
//!
//! 1. `get_mode` (when supplied) answers for the mode at the position; the static option fields
//!    are then ignored and a `None` answer falls back to the mode's declared delimiters.
//! 2. Otherwise each static override (`line_comment`, `block_comment_start`,
//!    `block_comment_end`) replaces the matching mode default when it is non-empty.

use crate::mode::{LanguageModes, Mode};
use crate::position::Position;
use editor_comment_lang::{CommentDelimiters, LineCommentTokens};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Host callback deciding the delimiters for a mode at a position.
pub type DelimiterLookup = Arc<dyn Fn(&Mode, Position) -> Option<CommentDelimiters> + Send + Sync>;

/// Per-invocation options of the toggle commands.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentOptions {
    /// Comment at the indentation level instead of column 0.
    pub indent: bool,
    /// Text inserted between a comment marker and the commented text.
    pub padding: String,
    /// Comment whitespace-only lines too.
    pub comment_blank_lines: bool,
    /// Line prefix override(s).
    pub line_comment: Option<LineCommentTokens>,
    /// Block start override.
    pub block_comment_start: Option<String>,
    /// Block end override.
    pub block_comment_end: Option<String>,
    /// Dynamic delimiter lookup; takes precedence over the static overrides.
    #[serde(skip)]
    pub get_mode: Option<DelimiterLookup>,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            indent: false,
            padding: String::new(),
            comment_blank_lines: true,
            line_comment: None,
            block_comment_start: None,
            block_comment_end: None,
            get_mode: None,
        }
    }
}

impl fmt::Debug for CommentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentOptions")
            .field("indent", &self.indent)
            .field("padding", &self.padding)
            .field("comment_blank_lines", &self.comment_blank_lines)
            .field("line_comment", &self.line_comment)
            .field("block_comment_start", &self.block_comment_start)
            .field("block_comment_end", &self.block_comment_end)
            .field("get_mode", &self.get_mode.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl CommentOptions {
    /// Builder-style `indent`.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Builder-style `padding`.
    pub fn with_padding(mut self, padding: impl Into<String>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Builder-style `comment_blank_lines`.
    pub fn with_comment_blank_lines(mut self, comment_blank_lines: bool) -> Self {
        self.comment_blank_lines = comment_blank_lines;
        self
    }

    /// Builder-style line prefix override.
    pub fn with_line_comment(mut self, tokens: impl Into<LineCommentTokens>) -> Self {
        self.line_comment = Some(tokens.into());
        self
    }

    /// Builder-style block delimiter override.
    pub fn with_block_comment(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.block_comment_start = Some(start.into());
        self.block_comment_end = Some(end.into());
        self
    }

    /// Builder-style dynamic lookup.
    pub fn with_get_mode<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&Mode, Position) -> Option<CommentDelimiters> + Send + Sync + 'static,
    {
        self.get_mode = Some(Arc::new(lookup));
        self
    }
}

/// Delimiters effective at a position, with empty values already dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSyntax {
    /// Line prefixes; the first one is inserted when commenting.
    pub line_prefixes: Vec<String>,
    /// Block start and end.
    pub block: Option<(String, String)>,
}

impl ResolvedSyntax {
    /// The prefix inserted when commenting lines.
    pub fn primary_line_prefix(&self) -> Option<&str> {
        self.line_prefixes.first().map(String::as_str)
    }

    /// Returns `true` if line comments are available.
    pub fn has_line(&self) -> bool {
        !self.line_prefixes.is_empty()
    }

    /// Returns `true` if block comments are available.
    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Returns `true` if no comment syntax is available.
    pub fn is_empty(&self) -> bool {
        !self.has_line() && !self.has_block()
    }
}

impl From<&CommentDelimiters> for ResolvedSyntax {
    fn from(delimiters: &CommentDelimiters) -> Self {
        Self {
            line_prefixes: delimiters.line_prefixes().map(str::to_string).collect(),
            block: delimiters
                .block_pair()
                .map(|(start, end)| (start.to_string(), end.to_string())),
        }
    }
}

/// Resolves the comment delimiters effective at document positions.
pub struct CommentSyntaxResolver<'a> {
    modes: &'a dyn LanguageModes,
    options: &'a CommentOptions,
}

impl<'a> CommentSyntaxResolver<'a> {
    /// Create a resolver over a mode collaborator and the call's options.
    pub fn new(modes: &'a dyn LanguageModes, options: &'a CommentOptions) -> Self {
        Self { modes, options }
    }

    /// Delimiters at `pos`.
    pub fn resolve(&self, pos: Position) -> ResolvedSyntax {
        let mode = self.modes.mode_at(pos);
        let defaults = mode
            .as_ref()
            .and_then(|mode| self.modes.comment_syntax(mode))
            .unwrap_or_default();

        if let Some(lookup) = &self.options.get_mode {
            let dynamic = mode.as_ref().and_then(|mode| lookup(mode, pos));
            return ResolvedSyntax::from(dynamic.as_ref().unwrap_or(&defaults));
        }

        let mut merged = defaults;
        if let Some(tokens) = &self.options.line_comment {
            let prefixes = tokens.prefixes();
            if !prefixes.is_empty() {
                merged.line = prefixes;
            }
        }
        if let Some(start) = non_empty(&self.options.block_comment_start) {
            merged.block_start = Some(start.to_string());
        }
        if let Some(end) = non_empty(&self.options.block_comment_end) {
            merged.block_end = Some(end.to_string());
        }
        ResolvedSyntax::from(&merged)
    }

    /// Delimiters for a range, or `None` when its ends lie in different modes.
    pub fn resolve_range(&self, start: Position, end: Position) -> Option<ResolvedSyntax> {
        let start_mode = self.modes.mode_at(start);
        let end_mode = self.modes.mode_at(end);
        if start_mode != end_mode {
            log::debug!(
                "mixed-mode range {}:{}..{}:{} ({:?} / {:?}), skipping",
                start.line,
                start.column,
                end.line,
                end.column,
                start_mode.as_ref().map(Mode::name),
                end_mode.as_ref().map(Mode::name)
            );
            return None;
        }
        Some(self.resolve(start))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Token;
    use pretty_assertions::assert_eq;

    /// Mode "outer" on line 0, mode "inner" from line 1 on.
    struct TwoModes;

    impl LanguageModes for TwoModes {
        fn mode_at(&self, pos: Position) -> Option<Mode> {
            Some(Mode::new(if pos.line == 0 { "outer" } else { "inner" }))
        }

        fn comment_syntax(&self, mode: &Mode) -> Option<CommentDelimiters> {
            match mode.name() {
                "outer" => Some(CommentDelimiters::block("<!--", "-->")),
                "inner" => Some(CommentDelimiters::line_and_block("//", "/*", "*/")),
                _ => None,
            }
        }

        fn token_at(&self, _pos: Position) -> Token {
            Token::empty()
        }
    }

    #[test]
    fn test_mode_defaults() {
        let options = CommentOptions::default();
        let resolver = CommentSyntaxResolver::new(&TwoModes, &options);
        let outer = resolver.resolve(Position::new(0, 0));
        assert!(!outer.has_line());
        assert_eq!(outer.block, Some(("<!--".to_string(), "-->".to_string())));
        assert_eq!(resolver.resolve(Position::new(1, 0)).primary_line_prefix(), Some("//"));
    }

    #[test]
    fn test_static_overrides_replace_fields_individually() {
        let options = CommentOptions::default()
            .with_line_comment(&["#", ""][..])
            .with_block_comment("", "*)");
        let resolver = CommentSyntaxResolver::new(&TwoModes, &options);
        let resolved = resolver.resolve(Position::new(1, 0));
        assert_eq!(resolved.line_prefixes, vec!["#"]);
        assert_eq!(resolved.block, Some(("/*".to_string(), "*)".to_string())));
    }

    #[test]
    fn test_get_mode_wins_and_falls_back_to_mode_defaults() {
        let options = CommentOptions::default()
            .with_line_comment("#")
            .with_get_mode(|mode, _pos| {
                (mode.name() == "outer").then(|| CommentDelimiters::line("%"))
            });
        let resolver = CommentSyntaxResolver::new(&TwoModes, &options);
        assert_eq!(resolver.resolve(Position::new(0, 0)).line_prefixes, vec!["%"]);
        // Static override ignored; mode default used.
        assert_eq!(resolver.resolve(Position::new(2, 0)).line_prefixes, vec!["//"]);
    }

    #[test]
    fn test_resolve_range_rejects_mixed_modes() {
        let options = CommentOptions::default();
        let resolver = CommentSyntaxResolver::new(&TwoModes, &options);
        assert!(resolver.resolve_range(Position::new(0, 1), Position::new(1, 0)).is_none());
        assert!(resolver.resolve_range(Position::new(1, 0), Position::new(3, 0)).is_some());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: CommentOptions = serde_json::from_str(
            r##"{ "indent": true, "padding": " ", "commentBlankLines": false, "lineComment": ["//", "#"] }"##,
        )
        .unwrap();
        assert!(options.indent);
        assert_eq!(options.padding, " ");
        assert!(!options.comment_blank_lines);
        assert_eq!(options.line_comment.unwrap().prefixes(), vec!["//", "#"]);
        assert!(options.get_mode.is_none());
    }
}

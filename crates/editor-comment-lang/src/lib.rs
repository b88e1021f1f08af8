#![warn(missing_docs)]
//! `editor-comment-lang` - data-driven comment delimiter configuration for `editor-comment`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It provides the small structs that hosts and language modes use to
//! describe how a language spells its comments.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Errors raised while loading comment configuration.
#[derive(Debug, thiserror::Error)]
pub enum LangError {
    /// The configuration is not valid JSON for the expected shape.
    #[error("invalid language configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A lookup named a language the table does not know.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

/// One or several line comment prefixes, as written in configuration.
///
/// Languages with synonymous markers (e.g. `["//", "#"]`) list all of them; the first entry is
/// the one inserted when commenting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineCommentTokens {
    /// A single prefix such as `"//"`.
    Single(String),
    /// Alternative prefixes, in order of preference.
    Multiple(Vec<String>),
}

impl LineCommentTokens {
    /// Normalize into a list of non-empty prefixes (possibly empty, meaning "no line comment").
    pub fn into_prefixes(self) -> Vec<String> {
        let prefixes = match self {
            Self::Single(token) => vec![token],
            Self::Multiple(tokens) => tokens,
        };
        prefixes.into_iter().filter(|p| !p.is_empty()).collect()
    }

    /// Borrowing variant of [`LineCommentTokens::into_prefixes`].
    pub fn prefixes(&self) -> Vec<String> {
        self.clone().into_prefixes()
    }
}

impl From<&str> for LineCommentTokens {
    fn from(token: &str) -> Self {
        Self::Single(token.to_string())
    }
}

impl From<String> for LineCommentTokens {
    fn from(token: String) -> Self {
        Self::Single(token)
    }
}

impl From<Vec<String>> for LineCommentTokens {
    fn from(tokens: Vec<String>) -> Self {
        Self::Multiple(tokens)
    }
}

impl From<&[&str]> for LineCommentTokens {
    fn from(tokens: &[&str]) -> Self {
        Self::Multiple(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// Comment delimiters effective for a language (or a position inside a document).
///
/// Empty strings are treated as absent. A value with no usable delimiter means the language
/// does not support commenting and toggling is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentDelimiters {
    /// Line comment prefixes (e.g. `//`, `#`). The first one is used when commenting.
    #[serde(
        rename = "lineComment",
        default,
        deserialize_with = "deserialize_line_tokens"
    )]
    pub line: Vec<String>,
    /// Block comment start token (e.g. `/*`).
    #[serde(rename = "blockCommentStart", default)]
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    #[serde(rename = "blockCommentEnd", default)]
    pub block_end: Option<String>,
}

fn deserialize_line_tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tokens = Option::<LineCommentTokens>::deserialize(deserializer)?;
    Ok(tokens.map(LineCommentTokens::into_prefixes).unwrap_or_default())
}

impl CommentDelimiters {
    /// Create delimiters that support only line comments.
    pub fn line(token: impl Into<LineCommentTokens>) -> Self {
        Self {
            line: token.into().into_prefixes(),
            block_start: None,
            block_end: None,
        }
    }

    /// Create delimiters that support only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: Vec::new(),
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create delimiters that support both line and block comments.
    pub fn line_and_block(
        line: impl Into<LineCommentTokens>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into().into_prefixes(),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Non-empty line comment prefixes, in configuration order.
    pub fn line_prefixes(&self) -> impl Iterator<Item = &str> {
        self.line.iter().map(String::as_str).filter(|p| !p.is_empty())
    }

    /// The prefix inserted when commenting lines.
    pub fn primary_line_prefix(&self) -> Option<&str> {
        self.line_prefixes().next()
    }

    /// Block delimiters, if both are configured and non-empty.
    pub fn block_pair(&self) -> Option<(&str, &str)> {
        match (self.block_start.as_deref(), self.block_end.as_deref()) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => Some((start, end)),
            _ => None,
        }
    }

    /// Returns `true` if at least one line comment prefix is configured.
    pub fn has_line(&self) -> bool {
        self.primary_line_prefix().is_some()
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_pair().is_some()
    }

    /// Returns `true` if no comment syntax at all is available.
    pub fn is_empty(&self) -> bool {
        !self.has_line() && !self.has_block()
    }
}

/// Comment delimiters keyed by language id.
///
/// Loaded from a JSON object mapping ids to delimiter objects:
///
/// ```rust
/// use editor_comment_lang::LanguageTable;
///
/// let table = LanguageTable::from_json_str(
///     r##"{ "shell": { "lineComment": "#" }, "c": { "lineComment": "//", "blockCommentStart": "/*", "blockCommentEnd": "*/" } }"##,
/// )
/// .unwrap();
/// assert_eq!(table.get("shell").unwrap().primary_line_prefix(), Some("#"));
/// assert!(table.get("c").unwrap().has_block());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTable {
    languages: BTreeMap<String, CommentDelimiters>,
}

impl LanguageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, LangError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add or replace a language entry.
    pub fn insert(&mut self, language: impl Into<String>, delimiters: CommentDelimiters) {
        self.languages.insert(language.into(), delimiters);
    }

    /// Delimiters of a language, if present.
    pub fn get(&self, language: &str) -> Option<&CommentDelimiters> {
        self.languages.get(language)
    }

    /// Like [`LanguageTable::get`], reporting missing languages as an error.
    pub fn require(&self, language: &str) -> Result<&CommentDelimiters, LangError> {
        self.get(language)
            .ok_or_else(|| LangError::UnknownLanguage(language.to_string()))
    }

    /// Merge another table into this one; entries of `other` win.
    pub fn extend(&mut self, other: LanguageTable) {
        self.languages.extend(other.languages);
    }

    /// Known language ids, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Number of languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

use editor_comment_lang::LangError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading language definitions or analyzing a document.
pub enum ModeError {
    #[error("invalid mode configuration: {0}")]
    /// The definitions are not valid JSON for the expected shape.
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    /// A comment table error.
    Lang(#[from] LangError),

    #[error("unknown language: {0}")]
    /// The requested language is not registered.
    UnknownLanguage(String),

    #[error("invalid pattern '{pattern}' in language '{language}': {source}")]
    /// An embedded-region pattern failed to compile.
    InvalidPattern {
        /// Language declaring the pattern.
        language: String,
        /// The pattern as written.
        pattern: String,
        /// The compiler error.
        source: regex::Error,
    },
}

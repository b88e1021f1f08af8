//! Language definitions as loaded from configuration.

use crate::error::ModeError;
use editor_comment_lang::CommentDelimiters;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Definitions shipped with [`crate::ModeRegistry::with_builtins`].
pub const BUILTIN_DEFINITIONS: &str = r####"[
  {
    "name": "javascript",
    "lineComment": "//",
    "blockCommentStart": "/*",
    "blockCommentEnd": "*/",
    "strings": ["\"", "'", "`"]
  },
  {
    "name": "css",
    "blockCommentStart": "/*",
    "blockCommentEnd": "*/",
    "strings": ["\"", "'"]
  },
  {
    "name": "html",
    "blockCommentStart": "<!--",
    "blockCommentEnd": "-->",
    "embedded": [
      { "language": "javascript", "open": "(?i)<script\\b[^>]*>", "close": "(?i)</script\\s*>" },
      { "language": "css", "open": "(?i)<style\\b[^>]*>", "close": "(?i)</style\\s*>" }
    ]
  },
  {
    "name": "coffeescript",
    "lineComment": "#",
    "blockCommentStart": "###",
    "blockCommentEnd": "###",
    "strings": ["\"", "'"]
  },
  {
    "name": "python",
    "lineComment": "#",
    "strings": ["\"", "'"]
  },
  {
    "name": "lua",
    "lineComment": "--",
    "blockCommentStart": "--[[",
    "blockCommentEnd": "]]",
    "strings": ["\"", "'"]
  }
]"####;

/// How one language spells comments, strings and embedded regions.
///
/// ```
/// use editor_comment_modes::LanguageDefinition;
///
/// let def: LanguageDefinition = serde_json::from_str(
///     r#"{ "name": "sql", "lineComment": "--", "strings": ["'"] }"#,
/// )
/// .unwrap();
/// assert_eq!(def.comments.primary_line_prefix(), Some("--"));
/// assert_eq!(def.strings, vec!['\'']);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDefinition {
    /// Language (and mode) name.
    pub name: String,
    /// Comment delimiters, written inline (`lineComment`, `blockCommentStart`, ...).
    #[serde(flatten)]
    pub comments: CommentDelimiters,
    /// Characters opening (and closing) a single-line string literal.
    #[serde(default)]
    pub strings: Vec<char>,
    /// Regions handed over to another language.
    #[serde(default)]
    pub embedded: Vec<EmbeddedRegion>,
}

impl LanguageDefinition {
    /// A definition with the given comment delimiters and nothing else.
    pub fn new(name: impl Into<String>, comments: CommentDelimiters) -> Self {
        Self {
            name: name.into(),
            comments,
            strings: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// Builder-style string delimiters.
    pub fn with_strings(mut self, strings: impl IntoIterator<Item = char>) -> Self {
        self.strings = strings.into_iter().collect();
        self
    }

    /// Builder-style embedded region.
    pub fn with_embedded(mut self, region: EmbeddedRegion) -> Self {
        self.embedded.push(region);
        self
    }
}

/// A region of a document written in another language, such as `<script>` in HTML.
///
/// The region starts after the text matched by `open` and ends before the text matched by
/// `close`; both tags belong to the enclosing language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRegion {
    /// Language of the region's content.
    pub language: String,
    /// Pattern matching the opening tag.
    pub open: String,
    /// Pattern matching the closing tag.
    pub close: String,
}

impl EmbeddedRegion {
    /// Create a region description.
    pub fn new(
        language: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            open: open.into(),
            close: close.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRegion {
    pub(crate) language: String,
    pub(crate) open: Regex,
    pub(crate) close: Regex,
}

/// A definition prepared for scanning.
#[derive(Debug, Clone)]
pub(crate) struct CompiledLanguage {
    pub(crate) definition: LanguageDefinition,
    /// Line prefixes, longest first.
    pub(crate) line_prefixes: Vec<Vec<char>>,
    pub(crate) block: Option<(Vec<char>, Vec<char>)>,
    pub(crate) regions: Vec<CompiledRegion>,
}

impl CompiledLanguage {
    pub(crate) fn compile(definition: LanguageDefinition) -> Result<Self, ModeError> {
        let mut line_prefixes: Vec<Vec<char>> = definition
            .comments
            .line_prefixes()
            .map(|prefix| prefix.chars().collect())
            .collect();
        line_prefixes.sort_by_key(|prefix: &Vec<char>| std::cmp::Reverse(prefix.len()));

        let block = definition
            .comments
            .block_pair()
            .map(|(start, end)| (start.chars().collect(), end.chars().collect()));

        let regions = definition
            .embedded
            .iter()
            .map(|region| {
                Ok(CompiledRegion {
                    language: region.language.clone(),
                    open: anchored(&definition.name, &region.open)?,
                    close: anchored(&definition.name, &region.close)?,
                })
            })
            .collect::<Result<Vec<_>, ModeError>>()?;

        Ok(Self {
            definition,
            line_prefixes,
            block,
            regions,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.definition.name
    }
}

/// Compile `pattern` so that it only matches at the start of the haystack.
fn anchored(language: &str, pattern: &str) -> Result<Regex, ModeError> {
    Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| ModeError::InvalidPattern {
        language: language.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_parse() {
        let defs: Vec<LanguageDefinition> = serde_json::from_str(BUILTIN_DEFINITIONS).unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["javascript", "css", "html", "coffeescript", "python", "lua"]
        );
        let coffee = &defs[3];
        assert_eq!(coffee.comments.block_pair(), Some(("###", "###")));
        assert_eq!(coffee.comments.primary_line_prefix(), Some("#"));
    }

    #[test]
    fn test_compile_sorts_prefixes_longest_first() {
        let def = LanguageDefinition::new("x", CommentDelimiters::line(&["#", "###!"][..]));
        let compiled = CompiledLanguage::compile(def).unwrap();
        assert_eq!(compiled.line_prefixes[0], vec!['#', '#', '#', '!']);
    }

    #[test]
    fn test_region_patterns_are_anchored() {
        let def = LanguageDefinition::new("x", CommentDelimiters::default())
            .with_embedded(EmbeddedRegion::new("y", "<y>", "</y>"));
        let compiled = CompiledLanguage::compile(def).unwrap();
        assert!(compiled.regions[0].open.is_match("<y> rest"));
        assert!(!compiled.regions[0].open.is_match("a <y>"));
    }

    #[test]
    fn test_invalid_pattern_names_language() {
        let def = LanguageDefinition::new("broken", CommentDelimiters::default())
            .with_embedded(EmbeddedRegion::new("y", "(", "x"));
        let err = CompiledLanguage::compile(def).unwrap_err();
        assert!(matches!(
            err,
            ModeError::InvalidPattern { ref language, .. } if language == "broken"
        ));
    }
}

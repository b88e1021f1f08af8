//! Registered languages and analyzed documents.

use crate::definition::{BUILTIN_DEFINITIONS, CompiledLanguage, LanguageDefinition};
use crate::error::ModeError;
use crate::scanner::{ScannedLine, Scanner};
use editor_comment::{CommentDelimiters, LanguageModes, Mode, Position, TextBuffer, Token};
use editor_comment_lang::LanguageTable;
use std::collections::HashMap;

/// The languages a host knows about.
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    languages: HashMap<String, CompiledLanguage>,
}

impl ModeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the bundled languages: `javascript`, `css`, `html` (embedding
    /// `javascript` and `css`), `coffeescript`, `python` and `lua`.
    pub fn with_builtins() -> Self {
        match Self::from_json_str(BUILTIN_DEFINITIONS) {
            Ok(registry) => registry,
            Err(err) => {
                log::error!("failed to load builtin languages: {err}");
                Self::new()
            }
        }
    }

    /// Load a JSON array of [`LanguageDefinition`]s.
    pub fn from_json_str(json: &str) -> Result<Self, ModeError> {
        let definitions: Vec<LanguageDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Add or replace a language.
    pub fn register(&mut self, definition: LanguageDefinition) -> Result<(), ModeError> {
        let compiled = CompiledLanguage::compile(definition)?;
        log::debug!("registered language {}", compiled.name());
        self.languages.insert(compiled.name().to_string(), compiled);
        Ok(())
    }

    /// Replace the comment delimiters of registered languages with the entries of `table`.
    ///
    /// Fails without changing anything if `table` names an unregistered language.
    pub fn override_comments(&mut self, table: &LanguageTable) -> Result<(), ModeError> {
        if let Some(unknown) = table
            .languages()
            .find(|name| !self.languages.contains_key(*name))
        {
            return Err(ModeError::UnknownLanguage(unknown.to_string()));
        }
        for name in table.languages() {
            let delimiters = table.require(name)?.clone();
            if let Some(current) = self.languages.get(name) {
                let mut definition = current.definition.clone();
                definition.comments = delimiters;
                self.register(definition)?;
            }
        }
        Ok(())
    }

    /// [`ModeRegistry::override_comments`] with a JSON table such as
    /// `{ "python": { "lineComment": ["#", "##"] } }`.
    pub fn override_comments_json(&mut self, json: &str) -> Result<(), ModeError> {
        let table = LanguageTable::from_json_str(json)?;
        self.override_comments(&table)
    }

    /// The definition of `language`.
    pub fn get(&self, language: &str) -> Option<&LanguageDefinition> {
        self.languages.get(language).map(|compiled| &compiled.definition)
    }

    /// Registered language names, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Comment delimiters of every registered language.
    pub fn comment_table(&self) -> LanguageTable {
        let mut table = LanguageTable::new();
        for (name, compiled) in &self.languages {
            table.insert(name.clone(), compiled.definition.comments.clone());
        }
        table
    }

    /// Scan `buffer` as `language`.
    pub fn analyze(
        &self,
        language: &str,
        buffer: &dyn TextBuffer,
    ) -> Result<AnalyzedDocument, ModeError> {
        let root = self
            .languages
            .get(language)
            .ok_or_else(|| ModeError::UnknownLanguage(language.to_string()))?;

        let mut scanner = Scanner::new(&self.languages, root);
        let lines: Vec<ScannedLine> = (0..buffer.line_count())
            .map(|line| scanner.scan_line(&buffer.line(line).unwrap_or_default()))
            .collect();
        log::trace!("analyzed {} lines as {language}", lines.len());

        Ok(AnalyzedDocument {
            language: Mode::new(language),
            lines,
            comments: self.comment_table(),
        })
    }
}

/// Tokens and modes of one buffer snapshot.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    language: Mode,
    lines: Vec<ScannedLine>,
    comments: LanguageTable,
}

impl AnalyzedDocument {
    /// The outer language.
    pub fn language(&self) -> &Mode {
        &self.language
    }

    /// Number of analyzed lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Tokens of `line` (empty for blank or missing lines).
    pub fn tokens(&self, line: usize) -> &[Token] {
        self.lines
            .get(line)
            .map(|scanned| scanned.tokens.as_slice())
            .unwrap_or_default()
    }

    fn clip(&self, pos: Position) -> Option<Position> {
        let last = self.lines.len().checked_sub(1)?;
        if pos.line > last {
            return Some(Position::new(last, self.lines[last].len));
        }
        Some(Position::new(pos.line, pos.column.min(self.lines[pos.line].len)))
    }
}

impl LanguageModes for AnalyzedDocument {
    fn mode_at(&self, pos: Position) -> Option<Mode> {
        let Some(pos) = self.clip(pos) else {
            return Some(self.language.clone());
        };
        if pos.column > 0 {
            return self.lines[pos.line]
                .mode_at_column(pos.column - 1)
                .cloned();
        }
        if pos.line == 0 {
            return Some(self.language.clone());
        }
        // The character before column 0 is the previous line break.
        let previous = &self.lines[pos.line - 1];
        previous.mode_at_column(previous.len).cloned()
    }

    fn comment_syntax(&self, mode: &Mode) -> Option<CommentDelimiters> {
        self.comments.get(mode.name()).cloned()
    }

    fn token_at(&self, pos: Position) -> Token {
        let Some(scanned) = self.lines.get(pos.line) else {
            return Token::empty();
        };
        let tokens = &scanned.tokens;
        if pos.column == 0 {
            return tokens.first().cloned().unwrap_or_else(Token::empty);
        }
        tokens
            .iter()
            .find(|token| token.start < pos.column && pos.column <= token.end)
            .or_else(|| tokens.last())
            .cloned()
            .unwrap_or_else(Token::empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_comment::{Document, TokenKind};
    use pretty_assertions::assert_eq;

    fn analyze(language: &str, text: &str) -> AnalyzedDocument {
        ModeRegistry::with_builtins()
            .analyze(language, &Document::new(text))
            .unwrap()
    }

    #[test]
    fn test_unknown_language() {
        let err = ModeRegistry::with_builtins()
            .analyze("cobol", &Document::new(""))
            .unwrap_err();
        assert!(matches!(err, ModeError::UnknownLanguage(ref name) if name == "cobol"));
    }

    #[test]
    fn test_token_at_boundaries() {
        let doc = analyze("javascript", "ab  cd");
        assert_eq!(doc.token_at(Position::new(0, 0)).text, "ab");
        assert_eq!(doc.token_at(Position::new(0, 2)).text, "ab");
        assert_eq!(doc.token_at(Position::new(0, 3)).text, "  ");
        assert_eq!(doc.token_at(Position::new(0, 5)).text, "cd");
        assert_eq!(doc.token_at(Position::new(0, 40)).text, "cd");
        assert_eq!(doc.token_at(Position::new(9, 0)), Token::empty());
    }

    #[test]
    fn test_empty_line_yields_empty_token() {
        let doc = analyze("javascript", "a\n\nb");
        let token = doc.token_at(Position::new(1, 0));
        assert_eq!(token, Token::empty());
        assert_eq!(token.kind, TokenKind::Whitespace);
    }

    #[test]
    fn test_mode_at_uses_character_before() {
        let doc = analyze("html", "<script>\nx\n</script>\ny");
        assert_eq!(doc.mode_at(Position::new(0, 0)).unwrap().name(), "html");
        assert_eq!(doc.mode_at(Position::new(0, 8)).unwrap().name(), "html");
        // Line break after the open tag belongs to the script.
        assert_eq!(doc.mode_at(Position::new(1, 0)).unwrap().name(), "javascript");
        assert_eq!(doc.mode_at(Position::new(1, 1)).unwrap().name(), "javascript");
        assert_eq!(doc.mode_at(Position::new(2, 0)).unwrap().name(), "javascript");
        assert_eq!(doc.mode_at(Position::new(2, 1)).unwrap().name(), "html");
        assert_eq!(doc.mode_at(Position::new(3, 0)).unwrap().name(), "html");
        // Past the end clips to the last character.
        assert_eq!(doc.mode_at(Position::new(10, 0)).unwrap().name(), "html");
    }

    #[test]
    fn test_comment_syntax_of_embedded_mode() {
        let doc = analyze("html", "");
        let js = doc.comment_syntax(&Mode::new("javascript")).unwrap();
        assert_eq!(js.primary_line_prefix(), Some("//"));
        let html = doc.comment_syntax(&Mode::new("html")).unwrap();
        assert!(!html.has_line());
        assert!(doc.comment_syntax(&Mode::new("cobol")).is_none());
    }

    #[test]
    fn test_override_comments_keeps_the_rest_of_the_definition() {
        let mut registry = ModeRegistry::with_builtins();
        registry
            .override_comments_json(r#"{ "html": { "blockCommentStart": "<%--", "blockCommentEnd": "--%>" } }"#)
            .unwrap();
        let html = registry.get("html").unwrap();
        assert_eq!(html.comments.block_pair(), Some(("<%--", "--%>")));
        assert_eq!(html.embedded.len(), 2);

        let err = registry
            .override_comments_json(r#"{ "cobol": { "lineComment": "*" } }"#)
            .unwrap_err();
        assert!(matches!(err, ModeError::UnknownLanguage(_)));
        let err = registry.override_comments_json("[").unwrap_err();
        assert!(matches!(err, ModeError::Lang(_)));
    }

    #[test]
    fn test_register_replaces_language() {
        let mut registry = ModeRegistry::with_builtins();
        registry
            .register(LanguageDefinition::new("python", CommentDelimiters::line(";")))
            .unwrap();
        assert_eq!(
            registry.get("python").unwrap().comments.primary_line_prefix(),
            Some(";")
        );
        assert_eq!(
            registry.languages(),
            vec!["coffeescript", "css", "html", "javascript", "lua", "python"]
        );
    }
}

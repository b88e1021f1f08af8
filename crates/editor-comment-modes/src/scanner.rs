//! Line-by-line scanner producing tokens and mode spans.
//!
//! The scanner keeps a stack of frames, one per open language region, and carries it across
//! lines so block comments and embedded regions may span several lines. At each position the
//! current frame tries, in order: the region close tag, the rest of an open block comment,
//! whitespace, a block comment start, a line comment prefix, a string literal, an embedded
//! region open tag, a word, and finally a single punctuation character.

use crate::definition::CompiledLanguage;
use editor_comment::{Mode, Token, TokenKind};
use regex::Regex;
use std::collections::HashMap;

/// Scan results for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedLine {
    pub(crate) tokens: Vec<Token>,
    /// `(first column, mode)` runs; the first run starts at column 0.
    pub(crate) modes: Vec<(usize, Mode)>,
    pub(crate) len: usize,
}

impl ScannedLine {
    /// Mode of the character at `column`; `column == len` names the line break.
    pub(crate) fn mode_at_column(&self, column: usize) -> Option<&Mode> {
        self.modes
            .iter()
            .take_while(|(start, _)| *start <= column)
            .last()
            .map(|(_, mode)| mode)
    }
}

struct Frame<'r> {
    language: &'r CompiledLanguage,
    close: Option<&'r Regex>,
    in_block: bool,
}

pub(crate) struct Scanner<'r> {
    languages: &'r HashMap<String, CompiledLanguage>,
    stack: Vec<Frame<'r>>,
}

impl<'r> Scanner<'r> {
    pub(crate) fn new(
        languages: &'r HashMap<String, CompiledLanguage>,
        root: &'r CompiledLanguage,
    ) -> Self {
        Self {
            languages,
            stack: vec![Frame {
                language: root,
                close: None,
                in_block: false,
            }],
        }
    }

    fn mode(&self) -> Mode {
        Mode::new(self.frame().language.name())
    }

    fn frame(&self) -> &Frame<'r> {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame<'r> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub(crate) fn scan_line(&mut self, text: &str) -> ScannedLine {
        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = chars.len();

        let mut line = ScannedLine {
            tokens: Vec::new(),
            modes: vec![(0, self.mode())],
            len,
        };

        let mut i = 0;
        while i < len {
            let rest = &text[offsets[i]..];

            if !self.frame().in_block
                && let Some(close) = self.frame().close
                && close.is_match(rest)
            {
                self.stack.pop();
                push_mode(&mut line.modes, i, self.mode());
                continue;
            }

            let language = self.frame().language;

            if self.frame().in_block {
                i = self.continue_block(&chars, i, 0, &mut line.tokens);
                continue;
            }

            if chars[i].is_whitespace() {
                let end = run_end(&chars, i, |c| c.is_whitespace());
                push_token(&mut line.tokens, &chars, i, end, TokenKind::Whitespace);
                i = end;
                continue;
            }

            if let Some((start, _)) = &language.block
                && starts_with_at(&chars, i, start)
            {
                self.frame_mut().in_block = true;
                i = self.continue_block(&chars, i, start.len(), &mut line.tokens);
                continue;
            }

            if language
                .line_prefixes
                .iter()
                .any(|prefix| starts_with_at(&chars, i, prefix))
            {
                push_token(&mut line.tokens, &chars, i, len, TokenKind::Comment);
                i = len;
                continue;
            }

            if language.definition.strings.contains(&chars[i]) {
                let end = string_end(&chars, i);
                push_token(&mut line.tokens, &chars, i, end, TokenKind::String);
                i = end;
                continue;
            }

            if let Some((region, matched)) = language.regions.iter().find_map(|region| {
                region
                    .open
                    .find(rest)
                    .filter(|m| !m.is_empty())
                    .map(|m| (region, m.end()))
            }) {
                let end_byte = offsets[i] + matched;
                let end = offsets.partition_point(|&byte| byte < end_byte);
                plain_tokens(&mut line.tokens, &chars, i, end);
                i = end;
                let languages = self.languages;
                match languages.get(&region.language) {
                    Some(embedded) => {
                        self.stack.push(Frame {
                            language: embedded,
                            close: Some(&region.close),
                            in_block: false,
                        });
                        push_mode(&mut line.modes, i, self.mode());
                    }
                    None => log::warn!(
                        "{} embeds unknown language {}, region ignored",
                        language.name(),
                        region.language
                    ),
                }
                continue;
            }

            let end = word_or_punctuation_end(&chars, i);
            let kind = if is_word_char(chars[i]) {
                TokenKind::Word
            } else {
                TokenKind::Punctuation
            };
            push_token(&mut line.tokens, &chars, i, end, kind);
            i = end;
        }

        line
    }

    /// Consume block comment text from `start`, looking for the end delimiter from
    /// `start + skip`. Returns the column after the consumed text.
    fn continue_block(
        &mut self,
        chars: &[char],
        start: usize,
        skip: usize,
        tokens: &mut Vec<Token>,
    ) -> usize {
        let language = self.frame().language;
        let end = match &language.block {
            Some((_, suffix)) => find_at(chars, start + skip, suffix).map(|at| at + suffix.len()),
            None => Some(start + skip),
        };
        let end = match end {
            Some(end) => {
                self.frame_mut().in_block = false;
                end
            }
            None => chars.len(),
        };
        push_token(tokens, chars, start, end, TokenKind::Comment);
        end
    }
}

fn push_mode(modes: &mut Vec<(usize, Mode)>, column: usize, mode: Mode) {
    if let Some(last) = modes.last_mut()
        && last.0 == column
    {
        last.1 = mode;
        return;
    }
    modes.push((column, mode));
}

fn push_token(tokens: &mut Vec<Token>, chars: &[char], start: usize, end: usize, kind: TokenKind) {
    let end = end.min(chars.len());
    if end <= start {
        return;
    }
    tokens.push(Token {
        start,
        end,
        text: chars[start..end].iter().collect(),
        kind,
    });
}

/// Words, whitespace runs and single punctuation characters for `[start, end)`.
fn plain_tokens(tokens: &mut Vec<Token>, chars: &[char], start: usize, end: usize) {
    let mut i = start;
    while i < end {
        let (next, kind) = if chars[i].is_whitespace() {
            (run_end(chars, i, |c| c.is_whitespace()), TokenKind::Whitespace)
        } else if is_word_char(chars[i]) {
            (run_end(chars, i, is_word_char), TokenKind::Word)
        } else {
            (i + 1, TokenKind::Punctuation)
        };
        let next = next.min(end);
        push_token(tokens, chars, i, next, kind);
        i = next;
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn run_end(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|&c| !pred(c))
        .map_or(chars.len(), |offset| start + offset)
}

fn word_or_punctuation_end(chars: &[char], start: usize) -> usize {
    if is_word_char(chars[start]) {
        run_end(chars, start, is_word_char)
    } else {
        start + 1
    }
}

/// End of the string literal opened at `start`; unterminated strings run to the line end.
fn string_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn starts_with_at(chars: &[char], at: usize, pattern: &[char]) -> bool {
    !pattern.is_empty() && chars.get(at..at + pattern.len()) == Some(pattern)
}

fn find_at(chars: &[char], from: usize, pattern: &[char]) -> Option<usize> {
    if pattern.is_empty() || from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|offset| from + offset)
}

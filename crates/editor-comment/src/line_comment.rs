//! Line comment toggling for one line group.

use crate::buffer::{TextBuffer, first_non_whitespace, is_blank, leading_whitespace};
use crate::multi_edit::{Edit, EditDescriptor, TrackedSelection};
use crate::position::{Position, Selection};
use crate::selection_set::LineSelection;
use crate::syntax::CommentOptions;
use regex::Regex;

#[derive(Debug, Clone)]
struct PrefixMatcher {
    prefix: String,
    expressions: Vec<Regex>,
}

impl PrefixMatcher {
    fn is_match(&self, text: &str) -> bool {
        self.expressions.iter().all(|exp| exp.is_match(text))
    }
}

/// Compiled "is this line commented" expressions for a set of line prefixes.
///
/// A prefix that is a literal prefix of the block start (or of a distinct block end) does not
/// match the longer block token: with `#` and `###`, `# x` is a line comment but `### x` is not.
#[derive(Debug, Clone)]
pub struct LinePrefixes {
    matchers: Vec<PrefixMatcher>,
}

impl LinePrefixes {
    /// Compile expressions for `prefixes`, aware of the block delimiters.
    pub fn new(prefixes: &[String], block: Option<(&str, &str)>) -> Self {
        let matchers = prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| {
                let mut patterns = Vec::new();
                if let Some((start, end)) = block {
                    if start.starts_with(prefix.as_str()) {
                        patterns.push(special_line_pattern(prefix, start));
                    }
                    if start != end && end.starts_with(prefix.as_str()) {
                        patterns.push(special_line_pattern(prefix, end));
                    }
                }
                if patterns.is_empty() {
                    patterns.push(format!(r"^\s*{}", regex::escape(prefix)));
                }
                let expressions = patterns
                    .iter()
                    .filter_map(|pattern| match Regex::new(pattern) {
                        Ok(exp) => Some(exp),
                        Err(err) => {
                            log::warn!("skipping line comment pattern {pattern:?}: {err}");
                            None
                        }
                    })
                    .collect();
                PrefixMatcher {
                    prefix: prefix.clone(),
                    expressions,
                }
            })
            .collect();
        Self { matchers }
    }

    /// Returns `true` if `text` starts (after whitespace) with one of the prefixes.
    pub fn is_match(&self, text: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(text))
    }

    /// The longest prefix `text` starts with, if any.
    pub fn longest_match(&self, text: &str) -> Option<&str> {
        self.matchers
            .iter()
            .filter(|m| m.is_match(text))
            .map(|m| m.prefix.as_str())
            .max_by_key(|prefix| prefix.chars().count())
    }
}

/// `^\s*<prefix>` that rejects every continuation spelling out `block`.
fn special_line_pattern(prefix: &str, block: &str) -> String {
    let mut alternatives = Vec::new();
    let mut previous = String::new();
    for ch in block.chars().skip(prefix.chars().count()) {
        let escaped = regex::escape(&ch.to_string());
        alternatives.push(format!("{previous}[^{escaped}]"));
        if !previous.is_empty() {
            alternatives.push(format!("{previous}$"));
        }
        previous.push_str(&escaped);
    }
    let mut pattern = format!(r"^\s*{}($", regex::escape(prefix));
    for alternative in alternatives {
        pattern.push('|');
        pattern.push_str(&alternative);
    }
    pattern.push(')');
    pattern
}

/// Last line whose content belongs to a line group.
pub(crate) fn last_edited_line(buffer: &dyn TextBuffer, selection: &Selection) -> usize {
    let mut end_line = selection.end.line;
    if selection.end.column == 0 && end_line > selection.start.line {
        end_line -= 1;
    }
    end_line.min(buffer.line_count().saturating_sub(1))
}

/// Comment or uncomment every line of `line_sel`.
///
/// `prefixes` must not be empty; the first one is inserted when commenting.
pub fn line_comment_edit(
    buffer: &dyn TextBuffer,
    prefixes: &[String],
    block: Option<(&str, &str)>,
    line_sel: &LineSelection,
    options: &CommentOptions,
) -> EditDescriptor {
    let tracked = &line_sel.selections_to_track;
    let Some(comment_prefix) = prefixes.iter().find(|p| !p.is_empty()) else {
        return EditDescriptor::no_op(tracked);
    };
    let matcher = LinePrefixes::new(prefixes, block);

    let sel = &line_sel.selection_for_edit;
    let start_line = sel.start.line;
    let end_line = last_edited_line(buffer, sel);

    let lines: Vec<(usize, String)> = (start_line..=end_line)
        .filter_map(|line| buffer.line(line).map(|text| (line, text)))
        .filter(|(_, text)| options.comment_blank_lines || !is_blank(text))
        .collect();
    if lines.is_empty() {
        return EditDescriptor::no_op(tracked);
    }

    let all_blank = lines.iter().all(|(_, text)| is_blank(text));
    let has_uncommented = lines
        .iter()
        .any(|(_, text)| !is_blank(text) && !matcher.is_match(text));

    if has_uncommented || all_blank {
        log::debug!("line comment: commenting lines {start_line}..={end_line}");
        comment_lines(&lines, comment_prefix, tracked, options)
    } else {
        log::debug!("line comment: uncommenting lines {start_line}..={end_line}");
        uncomment_lines(&lines, &matcher, tracked, options)
    }
}

fn comment_lines(
    lines: &[(usize, String)],
    prefix: &str,
    tracked: &[Selection],
    options: &CommentOptions,
) -> EditDescriptor {
    let comment = format!("{prefix}{}", options.padding);
    let comment_len = comment.chars().count();

    let baseline_ws = if options.indent {
        lines
            .iter()
            .filter(|(_, text)| !is_blank(text))
            .map(|(_, text)| leading_whitespace(text))
            .min_by_key(|ws| ws.chars().count())
            .unwrap_or("")
    } else {
        ""
    };
    let baseline = baseline_ws.chars().count();

    // (line, insertion column, whether the blank line was replaced wholesale)
    let mut placements: Vec<(usize, usize, bool)> = Vec::with_capacity(lines.len());
    let mut edits = Vec::with_capacity(lines.len());
    for (line, text) in lines {
        let len = text.chars().count();
        if is_blank(text) && len < baseline {
            edits.push(Edit::replace(
                format!("{baseline_ws}{comment}"),
                Position::new(*line, 0),
                Position::new(*line, len),
            ));
            placements.push((*line, 0, true));
        } else {
            edits.push(Edit::insert(comment.clone(), Position::new(*line, baseline)));
            placements.push((*line, baseline, false));
        }
    }

    let selections = tracked
        .iter()
        .map(|sel| {
            if sel.start.column != 0 || sel.is_empty() {
                return TrackedSelection::before_edit(*sel);
            }
            let mut end = sel.end;
            if let Some(&(_, insert_col, replaced)) =
                placements.iter().find(|(line, _, _)| *line == end.line)
                && end.column >= insert_col
            {
                end.column = if replaced {
                    baseline + comment_len
                } else {
                    end.column + comment_len
                };
            }
            TrackedSelection::manual(sel.with_range(sel.start, end))
        })
        .collect();

    EditDescriptor::new(edits, selections)
}

fn uncomment_lines(
    lines: &[(usize, String)],
    matcher: &LinePrefixes,
    tracked: &[Selection],
    options: &CommentOptions,
) -> EditDescriptor {
    let edits = lines
        .iter()
        .filter_map(|(line, text)| {
            let prefix = matcher.longest_match(text)?;
            let start = first_non_whitespace(text);
            let mut len = prefix.chars().count();
            let rest: String = text.chars().skip(start + len).collect();
            if !options.padding.is_empty() && rest.starts_with(options.padding.as_str()) {
                len += options.padding.chars().count();
            }
            Some(Edit::delete(
                Position::new(*line, start),
                Position::new(*line, start + len),
            ))
        })
        .collect();

    EditDescriptor::new(
        edits,
        tracked
            .iter()
            .copied()
            .map(TrackedSelection::before_edit)
            .collect(),
    )
}

use editor_comment::{
    CommentCommand, CommentDelimiters, CommentOptions, Document, Position, Selection, TextBuffer,
    execute_comment_command, toggle_line_comment,
};
use editor_comment_modes::ModeRegistry;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn toggle(doc: &mut Document, language: &str, options: &CommentOptions) {
    init_logging();
    let registry = ModeRegistry::with_builtins();
    let modes = registry.analyze(language, doc).unwrap();
    toggle_line_comment(doc, &modes, options).unwrap();
}

fn ranges(doc: &Document) -> Vec<(Position, Position)> {
    doc.selections().iter().map(|s| (s.start, s.end)).collect()
}

fn pos(line: usize, column: usize) -> Position {
    Position::new(line, column)
}

#[test]
fn test_single_line_round_trip() {
    let mut doc = Document::new("let x = 1;");
    doc.set_cursor(pos(0, 0));
    let options = CommentOptions::default();

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "//let x = 1;");
    assert_eq!(ranges(&doc), vec![(pos(0, 2), pos(0, 2))]);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "let x = 1;");
    assert_eq!(ranges(&doc), vec![(pos(0, 0), pos(0, 0))]);
}

#[test]
fn test_indented_line_keeps_caret_at_column_zero() {
    let text = "function f() {\n    if (x) {\n        b();\n        a();\n        c();\n    }\n    return 1;\n}";
    let mut doc = Document::new(text);
    doc.set_cursor(pos(3, 0));
    let options = CommentOptions::default().with_indent(true);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.line(3).unwrap(), "        //a();");
    assert_eq!(ranges(&doc), vec![(pos(3, 0), pos(3, 0))]);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), text);
    assert_eq!(ranges(&doc), vec![(pos(3, 0), pos(3, 0))]);
}

#[test]
fn test_padding_round_trip_restores_selection() {
    let mut doc = Document::new("a\n  b\nc");
    doc.set_selection(pos(0, 0), pos(2, 1));
    let options = CommentOptions::default().with_padding(" ");

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "// a\n//   b\n// c");
    assert_eq!(ranges(&doc), vec![(pos(0, 0), pos(2, 4))]);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "a\n  b\nc");
    assert_eq!(ranges(&doc), vec![(pos(0, 0), pos(2, 1))]);
}

#[test]
fn test_longest_prefix_is_removed() {
    let mut doc = Document::new("////x");
    doc.set_cursor(pos(0, 0));
    let options = CommentOptions::default().with_line_comment(&["//", "////", "#"][..]);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "x");
}

#[test]
fn test_any_uncommented_line_comments_all() {
    let mut doc = Document::new("//a\nb");
    doc.set_selection(pos(0, 0), pos(1, 1));

    toggle(&mut doc, "javascript", &CommentOptions::default());
    assert_eq!(doc.text(), "////a\n//b");
}

#[test]
fn test_indent_uses_shallowest_line_and_fills_blank_lines() {
    let mut doc = Document::new("  a\n    b\n\n  c");
    doc.set_selection(pos(0, 0), pos(3, 3));
    let options = CommentOptions::default().with_indent(true);

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "  //a\n  //  b\n  //\n  //c");
    assert_eq!(ranges(&doc), vec![(pos(0, 0), pos(3, 5))]);

    // The blank line keeps the baseline whitespace it gained.
    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "  a\n    b\n  \n  c");
}

#[test]
fn test_blank_line_respects_comment_blank_lines() {
    let mut doc = Document::new("a\n   \nb");
    doc.set_cursor(pos(1, 1));

    let skip = CommentOptions::default().with_comment_blank_lines(false);
    toggle(&mut doc, "javascript", &skip);
    assert_eq!(doc.text(), "a\n   \nb");
    assert_eq!(doc.undo_depth(), 0);

    toggle(&mut doc, "javascript", &CommentOptions::default());
    assert_eq!(doc.text(), "a\n//   \nb");
    assert_eq!(ranges(&doc), vec![(pos(1, 3), pos(1, 3))]);
}

#[test]
fn test_cursors_on_separate_lines() {
    let mut doc = Document::new("a\nb\nc\nd");
    doc.set_selections(vec![
        Selection::caret(pos(0, 0)),
        Selection::caret(pos(2, 0)),
    ]);

    toggle(&mut doc, "javascript", &CommentOptions::default());
    assert_eq!(doc.text(), "//a\nb\n//c\nd");
    assert_eq!(
        ranges(&doc),
        vec![(pos(0, 2), pos(0, 2)), (pos(2, 2), pos(2, 2))]
    );
    assert_eq!(doc.undo_depth(), 1);
    assert_eq!(doc.change_notifications(), 1);
}

#[test]
fn test_adjacent_cursors_toggle_lines_independently() {
    let mut doc = Document::new("//a\nb");
    doc.set_selections(vec![
        Selection::caret(pos(0, 1)),
        Selection::caret(pos(1, 1)),
    ]);

    toggle(&mut doc, "javascript", &CommentOptions::default());
    assert_eq!(doc.text(), "a\n//b");
    assert_eq!(
        ranges(&doc),
        vec![(pos(0, 0), pos(0, 0)), (pos(1, 3), pos(1, 3))]
    );
}

#[test]
fn test_embedded_script_uses_javascript_prefix() {
    let mut doc = Document::new("<script>\nvar a = 1;\n</script>");
    doc.set_cursor(pos(1, 0));

    toggle(&mut doc, "html", &CommentOptions::default());
    assert_eq!(doc.text(), "<script>\n//var a = 1;\n</script>");
}

#[test]
fn test_language_without_line_syntax_falls_back_to_block() {
    let mut doc = Document::new("<p>hi</p>");
    doc.set_cursor(pos(0, 2));

    toggle(&mut doc, "html", &CommentOptions::default());
    assert_eq!(doc.text(), "<!--<p>hi</p>-->");
    assert_eq!(ranges(&doc), vec![(pos(0, 6), pos(0, 6))]);
}

#[test]
fn test_whole_lines_fall_back_to_indented_block() {
    let text = "<div>\n  <p>one</p>\n  <p>two</p>\n</div>";
    let mut doc = Document::new(text);
    doc.set_selection(pos(1, 0), pos(3, 0));
    let options = CommentOptions::default().with_indent(true);

    toggle(&mut doc, "html", &options);
    assert_eq!(
        doc.text(),
        "<div>\n  <!--\n  <p>one</p>\n  <p>two</p>\n  -->\n</div>"
    );
    assert_eq!(ranges(&doc), vec![(pos(2, 0), pos(4, 0))]);

    toggle(&mut doc, "html", &options);
    assert_eq!(doc.text(), text);
    assert_eq!(ranges(&doc), vec![(pos(1, 0), pos(3, 0))]);
}

#[test]
fn test_get_mode_overrides_delimiters() {
    let mut doc = Document::new("let x;");
    doc.set_cursor(pos(0, 0));
    let options = CommentOptions::default().with_get_mode(|mode, _pos| {
        (mode.name() == "javascript").then(|| CommentDelimiters::line("#"))
    });

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "#let x;");
}

#[test]
fn test_language_without_comment_syntax_is_a_no_op() {
    let mut registry = ModeRegistry::new();
    registry
        .register(editor_comment_modes::LanguageDefinition::new(
            "plain",
            CommentDelimiters::default(),
        ))
        .unwrap();
    let mut doc = Document::new("text");
    doc.set_cursor(pos(0, 0));
    let modes = registry.analyze("plain", &doc).unwrap();

    execute_comment_command(
        CommentCommand::ToggleLineComment,
        &mut doc,
        &modes,
        &CommentOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.text(), "text");
    assert_eq!(doc.undo_depth(), 0);
}

#[test]
fn test_undo_restores_text_and_selections() {
    let mut doc = Document::new("a\nb");
    doc.set_selection(pos(0, 0), pos(1, 1));

    toggle(&mut doc, "python", &CommentOptions::default().with_padding(" "));
    assert_eq!(doc.text(), "# a\n# b");

    assert!(doc.undo());
    assert_eq!(doc.text(), "a\nb");
    assert_eq!(ranges(&doc), vec![(pos(0, 0), pos(1, 1))]);
}

#[test]
fn test_cursors_inside_one_block_fallback_uncomment_it_once() {
    let mut doc = Document::new("<!--\n<p>a</p>\n<p>b</p>\n-->\nc");
    doc.set_selections(vec![
        Selection::caret(pos(1, 1)),
        Selection::caret(pos(2, 1)),
    ]);

    toggle(&mut doc, "html", &CommentOptions::default());
    assert_eq!(doc.text(), "<p>a</p>\n<p>b</p>\nc");
    assert_eq!(
        ranges(&doc),
        vec![(pos(0, 1), pos(0, 1)), (pos(1, 1), pos(1, 1))]
    );
    assert_eq!(doc.undo_depth(), 1);
}

#[test]
fn test_direction_and_primary_flags_survive() {
    let mut doc = Document::new("a\nb");
    let selection = Selection::from_anchor_head(pos(1, 1), pos(0, 0)).primary();
    doc.set_selections(vec![selection]);
    let options = CommentOptions::default();

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "//a\n//b");
    let toggled = doc.selections();
    assert!(toggled[0].reversed && toggled[0].primary);
    assert_eq!(toggled[0].head(), pos(0, 0));

    toggle(&mut doc, "javascript", &options);
    assert_eq!(doc.text(), "a\nb");
    assert_eq!(doc.selections(), vec![selection]);
}

fn random_line(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..10);
    (0..len)
        .map(|_| *[b'a', b'b', b' ', b'x', b';', b'='].choose(rng).unwrap_or(&b'a') as char)
        .collect()
}

/// Sorted selections with distinct endpoints; some of them carets.
fn random_selections(rng: &mut StdRng, lines: &[String]) -> Vec<Selection> {
    let positions: Vec<Position> = lines
        .iter()
        .enumerate()
        .flat_map(|(line, text)| (0..=text.chars().count()).map(move |col| pos(line, col)))
        .collect();
    let count = rng.gen_range(1..=4).min(positions.len() / 2) * 2;
    let mut chosen: Vec<Position> = positions.choose_multiple(rng, count).copied().collect();
    chosen.sort();
    chosen
        .chunks(2)
        .map(|pair| {
            if rng.gen_bool(0.3) {
                Selection::caret(pair[0])
            } else {
                Selection::new(pair[0], pair[1])
            }
        })
        .collect()
}

#[test]
fn test_toggling_twice_restores_text_and_selections() {
    let mut rng = StdRng::seed_from_u64(0x11e);
    let options = CommentOptions::default();

    for _ in 0..200 {
        let line_count = rng.gen_range(1..7);
        let lines: Vec<String> = (0..line_count).map(|_| random_line(&mut rng)).collect();
        let selections = random_selections(&mut rng, &lines);
        if selections.is_empty() {
            continue;
        }
        let text = lines.join("\n");
        let mut doc = Document::new(&text);
        doc.set_selections(selections);
        let before = doc.selections();

        toggle(&mut doc, "javascript", &options);
        assert_ne!(doc.text(), text);

        toggle(&mut doc, "javascript", &options);
        assert_eq!(doc.text(), text);
        assert_eq!(doc.selections(), before, "{text:?}");
    }
}

use editor_comment::{CommentCommand, CommentOptions, Document, Position, execute_comment_command};
use editor_comment_modes::ModeRegistry;

fn main() {
    env_logger::init();

    let registry = ModeRegistry::with_builtins();
    let mut doc = Document::new(
        "<ul>\n  <li>one</li>\n</ul>\n<script>\n  let total = 1 + 2;\n</script>",
    );
    let options = CommentOptions::default().with_padding(" ").with_indent(true);

    // Line comment inside the embedded script.
    doc.set_cursor(Position::new(4, 2));
    let modes = registry.analyze("html", &doc).unwrap();
    execute_comment_command(CommentCommand::ToggleLineComment, &mut doc, &modes, &options)
        .unwrap();

    // HTML has no line comments, so the line command puts the list item in a block.
    doc.set_cursor(Position::new(1, 4));
    let modes = registry.analyze("html", &doc).unwrap();
    execute_comment_command(CommentCommand::ToggleLineComment, &mut doc, &modes, &options)
        .unwrap();

    assert_eq!(
        doc.text(),
        "<ul>\n  <!--\n  <li>one</li>\n  -->\n</ul>\n<script>\n  // let total = 1 + 2;\n</script>"
    );
    println!("{}", doc.text());
}

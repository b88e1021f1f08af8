use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_comment::{
    CommentOptions, Document, Position, Selection, TextBuffer, toggle_block_comment,
    toggle_line_comment,
};
use editor_comment_modes::ModeRegistry;

fn large_source(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 48);
    for i in 0..line_count {
        if i % 10 == 0 {
            out.push_str(&format!("    // note {i}\n"));
        } else {
            out.push_str(&format!("    let value_{i} = compute({i}, \"text\");\n"));
        }
    }
    out.pop();
    out
}

fn bench_analyze(c: &mut Criterion) {
    let registry = ModeRegistry::with_builtins();
    let doc = Document::new(&large_source(10_000));
    c.bench_function("analyze/javascript_10k_lines", |b| {
        b.iter(|| {
            let modes = registry.analyze("javascript", black_box(&doc)).unwrap();
            black_box(modes.line_count());
        })
    });
}

fn bench_line_toggle_whole_file(c: &mut Criterion) {
    let registry = ModeRegistry::with_builtins();
    let text = large_source(10_000);
    c.bench_function("toggle_line/whole_file_10k_lines", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::new(&text);
                doc.set_selection(Position::new(0, 0), Position::new(9_999, 0));
                let modes = registry.analyze("javascript", &doc).unwrap();
                (doc, modes)
            },
            |(mut doc, modes)| {
                toggle_line_comment(&mut doc, &modes, &CommentOptions::default()).unwrap();
                black_box(doc.char_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_block_toggle_many_cursors(c: &mut Criterion) {
    let registry = ModeRegistry::with_builtins();
    let text = large_source(2_000);
    c.bench_function("toggle_block/1k_selections", |b| {
        b.iter_batched(
            || {
                let mut doc = Document::new(&text);
                let selections = (0..1_000)
                    .map(|i| {
                        let line = i * 2 + 1;
                        Selection::new(Position::new(line, 8), Position::new(line, 13))
                    })
                    .collect();
                doc.set_selections(selections);
                let modes = registry.analyze("javascript", &doc).unwrap();
                (doc, modes)
            },
            |(mut doc, modes)| {
                toggle_block_comment(&mut doc, &modes, &CommentOptions::default()).unwrap();
                black_box(doc.char_count());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_analyze,
    bench_line_toggle_whole_file,
    bench_block_toggle_many_cursors
);
criterion_main!(benches);

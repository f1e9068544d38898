use cms_core::{
    Align, Block, BlockFormat, BlockKind, ContainerKind, Document, Editor, HistoryConfig,
    ListKind, Mark, Node, Position, Selection,
};

fn editor_with(blocks: Vec<Block>) -> Editor {
    Editor::new(Document::from_blocks(blocks), HistoryConfig::default())
}

fn paragraphs(texts: &[&str]) -> Vec<Block> {
    texts
        .iter()
        .map(|text| Block::with_text(BlockKind::Paragraph, *text))
        .collect()
}

#[test]
fn document_stays_valid_through_block_transitions() {
    let mut editor = editor_with(paragraphs(&["a", "b", "c"]));
    let formats = [
        BlockFormat::BulletedList,
        BlockFormat::NumberedList,
        BlockFormat::CodeBlock,
        BlockFormat::HeadingTwo,
        BlockFormat::BulletedList,
        BlockFormat::BulletedList,
        BlockFormat::BlockQuote,
    ];
    for (step, format) in formats.into_iter().enumerate() {
        let first = step % 3;
        editor.set_selection(Selection::new(Position::new(first, 0), Position::new(2, 1)));
        editor.toggle_block(format);
        assert!(editor.document().is_valid(), "invalid after {format:?}");
        assert!(!editor.document().blocks().is_empty());
    }

    editor.select_all();
    editor.delete_backward();
    assert!(editor.document().is_valid());
    assert_eq!(editor.document().blocks().len(), 1);
}

#[test]
fn toggling_a_mark_twice_restores_the_document() {
    let mut editor = editor_with(paragraphs(&["hello world"]));
    let original = editor.document().clone();
    editor.set_selection(Selection::within(0, 2, 8));

    editor.toggle_mark(Mark::Underline);
    assert!(editor.is_mark_active(Mark::Underline));
    editor.toggle_mark(Mark::Underline);
    assert!(!editor.is_mark_active(Mark::Underline));
    assert_eq!(editor.document(), &original);
}

#[test]
fn list_toggle_twice_returns_to_paragraphs() {
    let mut editor = editor_with(paragraphs(&["one", "two"]));
    let original = editor.document().clone();
    editor.set_selection(Selection::new(Position::new(0, 0), Position::new(1, 3)));

    editor.toggle_block(BlockFormat::NumberedList);
    assert_eq!(editor.container_kind(), ContainerKind::List(ListKind::Numbered));
    assert_eq!(editor.document().blocks().len(), 1);
    assert_eq!(editor.document().blocks()[0].children.len(), 2);

    editor.toggle_block(BlockFormat::NumberedList);
    assert_eq!(editor.container_kind(), ContainerKind::Paragraph);
    assert_eq!(editor.document(), &original);
}

#[test]
fn switching_list_kind_rewraps_selected_items() {
    let mut editor = editor_with(paragraphs(&["a", "b", "c"]));
    editor.set_selection(Selection::new(Position::new(0, 0), Position::new(2, 1)));
    editor.toggle_block(BlockFormat::BulletedList);

    editor.set_selection(Selection::caret(Position::new(1, 0)));
    editor.toggle_block(BlockFormat::NumberedList);

    let kinds: Vec<BlockKind> = editor.document().blocks().iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::BulletedList,
            BlockKind::NumberedList,
            BlockKind::BulletedList
        ]
    );
    assert!(editor.is_block_active(BlockFormat::NumberedList));
}

#[test]
fn code_block_drops_marks_and_alignment() {
    let mut editor = editor_with(vec![
        Block::with_text(BlockKind::Paragraph, "x = 1").aligned(Align::Center)
    ]);
    editor.select_all();
    editor.toggle_mark(Mark::Bold);
    editor.toggle_block(BlockFormat::CodeBlock);

    let block = &editor.document().blocks()[0];
    assert_eq!(block.kind, BlockKind::CodeBlock);
    assert_eq!(block.align, None);
    assert!(matches!(&block.children[0], Node::Text(t) if t.marks.is_plain()));
    assert_eq!(editor.to_html(), "<pre><code>x = 1</code></pre>");
}

#[test]
fn collapsed_link_insert_uses_trimmed_url_as_text() {
    let mut editor = editor_with(paragraphs(&["go "]));
    editor.set_selection(Selection::caret(Position::new(0, 3)));
    editor.upsert_link("  https://example.com  ");

    assert_eq!(
        editor.to_html(),
        "<p class=\"text-right\">go <a href=\"https://example.com\" class=\"text-primary underline\">https://example.com</a></p>"
    );
    assert_eq!(editor.selection(), Selection::caret(Position::new(0, 22)));
}

#[test]
fn disallowed_link_scheme_is_stored_but_rendered_as_placeholder() {
    let mut editor = editor_with(paragraphs(&["click here"]));
    editor.set_selection(Selection::within(0, 0, 5));
    editor.upsert_link("javascript:alert(1)");

    let html = editor.to_html();
    assert!(html.contains("href=\"#\""));
    assert!(!html.contains("javascript:"));
    assert!(editor.document().blocks()[0]
        .children
        .iter()
        .any(|child| matches!(child, Node::Link(link) if link.url == "javascript:alert(1)")));
}

#[test]
fn toggling_a_mark_across_a_code_block_is_symmetric() {
    let mut blocks = paragraphs(&["para"]);
    blocks.push(Block::with_text(BlockKind::CodeBlock, "code"));
    let mut editor = editor_with(blocks);
    let original = editor.document().clone();
    editor.set_selection(Selection::new(Position::new(0, 0), Position::new(1, 4)));

    editor.toggle_mark(Mark::Bold);
    assert!(editor.is_mark_active(Mark::Bold));
    editor.toggle_mark(Mark::Bold);
    assert!(!editor.is_mark_active(Mark::Bold));
    assert_eq!(editor.document(), &original);
}

#[test]
fn range_link_can_be_updated_and_unwrapped() {
    let mut editor = editor_with(paragraphs(&["read the docs"]));
    editor.set_selection(Selection::within(0, 9, 13));
    editor.upsert_link("https://a.example");

    editor.set_selection(Selection::caret(Position::new(0, 11)));
    assert_eq!(
        editor.active_link_url().as_deref(),
        Some("https://a.example")
    );
    editor.upsert_link("https://b.example");
    assert_eq!(
        editor.active_link_url().as_deref(),
        Some("https://b.example")
    );

    editor.unwrap_link();
    assert_eq!(editor.active_link_url(), None);
    assert_eq!(editor.to_html(), "<p class=\"text-right\">read the docs</p>");
}

#[test]
fn empty_url_removes_existing_link() {
    let mut editor = editor_with(paragraphs(&["link"]));
    editor.select_all();
    editor.upsert_link("https://x.example");
    editor.set_selection(Selection::caret(Position::new(0, 2)));
    editor.upsert_link("   ");
    assert_eq!(editor.to_html(), "<p class=\"text-right\">link</p>");
}

#[test]
fn caret_at_link_edge_is_outside_the_link() {
    let mut editor = editor_with(paragraphs(&["ab"]));
    editor.set_selection(Selection::within(0, 0, 2));
    editor.upsert_link("https://x.example");
    editor.set_selection(Selection::caret(Position::new(0, 2)));
    assert_eq!(editor.active_link_url(), None);

    editor.insert_text("c");
    assert!(editor.to_html().ends_with("ab</a>c</p>"));
}

#[test]
fn alignment_targets_alignable_blocks() {
    let mut editor = editor_with(paragraphs(&["a", "b"]));
    editor.select_all();
    editor.set_align(Align::Left);
    assert_eq!(editor.active_align(), Align::Left);
    assert_eq!(
        editor.to_html(),
        "<p class=\"text-left\">a</p><p class=\"text-left\">b</p>"
    );
}

#[test]
fn undo_redo_walks_the_edit_sequence() {
    let mut editor = Editor::default();
    editor.insert_text("T");
    editor.insert_text("itle");
    editor.toggle_block(BlockFormat::HeadingTwo);
    editor.insert_break();
    editor.insert_text("body");

    let full = editor.to_html();
    assert_eq!(
        full,
        "<h2 class=\"text-right\">Title</h2><h2 class=\"text-right\">body</h2>"
    );

    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.to_html(), "<h2 class=\"text-right\">Title</h2>");
    assert!(editor.undo());
    assert_eq!(editor.to_html(), "<p class=\"text-right\">Title</p>");
    assert!(editor.undo());
    assert!(editor.is_content_empty());
    assert!(!editor.can_undo());

    while editor.redo() {}
    assert_eq!(editor.to_html(), full);

    editor.undo();
    editor.insert_text("!");
    assert!(!editor.can_redo());
}

#[test]
fn history_depth_is_bounded() {
    let mut editor = Editor::new(Document::new(), HistoryConfig { max_depth: 2 });
    for _ in 0..4 {
        editor.insert_break();
    }
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.document().blocks().len(), 3);
}

use cms_core::{to_html, Align, Block, BlockKind, Document, Editor, Link, Mark, Node, Text};

#[test]
fn bold_hello_scenario_renders_strong_paragraph() {
    let mut editor = Editor::default();
    editor.insert_text("Hello");
    editor.select_all();
    editor.toggle_mark(Mark::Bold);
    assert_eq!(
        editor.to_html(),
        "<p class=\"text-right\"><strong>Hello</strong></p>"
    );
}

#[test]
fn script_text_is_escaped() {
    let document = Document::from_blocks(vec![Block::with_text(
        BlockKind::Paragraph,
        "<script>alert('x')</script>",
    )]);
    assert_eq!(
        to_html(&document),
        "<p class=\"text-right\">&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;</p>"
    );
}

#[test]
fn javascript_href_is_replaced_with_placeholder() {
    let document = Document::from_blocks(vec![Block::new(
        BlockKind::Paragraph,
        vec![Node::Link(Link::new(
            "  JavaScript:alert(1)",
            vec![Text::plain("click")],
        ))],
    )]);
    let html = to_html(&document);
    assert!(html.contains("href=\"#\""));
    assert!(!html.to_lowercase().contains("javascript"));
}

#[test]
fn link_urls_are_attribute_escaped() {
    let document = Document::from_blocks(vec![Block::new(
        BlockKind::Paragraph,
        vec![Node::Link(Link::new(
            "https://x.y/?a=1&b=\"2\"",
            vec![Text::plain("q")],
        ))],
    )]);
    assert!(to_html(&document)
        .contains("href=\"https://x.y/?a=1&amp;b=&quot;2&quot;\" class=\"text-primary underline\""));
}

#[test]
fn alignment_classes_apply_to_alignable_blocks_only() {
    let document = Document::from_blocks(vec![
        Block::with_text(BlockKind::BlockQuote, "q").aligned(Align::Left),
        Block::with_text(BlockKind::HeadingTwo, "h"),
        Block::new(
            BlockKind::BulletedList,
            vec![Node::Block(Block::with_text(BlockKind::ListItem, "i"))],
        ),
    ]);
    assert_eq!(
        to_html(&document),
        "<blockquote class=\"text-left\">q</blockquote><h2 class=\"text-right\">h</h2><ul><li>i</li></ul>"
    );
}

#[test]
fn serializing_twice_yields_identical_html() {
    let mut editor = Editor::default();
    editor.insert_text("one");
    editor.insert_break();
    editor.insert_text("two");
    assert_eq!(editor.to_html(), editor.to_html());
    assert_eq!(
        editor.to_html(),
        "<p class=\"text-right\">one</p><p class=\"text-right\">two</p>"
    );
}

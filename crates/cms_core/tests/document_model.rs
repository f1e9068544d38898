use cms_core::{validate, Align, Block, BlockKind, Document, Link, Node, Text};
use serde_json::json;

#[test]
fn default_document_is_single_empty_right_paragraph() {
    let document = Document::new();
    assert!(validate(&document));
    assert_eq!(
        serde_json::to_value(&document).unwrap(),
        json!([{ "type": "paragraph", "align": "right", "children": [{ "text": "" }] }])
    );
}

#[test]
fn stored_json_round_trips_through_load() {
    let value = json!([
        { "type": "heading-two", "align": "center", "children": [{ "text": "Title", "bold": true }] },
        { "type": "paragraph", "children": [
            { "text": "see " },
            { "type": "link", "url": "https://example.com", "children": [{ "text": "docs" }] },
            { "text": "" }
        ]},
        { "type": "bulleted-list", "children": [
            { "type": "list-item", "children": [{ "text": "one" }] },
            { "type": "list-item", "children": [{ "text": "two", "italic": true }] }
        ]},
        { "type": "code-block", "children": [{ "text": "let x = 1;" }] }
    ]);

    let document = Document::load_or_default(Some(value.clone()));
    assert_eq!(document.blocks().len(), 4);
    assert_eq!(document.blocks()[0].align, Some(Align::Center));
    assert_eq!(serde_json::to_value(&document).unwrap(), value);
}

#[test]
fn absent_undecodable_or_invalid_input_loads_default() {
    assert_eq!(Document::load_or_default(None), Document::new());
    assert_eq!(
        Document::load_or_default(Some(json!({ "not": "a list" }))),
        Document::new()
    );
    assert_eq!(
        Document::load_or_default(Some(json!([{ "type": "image", "children": [] }]))),
        Document::new()
    );
    assert_eq!(Document::load_or_default(Some(json!([]))), Document::new());
    assert_eq!(
        Document::load_or_default(Some(json!([
            { "type": "bulleted-list", "children": [{ "text": "loose" }] }
        ]))),
        Document::new()
    );
}

#[test]
fn legacy_heading_one_reads_as_heading_two() {
    let document = Document::load_or_default(Some(json!([
        { "type": "heading-one", "children": [{ "text": "Old" }] }
    ])));
    assert_eq!(document.blocks()[0].kind, BlockKind::HeadingTwo);
}

#[test]
fn validator_rejects_each_structural_violation() {
    let empty_block = Document::from_unchecked(vec![Block::new(BlockKind::Paragraph, vec![])]);
    assert!(!validate(&empty_block));

    let top_level_item =
        Document::from_unchecked(vec![Block::with_text(BlockKind::ListItem, "x")]);
    assert!(!validate(&top_level_item));

    let aligned_list = Document::from_unchecked(vec![Block::new(
        BlockKind::NumberedList,
        vec![Node::Block(Block::with_text(BlockKind::ListItem, "x"))],
    )
    .aligned(Align::Left)]);
    assert!(!validate(&aligned_list));

    let nested_block = Document::from_unchecked(vec![Block::new(
        BlockKind::Paragraph,
        vec![Node::Block(Block::with_text(BlockKind::Paragraph, "inner"))],
    )]);
    assert!(!validate(&nested_block));

    let empty_link = Document::from_unchecked(vec![Block::new(
        BlockKind::Paragraph,
        vec![Node::Link(Link::new("https://x.y", vec![]))],
    )]);
    assert!(!validate(&empty_link));

    assert!(!validate(&Document::from_unchecked(vec![])));
}

#[test]
fn from_blocks_repairs_into_valid_documents() {
    let document = Document::from_blocks(vec![
        Block::with_text(BlockKind::ListItem, "stray"),
        Block::new(BlockKind::BulletedList, vec![Node::Text(Text::plain("loose"))]),
        Block::new(BlockKind::Paragraph, vec![]),
    ]);
    assert!(validate(&document));
    assert_eq!(document.blocks()[0].kind, BlockKind::Paragraph);
    assert_eq!(Document::from_blocks(vec![]), Document::new());
}

#[test]
fn stale_align_and_code_marks_from_stored_bodies_are_dropped() {
    let document = Document::load_or_default(Some(json!([
        { "type": "paragraph", "align": "right", "children": [{ "text": "intro" }] },
        { "type": "bulleted-list", "children": [
            { "type": "list-item", "align": "right", "children": [{ "text": "point" }] }
        ] },
        { "type": "code-block", "align": "right", "children": [
            { "text": "let x = 1;", "bold": true }
        ] }
    ])));

    assert!(validate(&document));
    assert_eq!(document.blocks().len(), 3);
    assert_eq!(document.blocks()[0].align, Some(Align::Right));
    let Node::Block(item) = &document.blocks()[1].children[0] else {
        panic!("expected list item");
    };
    assert_eq!(item.text(), "point");
    assert_eq!(item.align, None);
    assert_eq!(document.blocks()[2].align, None);
    assert_eq!(
        document.blocks()[2].children,
        vec![Node::Text(Text::plain("let x = 1;"))]
    );
}

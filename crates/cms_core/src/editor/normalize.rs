//! Normalization pass restoring document invariants after an edit.
//!
//! # Responsibility
//! - Repair structure by converting, hoisting or inserting nodes.
//! - Canonicalize inline runs (merge equal marks, keep runs around links).
//!
//! # Invariants
//! - Text is never dropped; only empty runs and empty links disappear.
//! - The output satisfies `model::document::validate`.
//! - Running the pass twice yields the same document.

use crate::model::document::{Block, BlockKind, Document, Link, Node, Text};

/// Normalizes `document` in place.
pub fn normalize(document: &mut Document) {
    let blocks = std::mem::take(&mut document.blocks);
    let mut out = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        if block.kind.is_list() {
            out.push(normalize_list(block));
        } else {
            if block.kind == BlockKind::ListItem {
                // A list item outside of a list reads as a paragraph.
                block.kind = BlockKind::Paragraph;
            }
            out.push(normalize_text_block(block));
        }
    }
    if out.is_empty() {
        out = Document::new().blocks;
    }
    document.blocks = out;
}

fn normalize_list(list: Block) -> Block {
    let mut items = Vec::new();
    collect_list_items(list.children, &mut items);
    if items.is_empty() {
        items.push(Node::Block(Block::empty(BlockKind::ListItem)));
    }
    Block {
        kind: list.kind,
        align: None,
        children: items,
    }
}

fn collect_list_items(children: Vec<Node>, items: &mut Vec<Node>) {
    let mut loose = Vec::new();
    for child in children {
        match child {
            Node::Block(block) if block.kind.is_list() => {
                flush_loose(&mut loose, items);
                collect_list_items(block.children, items);
            }
            Node::Block(mut block) => {
                flush_loose(&mut loose, items);
                block.kind = BlockKind::ListItem;
                items.push(Node::Block(normalize_text_block(block)));
            }
            inline => loose.push(inline),
        }
    }
    flush_loose(&mut loose, items);
}

fn flush_loose(loose: &mut Vec<Node>, items: &mut Vec<Node>) {
    if loose.is_empty() {
        return;
    }
    let item = Block::new(BlockKind::ListItem, std::mem::take(loose));
    items.push(Node::Block(normalize_text_block(item)));
}

fn normalize_text_block(block: Block) -> Block {
    let code = block.kind == BlockKind::CodeBlock;
    let mut inlines = Vec::new();
    collect_inlines(block.children, code, &mut inlines);
    Block {
        kind: block.kind,
        align: block.align.filter(|_| block.kind.is_alignable()),
        children: canonical_inlines(inlines),
    }
}

/// Flattens nested blocks into their inline runs. Inside code blocks links
/// dissolve into text and marks are cleared.
fn collect_inlines(children: Vec<Node>, code: bool, out: &mut Vec<Node>) {
    for child in children {
        match child {
            Node::Text(mut text) => {
                if code {
                    text.marks = Default::default();
                }
                out.push(Node::Text(text));
            }
            Node::Link(link) if code => {
                for text in link.children {
                    out.push(Node::Text(Text::plain(text.text)));
                }
            }
            Node::Link(link) => out.push(Node::Link(link)),
            Node::Block(block) => collect_inlines(block.children, code, out),
        }
    }
}

fn canonical_inlines(inlines: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(inlines.len());
    for node in inlines {
        match node {
            Node::Text(text) => push_text(&mut out, text),
            Node::Link(link) => {
                let link = normalize_link(link);
                if link.children.is_empty() {
                    continue;
                }
                if !matches!(out.last(), Some(Node::Text(_))) {
                    out.push(Node::Text(Text::default()));
                }
                out.push(Node::Link(link));
            }
            Node::Block(block) => push_text(&mut out, Text::plain(block.text())),
        }
    }
    if !matches!(out.last(), Some(Node::Text(_))) {
        out.push(Node::Text(Text::default()));
    }
    out
}

fn push_text(out: &mut Vec<Node>, text: Text) {
    if let Some(Node::Text(previous)) = out.last_mut() {
        if previous.is_empty() {
            *previous = text;
            return;
        }
        if text.is_empty() {
            return;
        }
        if previous.marks == text.marks {
            previous.text.push_str(&text.text);
            return;
        }
    }
    out.push(Node::Text(text));
}

fn normalize_link(link: Link) -> Link {
    let mut runs: Vec<Text> = Vec::with_capacity(link.children.len());
    for text in link.children {
        if text.is_empty() {
            continue;
        }
        match runs.last_mut() {
            Some(previous) if previous.marks == text.marks => previous.text.push_str(&text.text),
            _ => runs.push(text),
        }
    }
    Link::new(link.url, runs)
}

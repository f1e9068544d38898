//! Block-type transitions and link lifecycle.
//!
//! # Responsibility
//! - Move selected blocks between paragraph, heading, quote, code and list
//!   containers through one unwrap-then-apply algorithm.
//! - Insert, update and remove inline links.
//!
//! # Invariants
//! - Every transition first unwraps enclosing lists; list kinds are never
//!   switched in place.
//! - Every operation ends with normalization, so the document stays valid.
//! - Text block ordinals are unchanged by block transitions, so a selection
//!   stays meaningful across them.

use crate::editor::inline::{child_spans, split_children_at};
use crate::editor::normalize::normalize;
use crate::editor::selection::{
    block_at, block_at_mut, clamp_selection, parent_list_kind, segments, Position, Segment,
    Selection,
};
use crate::model::document::{Block, BlockKind, Document, Link, ListKind, Node, Text};
use serde::{Deserialize, Serialize};

/// Target of a toolbar block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockFormat {
    Paragraph,
    HeadingTwo,
    HeadingThree,
    BlockQuote,
    CodeBlock,
    BulletedList,
    NumberedList,
}

impl BlockFormat {
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            Self::BulletedList => Some(ListKind::Bulleted),
            Self::NumberedList => Some(ListKind::Numbered),
            _ => None,
        }
    }

    /// Kind the selected text blocks take when the format is switched on.
    pub fn block_kind(self) -> BlockKind {
        match self {
            Self::Paragraph => BlockKind::Paragraph,
            Self::HeadingTwo => BlockKind::HeadingTwo,
            Self::HeadingThree => BlockKind::HeadingThree,
            Self::BlockQuote => BlockKind::BlockQuote,
            Self::CodeBlock => BlockKind::CodeBlock,
            Self::BulletedList | Self::NumberedList => BlockKind::ListItem,
        }
    }
}

/// Structural state of the block holding the selection start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Paragraph,
    HeadingTwo,
    HeadingThree,
    Quote,
    Code,
    List(ListKind),
}

/// Steps of one block toggle, derived from the target and its active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TogglePlan {
    /// Always set: transitions start from a list-free state.
    pub unwrap_lists: bool,
    pub set_kind: BlockKind,
    pub wrap_in: Option<ListKind>,
}

impl TogglePlan {
    pub fn new(format: BlockFormat, is_active: bool) -> Self {
        if is_active {
            return Self {
                unwrap_lists: true,
                set_kind: BlockKind::Paragraph,
                wrap_in: None,
            };
        }
        Self {
            unwrap_lists: true,
            set_kind: format.block_kind(),
            wrap_in: format.list_kind(),
        }
    }
}

/// Returns the container kind at the start of the selection.
pub fn container_kind(document: &Document, selection: &Selection) -> ContainerKind {
    let Some(segment) = segments(document, selection).into_iter().next() else {
        return ContainerKind::Paragraph;
    };
    if let Some(list) = parent_list_kind(document, segment.path).and_then(BlockKind::list_kind) {
        return ContainerKind::List(list);
    }
    match block_at(document, segment.path).map(|block| block.kind) {
        Some(BlockKind::HeadingTwo) => ContainerKind::HeadingTwo,
        Some(BlockKind::HeadingThree) => ContainerKind::HeadingThree,
        Some(BlockKind::BlockQuote) => ContainerKind::Quote,
        Some(BlockKind::CodeBlock) => ContainerKind::Code,
        _ => ContainerKind::Paragraph,
    }
}

/// Returns whether any selected block is already in `format`.
pub fn is_block_active(document: &Document, selection: &Selection, format: BlockFormat) -> bool {
    segments(document, selection)
        .into_iter()
        .any(|segment| match format.list_kind() {
            Some(list) => parent_list_kind(document, segment.path) == Some(list.block_kind()),
            None => block_at(document, segment.path)
                .is_some_and(|block| block.kind == format.block_kind()),
        })
}

/// Toggles the selected blocks into or out of `format`.
pub fn toggle_block(document: &mut Document, selection: &Selection, format: BlockFormat) {
    let selection = clamp_selection(document, selection);
    let plan = TogglePlan::new(format, is_block_active(document, &selection, format));
    let first = selection.start().block;
    let last = selection.end().block;

    let selected = unwrap_selected(document, first, last, plan.unwrap_lists);

    for &index in &selected {
        let block = &mut document.blocks[index];
        block.kind = plan.set_kind;
        if !plan.set_kind.is_alignable() {
            block.align = None;
        }
    }

    if let (Some(list), Some(&from), Some(&to)) = (plan.wrap_in, selected.first(), selected.last())
    {
        let items = document
            .blocks
            .drain(from..=to)
            .map(Node::Block)
            .collect::<Vec<_>>();
        document
            .blocks
            .insert(from, Block::new(list.block_kind(), items));
    }

    normalize(document);
}

/// Lifts selected list items to top level, splitting their lists at the
/// selection edges. Returns top-level indices of the selected text blocks.
fn unwrap_selected(document: &mut Document, first: usize, last: usize, unwrap: bool) -> Vec<usize> {
    let is_selected = |ordinal: usize| ordinal >= first && ordinal <= last;
    let mut ordinal = 0;
    let mut selected = Vec::new();
    let mut out: Vec<Block> = Vec::with_capacity(document.blocks.len());

    for block in std::mem::take(&mut document.blocks) {
        if !block.kind.is_list() {
            if is_selected(ordinal) {
                selected.push(out.len());
            }
            ordinal += 1;
            out.push(block);
            continue;
        }

        let list_kind = block.kind;
        let mut piece: Vec<Node> = Vec::new();
        for child in block.children {
            match child {
                Node::Block(item) if item.kind == BlockKind::ListItem => {
                    let lift = unwrap && is_selected(ordinal);
                    ordinal += 1;
                    if lift {
                        if !piece.is_empty() {
                            out.push(Block::new(list_kind, std::mem::take(&mut piece)));
                        }
                        selected.push(out.len());
                        out.push(item);
                    } else {
                        piece.push(Node::Block(item));
                    }
                }
                other => piece.push(other),
            }
        }
        if !piece.is_empty() {
            out.push(Block::new(list_kind, piece));
        }
    }

    document.blocks = out;
    selected
}

/// Indices of links intersecting the selection inside one segment.
///
/// Collapsed carets match links that strictly contain them; ranges match
/// links they overlap.
fn links_in_segment(block: &Block, segment: &Segment, collapsed: bool) -> Vec<usize> {
    child_spans(&block.children)
        .into_iter()
        .filter(|(index, start, end)| {
            if !matches!(block.children[*index], Node::Link(_)) {
                return false;
            }
            if collapsed {
                *start < segment.start && segment.start < *end
            } else {
                !segment.is_empty() && segment.start < *end && segment.end > *start
            }
        })
        .map(|(index, _, _)| index)
        .collect()
}

/// Url of the first link intersecting the selection.
pub fn active_link_url(document: &Document, selection: &Selection) -> Option<String> {
    let selection = clamp_selection(document, selection);
    for segment in segments(document, &selection) {
        let Some(block) = block_at(document, segment.path) else {
            continue;
        };
        for index in links_in_segment(block, &segment, selection.is_collapsed()) {
            if let Node::Link(link) = &block.children[index] {
                return Some(link.url.clone());
            }
        }
    }
    None
}

/// Returns whether the selection touches a link.
pub fn is_link_active(document: &Document, selection: &Selection) -> bool {
    active_link_url(document, selection).is_some()
}

/// Creates or updates a link and returns the resulting selection.
///
/// An empty url (after trimming) removes the link instead.
pub fn upsert_link(document: &mut Document, selection: &Selection, raw_url: &str) -> Selection {
    let url = raw_url.trim();
    let selection = clamp_selection(document, selection);
    if url.is_empty() {
        unwrap_link(document, &selection);
        return selection;
    }

    if is_link_active(document, &selection) {
        let collapsed = selection.is_collapsed();
        for segment in segments(document, &selection) {
            let Some(block) = block_at_mut(document, segment.path) else {
                continue;
            };
            for index in links_in_segment(block, &segment, collapsed) {
                if let Node::Link(link) = &mut block.children[index] {
                    link.url = url.to_string();
                }
            }
        }
        return selection;
    }

    if selection.is_collapsed() {
        let caret = selection.focus;
        let Some(segment) = segments(document, &selection).into_iter().next() else {
            return selection;
        };
        if let Some(block) = block_at_mut(document, segment.path) {
            split_children_at(&mut block.children, caret.offset);
            let index = child_spans(&block.children)
                .iter()
                .filter(|(_, _, end)| *end <= caret.offset)
                .count();
            let link = Link::new(url, vec![Text::plain(url)]);
            block.children.insert(index, Node::Link(link));
        }
        normalize(document);
        return Selection::caret(Position::new(
            caret.block,
            caret.offset + url.chars().count(),
        ));
    }

    for segment in segments(document, &selection) {
        if segment.is_empty() {
            continue;
        }
        let Some(block) = block_at_mut(document, segment.path) else {
            continue;
        };
        if block.kind == BlockKind::CodeBlock {
            continue;
        }
        split_children_at(&mut block.children, segment.end);
        split_children_at(&mut block.children, segment.start);
        let covered: Vec<usize> = child_spans(&block.children)
            .into_iter()
            .filter(|(_, start, end)| *start >= segment.start && *end <= segment.end)
            .map(|(index, _, _)| index)
            .collect();
        let (Some(&from), Some(&to)) = (covered.first(), covered.last()) else {
            continue;
        };
        let mut runs = Vec::new();
        for node in block.children.drain(from..=to) {
            match node {
                Node::Text(text) => runs.push(text),
                Node::Link(link) => runs.extend(link.children),
                Node::Block(inner) => runs.push(Text::plain(inner.text())),
            }
        }
        block.children.insert(from, Node::Link(Link::new(url, runs)));
    }
    normalize(document);
    selection.collapse_to_end()
}

/// Removes links around the selection, keeping their text.
///
/// A caret unwraps the whole link holding it; a range unwraps only the
/// selected part, splitting the link at the range edges.
pub fn unwrap_link(document: &mut Document, selection: &Selection) {
    let selection = clamp_selection(document, selection);
    let collapsed = selection.is_collapsed();
    let mut changed = false;

    for segment in segments(document, &selection) {
        let Some(block) = block_at_mut(document, segment.path) else {
            continue;
        };
        if links_in_segment(block, &segment, collapsed).is_empty() {
            continue;
        }
        if !collapsed {
            split_children_at(&mut block.children, segment.end);
            split_children_at(&mut block.children, segment.start);
        }
        let targets = if collapsed {
            links_in_segment(block, &segment, true)
        } else {
            child_spans(&block.children)
                .into_iter()
                .filter(|(index, start, end)| {
                    matches!(block.children[*index], Node::Link(_))
                        && *start >= segment.start
                        && *end <= segment.end
                })
                .map(|(index, _, _)| index)
                .collect()
        };
        for index in targets.into_iter().rev() {
            if let Node::Link(link) = block.children.remove(index) {
                let runs = link.children.into_iter().map(Node::Text);
                block.children.splice(index..index, runs);
                changed = true;
            }
        }
    }

    if changed {
        normalize(document);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        container_kind, is_block_active, toggle_block, upsert_link, BlockFormat, ContainerKind,
        TogglePlan,
    };
    use crate::editor::selection::{Position, Selection};
    use crate::model::document::{Block, BlockKind, Document, ListKind, Node};

    fn paragraphs(texts: &[&str]) -> Document {
        Document::from_blocks(
            texts
                .iter()
                .map(|text| Block::with_text(BlockKind::Paragraph, *text))
                .collect(),
        )
    }

    #[test]
    fn plan_reverts_active_format_to_paragraph() {
        let plan = TogglePlan::new(BlockFormat::NumberedList, true);
        assert_eq!(plan.set_kind, BlockKind::Paragraph);
        assert_eq!(plan.wrap_in, None);
        assert!(plan.unwrap_lists);

        let plan = TogglePlan::new(BlockFormat::BulletedList, false);
        assert_eq!(plan.set_kind, BlockKind::ListItem);
        assert_eq!(plan.wrap_in, Some(ListKind::Bulleted));
    }

    #[test]
    fn heading_toggles_on_and_off() {
        let mut document = paragraphs(&["a"]);
        let caret = Selection::caret(Position::new(0, 0));
        toggle_block(&mut document, &caret, BlockFormat::HeadingTwo);
        assert_eq!(container_kind(&document, &caret), ContainerKind::HeadingTwo);
        toggle_block(&mut document, &caret, BlockFormat::HeadingTwo);
        assert_eq!(container_kind(&document, &caret), ContainerKind::Paragraph);
    }

    #[test]
    fn list_wraps_consecutive_selected_blocks() {
        let mut document = paragraphs(&["a", "b", "c"]);
        let range = Selection::new(Position::new(0, 0), Position::new(1, 1));
        toggle_block(&mut document, &range, BlockFormat::BulletedList);

        assert_eq!(document.blocks().len(), 2);
        let list = &document.blocks()[0];
        assert_eq!(list.kind, BlockKind::BulletedList);
        assert_eq!(list.children.len(), 2);
        assert!(is_block_active(&document, &range, BlockFormat::BulletedList));
        assert!(document.is_valid());
    }

    #[test]
    fn switching_list_kind_splits_the_list_around_selection() {
        let mut document = paragraphs(&["a", "b", "c"]);
        let all = Selection::new(Position::new(0, 0), Position::new(2, 1));
        toggle_block(&mut document, &all, BlockFormat::BulletedList);

        let middle = Selection::caret(Position::new(1, 0));
        toggle_block(&mut document, &middle, BlockFormat::NumberedList);

        let kinds: Vec<BlockKind> = document.blocks().iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::BulletedList,
                BlockKind::NumberedList,
                BlockKind::BulletedList
            ]
        );
        assert_eq!(
            container_kind(&document, &middle),
            ContainerKind::List(ListKind::Numbered)
        );
        assert!(document.is_valid());
    }

    #[test]
    fn code_block_toggle_lifts_items_out_of_list() {
        let mut document = paragraphs(&["a"]);
        let caret = Selection::caret(Position::new(0, 0));
        toggle_block(&mut document, &caret, BlockFormat::NumberedList);
        toggle_block(&mut document, &caret, BlockFormat::CodeBlock);
        assert_eq!(document.blocks().len(), 1);
        assert_eq!(document.blocks()[0].kind, BlockKind::CodeBlock);
        assert_eq!(document.blocks()[0].align, None);
    }

    #[test]
    fn range_link_wraps_selected_text_and_collapses_after_it() {
        let mut document = paragraphs(&["see docs here"]);
        let range = Selection::within(0, 4, 8);
        let after = upsert_link(&mut document, &range, "https://docs.rs");
        assert_eq!(after, Selection::caret(Position::new(0, 8)));

        let children = &document.blocks()[0].children;
        assert_eq!(children.len(), 3);
        match &children[1] {
            Node::Link(link) => {
                assert_eq!(link.url, "https://docs.rs");
                assert_eq!(link.text(), "docs");
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn upsert_inside_link_updates_url_without_nesting() {
        let mut document = paragraphs(&["abc"]);
        upsert_link(&mut document, &Selection::within(0, 0, 3), "https://one");
        let inside = Selection::caret(Position::new(0, 1));
        upsert_link(&mut document, &inside, " https://two ");

        let links: Vec<&Node> = document.blocks()[0]
            .children
            .iter()
            .filter(|node| matches!(node, Node::Link(_)))
            .collect();
        assert_eq!(links.len(), 1);
        assert!(matches!(links[0], Node::Link(link) if link.url == "https://two"));
    }
}

//! Caret and range addressing.
//!
//! Positions address text blocks by ordinal rather than by tree path: block
//! `n` is the n-th block holding inline runs in document order (list items
//! included, list containers skipped). Offsets count chars in the flattened
//! text of that block. Structural edits that wrap or unwrap lists therefore
//! leave positions untouched.

use crate::model::document::{Block, BlockKind, Document, Node};
use serde::{Deserialize, Serialize};

/// One caret location.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Text block ordinal.
    pub block: usize,
    /// Char offset inside the block's flattened text.
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus pair. Collapsed when both ends are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection at `position`.
    pub fn caret(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Range inside one block.
    pub fn within(block: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(block, start), Position::new(block, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Earlier edge in document order.
    pub fn start(&self) -> Position {
        self.anchor.min(self.focus)
    }

    /// Later edge in document order.
    pub fn end(&self) -> Position {
        self.anchor.max(self.focus)
    }

    pub fn collapse_to_end(&self) -> Self {
        Self::caret(self.end())
    }
}

/// Tree address of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockPath {
    /// Index among top-level blocks.
    pub index: usize,
    /// Index of the list item inside a top-level list.
    pub item: Option<usize>,
}

/// Part of a selection that falls inside one text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub ordinal: usize,
    pub path: BlockPath,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lists text block addresses in document order.
pub(crate) fn text_block_paths(document: &Document) -> Vec<BlockPath> {
    let mut paths = Vec::new();
    for (index, block) in document.blocks.iter().enumerate() {
        if block.kind.is_list() {
            for (item, child) in block.children.iter().enumerate() {
                if matches!(child, Node::Block(b) if b.kind == BlockKind::ListItem) {
                    paths.push(BlockPath {
                        index,
                        item: Some(item),
                    });
                }
            }
        } else {
            paths.push(BlockPath { index, item: None });
        }
    }
    paths
}

pub(crate) fn block_at(document: &Document, path: BlockPath) -> Option<&Block> {
    let top = document.blocks.get(path.index)?;
    match path.item {
        None => Some(top),
        Some(item) => match top.children.get(item) {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        },
    }
}

pub(crate) fn block_at_mut(document: &mut Document, path: BlockPath) -> Option<&mut Block> {
    let top = document.blocks.get_mut(path.index)?;
    match path.item {
        None => Some(top),
        Some(item) => match top.children.get_mut(item) {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        },
    }
}

/// Kind of the list holding the block at `path`, if any.
pub(crate) fn parent_list_kind(document: &Document, path: BlockPath) -> Option<BlockKind> {
    path.item?;
    document.blocks.get(path.index).map(|list| list.kind)
}

/// Number of text blocks in the document.
pub fn text_block_count(document: &Document) -> usize {
    text_block_paths(document).len()
}

/// Char length of the flattened text of text block `ordinal`.
pub fn block_len(document: &Document, ordinal: usize) -> usize {
    text_block_paths(document)
        .get(ordinal)
        .and_then(|path| block_at(document, *path))
        .map_or(0, |block| block.children.iter().map(Node::len).sum())
}

/// Clamps `position` to an existing block and offset.
pub fn clamp_position(document: &Document, position: Position) -> Position {
    let count = text_block_count(document);
    if count == 0 {
        return Position::default();
    }
    let block = position.block.min(count - 1);
    let offset = position.offset.min(block_len(document, block));
    Position::new(block, offset)
}

pub fn clamp_selection(document: &Document, selection: &Selection) -> Selection {
    Selection::new(
        clamp_position(document, selection.anchor),
        clamp_position(document, selection.focus),
    )
}

/// Caret position after the last char of the document.
pub fn document_end(document: &Document) -> Position {
    let count = text_block_count(document);
    if count == 0 {
        return Position::default();
    }
    Position::new(count - 1, block_len(document, count - 1))
}

/// Selection covering the whole document.
pub fn select_all(document: &Document) -> Selection {
    Selection::new(Position::default(), document_end(document))
}

/// Splits a clamped selection into per-block segments.
///
/// A collapsed selection yields one empty segment at the caret.
pub(crate) fn segments(document: &Document, selection: &Selection) -> Vec<Segment> {
    let selection = clamp_selection(document, selection);
    let paths = text_block_paths(document);
    let (start, end) = (selection.start(), selection.end());

    let mut out = Vec::new();
    for ordinal in start.block..=end.block {
        let Some(path) = paths.get(ordinal).copied() else {
            break;
        };
        let len = block_len(document, ordinal);
        let seg_start = if ordinal == start.block { start.offset } else { 0 };
        let seg_end = if ordinal == end.block { end.offset } else { len };
        out.push(Segment {
            ordinal,
            path,
            start: seg_start,
            end: seg_end.max(seg_start),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_position, document_end, segments, text_block_paths, BlockPath, Position, Selection,
    };
    use crate::model::document::{Block, BlockKind, Document, Node};

    fn sample() -> Document {
        Document::from_unchecked(vec![
            Block::with_text(BlockKind::Paragraph, "one"),
            Block::new(
                BlockKind::BulletedList,
                vec![
                    Node::Block(Block::with_text(BlockKind::ListItem, "a")),
                    Node::Block(Block::with_text(BlockKind::ListItem, "bb")),
                ],
            ),
            Block::with_text(BlockKind::HeadingTwo, "end"),
        ])
    }

    #[test]
    fn list_items_are_addressed_as_text_blocks() {
        let paths = text_block_paths(&sample());
        assert_eq!(paths.len(), 4);
        assert_eq!(
            paths[2],
            BlockPath {
                index: 1,
                item: Some(1)
            }
        );
        assert_eq!(paths[3], BlockPath { index: 2, item: None });
    }

    #[test]
    fn clamp_limits_block_and_offset() {
        let document = sample();
        assert_eq!(
            clamp_position(&document, Position::new(9, 9)),
            Position::new(3, 3)
        );
        assert_eq!(
            clamp_position(&document, Position::new(1, 7)),
            Position::new(1, 1)
        );
        assert_eq!(document_end(&document), Position::new(3, 3));
    }

    #[test]
    fn backward_selection_is_ordered_into_segments() {
        let document = sample();
        let selection = Selection::new(Position::new(2, 1), Position::new(0, 1));
        let segs = segments(&document, &selection);
        assert_eq!(segs.len(), 3);
        assert_eq!((segs[0].start, segs[0].end), (1, 3));
        assert_eq!((segs[1].start, segs[1].end), (0, 1));
        assert_eq!((segs[2].start, segs[2].end), (0, 1));
    }
}

//! Text insertion, deletion and block splitting.

use crate::editor::inline::{self, child_spans, split_children_at};
use crate::editor::marks::caret_marks;
use crate::editor::normalize::normalize;
use crate::editor::selection::{
    block_at_mut, block_len, clamp_selection, text_block_count, text_block_paths, BlockPath,
    Position, Selection,
};
use crate::model::document::{Block, Document, Marks, Node};

/// Inserts `value` at the selection, replacing a selected range first.
///
/// Pending marks are consumed by the insertion.
pub fn insert_text(
    document: &mut Document,
    selection: &Selection,
    pending: &mut Option<Marks>,
    value: &str,
) -> Selection {
    let selection = clamp_selection(document, selection);
    let at = if selection.is_collapsed() {
        selection.focus
    } else {
        delete_range(document, &selection)
    };
    if value.is_empty() {
        return Selection::caret(at);
    }

    let marks = caret_marks(document, at, pending.as_ref());
    *pending = None;
    let Some(path) = text_block_paths(document).get(at.block).copied() else {
        return Selection::caret(at);
    };
    if let Some(block) = block_at_mut(document, path) {
        inline::insert_text(&mut block.children, at.offset, value, marks);
    }
    normalize(document);
    Selection::caret(Position::new(at.block, at.offset + value.chars().count()))
}

/// Deletes the selected range and returns the collapsed caret at its start.
///
/// A range spanning blocks merges the last touched block into the first and
/// removes the blocks in between.
pub fn delete_range(document: &mut Document, selection: &Selection) -> Position {
    let selection = clamp_selection(document, selection);
    let (start, end) = (selection.start(), selection.end());
    if start == end {
        return start;
    }

    let paths = text_block_paths(document);
    let (Some(&first), Some(&last)) = (paths.get(start.block), paths.get(end.block)) else {
        return start;
    };

    if start.block == end.block {
        if let Some(block) = block_at_mut(document, first) {
            inline::remove_range(&mut block.children, start.offset, end.offset);
        }
        normalize(document);
        return start;
    }

    let tail = match block_at_mut(document, last) {
        Some(block) => {
            inline::remove_range(&mut block.children, 0, end.offset);
            std::mem::take(&mut block.children)
        }
        None => Vec::new(),
    };
    if let Some(block) = block_at_mut(document, first) {
        let len: usize = block.children.iter().map(Node::len).sum();
        inline::remove_range(&mut block.children, start.offset, len);
        block.children.extend(tail);
    }

    for path in paths[start.block + 1..=end.block].iter().rev() {
        remove_text_block(document, *path);
    }
    document
        .blocks
        .retain(|block| !(block.kind.is_list() && block.children.is_empty()));

    normalize(document);
    start
}

fn remove_text_block(document: &mut Document, path: BlockPath) {
    match path.item {
        None => {
            if path.index < document.blocks.len() {
                document.blocks.remove(path.index);
            }
        }
        Some(item) => {
            if let Some(list) = document.blocks.get_mut(path.index) {
                if item < list.children.len() {
                    list.children.remove(item);
                }
            }
        }
    }
}

/// Deletes one char before the caret, or merges into the previous block at
/// a block start.
pub fn delete_backward(document: &mut Document, selection: &Selection) -> Selection {
    let selection = clamp_selection(document, selection);
    if !selection.is_collapsed() {
        return Selection::caret(delete_range(document, &selection));
    }
    let caret = selection.focus;
    if caret.offset > 0 {
        let from = Position::new(caret.block, caret.offset - 1);
        return Selection::caret(delete_range(document, &Selection::new(from, caret)));
    }
    if caret.block == 0 {
        return selection;
    }
    let previous_end = Position::new(caret.block - 1, block_len(document, caret.block - 1));
    Selection::caret(delete_range(
        document,
        &Selection::new(previous_end, caret),
    ))
}

/// Deletes one char after the caret, or pulls the next block in at a block end.
pub fn delete_forward(document: &mut Document, selection: &Selection) -> Selection {
    let selection = clamp_selection(document, selection);
    if !selection.is_collapsed() {
        return Selection::caret(delete_range(document, &selection));
    }
    let caret = selection.focus;
    let to = if caret.offset < block_len(document, caret.block) {
        Position::new(caret.block, caret.offset + 1)
    } else if caret.block + 1 < text_block_count(document) {
        Position::new(caret.block + 1, 0)
    } else {
        return selection;
    };
    Selection::caret(delete_range(document, &Selection::new(caret, to)))
}

/// Splits the block at the caret. The new block keeps kind and alignment;
/// list items split inside their list.
pub fn insert_break(document: &mut Document, selection: &Selection) -> Selection {
    let selection = clamp_selection(document, selection);
    let at = if selection.is_collapsed() {
        selection.focus
    } else {
        delete_range(document, &selection)
    };
    let Some(path) = text_block_paths(document).get(at.block).copied() else {
        return Selection::caret(at);
    };

    let Some(block) = block_at_mut(document, path) else {
        return Selection::caret(at);
    };
    split_children_at(&mut block.children, at.offset);
    let cut = child_spans(&block.children)
        .iter()
        .filter(|(_, _, end)| *end <= at.offset)
        .count();
    let right = Block {
        kind: block.kind,
        align: block.align,
        children: block.children.split_off(cut),
    };

    match path.item {
        None => document.blocks.insert(path.index + 1, right),
        Some(item) => {
            if let Some(list) = document.blocks.get_mut(path.index) {
                list.children.insert(item + 1, Node::Block(right));
            }
        }
    }
    normalize(document);
    Selection::caret(Position::new(at.block + 1, 0))
}

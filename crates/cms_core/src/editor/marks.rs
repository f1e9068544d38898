//! Character marks and paragraph alignment.
//!
//! # Invariants
//! - Toggling touches only runs inside the selection; runs are split at the
//!   selection edges and nowhere else.
//! - A collapsed selection never mutates the document; it edits the pending
//!   marks applied to the next typed text.

use crate::editor::inline::{leaves, leaves_mut, marks_at, split_leaves_at};
use crate::editor::normalize::normalize;
use crate::editor::selection::{
    block_at, block_at_mut, clamp_selection, segments, text_block_paths, Position, Selection,
};
use crate::model::document::{Align, BlockKind, Document, Mark, Marks};

/// Marks a caret continues with: pending marks first, then the run before it.
pub fn caret_marks(document: &Document, position: Position, pending: Option<&Marks>) -> Marks {
    if let Some(marks) = pending {
        return *marks;
    }
    text_block_paths(document)
        .get(position.block)
        .and_then(|path| block_at(document, *path))
        .map(|block| marks_at(&block.children, position.offset))
        .unwrap_or_default()
}

/// Returns whether `mark` is set on every run intersecting the selection.
///
/// Code block runs carry no marks and are not counted.
pub fn is_mark_active(
    document: &Document,
    selection: &Selection,
    pending: Option<&Marks>,
    mark: Mark,
) -> bool {
    let selection = clamp_selection(document, selection);
    if selection.is_collapsed() {
        return caret_marks(document, selection.focus, pending).get(mark);
    }

    let mut intersected = false;
    for segment in segments(document, &selection) {
        let Some(block) = block_at(document, segment.path) else {
            continue;
        };
        if block.kind == BlockKind::CodeBlock {
            continue;
        }
        for (start, text) in leaves(&block.children) {
            let end = start + text.len();
            if text.is_empty() || start >= segment.end || end <= segment.start {
                continue;
            }
            intersected = true;
            if !text.marks.get(mark) {
                return false;
            }
        }
    }

    if intersected {
        true
    } else {
        caret_marks(document, selection.start(), None).get(mark)
    }
}

/// Active state of every mark, for toolbar rendering.
pub fn active_marks(document: &Document, selection: &Selection, pending: Option<&Marks>) -> Marks {
    let mut marks = Marks::default();
    for mark in Mark::ALL {
        marks.set(mark, is_mark_active(document, selection, pending, mark));
    }
    marks
}

/// Removes `mark` when active across the selection, adds it otherwise.
pub fn toggle_mark(
    document: &mut Document,
    selection: &Selection,
    pending: &mut Option<Marks>,
    mark: Mark,
) {
    let selection = clamp_selection(document, selection);
    if selection.is_collapsed() {
        let current = caret_marks(document, selection.focus, pending.as_ref());
        *pending = Some(current.with(mark, !current.get(mark)));
        return;
    }

    let enable = !is_mark_active(document, &selection, None, mark);
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
        split_leaves_at(&mut block.children, segment.end);
        split_leaves_at(&mut block.children, segment.start);
        for (start, text) in leaves_mut(&mut block.children) {
            let len = text.len();
            if len > 0 && start >= segment.start && start + len <= segment.end {
                text.marks.set(mark, enable);
            }
        }
    }
    normalize(document);
}

/// Alignment shared by every alignable block in the selection; `Right` when
/// the selection is mixed or holds no alignable block.
pub fn active_align(document: &Document, selection: &Selection) -> Align {
    let mut aligns = segments(document, selection)
        .into_iter()
        .filter_map(|segment| block_at(document, segment.path))
        .filter(|block| block.kind.is_alignable())
        .map(|block| block.align.unwrap_or_default());

    let Some(first) = aligns.next() else {
        return Align::default();
    };
    if aligns.all(|align| align == first) {
        first
    } else {
        Align::default()
    }
}

/// Sets `align` on every alignable block in the selection.
pub fn set_align(document: &mut Document, selection: &Selection, align: Align) {
    for segment in segments(document, selection) {
        if let Some(block) = block_at_mut(document, segment.path) {
            if block.kind.is_alignable() {
                block.align = Some(align);
            }
        }
    }
}

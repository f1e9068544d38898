//! Undo/redo history.
//!
//! # Responsibility
//! - Keep reversible entries for content-changing operations.
//! - Restore document and selection exactly as captured.
//!
//! # Invariants
//! - Selection-only operations never create entries.
//! - Recording a new entry clears the redo stack.
//! - Undo/redo on an empty stack is a no-op.

use crate::editor::selection::Selection;
use crate::editor::structure::BlockFormat;
use crate::model::document::{Align, Document, Mark};
use std::collections::VecDeque;

const DEFAULT_HISTORY_DEPTH: usize = 100;

/// One editing operation as seen by history and change listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SetSelection,
    InsertText { text: String },
    InsertBreak,
    DeleteBackward,
    DeleteForward,
    DeleteRange,
    ToggleMark(Mark),
    SetAlign(Align),
    ToggleBlock(BlockFormat),
    UpsertLink { url: String },
    UnwrapLink,
    ReplaceDocument,
}

impl Operation {
    /// Returns whether the operation can change document content.
    pub fn is_content_change(&self) -> bool {
        !matches!(self, Self::SetSelection)
    }

    /// Stable name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSelection => "set_selection",
            Self::InsertText { .. } => "insert_text",
            Self::InsertBreak => "insert_break",
            Self::DeleteBackward => "delete_backward",
            Self::DeleteForward => "delete_forward",
            Self::DeleteRange => "delete_range",
            Self::ToggleMark(_) => "toggle_mark",
            Self::SetAlign(_) => "set_align",
            Self::ToggleBlock(_) => "toggle_block",
            Self::UpsertLink { .. } => "upsert_link",
            Self::UnwrapLink => "unwrap_link",
            Self::ReplaceDocument => "replace_document",
        }
    }
}

/// History tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum undo entries kept; `0` keeps every entry.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Captured document and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub operation: Operation,
    pub before: Snapshot,
    pub after: Snapshot,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    config: HistoryConfig,
    undos: VecDeque<HistoryEntry>,
    redos: Vec<HistoryEntry>,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            undos: VecDeque::new(),
            redos: Vec::new(),
        }
    }

    /// Records a content change.
    ///
    /// Typing that continues where the previous insertion left the caret is
    /// merged into the previous entry, so one undo removes the whole run.
    pub fn record(&mut self, operation: Operation, before: Snapshot, after: Snapshot) {
        if !operation.is_content_change() {
            return;
        }
        self.redos.clear();

        if let Some(last) = self.undos.back_mut() {
            if let (Operation::InsertText { text: merged }, Operation::InsertText { text }) =
                (&mut last.operation, &operation)
            {
                if last.after == before {
                    merged.push_str(text);
                    last.after = after;
                    return;
                }
            }
        }

        self.undos.push_back(HistoryEntry {
            operation,
            before,
            after,
        });
        if self.config.max_depth > 0 && self.undos.len() > self.config.max_depth {
            self.undos.pop_front();
        }
    }

    /// Steps back one entry, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let entry = self.undos.pop_back()?;
        let snapshot = entry.before.clone();
        self.redos.push(entry);
        Some(snapshot)
    }

    /// Re-applies the last undone entry, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let entry = self.redos.pop()?;
        let snapshot = entry.after.clone();
        self.undos.push_back(entry);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undos.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redos.len()
    }

    pub fn clear(&mut self) {
        self.undos.clear();
        self.redos.clear();
    }
}

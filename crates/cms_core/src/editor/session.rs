//! Editing session over one document.
//!
//! # Responsibility
//! - Own the document, selection, pending marks and history of one session.
//! - Route every edit through one apply path that records history and
//!   notifies the change listener.
//!
//! # Invariants
//! - The document is normalized on entry and after every operation.
//! - Only content changes bump `revision` and reach the listener.
//! - Moving the selection clears pending marks.

use crate::editor::history::{History, HistoryConfig, Operation, Snapshot};
use crate::editor::normalize::normalize;
use crate::editor::selection::{clamp_selection, select_all, Selection};
use crate::editor::structure::{BlockFormat, ContainerKind};
use crate::editor::{marks, structure, text};
use crate::model::document::{Align, Document, Mark, Marks};
use crate::render::{html, plain};
use log::debug;

type ChangeListener = Box<dyn FnMut(&Document)>;

/// Interactive editor for one article body.
pub struct Editor {
    document: Document,
    selection: Selection,
    pending_marks: Option<Marks>,
    history: History,
    revision: u64,
    operations: Vec<Operation>,
    listener: Option<ChangeListener>,
}

impl Editor {
    /// Starts a session on `document` with the caret at the start.
    pub fn new(mut document: Document, config: HistoryConfig) -> Self {
        normalize(&mut document);
        Self {
            document,
            selection: Selection::default(),
            pending_marks: None,
            history: History::new(config),
            revision: 0,
            operations: Vec::new(),
            listener: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    /// Counter bumped on every content change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Registers the listener invoked with the document after content changes.
    pub fn on_change(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Drains operations applied since the last call.
    pub fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let selection = clamp_selection(&self.document, &selection);
        if selection != self.selection {
            self.pending_marks = None;
        }
        self.selection = selection;
        self.operations.push(Operation::SetSelection);
    }

    pub fn select_all(&mut self) {
        let all = select_all(&self.document);
        self.set_selection(all);
    }

    pub fn insert_text(&mut self, value: &str) {
        let operation = Operation::InsertText {
            text: value.to_string(),
        };
        self.apply(operation, |document, selection, pending| {
            text::insert_text(document, &selection, pending, value)
        });
    }

    pub fn insert_break(&mut self) {
        self.apply(Operation::InsertBreak, |document, selection, _| {
            text::insert_break(document, &selection)
        });
    }

    pub fn delete_backward(&mut self) {
        self.apply(Operation::DeleteBackward, |document, selection, _| {
            text::delete_backward(document, &selection)
        });
    }

    pub fn delete_forward(&mut self) {
        self.apply(Operation::DeleteForward, |document, selection, _| {
            text::delete_forward(document, &selection)
        });
    }

    pub fn delete_selection(&mut self) {
        self.apply(Operation::DeleteRange, |document, selection, _| {
            Selection::caret(text::delete_range(document, &selection))
        });
    }

    pub fn is_mark_active(&self, mark: Mark) -> bool {
        marks::is_mark_active(
            &self.document,
            &self.selection,
            self.pending_marks.as_ref(),
            mark,
        )
    }

    pub fn active_marks(&self) -> Marks {
        marks::active_marks(&self.document, &self.selection, self.pending_marks.as_ref())
    }

    pub fn toggle_mark(&mut self, mark: Mark) {
        self.apply(Operation::ToggleMark(mark), |document, selection, pending| {
            marks::toggle_mark(document, &selection, pending, mark);
            selection
        });
    }

    pub fn active_align(&self) -> Align {
        marks::active_align(&self.document, &self.selection)
    }

    pub fn set_align(&mut self, align: Align) {
        self.apply(Operation::SetAlign(align), |document, selection, _| {
            marks::set_align(document, &selection, align);
            selection
        });
    }

    pub fn is_block_active(&self, format: BlockFormat) -> bool {
        structure::is_block_active(&self.document, &self.selection, format)
    }

    pub fn container_kind(&self) -> ContainerKind {
        structure::container_kind(&self.document, &self.selection)
    }

    pub fn toggle_block(&mut self, format: BlockFormat) {
        self.apply(Operation::ToggleBlock(format), |document, selection, _| {
            structure::toggle_block(document, &selection, format);
            selection
        });
    }

    pub fn active_link_url(&self) -> Option<String> {
        structure::active_link_url(&self.document, &self.selection)
    }

    pub fn upsert_link(&mut self, url: &str) {
        let operation = Operation::UpsertLink {
            url: url.trim().to_string(),
        };
        self.apply(operation, |document, selection, _| {
            structure::upsert_link(document, &selection, url)
        });
    }

    pub fn unwrap_link(&mut self) {
        self.apply(Operation::UnwrapLink, |document, selection, _| {
            structure::unwrap_link(document, &selection);
            selection
        });
    }

    /// Replaces the whole document, as an undoable change.
    pub fn replace_document(&mut self, document: Document) {
        self.apply(Operation::ReplaceDocument, move |current, _, _| {
            *current = document;
            normalize(current);
            Selection::default()
        });
    }

    /// Restores the state before the last change. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone change. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serialized HTML of the current document.
    pub fn to_html(&self) -> String {
        html::to_html(&self.document)
    }

    pub fn is_content_empty(&self) -> bool {
        plain::is_content_empty(&self.document)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = snapshot.selection;
        self.pending_marks = None;
        self.content_changed();
    }

    fn apply(
        &mut self,
        operation: Operation,
        edit: impl FnOnce(&mut Document, Selection, &mut Option<Marks>) -> Selection,
    ) {
        let before = self.snapshot();
        let next = edit(&mut self.document, self.selection, &mut self.pending_marks);
        self.selection = clamp_selection(&self.document, &next);

        if self.document == before.document {
            if self.selection != before.selection {
                self.operations.push(Operation::SetSelection);
            }
            return;
        }

        debug!(
            "event=editor_apply module=editor status=ok op={} revision={}",
            operation.name(),
            self.revision + 1
        );
        self.operations.push(operation.clone());
        let after = self.snapshot();
        self.history.record(operation, before, after);
        self.content_changed();
    }

    fn content_changed(&mut self) {
        self.revision += 1;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.document);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::new(), HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::Editor;
    use crate::editor::history::Operation;
    use crate::editor::selection::{Position, Selection};
    use crate::model::document::Mark;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn selection_changes_do_not_notify_listener() {
        let mut editor = Editor::default();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        editor.on_change(move |_| seen.set(seen.get() + 1));

        editor.insert_text("abc");
        editor.set_selection(Selection::caret(Position::new(0, 1)));
        editor.select_all();
        assert_eq!(calls.get(), 1);
        assert_eq!(editor.revision(), 1);

        let operations = editor.take_operations();
        assert_eq!(operations.iter().filter(|op| op.is_content_change()).count(), 1);
        assert!(operations.contains(&Operation::SetSelection));
    }

    #[test]
    fn undo_and_redo_restore_content_and_selection() {
        let mut editor = Editor::default();
        editor.insert_text("Hello");
        editor.select_all();
        editor.toggle_mark(Mark::Bold);
        let bold_html = editor.to_html();

        assert!(editor.undo());
        assert!(!editor.is_mark_active(Mark::Bold));
        assert_eq!(editor.selection(), Selection::within(0, 0, 5));

        assert!(editor.redo());
        assert_eq!(editor.to_html(), bold_html);

        assert!(editor.undo());
        assert!(editor.undo());
        assert!(editor.is_content_empty());
        assert_eq!(editor.selection(), Selection::caret(Position::new(0, 0)));
        assert!(!editor.undo());
    }

    #[test]
    fn collapsed_mark_toggle_is_not_a_history_entry() {
        let mut editor = Editor::default();
        editor.toggle_mark(Mark::Italic);
        assert!(!editor.can_undo());
        assert!(editor.is_mark_active(Mark::Italic));

        editor.set_selection(Selection::caret(Position::new(0, 0)));
        assert!(editor.is_mark_active(Mark::Italic));
        editor.insert_text("x");
        editor.set_selection(Selection::caret(Position::new(0, 0)));
        assert_eq!(editor.pending_marks(), None);
    }
}

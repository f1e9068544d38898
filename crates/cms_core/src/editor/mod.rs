//! Editing engines for article bodies.
//!
//! # Responsibility
//! - Address text by position and selection.
//! - Apply mark, alignment, block and link transforms.
//! - Keep documents canonical and edits reversible.
//!
//! # Invariants
//! - Every mutating entry point leaves the document valid.
//!
//! # See also
//! - `session::Editor` for the stateful wrapper used by forms.

pub mod history;
pub(crate) mod inline;
pub mod marks;
pub mod normalize;
pub mod selection;
pub mod session;
pub mod structure;
pub mod text;

pub use history::{History, HistoryConfig, HistoryEntry, Operation, Snapshot};
pub use selection::{Position, Selection};
pub use session::Editor;
pub use structure::{BlockFormat, ContainerKind};

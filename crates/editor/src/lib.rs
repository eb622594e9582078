//! Placement editor client for the site builder.
//!
//! Drives the widget placement HTTP API on behalf of a page editor: drag and
//! drop of catalog entries and placed instances, optimistic local state with
//! rollback on rejection, bounded undo/redo, and the "newly added" reveal
//! marker shown after a create.

pub mod catalog;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod history;
pub mod snapshot;
pub mod store;

pub use editor::PlacementEditor;
pub use error::{EditorError, EditorResult};

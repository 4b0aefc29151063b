//! Generic reorderable list editing.
//!
//! A host owns a `Vec<T>` and binds it to a [`ListController`] through a
//! [`ListEditor`] each time it wants to render or mutate the list. The
//! controller keeps only session state (identity keys, drag state, row state);
//! every change comes back to the host as a complete replacement array.

mod actions;
mod controller;
mod drag;
mod identity;
mod reorder;

pub use actions::ListAction;
pub use controller::{Expandable, ListController, ListEditor, ListItem, Row};
pub use drag::{
    DragConfig, DragEvent, DragHandle, DragOutcome, DragSession, DragTransition, HANDLE_LISTENERS,
    Point,
};
pub use identity::{ItemKey, ItemKeys};
pub use reorder::{move_in_place, move_item, resolve};

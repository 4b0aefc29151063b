#![deny(rust_2018_idioms)]

pub mod cms;
pub mod document;
pub mod io;
pub mod keymap;
pub mod list;
pub mod options;
pub mod session;
pub mod validate;

pub use document::{DocumentEditor, ListOp, ListPath, ListPathError, SiteDocument};
pub use options::EditorOptions;
pub use session::{KeyOutcome, KeySession};

pub mod prelude {
    pub use super::cms::{BlockPanel, FooterNavEditor, HeaderNavEditor};
    pub use super::keymap::{EditorAction, classify_key};
    pub use super::list::{
        DragConfig, DragEvent, Expandable, ItemKey, ListAction, ListController, ListEditor,
        ListItem,
    };
    pub use super::{DocumentEditor, EditorOptions, KeyOutcome, KeySession, ListOp, ListPath};
}

//! Keyboard-driven editing of one list of a site document.
//!
//! A [`KeySession`] holds the focused row and turns key presses into list
//! actions through the keymap. The terminal loop around it lives in the CLI.

use crossterm::event::KeyEvent;
use serde_json::Value;

use crate::{
    document::{DocumentEditor, ListPath, ListPathError},
    keymap::{EditorAction, classify_key},
    list::ListAction,
};

/// What the host should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Nothing bound, or the action did not apply.
    Ignored,
    /// Focus, drag or expand state changed; redraw.
    Redraw,
    /// The document changed; redraw and mark unsaved.
    Changed,
    Save,
    Quit,
}

#[derive(Debug, Clone)]
pub struct KeySession {
    path: ListPath,
    focus: Option<usize>,
}

impl KeySession {
    pub fn new(path: ListPath) -> Self {
        Self {
            path,
            focus: Some(0),
        }
    }

    pub fn path(&self) -> ListPath {
        self.path
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn handle_key(
        &mut self,
        doc: &mut DocumentEditor,
        key: &KeyEvent,
    ) -> Result<KeyOutcome, ListPathError> {
        match classify_key(key) {
            None => Ok(KeyOutcome::Ignored),
            Some(action) => self.handle_action(doc, action),
        }
    }

    pub fn handle_action(
        &mut self,
        doc: &mut DocumentEditor,
        action: EditorAction,
    ) -> Result<KeyOutcome, ListPathError> {
        let len = doc.items(&self.path)?.len();
        self.clamp_focus(len);
        match action {
            EditorAction::Save => Ok(KeyOutcome::Save),
            EditorAction::Quit => Ok(KeyOutcome::Quit),
            // Focus keys carry the row while a drag is in progress.
            EditorAction::Focus(delta) if doc.drag_active(&self.path).is_some() => {
                self.list_action(doc, ListAction::Step(delta))
            }
            EditorAction::Focus(delta) => {
                let Some(focus) = self.focus else {
                    return Ok(KeyOutcome::Ignored);
                };
                let next = focus
                    .saturating_add_signed(delta as isize)
                    .min(len.saturating_sub(1));
                if next == focus {
                    return Ok(KeyOutcome::Ignored);
                }
                self.focus = Some(next);
                Ok(KeyOutcome::Redraw)
            }
            EditorAction::List(action) => self.list_action(doc, action),
        }
    }

    fn list_action(
        &mut self,
        doc: &mut DocumentEditor,
        action: ListAction,
    ) -> Result<KeyOutcome, ListPathError> {
        let carried = doc.drag_active(&self.path).cloned();
        let before = doc.document().clone();
        if !doc.apply_action(&self.path, action, self.focus)? {
            return Ok(KeyOutcome::Ignored);
        }

        let len = doc.items(&self.path)?.len();
        match action {
            ListAction::Add => self.focus = len.checked_sub(1),
            // Focus stays on the carried row wherever it landed.
            _ => {
                if let Some(key) = carried.or_else(|| doc.drag_active(&self.path).cloned())
                    && let Some(index) = doc.keys(&self.path).and_then(|keys| keys.position(&key))
                {
                    self.focus = Some(index);
                }
            }
        }
        self.clamp_focus(len);

        if *doc.document() != before {
            Ok(KeyOutcome::Changed)
        } else {
            Ok(KeyOutcome::Redraw)
        }
    }

    fn clamp_focus(&mut self, len: usize) {
        self.focus = match (self.focus, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), len) => Some(index.min(len - 1)),
        };
    }

    /// One line per row: focus marker, expander, label and drag marker, with
    /// the nested list of expanded rows indented below.
    pub fn render(&self, doc: &DocumentEditor) -> Result<Vec<String>, ListPathError> {
        let items = doc.items(&self.path)?;
        let carried = doc.drag_active(&self.path);
        let keys = doc.keys(&self.path);
        let mut lines = vec![format!("{} ({})", self.path, items.len())];
        for (index, item) in items.iter().enumerate() {
            let marker = if self.focus == Some(index) { ">" } else { " " };
            let child = self.path.child(index, item);
            let expanded = child.is_some() && doc.is_expanded(&self.path, index);
            let expander = match (child, expanded) {
                (None, _) => " ",
                (Some(_), true) => "▾",
                (Some(_), false) => "▸",
            };
            let dragging = keys
                .and_then(|keys| keys.get(index))
                .is_some_and(|key| carried == Some(key));
            lines.push(format!(
                "{marker} {expander} {}{}",
                item_label(item),
                if dragging { " (dragging)" } else { "" }
            ));
            if let Some(child) = child
                && expanded
            {
                lines.extend(
                    doc.items(&child)?
                        .iter()
                        .map(|nested| format!("      • {}", item_label(nested))),
                );
            }
        }
        Ok(lines)
    }
}

fn item_label(item: &Value) -> String {
    ["label", "title", "headline", "question", "body"]
        .iter()
        .find_map(|field| item.get(*field).and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .or_else(|| item.get("type").and_then(Value::as_str).map(|kind| format!("({kind})")))
        .unwrap_or_else(|| "(untitled)".to_string())
}

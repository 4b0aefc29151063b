use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NestedRow, counted, drag_suffix, expander};
use crate::list::{DragConfig, Expandable, ListController, ListEditor, ListItem};

/// A header navigation link, optionally opening a dropdown of sub-items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<NavSubItem>,
}

impl Default for NavItem {
    fn default() -> Self {
        Self {
            label: "New link".to_string(),
            href: "/".to_string(),
            icon: None,
            sub_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavSubItem {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for NavSubItem {
    fn default() -> Self {
        Self {
            label: "New item".to_string(),
            href: "/".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavItemPatch {
    pub label: Option<String>,
    pub href: Option<String>,
    pub icon: Option<Option<String>>,
    pub sub_items: Option<Vec<NavSubItem>>,
}

impl NavItemPatch {
    pub fn sub_items(sub_items: Vec<NavSubItem>) -> Self {
        Self {
            sub_items: Some(sub_items),
            ..Self::default()
        }
    }
}

impl ListItem for NavItem {
    type Patch = NavItemPatch;

    fn apply_patch(&mut self, patch: NavItemPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(href) = patch.href {
            self.href = href;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(sub_items) = patch.sub_items {
            self.sub_items = sub_items;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavSubItemPatch {
    pub label: Option<String>,
    pub href: Option<String>,
    pub description: Option<Option<String>>,
}

impl ListItem for NavSubItem {
    type Patch = NavSubItemPatch;

    fn apply_patch(&mut self, patch: NavSubItemPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(href) = patch.href {
            self.href = href;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

pub type NavRow = NestedRow<NavSubItem>;

/// Editor for the header navigation bar.
#[derive(Debug, Default)]
pub struct HeaderNavEditor {
    controller: ListController<NavItem, NavRow>,
}

impl HeaderNavEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drag_config(mut self, config: DragConfig) -> Self {
        self.controller = self.controller.with_drag_config(config);
        self
    }

    pub fn controller(&self) -> &ListController<NavItem, NavRow> {
        &self.controller
    }

    pub fn bind<'a>(
        &'a mut self,
        items: &'a [NavItem],
        on_change: &'a mut dyn FnMut(Vec<NavItem>),
    ) -> ListEditor<'a, NavItem, NavRow> {
        ListEditor::new(items, &mut self.controller, on_change)
    }

    /// Runs `body` against the dropdown list of the item at `index`.
    pub fn edit_sub_items<R>(
        editor: &mut ListEditor<'_, NavItem, NavRow>,
        index: usize,
        body: impl FnOnce(&mut ListEditor<'_, NavSubItem>) -> R,
    ) -> Option<R> {
        editor.row(index, |row| {
            row.nested(
                |item| item.sub_items.as_slice(),
                |state| &mut state.children,
                NavItemPatch::sub_items,
                body,
            )
        })
    }

    /// One line per item; expanded items list their dropdown entries below.
    pub fn outline(editor: &mut ListEditor<'_, NavItem, NavRow>) -> Vec<String> {
        editor
            .render(|row| {
                let item = row.item();
                let expanded = row.state().is_expanded();
                let mut line = format!(
                    "{} {}{} → {}",
                    expander(expanded),
                    item.icon
                        .as_deref()
                        .map(|icon| format!("[{icon}] "))
                        .unwrap_or_default(),
                    item.label,
                    item.href
                );
                if !item.sub_items.is_empty() {
                    line.push_str(&format!(
                        " ({})",
                        counted(item.sub_items.len(), "sub-item", "sub-items")
                    ));
                }
                line.push_str(drag_suffix(row.is_dragging()));
                let mut lines = vec![line];
                if expanded {
                    let children = row.nested(
                        |item| item.sub_items.as_slice(),
                        |state| &mut state.children,
                        NavItemPatch::sub_items,
                        |nested| {
                            nested.render(|sub| {
                                let entry = sub.item();
                                match &entry.description {
                                    Some(text) => {
                                        format!("    • {} → {} - {text}", entry.label, entry.href)
                                    }
                                    None => format!("    • {} → {}", entry.label, entry.href),
                                }
                            })
                        },
                    );
                    lines.extend(children);
                }
                lines
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

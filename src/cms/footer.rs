use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{NestedRow, counted, drag_suffix, expander};
use crate::list::{DragConfig, Expandable, ListController, ListEditor, ListItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FooterSection {
    pub title: String,
    #[serde(default)]
    pub links: Vec<FooterLink>,
}

impl Default for FooterSection {
    fn default() -> Self {
        Self {
            title: "New section".to_string(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

impl Default for FooterLink {
    fn default() -> Self {
        Self {
            label: "New link".to_string(),
            href: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FooterSectionPatch {
    pub title: Option<String>,
    pub links: Option<Vec<FooterLink>>,
}

impl FooterSectionPatch {
    pub fn links(links: Vec<FooterLink>) -> Self {
        Self {
            links: Some(links),
            ..Self::default()
        }
    }
}

impl ListItem for FooterSection {
    type Patch = FooterSectionPatch;

    fn apply_patch(&mut self, patch: FooterSectionPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(links) = patch.links {
            self.links = links;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FooterLinkPatch {
    pub label: Option<String>,
    pub href: Option<String>,
}

impl ListItem for FooterLink {
    type Patch = FooterLinkPatch;

    fn apply_patch(&mut self, patch: FooterLinkPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(href) = patch.href {
            self.href = href;
        }
    }
}

pub type FooterRow = NestedRow<FooterLink>;

/// Editor for footer columns, each holding its own list of links.
#[derive(Debug, Default)]
pub struct FooterNavEditor {
    controller: ListController<FooterSection, FooterRow>,
}

impl FooterNavEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drag_config(mut self, config: DragConfig) -> Self {
        self.controller = self.controller.with_drag_config(config);
        self
    }

    pub fn bind<'a>(
        &'a mut self,
        items: &'a [FooterSection],
        on_change: &'a mut dyn FnMut(Vec<FooterSection>),
    ) -> ListEditor<'a, FooterSection, FooterRow> {
        ListEditor::new(items, &mut self.controller, on_change)
    }

    pub fn edit_links<R>(
        editor: &mut ListEditor<'_, FooterSection, FooterRow>,
        index: usize,
        body: impl FnOnce(&mut ListEditor<'_, FooterLink>) -> R,
    ) -> Option<R> {
        editor.row(index, |row| {
            row.nested(
                |section| section.links.as_slice(),
                |state| &mut state.children,
                FooterSectionPatch::links,
                body,
            )
        })
    }

    pub fn outline(editor: &mut ListEditor<'_, FooterSection, FooterRow>) -> Vec<String> {
        editor
            .render(|row| {
                let section = row.item();
                let expanded = row.state().is_expanded();
                let mut lines = vec![format!(
                    "{} {} ({}){}",
                    expander(expanded),
                    section.title,
                    counted(section.links.len(), "link", "links"),
                    drag_suffix(row.is_dragging())
                )];
                if expanded {
                    lines.extend(
                        section
                            .links
                            .iter()
                            .map(|link| format!("    • {} → {}", link.label, link.href)),
                    );
                }
                lines
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

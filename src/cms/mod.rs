//! Site-specific list editors built on [`crate::list`].
//!
//! Each editor instantiates the generic controller for one item type. Items
//! that carry their own list (dropdown sub-items, footer links, feature cards,
//! FAQ entries) get an independent nested controller stored in the parent
//! row's state, so nested keys and drags never leak into the parent list.

mod blocks;
mod footer;
mod nav;

pub use blocks::{
    BlockKind, BlockPanel, BlockPatch, BlockRow, ContentBlock, CtaBlock, CtaPatch, FaqBlock,
    FaqEntry, FaqEntryPatch, FaqPatch, FeatureCard, FeatureCardPatch, FeatureGridBlock,
    FeatureGridPatch, HeroBlock, HeroPatch, ParseBlockKindError, RichTextBlock, RichTextPatch,
};
pub use footer::{
    FooterLink, FooterLinkPatch, FooterNavEditor, FooterRow, FooterSection, FooterSectionPatch,
};
pub use nav::{HeaderNavEditor, NavItem, NavItemPatch, NavRow, NavSubItem, NavSubItemPatch};

use crate::list::{Expandable, ListController};

/// Row state for an item that owns one nested list. Rows start collapsed.
#[derive(Debug)]
pub struct NestedRow<C> {
    expanded: bool,
    pub children: ListController<C>,
}

impl<C: Default + 'static> Default for NestedRow<C> {
    fn default() -> Self {
        Self {
            expanded: false,
            children: ListController::default(),
        }
    }
}

impl<C> Expandable for NestedRow<C> {
    fn is_expanded(&self) -> bool {
        self.expanded
    }

    fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }
}

fn expander(expanded: bool) -> &'static str {
    if expanded { "▾" } else { "▸" }
}

fn drag_suffix(dragging: bool) -> &'static str {
    if dragging { " (dragging)" } else { "" }
}

/// `1 link`, `2 links`, `0 links`.
fn counted(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn truncate(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > limit {
        let head: String = trimmed.chars().take(limit).collect();
        format!("{head}…")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{counted, truncate};

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("  héllo wörld  ", 5), "héllo…");
        assert_eq!(truncate("short", 24), "short");
    }

    #[test]
    fn counts_pick_the_right_noun() {
        assert_eq!(counted(0, "card", "cards"), "0 cards");
        assert_eq!(counted(1, "question", "questions"), "1 question");
        assert_eq!(counted(2, "sub-item", "sub-items"), "2 sub-items");
    }
}

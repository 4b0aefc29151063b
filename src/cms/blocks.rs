use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{counted, drag_suffix, expander, truncate};
use crate::list::{DragConfig, Expandable, ListController, ListEditor, ListItem};

/// A page content block. The `type` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Hero(HeroBlock),
    Features(FeatureGridBlock),
    Faq(FaqBlock),
    RichText(RichTextBlock),
    Cta(CtaBlock),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeroBlock {
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGridBlock {
    pub title: String,
    #[serde(default)]
    pub features: Vec<FeatureCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCard {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Default for FeatureCard {
    fn default() -> Self {
        Self {
            title: "New feature".to_string(),
            body: String::new(),
            icon: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqBlock {
    pub title: String,
    #[serde(default)]
    pub items: Vec<FaqEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqEntry {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl Default for FaqEntry {
    fn default() -> Self {
        Self {
            question: "New question?".to_string(),
            answer: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RichTextBlock {
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CtaBlock {
    pub headline: String,
    pub button_label: String,
    pub button_href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Hero,
    Features,
    Faq,
    RichText,
    Cta,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Hero,
        BlockKind::Features,
        BlockKind::Faq,
        BlockKind::RichText,
        BlockKind::Cta,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Hero => "hero",
            BlockKind::Features => "features",
            BlockKind::Faq => "faq",
            BlockKind::RichText => "richText",
            BlockKind::Cta => "cta",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBlockKindError(String);

impl fmt::Display for ParseBlockKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = BlockKind::ALL
            .iter()
            .map(|kind| kind.tag())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "unknown block type '{}' (expected one of {known})", self.0)
    }
}

impl std::error::Error for ParseBlockKindError {}

impl FromStr for BlockKind {
    type Err = ParseBlockKindError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ParseBlockKindError(raw.to_string()))
    }
}

impl Default for ContentBlock {
    fn default() -> Self {
        Self::new(BlockKind::RichText)
    }
}

impl ContentBlock {
    /// A freshly added block of the given kind, with placeholder copy.
    pub fn new(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Hero => ContentBlock::Hero(HeroBlock {
                headline: "Headline".to_string(),
                ..HeroBlock::default()
            }),
            BlockKind::Features => ContentBlock::Features(FeatureGridBlock {
                title: "Features".to_string(),
                features: Vec::new(),
            }),
            BlockKind::Faq => ContentBlock::Faq(FaqBlock {
                title: "Frequently asked questions".to_string(),
                items: Vec::new(),
            }),
            BlockKind::RichText => ContentBlock::RichText(RichTextBlock::default()),
            BlockKind::Cta => ContentBlock::Cta(CtaBlock {
                headline: "Ready to start?".to_string(),
                button_label: "Get started".to_string(),
                button_href: "/signup".to_string(),
            }),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Hero(_) => BlockKind::Hero,
            ContentBlock::Features(_) => BlockKind::Features,
            ContentBlock::Faq(_) => BlockKind::Faq,
            ContentBlock::RichText(_) => BlockKind::RichText,
            ContentBlock::Cta(_) => BlockKind::Cta,
        }
    }

    /// Type-specific one-line summary shown on collapsed cards.
    pub fn summary(&self) -> String {
        match self {
            ContentBlock::Hero(hero) => match (&hero.cta_label, &hero.cta_href) {
                (Some(label), Some(href)) => {
                    format!("Hero: \"{}\" [{label} → {href}]", truncate(&hero.headline, 40))
                }
                _ => format!("Hero: \"{}\"", truncate(&hero.headline, 40)),
            },
            ContentBlock::Features(grid) => {
                format!(
                    "Features: {} ({})",
                    grid.title,
                    counted(grid.features.len(), "card", "cards")
                )
            }
            ContentBlock::Faq(faq) => {
                format!(
                    "FAQ: {} ({})",
                    faq.title,
                    counted(faq.items.len(), "question", "questions")
                )
            }
            ContentBlock::RichText(text) if text.body.trim().is_empty() => {
                "Text: (empty)".to_string()
            }
            ContentBlock::RichText(text) => format!("Text: {}", truncate(&text.body, 40)),
            ContentBlock::Cta(cta) => format!(
                "CTA: {} [{} → {}]",
                cta.headline, cta.button_label, cta.button_href
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroPatch {
    pub headline: Option<String>,
    pub subheadline: Option<Option<String>>,
    pub cta_label: Option<Option<String>>,
    pub cta_href: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGridPatch {
    pub title: Option<String>,
    pub features: Option<Vec<FeatureCard>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaqPatch {
    pub title: Option<String>,
    pub items: Option<Vec<FaqEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichTextPatch {
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CtaPatch {
    pub headline: Option<String>,
    pub button_label: Option<String>,
    pub button_href: Option<String>,
}

/// Patch for one block. A patch aimed at a different variant than the block
/// it lands on is ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPatch {
    Hero(HeroPatch),
    Features(FeatureGridPatch),
    Faq(FaqPatch),
    RichText(RichTextPatch),
    Cta(CtaPatch),
}

impl BlockPatch {
    pub fn features(features: Vec<FeatureCard>) -> Self {
        BlockPatch::Features(FeatureGridPatch {
            features: Some(features),
            ..FeatureGridPatch::default()
        })
    }

    pub fn faq_items(items: Vec<FaqEntry>) -> Self {
        BlockPatch::Faq(FaqPatch {
            items: Some(items),
            ..FaqPatch::default()
        })
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl ListItem for ContentBlock {
    type Patch = BlockPatch;

    fn apply_patch(&mut self, patch: BlockPatch) {
        match (self, patch) {
            (ContentBlock::Hero(hero), BlockPatch::Hero(patch)) => {
                set(&mut hero.headline, patch.headline);
                set(&mut hero.subheadline, patch.subheadline);
                set(&mut hero.cta_label, patch.cta_label);
                set(&mut hero.cta_href, patch.cta_href);
            }
            (ContentBlock::Features(grid), BlockPatch::Features(patch)) => {
                set(&mut grid.title, patch.title);
                set(&mut grid.features, patch.features);
            }
            (ContentBlock::Faq(faq), BlockPatch::Faq(patch)) => {
                set(&mut faq.title, patch.title);
                set(&mut faq.items, patch.items);
            }
            (ContentBlock::RichText(text), BlockPatch::RichText(patch)) => {
                set(&mut text.body, patch.body);
            }
            (ContentBlock::Cta(cta), BlockPatch::Cta(patch)) => {
                set(&mut cta.headline, patch.headline);
                set(&mut cta.button_label, patch.button_label);
                set(&mut cta.button_href, patch.button_href);
            }
            (block, patch) => {
                tracing::debug!(
                    target: "blockedit::cms",
                    kind = %block.kind(),
                    ?patch,
                    "ignoring patch for another block type"
                );
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCardPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<Option<String>>,
}

impl ListItem for FeatureCard {
    type Patch = FeatureCardPatch;

    fn apply_patch(&mut self, patch: FeatureCardPatch) {
        set(&mut self.title, patch.title);
        set(&mut self.body, patch.body);
        set(&mut self.icon, patch.icon);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaqEntryPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl ListItem for FaqEntry {
    type Patch = FaqEntryPatch;

    fn apply_patch(&mut self, patch: FaqEntryPatch) {
        set(&mut self.question, patch.question);
        set(&mut self.answer, patch.answer);
    }
}

/// Row state for a block card. Only the controller matching the block's own
/// variant is ever mounted.
#[derive(Debug, Default)]
pub struct BlockRow {
    expanded: bool,
    pub features: ListController<FeatureCard>,
    pub faq: ListController<FaqEntry>,
}

impl Expandable for BlockRow {
    fn is_expanded(&self) -> bool {
        self.expanded
    }

    fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }
}

/// Editor for the ordered content blocks of a page.
#[derive(Debug)]
pub struct BlockPanel {
    controller: ListController<ContentBlock, BlockRow>,
}

impl Default for BlockPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockPanel {
    pub fn new() -> Self {
        Self {
            controller: ListController::default(),
        }
    }

    pub fn with_drag_config(mut self, config: DragConfig) -> Self {
        self.controller = self.controller.with_drag_config(config);
        self
    }

    pub fn bind<'a>(
        &'a mut self,
        items: &'a [ContentBlock],
        on_change: &'a mut dyn FnMut(Vec<ContentBlock>),
    ) -> ListEditor<'a, ContentBlock, BlockRow> {
        ListEditor::new(items, &mut self.controller, on_change)
    }

    /// Appends a new block of `kind` at the end of the page.
    pub fn add_block(editor: &mut ListEditor<'_, ContentBlock, BlockRow>, kind: BlockKind) -> bool {
        editor.append(ContentBlock::new(kind))
    }

    /// Runs `body` against the feature cards of a feature grid block.
    /// Returns `None` for any other block type.
    pub fn edit_features<R>(
        editor: &mut ListEditor<'_, ContentBlock, BlockRow>,
        index: usize,
        body: impl FnOnce(&mut ListEditor<'_, FeatureCard>) -> R,
    ) -> Option<R> {
        editor
            .row(index, |row| {
                if row.item().kind() != BlockKind::Features {
                    return None;
                }
                Some(row.nested(
                    feature_cards,
                    |state| &mut state.features,
                    BlockPatch::features,
                    body,
                ))
            })
            .flatten()
    }

    /// Runs `body` against the entries of a FAQ block.
    /// Returns `None` for any other block type.
    pub fn edit_faq<R>(
        editor: &mut ListEditor<'_, ContentBlock, BlockRow>,
        index: usize,
        body: impl FnOnce(&mut ListEditor<'_, FaqEntry>) -> R,
    ) -> Option<R> {
        editor
            .row(index, |row| {
                if row.item().kind() != BlockKind::Faq {
                    return None;
                }
                Some(row.nested(
                    faq_entries,
                    |state| &mut state.faq,
                    BlockPatch::faq_items,
                    body,
                ))
            })
            .flatten()
    }

    pub fn outline(editor: &mut ListEditor<'_, ContentBlock, BlockRow>) -> Vec<String> {
        editor
            .render(|row| {
                let block = row.item();
                let expanded = row.state().is_expanded();
                let mut lines = vec![format!(
                    "{} {}{}",
                    expander(expanded),
                    block.summary(),
                    drag_suffix(row.is_dragging())
                )];
                if expanded {
                    match block {
                        ContentBlock::Features(grid) => lines.extend(
                            grid.features
                                .iter()
                                .map(|card| format!("    • {}", card.title)),
                        ),
                        ContentBlock::Faq(faq) => lines.extend(
                            faq.items
                                .iter()
                                .map(|entry| format!("    • {}", entry.question)),
                        ),
                        ContentBlock::Hero(hero) => {
                            if let Some(sub) = &hero.subheadline {
                                lines.push(format!("    {}", truncate(sub, 60)));
                            }
                        }
                        ContentBlock::RichText(text) => {
                            lines.push(format!("    {}", truncate(&text.body, 60)));
                        }
                        ContentBlock::Cta(_) => {}
                    }
                }
                lines
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

fn feature_cards(block: &ContentBlock) -> &[FeatureCard] {
    match block {
        ContentBlock::Features(grid) => &grid.features,
        _ => &[],
    }
}

fn faq_entries(block: &ContentBlock) -> &[FaqEntry] {
    match block {
        ContentBlock::Faq(faq) => &faq.items,
        _ => &[],
    }
}

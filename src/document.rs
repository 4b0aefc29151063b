//! The site document: the host that owns every editable list.

use std::{fmt, str::FromStr, sync::LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    cms::{
        BlockPanel, ContentBlock, FaqEntry, FeatureCard, FooterLink, FooterNavEditor,
        FooterSection, HeaderNavEditor, NavItem, NavSubItem,
    },
    io::write_document,
    list::{Expandable, ItemKey, ItemKeys, ListAction, ListController, ListEditor, ListItem},
    options::EditorOptions,
    validate::{ValidationIssue, site_validator, validate_document},
};

static LIST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(nav|blocks|footer)(?:/(\d+)/([A-Za-z]+))?$")
        .expect("list path pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteDocument {
    #[serde(default)]
    pub header_nav: Vec<NavItem>,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub footer: Vec<FooterSection>,
}

/// Addresses one editable list inside a site document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListPath {
    Nav,
    NavSubItems(usize),
    Blocks,
    BlockFeatures(usize),
    BlockFaq(usize),
    Footer,
    FooterLinks(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPathError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ListPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ListPathError {}

impl FromStr for ListPath {
    type Err = ListPathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().trim_matches('/');
        let fail = |message: &str| ListPathError {
            path: raw.to_string(),
            message: message.to_string(),
        };
        let captures = LIST_PATH
            .captures(trimmed)
            .ok_or_else(|| fail("expected nav, blocks, footer or <list>/<index>/<field>"))?;
        let root = &captures[1];
        let Some(index) = captures.get(2) else {
            return Ok(match root {
                "nav" => ListPath::Nav,
                "blocks" => ListPath::Blocks,
                _ => ListPath::Footer,
            });
        };
        let index = index
            .as_str()
            .parse::<usize>()
            .map_err(|_| fail("index is out of range"))?;
        match (root, &captures[3]) {
            ("nav", "subItems" | "sub") => Ok(ListPath::NavSubItems(index)),
            ("blocks", "features") => Ok(ListPath::BlockFeatures(index)),
            ("blocks", "items" | "faq") => Ok(ListPath::BlockFaq(index)),
            ("footer", "links") => Ok(ListPath::FooterLinks(index)),
            (_, field) => Err(fail(&format!("'{root}' items have no nested list '{field}'"))),
        }
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPath::Nav => write!(f, "nav"),
            ListPath::NavSubItems(index) => write!(f, "nav/{index}/subItems"),
            ListPath::Blocks => write!(f, "blocks"),
            ListPath::BlockFeatures(index) => write!(f, "blocks/{index}/features"),
            ListPath::BlockFaq(index) => write!(f, "blocks/{index}/items"),
            ListPath::Footer => write!(f, "footer"),
            ListPath::FooterLinks(index) => write!(f, "footer/{index}/links"),
        }
    }
}

impl ListPath {
    /// JSON pointer of the object holding the list, and the list's field name.
    fn location(&self) -> (String, &'static str) {
        match self {
            ListPath::Nav => (String::new(), "headerNav"),
            ListPath::NavSubItems(index) => (format!("/headerNav/{index}"), "subItems"),
            ListPath::Blocks => (String::new(), "blocks"),
            ListPath::BlockFeatures(index) => (format!("/blocks/{index}"), "features"),
            ListPath::BlockFaq(index) => (format!("/blocks/{index}"), "items"),
            ListPath::Footer => (String::new(), "footer"),
            ListPath::FooterLinks(index) => (format!("/footer/{index}"), "links"),
        }
    }

    pub fn pointer(&self) -> String {
        let (parent, field) = self.location();
        format!("{parent}/{field}")
    }

    /// The list and index of the item that owns this nested list.
    pub fn owner(&self) -> Option<(ListPath, usize)> {
        match *self {
            ListPath::NavSubItems(index) => Some((ListPath::Nav, index)),
            ListPath::BlockFeatures(index) | ListPath::BlockFaq(index) => {
                Some((ListPath::Blocks, index))
            }
            ListPath::FooterLinks(index) => Some((ListPath::Footer, index)),
            ListPath::Nav | ListPath::Blocks | ListPath::Footer => None,
        }
    }

    /// The nested list owned by `item`, which sits at `index` in this list.
    pub fn child(&self, index: usize, item: &Value) -> Option<ListPath> {
        match self {
            ListPath::Nav => Some(ListPath::NavSubItems(index)),
            ListPath::Footer => Some(ListPath::FooterLinks(index)),
            ListPath::Blocks => match item.get("type").and_then(Value::as_str) {
                Some("features") => Some(ListPath::BlockFeatures(index)),
                Some("faq") => Some(ListPath::BlockFaq(index)),
                _ => None,
            },
            _ => None,
        }
    }

    fn with_owner_index(&self, index: usize) -> ListPath {
        match self {
            ListPath::NavSubItems(_) => ListPath::NavSubItems(index),
            ListPath::BlockFeatures(_) => ListPath::BlockFeatures(index),
            ListPath::BlockFaq(_) => ListPath::BlockFaq(index),
            ListPath::FooterLinks(_) => ListPath::FooterLinks(index),
            top_level => *top_level,
        }
    }

    fn required_block_type(&self) -> Option<&'static str> {
        match self {
            ListPath::BlockFeatures(_) => Some("features"),
            ListPath::BlockFaq(_) => Some("faq"),
            _ => None,
        }
    }

    /// The item a plain `add` appends to this list.
    pub fn default_item(&self) -> Value {
        let item = match self {
            ListPath::Nav => serde_json::to_value(NavItem::default()),
            ListPath::NavSubItems(_) => serde_json::to_value(NavSubItem::default()),
            ListPath::Blocks => serde_json::to_value(ContentBlock::default()),
            ListPath::BlockFeatures(_) => serde_json::to_value(FeatureCard::default()),
            ListPath::BlockFaq(_) => serde_json::to_value(FaqEntry::default()),
            ListPath::Footer => serde_json::to_value(FooterSection::default()),
            ListPath::FooterLinks(_) => serde_json::to_value(FooterLink::default()),
        };
        item.unwrap_or_default()
    }
}

/// One list mutation, as issued by a host that is not a live UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOp {
    Add(Option<Value>),
    Update { index: usize, patch: Value },
    Delete { index: usize },
    Move { from: usize, to: usize },
}

/// Owns a site document as JSON and applies list operations to it through the
/// generic list editor, one controller per list path.
#[derive(Debug)]
pub struct DocumentEditor {
    document: Value,
    options: EditorOptions,
    sessions: IndexMap<ListPath, ListController<Value, bool>>,
    dirty: bool,
}

impl DocumentEditor {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            options: EditorOptions::default(),
            sessions: IndexMap::new(),
            dirty: false,
        }
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EditorOptions {
        &mut self.options
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_document(self) -> Value {
        self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current items of a list; a list that does not exist yet is empty.
    pub fn items(&self, path: &ListPath) -> Result<Vec<Value>, ListPathError> {
        let (parent_pointer, field) = path.location();
        let parent = self.parent(path, &parent_pointer)?;
        match parent.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(ListPathError {
                path: path.to_string(),
                message: format!("'{field}' is not a list"),
            }),
        }
    }

    /// Applies one operation. Returns whether the document changed.
    pub fn apply(&mut self, path: &ListPath, op: ListOp) -> Result<bool, ListPathError> {
        if let ListOp::Update { index, patch } = &op {
            self.forget_replaced_children(path, *index, patch);
        }
        self.edit(path, |editor| match op {
            ListOp::Add(Some(item)) => editor.append(item),
            ListOp::Add(None) => editor.add(),
            ListOp::Update { index, patch } => editor.update(index, patch),
            ListOp::Delete { index } => editor.delete(index),
            ListOp::Move { from, to } => editor.move_index(from, to),
        })
    }

    /// Dispatches a keyboard action against the row at `focus` of one list.
    /// Drag and expand state persist between calls.
    pub fn apply_action(
        &mut self,
        path: &ListPath,
        action: ListAction,
        focus: Option<usize>,
    ) -> Result<bool, ListPathError> {
        self.edit(path, |editor| editor.apply_action(action, focus))
    }

    /// Keys of a list that has been edited in this session.
    pub fn keys(&self, path: &ListPath) -> Option<&ItemKeys> {
        self.sessions.get(path).map(ListController::keys)
    }

    /// The item being carried in a list, if a drag is in progress there.
    pub fn drag_active(&self, path: &ListPath) -> Option<&ItemKey> {
        self.sessions.get(path)?.drag_session().active()
    }

    pub fn is_expanded(&self, path: &ListPath, index: usize) -> bool {
        self.sessions.get(path).is_some_and(|controller| {
            controller
                .keys()
                .get(index)
                .and_then(|key| controller.row_state(key))
                .is_some_and(Expandable::is_expanded)
        })
    }

    fn edit<R>(
        &mut self,
        path: &ListPath,
        body: impl FnOnce(&mut ListEditor<'_, Value, bool>) -> R,
    ) -> Result<R, ListPathError> {
        let items = self.items(path)?;
        let drag = self.options.drag.clone();
        let controller = self.sessions.entry(*path).or_insert_with(|| {
            let default = path.default_item();
            ListController::new(move || default.clone()).with_drag_config(drag)
        });

        let mut replacement = None;
        let (result, before, after) = {
            let mut on_change = |next: Vec<Value>| replacement = Some(next);
            let mut editor = ListEditor::new(&items, controller, &mut on_change);
            let before = editor.keys().clone();
            let result = body(&mut editor);
            (result, before, editor.keys().clone())
        };

        if let Some(next) = replacement {
            self.write(path, next)?;
            self.dirty = true;
            tracing::info!(%path, "list updated");
        }
        if before.as_slice() != after.as_slice() {
            self.follow_owners(path, &before, &after);
        }
        Ok(result)
    }

    /// Re-files nested sessions under their owner's new index after the owner
    /// list was reordered or shrunk. Sessions whose owner is gone are dropped.
    fn follow_owners(&mut self, owners: &ListPath, before: &ItemKeys, after: &ItemKeys) {
        let sessions = std::mem::take(&mut self.sessions);
        self.sessions = sessions
            .into_iter()
            .filter_map(|(path, controller)| match path.owner() {
                Some((list, index)) if list == *owners => {
                    let moved = after.position(before.get(index)?)?;
                    Some((path.with_owner_index(moved), controller))
                }
                _ => Some((path, controller)),
            })
            .collect();
    }

    /// Drops nested sessions whose list an update is about to overwrite.
    fn forget_replaced_children(&mut self, path: &ListPath, index: usize, patch: &Value) {
        self.sessions.retain(|nested, _| {
            if nested.owner() != Some((*path, index)) {
                return true;
            }
            let (_, field) = nested.location();
            patch
                .as_object()
                .is_some_and(|fields| !fields.contains_key(field))
        });
    }

    /// Typed view of the document.
    pub fn site(&self) -> Result<SiteDocument, serde_json::Error> {
        SiteDocument::deserialize(&self.document)
    }

    /// Text outline of every list, rendered by the typed editors.
    pub fn outline(&self, expand: bool) -> Result<Vec<String>, serde_json::Error> {
        let site = self.site()?;
        let drag = self.options.drag.clone();
        let mut lines = Vec::new();

        lines.push(format!("Header navigation ({})", site.header_nav.len()));
        let mut nav = HeaderNavEditor::new().with_drag_config(drag.clone());
        lines.extend(outline_section(
            nav.bind(&site.header_nav, &mut |_| {}),
            expand,
            HeaderNavEditor::outline,
        ));

        lines.push(format!("Blocks ({})", site.blocks.len()));
        let mut panel = BlockPanel::new().with_drag_config(drag.clone());
        lines.extend(outline_section(
            panel.bind(&site.blocks, &mut |_| {}),
            expand,
            BlockPanel::outline,
        ));

        lines.push(format!("Footer ({})", site.footer.len()));
        let mut footer = FooterNavEditor::new().with_drag_config(drag);
        lines.extend(outline_section(
            footer.bind(&site.footer, &mut |_| {}),
            expand,
            FooterNavEditor::outline,
        ));
        Ok(lines)
    }

    /// Schema and link problems in the current document.
    pub fn validate(&self) -> anyhow::Result<Vec<ValidationIssue>> {
        let validator = site_validator()?;
        Ok(validate_document(&validator, &self.document))
    }

    /// Writes the document to the configured outputs. With auto-validation on,
    /// a document that has issues is never written.
    pub fn save(&mut self) -> anyhow::Result<()> {
        if self.options.auto_validate {
            let issues = self.validate()?;
            if !issues.is_empty() {
                for issue in &issues {
                    tracing::warn!(%issue, "document issue");
                }
                anyhow::bail!(
                    "document has {} validation issue(s); first: {}",
                    issues.len(),
                    issues[0]
                );
            }
        }
        write_document(&self.document, &self.options.output)?;
        self.dirty = false;
        Ok(())
    }

    fn parent(&self, path: &ListPath, pointer: &str) -> Result<&Map<String, Value>, ListPathError> {
        let parent = self
            .document
            .pointer(pointer)
            .and_then(Value::as_object)
            .ok_or_else(|| ListPathError {
                path: path.to_string(),
                message: if pointer.is_empty() {
                    "document root is not an object".to_string()
                } else {
                    format!("no item at {pointer}")
                },
            })?;
        if let Some(expected) = path.required_block_type() {
            let actual = parent.get("type").and_then(Value::as_str).unwrap_or("<none>");
            if actual != expected {
                return Err(ListPathError {
                    path: path.to_string(),
                    message: format!("block is '{actual}', expected '{expected}'"),
                });
            }
        }
        Ok(parent)
    }

    fn write(&mut self, path: &ListPath, items: Vec<Value>) -> Result<(), ListPathError> {
        let (parent_pointer, field) = path.location();
        let parent = self
            .document
            .pointer_mut(&parent_pointer)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ListPathError {
                path: path.to_string(),
                message: format!("no item at {parent_pointer}"),
            })?;
        parent.insert(field.to_string(), Value::Array(items));
        Ok(())
    }
}

fn outline_section<T, S>(
    mut editor: ListEditor<'_, T, S>,
    expand: bool,
    render: impl FnOnce(&mut ListEditor<'_, T, S>) -> Vec<String>,
) -> Vec<String>
where
    T: ListItem,
    S: Default + Expandable,
{
    if expand {
        for index in 0..editor.len() {
            editor.row(index, |row| row.state_mut().set_expanded(true));
        }
    }
    render(&mut editor)
        .into_iter()
        .map(|line| format!("  {line}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "headerNav": [
                {"label": "Platform", "href": "/platform", "subItems": [{"label": "X", "href": "/x"}]},
                {"label": "Pricing", "href": "/pricing"}
            ],
            "blocks": [
                {"type": "hero", "headline": "Hire faster"},
                {"type": "faq", "title": "FAQ", "items": []}
            ]
        })
    }

    #[test]
    fn parses_and_prints_paths() {
        for raw in ["nav", "nav/0/subItems", "blocks/2/features", "blocks/1/items", "footer/3/links"] {
            let path: ListPath = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
        assert_eq!("/nav/1/sub".parse::<ListPath>(), Ok(ListPath::NavSubItems(1)));
        assert!("footer/0/subItems".parse::<ListPath>().is_err());
        assert!("sidebar".parse::<ListPath>().is_err());
    }

    #[test]
    fn nested_list_missing_on_parent_is_created() {
        let mut doc = DocumentEditor::new(sample());
        let path = ListPath::NavSubItems(1);
        assert_eq!(doc.items(&path).unwrap(), Vec::<Value>::new());
        assert!(doc.apply(&path, ListOp::Add(None)).unwrap());
        assert_eq!(
            doc.document()["headerNav"][1]["subItems"],
            json!([{"label": "New item", "href": "/"}])
        );
        assert!(doc.is_dirty());
    }

    #[test]
    fn top_level_list_is_created_on_first_add() {
        let mut doc = DocumentEditor::new(json!({}));
        let item = json!({"title": "Company", "links": []});
        assert!(doc.apply(&ListPath::Footer, ListOp::Add(Some(item.clone()))).unwrap());
        assert_eq!(doc.document()["footer"], json!([item]));
    }

    #[test]
    fn moves_and_patches_keep_other_items() {
        let mut doc = DocumentEditor::new(sample());
        assert!(doc.apply(&ListPath::Nav, ListOp::Move { from: 1, to: 0 }).unwrap());
        assert!(doc
            .apply(
                &ListPath::Nav,
                ListOp::Update {
                    index: 1,
                    patch: json!({"label": "Product"}),
                },
            )
            .unwrap());
        let nav = &doc.document()["headerNav"];
        assert_eq!(nav[0]["label"], "Pricing");
        assert_eq!(nav[1]["label"], "Product");
        assert_eq!(nav[1]["subItems"][0]["label"], "X");
    }

    #[test]
    fn invalid_operations_leave_the_document_clean() {
        let mut doc = DocumentEditor::new(sample());
        assert!(!doc.apply(&ListPath::Nav, ListOp::Delete { index: 5 }).unwrap());
        assert!(!doc.apply(&ListPath::Nav, ListOp::Move { from: 0, to: 0 }).unwrap());
        assert!(!doc.is_dirty());
        assert_eq!(doc.document(), &sample());
    }

    #[test]
    fn nested_block_lists_check_the_block_type() {
        let mut doc = DocumentEditor::new(sample());
        let err = doc
            .apply(&ListPath::BlockFeatures(0), ListOp::Add(None))
            .unwrap_err();
        assert!(err.message.contains("hero"));
        assert!(doc.apply(&ListPath::BlockFaq(1), ListOp::Add(None)).unwrap());
        assert!(doc.apply(&ListPath::BlockFaq(7), ListOp::Add(None)).is_err());
    }

    #[test]
    fn session_keys_track_moves_across_operations() {
        let mut doc = DocumentEditor::new(sample());
        doc.apply(&ListPath::Nav, ListOp::Move { from: 0, to: 1 }).unwrap();
        let keys: Vec<_> = doc.sessions[&ListPath::Nav]
            .keys()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(keys, ["item-1", "item-0"]);
    }

    fn key_names(doc: &DocumentEditor, path: ListPath) -> Option<Vec<String>> {
        doc.keys(&path)
            .map(|keys| keys.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn nested_sessions_follow_their_owner() {
        let mut doc = DocumentEditor::new(sample());
        doc.apply(&ListPath::NavSubItems(0), ListOp::Add(None)).unwrap();
        assert_eq!(
            key_names(&doc, ListPath::NavSubItems(0)).unwrap(),
            ["item-0", "item-1"]
        );

        doc.apply(&ListPath::Nav, ListOp::Move { from: 0, to: 1 }).unwrap();
        assert_eq!(key_names(&doc, ListPath::NavSubItems(0)), None);
        assert_eq!(
            key_names(&doc, ListPath::NavSubItems(1)).unwrap(),
            ["item-0", "item-1"]
        );
        doc.apply(&ListPath::NavSubItems(1), ListOp::Add(None)).unwrap();
        assert_eq!(
            key_names(&doc, ListPath::NavSubItems(1)).unwrap(),
            ["item-0", "item-1", "item-2"]
        );

        doc.apply(&ListPath::Nav, ListOp::Delete { index: 1 }).unwrap();
        assert!(doc.sessions.keys().all(|path| path.owner().is_none()));
    }

    #[test]
    fn replacing_a_nested_list_resets_its_session() {
        let mut doc = DocumentEditor::new(sample());
        doc.apply(&ListPath::NavSubItems(0), ListOp::Add(None)).unwrap();
        doc.apply(
            &ListPath::Nav,
            ListOp::Update {
                index: 0,
                patch: json!({"label": "Product"}),
            },
        )
        .unwrap();
        assert!(doc.keys(&ListPath::NavSubItems(0)).is_some());
        doc.apply(
            &ListPath::Nav,
            ListOp::Update {
                index: 0,
                patch: json!({"subItems": []}),
            },
        )
        .unwrap();
        assert!(doc.keys(&ListPath::NavSubItems(0)).is_none());
    }

    #[test]
    fn keyboard_actions_keep_drag_state_between_calls() {
        let mut doc = DocumentEditor::new(sample());
        assert!(doc.apply_action(&ListPath::Nav, ListAction::Grab, Some(1)).unwrap());
        assert_eq!(
            doc.drag_active(&ListPath::Nav).map(ItemKey::as_str),
            Some("item-1")
        );
        assert!(!doc.is_dirty());
        assert!(doc.apply_action(&ListPath::Nav, ListAction::Step(-1), None).unwrap());
        assert!(doc.apply_action(&ListPath::Nav, ListAction::Grab, None).unwrap());
        assert_eq!(doc.document()["headerNav"][0]["label"], "Pricing");
        assert!(doc.drag_active(&ListPath::Nav).is_none());

        assert!(doc.apply_action(&ListPath::Nav, ListAction::Expand, Some(1)).unwrap());
        assert!(doc.is_expanded(&ListPath::Nav, 1));
        assert!(!doc.is_expanded(&ListPath::Nav, 0));
    }

    #[test]
    fn save_refuses_invalid_documents() {
        let options = EditorOptions::default().with_output(
            crate::io::OutputOptions::default().with_destinations(Vec::new()),
        );
        let mut doc = DocumentEditor::new(sample()).with_options(options);
        doc.apply(
            &ListPath::Nav,
            ListOp::Update {
                index: 0,
                patch: json!({"href": "no spaces allowed"}),
            },
        )
        .unwrap();
        let err = doc.save().unwrap_err();
        assert!(err.to_string().contains("/headerNav/0/href"));
        assert!(doc.is_dirty());

        doc.apply(
            &ListPath::Nav,
            ListOp::Update {
                index: 0,
                patch: json!({"href": "/platform"}),
            },
        )
        .unwrap();
        doc.save().unwrap();
        assert!(!doc.is_dirty());
    }

    #[test]
    fn outline_renders_every_section() {
        let doc = DocumentEditor::new(sample());
        let lines = doc.outline(true).unwrap();
        assert_eq!(lines[0], "Header navigation (2)");
        assert_eq!(lines[1], "  ▾ Platform → /platform (1 sub-item)");
        assert_eq!(lines[2], "      • X → /x");
        assert!(lines.contains(&"  ▾ Hero: \"Hire faster\"".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Footer (0)"));
    }
}

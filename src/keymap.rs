//! Keyboard bindings for list editing, loaded from `keymap/default.keymap.json`.

use std::sync::LazyLock;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::list::ListAction;

macro_rules! keymap_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/keymap/default.keymap.json"
        ))
    };
}

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Forward to the focused list via `ListEditor::apply_action`.
    List(ListAction),
    /// Move focus between rows without touching the items.
    Focus(i32),
    Save,
    Quit,
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    description: String,
    action: RawAction,
    combos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum RawAction {
    Grab,
    Step { delta: i32 },
    Cancel,
    Add,
    Delete,
    ToggleExpanded,
    Expand,
    Collapse,
    Focus { delta: i32 },
    Save,
    Quit,
}

impl RawAction {
    fn into_action(self) -> EditorAction {
        match self {
            RawAction::Grab => EditorAction::List(ListAction::Grab),
            RawAction::Step { delta } => EditorAction::List(ListAction::Step(delta)),
            RawAction::Cancel => EditorAction::List(ListAction::Cancel),
            RawAction::Add => EditorAction::List(ListAction::Add),
            RawAction::Delete => EditorAction::List(ListAction::Delete),
            RawAction::ToggleExpanded => EditorAction::List(ListAction::ToggleExpanded),
            RawAction::Expand => EditorAction::List(ListAction::Expand),
            RawAction::Collapse => EditorAction::List(ListAction::Collapse),
            RawAction::Focus { delta } => EditorAction::Focus(delta),
            RawAction::Save => EditorAction::Save,
            RawAction::Quit => EditorAction::Quit,
        }
    }
}

struct KeyBinding {
    action: EditorAction,
    combos: Vec<KeyPattern>,
    snippet: String,
}

impl KeyBinding {
    fn from_raw(raw: RawEntry) -> Self {
        let combos = raw
            .combos
            .iter()
            .map(|combo| {
                KeyPattern::parse(combo).unwrap_or_else(|err| {
                    panic!("failed to parse combo '{combo}' for {}: {err}", raw.id)
                })
            })
            .collect::<Vec<_>>();
        assert!(
            !combos.is_empty(),
            "keymap entry {} must declare combos",
            raw.id
        );
        let combos_display = combos
            .iter()
            .map(|pattern| pattern.display.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            action: raw.action.into_action(),
            snippet: format!("{combos_display} -> {}", raw.description),
            combos,
        }
    }

    fn matches(&self, key: &KeyEvent) -> Option<EditorAction> {
        self.combos
            .iter()
            .find(|pattern| pattern.matches(key))
            .map(|_| self.action)
    }
}

struct KeyPattern {
    code: KeyCode,
    required: KeyModifiers,
    display: String,
}

impl KeyPattern {
    fn parse(combo: &str) -> Result<Self, String> {
        let display = combo.trim().to_string();
        let mut tokens = display
            .split('+')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>();
        let Some(key_token) = tokens.pop() else {
            return Err("combo must contain a key".into());
        };
        let code = key_code(key_token)?;
        let mut required = KeyModifiers::empty();
        for token in tokens {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => required |= KeyModifiers::CONTROL,
                "shift" => required |= KeyModifiers::SHIFT,
                "alt" => required |= KeyModifiers::ALT,
                other => return Err(format!("unsupported modifier '{other}'")),
            }
        }
        Ok(Self {
            code,
            required,
            display,
        })
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        let code = match key.code {
            KeyCode::Char(ch) => KeyCode::Char(ch.to_ascii_lowercase()),
            other => other,
        };
        code == self.code && key.modifiers == self.required
    }
}

fn key_code(token: &str) -> Result<KeyCode, String> {
    let normalized = token.to_lowercase();
    let code = match normalized.as_str() {
        "space" => KeyCode::Char(' '),
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "delete" | "del" => KeyCode::Delete,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return Err(format!("unsupported key '{token}'")),
            }
        }
    };
    Ok(code)
}

static KEYMAP: LazyLock<Vec<KeyBinding>> = LazyLock::new(|| {
    let raw_entries: Vec<RawEntry> =
        serde_json::from_str(keymap_source!()).expect("invalid keymap/default.keymap.json");
    raw_entries.into_iter().map(KeyBinding::from_raw).collect()
});

pub fn classify_key(key: &KeyEvent) -> Option<EditorAction> {
    KEYMAP.iter().find_map(|binding| binding.matches(key))
}

/// One `combos -> description` line per binding.
pub fn help_text() -> Vec<String> {
    KEYMAP
        .iter()
        .map(|binding| binding.snippet.clone())
        .collect()
}

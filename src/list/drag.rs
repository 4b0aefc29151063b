//! Drag state for one list level.
//!
//! A [`DragSession`] turns pointer and keyboard input into at most one
//! [`DragTransition`] per gesture. Presses that never travel the activation
//! distance are clicks, and releases with no target, on the dragged item
//! itself, or after a cancel produce no transition.

use serde::{Deserialize, Serialize};

use super::identity::{ItemKey, ItemKeys};

/// Listener names a host forwards from the handle element to the session.
pub const HANDLE_LISTENERS: &[&str] = &["pointerdown", "keydown"];

const INSTRUCTIONS_ID: &str = "blockedit-drag-instructions";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragConfig {
    /// Pointer travel required before a press turns into a drag.
    pub activation_distance: f32,
    pub cancel_on_escape: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance: 8.0,
            cancel_on_escape: true,
        }
    }
}

impl DragConfig {
    pub fn with_activation_distance(mut self, distance: f32) -> Self {
        self.activation_distance = distance.max(0.0);
        self
    }

    pub fn with_cancel_on_escape(mut self, enabled: bool) -> Self {
        self.cancel_on_escape = enabled;
        self
    }
}

/// A completed drag over a valid target. Consumed once by the reorder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragTransition {
    pub active: ItemKey,
    pub over: ItemKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    PointerDown { key: ItemKey, at: Point },
    PointerMove { at: Point, over: Option<ItemKey> },
    PointerUp,
    Pickup(ItemKey),
    Step(i32),
    Drop,
    Escape,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Pressed,
    Started(ItemKey),
    Moved { over: Option<ItemKey> },
    Dropped(DragTransition),
    Released,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragInput {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Pressed {
        key: ItemKey,
        origin: Point,
    },
    Dragging {
        active: ItemKey,
        over: Option<ItemKey>,
        input: DragInput,
    },
}

/// Bind props for one item's drag handle.
#[derive(Debug, Clone, PartialEq)]
pub struct DragHandle {
    pub key: ItemKey,
    pub attributes: Vec<(&'static str, String)>,
    pub listeners: &'static [&'static str],
}

impl DragHandle {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    config: DragConfig,
    state: DragState,
}

impl DragSession {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DragConfig) {
        self.config = config;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active(&self) -> Option<&ItemKey> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&ItemKey> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    pub fn is_dragging(&self, key: &ItemKey) -> bool {
        self.active() == Some(key)
    }

    pub fn handle(&self, key: &ItemKey) -> DragHandle {
        let pressed = self.is_dragging(key);
        DragHandle {
            key: key.clone(),
            attributes: vec![
                ("role", "button".to_string()),
                ("tabindex", "0".to_string()),
                ("aria-roledescription", "sortable".to_string()),
                ("aria-pressed", pressed.to_string()),
                ("aria-describedby", INSTRUCTIONS_ID.to_string()),
            ],
            listeners: HANDLE_LISTENERS,
        }
    }

    /// Feeds one input event. `keys` is the list's key order at this moment.
    pub fn handle_event(&mut self, event: DragEvent, keys: &ItemKeys) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = self.transition(state, event, keys);
        tracing::trace!(target: "blockedit::list", ?next, ?outcome, "drag event");
        self.state = next;
        outcome
    }

    fn transition(
        &self,
        state: DragState,
        event: DragEvent,
        keys: &ItemKeys,
    ) -> (DragState, DragOutcome) {
        match (state, event) {
            (DragState::Idle, DragEvent::PointerDown { key, at }) => {
                if keys.position(&key).is_none() {
                    return (DragState::Idle, DragOutcome::Ignored);
                }
                if self.config.activation_distance <= 0.0 {
                    return start(key, DragInput::Pointer);
                }
                (DragState::Pressed { key, origin: at }, DragOutcome::Pressed)
            }
            (DragState::Idle, DragEvent::Pickup(key)) => {
                if keys.position(&key).is_none() {
                    return (DragState::Idle, DragOutcome::Ignored);
                }
                start(key, DragInput::Keyboard)
            }
            (DragState::Pressed { key, origin }, DragEvent::PointerMove { at, over }) => {
                if origin.distance(at) < self.config.activation_distance {
                    return (DragState::Pressed { key, origin }, DragOutcome::Ignored);
                }
                let outcome = DragOutcome::Started(key.clone());
                (
                    DragState::Dragging {
                        active: key,
                        over,
                        input: DragInput::Pointer,
                    },
                    outcome,
                )
            }
            (DragState::Pressed { .. }, DragEvent::PointerUp | DragEvent::Cancel) => {
                (DragState::Idle, DragOutcome::Released)
            }
            (DragState::Pressed { .. }, DragEvent::Escape) if self.config.cancel_on_escape => {
                (DragState::Idle, DragOutcome::Cancelled)
            }
            (
                DragState::Dragging {
                    active,
                    input: DragInput::Pointer,
                    ..
                },
                DragEvent::PointerMove { over, .. },
            ) => {
                let outcome = DragOutcome::Moved { over: over.clone() };
                (
                    DragState::Dragging {
                        active,
                        over,
                        input: DragInput::Pointer,
                    },
                    outcome,
                )
            }
            (
                DragState::Dragging {
                    active,
                    over,
                    input: DragInput::Keyboard,
                },
                DragEvent::Step(delta),
            ) => {
                let over = step_target(keys, over.as_ref().unwrap_or(&active), delta);
                let outcome = DragOutcome::Moved { over: over.clone() };
                (
                    DragState::Dragging {
                        active,
                        over,
                        input: DragInput::Keyboard,
                    },
                    outcome,
                )
            }
            (
                DragState::Dragging {
                    active,
                    over,
                    input: DragInput::Pointer,
                },
                DragEvent::PointerUp,
            )
            | (
                DragState::Dragging {
                    active,
                    over,
                    input: DragInput::Keyboard,
                },
                DragEvent::Drop,
            ) => (DragState::Idle, finish(active, over)),
            (DragState::Dragging { .. }, DragEvent::Cancel) => {
                (DragState::Idle, DragOutcome::Cancelled)
            }
            (DragState::Dragging { .. }, DragEvent::Escape) if self.config.cancel_on_escape => {
                (DragState::Idle, DragOutcome::Cancelled)
            }
            (state, _) => (state, DragOutcome::Ignored),
        }
    }
}

fn start(key: ItemKey, input: DragInput) -> (DragState, DragOutcome) {
    let outcome = DragOutcome::Started(key.clone());
    (
        DragState::Dragging {
            over: Some(key.clone()),
            active: key,
            input,
        },
        outcome,
    )
}

fn finish(active: ItemKey, over: Option<ItemKey>) -> DragOutcome {
    match over {
        Some(over) if over != active => DragOutcome::Dropped(DragTransition { active, over }),
        _ => DragOutcome::Released,
    }
}

fn step_target(keys: &ItemKeys, from: &ItemKey, delta: i32) -> Option<ItemKey> {
    if keys.is_empty() {
        return None;
    }
    let current = keys.position(from)? as i64;
    let last = keys.len() as i64 - 1;
    let next = (current + i64::from(delta)).clamp(0, last);
    keys.get(next as usize).cloned()
}

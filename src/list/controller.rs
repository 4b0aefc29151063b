use std::{borrow::Cow, fmt};

use indexmap::IndexMap;
use serde_json::Value;

use super::{
    actions::ListAction,
    drag::{DragConfig, DragEvent, DragHandle, DragOutcome, DragSession, DragTransition},
    identity::{ItemKey, ItemKeys},
    reorder::{move_item, resolve},
};

/// An item the list editor can patch in place.
///
/// `apply_patch` is a shallow merge: fields named by the patch are replaced,
/// everything else is left as it was.
pub trait ListItem: Clone {
    type Patch;

    fn apply_patch(&mut self, patch: Self::Patch);
}

impl ListItem for Value {
    type Patch = Value;

    fn apply_patch(&mut self, patch: Value) {
        match (self, patch) {
            (Value::Object(target), Value::Object(fields)) => {
                for (name, value) in fields {
                    target.insert(name, value);
                }
            }
            (slot, replacement) => *slot = replacement,
        }
    }
}

/// Row-local expand/collapse flag. Never part of the persisted item.
pub trait Expandable {
    fn is_expanded(&self) -> bool;

    fn set_expanded(&mut self, expanded: bool);

    fn toggle_expanded(&mut self) -> bool {
        let next = !self.is_expanded();
        self.set_expanded(next);
        self.is_expanded()
    }
}

impl Expandable for () {
    fn is_expanded(&self) -> bool {
        false
    }

    fn set_expanded(&mut self, _expanded: bool) {}
}

impl Expandable for bool {
    fn is_expanded(&self) -> bool {
        *self
    }

    fn set_expanded(&mut self, expanded: bool) {
        *self = expanded;
    }
}

/// Session state for one list: keys, drag state, row state and the
/// default-item factory. The items themselves always belong to the host.
pub struct ListController<T, S = ()> {
    keys: ItemKeys,
    attached: bool,
    drag: DragSession,
    factory: Box<dyn Fn() -> T>,
    rows: IndexMap<ItemKey, S>,
}

impl<T, S> fmt::Debug for ListController<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("keys", &self.keys)
            .field("drag", &self.drag)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<T: Default + 'static, S> Default for ListController<T, S> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T, S> ListController<T, S> {
    pub fn new(factory: impl Fn() -> T + 'static) -> Self {
        Self {
            keys: ItemKeys::default(),
            attached: false,
            drag: DragSession::default(),
            factory: Box::new(factory),
            rows: IndexMap::new(),
        }
    }

    /// Uses caller supplied IDs (for example entity primary keys) instead of
    /// index-derived keys.
    pub fn with_item_ids<I, K>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ItemKey>,
    {
        self.set_item_ids(ids);
        self
    }

    pub fn with_drag_config(mut self, config: DragConfig) -> Self {
        self.drag.set_config(config);
        self
    }

    pub fn set_item_ids<I, K>(&mut self, ids: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<ItemKey>,
    {
        self.keys.replace_external(ids);
        self.attached = true;
        self.prune_rows();
    }

    pub fn keys(&self) -> &ItemKeys {
        &self.keys
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn row_state(&self, key: &ItemKey) -> Option<&S> {
        self.rows.get(key)
    }

    pub fn row_state_mut(&mut self, key: &ItemKey) -> Option<&mut S> {
        self.rows.get_mut(key)
    }

    fn attach(&mut self, len: usize) {
        if !self.attached {
            self.keys = ItemKeys::derived(len);
            self.attached = true;
        } else if self.keys.sync(len) {
            self.prune_rows();
        }
    }

    fn prune_rows(&mut self) {
        let keys = &self.keys;
        self.rows.retain(|key, _| keys.position(key).is_some());
    }
}

/// A list controller bound to the host's current items and change callback.
///
/// Every mutating call builds a complete replacement array and hands it to
/// `on_change` exactly once. Calls that cannot apply return `false` and leave
/// the host untouched.
pub struct ListEditor<'a, T: ListItem, S = ()> {
    items: Cow<'a, [T]>,
    controller: &'a mut ListController<T, S>,
    on_change: &'a mut dyn FnMut(Vec<T>),
}

impl<'a, T: ListItem, S> ListEditor<'a, T, S> {
    pub fn new(
        items: &'a [T],
        controller: &'a mut ListController<T, S>,
        on_change: &'a mut dyn FnMut(Vec<T>),
    ) -> Self {
        controller.attach(items.len());
        Self {
            items: Cow::Borrowed(items),
            controller,
            on_change,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> &ItemKeys {
        &self.controller.keys
    }

    pub fn controller(&self) -> &ListController<T, S> {
        self.controller
    }

    /// Appends one item produced by the default factory.
    pub fn add(&mut self) -> bool {
        let item = (self.controller.factory)();
        self.append(item)
    }

    /// Appends a caller built item at the end of the list.
    pub fn append(&mut self, item: T) -> bool {
        let mut next = self.items.to_vec();
        next.push(item);
        self.controller.keys.push_fresh();
        self.commit("add", next);
        true
    }

    pub fn update(&mut self, index: usize, patch: T::Patch) -> bool {
        if index >= self.items.len() {
            tracing::debug!(target: "blockedit::list", index, len = self.items.len(), "update out of bounds");
            return false;
        }
        let mut next = self.items.to_vec();
        next[index].apply_patch(patch);
        self.commit("update", next);
        true
    }

    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            tracing::debug!(target: "blockedit::list", index, len = self.items.len(), "delete out of bounds");
            return false;
        }
        let mut next = self.items.to_vec();
        next.remove(index);
        if let Some(key) = self.controller.keys.remove(index) {
            self.controller.rows.shift_remove(&key);
        }
        self.commit("delete", next);
        true
    }

    /// Applies a completed drag, resolving its keys against the current order.
    pub fn reorder(&mut self, transition: &DragTransition) -> bool {
        let (from, to) = resolve(&self.controller.keys, transition);
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!(target: "blockedit::list", ?transition, "drag keys not found");
            return false;
        };
        if from == to || from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let next = move_item(&self.items, Some(from), Some(to));
        self.controller.keys.relocate(from, to);
        self.commit("reorder", next);
        true
    }

    /// Moves by index through the same key resolution a drag uses.
    pub fn move_index(&mut self, from: usize, to: usize) -> bool {
        let (Some(active), Some(over)) = (
            self.controller.keys.get(from).cloned(),
            self.controller.keys.get(to).cloned(),
        ) else {
            return false;
        };
        self.reorder(&DragTransition { active, over })
    }

    pub fn drag(&mut self, event: DragEvent) -> DragOutcome {
        let outcome = self.controller.drag.handle_event(event, &self.controller.keys);
        if let DragOutcome::Dropped(transition) = &outcome {
            self.reorder(transition);
        }
        outcome
    }

    fn commit(&mut self, op: &'static str, next: Vec<T>) {
        tracing::debug!(target: "blockedit::list", op, len = next.len(), "list changed");
        self.items = Cow::Owned(next.clone());
        (self.on_change)(next);
    }
}

impl<T: ListItem, S: Default> ListEditor<'_, T, S> {
    /// Calls `render_item` once per item, in order, and collects the results.
    ///
    /// Patches issued through [`Row::update`] are committed after the pass,
    /// each as its own change.
    pub fn render<R>(&mut self, mut render_item: impl FnMut(&mut Row<'_, T, S>) -> R) -> Vec<R> {
        let mut patches = Vec::new();
        let rendered = {
            let items: &[T] = &self.items;
            let ListController {
                keys, drag, rows, ..
            } = &mut *self.controller;
            let mut out = Vec::with_capacity(items.len());
            for ((index, item), key) in items.iter().enumerate().zip(keys.iter()) {
                let state = rows.entry(key.clone()).or_default();
                let mut row = Row {
                    item,
                    index,
                    key,
                    drag: &*drag,
                    state,
                    patches: &mut patches,
                };
                out.push(render_item(&mut row));
            }
            out
        };
        self.commit_patches(patches);
        rendered
    }

    /// Runs `f` against the row at `index`, if there is one.
    pub fn row<R>(&mut self, index: usize, f: impl FnOnce(&mut Row<'_, T, S>) -> R) -> Option<R> {
        let mut patches = Vec::new();
        let result = {
            let item = self.items.get(index)?;
            let ListController {
                keys, drag, rows, ..
            } = &mut *self.controller;
            let key = keys.get(index)?;
            let state = rows.entry(key.clone()).or_default();
            let mut row = Row {
                item,
                index,
                key,
                drag: &*drag,
                state,
                patches: &mut patches,
            };
            f(&mut row)
        };
        self.commit_patches(patches);
        Some(result)
    }

    fn commit_patches(&mut self, patches: Vec<(usize, T::Patch)>) {
        for (index, patch) in patches {
            self.update(index, patch);
        }
    }
}

impl<T: ListItem, S: Default + Expandable> ListEditor<'_, T, S> {
    /// Flips the row's expanded flag. Items are never touched.
    pub fn toggle_expanded(&mut self, index: usize) -> Option<bool> {
        self.row(index, |row| row.state_mut().toggle_expanded())
    }

    /// Sets the row's expanded flag. Returns whether the flag changed.
    pub fn set_expanded(&mut self, index: usize, expanded: bool) -> bool {
        self.row(index, |row| {
            let state = row.state_mut();
            let changed = state.is_expanded() != expanded;
            state.set_expanded(expanded);
            changed
        })
        .unwrap_or(false)
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.controller
            .keys
            .get(index)
            .and_then(|key| self.controller.rows.get(key))
            .is_some_and(Expandable::is_expanded)
    }

    /// Dispatches a keyboard action against the focused row.
    pub fn apply_action(&mut self, action: ListAction, focus: Option<usize>) -> bool {
        let focused_key = focus.and_then(|index| self.controller.keys.get(index).cloned());
        match action {
            ListAction::Add => self.add(),
            ListAction::Delete => focus.is_some_and(|index| self.delete(index)),
            ListAction::ToggleExpanded => focus
                .and_then(|index| self.toggle_expanded(index))
                .is_some(),
            ListAction::Expand => focus.is_some_and(|index| self.set_expanded(index, true)),
            ListAction::Collapse => focus.is_some_and(|index| self.set_expanded(index, false)),
            ListAction::Pickup => focused_key.is_some_and(|key| {
                matches!(self.drag(DragEvent::Pickup(key)), DragOutcome::Started(_))
            }),
            ListAction::Grab if self.controller.drag.is_active() => {
                self.apply_action(ListAction::Drop, focus)
            }
            ListAction::Grab => self.apply_action(ListAction::Pickup, focus),
            ListAction::Step(delta) => {
                !matches!(self.drag(DragEvent::Step(delta)), DragOutcome::Ignored)
            }
            ListAction::Drop => matches!(self.drag(DragEvent::Drop), DragOutcome::Dropped(_)),
            ListAction::Cancel => {
                matches!(self.drag(DragEvent::Escape), DragOutcome::Cancelled)
            }
        }
    }
}

/// One item as seen by a render function.
pub struct Row<'r, T: ListItem, S> {
    item: &'r T,
    index: usize,
    key: &'r ItemKey,
    drag: &'r DragSession,
    state: &'r mut S,
    patches: &'r mut Vec<(usize, T::Patch)>,
}

impl<'r, T: ListItem, S> Row<'r, T, S> {
    pub fn item(&self) -> &'r T {
        self.item
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> &ItemKey {
        self.key
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging(self.key)
    }

    pub fn handle(&self) -> DragHandle {
        self.drag.handle(self.key)
    }

    pub fn state(&self) -> &S {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.state
    }

    /// Queues a patch for this row; it is applied once the render pass ends.
    pub fn update(&mut self, patch: T::Patch) {
        self.patches.push((self.index, patch));
    }

    /// Mounts an independent editor over a list nested inside this row.
    ///
    /// `items` selects the nested array, `controller` the nested controller kept
    /// in the row state, and `wrap` turns a new nested array into a patch for
    /// this row. Each nested change becomes exactly one update of this row.
    pub fn nested<C, CS, R>(
        &mut self,
        items: impl FnOnce(&T) -> &[C],
        controller: impl FnOnce(&mut S) -> &mut ListController<C, CS>,
        wrap: impl Fn(Vec<C>) -> T::Patch,
        body: impl FnOnce(&mut ListEditor<'_, C, CS>) -> R,
    ) -> R
    where
        C: ListItem,
    {
        let mut changes = Vec::new();
        let result = {
            let nested_items = items(self.item);
            let child = controller(&mut *self.state);
            let mut on_change = |next: Vec<C>| changes.push(next);
            let mut editor = ListEditor::new(nested_items, child, &mut on_change);
            body(&mut editor)
        };
        for next in changes {
            self.patches.push((self.index, wrap(next)));
        }
        result
    }
}

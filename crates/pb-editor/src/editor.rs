//! The editor: single owner of the item list.
//!
//! Every change flows through `Editor::apply`, which runs the store
//! mutation, records history and notifies the host:
//!
//! - **Discrete edits** (toolbar, keyboard, panels, drops) push one
//!   snapshot each.
//! - **Pointer gestures** (drag, resize) mutate the list live on every
//!   sample inside a history batch and push one snapshot on release.
//!
//! Selection, view settings and the clipboard are editor state but not
//! document state; they never enter history.

use crate::drop::{DropPayload, client_to_canvas};
use crate::history::{History, HistoryInfo};
use crate::input::{InputEvent, Modifiers};
use crate::panels::{self, LayerAction, LayerRow, PropertiesView, PropertyEdit};
use crate::selection::Selection;
use crate::shortcuts::{FocusContext, KeyEvent, ShortcutAction, ShortcutMap};
use crate::store::{self, MutationContext, StoreMutation};
use crate::toolbar::{ToolbarCommand, ToolbarState};
use crate::tools::{CanvasEvent, CanvasTool, DragMode, GestureState, HitTarget};
use pb_core::clock::{Clock, SystemClock};
use pb_core::config::EditorConfig;
use pb_core::document::Document;
use pb_core::id::ItemId;
use pb_core::lint::{LintDiagnostic, lint_items};
use pb_core::model::{PlacedItem, Position, Template};
use pb_render::{DisplayItem, Point, display_list, hit_test, hit_test_handle, paint_order};

/// Host callback receiving the full item list.
pub type ItemsHook = Box<dyn FnMut(&[PlacedItem])>;

/// Result of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The bound action, if the key resolved to one.
    pub action: Option<ShortcutAction>,
    /// True when the editor consumed the key; the host should call
    /// `preventDefault` and `stopPropagation`.
    pub handled: bool,
}

pub struct Editor {
    items: Vec<PlacedItem>,
    selection: Selection,
    history: History,
    clipboard: Vec<PlacedItem>,
    tool: CanvasTool,
    shortcuts: ShortcutMap,
    config: EditorConfig,
    clock: Box<dyn Clock>,
    on_change: Option<ItemsHook>,
    on_save: Option<ItemsHook>,
    /// Set on every accepted item change, cleared by `take_dirty`.
    dirty: bool,
}

impl Editor {
    /// Empty editor using the wall clock.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            items: Vec::new(),
            selection: Selection::new(),
            history: History::with_initial(&[], now, config.history_depth),
            clipboard: Vec::new(),
            tool: CanvasTool::default(),
            shortcuts: ShortcutMap::default(),
            config,
            clock,
            on_change: None,
            on_save: None,
            dirty: false,
        }
    }

    /// Replace the document. History restarts from the loaded list and the
    /// host is not notified (it supplied the list).
    pub fn load(&mut self, document: Document) {
        self.cancel_gesture();
        self.items = document.into_items();
        self.restore_selection();
        let now = self.clock.now_ms();
        self.history.reset(&self.items, now);
        self.dirty = false;
        log::debug!("loaded {} items", self.items.len());
    }

    pub fn set_on_change(&mut self, hook: ItemsHook) {
        self.on_change = Some(hook);
    }

    pub fn set_on_save(&mut self, hook: ItemsHook) {
        self.on_save = Some(hook);
    }

    pub fn set_shortcuts(&mut self, shortcuts: ShortcutMap) {
        self.shortcuts = shortcuts;
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PlacedItem> {
        store::find(&self.items, id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &[PlacedItem] {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn drag_mode(&self) -> DragMode {
        self.tool.mode
    }

    pub fn gesture(&self) -> GestureState {
        self.tool.state()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_info(&self) -> HistoryInfo {
        self.history.info()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn document(&self) -> Document {
        Document::from_items(self.items.clone()).unwrap_or_else(|e| {
            log::error!("editor list failed validation: {e}");
            Document::new()
        })
    }

    /// Whether items changed since the last call. Lets a polling host
    /// drive its own `onChange`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn layers(&self) -> Vec<LayerRow> {
        panels::layers(&self.items, &self.selection)
    }

    pub fn properties(&self) -> PropertiesView {
        panels::properties(&self.items, &self.selection)
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState {
            selected_count: self.selection.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            can_paste: !self.clipboard.is_empty(),
            drag_mode: self.tool.mode,
            grid: self.config.grid,
            view: self.config.view,
            history: self.history.info(),
        }
    }

    pub fn display_list(&self) -> Vec<DisplayItem> {
        display_list(
            &self.items,
            self.selection.ids(),
            self.tool.mode.shows_handles(),
            self.scale(),
        )
    }

    /// Current marquee rectangle, if a box selection is being drawn.
    pub fn marquee(&self) -> Option<pb_render::Rect> {
        self.tool.marquee_rect
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        lint_items(&self.items, self.config.view.canvas_size)
    }

    fn scale(&self) -> f64 {
        self.config.view.scale() as f64
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply a store mutation. Returns false when it changed nothing.
    pub fn apply(&mut self, mutation: StoreMutation) -> bool {
        let ctx = self.mutation_context();
        self.apply_with(&mutation, &ctx)
    }

    /// Apply geometry that is already final (tool output, nudges).
    fn apply_exact(&mut self, mutation: StoreMutation) -> bool {
        let mut ctx = self.mutation_context();
        ctx.grid.snap = false;
        self.apply_with(&mutation, &ctx)
    }

    fn mutation_context(&self) -> MutationContext {
        MutationContext {
            grid: self.config.grid,
            now: self.clock.now_ms(),
            duplicate_offset: self.config.duplicate_offset,
        }
    }

    fn apply_with(&mut self, mutation: &StoreMutation, ctx: &MutationContext) -> bool {
        let Some(applied) = store::apply(&self.items, &self.selection, mutation, ctx) else {
            return false;
        };
        self.items = applied.items;
        self.selection = applied.selection;
        if self.history.in_batch() {
            self.history.mark_dirty();
        } else {
            self.history.push(&self.items, ctx.now);
        }
        self.notify();
        true
    }

    fn notify(&mut self) {
        self.dirty = true;
        if let Some(hook) = self.on_change.as_mut() {
            hook(&self.items);
        }
    }

    /// Replace the selection. Unknown ids are dropped. Returns true when
    /// the selection changed.
    pub fn select(&mut self, selection: Selection) -> bool {
        let mut selection = selection;
        selection.retain(|id| self.items.iter().any(|i| i.id == id));
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        true
    }

    pub fn select_all(&mut self) -> bool {
        self.select(self.items.iter().map(|i| i.id).collect())
    }

    pub fn deselect(&mut self) -> bool {
        self.select(Selection::new())
    }

    /// Step back in history. Ignored while a gesture is in flight.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.items = snapshot.items.clone();
        self.restore_selection();
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.items = snapshot.items.clone();
        self.restore_selection();
        self.notify();
        true
    }

    fn restore_selection(&mut self) {
        let items = &self.items;
        self.selection.retain(|id| items.iter().any(|i| i.id == id));
    }

    fn selected_ids(&self) -> Vec<ItemId> {
        self.selection.ids().to_vec()
    }

    pub fn add_template(&mut self, template: Template, position: Position) -> Option<ItemId> {
        let added = self.apply(StoreMutation::Add {
            template: Box::new(template),
            position,
        });
        added.then(|| self.selection.only()).flatten()
    }

    pub fn delete_selected(&mut self) -> bool {
        let ids = self.selected_ids();
        self.apply(StoreMutation::Delete { ids })
    }

    pub fn duplicate_selected(&mut self) -> bool {
        let ids = self.selected_ids();
        self.apply(StoreMutation::Duplicate { ids })
    }

    pub fn bring_to_front(&mut self) -> bool {
        let ids = self.selected_ids();
        self.apply(StoreMutation::BringToFront { ids })
    }

    pub fn send_to_back(&mut self) -> bool {
        let ids = self.selected_ids();
        self.apply(StoreMutation::SendToBack { ids })
    }

    /// Offset the selection by an exact amount (no snapping).
    pub fn nudge(&mut self, dx: f32, dy: f32) -> bool {
        let ids = self.selected_ids();
        self.apply_exact(StoreMutation::Translate { ids, dx, dy })
    }

    pub fn copy(&mut self) -> bool {
        let copied: Vec<PlacedItem> = self
            .items
            .iter()
            .filter(|i| self.selection.contains(i.id))
            .cloned()
            .collect();
        if copied.is_empty() {
            return false;
        }
        log::debug!("copied {} items", copied.len());
        self.clipboard = copied;
        true
    }

    pub fn cut(&mut self) -> bool {
        self.copy() && self.delete_selected()
    }

    pub fn paste(&mut self) -> bool {
        let items = self.clipboard.clone();
        self.apply(StoreMutation::Paste { items })
    }

    /// Hand the current list to the save hook. False when none is set.
    pub fn save(&mut self) -> bool {
        match self.on_save.as_mut() {
            Some(hook) => {
                hook(&self.items);
                true
            }
            None => false,
        }
    }

    /// Move the single selection to the next (or previous) visible item in
    /// paint order, wrapping around.
    pub fn cycle_selection(&mut self, forward: bool) -> bool {
        let order: Vec<ItemId> = paint_order(&self.items).iter().map(|i| i.id).collect();
        if order.is_empty() {
            return false;
        }
        let current = self
            .selection
            .only()
            .and_then(|id| order.iter().position(|o| *o == id));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
            (None, true) => 0,
            (None, false) => order.len() - 1,
        };
        self.select(Selection::single(order[next]))
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer pressed at canvas coordinates. Returns true when items or
    /// selection changed.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        if !finite_point(x, y) {
            return false;
        }
        self.cancel_gesture();
        let hit = self.hit_target(Point::new(x as f64, y as f64));
        let events = self.tool.handle(
            &InputEvent::down(x, y, modifiers),
            hit,
            &self.items,
            &self.selection,
            &self.config.grid,
        );
        if self.tool.state() != GestureState::Idle {
            self.history.begin_batch();
        }
        self.apply_canvas_events(events)
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        if !self.tool.is_active() || !finite_point(x, y) {
            return false;
        }
        let events = self.tool.handle(
            &InputEvent::moved(x, y, modifiers),
            HitTarget::None,
            &self.items,
            &self.selection,
            &self.config.grid,
        );
        if !events.is_empty() {
            log::trace!("gesture step: {} events", events.len());
        }
        self.apply_canvas_events(events)
    }

    /// A release at a non-finite point aborts the gesture.
    pub fn handle_pointer_up(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        if !self.tool.is_active() {
            return false;
        }
        if !finite_point(x, y) {
            return self.cancel_gesture();
        }
        let events = self.tool.handle(
            &InputEvent::up(x, y, modifiers),
            HitTarget::None,
            &self.items,
            &self.selection,
            &self.config.grid,
        );
        let changed = self.apply_canvas_events(events);
        self.finish_batch();
        changed
    }

    /// Abort an in-flight gesture, restoring what it moved.
    pub fn cancel_gesture(&mut self) -> bool {
        if !self.tool.is_active() {
            return false;
        }
        let events = self.tool.handle(
            &InputEvent::Cancel,
            HitTarget::None,
            &self.items,
            &self.selection,
            &self.config.grid,
        );
        let changed = self.apply_canvas_events(events);
        self.finish_batch();
        changed
    }

    fn finish_batch(&mut self) {
        if self.history.in_batch() {
            let now = self.clock.now_ms();
            if self.history.end_batch(&self.items, now) {
                log::debug!("gesture recorded ({} snapshots)", self.history.len());
            }
        }
    }

    /// Handles only exist on a single unlocked selection, outside Select
    /// mode; they take priority over the items under them.
    fn hit_target(&self, point: Point) -> HitTarget {
        if self.tool.mode.shows_handles()
            && let Some(id) = self.selection.only()
            && let Some(item) = store::find(&self.items, id)
            && item.visible
            && !item.locked
            && let Some(handle) = hit_test_handle(item, point, self.scale())
        {
            return HitTarget::Handle(id, handle);
        }
        match hit_test(&self.items, point) {
            Some(id) => HitTarget::Item(id),
            None => HitTarget::None,
        }
    }

    fn apply_canvas_events(&mut self, events: Vec<CanvasEvent>) -> bool {
        let mut changed = false;
        for event in events {
            changed |= match event {
                CanvasEvent::SelectionChanged(selection) => self.select(selection),
                CanvasEvent::ItemMoved { id, position } => {
                    self.apply_exact(StoreMutation::Move { id, position })
                }
                CanvasEvent::ItemResized { id, size } => {
                    self.apply_exact(StoreMutation::Resize { id, size })
                }
                CanvasEvent::ItemBoundsChanged { id, position, size } => {
                    self.apply_exact(StoreMutation::SetBounds { id, position, size })
                }
            };
        }
        changed
    }

    // ─── Drop ────────────────────────────────────────────────────────────

    /// Drop library drag data at a client-space point. Returns the new
    /// item's id.
    pub fn handle_drop(
        &mut self,
        payload: &str,
        client: (f32, f32),
        canvas_origin: (f32, f32),
    ) -> Result<ItemId, String> {
        let DropPayload { template } = DropPayload::parse(payload)?;
        let position = client_to_canvas(client, canvas_origin, self.config.view.zoom)
            .ok_or_else(|| "drop point is not finite".to_string())?;
        self.add_template(template, position)
            .ok_or_else(|| "drop produced no item".to_string())
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, event: &KeyEvent, focus: FocusContext) -> KeyOutcome {
        let Some(action) = self.shortcuts.resolve(event, focus) else {
            return KeyOutcome {
                action: None,
                handled: false,
            };
        };
        let handled = self.can_run(action);
        if handled {
            self.run(action);
        }
        KeyOutcome {
            action: Some(action),
            handled,
        }
    }

    /// Whether `action` is available right now. Unavailable actions leave
    /// the key to the host.
    pub fn can_run(&self, action: ShortcutAction) -> bool {
        let has_selection = !self.selection.is_empty();
        match action {
            ShortcutAction::Undo => self.can_undo(),
            ShortcutAction::Redo => self.can_redo(),
            ShortcutAction::Delete
            | ShortcutAction::Duplicate
            | ShortcutAction::Copy
            | ShortcutAction::Cut
            | ShortcutAction::Nudge(..)
            | ShortcutAction::BringToFront
            | ShortcutAction::SendToBack => has_selection,
            ShortcutAction::Paste => !self.clipboard.is_empty(),
            ShortcutAction::Save => self.on_save.is_some(),
            ShortcutAction::Tab | ShortcutAction::ShiftTab => !self.items.is_empty(),
            ShortcutAction::SelectAll
            | ShortcutAction::Deselect
            | ShortcutAction::ZoomIn
            | ShortcutAction::ZoomOut => true,
            // Confirming a field edit belongs to the host.
            ShortcutAction::Enter => false,
        }
    }

    /// Perform `action`. Returns true when anything changed.
    pub fn run(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Duplicate => self.duplicate_selected(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Deselect => self.cancel_gesture() || self.deselect(),
            ShortcutAction::Copy => self.copy(),
            ShortcutAction::Cut => self.cut(),
            ShortcutAction::Paste => self.paste(),
            ShortcutAction::Save => self.save(),
            ShortcutAction::Enter => false,
            ShortcutAction::Tab => self.cycle_selection(true),
            ShortcutAction::ShiftTab => self.cycle_selection(false),
            ShortcutAction::Nudge(direction, large) => {
                let step = if large {
                    self.config.grid.size
                } else {
                    self.config.nudge_step
                };
                let (dx, dy) = direction.delta(step);
                self.nudge(dx, dy)
            }
            ShortcutAction::BringToFront => self.bring_to_front(),
            ShortcutAction::SendToBack => self.send_to_back(),
            ShortcutAction::ZoomIn => self.toolbar(ToolbarCommand::ZoomIn),
            ShortcutAction::ZoomOut => self.toolbar(ToolbarCommand::ZoomOut),
        }
    }

    // ─── Toolbar & panels ────────────────────────────────────────────────

    /// Run a toolbar command. Returns true when items, selection or
    /// settings changed.
    pub fn toolbar(&mut self, command: ToolbarCommand) -> bool {
        let before = (self.config, self.tool.mode);
        match command {
            ToolbarCommand::Undo => return self.undo(),
            ToolbarCommand::Redo => return self.redo(),
            ToolbarCommand::SelectAll => return self.select_all(),
            ToolbarCommand::DeselectAll => return self.deselect(),
            ToolbarCommand::Delete => return self.delete_selected(),
            ToolbarCommand::Duplicate => return self.duplicate_selected(),
            ToolbarCommand::BringToFront => return self.bring_to_front(),
            ToolbarCommand::SendToBack => return self.send_to_back(),
            ToolbarCommand::SetDragMode(mode) => {
                if mode != self.tool.mode {
                    self.cancel_gesture();
                    self.tool.set_mode(mode);
                }
            }
            ToolbarCommand::ToggleGrid => self.config.grid.enabled = !self.config.grid.enabled,
            ToolbarCommand::ToggleSnap => self.config.grid.snap = !self.config.grid.snap,
            ToolbarCommand::SetGridSize(size) => self.config.grid.set_size(size),
            ToolbarCommand::ZoomIn => self.config.view.zoom_in(),
            ToolbarCommand::ZoomOut => self.config.view.zoom_out(),
            ToolbarCommand::SetZoom(zoom) => self.config.view.set_zoom(zoom),
            ToolbarCommand::ToggleRulers => {
                self.config.view.show_rulers = !self.config.view.show_rulers
            }
            ToolbarCommand::ToggleGuides => {
                self.config.view.show_guides = !self.config.view.show_guides
            }
        }
        (self.config, self.tool.mode) != before
    }

    pub fn layer_action(&mut self, action: LayerAction) -> bool {
        match action {
            LayerAction::Select { id, additive } => {
                let mut next = if additive {
                    self.selection.clone()
                } else {
                    Selection::new()
                };
                if additive {
                    next.toggle(id);
                } else {
                    next.insert(id);
                }
                self.select(next)
            }
            LayerAction::ToggleLock(id) => self.apply(StoreMutation::ToggleLock { id }),
            LayerAction::ToggleVisibility(id) => {
                self.apply(StoreMutation::ToggleVisibility { id })
            }
            LayerAction::Delete(id) => self.apply(StoreMutation::Delete { ids: vec![id] }),
            LayerAction::Duplicate(id) => self.apply(StoreMutation::Duplicate { ids: vec![id] }),
            LayerAction::Move(id, direction) => self.apply(StoreMutation::Reorder { id, direction }),
        }
    }

    /// Apply a properties-panel edit to the selection.
    pub fn edit_property(&mut self, edit: PropertyEdit) -> Result<bool, String> {
        let ids = self.selected_ids();
        match ids.as_slice() {
            [] => Err("No item selected".to_string()),
            [id] => {
                let id = *id;
                let item = self
                    .item(id)
                    .ok_or_else(|| format!("Selected item {id} not found"))?;
                let patch = edit.patch_for(item);
                Ok(self.apply(StoreMutation::Update {
                    id,
                    patch: Box::new(patch),
                }))
            }
            _ => {
                let patch = edit
                    .batch_patch()
                    .ok_or_else(|| format!("{edit:?} cannot be applied to {} items", ids.len()))?;
                Ok(self.apply(StoreMutation::BatchUpdate {
                    ids,
                    patch: Box::new(patch),
                }))
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn finite_point(x: f32, y: f32) -> bool {
    let finite = x.is_finite() && y.is_finite();
    if !finite {
        log::warn!("pointer sample ignored: ({x}, {y})");
    }
    finite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::NudgeDirection;
    use pb_core::catalog;
    use pb_core::clock::StepClock;
    use pb_core::model::Size;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        Editor::with_clock(EditorConfig::default(), Box::new(StepClock::new(1000, 1)))
    }

    fn add(editor: &mut Editor, template: &str, x: f32, y: f32) -> ItemId {
        let template = catalog::find(template).unwrap().clone();
        editor.add_template(template, Position::new(x, y)).unwrap()
    }

    #[test]
    fn apply_pushes_history_and_notifies() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ed.set_on_change(Box::new(move |items: &[PlacedItem]| sink.borrow_mut().push(items.len())));

        add(&mut ed, "heading", 0.0, 0.0);
        add(&mut ed, "paragraph", 0.0, 100.0);
        assert_eq!(ed.history().len(), 3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(ed.take_dirty());
        assert!(!ed.take_dirty());
    }

    #[test]
    fn noop_mutation_skips_history() {
        let mut ed = editor();
        let id = add(&mut ed, "heading", 0.0, 0.0);
        let len = ed.history().len();
        assert!(!ed.apply(StoreMutation::Move {
            id,
            position: Position::new(0.0, 0.0),
        }));
        assert_eq!(ed.history().len(), len);
    }

    #[test]
    fn undo_redo_restore_snapshots() {
        let mut ed = editor();
        let id = add(&mut ed, "heading", 0.0, 0.0);
        assert!(ed.undo());
        assert!(ed.items().is_empty());
        assert!(ed.selection().is_empty());
        assert!(ed.redo());
        assert_eq!(ed.items()[0].id, id);
        assert!(!ed.redo());
    }

    #[test]
    fn drag_gesture_is_one_history_step() {
        let mut ed = editor();
        ed.toolbar(ToolbarCommand::SetDragMode(DragMode::Move));
        let id = add(&mut ed, "heading", 0.0, 0.0);
        let before = ed.history().len();

        ed.handle_pointer_down(10.0, 10.0, Modifiers::NONE);
        assert_eq!(ed.gesture(), GestureState::Dragging);
        for x in [20.0, 40.0, 60.0, 80.0] {
            ed.handle_pointer_move(x, 10.0, Modifiers::NONE);
        }
        ed.handle_pointer_up(80.0, 10.0, Modifiers::NONE);

        assert_eq!(ed.item(id).unwrap().position, Position::new(80.0, 0.0));
        assert_eq!(ed.history().len(), before + 1);
        assert!(ed.undo());
        assert_eq!(ed.item(id).unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn cancelled_drag_leaves_no_history() {
        let mut ed = editor();
        ed.toolbar(ToolbarCommand::SetDragMode(DragMode::Move));
        let id = add(&mut ed, "heading", 0.0, 0.0);
        let before = ed.history().len();

        ed.handle_pointer_down(10.0, 10.0, Modifiers::NONE);
        ed.handle_pointer_move(200.0, 10.0, Modifiers::NONE);
        assert_eq!(ed.item(id).unwrap().position, Position::new(200.0, 0.0));
        let outcome = ed.handle_key(&KeyEvent::new("Escape"), FocusContext::Canvas);
        assert!(outcome.handled);
        assert_eq!(ed.item(id).unwrap().position, Position::new(0.0, 0.0));
        assert_eq!(ed.history().len(), before);
        assert_eq!(ed.gesture(), GestureState::Idle);
    }

    #[test]
    fn resize_gesture_through_handle() {
        let mut ed = editor();
        ed.toolbar(ToolbarCommand::SetDragMode(DragMode::Resize));
        let id = add(&mut ed, "image", 100.0, 100.0);
        let size = ed.item(id).unwrap().size;

        // South-east corner handle.
        let (cx, cy) = (100.0 + size.width, 100.0 + size.height);
        ed.handle_pointer_down(cx, cy, Modifiers::NONE);
        assert_eq!(ed.gesture(), GestureState::Resizing);
        ed.handle_pointer_move(cx + 40.0, cy - 10_000.0, Modifiers::NONE);
        ed.handle_pointer_up(cx + 40.0, cy - 10_000.0, Modifiers::NONE);

        let item = ed.item(id).unwrap();
        assert_eq!(item.size, Size::new(size.width + 40.0, 50.0));
        assert_eq!(item.position, Position::new(100.0, 100.0));
    }

    #[test]
    fn keyboard_capability_gating() {
        let mut ed = editor();
        let undo = KeyEvent::new("z").ctrl();
        let outcome = ed.handle_key(&undo, FocusContext::Canvas);
        assert_eq!(outcome.action, Some(ShortcutAction::Undo));
        assert!(!outcome.handled, "nothing to undo");

        assert!(!ed.handle_key(&KeyEvent::new("Delete"), FocusContext::Canvas).handled);
        assert!(!ed.handle_key(&KeyEvent::new("s").meta(), FocusContext::Canvas).handled);

        add(&mut ed, "heading", 0.0, 0.0);
        assert!(ed.handle_key(&undo, FocusContext::Canvas).handled);
        assert!(ed.items().is_empty());
    }

    #[test]
    fn text_input_focus_blocks_editing_keys() {
        let mut ed = editor();
        add(&mut ed, "heading", 0.0, 0.0);
        let outcome = ed.handle_key(&KeyEvent::new("Delete"), FocusContext::TextInput);
        assert_eq!(outcome.action, None);
        assert_eq!(ed.items().len(), 1);
    }

    #[test]
    fn save_calls_hook() {
        let mut ed = editor();
        add(&mut ed, "heading", 0.0, 0.0);
        let saved = Rc::new(RefCell::new(0));
        let sink = saved.clone();
        ed.set_on_save(Box::new(move |items: &[PlacedItem]| *sink.borrow_mut() = items.len()));
        assert!(ed.handle_key(&KeyEvent::new("s").ctrl(), FocusContext::Canvas).handled);
        assert_eq!(*saved.borrow(), 1);
    }

    #[test]
    fn copy_paste_and_cut() {
        let mut ed = editor();
        let id = add(&mut ed, "heading", 40.0, 40.0);
        assert!(ed.run(ShortcutAction::Copy));
        assert!(ed.run(ShortcutAction::Paste));
        assert_eq!(ed.items().len(), 2);
        let pasted = ed.selection().only().unwrap();
        assert_ne!(pasted, id);
        assert_eq!(ed.item(pasted).unwrap().position, Position::new(60.0, 60.0));

        assert!(ed.run(ShortcutAction::Cut));
        assert_eq!(ed.items().len(), 1);
        assert_eq!(ed.clipboard()[0].id, pasted);
    }

    #[test]
    fn nudge_by_pixel_and_grid_step() {
        let mut ed = editor();
        let id = add(&mut ed, "heading", 40.0, 40.0);
        ed.run(ShortcutAction::Nudge(NudgeDirection::Right, false));
        assert_eq!(ed.item(id).unwrap().position, Position::new(41.0, 40.0));
        ed.run(ShortcutAction::Nudge(NudgeDirection::Up, true));
        assert_eq!(ed.item(id).unwrap().position, Position::new(41.0, 20.0));
    }

    #[test]
    fn tab_cycles_through_paint_order() {
        let mut ed = editor();
        let a = add(&mut ed, "heading", 0.0, 0.0);
        let b = add(&mut ed, "paragraph", 0.0, 100.0);
        ed.deselect();
        ed.run(ShortcutAction::Tab);
        assert_eq!(ed.selection().only(), Some(a));
        ed.run(ShortcutAction::Tab);
        assert_eq!(ed.selection().only(), Some(b));
        ed.run(ShortcutAction::Tab);
        assert_eq!(ed.selection().only(), Some(a));
        ed.run(ShortcutAction::ShiftTab);
        assert_eq!(ed.selection().only(), Some(b));
    }

    #[test]
    fn drop_adds_snapped_item() {
        let mut ed = editor();
        ed.toolbar(ToolbarCommand::SetZoom(200));
        let payload = serde_json::to_string(catalog::find("image").unwrap()).unwrap();
        let id = ed.handle_drop(&payload, (321.0, 221.0), (100.0, 0.0)).unwrap();
        // (221 / 2, 221 / 2) = (110.5, 110.5) → snapped to (120, 120)
        assert_eq!(ed.item(id).unwrap().position, Position::new(120.0, 120.0));

        let len = ed.history().len();
        assert!(ed.handle_drop("{broken", (0.0, 0.0), (0.0, 0.0)).is_err());
        assert_eq!(ed.history().len(), len);
    }

    #[test]
    fn toolbar_settings_do_not_touch_history() {
        let mut ed = editor();
        assert!(ed.toolbar(ToolbarCommand::ToggleSnap));
        assert!(!ed.config().grid.snap);
        assert!(ed.toolbar(ToolbarCommand::SetGridSize(500.0)));
        assert_eq!(ed.config().grid.size, 100.0);
        assert!(ed.toolbar(ToolbarCommand::SetZoom(1000)));
        assert_eq!(ed.config().view.zoom, 400);
        assert_eq!(ed.history().len(), 1);
        assert!(!ed.toolbar_state().can_undo);
    }

    #[test]
    fn property_edits_route_by_selection() {
        let mut ed = editor();
        assert!(ed.edit_property(PropertyEdit::Visible(false)).is_err());

        let a = add(&mut ed, "heading", 0.0, 0.0);
        assert_eq!(ed.edit_property(PropertyEdit::Width(20.0)), Ok(true));
        assert_eq!(ed.item(a).unwrap().size.width, 50.0);

        let b = add(&mut ed, "paragraph", 0.0, 100.0);
        ed.select(Selection::from_ids([a, b]));
        assert_eq!(ed.edit_property(PropertyEdit::Locked(true)), Ok(true));
        assert!(ed.items().iter().all(|i| i.locked));
        assert!(ed.edit_property(PropertyEdit::X(5.0)).is_err());
    }

    #[test]
    fn layer_actions() {
        let mut ed = editor();
        let a = add(&mut ed, "heading", 0.0, 0.0);
        let b = add(&mut ed, "paragraph", 0.0, 100.0);
        assert!(ed.layer_action(LayerAction::Select { id: a, additive: true }));
        assert_eq!(ed.selection().len(), 2);
        assert!(ed.layer_action(LayerAction::Move(a, crate::store::ZDirection::Up)));
        assert!(ed.item(a).unwrap().z_index > ed.item(b).unwrap().z_index);
        assert!(ed.layer_action(LayerAction::ToggleVisibility(b)));
        assert!(!ed.item(b).unwrap().visible);
    }

    #[test]
    fn load_resets_history() {
        let mut ed = editor();
        add(&mut ed, "heading", 0.0, 0.0);
        add(&mut ed, "heading", 0.0, 0.0);
        let doc = ed.document();
        ed.load(Document::new());
        assert!(ed.items().is_empty());
        assert_eq!(ed.history().len(), 1);
        assert!(!ed.can_undo());
        ed.load(doc);
        assert_eq!(ed.items().len(), 2);
        assert!(!ed.take_dirty());
    }

    #[test]
    fn out_of_range_property_edit_keeps_document_loadable() {
        let mut ed = editor();
        add(&mut ed, "heading", 40.0, 40.0);
        assert!(PropertyEdit::from_field("x", serde_json::json!(1e300)).is_err());
        assert_eq!(ed.edit_property(PropertyEdit::X(f32::INFINITY)), Ok(false));
        let json = ed.document().to_json();
        assert!(Document::from_json(&json).is_ok());
        assert_eq!(ed.items()[0].position, Position::new(40.0, 40.0));
    }

    #[test]
    fn non_finite_pointer_samples_are_ignored() {
        let mut ed = editor();
        ed.toolbar(ToolbarCommand::SetDragMode(DragMode::Move));
        let id = add(&mut ed, "heading", 40.0, 40.0);
        let before = ed.history().len();
        assert!(!ed.handle_pointer_down(f32::NAN, 50.0, Modifiers::NONE));
        assert_eq!(ed.gesture(), GestureState::Idle);

        ed.handle_pointer_down(50.0, 50.0, Modifiers::NONE);
        assert_eq!(ed.gesture(), GestureState::Dragging);
        assert!(!ed.handle_pointer_move(f32::INFINITY, 50.0, Modifiers::NONE));
        ed.handle_pointer_move(130.0, 50.0, Modifiers::NONE);
        assert_eq!(ed.item(id).unwrap().position, Position::new(120.0, 40.0));

        // A release at a non-finite point aborts the drag.
        ed.handle_pointer_up(50.0, f32::NEG_INFINITY, Modifiers::NONE);
        assert_eq!(ed.gesture(), GestureState::Idle);
        assert_eq!(ed.item(id).unwrap().position, Position::new(40.0, 40.0));
        assert_eq!(ed.history().len(), before);
    }

    #[test]
    fn load_keeps_configured_history_depth() {
        let config = EditorConfig {
            history_depth: 3,
            ..EditorConfig::default()
        };
        let mut ed = Editor::with_clock(config, Box::new(StepClock::new(1000, 1)));
        for _ in 0..5 {
            add(&mut ed, "heading", 0.0, 0.0);
        }
        ed.load(Document::new());
        assert_eq!(ed.history_info().max_size, 3);
        assert_eq!(ed.history().len(), 1);
        add(&mut ed, "heading", 0.0, 0.0);
        assert!(ed.can_undo());
    }

    #[test]
    fn replace_with_duplicate_ids_is_rejected() {
        let mut ed = editor();
        let kept = add(&mut ed, "heading", 0.0, 0.0);
        let twin = PlacedItem::new(ItemId::intern("ed_twin"), pb_core::model::ItemKind::Text);
        let accepted = ed.apply(StoreMutation::Replace {
            items: vec![twin.clone(), twin],
        });
        assert!(!accepted);
        assert_eq!(ed.items().len(), 1);
        assert_eq!(ed.items()[0].id, kept);
        assert!(!ed.can_redo());
    }
}

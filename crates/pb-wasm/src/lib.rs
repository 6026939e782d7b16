//! WASM bridge for PB: exposes the page-builder editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the admin page.
//! Every query returns a JSON string; the host owns rendering and storage.

mod logger;

use pb_core::catalog;
use pb_core::clock::Clock;
use pb_core::config::EditorConfig;
use pb_core::document::Document;
use pb_core::id::ItemId;
use pb_core::lint::{LintDiagnostic, lint_items};
use pb_editor::drop::{DROP_MIME, client_to_canvas, drag_over_effect};
use pb_editor::editor::Editor;
use pb_editor::input::Modifiers;
use pb_editor::panels::{LayerAction, PropertyEdit};
use pb_editor::shortcuts::{FocusContext, KeyEvent, NudgeDirection, ShortcutAction};
use pb_editor::store::StoreMutation;
use pb_editor::toolbar::ToolbarCommand;
use pb_editor::tools::GestureState;
use pb_render::paint::grid_lines;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
///
/// Wraps an `Editor` and translates between client-space browser events
/// and canvas space. All interaction from the admin page goes through this
/// struct.
#[wasm_bindgen]
pub struct PbCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl PbCanvas {
    /// Create an editor from a (possibly empty or partial) config JSON.
    /// A config that does not parse falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();
        install_logger("warn");

        let config = EditorConfig::from_json(config_json).unwrap_or_else(|e| {
            log::warn!("{e}; using default config");
            EditorConfig::default()
        });
        Self {
            editor: Editor::with_clock(config, host_clock()),
        }
    }

    /// Change the console log level (`off`, `error`, `warn`, `info`,
    /// `debug`, `trace`). Returns false for an unknown name.
    pub fn set_log_level(&mut self, level: &str) -> bool {
        install_logger(level)
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the item list. Accepts a bare array or `{"items":[...]}`.
    /// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn load_json(&mut self, json: &str) -> String {
        match Document::from_json(json) {
            Ok(doc) => {
                self.editor.load(doc);
                json!({ "ok": true }).to_string()
            }
            Err(e) => {
                log::warn!("load rejected: {e}");
                json!({ "ok": false, "error": e }).to_string()
            }
        }
    }

    /// Replace the item list as one undoable step (external edits arriving
    /// while the editor is open). Returns true when anything changed.
    pub fn replace_json(&mut self, json: &str) -> bool {
        match Document::from_json(json) {
            Ok(doc) => self.editor.apply(StoreMutation::Replace { items: doc.into_items() }),
            Err(e) => {
                log::warn!("replace rejected: {e}");
                false
            }
        }
    }

    /// Current item list as a JSON array.
    pub fn get_items_json(&self) -> String {
        self.editor.document().to_json()
    }

    /// Whether items changed since the last call. Poll after each event
    /// and forward `get_items_json()` to the host's `onChange`.
    pub fn take_dirty(&mut self) -> bool {
        self.editor.take_dirty()
    }

    /// Call `callback(itemsJson)` after every accepted change.
    pub fn set_on_change(&mut self, callback: js_sys::Function) {
        self.editor
            .set_on_change(Box::new(move |items: &[pb_core::model::PlacedItem]| {
                call_with_items(&callback, items)
            }));
    }

    /// Call `callback(itemsJson)` on Ctrl/Cmd+S.
    pub fn set_on_save(&mut self, callback: js_sys::Function) {
        self.editor
            .set_on_save(Box::new(move |items: &[pb_core::model::PlacedItem]| {
                call_with_items(&callback, items)
            }));
    }

    pub fn save(&mut self) -> bool {
        self.editor.save()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer pressed at client coordinates. `origin_x/y` is the canvas
    /// element's client-space top-left. Returns `{"changed":bool}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        client_x: f32,
        client_y: f32,
        origin_x: f32,
        origin_y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some((x, y)) = self.to_canvas(client_x, client_y, origin_x, origin_y) else {
            return self.pointer_result(false);
        };
        let changed =
            self.editor
                .handle_pointer_down(x, y, Modifiers::new(shift, ctrl, alt, meta));
        self.pointer_result(changed)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        client_x: f32,
        client_y: f32,
        origin_x: f32,
        origin_y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some((x, y)) = self.to_canvas(client_x, client_y, origin_x, origin_y) else {
            return self.pointer_result(false);
        };
        let changed =
            self.editor
                .handle_pointer_move(x, y, Modifiers::new(shift, ctrl, alt, meta));
        self.pointer_result(changed)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        client_x: f32,
        client_y: f32,
        origin_x: f32,
        origin_y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some((x, y)) = self.to_canvas(client_x, client_y, origin_x, origin_y) else {
            return self.pointer_result(false);
        };
        let changed = self
            .editor
            .handle_pointer_up(x, y, Modifiers::new(shift, ctrl, alt, meta));
        self.pointer_result(changed)
    }

    /// Abort the current drag or resize (pointer capture lost).
    pub fn cancel_gesture(&mut self) -> bool {
        self.editor.cancel_gesture()
    }

    // ─── Drop ────────────────────────────────────────────────────────────

    /// Drop library drag data at a client-space point. Returns
    /// `{"ok":true,"id":"..."}` or `{"ok":false,"error":"..."}`.
    pub fn handle_drop(
        &mut self,
        payload: &str,
        client_x: f32,
        client_y: f32,
        origin_x: f32,
        origin_y: f32,
    ) -> String {
        match self
            .editor
            .handle_drop(payload, (client_x, client_y), (origin_x, origin_y))
        {
            Ok(id) => json!({ "ok": true, "id": id.as_str() }).to_string(),
            Err(e) => json!({ "ok": false, "error": e }).to_string(),
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a keydown. Returns `{"handled":bool,"action":"<name>"|null}`;
    /// the host calls `preventDefault` when `handled` is true.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_text_input: bool,
    ) -> String {
        let event = KeyEvent::with_modifiers(key, ctrl, shift, alt, meta);
        let focus = if in_text_input {
            FocusContext::TextInput
        } else {
            FocusContext::Canvas
        };
        let outcome = self.editor.handle_key(&event, focus);
        json!({
            "handled": outcome.handled,
            "action": outcome.action.map(action_to_name),
        })
        .to_string()
    }

    // ─── Toolbar & panels ────────────────────────────────────────────────

    /// Run a toolbar command by name (`undo`, `setDragMode`, `setZoom`,
    /// ...). `value` carries the argument of parameterised commands.
    /// Returns `{"ok":true,"changed":bool}` or `{"ok":false,"error":"..."}`.
    pub fn toolbar_command(&mut self, name: &str, value: &str) -> String {
        match ToolbarCommand::from_name(name, value) {
            Ok(command) => {
                let changed = self.editor.toolbar(command);
                json!({ "ok": true, "changed": changed }).to_string()
            }
            Err(e) => json!({ "ok": false, "error": e }).to_string(),
        }
    }

    /// Apply a layers-panel action (`select`, `toggleLock`, `moveUp`, ...)
    /// to `id`. Returns true when anything changed.
    pub fn layer_action(&mut self, name: &str, id: &str, additive: bool) -> bool {
        match LayerAction::from_name(name, ItemId::intern(id), additive) {
            Some(action) => self.editor.layer_action(action),
            None => {
                log::warn!("unknown layer action: {name}");
                false
            }
        }
    }

    /// Apply a properties-panel edit. `value_json` is any JSON value.
    /// Returns `{"ok":true,"changed":bool}` or `{"ok":false,"error":"..."}`.
    pub fn edit_property(&mut self, field: &str, value_json: &str) -> String {
        let result = serde_json::from_str::<Value>(value_json)
            .map_err(|e| format!("Invalid value for {field}: {e}"))
            .and_then(|value| PropertyEdit::from_field(field, value))
            .and_then(|edit| self.editor.edit_property(edit));
        match result {
            Ok(changed) => json!({ "ok": true, "changed": changed }).to_string(),
            Err(e) => json!({ "ok": false, "error": e }).to_string(),
        }
    }

    /// Replace the selection with the ids in a JSON array.
    pub fn select_ids(&mut self, ids_json: &str) -> bool {
        match serde_json::from_str::<Vec<ItemId>>(ids_json) {
            Ok(ids) => self.editor.select(ids.into_iter().collect()),
            Err(e) => {
                log::warn!("select ignored: {e}");
                false
            }
        }
    }

    pub fn get_layers_json(&self) -> String {
        to_json(&self.editor.layers())
    }

    pub fn get_properties_json(&self) -> String {
        to_json(&self.editor.properties())
    }

    pub fn get_toolbar_json(&self) -> String {
        to_json(&self.editor.toolbar_state())
    }

    /// Ids of the current selection as a JSON array.
    pub fn get_selection_json(&self) -> String {
        to_json(&self.editor.selection().ids())
    }

    /// Everything the host needs to draw one frame: items in paint order
    /// with handles, the marquee rect and grid line offsets.
    pub fn get_display_json(&self) -> String {
        let items: Vec<Value> = self
            .editor
            .display_list()
            .iter()
            .map(|d| {
                json!({
                    "id": d.id.as_str(),
                    "type": d.kind.as_str(),
                    "rect": rect_json(d.rect),
                    "zIndex": d.z_index,
                    "strategy": d.strategy.as_str(),
                    "selected": d.selected,
                    "locked": d.locked,
                    "handles": d
                        .handles
                        .iter()
                        .map(|(h, r)| json!({ "handle": h.as_str(), "rect": rect_json(*r) }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let config = self.editor.config();
        let (xs, ys) = grid_lines(config.view.canvas_size, &config.grid);
        json!({
            "items": items,
            "marquee": self.editor.marquee().map(rect_json),
            "grid": { "x": xs, "y": ys },
            "gesture": gesture_name(self.editor.gesture()),
        })
        .to_string()
    }

    /// Lint the current item list. Returns a JSON array of diagnostics.
    pub fn lint_json(&self) -> String {
        diagnostics_json(&self.editor.lint())
    }
}

impl PbCanvas {
    fn to_canvas(
        &self,
        client_x: f32,
        client_y: f32,
        origin_x: f32,
        origin_y: f32,
    ) -> Option<(f32, f32)> {
        let p = client_to_canvas(
            (client_x, client_y),
            (origin_x, origin_y),
            self.editor.config().view.zoom,
        )?;
        Some((p.x, p.y))
    }

    fn pointer_result(&self, changed: bool) -> String {
        json!({
            "changed": changed,
            "gesture": gesture_name(self.editor.gesture()),
        })
        .to_string()
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// The component library, grouped by kind:
/// `[{"type":"text","templates":[...]}, ...]`.
#[wasm_bindgen]
pub fn catalog_json() -> String {
    let groups: Vec<Value> = catalog::grouped_by_kind()
        .into_iter()
        .map(|(kind, templates)| json!({ "type": kind.as_str(), "templates": templates }))
        .collect();
    to_json(&groups)
}

/// Drag data for a catalog template, or an empty string if unknown.
#[wasm_bindgen]
pub fn template_payload(template_id: &str) -> String {
    catalog::find(template_id).map(to_json).unwrap_or_default()
}

/// MIME type to use with `dataTransfer.setData` / `getData`.
#[wasm_bindgen]
pub fn drop_mime() -> String {
    DROP_MIME.to_string()
}

/// `dropEffect` to set during `dragover`.
#[wasm_bindgen]
pub fn drop_effect() -> String {
    drag_over_effect().as_str().to_string()
}

/// Validate an item list without loading it. Returns
/// `{"ok":true,"diagnostics":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str, canvas_width: f32, canvas_height: f32) -> String {
    match Document::from_json(json) {
        Ok(doc) => {
            let canvas = pb_core::model::Size::new(canvas_width, canvas_height);
            let diags = lint_items(doc.items(), canvas);
            format!(r#"{{"ok":true,"diagnostics":{}}}"#, diagnostics_json(&diags))
        }
        Err(e) => json!({ "ok": false, "error": e }).to_string(),
    }
}

fn diagnostics_json(diags: &[LintDiagnostic]) -> String {
    let list: Vec<Value> = diags
        .iter()
        .map(|d| {
            json!({
                "itemId": d.item_id.as_str(),
                "message": d.message,
                "severity": d.severity.as_str(),
                "rule": d.rule,
            })
        })
        .collect();
    to_json(&list)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        "null".to_string()
    })
}

fn rect_json(r: pb_render::Rect) -> Value {
    json!({ "x": r.x0, "y": r.y0, "width": r.width(), "height": r.height() })
}

fn call_with_items(callback: &js_sys::Function, items: &[pb_core::model::PlacedItem]) {
    let json = to_json(items);
    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
        log::error!("host callback failed: {e:?}");
    }
}

fn gesture_name(state: GestureState) -> &'static str {
    match state {
        GestureState::Idle => "idle",
        GestureState::Dragging => "dragging",
        GestureState::Resizing => "resizing",
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::SelectAll => "selectAll",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Cut => "cut",
        ShortcutAction::Paste => "paste",
        ShortcutAction::Save => "save",
        ShortcutAction::Enter => "enter",
        ShortcutAction::Tab => "tab",
        ShortcutAction::ShiftTab => "shiftTab",
        ShortcutAction::Nudge(direction, large) => match (direction, large) {
            (NudgeDirection::Up, false) => "nudgeUp",
            (NudgeDirection::Down, false) => "nudgeDown",
            (NudgeDirection::Left, false) => "nudgeLeft",
            (NudgeDirection::Right, false) => "nudgeRight",
            (NudgeDirection::Up, true) => "nudgeUpLarge",
            (NudgeDirection::Down, true) => "nudgeDownLarge",
            (NudgeDirection::Left, true) => "nudgeLeftLarge",
            (NudgeDirection::Right, true) => "nudgeRightLarge",
        },
        ShortcutAction::BringToFront => "bringToFront",
        ShortcutAction::SendToBack => "sendToBack",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
    }
}

// ─── Host environment ────────────────────────────────────────────────────

/// Wall clock backed by `Date.now()`.
#[cfg(target_arch = "wasm32")]
struct JsClock;

#[cfg(target_arch = "wasm32")]
impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

#[cfg(target_arch = "wasm32")]
fn host_clock() -> Box<dyn Clock> {
    Box::new(JsClock)
}

#[cfg(not(target_arch = "wasm32"))]
fn host_clock() -> Box<dyn Clock> {
    Box::new(pb_core::clock::SystemClock)
}

fn install_logger(level: &str) -> bool {
    match logger::level_from_name(level) {
        Some(filter) => {
            logger::init(filter);
            true
        }
        None => false,
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PB WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

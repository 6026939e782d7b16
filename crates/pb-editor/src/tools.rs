//! Canvas tool: pointer gestures over placed items.
//!
//! The tool translates `InputEvent`s into `CanvasEvent`s. It never touches
//! the item list; the editor turns events into store mutations. All
//! geometry in emitted events is final (snapped and floored), so the
//! editor applies it without snapping again.
//!
//! ## Drag modes
//!
//! | Mode | Click item | Drag item | Handles |
//! |------|-----------|-----------|---------|
//! | **Select** | select | n/a | hidden |
//! | **Move** | select | move selection | shown |
//! | **Resize** | select | n/a | shown |
//!
//! Ctrl/Cmd toggles membership on click. Dragging on empty canvas draws a
//! marquee; releasing selects every visible item it touches.

use crate::input::{InputEvent, Modifiers};
use crate::selection::Selection;
use pb_core::config::GridConfig;
use pb_core::id::ItemId;
use pb_core::model::{MIN_ITEM_SIZE, PlacedItem, Position, Size};
use pb_render::{Rect, ResizeHandle, hit_test_rect};
use serde::{Deserialize, Serialize};

/// How pointer drags on items are interpreted. Toolbar controlled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    #[default]
    Select,
    Move,
    Resize,
}

impl DragMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragMode::Select => "select",
            DragMode::Move => "move",
            DragMode::Resize => "resize",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(DragMode::Select),
            "move" => Some(DragMode::Move),
            "resize" => Some(DragMode::Resize),
            _ => None,
        }
    }

    /// Resize handles are drawn (and hittable) in every mode but Select.
    pub fn shows_handles(&self) -> bool {
        !matches!(self, DragMode::Select)
    }
}

/// What lies under the pointer at pointer-down, as found by pb-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    None,
    Item(ItemId),
    Handle(ItemId, ResizeHandle),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    SelectionChanged(Selection),
    ItemMoved {
        id: ItemId,
        position: Position,
    },
    ItemResized {
        id: ItemId,
        size: Size,
    },
    /// North/west handles move the origin along with the size.
    ItemBoundsChanged {
        id: ItemId,
        position: Position,
        size: Size,
    },
}

/// Observable gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
    Resizing,
}

enum Gesture {
    Idle,
    /// Pointer is down on an item but no drag is possible (wrong mode,
    /// locked item, or it was toggled out of the selection).
    Pressed,
    Dragging {
        /// Selected unlocked items and their positions at gesture start.
        starts: Vec<(ItemId, Position)>,
    },
    Resizing {
        id: ItemId,
        handle: ResizeHandle,
        start_position: Position,
        start_size: Size,
    },
    Marquee {
        additive: bool,
        base: Selection,
    },
}

pub struct CanvasTool {
    pub mode: DragMode,
    gesture: Gesture,
    origin: (f32, f32),
    moved: bool,
    /// Plain click on an already-selected item: collapse to it on release
    /// unless the pointer moved.
    collapse_to: Option<ItemId>,
    /// Current marquee rectangle in canvas space, for the host to draw.
    pub marquee_rect: Option<Rect>,
}

impl Default for CanvasTool {
    fn default() -> Self {
        Self::new(DragMode::default())
    }
}

impl CanvasTool {
    pub fn new(mode: DragMode) -> Self {
        Self {
            mode,
            gesture: Gesture::Idle,
            origin: (0.0, 0.0),
            moved: false,
            collapse_to: None,
            marquee_rect: None,
        }
    }

    pub fn state(&self) -> GestureState {
        match self.gesture {
            Gesture::Dragging { .. } => GestureState::Dragging,
            Gesture::Resizing { .. } => GestureState::Resizing,
            _ => GestureState::Idle,
        }
    }

    /// Whether a pointer is currently down (any gesture in progress).
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Switch drag mode. An in-flight gesture is abandoned as-is.
    pub fn set_mode(&mut self, mode: DragMode) {
        self.mode = mode;
        self.reset();
    }

    fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.moved = false;
        self.collapse_to = None;
        self.marquee_rect = None;
    }

    /// Handle one input event.
    ///
    /// `hit` is only consulted on pointer-down. `items` and `selection` are
    /// the editor's live state at the time of the event.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        hit: HitTarget,
        items: &[PlacedItem],
        selection: &Selection,
        grid: &GridConfig,
    ) -> Vec<CanvasEvent> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(*x, *y, *modifiers, hit, items, selection)
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(*x, *y, items, grid),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(*x, *y, items, selection),
            InputEvent::Cancel => self.cancel(),
        }
    }

    fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        modifiers: Modifiers,
        hit: HitTarget,
        items: &[PlacedItem],
        selection: &Selection,
    ) -> Vec<CanvasEvent> {
        self.reset();
        self.origin = (x, y);
        let mut events = Vec::new();

        match hit {
            HitTarget::Handle(id, handle) => {
                if let Some(item) = find_unlocked(items, id)
                    && self.mode.shows_handles()
                {
                    log::trace!("resize {} from {}", id, handle.as_str());
                    self.gesture = Gesture::Resizing {
                        id,
                        handle,
                        start_position: item.position,
                        start_size: item.size,
                    };
                    return events;
                }
                // Stale handle hit (item locked or mode changed): treat as item.
                return self.pointer_down(x, y, modifiers, HitTarget::Item(id), items, selection);
            }

            HitTarget::Item(id) => {
                let mut next = selection.clone();
                if modifiers.cmd() {
                    next.toggle(id);
                } else if !next.contains(id) {
                    next = Selection::single(id);
                } else if selection.len() > 1 {
                    self.collapse_to = Some(id);
                }
                if next != *selection {
                    events.push(CanvasEvent::SelectionChanged(next.clone()));
                }

                let draggable = self.mode == DragMode::Move
                    && next.contains(id)
                    && find_unlocked(items, id).is_some();
                self.gesture = if draggable {
                    let starts: Vec<(ItemId, Position)> = next
                        .iter()
                        .filter_map(|sid| find_unlocked(items, *sid))
                        .map(|item| (item.id, item.position))
                        .collect();
                    log::trace!("drag {} item(s)", starts.len());
                    Gesture::Dragging { starts }
                } else {
                    Gesture::Pressed
                };
            }

            HitTarget::None => {
                let additive = modifiers.cmd();
                if !additive && !selection.is_empty() {
                    events.push(CanvasEvent::SelectionChanged(Selection::new()));
                }
                let base = if additive {
                    selection.clone()
                } else {
                    Selection::new()
                };
                self.gesture = Gesture::Marquee { additive, base };
                self.marquee_rect = Some(Rect::new(x as f64, y as f64, x as f64, y as f64));
            }
        }
        events
    }

    fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        items: &[PlacedItem],
        grid: &GridConfig,
    ) -> Vec<CanvasEvent> {
        let (ox, oy) = self.origin;
        let (dx, dy) = (x - ox, y - oy);
        if dx != 0.0 || dy != 0.0 {
            self.moved = true;
        }

        match &self.gesture {
            Gesture::Dragging { starts } => starts
                .iter()
                .filter_map(|(id, start)| {
                    let position =
                        Position::new(grid.snap(start.x + dx), grid.snap(start.y + dy));
                    let current = find_unlocked(items, *id)?;
                    (current.position != position).then_some(CanvasEvent::ItemMoved {
                        id: *id,
                        position,
                    })
                })
                .collect(),

            Gesture::Resizing {
                id,
                handle,
                start_position,
                start_size,
            } => {
                let Some(current) = find_unlocked(items, *id) else {
                    return Vec::new();
                };
                let (position, size) =
                    resize_bounds(*handle, *start_position, *start_size, dx, dy, grid);
                if position == current.position && size == current.size {
                    return Vec::new();
                }
                if handle.moves_top() || handle.moves_left() {
                    vec![CanvasEvent::ItemBoundsChanged {
                        id: *id,
                        position,
                        size,
                    }]
                } else {
                    vec![CanvasEvent::ItemResized { id: *id, size }]
                }
            }

            Gesture::Marquee { .. } => {
                self.marquee_rect = Some(Rect::new(ox as f64, oy as f64, x as f64, y as f64).abs());
                Vec::new()
            }

            Gesture::Pressed | Gesture::Idle => Vec::new(),
        }
    }

    fn pointer_up(
        &mut self,
        x: f32,
        y: f32,
        items: &[PlacedItem],
        selection: &Selection,
    ) -> Vec<CanvasEvent> {
        let mut events = Vec::new();
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);

        if let Gesture::Marquee { additive, base } = gesture {
            if self.moved {
                let (ox, oy) = self.origin;
                let rect = Rect::new(ox as f64, oy as f64, x as f64, y as f64);
                let mut next = if additive { base } else { Selection::new() };
                for id in hit_test_rect(items, rect) {
                    next.insert(id);
                }
                if next != *selection {
                    events.push(CanvasEvent::SelectionChanged(next));
                }
            }
        } else if let Some(id) = self.collapse_to
            && !self.moved
        {
            let next = Selection::single(id);
            if next != *selection {
                events.push(CanvasEvent::SelectionChanged(next));
            }
        }

        self.reset();
        events
    }

    /// Abort the gesture and put moved or resized items back.
    fn cancel(&mut self) -> Vec<CanvasEvent> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.reset();
        match gesture {
            Gesture::Dragging { starts } => starts
                .into_iter()
                .map(|(id, position)| CanvasEvent::ItemMoved { id, position })
                .collect(),
            Gesture::Resizing {
                id,
                start_position,
                start_size,
                ..
            } => vec![CanvasEvent::ItemBoundsChanged {
                id,
                position: start_position,
                size: start_size,
            }],
            _ => Vec::new(),
        }
    }
}

fn find_unlocked(items: &[PlacedItem], id: ItemId) -> Option<&PlacedItem> {
    items.iter().find(|i| i.id == id && !i.locked)
}

/// New bounds for a resize from the gesture-start rect and the total
/// pointer delta. Sizes are snapped then floored; north and west handles
/// keep the opposite edge where it was.
pub fn resize_bounds(
    handle: ResizeHandle,
    start_position: Position,
    start_size: Size,
    dx: f32,
    dy: f32,
    grid: &GridConfig,
) -> (Position, Size) {
    let mut position = start_position;
    let mut size = start_size;

    if handle.moves_right() {
        size.width = grid.snap(start_size.width + dx).max(MIN_ITEM_SIZE);
    }
    if handle.moves_bottom() {
        size.height = grid.snap(start_size.height + dy).max(MIN_ITEM_SIZE);
    }
    if handle.moves_left() {
        let right = start_position.x + start_size.width;
        let left = grid.snap(start_position.x + dx);
        size.width = (right - left).max(MIN_ITEM_SIZE);
        position.x = right - size.width;
    }
    if handle.moves_top() {
        let bottom = start_position.y + start_size.height;
        let top = grid.snap(start_position.y + dy);
        size.height = (bottom - top).max(MIN_ITEM_SIZE);
        position.y = bottom - size.height;
    }
    (position, size)
}

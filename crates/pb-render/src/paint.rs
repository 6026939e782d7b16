//! Item list → ordered display list for the host renderer.
//!
//! The engine never draws. It hands the host an ordered list of boxes with
//! a render strategy per kind; the host maps each strategy to its own
//! widgets. Icons live here as names, never on the items themselves.

use crate::hit::{ResizeHandle, item_rect, resize_handles};
use kurbo::Rect;
use pb_core::config::GridConfig;
use pb_core::id::ItemId;
use pb_core::model::{ItemKind, PlacedItem, Size};

/// How the host should present an item's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Inject the item's markup fragment as-is.
    Markup,
    /// Media element driven by the `src` prop.
    Media,
    /// Data-driven widget shown as a labelled placeholder on the canvas.
    Placeholder,
}

impl RenderStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStrategy::Markup => "markup",
            RenderStrategy::Media => "media",
            RenderStrategy::Placeholder => "placeholder",
        }
    }
}

/// Kind → render strategy lookup table.
pub fn render_strategy(kind: ItemKind) -> RenderStrategy {
    match kind {
        ItemKind::Text
        | ItemKind::Table
        | ItemKind::Form
        | ItemKind::Social
        | ItemKind::Ecommerce => RenderStrategy::Markup,
        ItemKind::Image | ItemKind::Video => RenderStrategy::Media,
        ItemKind::Chart | ItemKind::Calendar | ItemKind::Map => RenderStrategy::Placeholder,
    }
}

/// Kind → icon name lookup table (outline icon set used by the admin UI).
pub fn icon_name(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Text => "document-text",
        ItemKind::Image => "photo",
        ItemKind::Video => "video-camera",
        ItemKind::Chart => "chart-bar",
        ItemKind::Table => "table-cells",
        ItemKind::Calendar => "calendar",
        ItemKind::Map => "map-pin",
        ItemKind::Form => "envelope",
        ItemKind::Social => "user-group",
        ItemKind::Ecommerce => "shopping-cart",
    }
}

// ─── Ordering ────────────────────────────────────────────────────────────

/// Visible items in paint order: ascending z-index, ties by list position.
pub fn paint_order(items: &[PlacedItem]) -> Vec<&PlacedItem> {
    let mut ordered: Vec<&PlacedItem> = items.iter().filter(|i| i.visible).collect();
    // `sort_by_key` is stable, so equal z keeps list order.
    ordered.sort_by_key(|i| i.z_index);
    ordered
}

/// All items (hidden included) in layer-panel order: descending z-index,
/// ties by list position.
pub fn layer_order(items: &[PlacedItem]) -> Vec<&PlacedItem> {
    let mut ordered: Vec<&PlacedItem> = items.iter().collect();
    ordered.sort_by_key(|i| std::cmp::Reverse(i.z_index));
    ordered
}

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub rect: Rect,
    pub z_index: i32,
    pub strategy: RenderStrategy,
    pub selected: bool,
    pub locked: bool,
    /// Resize handles to draw. Only a single unlocked selection gets them.
    pub handles: Vec<(ResizeHandle, Rect)>,
}

/// Build the display list for one frame.
///
/// `show_handles` is false in select mode; `scale` is the zoom factor.
pub fn display_list(
    items: &[PlacedItem],
    selection: &[ItemId],
    show_handles: bool,
    scale: f64,
) -> Vec<DisplayItem> {
    let single = match selection {
        [only] => Some(*only),
        _ => None,
    };
    paint_order(items)
        .into_iter()
        .map(|item| {
            let selected = selection.contains(&item.id);
            let handles = if show_handles && single == Some(item.id) && !item.locked {
                resize_handles(item, scale)
            } else {
                Vec::new()
            };
            log::trace!("paint {} z={} at {:?}", item.id, item.z_index, item.position);
            DisplayItem {
                id: item.id,
                kind: item.kind,
                rect: item_rect(item),
                z_index: item.z_index,
                strategy: render_strategy(item.kind),
                selected,
                locked: item.locked,
                handles,
            }
        })
        .collect()
}

/// Grid line offsets inside `canvas`: `(vertical xs, horizontal ys)`.
/// Empty when the grid is hidden.
pub fn grid_lines(canvas: Size, grid: &GridConfig) -> (Vec<f32>, Vec<f32>) {
    if !grid.enabled || grid.size <= 0.0 {
        return (Vec::new(), Vec::new());
    }
    let lines = |extent: f32| {
        let count = (extent / grid.size).floor() as usize;
        (0..=count)
            .map(|i| i as f32 * grid.size)
            .filter(|v| *v <= extent)
            .collect::<Vec<f32>>()
    };
    (lines(canvas.width), lines(canvas.height))
}

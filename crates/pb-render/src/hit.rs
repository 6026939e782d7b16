//! Hit testing: point → item lookup, marquee selection, resize handles.
//!
//! Walks the paint order back-to-front so the topmost visible item wins.
//! Hidden items are never hit; locked items are (they stay selectable).

use crate::paint::paint_order;
use kurbo::{Point, Rect};
use pb_core::id::ItemId;
use pb_core::model::PlacedItem;

/// Side length of a resize handle in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// The eight resize handles around a selected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    /// Corners first: they overlap the edge handles on small items.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::W,
        ResizeHandle::E,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::E => "e",
            ResizeHandle::W => "w",
            ResizeHandle::NE => "ne",
            ResizeHandle::NW => "nw",
            ResizeHandle::SE => "se",
            ResizeHandle::SW => "sw",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }

    /// Moves the top edge (height shrinks as the pointer goes down).
    pub fn moves_top(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    pub fn moves_left(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    /// Anchor point of the handle as fractions of the item box.
    fn anchor(&self) -> (f64, f64) {
        match self {
            ResizeHandle::NW => (0.0, 0.0),
            ResizeHandle::N => (0.5, 0.0),
            ResizeHandle::NE => (1.0, 0.0),
            ResizeHandle::E => (1.0, 0.5),
            ResizeHandle::SE => (1.0, 1.0),
            ResizeHandle::S => (0.5, 1.0),
            ResizeHandle::SW => (0.0, 1.0),
            ResizeHandle::W => (0.0, 0.5),
        }
    }
}

/// Canvas-space rectangle of an item.
pub fn item_rect(item: &PlacedItem) -> Rect {
    Rect::new(
        item.position.x as f64,
        item.position.y as f64,
        item.max_x() as f64,
        item.max_y() as f64,
    )
}

/// Find the topmost visible item at `point`. `None` means background.
pub fn hit_test(items: &[PlacedItem], point: Point) -> Option<ItemId> {
    paint_order(items)
        .into_iter()
        .rev()
        .find(|item| item_rect(item).contains(point))
        .map(|item| item.id)
}

/// All visible items whose bounds intersect `rect`, in paint order.
/// Used for marquee (box) selection.
pub fn hit_test_rect(items: &[PlacedItem], rect: Rect) -> Vec<ItemId> {
    let rect = rect.abs();
    paint_order(items)
        .into_iter()
        .filter(|item| {
            let r = item_rect(item);
            r.x0 <= rect.x1 && r.x1 >= rect.x0 && r.y0 <= rect.y1 && r.y1 >= rect.y0
        })
        .map(|item| item.id)
        .collect()
}

/// Rectangle of one handle, centred on its anchor. `scale` is the zoom
/// factor; handles keep a constant on-screen size.
pub fn handle_rect(item: &PlacedItem, handle: ResizeHandle, scale: f64) -> Rect {
    let r = item_rect(item);
    let (fx, fy) = handle.anchor();
    let center = Point::new(r.x0 + r.width() * fx, r.y0 + r.height() * fy);
    let half = HANDLE_SIZE / scale.max(f64::EPSILON) / 2.0;
    Rect::new(center.x - half, center.y - half, center.x + half, center.y + half)
}

/// All eight handle rectangles for `item`.
pub fn resize_handles(item: &PlacedItem, scale: f64) -> Vec<(ResizeHandle, Rect)> {
    ResizeHandle::ALL
        .into_iter()
        .map(|h| (h, handle_rect(item, h, scale)))
        .collect()
}

/// Which handle of `item` (if any) lies under `point`.
pub fn hit_test_handle(item: &PlacedItem, point: Point, scale: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL.into_iter().find(|h| {
        let r = handle_rect(item, *h, scale);
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    })
}

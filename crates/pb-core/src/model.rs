//! Core data model for the page-builder canvas.
//!
//! The canvas holds one flat, ordered list of `PlacedItem`s. Each item is an
//! instance of a catalog `Template` with its own position, size, z-index and
//! lock/visibility flags. Paint order is ascending z-index; the layer panel
//! shows descending z-index. Ties fall back to list position.
//!
//! Icons and other render-time values are not part of the model: the
//! render boundary resolves an `ItemKind` through a lookup table.

use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// Minimum width and height of a placed item, in canvas pixels.
pub const MIN_ITEM_SIZE: f32 = 50.0;

/// Free-form JSON map used for props, style overrides and item data.
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

// ─── Kind ────────────────────────────────────────────────────────────────

/// Semantic type of a placed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Text,
    Image,
    Video,
    Chart,
    Table,
    Calendar,
    Map,
    Form,
    Social,
    Ecommerce,
}

impl ItemKind {
    pub const ALL: [ItemKind; 10] = [
        ItemKind::Text,
        ItemKind::Image,
        ItemKind::Video,
        ItemKind::Chart,
        ItemKind::Table,
        ItemKind::Calendar,
        ItemKind::Map,
        ItemKind::Form,
        ItemKind::Social,
        ItemKind::Ecommerce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Text => "text",
            ItemKind::Image => "image",
            ItemKind::Video => "video",
            ItemKind::Chart => "chart",
            ItemKind::Table => "table",
            ItemKind::Calendar => "calendar",
            ItemKind::Map => "map",
            ItemKind::Form => "form",
            ItemKind::Social => "social",
            ItemKind::Ecommerce => "ecommerce",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Top-left corner in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Floor both axes at `MIN_ITEM_SIZE`.
    pub fn floored(self) -> Self {
        Self {
            width: self.width.max(MIN_ITEM_SIZE),
            height: self.height.max(MIN_ITEM_SIZE),
        }
    }

    pub fn is_undersized(&self) -> bool {
        self.width < MIN_ITEM_SIZE || self.height < MIN_ITEM_SIZE
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(MIN_ITEM_SIZE, MIN_ITEM_SIZE)
    }
}

// ─── Placed item ─────────────────────────────────────────────────────────

/// One instance of a template positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw markup fragment.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub props: PropertyBag,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub z_index: i32,
    /// Locked items ignore move and resize.
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_styles: Option<PropertyBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PropertyBag>,
}

fn default_visible() -> bool {
    true
}

impl PlacedItem {
    pub fn new(id: ItemId, kind: ItemKind) -> Self {
        Self {
            id,
            kind,
            name: String::new(),
            description: String::new(),
            content: String::new(),
            props: PropertyBag::new(),
            position: Position::default(),
            size: Size::default(),
            z_index: 0,
            locked: false,
            visible: true,
            custom_styles: None,
            data: None,
        }
    }

    /// Instantiate a template at `position` with the given z-index.
    pub fn from_template(
        template: &Template,
        id: ItemId,
        position: Position,
        z_index: i32,
    ) -> Self {
        Self {
            id,
            kind: template.kind,
            name: template.name.clone(),
            description: template.description.clone(),
            content: template.default_content.clone(),
            props: template.default_props.clone(),
            position,
            size: template.default_size.floored(),
            z_index,
            locked: false,
            visible: true,
            custom_styles: Some(PropertyBag::new()),
            data: Some(PropertyBag::new()),
        }
    }

    /// Merge the present fields of `patch` into this item.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(props) = &patch.props {
            self.props = props.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size.floored();
        }
        if let Some(z) = patch.z_index {
            self.z_index = z;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(styles) = &patch.custom_styles {
            self.custom_styles = Some(styles.clone());
        }
        if let Some(data) = &patch.data {
            self.data = Some(data.clone());
        }
    }

    /// JSON has no encoding for NaN or infinity, so an item failing this
    /// could not be saved and reloaded.
    pub fn has_finite_geometry(&self) -> bool {
        self.position.is_finite() && self.size.is_finite()
    }

    /// Right and bottom edges.
    pub fn max_x(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn max_y(&self) -> f32 {
        self.position.y + self.size.height
    }
}

/// A partial update. Absent fields are left untouched; `id` and `kind`
/// can never be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub props: Option<PropertyBag>,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub z_index: Option<i32>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    pub custom_styles: Option<PropertyBag>,
    pub data: Option<PropertyBag>,
}

impl ItemPatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─── Template ────────────────────────────────────────────────────────────

/// Catalog entry describing default content, props and size for a kind.
///
/// This is also the drag payload the component library hands to the
/// canvas; unknown keys (such as a host-side icon) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_content: String,
    #[serde(default)]
    pub default_props: PropertyBag,
    #[serde(default)]
    pub default_size: Size,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_names_roundtrip() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemKind::from_name("button"), None);
    }

    #[test]
    fn infinite_coordinates_are_not_finite_geometry() {
        let mut item = PlacedItem::new(ItemId::intern("fin"), ItemKind::Text);
        assert!(item.has_finite_geometry());
        item.apply_patch(&ItemPatch::position(Position::new(f32::INFINITY, 0.0)));
        assert!(!item.has_finite_geometry());
        item.position = Position::new(0.0, 0.0);
        item.size = Size::new(f32::NAN, 60.0);
        assert!(!item.has_finite_geometry());
    }

    #[test]
    fn patch_floors_size() {
        let mut item = PlacedItem::new(ItemId::intern("a"), ItemKind::Text);
        item.apply_patch(&ItemPatch::size(Size::new(10.0, 300.0)));
        assert_eq!(item.size, Size::new(50.0, 300.0));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut item = PlacedItem::new(ItemId::intern("b"), ItemKind::Image);
        item.name = "Hero".into();
        item.z_index = 4;
        let patch = ItemPatch {
            locked: Some(true),
            ..Default::default()
        };
        item.apply_patch(&patch);
        assert!(item.locked);
        assert_eq!(item.name, "Hero");
        assert_eq!(item.z_index, 4);
    }

    #[test]
    fn item_json_uses_host_keys() {
        let mut item = PlacedItem::new(ItemId::intern("chart_1"), ItemKind::Chart);
        item.z_index = 3;
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "chart");
        assert_eq!(json["zIndex"], 3);
        assert_eq!(json["id"], "chart_1");
        assert!(json.get("customStyles").is_none());
    }

    #[test]
    fn item_json_defaults_missing_fields() {
        let item: PlacedItem =
            serde_json::from_str(r#"{"id":"x","type":"map","position":{"x":5,"y":6}}"#).unwrap();
        assert!(item.visible);
        assert!(!item.locked);
        assert_eq!(item.size, Size::new(50.0, 50.0));
        assert_eq!(item.position, Position::new(5.0, 6.0));
    }

    #[test]
    fn template_ignores_icon_key() {
        let t: Template = serde_json::from_str(
            r#"{"id":"heading","type":"text","name":"Heading","icon":{},
                "defaultContent":"<h2>Heading</h2>","defaultSize":{"width":300,"height":60}}"#,
        )
        .unwrap();
        assert_eq!(t.kind, ItemKind::Text);
        assert_eq!(t.default_size, Size::new(300.0, 60.0));
    }
}

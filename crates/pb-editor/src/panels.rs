//! View models for the layer and properties panels.
//!
//! The host renders these; edits come back as `LayerAction`s and
//! `PropertyEdit`s which the editor turns into store mutations.

use crate::selection::Selection;
use crate::store::ZDirection;
use pb_core::id::ItemId;
use pb_core::model::{ItemKind, ItemPatch, PlacedItem, Position, PropertyBag, Size};
use pb_render::paint::{icon_name, layer_order};
use serde::Serialize;
use serde_json::Value;

// ─── Layer panel ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRow {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub icon: &'static str,
    pub z_index: i32,
    pub locked: bool,
    pub visible: bool,
    pub selected: bool,
}

/// Rows for the layer panel, frontmost first. Hidden items are listed so
/// they can be shown again.
pub fn layers(items: &[PlacedItem], selection: &Selection) -> Vec<LayerRow> {
    layer_order(items)
        .into_iter()
        .map(|item| LayerRow {
            id: item.id,
            name: if item.name.is_empty() {
                item.kind.as_str().to_string()
            } else {
                item.name.clone()
            },
            kind: item.kind,
            icon: icon_name(item.kind),
            z_index: item.z_index,
            locked: item.locked,
            visible: item.visible,
            selected: selection.contains(item.id),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAction {
    /// Row click. `additive` (Ctrl/Cmd) toggles membership.
    Select { id: ItemId, additive: bool },
    ToggleLock(ItemId),
    ToggleVisibility(ItemId),
    Delete(ItemId),
    Duplicate(ItemId),
    Move(ItemId, ZDirection),
}

impl LayerAction {
    /// Parse a host action name (`"lock"`, `"moveUp"`, …) for row `id`.
    pub fn from_name(name: &str, id: ItemId, additive: bool) -> Option<Self> {
        Some(match name {
            "select" => LayerAction::Select { id, additive },
            "lock" | "toggleLock" => LayerAction::ToggleLock(id),
            "visibility" | "toggleVisibility" => LayerAction::ToggleVisibility(id),
            "delete" => LayerAction::Delete(id),
            "duplicate" => LayerAction::Duplicate(id),
            "moveUp" => LayerAction::Move(id, ZDirection::Up),
            "moveDown" => LayerAction::Move(id, ZDirection::Down),
            _ => return None,
        })
    }
}

// ─── Properties panel ────────────────────────────────────────────────────

/// Editable fields of the single selected item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFields {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub description: String,
    pub content: String,
    pub position: Position,
    pub size: Size,
    pub z_index: i32,
    pub locked: bool,
    pub visible: bool,
    pub props: PropertyBag,
    pub custom_styles: PropertyBag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum PropertiesView {
    Empty,
    Single(Box<PropertyFields>),
    /// Only lock and visibility are editable; `None` means mixed.
    #[serde(rename_all = "camelCase")]
    Multiple {
        count: usize,
        all_visible: Option<bool>,
        all_locked: Option<bool>,
    },
}

pub fn properties(items: &[PlacedItem], selection: &Selection) -> PropertiesView {
    let selected: Vec<&PlacedItem> = items
        .iter()
        .filter(|i| selection.contains(i.id))
        .collect();
    match selected.as_slice() {
        [] => PropertiesView::Empty,
        [item] => PropertiesView::Single(Box::new(PropertyFields {
            id: item.id,
            kind: item.kind,
            name: item.name.clone(),
            description: item.description.clone(),
            content: item.content.clone(),
            position: item.position,
            size: item.size,
            z_index: item.z_index,
            locked: item.locked,
            visible: item.visible,
            props: item.props.clone(),
            custom_styles: item.custom_styles.clone().unwrap_or_default(),
        })),
        many => PropertiesView::Multiple {
            count: many.len(),
            all_visible: uniform(many.iter().map(|i| i.visible)),
            all_locked: uniform(many.iter().map(|i| i.locked)),
        },
    }
}

fn uniform(mut values: impl Iterator<Item = bool>) -> Option<bool> {
    let first = values.next()?;
    values.all(|v| v == first).then_some(first)
}

/// One field edit from the properties panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Name(String),
    Description(String),
    Content(String),
    X(f32),
    Y(f32),
    Width(f32),
    Height(f32),
    ZIndex(i32),
    Locked(bool),
    Visible(bool),
    /// Set one custom style entry. `Value::Null` removes it.
    Style(String, Value),
    /// Set one template prop. `Value::Null` removes it.
    Prop(String, Value),
}

impl PropertyEdit {
    /// Decode a host edit: field name plus a JSON value.
    pub fn from_field(field: &str, value: Value) -> Result<Self, String> {
        let number = |v: &Value| {
            let n = v
                .as_f64()
                .ok_or_else(|| format!("{field}: expected a number"))?;
            Some(n as f32)
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("{field}: {n} is out of range"))
        };
        let text = |v: Value| match v {
            Value::String(s) => Ok(s),
            _ => Err(format!("{field}: expected a string")),
        };
        let flag = |v: &Value| {
            v.as_bool()
                .ok_or_else(|| format!("{field}: expected a boolean"))
        };

        if let Some(key) = field.strip_prefix("style.") {
            return Ok(PropertyEdit::Style(key.to_string(), value));
        }
        if let Some(key) = field.strip_prefix("props.") {
            return Ok(PropertyEdit::Prop(key.to_string(), value));
        }
        Ok(match field {
            "name" => PropertyEdit::Name(text(value)?),
            "description" => PropertyEdit::Description(text(value)?),
            "content" => PropertyEdit::Content(text(value)?),
            "x" => PropertyEdit::X(number(&value)?),
            "y" => PropertyEdit::Y(number(&value)?),
            "width" => PropertyEdit::Width(number(&value)?),
            "height" => PropertyEdit::Height(number(&value)?),
            "zIndex" => PropertyEdit::ZIndex(
                value
                    .as_i64()
                    .and_then(|z| i32::try_from(z).ok())
                    .ok_or_else(|| format!("{field}: expected an integer"))?,
            ),
            "locked" => PropertyEdit::Locked(flag(&value)?),
            "visible" => PropertyEdit::Visible(flag(&value)?),
            _ => return Err(format!("Unknown property: {field}")),
        })
    }

    /// Patch that applies this edit to `item`. Coordinate edits keep the
    /// other axis; style and prop edits merge into the existing map.
    pub fn patch_for(&self, item: &PlacedItem) -> ItemPatch {
        let mut patch = ItemPatch::default();
        match self {
            PropertyEdit::Name(v) => patch.name = Some(v.clone()),
            PropertyEdit::Description(v) => patch.description = Some(v.clone()),
            PropertyEdit::Content(v) => patch.content = Some(v.clone()),
            PropertyEdit::X(x) => patch.position = Some(Position::new(*x, item.position.y)),
            PropertyEdit::Y(y) => patch.position = Some(Position::new(item.position.x, *y)),
            PropertyEdit::Width(w) => patch.size = Some(Size::new(*w, item.size.height)),
            PropertyEdit::Height(h) => patch.size = Some(Size::new(item.size.width, *h)),
            PropertyEdit::ZIndex(z) => patch.z_index = Some(*z),
            PropertyEdit::Locked(v) => patch.locked = Some(*v),
            PropertyEdit::Visible(v) => patch.visible = Some(*v),
            PropertyEdit::Style(key, value) => {
                let mut styles = item.custom_styles.clone().unwrap_or_default();
                set_or_remove(&mut styles, key, value);
                patch.custom_styles = Some(styles);
            }
            PropertyEdit::Prop(key, value) => {
                let mut props = item.props.clone();
                set_or_remove(&mut props, key, value);
                patch.props = Some(props);
            }
        }
        patch
    }

    /// Patch shared by every item of a multiple selection, if this edit
    /// has one.
    pub fn batch_patch(&self) -> Option<ItemPatch> {
        let mut patch = ItemPatch::default();
        match self {
            PropertyEdit::Locked(v) => patch.locked = Some(*v),
            PropertyEdit::Visible(v) => patch.visible = Some(*v),
            PropertyEdit::ZIndex(z) => patch.z_index = Some(*z),
            _ => return None,
        }
        Some(patch)
    }
}

fn set_or_remove(bag: &mut PropertyBag, key: &str, value: &Value) {
    if value.is_null() {
        bag.remove(key);
    } else {
        bag.insert(key.to_string(), value.clone());
    }
}

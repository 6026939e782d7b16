//! Host-facing document: the ordered item list the page stores on save.
//!
//! JSON is the format the admin page exchanges with its backend; the
//! MessagePack form is a compact alternative for hosts that keep drafts
//! locally.

use crate::id::ItemId;
use crate::model::PlacedItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An item list whose ids are unique and whose sizes respect the minimum.
///
/// The only ways in are [`Document::from_items`] and the parsers built on
/// it, so every `Document` a host hands to the editor already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct Document {
    items: Vec<PlacedItem>,
}

#[derive(Deserialize)]
struct RawDocument {
    items: Vec<PlacedItem>,
}

impl TryFrom<RawDocument> for Document {
    type Error = String;

    fn try_from(raw: RawDocument) -> Result<Self, String> {
        Self::from_items(raw.items)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `items`, enforcing the list invariants.
    ///
    /// Duplicate ids and non-finite positions or sizes are rejected.
    /// Undersized items are floored to the minimum size and reported at
    /// warn level.
    pub fn from_items(mut items: Vec<PlacedItem>) -> Result<Self, String> {
        let mut seen: HashSet<ItemId> = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(format!("Duplicate item id `{}`", item.id));
            }
            if !item.has_finite_geometry() {
                return Err(format!("Item `{}` has a non-finite position or size", item.id));
            }
        }
        for item in items.iter_mut().filter(|i| i.size.is_undersized()) {
            log::warn!(
                "item {} is {}x{}, flooring to minimum size",
                item.id,
                item.size.width,
                item.size.height
            );
            item.size = item.size.floored();
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<PlacedItem> {
        self.items
    }

    /// Parse a document from JSON. Accepts either a bare item array (what
    /// the page's `onChange` hands out) or `{"items": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| format!("Document parse error: {e}"))?;
        let items: Vec<PlacedItem> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value),
            serde_json::Value::Object(mut obj) => match obj.remove("items") {
                Some(items) => serde_json::from_value(items),
                None => return Err("Document parse error: missing `items`".to_string()),
            },
            _ => return Err("Document parse error: expected array or object".to_string()),
        }
        .map_err(|e| format!("Document parse error: {e}"))?;
        Self::from_items(items)
    }

    /// Serialize the items as a bare JSON array.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec_named(self).map_err(|e| format!("Document encode error: {e}"))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, String> {
        rmp_serde::from_slice(bytes).map_err(|e| format!("Document decode error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, Size};

    fn item(id: &str) -> PlacedItem {
        PlacedItem::new(ItemId::intern(id), ItemKind::Table)
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = Document::from_items(vec![item("doc_a"), item("doc_a")]).unwrap_err();
        assert!(err.contains("doc_a"));
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        // 1e300 is outside f32 range.
        let json = r#"[{"id":"doc_far","type":"text","position":{"x":1e300,"y":0}}]"#;
        assert!(Document::from_json(json).is_err());

        let mut nan = item("doc_nan");
        nan.size.width = f32::NAN;
        assert!(Document::from_items(vec![nan]).is_err());
    }

    #[test]
    fn undersized_items_floored() {
        let mut small = item("doc_small");
        small.size = Size::new(10.0, 10.0);
        let doc = Document::from_items(vec![small]).unwrap();
        assert_eq!(doc.items[0].size, Size::new(50.0, 50.0));
    }

    #[test]
    fn json_accepts_array_or_object() {
        let arr = r#"[{"id":"doc_j1","type":"text"}]"#;
        let obj = r#"{"items":[{"id":"doc_j1","type":"text"}]}"#;
        assert_eq!(Document::from_json(arr).unwrap(), Document::from_json(obj).unwrap());
        assert!(Document::from_json(r#"{"things":[]}"#).is_err());
        assert!(Document::from_json("42").is_err());
    }

    #[test]
    fn msgpack_preserves_items() {
        let mut a = item("doc_m1");
        a.z_index = 7;
        a.props.insert("rows".into(), serde_json::json!(3));
        let doc = Document::from_items(vec![a, item("doc_m2")]).unwrap();
        let bytes = doc.to_msgpack().unwrap();
        assert_eq!(Document::from_msgpack(&bytes).unwrap(), doc);
    }

    #[test]
    fn msgpack_with_duplicate_ids_rejected() {
        let raw = Document {
            items: vec![item("doc_md"), item("doc_md")],
        };
        let bytes = raw.to_msgpack().unwrap();
        let err = Document::from_msgpack(&bytes).unwrap_err();
        assert!(err.contains("doc_md"));
    }
}

//! Drag-and-drop from the component library onto the canvas.
//!
//! The library attaches the template as JSON under `application/json`.
//! A payload that does not decode is logged and ignored.

use pb_core::model::{Position, Template};

/// MIME type the library uses for its drag data.
pub const DROP_MIME: &str = "application/json";

/// Cursor feedback while dragging over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
}

impl DropEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropEffect::Copy => "copy",
        }
    }
}

/// Library drops always copy; the template stays in the library.
pub fn drag_over_effect() -> DropEffect {
    DropEffect::Copy
}

/// Decoded drag data.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPayload {
    pub template: Template,
}

impl DropPayload {
    pub fn parse(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            log::warn!("drop ignored: empty payload");
            return Err("empty drop payload".to_string());
        }
        serde_json::from_str::<Template>(json)
            .map(|template| Self { template })
            .map_err(|e| {
                log::warn!("drop ignored: {e}");
                format!("invalid drop payload: {e}")
            })
    }
}

/// Convert a client-space pointer position into canvas space.
///
/// `zoom` is in percent. Snapping happens when the item is added.
/// Returns `None` when either coordinate is NaN or infinite.
pub fn client_to_canvas(
    client: (f32, f32),
    canvas_origin: (f32, f32),
    zoom: u32,
) -> Option<Position> {
    let scale = zoom.max(1) as f32 / 100.0;
    let position = Position::new(
        (client.0 - canvas_origin.0) / scale,
        (client.1 - canvas_origin.1) / scale,
    );
    position.is_finite().then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::{ItemKind, Size};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_library_payload() {
        let json = r#"{
            "id": "hero-image",
            "type": "image",
            "name": "Hero Image",
            "icon": "photo",
            "defaultContent": "<img />",
            "defaultProps": {"src": ""},
            "defaultSize": {"width": 800, "height": 400}
        }"#;
        let payload = DropPayload::parse(json).unwrap();
        assert_eq!(payload.template.id, "hero-image");
        assert_eq!(payload.template.kind, ItemKind::Image);
        assert_eq!(payload.template.default_size, Size::new(800.0, 400.0));
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(DropPayload::parse("").is_err());
        assert!(DropPayload::parse("{not json").is_err());
        assert!(DropPayload::parse(r#"{"id":"x","type":"button","name":"X"}"#).is_err());
    }

    #[test]
    fn client_coordinates_unscale_zoom() {
        assert_eq!(
            client_to_canvas((300.0, 250.0), (100.0, 50.0), 200),
            Some(Position::new(100.0, 100.0))
        );
        assert_eq!(
            client_to_canvas((150.0, 150.0), (100.0, 100.0), 50),
            Some(Position::new(100.0, 100.0))
        );
    }

    #[test]
    fn non_finite_client_point_has_no_canvas_position() {
        assert_eq!(client_to_canvas((f32::NAN, 10.0), (0.0, 0.0), 100), None);
        assert_eq!(client_to_canvas((10.0, 0.0), (0.0, f32::INFINITY), 100), None);
        assert_eq!(client_to_canvas((f32::MAX, 0.0), (-f32::MAX, 0.0), 100), None);
    }

    #[test]
    fn drag_over_is_copy() {
        assert_eq!(drag_over_effect().as_str(), "copy");
    }
}

//! Built-in component catalog.
//!
//! The fixed library of templates offered by the component sidebar. Hosts
//! render it grouped by kind and hand the chosen template back as a drop
//! payload.

use crate::model::{ItemKind, PropertyBag, Size, Template};
use serde_json::{Value, json};
use std::sync::LazyLock;

static CATALOG: LazyLock<Vec<Template>> = LazyLock::new(build_catalog);

/// All catalog templates in display order.
pub fn all() -> &'static [Template] {
    &CATALOG
}

/// Look up a template by its catalog id (e.g. `"contact-form"`).
pub fn find(id: &str) -> Option<&'static Template> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Templates grouped by kind. Groups appear in order of first occurrence
/// and keep catalog order inside each group.
pub fn grouped_by_kind() -> Vec<(ItemKind, Vec<&'static Template>)> {
    let mut groups: Vec<(ItemKind, Vec<&'static Template>)> = Vec::new();
    for template in CATALOG.iter() {
        match groups.iter_mut().find(|(kind, _)| *kind == template.kind) {
            Some((_, members)) => members.push(template),
            None => groups.push((template.kind, vec![template])),
        }
    }
    groups
}

fn props(value: Value) -> PropertyBag {
    match value {
        Value::Object(map) => map,
        _ => PropertyBag::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    id: &str,
    kind: ItemKind,
    name: &str,
    description: &str,
    content: &str,
    default_props: Value,
    width: f32,
    height: f32,
) -> Template {
    Template {
        id: id.to_string(),
        kind,
        name: name.to_string(),
        description: description.to_string(),
        default_content: content.to_string(),
        default_props: props(default_props),
        default_size: Size::new(width, height),
    }
}

fn build_catalog() -> Vec<Template> {
    vec![
        template(
            "paragraph",
            ItemKind::Text,
            "Paragraph",
            "Add a paragraph of text",
            "<p>Enter your text here...</p>",
            json!({}),
            300.0,
            100.0,
        ),
        template(
            "heading",
            ItemKind::Text,
            "Heading",
            "Add a heading",
            "<h2>Heading</h2>",
            json!({}),
            300.0,
            60.0,
        ),
        template(
            "image",
            ItemKind::Image,
            "Image",
            "Add an image",
            r#"<img src="https://via.placeholder.com/300x200" alt="Image" />"#,
            json!({ "src": "https://via.placeholder.com/300x200", "alt": "Image" }),
            300.0,
            200.0,
        ),
        template(
            "video",
            ItemKind::Video,
            "Video",
            "Add a video player",
            r#"<video controls><source src="" type="video/mp4">Your browser does not support the video tag.</video>"#,
            json!({ "src": "", "controls": true }),
            400.0,
            300.0,
        ),
        template(
            "chart",
            ItemKind::Chart,
            "Chart",
            "Add a chart or graph",
            r#"<div class="chart-placeholder">Chart Component</div>"#,
            json!({ "type": "bar", "data": [] }),
            400.0,
            300.0,
        ),
        template(
            "table",
            ItemKind::Table,
            "Table",
            "Add a data table",
            "<table><thead><tr><th>Header 1</th><th>Header 2</th></tr></thead><tbody><tr><td>Data 1</td><td>Data 2</td></tr></tbody></table>",
            json!({ "rows": 3, "columns": 3 }),
            400.0,
            200.0,
        ),
        template(
            "calendar",
            ItemKind::Calendar,
            "Calendar",
            "Add a calendar widget",
            r#"<div class="calendar-placeholder">Calendar Component</div>"#,
            json!({ "view": "month" }),
            350.0,
            300.0,
        ),
        template(
            "map",
            ItemKind::Map,
            "Map",
            "Add a map component",
            r#"<div class="map-placeholder">Map Component</div>"#,
            json!({ "center": { "lat": 0, "lng": 0 }, "zoom": 10 }),
            400.0,
            300.0,
        ),
        template(
            "contact-form",
            ItemKind::Form,
            "Contact Form",
            "Add a contact form",
            r#"<form><input type="text" placeholder="Name" /><input type="email" placeholder="Email" /><textarea placeholder="Message"></textarea><button type="submit">Send</button></form>"#,
            json!({ "fields": ["name", "email", "message"] }),
            350.0,
            250.0,
        ),
        template(
            "social-links",
            ItemKind::Social,
            "Social Links",
            "Add social media links",
            r##"<div class="social-links"><a href="#"><i class="icon-facebook"></i></a><a href="#"><i class="icon-twitter"></i></a><a href="#"><i class="icon-instagram"></i></a></div>"##,
            json!({ "platforms": ["facebook", "twitter", "instagram"] }),
            200.0,
            50.0,
        ),
        template(
            "product-card",
            ItemKind::Ecommerce,
            "Product Card",
            "Add a product display card",
            r#"<div class="product-card"><img src="https://via.placeholder.com/150" alt="Product" /><h3>Product Name</h3><p>$99.99</p><button>Add to Cart</button></div>"#,
            json!({ "price": 99.99, "image": "https://via.placeholder.com/150" }),
            200.0,
            250.0,
        ),
        template(
            "testimonial",
            ItemKind::Text,
            "Testimonial",
            "Add a customer testimonial",
            r#"<blockquote>"This is an amazing product!" - John Doe</blockquote>"#,
            json!({ "author": "John Doe", "rating": 5 }),
            300.0,
            120.0,
        ),
    ]
}

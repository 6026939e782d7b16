pub mod hit;
pub mod paint;

pub use hit::{ResizeHandle, hit_test, hit_test_handle, hit_test_rect, item_rect};
pub use paint::{DisplayItem, RenderStrategy, display_list, layer_order, paint_order};

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Point, Rect, Vec2};

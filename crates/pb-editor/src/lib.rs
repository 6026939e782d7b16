pub mod drop;
pub mod editor;
pub mod history;
pub mod input;
pub mod panels;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod toolbar;
pub mod tools;

pub use drop::{DropPayload, client_to_canvas};
pub use editor::{Editor, ItemsHook, KeyOutcome};
pub use history::{History, HistoryInfo, Snapshot};
pub use input::{InputEvent, Modifiers};
pub use panels::{LayerAction, LayerRow, PropertiesView, PropertyEdit};
pub use selection::Selection;
pub use shortcuts::{FocusContext, KeyEvent, ShortcutAction, ShortcutMap};
pub use store::{StoreMutation, ZDirection};
pub use toolbar::{ToolbarCommand, ToolbarState};
pub use tools::{CanvasEvent, CanvasTool, DragMode, GestureState, HitTarget};

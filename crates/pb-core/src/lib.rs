pub mod catalog;
pub mod clock;
pub mod config;
pub mod document;
pub mod id;
pub mod lint;
pub mod model;

pub use clock::{Clock, StepClock, SystemClock};
pub use config::{EditorConfig, GridConfig, ViewSettings};
pub use document::Document;
pub use id::ItemId;
pub use lint::{LintDiagnostic, LintSeverity, lint_items};
pub use model::*;

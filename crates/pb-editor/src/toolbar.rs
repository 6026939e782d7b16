//! Toolbar commands and the state the host needs to draw the toolbar.

use crate::history::HistoryInfo;
use crate::tools::DragMode;
use pb_core::config::{GridConfig, ViewSettings};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarCommand {
    Undo,
    Redo,
    SelectAll,
    DeselectAll,
    Delete,
    Duplicate,
    BringToFront,
    SendToBack,
    SetDragMode(DragMode),
    ToggleGrid,
    ToggleSnap,
    SetGridSize(f32),
    ZoomIn,
    ZoomOut,
    SetZoom(u32),
    ToggleRulers,
    ToggleGuides,
}

impl ToolbarCommand {
    /// Decode a host command. `value` carries the argument of the
    /// parameterised commands and is ignored by the rest.
    pub fn from_name(name: &str, value: &str) -> Result<Self, String> {
        Ok(match name {
            "undo" => ToolbarCommand::Undo,
            "redo" => ToolbarCommand::Redo,
            "selectAll" => ToolbarCommand::SelectAll,
            "deselectAll" => ToolbarCommand::DeselectAll,
            "delete" => ToolbarCommand::Delete,
            "duplicate" => ToolbarCommand::Duplicate,
            "bringToFront" => ToolbarCommand::BringToFront,
            "sendToBack" => ToolbarCommand::SendToBack,
            "setDragMode" => ToolbarCommand::SetDragMode(
                DragMode::from_name(value).ok_or_else(|| format!("Unknown drag mode: {value}"))?,
            ),
            "toggleGrid" => ToolbarCommand::ToggleGrid,
            "toggleSnap" => ToolbarCommand::ToggleSnap,
            "setGridSize" => ToolbarCommand::SetGridSize(
                value
                    .trim()
                    .parse()
                    .map_err(|e| format!("Invalid grid size {value:?}: {e}"))?,
            ),
            "zoomIn" => ToolbarCommand::ZoomIn,
            "zoomOut" => ToolbarCommand::ZoomOut,
            "setZoom" => ToolbarCommand::SetZoom(
                value
                    .trim()
                    .parse()
                    .map_err(|e| format!("Invalid zoom {value:?}: {e}"))?,
            ),
            "toggleRulers" => ToolbarCommand::ToggleRulers,
            "toggleGuides" => ToolbarCommand::ToggleGuides,
            _ => return Err(format!("Unknown toolbar command: {name}")),
        })
    }
}

/// Everything the toolbar shows: button enablement and current settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub selected_count: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub can_paste: bool,
    pub drag_mode: DragMode,
    pub grid: GridConfig,
    pub view: ViewSettings,
    pub history: HistoryInfo,
}

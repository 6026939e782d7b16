//! Editor configuration: grid, view and history settings.
//!
//! Every struct is serde-derivable with defaults so a host can pass a
//! partial JSON object and get the stock editor for everything it omits.

use crate::model::Size;
use serde::{Deserialize, Serialize};

/// Default undo depth (snapshots kept, oldest dropped first).
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

pub const GRID_SIZE_MIN: f32 = 5.0;
pub const GRID_SIZE_MAX: f32 = 100.0;

pub const ZOOM_MIN: u32 = 25;
pub const ZOOM_MAX: u32 = 400;
pub const ZOOM_STEP: u32 = 25;

// ─── Grid ─────────────────────────────────────────────────────────────────

/// Grid display and snapping.
///
/// `enabled` only controls whether the grid is drawn; `snap` controls
/// quantization. The two are independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub enabled: bool,
    /// Grid pitch in canvas pixels. Clamped to 5..=100.
    pub size: f32,
    pub snap: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20.0,
            snap: true,
        }
    }
}

impl GridConfig {
    /// Set the grid pitch, clamped to the supported range.
    pub fn set_size(&mut self, size: f32) {
        self.size = if size.is_finite() {
            size.clamp(GRID_SIZE_MIN, GRID_SIZE_MAX)
        } else {
            GRID_SIZE_MIN
        };
    }

    /// Quantize `value` to the nearest multiple of the grid size.
    /// Identity when snapping is off.
    pub fn snap(&self, value: f32) -> f32 {
        if !self.snap || self.size <= 0.0 {
            return value;
        }
        (value / self.size).round() * self.size
    }

    pub fn snap_size(&self, size: Size) -> Size {
        Size::new(self.snap(size.width), self.snap(size.height))
    }
}

// ─── View ────────────────────────────────────────────────────────────────

/// Zoom, rulers and canvas extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewSettings {
    /// Zoom in percent (100 = 1:1).
    pub zoom: u32,
    pub show_rulers: bool,
    pub show_guides: bool,
    pub canvas_size: Size,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            zoom: 100,
            show_rulers: true,
            show_guides: true,
            canvas_size: Size::new(1200.0, 800.0),
        }
    }
}

impl ViewSettings {
    pub fn set_zoom(&mut self, zoom: u32) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom.saturating_add(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP));
    }

    /// Zoom as a scale factor (1.0 = 100%).
    pub fn scale(&self) -> f32 {
        self.zoom as f32 / 100.0
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots.
    pub history_depth: usize,
    /// Offset applied to duplicated and pasted items, on both axes.
    pub duplicate_offset: f32,
    /// Arrow-key nudge distance. Shift+arrow nudges by one grid step.
    pub nudge_step: f32,
    pub grid: GridConfig,
    pub view: ViewSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            duplicate_offset: 20.0,
            nudge_step: 1.0,
            grid: GridConfig::default(),
            view: ViewSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| format!("Config parse error: {e}"))?;
        config.grid.set_size(config.grid.size);
        config.view.set_zoom(config.view.zoom);
        config.history_depth = config.history_depth.max(1);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_to_nearest_multiple() {
        let grid = GridConfig::default();
        assert_eq!(grid.snap(106.0), 100.0);
        assert_eq!(grid.snap(111.0), 120.0);
        assert_eq!(grid.snap(-9.0), -0.0);
        assert_eq!(grid.snap(-11.0), -20.0);
    }

    #[test]
    fn snap_is_idempotent() {
        let mut grid = GridConfig::default();
        for size in [5.0, 15.0, 20.0, 35.0, 100.0] {
            grid.set_size(size);
            for c in [-333.3_f32, -1.0, 0.0, 7.5, 49.9, 101.0, 1234.56] {
                let once = grid.snap(c);
                assert_eq!(grid.snap(once), once, "size {size}, c {c}");
            }
        }
    }

    #[test]
    fn snap_disabled_is_identity() {
        let grid = GridConfig {
            snap: false,
            ..Default::default()
        };
        assert_eq!(grid.snap(106.3), 106.3);
    }

    #[test]
    fn grid_size_clamped() {
        let mut grid = GridConfig::default();
        grid.set_size(1.0);
        assert_eq!(grid.size, 5.0);
        grid.set_size(500.0);
        assert_eq!(grid.size, 100.0);
    }

    #[test]
    fn zoom_steps_and_clamps() {
        let mut view = ViewSettings::default();
        view.zoom_in();
        assert_eq!(view.zoom, 125);
        view.set_zoom(30);
        view.zoom_out();
        assert_eq!(view.zoom, 25);
        view.set_zoom(400);
        view.zoom_in();
        assert_eq!(view.zoom, 400);
    }

    #[test]
    fn partial_json_config() {
        let config = EditorConfig::from_json(r#"{"historyDepth":3,"grid":{"size":1000}}"#).unwrap();
        assert_eq!(config.history_depth, 3);
        assert_eq!(config.grid.size, 100.0);
        assert!(config.grid.snap);
        assert_eq!(config.view.zoom, 100);
    }

    #[test]
    fn bad_json_config_is_an_error() {
        assert!(EditorConfig::from_json("{historyDepth:").is_err());
        assert_eq!(EditorConfig::from_json("").unwrap(), EditorConfig::default());
    }
}

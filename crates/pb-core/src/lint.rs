//! Lint diagnostics for placed-item lists.
//!
//! Reports structural issues without modifying the list. Hosts load item
//! lists from their own store, so these checks run before the editor takes
//! ownership and are also exposed through the WASM bridge.

use crate::id::ItemId;
use crate::model::{PlacedItem, Size};
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks an editor invariant.
    Warning,
    /// Informational.
    Info,
}

impl LintSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        }
    }
}

/// A single lint diagnostic for a placed item.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    pub item_id: ItemId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "undersized").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over `items`. `canvas` is the canvas extent used by
/// the off-canvas rule.
#[must_use]
pub fn lint_items(items: &[PlacedItem], canvas: Size) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(items, &mut diags);
    lint_undersized(items, &mut diags);
    lint_off_canvas(items, canvas, &mut diags);
    lint_empty_content(items, &mut diags);
    diags
}

/// True when any diagnostic is a warning.
pub fn has_warnings(diags: &[LintDiagnostic]) -> bool {
    diags.iter().any(|d| d.severity == LintSeverity::Warning)
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(items: &[PlacedItem], diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id) {
            diags.push(LintDiagnostic {
                item_id: item.id,
                message: format!("Item id `{}` appears more than once.", item.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_undersized(items: &[PlacedItem], diags: &mut Vec<LintDiagnostic>) {
    for item in items.iter().filter(|i| i.size.is_undersized()) {
        diags.push(LintDiagnostic {
            item_id: item.id,
            message: format!(
                "Item `{}` is {}×{}, below the 50×50 minimum.",
                item.id, item.size.width, item.size.height
            ),
            severity: LintSeverity::Warning,
            rule: "undersized",
        });
    }
}

fn lint_off_canvas(items: &[PlacedItem], canvas: Size, diags: &mut Vec<LintDiagnostic>) {
    for item in items {
        let outside = item.max_x() <= 0.0
            || item.max_y() <= 0.0
            || item.position.x >= canvas.width
            || item.position.y >= canvas.height;
        if outside {
            diags.push(LintDiagnostic {
                item_id: item.id,
                message: format!("Item `{}` lies entirely outside the canvas.", item.id),
                severity: LintSeverity::Info,
                rule: "off-canvas",
            });
        }
    }
}

fn lint_empty_content(items: &[PlacedItem], diags: &mut Vec<LintDiagnostic>) {
    for item in items.iter().filter(|i| i.content.trim().is_empty()) {
        diags.push(LintDiagnostic {
            item_id: item.id,
            message: format!("Item `{}` has no content.", item.id),
            severity: LintSeverity::Info,
            rule: "empty-content",
        });
    }
}

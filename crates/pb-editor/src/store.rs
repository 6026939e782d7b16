//! Item store mutation surface.
//!
//! Every edit to the placed-item list is a `StoreMutation`. `apply` is a pure
//! function of (current list, selection, mutation, context) that returns the
//! next list and selection, or `None` when the mutation changes nothing.
//! The editor pushes a history snapshot for every `Some`.
//!
//! Locked items silently ignore `Move`, `Resize`, `SetBounds` and
//! `Translate`. Property edits (`Update`) still reach them so the lock can
//! be lifted.

use crate::selection::Selection;
use pb_core::config::GridConfig;
use pb_core::document::Document;
use pb_core::id::ItemId;
use pb_core::model::{ItemPatch, PlacedItem, Position, Size, Template};
use std::collections::HashSet;

/// Direction for layer-panel reordering. `Up` moves toward the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMutation {
    /// Instantiate a template at a canvas position. Becomes sole selection.
    Add {
        template: Box<Template>,
        position: Position,
    },
    Delete {
        ids: Vec<ItemId>,
    },
    /// Clone items with fresh ids, offset and stacked on top.
    Duplicate {
        ids: Vec<ItemId>,
    },
    Update {
        id: ItemId,
        patch: Box<ItemPatch>,
    },
    BatchUpdate {
        ids: Vec<ItemId>,
        patch: Box<ItemPatch>,
    },
    Move {
        id: ItemId,
        position: Position,
    },
    Resize {
        id: ItemId,
        size: Size,
    },
    /// Move and resize in one step (north/west resize handles).
    SetBounds {
        id: ItemId,
        position: Position,
        size: Size,
    },
    /// Offset every listed item by a delta (arrow-key nudging).
    Translate {
        ids: Vec<ItemId>,
        dx: f32,
        dy: f32,
    },
    Reorder {
        id: ItemId,
        direction: ZDirection,
    },
    BringToFront {
        ids: Vec<ItemId>,
    },
    SendToBack {
        ids: Vec<ItemId>,
    },
    ToggleLock {
        id: ItemId,
    },
    ToggleVisibility {
        id: ItemId,
    },
    /// Insert clipboard items as fresh copies. Becomes the selection.
    Paste {
        items: Vec<PlacedItem>,
    },
    /// Replace the whole list (host reload). Rejected when ids repeat;
    /// undersized items are floored.
    Replace {
        items: Vec<PlacedItem>,
    },
}

impl StoreMutation {
    /// Short label for logs and history entries.
    pub fn description(&self) -> &'static str {
        match self {
            StoreMutation::Add { .. } => "add item",
            StoreMutation::Delete { .. } => "delete",
            StoreMutation::Duplicate { .. } => "duplicate",
            StoreMutation::Update { .. } => "update item",
            StoreMutation::BatchUpdate { .. } => "update selection",
            StoreMutation::Move { .. } => "move",
            StoreMutation::Resize { .. } => "resize",
            StoreMutation::SetBounds { .. } => "resize",
            StoreMutation::Translate { .. } => "nudge",
            StoreMutation::Reorder { .. } => "reorder layer",
            StoreMutation::BringToFront { .. } => "bring to front",
            StoreMutation::SendToBack { .. } => "send to back",
            StoreMutation::ToggleLock { .. } => "toggle lock",
            StoreMutation::ToggleVisibility { .. } => "toggle visibility",
            StoreMutation::Paste { .. } => "paste",
            StoreMutation::Replace { .. } => "replace",
        }
    }
}

/// Inputs a mutation needs beyond the list itself.
#[derive(Debug, Clone, Copy)]
pub struct MutationContext {
    pub grid: GridConfig,
    /// Milliseconds timestamp for minting ids.
    pub now: u64,
    /// Offset for duplicated and pasted items.
    pub duplicate_offset: f32,
}

impl Default for MutationContext {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            now: 0,
            duplicate_offset: 20.0,
        }
    }
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub items: Vec<PlacedItem>,
    pub selection: Selection,
}

// ─── Queries ─────────────────────────────────────────────────────────────

pub fn find(items: &[PlacedItem], id: ItemId) -> Option<&PlacedItem> {
    items.iter().find(|i| i.id == id)
}

pub fn max_z(items: &[PlacedItem]) -> Option<i32> {
    items.iter().map(|i| i.z_index).max()
}

pub fn min_z(items: &[PlacedItem]) -> Option<i32> {
    items.iter().map(|i| i.z_index).min()
}

/// List indices in paint order: ascending z, ties by list position.
fn z_sorted_indices(items: &[PlacedItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| items[i].z_index);
    order
}

// ─── Apply ───────────────────────────────────────────────────────────────

/// Apply `mutation` to `items` and `selection`.
///
/// Returns `None` when the result would be identical to the input, so the
/// caller never records an empty history step.
pub fn apply(
    items: &[PlacedItem],
    selection: &Selection,
    mutation: &StoreMutation,
    ctx: &MutationContext,
) -> Option<Applied> {
    let mut next: Vec<PlacedItem> = items.to_vec();
    let mut next_selection = selection.clone();

    match mutation {
        StoreMutation::Add { template, position } => {
            let item = instantiate(items, template, *position, ctx);
            next_selection = Selection::single(item.id);
            next.push(item);
        }

        StoreMutation::Delete { ids } => {
            let doomed: HashSet<ItemId> = ids.iter().copied().collect();
            next.retain(|i| !doomed.contains(&i.id));
            next_selection.retain(|id| !doomed.contains(&id));
        }

        StoreMutation::Duplicate { ids } => {
            // Empty list: there is no max z to stack on, and nothing to copy.
            let top = max_z(items)?;
            let originals: Vec<PlacedItem> = ids
                .iter()
                .filter_map(|id| find(items, *id))
                .cloned()
                .collect();
            if originals.is_empty() {
                return None;
            }
            let copies = stack_copies(&mut next, originals, top.saturating_add(1), ctx);
            next_selection = Selection::from_ids(copies);
        }

        StoreMutation::Paste { items: clipboard } => {
            if clipboard.is_empty() {
                return None;
            }
            let z = max_z(items).map_or(1, |top| top.saturating_add(1));
            let copies = stack_copies(&mut next, clipboard.clone(), z, ctx);
            next_selection = Selection::from_ids(copies);
        }

        StoreMutation::Update { id, patch } => {
            let item = next.iter_mut().find(|i| i.id == *id)?;
            item.apply_patch(patch);
        }

        StoreMutation::BatchUpdate { ids, patch } => {
            for item in next.iter_mut().filter(|i| ids.contains(&i.id)) {
                item.apply_patch(patch);
            }
        }

        StoreMutation::Move { id, position } => {
            let item = unlocked_mut(&mut next, *id)?;
            item.position = snap_position(&ctx.grid, *position);
        }

        StoreMutation::Resize { id, size } => {
            let item = unlocked_mut(&mut next, *id)?;
            item.size = ctx.grid.snap_size(*size).floored();
        }

        StoreMutation::SetBounds { id, position, size } => {
            let item = unlocked_mut(&mut next, *id)?;
            item.position = snap_position(&ctx.grid, *position);
            item.size = ctx.grid.snap_size(*size).floored();
        }

        StoreMutation::Translate { ids, dx, dy } => {
            for item in next
                .iter_mut()
                .filter(|i| !i.locked && ids.contains(&i.id))
            {
                item.position = snap_position(&ctx.grid, item.position.offset(*dx, *dy));
            }
        }

        StoreMutation::Reorder { id, direction } => {
            reorder(&mut next, *id, *direction)?;
        }

        StoreMutation::BringToFront { ids } => {
            let z = max_z(items)?.saturating_add(1);
            for item in next.iter_mut().filter(|i| ids.contains(&i.id)) {
                item.z_index = z;
            }
        }

        StoreMutation::SendToBack { ids } => {
            let z = min_z(items)?.saturating_sub(1);
            for item in next.iter_mut().filter(|i| ids.contains(&i.id)) {
                item.z_index = z;
            }
        }

        StoreMutation::ToggleLock { id } => {
            let item = next.iter_mut().find(|i| i.id == *id)?;
            item.locked = !item.locked;
        }

        StoreMutation::ToggleVisibility { id } => {
            let item = next.iter_mut().find(|i| i.id == *id)?;
            item.visible = !item.visible;
        }

        StoreMutation::Replace { items: replacement } => {
            next = match Document::from_items(replacement.clone()) {
                Ok(doc) => doc.into_items(),
                Err(e) => {
                    log::warn!("replace rejected: {e}");
                    return None;
                }
            };
            let present: HashSet<ItemId> = next.iter().map(|i| i.id).collect();
            next_selection.retain(|id| present.contains(&id));
        }
    }

    if let Some(bad) = next.iter().find(|i| !i.has_finite_geometry()) {
        log::warn!("{} rejected: {} has non-finite geometry", mutation.description(), bad.id);
        return None;
    }
    if next == items && next_selection == *selection {
        return None;
    }
    log::debug!(
        "{}: {} -> {} items, {} selected",
        mutation.description(),
        items.len(),
        next.len(),
        next_selection.len()
    );
    Some(Applied {
        items: next,
        selection: next_selection,
    })
}

fn snap_position(grid: &GridConfig, p: Position) -> Position {
    Position::new(grid.snap(p.x), grid.snap(p.y))
}

fn unlocked_mut(items: &mut [PlacedItem], id: ItemId) -> Option<&mut PlacedItem> {
    items.iter_mut().find(|i| i.id == id && !i.locked)
}

fn instantiate(
    items: &[PlacedItem],
    template: &Template,
    position: Position,
    ctx: &MutationContext,
) -> PlacedItem {
    let id = ItemId::mint(&template.id, ctx.now, |c| items.iter().any(|i| i.id == c));
    let z = i32::try_from(items.len()).map_or(i32::MAX, |n| n.saturating_add(1));
    PlacedItem::from_template(template, id, snap_position(&ctx.grid, position), z)
}

/// Append copies of `originals` to `list` with fresh ids, offset by the
/// duplicate offset, all at z-index `z`. Returns the new ids in order.
fn stack_copies(
    list: &mut Vec<PlacedItem>,
    originals: Vec<PlacedItem>,
    z: i32,
    ctx: &MutationContext,
) -> Vec<ItemId> {
    let mut minted = Vec::with_capacity(originals.len());
    for mut copy in originals {
        let new_id = copy
            .id
            .mint_copy(ctx.now, |c| list.iter().any(|i| i.id == c));
        copy.id = new_id;
        copy.position = copy
            .position
            .offset(ctx.duplicate_offset, ctx.duplicate_offset);
        copy.z_index = z;
        list.push(copy);
        minted.push(new_id);
    }
    minted
}

/// Swap `id` with its neighbour in paint order. Distinct z-indices are
/// swapped; equal z-indices swap list positions, which flips the tie-break.
fn reorder(items: &mut [PlacedItem], id: ItemId, direction: ZDirection) -> Option<()> {
    let order = z_sorted_indices(items);
    let rank = order.iter().position(|&i| items[i].id == id)?;
    let neighbour_rank = match direction {
        ZDirection::Up => rank.checked_add(1).filter(|r| *r < order.len())?,
        ZDirection::Down => rank.checked_sub(1)?,
    };
    let (a, b) = (order[rank], order[neighbour_rank]);
    if items[a].z_index == items[b].z_index {
        items.swap(a, b);
    } else {
        let za = items[a].z_index;
        items[a].z_index = items[b].z_index;
        items[b].z_index = za;
    }
    Some(())
}

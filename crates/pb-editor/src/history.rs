//! Linear undo/redo history over full snapshots of the item list.
//!
//! Every accepted mutation pushes a deep copy of the list. The sequence is
//! index-addressed with a `current` pointer; undo/redo only move the pointer
//! and hand back the snapshot the caller should restore.
//!
//! Pointer gestures use **batching**: the list is mutated live on every
//! pointer sample, but only one snapshot is pushed when the outermost batch
//! closes, so a whole drag undoes in a single step.

use pb_core::config::DEFAULT_HISTORY_DEPTH;
use pb_core::model::PlacedItem;
use serde::Serialize;

/// A deep copy of the item list plus its creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub items: Vec<PlacedItem>,
    pub timestamp: u64,
}

/// Summary for toolbars and debugging overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryInfo {
    pub total_states: usize,
    pub current_index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub max_size: usize,
}

pub struct History {
    snapshots: Vec<Snapshot>,
    current: usize,
    max_size: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether anything changed during the current batch.
    batch_dirty: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// Empty history keeping at most `max_size` snapshots.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            snapshots: Vec::with_capacity(max_size),
            current: 0,
            max_size,
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// History seeded with one snapshot of `items`.
    pub fn with_initial(items: &[PlacedItem], now: u64, max_size: usize) -> Self {
        let mut history = Self::new(max_size);
        history.push(items, now);
        history
    }

    /// Record a snapshot of `items`.
    ///
    /// Drops any redo branch after the pointer, appends, trims the oldest
    /// snapshots beyond `max_size`, and leaves the pointer on the newest.
    pub fn push(&mut self, items: &[PlacedItem], now: u64) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.current + 1);
        }
        self.snapshots.push(Snapshot {
            items: items.to_vec(),
            timestamp: now,
        });
        if self.snapshots.len() > self.max_size {
            let excess = self.snapshots.len() - self.max_size;
            self.snapshots.drain(..excess);
        }
        self.current = self.snapshots.len() - 1;
        log::trace!("history push: {}/{}", self.current + 1, self.snapshots.len());
    }

    /// Step back. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        self.snapshots.get(self.current)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the tail.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        self.snapshots.get(self.current)
    }

    /// Collapse the history to the current snapshot.
    pub fn clear(&mut self) {
        if self.snapshots.is_empty() {
            return;
        }
        let keep = self.snapshots.swap_remove(self.current);
        self.snapshots.clear();
        self.snapshots.push(keep);
        self.current = 0;
    }

    /// Drop everything and start over from `items`.
    pub fn reset(&mut self, items: &[PlacedItem], now: u64) {
        self.snapshots.clear();
        self.current = 0;
        self.batch_depth = 0;
        self.batch_dirty = false;
        self.push(items, now);
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.current)
    }

    /// Items of the current snapshot (empty when nothing was pushed).
    pub fn current_items(&self) -> &[PlacedItem] {
        self.current().map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn info(&self) -> HistoryInfo {
        HistoryInfo {
            total_states: self.snapshots.len(),
            current_index: self.current,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            max_size: self.max_size,
        }
    }

    // ─── Batching ────────────────────────────────────────────────────────

    /// Start a batch group. Mutations until the matching `end_batch` are
    /// applied live by the caller and recorded as one step.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Note that the live list changed inside the current batch.
    pub fn mark_dirty(&mut self) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Close a batch group. When the outermost batch closes and something
    /// changed, push one snapshot of `items`. Returns true if it pushed.
    pub fn end_batch(&mut self, items: &[PlacedItem], now: u64) -> bool {
        if self.batch_depth == 0 {
            return false;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }
        let dirty = std::mem::take(&mut self.batch_dirty);
        if dirty && self.current_items() != items {
            self.push(items, now);
            return true;
        }
        false
    }
}

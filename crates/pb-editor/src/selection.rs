//! Ordered, duplicate-free set of selected item ids.

use pb_core::id::ItemId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(SmallVec<[ItemId; 4]>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: ItemId) -> Self {
        let mut s = Self::new();
        s.0.push(id);
        s
    }

    /// Build from ids, dropping repeats (first occurrence wins).
    pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        let mut s = Self::new();
        for id in ids {
            s.insert(id);
        }
        s
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.0.contains(&id)
    }

    /// The selected id when exactly one item is selected.
    pub fn only(&self) -> Option<ItemId> {
        match self.0.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// Add `id` if absent. Returns true when the selection changed.
    pub fn insert(&mut self, id: ItemId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Ctrl/Cmd-click semantics: add if absent, remove if present.
    pub fn toggle(&mut self, id: ItemId) {
        if let Some(pos) = self.0.iter().position(|s| *s == id) {
            self.0.remove(pos);
        } else {
            self.0.push(id);
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) {
        self.0.retain(|id| keep(*id));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<ItemId> for Selection {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self::from_ids(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let a = ItemId::intern("sel_a");
        let b = ItemId::intern("sel_b");
        let mut s = Selection::single(a);
        s.toggle(b);
        assert_eq!(s.ids(), &[a, b]);
        s.toggle(a);
        assert_eq!(s.ids(), &[b]);
        assert_eq!(s.only(), Some(b));
    }

    #[test]
    fn from_ids_dedups() {
        let a = ItemId::intern("sel_dup");
        let s = Selection::from_ids([a, a, a]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn serializes_as_id_array() {
        let s = Selection::from_ids([ItemId::intern("sel_x"), ItemId::intern("sel_y")]);
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"["sel_x","sel_y"]"#);
    }
}

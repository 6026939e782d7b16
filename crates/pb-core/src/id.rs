use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for item IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for placed items.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
///
/// The token itself is opaque to the editor; hosts mint it from a
/// template id plus a timestamp (`paragraph_1718000000000`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Spur);

impl ItemId {
    /// Intern a string as an ItemId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ItemId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Mint `{base}_{now}`, appending `_2`, `_3`, … until `taken` rejects
    /// the candidate. Two mints in the same millisecond never collide.
    pub fn mint(base: &str, now: u64, taken: impl Fn(ItemId) -> bool) -> Self {
        let first = Self::intern(&format!("{base}_{now}"));
        if !taken(first) {
            return first;
        }
        let mut n = 2u32;
        loop {
            let candidate = Self::intern(&format!("{base}_{now}_{n}"));
            if !taken(candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Mint an id for a copy of `self` (`{id}_copy_{now}`).
    pub fn mint_copy(&self, now: u64, taken: impl Fn(ItemId) -> bool) -> Self {
        Self::mint(&format!("{}_copy", self.as_str()), now, taken)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ItemId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ItemId::intern("heading_42");
        let b = ItemId::intern("heading_42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "heading_42");
    }

    #[test]
    fn mint_uses_template_and_timestamp() {
        let id = ItemId::mint("paragraph", 1000, |_| false);
        assert_eq!(id.as_str(), "paragraph_1000");
    }

    #[test]
    fn mint_skips_taken_ids() {
        let taken = [ItemId::intern("image_5"), ItemId::intern("image_5_2")];
        let id = ItemId::mint("image", 5, |c| taken.contains(&c));
        assert_eq!(id.as_str(), "image_5_3");
    }

    #[test]
    fn mint_copy_suffix() {
        let src = ItemId::intern("map_7");
        let copy = src.mint_copy(9, |_| false);
        assert_eq!(copy.as_str(), "map_7_copy_9");
    }
}

//! Order id → order handle lookup.
//!
//! Open addressing over a power-of-two table: the home slot is `id & mask`
//! and collisions probe linearly. Deletion shifts later entries of the probe
//! chain back into the hole instead of leaving tombstones, so lookups stay
//! short under heavy add/cancel churn. The table never resizes; the book sizes
//! it larger than the order pool so it always keeps at least one empty slot.

use crate::order::OrderKey;
use crate::types::OrderId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: OrderId,
    key: OrderKey,
}

#[derive(Debug)]
pub struct OrderIndex {
    slots: Box<[Option<Entry>]>,
    mask: u64,
    len: usize,
}

impl OrderIndex {
    /// `capacity` must be a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            mask: capacity as u64 - 1,
            len: 0,
        }
    }

    #[inline]
    fn home(&self, id: OrderId) -> usize {
        (id.0 & self.mask) as usize
    }

    #[inline]
    fn step(&self, slot: usize) -> usize {
        (slot + 1) & self.mask as usize
    }

    /// Slot currently holding `id`, if any.
    #[inline]
    fn position(&self, id: OrderId) -> Option<usize> {
        let mut slot = self.home(id);
        while let Some(entry) = &self.slots[slot] {
            if entry.id == id {
                return Some(slot);
            }
            slot = self.step(slot);
        }
        None
    }

    /// Associates `id` with `key`, replacing any previous association.
    pub fn insert(&mut self, id: OrderId, key: OrderKey) {
        let mut slot = self.home(id);
        loop {
            match self.slots[slot] {
                Some(entry) if entry.id == id => {
                    self.slots[slot] = Some(Entry { id, key });
                    return;
                }
                Some(_) => slot = self.step(slot),
                None => {
                    self.slots[slot] = Some(Entry { id, key });
                    self.len += 1;
                    return;
                }
            }
        }
    }

    #[inline]
    pub fn find(&self, id: OrderId) -> Option<OrderKey> {
        self.position(id).and_then(|slot| self.slots[slot].map(|e| e.key))
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.position(id).is_some()
    }

    /// Removes `id` if present and repairs the probe chain behind it.
    pub fn erase(&mut self, id: OrderId) -> Option<OrderKey> {
        let mut hole = self.position(id)?;
        let removed = self.slots[hole].take().map(|e| e.key);
        self.len -= 1;

        let mask = self.mask as usize;
        let mut slot = hole;
        loop {
            slot = self.step(slot);
            let Some(entry) = self.slots[slot] else {
                break;
            };
            // The entry may fill the hole only if the hole lies on its probe
            // path, i.e. cyclically within [home, slot).
            let home = self.home(entry.id);
            let from_home = slot.wrapping_sub(home) & mask;
            let from_hole = slot.wrapping_sub(hole) & mask;
            if from_home >= from_hole {
                self.slots[hole] = self.slots[slot].take();
                hole = slot;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolKey;

    fn key(n: usize) -> OrderKey {
        OrderKey::from_slot(n)
    }

    /// Every entry must be reachable from its home slot without crossing an empty slot.
    fn assert_chains_intact(index: &OrderIndex) {
        for (slot, entry) in index.slots.iter().enumerate() {
            if let Some(entry) = entry {
                let mut probe = index.home(entry.id);
                while probe != slot {
                    assert!(
                        index.slots[probe].is_some(),
                        "gap at {} before id {} in slot {}",
                        probe,
                        entry.id.0,
                        slot
                    );
                    probe = index.step(probe);
                }
            }
        }
    }

    #[test]
    fn insert_find_erase() {
        let mut index = OrderIndex::with_capacity(16);
        index.insert(OrderId(1), key(10));
        index.insert(OrderId(2), key(20));
        assert_eq!(index.find(OrderId(1)), Some(key(10)));
        assert_eq!(index.find(OrderId(2)), Some(key(20)));
        assert_eq!(index.find(OrderId(3)), None);
        assert_eq!(index.len(), 2);

        assert_eq!(index.erase(OrderId(1)), Some(key(10)));
        assert_eq!(index.find(OrderId(1)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn insert_overwrites_existing_id() {
        let mut index = OrderIndex::with_capacity(8);
        index.insert(OrderId(5), key(1));
        index.insert(OrderId(5), key(2));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(OrderId(5)), Some(key(2)));
    }

    #[test]
    fn erase_missing_is_noop() {
        let mut index = OrderIndex::with_capacity(8);
        index.insert(OrderId(1), key(1));
        assert_eq!(index.erase(OrderId(9)), None);
        assert_eq!(index.erase(OrderId(9)), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn erase_shifts_colliding_entries_back() {
        let mut index = OrderIndex::with_capacity(8);
        // 1, 9 and 17 all hash to slot 1.
        index.insert(OrderId(1), key(1));
        index.insert(OrderId(9), key(9));
        index.insert(OrderId(17), key(17));
        index.erase(OrderId(1));
        assert_chains_intact(&index);
        assert_eq!(index.find(OrderId(9)), Some(key(9)));
        assert_eq!(index.find(OrderId(17)), Some(key(17)));
        assert_eq!(index.slots[1].map(|e| e.id), Some(OrderId(9)));
    }

    #[test]
    fn erase_continues_past_entries_at_home() {
        let mut index = OrderIndex::with_capacity(8);
        // 1, 9 and 17 share home slot 1; 3 sits at its own home between them.
        index.insert(OrderId(1), key(1));
        index.insert(OrderId(9), key(9));
        index.insert(OrderId(3), key(3));
        index.insert(OrderId(17), key(17));
        index.erase(OrderId(9));
        assert_chains_intact(&index);
        assert_eq!(index.slots[2].map(|e| e.id), Some(OrderId(17)));
        assert_eq!(index.slots[3].map(|e| e.id), Some(OrderId(3)));
        for id in [1u64, 3, 17] {
            assert_eq!(index.find(OrderId(id)), Some(key(id as usize)));
        }
    }

    #[test]
    fn erase_repairs_chain_across_wraparound() {
        let mut index = OrderIndex::with_capacity(8);
        // 7, 15 and 23 hash to slot 7 and wrap into 0 and 1.
        index.insert(OrderId(7), key(7));
        index.insert(OrderId(15), key(15));
        index.insert(OrderId(23), key(23));
        index.insert(OrderId(0), key(0));
        index.erase(OrderId(7));
        assert_chains_intact(&index);
        for id in [0u64, 15, 23] {
            assert_eq!(index.find(OrderId(id)), Some(key(id as usize)));
        }
    }

    #[test]
    fn churn_keeps_every_live_id_reachable() {
        let mut index = OrderIndex::with_capacity(64);
        let mut live = std::collections::BTreeSet::new();
        // Deterministic scramble with many collisions on a small table.
        let mut x: u64 = 0x9E37_79B9;
        for step in 0..5_000u64 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let id = x % 200;
            if live.contains(&id) && step % 3 != 0 {
                index.erase(OrderId(id));
                live.remove(&id);
            } else if live.len() < 48 {
                index.insert(OrderId(id), key(id as usize));
                live.insert(id);
            }
        }
        assert_chains_intact(&index);
        assert_eq!(index.len(), live.len());
        for id in 0..200u64 {
            assert_eq!(index.contains(OrderId(id)), live.contains(&id));
        }
    }
}

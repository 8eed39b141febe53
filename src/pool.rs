//! Fixed-capacity record pools.
//!
//! A [`Pool`] reserves all of its storage once, at construction, and hands out
//! slots addressed by a typed handle. Released slots go back on the free list
//! and are reused by the next [`Pool::acquire`]; the pool never grows past its
//! capacity, so the backing `Slab` never reallocates.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::error::BookError;

/// Typed handle into a [`Pool`].
pub trait PoolKey: Copy {
    fn from_slot(slot: usize) -> Self;
    fn slot(self) -> usize;
}

/// Capacity-checked arena of `T` records addressed by `K`.
#[derive(Debug)]
pub struct Pool<K, T> {
    name: &'static str,
    slots: Slab<T>,
    capacity: usize,
    _key: PhantomData<K>,
}

impl<K: PoolKey, T> Pool<K, T> {
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            slots: Slab::with_capacity(capacity),
            capacity,
            _key: PhantomData,
        }
    }

    /// Stores `record` in a free slot.
    ///
    /// Returns [`BookError::PoolExhausted`] when every slot is live.
    #[inline]
    pub fn acquire(&mut self, record: T) -> Result<K, BookError> {
        if self.slots.len() >= self.capacity {
            return Err(BookError::PoolExhausted {
                pool: self.name,
                capacity: self.capacity,
            });
        }
        Ok(K::from_slot(self.slots.insert(record)))
    }

    /// Returns the slot to the free list. Any copy of `key` is stale afterwards.
    #[inline]
    pub fn release(&mut self, key: K) -> Option<T> {
        self.slots.try_remove(key.slot())
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key.slot())
    }

    pub fn live(&self) -> usize {
        self.slots.len()
    }

    pub fn free(&self) -> usize {
        self.capacity - self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }
}

impl<K: PoolKey, T> Index<K> for Pool<K, T> {
    type Output = T;

    #[inline]
    fn index(&self, key: K) -> &T {
        &self.slots[key.slot()]
    }
}

impl<K: PoolKey, T> IndexMut<K> for Pool<K, T> {
    #[inline]
    fn index_mut(&mut self, key: K) -> &mut T {
        &mut self.slots[key.slot()]
    }
}

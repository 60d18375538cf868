// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage.
//!
//! Bitmaps, textures and containers live in [`Arena`]s and are referenced
//! through handles carrying a slot index and a generation counter. Removing
//! an entry bumps its slot's generation, so stale handles are detected rather
//! than silently aliasing whatever reuses the slot.

use core::fmt;
use core::marker::PhantomData;

/// A typed handle into an [`Arena<T>`].
pub struct Key<T> {
    idx: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.generation == other.generation
    }
}

impl<T> Eq for Key<T> {}

impl<T> core::hash::Hash for Key<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}@gen{})", self.idx, self.generation)
    }
}

/// Slot storage with a free list and per-slot generations.
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len())
            .field("capacity", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Inserts a value, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> Key<T> {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(value);
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            assert!(idx != u32::MAX, "arena slot count overflow");
            self.slots.push(Some(value));
            self.generation.push(0);
            idx
        };
        Key {
            idx,
            generation: self.generation[idx as usize],
            _marker: PhantomData,
        }
    }

    /// Removes and returns the value for `key`, or `None` if the handle is
    /// stale.
    pub fn remove(&mut self, key: Key<T>) -> Option<T> {
        if !self.contains(key) {
            return None;
        }
        let value = self.slots[key.idx as usize].take();
        self.generation[key.idx as usize] = self.generation[key.idx as usize].wrapping_add(1);
        self.free_list.push(key.idx);
        value
    }

    /// Returns whether `key` refers to a live entry.
    #[must_use]
    pub fn contains(&self, key: Key<T>) -> bool {
        (key.idx as usize) < self.slots.len()
            && self.generation[key.idx as usize] == key.generation
            && self.slots[key.idx as usize].is_some()
    }

    /// Shared access to the entry for `key`.
    #[must_use]
    pub fn get(&self, key: Key<T>) -> Option<&T> {
        if self.generation.get(key.idx as usize) != Some(&key.generation) {
            return None;
        }
        self.slots[key.idx as usize].as_ref()
    }

    /// Exclusive access to the entry for `key`.
    #[must_use]
    pub fn get_mut(&mut self, key: Key<T>) -> Option<&mut T> {
        if self.generation.get(key.idx as usize) != Some(&key.generation) {
            return None;
        }
        self.slots[key.idx as usize].as_mut()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns `true` if the arena holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over live entries with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Key<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|v| {
                (
                    Key {
                        idx: i as u32,
                        generation: self.generation[i],
                        _marker: PhantomData,
                    },
                    v,
                )
            })
        })
    }

    /// Iterates mutably over live entries.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handles_are_rejected() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b");
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.remove(a), None);
    }

    #[test]
    fn len_tracks_live_entries() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let _b = arena.insert(2);
        assert_eq!(arena.len(), 2);
        arena.remove(a);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![2]);
    }
}

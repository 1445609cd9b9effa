use alloc::collections::BTreeMap;

use crate::IndexRange;
use crate::key::{ItemIndexMap, ItemKey};

/// A map from positions to `(item, value)` pairs, with reverse lookup from item to positions.
///
/// Items are compared by value, not identity. Two equal items shown at different indexes are
/// both kept: the reverse side maps an item to the *set* of indexes showing it, so duplicates
/// never collapse into a single slot.
///
/// Invariants (checked by [`IndexBiMap::is_valid`]):
/// - at most one entry per index;
/// - every index in the reverse side maps back to a forward entry holding an equal item;
/// - every forward entry is listed exactly once on the reverse side.
#[derive(Clone, Debug)]
pub struct IndexBiMap<K, V> {
    by_index: BTreeMap<usize, (K, V)>,
    by_key: ItemIndexMap<K>,
}

impl<K: ItemKey + Clone, V> Default for IndexBiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ItemKey + Clone, V> IndexBiMap<K, V> {
    pub fn new() -> Self {
        Self {
            by_index: BTreeMap::new(),
            by_key: ItemIndexMap::<K>::default(),
        }
    }

    /// Inserts or overwrites the slot at `index`, returning the previous occupant.
    pub fn put(&mut self, index: usize, key: K, val: V) -> Option<(K, V)> {
        let prev = self.by_index.insert(index, (key.clone(), val));
        if let Some((old_key, _)) = &prev {
            self.unlink(old_key, index);
        }
        self.by_key.entry(key).or_default().insert(index);
        prev
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.by_index.get(&index).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.by_index.get_mut(&index).map(|(_, v)| v)
    }

    pub fn entry(&self, index: usize) -> Option<(&K, &V)> {
        self.by_index.get(&index).map(|(k, v)| (k, v))
    }

    pub fn key(&self, index: usize) -> Option<&K> {
        self.by_index.get(&index).map(|(k, _)| k)
    }

    /// Ascending indexes currently showing `key`.
    pub fn indices_of<'a>(&'a self, key: &K) -> impl Iterator<Item = usize> + 'a {
        self.by_key.get(key).into_iter().flatten().copied()
    }

    /// Values of every slot showing `key`, by ascending index.
    pub fn get_by_key<'a>(&'a self, key: &K) -> impl Iterator<Item = &'a V> + 'a {
        self.indices_of(key).filter_map(|i| self.get(i))
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.by_index.contains_key(&index)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.by_key.get(key).is_some_and(|set| !set.is_empty())
    }

    /// Removes the slot at `index`. Absent indexes are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<(K, V)> {
        let (key, val) = self.by_index.remove(&index)?;
        self.unlink(&key, index);
        Some((key, val))
    }

    /// Removes the lowest index showing `key`.
    pub fn remove_by_key(&mut self, key: &K) -> Option<(usize, V)> {
        let index = self.indices_of(key).next()?;
        self.remove(index).map(|(_, v)| (index, v))
    }

    /// Removes the index showing `key` that is closest to `target` (lower index on ties).
    pub fn remove_nearest(&mut self, key: &K, target: usize) -> Option<(usize, V)> {
        let set = self.by_key.get(key)?;
        let below = set.range(..=target).next_back().copied();
        let above = set.range(target..).next().copied();
        let index = match (below, above) {
            (Some(b), Some(a)) => {
                if target - b <= a - target {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
        self.remove(index).map(|(_, v)| (index, v))
    }

    pub fn pop_first(&mut self) -> Option<(usize, K, V)> {
        let (index, (key, val)) = self.by_index.pop_first()?;
        self.unlink(&key, index);
        Some((index, key, val))
    }

    pub fn pop_last(&mut self) -> Option<(usize, K, V)> {
        let (index, (key, val)) = self.by_index.pop_last()?;
        self.unlink(&key, index);
        Some((index, key, val))
    }

    pub fn first_index(&self) -> Option<usize> {
        self.by_index.keys().next().copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.by_index.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_index.clear();
        self.by_key.clear();
    }

    /// Entries by ascending index.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &K, &V)> + '_ {
        self.by_index.iter().map(|(&i, (k, v))| (i, k, v))
    }

    /// Entries by ascending index, with mutable values. Items stay immutable so the reverse side
    /// cannot go stale.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (usize, &K, &mut V)> + '_ {
        self.by_index.iter_mut().map(|(&i, (k, v))| (i, &*k, v))
    }

    pub fn indices(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.by_index.keys().copied()
    }

    /// Occupied indexes inside `range`, ascending.
    pub fn indices_in(&self, range: IndexRange) -> impl DoubleEndedIterator<Item = usize> + '_ {
        range
            .first()
            .zip(range.last())
            .into_iter()
            .flat_map(move |(s, e)| self.by_index.range(s..=e).map(|(&i, _)| i))
    }

    /// Moves every entry at `index >= from` to `index + delta`.
    ///
    /// This is how insertions (`delta > 0`) and removals (`delta < 0`, after the removed slots
    /// have been taken out) are applied to a live map.
    ///
    /// # Panics
    /// If an entry would move below zero or onto an occupied index. Both mean the caller's change
    /// bookkeeping is wrong.
    pub fn shift_from(&mut self, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let moved = self.by_index.split_off(&from);
        for (&index, (key, _)) in &moved {
            self.unlink(key, index);
        }
        for (index, (key, val)) in moved {
            let Some(target) = index.checked_add_signed(delta) else {
                panic!("shift_from: index {index} shifted by {delta} leaves the index space");
            };
            assert!(
                !self.by_index.contains_key(&target),
                "shift_from: index {index} shifted by {delta} collides with a live entry"
            );
            self.put(target, key, val);
        }
    }

    /// Removes every entry, by ascending index.
    pub fn drain(&mut self) -> impl Iterator<Item = (usize, K, V)> + use<K, V> {
        self.by_key.clear();
        core::mem::take(&mut self.by_index)
            .into_iter()
            .map(|(i, (k, v))| (i, k, v))
    }

    /// Checks the forward and reverse sides against each other.
    pub fn is_valid(&self) -> bool {
        let mut listed = 0usize;
        for (key, set) in self.by_key.iter() {
            if set.is_empty() {
                return false;
            }
            for index in set {
                match self.by_index.get(index) {
                    Some((k, _)) if k == key => listed += 1,
                    _ => return false,
                }
            }
        }
        listed == self.by_index.len()
    }

    fn unlink(&mut self, key: &K, index: usize) {
        let now_empty = match self.by_key.get_mut(key) {
            Some(set) => {
                set.remove(&index);
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_key.remove(key);
        }
    }
}

impl<K: ItemKey + Clone, V> FromIterator<(usize, K, V)> for IndexBiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (usize, K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (index, key, val) in iter {
            map.put(index, key, val);
        }
        map
    }
}

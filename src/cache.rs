use std::cell::Cell;

use crate::utils::MyHash;

/// Direct-mapped operation cache of size `2^bits`.
///
/// A newer entry evicts whatever occupied its slot.
pub struct Cache<K, V> {
    data: Vec<Option<(K, V)>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// Create a new cache of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1usize << bits;
        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask: (size - 1) as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    fn index(&self, key: &K) -> usize
    where
        K: MyHash,
    {
        (key.hash() & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: MyHash + Eq,
    {
        match &self.data[self.index(key)] {
            Some((k, v)) if k == key => {
                self.hits.set(self.hits.get() + 1);
                Some(v)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: MyHash,
    {
        let index = self.index(&key);
        self.data[index] = Some((key, value));
    }
}

use crate::stats::ShardStats;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::hash::Hash;

/// A single shard containing a HashMap protected by a read-write lock.
///
/// Every accessor takes a scoped guard, so the lock is released on all exit
/// paths, including a visitor stopping early or panicking.
pub(crate) struct Shard<K, V> {
    map: RwLock<HashMap<K, V>>,
    stats: ShardStats,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::from_map(HashMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_map(HashMap::with_capacity(capacity))
    }

    pub fn from_map(map: HashMap<K, V>) -> Self {
        Self {
            map: RwLock::new(map),
            stats: ShardStats::new(),
        }
    }

    /// Shared lock over the entries.
    ///
    /// Recursive: a thread that already holds a shared guard on this shard
    /// (a `range` visitor, an `equal_func` predicate) can take another one
    /// even while a writer is queued.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.stats.record_lock_acquisition();
        self.map.read_recursive()
    }

    /// Exclusive lock over the entries.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.stats.record_lock_acquisition();
        self.map.write()
    }

    /// Copy a value out by key.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let result = self.read().get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    /// Insert or overwrite.
    pub fn set(&self, key: K, value: V) {
        self.write().insert(key, value);
        self.stats.record_write();
    }

    /// Remove a key if present.
    pub fn delete(&self, key: &K) {
        if self.write().remove(key).is_some() {
            self.stats.record_remove();
        }
    }

    /// Copy every entry into an independent map under one shared lock.
    pub fn snapshot(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.read().clone()
    }

    /// Visit entries under the shared lock until `visitor` returns `false`.
    ///
    /// Returns `false` if the visitor stopped the traversal.
    pub fn for_each<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let map = self.read();
        map.iter().all(|(k, v)| visitor(k, v))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> crate::stats::ShardOps {
        self.stats.snapshot()
    }
}

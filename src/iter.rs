use crate::shard::Shard;
use hashbrown::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

/// Shard-by-shard cursor shared by [`Iter`], [`Keys`] and [`Values`].
///
/// When the cursor reaches a shard it copies what it needs under that
/// shard's read lock, releases the lock, and then yields from the copy. A
/// live iterator therefore never holds a lock between calls to `next`.
struct ShardCursor<'a, K, V, T> {
    shards: &'a [Shard<K, V>],
    current_shard: usize,
    buffer: std::vec::IntoIter<T>,
    extract: fn(&HashMap<K, V>) -> Vec<T>,
}

impl<'a, K, V, T> ShardCursor<'a, K, V, T>
where
    K: Hash + Eq,
{
    fn new(shards: &'a [Shard<K, V>], extract: fn(&HashMap<K, V>) -> Vec<T>) -> Self {
        Self {
            shards,
            current_shard: 0,
            buffer: Vec::new().into_iter(),
            extract,
        }
    }

    /// Load the next non-empty shard. Returns `false` once every shard is done.
    fn fill_buffer(&mut self) -> bool {
        while self.current_shard < self.shards.len() {
            let entries = {
                let guard = self.shards[self.current_shard].read();
                (self.extract)(&*guard)
            };
            self.current_shard += 1;

            if !entries.is_empty() {
                self.buffer = entries.into_iter();
                return true;
            }
        }
        false
    }

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(item);
            }
            if !self.fill_buffer() {
                return None;
            }
        }
    }
}

/// Lazy iterator over `(key, value)` pairs, created by
/// [`ConcurrentMap::iter`](crate::ConcurrentMap::iter).
///
/// Each shard is copied atomically when reached; shards not yet reached may
/// reflect writes made after the iterator was created.
pub struct Iter<'a, K, V> {
    cursor: ShardCursor<'a, K, V, (K, V)>,
}

impl<'a, K, V> Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn new(shards: &'a [Shard<K, V>]) -> Self {
        Self {
            cursor: ShardCursor::new(shards, |map| {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }),
        }
    }
}

impl<K, V> Iterator for Iter<'_, K, V>
where
    K: Hash + Eq,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<K: Hash + Eq, V> FusedIterator for Iter<'_, K, V> {}

/// Lazy iterator over keys, created by
/// [`ConcurrentMap::keys`](crate::ConcurrentMap::keys).
pub struct Keys<'a, K, V> {
    cursor: ShardCursor<'a, K, V, K>,
}

impl<'a, K, V> Keys<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(shards: &'a [Shard<K, V>]) -> Self {
        Self {
            cursor: ShardCursor::new(shards, |map| map.keys().cloned().collect()),
        }
    }
}

impl<K, V> Iterator for Keys<'_, K, V>
where
    K: Hash + Eq,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<K: Hash + Eq, V> FusedIterator for Keys<'_, K, V> {}

/// Lazy iterator over values, created by
/// [`ConcurrentMap::values`](crate::ConcurrentMap::values).
pub struct Values<'a, K, V> {
    cursor: ShardCursor<'a, K, V, V>,
}

impl<'a, K, V> Values<'a, K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub(crate) fn new(shards: &'a [Shard<K, V>]) -> Self {
        Self {
            cursor: ShardCursor::new(shards, |map| map.values().cloned().collect()),
        }
    }
}

impl<K, V> Iterator for Values<'_, K, V>
where
    K: Hash + Eq,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<K: Hash + Eq, V> FusedIterator for Values<'_, K, V> {}

use crate::config::{create_hasher, Config, RoutingConfig};
use crate::error::Error;
use crate::hash::ShardHasher;
use crate::iter::{Iter, Keys, Values};
use crate::shard::Shard;
use crate::stats::{ShardOps, Stats};
use hashbrown::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-instance ids, used to order lock acquisition across maps.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

/// Concurrent key-value map split into independently locked shards.
///
/// Each key is routed to exactly one shard by hashing it with the key's own
/// [`Hash`] impl, so keys that compare equal always land in the same shard.
/// Operations on keys in different shards never contend for a lock.
///
/// # Consistency
///
/// Single-key operations (`get`, `set`, `delete`) lock exactly one shard and
/// are linearizable per key. Whole-map operations (`range`, `iter`, `keys`,
/// `values`, `collect`, `clone`, `len`) visit the shards one at a time in
/// index order and are atomic *per shard only*: a shard not yet visited may
/// reflect writes made after the traversal started, and a shard already
/// visited will not reflect later writes.
///
/// # Example
///
/// ```rust
/// use concmap::ConcurrentMap;
///
/// let map = ConcurrentMap::new();
/// map.set("key1", 1);
/// map.set("key1", 2);
///
/// assert_eq!(map.get(&"key1"), Some(2));
/// map.delete(&"key1");
/// assert_eq!(map.get(&"key1"), None);
/// ```
pub struct ConcurrentMap<K, V> {
    shards: Vec<Shard<K, V>>,
    hash: ShardHasher,
    routing: RoutingConfig,
    id: u64,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    /// Create a new map with defaults (16 shards, ahash).
    pub fn new() -> Self {
        Self::build(Config::default())
    }

    /// Create a new map with `shard_count` shards and default hashing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use concmap::{ConcurrentMap, Error};
    ///
    /// let map = ConcurrentMap::<u32, u32>::with_shard_count(12)?;
    /// assert_eq!(map.shard_count(), 12);
    /// assert!(ConcurrentMap::<u32, u32>::with_shard_count(0).is_err());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_shard_count(shard_count: usize) -> Result<Self, Error> {
        Self::with_config(Config::default().shard_count(shard_count)?)
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        if config.shard_count == 0 {
            return Err(Error::InvalidShardCount);
        }
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        let shards = (0..config.shard_count)
            .map(|_| match config.capacity_per_shard {
                Some(capacity) => Shard::with_capacity(capacity),
                None => Shard::new(),
            })
            .collect();
        let map = Self::from_parts(shards, create_hasher(config.hash_function), config.routing);
        tracing::debug!(
            id = map.id,
            shard_count = config.shard_count,
            hash_function = ?config.hash_function,
            routing = ?map.routing,
            "created concurrent map"
        );
        map
    }

    fn from_parts(shards: Vec<Shard<K, V>>, hash: ShardHasher, routing: RoutingConfig) -> Self {
        Self {
            shards,
            hash,
            routing,
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[inline]
    fn shard_index(&self, key: &K) -> usize {
        let hash = self.hash.hash_key(key);
        self.routing.route(hash, self.shards.len())
    }

    #[inline]
    fn shard(&self, key: &K) -> &Shard<K, V> {
        &self.shards[self.shard_index(key)]
    }

    /// Get a copy of the value stored for `key`.
    ///
    /// `None` means the key is absent; absence is never an error.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard(key).get(key)
    }

    /// Whether `key` currently has a value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.shard(key).contains_key(key)
    }

    /// Insert or overwrite the value for `key`. The last write wins.
    pub fn set(&self, key: K, value: V) {
        self.shard(&key).set(key, value)
    }

    /// Remove `key`. Does nothing if the key is absent.
    pub fn delete(&self, key: &K) {
        self.shard(key).delete(key)
    }

    /// Visit every entry until `visitor` returns `false`.
    ///
    /// Shards are visited in index order, each under its own read lock, which
    /// is released before the next shard is locked. Returning `false` stops
    /// the whole traversal immediately.
    ///
    /// The visitor runs while a shard's read lock is held. Reading from this
    /// map inside the visitor (`get`, `contains_key`, `len`, ...) is fine,
    /// but writing to it (`set`, `delete`) deadlocks once the write lands on
    /// the shard being visited.
    ///
    /// # Example
    ///
    /// ```rust
    /// use concmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("a", 1);
    /// map.set("b", 2);
    ///
    /// let mut sum = 0;
    /// map.range(|_, v| {
    ///     sum += *v;
    ///     true
    /// });
    /// assert_eq!(sum, 3);
    /// ```
    pub fn range<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for shard in &self.shards {
            if !shard.for_each(&mut visitor) {
                return;
            }
        }
    }

    /// Lazy iterator over copies of all `(key, value)` pairs.
    ///
    /// Every call starts a fresh pass. No lock is held between calls to
    /// `next`; each shard is copied under its read lock when reached, with the
    /// same per-shard consistency as [`range`](Self::range).
    pub fn iter(&self) -> Iter<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        Iter::new(&self.shards)
    }

    /// Lazy iterator over copies of all keys.
    pub fn keys(&self) -> Keys<'_, K, V>
    where
        K: Clone,
    {
        Keys::new(&self.shards)
    }

    /// Lazy iterator over copies of all values.
    pub fn values(&self) -> Values<'_, K, V>
    where
        V: Clone,
    {
        Values::new(&self.shards)
    }

    /// Copy the whole map into a plain `HashMap`.
    ///
    /// Under concurrent writers the result is consistent per shard, not a
    /// single point-in-time view of the whole map.
    pub fn collect(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().collect()
    }

    /// `set` every pair in the order the iterator yields them.
    ///
    /// Not transactional: concurrent readers may observe a prefix of the
    /// pairs, and a producer that stops early leaves only that prefix applied.
    pub fn insert_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.set(key, value);
        }
    }

    /// Structural equality with a caller-supplied value comparison.
    ///
    /// For each shard index the matching shards of both maps are read-locked
    /// together, compared, and released before the next index. Locks are
    /// always taken in instance-creation order, so `a.equal_func(&b, ..)` and
    /// `b.equal_func(&a, ..)` can run concurrently without deadlocking.
    ///
    /// Maps with a different layout (shard count, hash function or router)
    /// compare unequal regardless of content.
    ///
    /// `eq` runs while both shards are read-locked; like a `range` visitor it
    /// may read from either map but must not write to them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use concmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("a", 1.0_f64);
    /// let copy = map.clone();
    /// copy.set("a", 1.0 + 1e-12);
    ///
    /// assert!(map.equal_func(&copy, |a, b| (a - b).abs() < 1e-9));
    /// assert!(!map.equal_func(&copy, |a, b| a == b));
    /// ```
    pub fn equal_func<F>(&self, other: &ConcurrentMap<K, V>, mut eq: F) -> bool
    where
        F: FnMut(&V, &V) -> bool,
    {
        if self.id == other.id {
            // One lock per shard.
            return self.shards.iter().all(|shard| {
                let map = shard.read();
                map.values().all(|v| eq(v, v))
            });
        }

        if !self.same_layout(other) {
            tracing::trace!(
                left = self.id,
                right = other.id,
                left_shards = self.shards.len(),
                right_shards = other.shards.len(),
                "layout mismatch, maps compare unequal"
            );
            return false;
        }

        let self_first = self.id < other.id;
        for (mine, theirs) in self.shards.iter().zip(&other.shards) {
            let (first, second) = if self_first {
                (mine, theirs)
            } else {
                (theirs, mine)
            };
            let first = first.read();
            let second = second.read();
            let (mine, theirs) = if self_first {
                (&*first, &*second)
            } else {
                (&*second, &*first)
            };

            let equal = mine.len() == theirs.len()
                && mine
                    .iter()
                    .all(|(k, v)| theirs.get(k).is_some_and(|w| eq(v, w)));
            if !equal {
                return false;
            }
        }
        true
    }

    fn same_layout(&self, other: &ConcurrentMap<K, V>) -> bool {
        self.shards.len() == other.shards.len()
            && self.hash == other.hash
            && self.routing.same_as(&other.routing)
    }

    /// Index of the shard `key` routes to.
    pub fn shard_of(&self, key: &K) -> usize {
        self.shard_index(key)
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get the total number of entries across all shards.
    ///
    /// Shards are counted one at a time, so under concurrent writers the
    /// total is not a point-in-time figure.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Number of entries in each shard, in shard index order.
    pub fn shard_loads(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_loads();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Copy every shard under its read lock into a fully independent map
    /// with the same shard count, hash function and router.
    fn clone(&self) -> Self {
        let shards = self
            .shards
            .iter()
            .map(|shard| Shard::from_map(shard.snapshot()))
            .collect();
        let copy = Self::from_parts(shards, self.hash, self.routing.clone());
        tracing::debug!(source = self.id, id = copy.id, "cloned concurrent map");
        copy
    }
}

impl<K, V> PartialEq for ConcurrentMap<K, V>
where
    K: Hash + Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal_func(other, |a, b| a == b)
    }
}

impl<K, V> std::fmt::Debug for ConcurrentMap<K, V>
where
    K: Hash + Eq + std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries = f.debug_map();
        for shard in &self.shards {
            let map = shard.read();
            entries.entries(map.iter());
        }
        entries.finish()
    }
}

impl<K, V> Extend<(K, V)> for ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        map.insert_all(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

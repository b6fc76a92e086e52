//! Statistics and load introspection types.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-shard operation counts.
///
/// All fields stay zero unless the `metrics` feature is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardOps {
    /// Number of lookups that found a value.
    pub reads: u64,
    /// Number of `set` calls on this shard.
    pub writes: u64,
    /// Number of `delete` calls that removed an entry.
    pub removes: u64,
    /// Number of lock acquisitions, shared or exclusive.
    pub lock_acquisitions: u64,
}

/// Thread-safe counters for a single shard.
#[cfg(feature = "metrics")]
#[derive(Debug, Default)]
pub(crate) struct ShardStats {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    lock_acquisitions: AtomicU64,
}

#[cfg(feature = "metrics")]
impl ShardStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lock_acquisition(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardOps {
        ShardOps {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
        }
    }
}

/// Zero-sized placeholder when metrics are disabled.
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub(crate) struct ShardStats;

#[cfg(not(feature = "metrics"))]
impl ShardStats {
    pub fn new() -> Self {
        ShardStats
    }

    #[inline]
    pub fn record_read(&self) {}

    #[inline]
    pub fn record_write(&self) {}

    #[inline]
    pub fn record_remove(&self) {}

    #[inline]
    pub fn record_lock_acquisition(&self) {}

    pub fn snapshot(&self) -> ShardOps {
        ShardOps::default()
    }
}

/// Aggregate statistics for a ConcurrentMap instance.
///
/// Shards are sampled one at a time, so under concurrent writers the numbers
/// are not a single point-in-time view.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Total number of entries across all shards.
    pub size: usize,
    /// Number of entries in each shard.
    pub shard_sizes: Vec<usize>,
    /// Operation counts for each shard.
    pub operations: Vec<ShardOps>,
}

impl Stats {
    /// Average number of entries per shard.
    pub fn avg_load_per_shard(&self) -> f64 {
        if self.shard_sizes.is_empty() {
            return 0.0;
        }
        self.size as f64 / self.shard_sizes.len() as f64
    }

    /// Largest shard load divided by the average load; 0.0 for an empty map.
    ///
    /// 1.0 is a perfectly even spread.
    pub fn max_load_ratio(&self) -> f64 {
        let avg = self.avg_load_per_shard();
        if avg == 0.0 {
            return 0.0;
        }
        let max = self.shard_sizes.iter().copied().max().unwrap_or(0);
        max as f64 / avg
    }

    /// Sum of reads, writes and removes across all shards.
    pub fn total_operations(&self) -> u64 {
        self.operations
            .iter()
            .map(|op| op.reads + op.writes + op.removes)
            .sum()
    }
}

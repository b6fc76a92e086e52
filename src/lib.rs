//! # concmap
//!
//! A thread-safe key-value map for concurrent readers and writers.
//!
//! The key space is split across a fixed number of shards, each guarded by
//! its own read-write lock. A key always lives in exactly one shard, chosen
//! by hashing the key with its own [`Hash`](std::hash::Hash) impl, so keys
//! that compare equal always route to the same shard. Operations on keys in
//! different shards never wait on each other.
//!
//! ## Features
//!
//! - **Per-key linearizability**: `get`/`set`/`delete` lock one shard
//! - **Weakly consistent traversal**: `range`, `iter`, `keys`, `values`,
//!   `collect` and `clone` are atomic per shard, not across the whole map
//! - **Fixed layout**: the shard count never changes after construction; any
//!   positive count works (powers of two route with a mask, others by modulo)
//! - **Deadlock-free equality**: cross-map comparisons lock in a global order
//! - **Statistics**: per-shard loads, and operation counts with `metrics`
//!
//! ## Example
//!
//! ```rust
//! use concmap::ConcurrentMap;
//!
//! let map = ConcurrentMap::new();
//!
//! map.set("key1", 1);
//! map.set("key2", 2);
//! assert_eq!(map.get(&"key1"), Some(1));
//!
//! map.delete(&"key1");
//! assert!(!map.contains_key(&"key1"));
//!
//! // Visitor traversal; return false to stop early
//! map.range(|key, value| {
//!     println!("{}: {}", key, value);
//!     true
//! });
//!
//! // Lazy traversal and full materialization
//! let keys: Vec<_> = map.keys().collect();
//! assert_eq!(keys, vec!["key2"]);
//! let plain = map.collect();
//! assert_eq!(plain.len(), 1);
//!
//! // Independent copy and structural equality
//! let copy = map.clone();
//! assert!(map.equal_func(&copy, |a, b| a == b));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use concmap::{ConcurrentMapBuilder, HashFunction};
//!
//! let map = ConcurrentMapBuilder::new()
//!     .shard_count(32)?
//!     .hash_function(HashFunction::Fnv)
//!     .build::<String, i32>()?;
//! # Ok::<(), concmap::Error>(())
//! ```
//!
//! ## Float keys
//!
//! `f64` is not `Hash`; wrap it in [`FloatKey`], which hashes and compares a
//! canonical bit pattern instead of any textual form.

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration, builder and routing types.
pub mod config;
/// Error types.
pub mod error;
/// Hash function implementations.
pub mod hash;
/// Iterator implementations.
pub mod iter;
pub mod key;
/// Main ConcurrentMap implementation.
pub mod map;
/// Internal shard implementation.
mod shard;
pub mod stats;

// Re-export main types
pub use config::{
    ConcurrentMapBuilder, Config, DefaultRouter, HashFunction, RoutingConfig, ShardRouter,
};
pub use error::Error;
pub use key::FloatKey;
pub use map::ConcurrentMap;
pub use stats::{ShardOps, Stats};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_map_is_send_sync() {
        assert_send_sync::<ConcurrentMap<String, Vec<u8>>>();
    }

    #[test]
    fn test_basic_operations() {
        let map = ConcurrentMap::new();

        map.set("key1", "value1");
        map.set("key1", "value2");
        assert_eq!(map.get(&"key1"), Some("value2"));
        assert_eq!(map.get(&"nonexistent"), None);

        map.delete(&"key1");
        assert_eq!(map.get(&"key1"), None);
        map.delete(&"key1");
        assert!(map.is_empty());
    }

    #[test]
    fn test_builder() {
        let map = ConcurrentMapBuilder::new()
            .shard_count(8)
            .unwrap()
            .capacity_per_shard(4)
            .build::<String, i32>()
            .unwrap();

        map.set("test".to_string(), 42);
        assert_eq!(map.get(&"test".to_string()), Some(42));
        assert_eq!(map.shard_count(), 8);
    }

    #[test]
    fn test_stats() {
        let map = ConcurrentMap::new();
        map.set("key1", "value1");
        map.set("key2", "value2");

        let stats = map.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.shard_sizes.len(), 16);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_metrics_counts() {
        let map = ConcurrentMapBuilder::new()
            .shard_count(1)
            .unwrap()
            .build::<&str, i32>()
            .unwrap();
        map.set("a", 1);
        map.set("a", 2);
        map.get(&"a");
        map.get(&"missing");
        map.delete(&"a");
        map.delete(&"a");

        let stats = map.stats();
        let ops = &stats.operations[0];
        assert_eq!(ops.writes, 2);
        assert_eq!(ops.reads, 1);
        assert_eq!(ops.removes, 1);
        assert!(ops.lock_acquisitions >= 6);
    }
}

use crate::error::Error;
use crate::hash::ShardHasher;
use std::sync::Arc;

/// Which hash function to use for shard assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Use ahash (default, fast and well-distributed).
    #[default]
    AHash,
    /// Use 64-bit FNV-1a (stable across builds, good for short keys).
    Fnv,
    /// Use fxhash (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
}

/// User-provided shard selection. Enables stateful or custom routing.
pub trait ShardRouter: Send + Sync {
    /// Return the shard index in `[0, shard_count)` for the given key hash.
    ///
    /// Callers always pass `shard_count >= 1`; implementations need not
    /// handle zero (`DefaultRouter` panics on it).
    fn route(&self, key_hash: u64, shard_count: usize) -> usize;
}

/// Default routing.
///
/// Masks with `shard_count - 1` when the count is a power of two and falls
/// back to modulo reduction otherwise, so every count in `1..` spreads keys
/// over all shards.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouter;

impl ShardRouter for DefaultRouter {
    #[inline]
    fn route(&self, key_hash: u64, shard_count: usize) -> usize {
        if shard_count.is_power_of_two() {
            (key_hash as usize) & (shard_count - 1)
        } else {
            (key_hash % shard_count as u64) as usize
        }
    }
}

/// Routing strategy for shard selection.
#[derive(Clone, Default)]
pub enum RoutingConfig {
    /// Default: mask for power-of-two counts, modulo otherwise.
    #[default]
    Default,
    /// User-provided router (e.g. stateful or custom distribution).
    Custom(Arc<dyn ShardRouter>),
}

impl RoutingConfig {
    /// Route a key hash to a shard index in `[0, shard_count)`.
    #[inline]
    pub(crate) fn route(&self, key_hash: u64, shard_count: usize) -> usize {
        match self {
            RoutingConfig::Default => DefaultRouter.route(key_hash, shard_count),
            // Out-of-range answers from a custom router wrap instead of
            // indexing past the shard array.
            RoutingConfig::Custom(router) => router.route(key_hash, shard_count) % shard_count,
        }
    }

    /// Whether two configs send every hash to the same shard.
    pub(crate) fn same_as(&self, other: &RoutingConfig) -> bool {
        match (self, other) {
            (RoutingConfig::Default, RoutingConfig::Default) => true,
            (RoutingConfig::Custom(a), RoutingConfig::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for RoutingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingConfig::Default => write!(f, "RoutingConfig::Default"),
            RoutingConfig::Custom(_) => write!(f, "RoutingConfig::Custom(...)"),
        }
    }
}

/// Configuration for a ConcurrentMap instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) hash_function: HashFunction,
    pub(crate) capacity_per_shard: Option<usize>,
    pub(crate) routing: RoutingConfig,
}

impl Config {
    /// Create a new config with defaults (16 shards, ahash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be greater than 0.
    ///
    /// Powers of two route with a bitmask; any other count routes by modulo.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidShardCount);
        }
        self.shard_count = count;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }

    /// Set initial capacity per shard. Total capacity will be approximately
    /// `capacity_per_shard * shard_count`. Omitted by default (HashMap default).
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.capacity_per_shard = Some(capacity);
        self
    }

    /// Use a custom shard router.
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: 16,
            hash_function: HashFunction::AHash,
            capacity_per_shard: None,
            routing: RoutingConfig::Default,
        }
    }
}

/// Builder for creating a ConcurrentMap with custom configuration.
#[derive(Debug, Default)]
pub struct ConcurrentMapBuilder {
    config: Config,
}

impl ConcurrentMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Set initial capacity per shard. Total capacity ≈ `capacity_per_shard * shard_count`.
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity_per_shard(capacity);
        self
    }

    /// Use a custom shard router (e.g. for stateful or custom distribution).
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.config = self.config.routing(routing);
        self
    }

    /// Build a ConcurrentMap with the configured settings.
    pub fn build<K, V>(self) -> Result<crate::ConcurrentMap<K, V>, Error>
    where
        K: std::hash::Hash + Eq,
    {
        crate::ConcurrentMap::with_config(self.config)
    }
}

/// Create a hash function instance based on the configuration.
pub(crate) fn create_hasher(hash_fn: HashFunction) -> ShardHasher {
    match hash_fn {
        HashFunction::AHash => ShardHasher::AHash,
        HashFunction::Fnv => ShardHasher::Fnv,
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => ShardHasher::FxHash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_router_mask_and_modulo() {
        let router = DefaultRouter;
        assert_eq!(router.route(0b1011, 8), 0b011);
        assert_eq!(router.route(10, 3), 1);
        assert_eq!(router.route(u64::MAX, 7), (u64::MAX % 7) as usize);
        assert_eq!(router.route(12345, 1), 0);
    }

    #[test]
    fn test_custom_router_is_wrapped_into_range() {
        struct Wild;
        impl ShardRouter for Wild {
            fn route(&self, _key_hash: u64, shard_count: usize) -> usize {
                shard_count + 2
            }
        }

        let routing = RoutingConfig::Custom(Arc::new(Wild));
        assert_eq!(routing.route(42, 4), 2);
    }

    #[test]
    fn test_routing_identity() {
        let router: Arc<dyn ShardRouter> = Arc::new(DefaultRouter);
        let a = RoutingConfig::Custom(Arc::clone(&router));
        let b = a.clone();
        assert!(a.same_as(&b));
        assert!(RoutingConfig::Default.same_as(&RoutingConfig::Default));
        assert!(!a.same_as(&RoutingConfig::Default));
        assert!(!a.same_as(&RoutingConfig::Custom(Arc::new(DefaultRouter))));
    }

    #[test]
    fn test_zero_shards_rejected() {
        assert_eq!(
            Config::new().shard_count(0).unwrap_err(),
            Error::InvalidShardCount
        );
        assert!(Config::new().shard_count(12).is_ok());
    }
}

use std::hash::{Hash, Hasher};

/// Hasher used to fingerprint keys for shard routing.
///
/// The fingerprint is taken over the bytes a key feeds through its `Hash`
/// impl, so any two keys that compare equal produce the same fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShardHasher {
    /// AHash with fixed keys (default).
    #[default]
    AHash,
    /// 64-bit FNV-1a.
    Fnv,
    /// FxHash.
    #[cfg(feature = "fxhash")]
    FxHash,
}

impl ShardHasher {
    /// Fingerprint a key.
    pub fn hash_key<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        match self {
            ShardHasher::AHash => finish(ahash::AHasher::default(), key),
            ShardHasher::Fnv => finish(fnv::FnvHasher::default(), key),
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => finish(fxhash::FxHasher::default(), key),
        }
    }
}

#[inline]
fn finish<H: Hasher, K: Hash + ?Sized>(mut hasher: H, key: &K) -> u64 {
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        #[allow(unused_mut)]
        let mut hashers = vec![ShardHasher::AHash, ShardHasher::Fnv];
        #[cfg(feature = "fxhash")]
        hashers.push(ShardHasher::FxHash);

        for hasher in hashers {
            assert_eq!(hasher.hash_key("alpha"), hasher.hash_key("alpha"));
            assert_eq!(
                hasher.hash_key(&String::from("alpha")),
                hasher.hash_key("alpha")
            );
        }
    }

    #[test]
    fn test_fnv_matches_reference() {
        // FNV-1a over the empty input is the offset basis.
        let hasher = fnv::FnvHasher::default();
        assert_eq!(hasher.finish(), 0xcbf2_9ce4_8422_2325);

        let mut a = fnv::FnvHasher::default();
        a.write(b"a");
        assert_eq!(a.finish(), 0xaf63_dc4c_8601_ec8c);
    }
}

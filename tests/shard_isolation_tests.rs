use concmap::{ConcurrentMapBuilder, HashFunction};

#[test]
fn test_shard_isolation() {
    // Create a map with 4 shards
    let map = ConcurrentMapBuilder::new()
        .shard_count(4)
        .unwrap()
        .build::<String, i32>()
        .unwrap();

    // Insert many keys to ensure distribution across shards
    for i in 0..100 {
        map.set(format!("key_{}", i), i);
    }

    let stats = map.stats();
    assert_eq!(stats.shard_sizes.len(), 4);

    // Verify all entries are accounted for
    let total: usize = stats.shard_sizes.iter().sum();
    assert_eq!(total, 100);

    // Each key lives in exactly the shard it routes to
    let mut expected = [0usize; 4];
    for i in 0..100 {
        expected[map.shard_of(&format!("key_{}", i))] += 1;
    }
    assert_eq!(stats.shard_sizes, expected.to_vec());
}

#[test]
fn test_deterministic_shard_assignment() {
    #[allow(unused_mut)]
    let mut hash_functions = vec![HashFunction::AHash, HashFunction::Fnv];
    #[cfg(feature = "fxhash")]
    hash_functions.push(HashFunction::FxHash);

    for hash_function in hash_functions {
        let build = || {
            ConcurrentMapBuilder::new()
                .shard_count(8)
                .unwrap()
                .hash_function(hash_function)
                .build::<String, i32>()
                .unwrap()
        };
        let map1 = build();
        let map2 = build();

        for i in 0..50 {
            let key = format!("key_{}", i);
            map1.set(key.clone(), i);
            map2.set(key.clone(), i);
            assert_eq!(map1.shard_of(&key), map2.shard_of(&key));
        }

        // Shard sizes should be identical (deterministic hashing)
        assert_eq!(map1.shard_loads(), map2.shard_loads());
    }
}

#[test]
fn test_shard_distribution() {
    let map = ConcurrentMapBuilder::new()
        .shard_count(16)
        .unwrap()
        .build::<String, i32>()
        .unwrap();

    for i in 0..1000 {
        map.set(format!("key_{}", i), i);
    }

    let stats = map.stats();

    // With 1000 keys and 16 shards, we expect ~62-63 keys per shard
    let max_shard_size = *stats.shard_sizes.iter().max().unwrap();
    let min_shard_size = *stats.shard_sizes.iter().min().unwrap();
    assert!(
        max_shard_size < 100,
        "Shard distribution too uneven (max: {})",
        max_shard_size
    );
    assert!(
        min_shard_size > 30,
        "Shard distribution too uneven (min: {})",
        min_shard_size
    );
    assert!(stats.max_load_ratio() < 1.6);
}

#[test]
fn test_cross_shard_writes_do_not_interfere() {
    let map = ConcurrentMapBuilder::new()
        .shard_count(2)
        .unwrap()
        .build::<u32, &str>()
        .unwrap();

    // Find two keys that live in different shards
    let a = 0u32;
    let b = (1..100).find(|k| map.shard_of(k) != map.shard_of(&a)).unwrap();

    map.set(a, "a");
    map.set(b, "b");
    map.delete(&a);

    assert_eq!(map.get(&a), None);
    assert_eq!(map.get(&b), Some("b"));
    assert_eq!(map.shard_loads()[map.shard_of(&b)], 1);
    assert_eq!(map.shard_loads()[map.shard_of(&a)], 0);
}

#[cfg(feature = "fxhash")]
#[test]
fn test_fxhash_map_routes_and_stores() {
    let map = ConcurrentMapBuilder::new()
        .shard_count(8)
        .unwrap()
        .hash_function(HashFunction::FxHash)
        .build::<String, i32>()
        .unwrap();

    for i in 0..200 {
        map.set(format!("key_{}", i), i);
    }
    assert_eq!(map.len(), 200);
    for i in 0..200 {
        assert_eq!(map.get(&format!("key_{}", i)), Some(i));
    }
    assert_eq!(map.shard_loads().iter().sum::<usize>(), 200);
}

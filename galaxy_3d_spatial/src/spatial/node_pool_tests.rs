use super::*;

// ============================================================================
// Basic allocation
// ============================================================================

#[test]
fn test_new_pool_is_empty() {
    let pool = NodePool::new(true);
    assert_eq!(pool.len(), 0);
    assert!(pool.is_empty());
    assert_eq!(pool.high_water_mark(), 0);
    assert_eq!(pool.pooled(), 0);
}

#[test]
fn test_default_pools() {
    assert!(NodePool::default().is_pooling());
    assert!(!NodePool::new(false).is_pooling());
}

#[test]
fn test_alloc_sequential() {
    let mut pool = NodePool::new(true);
    assert_eq!(pool.alloc(), 0);
    assert_eq!(pool.alloc(), 1);
    assert_eq!(pool.alloc(), 2);
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.high_water_mark(), 3);
}

#[test]
fn test_free_then_alloc_recycles() {
    let mut pool = NodePool::new(true);
    pool.alloc(); // 0
    pool.alloc(); // 1
    pool.alloc(); // 2

    pool.free(1);
    assert_eq!(pool.len(), 2);
    assert!(pool.is_pooled(1));

    // Recycled block comes back before a fresh one
    assert_eq!(pool.alloc(), 1);
    assert!(!pool.is_pooled(1));
    assert_eq!(pool.high_water_mark(), 3);
}

#[test]
fn test_free_is_lifo() {
    let mut pool = NodePool::new(true);
    pool.alloc(); // 0
    pool.alloc(); // 1
    pool.alloc(); // 2

    pool.free(0);
    pool.free(2);

    assert_eq!(pool.alloc(), 2);
    assert_eq!(pool.alloc(), 0);
    assert_eq!(pool.alloc(), 3); // fresh
}

// ============================================================================
// Pooling vs non-pooling
// ============================================================================

#[test]
fn test_pooling_keeps_high_water_mark() {
    let mut pool = NodePool::new(true);
    pool.alloc(); // 0
    pool.alloc(); // 1

    pool.free(1);
    pool.free(0);
    assert_eq!(pool.high_water_mark(), 2);
    assert_eq!(pool.pooled(), 2);
}

#[test]
fn test_non_pooling_trims_tail() {
    let mut pool = NodePool::new(false);
    pool.alloc(); // 0
    pool.alloc(); // 1
    pool.alloc(); // 2

    // Block 1 is not at the tail: it stays pooled
    pool.free(1);
    assert_eq!(pool.high_water_mark(), 3);
    assert_eq!(pool.pooled(), 1);

    // Freeing the tail drops 2, then the already-free 1
    pool.free(2);
    assert_eq!(pool.high_water_mark(), 1);
    assert_eq!(pool.pooled(), 0);

    pool.free(0);
    assert_eq!(pool.high_water_mark(), 0);
    assert!(pool.is_empty());
}

// ============================================================================
// Bulk release
// ============================================================================

#[test]
fn test_release_all_pools_every_block() {
    let mut pool = NodePool::new(true);
    for _ in 0..5 {
        pool.alloc();
    }
    pool.free(3);

    pool.release_all();
    assert!(pool.is_empty());
    assert_eq!(pool.pooled(), 5);
    assert_eq!(pool.high_water_mark(), 5);

    // Lowest index first after a release
    assert_eq!(pool.alloc(), 0);
    assert_eq!(pool.alloc(), 1);
}

#[test]
fn test_reset_forgets_everything() {
    let mut pool = NodePool::new(false);
    pool.alloc();
    pool.alloc();

    pool.reset();
    assert!(pool.is_empty());
    assert_eq!(pool.pooled(), 0);
    assert_eq!(pool.high_water_mark(), 0);
    assert_eq!(pool.alloc(), 0);
}

// ============================================================================
// Stress / pattern tests
// ============================================================================

#[test]
fn test_live_plus_pooled_equals_high_water_mark() {
    for pooling in [true, false] {
        let mut pool = NodePool::new(pooling);
        let mut live: Vec<u32> = Vec::new();

        // Deterministic churn: allocate in bursts, free every third live block
        for round in 0..20u32 {
            for _ in 0..(round % 4 + 1) {
                live.push(pool.alloc());
            }
            let mut i = 0;
            live.retain(|_| {
                i += 1;
                i % 3 != 0
            });
            // Rebuild the pool view: free what `retain` dropped
            let mut expected: Vec<u32> = (0..pool.high_water_mark())
                .filter(|id| !pool.is_pooled(*id) && !live.contains(id))
                .collect();
            expected.sort_unstable();
            for id in expected.into_iter().rev() {
                pool.free(id);
            }

            assert_eq!(pool.len() as usize, live.len());
            assert_eq!(
                pool.len() + pool.pooled(),
                pool.high_water_mark(),
                "pooling={} round={}", pooling, round
            );
        }
    }
}

#[test]
fn test_indices_are_unique() {
    let mut pool = NodePool::new(true);
    let mut seen = std::collections::HashSet::new();

    for _ in 0..50 {
        seen.insert(pool.alloc());
    }
    for id in 0..10 {
        pool.free(id);
        seen.remove(&id);
    }
    for _ in 0..10 {
        let id = pool.alloc();
        assert!(seen.insert(id), "duplicate block id: {}", id);
    }
    assert_eq!(seen.len(), 50);
}

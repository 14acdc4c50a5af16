/// Allocates and recycles child-block indices for the tree arenas.
///
/// A tree stores its nodes in a flat arena; every subdivision claims one
/// block of sibling slots (4 for the quadtree, 8 for the octree) and every
/// merge retires it. The pool hands out block indices and keeps retired ones
/// on a free stack so the next subdivision reuses them.
///
/// With pooling disabled, retired blocks at the top of the range are
/// forgotten immediately so the owning arena can shrink. Retired blocks
/// below a live one cannot be forgotten yet; they stay on the free stack
/// (and count as pooled) until the tail above them is trimmed.
///
/// # Example
///
/// ```ignore
/// let mut pool = NodePool::new(true);
/// let a = pool.alloc();  // 0
/// let b = pool.alloc();  // 1
/// pool.free(a);           // 0 is now pooled
/// let c = pool.alloc();  // 0 (recycled)
/// ```
pub struct NodePool {
    free_list: Vec<u32>,
    next_id: u32,
    len: u32,
    pooling: bool,
}

impl NodePool {
    /// Create a new empty pool
    pub fn new(pooling: bool) -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            len: 0,
            pooling,
        }
    }

    /// Allocate the next available block index
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        self.free_list.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        })
    }

    /// Return a block index for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated block: {}", id);
        debug_assert!(!self.free_list.contains(&id), "double free of block {}", id);
        self.len -= 1;
        self.free_list.push(id);
        if !self.pooling {
            self.trim_tail();
        }
    }

    /// Retire every live block in one pass (tree clear).
    ///
    /// Lower indices are handed out first afterwards.
    pub fn release_all(&mut self) {
        self.free_list.clear();
        self.free_list.extend((0..self.next_id).rev());
        self.len = 0;
    }

    /// Forget every block, pooled or live.
    pub fn reset(&mut self) {
        self.free_list.clear();
        self.next_id = 0;
        self.len = 0;
    }

    // Drop free ids sitting at the top of the range.
    fn trim_tail(&mut self) {
        while self.next_id > 0 {
            let top = self.next_id - 1;
            match self.free_list.iter().position(|&id| id == top) {
                Some(pos) => {
                    self.free_list.swap_remove(pos);
                    self.next_id = top;
                }
                None => break,
            }
        }
    }

    /// Highest index ever allocated + 1.
    ///
    /// This is the minimum number of blocks the arena must hold.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of blocks currently in use
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no blocks are currently in use
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of retired blocks waiting for reuse
    pub fn pooled(&self) -> u32 {
        self.free_list.len() as u32
    }

    /// Whether a block index is currently retired
    pub fn is_pooled(&self, id: u32) -> bool {
        self.free_list.contains(&id)
    }

    /// Whether retired blocks are kept for reuse
    pub fn is_pooling(&self) -> bool {
        self.pooling
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new(true)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "node_pool_tests.rs"]
mod tests;

/// SpatialTree — adaptive region tree shared by the quadtree and the octree.
///
/// Uses **single-node placement**: each entity is stored in exactly one
/// node, the deepest node whose bounds fully contain it. If the entity
/// straddles a child boundary, it stays in the parent.
///
/// Benefits:
/// - No duplication → no result set needed for deduplication
/// - `entity_count` is simply the size of the reverse index
/// - O(depth) insert and remove per entity
///
/// Unlike a static tree, nodes are created on demand: a leaf subdivides once
/// it holds more than `max_entities_per_node` entities (unless it sits at
/// `max_depth`), and an internal node whose children all became empty leaves
/// merges back into a leaf.
///
/// Nodes live in a flat arena. The root is slot 0; every subdivision claims
/// one block of `CHILD_COUNT` consecutive slots from the `NodePool`, so block
/// `b` occupies slots `1 + b * CHILD_COUNT ..`.
///
/// The split axes are provided by a `TreeLayout` (4-way X/Z for the
/// quadtree, 8-way XYZ for the octree).

use std::marker::PhantomData;
use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::camera::Frustum;
use crate::engine::Engine;
use crate::error::Result;
use crate::{engine_debug, engine_trace};
use super::bounds::{Containment, SpatialBounds};
use super::config::TreeConfig;
use super::entity::EntityHandle;
use super::node_pool::NodePool;
use super::partitioner::{
    run_into, run_span, PartitionerStats, QuerySink, SpatialPartitioner, SpatialQuery,
};

/// Index of the root node in the arena.
const ROOT: usize = 0;

/// Parent index of the root.
const NO_PARENT: usize = usize::MAX;

/// Split geometry of a tree.
///
/// All node bounds and placement tests live in the layout's projected
/// space; the reverse index keeps each entity's real bounds.
pub trait TreeLayout: Send + Sync + 'static {
    /// Children per subdivision
    const CHILD_COUNT: usize;
    /// Log source
    const NAME: &'static str;

    /// Map world bounds into placement space.
    fn project(bounds: &SpatialBounds) -> SpatialBounds;

    /// Map a world point into placement space.
    fn project_point(point: Vec3) -> Vec3;

    /// Child slot (0..CHILD_COUNT) holding a projected point.
    ///
    /// Points on a split plane go to the high side.
    fn child_index(center: Vec3, point: Vec3) -> usize;

    /// Bounds of child `index` of `parent`.
    fn child_bounds(parent: &SpatialBounds, center: Vec3, index: usize) -> SpatialBounds;

    /// Volume tested against frustum planes for a node.
    ///
    /// `vertical_span` is the Y range of everything indexed since the last
    /// clear, for layouts that flatten Y.
    fn culling_volume(node: &SpatialBounds, vertical_span: Option<(f32, f32)>) -> SpatialBounds;
}

/// A single node in the arena.
struct TreeNode {
    /// Placement-space bounds (fixed while the node is live)
    bounds: SpatialBounds,
    depth: u32,
    /// Parent slot (`NO_PARENT` for the root)
    parent: usize,
    /// First child slot (0 = leaf)
    first_child: usize,
    /// Entities stored here (leaf occupants or straddlers)
    entities: Vec<EntityHandle>,
}

impl TreeNode {
    fn new(bounds: SpatialBounds, depth: u32, parent: usize) -> Self {
        Self {
            bounds,
            depth,
            parent,
            first_child: 0,
            entities: Vec::new(),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.first_child == 0
    }
}

/// Where an entity lives and its real (unprojected) bounds.
#[derive(Debug, Clone, Copy)]
struct EntityLocation {
    node: usize,
    bounds: SpatialBounds,
}

/// Adaptive region tree over a `TreeLayout`.
///
/// See `QuadtreePartitioner` and `OctreePartitioner`.
pub struct SpatialTree<L: TreeLayout> {
    config: TreeConfig,
    /// Flat node arena; `len == 1 + high_water_mark * CHILD_COUNT`
    nodes: Vec<TreeNode>,
    /// Child block allocator
    pool: NodePool,
    /// Reverse lookup: entity → (node slot, real bounds)
    locations: FxHashMap<EntityHandle, EntityLocation>,
    /// Y range of everything indexed since the last clear
    vertical_span: Option<(f32, f32)>,
    _layout: PhantomData<L>,
}

impl<L: TreeLayout> SpatialTree<L> {
    /// Create a tree holding a single empty root covering the world.
    ///
    /// Fails on inverted or non-finite world bounds, a `max_depth` above
    /// `MAX_TREE_DEPTH`, or a zero node capacity.
    pub fn new(config: TreeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|error| Engine::log_and_return_error(L::NAME, error))?;

        let world = L::project(&SpatialBounds::new(config.world_min, config.world_max));

        engine_debug!(
            L::NAME,
            "Created tree (depth {}, {} per node, pooling {}, deterministic {})",
            config.max_depth,
            config.max_entities_per_node,
            config.use_node_pooling,
            config.deterministic_mode
        );

        Ok(Self {
            config,
            nodes: vec![TreeNode::new(world, 0, NO_PARENT)],
            pool: NodePool::new(config.use_node_pooling),
            locations: FxHashMap::default(),
            vertical_span: None,
            _layout: PhantomData,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Root bounds in placement space.
    pub fn world_bounds(&self) -> SpatialBounds {
        self.nodes[ROOT].bounds
    }

    /// Child block allocator (diagnostics).
    pub fn node_pool(&self) -> &NodePool {
        &self.pool
    }

    /// Depth of the node currently holding an entity.
    pub fn entity_depth(&self, entity: EntityHandle) -> Option<u32> {
        self.locations
            .get(&entity)
            .map(|location| self.nodes[location.node].depth)
    }

    #[inline]
    fn block_first_slot(block: u32) -> usize {
        1 + block as usize * L::CHILD_COUNT
    }

    #[inline]
    fn slot_block(first_child: usize) -> u32 {
        ((first_child - 1) / L::CHILD_COUNT) as u32
    }

    fn expand_vertical_span(&mut self, bounds: &SpatialBounds) {
        self.vertical_span = Some(match self.vertical_span {
            Some((lo, hi)) => (lo.min(bounds.min.y), hi.max(bounds.max.y)),
            None => (bounds.min.y, bounds.max.y),
        });
    }

    // ===== PLACEMENT =====

    /// Deepest existing node that fully contains `projected`.
    ///
    /// Uses direct child calculation instead of testing every child: if both
    /// corners fall into the same child, the entity fits entirely in it.
    /// Entities outside the world stay at the root.
    fn find_target(&self, projected: &SpatialBounds) -> usize {
        if !self.nodes[ROOT].bounds.contains(projected) {
            return ROOT;
        }

        let mut idx = ROOT;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return idx;
            }

            let center = node.bounds.center();
            let child = L::child_index(center, projected.min);
            if child != L::child_index(center, projected.max) {
                // Straddles a split plane
                return idx;
            }
            idx = node.first_child + child;
        }
    }

    /// Whether an entity may stay at `idx` with new projected bounds.
    fn stays_in_place(&self, idx: usize, projected: &SpatialBounds) -> bool {
        let node = &self.nodes[idx];
        if !node.bounds.contains(projected) {
            // Out-of-world entities are kept at the root
            return idx == ROOT;
        }
        if node.is_leaf() {
            return true;
        }
        let center = node.bounds.center();
        L::child_index(center, projected.min) != L::child_index(center, projected.max)
    }

    fn insert(&mut self, entity: EntityHandle, bounds: SpatialBounds) {
        let idx = self.find_target(&L::project(&bounds));
        self.nodes[idx].entities.push(entity);
        self.locations.insert(entity, EntityLocation { node: idx, bounds });
        self.split_if_needed(idx);
    }

    /// Subdivide an over-capacity leaf, cascading into children that are
    /// still over capacity.
    fn split_if_needed(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        if !node.is_leaf()
            || node.entities.len() <= self.config.max_entities_per_node
            || node.depth >= self.config.max_depth
        {
            return;
        }

        self.subdivide(idx);

        let first_child = self.nodes[idx].first_child;
        for child in first_child..first_child + L::CHILD_COUNT {
            self.split_if_needed(child);
        }
    }

    fn subdivide(&mut self, idx: usize) {
        let block = self.pool.alloc();
        let first_child = Self::block_first_slot(block);
        let parent_bounds = self.nodes[idx].bounds;
        let depth = self.nodes[idx].depth + 1;
        let center = parent_bounds.center();

        if first_child == self.nodes.len() {
            // Fresh block: grow the arena
            for i in 0..L::CHILD_COUNT {
                let bounds = L::child_bounds(&parent_bounds, center, i);
                self.nodes.push(TreeNode::new(bounds, depth, idx));
            }
        } else {
            // Recycled block: slots already exist, entity lists are empty
            for i in 0..L::CHILD_COUNT {
                let child = &mut self.nodes[first_child + i];
                debug_assert!(child.entities.is_empty());
                child.bounds = L::child_bounds(&parent_bounds, center, i);
                child.depth = depth;
                child.parent = idx;
                child.first_child = 0;
            }
        }
        self.nodes[idx].first_child = first_child;

        // Occupants that fit in one child migrate; straddlers stay
        let mut occupants = std::mem::take(&mut self.nodes[idx].entities);
        let nodes = &mut self.nodes;
        let locations = &mut self.locations;
        occupants.retain(|&entity| {
            let Some(location) = locations.get_mut(&entity) else {
                return false;
            };
            let projected = L::project(&location.bounds);
            if !parent_bounds.contains(&projected) {
                return true;
            }
            let child = L::child_index(center, projected.min);
            if child != L::child_index(center, projected.max) {
                return true;
            }
            nodes[first_child + child].entities.push(entity);
            location.node = first_child + child;
            false
        });
        self.nodes[idx].entities = occupants;

        engine_trace!(L::NAME, "Subdivided node {} at depth {} (block {})", idx, depth - 1, block);
    }

    // ===== REMOVAL =====

    fn remove_entity(&mut self, entity: EntityHandle) {
        let Some(location) = self.locations.remove(&entity) else {
            return;
        };

        let entities = &mut self.nodes[location.node].entities;
        if let Some(pos) = entities.iter().position(|&e| e == entity) {
            entities.swap_remove(pos);
        }

        // A leaf may let its parent merge; an internal node may merge itself
        let mut idx = if self.nodes[location.node].is_leaf() {
            self.nodes[location.node].parent
        } else {
            location.node
        };

        while idx != NO_PARENT && self.can_merge(idx) {
            self.merge(idx);
            idx = self.nodes[idx].parent;
        }
    }

    /// An internal node merges when every child is an empty leaf and its
    /// own straddlers fit in a leaf.
    fn can_merge(&self, idx: usize) -> bool {
        let node = &self.nodes[idx];
        if node.is_leaf() || node.entities.len() > self.config.max_entities_per_node {
            return false;
        }
        self.nodes[node.first_child..node.first_child + L::CHILD_COUNT]
            .iter()
            .all(|child| child.is_leaf() && child.entities.is_empty())
    }

    fn merge(&mut self, idx: usize) {
        let first_child = self.nodes[idx].first_child;
        let pooling = self.config.use_node_pooling;

        for child in &mut self.nodes[first_child..first_child + L::CHILD_COUNT] {
            child.parent = NO_PARENT;
            if !pooling {
                child.entities = Vec::new();
            }
        }
        self.nodes[idx].first_child = 0;

        let block = Self::slot_block(first_child);
        self.pool.free(block);
        if !pooling {
            let live_len = Self::block_first_slot(self.pool.high_water_mark());
            self.nodes.truncate(live_len);
        }

        engine_trace!(L::NAME, "Merged node {} at depth {} (block {})", idx, self.nodes[idx].depth, block);
    }

    // ===== QUERIES =====

    fn collect<S: QuerySink>(&self, query: SpatialQuery<'_>, sink: &mut S) -> bool {
        match query {
            SpatialQuery::Point(point) => self.collect_point(L::project_point(point), sink),
            SpatialQuery::Radius { center, radius } => {
                if !(radius >= 0.0) {
                    return true;
                }
                let center = L::project_point(center);
                self.collect_region(
                    &|node: &SpatialBounds| node.classify_sphere(center, radius),
                    &|entity: &SpatialBounds| L::project(entity).intersects_sphere(center, radius),
                    sink,
                )
            }
            SpatialQuery::Bounds(bounds) => {
                let query = L::project(&bounds);
                self.collect_region(
                    &|node: &SpatialBounds| node.classify_box(&query),
                    &|entity: &SpatialBounds| L::project(entity).intersects(&query),
                    sink,
                )
            }
            SpatialQuery::Frustum(frustum) => self.collect_frustum(frustum, sink),
        }
    }

    fn collect_frustum<S: QuerySink>(&self, frustum: &Frustum, sink: &mut S) -> bool {
        let span = self.vertical_span;
        self.collect_region(
            &|node: &SpatialBounds| frustum.classify_aabb(&L::culling_volume(node, span)),
            // Entity bounds are tested unprojected
            &|entity: &SpatialBounds| frustum.intersects_aabb(entity),
            sink,
        )
    }

    /// Entities overlapping `point` along the path from the root to the leaf
    /// holding it. Every node on the path tests its entities individually.
    fn collect_point<S: QuerySink>(&self, point: Vec3, sink: &mut S) -> bool {
        if !self.nodes[ROOT].bounds.contains_point(point) {
            return true;
        }

        let overlaps = |entity: &SpatialBounds| L::project(entity).contains_point(point);
        let mut idx = ROOT;
        loop {
            if !self.test_entities(idx, &overlaps, sink) {
                return false;
            }

            let node = &self.nodes[idx];
            if node.is_leaf() {
                return true;
            }
            idx = node.first_child + L::child_index(node.bounds.center(), point);
        }
    }

    /// Region descent from the root.
    ///
    /// Root occupants are always tested individually: out-of-world entities
    /// live there regardless of the root's classification.
    fn collect_region<C, T, S>(&self, classify: &C, test: &T, sink: &mut S) -> bool
    where
        C: Fn(&SpatialBounds) -> Containment,
        T: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        if !self.test_entities(ROOT, test, sink) {
            return false;
        }

        match classify(&self.nodes[ROOT].bounds) {
            Containment::Outside => true,
            Containment::Inside => self.collect_children(ROOT, sink),
            Containment::Partial => self.descend_children(ROOT, classify, test, sink),
        }
    }

    /// 3-way classification at each node:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect all entities from subtree without further testing
    /// - `Partial` → test entities individually, recurse into children
    fn descend<C, T, S>(&self, idx: usize, classify: &C, test: &T, sink: &mut S) -> bool
    where
        C: Fn(&SpatialBounds) -> Containment,
        T: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        match classify(&self.nodes[idx].bounds) {
            Containment::Outside => true,
            Containment::Inside => self.collect_subtree(idx, sink),
            Containment::Partial => {
                self.test_entities(idx, test, sink) && self.descend_children(idx, classify, test, sink)
            }
        }
    }

    fn descend_children<C, T, S>(&self, idx: usize, classify: &C, test: &T, sink: &mut S) -> bool
    where
        C: Fn(&SpatialBounds) -> Containment,
        T: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        let first_child = self.nodes[idx].first_child;
        if first_child == 0 {
            return true;
        }
        (first_child..first_child + L::CHILD_COUNT)
            .all(|child| self.descend(child, classify, test, sink))
    }

    fn test_entities<T, S>(&self, idx: usize, test: &T, sink: &mut S) -> bool
    where
        T: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        for &entity in &self.nodes[idx].entities {
            if let Some(location) = self.locations.get(&entity) {
                if test(&location.bounds) && !sink.push(entity) {
                    return false;
                }
            }
        }
        true
    }

    /// Collect every entity of a subtree (no region test).
    fn collect_subtree<S: QuerySink>(&self, idx: usize, sink: &mut S) -> bool {
        sink.push_all(&self.nodes[idx].entities) && self.collect_children(idx, sink)
    }

    fn collect_children<S: QuerySink>(&self, idx: usize, sink: &mut S) -> bool {
        let first_child = self.nodes[idx].first_child;
        if first_child == 0 {
            return true;
        }
        (first_child..first_child + L::CHILD_COUNT).all(|child| self.collect_subtree(child, sink))
    }

    fn deepest_level(&self) -> u32 {
        let mut deepest = 0;
        let mut stack = vec![ROOT];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            deepest = deepest.max(node.depth);
            if !node.is_leaf() {
                stack.extend(node.first_child..node.first_child + L::CHILD_COUNT);
            }
        }
        deepest
    }
}

// ===== SPATIAL PARTITIONER TRAIT =====

impl<L: TreeLayout> SpatialPartitioner for SpatialTree<L> {
    fn update(&mut self, entity: EntityHandle, position: Vec3, bounds: Option<SpatialBounds>) {
        let bounds = bounds.unwrap_or(SpatialBounds::from_point(position));
        self.expand_vertical_span(&bounds);

        if let Some(location) = self.locations.get(&entity).copied() {
            if self.stays_in_place(location.node, &L::project(&bounds)) {
                // Same node: update the stored bounds in place
                self.locations.insert(entity, EntityLocation { node: location.node, bounds });
                return;
            }
            self.remove_entity(entity);
        }

        self.insert(entity, bounds);
    }

    fn remove(&mut self, entity: EntityHandle) {
        self.remove_entity(entity);
    }

    fn clear(&mut self) {
        if self.config.use_node_pooling {
            self.pool.release_all();
            for node in &mut self.nodes {
                node.entities.clear();
                node.first_child = 0;
            }
        } else {
            self.pool.reset();
            self.nodes.truncate(1);
            self.nodes[ROOT].entities = Vec::new();
            self.nodes[ROOT].first_child = 0;
        }
        self.locations.clear();
        self.vertical_span = None;

        engine_debug!(L::NAME, "Cleared tree ({} pooled blocks)", self.pool.pooled());
    }

    fn entity_count(&self) -> usize {
        self.locations.len()
    }

    fn contains(&self, entity: EntityHandle) -> bool {
        self.locations.contains_key(&entity)
    }

    fn stats(&self) -> PartitionerStats {
        PartitionerStats {
            entity_count: self.locations.len(),
            live_nodes: 1 + self.pool.len() as usize * L::CHILD_COUNT,
            pooled_nodes: self.pool.pooled() as usize * L::CHILD_COUNT,
            deepest_level: self.deepest_level(),
        }
    }

    fn query_into(&self, query: SpatialQuery<'_>, results: &mut Vec<EntityHandle>) {
        run_into(results, self.config.deterministic_mode, |sink| self.collect(query, sink));
    }

    fn query_span(&self, query: SpatialQuery<'_>, buffer: &mut [EntityHandle]) -> i32 {
        run_span(buffer, self.config.deterministic_mode, |sink| self.collect(query, sink))
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

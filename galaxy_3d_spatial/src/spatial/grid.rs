/// GridPartitioner — uniform hash grid.
///
/// Space is cut into cubic cells of `cell_size`; only occupied cells exist,
/// stored in a hash map keyed by integer cell coordinates. A point entity
/// lives in exactly one cell, a bounded entity in every cell its box
/// overlaps.
///
/// Deduplication without a result set: a multi-cell entity is emitted only
/// by the first cell (in range iteration order) of its own cell range that
/// the query also accepts. Every other cell skips it. The owner cell is
/// found once per entity and query, through a small fixed-size cache.
///
/// The grid is unbounded: the configured world extent is validated and
/// reported but never restricts placement or queries.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::camera::Frustum;
use crate::engine::Engine;
use crate::error::Result;
use crate::{engine_debug, engine_trace};
use super::bounds::SpatialBounds;
use super::config::GridConfig;
use super::entity::EntityHandle;
use super::partitioner::{
    run_into, run_span, PartitionerStats, QuerySink, SpatialPartitioner, SpatialQuery,
};

const SOURCE: &str = "galaxy3d::Grid";

/// Slots of the per-query owner cache.
const OWNER_CACHE_SLOTS: usize = 64;

// ===== CELLS =====

/// Integer cell coordinates: `floor(position / cell_size)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey(pub i32, pub i32, pub i32);

/// Inclusive block of cells.
///
/// Iteration order is x fastest, then y, then z; `min` is always first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: CellKey,
    max: CellKey,
}

impl CellRange {
    fn is_empty(&self) -> bool {
        self.min.0 > self.max.0 || self.min.1 > self.max.1 || self.min.2 > self.max.2
    }

    fn is_single(&self) -> bool {
        self.min == self.max
    }

    fn contains(&self, key: CellKey) -> bool {
        key.0 >= self.min.0 && key.0 <= self.max.0
            && key.1 >= self.min.1 && key.1 <= self.max.1
            && key.2 >= self.min.2 && key.2 <= self.max.2
    }

    fn intersection(&self, other: &CellRange) -> CellRange {
        CellRange {
            min: CellKey(
                self.min.0.max(other.min.0),
                self.min.1.max(other.min.1),
                self.min.2.max(other.min.2),
            ),
            max: CellKey(
                self.max.0.min(other.max.0),
                self.max.1.min(other.max.1),
                self.max.2.min(other.max.2),
            ),
        }
    }

    /// Number of cells covered (saturating; ranges can span the whole i32 space).
    fn cell_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64 + 1) as u64;
        span(self.min.0, self.max.0)
            .saturating_mul(span(self.min.1, self.max.1))
            .saturating_mul(span(self.min.2, self.max.2))
    }

    fn iter(&self) -> CellIter {
        CellIter {
            range: *self,
            next: if self.is_empty() { None } else { Some(self.min) },
        }
    }
}

struct CellIter {
    range: CellRange,
    next: Option<CellKey>,
}

impl Iterator for CellIter {
    type Item = CellKey;

    fn next(&mut self) -> Option<CellKey> {
        let current = self.next?;
        let (min, max) = (self.range.min, self.range.max);
        let mut n = current;

        self.next = if n.0 < max.0 {
            n.0 += 1;
            Some(n)
        } else if n.1 < max.1 {
            n.0 = min.0;
            n.1 += 1;
            Some(n)
        } else if n.2 < max.2 {
            n.0 = min.0;
            n.1 = min.1;
            n.2 += 1;
            Some(n)
        } else {
            None
        };

        Some(current)
    }
}

/// Owner cells of the multi-cell entities met by one query.
///
/// Direct-mapped on the entity id and stack allocated, so queries stay
/// allocation-free; a collision only costs a recomputation.
struct OwnerCache {
    slots: [Option<(EntityHandle, CellKey)>; OWNER_CACHE_SLOTS],
}

impl OwnerCache {
    fn new() -> Self {
        Self { slots: [None; OWNER_CACHE_SLOTS] }
    }

    fn owner<F>(&mut self, entity: EntityHandle, find: F) -> Option<CellKey>
    where
        F: FnOnce() -> Option<CellKey>,
    {
        let slot = &mut self.slots[entity.id as usize % OWNER_CACHE_SLOTS];
        match *slot {
            Some((cached, owner)) if cached == entity => Some(owner),
            _ => {
                let owner = find()?;
                *slot = Some((entity, owner));
                Some(owner)
            }
        }
    }
}

// ===== GRID =====

/// Uniform hash grid partitioner.
pub struct GridPartitioner {
    config: GridConfig,
    /// Occupied cells only; an emptied cell is removed from the map
    cells: FxHashMap<CellKey, Vec<EntityHandle>>,
    /// Reverse index: entity → cell range it currently occupies
    entities: FxHashMap<EntityHandle, CellRange>,
    /// Storage of emptied cells kept for reuse (pooling only)
    spare_cells: Vec<Vec<EntityHandle>>,
}

impl GridPartitioner {
    /// Create an empty grid.
    ///
    /// Fails if the cell size is not strictly positive and finite, or if the
    /// world bounds are inverted or not finite.
    pub fn new(config: GridConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|error| Engine::log_and_return_error(SOURCE, error))?;

        engine_debug!(
            SOURCE,
            "Created grid (cell size {}, pooling {}, deterministic {})",
            config.cell_size,
            config.use_node_pooling,
            config.deterministic_mode
        );

        Ok(Self {
            config,
            cells: FxHashMap::default(),
            entities: FxHashMap::default(),
            spare_cells: Vec::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    /// Cell holding a world position.
    pub fn cell_key(&self, position: Vec3) -> CellKey {
        let size = self.config.cell_size;
        CellKey(
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
            (position.z / size).floor() as i32,
        )
    }

    /// World-space box of a cell.
    pub fn cell_bounds(&self, key: CellKey) -> SpatialBounds {
        let size = self.config.cell_size;
        let min = Vec3::new(key.0 as f32, key.1 as f32, key.2 as f32) * size;
        SpatialBounds::new(min, min + Vec3::splat(size))
    }

    /// Occupants of one cell (empty for unoccupied cells).
    pub fn cell_entities(&self, key: CellKey) -> &[EntityHandle] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_range(&self, bounds: &SpatialBounds) -> CellRange {
        CellRange {
            min: self.cell_key(bounds.min),
            max: self.cell_key(bounds.max),
        }
    }

    fn add_to_cell(&mut self, key: CellKey, entity: EntityHandle) {
        let spare_cells = &mut self.spare_cells;
        self.cells
            .entry(key)
            .or_insert_with(|| spare_cells.pop().unwrap_or_default())
            .push(entity);
    }

    fn remove_from_cell(&mut self, key: CellKey, entity: EntityHandle) {
        let Some(occupants) = self.cells.get_mut(&key) else {
            return;
        };
        if let Some(pos) = occupants.iter().position(|&e| e == entity) {
            occupants.swap_remove(pos);
        }
        if occupants.is_empty() {
            if let Some(storage) = self.cells.remove(&key) {
                if self.config.use_node_pooling {
                    self.spare_cells.push(storage);
                }
            }
        }
    }

    // ===== QUERIES =====

    fn collect<S: QuerySink>(&self, query: SpatialQuery<'_>, sink: &mut S) -> bool {
        match query {
            SpatialQuery::Point(point) => match self.cells.get(&self.cell_key(point)) {
                Some(occupants) => sink.push_all(occupants),
                None => true,
            },
            SpatialQuery::Radius { center, radius } => {
                if !(radius >= 0.0) {
                    return true;
                }
                let sphere_box = SpatialBounds::from_center_half_extents(center, Vec3::splat(radius));
                let accepts = |cell: &SpatialBounds| cell.intersects_sphere(center, radius);
                self.collect_range(self.cell_range(&sphere_box), &accepts, sink)
            }
            SpatialQuery::Bounds(bounds) => {
                self.collect_range(self.cell_range(&bounds), &|_: &SpatialBounds| true, sink)
            }
            SpatialQuery::Frustum(frustum) => self.collect_frustum(frustum, sink),
        }
    }

    /// Union the occupants of every accepted cell of `range`.
    ///
    /// Walks the range when it is smaller than the occupied set, otherwise
    /// walks the occupied cells and filters by range.
    fn collect_range<F, S>(&self, range: CellRange, accepts: &F, sink: &mut S) -> bool
    where
        F: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        if range.is_empty() || self.cells.is_empty() {
            return true;
        }

        let mut owners = OwnerCache::new();
        if range.cell_count() <= self.cells.len() as u64 {
            for key in range.iter() {
                if let Some(occupants) = self.cells.get(&key) {
                    if accepts(&self.cell_bounds(key))
                        && !self.emit_cell(key, occupants, Some(&range), accepts, &mut owners, sink)
                    {
                        return false;
                    }
                }
            }
        } else {
            for (&key, occupants) in &self.cells {
                if range.contains(key)
                    && accepts(&self.cell_bounds(key))
                    && !self.emit_cell(key, occupants, Some(&range), accepts, &mut owners, sink)
                {
                    return false;
                }
            }
        }
        true
    }

    /// Every occupied cell not wholly outside the frustum contributes.
    fn collect_frustum<S: QuerySink>(&self, frustum: &Frustum, sink: &mut S) -> bool {
        let accepts = |cell: &SpatialBounds| frustum.intersects_aabb(cell);
        let mut owners = OwnerCache::new();
        for (&key, occupants) in &self.cells {
            if accepts(&self.cell_bounds(key))
                && !self.emit_cell(key, occupants, None, &accepts, &mut owners, sink)
            {
                return false;
            }
        }
        true
    }

    /// Emit the occupants of an accepted cell that this cell owns.
    fn emit_cell<F, S>(
        &self,
        key: CellKey,
        occupants: &[EntityHandle],
        clip: Option<&CellRange>,
        accepts: &F,
        owners: &mut OwnerCache,
        sink: &mut S,
    ) -> bool
    where
        F: Fn(&SpatialBounds) -> bool,
        S: QuerySink,
    {
        for &entity in occupants {
            let Some(range) = self.entities.get(&entity) else {
                continue;
            };
            let owned = range.is_single()
                || owners.owner(entity, || self.first_accepted(range, clip, accepts)) == Some(key);
            if owned && !sink.push(entity) {
                return false;
            }
        }
        true
    }

    /// First accepted cell of the entity's range (clipped to the query range
    /// when there is one).
    ///
    /// The emitting cell is itself accepted, so the walk always stops on or
    /// before it.
    fn first_accepted<F>(&self, range: &CellRange, clip: Option<&CellRange>, accepts: &F) -> Option<CellKey>
    where
        F: Fn(&SpatialBounds) -> bool,
    {
        let candidates = match clip {
            Some(clip) => range.intersection(clip),
            None => *range,
        };
        candidates.iter().find(|&cell| accepts(&self.cell_bounds(cell)))
    }
}

// ===== SPATIAL PARTITIONER TRAIT =====

impl SpatialPartitioner for GridPartitioner {
    fn update(&mut self, entity: EntityHandle, position: Vec3, bounds: Option<SpatialBounds>) {
        let bounds = bounds.unwrap_or(SpatialBounds::from_point(position));
        let new_range = self.cell_range(&bounds);

        match self.entities.get(&entity).copied() {
            Some(old_range) if old_range == new_range => return,
            Some(old_range) => {
                // Stale memberships first, then the new ones
                for key in old_range.iter() {
                    if !new_range.contains(key) {
                        self.remove_from_cell(key, entity);
                    }
                }
                for key in new_range.iter() {
                    if !old_range.contains(key) {
                        self.add_to_cell(key, entity);
                    }
                }
                engine_trace!(SOURCE, "Moved entity {} to cells {:?}..{:?}", entity.id, new_range.min, new_range.max);
            }
            None => {
                for key in new_range.iter() {
                    self.add_to_cell(key, entity);
                }
            }
        }

        self.entities.insert(entity, new_range);
    }

    fn remove(&mut self, entity: EntityHandle) {
        if let Some(range) = self.entities.remove(&entity) {
            for key in range.iter() {
                self.remove_from_cell(key, entity);
            }
        }
    }

    fn clear(&mut self) {
        if self.config.use_node_pooling {
            for (_, mut occupants) in self.cells.drain() {
                occupants.clear();
                self.spare_cells.push(occupants);
            }
        } else {
            self.cells = FxHashMap::default();
            self.spare_cells = Vec::new();
        }
        self.entities.clear();

        engine_debug!(SOURCE, "Cleared grid ({} spare cells)", self.spare_cells.len());
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn contains(&self, entity: EntityHandle) -> bool {
        self.entities.contains_key(&entity)
    }

    fn stats(&self) -> PartitionerStats {
        PartitionerStats {
            entity_count: self.entities.len(),
            live_nodes: self.cells.len(),
            pooled_nodes: self.spare_cells.len(),
            deepest_level: 0,
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
#[path = "grid_tests.rs"]
mod tests;

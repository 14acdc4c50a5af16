/// Query contract shared by every spatial partitioner.
///
/// All implementations (grid, quadtree, octree, brute force) answer the same
/// four queries, each in three forms:
/// - `query_*` returns an owned `Vec`
/// - `query_*_into` appends to a caller `Vec` (reuse across frames)
/// - `query_*_span` writes into a fixed buffer and returns the count, or
///   `SPAN_OVERFLOW` when the buffer is too small
///
/// Results are conservative (false positives allowed, false negatives never)
/// and contain each entity at most once.
///
/// Ownership: the caller creates and owns the partitioner and drives it from
/// its tick loop (`update` / `remove`), then queries it when needed.

use glam::Vec3;
use rdst::RadixSort;
use crate::camera::Frustum;
use super::bounds::SpatialBounds;
use super::entity::EntityHandle;

/// Returned by `*_span` queries when the buffer cannot hold every match.
///
/// The buffer contents are unspecified in that case; nothing is truncated
/// into a usable partial result.
pub const SPAN_OVERFLOW: i32 = -1;

/// A query region.
#[derive(Debug, Clone, Copy)]
pub enum SpatialQuery<'a> {
    /// Entities overlapping the point (the whole cell for the grid)
    Point(Vec3),
    /// Entities overlapping a sphere
    Radius { center: Vec3, radius: f32 },
    /// Entities overlapping an axis-aligned box
    Bounds(SpatialBounds),
    /// Entities overlapping the viewing volume
    Frustum(&'a Frustum),
}

/// Diagnostic counters for debugging overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartitionerStats {
    /// Distinct tracked entities
    pub entity_count: usize,
    /// Live cells (grid) or reachable nodes (trees)
    pub live_nodes: usize,
    /// Retired storage kept for reuse (cells or child blocks).
    ///
    /// Without node pooling a tree still counts the retired blocks below its
    /// highest live block: those arena slots stay allocated (their entity
    /// lists are released) until the blocks above them retire too.
    pub pooled_nodes: usize,
    /// Depth of the deepest reachable node (0 for flat structures)
    pub deepest_level: u32,
}

/// Trait for broadphase spatial indexing of entities.
///
/// Object safe: callers may hold a `Box<dyn SpatialPartitioner>` chosen at
/// startup, or pass `&dyn SpatialPartitioner` to a culler.
pub trait SpatialPartitioner: Send + Sync {
    /// Insert or move an entity.
    ///
    /// `bounds = None` indexes the entity as a point at `position`.
    fn update(&mut self, entity: EntityHandle, position: Vec3, bounds: Option<SpatialBounds>);

    /// Stop tracking an entity. Unknown entities are ignored.
    fn remove(&mut self, entity: EntityHandle);

    /// Stop tracking every entity.
    fn clear(&mut self);

    /// Number of distinct tracked entities.
    fn entity_count(&self) -> usize;

    /// Whether the entity is currently tracked.
    fn contains(&self, entity: EntityHandle) -> bool;

    fn stats(&self) -> PartitionerStats;

    /// Append every match of `query` to `results`.
    ///
    /// In deterministic mode only the appended range is sorted.
    fn query_into(&self, query: SpatialQuery<'_>, results: &mut Vec<EntityHandle>);

    /// Write every match of `query` into `buffer`.
    ///
    /// Returns the number written, or `SPAN_OVERFLOW`.
    fn query_span(&self, query: SpatialQuery<'_>, buffer: &mut [EntityHandle]) -> i32;

    fn query(&self, query: SpatialQuery<'_>) -> Vec<EntityHandle> {
        let mut results = Vec::new();
        self.query_into(query, &mut results);
        results
    }

    // ===== POINT =====

    fn query_point(&self, point: Vec3) -> Vec<EntityHandle> {
        self.query(SpatialQuery::Point(point))
    }

    fn query_point_into(&self, point: Vec3, results: &mut Vec<EntityHandle>) {
        self.query_into(SpatialQuery::Point(point), results)
    }

    fn query_point_span(&self, point: Vec3, buffer: &mut [EntityHandle]) -> i32 {
        self.query_span(SpatialQuery::Point(point), buffer)
    }

    // ===== RADIUS =====

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityHandle> {
        self.query(SpatialQuery::Radius { center, radius })
    }

    fn query_radius_into(&self, center: Vec3, radius: f32, results: &mut Vec<EntityHandle>) {
        self.query_into(SpatialQuery::Radius { center, radius }, results)
    }

    fn query_radius_span(&self, center: Vec3, radius: f32, buffer: &mut [EntityHandle]) -> i32 {
        self.query_span(SpatialQuery::Radius { center, radius }, buffer)
    }

    // ===== BOUNDS =====

    fn query_bounds(&self, min: Vec3, max: Vec3) -> Vec<EntityHandle> {
        self.query(SpatialQuery::Bounds(SpatialBounds::new(min, max)))
    }

    fn query_bounds_into(&self, min: Vec3, max: Vec3, results: &mut Vec<EntityHandle>) {
        self.query_into(SpatialQuery::Bounds(SpatialBounds::new(min, max)), results)
    }

    fn query_bounds_span(&self, min: Vec3, max: Vec3, buffer: &mut [EntityHandle]) -> i32 {
        self.query_span(SpatialQuery::Bounds(SpatialBounds::new(min, max)), buffer)
    }

    // ===== FRUSTUM =====

    fn query_frustum(&self, frustum: &Frustum) -> Vec<EntityHandle> {
        self.query(SpatialQuery::Frustum(frustum))
    }

    fn query_frustum_into(&self, frustum: &Frustum, results: &mut Vec<EntityHandle>) {
        self.query_into(SpatialQuery::Frustum(frustum), results)
    }

    fn query_frustum_span(&self, frustum: &Frustum, buffer: &mut [EntityHandle]) -> i32 {
        self.query_span(SpatialQuery::Frustum(frustum), buffer)
    }
}

// ===== RESULT SINKS (crate-internal) =====

/// Destination of a running query.
///
/// `push` / `push_all` return `false` once the sink is full; the query must
/// stop immediately.
pub(crate) trait QuerySink {
    fn push(&mut self, entity: EntityHandle) -> bool;

    fn push_all(&mut self, entities: &[EntityHandle]) -> bool {
        entities.iter().all(|&entity| self.push(entity))
    }
}

impl QuerySink for Vec<EntityHandle> {
    #[inline]
    fn push(&mut self, entity: EntityHandle) -> bool {
        Vec::push(self, entity);
        true
    }

    fn push_all(&mut self, entities: &[EntityHandle]) -> bool {
        self.extend_from_slice(entities);
        true
    }
}

/// Bounded writer over a caller-provided span.
pub(crate) struct SpanWriter<'b> {
    buffer: &'b mut [EntityHandle],
    len: usize,
}

impl<'b> SpanWriter<'b> {
    pub(crate) fn new(buffer: &'b mut [EntityHandle]) -> Self {
        Self { buffer, len: 0 }
    }

    /// Sort the written prefix if requested and convert the count.
    pub(crate) fn finish(self, deterministic: bool) -> i32 {
        let written = &mut self.buffer[..self.len];
        if deterministic {
            written.radix_sort_unstable();
        }
        i32::try_from(self.len).unwrap_or(SPAN_OVERFLOW)
    }
}

impl QuerySink for SpanWriter<'_> {
    #[inline]
    fn push(&mut self, entity: EntityHandle) -> bool {
        match self.buffer.get_mut(self.len) {
            Some(slot) => {
                *slot = entity;
                self.len += 1;
                true
            }
            None => false,
        }
    }

    fn push_all(&mut self, entities: &[EntityHandle]) -> bool {
        let end = self.len + entities.len();
        if end > self.buffer.len() {
            return false;
        }
        self.buffer[self.len..end].copy_from_slice(entities);
        self.len = end;
        true
    }
}

/// Sort the range appended by the last query (deterministic mode).
pub(crate) fn sort_appended(results: &mut [EntityHandle], start: usize, deterministic: bool) {
    if deterministic && results.len() - start > 1 {
        results[start..].radix_sort_unstable();
    }
}

/// Run a span query through a partitioner's collector.
///
/// `collect` returns `false` when it aborted on overflow.
pub(crate) fn run_span<F>(buffer: &mut [EntityHandle], deterministic: bool, collect: F) -> i32
where
    F: FnOnce(&mut SpanWriter<'_>) -> bool,
{
    let mut writer = SpanWriter::new(buffer);
    if !collect(&mut writer) {
        return SPAN_OVERFLOW;
    }
    writer.finish(deterministic)
}

/// Run an appending query through a partitioner's collector.
pub(crate) fn run_into<F>(results: &mut Vec<EntityHandle>, deterministic: bool, collect: F)
where
    F: FnOnce(&mut Vec<EntityHandle>) -> bool,
{
    let start = results.len();
    collect(results);
    sort_appended(results, start, deterministic);
}

#[cfg(test)]
#[path = "partitioner_tests.rs"]
mod tests;

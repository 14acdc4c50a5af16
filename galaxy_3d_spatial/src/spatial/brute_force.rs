/// BruteForcePartitioner — linear scan over every tracked entity.
///
/// Suitable for small worlds or as a baseline for comparison: every query
/// tests every entity's bounds exactly, so its results are the minimal set
/// the other partitioners must contain.

use rustc_hash::FxHashMap;
use glam::Vec3;
use super::bounds::SpatialBounds;
use super::entity::EntityHandle;
use super::partitioner::{
    run_into, run_span, PartitionerStats, QuerySink, SpatialPartitioner, SpatialQuery,
};

/// Linear-scan partitioner.
pub struct BruteForcePartitioner {
    entries: Vec<(EntityHandle, SpatialBounds)>,
    /// Reverse index: entity → position in `entries`
    index: FxHashMap<EntityHandle, usize>,
    deterministic_mode: bool,
}

impl BruteForcePartitioner {
    pub fn new(deterministic_mode: bool) -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
            deterministic_mode,
        }
    }

    fn collect<S: QuerySink>(&self, query: SpatialQuery<'_>, sink: &mut S) -> bool {
        for &(entity, bounds) in &self.entries {
            let hit = match query {
                SpatialQuery::Point(point) => bounds.contains_point(point),
                SpatialQuery::Radius { center, radius } => bounds.intersects_sphere(center, radius),
                SpatialQuery::Bounds(region) => bounds.intersects(&region),
                SpatialQuery::Frustum(frustum) => frustum.intersects_aabb(&bounds),
            };
            if hit && !sink.push(entity) {
                return false;
            }
        }
        true
    }
}

impl Default for BruteForcePartitioner {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SpatialPartitioner for BruteForcePartitioner {
    fn update(&mut self, entity: EntityHandle, position: Vec3, bounds: Option<SpatialBounds>) {
        let bounds = bounds.unwrap_or(SpatialBounds::from_point(position));
        match self.index.get(&entity) {
            Some(&slot) => self.entries[slot].1 = bounds,
            None => {
                self.index.insert(entity, self.entries.len());
                self.entries.push((entity, bounds));
            }
        }
    }

    fn remove(&mut self, entity: EntityHandle) {
        let Some(slot) = self.index.remove(&entity) else {
            return;
        };
        self.entries.swap_remove(slot);
        if let Some(&(moved, _)) = self.entries.get(slot) {
            self.index.insert(moved, slot);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn entity_count(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, entity: EntityHandle) -> bool {
        self.index.contains_key(&entity)
    }

    fn stats(&self) -> PartitionerStats {
        PartitionerStats {
            entity_count: self.entries.len(),
            live_nodes: 1,
            pooled_nodes: 0,
            deepest_level: 0,
        }
    }

    fn query_into(&self, query: SpatialQuery<'_>, results: &mut Vec<EntityHandle>) {
        run_into(results, self.deterministic_mode, |sink| self.collect(query, sink));
    }

    fn query_span(&self, query: SpatialQuery<'_>, buffer: &mut [EntityHandle]) -> i32 {
        run_span(buffer, self.deterministic_mode, |sink| self.collect(query, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SPAN_OVERFLOW;

    fn h(id: u32) -> EntityHandle {
        EntityHandle::new(id, 0)
    }

    #[test]
    fn test_swap_remove_keeps_index_valid() {
        let mut brute = BruteForcePartitioner::new(true);
        for id in 0..4 {
            brute.update(h(id), Vec3::splat(id as f32), None);
        }

        brute.remove(h(0));
        brute.remove(h(0));
        assert_eq!(brute.entity_count(), 3);

        // Entity 3 was moved into slot 0; it must still update and remove
        brute.update(h(3), Vec3::splat(50.0), None);
        assert_eq!(brute.query_point(Vec3::splat(50.0)), vec![h(3)]);
        brute.remove(h(3));
        assert!(!brute.contains(h(3)));
        assert_eq!(brute.entity_count(), 2);
    }

    #[test]
    fn test_exact_tests() {
        let mut brute = BruteForcePartitioner::new(true);
        let bounds = SpatialBounds::new(Vec3::ZERO, Vec3::splat(2.0));
        brute.update(h(1), Vec3::ONE, Some(bounds));
        brute.update(h(2), Vec3::splat(10.0), None);

        assert_eq!(brute.query_point(Vec3::splat(1.5)), vec![h(1)]);
        assert_eq!(brute.query_radius(Vec3::splat(10.0), 0.0), vec![h(2)]);
        assert_eq!(
            brute.query_bounds(Vec3::splat(-1.0), Vec3::splat(20.0)),
            vec![h(1), h(2)]
        );
        assert!(brute.query_bounds(Vec3::splat(3.0), Vec3::splat(9.0)).is_empty());
    }

    #[test]
    fn test_span_overflow() {
        let mut brute = BruteForcePartitioner::default();
        brute.update(h(1), Vec3::ZERO, None);
        brute.update(h(2), Vec3::ZERO, None);

        let mut buffer = [EntityHandle::default(); 1];
        assert_eq!(brute.query_point_span(Vec3::ZERO, &mut buffer), SPAN_OVERFLOW);
    }
}

/// Partitioner configuration: plain value structs, immutable once a
/// partitioner has been built from them.
///
/// Changing parameters requires constructing a new partitioner and
/// re-inserting all entities.

use glam::Vec3;
use crate::error::{Error, Result};

/// Deepest tree level accepted by `TreeConfig::validate`.
///
/// Past this, child extents fall below f32 resolution for any useful world size.
pub const MAX_TREE_DEPTH: u32 = 24;

const DEFAULT_WORLD_HALF_EXTENT: f32 = 1024.0;

fn validate_world(min: Vec3, max: Vec3) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(Error::InvalidWorldBounds(format!(
            "bounds must be finite (min {:?}, max {:?})", min, max
        )));
    }
    for (axis, (lo, hi)) in ["x", "y", "z"].iter().zip(min.to_array().into_iter().zip(max.to_array())) {
        if lo > hi {
            return Err(Error::InvalidWorldBounds(format!(
                "min.{} {} > max.{} {}", axis, lo, axis, hi
            )));
        }
    }
    Ok(())
}

// ===== GRID =====

/// Configuration of a `GridPartitioner`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Edge length of a cubic cell (world units)
    pub cell_size: f32,
    /// Nominal world extent (reported only; the grid is unbounded)
    pub world_min: Vec3,
    pub world_max: Vec3,
    /// Sort every query result by entity id
    pub deterministic_mode: bool,
    /// Recycle emptied cell storage instead of freeing it
    pub use_node_pooling: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            world_min: Vec3::splat(-DEFAULT_WORLD_HALF_EXTENT),
            world_max: Vec3::splat(DEFAULT_WORLD_HALF_EXTENT),
            deterministic_mode: false,
            use_node_pooling: true,
        }
    }
}

impl GridConfig {
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_world(mut self, world_min: Vec3, world_max: Vec3) -> Self {
        self.world_min = world_min;
        self.world_max = world_max;
        self
    }

    pub fn with_deterministic_mode(mut self, enabled: bool) -> Self {
        self.deterministic_mode = enabled;
        self
    }

    pub fn with_node_pooling(mut self, enabled: bool) -> Self {
        self.use_node_pooling = enabled;
        self
    }

    /// Check every field; the first invalid one is reported.
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) || !self.cell_size.is_finite() {
            return Err(Error::InvalidCellSize(self.cell_size));
        }
        validate_world(self.world_min, self.world_max)
    }
}

// ===== TREES =====

/// Configuration shared by `QuadtreePartitioner` and `OctreePartitioner`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// World extent covered by the root node
    pub world_min: Vec3,
    pub world_max: Vec3,
    /// Maximum tree depth (root = 0); nodes at this depth never subdivide
    pub max_depth: u32,
    /// A leaf subdivides once it holds more than this many entities
    pub max_entities_per_node: usize,
    /// Sort every query result by entity id
    pub deterministic_mode: bool,
    /// Recycle retired child blocks through the node pool
    pub use_node_pooling: bool,
}

/// Quadtree configuration (X/Z split; Y of the world is used for culling only).
pub type QuadtreeConfig = TreeConfig;

/// Octree configuration.
pub type OctreeConfig = TreeConfig;

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            world_min: Vec3::splat(-DEFAULT_WORLD_HALF_EXTENT),
            world_max: Vec3::splat(DEFAULT_WORLD_HALF_EXTENT),
            max_depth: 8,
            max_entities_per_node: 8,
            deterministic_mode: false,
            use_node_pooling: true,
        }
    }
}

impl TreeConfig {
    pub fn with_world(mut self, world_min: Vec3, world_max: Vec3) -> Self {
        self.world_min = world_min;
        self.world_max = world_max;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_entities_per_node(mut self, max_entities: usize) -> Self {
        self.max_entities_per_node = max_entities;
        self
    }

    pub fn with_deterministic_mode(mut self, enabled: bool) -> Self {
        self.deterministic_mode = enabled;
        self
    }

    pub fn with_node_pooling(mut self, enabled: bool) -> Self {
        self.use_node_pooling = enabled;
        self
    }

    /// Check every field; the first invalid one is reported.
    pub fn validate(&self) -> Result<()> {
        validate_world(self.world_min, self.world_max)?;
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidMaxDepth(self.max_depth));
        }
        if self.max_entities_per_node == 0 {
            return Err(Error::InvalidNodeCapacity(self.max_entities_per_node));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

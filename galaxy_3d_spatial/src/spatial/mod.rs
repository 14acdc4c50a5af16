//! Spatial partitioning module
//!
//! Broadphase indices answering "which entities are near this point /
//! region / viewing volume": a uniform hash grid, an adaptive quadtree
//! (X/Z) and an adaptive octree, all behind the `SpatialPartitioner` trait.

mod bounds;
mod entity;
mod config;
mod node_pool;
mod partitioner;
mod grid;
mod tree;
mod quadtree;
mod octree;
mod brute_force;
mod culler;

pub use bounds::{Containment, SpatialBounds};
pub use entity::EntityHandle;
pub use config::{GridConfig, TreeConfig, QuadtreeConfig, OctreeConfig, MAX_TREE_DEPTH};
pub use node_pool::NodePool;
pub use partitioner::{SpatialPartitioner, SpatialQuery, PartitionerStats, SPAN_OVERFLOW};
pub use grid::{GridPartitioner, CellKey};
pub use tree::{SpatialTree, TreeLayout};
pub use quadtree::{QuadtreePartitioner, QuadLayout};
pub use octree::{OctreePartitioner, OctLayout};
pub use brute_force::BruteForcePartitioner;
pub use culler::{FrustumCuller, DEFAULT_CULL_CAPACITY};

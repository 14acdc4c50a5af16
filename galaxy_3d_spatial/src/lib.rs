/*!
# Galaxy 3D Spatial

Broadphase spatial partitioning for the Galaxy 3D engine.

Given a dynamic set of entities with positions (and optional extents), the
partitioners answer "which entities are near this point / region / viewing
volume" without scanning every entity. All implementations share one
trait, so the index can be swapped at construction time.

## Architecture

- **SpatialPartitioner**: query contract (point, radius, bounds, frustum),
  each in owned, appending and span (`-1` on overflow) forms
- **GridPartitioner**: uniform hash grid keyed by integer cell coordinates
- **QuadtreePartitioner**: adaptive X/Z tree
- **OctreePartitioner**: adaptive XYZ tree
- **NodePool**: recycled child blocks for the tree arenas
- **FrustumCuller**: per-frame visibility on top of any partitioner
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod spatial;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (logging)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module (camera, frustum)
    pub mod camera {
        pub use crate::camera::*;
    }

    // Spatial sub-module (partitioners, bounds, configuration)
    pub mod spatial {
        pub use crate::spatial::*;
    }
}

// Re-export math library at crate root
pub use glam;

/// Per-frame visibility culling on top of any partitioner.
///
/// Runs the allocation-free span query into a scratch buffer that is reused
/// across frames. When the visible set no longer fits, the frame falls back
/// to the unbounded query and the buffer grows for the next frame.

use crate::camera::Camera;
use crate::engine_debug;
use super::entity::EntityHandle;
use super::partitioner::{SpatialPartitioner, SPAN_OVERFLOW};

const SOURCE: &str = "galaxy3d::FrustumCuller";

/// Scratch capacity of `FrustumCuller::new`.
pub const DEFAULT_CULL_CAPACITY: usize = 1024;

/// Frustum culler. Collects the entities visible from a camera.
///
/// `&mut self` keeps the scratch buffer between frames.
pub struct FrustumCuller {
    scratch: Vec<EntityHandle>,
    visible: usize,
    overflow_count: u64,
}

impl FrustumCuller {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CULL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            scratch: vec![EntityHandle::default(); capacity],
            visible: 0,
            overflow_count: 0,
        }
    }

    /// Cull `index` against the camera frustum.
    pub fn cull(&mut self, camera: &Camera, index: &dyn SpatialPartitioner) -> &[EntityHandle] {
        let frustum = camera.frustum();
        let count = index.query_frustum_span(frustum, &mut self.scratch);

        if count != SPAN_OVERFLOW {
            self.visible = count as usize;
            return &self.scratch[..self.visible];
        }

        // Overflow: unbounded query this frame, larger span next frame
        self.overflow_count += 1;
        self.scratch.clear();
        index.query_frustum_into(frustum, &mut self.scratch);
        self.visible = self.scratch.len();

        let capacity = self.visible.next_power_of_two();
        self.scratch.resize(capacity, EntityHandle::default());
        engine_debug!(SOURCE, "Visible set of {} overflowed, scratch grown to {}", self.visible, capacity);

        &self.scratch[..self.visible]
    }

    /// Result of the last `cull`.
    pub fn visible(&self) -> &[EntityHandle] {
        &self.scratch[..self.visible]
    }

    /// Current scratch capacity.
    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Number of frames that needed the fallback query.
    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }
}

impl Default for FrustumCuller {
    fn default() -> Self {
        Self::new()
    }
}

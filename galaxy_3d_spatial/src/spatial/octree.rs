/// OctreePartitioner — adaptive 8-way tree over all three axes.

use glam::Vec3;
use super::bounds::SpatialBounds;
use super::tree::{SpatialTree, TreeLayout};

/// Octant split geometry.
///
/// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
pub struct OctLayout;

impl TreeLayout for OctLayout {
    const CHILD_COUNT: usize = 8;
    const NAME: &'static str = "galaxy3d::Octree";

    #[inline]
    fn project(bounds: &SpatialBounds) -> SpatialBounds {
        *bounds
    }

    #[inline]
    fn project_point(point: Vec3) -> Vec3 {
        point
    }

    #[inline]
    fn child_index(center: Vec3, point: Vec3) -> usize {
        (point.x >= center.x) as usize
            | (((point.y >= center.y) as usize) << 1)
            | (((point.z >= center.z) as usize) << 2)
    }

    fn child_bounds(parent: &SpatialBounds, center: Vec3, octant: usize) -> SpatialBounds {
        SpatialBounds::new(
            Vec3::new(
                if octant & 1 == 0 { parent.min.x } else { center.x },
                if octant & 2 == 0 { parent.min.y } else { center.y },
                if octant & 4 == 0 { parent.min.z } else { center.z },
            ),
            Vec3::new(
                if octant & 1 == 0 { center.x } else { parent.max.x },
                if octant & 2 == 0 { center.y } else { parent.max.y },
                if octant & 4 == 0 { center.z } else { parent.max.z },
            ),
        )
    }

    #[inline]
    fn culling_volume(node: &SpatialBounds, _vertical_span: Option<(f32, f32)>) -> SpatialBounds {
        *node
    }
}

/// Adaptive octree partitioner.
///
/// # Example
///
/// ```
/// use galaxy_3d_spatial::glam::Vec3;
/// use galaxy_3d_spatial::galaxy3d::spatial::{
///     EntityHandle, OctreeConfig, OctreePartitioner, SpatialPartitioner,
/// };
///
/// let mut octree = OctreePartitioner::new(OctreeConfig::default()).unwrap();
/// octree.update(EntityHandle::new(1, 0), Vec3::new(5.0, 5.0, 5.0), None);
///
/// let nearby = octree.query_radius(Vec3::ZERO, 10.0);
/// assert_eq!(nearby.len(), 1);
/// ```
pub type OctreePartitioner = SpatialTree<OctLayout>;

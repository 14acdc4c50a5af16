/// QuadtreePartitioner — adaptive 4-way tree over the X/Z ground plane.
///
/// Y is ignored for placement, point lookups and radius / box tests (a
/// radius query is a vertical cylinder). Frustum culling still needs a
/// height, so node volumes are extended over the Y range of everything
/// indexed since the last clear.

use glam::Vec3;
use super::bounds::SpatialBounds;
use super::tree::{SpatialTree, TreeLayout};

/// Quadrant split geometry on X/Z.
///
/// Quadrant bit layout: bit0 = X, bit1 = Z (0 = low, 1 = high).
pub struct QuadLayout;

impl TreeLayout for QuadLayout {
    const CHILD_COUNT: usize = 4;
    const NAME: &'static str = "galaxy3d::Quadtree";

    #[inline]
    fn project(bounds: &SpatialBounds) -> SpatialBounds {
        SpatialBounds::new(
            Vec3::new(bounds.min.x, 0.0, bounds.min.z),
            Vec3::new(bounds.max.x, 0.0, bounds.max.z),
        )
    }

    #[inline]
    fn project_point(point: Vec3) -> Vec3 {
        Vec3::new(point.x, 0.0, point.z)
    }

    #[inline]
    fn child_index(center: Vec3, point: Vec3) -> usize {
        (point.x >= center.x) as usize | (((point.z >= center.z) as usize) << 1)
    }

    fn child_bounds(parent: &SpatialBounds, center: Vec3, quadrant: usize) -> SpatialBounds {
        SpatialBounds::new(
            Vec3::new(
                if quadrant & 1 == 0 { parent.min.x } else { center.x },
                parent.min.y,
                if quadrant & 2 == 0 { parent.min.z } else { center.z },
            ),
            Vec3::new(
                if quadrant & 1 == 0 { center.x } else { parent.max.x },
                parent.max.y,
                if quadrant & 2 == 0 { center.z } else { parent.max.z },
            ),
        )
    }

    fn culling_volume(node: &SpatialBounds, vertical_span: Option<(f32, f32)>) -> SpatialBounds {
        match vertical_span {
            Some((bottom, top)) => SpatialBounds::new(
                Vec3::new(node.min.x, bottom, node.min.z),
                Vec3::new(node.max.x, top, node.max.z),
            ),
            None => *node,
        }
    }
}

/// Adaptive quadtree partitioner (X/Z).
pub type QuadtreePartitioner = SpatialTree<QuadLayout>;

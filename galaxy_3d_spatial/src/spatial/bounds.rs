/// Axis-aligned bounds shared by every partitioner.
///
/// `min <= max` on every axis is a caller invariant; it is not validated
/// on updates. An entity without bounds is indexed as the degenerate box
/// at its position.

use glam::Vec3;

/// Result of a 3-way region classification.
///
/// Used by the trees and the grid for hierarchical pruning:
/// - `Outside` → skip the entire subtree / cell
/// - `Inside` → collect everything without further testing
/// - `Partial` → test individual entities and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Volume is entirely outside the query region
    Outside,
    /// Volume is entirely inside the query region
    Inside,
    /// Volume partially overlaps the query region
    Partial,
}

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialBounds {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl SpatialBounds {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box at a single point (point entities).
    pub const fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Box centered on `center` extending `half_extents` along each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Compute the center point of this AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// Bounds are closed: a box touching the boundary is still contained.
    pub fn contains(&self, other: &SpatialBounds) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if a point lies inside (or on the boundary of) this AABB.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
        && point.y >= self.min.y && point.y <= self.max.y
        && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &SpatialBounds) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Squared distance from `point` to the closest point of this AABB
    /// (0 when the point is inside).
    pub fn distance_squared_to_point(&self, point: Vec3) -> f32 {
        let closest = point.clamp(self.min, self.max);
        closest.distance_squared(point)
    }

    /// Test if this AABB overlaps a sphere.
    ///
    /// A negative or NaN radius never intersects anything.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        radius >= 0.0 && self.distance_squared_to_point(center) <= radius * radius
    }

    /// Test if this AABB lies entirely within a sphere.
    ///
    /// Checks the corner farthest from the sphere center.
    pub fn within_sphere(&self, center: Vec3, radius: f32) -> bool {
        if !(radius >= 0.0) {
            return false;
        }
        let far = Vec3::new(
            if center.x - self.min.x > self.max.x - center.x { self.min.x } else { self.max.x },
            if center.y - self.min.y > self.max.y - center.y { self.min.y } else { self.max.y },
            if center.z - self.min.z > self.max.z - center.z { self.min.z } else { self.max.z },
        );
        far.distance_squared(center) <= radius * radius
    }

    /// Classify this AABB against a sphere (3-way test).
    pub fn classify_sphere(&self, center: Vec3, radius: f32) -> Containment {
        if !self.intersects_sphere(center, radius) {
            Containment::Outside
        } else if self.within_sphere(center, radius) {
            Containment::Inside
        } else {
            Containment::Partial
        }
    }

    /// Classify this AABB against a query box (3-way test).
    pub fn classify_box(&self, query: &SpatialBounds) -> Containment {
        if !self.intersects(query) {
            Containment::Outside
        } else if query.contains(self) {
            Containment::Inside
        } else {
            Containment::Partial
        }
    }

    /// Smallest AABB enclosing both boxes.
    pub fn union(&self, other: &SpatialBounds) -> SpatialBounds {
        SpatialBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;

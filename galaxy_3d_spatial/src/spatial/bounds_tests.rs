use glam::Vec3;
use super::*;

fn make_bounds(min: Vec3, max: Vec3) -> SpatialBounds {
    SpatialBounds::new(min, max)
}

// ============================================================================
// Containment / intersection
// ============================================================================

#[test]
fn test_contains() {
    let big = make_bounds(Vec3::splat(-10.0), Vec3::splat(10.0));
    let small = make_bounds(Vec3::splat(-1.0), Vec3::splat(1.0));
    let straddling = make_bounds(Vec3::splat(5.0), Vec3::splat(15.0));

    assert!(big.contains(&small));
    assert!(!small.contains(&big));
    assert!(!big.contains(&straddling));
    // Closed bounds: a box touching the boundary is contained
    assert!(big.contains(&make_bounds(Vec3::splat(0.0), Vec3::splat(10.0))));
}

#[test]
fn test_contains_point() {
    let b = make_bounds(Vec3::ZERO, Vec3::splat(10.0));

    assert!(b.contains_point(Vec3::splat(5.0)));
    assert!(b.contains_point(Vec3::splat(10.0)));
    assert!(!b.contains_point(Vec3::new(10.1, 5.0, 5.0)));
}

#[test]
fn test_intersects() {
    let a = make_bounds(Vec3::splat(-2.0), Vec3::splat(2.0));
    let b = make_bounds(Vec3::splat(1.0), Vec3::splat(3.0));
    let c = make_bounds(Vec3::splat(5.0), Vec3::splat(7.0));
    let touching = make_bounds(Vec3::splat(2.0), Vec3::splat(4.0));

    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert!(a.intersects(&touching));
}

#[test]
fn test_from_point_is_degenerate() {
    let p = Vec3::new(3.0, -4.0, 5.0);
    let b = SpatialBounds::from_point(p);

    assert_eq!(b.min, p);
    assert_eq!(b.max, p);
    assert_eq!(b.size(), Vec3::ZERO);
    assert!(b.contains_point(p));
}

#[test]
fn test_center_and_half_extents() {
    let b = SpatialBounds::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(2.0));

    assert_eq!(b.min, Vec3::new(-1.0, 0.0, 1.0));
    assert_eq!(b.max, Vec3::new(3.0, 4.0, 5.0));
    assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
}

// ============================================================================
// Sphere tests
// ============================================================================

#[test]
fn test_intersects_sphere() {
    let b = make_bounds(Vec3::ZERO, Vec3::splat(10.0));

    assert!(b.intersects_sphere(Vec3::splat(5.0), 1.0));
    assert!(b.intersects_sphere(Vec3::new(12.0, 5.0, 5.0), 2.0));
    assert!(!b.intersects_sphere(Vec3::new(12.0, 5.0, 5.0), 1.9));
}

#[test]
fn test_negative_radius_never_intersects() {
    let b = make_bounds(Vec3::ZERO, Vec3::splat(10.0));

    assert!(!b.intersects_sphere(Vec3::splat(5.0), -1.0));
    assert!(!b.intersects_sphere(Vec3::splat(5.0), f32::NAN));
    assert!(!b.within_sphere(Vec3::splat(5.0), -1.0));
}

#[test]
fn test_classify_sphere() {
    let b = make_bounds(Vec3::ZERO, Vec3::splat(2.0));

    assert_eq!(b.classify_sphere(Vec3::splat(1.0), 10.0), Containment::Inside);
    assert_eq!(b.classify_sphere(Vec3::splat(1.0), 0.5), Containment::Partial);
    assert_eq!(b.classify_sphere(Vec3::splat(50.0), 1.0), Containment::Outside);
}

#[test]
fn test_classify_box() {
    let node = make_bounds(Vec3::ZERO, Vec3::splat(10.0));

    let covering = make_bounds(Vec3::splat(-1.0), Vec3::splat(11.0));
    let overlapping = make_bounds(Vec3::splat(5.0), Vec3::splat(15.0));
    let disjoint = make_bounds(Vec3::splat(20.0), Vec3::splat(30.0));

    assert_eq!(node.classify_box(&covering), Containment::Inside);
    assert_eq!(node.classify_box(&overlapping), Containment::Partial);
    assert_eq!(node.classify_box(&disjoint), Containment::Outside);
}

#[test]
fn test_union() {
    let a = make_bounds(Vec3::new(0.0, -5.0, 0.0), Vec3::splat(1.0));
    let b = make_bounds(Vec3::splat(-2.0), Vec3::new(0.0, 3.0, 0.0));

    let u = a.union(&b);
    assert_eq!(u.min, Vec3::new(-2.0, -5.0, -2.0));
    assert_eq!(u.max, Vec3::new(1.0, 3.0, 1.0));
}

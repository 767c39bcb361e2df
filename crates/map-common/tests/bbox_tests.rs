//! Tests for BoundingBox operations.

use map_common::BoundingBox;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(106.0, -7.0, 107.5, -5.5);
    assert_eq!(bbox.min_x, 106.0);
    assert_eq!(bbox.min_y, -7.0);
    assert_eq!(bbox.max_x, 107.5);
    assert_eq!(bbox.max_y, -5.5);
}

#[test]
fn test_bbox_from_point_is_degenerate() {
    let bbox = BoundingBox::from_point(106.8, -6.2);
    assert_eq!(bbox, BoundingBox::new(106.8, -6.2, 106.8, -6.2));
    assert!(bbox.is_valid());
}

// ============================================================================
// Extent accumulation tests
// ============================================================================

#[test]
fn test_expand_to_include() {
    let mut bbox = BoundingBox::from_point(106.8, -6.2);
    bbox.expand_to_include(107.0, -6.5);
    bbox.expand_to_include(106.9, -6.3);
    assert_eq!(bbox, BoundingBox::new(106.8, -6.5, 107.0, -6.2));
}

#[test]
fn test_from_points_order_independent() {
    let points = [(107.0, -6.0), (106.5, -6.5), (106.75, -6.25)];
    let forward = BoundingBox::from_points(points).unwrap();
    let reverse = BoundingBox::from_points(points.into_iter().rev()).unwrap();
    assert_eq!(forward, reverse);
    assert_eq!(forward, BoundingBox::new(106.5, -6.5, 107.0, -6.0));
}

#[test]
fn test_from_points_all_non_finite() {
    assert!(BoundingBox::from_points([(f64::NAN, 0.0), (0.0, f64::INFINITY)]).is_none());
}

// ============================================================================
// Validity tests
// ============================================================================

#[test]
fn test_invalid_bbox() {
    assert!(!BoundingBox::new(10.0, 10.0, 5.0, 5.0).is_valid());
    assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
    assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_valid());
}

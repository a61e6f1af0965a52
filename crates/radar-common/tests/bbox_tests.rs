//! Tests for BoundingBox operations used by the map renderer.

use radar_common::bbox::BoundingBox;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
}

#[test]
fn test_bbox_houston_plot_extent() {
    // Center, zoom and x:y ratio of the default KHGX plot
    let bbox = BoundingBox::around_center(-95.3632700, 29.4718835, 1.5, 25.0 / 18.0);

    assert!((bbox.min_y - 27.9718835).abs() < 1e-9);
    assert!((bbox.max_y - 30.9718835).abs() < 1e-9);
    assert!((bbox.width() - 2.0 * 1.5 * 25.0 / 18.0).abs() < 1e-9);
    assert!((bbox.height() - 3.0).abs() < 1e-9);
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_contains_point_inside_and_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(5.0, 5.0));
    assert!(bbox.contains_point(0.0, 10.0));
    assert!(!bbox.contains_point(-0.1, 5.0));
    assert!(!bbox.contains_point(5.0, 10.1));
}

// ============================================================================
// Graticule tests
// ============================================================================

#[test]
fn test_graticule_starts_at_minimum() {
    let bbox = BoundingBox::around_center(-95.0, 29.0, 1.5, 1.0);
    let lats = bbox.lat_lines(0.5);

    assert_eq!(lats.len(), 6);
    assert_eq!(lats[0], bbox.min_y);
    assert!(lats.iter().all(|&lat| lat < bbox.max_y));
}

#[test]
fn test_graticule_partial_step() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.2, 1.0);
    assert_eq!(bbox.lon_lines(0.5), vec![0.0, 0.5, 1.0]);
}

#[test]
fn test_graticule_degenerate_box() {
    let bbox = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
    assert!(bbox.lon_lines(0.5).is_empty());
    assert!(bbox.lat_lines(0.5).is_empty());
}

use super::Vec2D;

#[test]
fn test_wrap_coordinate_far_outside() {
    assert_eq!(Vec2D::<i32>::wrap_coordinate(-1, 10), 9);
    assert_eq!(Vec2D::<i32>::wrap_coordinate(-25, 10), 5);
    assert!((Vec2D::<f64>::wrap_coordinate(43_250.5, 21600.0) - 50.5).abs() < 1e-9);
}

#[test]
fn test_toroidal_distance_takes_short_way() {
    let a = Vec2D::new(21_500.0, 10_700.0);
    let b = Vec2D::new(100.0, 100.0);
    let d = a.toroidal_distance(&b);
    assert!((d - 200.0_f64.hypot(200.0)).abs() < 1e-9);
    let delta = a.to_wrapped(&b);
    assert!((delta.x() - 200.0).abs() < 1e-9);
    assert!((delta.y() - 200.0).abs() < 1e-9);
}

#[test]
fn test_to_cell_wraps_rounded_edge() {
    let cell = Vec2D::new(21_599.7, -0.2).to_cell();
    assert_eq!(cell, Vec2D::new(0, 0));
}

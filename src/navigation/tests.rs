use super::{VelocityError, crossing_windows, find_velocity, rendezvous_time};
use crate::util::Vec2D;

fn lands_within(pos: Vec2D<f64>, vel: Vec2D<f64>, t: f64, target: Vec2D<f64>, tol: f64) -> bool {
    let end = (pos + vel * t).wrap_around_map();
    let off = end.to_wrapped(&target);
    off.x().abs() <= tol + 1e-6 && off.y().abs() <= tol + 1e-6
}

#[test]
fn test_rendezvous_both_axes_moving() {
    let cases = [
        (Vec2D::new(100.0, 200.0), Vec2D::new(10.0, 5.0), 100.0),
        (Vec2D::new(21000.0, 10000.0), Vec2D::new(12.5, 7.25), 5000.0),
        (Vec2D::new(5000.0, 5000.0), Vec2D::new(6.4, 3.8), 3000.0),
        (Vec2D::new(17.0, 10790.0), Vec2D::new(70.0, 41.5), 1234.5),
    ];
    for (pos, vel, flight) in cases {
        let target = (pos + vel * flight).wrap_around_map();
        for tol in [2.0, 20.0, 100.0] {
            let t = rendezvous_time(pos, vel, target, tol);
            assert!(t.is_finite(), "no rendezvous for {pos} -> {target} at {vel}");
            assert!(t >= 0.0 && t <= flight + 1e-6);
            assert!(lands_within(pos, vel, t, target, tol));
        }
    }
}

#[test]
fn test_rendezvous_exact_diagonal() {
    let t = rendezvous_time(Vec2D::new(100.0, 200.0), Vec2D::new(10.0, 5.0), Vec2D::new(1100.0, 700.0), 2.0);
    assert!((t - 99.8).abs() < 1e-9);
}

#[test]
fn test_rendezvous_resting_axis() {
    let vel = Vec2D::new(0.0, 10.0);
    let unreachable = rendezvous_time(Vec2D::new(100.0, 100.0), vel, Vec2D::new(500.0, 600.0), 5.0);
    assert!(unreachable.is_infinite());

    let t = rendezvous_time(Vec2D::new(100.0, 100.0), vel, Vec2D::new(103.0, 600.0), 5.0);
    assert!((t - 49.5).abs() < 1e-9);

    let wrapped = rendezvous_time(Vec2D::new(21598.0, 10700.0), vel, Vec2D::new(1.0, 100.0), 5.0);
    assert!((wrapped - 19.5).abs() < 1e-9);
}

#[test]
fn test_rendezvous_already_there() {
    let t = rendezvous_time(Vec2D::new(50.0, 50.0), Vec2D::new(7.0, 9.0), Vec2D::new(51.0, 49.0), 5.0);
    assert!(t.abs() < f64::EPSILON);
}

#[test]
fn test_crossing_windows_sorted_and_nonnegative() {
    let windows = crossing_windows(21500.0, -8.0, 100.0, 21600.0, 10.0);
    assert!(!windows.is_empty());
    assert!(windows.iter().all(|(s, e)| *s >= 0.0 && s <= e));
    assert!(windows.windows(2).all(|w| w[0].0 <= w[1].0));
    // Moving left the target is 21400 cells ahead.
    assert!((windows[0].0 - (21400.0 - 10.0) / 8.0).abs() < 1e-9);
}

#[test]
fn test_velocity_within_bounds_and_hits_target() {
    let cases = [
        (Vec2D::new(10000.0, 5030.0), Vec2D::new(11.42, 70.08), Vec2D::new(10001.0, 8030.0)),
        (Vec2D::new(15347.0, 3.0), Vec2D::new(33.45, 63.11), Vec2D::new(536.0, 1.0)),
        (Vec2D::new(0.0, 0.0), Vec2D::new(3.1, 3.2), Vec2D::new(21000.0, 500.0)),
        (Vec2D::new(4000.0, 9000.0), Vec2D::new(71.0, 3.0), Vec2D::new(4000.0, 9000.0)),
        (Vec2D::new(18000.0, 200.0), Vec2D::new(5.0, 40.0), Vec2D::new(6000.0, 7000.0)),
    ];
    for (pos, vel, target) in cases {
        let sol = find_velocity(pos, vel, target).unwrap();
        let v = sol.vel();
        assert!((3.0..=71.0).contains(&v.x()), "vx {} out of bounds", v.x());
        assert!((3.0..=71.0).contains(&v.y()), "vy {} out of bounds", v.y());
        let end = (pos + v * sol.travel_time()).wrap_around_map();
        assert!(end.toroidal_distance(&target) < 1.0, "{end} misses {target}");
    }
}

#[test]
fn test_velocity_keeps_speed() {
    let vel = Vec2D::new(20.0, 30.0);
    let sol = find_velocity(Vec2D::new(100.0, 100.0), vel, Vec2D::new(3000.0, 4000.0)).unwrap();
    assert!((sol.vel().abs() - vel.abs()).abs() < 1e-9);
}

#[test]
fn test_velocity_error_display() {
    assert_eq!(VelocityError::Unreachable.to_string(), "Unreachable");
}

#[test]
fn test_velocity_unreachable_when_slow_window_has_no_direction() {
    // At this speed every copy of the target needs one axis below the minimum velocity.
    assert_eq!(
        find_velocity(Vec2D::new(0.0, 0.0), Vec2D::new(3.0, 3.6), Vec2D::new(21000.0, 5000.0)),
        Err(VelocityError::Unreachable)
    );
}

use super::{BeaconBoard, BeaconLocalizer, IdRegistry, ObjectiveProgress, RangeSample, ZonedObjective};
use crate::flight_control::CameraAngle;
use crate::util::Vec2D;
use chrono::{TimeDelta, Utc};
use std::path::PathBuf;

fn noiseless(beacon: Vec2D<f64>, positions: &[(f64, f64)]) -> Vec<RangeSample> {
    positions
        .iter()
        .map(|&(x, y)| {
            let pos = Vec2D::new(x, y);
            RangeSample::new(pos, pos.toroidal_distance(&beacon))
        })
        .collect()
}

#[test]
fn test_localize_recovers_beacon() {
    let beacon = Vec2D::new(5000.0, 3000.0);
    let samples = noiseless(beacon, &[(4000.0, 2500.0), (6000.0, 2600.0), (5200.0, 4200.0)]);
    let est = BeaconLocalizer::localize(&samples).unwrap();
    assert!(est.toroidal_distance(&beacon) < 5.0, "estimate {est} too far from {beacon}");
}

#[test]
fn test_localize_across_map_edge() {
    let beacon = Vec2D::new(100.0, 200.0);
    let samples = noiseless(beacon, &[(21_000.0, 100.0), (700.0, 50.0), (300.0, 900.0)]);
    let est = BeaconLocalizer::localize(&samples).unwrap();
    assert!(est.toroidal_distance(&beacon) < 5.0, "estimate {est} too far from {beacon}");
}

#[test]
fn test_localize_is_deterministic() {
    let beacon = Vec2D::new(12_000.0, 7000.0);
    let samples = noiseless(
        beacon,
        &[(11_200.0, 6400.0), (12_900.0, 6300.0), (12_100.0, 7900.0), (11_000.0, 7600.0)],
    );
    let a = BeaconLocalizer::localize(&samples).unwrap();
    let b = BeaconLocalizer::localize(&samples).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_localize_needs_two_positions() {
    let single = vec![
        RangeSample::new(Vec2D::new(10.0, 10.0), 500.0),
        RangeSample::new(Vec2D::new(10.2, 9.9), 510.0),
    ];
    assert!(BeaconLocalizer::localize(&single).is_none());
    assert!(BeaconLocalizer::localize(&[]).is_none());
}

#[test]
fn test_id_registry_evicts_oldest() {
    let mut reg = IdRegistry::new(2);
    assert!(reg.insert(1));
    assert!(!reg.insert(1));
    assert!(reg.insert(2));
    assert!(reg.insert(3));
    assert!(!reg.contains(1));
    assert!(reg.contains(2) && reg.contains(3));
    assert_eq!(reg.len(), 2);
}

#[tokio::test]
async fn test_board_rejects_past_and_foreign_ids() {
    let board = BeaconBoard::new();
    assert!(board.activate(7).await);
    assert!(!board.activate(8).await);
    let sample = RangeSample::new(Vec2D::new(1.0, 2.0), 100.0);
    assert_eq!(board.record_ping(8, sample).await, None);
    assert_eq!(board.record_ping(7, sample).await, Some(1));
    assert_eq!(board.retire().await.map(|t| t.id()), Some(7));
    assert!(!board.activate(7).await);
    assert!(board.activate(8).await);
}

#[test]
fn test_unique_samples_drops_duplicates() {
    let mut task = super::BeaconTask::new(3);
    let s = RangeSample::new(Vec2D::new(100.0, 100.0), 900.0);
    task.add_sample(s);
    task.add_sample(s);
    task.add_sample(RangeSample::new(Vec2D::new(160.0, 100.0), 880.0));
    assert_eq!(task.pings(), 3);
    assert_eq!(task.unique_samples().len(), 2);
}

#[test]
fn test_sweep_covers_zone_serpentine() {
    let now = Utc::now();
    let obj = ZonedObjective::new(
        1,
        now,
        now + TimeDelta::hours(1),
        [1000, 1000, 2500, 2000],
        CameraAngle::Narrow,
        false,
        1.0,
    );
    let stops: Vec<_> = obj.sweep_stops().into_iter().collect();
    // 1500 wide -> 3 columns, 1000 high -> 2 rows at footprint 600
    assert_eq!(stops.len(), 6);
    assert_eq!(stops[0], Vec2D::new(1300.0, 1300.0));
    assert_eq!(stops[2], Vec2D::new(2200.0, 1300.0));
    assert_eq!(stops[3], Vec2D::new(2200.0, 1700.0));
    assert_eq!(stops[5], Vec2D::new(1300.0, 1700.0));
}

#[test]
fn test_small_zone_single_stop_across_edge() {
    let now = Utc::now();
    let obj = ZonedObjective::new(
        2,
        now,
        now + TimeDelta::hours(1),
        [21_500, 100, 100, 300],
        CameraAngle::Wide,
        false,
        1.0,
    );
    assert_eq!(obj.extent(), Vec2D::new(200, 200));
    let stops = obj.sweep_stops();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0], Vec2D::new(0.0, 200.0));
}

#[test]
fn test_progress_tracks_images() {
    let now = Utc::now();
    let obj =
        ZonedObjective::new(3, now, now, [0, 0, 1200, 500], CameraAngle::Narrow, false, 1.0);
    let mut progress = ObjectiveProgress::new(obj);
    assert_eq!(progress.remaining(), 2);
    progress.complete_stop(PathBuf::from("a.png"));
    progress.skip_stop();
    assert!(progress.next_stop().is_none());
    assert_eq!(progress.images().len(), 1);
}

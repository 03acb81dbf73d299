use super::{CrashRecovery, Fault, FaultKind};
use crate::config::CommanderConfig;
use crate::flight_control::{CameraAngle, FlightState, mock_vehicle::MockVehicle};
use crate::http_handler::CommunicationSlot;
use crate::imaging::CoverageMap;
use crate::logger::AuditLog;
use crate::util::Vec2D;
use chrono::{TimeDelta, Utc};
use std::{path::Path, sync::Arc, time::Duration};

fn recovery(dir: &Path, vehicle: Arc<MockVehicle>) -> CrashRecovery {
    let config = CommanderConfig::with_work_dir(dir, Duration::from_secs(1), Duration::from_secs(5));
    CrashRecovery::new(vehicle, AuditLog::new(dir), config)
}

fn vehicle() -> Arc<MockVehicle> {
    Arc::new(MockVehicle::new(
        Vec2D::new(100.0, 200.0),
        Vec2D::new(8.0, 8.0),
        FlightState::Acquisition,
        50.0,
    ))
}

#[tokio::test]
async fn test_secure_charges_logs_books_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let vehicle = vehicle();
    let now = Utc::now();
    vehicle.set_slots(vec![
        CommunicationSlot::new(1, now - TimeDelta::hours(2), now - TimeDelta::hours(1), true),
        CommunicationSlot::new(3, now + TimeDelta::hours(3), now + TimeDelta::hours(4), false),
        CommunicationSlot::new(2, now + TimeDelta::hours(1), now + TimeDelta::hours(2), false),
    ]);
    let mut map = CoverageMap::from_map_size();
    map.update_region(500, 500, CameraAngle::Narrow, true);
    let fault = Fault::new(FaultKind::MalformedTelemetry, "http_vehicle.rs:77", "unknown state");

    let slot = recovery(dir.path(), vehicle.clone()).secure(&fault, &map).await;

    assert_eq!(slot, Some(2));
    assert_eq!(vehicle.bookings(), vec![(2, true)]);
    assert_eq!(vehicle.commands()[0].state, FlightState::Charge);
    let log = std::fs::read_to_string(dir.path().join(AuditLog::EXCEPTION_FILE)).unwrap();
    assert!(log.contains("Type: MalformedTelemetry"));
    assert!(log.contains("Location: http_vehicle.rs:77"));
    assert!(log.contains("Message: unknown state"));
    let saved = CoverageMap::load(&dir.path().join(CommanderConfig::MAP_FILE)).unwrap();
    assert_eq!(saved.points_taken(), map.points_taken());
    assert!(saved.is_set(500, 500));
}

#[tokio::test]
async fn test_secure_survives_malformed_telemetry() {
    let dir = tempfile::tempdir().unwrap();
    let vehicle = Arc::new(
        MockVehicle::new(Vec2D::new(100.0, 200.0), Vec2D::new(8.0, 8.0), FlightState::Acquisition, 50.0)
            .with_malformed_telemetry(),
    );
    let now = Utc::now();
    vehicle.set_slots(vec![CommunicationSlot::new(7, now + TimeDelta::hours(1), now + TimeDelta::hours(2), false)]);
    let mut map = CoverageMap::from_map_size();
    map.update_region(900, 900, CameraAngle::Wide, true);
    let fault = Fault::new(FaultKind::MalformedTelemetry, "http_vehicle.rs:77", "unknown state 'tumbling'");

    let slot = recovery(dir.path(), vehicle.clone()).secure(&fault, &map).await;

    let saved = CoverageMap::load(&dir.path().join(CommanderConfig::MAP_FILE)).unwrap();
    assert!(saved.is_set(900, 900));
    let log = std::fs::read_to_string(dir.path().join(AuditLog::EXCEPTION_FILE)).unwrap();
    assert!(log.contains("Type: MalformedTelemetry"));
    assert_eq!(vehicle.commands()[0].state, FlightState::Charge);
    assert_eq!(slot, Some(7));
    assert_eq!(vehicle.bookings(), vec![(7, true)]);
}

#[tokio::test]
async fn test_enabled_slot_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let vehicle = vehicle();
    let now = Utc::now();
    vehicle.set_slots(vec![
        CommunicationSlot::new(4, now + TimeDelta::minutes(10), now + TimeDelta::minutes(20), false),
        CommunicationSlot::new(5, now + TimeDelta::hours(1), now + TimeDelta::hours(2), true),
    ]);

    let slot = recovery(dir.path(), vehicle.clone()).reserve_slot().await;

    assert_eq!(slot, Some(5));
    assert!(vehicle.bookings().is_empty());
}

#[tokio::test]
async fn test_no_future_slot_books_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let vehicle = vehicle();
    let now = Utc::now();
    vehicle.set_slots(vec![CommunicationSlot::new(
        1,
        now - TimeDelta::hours(1),
        now - TimeDelta::minutes(30),
        false,
    )]);

    assert_eq!(recovery(dir.path(), vehicle.clone()).reserve_slot().await, None);
    assert!(vehicle.bookings().is_empty());
}

#[tokio::test]
async fn test_charging_vehicle_gets_no_command() {
    let dir = tempfile::tempdir().unwrap();
    let vehicle = vehicle();
    vehicle.set_state(FlightState::Charge);
    let fault = Fault::listener_died("announcement listener", "event stream closed");

    recovery(dir.path(), vehicle.clone()).secure(&fault, &CoverageMap::from_map_size()).await;

    assert!(vehicle.commands().is_empty());
    let log = std::fs::read_to_string(dir.path().join(AuditLog::EXCEPTION_FILE)).unwrap();
    assert!(log.contains("Type: ListenerDied"));
}

#[cfg(unix)]
#[test]
fn test_hand_off_spawns_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let config = CommanderConfig::with_work_dir(dir.path(), Duration::from_secs(1), Duration::from_secs(5))
        .with_fallback_bin("true");
    let recovery = CrashRecovery::new(vehicle(), AuditLog::new(dir.path()), config);

    let status = recovery.hand_off().unwrap().wait().unwrap();

    assert!(status.success());
}

#[test]
fn test_fault_classification_from_payload() {
    let fault = Fault::from_panic(&"Malformed telemetry: unknown state foo");
    assert_eq!(fault.kind(), FaultKind::MalformedTelemetry);
    let fault = Fault::from_panic(&String::from("Cell (30000, 5) out of map bounds"));
    assert_eq!(fault.kind(), FaultKind::MapBounds);
    let fault = Fault::from_panic(&42_u32);
    assert_eq!(fault.kind(), FaultKind::Panic);
    assert_eq!(fault.message(), "non-string panic payload");
}

#[tokio::test]
async fn test_fault_from_panicked_task() {
    let handle = tokio::spawn(async {
        panic!("Cell (1, 2) out of map bounds");
    });
    let fault = Fault::from_join("scanner", handle.await.unwrap_err());
    assert_eq!(fault.kind(), FaultKind::MapBounds);
    assert_eq!(fault.location(), "scanner");
}

#[test]
fn test_io_error_becomes_fault() {
    let fault = Fault::from(std::io::Error::other("disk full"));
    assert_eq!(fault.kind(), FaultKind::Io);
    assert_eq!(fault.to_string(), "Io at io: disk full");
}

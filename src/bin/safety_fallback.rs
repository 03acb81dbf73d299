//! Reduced-functionality process started after a fault in the primary commander.
//!
//! It reloads the persisted coverage map and only scans: no objective poller and no
//! announcement listener run, so beacons and zoned objectives are never serviced.
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]

use melvin_cartographer::{
    config::CommanderConfig,
    flight_control::{FlightComputer, Vehicle},
    http_handler::HttpVehicle,
    imaging::{CoverageMap, ImageCaptureWorker, ImageSink},
    info,
    logger::AuditLog,
    mode_control::{MissionCommander, ModeContext},
    objective::BeaconBoard,
    warn,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let config = CommanderConfig::from_env();
    warn!("Safety fallback active, background scanning only");

    let vehicle: Arc<dyn Vehicle> = Arc::new(HttpVehicle::new(config.base_url()));
    let map = CoverageMap::restore_or_new(&config.map_path());
    info!("Resuming with {:.2}% coverage", map.coverage_fraction() * 100.0);

    let (sink, rx) = ImageSink::new(ImageSink::QUEUE_CAPACITY);
    if let Err(e) = ImageCaptureWorker::new(config.mosaic_path(), ImageCaptureWorker::DEF_SCALE).spawn(rx) {
        warn!("Compositor not started, debug mosaic disabled: {e}");
    }
    let (obj_tx, obj_rx) = mpsc::unbounded_channel();
    drop(obj_tx);
    let ctx = ModeContext::new(Arc::new(BeaconBoard::new()), obj_rx);

    let fc = FlightComputer::new(vehicle, config.poll(), CancellationToken::new());
    let audit = AuditLog::new(config.work_dir());
    let mut commander = MissionCommander::new(fc, ctx, map, audit, config, sink);
    commander.run().await;
}

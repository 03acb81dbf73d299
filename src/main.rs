#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]

use futures::FutureExt;
use melvin_cartographer::{
    config::CommanderConfig,
    flight_control::{FlightComputer, Supervisor, Vehicle},
    http_handler::HttpVehicle,
    imaging::{CoverageMap, ImageCaptureWorker, ImageSink},
    info,
    logger::AuditLog,
    mode_control::{MissionCommander, ModeContext},
    objective::BeaconBoard,
    recovery::{CrashRecovery, Fault},
    warn,
};
use std::{panic::AssertUnwindSafe, sync::Arc};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

#[cfg(all(feature = "profiling", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    Fault::install_panic_hook();
    let config = CommanderConfig::from_env();
    info!("Starting MELVIN against {} in {}", config.base_url(), config.work_dir().display());

    let http = Arc::new(HttpVehicle::new(config.base_url()));
    let vehicle: Arc<dyn Vehicle> = http.clone();
    let c_tok = CancellationToken::new();
    let audit = AuditLog::new(config.work_dir());
    let recovery = CrashRecovery::new(Arc::clone(&vehicle), audit.clone(), config.clone());
    let map = CoverageMap::restore_or_new(&config.map_path());

    let (sink, rx) = ImageSink::new(ImageSink::QUEUE_CAPACITY);
    if let Err(e) = ImageCaptureWorker::new(config.mosaic_path(), ImageCaptureWorker::DEF_SCALE).spawn(rx) {
        warn!("Compositor not started, debug mosaic disabled: {e}");
    }

    let board = Arc::new(BeaconBoard::new());
    let (supervisor, obj_rx) =
        Supervisor::new(Arc::clone(&vehicle), Arc::clone(&board), audit.clone(), config.obj_poll());
    let supervisor = Arc::new(supervisor);
    let lines = match http.announcement_lines() {
        Ok(lines) => lines,
        Err(e) => {
            let fault = Fault::listener_died("announcement listener", e.to_string());
            recovery.handle(&fault, &map).await
        }
    };
    let obj_mon = {
        let sv = Arc::clone(&supervisor);
        let tok = c_tok.clone();
        tokio::spawn(async move { sv.run_obj_mon(tok).await })
    };
    let hub = {
        let sv = Arc::clone(&supervisor);
        let tok = c_tok.clone();
        tokio::spawn(async move { sv.run_announcement_hub(lines, tok).await })
    };

    let fc = FlightComputer::new(vehicle, config.poll(), c_tok.clone());
    let ctx = ModeContext::new(board, obj_rx);
    let mut commander = MissionCommander::new(fc, ctx, map, audit, config, sink);
    let fault = tokio::select! {
        res = AssertUnwindSafe(commander.run()).catch_unwind() => {
            res.err().map(|payload| Fault::from_panic(payload.as_ref()))
        }
        res = obj_mon => listener_fault("objective poller", res),
        res = hub => listener_fault("announcement listener", res),
    };
    c_tok.cancel();
    match fault {
        Some(fault) => recovery.handle(&fault, commander.map()).await,
        None => info!("MELVIN stopped"),
    }
}

fn listener_fault(task: &str, res: Result<Result<(), Fault>, JoinError>) -> Option<Fault> {
    match res {
        Ok(Ok(())) => None,
        Ok(Err(fault)) => Some(fault),
        Err(e) => Some(Fault::from_join(task, e)),
    }
}

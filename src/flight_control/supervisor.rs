use super::vehicle::Vehicle;
use crate::logger::AuditLog;
use crate::objective::{BeaconBoard, IdRegistry, RangeSample, ZonedObjective};
use crate::recovery::Fault;
use crate::{event, obj, warn};
use chrono::Utc;
use futures::{Stream, StreamExt};
use rand::Rng;
use regex::Regex;
use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Detection line, e.g. `GALILEO_MSG_EB_DETECTED_ID_17`.
static DETECTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EB_DETECTED.*?(\d+)\s*$").unwrap());

/// Ping line carrying beacon id and noisy distance, e.g. `GALILEO_MSG_EB,ID_17,DISTANCE_1234.5`.
static PING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ID[_, ]?(\d+).*?DISTANCE[_, ]?(([0-9]*[.])?[0-9]+)").unwrap()
});

/// The two background task detectors.
///
/// The objective poller enqueues newly active zoned objectives, the announcement listener
/// activates beacons and appends range samples. Neither issues vehicle commands.
pub struct Supervisor {
    /// Read-only use: telemetry for ping positions, objective listing.
    vehicle: Arc<dyn Vehicle>,
    /// Shared beacon flag and sample store.
    board: Arc<BeaconBoard>,
    /// Queue of newly detected objectives, consumed by the commander.
    obj_tx: mpsc::UnboundedSender<ZonedObjective>,
    audit: AuditLog,
    obj_poll: Duration,
}

impl Supervisor {
    /// Bound of the de-noising term subtracted from each noisy range.
    pub const JITTER_DELTA: f64 = 75.0;

    pub fn new(
        vehicle: Arc<dyn Vehicle>,
        board: Arc<BeaconBoard>,
        audit: AuditLog,
        obj_poll: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ZonedObjective>) {
        let (obj_tx, obj_rx) = mpsc::unbounded_channel();
        (Self { vehicle, board, obj_tx, audit, obj_poll }, obj_rx)
    }

    /// Polls the objective list every `obj_poll` and enqueues active, non-secret objectives
    /// whose id was never enqueued before.
    ///
    /// Returns `Ok` on cancellation and a fault if the commander dropped its queue.
    pub async fn run_obj_mon(&self, c_tok: CancellationToken) -> Result<(), Fault> {
        let mut seen = IdRegistry::default();
        loop {
            match self.vehicle.list_objectives().await {
                Ok(list) => {
                    let now = Utc::now();
                    for o in list.zoned {
                        if o.is_secret() || !o.is_active(now) || !seen.insert(o.id()) {
                            continue;
                        }
                        obj!("Found new zoned objective {} ending {}", o.id(), o.end());
                        if self.obj_tx.send(o).is_err() {
                            return Err(Fault::listener_died("objective poller", "queue closed"));
                        }
                    }
                }
                Err(e) => warn!("Objective list unavailable: {e}"),
            }
            tokio::select! {
                () = c_tok.cancelled() => return Ok(()),
                () = tokio::time::sleep(self.obj_poll) => {}
            }
        }
    }

    /// Consumes announcement lines until cancelled.
    ///
    /// The end of the stream is a fault: a silently dead listener would stop beacon
    /// detection without any other symptom.
    pub async fn run_announcement_hub<S>(&self, lines: S, c_tok: CancellationToken) -> Result<(), Fault>
    where S: Stream<Item = String> + Unpin + Send {
        let mut lines = lines;
        loop {
            tokio::select! {
                () = c_tok.cancelled() => return Ok(()),
                line = lines.next() => match line {
                    Some(line) => self.handle_announcement(line.trim()).await,
                    None => {
                        return Err(Fault::listener_died("announcement listener", "event stream closed"));
                    }
                }
            }
        }
    }

    /// Handles a single announcement line.
    pub async fn handle_announcement(&self, line: &str) {
        if line.is_empty() {
            return;
        }
        if let Some(id) = Self::parse_detection(line) {
            if self.board.activate(id).await {
                obj!("Beacon {id} detected");
            } else {
                event!("Ignoring detection of beacon {id}");
            }
            return;
        }
        let Some((id, noisy)) = Self::parse_ping(line) else {
            return;
        };
        if self.board.active_id().await != Some(id) {
            event!("Ignoring ping for inactive beacon {id}");
            return;
        }
        let pos = self.vehicle.read_telemetry().await.pos();
        let k: f64 = rand::rng().random_range(-1.0..=1.0);
        let range = Self::estimate_range(noisy, k);
        if let Some(pings) = self.board.record_ping(id, RangeSample::new(pos, range)).await {
            self.audit.ping(id, (pos.x(), pos.y()), range);
            obj!("Ping {pings} for beacon {id} at {pos}: noisy {noisy:.1}, estimated {range:.0}");
        }
    }

    /// Subtracts the de-noising term `k·(3·δ + 0.4·(d + 1))/4` from the noisy range `d`.
    pub fn estimate_range(noisy: f64, k: f64) -> f64 {
        (noisy - k * (3.0 * Self::JITTER_DELTA + 0.4 * (noisy + 1.0)) / 4.0).round().max(0.0)
    }

    pub fn parse_detection(line: &str) -> Option<usize> {
        DETECTION_REGEX.captures(line)?.get(1)?.as_str().parse().ok()
    }

    pub fn parse_ping(line: &str) -> Option<(usize, f64)> {
        if line.to_uppercase().contains("EB_DETECTED") {
            return None;
        }
        let caps = PING_REGEX.captures(line)?;
        let id = caps.get(1)?.as_str().parse().ok()?;
        let dist = caps.get(2)?.as_str().parse().ok()?;
        Some((id, dist))
    }
}

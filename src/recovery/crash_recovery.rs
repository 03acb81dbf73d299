use super::fault::Fault;
use crate::config::CommanderConfig;
use crate::flight_control::{CameraAngle, FlightState, Vehicle};
use crate::imaging::CoverageMap;
use crate::logger::AuditLog;
use crate::util::Vec2D;
use crate::{error, info, warn};
use chrono::Utc;
use futures::FutureExt;
use std::{
    io,
    panic::AssertUnwindSafe,
    process::{Child, Command, Stdio},
    sync::Arc,
    time::Duration,
};

/// Secures the vehicle after an unhandled fault and hands control to the fallback process.
pub struct CrashRecovery {
    vehicle: Arc<dyn Vehicle>,
    audit: AuditLog,
    config: CommanderConfig,
}

impl CrashRecovery {
    /// Upper bound for the telemetry read preceding the charge command.
    const TELEMETRY_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(vehicle: Arc<dyn Vehicle>, audit: AuditLog, config: CommanderConfig) -> Self {
        Self { vehicle, audit, config }
    }

    /// Secures the vehicle, hands off to the fallback and terminates the process.
    pub async fn handle(&self, fault: &Fault, map: &CoverageMap) -> ! {
        self.secure(fault, map).await;
        match self.hand_off() {
            Ok(child) => info!("Fallback started with pid {}", child.id()),
            Err(e) => error!("Could not start fallback {}: {e}", self.config.fallback_bin().display()),
        }
        std::process::exit(1)
    }

    /// Everything before the handoff: diagnostic record, map snapshot, charge mode and
    /// operator slot. Returns the id of the reserved slot, if any.
    ///
    /// Local records are written before any vehicle call. Vehicle steps run under
    /// `catch_unwind`.
    pub async fn secure(&self, fault: &Fault, map: &CoverageMap) -> Option<usize> {
        error!("Unhandled fault: {fault}");
        self.audit.exception(&fault.kind().to_string(), fault.location(), fault.message());
        let path = self.config.map_path();
        match map.save(&path, self.config.compress_map()) {
            Ok(()) => info!("Coverage map secured at {}", path.display()),
            Err(e) => error!("Could not secure coverage map at {}: {e}", path.display()),
        }
        if AssertUnwindSafe(self.force_charge()).catch_unwind().await.is_err() {
            warn!("Telemetry faulted again while securing, commanding charge blindly");
            self.blind_charge().await;
        }
        AssertUnwindSafe(self.reserve_slot()).catch_unwind().await.unwrap_or_else(|_| {
            error!("Slot reservation faulted while securing");
            None
        })
    }

    /// Best effort: a vehicle that does not answer is charged blindly.
    async fn force_charge(&self) {
        let Ok(t) = tokio::time::timeout(Self::TELEMETRY_TIMEOUT, self.vehicle.read_telemetry()).await
        else {
            warn!("No telemetry while securing");
            self.blind_charge().await;
            return;
        };
        if t.state() == FlightState::Charge {
            return;
        }
        if let Err(e) = self.vehicle.command(FlightState::Charge, t.vel(), t.angle()).await {
            warn!("Charge command failed while securing: {e}");
        }
    }

    /// Commands charge mode without knowing the current velocity or lens.
    async fn blind_charge(&self) {
        let sent = AssertUnwindSafe(self.vehicle.command(FlightState::Charge, Vec2D::zero(), CameraAngle::Wide))
            .catch_unwind()
            .await;
        match sent {
            Ok(Ok(())) => info!("Charge commanded without telemetry"),
            Ok(Err(e)) => warn!("Blind charge command failed: {e}"),
            Err(_) => error!("Blind charge command faulted"),
        }
    }

    /// Keeps an already enabled upcoming slot or books the earliest future one.
    pub async fn reserve_slot(&self) -> Option<usize> {
        let slots = match self.vehicle.list_slots().await {
            Ok(slots) => slots,
            Err(e) => {
                error!("Could not list communication slots: {e}");
                return None;
            }
        };
        let now = Utc::now();
        if let Some(booked) = slots.iter().find(|s| s.is_enabled() && s.end() > now) {
            info!("Communication slot {} already booked", booked.id());
            return Some(booked.id());
        }
        let next = slots.iter().filter(|s| !s.is_enabled() && s.start() > now).min_by_key(|s| s.start())?;
        match self.vehicle.book_slot(next.id(), true).await {
            Ok(()) => {
                info!("Booked communication slot {} starting {}", next.id(), next.start());
                Some(next.id())
            }
            Err(e) => {
                error!("Could not book communication slot {}: {e}", next.id());
                None
            }
        }
    }

    /// Starts the fallback binary detached from this process.
    pub fn hand_off(&self) -> io::Result<Child> {
        let mut cmd = Command::new(self.config.fallback_bin());
        cmd.stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd.spawn()
    }
}

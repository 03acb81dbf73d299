use super::{commander::MissionCommander, signal::{NavOutcome, Priority}};
use crate::flight_control::{FlightState, ResourceGovernor, WaitError};
use crate::imaging::{objective_file_name, stitch_zone};
use crate::objective::ObjectiveProgress;
use crate::{error, obj, warn};
use chrono::Utc;
use std::fs;
use strum_macros::Display;

/// Terminal result of servicing one zoned objective.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveOutcome {
    Submitted,
    Expired,
    /// A beacon arrived; the sweep was returned to the queue.
    Preempted,
    SubmitFailed,
}

impl MissionCommander {
    /// Sweeps the objective zone stop by stop, then stitches and submits the photos.
    ///
    /// An objective whose window has already closed is logged as failed without any vehicle
    /// command.
    pub(super) async fn serve_objective(
        &mut self,
        mut progress: ObjectiveProgress,
    ) -> Result<ObjectiveOutcome, WaitError> {
        let objective = progress.objective().clone();
        let subject = format!("Objective {}", objective.id());
        if objective.is_expired(Utc::now()) {
            warn!("{subject} expired at {} before service", objective.end());
            self.audit.failure(&subject, "window closed before service");
            return Ok(ObjectiveOutcome::Expired);
        }
        obj!(
            "Servicing {subject} with lens {}, {} stops left",
            objective.angle(),
            progress.remaining()
        );
        let angle = objective.angle();
        while let Some(stop) = progress.next_stop() {
            if objective.is_expired(Utc::now()) {
                warn!("{subject} expired during sweep with {} stops left", progress.remaining());
                self.audit.failure(&subject, "window closed during sweep");
                return Ok(ObjectiveOutcome::Expired);
            }
            self.gov.guard(ResourceGovernor::OBJECTIVE_FLOOR, angle, FlightState::Acquisition).await?;
            let nav = self
                .navigate_to(stop, angle, ResourceGovernor::OBJECTIVE_FLOOR, Priority::Objective)
                .await?;
            match nav {
                NavOutcome::Arrived(_) => match self.take_photo().await {
                    Some(path) => progress.complete_stop(path),
                    None => progress.skip_stop(),
                },
                NavOutcome::Preempted => {
                    obj!("{subject} preempted with {} stops left", progress.remaining());
                    self.ctx.push_front(progress);
                    return Ok(ObjectiveOutcome::Preempted);
                }
                NavOutcome::Unreachable => {
                    warn!("Skipping unreachable stop {stop} of {subject}");
                    progress.skip_stop();
                }
            }
        }
        Ok(self.submit_objective(&progress, &subject).await)
    }

    async fn submit_objective(&self, progress: &ObjectiveProgress, subject: &str) -> ObjectiveOutcome {
        if progress.images().is_empty() {
            self.audit.failure(subject, "no photos taken");
            return ObjectiveOutcome::SubmitFailed;
        }
        let objective = progress.objective().clone();
        let id = objective.id();
        let images = progress.images().to_vec();
        let stitched = tokio::task::spawn_blocking(move || {
            stitch_zone(&objective, &images).map_err(|e| e.to_string())
        })
        .await;
        let png = match stitched {
            Ok(Ok(png)) => png,
            Ok(Err(e)) => {
                self.audit.failure(subject, &format!("stitching failed: {e}"));
                return ObjectiveOutcome::SubmitFailed;
            }
            Err(e) => {
                self.audit.failure(subject, &format!("stitching aborted: {e}"));
                return ObjectiveOutcome::SubmitFailed;
            }
        };
        let dir = self.config.objective_image_dir();
        let path = dir.join(objective_file_name(id));
        if let Err(e) = fs::create_dir_all(&dir).and_then(|()| fs::write(&path, &png)) {
            error!("Could not store {}: {e}", path.display());
        }
        match self.fc().vehicle().submit_objective_image(id, png).await {
            Ok(()) => {
                obj!("{subject} submitted with {} photos", progress.images().len());
                self.audit.success(subject);
                ObjectiveOutcome::Submitted
            }
            Err(e) => {
                self.audit.failure(subject, &format!("submission failed: {e}"));
                ObjectiveOutcome::SubmitFailed
            }
        }
    }
}

use super::signal::Priority;
use crate::flight_control::Interrupt;
use async_trait::async_trait;
use crate::objective::{BeaconBoard, ObjectiveProgress, ZonedObjective};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::mpsc::UnboundedReceiver;

/// The commander's narrow view onto the task detectors plus its own objective queue.
///
/// Objectives are moved from the detector channel into the local queue on every check so a
/// preempted sweep can be put back at the front with its progress intact.
pub struct ModeContext {
    board: Arc<BeaconBoard>,
    obj_rx: UnboundedReceiver<ZonedObjective>,
    pending: VecDeque<ObjectiveProgress>,
}

impl ModeContext {
    pub fn new(board: Arc<BeaconBoard>, obj_rx: UnboundedReceiver<ZonedObjective>) -> Self {
        Self { board, obj_rx, pending: VecDeque::new() }
    }

    pub fn board(&self) -> &Arc<BeaconBoard> { &self.board }

    /// Moves newly detected objectives into the local queue and returns how many arrived.
    pub fn drain_objectives(&mut self) -> usize {
        let mut arrived = 0;
        while let Ok(obj) = self.obj_rx.try_recv() {
            self.pending.push_back(ObjectiveProgress::new(obj));
            arrived += 1;
        }
        arrived
    }

    pub fn has_objectives(&self) -> bool { !self.pending.is_empty() }
    pub fn pending_objectives(&self) -> usize { self.pending.len() }
    pub fn pop_objective(&mut self) -> Option<ObjectiveProgress> { self.pending.pop_front() }

    /// Returns a preempted sweep to the head of the queue.
    pub fn push_front(&mut self, progress: ObjectiveProgress) { self.pending.push_front(progress); }

    /// Whether work of higher priority than `at` is waiting.
    pub async fn preempts(&mut self, at: Priority) -> bool {
        self.drain_objectives();
        match at {
            Priority::Beacon => false,
            Priority::Objective => self.board.is_active().await,
            Priority::Scan => self.has_objectives() || self.board.is_active().await,
        }
    }
}

/// Raised once [`ModeContext::preempts`] reports work above `at`.
pub struct Preemption<'a> {
    pub ctx: &'a mut ModeContext,
    pub at: Priority,
}

#[async_trait]
impl Interrupt for Preemption<'_> {
    async fn is_raised(&mut self) -> bool { self.ctx.preempts(self.at).await }
}

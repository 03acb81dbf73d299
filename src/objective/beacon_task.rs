use super::id_registry::IdRegistry;
use crate::util::Vec2D;
use tokio::sync::Mutex;

/// One ranging sample: where the vehicle was and the de-noised range to the beacon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSample {
    pos: Vec2D<f64>,
    range: f64,
}

impl RangeSample {
    pub fn new(pos: Vec2D<f64>, range: f64) -> Self { Self { pos, range } }
    pub fn pos(&self) -> Vec2D<f64> { self.pos }
    pub fn range(&self) -> f64 { self.range }

    fn key(&self) -> (i64, i64, i64) {
        #[allow(clippy::cast_possible_truncation)]
        let r = |v: f64| v.round() as i64;
        (r(self.pos.x()), r(self.pos.y()), r(self.range))
    }
}

/// Localization task for a single radio beacon.
#[derive(Debug, Clone)]
pub struct BeaconTask {
    id: usize,
    samples: Vec<RangeSample>,
}

impl BeaconTask {
    pub fn new(id: usize) -> Self { Self { id, samples: Vec::new() } }
    pub fn id(&self) -> usize { self.id }
    pub fn pings(&self) -> usize { self.samples.len() }
    pub fn samples(&self) -> &[RangeSample] { &self.samples }

    pub fn add_sample(&mut self, sample: RangeSample) { self.samples.push(sample); }

    /// Samples with duplicates (same rounded position and range) removed, in arrival order.
    pub fn unique_samples(&self) -> Vec<RangeSample> {
        let mut seen = std::collections::HashSet::new();
        self.samples.iter().filter(|s| seen.insert(s.key())).copied().collect()
    }
}

#[derive(Debug, Default)]
struct BoardInner {
    active: Option<BeaconTask>,
    past_ids: IdRegistry,
}

/// Shared flag and sample store between the announcement listener and the commander.
///
/// The listener only activates beacons and appends samples; the commander only reads and
/// retires.
#[derive(Debug, Default)]
pub struct BeaconBoard {
    inner: Mutex<BoardInner>,
}

impl BeaconBoard {
    pub fn new() -> Self { Self::default() }

    /// Activates beacon `id` unless a beacon is already active or `id` was seen before.
    pub async fn activate(&self, id: usize) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.active.is_some() || inner.past_ids.contains(id) {
            return false;
        }
        inner.past_ids.insert(id);
        inner.active = Some(BeaconTask::new(id));
        true
    }

    pub async fn active_id(&self) -> Option<usize> {
        self.inner.lock().await.active.as_ref().map(BeaconTask::id)
    }

    pub async fn is_active(&self) -> bool { self.inner.lock().await.active.is_some() }

    /// Appends a sample to the active beacon and returns its new ping count.
    ///
    /// Samples for any other id are rejected with `None`.
    pub async fn record_ping(&self, id: usize, sample: RangeSample) -> Option<usize> {
        let mut inner = self.inner.lock().await;
        let task = inner.active.as_mut().filter(|t| t.id() == id)?;
        task.add_sample(sample);
        Some(task.pings())
    }

    /// Copy of the active task.
    pub async fn snapshot(&self) -> Option<BeaconTask> { self.inner.lock().await.active.clone() }

    /// Ends the active task and returns it.
    pub async fn retire(&self) -> Option<BeaconTask> { self.inner.lock().await.active.take() }
}

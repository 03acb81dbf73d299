use std::collections::{HashSet, VecDeque};

/// Append-only set of ids with FIFO eviction once `capacity` ids are stored.
///
/// Ids only ever leave the registry through eviction, so an id seen once is never
/// reprocessed during any run shorter than `capacity` distinct ids.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    ids: HashSet<usize>,
    order: VecDeque<usize>,
    capacity: usize,
}

impl IdRegistry {
    /// Default capacity, far beyond the number of objectives of a mission.
    pub const DEF_CAPACITY: usize = 4096;

    pub fn new(capacity: usize) -> Self {
        Self { ids: HashSet::new(), order: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Inserts `id` and returns `true` if it was not known yet.
    pub fn insert(&mut self, id: usize) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.ids.remove(&old);
            }
        }
        true
    }

    pub fn contains(&self, id: usize) -> bool { self.ids.contains(&id) }
    pub fn len(&self) -> usize { self.order.len() }
    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

impl Default for IdRegistry {
    fn default() -> Self { Self::new(Self::DEF_CAPACITY) }
}

mod beacon_localizer;
mod beacon_task;
mod id_registry;
mod zoned_objective;

pub use beacon_localizer::BeaconLocalizer;
pub use beacon_task::{BeaconBoard, BeaconTask, RangeSample};
pub use id_registry::IdRegistry;
pub use zoned_objective::{ObjectiveProgress, ZonedObjective};

#[cfg(test)]
mod tests;

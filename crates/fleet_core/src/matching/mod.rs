pub mod algorithm;
pub mod candidates;
pub mod greedy;
pub mod hungarian;
pub mod types;

use bevy_ecs::prelude::Resource;

pub use algorithm::AssignmentPolicy;
pub use candidates::build_batch_entries;
pub use greedy::EarliestPickup;
pub use hungarian::OptimalAssignment;
pub use types::{Assignment, BatchEntry, PickupCandidate, WaitingResource};

/// Resource wrapper for the assignment policy trait object.
#[derive(Resource)]
pub struct AssignmentPolicyResource(pub Box<dyn AssignmentPolicy>);

impl AssignmentPolicyResource {
    pub fn new(policy: Box<dyn AssignmentPolicy>) -> Self {
        Self(policy)
    }
}

impl std::ops::Deref for AssignmentPolicyResource {
    type Target = dyn AssignmentPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

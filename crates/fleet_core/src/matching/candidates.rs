//! Cost-matrix builder: per-resource candidate lists over the empty agents.

use crate::network::{LocationOnRoad, TravelTimeOracle};

use super::types::{BatchEntry, PickupCandidate, WaitingResource};

/// Builds one [BatchEntry] per waiting resource, asking the oracle for each
/// empty agent's travel time to the pickup point.
///
/// Pairs whose pickup would land after the resource's expiration are dropped
/// here, so no policy can produce an assignment that arrives late. A resource
/// may end up with an empty candidate list; it stays in the batch and carries
/// over if unmatched.
///
/// `agents` must be sorted by agent id (the empty-agent registry iterates in
/// that order), which fixes the candidate order for deterministic matching.
pub fn build_batch_entries(
    resources: &[WaitingResource],
    agents: &[(u64, bevy_ecs::prelude::Entity, LocationOnRoad)],
    oracle: &dyn TravelTimeOracle,
    now: u64,
) -> Vec<BatchEntry> {
    resources
        .iter()
        .map(|resource| {
            let remaining_lifetime = resource.expiration_time.saturating_sub(now);
            let candidates = agents
                .iter()
                .filter_map(|&(agent_id, agent, location)| {
                    let pickup_time = oracle.travel_time(location, resource.pickup);
                    (pickup_time <= remaining_lifetime).then_some(PickupCandidate {
                        agent,
                        agent_id,
                        pickup_time,
                    })
                })
                .collect();
            BatchEntry {
                resource: resource.entity,
                resource_id: resource.id,
                fare: resource.fare,
                candidates,
            }
        })
        .collect()
}

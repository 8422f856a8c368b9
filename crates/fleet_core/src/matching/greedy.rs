//! Greedy earliest-pickup policy: repeatedly take the globally soonest
//! (resource, agent) pair and reserve that agent.

use std::collections::HashSet;

use super::algorithm::AssignmentPolicy;
use super::types::{Assignment, BatchEntry};

/// The "fair" policy: minimizes each successive pickup time rather than any
/// batch-wide total. Ties resolve to the first pair found in batch order ×
/// candidate order, so results are reproducible.
#[derive(Debug, Default)]
pub struct EarliestPickup;

impl AssignmentPolicy for EarliestPickup {
    fn assign(&self, batch: &[BatchEntry]) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        let mut reserved_agents: HashSet<u64> = HashSet::new();
        let mut matched_rows: HashSet<usize> = HashSet::new();

        loop {
            let mut best: Option<(usize, usize)> = None;
            let mut best_pickup = u64::MAX;
            for (row, entry) in batch.iter().enumerate() {
                if matched_rows.contains(&row) {
                    continue;
                }
                for (col, candidate) in entry.candidates.iter().enumerate() {
                    if reserved_agents.contains(&candidate.agent_id) {
                        continue;
                    }
                    // Strict comparison keeps the first-found pair on ties.
                    if candidate.pickup_time < best_pickup {
                        best_pickup = candidate.pickup_time;
                        best = Some((row, col));
                    }
                }
            }
            let Some((row, col)) = best else {
                break;
            };
            let entry = &batch[row];
            let candidate = entry.candidates[col];
            reserved_agents.insert(candidate.agent_id);
            matched_rows.insert(row);
            assignments.push(Assignment {
                resource: entry.resource,
                agent: candidate.agent,
                agent_id: candidate.agent_id,
                pickup_time: candidate.pickup_time,
                benefit: 0.0,
            });
        }
        assignments
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::Entity;

    use super::*;
    use crate::matching::types::PickupCandidate;

    fn candidate(agent_id: u64, pickup_time: u64) -> PickupCandidate {
        PickupCandidate {
            agent: Entity::from_raw(10 + agent_id as u32),
            agent_id,
            pickup_time,
        }
    }

    fn entry(resource_id: u64, fare: f64, candidates: Vec<PickupCandidate>) -> BatchEntry {
        BatchEntry {
            resource: Entity::from_raw(100 + resource_id as u32),
            resource_id,
            fare,
            candidates,
        }
    }

    #[test]
    fn picks_global_minimum_pickup_first() {
        // Pickup times [[5, 100], [10, 20]]: (r0, a0) first, then (r1, a1).
        let batch = vec![
            entry(0, 10.0, vec![candidate(0, 5), candidate(1, 100)]),
            entry(1, 100.0, vec![candidate(0, 10), candidate(1, 20)]),
        ];
        let result = EarliestPickup.assign(&batch);
        assert_eq!(result.len(), 2);
        assert_eq!((result[0].agent_id, result[0].pickup_time), (0, 5));
        assert_eq!((result[1].agent_id, result[1].pickup_time), (1, 20));
        let total: u64 = result.iter().map(|a| a.pickup_time).sum();
        assert_eq!(total, 25);
        assert!(result.iter().all(|a| a.benefit == 0.0));
    }

    #[test]
    fn a_reserved_agent_is_never_matched_twice() {
        let batch = vec![
            entry(0, 10.0, vec![candidate(0, 1)]),
            entry(1, 10.0, vec![candidate(0, 2)]),
        ];
        let result = EarliestPickup.assign(&batch);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].resource, batch[0].resource);
    }

    #[test]
    fn ties_resolve_in_batch_order() {
        // Identical candidate sets: the earlier-announced resource wins.
        let batch = vec![
            entry(0, 10.0, vec![candidate(0, 7), candidate(1, 7)]),
            entry(1, 10.0, vec![candidate(0, 7), candidate(1, 7)]),
        ];
        let result = EarliestPickup.assign(&batch);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].resource, batch[0].resource);
        assert_eq!(result[0].agent_id, 0);
        assert_eq!(result[1].resource, batch[1].resource);
        assert_eq!(result[1].agent_id, 1);
    }

    #[test]
    fn resources_without_candidates_are_left_for_the_next_window() {
        let batch = vec![entry(0, 10.0, Vec::new())];
        assert!(EarliestPickup.assign(&batch).is_empty());
    }
}

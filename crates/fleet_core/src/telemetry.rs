//! Scoreboard: run-wide accumulators the handlers write into.

use bevy_ecs::prelude::Resource;

/// Aggregate counters for one simulation run. Times are simulated seconds.
///
/// `total_assignments` is a real counter, incremented when a match is applied;
/// at termination it must equal `total_resources - expired_resources`.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub total_resources: u64,
    pub expired_resources: u64,
    pub total_assignments: u64,
    pub total_fare: f64,
    pub total_resource_wait_time: u64,
    pub total_resource_trip_time: u64,
    pub total_agent_search_time: u64,
    pub total_agent_approach_time: u64,
    /// Number of closed batches (the final partial window does not count).
    pub pool_count: u64,
    /// Sum of selected `pickup_time / fare` cells under the optimal policy;
    /// stays 0 under the greedy policy.
    pub total_benefit_factor: f64,
}

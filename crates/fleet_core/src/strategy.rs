//! The pluggable search strategy: decides where an empty agent cruises.
//!
//! The simulator owns all agent and resource state; a strategy only ever sees
//! the immutable road network plus the arguments of each call, and keeps
//! whatever per-agent memory it wants internally.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::network::RoadNetwork;

pub trait SearchStrategy: Send + Sync {
    /// Pick the intersection an empty agent standing at `current` should head
    /// to next. Must return an intersection adjacent to `current`; anything
    /// else aborts the run. Must be deterministic for a given seed.
    fn next_intersection(&mut self, network: &RoadNetwork, agent_id: u64, current: u64) -> u64;

    /// Notification that `agent_id` was just assigned `resource_id`.
    fn on_assignment(&mut self, _agent_id: u64, _resource_id: u64) {}
}

/// Resource wrapper for the search strategy trait object.
#[derive(Resource)]
pub struct SearchStrategyResource(pub Box<dyn SearchStrategy>);

impl std::ops::Deref for SearchStrategyResource {
    type Target = dyn SearchStrategy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for SearchStrategyResource {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

/// Reference strategy: a seeded uniform random walk over outgoing roads.
#[derive(Debug)]
pub struct RandomWalk {
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl SearchStrategy for RandomWalk {
    fn next_intersection(&mut self, network: &RoadNetwork, _agent_id: u64, current: u64) -> u64 {
        let roads = network.roads_from(current);
        if roads.is_empty() {
            // Dead end; staying put surfaces as a strategy fault downstream.
            return current;
        }
        let pick = roads[self.rng.gen_range(0..roads.len())];
        network.road(pick).to
    }
}

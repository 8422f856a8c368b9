//! Test helpers: tiny deterministic networks, oracles, and world setup shared
//! across test files.

use std::collections::HashMap;
use std::sync::Arc;

use bevy_ecs::prelude::{Entity, World};

use crate::batch::BatchWindow;
use crate::clock::SimulationClock;
use crate::ecs::{Agent, AgentState, EmptyAgents, Position, SimFault};
use crate::network::{LocationOnRoad, RoadId, RoadNetwork, TravelTimeOracle};
use crate::telemetry::SimTelemetry;

/// A one-way ring: intersections `0..n`, road `i` runs from `i` to
/// `(i + 1) % n`, every road takes `secs_per_road`.
pub fn ring_network(n: usize, secs_per_road: u64) -> Arc<RoadNetwork> {
    let mut network = RoadNetwork::new();
    for id in 0..n as u64 {
        network.add_intersection(id, 0.0, id as f64);
    }
    for i in 0..n as u64 {
        network
            .add_road(i, (i + 1) % n as u64, secs_per_road)
            .expect("ring road endpoints exist");
    }
    Arc::new(network)
}

/// Exact travel times on a [ring_network]: positions map to a linear
/// coordinate and distance is measured forward around the ring.
pub struct RingOracle {
    n: usize,
    secs_per_road: u64,
}

impl RingOracle {
    pub fn new(n: usize, secs_per_road: u64) -> Self {
        Self { n, secs_per_road }
    }

    fn coordinate(&self, loc: LocationOnRoad) -> u64 {
        loc.road.0 as u64 * self.secs_per_road + loc.travel_time_from_start
    }
}

impl TravelTimeOracle for RingOracle {
    fn travel_time(&self, from: LocationOnRoad, to: LocationOnRoad) -> u64 {
        let total = self.n as u64 * self.secs_per_road;
        let (a, b) = (self.coordinate(from), self.coordinate(to));
        (b + total - a) % total
    }
}

/// Travel times looked up by `(from.road, to.road)`, with a default for
/// unlisted pairs. Lets scenario tests pin exact pickup times.
pub struct TableOracle {
    default_time: u64,
    times: HashMap<(RoadId, RoadId), u64>,
}

impl TableOracle {
    pub fn new(default_time: u64) -> Self {
        Self { default_time, times: HashMap::new() }
    }

    pub fn set(&mut self, from: RoadId, to: RoadId, secs: u64) {
        self.times.insert((from, to), secs);
    }
}

impl TravelTimeOracle for TableOracle {
    fn travel_time(&self, from: LocationOnRoad, to: LocationOnRoad) -> u64 {
        self.times.get(&(from.road, to.road)).copied().unwrap_or(self.default_time)
    }
}

/// Create a bare world with the kernel resources every system expects.
/// Network, oracle, strategy, policy, and params are test-specific and get
/// inserted by the caller.
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(BatchWindow::default());
    world.insert_resource(EmptyAgents::default());
    world.insert_resource(SimFault::default());
    world
}

/// Spawn a Searching agent at `location` and register it as empty.
pub fn spawn_searching_agent(world: &mut World, agent_id: u64, location: LocationOnRoad) -> Entity {
    let entity = world
        .spawn((
            Agent {
                id: agent_id,
                state: AgentState::Searching,
                search_start_time: 0,
                generation: 0,
                assigned_resource: None,
                assigned_at: 0,
            },
            Position(location),
        ))
        .id();
    world.resource_mut::<EmptyAgents>().0.insert(agent_id, entity);
    entity
}

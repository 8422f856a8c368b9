//! World assembly: wires resources, places agents, and seeds the event queue.

use std::sync::Arc;

use bevy_ecs::prelude::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::BatchWindow;
use crate::clock::{Event, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Agent, AgentState, EmptyAgents, Position, RequestState, SimFault, TripRequest};
use crate::error::{SimError, SimResult};
use crate::feed::{validate_feed, ResourceRecord};
use crate::matching::{AssignmentPolicyResource, EarliestPickup, OptimalAssignment};
use crate::network::{RoadId, RoadNetwork, RoadNetworkResource, TravelTimeOracle, TravelTimeOracleResource};
use crate::scenario::params::{AssignmentPolicyKind, SimulationEndTime, SimulationParams};
use crate::strategy::{SearchStrategy, SearchStrategyResource};
use crate::telemetry::SimTelemetry;

pub fn create_earliest_pickup() -> AssignmentPolicyResource {
    AssignmentPolicyResource::new(Box::new(EarliestPickup))
}

pub fn create_optimal_assignment() -> AssignmentPolicyResource {
    AssignmentPolicyResource::new(Box::new(OptimalAssignment))
}

/// Builds a ready-to-run world: one `ResourceAnnounce` per feed row, one
/// `AgentMove` per agent at t=0, agents placed on seeded random roads, and
/// the simulation end pinned to the last resource's expiration time.
pub fn build_simulation(
    world: &mut World,
    params: SimulationParams,
    network: Arc<RoadNetwork>,
    oracle: Box<dyn TravelTimeOracle>,
    strategy: Box<dyn SearchStrategy>,
    feed: &[ResourceRecord],
) -> SimResult<()> {
    params.validate()?;
    validate_feed(feed, &network)?;
    if network.road_count() == 0 {
        return Err(SimError::Data("map has no roads".into()));
    }

    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(BatchWindow::default());
    world.insert_resource(EmptyAgents::default());
    world.insert_resource(SimFault::default());
    world.insert_resource(match params.assignment_policy {
        AssignmentPolicyKind::Fair => create_earliest_pickup(),
        AssignmentPolicyKind::Optimum => create_optimal_assignment(),
    });
    world.insert_resource(SearchStrategyResource(strategy));
    world.insert_resource(RoadNetworkResource(network.clone()));

    // Deploy agents at seeded random road ends; each gets its t=0 cruise event.
    let mut rng = StdRng::seed_from_u64(params.agent_placement_seed);
    for agent_id in 0..params.num_agents {
        let road = RoadId(rng.gen_range(0..network.road_count()));
        let location = network.location_at_end(road);
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
        world.resource_mut::<SimulationClock>().schedule(Event {
            timestamp: 0,
            kind: EventKind::AgentMove,
            subject: EventSubject::Agent(entity),
            generation: 0,
        });
    }

    let mut end_time = 0;
    for (index, record) in feed.iter().enumerate() {
        let trip_duration = oracle.travel_time(record.pickup, record.dropoff);
        let expiration_time = record.announce_time + params.resource_max_lifetime;
        end_time = end_time.max(expiration_time);
        let entity = world
            .spawn(TripRequest {
                id: index as u64,
                announce_time: record.announce_time,
                pickup: record.pickup,
                dropoff: record.dropoff,
                trip_duration,
                fare: record.fare,
                expiration_time,
                state: RequestState::Announced,
            })
            .id();
        world.resource_mut::<SimulationClock>().schedule(Event {
            timestamp: record.announce_time,
            kind: EventKind::ResourceAnnounce,
            subject: EventSubject::Resource(entity),
            generation: 0,
        });
    }

    world.insert_resource(TravelTimeOracleResource(oracle));
    world.insert_resource(SimulationEndTime(end_time));
    world.insert_resource(params);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LocationOnRoad;
    use crate::strategy::RandomWalk;
    use crate::test_helpers::{ring_network, RingOracle};

    #[test]
    fn build_seeds_one_event_per_agent_and_resource() {
        let network = ring_network(6, 30);
        let mut world = World::new();
        let feed = vec![ResourceRecord {
            announce_time: 12,
            pickup: LocationOnRoad { road: RoadId(1), travel_time_from_start: 0 },
            dropoff: LocationOnRoad { road: RoadId(3), travel_time_from_start: 0 },
            fare: 9.0,
        }];
        build_simulation(
            &mut world,
            SimulationParams::default().with_num_agents(3),
            network.clone(),
            Box::new(RingOracle::new(6, 30)),
            Box::new(RandomWalk::new(1)),
            &feed,
        )
        .expect("build");

        assert_eq!(world.resource::<EmptyAgents>().0.len(), 3);
        assert_eq!(world.resource::<SimulationEndTime>().0, 12 + 600);

        let mut clock = world.resource_mut::<SimulationClock>();
        let mut agent_moves = 0;
        let mut announces = 0;
        while let Some(event) = clock.pop_next() {
            match event.kind {
                EventKind::AgentMove => {
                    agent_moves += 1;
                    assert_eq!(event.timestamp, 0);
                }
                EventKind::ResourceAnnounce => {
                    announces += 1;
                    assert_eq!(event.timestamp, 12);
                }
                other => panic!("unexpected seed event {other:?}"),
            }
        }
        assert_eq!((agent_moves, announces), (3, 1));
    }

    #[test]
    fn placement_is_reproducible_for_a_seed() {
        let network = ring_network(8, 30);
        let positions = |seed: u64| -> Vec<LocationOnRoad> {
            let mut world = World::new();
            build_simulation(
                &mut world,
                SimulationParams::default().with_num_agents(5).with_agent_placement_seed(seed),
                network.clone(),
                Box::new(RingOracle::new(8, 30)),
                Box::new(RandomWalk::new(1)),
                &[],
            )
            .expect("build");
            let mut placed: Vec<(u64, LocationOnRoad)> = world
                .query::<(&Agent, &Position)>()
                .iter(&world)
                .map(|(agent, position)| (agent.id, position.0))
                .collect();
            placed.sort_by_key(|(id, _)| *id);
            placed.into_iter().map(|(_, location)| location).collect()
        };
        assert_eq!(positions(42), positions(42));
    }

    #[test]
    fn an_empty_map_is_a_data_error() {
        let mut world = World::new();
        let result = build_simulation(
            &mut world,
            SimulationParams::default(),
            Arc::new(RoadNetwork::new()),
            Box::new(RingOracle::new(1, 1)),
            Box::new(RandomWalk::new(1)),
            &[],
        );
        assert!(matches!(result, Err(SimError::Data(_))));
    }
}

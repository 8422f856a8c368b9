use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Agent, AgentState, Position, SimFault};
use crate::error::SimError;
use crate::network::RoadNetworkResource;
use crate::strategy::SearchStrategyResource;

/// A cruising agent finished its road: ask the strategy where to go next and
/// start traversing that road. Events cancelled by an assignment arrive with
/// a stale generation and are dropped.
pub fn agent_move_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    network: Res<RoadNetworkResource>,
    mut strategy: ResMut<SearchStrategyResource>,
    mut fault: ResMut<SimFault>,
    mut agents: Query<(&mut Agent, &mut Position)>,
) {
    if event.0.kind != EventKind::AgentMove {
        return;
    }
    let EventSubject::Agent(entity) = event.0.subject else {
        return;
    };
    let Ok((mut agent, mut position)) = agents.get_mut(entity) else {
        return;
    };
    if event.0.generation != agent.generation {
        return;
    }
    if agent.state != AgentState::Searching {
        fault.set(SimError::Invariant(format!(
            "live cruise event for agent {} in state {:?}",
            agent.id, agent.state
        )));
        return;
    }

    let current = network.0.road(position.0.road).to;
    let next = strategy.next_intersection(&network.0, agent.id, current);
    let Some(next_road) = network.0.road_between(current, next) else {
        fault.set(SimError::Strategy(format!(
            "strategy sent agent {} from intersection {current} to non-adjacent {next}",
            agent.id
        )));
        return;
    };
    position.0 = network.0.location_at_start(next_road);
    clock.schedule(Event {
        timestamp: event.0.timestamp + network.0.road(next_road).travel_time,
        kind: EventKind::AgentMove,
        subject: EventSubject::Agent(entity),
        generation: agent.generation,
    });
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::{Schedule, World};

    use super::*;
    use crate::test_helpers::{create_test_world, ring_network, spawn_searching_agent};

    fn fire_move(world: &mut World, entity: bevy_ecs::prelude::Entity, timestamp: u64, generation: u64) {
        world.insert_resource(CurrentEvent(Event {
            timestamp,
            kind: EventKind::AgentMove,
            subject: EventSubject::Agent(entity),
            generation,
        }));
        let mut schedule = Schedule::default();
        schedule.add_systems(agent_move_system);
        schedule.run(world);
    }

    #[test]
    fn cruising_agent_advances_and_schedules_the_next_move() {
        let network = ring_network(4, 30);
        let mut world = create_test_world();
        world.insert_resource(RoadNetworkResource(network.clone()));
        world.insert_resource(SearchStrategyResource(Box::new(crate::strategy::RandomWalk::new(0))));
        let entity = spawn_searching_agent(&mut world, 0, network.location_at_end(crate::network::RoadId(0)));

        fire_move(&mut world, entity, 30, 0);

        // The ring has one outgoing road per intersection: 0->1 ends at 1, so
        // the agent must now be traversing 1->2.
        let position = world.get::<Position>(entity).expect("position");
        assert_eq!(position.0.road, crate::network::RoadId(1));
        assert_eq!(position.0.travel_time_from_start, 0);

        let next = world.resource_mut::<SimulationClock>().pop_next().expect("next move");
        assert_eq!(next.kind, EventKind::AgentMove);
        assert_eq!(next.timestamp, 60);
    }

    #[test]
    fn a_stale_generation_is_discarded_silently() {
        let network = ring_network(4, 30);
        let mut world = create_test_world();
        world.insert_resource(RoadNetworkResource(network.clone()));
        world.insert_resource(SearchStrategyResource(Box::new(crate::strategy::RandomWalk::new(0))));
        let entity = spawn_searching_agent(&mut world, 0, network.location_at_end(crate::network::RoadId(0)));
        world.get_mut::<Agent>(entity).expect("agent").generation = 3;

        fire_move(&mut world, entity, 30, 2);

        assert!(world.resource::<SimulationClock>().is_empty(), "no follow-up scheduled");
        assert!(world.resource::<SimFault>().0.is_none());
        let position = world.get::<Position>(entity).expect("position");
        assert_eq!(position.0.road, crate::network::RoadId(0), "agent did not move");
    }

    #[test]
    fn a_non_adjacent_strategy_pick_is_fatal() {
        struct Teleporter;
        impl crate::strategy::SearchStrategy for Teleporter {
            fn next_intersection(
                &mut self,
                _network: &crate::network::RoadNetwork,
                _agent_id: u64,
                current: u64,
            ) -> u64 {
                current + 2
            }
        }

        let network = ring_network(6, 30);
        let mut world = create_test_world();
        world.insert_resource(RoadNetworkResource(network.clone()));
        world.insert_resource(SearchStrategyResource(Box::new(Teleporter)));
        let entity = spawn_searching_agent(&mut world, 0, network.location_at_end(crate::network::RoadId(0)));

        fire_move(&mut world, entity, 30, 0);

        assert!(matches!(
            world.resource::<SimFault>().0,
            Some(SimError::Strategy(_))
        ));
    }
}

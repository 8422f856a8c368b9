use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Agent, AgentState, EmptyAgents, Position, SimFault, TripRequest};
use crate::error::SimError;
use crate::network::RoadNetworkResource;

/// An occupied agent reaches the dropoff: it re-enters Searching there,
/// rejoins the empty registry, and resumes cruising. The first cruise event
/// fires when the agent clears the rest of the dropoff road.
pub fn arrive_at_dropoff_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    network: Res<RoadNetworkResource>,
    mut empty_agents: ResMut<EmptyAgents>,
    mut fault: ResMut<SimFault>,
    mut agents: Query<(&mut Agent, &mut Position)>,
    requests: Query<&TripRequest>,
) {
    if event.0.kind != EventKind::AgentArriveAtDropoff {
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
    if agent.state != AgentState::Occupied {
        fault.set(SimError::Invariant(format!(
            "dropoff arrival for agent {} in state {:?}",
            agent.id, agent.state
        )));
        return;
    }
    let Some(resource) = agent.assigned_resource else {
        fault.set(SimError::Invariant(format!("agent {} dropped off nothing", agent.id)));
        return;
    };
    let Ok(request) = requests.get(resource) else {
        fault.set(SimError::Invariant(format!("agent {} carried an unknown resource", agent.id)));
        return;
    };

    let now = event.0.timestamp;
    position.0 = request.dropoff;
    agent.state = AgentState::Searching;
    agent.search_start_time = now;
    agent.assigned_resource = None;
    empty_agents.0.insert(agent.id, entity);

    clock.schedule(Event {
        timestamp: now + network.0.remaining_on_road(position.0),
        kind: EventKind::AgentMove,
        subject: EventSubject::Agent(entity),
        generation: agent.generation,
    });
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::Schedule;

    use super::*;
    use crate::ecs::RequestState;
    use crate::network::{LocationOnRoad, RoadId};
    use crate::test_helpers::{create_test_world, ring_network};

    #[test]
    fn dropoff_returns_the_agent_to_searching_at_the_dropoff_location() {
        let network = ring_network(4, 30);
        let mut world = create_test_world();
        world.insert_resource(RoadNetworkResource(network.clone()));

        // Dropoff 10 seconds into road 2: the next cruise event fires after
        // the remaining 20 seconds.
        let dropoff = LocationOnRoad { road: RoadId(2), travel_time_from_start: 10 };
        let resource = world
            .spawn(TripRequest {
                id: 0,
                announce_time: 0,
                pickup: LocationOnRoad { road: RoadId(1), travel_time_from_start: 0 },
                dropoff,
                trip_duration: 90,
                fare: 12.0,
                expiration_time: 600,
                state: RequestState::Assigned,
            })
            .id();
        let agent_entity = world
            .spawn((
                Agent {
                    id: 2,
                    state: AgentState::Occupied,
                    search_start_time: 0,
                    generation: 1,
                    assigned_resource: Some(resource),
                    assigned_at: 40,
                },
                Position(LocationOnRoad { road: RoadId(1), travel_time_from_start: 0 }),
            ))
            .id();

        world.insert_resource(CurrentEvent(Event {
            timestamp: 200,
            kind: EventKind::AgentArriveAtDropoff,
            subject: EventSubject::Agent(agent_entity),
            generation: 1,
        }));
        let mut schedule = Schedule::default();
        schedule.add_systems(arrive_at_dropoff_system);
        schedule.run(&mut world);

        let agent = world.get::<Agent>(agent_entity).expect("agent");
        assert_eq!(agent.state, AgentState::Searching);
        assert_eq!(agent.search_start_time, 200);
        assert_eq!(agent.assigned_resource, None);
        assert_eq!(world.get::<Position>(agent_entity).expect("position").0, dropoff);
        assert_eq!(world.resource::<EmptyAgents>().0.get(&2), Some(&agent_entity));

        let cruise = world.resource_mut::<SimulationClock>().pop_next().expect("cruise");
        assert_eq!(cruise.kind, EventKind::AgentMove);
        assert_eq!(cruise.timestamp, 220);
        assert_eq!(cruise.generation, 1);
    }
}

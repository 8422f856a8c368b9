use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Agent, AgentState, Position, SimFault, TripRequest};
use crate::error::SimError;
use crate::telemetry::SimTelemetry;

/// An approaching agent reaches its resource's pickup point: the pickup
/// accounting lands here, the agent turns Occupied, and the dropoff is
/// scheduled one trip duration ahead.
///
/// Search time runs from the moment the agent last entered Searching until
/// this pickup, so it includes the approach leg.
pub fn arrive_at_resource_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimFault>,
    mut agents: Query<(&mut Agent, &mut Position)>,
    requests: Query<&TripRequest>,
) {
    if event.0.kind != EventKind::AgentArriveAtResource {
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
    if agent.state != AgentState::Approaching {
        fault.set(SimError::Invariant(format!(
            "pickup arrival for agent {} in state {:?}",
            agent.id, agent.state
        )));
        return;
    }
    let Some(resource) = agent.assigned_resource else {
        fault.set(SimError::Invariant(format!("agent {} arrived with no assignment", agent.id)));
        return;
    };
    let Ok(request) = requests.get(resource) else {
        fault.set(SimError::Invariant(format!("agent {} assigned to unknown resource", agent.id)));
        return;
    };

    let now = event.0.timestamp;
    telemetry.total_agent_search_time += now - agent.search_start_time;
    telemetry.total_agent_approach_time += now - agent.assigned_at;
    telemetry.total_resource_wait_time += now - request.announce_time;
    telemetry.total_resource_trip_time += request.trip_duration;

    position.0 = request.pickup;
    agent.state = AgentState::Occupied;
    clock.schedule(Event {
        timestamp: now + request.trip_duration,
        kind: EventKind::AgentArriveAtDropoff,
        subject: EventSubject::Agent(entity),
        generation: agent.generation,
    });
}

//! The dispatch epoch: closes the batching window and matches its resources.
//!
//! Runs ahead of every other handler. The first event of any kind whose time
//! lies past the window horizon closes the window: resources that can no
//! longer be served get their expiration scheduled at its natural time, the
//! survivors go through the cost-matrix builder and the configured policy,
//! matches are applied, and unmatched resources carry over into a window
//! re-anchored at the flush time.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::batch::BatchWindow;
use crate::clock::{CurrentEvent, Event, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Agent, AgentState, EmptyAgents, Position, RequestState, SimFault, TripRequest};
use crate::error::SimError;
use crate::matching::{build_batch_entries, AssignmentPolicyResource, WaitingResource};
use crate::network::{LocationOnRoad, TravelTimeOracleResource};
use crate::scenario::SimulationParams;
use crate::strategy::SearchStrategyResource;
use crate::telemetry::SimTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn dispatch_epoch_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    params: Res<SimulationParams>,
    oracle: Res<TravelTimeOracleResource>,
    policy: Res<AssignmentPolicyResource>,
    mut strategy: ResMut<SearchStrategyResource>,
    mut window: ResMut<BatchWindow>,
    mut empty_agents: ResMut<EmptyAgents>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimFault>,
    mut agents: Query<(&mut Agent, &Position)>,
    mut requests: Query<&mut TripRequest>,
) {
    let now = event.0.timestamp;
    if window.accepts(now, params.assignment_period) {
        return;
    }
    if window.pending.is_empty() {
        // Every entry was reaped by expiration events; nothing to dispatch.
        window.start_time = None;
        return;
    }
    telemetry.pool_count += 1;

    // Reap resources that cannot be served anymore. Their expiration is
    // scheduled at its natural time, which may already have passed; the
    // expire handler does the counting either way.
    let mut kept = Vec::with_capacity(window.pending.len());
    for &entity in &window.pending {
        let Ok(request) = requests.get(entity) else {
            continue;
        };
        if request.expiration_time <= now {
            clock.schedule(Event {
                timestamp: request.expiration_time,
                kind: EventKind::ResourceExpire,
                subject: EventSubject::Resource(entity),
                generation: 0,
            });
        } else {
            kept.push(entity);
        }
    }
    window.pending = kept;

    let waiting: Vec<WaitingResource> = window
        .pending
        .iter()
        .filter_map(|&entity| {
            requests.get(entity).ok().map(|request| WaitingResource {
                entity,
                id: request.id,
                pickup: request.pickup,
                expiration_time: request.expiration_time,
                fare: request.fare,
            })
        })
        .collect();
    let idle: Vec<(u64, bevy_ecs::prelude::Entity, LocationOnRoad)> = empty_agents
        .0
        .iter()
        .filter_map(|(&agent_id, &entity)| {
            agents.get(entity).ok().map(|(_, position)| (agent_id, entity, position.0))
        })
        .collect();

    let entries = build_batch_entries(&waiting, &idle, &**oracle, now);
    let matches = policy.assign(&entries);

    for matched in &matches {
        if empty_agents.0.remove(&matched.agent_id).is_none() {
            fault.set(SimError::Invariant(format!(
                "agent {} reserved twice in one epoch",
                matched.agent_id
            )));
            return;
        }
        let Ok((mut agent, _)) = agents.get_mut(matched.agent) else {
            fault.set(SimError::Invariant(format!("matched unknown agent {}", matched.agent_id)));
            return;
        };
        let Ok(mut request) = requests.get_mut(matched.resource) else {
            fault.set(SimError::Invariant(format!(
                "matched unknown resource {:?}",
                matched.resource
            )));
            return;
        };
        // Bumping the generation cancels the agent's pending cruise event.
        agent.generation += 1;
        agent.state = AgentState::Approaching;
        agent.assigned_resource = Some(matched.resource);
        agent.assigned_at = now;
        request.state = RequestState::Assigned;

        telemetry.total_assignments += 1;
        telemetry.total_fare += request.fare;
        telemetry.total_benefit_factor += matched.benefit;
        strategy.on_assignment(agent.id, request.id);

        clock.schedule(Event {
            timestamp: now + matched.pickup_time,
            kind: EventKind::AgentArriveAtResource,
            subject: EventSubject::Agent(matched.agent),
            generation: agent.generation,
        });
        window.pending.retain(|&entity| entity != matched.resource);
    }

    // Unmatched resources carry over; the next window is anchored here.
    window.start_time = if window.pending.is_empty() { None } else { Some(now) };
}

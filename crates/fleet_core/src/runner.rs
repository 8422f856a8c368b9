//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule; every system checks the event kind
//! and at most one reacts. A fault recorded by any system stops the run.

use bevy_ecs::prelude::{Entity, Schedule, World};
use bevy_ecs::schedule::apply_deferred;
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::batch::BatchWindow;
use crate::clock::{CurrentEvent, SimulationClock};
use crate::ecs::{Agent, EmptyAgents, RequestState, SimFault, TripRequest};
use crate::error::SimResult;
use crate::scenario::SimulationEndTime;
use crate::systems::{
    agent_move::agent_move_system, arrive_at_dropoff::arrive_at_dropoff_system,
    arrive_at_resource::arrive_at_resource_system, dispatch_epoch::dispatch_epoch_system,
    resource_announce::resource_announce_system, resource_expire::resource_expire_system,
};
use crate::telemetry::SimTelemetry;

/// Runs one simulation step. `Ok(false)` means the queue drained or the next
/// event lies past the simulation end time.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> SimResult<bool> {
    let end_time = world.get_resource::<SimulationEndTime>().map(|end| end.0);
    let event = {
        let mut clock = world.resource_mut::<SimulationClock>();
        match clock.pop_next_until(end_time) {
            Some(event) => event,
            None => return Ok(false),
        }
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    if let Some(error) = world.resource_mut::<SimFault>().0.take() {
        return Err(error);
    }
    Ok(true)
}

/// Runs steps until termination or `max_steps`. Returns the steps executed.
pub fn run_until_done(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> SimResult<usize> {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule)? {
        steps += 1;
    }
    Ok(steps)
}

/// Builds the simulation schedule. The epoch system must see every event
/// before its kind-specific handler does (a horizon-crossing arrival first
/// closes the old window, then joins the new one), so the set is chained.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            dispatch_epoch_system,
            resource_announce_system,
            resource_expire_system,
            agent_move_system,
            arrive_at_resource_system,
            arrive_at_dropoff_system,
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// End-of-run bookkeeping: resources still sitting in the window count as
/// expired, and agents still searching are credited the time from their last
/// search start to the simulation end.
pub fn finalize_simulation(world: &mut World) {
    let pending: Vec<Entity> = std::mem::take(&mut world.resource_mut::<BatchWindow>().pending);
    let mut newly_expired = 0;
    for entity in pending {
        if let Some(mut request) = world.get_mut::<TripRequest>(entity) {
            if request.state == RequestState::Waiting {
                request.state = RequestState::Expired;
                newly_expired += 1;
            }
        }
    }
    world.resource_mut::<SimTelemetry>().expired_resources += newly_expired;

    let end_time = world.get_resource::<SimulationEndTime>().map_or(0, |end| end.0);
    let searching: Vec<Entity> = world.resource::<EmptyAgents>().0.values().copied().collect();
    let mut remaining_search_time = 0;
    for entity in searching {
        if let Some(agent) = world.get::<Agent>(entity) {
            remaining_search_time += end_time.saturating_sub(agent.search_start_time);
        }
    }
    world.resource_mut::<SimTelemetry>().total_agent_search_time += remaining_search_time;
}

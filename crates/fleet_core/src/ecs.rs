use std::collections::BTreeMap;

use bevy_ecs::prelude::{Component, Entity, Resource};

use crate::error::SimError;
use crate::network::LocationOnRoad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Cruising empty; a member of [EmptyAgents] and assignable at any epoch.
    Searching,
    /// Reserved for a resource and driving to its pickup point.
    Approaching,
    /// Carrying a resource to its dropoff point.
    Occupied,
}

/// A driver/vehicle unit.
///
/// `generation` implements lazy event cancellation: every event scheduled for
/// the agent carries the generation current at scheduling time, and bumping
/// the counter invalidates whatever is still in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Agent {
    pub id: u64,
    pub state: AgentState,
    pub search_start_time: u64,
    pub generation: u64,
    pub assigned_resource: Option<Entity>,
    /// Time the current assignment was made; meaningless while Searching.
    pub assigned_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Position(pub LocationOnRoad);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Announced,
    Waiting,
    Assigned,
    Expired,
}

/// A ride request (the "resource"): appears at `announce_time`, lives for a
/// bounded time, and is served by exactly one agent or expires.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct TripRequest {
    pub id: u64,
    pub announce_time: u64,
    pub pickup: LocationOnRoad,
    pub dropoff: LocationOnRoad,
    /// Oracle travel time from pickup to dropoff.
    pub trip_duration: u64,
    pub fare: f64,
    pub expiration_time: u64,
    pub state: RequestState,
}

/// Registry of agents currently in Searching state, ordered by agent id so
/// candidate enumeration is deterministic.
#[derive(Debug, Default, Resource)]
pub struct EmptyAgents(pub BTreeMap<u64, Entity>);

/// Parking spot for a fatal error raised inside a system. Systems cannot
/// return `Result`; the runner checks this after every step and aborts the
/// run with the recorded diagnostic. Only the first fault is kept.
#[derive(Debug, Default, Resource)]
pub struct SimFault(pub Option<SimError>);

impl SimFault {
    pub fn set(&mut self, error: SimError) {
        if self.0.is_none() {
            self.0 = Some(error);
        }
    }
}

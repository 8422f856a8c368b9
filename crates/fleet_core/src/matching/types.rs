use bevy_ecs::prelude::Entity;

use crate::network::LocationOnRoad;

/// A waiting resource as the cost-matrix builder sees it.
#[derive(Debug, Clone, Copy)]
pub struct WaitingResource {
    pub entity: Entity,
    pub id: u64,
    pub pickup: LocationOnRoad,
    pub expiration_time: u64,
    pub fare: f64,
}

/// One feasible (agent, pickup time) option for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupCandidate {
    pub agent: Entity,
    pub agent_id: u64,
    pub pickup_time: u64,
}

/// A batch row: a resource plus its candidate agents in ascending agent id.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub resource: Entity,
    pub resource_id: u64,
    pub fare: f64,
    pub candidates: Vec<PickupCandidate>,
}

/// A matched pair as chosen by an assignment policy.
///
/// `benefit` is the selected cell weight (`pickup_time / fare`) under the
/// optimal policy; the greedy policy reports 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub resource: Entity,
    pub agent: Entity,
    pub agent_id: u64,
    pub pickup_time: u64,
    pub benefit: f64,
}

//! Road network model and the travel-time oracle interface.
//!
//! The network is built once by the map pipeline and is immutable afterwards:
//! it exposes only getters, so handing `&RoadNetwork` to a search strategy
//! cannot leak mutable access. Travel times between arbitrary positions come
//! from a [TravelTimeOracle], typically backed by precomputed all-pairs
//! shortest paths.

use std::collections::HashMap;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;

use crate::error::{SimError, SimResult};

/// A road-network node with a stable id and geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
}

/// Index of a road within its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoadId(pub usize);

/// A directed edge between two intersections with a traversal duration in
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    pub id: RoadId,
    pub from: u64,
    pub to: u64,
    pub travel_time: u64,
}

/// A point on the map: a road plus the travel time from its start
/// intersection. All positions the kernel handles use this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOnRoad {
    pub road: RoadId,
    pub travel_time_from_start: u64,
}

#[derive(Debug, Default)]
pub struct RoadNetwork {
    intersections: Vec<Intersection>,
    intersection_index: HashMap<u64, usize>,
    roads: Vec<Road>,
    outgoing: HashMap<u64, Vec<RoadId>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_intersection(&mut self, id: u64, lat: f64, lng: f64) {
        self.intersection_index.insert(id, self.intersections.len());
        self.intersections.push(Intersection { id, lat, lng });
    }

    pub fn add_road(&mut self, from: u64, to: u64, travel_time: u64) -> SimResult<RoadId> {
        if !self.intersection_index.contains_key(&from) {
            return Err(SimError::Data(format!("road references unknown intersection {from}")));
        }
        if !self.intersection_index.contains_key(&to) {
            return Err(SimError::Data(format!("road references unknown intersection {to}")));
        }
        let id = RoadId(self.roads.len());
        self.roads.push(Road { id, from, to, travel_time });
        self.outgoing.entry(from).or_default().push(id);
        Ok(id)
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn intersection(&self, id: u64) -> Option<&Intersection> {
        self.intersection_index.get(&id).map(|&i| &self.intersections[i])
    }

    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.0]
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Roads leaving `intersection`, in insertion order.
    pub fn roads_from(&self, intersection: u64) -> &[RoadId] {
        self.outgoing.get(&intersection).map_or(&[], Vec::as_slice)
    }

    /// The road from `from` to `to`, if the two intersections are adjacent.
    pub fn road_between(&self, from: u64, to: u64) -> Option<RoadId> {
        self.roads_from(from)
            .iter()
            .copied()
            .find(|&id| self.road(id).to == to)
    }

    pub fn location_at_start(&self, road: RoadId) -> LocationOnRoad {
        LocationOnRoad { road, travel_time_from_start: 0 }
    }

    pub fn location_at_end(&self, road: RoadId) -> LocationOnRoad {
        LocationOnRoad { road, travel_time_from_start: self.road(road).travel_time }
    }

    /// Seconds left until `loc` reaches the end of its road.
    pub fn remaining_on_road(&self, loc: LocationOnRoad) -> u64 {
        self.road(loc.road)
            .travel_time
            .saturating_sub(loc.travel_time_from_start)
    }

    /// A location is on the map when its road exists and its offset does not
    /// overshoot the road.
    pub fn contains_location(&self, loc: LocationOnRoad) -> bool {
        loc.road.0 < self.roads.len()
            && loc.travel_time_from_start <= self.road(loc.road).travel_time
    }
}

/// Answers `travel_time(from, to)` in seconds for any two on-map positions.
pub trait TravelTimeOracle: Send + Sync {
    fn travel_time(&self, from: LocationOnRoad, to: LocationOnRoad) -> u64;
}

/// Resource wrapper for the travel-time oracle trait object.
#[derive(Resource)]
pub struct TravelTimeOracleResource(pub Box<dyn TravelTimeOracle>);

impl std::ops::Deref for TravelTimeOracleResource {
    type Target = dyn TravelTimeOracle;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Shared immutable handle to the road network.
#[derive(Clone, Resource)]
pub struct RoadNetworkResource(pub Arc<RoadNetwork>);

//! The resource feed: ride requests as they come out of the dataset reader.
//!
//! Rows arrive already map-matched; the kernel never sees raw coordinates.

use crate::error::{SimError, SimResult};
use crate::network::{LocationOnRoad, RoadNetwork};

/// One ride request from the dataset, map-matched to road positions.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRecord {
    pub announce_time: u64,
    pub pickup: LocationOnRoad,
    pub dropoff: LocationOnRoad,
    pub fare: f64,
}

/// Rejects feeds the simulator cannot run: announce times must be
/// non-decreasing, fares positive, and every position on the map.
pub fn validate_feed(records: &[ResourceRecord], network: &RoadNetwork) -> SimResult<()> {
    let mut previous_announce = 0u64;
    for (row, record) in records.iter().enumerate() {
        if record.announce_time < previous_announce {
            return Err(SimError::Data(format!(
                "announce times must be non-decreasing (row {row} goes back to {})",
                record.announce_time
            )));
        }
        previous_announce = record.announce_time;
        if record.fare <= 0.0 {
            return Err(SimError::Data(format!("row {row} has non-positive fare {}", record.fare)));
        }
        if !network.contains_location(record.pickup) {
            return Err(SimError::Data(format!("row {row} pickup is off the map")));
        }
        if !network.contains_location(record.dropoff) {
            return Err(SimError::Data(format!("row {row} dropoff is off the map")));
        }
    }
    Ok(())
}

//! Run a synthetic dispatch scenario and print the report.
//!
//! Run with: cargo run -p fleet_core --example dispatch_run

use std::io;
use std::sync::Arc;

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fleet_core::feed::ResourceRecord;
use fleet_core::network::{LocationOnRoad, RoadId, RoadNetwork, TravelTimeOracle};
use fleet_core::report::extract_report;
use fleet_core::runner::{finalize_simulation, run_next_event, simulation_schedule};
use fleet_core::scenario::{build_simulation, SimulationEndTime, SimulationParams};
use fleet_core::strategy::RandomWalk;

const RING_SIZE: usize = 60;
const SECS_PER_ROAD: u64 = 30;
const NUM_AGENTS: u64 = 25;
const NUM_REQUESTS: usize = 400;
/// Requests arrive uniformly over one simulated hour.
const REQUEST_WINDOW_SECS: u64 = 3600;
const SEED: u64 = 123;

/// One-way ring city: road `i` runs from intersection `i` to `i + 1`.
fn ring_city() -> Arc<RoadNetwork> {
    let mut network = RoadNetwork::new();
    for id in 0..RING_SIZE as u64 {
        network.add_intersection(id, 52.5 + id as f64 * 1e-3, 13.4);
    }
    for i in 0..RING_SIZE as u64 {
        network
            .add_road(i, (i + 1) % RING_SIZE as u64, SECS_PER_ROAD)
            .expect("ring road endpoints exist");
    }
    Arc::new(network)
}

/// Exact oracle for the ring: distance is measured forward around it.
struct RingTravelTimes;

impl RingTravelTimes {
    fn coordinate(loc: LocationOnRoad) -> u64 {
        loc.road.0 as u64 * SECS_PER_ROAD + loc.travel_time_from_start
    }
}

impl TravelTimeOracle for RingTravelTimes {
    fn travel_time(&self, from: LocationOnRoad, to: LocationOnRoad) -> u64 {
        let total = RING_SIZE as u64 * SECS_PER_ROAD;
        (Self::coordinate(to) + total - Self::coordinate(from)) % total
    }
}

fn synthetic_feed(seed: u64) -> Vec<ResourceRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut announce_times: Vec<u64> =
        (0..NUM_REQUESTS).map(|_| rng.gen_range(0..REQUEST_WINDOW_SECS)).collect();
    announce_times.sort_unstable();

    announce_times
        .into_iter()
        .map(|announce_time| ResourceRecord {
            announce_time,
            pickup: LocationOnRoad {
                road: RoadId(rng.gen_range(0..RING_SIZE)),
                travel_time_from_start: 0,
            },
            dropoff: LocationOnRoad {
                road: RoadId(rng.gen_range(0..RING_SIZE)),
                travel_time_from_start: 0,
            },
            fare: 3.0 + rng.gen_range(0.0..22.0),
        })
        .collect()
}

fn main() {
    let params = SimulationParams::from_key_values([
        ("numberOfAgents", NUM_AGENTS.to_string().as_str()),
        ("resourceMaximumLifeTime", "600"),
        ("assignmentPeriod", "30"),
        ("assignmentAlgorithm", "optimum"),
        ("datasetFile", "synthetic://ring-city"),
        ("mapJsonFile", "synthetic://ring-city"),
        ("boundingPolygonKmlFile", "synthetic://ring-city"),
        ("agentPlacementSeed", SEED.to_string().as_str()),
    ])
    .expect("demo configuration is valid");

    println!("***Simulation environment***");
    println!("JSON map file: {}", params.map_json_file);
    println!("Resource dataset file: {}", params.dataset_file);
    println!("Number of agents: {}", params.num_agents);
    println!("Number of resources: {NUM_REQUESTS}");
    println!("Resource Maximum Life Time: {} seconds", params.resource_max_lifetime);

    let mut world = World::new();
    build_simulation(
        &mut world,
        params,
        ring_city(),
        Box::new(RingTravelTimes),
        Box::new(RandomWalk::new(SEED)),
        &synthetic_feed(SEED),
    )
    .expect("scenario builds");

    let end_time = world.resource::<SimulationEndTime>().0;
    let progress = ProgressBar::new(end_time);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}s")
            .expect("progress template")
            .progress_chars("#>-"),
    );

    let mut schedule = simulation_schedule();
    loop {
        match run_next_event(&mut world, &mut schedule) {
            Ok(true) => {
                let now = world.resource::<fleet_core::clock::SimulationClock>().now();
                progress.set_position(now.min(end_time));
            }
            Ok(false) => break,
            Err(error) => {
                progress.abandon();
                eprintln!("simulation aborted: {error}");
                std::process::exit(1);
            }
        }
    }
    progress.finish_and_clear();
    finalize_simulation(&mut world);

    println!("\n***Statistics***");
    let report = extract_report(&mut world);
    report.write_text(&mut io::stdout()).expect("report to stdout");
}

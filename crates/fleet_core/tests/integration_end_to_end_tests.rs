//! Full-run integration tests: carry-over across epochs, conservation, and
//! bit-identical reports for identical inputs.

use bevy_ecs::prelude::World;

use fleet_core::feed::ResourceRecord;
use fleet_core::network::{LocationOnRoad, RoadId};
use fleet_core::report::{extract_report, ReportSummary};
use fleet_core::runner::{finalize_simulation, run_until_done, simulation_schedule};
use fleet_core::scenario::{build_simulation, AssignmentPolicyKind, SimulationParams};
use fleet_core::strategy::RandomWalk;
use fleet_core::test_helpers::{ring_network, RingOracle, TableOracle};

fn location(road: usize) -> LocationOnRoad {
    LocationOnRoad { road: RoadId(road), travel_time_from_start: 0 }
}

#[test]
fn unmatched_resources_carry_over_until_served_or_expired() {
    // Three requests land in one 10s window with a single agent. The first
    // epoch serves one; the others carry over. The agent frees up in time to
    // serve the second, and the third runs out its 150s lifetime.
    let network = ring_network(4, 30);
    let mut oracle = TableOracle::new(0);
    oracle.set(RoadId(1), RoadId(2), 50);

    let feed = vec![
        ResourceRecord { announce_time: 0, pickup: location(1), dropoff: location(2), fare: 10.0 },
        ResourceRecord { announce_time: 2, pickup: location(1), dropoff: location(2), fare: 20.0 },
        ResourceRecord { announce_time: 5, pickup: location(1), dropoff: location(2), fare: 30.0 },
    ];

    let mut world = World::new();
    build_simulation(
        &mut world,
        SimulationParams::default()
            .with_num_agents(1)
            .with_assignment_period(10)
            .with_resource_max_lifetime(150),
        network,
        Box::new(oracle),
        Box::new(RandomWalk::new(3)),
        &feed,
    )
    .expect("build");

    let mut schedule = simulation_schedule();
    let steps = run_until_done(&mut world, &mut schedule, 1000).expect("run");
    assert!(steps < 1000, "runner did not converge");
    finalize_simulation(&mut world);

    let report = extract_report(&mut world);
    assert_eq!(report.total_resources, 3);
    assert_eq!(report.total_assignments, 2);
    assert_eq!(report.expired_resources, 1);
    assert_eq!(report.total_fare, 30.0, "the 10.0 and 20.0 fares were served");
    assert_eq!(
        report.total_resources,
        report.total_assignments + report.expired_resources,
        "conservation"
    );
}

fn run_city_scenario(policy: AssignmentPolicyKind) -> ReportSummary {
    let network = ring_network(12, 20);
    let mut feed = Vec::new();
    for i in 0..30u64 {
        feed.push(ResourceRecord {
            announce_time: i * 11,
            pickup: LocationOnRoad { road: RoadId((i as usize * 5) % 12), travel_time_from_start: 0 },
            dropoff: LocationOnRoad { road: RoadId((i as usize * 7 + 3) % 12), travel_time_from_start: 0 },
            fare: 4.0 + (i % 9) as f64 * 2.5,
        });
    }

    let mut world = World::new();
    build_simulation(
        &mut world,
        SimulationParams::default()
            .with_num_agents(4)
            .with_assignment_period(30)
            .with_resource_max_lifetime(400)
            .with_assignment_policy(policy)
            .with_agent_placement_seed(11),
        network,
        Box::new(RingOracle::new(12, 20)),
        Box::new(RandomWalk::new(11)),
        &feed,
    )
    .expect("build");

    let mut schedule = simulation_schedule();
    let steps = run_until_done(&mut world, &mut schedule, 100_000).expect("run");
    assert!(steps < 100_000, "runner did not converge");
    finalize_simulation(&mut world);
    extract_report(&mut world)
}

#[test]
fn every_resource_ends_assigned_or_expired() {
    for policy in [AssignmentPolicyKind::Fair, AssignmentPolicyKind::Optimum] {
        let report = run_city_scenario(policy);
        assert_eq!(report.total_resources, 30);
        assert_eq!(
            report.total_resources,
            report.total_assignments + report.expired_resources
        );
    }
}

#[test]
fn identical_inputs_produce_bit_identical_reports() {
    let first = run_city_scenario(AssignmentPolicyKind::Optimum);
    let second = run_city_scenario(AssignmentPolicyKind::Optimum);
    assert_eq!(first, second);
    assert_eq!(first.to_text(), second.to_text());
}

#[test]
fn the_optimal_policy_records_benefit_and_the_greedy_policy_does_not() {
    let fair = run_city_scenario(AssignmentPolicyKind::Fair);
    let optimum = run_city_scenario(AssignmentPolicyKind::Optimum);
    assert_eq!(fair.average_benefit_factor, 0.0);
    if optimum.total_assignments > 0 {
        assert!(optimum.average_benefit_factor > 0.0);
    }
}

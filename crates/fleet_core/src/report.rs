//! Report extraction and rendering.
//!
//! The summary is pulled out of a finished world and rendered as the plain
//! text block downstream scripts grep; it also serializes to JSON for sweep
//! tooling.

use std::io;

use bevy_ecs::prelude::World;

use crate::ecs::{Agent, EmptyAgents};
use crate::telemetry::SimTelemetry;

/// Aggregated results of a single run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReportSummary {
    pub total_agents: u64,
    pub total_resources: u64,
    pub total_assignments: u64,
    pub expired_resources: u64,
    pub total_fare: f64,
    pub pool_count: u64,
    /// Floor of total agent search time over (assignments + agents still
    /// searching at the end).
    pub average_search_time_secs: u64,
    /// Floor of total resource wait time over all resources.
    pub average_wait_time_secs: u64,
    pub expiration_percentage: f64,
    pub average_benefit_factor: f64,
}

/// Extract the report from a finished (run + finalized) world.
pub fn extract_report(world: &mut World) -> ReportSummary {
    let total_agents = world.query::<&Agent>().iter(world).count() as u64;
    let still_searching = world.resource::<EmptyAgents>().0.len() as u64;
    let telemetry = world.resource::<SimTelemetry>();

    debug_assert_eq!(
        telemetry.total_resources,
        telemetry.total_assignments + telemetry.expired_resources,
        "every resource must end assigned or expired"
    );

    let search_divisor = telemetry.total_assignments + still_searching;
    let average_search_time_secs = if search_divisor > 0 {
        telemetry.total_agent_search_time / search_divisor
    } else {
        0
    };
    let average_wait_time_secs = if telemetry.total_resources > 0 {
        telemetry.total_resource_wait_time / telemetry.total_resources
    } else {
        0
    };
    let expiration_percentage = if telemetry.total_resources > 0 {
        telemetry.expired_resources as f64 * 100.0 / telemetry.total_resources as f64
    } else {
        0.0
    };
    let average_benefit_factor = if total_agents > 0 {
        telemetry.total_benefit_factor / total_agents as f64
    } else {
        0.0
    };

    ReportSummary {
        total_agents,
        total_resources: telemetry.total_resources,
        total_assignments: telemetry.total_assignments,
        expired_resources: telemetry.expired_resources,
        total_fare: telemetry.total_fare,
        pool_count: telemetry.pool_count,
        average_search_time_secs,
        average_wait_time_secs,
        expiration_percentage,
        average_benefit_factor,
    }
}

impl ReportSummary {
    /// Render the statistics block into an injected sink.
    pub fn write_text<W: io::Write>(&self, sink: &mut W) -> io::Result<()> {
        if self.total_resources == 0 {
            writeln!(sink, "No resources.")?;
            return Ok(());
        }
        writeln!(sink, "Total Fare earned from allocation: {}", self.total_fare)?;
        writeln!(sink, "Number of Pools processed: {}", self.pool_count)?;
        writeln!(sink, "average agent search time: {} seconds", self.average_search_time_secs)?;
        writeln!(sink, "average resource wait time: {} seconds", self.average_wait_time_secs)?;
        writeln!(sink, "resource expiration percentage: {}%", self.expiration_percentage)?;
        writeln!(sink, "average benefit factor: {}", self.average_benefit_factor)?;
        writeln!(sink, "total number of assignments: {}", self.total_assignments)?;
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut buffer = Vec::new();
        self.write_text(&mut buffer).expect("writing to a Vec cannot fail");
        String::from_utf8(buffer).expect("report text is valid UTF-8")
    }
}

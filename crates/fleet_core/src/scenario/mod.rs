pub mod build;
pub mod params;

pub use build::{build_simulation, create_earliest_pickup, create_optimal_assignment};
pub use params::{AssignmentPolicyKind, SimulationEndTime, SimulationParams};

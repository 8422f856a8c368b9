pub mod batch;
pub mod clock;
pub mod ecs;
pub mod error;
pub mod feed;
pub mod matching;
pub mod network;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod strategy;
pub mod systems;
pub mod telemetry;
pub mod test_helpers;

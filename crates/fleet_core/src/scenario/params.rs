use bevy_ecs::prelude::Resource;

use crate::error::{SimError, SimResult};

/// Which assignment policy dispatches each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPolicyKind {
    /// Greedy earliest-pickup matching.
    Fair,
    /// Global minimum-cost matching on `pickup_time / fare`.
    Optimum,
}

/// Simulation end time in seconds: the expiration time of the last resource.
/// The runner stops once the next event would fire after this timestamp.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTime(pub u64);

/// Parameters for one simulation run.
///
/// The file paths are opaque here: map building, polygon clipping, and
/// dataset reading happen upstream, but the keys belong to this surface so a
/// whole run is described by one recognized-key set.
#[derive(Debug, Clone, Resource)]
pub struct SimulationParams {
    pub num_agents: u64,
    /// Maximum resource lifetime in seconds.
    pub resource_max_lifetime: u64,
    /// The batch frame in seconds: resources announced within one period are
    /// dispatched together.
    pub assignment_period: u64,
    pub assignment_policy: AssignmentPolicyKind,
    pub dataset_file: String,
    pub map_json_file: String,
    pub bounding_polygon_kml_file: String,
    pub agent_placement_seed: u64,
    /// Speed reduction to accommodate traffic and turn delays; applied by the
    /// map pipeline. Must be in (0, 1].
    pub speed_reduction: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_agents: 10,
            resource_max_lifetime: 600,
            assignment_period: 30,
            assignment_policy: AssignmentPolicyKind::Fair,
            dataset_file: String::new(),
            map_json_file: String::new(),
            bounding_polygon_kml_file: String::new(),
            agent_placement_seed: 0,
            speed_reduction: 1.0,
        }
    }
}

const REQUIRED_KEYS: [&str; 7] = [
    "numberOfAgents",
    "resourceMaximumLifeTime",
    "assignmentPeriod",
    "assignmentAlgorithm",
    "datasetFile",
    "mapJsonFile",
    "boundingPolygonKmlFile",
];

impl SimulationParams {
    pub fn with_num_agents(mut self, num_agents: u64) -> Self {
        self.num_agents = num_agents;
        self
    }

    pub fn with_resource_max_lifetime(mut self, seconds: u64) -> Self {
        self.resource_max_lifetime = seconds;
        self
    }

    pub fn with_assignment_period(mut self, seconds: u64) -> Self {
        self.assignment_period = seconds;
        self
    }

    pub fn with_assignment_policy(mut self, policy: AssignmentPolicyKind) -> Self {
        self.assignment_policy = policy;
        self
    }

    pub fn with_agent_placement_seed(mut self, seed: u64) -> Self {
        self.agent_placement_seed = seed;
        self
    }

    /// Build params from recognized `key = value` pairs. Unknown keys and
    /// missing required keys are configuration errors.
    pub fn from_key_values<I, K, V>(pairs: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        let mut seen: Vec<String> = Vec::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            seen.push(key.to_string());
            match key {
                "numberOfAgents" => params.num_agents = parse_u64(key, value)?,
                "resourceMaximumLifeTime" => params.resource_max_lifetime = parse_u64(key, value)?,
                "assignmentPeriod" => params.assignment_period = parse_u64(key, value)?,
                "assignmentAlgorithm" => {
                    params.assignment_policy = match value {
                        "fair" => AssignmentPolicyKind::Fair,
                        "optimum" => AssignmentPolicyKind::Optimum,
                        other => {
                            return Err(SimError::Config(format!(
                                "assignmentAlgorithm must be \"fair\" or \"optimum\", got \"{other}\""
                            )))
                        }
                    }
                }
                "datasetFile" => params.dataset_file = value.to_string(),
                "mapJsonFile" => params.map_json_file = value.to_string(),
                "boundingPolygonKmlFile" => params.bounding_polygon_kml_file = value.to_string(),
                "agentPlacementSeed" => params.agent_placement_seed = parse_u64(key, value)?,
                "speedReduction" => {
                    params.speed_reduction = value
                        .parse()
                        .map_err(|_| SimError::Config(format!("speedReduction is not a number: \"{value}\"")))?
                }
                unknown => return Err(SimError::Config(format!("unrecognized option \"{unknown}\""))),
            }
        }
        for required in REQUIRED_KEYS {
            if !seen.iter().any(|k| k.as_str() == required) {
                return Err(SimError::Config(format!("missing required option \"{required}\"")));
            }
        }
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.num_agents == 0 {
            return Err(SimError::Config("numberOfAgents must be positive".into()));
        }
        if self.resource_max_lifetime == 0 {
            return Err(SimError::Config("resourceMaximumLifeTime must be positive".into()));
        }
        if self.assignment_period == 0 {
            return Err(SimError::Config("assignmentPeriod must be positive".into()));
        }
        if !(self.speed_reduction > 0.0 && self.speed_reduction <= 1.0) {
            return Err(SimError::Config(format!(
                "speedReduction must be in (0, 1], got {}",
                self.speed_reduction
            )));
        }
        Ok(())
    }
}

fn parse_u64(key: &str, value: &str) -> SimResult<u64> {
    value
        .parse()
        .map_err(|_| SimError::Config(format!("{key} is not a non-negative integer: \"{value}\"")))
}

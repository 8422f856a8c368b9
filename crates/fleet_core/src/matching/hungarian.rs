//! Optimal assignment policy: rectangular minimum-cost matching on
//! `pickup_time / fare` weights via the Kuhn-Munkres algorithm.

use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::Entity;
use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use super::algorithm::AssignmentPolicy;
use super::types::{Assignment, BatchEntry};

/// Scale factor to convert f64 weights to i64 for the assignment algorithm.
const SCALE: f64 = 1_000_000.0;

/// Weight for cells with no feasible pairing (never selected).
/// Must be worse than any feasible score but not so extreme that negating and
/// summing over a batch overflows i64.
const INFEASIBLE: i64 = -1_000_000_000_000_i64;

/// Simple matrix type implementing pathfinding's Weights for i64.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// The "optimum" policy: minimizes the total `pickup_time / fare` across the
/// matched pairs of a batch, so high-fare resources tolerate longer pickups.
///
/// Kuhn-Munkres maximizes, so each weight is negated and scaled to i64; cells
/// without a candidate get [INFEASIBLE], and any row whose selected cell is
/// infeasible is treated as unmatched and carries over.
#[derive(Debug, Default)]
pub struct OptimalAssignment;

impl OptimalAssignment {
    /// Convert a `pickup_time / fare` weight into a maximization score.
    /// Clamped to stay strictly above [INFEASIBLE] even for tiny fares.
    fn weight_to_score(weight: f64) -> i64 {
        let score = (-(weight * SCALE)) as i64;
        score.max(INFEASIBLE + 1)
    }
}

impl AssignmentPolicy for OptimalAssignment {
    fn assign(&self, batch: &[BatchEntry]) -> Vec<Assignment> {
        // Columns are the distinct candidate agent ids, ascending.
        let agent_ids: BTreeSet<u64> = batch
            .iter()
            .flat_map(|entry| entry.candidates.iter().map(|candidate| candidate.agent_id))
            .collect();
        let columns: BTreeMap<u64, usize> = agent_ids
            .iter()
            .enumerate()
            .map(|(col, &agent_id)| (agent_id, col))
            .collect();
        let (m, n) = (batch.len(), columns.len());
        if m == 0 || n == 0 {
            return Vec::new();
        }

        // Resource-major grid of feasible cells: (agent, agent_id, pickup, weight).
        let mut cells: Vec<Vec<Option<(Entity, u64, u64, f64)>>> = vec![vec![None; n]; m];
        for (row, entry) in batch.iter().enumerate() {
            for candidate in &entry.candidates {
                let col = columns[&candidate.agent_id];
                let weight = candidate.pickup_time as f64 / entry.fare;
                cells[row][col] =
                    Some((candidate.agent, candidate.agent_id, candidate.pickup_time, weight));
            }
        }

        // Kuhn-Munkres requires rows <= columns; transpose when resources
        // outnumber agents.
        let resource_major = m <= n;
        let (rows, cols) = if resource_major { (m, n) } else { (n, m) };
        let mut matrix = vec![vec![INFEASIBLE; cols]; rows];
        for (row, row_cells) in cells.iter().enumerate() {
            for (col, cell) in row_cells.iter().enumerate() {
                if let Some((_, _, _, weight)) = cell {
                    let score = Self::weight_to_score(*weight);
                    if resource_major {
                        matrix[row][col] = score;
                    } else {
                        matrix[col][row] = score;
                    }
                }
            }
        }

        let weights = I64Weights(matrix);
        let has_feasible = (0..weights.rows())
            .any(|r| (0..weights.columns()).any(|c| weights.at(r, c) > INFEASIBLE));
        if !has_feasible {
            return Vec::new();
        }

        let (_total, chosen) = kuhn_munkres(&weights);

        let mut assignments = Vec::new();
        for (row, &col) in chosen.iter().enumerate() {
            if weights.at(row, col) <= INFEASIBLE {
                continue;
            }
            let (resource_row, _agent_col) = if resource_major { (row, col) } else { (col, row) };
            let entry = &batch[resource_row];
            let cell = if resource_major { cells[row][col] } else { cells[col][row] };
            let Some((agent, agent_id, pickup_time, weight)) = cell else {
                continue;
            };
            assignments.push(Assignment {
                resource: entry.resource,
                agent,
                agent_id,
                pickup_time,
                benefit: weight,
            });
        }
        // Batch-order output keeps downstream bookkeeping deterministic.
        assignments.sort_by_key(|a| {
            batch
                .iter()
                .position(|entry| entry.resource == a.resource)
                .unwrap_or(usize::MAX)
        });
        assignments
    }
}

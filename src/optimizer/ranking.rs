use serde::{Deserialize, Serialize};

use crate::build::Statistics;
use crate::optimizer::allocation::Allocation;

/// Weights of the linear allocation score. Tentacles count against a build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub expected_successes: f64,
    pub p_at_least_one_success: f64,
    pub expected_tentacles: f64,
    pub elder_signs: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            expected_successes: 1.0,
            p_at_least_one_success: 1.0,
            expected_tentacles: 0.5,
            elder_signs: 0.25,
        }
    }
}

impl ScoreWeights {
    pub fn score(&self, stats: &Statistics) -> f64 {
        self.expected_successes * stats.expected_successes
            + self.p_at_least_one_success * stats.p_at_least_one_success
            + self.elder_signs * stats.expected_elder_signs
            - self.expected_tentacles * stats.expected_tentacles
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedAllocation {
    pub allocation: Allocation,
    /// Resulting levels, indexed by slot.
    pub levels: [u8; 3],
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAllocation {
    pub rank: usize,
    pub allocation: Allocation,
    pub levels: [u8; 3],
    pub score: f64,
    pub expected_successes: f64,
    pub p_at_least_one_success: f64,
    pub expected_tentacles: f64,
    pub expected_elder_signs: f64,
    pub total_dice: u32,
}

/// Sorts by score (descending), then success chance, then fewer tentacles.
pub fn rank_allocations(evaluated: Vec<EvaluatedAllocation>, weights: &ScoreWeights) -> Vec<RankedAllocation> {
    let mut ranked: Vec<RankedAllocation> = evaluated
        .into_iter()
        .map(|entry| RankedAllocation {
            rank: 0,
            allocation: entry.allocation,
            levels: entry.levels,
            score: weights.score(&entry.statistics),
            expected_successes: entry.statistics.expected_successes,
            p_at_least_one_success: entry.statistics.p_at_least_one_success,
            expected_tentacles: entry.statistics.expected_tentacles,
            expected_elder_signs: entry.statistics.expected_elder_signs,
            total_dice: entry.statistics.total_dice,
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| right.p_at_least_one_success.total_cmp(&left.p_at_least_one_success))
            .then_with(|| left.expected_tentacles.total_cmp(&right.expected_tentacles))
            .then_with(|| left.allocation.cmp(&right.allocation))
    });
    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    ranked
}

pub mod allocation;
pub mod export_csv;
pub mod ranking;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::build::{CharacterBuild, PowerSlot, Scenario};
use crate::error::{EngineError, Result};
use crate::insanity::MAX_LEVEL_UPS;
use crate::optimizer::allocation::{enumerate_allocations, Allocation};
use crate::optimizer::ranking::{rank_allocations, EvaluatedAllocation, RankedAllocation, ScoreWeights};
use crate::parallel::{map_in_batches, WorkerPool};

/// Number of progress-reporting batches for optimize-with-progress.
const OPTIMIZE_PROGRESS_BATCH_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Rayon worker threads; 0 uses the global pool.
    pub workers: usize,
    /// How many ranked allocations to keep; 0 keeps all.
    pub top: usize,
    pub weights: ScoreWeights,
    /// When false, allocations are evaluated one after another.
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            top: 10,
            weights: ScoreWeights::default(),
            parallel: true,
        }
    }
}

/// Applies `allocation` to an independent copy of `build`.
pub fn evaluate_allocation(
    build: &CharacterBuild,
    allocation: Allocation,
    scenario: &Scenario,
) -> Result<EvaluatedAllocation> {
    let mut branch = build.clone();
    for slot in allocation.sequence() {
        branch.level_up(slot)?;
    }
    let statistics = branch.statistics(scenario)?;
    Ok(EvaluatedAllocation {
        allocation,
        levels: PowerSlot::ALL.map(|slot| branch.level(slot)),
        statistics,
    })
}

fn check_request(build: &CharacterBuild, level_ups: u8) -> Result<()> {
    if level_ups > MAX_LEVEL_UPS {
        return Err(EngineError::configuration(format!(
            "{level_ups} level-ups requested; a game grants at most {MAX_LEVEL_UPS}"
        )));
    }
    let available = build.track().level_ups_available();
    if available < level_ups {
        return Err(EngineError::configuration(format!(
            "{level_ups} level-ups requested but the track has {available} available"
        )));
    }
    Ok(())
}

/// Drops rejected candidates; any other error aborts the sweep.
fn collect_candidates(results: Vec<(Allocation, Result<EvaluatedAllocation>)>) -> Result<Vec<EvaluatedAllocation>> {
    let mut kept = Vec::with_capacity(results.len());
    for (allocation, result) in results {
        match result {
            Ok(evaluated) => kept.push(evaluated),
            Err(err) if err.is_candidate_rejection() => {
                debug!(allocation = %allocation.label(), error = %err, "candidate discarded");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(kept)
}

pub fn optimize_level_ups(
    build: &CharacterBuild,
    level_ups: u8,
    scenario: &Scenario,
    config: &OptimizerConfig,
) -> Result<Vec<RankedAllocation>> {
    optimize_level_ups_with_progress(build, level_ups, scenario, config, |_, _| {})
}

/// Like [optimize_level_ups] but invokes `on_progress(done, total)` after each batch.
pub fn optimize_level_ups_with_progress<F>(
    build: &CharacterBuild,
    level_ups: u8,
    scenario: &Scenario,
    config: &OptimizerConfig,
    mut on_progress: F,
) -> Result<Vec<RankedAllocation>>
where
    F: FnMut(usize, usize) + Send,
{
    check_request(build, level_ups)?;
    let allocations = enumerate_allocations(level_ups);
    let total = allocations.len();
    on_progress(0, total);

    let evaluate = |allocation: &Allocation| (*allocation, evaluate_allocation(build, *allocation, scenario));
    let results = if config.parallel {
        let batch_size = total.div_ceil(OPTIMIZE_PROGRESS_BATCH_COUNT).max(1);
        WorkerPool::with_workers(config.workers)
            .install(|| map_in_batches(&allocations, batch_size, evaluate, &mut on_progress))
    } else {
        let results: Vec<_> = allocations.iter().map(evaluate).collect();
        on_progress(total, total);
        results
    };

    let evaluated = collect_candidates(results)?;
    info!(
        character = build.character_id(),
        level_ups,
        candidates = total,
        kept = evaluated.len(),
        "level-up allocations evaluated"
    );

    let mut ranked = rank_allocations(evaluated, &config.weights);
    if config.top > 0 {
        ranked.truncate(config.top);
    }
    Ok(ranked)
}

//! Seeded sampling over the effective face tables.
//!
//! Used to cross-check the exact calculator and to estimate how long a build
//! survives on the insanity track. Iterations are split into batches, each
//! with its own RNG stream, and the batches run through rayon.

use rayon::prelude::*;
use serde::Serialize;

use crate::dice::probability::{
    effective_tables, DicePool, ElderConversion, FaceTable, RollModifiers, WeightedFace,
};
use crate::dice::rng::{stream_seed, Rng};
use crate::error::{EngineError, Result};
use crate::insanity::InsanityTrack;
use crate::parallel::batch_ranges;

/// Upper bound on rolls in one survival run; pools without black dice never die.
pub const MAX_SURVIVAL_ROLLS: u32 = 500;
const SAMPLE_BATCHES: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollOutcome {
    pub successes: u32,
    pub tentacles: u32,
    pub elder_signs: u32,
    pub converted: u32,
}

impl RollOutcome {
    pub fn total_successes(&self) -> u32 {
        self.successes + self.converted
    }
}

fn pick_face<'a>(table: &'a FaceTable, rng: &mut Rng) -> Option<&'a WeightedFace> {
    let total = table.total_probability();
    let mut threshold = rng.next_f64() * total;
    for face in &table.faces {
        if threshold < face.probability {
            return Some(face);
        }
        threshold -= face.probability;
    }
    table.faces.last()
}

fn roll_tables(groups: &[(FaceTable, u32)], conversion: ElderConversion, rng: &mut Rng) -> RollOutcome {
    let mut outcome = RollOutcome::default();
    for (table, count) in groups {
        for _ in 0..*count {
            if let Some(face) = pick_face(table, rng) {
                outcome.successes += face.successes;
                outcome.tentacles += face.tentacles;
                outcome.elder_signs += face.elder_signs;
            }
        }
    }
    outcome.converted = match conversion {
        ElderConversion::None => 0,
        ElderConversion::Capped(cap) => outcome.elder_signs.min(cap),
        ElderConversion::Unlimited => outcome.elder_signs,
    };
    outcome
}

/// One sampled roll of `pool` with the same reroll assignment the exact calculator uses.
pub fn sample_roll(pool: DicePool, modifiers: RollModifiers, rng: &mut Rng) -> RollOutcome {
    roll_tables(&effective_tables(pool, modifiers), modifiers.conversion, rng)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SampledRollStats {
    pub iterations: usize,
    pub mean_successes: f64,
    pub mean_tentacles: f64,
    pub mean_elder_signs: f64,
    pub p_at_least_one_success: f64,
    pub p_at_least_one_tentacle: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct RollTally {
    successes: u64,
    tentacles: u64,
    elder_signs: u64,
    any_success: u64,
    any_tentacle: u64,
}

impl RollTally {
    fn merge(mut self, other: Self) -> Self {
        self.successes += other.successes;
        self.tentacles += other.tentacles;
        self.elder_signs += other.elder_signs;
        self.any_success += other.any_success;
        self.any_tentacle += other.any_tentacle;
        self
    }
}

pub fn estimate_roll(
    pool: DicePool,
    modifiers: RollModifiers,
    iterations: usize,
    seed: u64,
) -> Result<SampledRollStats> {
    if iterations == 0 {
        return Err(EngineError::configuration("monte carlo needs at least one iteration"));
    }
    let groups = effective_tables(pool, modifiers);
    let tally = batch_ranges(iterations, SAMPLE_BATCHES)
        .into_par_iter()
        .enumerate()
        .map(|(batch, (start, end))| {
            let mut rng = Rng::new(stream_seed(seed, batch as u64));
            let mut tally = RollTally::default();
            for _ in start..end {
                let outcome = roll_tables(&groups, modifiers.conversion, &mut rng);
                tally.successes += u64::from(outcome.total_successes());
                tally.tentacles += u64::from(outcome.tentacles);
                tally.elder_signs += u64::from(outcome.elder_signs);
                tally.any_success += u64::from(outcome.total_successes() > 0);
                tally.any_tentacle += u64::from(outcome.tentacles > 0);
            }
            tally
        })
        .reduce(RollTally::default, RollTally::merge);

    let n = iterations as f64;
    Ok(SampledRollStats {
        iterations,
        mean_successes: tally.successes as f64 / n,
        mean_tentacles: tally.tentacles as f64 / n,
        mean_elder_signs: tally.elder_signs as f64 / n,
        p_at_least_one_success: tally.any_success as f64 / n,
        p_at_least_one_tentacle: tally.any_tentacle as f64 / n,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SurvivalSummary {
    pub iterations: usize,
    pub mean_rolls_survived: f64,
    pub mean_swirls_reached: f64,
    /// Share of runs still alive after [`MAX_SURVIVAL_ROLLS`].
    pub survived_cap: f64,
}

/// Rolls `base` repeatedly from `start`, feeding tentacles into the track until it dies.
/// Green dice earned on the track join the pool as they are reached.
pub fn simulate_survival(
    base: DicePool,
    modifiers: RollModifiers,
    start: InsanityTrack,
    iterations: usize,
    seed: u64,
) -> Result<SurvivalSummary> {
    if iterations == 0 {
        return Err(EngineError::configuration("survival simulation needs at least one iteration"));
    }
    if start.is_dead() {
        return Err(EngineError::InvalidTransition {
            position: start.position(),
        });
    }

    let (rolls, swirls, capped) = batch_ranges(iterations, SAMPLE_BATCHES)
        .into_par_iter()
        .enumerate()
        .map(|(batch, (first, end))| -> Result<(u64, u64, u64)> {
            let mut rng = Rng::new(stream_seed(seed, batch as u64));
            let mut totals = (0u64, 0u64, 0u64);
            for _ in first..end {
                let mut track = start;
                let mut rolls = 0u32;
                while !track.is_dead() && rolls < MAX_SURVIVAL_ROLLS {
                    let mut pool = base;
                    pool.green = pool.green.saturating_add(u32::from(track.green_dice_bonus()));
                    let outcome = sample_roll(pool, modifiers, &mut rng);
                    track.apply_tentacles(outcome.tentacles)?;
                    rolls += 1;
                }
                totals.0 += u64::from(rolls);
                totals.1 += u64::from(track.swirls_reached_count());
                totals.2 += u64::from(!track.is_dead());
            }
            Ok(totals)
        })
        .try_reduce(
            || (0, 0, 0),
            |left, right| Ok((left.0 + right.0, left.1 + right.1, left.2 + right.2)),
        )?;

    let n = iterations as f64;
    Ok(SurvivalSummary {
        iterations,
        mean_rolls_survived: rolls as f64 / n,
        mean_swirls_reached: swirls as f64 / n,
        survived_cap: capped as f64 / n,
    })
}

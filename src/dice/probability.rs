//! Per-die and pooled roll statistics derived from the face tables.
//!
//! All "at least one" probabilities enumerate the real faces of each die: a
//! face such as Success+Tentacle is one outcome, never two independent coins.

use serde::{Deserialize, Serialize};

use crate::dice::faces::{DieKind, Symbol};
use crate::error::{EngineError, Result};

/// Threshold above which an enhancement counts as significant (percent).
pub const SIGNIFICANT_IMPROVEMENT_PERCENT: f64 = 10.0;

/// Largest pool the calculator accepts; real boards stay far below it.
pub const MAX_POOL_DICE: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleDieStats {
    pub die: DieKind,
    pub p_success: f64,
    pub p_tentacle: f64,
    pub p_elder: f64,
    pub p_blank: f64,
    pub expected_successes: f64,
}

pub fn die_stats(kind: DieKind) -> SingleDieStats {
    let table = FaceTable::for_die(kind);
    SingleDieStats {
        die: kind,
        p_success: table.p_any(Symbol::Success),
        p_tentacle: table.p_any(Symbol::Tentacle),
        p_elder: table.p_any(Symbol::ElderSign),
        p_blank: table.p_blank(),
        expected_successes: table.expected(Symbol::Success),
    }
}

/// Non-negative black/green dice counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DicePool {
    pub black: u32,
    pub green: u32,
}

impl DicePool {
    pub const fn new(black: u32, green: u32) -> Self {
        Self { black, green }
    }

    /// Builds a pool from untrusted signed counts.
    pub fn from_counts(black: i64, green: i64) -> Result<Self> {
        if black < 0 || green < 0 {
            return Err(EngineError::configuration(format!(
                "dice counts must be non-negative (black={black}, green={green})"
            )));
        }
        let black = u32::try_from(black)
            .map_err(|_| EngineError::configuration(format!("black dice count {black} too large")))?;
        let green = u32::try_from(green)
            .map_err(|_| EngineError::configuration(format!("green dice count {green} too large")))?;
        Self { black, green }.within_limit()
    }

    /// Grows the pool, rejecting overflow and pools above [`MAX_POOL_DICE`].
    pub fn checked_add(self, black: u32, green: u32) -> Result<Self> {
        match (self.black.checked_add(black), self.green.checked_add(green)) {
            (Some(black), Some(green)) => Self { black, green }.within_limit(),
            _ => Err(EngineError::configuration(format!(
                "adding {black} black and {green} green dice to {} black and {} green overflows",
                self.black, self.green
            ))),
        }
    }

    pub fn within_limit(self) -> Result<Self> {
        let total = u64::from(self.black) + u64::from(self.green);
        if total > u64::from(MAX_POOL_DICE) {
            return Err(EngineError::configuration(format!(
                "pool of {total} dice exceeds the limit of {MAX_POOL_DICE}"
            )));
        }
        Ok(self)
    }

    pub const fn total(&self) -> u32 {
        self.black.saturating_add(self.green)
    }

    pub const fn count(&self, kind: DieKind) -> u32 {
        match kind {
            DieKind::Black => self.black,
            DieKind::Green => self.green,
        }
    }
}

/// How many elder signs per roll count as successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElderConversion {
    #[default]
    None,
    Capped(u32),
    Unlimited,
}

impl ElderConversion {
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None | Self::Capped(0))
    }

    /// Stacks two conversions: caps add, unlimited dominates.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unlimited, _) | (_, Self::Unlimited) => Self::Unlimited,
            (Self::None, rhs) => rhs,
            (lhs, Self::None) => lhs,
            (Self::Capped(a), Self::Capped(b)) => Self::Capped(a.saturating_add(b)),
        }
    }
}

/// Transforms applied to the face tables before pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RollModifiers {
    pub conversion: ElderConversion,
    /// Free rerolls; each goes to a different die, worst hit probability first.
    pub rerolls: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedFace {
    pub probability: f64,
    pub successes: u32,
    pub tentacles: u32,
    pub elder_signs: u32,
}

impl WeightedFace {
    fn count(&self, symbol: Symbol) -> u32 {
        match symbol {
            Symbol::Success => self.successes,
            Symbol::Tentacle => self.tentacles,
            Symbol::ElderSign => self.elder_signs,
            Symbol::Blank => u32::from(self.successes + self.tentacles + self.elder_signs == 0),
        }
    }

    fn is_hit(&self, conversion: ElderConversion) -> bool {
        self.successes > 0 || (conversion.is_active() && self.elder_signs > 0)
    }
}

/// Outcome distribution of one die after any transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTable {
    pub die: DieKind,
    pub faces: Vec<WeightedFace>,
}

impl FaceTable {
    pub fn for_die(kind: DieKind) -> Self {
        let probabilities = kind.face_probabilities();
        let faces = kind
            .faces()
            .iter()
            .zip(probabilities)
            .map(|(face, probability)| WeightedFace {
                probability,
                successes: u32::from(face.has(Symbol::Success)),
                tentacles: u32::from(face.has(Symbol::Tentacle)),
                elder_signs: u32::from(face.has(Symbol::ElderSign)),
            })
            .collect();
        Self { die: kind, faces }
    }

    pub fn total_probability(&self) -> f64 {
        self.faces.iter().map(|face| face.probability).sum()
    }

    pub fn expected(&self, symbol: Symbol) -> f64 {
        self.faces
            .iter()
            .map(|face| face.probability * f64::from(face.count(symbol)))
            .sum()
    }

    /// Probability that the rolled face shows `symbol` at least once.
    pub fn p_any(&self, symbol: Symbol) -> f64 {
        self.faces
            .iter()
            .filter(|face| face.count(symbol) > 0)
            .map(|face| face.probability)
            .sum()
    }

    pub fn p_blank(&self) -> f64 {
        self.p_any(Symbol::Blank)
    }

    pub fn p_hit(&self, conversion: ElderConversion) -> f64 {
        self.faces
            .iter()
            .filter(|face| face.is_hit(conversion))
            .map(|face| face.probability)
            .sum()
    }

    /// One free reroll on a miss: hits stay, misses are replaced by a fresh roll.
    /// The hit probability becomes `p + (1 - p) * p`.
    pub fn rerolled(&self, conversion: ElderConversion) -> Self {
        let p_miss = 1.0 - self.p_hit(conversion);
        let mut faces: Vec<WeightedFace> = self
            .faces
            .iter()
            .filter(|face| face.is_hit(conversion))
            .copied()
            .collect();
        faces.extend(self.faces.iter().map(|face| WeightedFace {
            probability: face.probability * p_miss,
            ..*face
        }));
        Self {
            die: self.die,
            faces,
        }
    }

    fn max_count(&self, f: impl Fn(&WeightedFace) -> u32) -> u32 {
        self.faces.iter().map(f).max().unwrap_or(0)
    }

    /// Distribution of the elder-sign count on this die, indexed by count.
    fn elder_distribution(&self) -> Vec<f64> {
        let max = self.max_count(|face| face.elder_signs) as usize;
        let mut dist = vec![0.0; max + 1];
        for face in &self.faces {
            dist[face.elder_signs as usize] += face.probability;
        }
        dist
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedRollStats {
    pub black_dice: u32,
    pub green_dice: u32,
    pub total_dice: u32,
    pub expected_successes: f64,
    pub expected_tentacles: f64,
    pub expected_elder_signs: f64,
    pub elder_signs_converted: f64,
    pub p_at_least_one_success: f64,
    pub p_at_least_one_tentacle: f64,
    pub p_at_least_one_elder: f64,
    pub max_possible_successes: u32,
}

/// Pool statistics with no conversions and no rerolls.
pub fn combined_stats(pool: DicePool) -> CombinedRollStats {
    combined_stats_with(pool, RollModifiers::default())
}

/// Pool statistics after applying conversions to the face tables, then rerolls.
pub fn combined_stats_with(pool: DicePool, modifiers: RollModifiers) -> CombinedRollStats {
    let groups = effective_tables(pool, modifiers);
    let conversion = modifiers.conversion;

    let sum_expected = |symbol: Symbol| -> f64 {
        groups
            .iter()
            .map(|(table, n)| f64::from(*n) * table.expected(symbol))
            .sum()
    };
    let natural_successes = sum_expected(Symbol::Success);
    let expected_elder_signs = sum_expected(Symbol::ElderSign);
    let elder_signs_converted = match conversion {
        ElderConversion::None | ElderConversion::Capped(0) => 0.0,
        ElderConversion::Unlimited => expected_elder_signs,
        ElderConversion::Capped(cap) => expected_capped(&elder_count_distribution(&groups, cap), cap),
    };

    let max_over = |f: fn(&WeightedFace) -> u32| -> u32 {
        groups
            .iter()
            .map(|(table, n)| n.saturating_mul(table.max_count(f)))
            .fold(0, u32::saturating_add)
    };
    let max_natural = max_over(|face| face.successes);
    let max_possible_successes = if conversion.is_active() {
        let max_elder = max_over(|face| face.elder_signs);
        let max_combined = max_over(|face| face.successes + face.elder_signs);
        let converted = match conversion {
            ElderConversion::Capped(cap) => max_elder.min(cap),
            _ => max_elder,
        };
        max_natural.saturating_add(converted).min(max_combined)
    } else {
        max_natural
    };

    CombinedRollStats {
        black_dice: pool.black,
        green_dice: pool.green,
        total_dice: pool.total(),
        expected_successes: natural_successes + elder_signs_converted,
        expected_tentacles: sum_expected(Symbol::Tentacle),
        expected_elder_signs,
        elder_signs_converted,
        p_at_least_one_success: p_at_least_one(&groups, |table| table.p_hit(conversion)),
        p_at_least_one_tentacle: p_at_least_one(&groups, |table| table.p_any(Symbol::Tentacle)),
        p_at_least_one_elder: p_at_least_one(&groups, |table| table.p_any(Symbol::ElderSign)),
        max_possible_successes,
    }
}

/// Face tables for every die in the pool, grouped as (table, multiplicity).
/// Rerolls go to the dice with the lowest hit probability; black first on ties.
pub fn effective_tables(pool: DicePool, modifiers: RollModifiers) -> Vec<(FaceTable, u32)> {
    let conversion = modifiers.conversion;
    let mut kinds: Vec<(DieKind, FaceTable)> = DieKind::ALL
        .into_iter()
        .filter(|kind| pool.count(*kind) > 0)
        .map(|kind| (kind, FaceTable::for_die(kind)))
        .collect();
    kinds.sort_by(|(left_kind, left), (right_kind, right)| {
        left.p_hit(conversion)
            .total_cmp(&right.p_hit(conversion))
            .then_with(|| left_kind.cmp(right_kind))
    });

    let mut remaining_rerolls = modifiers.rerolls;
    let mut groups = Vec::with_capacity(4);
    for (kind, table) in kinds {
        let count = pool.count(kind);
        let rerolled = remaining_rerolls.min(count);
        remaining_rerolls -= rerolled;
        if rerolled > 0 {
            groups.push((table.rerolled(conversion), rerolled));
        }
        if count > rerolled {
            groups.push((table, count - rerolled));
        }
    }
    groups
}

/// `1 - Π(1 - p_i)` over every die in the pool.
fn p_at_least_one(groups: &[(FaceTable, u32)], p_of: impl Fn(&FaceTable) -> f64) -> f64 {
    let p_none: f64 = groups
        .iter()
        .map(|(table, n)| (1.0 - p_of(table)).powf(f64::from(*n)))
        .product();
    1.0 - p_none
}

/// Elder-sign count distribution of the pool. The last index collects every
/// count at or above `cap`, so the work stays proportional to the cap.
fn elder_count_distribution(groups: &[(FaceTable, u32)], cap: u32) -> Vec<f64> {
    let top = usize::try_from(cap).unwrap_or(usize::MAX);
    let mut dist = vec![1.0];
    for (table, n) in groups {
        let die = table.elder_distribution();
        for _ in 0..*n {
            let len = (dist.len() + die.len() - 1).min(top.saturating_add(1));
            let mut next = vec![0.0; len];
            for (i, p) in dist.iter().enumerate() {
                for (j, q) in die.iter().enumerate() {
                    next[(i + j).min(top)] += p * q;
                }
            }
            dist = next;
        }
    }
    dist
}

fn expected_capped(distribution: &[f64], cap: u32) -> f64 {
    distribution
        .iter()
        .enumerate()
        .map(|(count, p)| p * (count as f64).min(f64::from(cap)))
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerImpact {
    pub base: CombinedRollStats,
    pub enhanced: CombinedRollStats,
    pub expected_successes_increase: f64,
    pub expected_successes_percent_increase: f64,
    pub max_successes_increase: i64,
    pub tentacle_risk: f64,
    pub dice_added: i64,
}

impl PowerImpact {
    pub fn is_significant_improvement(&self) -> bool {
        self.expected_successes_percent_increase > SIGNIFICANT_IMPROVEMENT_PERCENT
    }
}

/// Compares two rolls, e.g. a character's base pool against the same pool with one power applied.
pub fn power_impact(base: CombinedRollStats, enhanced: CombinedRollStats) -> PowerImpact {
    let increase = enhanced.expected_successes - base.expected_successes;
    let percent = if base.expected_successes > 0.0 {
        increase / base.expected_successes * 100.0
    } else {
        0.0
    };
    PowerImpact {
        base,
        enhanced,
        expected_successes_increase: increase,
        expected_successes_percent_increase: percent,
        max_successes_increase: i64::from(enhanced.max_possible_successes)
            - i64::from(base.max_possible_successes),
        tentacle_risk: enhanced.expected_tentacles,
        dice_added: i64::from(enhanced.total_dice) - i64::from(base.total_dice),
    }
}

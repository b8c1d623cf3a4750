use serde::Serialize;

use crate::dice::{CombinedRollStats, DicePool};
use crate::powers::{ActiveEffects, DefensiveTotals, HealingTotals, Synergy};

/// Everything a build produces under one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub black_dice: u32,
    pub green_dice: u32,
    pub total_dice: u32,
    pub expected_successes: f64,
    pub expected_tentacles: f64,
    pub expected_elder_signs: f64,
    pub p_at_least_one_success: f64,
    pub p_at_least_one_tentacle: f64,
    pub p_at_least_one_elder: f64,
    pub max_possible_successes: u32,
    pub elder_signs_converted: f64,
    pub rerolls: u32,
    pub free_actions: u32,
    pub healing_totals: HealingTotals,
    pub defensive_reduction_totals: DefensiveTotals,
    pub synergies: Vec<Synergy>,
}

impl Statistics {
    pub fn new(roll: CombinedRollStats, active: &ActiveEffects, synergies: Vec<Synergy>) -> Self {
        Self {
            black_dice: roll.black_dice,
            green_dice: roll.green_dice,
            total_dice: roll.total_dice,
            expected_successes: roll.expected_successes,
            expected_tentacles: roll.expected_tentacles,
            expected_elder_signs: roll.expected_elder_signs,
            p_at_least_one_success: roll.p_at_least_one_success,
            p_at_least_one_tentacle: roll.p_at_least_one_tentacle,
            p_at_least_one_elder: roll.p_at_least_one_elder,
            max_possible_successes: roll.max_possible_successes,
            elder_signs_converted: roll.elder_signs_converted,
            rerolls: active.rerolls,
            free_actions: active.free_actions,
            healing_totals: active.healing,
            defensive_reduction_totals: active.defensive,
            synergies,
        }
    }

    /// One-line description of the roll, as printed alongside a strategy.
    pub fn summary(&self) -> String {
        format!(
            "{} black + {} green = {} dice: expected {:.2} successes, {:.2} tentacles, {:.2} elder signs; max {} successes",
            self.black_dice,
            self.green_dice,
            self.total_dice,
            self.expected_successes,
            self.expected_tentacles,
            self.expected_elder_signs,
            self.max_possible_successes
        )
    }

    pub fn pool(&self) -> DicePool {
        DicePool::new(self.black_dice, self.green_dice)
    }

    pub fn has_healing(&self) -> bool {
        self.healing_totals.wounds > 0 || self.healing_totals.stress > 0
    }

    pub fn has_defense(&self) -> bool {
        self.defensive_reduction_totals.wounds > 0 || self.defensive_reduction_totals.sanity > 0
    }
}

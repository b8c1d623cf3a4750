//! Composition of base dice, insanity bonuses and combined power effects.
//!
//! The pool and statistics are derived on every call and never patched in
//! place; the track is the only state a build owns.

use tracing::debug;

use crate::build::{PowerSlot, Scenario, Statistics};
use crate::data::power::MAX_POWER_LEVEL;
use crate::data::{Catalog, Character};
use crate::dice::{combined_stats_with, CombinedRollStats, DicePool, RollModifiers};
use crate::error::{DataError, EngineError, Result};
use crate::insanity::{InsanityTrack, TransitionResult};
use crate::powers::{EquippedPower, PowerCombination};

/// Every character rolls three black dice before bonuses.
pub const BASE_POOL: DicePool = DicePool::new(3, 0);

/// Derives the pool and statistics for one scenario.
pub fn compute(
    base: DicePool,
    track: &InsanityTrack,
    equipped: &[EquippedPower],
    scenario: &Scenario,
) -> Result<(DicePool, Statistics)> {
    let combination = PowerCombination::combine(equipped)?;
    compute_with(base, track, &combination, scenario)
}

fn compute_with(
    base: DicePool,
    track: &InsanityTrack,
    combination: &PowerCombination,
    scenario: &Scenario,
) -> Result<(DicePool, Statistics)> {
    let active = combination.totals_for(scenario);
    let pool = base.checked_add(
        active.black_dice,
        active
            .green_dice
            .saturating_add(u32::from(track.green_dice_bonus())),
    )?;

    let roll = combined_stats_with(
        pool,
        RollModifiers {
            conversion: active.conversion,
            rerolls: active.rerolls,
        },
    );
    let statistics = Statistics::new(roll, &active, combination.synergies_for(scenario));
    Ok((pool, statistics))
}

/// Statistics for `character` as loaded, at the given track state.
pub fn compute_statistics(
    character: &Character,
    catalog: &Catalog,
    track: &InsanityTrack,
    scenario: &Scenario,
) -> std::result::Result<Statistics, DataError> {
    let build = CharacterBuild::from_character(character, catalog, *track)?;
    Ok(build.statistics(scenario)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterBuild {
    character_id: String,
    base: DicePool,
    track: InsanityTrack,
    powers: [EquippedPower; PowerSlot::COUNT],
}

impl CharacterBuild {
    /// `powers` is indexed by [`PowerSlot::index`]. Level-0 or over-cap equips are rejected.
    pub fn new(
        character_id: impl Into<String>,
        base: DicePool,
        track: InsanityTrack,
        powers: [EquippedPower; PowerSlot::COUNT],
    ) -> Result<Self> {
        for (slot, equipped) in PowerSlot::ALL.iter().zip(&powers) {
            equipped.power.effects_up_to(equipped.level).map_err(|_| {
                EngineError::configuration(format!(
                    "{slot} power '{}' equipped at level {}",
                    equipped.name(),
                    equipped.level
                ))
            })?;
        }
        Ok(Self {
            character_id: character_id.into(),
            base,
            track,
            powers,
        })
    }

    pub fn from_character(
        character: &Character,
        catalog: &Catalog,
        track: InsanityTrack,
    ) -> std::result::Result<Self, DataError> {
        let [first, second] = &character.common_powers;
        let powers = [
            EquippedPower::new(catalog.power(&character.special_power.name)?, character.special_power.level),
            EquippedPower::new(catalog.power(&first.name)?, first.level),
            EquippedPower::new(catalog.power(&second.name)?, second.level),
        ];
        Ok(Self::new(character.id.clone(), BASE_POOL, track, powers)?)
    }

    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    pub fn track(&self) -> &InsanityTrack {
        &self.track
    }

    pub fn equipped(&self) -> &[EquippedPower] {
        &self.powers
    }

    pub fn power(&self, slot: PowerSlot) -> &EquippedPower {
        &self.powers[slot.index()]
    }

    pub fn level(&self, slot: PowerSlot) -> u8 {
        self.powers[slot.index()].level
    }

    pub fn apply_tentacles(&mut self, tentacles: u32) -> Result<TransitionResult> {
        self.track.apply_tentacles(tentacles)
    }

    /// Spends one pending level-up on `slot`. The track is untouched when the slot is maxed.
    pub fn level_up(&mut self, slot: PowerSlot) -> Result<()> {
        let current = self.level(slot);
        if current >= MAX_POWER_LEVEL {
            return Err(EngineError::configuration(format!(
                "{slot} power '{}' is already at level {MAX_POWER_LEVEL}",
                self.power(slot).name()
            )));
        }
        self.track.spend_level_up(slot)?;
        self.powers[slot.index()].level = current + 1;
        debug!(character = %self.character_id, %slot, level = current + 1, "power levelled up");
        Ok(())
    }

    /// A hypothetical copy with `slot` at `level`; the track is not consulted.
    pub fn with_slot_level(&self, slot: PowerSlot, level: u8) -> Result<Self> {
        let mut powers = self.powers.clone();
        powers[slot.index()].level = level;
        Self::new(self.character_id.clone(), self.base, self.track, powers)
    }

    pub fn combination(&self) -> Result<PowerCombination> {
        PowerCombination::combine(&self.powers)
    }

    pub fn compute(&self, scenario: &Scenario) -> Result<(DicePool, Statistics)> {
        compute(self.base, &self.track, &self.powers, scenario)
    }

    pub fn statistics(&self, scenario: &Scenario) -> Result<Statistics> {
        self.compute(scenario).map(|(_, statistics)| statistics)
    }

    /// Pool and modifiers from powers alone; the track's green bonus is left
    /// for the caller so a simulation can grow it roll by roll.
    pub fn roll_setup(&self, scenario: &Scenario) -> Result<(DicePool, RollModifiers)> {
        let active = self.combination()?.totals_for(scenario);
        let pool = self.base.checked_add(active.black_dice, active.green_dice)?;
        Ok((
            pool,
            RollModifiers {
                conversion: active.conversion,
                rerolls: active.rerolls,
            },
        ))
    }

    /// Roll statistics alone, track bonus included.
    pub fn roll_stats(&self, scenario: &Scenario) -> Result<CombinedRollStats> {
        let (pool, modifiers) = self.roll_setup(scenario)?;
        let pool = pool.checked_add(0, u32::from(self.track.green_dice_bonus()))?;
        Ok(combined_stats_with(pool, modifiers))
    }

    /// Statistics for several scenarios sharing one combination pass.
    pub fn statistics_for_each(&self, scenarios: &[Scenario]) -> Result<Vec<Statistics>> {
        let combination = self.combination()?;
        scenarios
            .iter()
            .map(|scenario| {
                compute_with(self.base, &self.track, &combination, scenario).map(|(_, statistics)| statistics)
            })
            .collect()
    }
}

//! Play-style analysis and upgrade recommendations for one build.

use serde::Serialize;
use tracing::debug;

use crate::build::{CharacterBuild, PowerSlot, Scenario, Statistics};
use crate::data::power::MAX_POWER_LEVEL;
use crate::dice::{power_impact, PowerImpact};
use crate::error::Result;

const OFFENSIVE_SUCCESSES: f64 = 2.5;
const OFFENSIVE_MAX_TENTACLES: f64 = 1.0;
const STRONG_SUCCESSES: f64 = 2.0;
const WEAK_SUCCESSES: f64 = 1.5;
const HIGH_TENTACLES: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Playstyle {
    Offensive,
    Defensive,
    Balanced,
    Utility,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeRecommendation {
    pub slot: PowerSlot,
    pub power_name: String,
    pub current_level: u8,
    pub recommended_level: u8,
    pub expected_successes_gain: f64,
    /// 1..=10, 10 highest.
    pub priority: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayStrategy {
    pub character_id: String,
    pub playstyle: Playstyle,
    pub summary: String,
    pub primary_strength: Option<String>,
    pub primary_weakness: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommended_upgrades: Vec<UpgradeRecommendation>,
    /// Power names in the order upgrades should be taken.
    pub upgrade_path: Vec<String>,
}

/// What one more level in a slot does to the roll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelUpImpact {
    pub slot: PowerSlot,
    pub power_name: String,
    pub from_level: u8,
    pub to_level: u8,
    pub significant: bool,
    pub impact: PowerImpact,
}

pub fn playstyle(stats: &Statistics) -> Playstyle {
    if stats.expected_successes > OFFENSIVE_SUCCESSES && stats.expected_tentacles < OFFENSIVE_MAX_TENTACLES {
        Playstyle::Offensive
    } else if stats.has_healing() {
        Playstyle::Defensive
    } else if stats.rerolls > 0 {
        Playstyle::Utility
    } else {
        Playstyle::Balanced
    }
}

pub fn strengths(stats: &Statistics) -> Vec<String> {
    let checks = [
        (stats.expected_successes > STRONG_SUCCESSES, "High success rate"),
        (stats.expected_tentacles < OFFENSIVE_MAX_TENTACLES, "Low tentacle risk"),
        (stats.green_dice > 0, "Green dice bonuses (safer rolls)"),
        (stats.healing_totals.wounds > 0, "Wound healing"),
        (stats.healing_totals.stress > 0, "Stress healing"),
        (stats.rerolls > 0, "Reroll capabilities"),
        (stats.elder_signs_converted > 0.0, "Elder sign conversion"),
        (stats.has_defense(), "Damage reduction"),
    ];
    collect(&checks)
}

pub fn weaknesses(stats: &Statistics) -> Vec<String> {
    let checks = [
        (stats.expected_successes < WEAK_SUCCESSES, "Low success rate"),
        (stats.expected_tentacles > HIGH_TENTACLES, "High tentacle risk"),
        (stats.green_dice == 0, "No green dice (higher tentacle risk)"),
        (!stats.has_healing(), "No healing capabilities"),
        (stats.rerolls == 0, "No reroll capabilities"),
    ];
    collect(&checks)
}

fn collect(checks: &[(bool, &str)]) -> Vec<String> {
    checks
        .iter()
        .filter(|(applies, _)| *applies)
        .map(|(_, label)| label.to_string())
        .collect()
}

fn recommend(build: &CharacterBuild, slot: PowerSlot, scenario: &Scenario, current: &Statistics) -> Result<Option<UpgradeRecommendation>> {
    let level = build.level(slot);
    if level >= MAX_POWER_LEVEL {
        return Ok(None);
    }
    let next = build.with_slot_level(slot, level + 1)?.statistics(scenario)?;

    let success_gain = next.expected_successes - current.expected_successes;
    let healing_gain = f64::from(
        (next.healing_totals.wounds.saturating_add(next.healing_totals.stress)).saturating_sub(
            current.healing_totals.wounds.saturating_add(current.healing_totals.stress),
        ),
    );
    let defense_gain = f64::from(
        (next.defensive_reduction_totals.wounds.saturating_add(next.defensive_reduction_totals.sanity))
            .saturating_sub(
                current.defensive_reduction_totals.wounds.saturating_add(current.defensive_reduction_totals.sanity),
            ),
    );
    let reroll_gain = f64::from(next.rerolls.saturating_sub(current.rerolls));
    let action_gain = f64::from(next.free_actions.saturating_sub(current.free_actions));

    let gain = success_gain + 0.5 * (healing_gain + defense_gain + reroll_gain + action_gain);
    if gain <= 0.0 {
        return Ok(None);
    }

    let reason = [
        (success_gain, "more expected successes"),
        (0.5 * healing_gain, "more healing"),
        (0.5 * defense_gain, "more damage reduction"),
        (0.5 * reroll_gain, "extra rerolls"),
        (0.5 * action_gain, "extra actions"),
    ]
    .into_iter()
    .max_by(|left, right| left.0.total_cmp(&right.0))
    .map_or("improves the build", |(_, label)| label);

    Ok(Some(UpgradeRecommendation {
        slot,
        power_name: build.power(slot).name().to_string(),
        current_level: level,
        recommended_level: level + 1,
        expected_successes_gain: success_gain,
        priority: (1.0 + gain * 6.0).round().clamp(1.0, 10.0) as u8,
        reason: reason.to_string(),
    }))
}

pub fn analyze(build: &CharacterBuild, scenario: &Scenario) -> Result<PlayStrategy> {
    let stats = build.statistics(scenario)?;
    let mut recommended_upgrades = Vec::new();
    for slot in PowerSlot::ALL {
        if let Some(recommendation) = recommend(build, slot, scenario, &stats)? {
            recommended_upgrades.push(recommendation);
        }
    }
    recommended_upgrades.sort_by(|left, right| {
        right
            .priority
            .cmp(&left.priority)
            .then_with(|| right.expected_successes_gain.total_cmp(&left.expected_successes_gain))
            .then_with(|| left.slot.cmp(&right.slot))
    });
    let upgrade_path = recommended_upgrades
        .iter()
        .map(|upgrade| upgrade.power_name.clone())
        .collect();

    let strengths = strengths(&stats);
    let weaknesses = weaknesses(&stats);
    Ok(PlayStrategy {
        character_id: build.character_id().to_string(),
        playstyle: playstyle(&stats),
        summary: stats.summary(),
        primary_strength: strengths.first().cloned(),
        primary_weakness: weaknesses.first().cloned(),
        strengths,
        weaknesses,
        recommended_upgrades,
        upgrade_path,
    })
}

/// Roll impact of raising each slot by one level. Maxed slots and levels
/// whose effects cannot combine are left out.
pub fn level_up_impacts(build: &CharacterBuild, scenario: &Scenario) -> Result<Vec<LevelUpImpact>> {
    let base = build.roll_stats(scenario)?;
    let mut impacts = Vec::new();
    for slot in PowerSlot::ALL {
        let level = build.level(slot);
        if level >= MAX_POWER_LEVEL {
            continue;
        }
        let enhanced = match build
            .with_slot_level(slot, level + 1)
            .and_then(|next| next.roll_stats(scenario))
        {
            Ok(enhanced) => enhanced,
            Err(err) if err.is_candidate_rejection() => {
                debug!(%slot, level = level + 1, error = %err, "level-up impact skipped");
                continue;
            }
            Err(err) => return Err(err),
        };
        let impact = power_impact(base, enhanced);
        impacts.push(LevelUpImpact {
            slot,
            power_name: build.power(slot).name().to_string(),
            from_level: level,
            to_level: level + 1,
            significant: impact.is_significant_improvement(),
            impact,
        });
    }
    Ok(impacts)
}

//! Reduces a character's equipped powers into one [`PowerCombination`].
//!
//! Effects are bucketed by (category, scope). Inside one power, the
//! highest-level override in a bucket supersedes that power's lower-level
//! effects there. Overrides surviving from two different powers in the same
//! bucket are a conflict; everything else sums component-wise.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::build::Scenario;
use crate::data::Power;
use crate::dice::ElderConversion;
use crate::error::{EngineError, Result};
use crate::powers::effect::{EffectCategory, EffectKind, PowerEffect, Scope};
use crate::powers::synergy::{detect_synergies, Synergy};

/// A power pinned to a level. The power data is shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct EquippedPower {
    pub power: Arc<Power>,
    pub level: u8,
}

impl EquippedPower {
    pub fn new(power: Arc<Power>, level: u8) -> Self {
        Self { power, level }
    }

    pub fn name(&self) -> &str {
        self.power.name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub category: EffectCategory,
    pub scope: Scope,
}

/// Combined quantity of one (category, scope) bucket and the powers feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBucket {
    pub category: EffectCategory,
    pub scope: Scope,
    pub total: EffectKind,
    pub sources: Vec<String>,
    /// Power whose override survived in this bucket, if any.
    pub overridden_by: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealingTotals {
    pub wounds: u32,
    pub stress: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DefensiveTotals {
    pub wounds: u32,
    pub sanity: u32,
}

/// Every bucket active under one scenario, collapsed per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActiveEffects {
    pub black_dice: u32,
    pub green_dice: u32,
    pub rerolls: u32,
    pub healing: HealingTotals,
    pub defensive: DefensiveTotals,
    #[serde(skip)]
    pub conversion: ElderConversion,
    pub free_actions: u32,
}

impl ActiveEffects {
    /// Buckets are already bounded per power; totals across scopes saturate and
    /// the pool limit rejects anything that large.
    fn absorb(&mut self, kind: &EffectKind) {
        match *kind {
            EffectKind::DiceAddition { black, green } => {
                self.black_dice = self.black_dice.saturating_add(black);
                self.green_dice = self.green_dice.saturating_add(green);
            }
            EffectKind::Reroll { dice } => self.rerolls = self.rerolls.saturating_add(dice),
            EffectKind::Healing { wounds, stress } => {
                self.healing.wounds = self.healing.wounds.saturating_add(wounds);
                self.healing.stress = self.healing.stress.saturating_add(stress);
            }
            EffectKind::DefensiveReduction { wounds, sanity } => {
                self.defensive.wounds = self.defensive.wounds.saturating_add(wounds);
                self.defensive.sanity = self.defensive.sanity.saturating_add(sanity);
            }
            EffectKind::SymbolConversion { .. } => {
                self.conversion = self.conversion.combine(kind.elder_conversion());
            }
            EffectKind::ActionGrant { actions } => {
                self.free_actions = self.free_actions.saturating_add(actions)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerCombination {
    /// Sorted by (category, scope).
    buckets: Vec<ResolvedBucket>,
    synergies: Vec<Synergy>,
}

/// What one power leaves in one bucket after its own override resolution.
struct PowerBucket<'a> {
    effects: Vec<&'a PowerEffect>,
    overrides: bool,
}

/// Drops this power's effects superseded by its highest-level override.
fn resolve_power_bucket<'a>(
    power: &str,
    key: &BucketKey,
    effects: Vec<(u8, &'a PowerEffect)>,
) -> Result<PowerBucket<'a>> {
    let top_override = effects
        .iter()
        .filter(|(_, effect)| effect.is_override())
        .map(|(level, _)| *level)
        .max();

    let Some(top_level) = top_override else {
        return Ok(PowerBucket {
            effects: effects.into_iter().map(|(_, effect)| effect).collect(),
            overrides: false,
        });
    };

    let overrides_at_top = effects
        .iter()
        .filter(|(level, effect)| *level == top_level && effect.is_override())
        .count();
    if overrides_at_top > 1 {
        return Err(EngineError::configuration(format!(
            "power '{power}' has {overrides_at_top} overrides for {} ({}) at level {top_level}",
            key.category, key.scope
        )));
    }

    let before = effects.len();
    let kept: Vec<&PowerEffect> = effects
        .into_iter()
        .filter(|(level, _)| *level >= top_level)
        .map(|(_, effect)| effect)
        .collect();
    if kept.len() < before {
        debug!(
            power,
            category = %key.category,
            scope = %key.scope,
            level = top_level,
            superseded = before - kept.len(),
            "override supersedes lower levels"
        );
    }
    Ok(PowerBucket {
        effects: kept,
        overrides: true,
    })
}

impl PowerCombination {
    pub fn combine(equipped: &[EquippedPower]) -> Result<Self> {
        let mut buckets: BTreeMap<BucketKey, ResolvedBucket> = BTreeMap::new();

        for entry in equipped {
            let mut by_bucket: BTreeMap<BucketKey, Vec<(u8, &PowerEffect)>> = BTreeMap::new();
            for (level, effect) in entry.power.effects_up_to(entry.level)? {
                let key = BucketKey {
                    category: effect.category(),
                    scope: effect.scope().clone(),
                };
                by_bucket.entry(key).or_default().push((level, effect));
            }

            for (key, effects) in by_bucket {
                let resolved = resolve_power_bucket(entry.name(), &key, effects)?;
                merge_into(&mut buckets, key, entry.name(), resolved)?;
            }
        }

        let buckets: Vec<ResolvedBucket> = buckets.into_values().collect();
        let synergies = detect_synergies(buckets.iter());
        Ok(Self { buckets, synergies })
    }

    pub fn buckets(&self) -> &[ResolvedBucket] {
        &self.buckets
    }

    pub fn bucket(&self, category: EffectCategory, scope: &Scope) -> Option<&ResolvedBucket> {
        self.buckets
            .iter()
            .find(|bucket| bucket.category == category && &bucket.scope == scope)
    }

    /// Synergies across every bucket, regardless of scope.
    pub fn synergies(&self) -> &[Synergy] {
        &self.synergies
    }

    pub fn active_buckets<'a>(&'a self, scenario: &'a Scenario) -> impl Iterator<Item = &'a ResolvedBucket> {
        self.buckets
            .iter()
            .filter(move |bucket| bucket.scope.is_active(scenario))
    }

    /// Collapses every bucket whose scope is active under `scenario`.
    pub fn totals_for(&self, scenario: &Scenario) -> ActiveEffects {
        let mut totals = ActiveEffects::default();
        for bucket in self.active_buckets(scenario) {
            totals.absorb(&bucket.total);
        }
        totals
    }

    pub fn synergies_for(&self, scenario: &Scenario) -> Vec<Synergy> {
        detect_synergies(self.active_buckets(scenario))
    }
}

fn merge_into(
    buckets: &mut BTreeMap<BucketKey, ResolvedBucket>,
    key: BucketKey,
    power: &str,
    resolved: PowerBucket<'_>,
) -> Result<()> {
    let Some((first, rest)) = resolved.effects.split_first() else {
        return Ok(());
    };
    let mut contribution = *first.kind();
    for effect in rest {
        contribution.accumulate(effect.kind())?;
    }

    match buckets.get_mut(&key) {
        None => {
            buckets.insert(
                key.clone(),
                ResolvedBucket {
                    category: key.category,
                    scope: key.scope,
                    total: contribution,
                    sources: vec![power.to_string()],
                    overridden_by: resolved.overrides.then(|| power.to_string()),
                },
            );
        }
        Some(bucket) => {
            if resolved.overrides {
                if let Some(first) = &bucket.overridden_by {
                    return Err(EngineError::Conflict {
                        category: key.category.to_string(),
                        scope: key.scope.to_string(),
                        first: first.clone(),
                        second: power.to_string(),
                    });
                }
                bucket.overridden_by = Some(power.to_string());
            }
            bucket.total.accumulate(&contribution)?;
            if !bucket.sources.iter().any(|source| source == power) {
                bucket.sources.push(power.to_string());
            }
        }
    }
    Ok(())
}

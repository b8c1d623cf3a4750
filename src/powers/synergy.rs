//! Informational synergy detection. Synergies never change numeric output.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::powers::combinator::ResolvedBucket;
use crate::powers::effect::EffectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyKind {
    /// Green dice raise the elder-sign supply a conversion consumes.
    ConversionWithGreenDice,
    /// Rerolled misses can land on elder signs that then convert.
    ConversionWithRerolls,
    /// Sanity reduction offsets the tentacles extra black dice bring.
    SanityReductionWithBlackDice,
}

impl SynergyKind {
    pub const fn description(self) -> &'static str {
        match self {
            Self::ConversionWithGreenDice => {
                "elder sign conversion benefits from extra green dice"
            }
            Self::ConversionWithRerolls => "rerolls feed more elder signs into conversion",
            Self::SanityReductionWithBlackDice => {
                "sanity reduction absorbs tentacles from extra black dice"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synergy {
    pub kind: SynergyKind,
    pub powers: Vec<String>,
    pub description: String,
}

fn producers<'a>(
    buckets: &[&'a ResolvedBucket],
    matches: impl Fn(&EffectKind) -> bool,
) -> Vec<&'a ResolvedBucket> {
    buckets
        .iter()
        .copied()
        .filter(|bucket| matches(&bucket.total))
        .collect()
}

fn pair(
    kind: SynergyKind,
    left: &[&ResolvedBucket],
    right: &[&ResolvedBucket],
    out: &mut Vec<Synergy>,
) {
    if left.is_empty() || right.is_empty() {
        return;
    }
    let powers: BTreeSet<&str> = left
        .iter()
        .chain(right)
        .flat_map(|bucket| bucket.sources.iter().map(String::as_str))
        .collect();
    debug!(?kind, ?powers, "synergy detected");
    out.push(Synergy {
        kind,
        powers: powers.into_iter().map(str::to_string).collect(),
        description: kind.description().to_string(),
    });
}

pub fn detect_synergies<'a>(buckets: impl IntoIterator<Item = &'a ResolvedBucket>) -> Vec<Synergy> {
    let buckets: Vec<&ResolvedBucket> = buckets.into_iter().collect();
    let conversions = producers(&buckets, |kind| matches!(kind, EffectKind::SymbolConversion { .. }));
    let green = producers(&buckets, |kind| {
        matches!(kind, EffectKind::DiceAddition { green, .. } if *green > 0)
    });
    let black = producers(&buckets, |kind| {
        matches!(kind, EffectKind::DiceAddition { black, .. } if *black > 0)
    });
    let rerolls = producers(&buckets, |kind| {
        matches!(kind, EffectKind::Reroll { dice } if *dice > 0)
    });
    let sanity = producers(&buckets, |kind| {
        matches!(kind, EffectKind::DefensiveReduction { sanity, .. } if *sanity > 0)
    });

    let mut synergies = Vec::new();
    pair(SynergyKind::ConversionWithGreenDice, &conversions, &green, &mut synergies);
    pair(SynergyKind::ConversionWithRerolls, &conversions, &rerolls, &mut synergies);
    pair(SynergyKind::SanityReductionWithBlackDice, &sanity, &black, &mut synergies);
    synergies
}

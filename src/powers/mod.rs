pub mod combinator;
pub mod effect;
pub mod synergy;

pub use combinator::{
    ActiveEffects, DefensiveTotals, EquippedPower, HealingTotals, PowerCombination, ResolvedBucket,
};
pub use effect::{
    normalize_key, EffectCategory, EffectKind, PowerEffect, Scope, Stacking, MAX_EFFECT_QUANTITY,
};
pub use synergy::{detect_synergies, Synergy, SynergyKind};

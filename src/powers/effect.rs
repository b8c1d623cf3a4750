//! Structured power effects: a closed set of categories, each carrying a scope
//! and a stacking class.

use std::fmt;

use serde::Serialize;

use crate::build::Scenario;
use crate::dice::{ElderConversion, Symbol};
use crate::error::{EngineError, Result};

/// Largest quantity a single effect may carry (dice, rerolls, wounds, actions).
pub const MAX_EFFECT_QUANTITY: u32 = 100;

/// Sums two quantities of `category`, rejecting overflow.
fn stack_quantity(total: &mut u32, more: u32, category: EffectCategory) -> Result<()> {
    let current = *total;
    *total = current.checked_add(more).ok_or_else(|| {
        EngineError::configuration(format!("{category} total overflows ({current} + {more})"))
    })?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    DiceAddition,
    Reroll,
    Healing,
    DefensiveReduction,
    SymbolConversion,
    ActionGrant,
}

impl EffectCategory {
    pub const ALL: [EffectCategory; 6] = [
        Self::DiceAddition,
        Self::Reroll,
        Self::Healing,
        Self::DefensiveReduction,
        Self::SymbolConversion,
        Self::ActionGrant,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiceAddition => "dice_addition",
            Self::Reroll => "reroll",
            Self::Healing => "healing",
            Self::DefensiveReduction => "defensive_reduction",
            Self::SymbolConversion => "symbol_conversion",
            Self::ActionGrant => "action_grant",
        }
    }

    /// Parses an external category tag. Unknown tags fail loudly.
    pub fn parse(tag: &str) -> Result<Self> {
        let normalized = normalize_key(tag);
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| EngineError::UnrecognizedEffect(format!("effect category '{tag}'")))
    }
}

impl fmt::Display for EffectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantities of one effect. `SymbolConversion.limit == None` converts every symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    DiceAddition { black: u32, green: u32 },
    Reroll { dice: u32 },
    Healing { wounds: u32, stress: u32 },
    DefensiveReduction { wounds: u32, sanity: u32 },
    SymbolConversion { from: Symbol, to: Symbol, limit: Option<u32> },
    ActionGrant { actions: u32 },
}

impl EffectKind {
    pub const fn category(&self) -> EffectCategory {
        match self {
            Self::DiceAddition { .. } => EffectCategory::DiceAddition,
            Self::Reroll { .. } => EffectCategory::Reroll,
            Self::Healing { .. } => EffectCategory::Healing,
            Self::DefensiveReduction { .. } => EffectCategory::DefensiveReduction,
            Self::SymbolConversion { .. } => EffectCategory::SymbolConversion,
            Self::ActionGrant { .. } => EffectCategory::ActionGrant,
        }
    }

    /// Largest count carried by this effect; an unlimited conversion counts as zero.
    pub fn largest_quantity(&self) -> u32 {
        match *self {
            Self::DiceAddition { black, green } => black.max(green),
            Self::Reroll { dice } => dice,
            Self::Healing { wounds, stress } => wounds.max(stress),
            Self::DefensiveReduction { wounds, sanity } => wounds.max(sanity),
            Self::SymbolConversion { limit, .. } => limit.unwrap_or(0),
            Self::ActionGrant { actions } => actions,
        }
    }

    /// Adds `other` into `self` component-wise. Both must share a category.
    pub fn accumulate(&mut self, other: &EffectKind) -> Result<()> {
        let category = self.category();
        match (self, other) {
            (
                Self::DiceAddition { black, green },
                Self::DiceAddition {
                    black: more_black,
                    green: more_green,
                },
            ) => {
                stack_quantity(black, *more_black, category)?;
                stack_quantity(green, *more_green, category)?;
            }
            (Self::Reroll { dice }, Self::Reroll { dice: more }) => stack_quantity(dice, *more, category)?,
            (
                Self::Healing { wounds, stress },
                Self::Healing {
                    wounds: more_wounds,
                    stress: more_stress,
                },
            ) => {
                stack_quantity(wounds, *more_wounds, category)?;
                stack_quantity(stress, *more_stress, category)?;
            }
            (
                Self::DefensiveReduction { wounds, sanity },
                Self::DefensiveReduction {
                    wounds: more_wounds,
                    sanity: more_sanity,
                },
            ) => {
                stack_quantity(wounds, *more_wounds, category)?;
                stack_quantity(sanity, *more_sanity, category)?;
            }
            (
                Self::SymbolConversion { limit, .. },
                Self::SymbolConversion {
                    limit: more_limit, ..
                },
            ) => {
                *limit = match (*limit, *more_limit) {
                    (Some(a), Some(b)) => Some(a.saturating_add(b)),
                    _ => None,
                };
            }
            (Self::ActionGrant { actions }, Self::ActionGrant { actions: more }) => {
                stack_quantity(actions, *more, category)?
            }
            (lhs, rhs) => {
                return Err(EngineError::configuration(format!(
                    "cannot stack {} onto {}",
                    rhs.category(),
                    lhs.category()
                )))
            }
        }
        Ok(())
    }

    /// Elder-sign conversion carried by this effect, if any.
    pub fn elder_conversion(&self) -> ElderConversion {
        match self {
            Self::SymbolConversion {
                limit: Some(limit), ..
            } => ElderConversion::Capped(*limit),
            Self::SymbolConversion { limit: None, .. } => ElderConversion::Unlimited,
            _ => ElderConversion::None,
        }
    }
}

/// Lower-cases and collapses separators so "When attacking" and "attacking" match.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.extend(ch.to_lowercase());
    }
    match out.strip_prefix("when_") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => out,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Unconditional,
    When(String),
}

impl Scope {
    /// Conditional scope; blank conditions collapse to [`Scope::Unconditional`].
    pub fn when(condition: &str) -> Self {
        let key = normalize_key(condition);
        if key.is_empty() {
            Self::Unconditional
        } else {
            Self::When(key)
        }
    }

    pub fn is_active(&self, scenario: &Scenario) -> bool {
        match self {
            Self::Unconditional => true,
            Self::When(condition) => scenario.has(condition),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconditional => f.write_str("unconditional"),
            Self::When(condition) => write!(f, "when {condition}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    Additive,
    /// "Instead": supersedes this power's lower-level effects in the same bucket.
    Override,
}

/// One validated effect of one power level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerEffect {
    kind: EffectKind,
    scope: Scope,
    stacking: Stacking,
}

impl PowerEffect {
    pub fn new(kind: EffectKind, scope: Scope, stacking: Stacking) -> Result<Self> {
        if let EffectKind::SymbolConversion { from, to, limit } = kind {
            if (from, to) != (Symbol::ElderSign, Symbol::Success) {
                return Err(EngineError::UnrecognizedEffect(format!(
                    "symbol conversion {} -> {}",
                    from.as_str(),
                    to.as_str()
                )));
            }
            if limit == Some(0) {
                return Err(EngineError::configuration(
                    "symbol conversion limit must be at least 1",
                ));
            }
        }
        let largest = kind.largest_quantity();
        if largest > MAX_EFFECT_QUANTITY {
            return Err(EngineError::configuration(format!(
                "{} quantity {largest} exceeds {MAX_EFFECT_QUANTITY}",
                kind.category()
            )));
        }
        Ok(Self {
            kind,
            scope,
            stacking,
        })
    }

    /// Unconditional additive effect.
    pub fn additive(kind: EffectKind) -> Result<Self> {
        Self::new(kind, Scope::Unconditional, Stacking::Additive)
    }

    /// Unconditional "instead" effect.
    pub fn overriding(kind: EffectKind) -> Result<Self> {
        Self::new(kind, Scope::Unconditional, Stacking::Override)
    }

    pub fn when(mut self, condition: &str) -> Self {
        self.scope = Scope::when(condition);
        self
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn category(&self) -> EffectCategory {
        self.kind.category()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    pub fn is_override(&self) -> bool {
        self.stacking == Stacking::Override
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_keys_normalize() {
        assert_eq!(normalize_key("  When   Attacking "), "attacking");
        assert_eq!(normalize_key("when-in_darkness"), "in_darkness");
        assert_eq!(normalize_key("attacking"), "attacking");
        assert_eq!(normalize_key("when"), "when");
        assert_eq!(Scope::when("   "), Scope::Unconditional);
        assert_eq!(Scope::when("When attacking"), Scope::when("attacking"));
    }

    #[test]
    fn only_elder_to_success_conversion_is_modelled() {
        let bad = PowerEffect::additive(EffectKind::SymbolConversion {
            from: Symbol::Tentacle,
            to: Symbol::Success,
            limit: None,
        });
        assert!(matches!(bad, Err(EngineError::UnrecognizedEffect(_))));

        let zero = PowerEffect::additive(EffectKind::SymbolConversion {
            from: Symbol::ElderSign,
            to: Symbol::Success,
            limit: Some(0),
        });
        assert!(matches!(zero, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn oversized_quantities_are_rejected() {
        let huge = PowerEffect::additive(EffectKind::DiceAddition {
            black: 0,
            green: u32::MAX,
        });
        assert!(matches!(huge, Err(EngineError::Configuration(_))));
        assert!(PowerEffect::additive(EffectKind::Reroll {
            dice: MAX_EFFECT_QUANTITY
        })
        .is_ok());
    }

    #[test]
    fn stacking_past_u32_is_a_configuration_error() {
        let mut actions = EffectKind::ActionGrant { actions: u32::MAX };
        assert!(matches!(
            actions.accumulate(&EffectKind::ActionGrant { actions: 1 }),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_category_tag_is_rejected() {
        assert_eq!(
            EffectCategory::parse("Dice Addition").unwrap(),
            EffectCategory::DiceAddition
        );
        assert!(matches!(
            EffectCategory::parse("teleport"),
            Err(EngineError::UnrecognizedEffect(_))
        ));
    }

    #[test]
    fn conversion_limits_add_and_unlimited_dominates() {
        let mut capped = EffectKind::SymbolConversion {
            from: Symbol::ElderSign,
            to: Symbol::Success,
            limit: Some(1),
        };
        capped
            .accumulate(&EffectKind::SymbolConversion {
                from: Symbol::ElderSign,
                to: Symbol::Success,
                limit: Some(2),
            })
            .unwrap();
        assert_eq!(capped.elder_conversion(), ElderConversion::Capped(3));
        capped
            .accumulate(&EffectKind::SymbolConversion {
                from: Symbol::ElderSign,
                to: Symbol::Success,
                limit: None,
            })
            .unwrap();
        assert_eq!(capped.elder_conversion(), ElderConversion::Unlimited);
    }

    #[test]
    fn mismatched_categories_do_not_stack() {
        let mut dice = EffectKind::DiceAddition { black: 1, green: 0 };
        assert!(dice.accumulate(&EffectKind::Reroll { dice: 1 }).is_err());
    }
}

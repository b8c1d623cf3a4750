use std::sync::Arc;

use dmd_stats::build::{compute, Scenario, BASE_POOL};
use dmd_stats::data::{Power, PowerKind, PowerLevel};
use dmd_stats::dice::{DicePool, ElderConversion, Symbol};
use dmd_stats::insanity::InsanityTrack;
use dmd_stats::powers::{
    EffectCategory, EffectKind, EquippedPower, PowerCombination, PowerEffect, Scope, SynergyKind,
};
use dmd_stats::EngineError;

fn green(n: u32) -> EffectKind {
    EffectKind::DiceAddition { black: 0, green: n }
}

fn power(name: &str, levels: Vec<(u8, Vec<PowerEffect>)>) -> Arc<Power> {
    let levels = levels
        .into_iter()
        .map(|(level, effects)| PowerLevel {
            level,
            description: String::new(),
            effects,
        })
        .collect();
    Arc::new(Power::new(name, PowerKind::Common, levels).unwrap())
}

fn equip(power: &Arc<Power>, level: u8) -> EquippedPower {
    EquippedPower::new(Arc::clone(power), level)
}

fn additive(kind: EffectKind) -> PowerEffect {
    PowerEffect::additive(kind).unwrap()
}

fn instead(kind: EffectKind) -> PowerEffect {
    PowerEffect::overriding(kind).unwrap()
}

#[test]
fn unconditional_additions_sum_across_powers() {
    let first = power("First", vec![(1, vec![additive(green(1))])]);
    let second = power("Second", vec![(1, vec![additive(green(1))])]);
    let (pool, _) = compute(
        BASE_POOL,
        &InsanityTrack::new(),
        &[equip(&first, 1), equip(&second, 1)],
        &Scenario::unconditional(),
    )
    .unwrap();
    assert_eq!(pool, DicePool::new(BASE_POOL.black, BASE_POOL.green + 2));
}

#[test]
fn instead_replaces_the_same_powers_lower_level() {
    let growing = power(
        "Growing",
        vec![(1, vec![additive(green(1))]), (2, vec![instead(green(2))])],
    );
    let at_two = PowerCombination::combine(&[equip(&growing, 2)]).unwrap();
    assert_eq!(at_two.totals_for(&Scenario::unconditional()).green_dice, 2);
    let bucket = at_two
        .bucket(EffectCategory::DiceAddition, &Scope::Unconditional)
        .unwrap();
    assert_eq!(bucket.overridden_by.as_deref(), Some("Growing"));

    let at_one = PowerCombination::combine(&[equip(&growing, 1)]).unwrap();
    assert_eq!(at_one.totals_for(&Scenario::unconditional()).green_dice, 1);
}

#[test]
fn instead_leaves_other_buckets_and_higher_levels_alone() {
    let mixed = power(
        "Mixed",
        vec![
            (1, vec![additive(green(1)), additive(EffectKind::Reroll { dice: 1 })]),
            (2, vec![instead(green(2))]),
            (3, vec![additive(green(1))]),
        ],
    );
    let totals = PowerCombination::combine(&[equip(&mixed, 3)])
        .unwrap()
        .totals_for(&Scenario::unconditional());
    assert_eq!(totals.green_dice, 3);
    assert_eq!(totals.rerolls, 1);
}

#[test]
fn instead_from_one_power_still_sums_with_another() {
    let overriding = power(
        "Overriding",
        vec![(1, vec![additive(green(1))]), (2, vec![instead(green(2))])],
    );
    let plain = power("Plain", vec![(1, vec![additive(green(1))])]);
    let totals = PowerCombination::combine(&[equip(&overriding, 2), equip(&plain, 1)])
        .unwrap()
        .totals_for(&Scenario::unconditional());
    assert_eq!(totals.green_dice, 3);
}

#[test]
fn instead_from_two_powers_in_one_bucket_conflicts() {
    let left = power("Left", vec![(1, vec![instead(green(2))])]);
    let right = power("Right", vec![(1, vec![instead(green(3))])]);
    let err = PowerCombination::combine(&[equip(&left, 1), equip(&right, 1)]).unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict {
            category: "dice_addition".to_string(),
            scope: "unconditional".to_string(),
            first: "Left".to_string(),
            second: "Right".to_string(),
        }
    );
    assert!(err.is_candidate_rejection());

    let scoped = power(
        "Scoped",
        vec![(1, vec![instead(green(3)).when("attacking")])],
    );
    assert!(PowerCombination::combine(&[equip(&left, 1), equip(&scoped, 1)]).is_ok());
}

#[test]
fn two_overrides_at_one_level_are_a_configuration_error() {
    let doubled = power(
        "Doubled",
        vec![(1, vec![instead(green(1)), instead(green(2))])],
    );
    assert!(matches!(
        PowerCombination::combine(&[equip(&doubled, 1)]),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn scoped_effects_apply_only_when_their_condition_holds() {
    let marksman = power(
        "Marksman",
        vec![(
            1,
            vec![
                additive(green(2)).when("When attacking"),
                additive(EffectKind::Reroll { dice: 1 }).when("investigating"),
                additive(EffectKind::ActionGrant { actions: 1 }),
            ],
        )],
    );
    let combination = PowerCombination::combine(&[equip(&marksman, 1)]).unwrap();

    let idle = combination.totals_for(&Scenario::unconditional());
    assert_eq!((idle.green_dice, idle.rerolls, idle.free_actions), (0, 0, 1));

    let attacking = combination.totals_for(&Scenario::unconditional().with("attacking"));
    assert_eq!((attacking.green_dice, attacking.rerolls, attacking.free_actions), (2, 0, 1));

    let both = combination.totals_for(&Scenario::with_conditions(["attacking", "investigating"]));
    assert_eq!((both.green_dice, both.rerolls), (2, 1));
}

#[test]
fn conversion_limits_add_and_unlimited_dominates() {
    let capped = |n| {
        additive(EffectKind::SymbolConversion {
            from: Symbol::ElderSign,
            to: Symbol::Success,
            limit: Some(n),
        })
    };
    let unlimited = additive(EffectKind::SymbolConversion {
        from: Symbol::ElderSign,
        to: Symbol::Success,
        limit: None,
    });
    let one = power("One", vec![(1, vec![capped(1)])]);
    let two = power("Two", vec![(1, vec![capped(2)])]);
    let all = power("All", vec![(1, vec![unlimited])]);

    let summed = PowerCombination::combine(&[equip(&one, 1), equip(&two, 1)]).unwrap();
    assert_eq!(
        summed.totals_for(&Scenario::unconditional()).conversion,
        ElderConversion::Capped(3)
    );
    let dominated = PowerCombination::combine(&[equip(&one, 1), equip(&all, 1)]).unwrap();
    assert_eq!(
        dominated.totals_for(&Scenario::unconditional()).conversion,
        ElderConversion::Unlimited
    );
}

#[test]
fn only_elder_sign_to_success_conversion_is_modelled() {
    let err = PowerEffect::additive(EffectKind::SymbolConversion {
        from: Symbol::Tentacle,
        to: Symbol::Success,
        limit: None,
    })
    .unwrap_err();
    assert!(matches!(err, EngineError::UnrecognizedEffect(_)));
    assert!(matches!(
        EffectCategory::parse("teleport"),
        Err(EngineError::UnrecognizedEffect(_))
    ));
}

#[test]
fn synergies_are_reported_without_changing_totals() {
    let converter = power(
        "Converter",
        vec![(
            1,
            vec![additive(EffectKind::SymbolConversion {
                from: Symbol::ElderSign,
                to: Symbol::Success,
                limit: Some(1),
            })],
        )],
    );
    let charger = power(
        "Charger",
        vec![(1, vec![additive(green(1)).when("attacking")])],
    );
    let combination = PowerCombination::combine(&[equip(&converter, 1), equip(&charger, 1)]).unwrap();

    assert!(combination.synergies_for(&Scenario::unconditional()).is_empty());
    let attacking = combination.synergies_for(&Scenario::unconditional().with("attacking"));
    assert_eq!(attacking.len(), 1);
    assert_eq!(attacking[0].kind, SynergyKind::ConversionWithGreenDice);
    assert_eq!(attacking[0].powers, vec!["Charger".to_string(), "Converter".to_string()]);
    assert_eq!(combination.synergies().len(), 1);
}

#[test]
fn sanity_reduction_pairs_with_black_dice() {
    let ward = power(
        "Ward",
        vec![(1, vec![additive(EffectKind::DefensiveReduction { wounds: 0, sanity: 1 })])],
    );
    let fury = power(
        "Fury",
        vec![(1, vec![additive(EffectKind::DiceAddition { black: 1, green: 0 })])],
    );
    let combination = PowerCombination::combine(&[equip(&ward, 1), equip(&fury, 1)]).unwrap();
    let kinds: Vec<SynergyKind> = combination.synergies().iter().map(|synergy| synergy.kind).collect();
    assert_eq!(kinds, vec![SynergyKind::SanityReductionWithBlackDice]);
}

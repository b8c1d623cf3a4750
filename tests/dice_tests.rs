use dmd_stats::dice::monte_carlo::estimate_roll;
use dmd_stats::dice::{
    combined_stats, combined_stats_with, die_stats, power_impact, DicePool, DieKind, ElderConversion,
    RollModifiers,
};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

proptest! {
    #[test]
    fn expected_successes_are_half_a_success_per_die(black in 0u32..40, green in 0u32..40) {
        let stats = combined_stats(DicePool::new(black, green));
        prop_assert!((stats.expected_successes - 0.5 * f64::from(black + green)).abs() < EPS);
    }

    #[test]
    fn green_only_pools_never_show_tentacles(green in 0u32..40) {
        let stats = combined_stats(DicePool::new(0, green));
        prop_assert_eq!(stats.expected_tentacles, 0.0);
        prop_assert_eq!(stats.p_at_least_one_tentacle, 0.0);
    }

    #[test]
    fn probabilities_stay_in_unit_interval(
        black in 0u32..16,
        green in 0u32..16,
        rerolls in 0u32..6,
        cap in proptest::option::of(0u32..4),
    ) {
        let conversion = cap.map_or(ElderConversion::Unlimited, ElderConversion::Capped);
        let stats = combined_stats_with(DicePool::new(black, green), RollModifiers { conversion, rerolls });
        for p in [stats.p_at_least_one_success, stats.p_at_least_one_tentacle, stats.p_at_least_one_elder] {
            prop_assert!((0.0..=1.0 + EPS).contains(&p));
        }
        prop_assert!(stats.expected_successes <= f64::from(stats.max_possible_successes) + EPS);
    }

    #[test]
    fn modifiers_never_lower_expected_successes(
        black in 0u32..12,
        green in 0u32..12,
        rerolls in 0u32..4,
        cap in 0u32..4,
    ) {
        let pool = DicePool::new(black, green);
        let plain = combined_stats(pool);
        let rerolled = combined_stats_with(pool, RollModifiers { conversion: ElderConversion::None, rerolls });
        let converted = combined_stats_with(pool, RollModifiers { conversion: ElderConversion::Capped(cap), rerolls: 0 });
        prop_assert!(rerolled.expected_successes + EPS >= plain.expected_successes);
        prop_assert!(converted.expected_successes + EPS >= plain.expected_successes);
    }
}

#[test]
fn single_die_probabilities_match_the_faces() {
    let black = die_stats(DieKind::Black);
    assert!((black.p_success - 0.5).abs() < EPS);
    assert!((black.p_tentacle - 2.0 / 6.0).abs() < EPS);
    assert!((black.p_elder - 1.0 / 6.0).abs() < EPS);
    assert!((black.p_blank - 1.0 / 6.0).abs() < EPS);

    let green = die_stats(DieKind::Green);
    assert!((green.p_success - 0.5).abs() < EPS);
    assert_eq!(green.p_tentacle, 0.0);
    assert!((green.p_elder - 1.0 / 3.0).abs() < EPS);
    assert!((green.p_blank - 1.0 / 3.0).abs() < EPS);
}

#[test]
fn at_least_one_success_uses_the_complement_product() {
    let stats = combined_stats(DicePool::new(3, 2));
    let expected = 1.0 - 0.5f64.powi(5);
    assert!((stats.p_at_least_one_success - expected).abs() < EPS);
    assert!((stats.p_at_least_one_tentacle - (1.0 - (4.0f64 / 6.0).powi(3))).abs() < EPS);
}

#[test]
fn one_reroll_on_a_black_die_adds_a_quarter_success() {
    let stats = combined_stats_with(
        DicePool::new(1, 0),
        RollModifiers {
            conversion: ElderConversion::None,
            rerolls: 1,
        },
    );
    assert!((stats.expected_successes - 0.75).abs() < EPS);
    assert!((stats.p_at_least_one_success - 0.75).abs() < EPS);
}

#[test]
fn capped_conversion_counts_at_most_the_cap() {
    let converted = combined_stats_with(
        DicePool::new(0, 1),
        RollModifiers {
            conversion: ElderConversion::Capped(1),
            rerolls: 0,
        },
    );
    assert!((converted.elder_signs_converted - 1.0 / 3.0).abs() < EPS);
    assert!((converted.expected_successes - (0.5 + 1.0 / 3.0)).abs() < EPS);
    assert_eq!(converted.max_possible_successes, 2);

    let unlimited = combined_stats_with(
        DicePool::new(3, 0),
        RollModifiers {
            conversion: ElderConversion::Unlimited,
            rerolls: 0,
        },
    );
    assert!((unlimited.expected_successes - 2.0).abs() < EPS);
}

#[test]
fn power_impact_flags_large_gains() {
    let base = combined_stats(DicePool::new(3, 0));
    let boosted = combined_stats(DicePool::new(3, 2));
    let impact = power_impact(base, boosted);
    assert!(impact.is_significant_improvement());
    let same = power_impact(base, base);
    assert!(!same.is_significant_improvement());
}

#[test]
fn sampling_agrees_with_exact_statistics() {
    let pool = DicePool::new(3, 2);
    let modifiers = RollModifiers {
        conversion: ElderConversion::Capped(1),
        rerolls: 1,
    };
    let exact = combined_stats_with(pool, modifiers);
    let sampled = estimate_roll(pool, modifiers, 40_000, 11).unwrap();
    assert!((sampled.mean_successes - exact.expected_successes).abs() < 0.05);
    assert!((sampled.mean_tentacles - exact.expected_tentacles).abs() < 0.05);
    assert!((sampled.p_at_least_one_success - exact.p_at_least_one_success).abs() < 0.02);
}

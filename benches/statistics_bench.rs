//! Exact roll statistics and full build evaluation.
//!
//! Run with: `cargo bench --bench statistics`

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dmd_stats::build::{CharacterBuild, Scenario};
use dmd_stats::data::Catalog;
use dmd_stats::dice::{combined_stats_with, DicePool, ElderConversion, RollModifiers};
use dmd_stats::insanity::InsanityTrack;

fn bench_combined_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("combined_stats");
    for (label, conversion) in [
        ("plain", ElderConversion::None),
        ("capped", ElderConversion::Capped(2)),
        ("unlimited", ElderConversion::Unlimited),
    ] {
        let modifiers = RollModifiers {
            conversion,
            rerolls: 2,
        };
        group.bench_function(label, |b| {
            b.iter(|| black_box(combined_stats_with(black_box(DicePool::new(6, 6)), modifiers)));
        });
    }
    group.finish();
}

fn bench_build_statistics(c: &mut Criterion) {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let catalog = Catalog::load(dir.join("powers.yaml"), dir.join("characters.yaml"))
        .expect("bundled data should load");
    let character = catalog.character("hunter").expect("hunter should exist");
    let build = CharacterBuild::from_character(
        character,
        &catalog,
        InsanityTrack::at_position(16).expect("valid position"),
    )
    .expect("hunter build should resolve");
    let scenario = Scenario::with_conditions(["attacking", "attacking at range"]);

    c.bench_function("build_statistics", |b| {
        b.iter(|| black_box(build.statistics(black_box(&scenario))));
    });
}

criterion_group!(benches, bench_combined_stats, bench_build_statistics);
criterion_main!(benches);

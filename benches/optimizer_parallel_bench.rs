//! Compare sequential vs parallel level-up sweeps.
//!
//! Run with: `cargo bench --bench optimizer_parallel`

use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dmd_stats::build::{CharacterBuild, Scenario};
use dmd_stats::data::Catalog;
use dmd_stats::dice::monte_carlo::simulate_survival;
use dmd_stats::dice::{DicePool, RollModifiers};
use dmd_stats::insanity::InsanityTrack;
use dmd_stats::optimizer::{optimize_level_ups, OptimizerConfig};

fn scholar_build() -> CharacterBuild {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let catalog = Catalog::load(dir.join("powers.yaml"), dir.join("characters.yaml"))
        .expect("bundled data should load");
    let character = catalog.character("scholar").expect("scholar should exist");
    CharacterBuild::from_character(
        character,
        &catalog,
        InsanityTrack::at_position(20).expect("valid position"),
    )
    .expect("scholar build should resolve")
}

fn bench_optimizer_sequential_vs_parallel(c: &mut Criterion) {
    let build = scholar_build();
    let scenario = Scenario::with_conditions(["casting"]);
    let sequential = OptimizerConfig {
        parallel: false,
        top: 0,
        ..OptimizerConfig::default()
    };
    let parallel = OptimizerConfig {
        top: 0,
        ..OptimizerConfig::default()
    };

    let mut group = c.benchmark_group("optimizer");
    group.sample_size(20);

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(optimize_level_ups(&build, 6, &scenario, &sequential)));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(optimize_level_ups(&build, 6, &scenario, &parallel)));
    });
    group.finish();
}

fn bench_survival_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("survival");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(10));
    group.bench_function("10k_runs", |b| {
        b.iter(|| {
            black_box(simulate_survival(
                DicePool::new(3, 1),
                RollModifiers::default(),
                InsanityTrack::new(),
                10_000,
                42,
            ))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_optimizer_sequential_vs_parallel,
    bench_survival_simulation
);
criterion_main!(benches);

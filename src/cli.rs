use std::io;

use serde::Serialize;
use tracing::info;

use crate::build::{CharacterBuild, Scenario};
use crate::config::AnalysisConfig;
use crate::data::validate::{validate_dataset, ValidationSeverity};
use crate::data::Catalog;
use crate::dice::monte_carlo::{estimate_roll, simulate_survival, SampledRollStats, SurvivalSummary};
use crate::dice::DicePool;
use crate::error::{DataError, EngineError};
use crate::insanity::{simulate_roll_sequence, InsanityTrack, RED_SWIRL_SLOTS};
use crate::optimizer::export_csv::write_ranked_csv;
use crate::optimizer::optimize_level_ups;
use crate::strategy::{analyze, level_up_impacts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stats,
    Track,
    Optimize,
    Strategy,
    Impact,
    Simulate,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("stats") => Some(Command::Stats),
        Some("track") => Some(Command::Track),
        Some("optimize") => Some(Command::Optimize),
        Some("strategy") => Some(Command::Strategy),
        Some("impact") => Some(Command::Impact),
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Stats) => handle_stats(args),
        Some(Command::Track) => handle_track(args),
        Some(Command::Optimize) => handle_optimize(args),
        Some(Command::Strategy) => handle_strategy(args),
        Some(Command::Impact) => handle_impact(args),
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: dmd-stats <stats|track|optimize|strategy|impact|simulate|validate>");
            2
        }
    }
}

/// Flags shared by the per-character commands.
#[derive(Debug, Default)]
struct CharacterArgs {
    character: String,
    positional: Vec<String>,
    conditions: Vec<String>,
    insanity: Option<u8>,
    csv: bool,
}

fn parse_character_args(args: &[String]) -> Result<CharacterArgs, String> {
    let mut parsed = CharacterArgs::default();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--when" => {
                let condition = rest.next().ok_or("--when needs a condition")?;
                parsed.conditions.push(condition.clone());
            }
            "--insanity" => {
                let raw = rest.next().ok_or("--insanity needs a track position")?;
                let position = raw
                    .parse::<u8>()
                    .map_err(|_| format!("invalid insanity position '{raw}'"))?;
                parsed.insanity = Some(position);
            }
            "--csv" => parsed.csv = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            value if parsed.character.is_empty() => parsed.character = value.to_string(),
            value => parsed.positional.push(value.to_string()),
        }
    }
    if parsed.character.is_empty() {
        return Err("missing <character>".to_string());
    }
    Ok(parsed)
}

struct Session {
    config: AnalysisConfig,
    catalog: Catalog,
}

impl Session {
    fn open() -> Result<Self, DataError> {
        let config = AnalysisConfig::load()?;
        let catalog = Catalog::load(&config.data.powers_path, &config.data.characters_path)?;
        Ok(Self { config, catalog })
    }

    fn scenario(&self, extra: &[String]) -> Scenario {
        let mut scenario = self.config.scenario.scenario();
        for condition in extra {
            scenario.insert(condition);
        }
        scenario
    }

    fn build(&self, character: &str, track: InsanityTrack) -> Result<CharacterBuild, DataError> {
        let character = self.catalog.character(character)?;
        CharacterBuild::from_character(character, &self.catalog, track)
    }
}

/// Parses the character flags and opens the data, or returns the exit code to stop with.
fn prepare(args: &[String], usage: &str) -> Result<(CharacterArgs, Session), i32> {
    let parsed = match parse_character_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: dmd-stats {usage}");
            return Err(2);
        }
    };
    match Session::open() {
        Ok(session) => Ok((parsed, session)),
        Err(err) => {
            eprintln!("failed to load data: {err}");
            Err(1)
        }
    }
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn fail(what: &str, err: impl std::fmt::Display) -> i32 {
    eprintln!("{what} failed: {err}");
    1
}

fn handle_stats(args: &[String]) -> i32 {
    let usage = "stats <character> [--when <condition>]... [--insanity <position>]";
    let (parsed, session) = match prepare(args, usage) {
        Ok(ready) => ready,
        Err(code) => return code,
    };
    let track = match parsed.insanity.map(InsanityTrack::at_position).transpose() {
        Ok(track) => track.unwrap_or_default(),
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: dmd-stats {usage}");
            return 2;
        }
    };
    let scenario = session.scenario(&parsed.conditions);
    let statistics = session
        .build(&parsed.character, track)
        .and_then(|build| Ok(build.statistics(&scenario)?));
    match statistics {
        Ok(statistics) => print_json(&statistics, "statistics"),
        Err(err) => fail("stats", err),
    }
}

fn handle_track(args: &[String]) -> i32 {
    let mut counts = Vec::with_capacity(args.len().saturating_sub(2));
    for raw in args.iter().skip(2) {
        match raw.parse::<u32>() {
            Ok(count) => counts.push(count),
            Err(_) => {
                eprintln!("invalid tentacle count '{raw}'");
                eprintln!("usage: dmd-stats track <tentacles>...");
                return 2;
            }
        }
    }
    match simulate_roll_sequence(&counts) {
        Ok(transitions) => print_json(&transitions, "track replay"),
        Err(err) => fail("track", err),
    }
}

/// A track with exactly `level_ups` swirls reached and nothing spent.
fn track_with_level_ups(level_ups: u8) -> Result<InsanityTrack, EngineError> {
    match level_ups {
        0 => Ok(InsanityTrack::new()),
        n => match RED_SWIRL_SLOTS.get(usize::from(n) - 1) {
            Some(&slot) => InsanityTrack::at_position(slot),
            None => Err(EngineError::configuration(format!(
                "{n} level-ups requested; a game grants at most {}",
                RED_SWIRL_SLOTS.len()
            ))),
        },
    }
}

fn handle_optimize(args: &[String]) -> i32 {
    let usage = "optimize <character> <level-ups> [--when <condition>]... [--csv]";
    let (parsed, session) = match prepare(args, usage) {
        Ok(ready) => ready,
        Err(code) => return code,
    };
    let Some(level_ups) = parsed.positional.first().and_then(|raw| raw.parse::<u8>().ok()) else {
        eprintln!("usage: dmd-stats {usage}");
        return 2;
    };
    let scenario = session.scenario(&parsed.conditions);
    let ranked = track_with_level_ups(level_ups)
        .map_err(DataError::from)
        .and_then(|track| session.build(&parsed.character, track))
        .and_then(|build| Ok(optimize_level_ups(&build, level_ups, &scenario, &session.config.optimizer)?));
    let ranked = match ranked {
        Ok(ranked) => ranked,
        Err(err) => return fail("optimize", err),
    };
    info!(character = %parsed.character, level_ups, results = ranked.len(), "optimization complete");

    if parsed.csv {
        match write_ranked_csv(io::stdout().lock(), &ranked) {
            Ok(()) => 0,
            Err(err) => fail("csv export", err),
        }
    } else {
        print_json(&ranked, "optimization result")
    }
}

fn handle_strategy(args: &[String]) -> i32 {
    let usage = "strategy <character> [--when <condition>]... [--insanity <position>]";
    let (parsed, session) = match prepare(args, usage) {
        Ok(ready) => ready,
        Err(code) => return code,
    };
    let scenario = session.scenario(&parsed.conditions);
    let strategy = parsed
        .insanity
        .map(InsanityTrack::at_position)
        .transpose()
        .map_err(DataError::from)
        .and_then(|track| session.build(&parsed.character, track.unwrap_or_default()))
        .and_then(|build| Ok(analyze(&build, &scenario)?));
    match strategy {
        Ok(strategy) => print_json(&strategy, "strategy"),
        Err(err) => fail("strategy", err),
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    character: String,
    pool: DicePool,
    sampled: SampledRollStats,
    survival: SurvivalSummary,
}

fn handle_impact(args: &[String]) -> i32 {
    let usage = "impact <character> [--when <condition>]... [--insanity <position>]";
    let (parsed, session) = match prepare(args, usage) {
        Ok(ready) => ready,
        Err(code) => return code,
    };
    let scenario = session.scenario(&parsed.conditions);
    let impacts = parsed
        .insanity
        .map(InsanityTrack::at_position)
        .transpose()
        .map_err(DataError::from)
        .and_then(|track| session.build(&parsed.character, track.unwrap_or_default()))
        .and_then(|build| Ok(level_up_impacts(&build, &scenario)?));
    match impacts {
        Ok(impacts) => print_json(&impacts, "level-up impacts"),
        Err(err) => fail("impact", err),
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let usage = "simulate <character> [iterations] [seed] [--when <condition>]... [--insanity <position>]";
    let (parsed, session) = match prepare(args, usage) {
        Ok(ready) => ready,
        Err(code) => return code,
    };
    let defaults = &session.config.monte_carlo;
    let iterations = parse_arg(parsed.positional.first(), "iterations", defaults.iterations);
    let seed = parse_arg(parsed.positional.get(1), "seed", defaults.seed);
    let scenario = session.scenario(&parsed.conditions);

    let report = parsed
        .insanity
        .map(InsanityTrack::at_position)
        .transpose()
        .map_err(DataError::from)
        .and_then(|track| session.build(&parsed.character, track.unwrap_or_default()))
        .and_then(|build| {
            let (pool, modifiers) = build.roll_setup(&scenario)?;
            let track = *build.track();
            let survival = simulate_survival(pool, modifiers, track, iterations, seed)?;
            let pool = pool.checked_add(0, u32::from(track.green_dice_bonus()))?;
            let sampled = estimate_roll(pool, modifiers, iterations, seed)?;
            Ok(SimulationReport {
                character: build.character_id().to_string(),
                pool,
                sampled,
                survival,
            })
        });
    match report {
        Ok(report) => print_json(&report, "simulation report"),
        Err(err) => fail("simulate", err),
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let config = match AnalysisConfig::load() {
        Ok(config) => config,
        Err(err) => return fail("config load", err),
    };
    let powers = args.get(2).map_or(config.data.powers_path.clone(), Into::into);
    let characters = args.get(3).map_or(config.data.characters_path.clone(), Into::into);

    let report = match validate_dataset(&powers, &characters) {
        Ok(report) => report,
        Err(err) => return fail("validation", err),
    };
    let code = print_json(&report, "validation report");
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s) in {} / {}",
            report.count(ValidationSeverity::Error),
            powers.display(),
            characters.display()
        );
        return 1;
    }
    code
}

fn parse_arg<T>(raw: Option<&String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    raw.and_then(|value| value.parse::<T>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

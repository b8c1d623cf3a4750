pub mod faces;
pub mod monte_carlo;
pub mod probability;
pub mod rng;

pub use faces::{DieFace, DieKind, Symbol, FACES_PER_DIE};
pub use probability::{
    combined_stats, combined_stats_with, die_stats, effective_tables, power_impact,
    CombinedRollStats, DicePool, ElderConversion, FaceTable, PowerImpact, RollModifiers,
    SingleDieStats, MAX_POOL_DICE,
};
pub use rng::Rng;

pub mod track;

pub use track::{
    simulate_roll_sequence, InsanityTrack, TransitionResult, DEATH_POSITION, GREEN_BONUS_SWIRLS,
    MAX_LEVEL_UPS, RED_SWIRL_SLOTS, START_POSITION,
};

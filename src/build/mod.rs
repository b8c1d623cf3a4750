pub mod character_build;
pub mod scenario;
pub mod statistics;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use character_build::{compute, compute_statistics, CharacterBuild, BASE_POOL};
pub use scenario::Scenario;
pub use statistics::Statistics;

/// Which of a character's three powers a level-up targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerSlot {
    Special,
    Common1,
    Common2,
}

impl PowerSlot {
    pub const COUNT: usize = 3;
    pub const ALL: [PowerSlot; Self::COUNT] = [Self::Special, Self::Common1, Self::Common2];

    pub const fn index(self) -> usize {
        match self {
            Self::Special => 0,
            Self::Common1 => 1,
            Self::Common2 => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Special => "special",
            Self::Common1 => "common_1",
            Self::Common2 => "common_2",
        }
    }
}

impl fmt::Display for PowerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

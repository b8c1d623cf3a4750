//! Error taxonomy for the statistics engine and the data layer.
//!
//! Every engine operation either returns a fully valid result or one of the
//! [`EngineError`] variants below; nothing is silently degraded.

use thiserror::Error;

use crate::build::PowerSlot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Invalid inputs: negative dice counts, a level-0 equip, inconsistent stacking tags.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An effect category or symbol conversion the engine does not model.
    #[error("unrecognized effect: {0}")]
    UnrecognizedEffect(String),

    /// Two powers override the same category under the same scope.
    #[error("conflicting overrides for {category} ({scope}): '{first}' and '{second}'")]
    Conflict {
        category: String,
        scope: String,
        first: String,
        second: String,
    },

    #[error("no level-up available for {slot}")]
    NoLevelUpAvailable { slot: PowerSlot },

    #[error("insanity track at position {position} cannot transition")]
    InvalidTransition { position: u8 },
}

impl EngineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for errors an optimizer may catch to discard a candidate build.
    pub fn is_candidate_rejection(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while loading or resolving external power/character records.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

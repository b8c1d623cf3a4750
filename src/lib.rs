//! Roll statistics for Cthulhu: Death May Die characters.
//!
//! The dice model and insanity track are pure value types; a
//! [`build::CharacterBuild`] ties them to equipped powers and derives
//! [`build::Statistics`] per scenario.

pub mod build;
pub mod cli;
pub mod config;
pub mod data;
pub mod dice;
pub mod error;
pub mod insanity;
pub mod optimizer;
pub mod parallel;
pub mod powers;
pub mod strategy;

pub use error::{DataError, EngineError, Result};

//! Character records: base capacities plus one special and two common powers.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::power::{read_records, MAX_POWER_LEVEL, MIN_POWER_LEVEL};
use crate::error::{DataError, EngineError, Result};

pub const COMMON_POWERS_PER_CHARACTER: usize = 2;

/// A power referenced by name, pinned to a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRef {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u8,
}

fn default_level() -> u8 {
    MIN_POWER_LEVEL
}

impl PowerRef {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    fn validate(&self, owner: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::configuration(format!(
                "character '{owner}' references a power with an empty name"
            )));
        }
        if !(MIN_POWER_LEVEL..=MAX_POWER_LEVEL).contains(&self.level) {
            return Err(EngineError::configuration(format!(
                "character '{owner}' equips '{}' at level {}",
                self.name, self.level
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub health: u32,
    pub sanity: u32,
    pub special_power: PowerRef,
    pub common_powers: [PowerRef; COMMON_POWERS_PER_CHARACTER],
}

impl Character {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        health: u32,
        sanity: u32,
        special_power: PowerRef,
        common_powers: [PowerRef; COMMON_POWERS_PER_CHARACTER],
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::configuration("character id must not be empty"));
        }
        if health == 0 || sanity == 0 {
            return Err(EngineError::configuration(format!(
                "character '{id}' needs health and sanity of at least 1"
            )));
        }
        special_power.validate(&id)?;
        for power in &common_powers {
            power.validate(&id)?;
        }
        Ok(Self {
            name: name.into(),
            id,
            health,
            sanity,
            special_power,
            common_powers,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterFile {
    pub characters: Vec<CharacterRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_capacity")]
    pub health: u32,
    #[serde(default = "default_capacity")]
    pub sanity: u32,
    pub special_power: PowerRef,
    #[serde(default)]
    pub common_powers: Vec<PowerRef>,
}

fn default_capacity() -> u32 {
    5
}

impl CharacterRecord {
    pub fn resolve(&self) -> Result<Character> {
        let common: [PowerRef; COMMON_POWERS_PER_CHARACTER] =
            self.common_powers.clone().try_into().map_err(|powers: Vec<PowerRef>| {
                EngineError::configuration(format!(
                    "character '{}' lists {} common powers; expected {COMMON_POWERS_PER_CHARACTER}",
                    self.id,
                    powers.len()
                ))
            })?;
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        Character::new(
            self.id.clone(),
            name,
            self.health,
            self.sanity,
            self.special_power.clone(),
            common,
        )
    }
}

pub fn load_character_file(path: impl AsRef<Path>) -> std::result::Result<CharacterFile, DataError> {
    read_records(path)
}

pub fn load_characters(path: impl AsRef<Path>) -> std::result::Result<Vec<Character>, DataError> {
    let file = load_character_file(path)?;
    Ok(file
        .characters
        .iter()
        .map(CharacterRecord::resolve)
        .collect::<Result<Vec<_>>>()?)
}

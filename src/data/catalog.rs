//! Lookup of loaded powers and characters by name or id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::data::character::{load_characters, Character};
use crate::data::power::{load_powers, Power};
use crate::error::{DataError, EngineError};
use crate::powers::normalize_key;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    powers: HashMap<String, Arc<Power>>,
    characters: Vec<Character>,
}

impl Catalog {
    /// Indexes `powers` by normalized name. Duplicate names or character ids are rejected.
    pub fn new(powers: Vec<Power>, characters: Vec<Character>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(powers.len());
        for power in powers {
            let key = normalize_key(power.name());
            if index.contains_key(&key) {
                return Err(EngineError::configuration(format!(
                    "power '{}' defined more than once",
                    power.name()
                )));
            }
            index.insert(key, Arc::new(power));
        }
        for (position, character) in characters.iter().enumerate() {
            if characters[..position].iter().any(|other| other.id == character.id) {
                return Err(EngineError::configuration(format!(
                    "character id '{}' defined more than once",
                    character.id
                )));
            }
        }
        Ok(Self {
            powers: index,
            characters,
        })
    }

    pub fn load(
        powers_path: impl AsRef<Path>,
        characters_path: impl AsRef<Path>,
    ) -> Result<Self, DataError> {
        let powers = load_powers(powers_path.as_ref())?;
        let characters = load_characters(characters_path.as_ref())?;
        info!(
            powers = powers.len(),
            characters = characters.len(),
            "loaded catalog"
        );
        Ok(Self::new(powers, characters)?)
    }

    pub fn power(&self, name: &str) -> Result<Arc<Power>, DataError> {
        self.powers
            .get(&normalize_key(name))
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("power '{name}'")))
    }

    /// Finds a character by id, falling back to a case-insensitive name match.
    pub fn character(&self, id_or_name: &str) -> Result<&Character, DataError> {
        let key = normalize_key(id_or_name);
        self.characters
            .iter()
            .find(|character| character.id == id_or_name)
            .or_else(|| {
                self.characters.iter().find(|character| {
                    normalize_key(&character.id) == key || normalize_key(&character.name) == key
                })
            })
            .ok_or_else(|| DataError::NotFound(format!("character '{id_or_name}'")))
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn powers(&self) -> impl Iterator<Item = &Arc<Power>> {
        self.powers.values()
    }
}

//! Power records and the YAML/JSON definition files they load from.
//!
//! Definition files carry effects already in structured form; each effect's
//! `type` tag maps onto one [`EffectKind`] case.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dice::Symbol;
use crate::error::{DataError, EngineError, Result};
use crate::powers::{normalize_key, EffectCategory, EffectKind, PowerEffect, Scope, Stacking};

pub const MIN_POWER_LEVEL: u8 = 1;
pub const MAX_POWER_LEVEL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    Special,
    #[default]
    Common,
}

/// The six common powers shared by every character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommonPowerName {
    ArcaneMastery,
    Brawling,
    Marksman,
    Stealth,
    Swiftness,
    Toughness,
}

impl CommonPowerName {
    pub const ALL: [CommonPowerName; 6] = [
        Self::ArcaneMastery,
        Self::Brawling,
        Self::Marksman,
        Self::Stealth,
        Self::Swiftness,
        Self::Toughness,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArcaneMastery => "Arcane Mastery",
            Self::Brawling => "Brawling",
            Self::Marksman => "Marksman",
            Self::Stealth => "Stealth",
            Self::Swiftness => "Swiftness",
            Self::Toughness => "Toughness",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let key = normalize_key(name);
        Self::ALL
            .into_iter()
            .find(|candidate| normalize_key(candidate.as_str()) == key)
    }
}

impl fmt::Display for CommonPowerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerLevel {
    pub level: u8,
    pub description: String,
    pub effects: Vec<PowerEffect>,
}

/// A validated power: a name plus its effects at levels 1..=4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Power {
    name: String,
    kind: PowerKind,
    levels: Vec<PowerLevel>,
}

impl Power {
    pub fn new(name: impl Into<String>, kind: PowerKind, mut levels: Vec<PowerLevel>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::configuration("power name must not be empty"));
        }
        levels.sort_by_key(|level| level.level);
        for (index, level) in levels.iter().enumerate() {
            if !(MIN_POWER_LEVEL..=MAX_POWER_LEVEL).contains(&level.level) {
                return Err(EngineError::configuration(format!(
                    "power '{name}' defines level {} outside {MIN_POWER_LEVEL}..={MAX_POWER_LEVEL}",
                    level.level
                )));
            }
            if index > 0 && levels[index - 1].level == level.level {
                return Err(EngineError::configuration(format!(
                    "power '{name}' defines level {} twice",
                    level.level
                )));
            }
        }
        Ok(Self { name, kind, levels })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PowerKind {
        self.kind
    }

    pub fn levels(&self) -> &[PowerLevel] {
        &self.levels
    }

    pub fn common_name(&self) -> Option<CommonPowerName> {
        CommonPowerName::parse(&self.name)
    }

    /// Every effect unlocked at `level`, tagged with the level that grants it.
    pub fn effects_up_to(&self, level: u8) -> Result<Vec<(u8, &PowerEffect)>> {
        if !(MIN_POWER_LEVEL..=MAX_POWER_LEVEL).contains(&level) {
            return Err(EngineError::configuration(format!(
                "power '{}' equipped at level {level}; expected {MIN_POWER_LEVEL}..={MAX_POWER_LEVEL}",
                self.name
            )));
        }
        Ok(self
            .levels
            .iter()
            .filter(|entry| entry.level <= level)
            .flat_map(|entry| entry.effects.iter().map(move |effect| (entry.level, effect)))
            .collect())
    }
}

/// Root structure of a power definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerFile {
    pub powers: Vec<PowerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerRecord {
    pub name: String,
    #[serde(default)]
    pub kind: PowerKind,
    #[serde(default)]
    pub levels: Vec<PowerLevelRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerLevelRecord {
    pub level: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
}

/// One structured effect as written in a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectRecord {
    #[serde(rename = "type")]
    pub effect_type: String,
    #[serde(default)]
    pub black: Option<u32>,
    #[serde(default)]
    pub green: Option<u32>,
    #[serde(default)]
    pub dice: Option<u32>,
    #[serde(default)]
    pub wounds: Option<u32>,
    #[serde(default)]
    pub stress: Option<u32>,
    #[serde(default)]
    pub sanity: Option<u32>,
    #[serde(default)]
    pub actions: Option<u32>,
    #[serde(default)]
    pub from: Option<Symbol>,
    #[serde(default)]
    pub to: Option<Symbol>,
    /// Absent means every symbol converts.
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub stacking: Option<String>,
}

impl EffectRecord {
    pub fn resolve(&self) -> Result<PowerEffect> {
        let kind = match EffectCategory::parse(&self.effect_type)? {
            EffectCategory::DiceAddition => EffectKind::DiceAddition {
                black: self.black.unwrap_or(0),
                green: self.green.unwrap_or(0),
            },
            EffectCategory::Reroll => EffectKind::Reroll {
                dice: self.dice.unwrap_or(1),
            },
            EffectCategory::Healing => EffectKind::Healing {
                wounds: self.wounds.unwrap_or(0),
                stress: self.stress.unwrap_or(0),
            },
            EffectCategory::DefensiveReduction => EffectKind::DefensiveReduction {
                wounds: self.wounds.unwrap_or(0),
                sanity: self.sanity.unwrap_or(0),
            },
            EffectCategory::SymbolConversion => EffectKind::SymbolConversion {
                from: self.from.unwrap_or(Symbol::ElderSign),
                to: self.to.unwrap_or(Symbol::Success),
                limit: self.limit,
            },
            EffectCategory::ActionGrant => EffectKind::ActionGrant {
                actions: self.actions.unwrap_or(1),
            },
        };
        let stacking = parse_stacking(self.stacking.as_deref())?;
        let scope = self.when.as_deref().map_or(Scope::Unconditional, Scope::when);
        PowerEffect::new(kind, scope, stacking)
    }
}

fn parse_stacking(tag: Option<&str>) -> Result<Stacking> {
    match tag.map(normalize_key).as_deref() {
        None | Some("additive") | Some("") => Ok(Stacking::Additive),
        Some("override") | Some("instead") => Ok(Stacking::Override),
        Some(other) => Err(EngineError::configuration(format!(
            "unknown stacking tag '{other}'"
        ))),
    }
}

impl PowerRecord {
    pub fn resolve(&self) -> Result<Power> {
        let levels = self
            .levels
            .iter()
            .map(|level| {
                let effects = level
                    .effects
                    .iter()
                    .map(EffectRecord::resolve)
                    .collect::<Result<Vec<_>>>()?;
                Ok(PowerLevel {
                    level: level.level,
                    description: level.description.clone(),
                    effects,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Power::new(self.name.clone(), self.kind, levels)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Reads a definition file as JSON or YAML depending on its extension.
pub fn read_records<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> std::result::Result<T, DataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    if is_json(path) {
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(serde_yaml::from_str(&raw)?)
    }
}

pub fn load_power_file(path: impl AsRef<Path>) -> std::result::Result<PowerFile, DataError> {
    read_records(path)
}

/// Loads and validates every power in `path`.
pub fn load_powers(path: impl AsRef<Path>) -> std::result::Result<Vec<Power>, DataError> {
    let file = load_power_file(path)?;
    Ok(file
        .powers
        .iter()
        .map(PowerRecord::resolve)
        .collect::<Result<Vec<_>>>()?)
}

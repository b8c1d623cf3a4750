//! Analysis settings: TOML file plus environment overrides.
//!
//! Resolution order: `DMD_STATS_CONFIG` → `dmd-stats.toml` in the working
//! directory → built-in defaults. `DMD_STATS_DATA_DIR` then re-roots both data
//! file names.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::build::Scenario;
use crate::error::DataError;
use crate::optimizer::OptimizerConfig;

pub const CONFIG_ENV: &str = "DMD_STATS_CONFIG";
pub const DATA_DIR_ENV: &str = "DMD_STATS_DATA_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "dmd-stats.toml";
pub const DEFAULT_POWERS_PATH: &str = "data/powers.yaml";
pub const DEFAULT_CHARACTERS_PATH: &str = "data/characters.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub powers_path: PathBuf,
    pub characters_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            powers_path: PathBuf::from(DEFAULT_POWERS_PATH),
            characters_path: PathBuf::from(DEFAULT_CHARACTERS_PATH),
        }
    }
}

impl DataConfig {
    /// Keeps the file names and swaps their directory for `dir`.
    pub fn rooted_at(&self, dir: &Path) -> Self {
        let rebase = |path: &Path| match path.file_name() {
            Some(name) => dir.join(name),
            None => dir.to_path_buf(),
        };
        Self {
            powers_path: rebase(&self.powers_path),
            characters_path: rebase(&self.characters_path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub conditions: Vec<String>,
}

impl ScenarioConfig {
    pub fn scenario(&self) -> Scenario {
        Scenario::with_conditions(&self.conditions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data: DataConfig,
    pub scenario: ScenarioConfig,
    pub optimizer: OptimizerConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Reads `config_path` when given (it must exist), else the default file if
    /// present, else defaults; then applies `data_dir`.
    pub fn resolve(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, DataError> {
        let mut config = match config_path {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                info!(path = DEFAULT_CONFIG_PATH, "loading config");
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };
        if let Some(dir) = data_dir {
            config.data = config.data.rooted_at(dir);
        }
        Ok(config)
    }

    /// [`AnalysisConfig::resolve`] driven by `DMD_STATS_CONFIG` and `DMD_STATS_DATA_DIR`.
    pub fn load() -> Result<Self, DataError> {
        let config_path = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::resolve(config_path.as_deref(), data_dir.as_deref())
    }
}

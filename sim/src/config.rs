use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lezg_engine::{
  DEFAULT_TICK_RATE_TPS,
  entities::airspace::{Airspace, UnknownDelta},
};

use crate::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file: {0}")]
  Read(#[from] std::io::Error),
  #[error("failed to parse config file: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  pub sim: Option<SimConfig>,
  pub airspace: Option<AirspaceConfig>,
  pub scenario: Option<ScenarioConfig>,
}

impl Config {
  pub fn from_path<T>(path: T) -> Result<Self, ConfigError>
  where
    T: AsRef<Path>,
  {
    let config = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&config)?)
  }

  /// `config.toml` in the platform config directory.
  pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lezg")
      .map(|dirs| dirs.config_dir().join("config.toml"))
  }

  /// Reads the given config, or the default one if it exists. A missing
  /// default config is not an error.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = path {
      return Self::from_path(path);
    }

    match Self::default_path() {
      Some(path) if path.exists() => {
        tracing::info!("Using config at {}", path.display());
        Self::from_path(path)
      }
      _ => Ok(Self::default()),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
  pub tick_rate: Option<usize>,
  pub multiplier: Option<f64>,
  pub paused: Option<bool>,
  pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirspaceConfig {
  /// Restricted areas to activate. Every delta is active when omitted.
  pub active_deltas: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
  pub path: Option<PathBuf>,
}

/// Config merged with the command line, which wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub tick_rate: usize,
  pub multiplier: f64,
  pub paused: bool,
  pub seed: u64,
  pub active_deltas: Option<Vec<String>>,
  pub scenario: Option<PathBuf>,
  pub ticks: Option<usize>,
}

impl Settings {
  pub fn resolve(config: Config, cli: &Cli) -> Self {
    let sim = config.sim.unwrap_or_default();

    Self {
      tick_rate: sim
        .tick_rate
        .filter(|rate| *rate > 0)
        .unwrap_or(DEFAULT_TICK_RATE_TPS),
      multiplier: sim.multiplier.filter(|m| *m > 0.0).unwrap_or(1.0),
      paused: sim.paused.unwrap_or_default(),
      seed: cli.seed.or(sim.seed).unwrap_or_default(),
      active_deltas: config.airspace.and_then(|a| a.active_deltas),
      scenario: cli
        .scenario
        .clone()
        .or(config.scenario.and_then(|s| s.path)),
      ticks: cli.ticks,
    }
  }

  pub fn airspace(&self) -> Result<Airspace, UnknownDelta> {
    Airspace::with_active_deltas(self.active_deltas.as_deref())
  }
}

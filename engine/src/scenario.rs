//! Scripted traffic: a named list of arrivals released at set sim times.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{command::AirborneSpawn, data::WAYPOINTS, performance::AircraftKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSpawn {
  pub callsign: String,
  #[serde(rename = "type")]
  pub kind: AircraftKind,
  pub flight_level: f64,
  pub waypoint: String,
  /// Minutes.
  pub time_to_waypoint: f64,
  /// Seconds of sim time after the scenario is loaded.
  pub spawn_time: f64,
}

impl ScheduledSpawn {
  pub fn to_spawn(&self) -> AirborneSpawn {
    AirborneSpawn {
      callsign: self.callsign.clone(),
      kind: self.kind,
      flight_level: self.flight_level,
      waypoint: self.waypoint.clone(),
      time_to_waypoint: self.time_to_waypoint,
      formation_size: 1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub aircraft: Vec<ScheduledSpawn>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
  #[error("failed to read scenario: {0}")]
  Io(String),
  #[error("failed to parse scenario: {0}")]
  Parse(String),
  #[error("scenario has no name")]
  MissingName,
  #[error("aircraft {index}: {reason}")]
  Aircraft { index: usize, reason: String },
}

impl Scenario {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
    let content = std::fs::read_to_string(path)
      .map_err(|e| ScenarioError::Io(e.to_string()))?;
    let scenario: Self = serde_json::from_str(&content)
      .map_err(|e| ScenarioError::Parse(e.to_string()))?;
    scenario.validate()?;

    Ok(scenario)
  }

  pub fn validate(&self) -> Result<(), ScenarioError> {
    if self.name.trim().is_empty() {
      return Err(ScenarioError::MissingName);
    }

    for (index, spawn) in self.aircraft.iter().enumerate() {
      let reason = if spawn.callsign.trim().is_empty() {
        Some("callsign is empty".to_owned())
      } else if !(10.0..=600.0).contains(&spawn.flight_level) {
        Some(format!("flight level {} is outside 10-600", spawn.flight_level))
      } else if !(1.0..=20.0).contains(&spawn.time_to_waypoint) {
        Some(format!(
          "time to waypoint {} min is outside 1-20",
          spawn.time_to_waypoint
        ))
      } else if spawn.spawn_time < 0.0 {
        Some(format!("spawn time {} s is negative", spawn.spawn_time))
      } else if !WAYPOINTS.contains(&spawn.waypoint) {
        Some(format!("unknown waypoint {:?}", spawn.waypoint))
      } else {
        None
      };

      if let Some(reason) = reason {
        return Err(ScenarioError::Aircraft { index, reason });
      }
    }

    Ok(())
  }
}

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  data::fixes::RouteError, heading::TurnDirection, performance::AircraftKind,
  scenario::{Scenario, ScenarioError},
};

fn one() -> usize {
  1
}

/// Departure lined up on a runway threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwaySpawn {
  pub callsign: String,
  #[serde(rename = "type")]
  pub kind: AircraftKind,
  pub runway: String,
  #[serde(default)]
  pub sid: Option<String>,
  #[serde(default)]
  pub altitude_cap: Option<f64>,
  #[serde(default = "one")]
  pub formation_size: usize,
}

/// Arrival placed upstream of a waypoint, inbound to the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirborneSpawn {
  pub callsign: String,
  #[serde(rename = "type")]
  pub kind: AircraftKind,
  pub flight_level: f64,
  pub waypoint: String,
  /// Minutes at cruise speed to the waypoint.
  pub time_to_waypoint: f64,
  #[serde(default = "one")]
  pub formation_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(tag = "type", content = "value")]
pub enum Command {
  SpawnRunway(RunwaySpawn),
  SpawnAirborne(AirborneSpawn),

  Takeoff {
    id: u32,
  },
  AssignSid {
    id: u32,
    designator: String,
    #[serde(default)]
    altitude_cap: Option<f64>,
  },
  AssignHeading {
    id: u32,
    heading: f64,
  },
  AssignAltitude {
    id: u32,
    altitude: f64,
  },
  AssignSpeed {
    id: u32,
    speed: f64,
  },
  AssignRoute {
    id: u32,
    waypoints: Vec<String>,
  },
  /// Literal points, flown in order.
  AssignDrawnRoute {
    id: u32,
    points: Vec<DVec2>,
  },

  AssignIls {
    id: u32,
    entry: String,
  },
  AssignVor {
    id: u32,
    runway: String,
    entry: String,
  },
  AssignHitac {
    id: u32,
    entry: String,
  },
  AssignVisual {
    id: u32,
    pattern: String,
    entry: String,
  },

  AssignHolding {
    id: u32,
    /// Holds over present position when empty.
    #[serde(default)]
    fix: Option<String>,
    /// Defaults to the bearing from the aircraft to the fix.
    #[serde(default)]
    inbound: Option<f64>,
    direction: TurnDirection,
    #[serde(default)]
    leg_minutes: Option<f64>,
  },
  AssignOrbit {
    id: u32,
    direction: TurnDirection,
  },

  Split {
    id: u32,
  },
  RandomAutopilot {
    id: u32,
  },
  Delete {
    id: u32,
  },

  // Clock
  Pause,
  Resume,
  SetMultiplier(f64),

  LoadScenario(Scenario),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(tag = "type", content = "value")]
pub enum CommandReply {
  Ok,
  Spawned(Vec<u32>),
  /// Number of spawns queued by a scenario.
  Scheduled(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
  #[error("no aircraft with id {0}")]
  UnknownAircraft(u32),
  #[error("callsign must not be empty")]
  EmptyCallsign,
  #[error("unknown SID {0:?}")]
  UnknownSid(String),
  #[error("SID {sid} does not serve runway {runway}")]
  SidNotForRunway { sid: String, runway: String },
  #[error("unknown runway {0:?}")]
  UnknownRunway(String),
  #[error("unknown visual pattern {0:?}")]
  UnknownPattern(String),
  #[error("unknown entry {0:?}")]
  UnknownEntry(String),
  #[error("unknown waypoint {0:?}")]
  UnknownWaypoint(String),
  #[error("invalid route: {0}")]
  Route(#[from] RouteError),

  #[error("heading {0} is outside 0-360")]
  InvalidHeading(f64),
  #[error("altitude {0} ft is invalid")]
  InvalidAltitude(f64),
  #[error("flight level {0} is outside 10-600")]
  InvalidFlightLevel(f64),
  #[error("speed {0} kt is invalid")]
  InvalidSpeed(f64),
  #[error("leg time {0} min is outside 0-5")]
  InvalidLegTime(f64),
  #[error("time to waypoint {0} min is outside 1-20")]
  InvalidTimeToWaypoint(f64),
  #[error("time multiplier {0} must be positive")]
  InvalidMultiplier(f64),

  #[error("{0} is not VFR")]
  VfrOnly(String),
  #[error("{0} is not military")]
  MilitaryOnly(String),
  #[error("formation size {0} is outside 1-4")]
  FormationSize(usize),
  #[error("{0} is not following a formation leader")]
  NotAFollower(String),

  #[error("invalid scenario: {0}")]
  Scenario(#[from] ScenarioError),
}

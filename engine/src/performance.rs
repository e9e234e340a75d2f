use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum AircraftKind {
  #[default]
  #[serde(rename = "VFR", alias = "vfr")]
  Vfr,
  #[serde(rename = "IFR", alias = "ifr")]
  Ifr,
  #[serde(rename = "Military", alias = "military")]
  Military,
}

impl fmt::Display for AircraftKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Vfr => write!(f, "VFR"),
      Self::Ifr => write!(f, "IFR"),
      Self::Military => write!(f, "Military"),
    }
  }
}

/// Kinematic limits for one aircraft type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Performance {
  /// Rotation speed, kt.
  pub takeoff_speed: f64,
  /// kt/s
  pub acceleration: f64,
  /// kt/s
  pub deceleration: f64,
  /// ft/min
  pub climb_rate: f64,
  /// ft/min
  pub descent_rate: f64,
  pub climb_speed: f64,
  pub max_speed: f64,
  pub cruise_speed: f64,
  /// deg/s
  pub turn_rate: f64,
}

static VFR: Performance = Performance {
  takeoff_speed: 80.0,
  acceleration: 3.0,
  deceleration: 2.0,
  climb_rate: 500.0,
  descent_rate: 500.0,
  climb_speed: 100.0,
  max_speed: 250.0,
  cruise_speed: 120.0,
  turn_rate: 3.0,
};

static IFR: Performance = Performance {
  takeoff_speed: 150.0,
  acceleration: 5.0,
  deceleration: 3.0,
  climb_rate: 2200.0,
  descent_rate: 2000.0,
  climb_speed: 250.0,
  max_speed: 450.0,
  cruise_speed: 250.0,
  turn_rate: 1.5,
};

static MILITARY: Performance = Performance {
  takeoff_speed: 180.0,
  acceleration: 8.0,
  deceleration: 5.0,
  climb_rate: 12000.0,
  descent_rate: 6000.0,
  climb_speed: 350.0,
  max_speed: 600.0,
  cruise_speed: 350.0,
  turn_rate: 6.0,
};

impl AircraftKind {
  pub fn performance(self) -> &'static Performance {
    match self {
      Self::Vfr => &VFR,
      Self::Ifr => &IFR,
      Self::Military => &MILITARY,
    }
  }

  pub fn is_military(self) -> bool {
    matches!(self, Self::Military)
  }
}
